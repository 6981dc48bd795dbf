//! Category mappings for the coded columns: main cause (p12), vehicle
//! damage (p53) and road surface state (p16). Labels are the ones used
//! on the published charts.

/// Main cause of the accident, grouped by the hundreds of its p12 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CauseGroup {
    NotDriver,
    Speeding,
    Overtaking,
    RightOfWay,
    ImproperDriving,
    TechnicalDefect,
}

impl CauseGroup {
    pub const ALL: [CauseGroup; 6] = [
        CauseGroup::NotDriver,
        CauseGroup::Speeding,
        CauseGroup::Overtaking,
        CauseGroup::RightOfWay,
        CauseGroup::ImproperDriving,
        CauseGroup::TechnicalDefect,
    ];

    /// Maps a p12 code; codes outside the published ranges map to `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            100 => Some(CauseGroup::NotDriver),
            201..=209 => Some(CauseGroup::Speeding),
            301..=311 => Some(CauseGroup::Overtaking),
            401..=414 => Some(CauseGroup::RightOfWay),
            501..=516 => Some(CauseGroup::ImproperDriving),
            601..=615 => Some(CauseGroup::TechnicalDefect),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CauseGroup::NotDriver => "Nezaviněná řidičem",
            CauseGroup::Speeding => "Nepřiměřená rychlost jízdy",
            CauseGroup::Overtaking => "Nesprávné předjíždění",
            CauseGroup::RightOfWay => "Nedání přednosti v jízdě",
            CauseGroup::ImproperDriving => "Nesprávný způsob jízdy",
            CauseGroup::TechnicalDefect => "Technická závada vozidla",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Vehicle damage bracket. p53 is published in hundreds of CZK; labels
/// are in thousands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DamageBin {
    Below50,
    From50To200,
    From200To500,
    From500To1000,
    Above1000,
}

impl DamageBin {
    pub const ALL: [DamageBin; 5] = [
        DamageBin::Below50,
        DamageBin::From50To200,
        DamageBin::From200To500,
        DamageBin::From500To1000,
        DamageBin::Above1000,
    ];

    /// Left-closed brackets: [0, 500), [500, 2000), [2000, 5000),
    /// [5000, 10000), [10000, ∞).
    pub fn from_hundreds(value: u32) -> Self {
        match value {
            0..=499 => DamageBin::Below50,
            500..=1999 => DamageBin::From50To200,
            2000..=4999 => DamageBin::From200To500,
            5000..=9999 => DamageBin::From500To1000,
            _ => DamageBin::Above1000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DamageBin::Below50 => "< 50",
            DamageBin::From50To200 => "50-200",
            DamageBin::From200To500 => "200-500",
            DamageBin::From500To1000 => "500-1000",
            DamageBin::Above1000 => "> 1000",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Number of road surface states (p16 codes 0..=9).
pub const SURFACE_STATES: usize = 10;

pub const SURFACE_LABELS: [&str; SURFACE_STATES] = [
    "Jiný stav",
    "Suchý neznečištěný",
    "Suchý znečištěný",
    "Mokrý",
    "Bláto",
    "Náledí, ujetý sníh - posypané",
    "Náledí, ujetý sníh - neposypané",
    "Rozlitý olej, nafta apod.",
    "Souvislý sníh",
    "Náhlá změna stavu",
];
