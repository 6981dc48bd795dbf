//! Accident positions as a point layer.
//!
//! `make_geo` turns parsed records into a `GeoFrame` in S-JTSK; frames can
//! be reprojected, filtered and clustered for the map charts.

pub mod cluster;
pub mod crs;

use crate::model::{AccidentRecord, Region, Result};
pub use crs::Crs;

/// Axis-aligned extent of a point set, in the frame's CRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// View window over the South Moravian region, S-JTSK metres.
pub const JHM_WINDOW: Bounds = Bounds {
    min_x: -680_276.578125,
    max_x: -520_931.825,
    min_y: -1_220_801.7125,
    max_y: -1_108_740.0375,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub region: Region,
    pub locality: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoFrame {
    pub crs: Crs,
    pub points: Vec<GeoPoint>,
}

/// Builds a point layer from records. Records without usable
/// coordinates are dropped.
pub fn make_geo(records: &[AccidentRecord]) -> GeoFrame {
    let points = records
        .iter()
        .filter_map(|r| match (r.x, r.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(GeoPoint {
                id: r.id.clone(),
                x,
                y,
                region: r.region,
                locality: r.locality,
            }),
            _ => None,
        })
        .collect();
    GeoFrame {
        crs: Crs::Sjtsk,
        points,
    }
}

impl GeoFrame {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_crs(&self, target: Crs) -> Result<GeoFrame> {
        let points = self
            .points
            .iter()
            .map(|p| {
                let (x, y) = crs::transform((p.x, p.y), self.crs, target)?;
                Ok(GeoPoint { x, y, ..p.clone() })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(GeoFrame { crs: target, points })
    }

    pub fn filter_region(&self, region: Region) -> GeoFrame {
        self.filter(|p| p.region == region)
    }

    pub fn filter_locality(&self, locality: u8) -> GeoFrame {
        self.filter(|p| p.locality == locality)
    }

    /// Points inside `bounds`, assumed to be in this frame's CRS.
    pub fn within(&self, bounds: &Bounds) -> GeoFrame {
        self.filter(|p| bounds.contains(p.x, p.y))
    }

    fn filter<F: Fn(&GeoPoint) -> bool>(&self, keep: F) -> GeoFrame {
        GeoFrame {
            crs: self.crs,
            points: self.points.iter().filter(|p| keep(p)).cloned().collect(),
        }
    }

    /// `None` for an empty frame.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let init = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(self.points.iter().fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            min_y: b.min_y.min(p.y),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.x, p.y)).collect()
    }
}
