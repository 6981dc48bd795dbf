/// Tabular analyses over the accident records.
///
/// Each submodule computes the data behind one chart or report; rendering
/// lives in `plot`.
///
/// Submodules:
/// - `frame`:        the combined dataset (`AccidentFrame`).
/// - `categories`:   cause groups, damage brackets, surface states.
/// - `stats`:        accidents per year and region.
/// - `consequences`: deaths and injuries per region.
/// - `damage`:       vehicle damage against main cause.
/// - `surface`:      monthly counts per road surface state.
/// - `alcohol`:      alcohol involvement by cause and locality.
/// - `hypothesis`:   chi-squared independence test.

pub mod alcohol;
pub mod categories;
pub mod consequences;
pub mod damage;
pub mod frame;
pub mod hypothesis;
pub mod stats;
pub mod surface;

pub use frame::AccidentFrame;
