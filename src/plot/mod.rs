//! Chart rendering.
//!
//! Every figure function takes the analysed data plus an optional output
//! location and a `show_figure` flag. Figures are written as SVG; there is
//! no window to show them in, so `show_figure` prints the numbers behind
//! the chart instead.

pub mod charts;
pub mod maps;

use std::fs;
use std::path::Path;

use crate::logging::{self, Stage};
use crate::model::{AccidentError, Result};

pub use charts::{plot_conseq, plot_damage, plot_stat, plot_surface};
pub use maps::{plot_alcohol_map, plot_cluster, plot_geo};

pub const FIGURE_SIZE: (u32, u32) = (1200, 900);

/// Creates the parent directory of a figure location.
pub fn prepare_location(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub(crate) fn plot_error<E: std::fmt::Display>(err: E) -> AccidentError {
    AccidentError::Plot(err.to_string())
}

pub(crate) fn log_saved(path: &Path) {
    logging::info(Stage::Plot, None, &format!("Figure saved to {}", path.display()));
}

/// Renders rows as a fixed-width text table for `show_figure`.
pub(crate) fn format_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>width$}", c, width = w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = render(header.iter().map(|h| h.to_string()).collect());
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        out.push('\n');
        out.push_str(&render(row.clone()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_location_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures/2020/stat.svg");
        prepare_location(&path).unwrap();
        assert!(dir.path().join("figures/2020").is_dir());
        prepare_location(Path::new("bare.svg")).unwrap();
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let table = format_table(
            &["Region", "2016"],
            &[vec!["PHA".to_string(), "21000".to_string()], vec!["KVK".to_string(), "9".to_string()]],
        );
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Region   2016");
        assert_eq!(lines[2], "   PHA  21000");
        assert_eq!(lines[3], "   KVK      9");
    }
}
