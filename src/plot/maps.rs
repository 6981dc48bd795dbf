//! Point maps of accident positions in the South Moravian region.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analysis::alcohol::alcohol_accidents;
use crate::geo::cluster::{Clustering, KMeans};
use crate::geo::{make_geo, Bounds, Crs, GeoFrame, JHM_WINDOW};
use crate::logging::{self, Stage};
use crate::model::{AccidentError, AccidentRecord, LOCALITY_IN_TOWN, LOCALITY_OUTSIDE, Region, Result};
use crate::plot::{format_table, log_saved, plot_error, prepare_location};

const MAP_SIZE: (u32, u32) = (1600, 900);

/// The JHM window when the frame is in S-JTSK, the data extent otherwise.
fn view_window(geo: &GeoFrame) -> Result<Bounds> {
    if geo.crs == Crs::Sjtsk {
        return Ok(JHM_WINDOW);
    }
    let b = geo.bounds().ok_or(AccidentError::EmptyDataset)?;
    let pad_x = ((b.max_x - b.min_x) * 0.05).max(1e-6);
    let pad_y = ((b.max_y - b.min_y) * 0.05).max(1e-6);
    Ok(Bounds {
        min_x: b.min_x - pad_x,
        max_x: b.max_x + pad_x,
        min_y: b.min_y - pad_y,
        max_y: b.max_y + pad_y,
    })
}

fn draw_points(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    caption: &str,
    window: &Bounds,
    points: &[(f64, f64)],
    color: RGBAColor,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(10)
        .build_cartesian_2d(window.min_x..window.max_x, window.min_y..window.max_y)
        .map_err(plot_error)?;
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 2, color.filled())))
        .map_err(plot_error)?;
    Ok(())
}

/// Two panels of JHM accidents: inside towns and outside them.
pub fn plot_geo(geo: &GeoFrame, fig_location: Option<&Path>, show_figure: bool) -> Result<()> {
    let jhm = geo.filter_region(Region::Jhm);
    if jhm.is_empty() {
        return Err(AccidentError::EmptyDataset);
    }
    let window = view_window(&jhm)?;
    let jhm = jhm.within(&window);
    let in_town = jhm.filter_locality(LOCALITY_IN_TOWN);
    let outside = jhm.filter_locality(LOCALITY_OUTSIDE);

    if show_figure {
        println!(
            "{}",
            format_table(
                &["Region", "CRS", "In town", "Outside"],
                &[vec![
                    Region::Jhm.to_string(),
                    jhm.crs.to_string(),
                    in_town.len().to_string(),
                    outside.len().to_string(),
                ]],
            )
        );
    }

    let Some(path) = fig_location else {
        return Ok(());
    };
    prepare_location(path)?;
    let root = SVGBackend::new(path, MAP_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let panels = root.split_evenly((1, 2));
    draw_points(
        &panels[0],
        "Nehody v JHM kraji: v obci",
        &window,
        &in_town.coordinates(),
        RED.mix(0.6),
    )?;
    draw_points(
        &panels[1],
        "Nehody v JHM kraji: mimo obec",
        &window,
        &outside.coordinates(),
        BLUE.mix(0.6),
    )?;

    root.present().map_err(plot_error)?;
    log_saved(path);
    Ok(())
}

/// Map of the geolocated JHM accidents where alcohol was present.
pub fn plot_alcohol_map(
    records: &[AccidentRecord],
    fig_location: Option<&Path>,
    show_figure: bool,
) -> Result<()> {
    let drunk: Vec<AccidentRecord> = alcohol_accidents(records, Region::Jhm)
        .into_iter()
        .cloned()
        .collect();
    if drunk.is_empty() {
        return Err(AccidentError::EmptyDataset);
    }
    let geo = make_geo(&drunk).within(&JHM_WINDOW);

    if show_figure {
        println!(
            "{}",
            format_table(
                &["Region", "Alcohol accidents", "In window"],
                &[vec![Region::Jhm.to_string(), drunk.len().to_string(), geo.len().to_string()]],
            )
        );
    }

    let Some(path) = fig_location else {
        return Ok(());
    };
    prepare_location(path)?;
    let root = SVGBackend::new(path, MAP_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    draw_points(
        &root,
        "Nehody pod vlivem alkoholu v JHM kraji",
        &JHM_WINDOW,
        &geo.coordinates(),
        RED.mix(0.6),
    )?;
    root.present().map_err(plot_error)?;
    log_saved(path);
    Ok(())
}

/// Clusters JHM accidents and draws them as grey points overlaid with one
/// marker per cluster, sized and coloured by its accident count.
pub fn plot_cluster(
    geo: &GeoFrame,
    model: &KMeans,
    fig_location: Option<&Path>,
    show_figure: bool,
) -> Result<Clustering> {
    let jhm = geo.filter_region(Region::Jhm);
    let coords = jhm.coordinates();
    let clustering = model.fit(&coords)?;
    logging::info(
        Stage::Geo,
        Some(Region::Jhm.code()),
        &format!(
            "{} points in {} clusters after {} iterations",
            coords.len(),
            clustering.clusters.len(),
            clustering.iterations
        ),
    );

    if show_figure {
        let rows: Vec<Vec<String>> = clustering
            .clusters
            .iter()
            .enumerate()
            .map(|(i, c)| {
                vec![
                    i.to_string(),
                    format!("{:.1}", c.center.0),
                    format!("{:.1}", c.center.1),
                    c.count.to_string(),
                ]
            })
            .collect();
        println!("{}", format_table(&["Cluster", "X", "Y", "Count"], &rows));
    }

    let Some(path) = fig_location else {
        return Ok(clustering);
    };
    prepare_location(path)?;
    let window = view_window(&jhm)?;
    let root = SVGBackend::new(path, MAP_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Shlukování nehod v JHM", ("sans-serif", 26))
        .margin(10)
        .build_cartesian_2d(window.min_x..window.max_x, window.min_y..window.max_y)
        .map_err(plot_error)?;

    chart
        .draw_series(
            jhm.within(&window)
                .coordinates()
                .into_iter()
                .map(|p| Circle::new(p, 1, BLACK.mix(0.3).filled())),
        )
        .map_err(plot_error)?;

    let max = clustering.clusters.iter().map(|c| c.count).max().unwrap_or(1).max(1) as f64;
    chart
        .draw_series(clustering.clusters.iter().filter(|c| window.contains(c.center.0, c.center.1)).map(|c| {
            let share = c.count as f64 / max;
            let radius = (4.0 + 36.0 * share.sqrt()) as u32;
            // blue for the smallest clusters, red for the largest
            let color = HSLColor(0.66 * (1.0 - share), 0.9, 0.5);
            Circle::new(c.center, radius, color.mix(0.5).filled())
        }))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    log_saved(path);
    Ok(clustering)
}
