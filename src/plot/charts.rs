//! Bar and line charts over the whole country or the chart regions.

use std::path::Path;

use plotters::coord::Shift;
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::prelude::*;

use crate::analysis::categories::{CauseGroup, DamageBin, SURFACE_LABELS, SURFACE_STATES};
use crate::analysis::consequences::consequences_by_region;
use crate::analysis::damage::damage_table;
use crate::analysis::stats::accidents_count;
use crate::analysis::surface::surface_series;
use crate::model::{AccidentError, AccidentRecord, Result};
use crate::plot::{FIGURE_SIZE, format_table, log_saved, plot_error, prepare_location};
use crate::regions::CHART_REGIONS;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const CAPTION_FONT: (&str, u32) = ("sans-serif", 20);

fn series_color(i: usize) -> RGBAColor {
    Palette99::pick(i).to_rgba()
}

/// Draws one bar per series inside every group. Group `i` is centred on
/// x = i. Bars not reaching above `baseline` are skipped, which keeps
/// zero counts off logarithmic axes.
fn draw_grouped_bars<Y>(
    area: &Area<'_>,
    caption: &str,
    groups: &[String],
    series: &[(String, Vec<f64>)],
    y_spec: Y,
    baseline: f64,
) -> Result<()>
where
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    let n = groups.len().max(1);
    let mut chart = ChartBuilder::on(area)
        .caption(caption, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, y_spec)
        .map_err(plot_error)?;

    let group_label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 {
            groups.get(i as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&group_label)
        .draw()
        .map_err(plot_error)?;

    let width = 0.8 / series.len().max(1) as f64;
    for (s, (name, values)) in series.iter().enumerate() {
        let color = series_color(s);
        let bars = values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > baseline)
            .map(|(g, &v)| {
                let x0 = g as f64 - 0.4 + s as f64 * width;
                Rectangle::new([(x0, baseline), (x0 + width, v)], color.filled())
            });
        chart
            .draw_series(bars)
            .map_err(plot_error)?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(plot_error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Accidents per year and region
// ---------------------------------------------------------------------------

/// Grouped bars of accident counts: one group per region, one bar per year.
pub fn plot_stat(records: &[AccidentRecord], fig_location: Option<&Path>, show_figure: bool) -> Result<()> {
    if records.is_empty() {
        return Err(AccidentError::EmptyDataset);
    }
    let counts = accidents_count(records);
    let mut regions: Vec<_> = counts.values().flat_map(|m| m.keys().copied()).collect();
    regions.sort();
    regions.dedup();

    let series: Vec<(String, Vec<f64>)> = counts
        .iter()
        .map(|(year, by_region)| {
            let values = regions
                .iter()
                .map(|r| by_region.get(r).copied().unwrap_or(0) as f64)
                .collect();
            (year.to_string(), values)
        })
        .collect();

    if show_figure {
        let mut header = vec!["Region".to_string()];
        header.extend(series.iter().map(|(year, _)| year.clone()));
        let rows: Vec<Vec<String>> = regions
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut row = vec![r.to_string()];
                row.extend(series.iter().map(|(_, v)| format!("{}", v[i])));
                row
            })
            .collect();
        let header: Vec<&str> = header.iter().map(String::as_str).collect();
        println!("{}", format_table(&header, &rows));
    }

    if let Some(path) = fig_location {
        prepare_location(path)?;
        let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let top = series.iter().flat_map(|(_, v)| v.iter().copied()).fold(1.0, f64::max) * 1.1;
        let groups: Vec<String> = regions.iter().map(|r| r.to_string()).collect();
        draw_grouped_bars(&root, "Počet nehod v krajích", &groups, &series, 0f64..top, 0.0)?;

        root.present().map_err(plot_error)?;
        log_saved(path);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Consequences per region
// ---------------------------------------------------------------------------

/// Four stacked panels: killed, severely injured, lightly injured and the
/// number of accidents, with regions ordered by accident count.
pub fn plot_conseq(records: &[AccidentRecord], fig_location: Option<&Path>, show_figure: bool) -> Result<()> {
    let rows = consequences_by_region(records);
    if rows.is_empty() {
        return Err(AccidentError::EmptyDataset);
    }

    if show_figure {
        let table: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    r.region.to_string(),
                    r.killed.to_string(),
                    r.severely_injured.to_string(),
                    r.lightly_injured.to_string(),
                    r.accidents.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            format_table(&["Region", "Killed", "Severe", "Light", "Accidents"], &table)
        );
    }

    let Some(path) = fig_location else {
        return Ok(());
    };
    prepare_location(path)?;
    let root = SVGBackend::new(path, (900, 1200)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let codes: Vec<String> = rows.iter().map(|r| r.region.to_string()).collect();
    let panels: [(&str, Vec<u64>); 4] = [
        ("Úmrtí", rows.iter().map(|r| r.killed).collect()),
        ("Těžce ranění", rows.iter().map(|r| r.severely_injured).collect()),
        ("Lehce ranění", rows.iter().map(|r| r.lightly_injured).collect()),
        ("Celkem nehod", rows.iter().map(|r| r.accidents).collect()),
    ];

    let n = rows.len() as u32;
    for (i, (area, (title, values))) in root.split_evenly((4, 1)).iter().zip(panels).enumerate() {
        let top = values.iter().copied().max().unwrap_or(0) + 1;
        let mut chart = ChartBuilder::on(area)
            .caption(title, CAPTION_FONT)
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), 0u64..top + top / 10)
            .map_err(plot_error)?;

        let region_label = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(idx) => codes.get(*idx as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(codes.len())
            .x_label_formatter(&region_label)
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(series_color(i).filled())
                    .margin(6)
                    .data(values.iter().enumerate().map(|(j, &v)| (j as u32, v))),
            )
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    log_saved(path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Damage by cause
// ---------------------------------------------------------------------------

/// 2x2 panels, one per chart region: accidents per damage bracket, one bar
/// per cause group, on a logarithmic count axis.
pub fn plot_damage(records: &[AccidentRecord], fig_location: Option<&Path>, show_figure: bool) -> Result<()> {
    if records.is_empty() {
        return Err(AccidentError::EmptyDataset);
    }
    let tables: Vec<_> = CHART_REGIONS.iter().map(|&r| damage_table(records, r)).collect();

    if show_figure {
        let mut header = vec!["Region", "Škoda [tisíc Kč]"];
        header.extend(CauseGroup::ALL.iter().map(|c| c.label()));
        let rows: Vec<Vec<String>> = tables
            .iter()
            .flat_map(|t| {
                DamageBin::ALL.iter().map(move |&bin| {
                    let mut row = vec![t.region.to_string(), bin.label().to_string()];
                    row.extend(CauseGroup::ALL.iter().map(|&c| t.get(bin, c).to_string()));
                    row
                })
            })
            .collect();
        println!("{}", format_table(&header, &rows));
    }

    let Some(path) = fig_location else {
        return Ok(());
    };
    prepare_location(path)?;
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let groups: Vec<String> = DamageBin::ALL.iter().map(|b| b.label().to_string()).collect();
    let top = tables.iter().map(|t| t.max_count()).max().unwrap_or(0).max(5) as f64 * 2.0;
    for (area, table) in root.split_evenly((2, 2)).iter().zip(&tables) {
        let series: Vec<(String, Vec<f64>)> = CauseGroup::ALL
            .iter()
            .map(|&c| {
                let values = DamageBin::ALL.iter().map(|&b| table.get(b, c) as f64).collect();
                (c.label().to_string(), values)
            })
            .collect();
        let caption = table.region.to_string();
        draw_grouped_bars(area, &caption, &groups, &series, (0.5f64..top).log_scale(), 0.5)?;
    }

    root.present().map_err(plot_error)?;
    log_saved(path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Road surface over time
// ---------------------------------------------------------------------------

/// 2x2 panels, one per chart region: monthly accident counts, one line per
/// road surface state.
pub fn plot_surface(records: &[AccidentRecord], fig_location: Option<&Path>, show_figure: bool) -> Result<()> {
    if records.is_empty() {
        return Err(AccidentError::EmptyDataset);
    }
    let all_series: Vec<_> = CHART_REGIONS.iter().map(|&r| surface_series(records, r)).collect();

    if show_figure {
        let mut header = vec!["Region", "Měsíc"];
        header.extend(SURFACE_LABELS);
        let rows: Vec<Vec<String>> = all_series
            .iter()
            .flat_map(|s| {
                s.months.iter().zip(&s.counts).map(move |(month, counts)| {
                    let mut row = vec![s.region.to_string(), month.format("%Y-%m").to_string()];
                    row.extend(counts.iter().map(u64::to_string));
                    row
                })
            })
            .collect();
        println!("{}", format_table(&header, &rows));
    }

    let Some(path) = fig_location else {
        return Ok(());
    };
    prepare_location(path)?;
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let top = all_series.iter().map(|s| s.max_count()).max().unwrap_or(0).max(1) as f64 * 1.1;
    for (area, series) in root.split_evenly((2, 2)).iter().zip(&all_series) {
        let last = series.months.len().max(2) - 1;
        let mut chart = ChartBuilder::on(area)
            .caption(series.region.to_string(), CAPTION_FONT)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..last as f64, 0f64..top)
            .map_err(plot_error)?;

        let month_label = |x: &f64| {
            let i = x.round();
            match series.months.get(i as usize) {
                Some(m) if (x - i).abs() < 1e-6 && i >= 0.0 => m.format("%Y-%m").to_string(),
                _ => String::new(),
            }
        };
        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&month_label)
            .y_desc("Počet nehod")
            .draw()
            .map_err(plot_error)?;

        for state in 0..SURFACE_STATES {
            let color = series_color(state);
            let points: Vec<(f64, f64)> = series
                .state_series(state)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i as f64, v as f64))
                .collect();
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(plot_error)?
                .label(SURFACE_LABELS[state])
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 11))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    log_saved(path);
    Ok(())
}
