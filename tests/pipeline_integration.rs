/// End-to-end pipeline test on local fixture archives.
///
/// Builds `datagis` archives in a scratch folder, then runs the same steps
/// as the command line: region loading with caching, export and reload of
/// the combined dataset, the analyses, and every chart.
///
/// No network access: the portal URL points at a closed local port, and
/// the archives are already present so no download is attempted.
///
/// Run with: cargo test --test pipeline_integration

use std::fs::File;
use std::io::Write;
use std::path::Path;

use accident_stats::analysis::alcohol::{alcohol_cause_table, locality_share, most_frequent_alcohol_cause};
use accident_stats::analysis::categories::CauseGroup;
use accident_stats::analysis::consequences::consequences_by_region;
use accident_stats::analysis::hypothesis::road_class_fatality;
use accident_stats::analysis::stats::accidents_count;
use accident_stats::analysis::AccidentFrame;
use accident_stats::config::Settings;
use accident_stats::geo::cluster::KMeans;
use accident_stats::geo::{make_geo, Crs};
use accident_stats::ingest::DataDownloader;
use accident_stats::model::{AccidentRecord, Region, CSV_COLUMNS};
use accident_stats::plot;

use approx::assert_abs_diff_eq;
use encoding_rs::WINDOWS_1250;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Row {
    id: &'static str,
    date: &'static str,
    road_kind: u8,
    killed: u8,
    alcohol: u8,
    cause: u16,
    coords: Option<(&'static str, &'static str)>,
    locality: u8,
}

fn row(id: &'static str, date: &'static str, road_kind: u8, killed: u8, alcohol: u8, cause: u16) -> Row {
    Row {
        id,
        date,
        road_kind,
        killed,
        alcohol,
        cause,
        coords: Some(("-598000,5", "-1160000,25")),
        locality: 1,
    }
}

fn csv(rows: &[Row]) -> String {
    rows.iter()
        .map(|r| {
            let mut fields: Vec<String> = (0..CSV_COLUMNS).map(|_| "\"0\"".to_string()).collect();
            fields[0] = format!("\"{}\"", r.id);
            fields[1] = format!("\"{}\"", r.road_kind);
            fields[3] = format!("\"{}\"", r.date);
            fields[11] = format!("\"{}\"", r.alcohol);
            fields[12] = format!("\"{}\"", r.cause);
            fields[13] = format!("\"{}\"", r.killed);
            match r.coords {
                Some((x, y)) => {
                    fields[47] = format!("\"{}\"", x);
                    fields[48] = format!("\"{}\"", y);
                }
                None => {
                    fields[47] = "\"\"".to_string();
                    fields[48] = "\"\"".to_string();
                }
            }
            fields[63] = format!("\"{}\"", r.locality);
            fields.join(";")
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

fn write_archive(path: &Path, members: &[(&str, String)]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, body) in members {
        zip.start_file(*name, zip::write::SimpleFileOptions::default()).unwrap();
        let (encoded, _, _) = WINDOWS_1250.encode(body);
        zip.write_all(&encoded).unwrap();
    }
    zip.finish().unwrap();
}

/// PHA has 5 accidents, JHM 6, over 2016 and the first half of 2017.
fn write_fixtures(dir: &Path) {
    let pha_2016 = vec![
        Row { coords: Some(("-743000", "-1043000")), ..row("PHA-1", "2016-02-01", 1, 1, 9, 205) },
        Row { coords: Some(("-743100", "-1043100")), ..row("PHA-2", "2016-03-01", 3, 0, 2, 301) },
        Row { coords: Some(("-743200", "-1043200")), ..row("PHA-3", "2016-04-01", 1, 0, 1, 401) },
    ];
    let jhm_2016 = vec![
        Row { locality: 2, ..row("JHM-1", "2016-02-10", 3, 1, 7, 205) },
        row("JHM-2", "2016-03-10", 1, 0, 4, 501),
        Row { coords: Some(("-610000,75", "-1170000")), ..row("JHM-3", "2016-03-11", 3, 0, 0, 601) },
        Row { coords: None, ..row("JHM-4", "2016-05-10", 2, 0, 8, 100) },
    ];
    write_archive(
        &dir.join("datagis2016.zip"),
        &[("00.csv", csv(&pha_2016)), ("06.csv", csv(&jhm_2016))],
    );

    let pha_2017 = vec![
        Row { coords: Some(("-743000", "-1043000")), ..row("PHA-4", "2017-01-05", 1, 0, 2, 203) },
        Row { coords: Some(("-743000", "-1043000")), ..row("PHA-5", "2017-05-05", 3, 0, 2, 203) },
    ];
    let jhm_2017 = vec![
        Row { coords: Some(("-560000", "-1190000")), ..row("JHM-5", "2017-02-05", 1, 1, 2, 202) },
        Row { coords: Some(("-560500", "-1190500")), ..row("JHM-6", "2017-06-05", 3, 0, 2, 202) },
    ];
    write_archive(
        &dir.join("datagis-06-2017.zip"),
        &[("00.csv", csv(&pha_2017)), ("06.csv", csv(&jhm_2017))],
    );

    // Superseded by the June snapshot and must not be read.
    write_archive(
        &dir.join("datagis-03-2017.zip"),
        &[("00.csv", csv(&[row("PHA-OLD", "2017-01-05", 1, 0, 2, 203)]))],
    );
}

fn offline_settings(dir: &Path) -> Settings {
    Settings {
        base_url: "http://127.0.0.1:9/izv/".to_string(),
        data_dir: dir.to_path_buf(),
        timeout_secs: 1,
        ..Settings::default()
    }
}

fn load_records(dir: &Path) -> Vec<AccidentRecord> {
    let mut downloader = DataDownloader::new(offline_settings(dir)).unwrap();
    downloader.get_list(&[Region::Pha, Region::Jhm]).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_region_loading_selects_latest_snapshots_and_caches() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let records = load_records(dir.path());
    assert_eq!(records.len(), 11);
    assert!(records.iter().all(|r| r.id != "PHA-OLD"));
    assert_eq!(records.iter().filter(|r| r.region == Region::Pha).count(), 5);

    let settings = offline_settings(dir.path());
    assert!(settings.cache_path(Region::Pha).exists());
    assert!(settings.cache_path(Region::Jhm).exists());

    // With the archives gone, the caches alone must reproduce the data.
    for name in ["datagis2016.zip", "datagis-06-2017.zip", "datagis-03-2017.zip"] {
        std::fs::remove_file(dir.path().join(name)).unwrap();
    }
    assert_eq!(load_records(dir.path()), records);
}

#[test]
fn test_export_and_reload_keeps_every_record() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let frame = AccidentFrame::new(load_records(dir.path()));
    let path = dir.path().join("export/accidents.json.gz");
    frame.save(&path).unwrap();

    let loaded = AccidentFrame::load(&path, true).unwrap();
    assert_eq!(loaded, frame);
    assert_eq!(loaded.years(), vec![2016, 2017]);
    assert_eq!(loaded.regions(), vec![Region::Pha, Region::Jhm]);
}

#[test]
fn test_analyses_on_fixture_data() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let records = load_records(dir.path());

    let counts = accidents_count(&records);
    assert_eq!(counts[&2016][&Region::Pha], 3);
    assert_eq!(counts[&2016][&Region::Jhm], 4);
    assert_eq!(counts[&2017][&Region::Pha], 2);
    assert_eq!(counts[&2017][&Region::Jhm], 2);

    let conseq = consequences_by_region(&records);
    assert_eq!(conseq[0].region, Region::Jhm);
    assert_eq!(conseq[0].accidents, 6);
    assert_eq!(conseq[0].killed, 2);
    assert_eq!(conseq[1].killed, 1);

    let rows = alcohol_cause_table(&records);
    assert_eq!(rows.len(), 5, "improper driving only has an untested driver");
    let last = rows.last().unwrap();
    assert_eq!(last.cause, CauseGroup::NotDriver);
    assert_abs_diff_eq!(last.relative_pct, 100.0);
    let top = most_frequent_alcohol_cause(&rows).unwrap();
    assert_eq!(top.cause, CauseGroup::Speeding);
    assert_eq!(top.absolute, 2);
    // JHM-4 is in town but has no position, leaving only JHM-1 (outside)
    assert_abs_diff_eq!(locality_share(&records, Region::Jhm).unwrap(), 0.0);

    let outcome = road_class_fatality(&records).unwrap();
    assert_eq!(outcome.table.counts, vec![vec![2, 3], vec![1, 4]]);
    assert_eq!(outcome.result.dof, 1);
    assert!(outcome.result.p_value > 0.05 && outcome.result.p_value <= 1.0);
    assert!(!outcome.result.rejects(0.05));
    assert!(outcome.first_class_more_fatal());
}

#[test]
fn test_every_chart_is_written() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let records = load_records(dir.path());
    let figures = dir.path().join("figures");

    plot::plot_stat(&records, Some(&figures.join("stat.svg")), false).unwrap();
    plot::plot_conseq(&records, Some(&figures.join("conseq.svg")), false).unwrap();
    plot::plot_damage(&records, Some(&figures.join("damage.svg")), false).unwrap();
    plot::plot_surface(&records, Some(&figures.join("surface.svg")), false).unwrap();

    let geo = make_geo(&records);
    assert_eq!(geo.crs, Crs::Sjtsk);
    assert_eq!(geo.len(), 10);
    plot::plot_geo(&geo, Some(&figures.join("geo.svg")), false).unwrap();
    let clustering =
        plot::plot_cluster(&geo, &KMeans::new(2), Some(&figures.join("cluster.svg")), false).unwrap();
    assert_eq!(clustering.clusters.len(), 2);
    assert_eq!(clustering.labels.len(), 5);
    plot::plot_alcohol_map(&records, Some(&figures.join("alcohol.svg")), false).unwrap();

    for name in ["stat", "conseq", "damage", "surface", "geo", "cluster", "alcohol"] {
        let svg = std::fs::read_to_string(figures.join(format!("{}.svg", name))).unwrap();
        assert!(svg.contains("<svg"), "{}.svg is not an SVG document", name);
    }
}
