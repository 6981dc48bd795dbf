/// Police CSV export parsing
///
/// Every `datagis` archive holds one CSV per region. Files are encoded in
/// Windows-1250, fields are separated by `;` and usually wrapped in double
/// quotes, and decimal numbers use a comma. Missing integer codes appear
/// either as empty cells or as `XX`.
///
/// Export format: https://ehw.fit.vutbr.cz/izv/ (see the bundled
/// `vysvetlivky` document for the meaning of the p-codes)

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::WINDOWS_1250;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::model::{AccidentError, AccidentRecord, Region, Result, CSV_COLUMNS};
use crate::regions::region_info;

// ============================================================================
// Parse Results
// ============================================================================

/// Rows parsed from one regional CSV file.
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub records: Vec<AccidentRecord>,
    /// Rows that were too short or had no valid date.
    pub skipped_rows: usize,
}

// ============================================================================
// Field Helpers
// ============================================================================

fn clean(raw: &str) -> &str {
    raw.trim()
}

/// Integer code; empty cells and `XX` become 0, as do unparseable values.
fn int_field<T: FromStr + Default>(raw: &str) -> T {
    let value = clean(raw);
    if value.is_empty() || value == "XX" {
        return T::default();
    }
    value.parse().unwrap_or_default()
}

/// Decimal-comma float; `None` when empty or not a finite number.
fn coord_field(raw: &str) -> Option<f64> {
    let value = clean(raw).replace(',', ".");
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_row(fields: &StringRecord, region: Region) -> Option<AccidentRecord> {
    let date = NaiveDate::parse_from_str(clean(&fields[3]), "%Y-%m-%d").ok()?;

    Some(AccidentRecord {
        id: clean(&fields[0]).to_string(),
        road_kind: int_field(&fields[1]),
        road_number: clean(&fields[2]).to_string(),
        date,
        weekday: int_field(&fields[4]),
        time: int_field(&fields[5]),
        kind: int_field(&fields[6]),
        collision: int_field(&fields[7]),
        obstacle: int_field(&fields[8]),
        character: int_field(&fields[9]),
        fault: int_field(&fields[10]),
        alcohol: int_field(&fields[11]),
        cause: int_field(&fields[12]),
        killed: int_field(&fields[13]),
        severely_injured: int_field(&fields[14]),
        lightly_injured: int_field(&fields[15]),
        total_damage: int_field(&fields[16]),
        surface_kind: int_field(&fields[17]),
        surface_state: int_field(&fields[18]),
        weather: int_field(&fields[20]),
        visibility: int_field(&fields[21]),
        vehicles: int_field(&fields[29]),
        vehicle_kind: int_field(&fields[32]),
        vehicle_make: int_field(&fields[33]),
        vehicle_damage: int_field(&fields[41]),
        x: coord_field(&fields[47]),
        y: coord_field(&fields[48]),
        locality: int_field(&fields[63]),
        region,
    })
}

// ============================================================================
// CSV / Archive Parsing
// ============================================================================

/// Parse the raw bytes of one regional CSV file.
pub fn parse_region_csv(bytes: &[u8], region: Region) -> ParsedCsv {
    let (text, _, _had_errors) = WINDOWS_1250.decode(bytes);
    let mut parsed = ParsedCsv::default();

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    for result in reader.records() {
        let fields = match result {
            Ok(fields) => fields,
            Err(_) => {
                parsed.skipped_rows += 1;
                continue;
            }
        };
        if fields.len() < CSV_COLUMNS {
            parsed.skipped_rows += 1;
            continue; // Skip incomplete rows
        }

        match parse_row(&fields, region) {
            Some(record) => parsed.records.push(record),
            None => parsed.skipped_rows += 1,
        }
    }

    parsed
}

/// Extract and parse a region's CSV from a downloaded archive.
///
/// Returns `MissingRegionFile` when the archive has no member for the
/// region; older archives do not always cover every region.
pub fn parse_archive(path: &Path, region: Region) -> Result<ParsedCsv> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let csv_name = region_info(region).csv_name;

    let mut member = match archive.by_name(csv_name) {
        Ok(member) => member,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(AccidentError::MissingRegionFile {
                region,
                archive: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut bytes = Vec::with_capacity(member.size() as usize);
    member.read_to_end(&mut bytes)?;
    Ok(parse_region_csv(&bytes, region))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Builds one CSV line in the portal's format, with the given overrides
    /// applied to an otherwise plausible row.
    pub(crate) fn csv_line(overrides: &[(usize, &str)]) -> String {
        let mut fields: Vec<String> = (0..CSV_COLUMNS).map(|_| "\"0\"".to_string()).collect();
        fields[0] = "\"002100160001\"".to_string();
        fields[3] = "\"2016-01-01\"".to_string();
        fields[47] = "\"-598000,5\"".to_string();
        fields[48] = "\"-1160000,25\"".to_string();
        fields[63] = "\"1\"".to_string();
        for (idx, value) in overrides {
            fields[*idx] = format!("\"{}\"", value);
        }
        fields.join(";")
    }

    pub(crate) fn write_archive(path: &Path, members: &[(&str, String)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in members {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            let (encoded, _, _) = WINDOWS_1250.encode(body);
            zip.write_all(&encoded).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_parse_row_types_and_decimal_commas() {
        let line = csv_line(&[(11, "9"), (12, "205"), (13, "1"), (41, "1200"), (1, "3")]);
        let parsed = parse_region_csv(line.as_bytes(), Region::Jhm);

        assert_eq!(parsed.skipped_rows, 0);
        let r = &parsed.records[0];
        assert_eq!(r.region, Region::Jhm);
        assert_eq!(r.alcohol, 9);
        assert_eq!(r.cause, 205);
        assert_eq!(r.killed, 1);
        assert_eq!(r.vehicle_damage, 1200);
        assert_eq!(r.road_kind, 3);
        assert_eq!(r.x, Some(-598000.5));
        assert_eq!(r.y, Some(-1160000.25));
        assert_eq!(r.year(), 2016);
    }

    #[test]
    fn test_missing_codes_become_zero_and_missing_coords_none() {
        let line = csv_line(&[(11, "XX"), (12, ""), (47, ""), (48, "abc")]);
        let r = &parse_region_csv(line.as_bytes(), Region::Pha).records[0];
        assert_eq!(r.alcohol, 0);
        assert_eq!(r.cause, 0);
        assert_eq!(r.x, None);
        assert_eq!(r.y, None);
        assert!(!r.has_coordinates());
    }

    #[test]
    fn test_short_and_undated_rows_are_skipped() {
        let body = format!(
            "{}\n\"1\";\"2\"\n{}\n\n",
            csv_line(&[]),
            csv_line(&[(3, "not-a-date")])
        );
        let parsed = parse_region_csv(body.as_bytes(), Region::Pha);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped_rows, 2);
    }

    #[test]
    fn test_quoted_separator_and_escaped_quote_stay_in_their_field() {
        let line = csv_line(&[(52, "Brno; Kotlářská"), (2, "a\"\"b"), (63, "2")]);
        let parsed = parse_region_csv(line.as_bytes(), Region::Jhm);

        assert_eq!(parsed.skipped_rows, 0);
        let r = &parsed.records[0];
        assert_eq!(r.road_number, "a\"b");
        assert_eq!(r.locality, 2);
        assert_eq!(r.x, Some(-598000.5));
    }

    #[test]
    fn test_windows_1250_text_is_decoded() {
        let line = csv_line(&[(2, "Žďár")]);
        let (encoded, _, _) = WINDOWS_1250.encode(&line);
        let r = &parse_region_csv(&encoded, Region::Vys).records[0];
        assert_eq!(r.road_number, "Žďár");
    }

    #[test]
    fn test_parse_archive_reads_region_member() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datagis2016.zip");
        let body = format!("{}\n{}\n", csv_line(&[]), csv_line(&[(0, "002100160002")]));
        write_archive(&path, &[("06.csv", body), ("00.csv", csv_line(&[]))]);

        let parsed = parse_archive(&path, Region::Jhm).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].id, "002100160002");
    }

    #[test]
    fn test_parse_archive_reports_missing_region() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datagis2016.zip");
        write_archive(&path, &[("00.csv", csv_line(&[]))]);

        let err = parse_archive(&path, Region::Kvk).unwrap_err();
        assert!(matches!(
            err,
            AccidentError::MissingRegionFile { region: Region::Kvk, ref archive } if archive == "datagis2016.zip"
        ));
    }
}
