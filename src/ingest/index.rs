//! Archive discovery on the data portal's index page.
//!
//! The portal publishes one archive per year once the year is closed
//! (`datagis2016.zip`, `datagis-rok-2017.zip`) and cumulative monthly
//! snapshots for the running year (`datagis-09-2020.zip`). Only the most
//! complete archive of every year is worth downloading.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Coverage of one archive within its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Period {
    /// Cumulative snapshot up to and including the month (1..=12).
    Month(u8),
    FullYear,
}

/// A recognised data archive link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    /// The link as it appeared on the page, relative to the base URL.
    pub link: String,
    /// Last path segment, used as the local file name.
    pub file_name: String,
    pub year: i32,
    pub period: Period,
}

impl ArchiveName {
    /// Recognises `datagis<YYYY>.zip`, `datagis-rok-<YYYY>.zip` and
    /// `datagis-<MM>-<YYYY>.zip`, with any path prefix.
    pub fn parse(link: &str) -> Option<Self> {
        let link = link.trim();
        let file_name = link.rsplit('/').next()?;
        let middle = file_name.strip_prefix("datagis")?.strip_suffix(".zip")?;

        let (year_part, period) = if let Some(year) = middle.strip_prefix("-rok-") {
            (year, Period::FullYear)
        } else if let Some(rest) = middle.strip_prefix('-') {
            let (month, year) = rest.split_once('-')?;
            if month.len() != 2 || !month.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let month: u8 = month.parse().ok()?;
            if !(1..=12).contains(&month) {
                return None;
            }
            (year, Period::Month(month))
        } else {
            (middle, Period::FullYear)
        };

        if year_part.len() != 4 || !year_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            link: link.to_string(),
            file_name: file_name.to_string(),
            year: year_part.parse().ok()?,
            period,
        })
    }

    fn completeness(&self, other: &Self) -> Ordering {
        self.period
            .cmp(&other.period)
            .then_with(|| other.file_name.cmp(&self.file_name))
    }
}

/// Collects the values of every `href` attribute in an HTML document.
pub fn extract_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut rest = html;

    while let Some(pos) = rest.find("href") {
        rest = &rest[pos + 4..];
        let after_eq = match rest.trim_start().strip_prefix('=') {
            Some(s) => s.trim_start(),
            None => continue,
        };
        match after_eq.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let value = &after_eq[1..];
                if let Some(end) = value.find(quote) {
                    links.push(value[..end].to_string());
                    rest = &value[end + 1..];
                }
            }
            Some(_) => {
                // unquoted: runs to whitespace or the end of the tag
                let end = after_eq
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(after_eq.len());
                if end > 0 {
                    links.push(after_eq[..end].to_string());
                }
                rest = &after_eq[end..];
            }
            None => {}
        }
    }

    links
}

/// Picks one archive per year: the full-year archive if published,
/// otherwise the latest monthly snapshot. Sorted by year.
pub fn latest_archives<'a, I>(links: I) -> Vec<ArchiveName>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut by_year: BTreeMap<i32, ArchiveName> = BTreeMap::new();

    for archive in links.into_iter().filter_map(ArchiveName::parse) {
        match by_year.get(&archive.year) {
            Some(current) if current.completeness(&archive) != Ordering::Less => {}
            _ => {
                by_year.insert(archive.year, archive);
            }
        }
    }

    by_year.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognises_all_naming_schemes() {
        let a = ArchiveName::parse("data/datagis2016.zip").unwrap();
        assert_eq!((a.year, a.period), (2016, Period::FullYear));
        assert_eq!(a.file_name, "datagis2016.zip");

        let b = ArchiveName::parse("data/datagis-rok-2019.zip").unwrap();
        assert_eq!((b.year, b.period), (2019, Period::FullYear));

        let c = ArchiveName::parse("datagis-09-2020.zip").unwrap();
        assert_eq!((c.year, c.period), (2020, Period::Month(9)));
        assert_eq!(c.link, "datagis-09-2020.zip");
    }

    #[test]
    fn test_parse_rejects_foreign_files() {
        for link in [
            "data/readme.txt",
            "data/datagis2016.tar.gz",
            "data/datagis-13-2020.zip",
            "data/datagis-1-2020.zip",
            "data/datagis-rok-20.zip",
            "data/other2016.zip",
            "",
        ] {
            assert!(ArchiveName::parse(link).is_none(), "{} should not parse", link);
        }
    }

    #[test]
    fn test_extract_links_handles_quote_styles() {
        let html = r#"
            <a href="data/datagis2016.zip">2016</a>
            <a class="btn" href = 'data/datagis-rok-2017.zip'>2017</a>
            <link rel="stylesheet" href="style.css">
            <a name="no-href">x</a>
        "#;
        assert_eq!(
            extract_links(html),
            vec!["data/datagis2016.zip", "data/datagis-rok-2017.zip", "style.css"]
        );
    }

    #[test]
    fn test_extract_links_accepts_unquoted_values() {
        let html = "<a href=data/datagis2016.zip>2016</a><a href=data/datagis-06-2017.zip class=x>06</a><a href=>-</a>";
        assert_eq!(
            extract_links(html),
            vec!["data/datagis2016.zip", "data/datagis-06-2017.zip"]
        );
    }

    #[test]
    fn test_latest_archives_prefers_full_year_then_latest_month() {
        let links = [
            "data/datagis2016.zip",
            "data/datagis-rok-2017.zip",
            "data/datagis-12-2017.zip",
            "data/datagis-01-2020.zip",
            "data/datagis-10-2020.zip",
            "data/datagis-09-2020.zip",
            "style.css",
        ];
        let chosen: Vec<_> = latest_archives(links)
            .into_iter()
            .map(|a| a.file_name)
            .collect();
        assert_eq!(
            chosen,
            vec!["datagis2016.zip", "datagis-rok-2017.zip", "datagis-10-2020.zip"]
        );
    }

    #[test]
    fn test_latest_archives_is_independent_of_link_order() {
        let forward = latest_archives(["datagis-01-2021.zip", "datagis-03-2021.zip"]);
        let backward = latest_archives(["datagis-03-2021.zip", "datagis-01-2021.zip"]);
        assert_eq!(forward, backward);
        assert_eq!(forward[0].period, Period::Month(3));
    }
}
