//! Parser for ribotricer `bam_summary.txt`.
//!
//! ```text
//! summary:
//! total reads: 1200
//! unique reads: 900
//! length dist:
//! 28: 300
//! 29: 450
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use super::SampleFileParser;
use crate::error::{read_text, Result, RibopodError};
use crate::profile::ReadLengthDistribution;

const SUMMARY_MARKER: &str = "summary:";
const LENGTH_DIST_MARKER: &str = "length dist:";

/// Parsed content of one bam summary file
#[derive(Debug, Clone, PartialEq)]
pub struct BamSummary {
    /// Summary counters in file order
    pub summary: Vec<(String, u64)>,
    /// Read count per fragment length
    pub length_dist: ReadLengthDistribution,
}

enum Section {
    Start,
    Summary,
    LengthDist,
}

pub struct BamSummaryParser;

impl SampleFileParser for BamSummaryParser {
    type Output = ReadLengthDistribution;

    fn format_name(&self) -> &str {
        "bam_summary.txt"
    }

    fn parse(&self, path: &Path) -> Result<ReadLengthDistribution> {
        let parsed = parse_bam_summary(path)?;
        log::debug!(
            "{}: {} summary counters",
            path.display(),
            parsed.summary.len()
        );
        Ok(parsed.length_dist)
    }
}

/// Parse a bam summary file into its summary counters and length histogram.
pub fn parse_bam_summary(path: &Path) -> Result<BamSummary> {
    let content = read_text(path)?;
    parse_bam_summary_str(&content, path)
}

fn parse_bam_summary_str(content: &str, path: &Path) -> Result<BamSummary> {
    let mut section = Section::Start;
    let mut summary: Vec<(String, u64)> = Vec::new();
    let mut length_dist = BTreeMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match section {
            Section::Start => {
                if line != SUMMARY_MARKER {
                    return Err(RibopodError::parse(
                        path,
                        line_no,
                        format!("expected '{}' header, found '{}'", SUMMARY_MARKER, line),
                    ));
                }
                section = Section::Summary;
            }
            Section::Summary => {
                if line == LENGTH_DIST_MARKER {
                    section = Section::LengthDist;
                    continue;
                }
                if line == SUMMARY_MARKER {
                    return Err(RibopodError::parse(path, line_no, "repeated 'summary:' header"));
                }
                let (key, value) = split_pair(line, path, line_no)?;
                if summary.iter().any(|(k, _)| k == key) {
                    return Err(RibopodError::parse(
                        path,
                        line_no,
                        format!("duplicate summary key '{}'", key),
                    ));
                }
                summary.push((key.to_string(), parse_count(value, path, line_no)?));
            }
            Section::LengthDist => {
                if line == SUMMARY_MARKER || line == LENGTH_DIST_MARKER {
                    return Err(RibopodError::parse(
                        path,
                        line_no,
                        format!("unexpected '{}' inside the length distribution", line),
                    ));
                }
                let (key, value) = split_pair(line, path, line_no)?;
                let length: u32 = key.parse().map_err(|_| {
                    RibopodError::parse(path, line_no, format!("invalid fragment length '{}'", key))
                })?;
                let count = parse_count(value, path, line_no)?;
                if length_dist.insert(length, count).is_some() {
                    return Err(RibopodError::parse(
                        path,
                        line_no,
                        format!("duplicate fragment length {}", length),
                    ));
                }
            }
        }
    }

    match section {
        Section::LengthDist => {}
        Section::Start => return Err(RibopodError::parse(path, 0, "empty bam summary")),
        Section::Summary => {
            return Err(RibopodError::parse(
                path,
                content.lines().count(),
                format!("missing '{}' section", LENGTH_DIST_MARKER),
            ))
        }
    }

    log::debug!(
        "Parsed bam summary {}: {} fragment lengths",
        path.display(),
        length_dist.len()
    );

    Ok(BamSummary { summary, length_dist })
}

/// Split `key: value` into exactly two fields
fn split_pair<'a>(line: &'a str, path: &Path, line_no: usize) -> Result<(&'a str, &'a str)> {
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() != 2 {
        return Err(RibopodError::parse(
            path,
            line_no,
            format!("expected 'key: value', found '{}'", line),
        ));
    }
    Ok((parts[0].trim(), parts[1].trim()))
}

fn parse_count(value: &str, path: &Path, line_no: usize) -> Result<u64> {
    value
        .parse()
        .map_err(|_| RibopodError::parse(path, line_no, format!("invalid integer '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Fixtures;

    const SUMMARY: &str = "summary:\ntotal reads: 1200\nunique reads: 900\n\nlength dist:\n30: 5\n28: 300\n29: 450\n";

    #[test]
    fn test_parse_bam_summary() {
        let fixtures = Fixtures::new();
        let path = fixtures.write("s1_bam_summary.txt", SUMMARY);
        let parsed = parse_bam_summary(&path).unwrap();

        assert_eq!(parsed.summary.len(), 2);
        assert_eq!(parsed.summary[0], ("total reads".to_string(), 1200));
        assert_eq!(parsed.summary[1], ("unique reads".to_string(), 900));
        assert_eq!(parsed.length_dist.len(), 3);
        let lengths: Vec<u32> = parsed.length_dist.keys().copied().collect();
        assert_eq!(lengths, vec![28, 29, 30]);
        assert_eq!(parsed.length_dist[&29], 450);
    }

    #[test]
    fn test_first_line_must_be_summary_marker() {
        let err = parse_bam_summary_str("length dist:\n28: 1\n", Path::new("x")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_histogram_before_separator_is_rejected() {
        // A summary block that runs to end of file never reaches the histogram.
        let err = parse_bam_summary_str("summary:\ntotal reads: 10\n28: 4\n", Path::new("x")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_malformed_pair_is_rejected() {
        for bad in [
            "summary:\ntotal reads 10\nlength dist:\n",
            "summary:\nratio: 1: 2\nlength dist:\n",
            "summary:\ntotal: ten\nlength dist:\n",
            "summary:\nlength dist:\nabc: 3\n",
            "summary:\nlength dist:\n28: -3\n",
        ] {
            let err = parse_bam_summary_str(bad, Path::new("x")).unwrap_err();
            assert!(err.is_parse(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_duplicate_length_is_rejected() {
        let err = parse_bam_summary_str("summary:\nlength dist:\n28: 1\n28: 2\n", Path::new("x")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_second_marker_is_rejected() {
        let err = parse_bam_summary_str("summary:\nlength dist:\n28: 1\nsummary:\n", Path::new("x")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_empty_histogram_is_valid() {
        let parsed = parse_bam_summary_str("summary:\ntotal reads: 0\nlength dist:\n", Path::new("x")).unwrap();
        assert!(parsed.length_dist.is_empty());
        assert_eq!(parsed.summary.len(), 1);
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = parse_bam_summary(Path::new("/nonexistent/bam_summary.txt")).unwrap_err();
        assert!(err.is_resource());
    }
}
