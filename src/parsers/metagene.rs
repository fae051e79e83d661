//! Parser for ribotricer `metagene_profiles_5p.tsv`.
//!
//! Format: TSV with header `fragment_length\toffset_5p\tprofile\tphase_score\tvalid_codons`.
//! `profile` is a JSON array of per-nucleotide read counts, e.g. `[0, 3.5, 12]`.
//! Older files carry only the first three columns and no header.

use serde::Deserialize;
use std::path::Path;

use super::SampleFileParser;
use crate::error::{read_text, Result, RibopodError};
use crate::profile::{PositionSeries, SampleMetagene, SampleProfile};

const HEADER_PREFIX: &str = "fragment_length";

#[derive(Debug, Deserialize)]
struct MetageneRecord {
    fragment_length: u32,
    offset_5p: i64,
    profile: String,
    #[serde(default)]
    phase_score: Option<f64>,
    #[serde(default)]
    valid_codons: Option<u64>,
}

pub struct MetageneProfileParser;

impl SampleFileParser for MetageneProfileParser {
    type Output = SampleMetagene;

    fn format_name(&self) -> &str {
        "metagene_profiles_5p.tsv"
    }

    fn parse(&self, path: &Path) -> Result<SampleMetagene> {
        parse_metagene_profile(path)
    }
}

/// Parse a metagene profile table, indexed by fragment length.
pub fn parse_metagene_profile(path: &Path) -> Result<SampleMetagene> {
    let content = read_text(path)?;
    let has_header = content
        .lines()
        .next()
        .map(|l| l.trim_start().starts_with(HEADER_PREFIX))
        .unwrap_or(false);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_header)
        .from_reader(content.as_bytes());

    let mut metagene = SampleMetagene::default();

    if has_header {
        for result in rdr.deserialize::<MetageneRecord>() {
            let record = result.map_err(|e| RibopodError::from_csv(path, e))?;
            // header is line 1; records are counted from line 2
            let line = metagene.len() + 2;
            insert_profile(&mut metagene, record, path, line)?;
        }
    } else {
        for (idx, result) in rdr.deserialize::<(u32, i64, String)>().enumerate() {
            let (fragment_length, offset_5p, profile) =
                result.map_err(|e| RibopodError::from_csv(path, e))?;
            let record = MetageneRecord {
                fragment_length,
                offset_5p,
                profile,
                phase_score: None,
                valid_codons: None,
            };
            insert_profile(&mut metagene, record, path, idx + 1)?;
        }
    }

    if metagene.is_empty() {
        log::warn!("{}: no metagene profiles", path.display());
    } else {
        log::debug!(
            "Parsed metagene profile {}: {} fragment lengths",
            path.display(),
            metagene.len()
        );
    }

    Ok(metagene)
}

fn insert_profile(
    metagene: &mut SampleMetagene,
    record: MetageneRecord,
    path: &Path,
    line: usize,
) -> Result<()> {
    if metagene.profiles.contains_key(&record.fragment_length) {
        return Err(RibopodError::parse(
            path,
            line,
            format!("duplicate fragment length {}", record.fragment_length),
        ));
    }

    let counts = parse_profile_array(&record.profile)
        .map_err(|msg| RibopodError::parse(path, line, msg))?;

    let coverage = PositionSeries::from_profile(counts, record.offset_5p).ok_or_else(|| {
        RibopodError::parse(
            path,
            line,
            format!("offset_5p {} is out of range", record.offset_5p),
        )
    })?;
    if coverage.is_empty() {
        log::debug!(
            "{}: empty profile for fragment length {}",
            path.display(),
            record.fragment_length
        );
    }

    // NaN (pandas' missing value) and infinities count as unscored
    let phase_score = record.phase_score.filter(|s| s.is_finite());

    metagene.profiles.insert(
        record.fragment_length,
        SampleProfile {
            fragment_length: record.fragment_length,
            offset_5p: record.offset_5p,
            coverage,
            phase_score,
            valid_codons: record.valid_codons,
        },
    );
    Ok(())
}

/// Decode a profile cell as a flat JSON array of non-negative finite numbers.
///
/// Nothing else is accepted; the text is never evaluated.
pub fn parse_profile_array(text: &str) -> std::result::Result<Vec<f64>, String> {
    let values: Vec<f64> = serde_json::from_str(text.trim())
        .map_err(|e| format!("profile is not a numeric array: {}", e))?;
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(format!("profile contains invalid count {}", bad));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Fixtures;

    const HEADER: &str = "fragment_length\toffset_5p\tprofile\tphase_score\tvalid_codons\n";

    #[test]
    fn test_parse_metagene_profile() {
        let fixtures = Fixtures::new();
        let content = format!(
            "{}28\t5\t[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]\t0.81\t1500\n29\t2\t[1.5, 2.5, 3.5]\t\t\n",
            HEADER
        );
        let path = fixtures.write("s1_metagene_profiles_5p.tsv", &content);
        let metagene = parse_metagene_profile(&path).unwrap();

        assert_eq!(metagene.fragment_lengths().collect::<Vec<_>>(), vec![28, 29]);

        let p28 = metagene.get(28).unwrap();
        assert_eq!(p28.offset_5p, 5);
        assert_eq!(p28.coverage.positions, (-5..=4).collect::<Vec<i64>>());
        assert_eq!(p28.coverage.counts[5], 5.0);
        assert_eq!(p28.phase_score, Some(0.81));
        assert_eq!(p28.valid_codons, Some(1500));

        let p29 = metagene.get(29).unwrap();
        assert_eq!(p29.coverage.positions, vec![-2, -1, 0]);
        assert_eq!(p29.phase_score, None);
        assert_eq!(p29.valid_codons, None);
    }

    #[test]
    fn test_nan_phase_score_is_missing() {
        let fixtures = Fixtures::new();
        let content = format!("{}28\t0\t[1]\tnan\t0\n", HEADER);
        let path = fixtures.write("nan.tsv", &content);
        let metagene = parse_metagene_profile(&path).unwrap();
        assert_eq!(metagene.get(28).unwrap().phase_score, None);
    }

    #[test]
    fn test_infinite_phase_score_is_missing() {
        let fixtures = Fixtures::new();
        let content = format!("{}28\t0\t[1]\tinf\t0\n29\t0\t[1]\t-inf\t0\n", HEADER);
        let path = fixtures.write("inf.tsv", &content);
        let metagene = parse_metagene_profile(&path).unwrap();
        assert_eq!(metagene.get(28).unwrap().phase_score, None);
        assert_eq!(metagene.get(29).unwrap().phase_score, None);
    }

    #[test]
    fn test_extreme_offset_is_parse_error() {
        let fixtures = Fixtures::new();
        for offset in ["-9223372036854775807", "-9223372036854775808"] {
            let content = format!("{}28\t{}\t[1, 2]\t0.5\t1\n", HEADER, offset);
            let path = fixtures.write("offset.tsv", &content);
            let err = parse_metagene_profile(&path).unwrap_err();
            assert!(err.is_parse(), "offset {} accepted", offset);
        }
    }

    #[test]
    fn test_byte_order_mark_before_header() {
        let fixtures = Fixtures::new();
        let content = format!("\u{feff}{}28\t1\t[4, 5, 6]\t0.7\t10\n", HEADER);
        let path = fixtures.write("bom.tsv", &content);
        let metagene = parse_metagene_profile(&path).unwrap();
        assert_eq!(metagene.get(28).unwrap().coverage.positions, vec![-1, 0, 1]);
        assert_eq!(metagene.get(28).unwrap().phase_score, Some(0.7));
    }

    #[test]
    fn test_legacy_headerless_file() {
        let fixtures = Fixtures::new();
        let path = fixtures.write("legacy.tsv", "28\t1\t[4, 5, 6]\n30\t0\t[7]\n");
        let metagene = parse_metagene_profile(&path).unwrap();
        assert_eq!(metagene.len(), 2);
        assert_eq!(metagene.get(28).unwrap().coverage.positions, vec![-1, 0, 1]);
        assert_eq!(metagene.get(30).unwrap().phase_score, None);
    }

    #[test]
    fn test_duplicate_fragment_length_is_rejected() {
        let fixtures = Fixtures::new();
        let content = format!("{}28\t0\t[1]\t0.5\t1\n28\t0\t[2]\t0.6\t1\n", HEADER);
        let path = fixtures.write("dup.tsv", &content);
        let err = parse_metagene_profile(&path).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_executable_profile_is_rejected() {
        let fixtures = Fixtures::new();
        let content = format!("{}28\t0\t__import__('os').system('rm -rf /')\t0.5\t1\n", HEADER);
        let path = fixtures.write("evil.tsv", &content);
        let err = parse_metagene_profile(&path).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_profile_array_must_be_flat_numbers() {
        assert_eq!(parse_profile_array("[0, 1.5, 2e1]").unwrap(), vec![0.0, 1.5, 20.0]);
        assert_eq!(parse_profile_array(" [] ").unwrap(), Vec::<f64>::new());
        for bad in [
            "[1, 2",
            "[1, 'a']",
            "[[1], [2]]",
            "[1, -2]",
            "list(range(10))",
            "[1, 2] + [3]",
            "{\"a\": 1}",
            "",
        ] {
            assert!(parse_profile_array(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_non_numeric_offset_is_rejected() {
        let fixtures = Fixtures::new();
        let content = format!("{}28\tfive\t[1]\t0.5\t1\n", HEADER);
        let path = fixtures.write("offset.tsv", &content);
        assert!(parse_metagene_profile(&path).unwrap_err().is_parse());
    }
}
