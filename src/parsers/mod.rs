//! Parsers for per-sample ribotricer output files.
//!
//! Two formats are read per sample:
//! - `*_bam_summary.txt`: a `summary:` block followed by a `length dist:` histogram
//! - `*_metagene_profiles_5p.tsv`: one metagene profile per fragment length
//!
//! Both parsers share [`SampleFileParser`] so the project loader can drive
//! either one from a manifest pointer column.

mod bam_summary;
mod metagene;

use std::path::Path;

use crate::error::Result;

pub use bam_summary::BamSummaryParser;
pub use metagene::MetageneProfileParser;

/// Trait for parsing one sample's pipeline output file.
///
/// # Example
/// ```ignore
/// pub struct MyFormatParser;
///
/// impl SampleFileParser for MyFormatParser {
///     type Output = MyData;
///     fn format_name(&self) -> &str { "my_format.tsv" }
///     fn parse(&self, path: &Path) -> Result<MyData> { /* ... */ }
/// }
/// ```
pub trait SampleFileParser {
    type Output;

    /// Human-readable name of the format (e.g., "bam_summary.txt")
    fn format_name(&self) -> &str;

    /// Parse the file; malformed content is a parse error, an unreadable file a resource error.
    fn parse(&self, path: &Path) -> Result<Self::Output>;
}
