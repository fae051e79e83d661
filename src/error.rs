//! Error kinds shared by the parsers, the project loaders and the registry

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RibopodError {
    /// The file exists but its content is malformed
    #[error("Failed to parse {}, line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A file named by a manifest or registry row cannot be read
    #[error("Failed to read {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The species/project selection is not listed in the dataset registry
    #[error("Unknown dataset: species '{species}', project '{srp}'")]
    UnknownDataset { species: String, srp: String },
}

pub type Result<T> = std::result::Result<T, RibopodError>;

impl RibopodError {
    pub fn parse(path: &Path, line: usize, message: impl Into<String>) -> Self {
        RibopodError::Parse {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    pub fn resource(path: &Path, source: std::io::Error) -> Self {
        RibopodError::Resource {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classify a `csv` error: I/O failures are resource errors, the rest are parse errors.
    pub fn from_csv(path: &Path, err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(source) => RibopodError::resource(path, source),
            kind => RibopodError::parse(path, line, describe_csv_error(kind)),
        }
    }

    #[cfg(test)]
    pub fn is_parse(&self) -> bool {
        matches!(self, RibopodError::Parse { .. })
    }

    #[cfg(test)]
    pub fn is_resource(&self) -> bool {
        matches!(self, RibopodError::Resource { .. })
    }
}

fn describe_csv_error(kind: csv::ErrorKind) -> String {
    match kind {
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {}", err),
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("expected {} fields, found {}", expected_len, len)
        }
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        other => format!("{:?}", other),
    }
}

/// Read a whole text file, mapping failures to [`RibopodError::Resource`].
///
/// A leading UTF-8 byte order mark is dropped.
pub fn read_text(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| RibopodError::resource(path, e))?;
    match content.strip_prefix('\u{feff}') {
        Some(rest) => Ok(rest.to_string()),
        None => Ok(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = read_text(Path::new("/nonexistent/ribopod/file.tsv")).unwrap_err();
        assert!(err.is_resource());
        assert!(!err.is_parse());
    }

    #[test]
    fn test_parse_error_message_names_line() {
        let err = RibopodError::parse(Path::new("x.tsv"), 3, "bad value");
        assert_eq!(err.to_string(), "Failed to parse x.tsv, line 3: bad value");
    }
}
