//! JSON output of dashboard views

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output settings shared by every subcommand
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Destination file; `-` writes to stdout
    pub path: PathBuf,
    /// No pretty printing
    pub compact: bool,
    /// Compress with gzip
    pub gzip: bool,
}

impl OutputOptions {
    pub fn is_stdout(&self) -> bool {
        self.path.as_os_str() == "-"
    }

    /// Destination file, with `.gz` appended when compressing
    pub fn resolved_path(&self) -> PathBuf {
        let gz = self.path.extension().map(|e| e == "gz").unwrap_or(false);
        if self.gzip && !gz {
            let mut name = self.path.clone().into_os_string();
            name.push(".gz");
            PathBuf::from(name)
        } else {
            self.path.clone()
        }
    }

    /// Gzip either when asked or when the file name ends in `.gz`
    pub fn use_gzip(&self) -> bool {
        self.gzip || self.path.extension().map(|e| e == "gz").unwrap_or(false)
    }
}

/// Serialize `value` to `writer` as pretty or compact JSON
pub fn to_writer<W: Write, T: Serialize>(writer: W, value: &T, compact: bool) -> Result<()> {
    if compact {
        serde_json::to_writer(writer, value)?;
    } else {
        serde_json::to_writer_pretty(writer, value)?;
    }
    Ok(())
}

/// Write a view according to `options`
pub fn write_json<T: Serialize>(value: &T, options: &OutputOptions) -> Result<()> {
    if options.is_stdout() {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        if options.gzip {
            let mut encoder = GzEncoder::new(&mut lock, Compression::default());
            to_writer(&mut encoder, value, options.compact)?;
            encoder.finish()?;
        } else {
            to_writer(&mut lock, value, options.compact)?;
            writeln!(lock)?;
        }
        return Ok(());
    }

    let path = options.resolved_path();
    save(value, &path, options.compact, options.use_gzip())
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    log::info!("View saved to: {}", path.display());
    Ok(())
}

fn save<T: Serialize>(value: &T, path: &Path, compact: bool, gzip: bool) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    if gzip {
        let mut encoder = GzEncoder::new(&mut writer, Compression::default());
        to_writer(&mut encoder, value, compact)?;
        encoder.finish()?;
    } else {
        to_writer(&mut writer, value, compact)?;
    }
    writer.flush()?;
    Ok(())
}
