// src/recorder.rs
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::SessionConfig;
use crate::drivers::{SensorError, SeriesSnapshot};

/// Writes a captured series as `Time,Value` CSV.
pub struct CsvExporter {
    directory: PathBuf,
    file_prefix: String,
    timestamp_format: String,
    headers: [String; 2],
}

impl CsvExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let defaults = SessionConfig::default();
        Self {
            directory: directory.into(),
            file_prefix: defaults.file_prefix,
            timestamp_format: defaults.timestamp_format,
            headers: defaults.csv_headers,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            directory: config.export_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            timestamp_format: config.timestamp_format.clone(),
            headers: config.csv_headers.clone(),
        }
    }

    pub fn with_headers(mut self, time: &str, value: &str) -> Self {
        self.headers = [time.to_string(), value.to_string()];
        self
    }

    /// Exports into the configured directory under a fresh, timestamped name.
    /// An existing file is never overwritten; a `_N` suffix is added instead.
    pub fn export(&self, series: &SeriesSnapshot) -> Result<PathBuf, SensorError> {
        fs::create_dir_all(&self.directory)?;
        let stamp = Local::now().format(&self.timestamp_format).to_string();
        let (path, file) = self.create_unique(&format!("{}_{}", self.file_prefix, stamp))?;
        self.write_rows(file, series)?;
        log::info!("💾 saved {} samples to {}", series.len(), path.display());
        Ok(path)
    }

    /// Exports to an explicit path, replacing whatever is there.
    pub fn export_to_path(&self, series: &SeriesSnapshot, path: &Path) -> Result<(), SensorError> {
        let file = File::create(path)?;
        self.write_rows(file, series)?;
        log::info!("💾 saved {} samples to {}", series.len(), path.display());
        Ok(())
    }

    fn create_unique(&self, stem: &str) -> Result<(PathBuf, File), SensorError> {
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.csv")
            } else {
                format!("{stem}_{attempt}.csv")
            };
            let path = self.directory.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write_rows(&self, file: File, series: &SeriesSnapshot) -> Result<(), SensorError> {
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));
        writer.write_record(&self.headers)?;
        for sample in series.samples() {
            writer.write_record(&[sample.timestamp.to_string(), sample.value.to_string()])?;
        }
        writer
            .into_inner()
            .map_err(|e| SensorError::Io(e.into_error()))?
            .flush()?;
        Ok(())
    }
}
