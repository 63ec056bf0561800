// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drivers::{FrameAssembler, RecordParser, SampleClock, SensorError};
use crate::types::ConnectionMode;

pub const DEFAULT_CONFIG_PATH: &str = "serial-plotter.json";

/// Everything a capture session can be tuned with. Missing keys fall back to
/// the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: ConnectionMode,
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub delimiter: String,
    pub expected_field_count: usize,
    pub value_field_index: usize,
    /// Non-numeric tokens (e.g. a repeated header) that may show up in the value field.
    pub sentinels: Vec<String>,
    pub timestamp_step: f64,
    /// 1 disables smoothing.
    pub smoothing_window: usize,
    pub max_record_bytes: usize,
    pub export_dir: PathBuf,
    pub file_prefix: String,
    /// chrono strftime pattern embedded in export file names.
    pub timestamp_format: String,
    pub csv_headers: [String; 2],
    /// Stop automatically after this many seconds; `None` waits for Enter.
    pub capture_seconds: Option<f64>,
    pub refresh_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Hardware,
            port: "COM4".to_string(),
            baud_rate: 9600,
            read_timeout_ms: 1000,
            delimiter: ", ".to_string(),
            expected_field_count: 5,
            value_field_index: 4,
            sentinels: vec!["Temperature".to_string()],
            timestamp_step: 0.1,
            smoothing_window: 1,
            max_record_bytes: 4096,
            export_dir: PathBuf::from("."),
            file_prefix: "Pressure_readings".to_string(),
            timestamp_format: "%Y-%m-%d %H-%M-%S".to_string(),
            csv_headers: ["Time".to_string(), "Pressure reading".to_string()],
            capture_seconds: None,
            refresh_ms: 500,
        }
    }
}

impl SessionConfig {
    /// Loads `path`; a missing file means defaults, a broken one is an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SensorError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| SensorError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SensorError> {
        let invalid = |msg: String| Err(SensorError::InvalidConfig(msg));
        if self.delimiter.is_empty() {
            return invalid("delimiter must not be empty".into());
        }
        if self.expected_field_count == 0 {
            return invalid("expected_field_count must be at least 1".into());
        }
        if self.value_field_index >= self.expected_field_count {
            return invalid(format!(
                "value_field_index {} is outside {} fields",
                self.value_field_index, self.expected_field_count
            ));
        }
        if !(self.timestamp_step.is_finite() && self.timestamp_step > 0.0) {
            return invalid(format!("timestamp_step must be positive, got {}", self.timestamp_step));
        }
        if self.smoothing_window == 0 {
            return invalid("smoothing_window must be at least 1".into());
        }
        if self.baud_rate == 0 {
            return invalid("baud_rate must be greater than zero".into());
        }
        if let Some(secs) = self.capture_seconds {
            if !(secs.is_finite() && secs > 0.0) {
                return invalid(format!("capture_seconds must be positive, got {secs}"));
            }
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    pub fn capture_duration(&self) -> Option<Duration> {
        self.capture_seconds.map(Duration::from_secs_f64)
    }

    pub fn parser(&self) -> RecordParser {
        RecordParser::new(
            self.delimiter.clone(),
            self.expected_field_count,
            self.value_field_index,
        )
        .with_sentinels(self.sentinels.iter().cloned())
    }

    pub fn assembler(&self) -> FrameAssembler {
        FrameAssembler::new(self.max_record_bytes)
    }

    pub fn clock(&self) -> SampleClock {
        SampleClock::new(self.timestamp_step)
    }
}
