//! Serial sensor capture: rebuilds device lines from a byte stream, turns one
//! field into a timestamped sample series, and saves it as CSV.
//!
//! ```no_run
//! use serial_plotter::config::SessionConfig;
//! use serial_plotter::engine::Session;
//! use serial_plotter::recorder::CsvExporter;
//!
//! let config = SessionConfig::default();
//! let mut session = Session::connect(&config)?;
//! // ... poll session.series().snapshot() from a UI ...
//! session.stop();
//! CsvExporter::from_config(&config).export(&session.series().snapshot())?;
//! # Ok::<(), serial_plotter::drivers::SensorError>(())
//! ```
pub mod config;
pub mod drivers;
pub mod engine;
pub mod recorder;
pub mod serial;
pub mod types;
