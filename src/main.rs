// src/main.rs
use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};

use serial_plotter::config::{SessionConfig, DEFAULT_CONFIG_PATH};
use serial_plotter::engine::Session;
use serial_plotter::recorder::CsvExporter;
use serial_plotter::types::SessionEvent;

// 入口函数
fn main() -> Result<()> {
    env_logger::init();
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = SessionConfig::load_from_path(&config_path)
        .with_context(|| format!("failed to load {config_path}"))?;

    let mut session = Session::connect(&config).context("could not start capture")?;
    match config.capture_duration() {
        Some(d) => log::info!("capturing for {:.1} s", d.as_secs_f64()),
        None => log::info!("capturing; press Enter to stop and save"),
    }

    // 回车即停止
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    if config.capture_duration().is_none() {
        let stop_tx = stop_tx.clone();
        thread::spawn(move || {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).ok();
            stop_tx.send(()).ok();
        });
    }

    let started = Instant::now();
    let series = session.series();
    let stats = session.stats();
    loop {
        match stop_rx.recv_timeout(config.refresh_interval()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        for event in session.poll_events() {
            if let SessionEvent::SourceLost(reason) = event {
                log::warn!("device went away ({reason}); saving what we have");
            }
        }
        if !session.is_running() {
            break;
        }
        if let Some(latest) = series.latest() {
            log::info!(
                "t={:.2} s  current value: {:.2}  ({} samples, {} skipped)",
                latest.timestamp,
                latest.value,
                series.len(),
                stats.skipped()
            );
        }
        if config
            .capture_duration()
            .is_some_and(|limit| started.elapsed() >= limit)
        {
            break;
        }
    }
    session.stop();
    drop(stop_tx);

    let path = CsvExporter::from_config(&config)
        .export(&series.snapshot())
        .context("failed to save capture")?;
    println!("{}", path.display());
    Ok(())
}
