// src/engine.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::SessionConfig;
use crate::drivers::{
    ByteSource, PipelineStats, SamplePipeline, SensorError, SeriesBuffer, SimulatedSource,
};
use crate::serial::SerialSource;
use crate::types::{ConnectionMode, SessionEvent};

const SIM_LINE_INTERVAL: Duration = Duration::from_millis(100);

/// One capture: a worker thread that reads the source and fills the shared series.
pub struct Session {
    series: Arc<SeriesBuffer>,
    stats: Arc<PipelineStats>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    events: Receiver<SessionEvent>,
}

impl Session {
    /// Opens the configured source and starts reading. An unopenable port ends here.
    pub fn connect(config: &SessionConfig) -> Result<Self, SensorError> {
        config.validate()?;
        match config.mode {
            ConnectionMode::Hardware => {
                let source = SerialSource::open(&config.port, config.baud_rate, config.read_timeout())?;
                Self::start(config, source, config.port.clone())
            }
            ConnectionMode::Simulation => {
                Self::start(config, SimulatedSource::new(SIM_LINE_INTERVAL), "simulation".to_string())
            }
        }
    }

    /// Starts the worker over an already-open source.
    pub fn start<S>(config: &SessionConfig, mut source: S, label: String) -> Result<Self, SensorError>
    where
        S: ByteSource + Send + 'static,
    {
        source.flush_output()?;
        let series = Arc::new(SeriesBuffer::new(config.smoothing_window));
        let pipeline = SamplePipeline::new(
            source,
            config.read_timeout(),
            config.assembler(),
            config.parser(),
            config.clock(),
            Arc::clone(&series),
        );
        let stats = pipeline.stats();
        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = channel();
        tx.send(SessionEvent::Started { source: label.clone() }).ok();
        log::info!("capture started on {label}");
        let worker = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("serial-reader".into())
                .spawn(move || run_worker(pipeline, running, tx))?
        };
        Ok(Self {
            series,
            stats,
            running,
            worker: Some(worker),
            events: rx,
        })
    }

    pub fn series(&self) -> Arc<SeriesBuffer> {
        Arc::clone(&self.series)
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// True until `stop` is called or the source goes away.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Drains whatever events the worker has posted so far.
    pub fn poll_events(&self) -> Vec<SessionEvent> {
        self.events.try_iter().collect()
    }

    /// Stops reading, closes the source and freezes the series. Safe to call
    /// repeatedly; once it returns nothing else is appended.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("serial reader thread panicked");
            }
        }
        self.series.close();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<S: ByteSource>(
    mut pipeline: SamplePipeline<S>,
    running: Arc<AtomicBool>,
    tx: Sender<SessionEvent>,
) {
    while running.load(Ordering::Acquire) {
        match pipeline.pump_once() {
            Ok(samples) => {
                for sample in samples {
                    tx.send(SessionEvent::Sample(sample)).ok();
                }
            }
            Err(e) => {
                log::error!("❌ source lost: {e}");
                tx.send(SessionEvent::SourceLost(e.to_string())).ok();
                running.store(false, Ordering::Release);
                break;
            }
        }
    }
    pipeline.close();
    let series = pipeline.series();
    series.close();
    let stats = pipeline.stats();
    log::info!(
        "🛑 capture stopped: {} samples, {} skipped",
        series.len(),
        stats.skipped()
    );
    tx.send(SessionEvent::Stopped {
        samples: series.len(),
        skipped: stats.skipped(),
    })
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{ManualSource, Sample};
    use std::time::Instant;

    fn wait_until(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "timed out waiting");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            read_timeout_ms: 5,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn worker_fills_series_from_fragmented_chunks() {
        let chunks: [&[u8]; 4] = [b"12.5, 3, x, y, 7.30\n", b"1, 2, 3, 4, 7.", b"45\n", b"a, b, c\n"];
        let source = ManualSource::new(chunks);
        let mut session = Session::start(&test_config(), source, "manual".into()).unwrap();
        let series = session.series();
        let stats = session.stats();
        wait_until(|| series.len() == 2 && stats.skipped() == 1);
        session.stop();
        let snap = series.snapshot();
        assert_eq!(snap.values, vec![7.30, 7.45]);
        assert!((snap.timestamps[1] - 0.2).abs() < 1e-12);
        let events = session.poll_events();
        assert_eq!(events.first(), Some(&SessionEvent::Started { source: "manual".into() }));
        assert!(events.contains(&SessionEvent::Sample(Sample { timestamp: 0.1, value: 7.30 })));
        assert!(matches!(
            events.last(),
            Some(SessionEvent::Stopped { samples: 2, skipped: 1 })
        ));
    }

    #[test]
    fn stop_is_idempotent_and_final() {
        let mut session =
            Session::start(&test_config(), ManualSource::new(Vec::<Vec<u8>>::new()), "idle".into()).unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_running());
        let series = session.series();
        assert!(series.is_closed());
        assert!(!series.append(0.1, 1.0));
        assert!(series.is_empty());
    }

    #[test]
    fn lost_source_ends_worker_and_keeps_data() {
        struct Flaky(u8);
        impl ByteSource for Flaky {
            fn read(&mut self, _timeout: Duration) -> Result<Vec<u8>, SensorError> {
                self.0 += 1;
                match self.0 {
                    1 => Ok(b"0, 0, 0, 0, 1.5\n".to_vec()),
                    _ => Err(SensorError::SourceUnavailable("unplugged".into())),
                }
            }
            fn flush_output(&mut self) -> Result<(), SensorError> {
                Ok(())
            }
            fn close(&mut self) {}
        }
        let mut session = Session::start(&test_config(), Flaky(0), "flaky".into()).unwrap();
        wait_until(|| !session.is_running());
        session.stop();
        assert_eq!(session.series().snapshot().values, vec![1.5]);
        assert!(session
            .poll_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::SourceLost(msg) if msg.contains("unplugged"))));
    }

    #[test]
    fn simulation_mode_produces_samples() {
        let config = SessionConfig {
            mode: ConnectionMode::Simulation,
            read_timeout_ms: 200,
            ..SessionConfig::default()
        };
        let mut session = Session::connect(&config).unwrap();
        let series = session.series();
        wait_until(|| series.len() >= 3);
        session.stop();
        let snap = series.snapshot();
        assert!(snap.timestamps.windows(2).all(|w| w[1] > w[0]));
        // the header line never makes it into the series
        assert!(session.stats().skipped() >= 1);
    }

    #[test]
    fn unopenable_port_never_starts() {
        let config = SessionConfig {
            port: "/dev/serial-plotter-no-such-port".into(),
            ..test_config()
        };
        assert!(matches!(
            Session::connect(&config),
            Err(SensorError::SourceUnavailable(_))
        ));
    }
}
