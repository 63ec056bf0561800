use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::drivers::SensorError;
/// Anything that can hand out raw bytes from a line-oriented device.
///
/// `read` blocks for at most `timeout` and returns an empty chunk when nothing
/// arrived; only a dead or vanished device is an error.
pub trait ByteSource {
    fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, SensorError>;
    fn flush_output(&mut self) -> Result<(), SensorError>;
    /// Must be safe to call more than once.
    fn close(&mut self);
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<Vec<u8>>,
    closed: bool,
}
impl ManualSource {
    pub fn new<C: AsRef<[u8]>>(chunks: impl IntoIterator<Item = C>) -> Self {
        Self {
            queue: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            closed: false,
        }
    }
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
impl ByteSource for ManualSource {
    fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, SensorError> {
        if self.closed {
            return Err(SensorError::SourceUnavailable("manual source closed".into()));
        }
        match self.queue.pop_front() {
            Some(chunk) => Ok(chunk),
            None => {
                // behave like an idle device: wait out the timeout
                thread::sleep(timeout);
                Ok(Vec::new())
            }
        }
    }
    fn flush_output(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
    fn close(&mut self) {
        self.closed = true;
        self.queue.clear();
    }
}
const SIM_HEADER: &str = "Millis, Status, Counts, Units, Temperature";
/// Synthetic pressure sensor: emits a header line, then readings split at random
/// byte boundaries with the odd garbage byte thrown in.
pub struct SimulatedSource {
    rng: StdRng,
    pending: VecDeque<u8>,
    line_interval: Duration,
    next_line_at: Instant,
    phase: f64,
    millis: u64,
    header_sent: bool,
    closed: bool,
}
impl SimulatedSource {
    pub fn new(line_interval: Duration) -> Self {
        Self::with_seed(line_interval, rand::thread_rng().gen())
    }
    pub fn with_seed(line_interval: Duration, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pending: VecDeque::new(),
            line_interval,
            next_line_at: Instant::now() + line_interval,
            phase: 0.0,
            millis: 0,
            header_sent: false,
            closed: false,
        }
    }
    fn next_line(&mut self) -> String {
        if !self.header_sent {
            self.header_sent = true;
            return format!("{SIM_HEADER}\r\n");
        }
        self.phase += 0.1;
        self.millis += self.line_interval.as_millis().max(1) as u64;
        let pressure = 1013.25 + 12.0 * self.phase.sin() + self.rng.gen_range(-0.5..0.5);
        let counts = (pressure * 10.0) as i64;
        format!("{}, 0x40, {}, mbar, {:.2}\r\n", self.millis, counts, pressure)
    }
}
impl ByteSource for SimulatedSource {
    fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, SensorError> {
        if self.closed {
            return Err(SensorError::SourceUnavailable("simulated device closed".into()));
        }
        if self.pending.is_empty() {
            // lines keep their cadence across reads shorter than the interval
            let wait = self.next_line_at.saturating_duration_since(Instant::now());
            if wait > timeout {
                thread::sleep(timeout);
                return Ok(Vec::new());
            }
            thread::sleep(wait);
            self.next_line_at = Instant::now() + self.line_interval;
            let line = self.next_line();
            if self.rng.gen_bool(0.02) {
                self.pending.push_back(0xFF);
            }
            self.pending.extend(line.into_bytes());
        }
        let take = self.rng.gen_range(1..=self.pending.len());
        Ok(self.pending.drain(..take).collect())
    }
    fn flush_output(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
    fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
    }
}
