pub const DEFAULT_TIMESTAMP_STEP: f64 = 0.1;
/// Synthetic timestamps: the n-th accepted sample is stamped `n * step`.
#[derive(Clone, Debug)]
pub struct SampleClock {
    step: f64,
    ticks: u64,
}
impl Default for SampleClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_STEP)
    }
}
impl SampleClock {
    pub fn new(step: f64) -> Self {
        Self { step, ticks: 0 }
    }
    pub fn next(&mut self) -> f64 {
        self.ticks += 1;
        self.ticks as f64 * self.step
    }
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
    pub fn step(&self) -> f64 {
        self.step
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn nth_tick_is_n_times_step() {
        let mut clock = SampleClock::default();
        let stamps: Vec<f64> = (0..1000).map(|_| clock.next()).collect();
        for (i, t) in stamps.iter().enumerate() {
            assert!((t - (i + 1) as f64 * 0.1).abs() < 1e-9);
        }
        assert!(stamps.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(clock.ticks(), 1000);
    }
    #[test]
    fn alternate_step() {
        let mut clock = SampleClock::new(0.11);
        clock.next();
        assert!((clock.next() - 0.22).abs() < 1e-12);
    }
}
