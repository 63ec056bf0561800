// src/drivers/smoothing.rs
use std::collections::VecDeque;

/// 滑动窗口：保留最近 `capacity` 个原始读数，用于计算移动平均
pub struct MovingAverage {
    buffer: VecDeque<f64>,
    capacity: usize,
}

impl MovingAverage {
    pub fn new(size: usize) -> Self {
        let capacity = size.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pushes a raw reading, evicting the oldest once the window is full.
    pub fn push(&mut self, val: f64) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(val);
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn mean(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            return None;
        }
        let sum: f64 = self.buffer.iter().sum();
        Some(sum / self.buffer.len() as f64)
    }

    /// Pushes `val` and returns what should be stored: the window mean once the
    /// window is full, the raw value before that.
    pub fn smooth(&mut self, val: f64) -> f64 {
        self.push(val);
        if self.capacity > 1 && self.is_full() {
            self.mean().unwrap_or(val)
        } else {
            val
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_until_full_then_mean_of_raw_values() {
        let mut avg = MovingAverage::new(3);
        assert_eq!(avg.smooth(1.0), 1.0);
        assert_eq!(avg.smooth(2.0), 2.0);
        assert_eq!(avg.smooth(3.0), 2.0);
        assert_eq!(avg.smooth(10.0), 5.0);
    }

    #[test]
    fn window_of_one_is_identity() {
        let mut avg = MovingAverage::new(1);
        for v in [3.5, -1.0, 8.25] {
            assert_eq!(avg.smooth(v), v);
        }
    }

    #[test]
    fn zero_window_behaves_like_one() {
        let avg = MovingAverage::new(0);
        assert_eq!(avg.capacity(), 1);
        assert_eq!(avg.mean(), None);
    }
}
