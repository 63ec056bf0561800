use parking_lot::{Mutex, RwLock};
use crate::drivers::smoothing::MovingAverage;
/// One accepted reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    pub value: f64,
}
/// Copy of the series taken at one instant; both columns always have equal length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesSnapshot {
    pub timestamps: Vec<f64>,
    pub values: Vec<f64>,
}
impl SeriesSnapshot {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(&timestamp, &value)| Sample { timestamp, value })
    }
}
struct SeriesColumns {
    timestamps: Vec<f64>,
    values: Vec<f64>,
    closed: bool,
}
/// Append-only (timestamp, value) store shared between the reading worker and
/// any number of readers.
pub struct SeriesBuffer {
    columns: RwLock<SeriesColumns>,
    smoother: Mutex<MovingAverage>,
}
impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(1)
    }
}
impl SeriesBuffer {
    /// `smoothing_window <= 1` stores raw values.
    pub fn new(smoothing_window: usize) -> Self {
        Self {
            columns: RwLock::new(SeriesColumns {
                timestamps: Vec::new(),
                values: Vec::new(),
                closed: false,
            }),
            smoother: Mutex::new(MovingAverage::new(smoothing_window)),
        }
    }
    pub fn smoothing_window(&self) -> usize {
        self.smoother.lock().capacity()
    }
    /// Returns `false` (and stores nothing) once the buffer is closed.
    pub fn append(&self, timestamp: f64, value: f64) -> bool {
        let mut smoother = self.smoother.lock();
        let mut columns = self.columns.write();
        if columns.closed {
            return false;
        }
        let stored = smoother.smooth(value);
        columns.timestamps.push(timestamp);
        columns.values.push(stored);
        true
    }
    pub fn snapshot(&self) -> SeriesSnapshot {
        let columns = self.columns.read();
        SeriesSnapshot {
            timestamps: columns.timestamps.clone(),
            values: columns.values.clone(),
        }
    }
    pub fn latest(&self) -> Option<Sample> {
        let columns = self.columns.read();
        Some(Sample {
            timestamp: *columns.timestamps.last()?,
            value: *columns.values.last()?,
        })
    }
    pub fn len(&self) -> usize {
        self.columns.read().timestamps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn close(&self) {
        self.columns.write().closed = true;
    }
    pub fn is_closed(&self) -> bool {
        self.columns.read().closed
    }
}
