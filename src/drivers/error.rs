use thiserror::Error;
/// Why a decoded record was not admitted into the series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("field count mismatch: expected {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },
    #[error("value field {0:?} is not a finite number")]
    NotNumeric(String),
    #[error("value field holds sentinel {0:?}")]
    Sentinel(String),
}
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("record is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error("no record terminator within {limit} bytes; pending data discarded")]
    FrameOverflow { limit: usize },
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] Rejection),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
impl SensorError {
    /// Framing and parsing errors are absorbed by the pipeline; everything else is fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SensorError::Decode(_) | SensorError::FrameOverflow { .. } | SensorError::MalformedRecord(_)
        )
    }
}
impl From<serialport::Error> for SensorError {
    fn from(value: serialport::Error) -> Self {
        SensorError::SourceUnavailable(value.to_string())
    }
}
impl From<csv::Error> for SensorError {
    fn from(value: csv::Error) -> Self {
        SensorError::Io(value.into())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn only_framing_and_parsing_errors_are_recoverable() {
        let malformed = SensorError::from(Rejection::Sentinel("Temperature".into()));
        assert!(malformed.is_recoverable());
        assert!(SensorError::FrameOverflow { limit: 8 }.is_recoverable());
        let io = SensorError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(!io.is_recoverable());
        assert!(!SensorError::SourceUnavailable("COM4".into()).is_recoverable());
    }
    #[test]
    fn rejection_messages_name_the_problem() {
        let err = Rejection::FieldCount {
            expected: 5,
            actual: 3,
        };
        assert_eq!(err.to_string(), "field count mismatch: expected 5, got 3");
    }
}
