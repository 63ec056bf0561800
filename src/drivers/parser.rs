use crate::drivers::framing::Record;
use crate::drivers::Rejection;
pub const DEFAULT_DELIMITER: &str = ", ";
/// Pulls the numeric reading out of a device record.
#[derive(Clone, Debug)]
pub struct RecordParser {
    delimiter: String,
    expected_field_count: usize,
    value_field_index: usize,
    sentinels: Vec<String>,
}
impl Default for RecordParser {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, 5, 4).with_sentinels(["Temperature"])
    }
}
impl RecordParser {
    pub fn new(delimiter: impl Into<String>, expected_field_count: usize, value_field_index: usize) -> Self {
        Self {
            delimiter: delimiter.into(),
            expected_field_count,
            value_field_index,
            sentinels: Vec::new(),
        }
    }
    pub fn with_sentinels<T: Into<String>>(mut self, sentinels: impl IntoIterator<Item = T>) -> Self {
        self.sentinels = sentinels.into_iter().map(Into::into).collect();
        self
    }
    pub fn parse(&self, record: &Record) -> Result<f64, Rejection> {
        let fields: Vec<&str> = record.fields(&self.delimiter).collect();
        if fields.len() != self.expected_field_count {
            return Err(Rejection::FieldCount {
                expected: self.expected_field_count,
                actual: fields.len(),
            });
        }
        let raw = fields
            .get(self.value_field_index)
            .map(|f| f.trim())
            .ok_or_else(|| Rejection::NotNumeric(String::new()))?;
        if self.sentinels.iter().any(|s| s == raw) {
            return Err(Rejection::Sentinel(raw.to_owned()));
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(Rejection::NotNumeric(raw.to_owned())),
        }
    }
}
