use crate::drivers::SensorError;
pub const FRAME_TERMINATOR: u8 = b'\n';
pub const DEFAULT_MAX_RECORD_BYTES: usize = 4096;
/// One complete line of device output, terminator and trailing whitespace removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    text: String,
}
impl Record {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
    pub fn as_str(&self) -> &str {
        &self.text
    }
    pub fn fields<'a>(&'a self, delimiter: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.text.split(delimiter)
    }
}
/// Rebuilds newline-terminated records from arbitrarily split byte chunks.
pub struct FrameAssembler {
    pending: Vec<u8>,
    max_record_bytes: usize,
    // inside an overlong line; drop bytes up to its terminator
    discarding: bool,
}
impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORD_BYTES)
    }
}
impl FrameAssembler {
    pub fn new(max_record_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_record_bytes: max_record_bytes.max(1),
            discarding: false,
        }
    }
    /// Appends `chunk` and returns the records it completes. Records left unread
    /// in the iterator stay pending and come out of the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Records<'_> {
        self.pending.extend_from_slice(chunk);
        Records { assembler: self }
    }
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
    /// A line longer than `max_record_bytes` yields exactly one `FrameOverflow`
    /// however it was chunked, and framing resumes after its terminator.
    fn next_candidate(&mut self) -> Option<Result<Record, SensorError>> {
        let terminator = self.pending.iter().position(|&b| b == FRAME_TERMINATOR);
        if self.discarding {
            let end = match terminator {
                Some(end) => end,
                None => {
                    self.pending.clear();
                    return None;
                }
            };
            self.pending.drain(..=end);
            self.discarding = false;
            return self.next_candidate();
        }
        let Some(end) = terminator else {
            if self.pending.len() > self.max_record_bytes {
                self.pending.clear();
                self.discarding = true;
                return Some(Err(self.overflow()));
            }
            return None;
        };
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        if line.len() > self.max_record_bytes {
            return Some(Err(self.overflow()));
        }
        Some(
            String::from_utf8(line)
                .map(|text| Record::new(text.trim_end()))
                .map_err(SensorError::from),
        )
    }
    fn overflow(&self) -> SensorError {
        SensorError::FrameOverflow {
            limit: self.max_record_bytes,
        }
    }
}
/// Lazy view over the records completed by one [`FrameAssembler::feed`] call.
pub struct Records<'a> {
    assembler: &'a mut FrameAssembler,
}
impl Iterator for Records<'_> {
    type Item = Result<Record, SensorError>;
    fn next(&mut self) -> Option<Self::Item> {
        self.assembler.next_candidate()
    }
}
