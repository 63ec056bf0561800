use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use crate::drivers::buffer::{Sample, SeriesBuffer};
use crate::drivers::clock::SampleClock;
use crate::drivers::error::SensorError;
use crate::drivers::framing::FrameAssembler;
use crate::drivers::parser::RecordParser;
use crate::drivers::source::ByteSource;
/// Counters readable from any thread while the pipeline runs.
#[derive(Debug, Default)]
pub struct PipelineStats {
    accepted: AtomicU64,
    decode_errors: AtomicU64,
    overflows: AtomicU64,
    malformed_records: AtomicU64,
}
impl PipelineStats {
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }
    pub fn overflows(&self) -> u64 {
        self.overflows.load(Ordering::Relaxed)
    }
    pub fn malformed_records(&self) -> u64 {
        self.malformed_records.load(Ordering::Relaxed)
    }
    pub fn skipped(&self) -> u64 {
        self.decode_errors() + self.overflows() + self.malformed_records()
    }
    fn count_skip(&self, err: &SensorError) {
        let counter = match err {
            SensorError::FrameOverflow { .. } => &self.overflows,
            SensorError::MalformedRecord(_) => &self.malformed_records,
            _ => &self.decode_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
/// Bytes in, timestamped samples out.
pub struct SamplePipeline<S: ByteSource> {
    source: S,
    read_timeout: Duration,
    assembler: FrameAssembler,
    parser: RecordParser,
    clock: SampleClock,
    series: Arc<SeriesBuffer>,
    stats: Arc<PipelineStats>,
}
impl<S: ByteSource> SamplePipeline<S> {
    pub fn new(
        source: S,
        read_timeout: Duration,
        assembler: FrameAssembler,
        parser: RecordParser,
        clock: SampleClock,
        series: Arc<SeriesBuffer>,
    ) -> Self {
        Self {
            source,
            read_timeout,
            assembler,
            parser,
            clock,
            series,
            stats: Arc::new(PipelineStats::default()),
        }
    }
    pub fn series(&self) -> Arc<SeriesBuffer> {
        Arc::clone(&self.series)
    }
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }
    /// Reads one chunk from the source and ingests it. A timeout is an empty
    /// chunk, not an error.
    pub fn pump_once(&mut self) -> Result<Vec<Sample>, SensorError> {
        let chunk = self.source.read(self.read_timeout)?;
        self.ingest(&chunk)
    }
    /// Feeds raw bytes through framing and parsing. Recoverable failures are
    /// counted and skipped; anything else aborts the chunk.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<Vec<Sample>, SensorError> {
        let mut accepted = Vec::new();
        let parser = &self.parser;
        for candidate in self.assembler.feed(chunk) {
            let parsed = candidate.and_then(|record| {
                parser.parse(&record).map_err(|rejection| {
                    log::debug!("skipping {:?}: {rejection}", record.as_str());
                    SensorError::from(rejection)
                })
            });
            let value = match parsed {
                Ok(value) => value,
                Err(e) if e.is_recoverable() => {
                    if !matches!(e, SensorError::MalformedRecord(_)) {
                        log::warn!("dropping record: {e}");
                    }
                    self.stats.count_skip(&e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let timestamp = self.clock.next();
            if !self.series.append(timestamp, value) {
                log::debug!("series closed; dropping sample at t={timestamp}");
                break;
            }
            self.stats.accepted.fetch_add(1, Ordering::Relaxed);
            accepted.push(Sample { timestamp, value });
        }
        Ok(accepted)
    }
    pub fn close(&mut self) {
        self.source.close();
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::source::ManualSource;
    fn pipeline(chunks: &[&[u8]], window: usize) -> SamplePipeline<ManualSource> {
        SamplePipeline::new(
            ManualSource::new(chunks.iter().copied()),
            Duration::ZERO,
            FrameAssembler::default(),
            RecordParser::default(),
            SampleClock::default(),
            Arc::new(SeriesBuffer::new(window)),
        )
    }
    #[test]
    fn fragmented_records_become_timestamped_samples() {
        let mut p = pipeline(
            &[b"12.5, 3, x, y, 7.30\n", b"1, 2, 3, 4, 7.", b"45\n"],
            1,
        );
        let mut all = Vec::new();
        for _ in 0..3 {
            all.extend(p.pump_once().unwrap());
        }
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, 7.30);
        assert_eq!(all[1].value, 7.45);
        assert!((all[0].timestamp - 0.1).abs() < 1e-12);
        assert!((all[1].timestamp - 0.2).abs() < 1e-12);
        assert_eq!(p.series().snapshot().values, vec![7.30, 7.45]);
    }
    #[test]
    fn short_record_is_skipped_and_counted() {
        let mut p = pipeline(&[b"a, b, c\n"], 1);
        let before = p.series().len();
        assert!(p.pump_once().unwrap().is_empty());
        assert_eq!(p.series().len(), before);
        assert_eq!(p.stats().skipped(), 1);
        assert_eq!(p.stats().malformed_records(), 1);
    }
    #[test]
    fn rejected_records_do_not_advance_the_clock() {
        let mut p = pipeline(&[], 1);
        p.ingest(b"Millis, Status, Counts, Units, Temperature\r\n").unwrap();
        p.ingest(b"\xff\n1, 2, 3, 4, 5.0\n").unwrap();
        let snap = p.series().snapshot();
        assert_eq!(snap.values, vec![5.0]);
        assert!((snap.timestamps[0] - 0.1).abs() < 1e-12);
        let stats = p.stats();
        assert_eq!(stats.decode_errors(), 1);
        assert_eq!(stats.malformed_records(), 1);
        assert_eq!(stats.overflows(), 0);
        assert_eq!(stats.accepted(), 1);
    }
    #[test]
    fn overlong_line_is_counted_as_overflow_not_decode_error() {
        let mut p = SamplePipeline::new(
            ManualSource::new(Vec::<Vec<u8>>::new()),
            Duration::ZERO,
            FrameAssembler::new(16),
            RecordParser::default(),
            SampleClock::default(),
            Arc::new(SeriesBuffer::new(1)),
        );
        assert!(p.ingest(b"0123456789, 2, 3").unwrap().is_empty());
        let samples = p.ingest(b", 4, 5.5\n1, 2, 3, 4, 6.5\n").unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 6.5);
        assert!((samples[0].timestamp - 0.1).abs() < 1e-12);
        let stats = p.stats();
        assert_eq!(stats.overflows(), 1);
        assert_eq!(stats.decode_errors(), 0);
        assert_eq!(stats.malformed_records(), 0);
        assert_eq!(stats.skipped(), 1);
    }
    #[test]
    fn empty_read_is_not_an_error() {
        let mut p = pipeline(&[], 1);
        assert!(p.pump_once().unwrap().is_empty());
        assert_eq!(p.stats().skipped(), 0);
    }
    #[test]
    fn smoothing_applies_through_the_pipeline() {
        let mut p = pipeline(&[], 2);
        p.ingest(b"0, 0, 0, 0, 2.0\n0, 0, 0, 0, 4.0\n0, 0, 0, 0, 8.0\n")
            .unwrap();
        assert_eq!(p.series().snapshot().values, vec![2.0, 3.0, 6.0]);
    }
    #[test]
    fn closed_source_surfaces_as_source_unavailable() {
        let mut p = pipeline(&[b"1, 2, 3, 4, 5\n"], 1);
        p.close();
        assert!(matches!(p.pump_once(), Err(SensorError::SourceUnavailable(_))));
    }
}
