// src/drivers/mod.rs
// 采集核心：分帧 -> 解析 -> 时间戳 -> 序列缓冲
pub mod buffer;
pub mod clock;
pub mod error;
pub mod framing;
pub mod parser;
pub mod pipeline;
pub mod smoothing;
pub mod source;
// 公开导出这些模块里的结构体，方便外部调用
pub use buffer::{Sample, SeriesBuffer, SeriesSnapshot};
pub use clock::SampleClock;
pub use error::{Rejection, SensorError};
pub use framing::{FrameAssembler, Record};
pub use parser::RecordParser;
pub use pipeline::{PipelineStats, SamplePipeline};
pub use smoothing::MovingAverage;
pub use source::{ByteSource, ManualSource, SimulatedSource};
