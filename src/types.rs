// src/types.rs
use serde::{Deserialize, Serialize};

use crate::drivers::Sample;

// 连接模式
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    Simulation,
    Hardware,
}

// 后台线程发给消费者的消息
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Started { source: String },
    Sample(Sample),
    // 设备中途断开
    SourceLost(String),
    Stopped { samples: usize, skipped: u64 },
}
