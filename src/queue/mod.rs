//! 队列策略（Queue disciplines）与出口调度
//!
//! - [`PacketQueue`]：单个子队列的能力集合（enqueue/dequeue/remove/peek）
//! - [`DropTailQueue`]：按字节或按包数限额的尾丢弃 FIFO
//! - [`RedQueue`]：在 DropTail 之上叠加随机早期检测（RED）
//! - [`EgressQueue`]：持有多个子队列，按轮询 + pause 掩码出队

use serde::{Deserialize, Serialize};

use crate::net::Packet;

mod config;
mod drop_tail;
mod egress;
mod error;
mod red;
mod stats;
pub mod trace;

pub use config::{Discipline, EgressConfig, PortKind, QueueOverride, SubQueueConfig};
pub use drop_tail::DropTailQueue;
pub use egress::{Admission, EgressQueue, MAX_QUEUES};
pub use error::EgressError;
pub use red::{RedParams, RedQueue};
pub use stats::QueueStats;
pub use trace::{DropCause, QueueEvent, QueueEventKind, QueueTrace};

/// 默认包数上限
pub const DEFAULT_MAX_PKTS: u64 = 100;
/// 默认字节上限：30000 个最大 IP 包
pub const DEFAULT_MAX_BYTES: u64 = 30_000 * 65_535;

/// 队列容量口径：按字节还是按包数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    #[default]
    Bytes,
    Packets,
}

/// Packet 队列抽象
///
/// 子队列只负责准入与 FIFO 存取，丢包时只打日志；入队/出队/丢包的结构化通知
/// 统一由 [`EgressQueue`] 在调用子队列之后发出。
pub trait PacketQueue: std::fmt::Debug {
    /// 入队：成功返回 Ok；若被丢弃则返回 Err(pkt)，所有权交还调用方
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet>;
    /// 出队：按队列策略返回下一个 packet
    fn dequeue(&mut self) -> Option<Packet>;
    /// 强制丢弃队头（AQM/老化等管理性丢包），机制与 dequeue 相同
    fn remove(&mut self) -> Option<Packet>;
    /// 查看队头，不转移所有权
    fn peek(&self) -> Option<&Packet>;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn bytes(&self) -> u64;
    fn mode(&self) -> QueueMode;
    fn capacity_bytes(&self) -> u64;
    fn capacity_pkts(&self) -> u64;
}
