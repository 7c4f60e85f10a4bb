//! 子队列累计统计

use serde::Serialize;

/// 单个子队列的累计计数（只在调度器的入队/出队/丢弃路径中更新）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub enqueued_pkts: u64,
    pub enqueued_bytes: u64,
    pub dequeued_pkts: u64,
    pub dequeued_bytes: u64,
    /// 入队被拒绝
    pub dropped_pkts: u64,
    pub dropped_bytes: u64,
    /// 管理性强制丢弃
    pub removed_pkts: u64,
    pub removed_bytes: u64,
}
