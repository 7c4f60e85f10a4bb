//! 端口统计信息

use serde::Serialize;

/// 端口统计：到达（进入出口缓冲前）与发送完成
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub arrived_pkts: u64,
    pub arrived_bytes: u64,
    pub transmitted_pkts: u64,
    pub transmitted_bytes: u64,
}
