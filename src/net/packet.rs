//! 数据包类型
//!
//! 队列层只关心 packet 的字节长度与身份（id/flow），其余头部信息都不在这里建模。

use serde::{Deserialize, Serialize};

/// 网络数据包
///
/// 所有权语义：同一时刻只归属一个结构（调用方 / 某个子队列）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: u64,
    pub flow_id: u64,
    pub size_bytes: u32,
    /// 流量类别（PFC priority），由端口分类器映射到子队列
    pub class: u8,
}

impl Packet {
    pub fn new(id: u64, flow_id: u64, size_bytes: u32) -> Self {
        Self {
            id,
            flow_id,
            size_bytes,
            class: 0,
        }
    }

    pub fn with_class(mut self, class: u8) -> Self {
        self.class = class;
        self
    }

    pub fn size(&self) -> u64 {
        self.size_bytes as u64
    }

    /// 用于通知/可视化的只读描述
    pub fn descriptor(&self) -> PacketDescriptor {
        PacketDescriptor {
            id: self.id,
            flow_id: self.flow_id,
            size_bytes: self.size_bytes,
        }
    }
}

/// packet 的轻量描述，随队列事件一起发出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketDescriptor {
    pub id: u64,
    pub flow_id: u64,
    pub size_bytes: u32,
}
