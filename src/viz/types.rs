use serde::{Deserialize, Serialize};

use crate::queue::{DropCause, QueueEvent, QueueEventKind, QueueMode};

/// 可视化事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VizEventKind {
    /// 端口与子队列元信息（t=0 的第一条事件）
    Meta {
        bandwidth_bps: u64,
        queues: Vec<VizQueueInfo>,
    },
    /// packet 被子队列接纳
    Enqueue {
        queue: usize,
        q_bytes: u64,
        total_bytes: u64,
    },
    /// packet 被轮询选中出队
    Dequeue {
        queue: usize,
        q_bytes: u64,
        total_bytes: u64,
    },
    /// 丢包（入队拒绝或管理性丢弃）
    Drop {
        queue: usize,
        cause: DropCause,
        q_bytes: u64,
        total_bytes: u64,
    },
    /// 链路开始序列化发送
    TxStart { queue: usize, depart_ns: u64 },
    /// 子队列 pause 状态变化
    Pause { queue: usize, paused: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizQueueInfo {
    pub index: usize,
    pub mode: QueueMode,
    pub cap_bytes: u64,
    pub cap_pkts: u64,
}

/// 一个可回放的事件（JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    pub pkt_id: Option<u64>,
    pub flow_id: Option<u64>,
    pub pkt_bytes: Option<u32>,
    #[serde(flatten)]
    pub kind: VizEventKind,
}

impl VizEvent {
    pub fn from_queue_event(t_ns: u64, ev: &QueueEvent) -> Self {
        let QueueEvent {
            kind,
            pkt,
            queue,
            queue_bytes: q_bytes,
            total_bytes,
        } = *ev;
        let kind = match kind {
            QueueEventKind::Enqueue => VizEventKind::Enqueue {
                queue,
                q_bytes,
                total_bytes,
            },
            QueueEventKind::Dequeue => VizEventKind::Dequeue {
                queue,
                q_bytes,
                total_bytes,
            },
            QueueEventKind::Drop(cause) => VizEventKind::Drop {
                queue,
                cause,
                q_bytes,
                total_bytes,
            },
        };
        Self {
            t_ns,
            pkt_id: Some(pkt.id),
            flow_id: Some(pkt.flow_id),
            pkt_bytes: Some(pkt.size_bytes),
            kind,
        }
    }
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct VizLogger {
    pub events: Vec<VizEvent>,
}

impl VizLogger {
    pub fn push(&mut self, ev: VizEvent) {
        self.events.push(ev);
    }
}
