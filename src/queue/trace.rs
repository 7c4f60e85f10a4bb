//! 队列事件通知
//!
//! 调度器在入队、出队、丢包时发出 [`QueueEvent`]。订阅者按事件种类注册，
//! 同一种类的回调按注册顺序同步调用。回调只能拿到事件的共享引用，
//! 调度器在回调期间处于可变借用中，回调无法反过来修改它。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::PacketDescriptor;

/// 丢包原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropCause {
    /// 入队时超过容量（或被 AQM 拒绝）
    AdmissionRejected,
    /// 已排队的 packet 被管理性移除
    AdministrativeRemove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEventKind {
    Enqueue,
    Dequeue,
    Drop(DropCause),
}

/// 一次队列事件；`queue_bytes` / `total_bytes` 为操作完成后的占用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEvent {
    pub kind: QueueEventKind,
    pub pkt: PacketDescriptor,
    pub queue: usize,
    pub queue_bytes: u64,
    pub total_bytes: u64,
}

pub type QueueListener = Box<dyn FnMut(&QueueEvent)>;

/// 按事件种类分组的订阅表
#[derive(Default)]
pub struct QueueTrace {
    enqueue: Vec<QueueListener>,
    dequeue: Vec<QueueListener>,
    drop: Vec<QueueListener>,
}

impl QueueTrace {
    pub fn on_enqueue(&mut self, f: impl FnMut(&QueueEvent) + 'static) {
        self.enqueue.push(Box::new(f));
    }

    pub fn on_dequeue(&mut self, f: impl FnMut(&QueueEvent) + 'static) {
        self.dequeue.push(Box::new(f));
    }

    pub fn on_drop(&mut self, f: impl FnMut(&QueueEvent) + 'static) {
        self.drop.push(Box::new(f));
    }

    pub fn listener_count(&self) -> usize {
        self.enqueue.len() + self.dequeue.len() + self.drop.len()
    }

    pub(crate) fn emit(&mut self, ev: &QueueEvent) {
        let listeners = match ev.kind {
            QueueEventKind::Enqueue => &mut self.enqueue,
            QueueEventKind::Dequeue => &mut self.dequeue,
            QueueEventKind::Drop(_) => &mut self.drop,
        };
        for f in listeners.iter_mut() {
            f(ev);
        }
    }
}

impl fmt::Debug for QueueTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueTrace")
            .field("enqueue", &self.enqueue.len())
            .field("dequeue", &self.dequeue.len())
            .field("drop", &self.drop.len())
            .finish()
    }
}
