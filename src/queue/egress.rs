//! 多队列出口调度器（egress buffer）
//!
//! 一个端口的出口缓冲由若干并行子队列组成（交换机按 traffic class，NIC 按 QP 等），
//! 每个子队列自己负责准入（DropTail/RED...），调度器负责：
//!
//! - 按队列与总量维护字节占用（只在入队/出队/丢弃路径中增减，不做重算）
//! - 轮询（round-robin）出队：从上次服务的下一个队列开始环形扫描一圈，
//!   跳过被 pause 或为空的队列
//! - 发出入队/出队/丢包通知

use tracing::{debug, info, trace};

use crate::net::{Packet, PacketDescriptor};

use super::error::EgressError;
use super::stats::QueueStats;
use super::trace::{DropCause, QueueEvent, QueueEventKind, QueueTrace};
use super::PacketQueue;

/// 子队列数量的硬上限（NIC 模式下的最大值）
pub const MAX_QUEUES: usize = 128;

/// 入队结果：被拒绝时 packet 所有权交还调用方
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Dropped(Packet),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }

    pub fn into_dropped(self) -> Option<Packet> {
        match self {
            Admission::Accepted => None,
            Admission::Dropped(pkt) => Some(pkt),
        }
    }
}

#[derive(Debug)]
pub struct EgressQueue {
    queues: Vec<Box<dyn PacketQueue>>,
    bytes_per_queue: Vec<u64>,
    total_bytes: u64,
    /// 轮询游标；None 表示尚未出队过（首次从 0 号队列开始扫描）
    last_served: Option<usize>,
    last_enqueued: Option<usize>,
    stats: Vec<QueueStats>,
    trace: QueueTrace,
}

impl EgressQueue {
    pub fn new(queues: Vec<Box<dyn PacketQueue>>) -> Result<Self, EgressError> {
        check_count(queues.len())?;
        let bytes_per_queue: Vec<u64> = queues.iter().map(|q| q.bytes()).collect();
        let total_bytes = bytes_per_queue.iter().sum();
        let stats = vec![QueueStats::default(); queues.len()];
        Ok(Self {
            queues,
            bytes_per_queue,
            total_bytes,
            last_served: None,
            last_enqueued: None,
            stats,
            trace: QueueTrace::default(),
        })
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// 订阅入口
    pub fn trace_mut(&mut self) -> &mut QueueTrace {
        &mut self.trace
    }

    /// 把 packet 放入指定子队列；准入由子队列决定
    #[tracing::instrument(skip(self, pkt), fields(pkt_id = pkt.id, size_bytes = pkt.size_bytes))]
    pub fn enqueue(&mut self, pkt: Packet, queue: usize) -> Result<Admission, EgressError> {
        self.check_index(queue)?;
        let desc = pkt.descriptor();
        let sz = pkt.size();

        match self.queues[queue].enqueue(pkt) {
            Ok(()) => {
                self.bytes_per_queue[queue] = self.bytes_per_queue[queue].saturating_add(sz);
                self.total_bytes = self.total_bytes.saturating_add(sz);
                self.last_enqueued = Some(queue);

                let st = &mut self.stats[queue];
                st.enqueued_pkts += 1;
                st.enqueued_bytes += sz;

                self.debug_check(queue);
                debug!(
                    q_bytes = self.bytes_per_queue[queue],
                    total_bytes = self.total_bytes,
                    "📥 入队"
                );
                self.notify(QueueEventKind::Enqueue, desc, queue);
                Ok(Admission::Accepted)
            }
            Err(pkt) => {
                let st = &mut self.stats[queue];
                st.dropped_pkts += 1;
                st.dropped_bytes += sz;

                debug!(q_bytes = self.bytes_per_queue[queue], "🗑️  子队列拒绝入队");
                self.notify(QueueEventKind::Drop(DropCause::AdmissionRejected), desc, queue);
                Ok(Admission::Dropped(pkt))
            }
        }
    }

    /// 轮询出队
    ///
    /// `paused[i] == true` 的队列本次不参与服务（但仍可入队）。所有队列都被 pause
    /// 或都为空时返回 `Ok(None)`，不修改任何状态。
    #[tracing::instrument(skip(self, paused), fields(last_served = ?self.last_served))]
    pub fn dequeue_rr(&mut self, paused: &[bool]) -> Result<Option<Packet>, EgressError> {
        let count = self.queues.len();
        if paused.len() < count {
            return Err(EgressError::PauseMaskTooShort {
                len: paused.len(),
                count,
            });
        }

        let start = self.last_served.map_or(0, |last| (last + 1) % count);
        for step in 0..count {
            let i = (start + step) % count;
            if paused[i] {
                trace!(queue = i, "跳过：已 pause");
                continue;
            }
            let Some(pkt) = self.queues[i].dequeue() else {
                continue;
            };

            let sz = pkt.size();
            self.last_served = Some(i);
            self.bytes_per_queue[i] = self.bytes_per_queue[i].saturating_sub(sz);
            self.total_bytes = self.total_bytes.saturating_sub(sz);

            let st = &mut self.stats[i];
            st.dequeued_pkts += 1;
            st.dequeued_bytes += sz;

            self.debug_check(i);
            debug!(
                queue = i,
                pkt_id = pkt.id,
                q_bytes = self.bytes_per_queue[i],
                total_bytes = self.total_bytes,
                "📤 出队"
            );
            self.notify(QueueEventKind::Dequeue, pkt.descriptor(), i);
            return Ok(Some(pkt));
        }

        trace!("没有可服务的子队列");
        Ok(None)
    }

    /// 管理性丢弃指定队列的队头（AQM、老化等外部策略通过它丢包）
    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, queue: usize) -> Result<Option<Packet>, EgressError> {
        self.check_index(queue)?;
        Ok(self.remove_head(queue))
    }

    pub fn peek(&self, queue: usize) -> Result<Option<&Packet>, EgressError> {
        self.check_index(queue)?;
        Ok(self.queues[queue].peek())
    }

    /// 只读访问某个子队列（容量、模式等）
    pub fn queue(&self, queue: usize) -> Result<&dyn PacketQueue, EgressError> {
        self.check_index(queue)?;
        Ok(self.queues[queue].as_ref())
    }

    pub fn queue_bytes(&self, queue: usize) -> Result<u64, EgressError> {
        self.check_index(queue)?;
        Ok(self.bytes_per_queue[queue])
    }

    pub fn queue_len(&self, queue: usize) -> Result<usize, EgressError> {
        self.check_index(queue)?;
        Ok(self.queues[queue].len())
    }

    pub fn stats(&self, queue: usize) -> Result<&QueueStats, EgressError> {
        self.check_index(queue)?;
        Ok(&self.stats[queue])
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn last_served(&self) -> Option<usize> {
        self.last_served
    }

    pub fn last_enqueued(&self) -> Option<usize> {
        self.last_enqueued
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(|q| q.is_empty())
    }

    /// 重新配置子队列数量
    ///
    /// 扩容时用 `make_queue(index)` 创建新队列；缩容时被移除队列中的 packet
    /// 走强制丢弃路径（计数扣减 + AdministrativeRemove 通知）后交还调用方。
    /// 轮询游标会被收敛到新的合法范围内。
    pub fn resize(
        &mut self,
        new_count: usize,
        mut make_queue: impl FnMut(usize) -> Box<dyn PacketQueue>,
    ) -> Result<Vec<Packet>, EgressError> {
        check_count(new_count)?;
        let old_count = self.queues.len();

        let mut released = Vec::new();
        for idx in new_count..old_count {
            while let Some(pkt) = self.remove_head(idx) {
                released.push(pkt);
            }
        }
        self.queues.truncate(new_count);
        self.bytes_per_queue.truncate(new_count);
        self.stats.truncate(new_count);

        for idx in old_count..new_count {
            let q = make_queue(idx);
            let held = q.bytes();
            self.queues.push(q);
            self.bytes_per_queue.push(held);
            self.total_bytes = self.total_bytes.saturating_add(held);
            self.stats.push(QueueStats::default());
        }

        if let Some(last) = self.last_served {
            self.last_served = Some(last.min(new_count - 1));
        }
        if self.last_enqueued.is_some_and(|i| i >= new_count) {
            self.last_enqueued = None;
        }

        info!(
            old_count,
            new_count,
            released = released.len(),
            total_bytes = self.total_bytes,
            "🔧 子队列数量已调整"
        );
        Ok(released)
    }

    fn remove_head(&mut self, queue: usize) -> Option<Packet> {
        let pkt = self.queues[queue].remove()?;
        let sz = pkt.size();
        self.bytes_per_queue[queue] = self.bytes_per_queue[queue].saturating_sub(sz);
        self.total_bytes = self.total_bytes.saturating_sub(sz);

        let st = &mut self.stats[queue];
        st.removed_pkts += 1;
        st.removed_bytes += sz;

        self.debug_check(queue);
        debug!(queue, pkt_id = pkt.id, "🗑️  管理性丢弃");
        self.notify(
            QueueEventKind::Drop(DropCause::AdministrativeRemove),
            pkt.descriptor(),
            queue,
        );
        Some(pkt)
    }

    fn check_index(&self, index: usize) -> Result<(), EgressError> {
        if index >= self.queues.len() {
            return Err(EgressError::QueueIndexOutOfRange {
                index,
                count: self.queues.len(),
            });
        }
        Ok(())
    }

    fn notify(&mut self, kind: QueueEventKind, pkt: PacketDescriptor, queue: usize) {
        let ev = QueueEvent {
            kind,
            pkt,
            queue,
            queue_bytes: self.bytes_per_queue[queue],
            total_bytes: self.total_bytes,
        };
        self.trace.emit(&ev);
    }

    fn debug_check(&self, queue: usize) {
        debug_assert_eq!(self.bytes_per_queue[queue], self.queues[queue].bytes());
        debug_assert_eq!(self.total_bytes, self.bytes_per_queue.iter().sum::<u64>());
    }
}

fn check_count(count: usize) -> Result<(), EgressError> {
    if count == 0 {
        return Err(EgressError::NoQueues);
    }
    if count > MAX_QUEUES {
        return Err(EgressError::TooManyQueues {
            count,
            max: MAX_QUEUES,
        });
    }
    Ok(())
}
