//! DropTail（尾丢弃）队列
//!
//! 当队列达到容量上限时，直接丢弃新到达的 packet，已排队的 packet 不受影响。
//! 容量口径由 [`QueueMode`] 决定：按字节时 `bytes + size >= max_bytes` 即拒绝，
//! 按包数时 `len >= max_pkts` 即拒绝。

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::net::Packet;

use super::{DEFAULT_MAX_BYTES, DEFAULT_MAX_PKTS, PacketQueue, QueueMode};

#[derive(Debug)]
pub struct DropTailQueue {
    mode: QueueMode,
    max_bytes: u64,
    max_pkts: u64,
    cur_bytes: u64,
    q: VecDeque<Packet>,
}

impl Default for DropTailQueue {
    fn default() -> Self {
        Self::new(QueueMode::Bytes, DEFAULT_MAX_BYTES, DEFAULT_MAX_PKTS)
    }
}

impl DropTailQueue {
    pub fn new(mode: QueueMode, max_bytes: u64, max_pkts: u64) -> Self {
        Self {
            mode,
            max_bytes,
            max_pkts,
            cur_bytes: 0,
            q: VecDeque::new(),
        }
    }

    /// 按字节限额
    pub fn bytes_limited(max_bytes: u64) -> Self {
        Self::new(QueueMode::Bytes, max_bytes, DEFAULT_MAX_PKTS)
    }

    /// 按包数限额
    pub fn packets_limited(max_pkts: u64) -> Self {
        Self::new(QueueMode::Packets, DEFAULT_MAX_BYTES, max_pkts)
    }

    fn admits(&self, sz: u64) -> bool {
        match self.mode {
            QueueMode::Packets => (self.q.len() as u64) < self.max_pkts,
            QueueMode::Bytes => self.cur_bytes.saturating_add(sz) < self.max_bytes,
        }
    }

    fn pop_head(&mut self) -> Option<Packet> {
        let pkt = self.q.pop_front()?;
        self.cur_bytes = self.cur_bytes.saturating_sub(pkt.size());
        Some(pkt)
    }
}

impl PacketQueue for DropTailQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        let sz = pkt.size();
        if !self.admits(sz) {
            debug!(
                pkt_id = pkt.id,
                mode = ?self.mode,
                q_len = self.q.len(),
                q_bytes = self.cur_bytes,
                "队列已满，入队前丢弃"
            );
            return Err(pkt);
        }
        self.cur_bytes = self.cur_bytes.saturating_add(sz);
        self.q.push_back(pkt);
        trace!(q_len = self.q.len(), q_bytes = self.cur_bytes, "入队");
        Ok(())
    }

    fn dequeue(&mut self) -> Option<Packet> {
        let pkt = self.pop_head()?;
        trace!(pkt_id = pkt.id, q_len = self.q.len(), q_bytes = self.cur_bytes, "出队");
        Some(pkt)
    }

    fn remove(&mut self) -> Option<Packet> {
        let pkt = self.pop_head()?;
        debug!(pkt_id = pkt.id, q_len = self.q.len(), q_bytes = self.cur_bytes, "强制丢弃队头");
        Some(pkt)
    }

    fn peek(&self) -> Option<&Packet> {
        self.q.front()
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn bytes(&self) -> u64 {
        self.cur_bytes
    }

    fn mode(&self) -> QueueMode {
        self.mode
    }

    fn capacity_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn capacity_pkts(&self) -> u64 {
        self.max_pkts
    }
}
