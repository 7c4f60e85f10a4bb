//! RED（随机早期检测）队列
//!
//! 每次到达先用 EWMA 更新平均队长（字节）：低于 `min_th` 直接交给内部
//! DropTail（容量上限仍然生效）；不低于 `max_th` 丢弃；介于两者之间时
//! 丢弃概率从 0 线性增长到 `max_p`。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::net::Packet;

use super::error::EgressError;
use super::{DropTailQueue, PacketQueue, QueueMode};

pub const DEFAULT_RED_WEIGHT: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedParams {
    pub min_th_bytes: u64,
    pub max_th_bytes: u64,
    pub max_p: f64,
    /// 平均队长的 EWMA 权重
    pub weight: f64,
    pub seed: u64,
}

impl RedParams {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.min_th_bytes >= self.max_th_bytes {
            return Err("red min_th_bytes must be below max_th_bytes");
        }
        // NaN 也落在这里
        if !(self.max_p > 0.0 && self.max_p <= 1.0) {
            return Err("red max_p must be in (0, 1]");
        }
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err("red weight must be in (0, 1]");
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RedQueue {
    inner: DropTailQueue,
    params: RedParams,
    avg_bytes: f64,
    rng: StdRng,
}

impl RedQueue {
    pub fn new(inner: DropTailQueue, params: RedParams) -> Result<Self, EgressError> {
        params
            .validate()
            .map_err(|reason| EgressError::InvalidRedParams { reason })?;
        Ok(Self {
            inner,
            rng: StdRng::seed_from_u64(params.seed),
            params,
            avg_bytes: 0.0,
        })
    }

    pub fn avg_bytes(&self) -> f64 {
        self.avg_bytes
    }

    fn early_drop(&mut self) -> bool {
        let RedParams {
            min_th_bytes,
            max_th_bytes,
            max_p,
            weight,
            ..
        } = self.params;
        self.avg_bytes = (1.0 - weight) * self.avg_bytes + weight * self.inner.bytes() as f64;

        let min_th = min_th_bytes as f64;
        let max_th = max_th_bytes as f64;
        if self.avg_bytes < min_th {
            return false;
        }
        if self.avg_bytes >= max_th {
            return true;
        }
        let p = max_p * (self.avg_bytes - min_th) / (max_th - min_th);
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

impl PacketQueue for RedQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        if self.early_drop() {
            debug!(pkt_id = pkt.id, avg_bytes = self.avg_bytes, "RED early drop");
            return Err(pkt);
        }
        self.inner.enqueue(pkt)
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.inner.dequeue()
    }

    fn remove(&mut self) -> Option<Packet> {
        self.inner.remove()
    }

    fn peek(&self) -> Option<&Packet> {
        self.inner.peek()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn bytes(&self) -> u64 {
        self.inner.bytes()
    }

    fn mode(&self) -> QueueMode {
        self.inner.mode()
    }

    fn capacity_bytes(&self) -> u64 {
        self.inner.capacity_bytes()
    }

    fn capacity_pkts(&self) -> u64 {
        self.inner.capacity_pkts()
    }
}
