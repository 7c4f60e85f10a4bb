//! 出口端口
//!
//! 收包 -> 分类到子队列 -> 准入；链路空闲时按轮询 + pause 掩码取包，
//! 串行发送完成后（[`PortReady`]）再取下一个。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::packet::Packet;
use super::port_ready::PortReady;
use super::stats::Stats;
use crate::queue::{EgressError, EgressQueue, PacketQueue};
use crate::sim::{SimTime, Simulator};
use crate::viz::{self, VizEvent, VizEventKind, VizLogger, VizQueueInfo};

/// packet 到子队列的映射方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classifier {
    /// 按 traffic class（交换机：每个 PFC priority 一个队列）
    #[default]
    TrafficClass,
    /// 按 flow_id（NIC：每个 QP 一个队列）
    FlowId,
}

impl Classifier {
    pub fn classify(self, pkt: &Packet, queue_count: usize) -> usize {
        let key = match self {
            Classifier::TrafficClass => pkt.class as u64,
            Classifier::FlowId => pkt.flow_id,
        };
        (key % queue_count.max(1) as u64) as usize
    }
}

#[derive(Debug)]
pub struct EgressPort {
    bandwidth_bps: u64,
    classifier: Classifier,
    queue: EgressQueue,
    paused: Vec<bool>,
    busy: bool,
    clock: Rc<Cell<SimTime>>,
    viz: Option<Rc<RefCell<VizLogger>>>,
    pub stats: Stats,
}

impl EgressPort {
    pub fn new(queue: EgressQueue, bandwidth_bps: u64, classifier: Classifier) -> Self {
        let paused = vec![false; queue.queue_count()];
        Self {
            bandwidth_bps,
            classifier,
            queue,
            paused,
            busy: false,
            clock: Rc::new(Cell::new(SimTime::ZERO)),
            viz: None,
            stats: Stats::default(),
        }
    }

    pub fn queue(&self) -> &EgressQueue {
        &self.queue
    }

    /// 直接访问出口缓冲（订阅通知、外部 AQM 调用 remove 等）
    pub fn queue_mut(&mut self) -> &mut EgressQueue {
        &mut self.queue
    }

    pub fn paused(&self) -> &[bool] {
        &self.paused
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn bandwidth_bps(&self) -> u64 {
        self.bandwidth_bps
    }

    pub fn classifier(&self) -> Classifier {
        self.classifier
    }

    /// 开启可视化记录；写入端口与子队列元信息作为第一条事件
    pub fn enable_viz(&mut self) -> Rc<RefCell<VizLogger>> {
        if let Some(v) = &self.viz {
            return Rc::clone(v);
        }
        let logger = Rc::new(RefCell::new(VizLogger::default()));
        viz::attach(&logger, &self.clock, self.queue.trace_mut());

        let queues = (0..self.queue.queue_count())
            .filter_map(|i| self.queue.queue(i).ok().map(|q| queue_info(i, q)))
            .collect();
        logger.borrow_mut().push(VizEvent {
            t_ns: self.clock.get().0,
            pkt_id: None,
            flow_id: None,
            pkt_bytes: None,
            kind: VizEventKind::Meta {
                bandwidth_bps: self.bandwidth_bps,
                queues,
            },
        });
        self.viz = Some(Rc::clone(&logger));
        logger
    }

    pub fn viz(&self) -> Option<&Rc<RefCell<VizLogger>>> {
        self.viz.as_ref()
    }

    /// 计算传输指定字节数所需的时间
    pub fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        if self.bandwidth_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bps = self.bandwidth_bps as u128;
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (bps - 1)) / bps;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }

    /// packet 到达端口
    #[tracing::instrument(skip(self, pkt, sim), fields(pkt_id = pkt.id, flow_id = pkt.flow_id, class = pkt.class))]
    pub fn on_arrival(&mut self, pkt: Packet, sim: &mut Simulator) -> Result<(), EgressError> {
        self.clock.set(sim.now());
        self.stats.arrived_pkts += 1;
        self.stats.arrived_bytes += pkt.size();

        let queue = self.classifier.classify(&pkt, self.queue.queue_count());
        if let Some(dropped) = self.queue.enqueue(pkt, queue)?.into_dropped() {
            debug!(pkt_id = dropped.id, queue, "🗑️  出口缓冲丢包");
            return Ok(());
        }
        self.try_transmit(sim)
    }

    /// 链路完成一次序列化发送
    #[tracing::instrument(skip(self, pkt, sim), fields(pkt_id = pkt.id))]
    pub fn on_tx_complete(&mut self, pkt: Packet, sim: &mut Simulator) -> Result<(), EgressError> {
        self.clock.set(sim.now());
        self.busy = false;
        self.stats.transmitted_pkts += 1;
        self.stats.transmitted_bytes += pkt.size();
        trace!(now = ?sim.now(), "发送完成");
        self.try_transmit(sim)
    }

    /// 外部提供的 pause 状态（例如 PFC）；恢复时立即尝试发送
    #[tracing::instrument(skip(self, sim))]
    pub fn set_paused(
        &mut self,
        queue: usize,
        paused: bool,
        sim: &mut Simulator,
    ) -> Result<(), EgressError> {
        self.clock.set(sim.now());
        let count = self.paused.len();
        let slot = self
            .paused
            .get_mut(queue)
            .ok_or(EgressError::QueueIndexOutOfRange { index: queue, count })?;
        if *slot == paused {
            return Ok(());
        }
        *slot = paused;
        info!(now = ?sim.now(), "⏯️  pause 状态变化");
        self.viz_push(VizEvent {
            t_ns: sim.now().0,
            pkt_id: None,
            flow_id: None,
            pkt_bytes: None,
            kind: VizEventKind::Pause { queue, paused },
        });

        if !paused {
            self.try_transmit(sim)?;
        }
        Ok(())
    }

    /// 调整子队列数量，pause 掩码同步调整（新队列默认不 pause）
    pub fn resize_queues(
        &mut self,
        new_count: usize,
        make_queue: impl FnMut(usize) -> Box<dyn PacketQueue>,
    ) -> Result<Vec<Packet>, EgressError> {
        let released = self.queue.resize(new_count, make_queue)?;
        self.paused.resize(new_count, false);
        Ok(released)
    }

    fn try_transmit(&mut self, sim: &mut Simulator) -> Result<(), EgressError> {
        if self.busy {
            return Ok(());
        }
        let Some(pkt) = self.queue.dequeue_rr(&self.paused)? else {
            trace!("没有可发送的 packet");
            return Ok(());
        };
        let queue = self.queue.last_served().unwrap_or_default();
        let depart = sim.now().after(self.tx_time(pkt.size_bytes));
        self.busy = true;

        debug!(pkt_id = pkt.id, queue, depart = ?depart, "🚀 开始发送");
        self.viz_push(VizEvent {
            t_ns: sim.now().0,
            pkt_id: Some(pkt.id),
            flow_id: Some(pkt.flow_id),
            pkt_bytes: Some(pkt.size_bytes),
            kind: VizEventKind::TxStart {
                queue,
                depart_ns: depart.0,
            },
        });
        sim.schedule(depart, PortReady { pkt });
        Ok(())
    }

    fn viz_push(&mut self, ev: VizEvent) {
        if let Some(v) = &self.viz {
            v.borrow_mut().push(ev);
        }
    }
}

fn queue_info(index: usize, q: &dyn PacketQueue) -> VizQueueInfo {
    VizQueueInfo {
        index,
        mode: q.mode(),
        cap_bytes: q.capacity_bytes(),
        cap_pkts: q.capacity_pkts(),
    }
}
