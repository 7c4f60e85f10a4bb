//! 出口队列配置（JSON）
//!
//! 端口类型决定子队列数量上限：交换机最多 8 个（每个 traffic class 一个），
//! NIC 最多 128 个。所有子队列共享 `default_queue`，可按下标单独覆盖。

use serde::{Deserialize, Serialize};

use super::drop_tail::DropTailQueue;
use super::egress::{EgressQueue, MAX_QUEUES};
use super::error::EgressError;
use super::red::{DEFAULT_RED_WEIGHT, RedParams, RedQueue};
use super::{DEFAULT_MAX_BYTES, DEFAULT_MAX_PKTS, PacketQueue, QueueMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    #[default]
    Switch,
    Nic,
}

impl PortKind {
    pub fn max_queues(self) -> usize {
        match self {
            PortKind::Switch => 8,
            PortKind::Nic => MAX_QUEUES,
        }
    }
}

/// 子队列的准入策略
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discipline {
    #[default]
    DropTail,
    Red {
        min_th_bytes: u64,
        max_th_bytes: u64,
        max_p: f64,
        #[serde(default)]
        weight: Option<f64>,
        #[serde(default)]
        seed: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQueueConfig {
    #[serde(default)]
    pub mode: QueueMode,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_max_pkts")]
    pub max_pkts: u64,
    #[serde(default)]
    pub discipline: Discipline,
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_max_pkts() -> u64 {
    DEFAULT_MAX_PKTS
}

impl Default for SubQueueConfig {
    fn default() -> Self {
        Self {
            mode: QueueMode::default(),
            max_bytes: DEFAULT_MAX_BYTES,
            max_pkts: DEFAULT_MAX_PKTS,
            discipline: Discipline::default(),
        }
    }
}

impl SubQueueConfig {
    pub fn validate(&self, index: usize) -> Result<(), EgressError> {
        let invalid = |reason: &str| EgressError::InvalidQueueConfig {
            index,
            reason: reason.to_string(),
        };
        match self.mode {
            QueueMode::Bytes if self.max_bytes == 0 => return Err(invalid("max_bytes must be > 0")),
            QueueMode::Packets if self.max_pkts == 0 => return Err(invalid("max_pkts must be > 0")),
            _ => {}
        }
        if let Some(params) = self.red_params() {
            params.validate().map_err(invalid)?;
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Box<dyn PacketQueue>, EgressError> {
        let fifo = DropTailQueue::new(self.mode, self.max_bytes, self.max_pkts);
        let queue: Box<dyn PacketQueue> = match self.red_params() {
            None => Box::new(fifo),
            Some(params) => Box::new(RedQueue::new(fifo, params)?),
        };
        Ok(queue)
    }

    fn red_params(&self) -> Option<RedParams> {
        match self.discipline {
            Discipline::DropTail => None,
            Discipline::Red {
                min_th_bytes,
                max_th_bytes,
                max_p,
                weight,
                seed,
            } => Some(RedParams {
                min_th_bytes,
                max_th_bytes,
                max_p,
                weight: weight.unwrap_or(DEFAULT_RED_WEIGHT),
                seed,
            }),
        }
    }
}

/// 针对某个下标的子队列覆盖配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueOverride {
    pub index: usize,
    #[serde(flatten)]
    pub config: SubQueueConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgressConfig {
    #[serde(default)]
    pub kind: PortKind,
    pub queue_count: usize,
    #[serde(default)]
    pub default_queue: SubQueueConfig,
    #[serde(default)]
    pub overrides: Vec<QueueOverride>,
}

impl EgressConfig {
    pub fn new(kind: PortKind, queue_count: usize, default_queue: SubQueueConfig) -> Self {
        Self {
            kind,
            queue_count,
            default_queue,
            overrides: Vec::new(),
        }
    }

    /// 第 `index` 个子队列的有效配置（后出现的覆盖优先）
    pub fn queue_config(&self, index: usize) -> &SubQueueConfig {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.index == index)
            .map_or(&self.default_queue, |o| &o.config)
    }

    pub fn validate(&self) -> Result<(), EgressError> {
        if self.queue_count == 0 {
            return Err(EgressError::NoQueues);
        }
        let max = self.kind.max_queues();
        if self.queue_count > max {
            return Err(EgressError::TooManyQueues {
                count: self.queue_count,
                max,
            });
        }
        for o in &self.overrides {
            if o.index >= self.queue_count {
                return Err(EgressError::QueueIndexOutOfRange {
                    index: o.index,
                    count: self.queue_count,
                });
            }
        }
        for i in 0..self.queue_count {
            self.queue_config(i).validate(i)?;
        }
        Ok(())
    }

    pub fn build(&self) -> Result<EgressQueue, EgressError> {
        self.validate()?;
        let queues = (0..self.queue_count)
            .map(|i| self.queue_config(i).build())
            .collect::<Result<Vec<_>, _>>()?;
        EgressQueue::new(queues)
    }
}
