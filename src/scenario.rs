//! 场景描述与装配
//!
//! 场景文件（JSON）描述一个出口端口：缓冲配置、链路速率、分类方式、
//! 注入的流量以及外部 pause 时间窗。`install` 把它变成 [`PortWorld`]
//! 并把初始事件放进仿真器。

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::net::{Classifier, EgressPort, InjectFlow, PauseFrame, PortWorld, Stats};
use crate::queue::{EgressConfig, EgressError, PortKind, QueueMode, QueueStats, SubQueueConfig};
use crate::sim::{SimTime, Simulator};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid scenario json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid egress config: {0}")]
    Egress(#[from] EgressError),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub egress: EgressConfig,
    #[serde(default = "default_link_gbps")]
    pub link_gbps: u64,
    #[serde(default)]
    pub classifier: Classifier,
    #[serde(default)]
    pub flows: Vec<FlowSpec>,
    #[serde(default)]
    pub pauses: Vec<PauseSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSpec {
    pub flow_id: u64,
    #[serde(default)]
    pub class: u8,
    #[serde(default = "default_pkt_bytes")]
    pub pkt_bytes: u32,
    pub pkts: u64,
    /// 两个 packet 注入间隔（纳秒）
    #[serde(default)]
    pub gap_ns: u64,
    #[serde(default)]
    pub start_ns: u64,
}

/// 外部 pause 时间窗；`duration_ns` 缺省表示一直 pause 到仿真结束
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseSpec {
    pub queue: usize,
    pub at_ns: u64,
    #[serde(default)]
    pub duration_ns: Option<u64>,
}

/// 合并后的 pause 时间窗 `[start_ns, end_ns)`；`end_ns` 为 None 表示不恢复
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseWindow {
    pub queue: usize,
    pub start_ns: u64,
    pub end_ns: Option<u64>,
}

fn default_link_gbps() -> u64 {
    10
}

fn default_pkt_bytes() -> u32 {
    1500
}

pub fn load(path: &Path) -> Result<ScenarioSpec, ScenarioError> {
    let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

impl ScenarioSpec {
    /// 内置示例：3 个 traffic class 共享 10G 出口，class 1 在 20us..70us 被 pause
    pub fn demo() -> Self {
        let default_queue = SubQueueConfig {
            mode: QueueMode::Packets,
            max_pkts: 64,
            ..SubQueueConfig::default()
        };
        let flows = (0..3u8)
            .map(|class| FlowSpec {
                flow_id: class as u64 + 1,
                class,
                pkt_bytes: 1500,
                pkts: 200,
                gap_ns: 2_000,
                start_ns: 0,
            })
            .collect();
        Self {
            egress: EgressConfig::new(PortKind::Switch, 3, default_queue),
            link_gbps: 10,
            classifier: Classifier::TrafficClass,
            flows,
            pauses: vec![PauseSpec {
                queue: 1,
                at_ns: 20_000,
                duration_ns: Some(50_000),
            }],
        }
    }

    /// 覆盖所有子队列的包数上限（切换为按包数限额）
    pub fn override_queue_pkts(&mut self, max_pkts: u64) {
        for cfg in self.queue_configs_mut() {
            cfg.mode = QueueMode::Packets;
            cfg.max_pkts = max_pkts;
        }
    }

    /// 覆盖所有子队列的字节上限（切换为按字节限额）
    pub fn override_queue_bytes(&mut self, max_bytes: u64) {
        for cfg in self.queue_configs_mut() {
            cfg.mode = QueueMode::Bytes;
            cfg.max_bytes = max_bytes;
        }
    }

    fn queue_configs_mut(&mut self) -> impl Iterator<Item = &mut SubQueueConfig> {
        std::iter::once(&mut self.egress.default_queue)
            .chain(self.egress.overrides.iter_mut().map(|o| &mut o.config))
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.egress.validate()?;
        if self.link_gbps == 0 {
            return Err(ScenarioError::Invalid("link_gbps must be > 0".into()));
        }
        for p in &self.pauses {
            if p.queue >= self.egress.queue_count {
                return Err(EgressError::QueueIndexOutOfRange {
                    index: p.queue,
                    count: self.egress.queue_count,
                }
                .into());
            }
        }
        Ok(())
    }

    /// 按队列合并重叠（或首尾相接）的 pause 时间窗
    ///
    /// pause 状态是电平而不是计数，未合并时前一个窗口的恢复会提前结束后一个窗口。
    pub fn pause_windows(&self) -> Vec<PauseWindow> {
        let mut by_queue: BTreeMap<usize, Vec<(u64, Option<u64>)>> = BTreeMap::new();
        for p in &self.pauses {
            let end = p.duration_ns.map(|d| p.at_ns.saturating_add(d));
            by_queue.entry(p.queue).or_default().push((p.at_ns, end));
        }

        let mut merged = Vec::new();
        for (queue, mut spans) in by_queue {
            spans.sort_by_key(|&(start, _)| start);
            let mut cur: Option<PauseWindow> = None;
            for (start_ns, end_ns) in spans {
                match cur.as_mut() {
                    Some(w) if w.end_ns.is_none_or(|e| start_ns <= e) => {
                        w.end_ns = match (w.end_ns, end_ns) {
                            (Some(a), Some(b)) => Some(a.max(b)),
                            _ => None,
                        };
                    }
                    _ => {
                        merged.extend(cur.take());
                        cur = Some(PauseWindow {
                            queue,
                            start_ns,
                            end_ns,
                        });
                    }
                }
            }
            merged.extend(cur);
        }
        merged
    }

    /// 构建端口世界并调度初始事件
    pub fn install(&self, sim: &mut Simulator) -> Result<PortWorld, ScenarioError> {
        self.validate()?;
        let queue = self.egress.build()?;
        let bandwidth_bps = self.link_gbps.saturating_mul(1_000_000_000);
        let port = EgressPort::new(queue, bandwidth_bps, self.classifier);

        for f in &self.flows {
            sim.schedule(
                SimTime::from_nanos(f.start_ns),
                InjectFlow {
                    flow_id: f.flow_id,
                    class: f.class,
                    pkt_bytes: f.pkt_bytes,
                    remaining: f.pkts,
                    gap: SimTime::from_nanos(f.gap_ns),
                },
            );
        }
        for w in self.pause_windows() {
            sim.schedule(
                SimTime::from_nanos(w.start_ns),
                PauseFrame {
                    queue: w.queue,
                    paused: true,
                },
            );
            if let Some(end) = w.end_ns {
                sim.schedule(
                    SimTime::from_nanos(end),
                    PauseFrame {
                        queue: w.queue,
                        paused: false,
                    },
                );
            }
        }

        info!(
            queues = self.egress.queue_count,
            link_gbps = self.link_gbps,
            flows = self.flows.len(),
            pauses = self.pauses.len(),
            "📦 场景装配完成"
        );
        Ok(PortWorld::new(port))
    }
}

/// 运行结束后的汇总（可写成 JSON）
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub now_ns: u64,
    pub port: Stats,
    pub total_bytes: u64,
    pub queues: Vec<QueueSummary>,
    pub fault: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueSummary {
    pub index: usize,
    pub pkts: usize,
    pub bytes: u64,
    pub stats: QueueStats,
}

impl RunSummary {
    pub fn collect(world: &PortWorld, sim: &Simulator) -> Self {
        let eq = world.port.queue();
        let queues = (0..eq.queue_count())
            .map(|index| QueueSummary {
                index,
                pkts: eq.queue_len(index).unwrap_or_default(),
                bytes: eq.queue_bytes(index).unwrap_or_default(),
                stats: eq.stats(index).copied().unwrap_or_default(),
            })
            .collect();
        Self {
            now_ns: sim.now().0,
            port: world.port.stats,
            total_bytes: eq.total_bytes(),
            queues,
            fault: world.fault().map(|e| e.to_string()),
        }
    }
}
