//! 端口世界实现
//!
//! 持有端口，并记录事件执行过程中出现的第一个调用契约错误。

use super::packet::Packet;
use super::port::EgressPort;
use crate::queue::EgressError;
use crate::sim::World;
use std::any::Any;
use tracing::warn;

#[derive(Debug)]
pub struct PortWorld {
    pub port: EgressPort,
    next_pkt_id: u64,
    fault: Option<EgressError>,
}

impl PortWorld {
    pub fn new(port: EgressPort) -> Self {
        Self {
            port,
            next_pkt_id: 0,
            fault: None,
        }
    }

    /// 创建数据包（id 全局递增）
    pub fn make_packet(&mut self, flow_id: u64, size_bytes: u32, class: u8) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet::new(id, flow_id, size_bytes).with_class(class)
    }

    /// 第一个契约错误（None 表示运行期间没有出错）
    pub fn fault(&self) -> Option<&EgressError> {
        self.fault.as_ref()
    }

    pub(crate) fn record(&mut self, r: Result<(), EgressError>) {
        if let Err(e) = r {
            warn!(error = %e, "端口操作违反调用契约");
            self.fault.get_or_insert(e);
        }
    }
}

impl World for PortWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
