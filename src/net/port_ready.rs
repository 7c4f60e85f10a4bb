//! 端口就绪事件（用于驱动出口缓冲出队）

use super::packet::Packet;
use super::port_world::PortWorld;
use crate::sim::{Event, Simulator, World};

/// 事件：链路完成一次序列化发送后，在 depart 时刻触发，尝试发送缓冲中的下一个 packet。
#[derive(Debug)]
pub struct PortReady {
    pub pkt: Packet,
}

impl Event for PortReady {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let PortReady { pkt } = *self;
        let w = world
            .as_any_mut()
            .downcast_mut::<PortWorld>()
            .expect("world must be PortWorld");
        let r = w.port.on_tx_complete(pkt, sim);
        w.record(r);
    }
}
