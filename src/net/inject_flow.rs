//! 流量注入事件

use super::port_world::PortWorld;
use crate::sim::{Event, SimTime, Simulator, World};

/// 事件：每隔 `gap` 向端口注入一个 packet，直到 `remaining` 用完
#[derive(Debug)]
pub struct InjectFlow {
    pub flow_id: u64,
    pub class: u8,
    pub pkt_bytes: u32,
    pub remaining: u64,
    pub gap: SimTime,
}

impl Event for InjectFlow {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let mut me = *self;
        if me.remaining == 0 {
            return;
        }
        let w = world
            .as_any_mut()
            .downcast_mut::<PortWorld>()
            .expect("world must be PortWorld");

        let pkt = w.make_packet(me.flow_id, me.pkt_bytes, me.class);
        let r = w.port.on_arrival(pkt, sim);
        w.record(r);

        me.remaining -= 1;
        if me.remaining > 0 {
            sim.schedule_in(me.gap, me);
        }
    }
}
