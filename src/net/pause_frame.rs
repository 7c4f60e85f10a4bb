//! pause 状态变化事件
//!
//! 只消费外部给出的 (队列, 是否 pause)，不涉及 pause 帧的编解码。

use super::port_world::PortWorld;
use crate::sim::{Event, Simulator, World};

#[derive(Debug)]
pub struct PauseFrame {
    pub queue: usize,
    pub paused: bool,
}

impl Event for PauseFrame {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let PauseFrame { queue, paused } = *self;
        let w = world
            .as_any_mut()
            .downcast_mut::<PortWorld>()
            .expect("world must be PortWorld");
        let r = w.port.set_paused(queue, paused, sim);
        w.record(r);
    }
}
