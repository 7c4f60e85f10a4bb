//! 把队列通知接到 [`VizLogger`]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::queue::{QueueEvent, QueueTrace};
use crate::sim::SimTime;

use super::types::{VizEvent, VizLogger};

/// 订阅全部三类队列事件；时间戳取自共享的仿真时钟
pub fn attach(logger: &Rc<RefCell<VizLogger>>, clock: &Rc<Cell<SimTime>>, trace: &mut QueueTrace) {
    trace.on_enqueue(recorder(logger, clock));
    trace.on_dequeue(recorder(logger, clock));
    trace.on_drop(recorder(logger, clock));
}

fn recorder(
    logger: &Rc<RefCell<VizLogger>>,
    clock: &Rc<Cell<SimTime>>,
) -> impl FnMut(&QueueEvent) + 'static {
    let logger = Rc::clone(logger);
    let clock = Rc::clone(clock);
    move |ev| {
        logger
            .borrow_mut()
            .push(VizEvent::from_queue_event(clock.get().0, ev));
    }
}
