//! 仿真核心模块
//!
//! 离散事件仿真的基础组件：仿真时间、事件、世界与仿真器。
//! 所有事件在单一逻辑线程中按 (时间, 序列号) 顺序串行执行。

mod event;
mod scheduled_event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
