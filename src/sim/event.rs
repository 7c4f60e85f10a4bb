//! 事件 trait
//!
//! 端口收包、发送完成、pause 帧到达等都是事件；事件执行时可以继续调度新事件。

use super::simulator::Simulator;
use super::world::World;

/// 事件：可被调度执行。使用 `self: Box<Self>` 以支持 move/所有权转移（事件可以携带 packet）。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);

    /// 日志里显示的事件名
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
