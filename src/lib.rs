//! 交换机/NIC 出口缓冲的包级仿真
//!
//! - [`queue`]：子队列准入（DropTail/RED）与多队列轮询出口调度
//! - [`sim`]：离散事件仿真核心
//! - [`net`]：驱动出口调度的端口模型
//! - [`scenario`]：JSON 场景装配
//! - [`viz`]：离线回放用的事件记录

pub mod net;
pub mod queue;
pub mod scenario;
pub mod sim;
pub mod viz;

#[cfg(test)]
mod test;
