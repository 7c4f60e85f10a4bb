//! 可视化事件记录（用于离线回放）
//!
//! 队列的入队/出队/丢包通过 [`QueueTrace`](crate::queue::QueueTrace) 订阅写入，
//! 发送开始与 pause 变化由端口直接写入。仿真结束后整体序列化为 JSON 数组。

mod recorder;
mod types;

pub use recorder::attach;
pub use types::{VizEvent, VizEventKind, VizLogger, VizQueueInfo};
