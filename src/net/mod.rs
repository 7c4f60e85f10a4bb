//! 端口模型
//!
//! 一个出口端口由多队列出口缓冲 [`EgressQueue`](crate::queue::EgressQueue)
//! 和一条按带宽串行发送的链路组成。端口在链路空闲时从缓冲中轮询取包发送，
//! 外部送来的 pause 帧只改变对应子队列的可服务性。

mod inject_flow;
mod packet;
mod pause_frame;
mod port;
mod port_ready;
mod port_world;
mod stats;

pub use inject_flow::InjectFlow;
pub use packet::{Packet, PacketDescriptor};
pub use pause_frame::PauseFrame;
pub use port::{Classifier, EgressPort};
pub use port_ready::PortReady;
pub use port_world::PortWorld;
pub use stats::Stats;
