//! 出口队列错误类型
//!
//! 这里只包含调用方契约被破坏的情况；队列满导致的丢包不是错误。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EgressError {
    #[error("queue index {index} out of range (queue count {count})")]
    QueueIndexOutOfRange { index: usize, count: usize },

    #[error("pause mask has {len} entries but {count} queues are configured")]
    PauseMaskTooShort { len: usize, count: usize },

    #[error("queue count {count} exceeds the limit of {max}")]
    TooManyQueues { count: usize, max: usize },

    #[error("an egress queue needs at least one sub-queue")]
    NoQueues,

    #[error("sub-queue {index}: {reason}")]
    InvalidQueueConfig { index: usize, reason: String },

    #[error("invalid red parameters: {reason}")]
    InvalidRedParams { reason: &'static str },
}
