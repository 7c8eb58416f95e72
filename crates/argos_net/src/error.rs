//! Network error types.

use thiserror::Error;

/// Errors from frame transport between endpoints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// The other endpoint is gone; the channel will never deliver again.
    #[error("network channel closed")]
    ChannelClosed,

    /// The bounded channel is full; the frame was dropped.
    #[error("network channel full, frame dropped")]
    ChannelFull,
}

/// Result alias for transport operations.
pub type NetResult<T> = Result<T, NetError>;
