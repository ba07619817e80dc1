//! Error types for rally

use crate::element::ElementTag;
use thiserror::Error;

/// Result type for rally operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cluster, messaging, and benchmark operations
#[derive(Error, Debug)]
pub enum Error {
    /// Cluster size must be at least one worker
    #[error("Invalid cluster size: {0} (need at least 1 worker)")]
    InvalidClusterSize(usize),

    /// Destination or source rank outside the cluster
    #[error("Invalid rank: {0}")]
    InvalidRank(i32),

    /// A rank tried to message itself
    #[error("Rank {0} cannot send to itself")]
    SelfMessage(i32),

    /// Buffered message does not fit the receive buffer
    #[error("Message truncated: {got} elements arrived, receive buffer holds {capacity}")]
    Truncated {
        /// Elements in the incoming message
        got: usize,
        /// Capacity of the receive buffer in elements
        capacity: usize,
    },

    /// Buffered message element type does not match the receive buffer
    #[error("Element type mismatch: message carries {got:?}, buffer expects {expected:?}")]
    TypeMismatch {
        /// Tag the receive buffer expects
        expected: ElementTag,
        /// Tag carried by the incoming message
        got: ElementTag,
    },

    /// A buffered receive matched an object message, or vice versa
    #[error("Transfer mode mismatch: message was sent in the other transfer mode")]
    TransferMismatch,

    /// The peer's mailbox is gone (its worker already exited)
    #[error("Peer disconnected (rank {0})")]
    Disconnected(i32),

    /// Object encode/decode failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Ping-pong operations need exactly two participants
    #[error("Ping-pong requires exactly 2 ranks (cluster has {0})")]
    PairRequired(i32),

    /// A worker thread panicked instead of returning
    #[error("Worker at rank {0} panicked")]
    WorkerPanic(usize),

    /// Nothing recorded, nothing to aggregate or plot
    #[error("Result log is empty")]
    EmptyLog,

    /// Chart rendering failed
    #[error("Chart rendering failed: {0}")]
    Plot(String),

    /// I/O error while writing reports
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
