//! Message status information.
//!
//! This module provides the [`Status`] struct returned by receive operations,
//! containing metadata about the message that was actually matched.

/// Information about a received message.
///
/// Returned by [`Communicator::recv`](crate::Communicator::recv) and
/// [`Communicator::recv_object`](crate::Communicator::recv_object). Mostly
/// interesting when receiving with [`ANY_SOURCE`](crate::ANY_SOURCE) or
/// [`ANY_TAG`](crate::ANY_TAG), where it reports which message matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Source rank of the message.
    pub source: i32,
    /// Tag of the message.
    pub tag: i32,
    /// Number of elements in the message (bytes for object messages).
    pub count: i64,
}
