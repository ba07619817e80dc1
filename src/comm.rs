//! Point-to-point communication between cluster ranks.
//!
//! A [`Communicator`] is each worker's handle onto the cluster: it knows the
//! worker's rank, the group size, and owns the worker's mailbox. Two transfer
//! modes are offered, mirroring the classic split between in-place and
//! serialized message passing:
//!
//! - **Buffered** ([`send`](Communicator::send) / [`recv`](Communicator::recv)):
//!   elements are copied as raw bytes into a caller-owned, pre-allocated
//!   buffer. No per-call decode work on the receive side beyond one copy.
//! - **Object** ([`send_object`](Communicator::send_object) /
//!   [`recv_object`](Communicator::recv_object)): arbitrary `serde` values are
//!   encoded with `bincode` on send and decoded into a fresh value on receive,
//!   paying allocation and codec cost per call.
//!
//! Receives block until a matching message arrives. Matching is by
//! `(source, tag)` with [`ANY_SOURCE`] / [`ANY_TAG`] wildcards; non-matching
//! arrivals are parked in order and re-examined first on later receives.
//! There is no cancellation, retry, or timeout machinery.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Barrier};

use crossbeam_channel::{Receiver, Sender};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::element::{Element, ElementTag};
use crate::error::{Error, Result};
use crate::status::Status;

/// Wildcard source rank: match a message from any rank.
pub const ANY_SOURCE: i32 = -1;

/// Wildcard tag: match a message with any tag.
pub const ANY_TAG: i32 = -1;

/// Payload of a message envelope, one variant per transfer mode.
#[derive(Debug)]
pub(crate) enum Body {
    /// Raw element bytes plus the runtime element tag for type checking.
    Buffered { elem: ElementTag, bytes: Vec<u8> },
    /// A bincode-encoded value.
    Object(Vec<u8>),
}

/// One in-flight message.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) source: i32,
    pub(crate) tag: i32,
    pub(crate) body: Body,
}

impl Envelope {
    fn matches(&self, source: i32, tag: i32) -> bool {
        (source == ANY_SOURCE || self.source == source)
            && (tag == ANY_TAG || self.tag == tag)
    }
}

/// A worker's handle onto the cluster.
///
/// Handed to each worker closure by [`Cluster::run`](crate::Cluster::run).
/// Not `Sync`: a communicator belongs to exactly one worker thread.
///
/// # Example
///
/// ```
/// use rally::{Cluster, Result};
///
/// # fn main() -> Result<()> {
/// Cluster::new(2)?.run(|comm| {
///     println!("I am rank {} of {}", comm.rank(), comm.size());
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// ```
pub struct Communicator {
    rank: i32,
    /// Outboxes indexed by destination rank; `None` at our own index so the
    /// inbox disconnects once every other worker has exited.
    peers: Vec<Option<Sender<Envelope>>>,
    inbox: Receiver<Envelope>,
    /// Arrivals that did not match an in-progress receive, in arrival order.
    pending: RefCell<VecDeque<Envelope>>,
    barrier: Arc<Barrier>,
}

impl Communicator {
    pub(crate) fn new(
        rank: i32,
        peers: Vec<Option<Sender<Envelope>>>,
        inbox: Receiver<Envelope>,
        barrier: Arc<Barrier>,
    ) -> Self {
        Communicator {
            rank,
            peers,
            inbox,
            pending: RefCell::new(VecDeque::new()),
            barrier,
        }
    }

    /// Get the rank of the calling worker.
    pub fn rank(&self) -> i32 {
        self.rank
    }

    /// Get the number of workers in the cluster.
    pub fn size(&self) -> i32 {
        self.peers.len() as i32
    }

    // ========================================================================
    // Synchronization
    // ========================================================================

    /// Barrier synchronization.
    ///
    /// All workers in the cluster must call this function. No worker returns
    /// until every worker has entered the barrier.
    pub fn barrier(&self) {
        self.barrier.wait();
    }

    // ========================================================================
    // Buffered transfer
    // ========================================================================

    /// Send a slice of elements to another rank (buffered transfer).
    ///
    /// The slice is copied once into the message envelope; the receiver copies
    /// it once more into its pre-allocated buffer.
    pub fn send<T: Element>(&self, data: &[T], dest: i32, tag: i32) -> Result<()> {
        self.post(
            dest,
            Envelope {
                source: self.rank,
                tag,
                body: Body::Buffered {
                    elem: T::TAG,
                    bytes: bytemuck::cast_slice(data).to_vec(),
                },
            },
        )
    }

    /// Receive a slice of elements from another rank (buffered transfer).
    ///
    /// Blocks until a matching message arrives, then copies it in place into
    /// `buf`. Use [`ANY_SOURCE`] and/or [`ANY_TAG`] as wildcards.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Truncated`] if the message holds more elements than
    /// `buf`, with [`Error::TypeMismatch`] if the message was sent with a
    /// different element type, and with [`Error::TransferMismatch`] if the
    /// matched message was sent in object mode.
    pub fn recv<T: Element>(&self, buf: &mut [T], source: i32, tag: i32) -> Result<Status> {
        let envelope = self.match_next(source, tag)?;
        match envelope.body {
            Body::Buffered { elem, bytes } => {
                if elem != T::TAG {
                    return Err(Error::TypeMismatch {
                        expected: T::TAG,
                        got: elem,
                    });
                }
                let count = bytes.len() / std::mem::size_of::<T>();
                if count > buf.len() {
                    return Err(Error::Truncated {
                        got: count,
                        capacity: buf.len(),
                    });
                }
                // The envelope's byte vector has no alignment guarantee, so
                // copy through a byte view of the destination buffer.
                let dst: &mut [u8] = bytemuck::cast_slice_mut(&mut buf[..count]);
                dst.copy_from_slice(&bytes);
                Ok(Status {
                    source: envelope.source,
                    tag: envelope.tag,
                    count: count as i64,
                })
            }
            Body::Object(_) => Err(Error::TransferMismatch),
        }
    }

    // ========================================================================
    // Object transfer
    // ========================================================================

    /// Send a serializable value to another rank (object transfer).
    ///
    /// The value is encoded with `bincode` per call, so this mode pays codec
    /// and allocation overhead that buffered transfer does not.
    pub fn send_object<V: Serialize>(&self, value: &V, dest: i32, tag: i32) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        self.post(
            dest,
            Envelope {
                source: self.rank,
                tag,
                body: Body::Object(bytes),
            },
        )
    }

    /// Receive a serialized value from another rank (object transfer).
    ///
    /// Blocks until a matching message arrives, then decodes it into a fresh
    /// value. Use [`ANY_SOURCE`] and/or [`ANY_TAG`] as wildcards.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TransferMismatch`] if the matched message was sent
    /// in buffered mode, and with [`Error::Serialization`] if decoding fails.
    pub fn recv_object<V: DeserializeOwned>(&self, source: i32, tag: i32) -> Result<(V, Status)> {
        let envelope = self.match_next(source, tag)?;
        match envelope.body {
            Body::Object(bytes) => {
                let (value, _) =
                    bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                        .map_err(|e| Error::Serialization(e.to_string()))?;
                Ok((
                    value,
                    Status {
                        source: envelope.source,
                        tag: envelope.tag,
                        count: bytes.len() as i64,
                    },
                ))
            }
            Body::Buffered { .. } => Err(Error::TransferMismatch),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Validate a destination rank and deliver an envelope to its mailbox.
    fn post(&self, dest: i32, envelope: Envelope) -> Result<()> {
        if dest < 0 || dest >= self.size() {
            return Err(Error::InvalidRank(dest));
        }
        if dest == self.rank {
            return Err(Error::SelfMessage(dest));
        }
        match &self.peers[dest as usize] {
            Some(outbox) => outbox
                .send(envelope)
                .map_err(|_| Error::Disconnected(dest)),
            None => Err(Error::SelfMessage(dest)),
        }
    }

    /// Pull the next envelope matching `(source, tag)`, parking non-matching
    /// arrivals for later receives.
    fn match_next(&self, source: i32, tag: i32) -> Result<Envelope> {
        if source != ANY_SOURCE && (source < -1 || source >= self.size()) {
            return Err(Error::InvalidRank(source));
        }

        let mut pending = self.pending.borrow_mut();
        if let Some(idx) = pending.iter().position(|e| e.matches(source, tag)) {
            // Remove in arrival order relative to other matches.
            let envelope = pending.remove(idx).ok_or(Error::Disconnected(source))?;
            return Ok(envelope);
        }

        loop {
            let envelope = self
                .inbox
                .recv()
                .map_err(|_| Error::Disconnected(source))?;
            if envelope.matches(source, tag) {
                return Ok(envelope);
            }
            pending.push_back(envelope);
        }
    }
}
