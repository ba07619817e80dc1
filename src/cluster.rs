//! Worker cluster lifecycle.
//!
//! A [`Cluster`] is a fixed-size group of rank-indexed worker threads wired
//! together with per-rank mailboxes and a shared barrier. It plays the role an
//! external launcher/controller plays in distributed settings: start the
//! group, hand each worker its [`Communicator`], and tear everything down when
//! the workers return.
//!
//! The group exists only for the duration of one [`Cluster::run`] call; there
//! is no persistent daemon, no restart, and no partial-failure recovery. A
//! worker error or panic aborts the whole run.

use std::sync::{Arc, Barrier};
use std::thread;

use crossbeam_channel::unbounded;
use tracing::debug;

use crate::comm::{Communicator, Envelope};
use crate::error::{Error, Result};

/// A fixed-size group of cooperating workers.
///
/// # Example
///
/// ```
/// use rally::{Cluster, Result};
///
/// # fn main() -> Result<()> {
/// let cluster = Cluster::new(2)?;
/// let outputs = cluster.run(|comm| Ok(comm.rank() * 10))?;
/// assert_eq!(outputs, vec![0, 10]);
/// # Ok(())
/// # }
/// ```
pub struct Cluster {
    size: usize,
}

impl Cluster {
    /// Create a cluster description for `size` workers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidClusterSize`] when `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidClusterSize(size));
        }
        Ok(Cluster { size })
    }

    /// Get the number of workers this cluster starts.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Start the workers, run `f` once per rank, and join the group.
    ///
    /// Each worker thread receives its own [`Communicator`]. The returned
    /// vector holds each worker's output, indexed by rank.
    ///
    /// # Errors
    ///
    /// Returns the first failing worker's error (in rank order), or
    /// [`Error::WorkerPanic`] if a worker panicked instead of returning.
    pub fn run<T, F>(&self, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(Communicator) -> Result<T> + Send + Sync,
    {
        let size = self.size;
        let barrier = Arc::new(Barrier::new(size));

        // One mailbox per rank; every worker gets a sender to every other
        // rank, but none to itself, so an inbox disconnects once all of the
        // rank's peers have exited.
        let (senders, inboxes): (Vec<_>, Vec<_>) =
            (0..size).map(|_| unbounded::<Envelope>()).unzip();

        let comms: Vec<_> = inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| {
                let peers = senders
                    .iter()
                    .enumerate()
                    .map(|(dest, tx)| (dest != rank).then(|| tx.clone()))
                    .collect();
                Communicator::new(rank as i32, peers, inbox, Arc::clone(&barrier))
            })
            .collect();
        drop(senders);

        debug!(size, "starting worker group");
        thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| scope.spawn(|| f(comm)))
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| {
                    handle.join().map_err(|_| Error::WorkerPanic(rank))?
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn zero_workers_is_invalid() {
        assert!(matches!(
            Cluster::new(0),
            Err(Error::InvalidClusterSize(0))
        ));
    }

    #[test]
    fn outputs_are_rank_indexed() {
        let outputs = Cluster::new(4)
            .unwrap()
            .run(|comm| Ok((comm.rank(), comm.size())))
            .unwrap();
        assert_eq!(outputs, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn barrier_holds_back_early_arrivals() {
        let arrived = AtomicUsize::new(0);
        Cluster::new(4)
            .unwrap()
            .run(|comm| {
                arrived.fetch_add(1, Ordering::SeqCst);
                comm.barrier();
                // Every worker must have arrived before any proceeds.
                assert_eq!(arrived.load(Ordering::SeqCst), 4);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn worker_panic_is_reported() {
        let err = Cluster::new(2)
            .unwrap()
            .run(|comm| {
                if comm.rank() == 1 {
                    panic!("boom");
                }
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, Error::WorkerPanic(1)));
    }
}
