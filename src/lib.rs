//! # rally
//!
//! In-process rank-based message passing and a ping-pong transfer benchmark.
//!
//! This crate spins up a small fixed-size group of worker threads ("ranks"),
//! gives each one a point-to-point messaging handle, and measures the classic
//! tutorial question: how much faster is **buffered** transfer (copying
//! elements into a pre-allocated receive buffer) than **object** transfer
//! (serializing an owned value per call)?
//!
//! It provides:
//! - A [`Cluster`] that starts and joins a rank-indexed worker group
//! - A [`Communicator`] with rank/size/barrier and blocking send/receive in
//!   both buffered and serialized forms
//! - A measurement harness ([`measure_one`]) with warm-up, loop-count
//!   extrapolation, and a pre-measurement barrier
//! - An append-only [`ResultLog`] with CSV export and log-log SVG charts
//!
//! ## Transfer Modes
//!
//! | Mode         | Send side                    | Receive side                    |
//! |--------------|------------------------------|---------------------------------|
//! | `Buffered`   | one copy of the element bytes| one copy into a caller buffer   |
//! | `Serialized` | `bincode` encode per call    | `bincode` decode into new value |
//!
//! On typical payloads the buffered mode wins by a wide margin (several-fold
//! for large payloads), which is the effect the benchmark exists to show.
//!
//! ## Quick Start
//!
//! ```
//! use std::time::Duration;
//! use rally::{measure_one, Cluster, Transfer};
//!
//! fn main() -> Result<(), rally::Error> {
//!     let cluster = Cluster::new(2)?;
//!     let secs = cluster.run(|comm| {
//!         measure_one(&comm, 1024, Duration::from_millis(5), Transfer::Buffered)
//!     })?;
//!     println!("rank 0 measured {:.3e} s per call", secs[0]);
//!     Ok(())
//! }
//! ```
//!
//! ## Capabilities
//!
//! - **Generic buffered transfer**: works with any [`Element`]
//!   (`f32`, `f64`, `i32`, `i64`, `u8`, `u32`, `u64`)
//! - **Object transfer**: any `serde` value, encoded with `bincode`
//! - **Wildcard receives**: [`ANY_SOURCE`] / [`ANY_TAG`] with in-order
//!   replay of parked messages
//! - **Benchmark pipeline**: harness, result log, CSV, latency and speedup
//!   charts

#![warn(missing_docs)]
#![warn(clippy::all)]
// Allow certain pedantic lints for existing code
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

mod bench;
mod cluster;
mod comm;
mod element;
mod error;
mod plot;
mod results;
mod status;

pub use bench::{
    extrapolate_loops, measure_one, ping_pong, ping_pong_repeat, Transfer, WARMUP_LOOPS,
};
pub use cluster::Cluster;
pub use comm::{Communicator, ANY_SOURCE, ANY_TAG};
pub use element::{Element, ElementTag};
pub use error::{Error, Result};
pub use plot::{latency_chart, speedup_chart};
pub use results::{ResultLog, Sample};
pub use status::Status;
