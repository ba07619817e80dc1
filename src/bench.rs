//! Ping-pong exchange and the measurement harness.
//!
//! The benchmark exchanges an `f64` payload back and forth between ranks 0
//! and 1 and reports the wall-clock cost of one full exchange. Two transfer
//! modes are compared (see [`Transfer`]): buffered in-place transfer versus
//! per-call object serialization.
//!
//! [`measure_one`] is the harness: a fixed warm-up, a linear extrapolation of
//! how many exchanges would fill the target wall-clock budget, a cluster-wide
//! barrier so nobody starts the timed section early, and a second timed run.
//! Rank 0 decides the loop count and tells rank 1, so both sides always agree
//! on how many exchanges the timed section performs.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::comm::Communicator;
use crate::error::{Error, Result};

/// Number of exchanges in the warm-up phase of [`measure_one`].
pub const WARMUP_LOOPS: u32 = 5;

// Tags used by the ping-pong exchange and the harness.
const PING_TAG: i32 = 0;
const PONG_TAG: i32 = 1;
const LOOPS_TAG: i32 = 99;

/// Which transfer mode a ping-pong exchange uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transfer {
    /// In-place transfer into a pre-allocated buffer. No per-call decode cost.
    Buffered,
    /// Per-call serialize/deserialize of the payload as an owned value.
    Serialized,
}

impl Transfer {
    /// Stable label used in result logs, CSV output, and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Transfer::Buffered => "buffered",
            Transfer::Serialized => "serialized",
        }
    }
}

impl std::fmt::Display for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One full ping-pong exchange between ranks 0 and 1.
///
/// Rank 0 sends the payload and receives the echo back into `buf`; rank 1
/// mirrors. Both sides must pass the same `transfer` mode and a payload of the
/// same length.
///
/// # Errors
///
/// Returns [`Error::PairRequired`] unless the cluster has exactly two ranks.
pub fn ping_pong(comm: &Communicator, buf: &mut [f64], transfer: Transfer) -> Result<()> {
    if comm.size() != 2 {
        return Err(Error::PairRequired(comm.size()));
    }
    match (comm.rank(), transfer) {
        (0, Transfer::Buffered) => {
            comm.send(buf, 1, PING_TAG)?;
            comm.recv(buf, 1, PONG_TAG)?;
        }
        (_, Transfer::Buffered) => {
            comm.recv(buf, 0, PING_TAG)?;
            comm.send(buf, 0, PONG_TAG)?;
        }
        (0, Transfer::Serialized) => {
            comm.send_object(&buf.to_vec(), 1, PING_TAG)?;
            let (echo, _) = comm.recv_object::<Vec<f64>>(1, PONG_TAG)?;
            copy_into(buf, &echo)?;
        }
        (_, Transfer::Serialized) => {
            let (ping, _) = comm.recv_object::<Vec<f64>>(0, PING_TAG)?;
            comm.send_object(&ping, 0, PONG_TAG)?;
            copy_into(buf, &ping)?;
        }
    }
    Ok(())
}

/// Land a received serialized payload in the caller's buffer, mirroring the
/// truncation rule of buffered receives.
fn copy_into(buf: &mut [f64], payload: &[f64]) -> Result<()> {
    if payload.len() > buf.len() {
        return Err(Error::Truncated {
            got: payload.len(),
            capacity: buf.len(),
        });
    }
    buf[..payload.len()].copy_from_slice(payload);
    Ok(())
}

/// Run `loops` ping-pong exchanges and return the elapsed wall-clock time.
pub fn ping_pong_repeat(
    comm: &Communicator,
    buf: &mut [f64],
    loops: u64,
    transfer: Transfer,
) -> Result<Duration> {
    let start = Instant::now();
    for _ in 0..loops {
        ping_pong(comm, buf, transfer)?;
    }
    Ok(start.elapsed())
}

/// Extrapolate how many exchanges would consume roughly `target`.
///
/// Returns `None` when the warm-up alone already met or exceeded the target,
/// meaning the second timed run should be skipped.
pub fn extrapolate_loops(warmup: Duration, warmup_loops: u32, target: Duration) -> Option<u64> {
    if warmup >= target {
        return None;
    }
    // Guard against a warm-up too fast for the clock to resolve.
    let per_loop = (warmup.as_secs_f64() / f64::from(warmup_loops)).max(1e-9);
    Some((target.as_secs_f64() / per_loop).ceil() as u64)
}

/// Measure the per-call duration of a ping-pong exchange.
///
/// Runs [`WARMUP_LOOPS`] warm-up exchanges of a `count`-element `f64` payload,
/// extrapolates how many exchanges would fill `target`, synchronizes the
/// cluster with a barrier, runs the timed section, and reports elapsed time
/// divided by loop count, in seconds per call.
///
/// If the warm-up alone meets or exceeds `target`, the warm-up average is
/// reported and no second timed run happens.
///
/// Both ranks must call this with the same arguments; rank 0 picks the loop
/// count and sends it to rank 1 so the timed sections agree.
///
/// # Errors
///
/// Returns [`Error::PairRequired`] unless the cluster has exactly two ranks;
/// messaging errors propagate unchanged.
pub fn measure_one(
    comm: &Communicator,
    count: usize,
    target: Duration,
    transfer: Transfer,
) -> Result<f64> {
    if comm.size() != 2 {
        return Err(Error::PairRequired(comm.size()));
    }

    let mut buf = vec![0.0f64; count];
    if comm.rank() == 0 {
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = i as f64;
        }
    }

    let warmup = ping_pong_repeat(comm, &mut buf, u64::from(WARMUP_LOOPS), transfer)?;

    // Rank 0 decides the loop count; 0 means "stop after warm-up".
    let loops = if comm.rank() == 0 {
        let loops = extrapolate_loops(warmup, WARMUP_LOOPS, target).unwrap_or(0);
        comm.send(&[loops], 1, LOOPS_TAG)?;
        loops
    } else {
        let mut msg = [0u64; 1];
        comm.recv(&mut msg, 0, LOOPS_TAG)?;
        msg[0]
    };

    if loops == 0 {
        debug!(count, %transfer, "warm-up exceeded target, skipping timed run");
        return Ok(warmup.as_secs_f64() / f64::from(WARMUP_LOOPS));
    }

    comm.barrier();
    let elapsed = ping_pong_repeat(comm, &mut buf, loops, transfer)?;
    debug!(count, %transfer, loops, secs = elapsed.as_secs_f64(), "timed run complete");
    Ok(elapsed.as_secs_f64() / loops as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;

    #[test]
    fn labels_are_stable() {
        assert_eq!(Transfer::Buffered.label(), "buffered");
        assert_eq!(Transfer::Serialized.label(), "serialized");
        assert_eq!(Transfer::Serialized.to_string(), "serialized");
    }

    #[test]
    fn extrapolation_skips_timed_run_when_warmup_meets_target() {
        let warmup = Duration::from_millis(10);
        assert_eq!(extrapolate_loops(warmup, 5, Duration::from_millis(10)), None);
        assert_eq!(extrapolate_loops(warmup, 5, Duration::from_millis(5)), None);
    }

    #[test]
    fn extrapolation_scales_linearly() {
        // 5 warm-up loops in 10ms -> 2ms per loop -> 50 loops for 100ms.
        let loops = extrapolate_loops(
            Duration::from_millis(10),
            5,
            Duration::from_millis(100),
        );
        assert_eq!(loops, Some(50));
    }

    #[test]
    fn extrapolation_survives_unmeasurably_fast_warmup() {
        let loops = extrapolate_loops(Duration::ZERO, 5, Duration::from_millis(1)).unwrap();
        assert!(loops >= 1);
        assert!(loops < u64::MAX / 2);
    }

    #[test]
    fn ping_pong_echoes_payload() {
        for transfer in [Transfer::Buffered, Transfer::Serialized] {
            let outputs = Cluster::new(2)
                .unwrap()
                .run(|comm| {
                    let mut buf = if comm.rank() == 0 {
                        vec![1.0f64, 2.0, 3.0]
                    } else {
                        vec![0.0f64; 3]
                    };
                    ping_pong(&comm, &mut buf, transfer)?;
                    Ok(buf)
                })
                .unwrap();
            // Rank 0 got its payload echoed back, rank 1 holds the payload.
            assert_eq!(outputs[0], vec![1.0, 2.0, 3.0], "{transfer}");
            assert_eq!(outputs[1], vec![1.0, 2.0, 3.0], "{transfer}");
        }
    }

    #[test]
    fn ping_pong_requires_a_pair() {
        let err = Cluster::new(3)
            .unwrap()
            .run(|comm| {
                let mut buf = [0.0f64; 1];
                ping_pong(&comm, &mut buf, Transfer::Buffered)
            })
            .unwrap_err();
        assert!(matches!(err, Error::PairRequired(3)));
    }

    #[test]
    fn measure_one_reports_positive_finite_seconds() {
        for transfer in [Transfer::Buffered, Transfer::Serialized] {
            let outputs = Cluster::new(2)
                .unwrap()
                .run(|comm| measure_one(&comm, 64, Duration::from_millis(5), transfer))
                .unwrap();
            for secs in outputs {
                assert!(secs.is_finite());
                assert!(secs > 0.0, "per-call duration must be positive");
            }
        }
    }

    #[test]
    fn measure_one_with_zero_target_uses_warmup_only() {
        // A zero target guarantees the warm-up already met it, so the
        // harness must report the warm-up average without a second run.
        let outputs = Cluster::new(2)
            .unwrap()
            .run(|comm| measure_one(&comm, 8, Duration::ZERO, Transfer::Buffered))
            .unwrap();
        assert!(outputs[0] > 0.0);
        assert!(outputs[1] > 0.0);
    }
}
