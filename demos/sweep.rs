//! Mini benchmark sweep - a handful of payload sizes, both transfer modes.
//!
//! Prints a small latency table instead of writing report files; see the
//! `rally-bench` binary for the full pipeline.
//!
//! Run with: cargo run --example sweep

use std::time::Duration;

use rally::{measure_one, Cluster, Result, ResultLog, Transfer};

fn main() -> Result<()> {
    let sizes = [1usize, 64, 4096, 262_144];
    let target = Duration::from_millis(10);

    let cluster = Cluster::new(2)?;
    let logs = cluster.run(|comm| {
        let mut log = ResultLog::new();
        for &count in &sizes {
            for transfer in [Transfer::Buffered, Transfer::Serialized] {
                let secs = measure_one(&comm, count, target, transfer)?;
                if comm.rank() == 0 {
                    log.record(transfer, secs, count);
                }
            }
        }
        Ok(log)
    })?;

    let log = &logs[0];
    println!("{:>10} {:>14} {:>14}", "elements", "buffered (s)", "serialized (s)");
    for count in log.counts() {
        println!(
            "{:>10} {:>14.3e} {:>14.3e}",
            count,
            log.mean(Transfer::Buffered, count).unwrap_or(f64::NAN),
            log.mean(Transfer::Serialized, count).unwrap_or(f64::NAN),
        );
    }
    for (count, ratio) in log.speedups() {
        println!("speedup at {count} elements: {ratio:.2}x");
    }

    Ok(())
}
