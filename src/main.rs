//! Benchmark driver: sweeps payload sizes over both transfer modes and
//! renders the report files.

use std::fs::{create_dir_all, File};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rally::{latency_chart, measure_one, speedup_chart, Cluster, ResultLog, Transfer};

#[derive(Parser, Debug)]
#[command(name = "rally-bench")]
#[command(about = "Ping-pong latency benchmark: buffered vs serialized transfer")]
struct Args {
    /// Smallest payload size in elements.
    #[arg(long, default_value_t = 1)]
    min_count: usize,

    /// Largest payload size in elements.
    #[arg(long, default_value_t = 1 << 20)]
    max_count: usize,

    /// Geometric step between payload sizes.
    #[arg(long, default_value_t = 4)]
    factor: usize,

    /// Wall-clock budget per measurement, in milliseconds.
    #[arg(long, default_value_t = 25)]
    target_ms: u64,

    /// Number of trials per (transfer, size) cell.
    #[arg(long, default_value_t = 1)]
    repeats: usize,

    /// Directory for the CSV file and the charts.
    #[arg(long, default_value = "reports")]
    out: PathBuf,

    /// Skip chart rendering, write only the CSV.
    #[arg(long, default_value_t = false)]
    no_charts: bool,
}

fn sweep_sizes(min: usize, max: usize, factor: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut count = min;
    while count <= max {
        sizes.push(count);
        match count.checked_mul(factor) {
            Some(next) => count = next,
            None => break,
        }
    }
    sizes
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.min_count >= 1, "--min-count must be at least 1");
    anyhow::ensure!(args.factor >= 2, "--factor must be at least 2");
    anyhow::ensure!(args.repeats >= 1, "--repeats must be at least 1");
    anyhow::ensure!(
        args.min_count <= args.max_count,
        "--min-count must not exceed --max-count"
    );

    let sizes = sweep_sizes(args.min_count, args.max_count, args.factor);
    let target = Duration::from_millis(args.target_ms);
    info!(sizes = sizes.len(), ?target, "starting sweep");

    let cluster = Cluster::new(2)?;
    let logs = cluster.run(|comm| {
        let mut log = ResultLog::new();
        for &count in &sizes {
            for transfer in [Transfer::Buffered, Transfer::Serialized] {
                for _ in 0..args.repeats {
                    let secs = measure_one(&comm, count, target, transfer)?;
                    // Only the leader's observations go into the report.
                    if comm.rank() == 0 {
                        log.record(transfer, secs, count);
                    }
                }
            }
        }
        Ok(log)
    })?;
    let log = logs
        .into_iter()
        .next()
        .context("rank 0 produced no result log")?;

    println!("{:>10} {:>14} {:>14} {:>9}", "elements", "buffered (s)", "serialized (s)", "speedup");
    for count in log.counts() {
        let buffered = log.mean(Transfer::Buffered, count);
        let serialized = log.mean(Transfer::Serialized, count);
        let speedup = match (buffered, serialized) {
            (Some(b), Some(s)) => format!("{:>9.2}", s / b),
            _ => format!("{:>9}", "-"),
        };
        println!(
            "{:>10} {:>14} {:>14} {}",
            count,
            buffered.map_or_else(|| "-".into(), |b| format!("{b:.3e}")),
            serialized.map_or_else(|| "-".into(), |s| format!("{s:.3e}")),
            speedup
        );
    }

    create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    let csv_path = args.out.join("pingpong.csv");
    log.write_csv(File::create(&csv_path)?)?;
    println!("wrote {}", csv_path.display());

    if !args.no_charts {
        let latency_path = args.out.join("latency.svg");
        latency_chart(&log, &latency_path)?;
        println!("wrote {}", latency_path.display());

        let speedup_path = args.out.join("speedup.svg");
        speedup_chart(&log, &speedup_path)?;
        println!("wrote {}", speedup_path.display());
    }

    Ok(())
}
