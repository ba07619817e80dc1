//! Flat, append-only log of benchmark observations.
//!
//! Each [`Sample`] records which transfer mode was exercised, the measured
//! per-call duration in seconds, and the payload element count of the trial.
//! Samples are never mutated or removed, and duplicate `(transfer, count)`
//! pairs are expected — they are repeated trials, aggregated by mean when the
//! log is turned into chart series or speedup ratios.

use std::io::Write;

use serde::Serialize;

use crate::bench::Transfer;
use crate::error::{Error, Result};

/// One benchmark observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Transfer mode the trial used.
    pub transfer: Transfer,
    /// Measured duration of one call, in seconds.
    pub seconds: f64,
    /// Payload element count of the trial.
    pub count: usize,
}

/// Append-only collection of benchmark observations for one run.
#[derive(Debug, Default, Clone)]
pub struct ResultLog {
    samples: Vec<Sample>,
}

impl ResultLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation.
    pub fn record(&mut self, transfer: Transfer, seconds: f64, count: usize) {
        self.samples.push(Sample {
            transfer,
            seconds,
            count,
        });
    }

    /// Whether the log holds no observations.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of recorded observations.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// All observations, in recording order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Distinct payload sizes present in the log, ascending.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts: Vec<usize> = self.samples.iter().map(|s| s.count).collect();
        counts.sort_unstable();
        counts.dedup();
        counts
    }

    /// Mean per-call duration for one `(transfer, count)` cell, if any trials
    /// were recorded for it.
    pub fn mean(&self, transfer: Transfer, count: usize) -> Option<f64> {
        let mut sum = 0.0;
        let mut n = 0usize;
        for s in &self.samples {
            if s.transfer == transfer && s.count == count {
                sum += s.seconds;
                n += 1;
            }
        }
        (n > 0).then(|| sum / n as f64)
    }

    /// Mean latency series for one transfer mode: `(count, seconds)` pairs,
    /// ascending by count.
    pub fn series(&self, transfer: Transfer) -> Vec<(usize, f64)> {
        self.counts()
            .into_iter()
            .filter_map(|count| self.mean(transfer, count).map(|secs| (count, secs)))
            .collect()
    }

    /// Speedup of buffered over serialized transfer per payload size:
    /// `(count, serialized_mean / buffered_mean)`, ascending by count.
    ///
    /// Sizes measured with only one of the two modes are skipped.
    pub fn speedups(&self) -> Vec<(usize, f64)> {
        self.counts()
            .into_iter()
            .filter_map(|count| {
                let buffered = self.mean(Transfer::Buffered, count)?;
                let serialized = self.mean(Transfer::Serialized, count)?;
                Some((count, serialized / buffered))
            })
            .collect()
    }

    /// Write the raw observations as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyLog`] for an empty log; I/O errors propagate.
    pub fn write_csv<W: Write>(&self, mut out: W) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyLog);
        }
        writeln!(out, "transfer,count,seconds")?;
        for s in &self.samples {
            writeln!(out, "{},{},{}", s.transfer.label(), s.count, s.seconds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> ResultLog {
        let mut log = ResultLog::new();
        log.record(Transfer::Buffered, 1e-6, 16);
        log.record(Transfer::Buffered, 3e-6, 16);
        log.record(Transfer::Serialized, 8e-6, 16);
        log.record(Transfer::Buffered, 2e-6, 4);
        log.record(Transfer::Serialized, 1e-5, 1024);
        log
    }

    #[test]
    fn records_are_append_only_and_ordered() {
        let log = sample_log();
        assert_eq!(log.len(), 5);
        assert_eq!(log.samples()[0].count, 16);
        assert_eq!(log.samples()[4].count, 1024);
    }

    #[test]
    fn counts_are_sorted_and_deduplicated() {
        assert_eq!(sample_log().counts(), vec![4, 16, 1024]);
    }

    #[test]
    fn mean_averages_repeated_trials() {
        let log = sample_log();
        let mean = log.mean(Transfer::Buffered, 16).unwrap();
        assert!((mean - 2e-6).abs() < 1e-12);
        assert_eq!(log.mean(Transfer::Serialized, 4), None);
    }

    #[test]
    fn series_is_ascending_by_count() {
        let series = sample_log().series(Transfer::Buffered);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0, 4);
        assert_eq!(series[1].0, 16);
    }

    #[test]
    fn speedups_pair_only_fully_measured_sizes() {
        let speedups = sample_log().speedups();
        // Only count=16 has trials for both transfer modes.
        assert_eq!(speedups.len(), 1);
        let (count, ratio) = speedups[0];
        assert_eq!(count, 16);
        assert!((ratio - 4.0).abs() < 1e-9);
    }

    #[test]
    fn csv_has_header_and_one_row_per_sample() {
        let mut out = Vec::new();
        sample_log().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "transfer,count,seconds");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("buffered,16,"));
        assert!(lines[3].starts_with("serialized,16,"));
    }

    #[test]
    fn empty_log_refuses_to_write_csv() {
        let mut out = Vec::new();
        assert!(matches!(
            ResultLog::new().write_csv(&mut out),
            Err(Error::EmptyLog)
        ));
    }
}
