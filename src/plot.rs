//! Log-log charts for benchmark results.
//!
//! Renders the two tutorial charts as SVG files with `plotters`: absolute
//! per-call latency for both transfer modes, and the speedup of buffered over
//! serialized transfer, each against payload size.

use std::path::Path;

use plotters::prelude::*;

use crate::bench::Transfer;
use crate::error::{Error, Result};
use crate::results::ResultLog;

const CHART_SIZE: (u32, u32) = (900, 600);

fn to_plot_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

fn color_for(transfer: Transfer) -> &'static RGBColor {
    match transfer {
        Transfer::Buffered => &BLUE,
        Transfer::Serialized => &RED,
    }
}

/// Render the absolute latency chart (log-log, both transfer series).
///
/// # Errors
///
/// Returns [`Error::EmptyLog`] when the log holds no observations; rendering
/// and I/O failures surface as [`Error::Plot`].
pub fn latency_chart(log: &ResultLog, path: &Path) -> Result<()> {
    if log.is_empty() {
        return Err(Error::EmptyLog);
    }

    let series: Vec<(Transfer, Vec<(f64, f64)>)> = [Transfer::Buffered, Transfer::Serialized]
        .into_iter()
        .map(|t| {
            let points = log
                .series(t)
                .into_iter()
                .map(|(count, secs)| (count as f64, secs))
                .collect::<Vec<_>>();
            (t, points)
        })
        .filter(|(_, points)| !points.is_empty())
        .collect();

    let xs = series.iter().flat_map(|(_, p)| p.iter().map(|(x, _)| *x));
    let ys = series.iter().flat_map(|(_, p)| p.iter().map(|(_, y)| *y));
    let (x_min, x_max) = padded_bounds(xs, 0.5);
    let (y_min, y_max) = padded_bounds(ys, 1e-12);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(to_plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Ping-pong latency", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(72)
        .build_cartesian_2d((x_min..x_max).log_scale(), (y_min..y_max).log_scale())
        .map_err(to_plot_err)?;

    chart
        .configure_mesh()
        .x_desc("payload elements")
        .y_desc("seconds per call")
        .draw()
        .map_err(to_plot_err)?;

    for (transfer, points) in series {
        let color = color_for(transfer);
        chart
            .draw_series(LineSeries::new(points, color))
            .map_err(to_plot_err)?
            .label(transfer.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(to_plot_err)?;

    root.present().map_err(to_plot_err)?;
    Ok(())
}

/// Render the speedup chart (log x, linear y).
///
/// # Errors
///
/// Returns [`Error::EmptyLog`] when no payload size was measured with both
/// transfer modes; rendering and I/O failures surface as [`Error::Plot`].
pub fn speedup_chart(log: &ResultLog, path: &Path) -> Result<()> {
    let speedups = log.speedups();
    if speedups.is_empty() {
        return Err(Error::EmptyLog);
    }

    let points: Vec<(f64, f64)> = speedups
        .into_iter()
        .map(|(count, ratio)| (count as f64, ratio))
        .collect();

    let (x_min, x_max) = padded_bounds(points.iter().map(|(x, _)| *x), 0.5);
    let y_max = points
        .iter()
        .map(|(_, y)| *y)
        .fold(f64::MIN, f64::max)
        .max(1.0);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(to_plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Buffered vs serialized speedup", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(56)
        .build_cartesian_2d((x_min..x_max).log_scale(), 0.0..y_max * 1.2)
        .map_err(to_plot_err)?;

    chart
        .configure_mesh()
        .x_desc("payload elements")
        .y_desc("speedup (serialized / buffered)")
        .draw()
        .map_err(to_plot_err)?;

    chart
        .draw_series(LineSeries::new(points, &BLACK))
        .map_err(to_plot_err)?;

    root.present().map_err(to_plot_err)?;
    Ok(())
}

/// Min/max of an iterator, padded so a degenerate (single-point) range still
/// spans a drawable interval, with the minimum clamped above `floor` to keep
/// log axes valid.
fn padded_bounds(values: impl Iterator<Item = f64>, floor: f64) -> (f64, f64) {
    let (min, max) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let min = min.max(floor);
    let max = max.max(min * 2.0);
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured_log() -> ResultLog {
        let mut log = ResultLog::new();
        for (i, count) in [1usize, 64, 4096].into_iter().enumerate() {
            log.record(Transfer::Buffered, 1e-6 * (i + 1) as f64, count);
            log.record(Transfer::Serialized, 5e-6 * (i + 1) as f64, count);
        }
        log
    }

    #[test]
    fn latency_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latency.svg");
        latency_chart(&measured_log(), &path).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
    }

    #[test]
    fn speedup_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speedup.svg");
        speedup_chart(&measured_log(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn empty_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new();
        assert!(matches!(
            latency_chart(&log, &dir.path().join("a.svg")),
            Err(Error::EmptyLog)
        ));
        assert!(matches!(
            speedup_chart(&log, &dir.path().join("b.svg")),
            Err(Error::EmptyLog)
        ));
    }

    #[test]
    fn speedup_needs_both_transfer_modes() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ResultLog::new();
        log.record(Transfer::Buffered, 1e-6, 64);
        assert!(matches!(
            speedup_chart(&log, &dir.path().join("c.svg")),
            Err(Error::EmptyLog)
        ));
    }

    #[test]
    fn single_point_ranges_are_padded() {
        let (lo, hi) = padded_bounds([4.0f64].into_iter(), 0.5);
        assert_eq!(lo, 4.0);
        assert!(hi > lo);
    }
}
