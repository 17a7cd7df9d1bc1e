//! Text histogram writer: per channel, the bucket count followed by one
//! `"<bucket> <count>"` line per bucket, channels in R, G, B order.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{HistoError, Result};
use crate::histogram::Histogram;
use crate::pixel::Channel;

pub fn write_channel(mut writer: impl Write, counts: &[u64]) -> io::Result<()> {
    writeln!(writer, "{}", counts.len())?;
    for (bucket, count) in counts.iter().enumerate() {
        writeln!(writer, "{bucket} {count}")?;
    }
    Ok(())
}

pub fn write_histogram(mut writer: impl Write, histogram: &Histogram) -> io::Result<()> {
    for channel in Channel::ALL {
        write_channel(&mut writer, histogram.counts(channel))?;
    }
    writer.flush()
}

/// Create `path` and write `histogram` to it.
///
/// Failures are returned as [`HistoError::Output`], which callers treat as
/// non-fatal.
pub fn write_path(path: impl AsRef<Path>, histogram: &Histogram) -> Result<()> {
    let path = path.as_ref();
    let output = |source: io::Error| HistoError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(output)?;
    write_histogram(BufWriter::new(file), histogram).map_err(output)
}

/// The plain-text summary line of one run.
pub fn timing_line(total_ns: u64) -> String {
    format!("Time: {total_ns} ns")
}

/// Write `histogram` to `path`, then `summary` as a line on `out`.
///
/// An [`HistoError::Output`] failure is logged and the file skipped; the
/// summary is still written. Returns whether the histogram file was written.
pub fn publish(
    path: impl AsRef<Path>,
    histogram: &Histogram,
    summary: &str,
    mut out: impl Write,
) -> Result<bool> {
    let written = match write_path(path, histogram) {
        Ok(()) => true,
        Err(e @ HistoError::Output { .. }) => {
            tracing::error!("{e}");
            false
        }
        Err(e) => return Err(e),
    };
    writeln!(out, "{summary}")?;
    out.flush()?;
    Ok(written)
}
