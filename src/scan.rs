//! Per-worker local aggregation. Touches no shared mutable state.

use core_affinity::CoreId;

use crate::histogram::LocalHistogram;
use crate::partition::WorkRange;
use crate::pixel::{Channel, PixelBuffer};

/// Everything one scan worker needs, handed over at spawn time.
#[derive(Debug, Clone, Copy)]
pub struct ScanTask<'a> {
    pub worker: usize,
    pub buffer: &'a PixelBuffer,
    pub range: WorkRange,
    /// Core to pin the worker thread to, if affinity is enabled.
    pub core: Option<CoreId>,
}

impl ScanTask<'_> {
    /// Pin the calling thread (if requested) and scan the assigned range.
    pub fn run(&self) -> LocalHistogram {
        if let Some(core) = self.core {
            if !core_affinity::set_for_current(core) {
                tracing::warn!(worker = self.worker, core = core.id, "failed to pin worker");
            }
        }
        tracing::debug!(worker = self.worker, start = self.range.start, end = self.range.end, "scan");
        scan(self.buffer, self.range)
    }
}

pub fn scan(buffer: &PixelBuffer, range: WorkRange) -> LocalHistogram {
    let mut local = LocalHistogram::new();
    scan_into(buffer, range, &mut local);
    local
}

/// Accumulate `range` of `buffer` into `local` without clearing it first.
pub fn scan_into(buffer: &PixelBuffer, range: WorkRange, local: &mut LocalHistogram) {
    let r = &buffer.channel(Channel::Red)[range.as_range()];
    let g = &buffer.channel(Channel::Green)[range.as_range()];
    let b = &buffer.channel(Channel::Blue)[range.as_range()];
    let (hist_r, hist_g, hist_b) = local.channels_mut();

    for ((&vr, &vg), &vb) in r.iter().zip(g).zip(b) {
        // u8 index into a 256-entry array: no bounds check survives
        hist_r[vr as usize] += 1;
        hist_g[vg as usize] += 1;
        hist_b[vb as usize] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;

    fn buffer() -> PixelBuffer {
        let n = 1000;
        let r: Vec<u8> = (0..n).map(|i| (i % 256) as u8).collect();
        let g: Vec<u8> = (0..n).map(|i| (i * 7 % 256) as u8).collect();
        let b = vec![42; n];
        PixelBuffer::new(n as u32, 1, 255, r, g, b).unwrap()
    }

    #[test]
    fn test_scan_range_only() {
        let buf = buffer();
        let local = scan(&buf, WorkRange { start: 0, end: 10 });
        assert_eq!(local.total(Channel::Red), 10);
        assert_eq!(local.counts(Channel::Red)[9], 1);
        assert_eq!(local.counts(Channel::Red)[10], 0);
        assert_eq!(local.counts(Channel::Blue)[42], 10);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let buf = buffer();
        let range = WorkRange { start: 123, end: 877 };
        let first = scan(&buf, range);
        let second = scan(&buf, range);
        assert_eq!(first, second);

        let mut reused = first.clone();
        reused.clear();
        scan_into(&buf, range, &mut reused);
        assert_eq!(reused, first);
    }

    #[test]
    fn test_scan_empty_range() {
        let buf = buffer();
        let local = scan(&buf, WorkRange { start: 500, end: 500 });
        assert_eq!(local, LocalHistogram::new());
    }

    #[test]
    fn test_partial_scans_sum_to_whole() {
        let buf = buffer();
        let mut acc = LocalHistogram::new();
        for range in partition(buf.len(), 7).unwrap() {
            scan_into(&buf, range, &mut acc);
        }
        let whole = scan(&buf, WorkRange { start: 0, end: buf.len() });
        assert_eq!(acc, whole);
    }

    #[test]
    fn test_task_runs_on_spawned_thread() {
        let buf = buffer();
        let task = ScanTask {
            worker: 0,
            buffer: &buf,
            range: WorkRange { start: 0, end: buf.len() },
            core: None,
        };
        let local = std::thread::scope(|s| s.spawn(|| task.run()).join().unwrap());
        assert_eq!(local.total(Channel::Green), 1000);
    }
}
