//! Static partitioning of `[0, n)` into contiguous per-worker ranges.

use std::ops::Range;

use serde::Serialize;

use crate::error::{HistoError, Result};

/// Half-open index range `[start, end)` assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkRange {
    pub start: usize,
    pub end: usize,
}

impl WorkRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `[0, n)` into `t` ranges with `start_i = n*i/t`, `end_i = n*(i+1)/t`.
///
/// The ranges tile `[0, n)` exactly and are ordered by worker index; the
/// remainder of an uneven split accrues to higher indices. `t > n` yields
/// empty ranges rather than an error.
pub fn partition(n: usize, t: usize) -> Result<Vec<WorkRange>> {
    if t == 0 {
        return Err(HistoError::InvalidThreadCount {
            threads: t,
            reason: "at least one worker is required",
        });
    }
    // n*(i+1) can overflow usize for large images on 32-bit targets
    let bound = |i: usize| (n as u128 * i as u128 / t as u128) as usize;
    Ok((0..t)
        .map(|i| WorkRange {
            start: bound(i),
            end: bound(i + 1),
        })
        .collect())
}

/// Carve `slice` into one disjoint `&mut` sub-slice per range.
///
/// `ranges` must be a tiling of `[0, slice.len())` as produced by
/// [`partition`].
pub fn split_mut<'a, T>(mut slice: &'a mut [T], ranges: &[WorkRange]) -> Vec<&'a mut [T]> {
    let mut parts = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = slice.split_at_mut(range.len());
        parts.push(head);
        slice = tail;
    }
    debug_assert!(slice.is_empty(), "ranges do not cover the slice");
    parts
}
