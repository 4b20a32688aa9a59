//! Pure interval arithmetic for busy-time merging

use bookslot_domain::BusyInterval;
use chrono::{DateTime, Utc};

/// Merge overlapping and adjacent intervals into a minimal sorted list.
///
/// Degenerate inputs (`end <= start`) are dropped.
pub fn merge(mut intervals: Vec<BusyInterval>) -> Vec<BusyInterval> {
    intervals.retain(|i| i.start < i.end);
    intervals.sort_by_key(|i| i.start);

    let mut merged: Vec<BusyInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            // Adjacent intervals collapse too: touching busy ranges form one.
            Some(last) if interval.start <= last.end => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Whether `[start, end)` is disjoint from every interval in a merged,
/// ascending list.
pub fn is_free(merged: &[BusyInterval], start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    // Binary search on the sorted list: only the nearest neighbour can
    // overlap a candidate window.
    let idx = merged.partition_point(|i| i.end <= start);
    match merged.get(idx) {
        Some(next) => next.start >= end,
        None => true,
    }
}
