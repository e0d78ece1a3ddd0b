use crate::{Seconds, TimeRange};

/// Round `value` to the nearest multiple of `grid`.
pub fn snap_to_grid(value: Seconds, grid: Seconds) -> Seconds {
    if grid <= 0.0 || !grid.is_finite() {
        return value;
    }
    (value / grid).round() * grid
}

/// Magnetic alignment of a moving interval against one neighbor that it does not overlap.
///
/// Returns the adjusted start when an edge of `candidate` lies within `threshold` of an
/// edge of `neighbor`: our end against their start, or our start against their end.
pub fn magnet_start(
    candidate: TimeRange,
    neighbor: TimeRange,
    threshold: Seconds,
) -> Option<Seconds> {
    if threshold <= 0.0 {
        return None;
    }
    let end_gap = (candidate.end() - neighbor.start).abs();
    let start_gap = (candidate.start - neighbor.end()).abs();
    if end_gap <= threshold && end_gap <= start_gap {
        Some(neighbor.start - candidate.duration)
    } else if start_gap <= threshold {
        Some(neighbor.end())
    } else {
        None
    }
}
