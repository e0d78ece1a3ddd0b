use serde::{Deserialize, Serialize};

use crate::snap::{magnet_start, snap_to_grid};
use crate::{LayoutConfig, Placement, PlacementId, Seconds, TimeRange, TrackId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// State captured between pointer-down and pointer-up on a placement.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub placement_id: PlacementId,
    pub track_id: TrackId,
    pub kind: GestureKind,
    pub start_pointer_x: f64,
    pub original: TimeRange,
    /// Last range that passed collision checks.
    pub current: TimeRange,
}

impl DragSession {
    pub fn new(placement: &Placement, kind: GestureKind, pointer_x: f64) -> Self {
        Self {
            placement_id: placement.id,
            track_id: placement.track_id,
            kind,
            start_pointer_x: pointer_x,
            original: placement.range,
            current: placement.range,
        }
    }

    pub fn changed(&self) -> bool {
        self.current != self.original
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureRules {
    pub snap_grid: Seconds,
    pub min_duration: Seconds,
    pub magnet_threshold: Seconds,
}

impl From<&LayoutConfig> for GestureRules {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            snap_grid: config.snap_grid,
            min_duration: config.min_duration,
            magnet_threshold: config.magnet_threshold,
        }
    }
}

/// Candidate range for the pointer at `pointer_x`, or `None` if it cannot be placed
/// without overlapping a neighbor. `neighbors` must be sorted by ascending start.
pub fn resolve_gesture(
    session: &DragSession,
    pointer_x: f64,
    zoom: f64,
    neighbors: &[&Placement],
    rules: &GestureRules,
) -> Option<TimeRange> {
    if !pointer_x.is_finite() || zoom <= 0.0 {
        return None;
    }
    let delta = (pointer_x - session.start_pointer_x) / zoom;
    let original = session.original;

    let range = match session.kind {
        GestureKind::Move => {
            let candidate = snap_to_grid(original.start + delta, rules.snap_grid);
            resolve_move(
                candidate,
                original.duration,
                original.start,
                neighbors,
                rules.magnet_threshold,
            )
        }
        GestureKind::ResizeStart => resize_start(original, delta, neighbors, rules),
        GestureKind::ResizeEnd => resize_end(original, delta, neighbors, rules),
    };

    if neighbors.iter().any(|n| range.overlaps(&n.range)) {
        return None;
    }
    Some(range)
}

/// Collision resolution for a move. Clamps apply per neighbor in order; a later
/// clamp may undo an earlier one, which the caller's overlap check catches.
pub fn resolve_move(
    candidate_start: Seconds,
    duration: Seconds,
    origin_start: Seconds,
    neighbors: &[&Placement],
    magnet_threshold: Seconds,
) -> TimeRange {
    let rightward = candidate_start > origin_start;
    let mut start = candidate_start.max(0.0);

    for neighbor in neighbors {
        let range = TimeRange::new(start, duration);
        if range.overlaps(&neighbor.range) {
            start = if rightward {
                neighbor.end()
            } else {
                (neighbor.start() - duration).max(0.0)
            };
        } else if let Some(aligned) = magnet_start(range, neighbor.range, magnet_threshold) {
            start = aligned;
        }
        start = start.max(0.0);
    }

    TimeRange::new(start, duration)
}

fn resize_start(
    original: TimeRange,
    delta: Seconds,
    neighbors: &[&Placement],
    rules: &GestureRules,
) -> TimeRange {
    let end = original.end();
    let floor = neighbors
        .iter()
        .filter(|n| n.start() < original.start)
        .map(|n| n.end())
        .fold(0.0_f64, f64::max);

    let mut start = snap_to_grid(original.start + delta, rules.snap_grid).max(floor);
    if end - start < rules.min_duration {
        start = (end - rules.min_duration).max(floor);
    }
    TimeRange::new(start, end - start)
}

fn resize_end(
    original: TimeRange,
    delta: Seconds,
    neighbors: &[&Placement],
    rules: &GestureRules,
) -> TimeRange {
    let mut duration =
        snap_to_grid(original.duration + delta, rules.snap_grid).max(rules.min_duration);
    let cap = neighbors
        .iter()
        .filter(|n| n.start() >= original.start)
        .map(|n| n.start())
        .fold(f64::INFINITY, f64::min);
    if original.start + duration > cap {
        duration = (cap - original.start).max(rules.min_duration);
    }
    TimeRange::new(original.start, duration)
}
