use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Seconds;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TrackId(pub Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PlacementId(pub Uuid);

impl PlacementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlacementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lane category. Decides which placements a track will hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackCategory {
    Video,
    Audio,
    Ai,
    Adjustment,
    Effect,
}

impl Default for TrackCategory {
    fn default() -> Self {
        Self::Video
    }
}

impl TrackCategory {
    /// Video lanes also carry generated (ai) transition material.
    pub fn accepts(self, clip: ClipCategory) -> bool {
        matches!(
            (self, clip),
            (TrackCategory::Video, ClipCategory::Video)
                | (TrackCategory::Video, ClipCategory::Ai)
                | (TrackCategory::Audio, ClipCategory::Audio)
                | (TrackCategory::Ai, ClipCategory::Ai)
                | (TrackCategory::Adjustment, ClipCategory::Adjustment)
                | (TrackCategory::Effect, ClipCategory::Effect)
        )
    }
}

impl fmt::Display for TrackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackCategory::Video => "video",
            TrackCategory::Audio => "audio",
            TrackCategory::Ai => "ai",
            TrackCategory::Adjustment => "adjustment",
            TrackCategory::Effect => "effect",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClipCategory {
    Video,
    Audio,
    Ai,
    Adjustment,
    Effect,
}

impl Default for ClipCategory {
    fn default() -> Self {
        Self::Video
    }
}

impl fmt::Display for ClipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClipCategory::Video => "video",
            ClipCategory::Audio => "audio",
            ClipCategory::Ai => "ai",
            ClipCategory::Adjustment => "adjustment",
            ClipCategory::Effect => "effect",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackFlags {
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub solo: bool,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub category: TrackCategory,
    pub order: usize,
    #[serde(default)]
    pub flags: TrackFlags,
}

/// Half-open interval `[start, start + duration)` in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeRange {
    pub start: Seconds,
    pub duration: Seconds,
}

impl TimeRange {
    pub fn new(start: Seconds, duration: Seconds) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> Seconds {
        self.start + self.duration
    }

    /// Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end() - OVERLAP_EPSILON && other.start < self.end() - OVERLAP_EPSILON
    }
}

// Float noise from grid rounding must not register as a collision.
const OVERLAP_EPSILON: Seconds = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    pub id: PlacementId,
    pub track_id: TrackId,
    /// Identifier of the upstream matched clip this placement shows.
    pub clip_id: String,
    pub name: String,
    pub range: TimeRange,
    pub category: ClipCategory,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Placement {
    pub fn start(&self) -> Seconds {
        self.range.start
    }

    pub fn duration(&self) -> Seconds {
        self.range.duration
    }

    pub fn end(&self) -> Seconds {
        self.range.end()
    }
}

/// Other placements on `track_id`, excluding `skip`, ordered by ascending start.
pub fn track_neighbors<'a>(
    placements: &'a [Placement],
    track_id: TrackId,
    skip: PlacementId,
) -> Vec<&'a Placement> {
    let mut neighbors: Vec<&Placement> = placements
        .iter()
        .filter(|p| p.track_id == track_id && p.id != skip)
        .collect();
    neighbors.sort_by(|a, b| a.start().total_cmp(&b.start()));
    neighbors
}

/// Tracks and the placements laid on them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

impl Layout {
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn first_track_of(&self, category: TrackCategory) -> Option<&Track> {
        self.tracks
            .iter()
            .filter(|t| t.category == category)
            .min_by_key(|t| t.order)
    }

    pub fn placement(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn placement_mut(&mut self, id: PlacementId) -> Option<&mut Placement> {
        self.placements.iter_mut().find(|p| p.id == id)
    }

    pub fn placement_by_clip(&self, clip_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.clip_id == clip_id)
    }

    /// Latest placement end, or 0 for an empty layout.
    pub fn content_end(&self) -> Seconds {
        self.placements.iter().map(|p| p.end()).fold(0.0, f64::max)
    }

    pub fn neighbors(&self, track_id: TrackId, skip: PlacementId) -> Vec<&Placement> {
        track_neighbors(&self.placements, track_id, skip)
    }

    /// First placement on `track_id` (other than `skip`) that `range` would overlap.
    pub fn collision(
        &self,
        track_id: TrackId,
        skip: PlacementId,
        range: &TimeRange,
    ) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.track_id == track_id && p.id != skip && p.range.overlaps(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_ranges_do_not_overlap() {
        let a = TimeRange::new(0.0, 5.0);
        let b = TimeRange::new(5.0, 3.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&TimeRange::new(4.5, 1.0)));
    }

    #[test]
    fn video_tracks_accept_ai_material() {
        assert!(TrackCategory::Video.accepts(ClipCategory::Ai));
        assert!(TrackCategory::Video.accepts(ClipCategory::Video));
        assert!(!TrackCategory::Audio.accepts(ClipCategory::Video));
        assert!(!TrackCategory::Ai.accepts(ClipCategory::Video));
    }

    #[test]
    fn neighbors_are_sorted_and_exclude_self() {
        let track = TrackId::new();
        let other_track = TrackId::new();
        let make = |track_id, start| Placement {
            id: PlacementId::new(),
            track_id,
            clip_id: "c".to_string(),
            name: "c".to_string(),
            range: TimeRange::new(start, 1.0),
            category: ClipCategory::Video,
            thumbnail: None,
        };
        let placements = vec![
            make(track, 8.0),
            make(track, 2.0),
            make(other_track, 0.0),
            make(track, 5.0),
        ];
        let me = placements[3].id;
        let neighbors = track_neighbors(&placements, track, me);
        let starts: Vec<f64> = neighbors.iter().map(|p| p.start()).collect();
        assert_eq!(starts, vec![2.0, 8.0]);
    }
}
