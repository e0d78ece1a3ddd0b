use serde::{Deserialize, Serialize};

use crate::{
    ClipCategory, Layout, LayoutConfig, Placement, PlacementId, Seconds, TimeRange,
    TrackCategory,
};

/// A clip selected by the upstream matching stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedClip {
    pub clip_id: String,
    pub name: String,
    pub duration: Seconds,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Generated transition to play after this clip, if any.
    #[serde(default)]
    pub transition: Option<String>,
}

/// Supplies the matched clips a session starts from.
pub trait ClipSource {
    fn matched_clips(&self) -> Vec<MatchedClip>;
}

impl ClipSource for Vec<MatchedClip> {
    fn matched_clips(&self) -> Vec<MatchedClip> {
        self.clone()
    }
}

/// Lay `clips` back to back on the first video lane. Transitions go on the first
/// ai lane (or the video lane when there is none) and push the next clip later.
pub fn seed_placements(
    layout: &Layout,
    clips: &[MatchedClip],
    config: &LayoutConfig,
) -> Vec<Placement> {
    let Some(video) = layout.first_track_of(TrackCategory::Video) else {
        tracing::warn!("no video track configured; {} clips not placed", clips.len());
        return Vec::new();
    };
    let transition_track = layout
        .first_track_of(TrackCategory::Ai)
        .unwrap_or(video)
        .id;

    let mut placements = Vec::with_capacity(clips.len() * 2);
    let mut cursor: Seconds = 0.0;
    for clip in clips {
        let duration = if clip.duration.is_finite() {
            clip.duration.max(config.min_duration)
        } else {
            config.min_duration
        };
        placements.push(Placement {
            id: PlacementId::new(),
            track_id: video.id,
            clip_id: clip.clip_id.clone(),
            name: clip.name.clone(),
            range: TimeRange::new(cursor, duration),
            category: ClipCategory::Video,
            thumbnail: clip.thumbnail.clone(),
        });
        cursor += duration;

        if let Some(transition) = &clip.transition {
            if config.transition_seconds > 0.0 {
                placements.push(Placement {
                    id: PlacementId::new(),
                    track_id: transition_track,
                    clip_id: transition.clone(),
                    name: format!("Transition: {}", clip.name),
                    range: TimeRange::new(cursor, config.transition_seconds),
                    category: ClipCategory::Ai,
                    thumbnail: None,
                });
                cursor += config.transition_seconds;
            }
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Track, TrackFlags, TrackId};

    fn layout(categories: &[TrackCategory]) -> Layout {
        Layout {
            tracks: categories
                .iter()
                .enumerate()
                .map(|(order, category)| Track {
                    id: TrackId::new(),
                    name: format!("{category} {order}"),
                    category: *category,
                    order,
                    flags: TrackFlags::default(),
                })
                .collect(),
            placements: Vec::new(),
        }
    }

    fn matched(id: &str, duration: f64, transition: Option<&str>) -> MatchedClip {
        MatchedClip {
            clip_id: id.to_string(),
            name: id.to_uppercase(),
            duration,
            thumbnail: Some(format!("{id}.jpg")),
            transition: transition.map(str::to_string),
        }
    }

    #[test]
    fn clips_and_transitions_are_sequential() {
        let layout = layout(&[TrackCategory::Video, TrackCategory::Ai]);
        let clips = vec![
            matched("a", 12.0, Some("t-ab")),
            matched("b", 6.0, None),
            matched("c", 4.0, None),
        ];
        let placements = seed_placements(&layout, &clips, &LayoutConfig::default());
        let spans: Vec<(&str, f64, f64)> = placements
            .iter()
            .map(|p| (p.clip_id.as_str(), p.start(), p.duration()))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("a", 0.0, 12.0),
                ("t-ab", 12.0, 8.0),
                ("b", 20.0, 6.0),
                ("c", 26.0, 4.0)
            ]
        );
        assert_eq!(placements[1].track_id, layout.tracks[1].id);
        assert_eq!(placements[1].category, ClipCategory::Ai);
        assert_eq!(placements[0].thumbnail.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn transitions_fall_back_to_video_lane() {
        let layout = layout(&[TrackCategory::Video]);
        let clips = vec![matched("a", 3.0, Some("t"))];
        let placements = seed_placements(&layout, &clips, &LayoutConfig::default());
        assert!(placements.iter().all(|p| p.track_id == layout.tracks[0].id));
    }

    #[test]
    fn short_clips_are_floored() {
        let layout = layout(&[TrackCategory::Video]);
        let clips = vec![matched("a", 0.2, None), matched("b", f64::NAN, None)];
        let placements = seed_placements(&layout, &clips, &LayoutConfig::default());
        assert_eq!(placements[0].duration(), 1.0);
        assert_eq!(placements[1].range, TimeRange::new(1.0, 1.0));
    }

    #[test]
    fn without_video_lane_nothing_is_placed() {
        let layout = layout(&[TrackCategory::Audio]);
        let clips = vec![matched("a", 3.0, None)];
        assert!(seed_placements(&layout, &clips, &LayoutConfig::default()).is_empty());
    }
}
