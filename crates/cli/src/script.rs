use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use timeline::{GestureKind, PlacementId, TimelineEngine, TrackFlags};
use tracing::{debug, warn};

/// One recorded host interaction. Placements are addressed by upstream clip id
/// and tracks by name so scripts stay valid across runs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    BeginGesture {
        clip: String,
        kind: GestureKind,
        x: f64,
    },
    UpdateGesture {
        x: f64,
    },
    EndGesture,
    SetZoom {
        zoom: f64,
    },
    FitToView {
        width: f64,
    },
    SetPlayhead {
        time: f64,
    },
    /// Click or drag on the ruler, ending at `x`.
    Scrub {
        x: f64,
    },
    TogglePlay,
    Tick {
        #[serde(default = "default_ticks")]
        count: u32,
    },
    SkipBack,
    SkipForward,
    RemovePlacement {
        clip: String,
    },
    SetTrackFlags {
        track: String,
        #[serde(default)]
        muted: bool,
        #[serde(default)]
        solo: bool,
        #[serde(default)]
        locked: bool,
    },
    Undo,
    Redo,
}

fn default_ticks() -> u32 {
    1
}

pub fn load_script(path: &Path) -> Result<Vec<HostEvent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing script {}", path.display()))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: usize,
}

/// Feed `events` through the engine in order. Events the engine ignores are
/// counted and logged, never fatal.
pub fn replay(engine: &mut TimelineEngine, events: &[HostEvent]) -> ReplayReport {
    let mut report = ReplayReport::default();
    for (index, event) in events.iter().enumerate() {
        match apply_event(engine, event) {
            Ok(()) => {
                debug!("event {} applied: {:?}", index, event);
                report.applied += 1;
            }
            Err(reason) => {
                warn!("event {} rejected ({}): {:?}", index, reason, event);
                report.rejected += 1;
            }
        }
    }
    report
}

fn apply_event(engine: &mut TimelineEngine, event: &HostEvent) -> Result<(), String> {
    match event {
        HostEvent::BeginGesture { clip, kind, x } => {
            let id = placement_for(engine, clip)?;
            if !engine.begin_gesture(id, *kind, *x) {
                return Err("gesture not started".to_string());
            }
        }
        HostEvent::UpdateGesture { x } => {
            if engine.drag_session().is_none() {
                return Err("no active gesture".to_string());
            }
            if engine.update_gesture(*x).is_none() {
                return Err("position would overlap a neighbor".to_string());
            }
        }
        HostEvent::EndGesture => {
            engine
                .end_gesture()
                .ok_or_else(|| "no active gesture".to_string())?;
        }
        HostEvent::SetZoom { zoom } => {
            engine.set_zoom(*zoom);
        }
        HostEvent::FitToView { width } => {
            engine.fit_to_view(*width);
        }
        HostEvent::SetPlayhead { time } => {
            engine.set_playhead(*time);
        }
        HostEvent::Scrub { x } => {
            engine.begin_scrub(*x);
            if !engine.is_scrubbing() {
                return Err("scrub ignored during a gesture".to_string());
            }
            engine.end_scrub();
        }
        HostEvent::TogglePlay => {
            engine.toggle_play();
        }
        HostEvent::Tick { count } => {
            for _ in 0..*count {
                engine.tick();
            }
        }
        HostEvent::SkipBack => {
            engine.skip_back();
        }
        HostEvent::SkipForward => {
            engine.skip_forward();
        }
        HostEvent::RemovePlacement { clip } => {
            let id = placement_for(engine, clip)?;
            engine.remove_placement(id);
        }
        HostEvent::SetTrackFlags {
            track,
            muted,
            solo,
            locked,
        } => {
            let track_id = engine
                .track_by_name(track)
                .ok_or_else(|| format!("unknown track {track:?}"))?
                .id;
            let flags = TrackFlags {
                muted: *muted,
                solo: *solo,
                locked: *locked,
            };
            if !engine.set_track_flags(track_id, flags) {
                return Err("track flags not applied".to_string());
            }
        }
        HostEvent::Undo => engine.undo().map_err(|e| e.to_string())?,
        HostEvent::Redo => engine.redo().map_err(|e| e.to_string())?,
    }
    Ok(())
}

fn placement_for(engine: &TimelineEngine, clip: &str) -> Result<PlacementId, String> {
    engine
        .placement_by_clip(clip)
        .map(|p| p.id)
        .ok_or_else(|| format!("unknown clip {clip:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline::{MatchedClip, TimeRange};

    fn engine() -> TimelineEngine {
        let mut engine = TimelineEngine::default();
        let clips: Vec<MatchedClip> = [("a", 5.0), ("b", 5.0)]
            .iter()
            .map(|(id, duration)| MatchedClip {
                clip_id: id.to_string(),
                name: id.to_string(),
                duration: *duration,
                thumbnail: None,
                transition: None,
            })
            .collect();
        engine.seed(&clips);
        engine
    }

    fn parse(json: &str) -> Vec<HostEvent> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_tagged_events() {
        let events = parse(
            r#"[
                { "event": "begin_gesture", "clip": "a", "kind": "resize_end", "x": 100 },
                { "event": "tick" },
                { "event": "set_track_flags", "track": "Video 1", "locked": true }
            ]"#,
        );
        assert_eq!(
            events[0],
            HostEvent::BeginGesture {
                clip: "a".to_string(),
                kind: GestureKind::ResizeEnd,
                x: 100.0
            }
        );
        assert_eq!(events[1], HostEvent::Tick { count: 1 });
    }

    #[test]
    fn replays_a_drag() {
        let mut engine = engine();
        let events = parse(
            r#"[
                { "event": "set_zoom", "zoom": 20 },
                { "event": "begin_gesture", "clip": "b", "kind": "move", "x": 100 },
                { "event": "update_gesture", "x": 200 },
                { "event": "end_gesture" }
            ]"#,
        );
        let report = replay(&mut engine, &events);
        assert_eq!(report, ReplayReport { applied: 4, rejected: 0 });
        assert_eq!(
            engine.placement_by_clip("b").unwrap().range,
            TimeRange::new(10.0, 5.0)
        );
    }

    #[test]
    fn locked_track_rejects_gesture_events() {
        let mut engine = engine();
        let events = parse(
            r#"[
                { "event": "set_track_flags", "track": "Video 1", "locked": true },
                { "event": "begin_gesture", "clip": "a", "kind": "move", "x": 0 },
                { "event": "update_gesture", "x": 300 },
                { "event": "end_gesture" },
                { "event": "remove_placement", "clip": "missing" }
            ]"#,
        );
        let report = replay(&mut engine, &events);
        assert_eq!(report, ReplayReport { applied: 1, rejected: 4 });
        assert_eq!(engine.placement_by_clip("a").unwrap().start(), 0.0);
    }
}
