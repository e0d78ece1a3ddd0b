use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::gesture::{resolve_gesture, DragSession, GestureKind, GestureRules};
use crate::playback::{format_precise, PlaybackClock};
use crate::seed::{seed_placements, ClipSource, MatchedClip};
use crate::viewport::{RulerTick, Viewport};
use crate::{
    ClipCategory, CommandHistory, Layout, LayoutConfig, Placement, PlacementId, Seconds,
    TimeRange, TimelineCommand, TimelineError, Track, TrackCategory, TrackFlags, TrackId,
};

/// Application state for one editing session: tracks, placements, zoom, playhead,
/// the active drag and the edit history. Hosts mutate it only through these methods.
#[derive(Debug, Clone)]
pub struct TimelineEngine {
    config: LayoutConfig,
    rules: GestureRules,
    layout: Layout,
    viewport: Viewport,
    playback: PlaybackClock,
    drag: Option<DragSession>,
    history: CommandHistory,
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl TimelineEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let tracks = config
            .tracks
            .iter()
            .enumerate()
            .map(|(order, track)| Track {
                id: TrackId::new(),
                name: track.name.clone(),
                category: track.category,
                order,
                flags: TrackFlags::default(),
            })
            .collect();
        Self {
            rules: GestureRules::from(&config),
            viewport: Viewport::new(config.default_zoom, config.zoom_min, config.zoom_max),
            layout: Layout {
                tracks,
                placements: Vec::new(),
            },
            playback: PlaybackClock::default(),
            drag: None,
            history: CommandHistory::default(),
            config,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.layout.tracks
    }

    pub fn track_by_name(&self, name: &str) -> Option<&Track> {
        self.layout.tracks.iter().find(|t| t.name == name)
    }

    pub fn placements(&self) -> &[Placement] {
        &self.layout.placements
    }

    pub fn placement(&self, id: PlacementId) -> Option<&Placement> {
        self.layout.placement(id)
    }

    pub fn placement_by_clip(&self, clip_id: &str) -> Option<&Placement> {
        self.layout.placement_by_clip(clip_id)
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    /// Latest placement end, floored to the minimum session length.
    pub fn total_duration(&self) -> Seconds {
        self.layout.content_end().max(self.config.min_session_seconds)
    }

    pub fn playhead(&self) -> Seconds {
        self.playback.time()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.playback.is_scrubbing()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace all placements with a fresh layout of `clips`.
    pub fn seed(&mut self, clips: &[MatchedClip]) {
        self.layout.placements = seed_placements(&self.layout, clips, &self.config);
        self.drag = None;
        self.history.clear();
        self.playback.reset();
        info!(
            "seeded {} placements from {} matched clips ({} total)",
            self.layout.placements.len(),
            clips.len(),
            format_precise(self.total_duration())
        );
    }

    pub fn seed_from<S: ClipSource + ?Sized>(&mut self, source: &S) {
        let clips = source.matched_clips();
        self.seed(&clips);
    }

    /// Start dragging or resizing a placement. Ignored while another gesture is
    /// active, for unknown placements, and on locked tracks.
    pub fn begin_gesture(
        &mut self,
        placement_id: PlacementId,
        kind: GestureKind,
        pointer_x: f64,
    ) -> bool {
        if self.drag.is_some() || !pointer_x.is_finite() {
            return false;
        }
        let Some(placement) = self.layout.placement(placement_id) else {
            return false;
        };
        let locked = self
            .layout
            .track(placement.track_id)
            .map_or(true, |t| t.flags.locked);
        if locked {
            trace!("gesture on locked track ignored for {}", placement_id);
            return false;
        }
        let session = DragSession::new(placement, kind, pointer_x);
        debug!(
            "begin {:?} on {} at {}",
            kind,
            placement_id,
            format_precise(session.original.start)
        );
        self.drag = Some(session);
        self.playback.pause();
        self.playback.end_scrub();
        true
    }

    /// Feed a pointer move into the active gesture. Returns the range now shown,
    /// or `None` when there is no gesture or the candidate was rejected.
    pub fn update_gesture(&mut self, pointer_x: f64) -> Option<TimeRange> {
        let session = self.drag.as_ref()?;
        let neighbors = self.layout.neighbors(session.track_id, session.placement_id);
        let range = resolve_gesture(
            session,
            pointer_x,
            self.viewport.zoom(),
            &neighbors,
            &self.rules,
        );
        let Some(range) = range else {
            trace!("candidate at x={} rejected", pointer_x);
            return None;
        };

        let placement_id = session.placement_id;
        if let Some(placement) = self.layout.placement_mut(placement_id) {
            placement.range = range;
        }
        if let Some(session) = self.drag.as_mut() {
            session.current = range;
        }
        trace!("preview {} -> {:?}", placement_id, range);
        Some(range)
    }

    /// Release the pointer and commit the last accepted range as one undoable edit.
    pub fn end_gesture(&mut self) -> Option<TimeRange> {
        let session = self.drag.take()?;
        if !session.changed() {
            return Some(session.original);
        }

        // The history entry must record the pre-drag range as its inverse.
        if let Some(placement) = self.layout.placement_mut(session.placement_id) {
            placement.range = session.original;
        }
        let command = TimelineCommand::SetRange {
            placement_id: session.placement_id,
            range: session.current,
        };
        match self.history.apply(&mut self.layout, command) {
            Ok(()) => {
                debug!(
                    "committed {:?} on {}: {} +{}",
                    session.kind,
                    session.placement_id,
                    format_precise(session.current.start),
                    format_precise(session.current.duration)
                );
                self.playback.reclamp(self.total_duration());
                Some(session.current)
            }
            Err(err) => {
                warn!("gesture on {} not committed: {}", session.placement_id, err);
                Some(session.original)
            }
        }
    }

    fn cancel_gesture(&mut self) {
        let Some(session) = self.drag.take() else {
            return;
        };
        if let Some(placement) = self.layout.placement_mut(session.placement_id) {
            placement.range = session.original;
        }
        debug!("cancelled {:?} on {}", session.kind, session.placement_id);
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zoom = self.viewport.set_zoom(zoom);
        debug!("zoom set to {:.2} px/s", zoom);
        zoom
    }

    pub fn zoom_by(&mut self, factor: f64) -> f64 {
        let zoom = self.viewport.zoom_by(factor);
        debug!("zoom set to {:.2} px/s", zoom);
        zoom
    }

    /// Zoom so the whole timeline fits `viewport_width_px`.
    pub fn fit_to_view(&mut self, viewport_width_px: f64) -> f64 {
        let total = self.total_duration();
        let zoom = self.viewport.fit(viewport_width_px, total);
        debug!(
            "fit {} into {}px -> {:.2} px/s",
            format_precise(total),
            viewport_width_px,
            zoom
        );
        zoom
    }

    pub fn set_playhead(&mut self, time: Seconds) -> Seconds {
        let total = self.total_duration();
        self.playback.seek_to(time, total)
    }

    /// Pointer down on the ruler or playhead handle.
    pub fn begin_scrub(&mut self, pointer_x: f64) -> Seconds {
        if self.drag.is_some() {
            return self.playback.time();
        }
        self.playback.begin_scrub();
        self.scrub_to(pointer_x)
    }

    pub fn update_scrub(&mut self, pointer_x: f64) -> Seconds {
        if !self.playback.is_scrubbing() {
            return self.playback.time();
        }
        self.scrub_to(pointer_x)
    }

    pub fn end_scrub(&mut self) -> Seconds {
        self.playback.end_scrub();
        self.playback.time()
    }

    fn scrub_to(&mut self, pointer_x: f64) -> Seconds {
        let time = self.viewport.px_to_time(pointer_x);
        self.set_playhead(time)
    }

    pub fn toggle_play(&mut self) -> bool {
        let total = self.total_duration();
        let playing = self.playback.toggle(total);
        debug!("playback {}", if playing { "started" } else { "paused" });
        playing
    }

    /// One animation tick of the playback clock.
    pub fn tick(&mut self) -> Seconds {
        let total = self.total_duration();
        self.playback.tick(self.config.tick_seconds, total)
    }

    pub fn skip_back(&mut self) -> Seconds {
        self.set_playhead(self.playback.time() - self.config.skip_seconds)
    }

    pub fn skip_forward(&mut self) -> Seconds {
        self.set_playhead(self.playback.time() + self.config.skip_seconds)
    }

    /// Remove a placement as one undoable edit. Unknown ids are ignored.
    pub fn remove_placement(&mut self, placement_id: PlacementId) -> Option<Placement> {
        let removed = self.layout.placement(placement_id)?.clone();
        if self
            .drag
            .as_ref()
            .is_some_and(|d| d.placement_id == placement_id)
        {
            self.drag = None;
        }
        if let Err(err) = self.history.apply(
            &mut self.layout,
            TimelineCommand::RemovePlacement { placement_id },
        ) {
            warn!("remove of {} failed: {}", placement_id, err);
            return None;
        }
        debug!("removed {} ({})", placement_id, removed.name);
        self.playback.reclamp(self.total_duration());
        Some(removed)
    }

    /// Locking the track under an active gesture cancels it and restores the
    /// placement to its pre-drag range.
    pub fn set_track_flags(&mut self, track_id: TrackId, flags: TrackFlags) -> bool {
        if flags.locked && self.drag.as_ref().is_some_and(|d| d.track_id == track_id) {
            self.cancel_gesture();
        }
        match self
            .history
            .apply(&mut self.layout, TimelineCommand::SetTrackFlags { track_id, flags })
        {
            Ok(()) => true,
            Err(err) => {
                warn!("track flags not applied: {}", err);
                false
            }
        }
    }

    pub fn undo(&mut self) -> Result<(), TimelineError> {
        if self.drag.is_some() {
            return Err(TimelineError::InvalidOp("gesture in progress".to_string()));
        }
        self.history.undo(&mut self.layout)?;
        self.playback.reclamp(self.total_duration());
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), TimelineError> {
        if self.drag.is_some() {
            return Err(TimelineError::InvalidOp("gesture in progress".to_string()));
        }
        self.history.redo(&mut self.layout)?;
        self.playback.reclamp(self.total_duration());
        Ok(())
    }

    /// Tracks that should be heard: soloed ones if any solo is set, else all unmuted.
    pub fn audible_tracks(&self) -> Vec<TrackId> {
        let any_solo = self.layout.tracks.iter().any(|t| t.flags.solo);
        self.layout
            .tracks
            .iter()
            .filter(|t| !t.flags.muted && (!any_solo || t.flags.solo))
            .map(|t| t.id)
            .collect()
    }

    pub fn ruler(&self) -> Vec<RulerTick> {
        self.viewport
            .ruler(self.total_duration(), self.config.ruler_min_spacing_px)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        let mut tracks: Vec<&Track> = self.layout.tracks.iter().collect();
        tracks.sort_by_key(|t| t.order);
        let tracks = tracks
            .into_iter()
            .map(|track| {
                let mut placements: Vec<&Placement> = self
                    .layout
                    .placements
                    .iter()
                    .filter(|p| p.track_id == track.id)
                    .collect();
                placements.sort_by(|a, b| a.start().total_cmp(&b.start()));
                TrackSnapshot {
                    id: track.id,
                    name: track.name.clone(),
                    category: track.category,
                    flags: track.flags,
                    placements: placements
                        .into_iter()
                        .map(|p| PlacementView {
                            id: p.id,
                            clip_id: p.clip_id.clone(),
                            name: p.name.clone(),
                            category: p.category,
                            start: p.start(),
                            duration: p.duration(),
                            end: p.end(),
                            x: self.viewport.time_to_px(p.start()),
                            width: self.viewport.time_to_px(p.duration()),
                            thumbnail: p.thumbnail.clone(),
                        })
                        .collect(),
                }
            })
            .collect();
        LayoutSnapshot {
            zoom: self.viewport.zoom(),
            total_duration: self.total_duration(),
            playhead: self.playback.time(),
            playing: self.playback.is_playing(),
            tracks,
        }
    }
}

/// Render-ready view of the engine.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayoutSnapshot {
    pub zoom: f64,
    pub total_duration: Seconds,
    pub playhead: Seconds,
    pub playing: bool,
    pub tracks: Vec<TrackSnapshot>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackSnapshot {
    pub id: TrackId,
    pub name: String,
    pub category: TrackCategory,
    pub flags: TrackFlags,
    pub placements: Vec<PlacementView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacementView {
    pub id: PlacementId,
    pub clip_id: String,
    pub name: String,
    pub category: ClipCategory,
    pub start: Seconds,
    pub duration: Seconds,
    pub end: Seconds,
    pub x: f64,
    pub width: f64,
    pub thumbnail: Option<String>,
}
