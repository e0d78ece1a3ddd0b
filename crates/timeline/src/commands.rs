use serde::{Deserialize, Serialize};

use crate::{Layout, Placement, PlacementId, TimeRange, TimelineError, TrackFlags, TrackId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TimelineCommand {
    InsertPlacement {
        placement: Placement,
        #[serde(default)]
        position: Option<usize>,
    },
    RemovePlacement {
        placement_id: PlacementId,
    },
    SetRange {
        placement_id: PlacementId,
        range: TimeRange,
    },
    SetTrackFlags {
        track_id: TrackId,
        flags: TrackFlags,
    },
}

/// Apply `command` to `layout`, returning the command that undoes it.
pub fn apply_command(
    layout: &mut Layout,
    command: TimelineCommand,
) -> Result<TimelineCommand, TimelineError> {
    match command {
        TimelineCommand::InsertPlacement {
            placement,
            position,
        } => insert_placement(layout, placement, position),
        TimelineCommand::RemovePlacement { placement_id } => {
            remove_placement(layout, placement_id)
        }
        TimelineCommand::SetRange {
            placement_id,
            range,
        } => set_range(layout, placement_id, range),
        TimelineCommand::SetTrackFlags { track_id, flags } => {
            set_track_flags(layout, track_id, flags)
        }
    }
}

fn insert_placement(
    layout: &mut Layout,
    placement: Placement,
    position: Option<usize>,
) -> Result<TimelineCommand, TimelineError> {
    if layout.placement(placement.id).is_some() {
        return Err(TimelineError::InvalidOp(format!(
            "placement already exists: {}",
            placement.id
        )));
    }
    let track = layout
        .track(placement.track_id)
        .ok_or(TimelineError::TrackNotFound(placement.track_id))?;
    if !track.category.accepts(placement.category) {
        return Err(TimelineError::IncompatibleCategory {
            clip: placement.category,
            track: track.category,
        });
    }
    validate_range(&placement.range)?;
    if let Some(other) = layout.collision(placement.track_id, placement.id, &placement.range) {
        return Err(TimelineError::Overlap(placement.id, other.id));
    }

    let placement_id = placement.id;
    let idx = position
        .unwrap_or(layout.placements.len())
        .min(layout.placements.len());
    layout.placements.insert(idx, placement);
    Ok(TimelineCommand::RemovePlacement { placement_id })
}

fn remove_placement(
    layout: &mut Layout,
    placement_id: PlacementId,
) -> Result<TimelineCommand, TimelineError> {
    let idx = layout
        .placements
        .iter()
        .position(|p| p.id == placement_id)
        .ok_or(TimelineError::PlacementNotFound(placement_id))?;
    let placement = layout.placements.remove(idx);
    Ok(TimelineCommand::InsertPlacement {
        placement,
        position: Some(idx),
    })
}

fn set_range(
    layout: &mut Layout,
    placement_id: PlacementId,
    range: TimeRange,
) -> Result<TimelineCommand, TimelineError> {
    validate_range(&range)?;
    let track_id = layout
        .placement(placement_id)
        .ok_or(TimelineError::PlacementNotFound(placement_id))?
        .track_id;
    if let Some(other) = layout.collision(track_id, placement_id, &range) {
        return Err(TimelineError::Overlap(placement_id, other.id));
    }
    let placement = layout
        .placement_mut(placement_id)
        .ok_or(TimelineError::PlacementNotFound(placement_id))?;
    let previous = std::mem::replace(&mut placement.range, range);
    Ok(TimelineCommand::SetRange {
        placement_id,
        range: previous,
    })
}

fn set_track_flags(
    layout: &mut Layout,
    track_id: TrackId,
    flags: TrackFlags,
) -> Result<TimelineCommand, TimelineError> {
    let track = layout
        .track_mut(track_id)
        .ok_or(TimelineError::TrackNotFound(track_id))?;
    let previous = std::mem::replace(&mut track.flags, flags);
    Ok(TimelineCommand::SetTrackFlags {
        track_id,
        flags: previous,
    })
}

fn validate_range(range: &TimeRange) -> Result<(), TimelineError> {
    if !(range.start.is_finite() && range.start >= 0.0) {
        return Err(TimelineError::InvalidOp(format!(
            "start must be a non-negative number, got {}",
            range.start
        )));
    }
    if !(range.duration.is_finite() && range.duration > 0.0) {
        return Err(TimelineError::InvalidOp(format!(
            "duration must be positive, got {}",
            range.duration
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct CommandHistory {
    undo_stack: Vec<TimelineCommand>,
    redo_stack: Vec<TimelineCommand>,
}

impl CommandHistory {
    pub fn apply(
        &mut self,
        layout: &mut Layout,
        command: TimelineCommand,
    ) -> Result<(), TimelineError> {
        let inverse = apply_command(layout, command)?;
        self.undo_stack.push(inverse);
        self.redo_stack.clear();
        Ok(())
    }

    pub fn undo(&mut self, layout: &mut Layout) -> Result<(), TimelineError> {
        let command = self
            .undo_stack
            .pop()
            .ok_or(TimelineError::HistoryEmpty("undo stack"))?;
        let inverse = apply_command(layout, command)?;
        self.redo_stack.push(inverse);
        Ok(())
    }

    pub fn redo(&mut self, layout: &mut Layout) -> Result<(), TimelineError> {
        let command = self
            .redo_stack
            .pop()
            .ok_or(TimelineError::HistoryEmpty("redo stack"))?;
        let inverse = apply_command(layout, command)?;
        self.undo_stack.push(inverse);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
