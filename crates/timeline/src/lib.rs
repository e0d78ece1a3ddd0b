use thiserror::Error;

mod model;
pub use model::*;
mod commands;
pub use commands::*;
mod config;
pub use config::*;

pub mod engine;
pub mod gesture;
pub mod playback;
pub mod seed;
pub mod snap;
pub mod viewport;

pub use engine::{LayoutSnapshot, PlacementView, TimelineEngine, TrackSnapshot};
pub use gesture::{DragSession, GestureKind, GestureRules};
pub use playback::{format_clock, format_precise, PlaybackClock};
pub use seed::{ClipSource, MatchedClip};
pub use viewport::{RulerTick, Viewport};

/// Timeline positions and lengths, in seconds.
pub type Seconds = f64;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid operation: {0}")]
    InvalidOp(String),
    #[error("placement not found: {0}")]
    PlacementNotFound(PlacementId),
    #[error("track not found: {0}")]
    TrackNotFound(TrackId),
    #[error("placement {0} would overlap {1}")]
    Overlap(PlacementId, PlacementId),
    #[error("{clip} placement cannot go on a {track} track")]
    IncompatibleCategory {
        clip: ClipCategory,
        track: TrackCategory,
    },
    #[error("history empty: {0}")]
    HistoryEmpty(&'static str),
}
