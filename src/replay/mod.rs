//! Replay playback engine
//!
//! This module holds the whole playback core:
//! - [`EventLog`]: the immutable, ordered log of recorded events
//! - [`PlaybackState`]: position, play mode, and speed
//! - [`Ticker`]: the repeating-callback primitive driving autoplay
//! - [`ReplayEngine`]: the command surface tying everything together
//!
//! # Usage
//!
//! ```rust,ignore
//! use wolfreel::replay::ReplayEngine;
//! use wolfreel::{FileReplaySource, NullRenderer, PlaybackOptions};
//!
//! let mut engine = ReplayEngine::new(
//!     Arc::new(FileReplaySource::new("./replay.json")),
//!     Arc::new(NullRenderer),
//!     PlaybackOptions::default(),
//! )?;
//!
//! engine.load().await?;
//! engine.toggle_play_pause()?;   // autoplay until the last event
//! ```

pub mod engine;
pub mod log;
pub mod state;
pub mod ticker;

pub use engine::{LoadSummary, ProgressSnapshot, ReplayEngine};
pub use log::EventLog;
pub use state::{PlaybackState, PlaybackStatus};
pub use ticker::{cadence_period, Ticker};
