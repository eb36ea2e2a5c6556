#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # Wolfreel
//!
//! Wolfreel is a replay playback engine for recorded social-deduction
//! (werewolf) games: it loads a finite, ordered log of game events and lets
//! an operator step through, auto-play, pause, rewind, fast-forward, and
//! scrub that log at variable speed, forwarding each visited event to a
//! rendering collaborator for presentation.
//!
//! ## Features
//!
//! - **Full navigation surface**: play/pause, single-step both directions,
//!   scrubbing with out-of-range clamping, speed changes mid-playback
//! - **Pluggable collaborators**: the log source and the renderer are
//!   injected traits; the engine owns no I/O or presentation of its own
//! - **Progress channel**: every position change publishes a snapshot on a
//!   watch channel, so UIs subscribe instead of polling
//! - **Lenient log format**: unknown event kinds and missing fields degrade
//!   gracefully instead of failing the whole replay
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wolfreel::{FileReplaySource, NullRenderer, PlaybackOptions, ReplayEngine};
//!
//! #[tokio::main]
//! async fn main() -> wolfreel::Result<()> {
//!     let source = Arc::new(FileReplaySource::new("./replay.json"));
//!     let renderer = Arc::new(NullRenderer);
//!     let mut engine = ReplayEngine::new(source, renderer, PlaybackOptions::default())?;
//!
//!     let summary = engine.load().await?;
//!     println!("loaded {} events", summary.events);
//!
//!     engine.toggle_play_pause()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`replay`]: the playback core (log, state machine, ticker, engine)
//! - [`events`]: the game event model and descriptions
//! - [`source`]: log source boundary (HTTP, file, in-memory)
//! - [`render`]: renderer capability boundary
//! - [`config`]: playback options and the optional TOML config file
//! - [`error`]: error types and `Result` alias

pub mod config;
pub mod error;
pub mod events;
pub mod render;
pub mod replay;
pub mod source;

pub use config::{ConfigFile, PlaybackOptions, SPEED_PRESETS};
pub use error::{Result, WolfreelError};
pub use events::{EventAction, GameEvent, Phase};
pub use render::{NullRenderer, Renderer};
pub use replay::{
    EventLog, LoadSummary, PlaybackState, PlaybackStatus, ProgressSnapshot, ReplayEngine, Ticker,
};
pub use source::{
    FileReplaySource, HttpReplaySource, ReplayPayload, ReplaySource, StaticReplaySource,
};
