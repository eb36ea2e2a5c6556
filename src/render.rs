//! Renderer capability boundary
//!
//! The engine never draws anything itself. Each visited event is interpreted
//! into calls against a [`Renderer`], injected at engine construction. The
//! shipped implementations are deliberately thin; real presentation layers
//! (a browser stage, a TUI) live outside this crate.

use async_trait::async_trait;

use crate::error::Result;

/// Capability set the engine depends on to present a single game event.
///
/// Calls within one dispatch are awaited in sequence and may be long-running.
/// A navigation command supersedes an in-flight dispatch, so implementations
/// must treat every call as idempotent and safe to interrupt at any await
/// point: a half-finished animation followed by a fresh `show_*` call must
/// not corrupt the presentation.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Present a day-counter transition
    async fn show_day(&self, day: u32) -> Result<()>;

    /// Switch the stage to the daytime backdrop
    async fn show_day_background(&self) -> Result<()>;

    /// Switch the stage to the nighttime backdrop
    async fn show_night_background(&self) -> Result<()>;

    /// Bring a player into focus
    async fn show_player(&self, player: u32) -> Result<()>;

    /// Drop the focused player
    async fn hide_player(&self) -> Result<()>;

    /// Present a line of speech.
    ///
    /// `label` identifies the speaker, `use_bubble` selects the bubble
    /// presentation, and `thought` marks internal reasoning rather than a
    /// public statement.
    async fn speak(&self, label: &str, use_bubble: bool, text: &str, thought: bool) -> Result<()>;

    /// Present one player voting for another
    async fn show_vote(&self, voter: u32, target: u32) -> Result<()>;

    /// Mark a player as eliminated
    async fn kill_player(&self, player: u32) -> Result<()>;

    /// Whether this renderer wants the hidden-reasoning sequence before
    /// speech-like events. Off by default.
    fn display_thinking(&self) -> bool {
        false
    }
}

/// Renderer that presents nothing. Useful for headless playback where only
/// the progress channel is consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

#[async_trait]
impl Renderer for NullRenderer {
    async fn show_day(&self, _day: u32) -> Result<()> {
        Ok(())
    }

    async fn show_day_background(&self) -> Result<()> {
        Ok(())
    }

    async fn show_night_background(&self) -> Result<()> {
        Ok(())
    }

    async fn show_player(&self, _player: u32) -> Result<()> {
        Ok(())
    }

    async fn hide_player(&self) -> Result<()> {
        Ok(())
    }

    async fn speak(
        &self,
        _label: &str,
        _use_bubble: bool,
        _text: &str,
        _thought: bool,
    ) -> Result<()> {
        Ok(())
    }

    async fn show_vote(&self, _voter: u32, _target: u32) -> Result<()> {
        Ok(())
    }

    async fn kill_player(&self, _player: u32) -> Result<()> {
        Ok(())
    }
}
