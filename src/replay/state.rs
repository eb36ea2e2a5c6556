//! Playback position and mode

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SPEED;

/// Where playback currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// No log loaded
    Idle,
    /// Log loaded, not playing
    Ready,
    /// Autoplay cadence active
    Playing,
    /// Reached the last event while playing
    Finished,
}

/// Mutable playback state: position, play mode, speed.
///
/// Invariant: `position` is `Some(i)` with `i` in range exactly while a
/// non-empty log is loaded, `None` otherwise. The engine owns the single
/// instance; nothing else mutates it.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    position: Option<usize>,
    playing: bool,
    speed: f64,
    finished: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position: None,
            playing: false,
            speed: DEFAULT_SPEED,
            finished: false,
        }
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.position.is_none() {
            PlaybackStatus::Idle
        } else if self.playing {
            PlaybackStatus::Playing
        } else if self.finished {
            PlaybackStatus::Finished
        } else {
            PlaybackStatus::Ready
        }
    }

    /// Re-initialize for a freshly loaded log of `len` events. Speed is a
    /// mode, not a position; it survives reloads.
    pub(crate) fn begin(&mut self, len: usize) {
        self.position = if len > 0 { Some(0) } else { None };
        self.playing = false;
        self.finished = false;
    }

    /// Return to the unset/idle configuration. Speed survives, matching
    /// a speed selector that keeps its value across resets.
    pub(crate) fn clear(&mut self) {
        self.position = None;
        self.playing = false;
        self.finished = false;
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        if playing {
            self.finished = false;
        }
    }

    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Mark the end of autoplay at the last event.
    pub(crate) fn finish(&mut self) {
        self.playing = false;
        self.finished = true;
    }

    /// Advance one index, clamped at `last`. Returns the new position, or
    /// `None` when nothing moved.
    pub(crate) fn step_forward(&mut self, last: usize) -> Option<usize> {
        let position = self.position?;
        if position >= last {
            return None;
        }
        self.position = Some(position + 1);
        self.finished = false;
        self.position
    }

    /// Regress one index, clamped at 0. Returns the new position, or `None`
    /// when nothing moved.
    pub(crate) fn step_back(&mut self) -> Option<usize> {
        let position = self.position?;
        if position == 0 {
            return None;
        }
        self.position = Some(position - 1);
        self.finished = false;
        self.position
    }

    /// Jump to `target` clamped into `[0, last]`. Returns the landing index.
    pub(crate) fn seek(&mut self, target: usize, last: usize) -> usize {
        let clamped = target.min(last);
        self.position = Some(clamped);
        self.finished = false;
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let state = PlaybackState::new();
        assert_eq!(state.status(), PlaybackStatus::Idle);
        assert_eq!(state.position(), None);
        assert!(!state.is_playing());
        assert_eq!(state.speed(), DEFAULT_SPEED);
    }

    #[test]
    fn test_begin_and_clear() {
        let mut state = PlaybackState::new();
        state.set_speed(4.0);

        state.begin(3);
        assert_eq!(state.status(), PlaybackStatus::Ready);
        assert_eq!(state.position(), Some(0));
        assert_eq!(state.speed(), 4.0);

        state.clear();
        assert_eq!(state.status(), PlaybackStatus::Idle);
        assert_eq!(state.position(), None);
        assert_eq!(state.speed(), 4.0);
    }

    #[test]
    fn test_begin_with_empty_log_stays_unset() {
        let mut state = PlaybackState::new();
        state.begin(0);
        assert_eq!(state.status(), PlaybackStatus::Idle);
        assert_eq!(state.position(), None);
    }

    #[test]
    fn test_step_clamping() {
        let mut state = PlaybackState::new();
        state.begin(3);

        assert_eq!(state.step_back(), None);
        assert_eq!(state.step_forward(2), Some(1));
        assert_eq!(state.step_forward(2), Some(2));
        assert_eq!(state.step_forward(2), None);
        assert_eq!(state.position(), Some(2));
        assert_eq!(state.step_back(), Some(1));
    }

    #[test]
    fn test_seek_clamps_to_last() {
        let mut state = PlaybackState::new();
        state.begin(3);
        assert_eq!(state.seek(100, 2), 2);
        assert_eq!(state.seek(1, 2), 1);
        assert_eq!(state.seek(0, 2), 0);
    }

    #[test]
    fn test_finish_and_navigation_out_of_finished() {
        let mut state = PlaybackState::new();
        state.begin(3);
        state.set_playing(true);
        assert_eq!(state.status(), PlaybackStatus::Playing);

        state.seek(2, 2);
        state.finish();
        assert_eq!(state.status(), PlaybackStatus::Finished);
        assert!(!state.is_playing());

        // stepping back out of Finished lands in Ready
        assert_eq!(state.step_back(), Some(1));
        assert_eq!(state.status(), PlaybackStatus::Ready);

        // playing again clears the finished flag
        state.finish();
        state.set_playing(true);
        assert_eq!(state.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn test_forward_no_op_keeps_finished() {
        let mut state = PlaybackState::new();
        state.begin(2);
        state.seek(1, 1);
        state.finish();

        assert_eq!(state.step_forward(1), None);
        assert_eq!(state.status(), PlaybackStatus::Finished);
    }
}
