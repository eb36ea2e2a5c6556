//! Shared test fixtures for wolfreel integration tests
//!
//! In your test file, add:
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use wolfreel::{GameEvent, Renderer, ReplayPayload, Result, StaticReplaySource};

/// A renderer call observed by [`RecordingRenderer`], in received order.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    ShowDay(u32),
    DayBackground,
    NightBackground,
    ShowPlayer(u32),
    HidePlayer,
    Speak {
        label: String,
        text: String,
        thought: bool,
    },
    ShowVote {
        voter: u32,
        target: u32,
    },
    KillPlayer(u32),
}

/// Renderer that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<RendererCall>>>,
    show_thinking: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant that opts into the hidden-reasoning sequence
    pub fn with_thinking() -> Self {
        Self {
            show_thinking: true,
            ..Self::default()
        }
    }

    /// Snapshot of all calls received so far
    pub fn calls(&self) -> Vec<RendererCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: RendererCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn show_day(&self, day: u32) -> Result<()> {
        self.push(RendererCall::ShowDay(day));
        Ok(())
    }

    async fn show_day_background(&self) -> Result<()> {
        self.push(RendererCall::DayBackground);
        Ok(())
    }

    async fn show_night_background(&self) -> Result<()> {
        self.push(RendererCall::NightBackground);
        Ok(())
    }

    async fn show_player(&self, player: u32) -> Result<()> {
        self.push(RendererCall::ShowPlayer(player));
        Ok(())
    }

    async fn hide_player(&self) -> Result<()> {
        self.push(RendererCall::HidePlayer);
        Ok(())
    }

    async fn speak(&self, label: &str, _use_bubble: bool, text: &str, thought: bool) -> Result<()> {
        self.push(RendererCall::Speak {
            label: label.to_string(),
            text: text.to_string(),
            thought,
        });
        Ok(())
    }

    async fn show_vote(&self, voter: u32, target: u32) -> Result<()> {
        self.push(RendererCall::ShowVote { voter, target });
        Ok(())
    }

    async fn kill_player(&self, player: u32) -> Result<()> {
        self.push(RendererCall::KillPlayer(player));
        Ok(())
    }

    fn display_thinking(&self) -> bool {
        self.show_thinking
    }
}

/// Payload for the canonical three-event walkthrough:
/// game start, player 2 speaks, player 2 is eliminated.
pub fn scenario_payload() -> ReplayPayload {
    payload_from(serde_json::json!({
        "events": [
            {"type": "game_start", "player_idx": -1, "data": {"day": 1, "phase": "night"}},
            {"type": "speak", "player_idx": 2, "data": {"speak": "hi"}},
            {"type": "kill", "player_idx": 2}
        ],
        "total_duration": 12.5,
        "start_time": 1700000000.0
    }))
}

/// Source serving the canonical scenario
pub fn scenario_source() -> Arc<StaticReplaySource> {
    Arc::new(StaticReplaySource::new(scenario_payload()))
}

/// Source serving the given events
pub fn source_with(events: Vec<GameEvent>) -> Arc<StaticReplaySource> {
    Arc::new(StaticReplaySource::with_events(events))
}

/// Decode a JSON value into a payload, panicking on mismatch (test-only)
pub fn payload_from(value: serde_json::Value) -> ReplayPayload {
    serde_json::from_value(value).unwrap()
}

/// Source that serves its payloads in order, repeating the last one once
/// the queue runs dry.
pub struct SequenceSource {
    payloads: Mutex<Vec<ReplayPayload>>,
}

impl SequenceSource {
    pub fn new(payloads: Vec<ReplayPayload>) -> Self {
        Self {
            payloads: Mutex::new(payloads),
        }
    }
}

#[async_trait]
impl wolfreel::ReplaySource for SequenceSource {
    async fn fetch(&self) -> Result<ReplayPayload> {
        let mut payloads = self.payloads.lock().unwrap();
        if payloads.len() > 1 {
            Ok(payloads.remove(0))
        } else {
            payloads
                .first()
                .cloned()
                .ok_or_else(|| wolfreel::WolfreelError::load("sequence exhausted"))
        }
    }

    fn name(&self) -> &str {
        "sequence"
    }
}
