//! Game event model for replay playback
//!
//! Events arrive as JSON records of the form
//! `{ "type": string, "timestamp": number, "player_idx": int, "data": object }`,
//! where the shape of `data` depends on `type`. Deserialization is lenient by
//! contract: an unrecognized `type` becomes [`EventAction::Unknown`] (the raw
//! tag is preserved for display), and missing `data` subfields fall back to
//! defaults rather than failing the whole log.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// One recorded game event.
///
/// `player_idx` is absent for global events; the recorder also uses `-1` as
/// an "no player" sentinel, which [`GameEvent::player`] normalizes away.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawEvent")]
pub struct GameEvent {
    /// Player the event is attributed to, if any
    pub player_idx: Option<i64>,
    /// Recording timestamp (seconds since epoch), informational only
    pub timestamp: Option<f64>,
    /// What happened
    pub action: EventAction,
}

/// Day or night phase of a game day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    Day,
    /// Games start at night, so night is the fallback for anything else
    #[default]
    Night,
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "day" { Phase::Day } else { Phase::Night })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Day => write!(f, "day"),
            Phase::Night => write!(f, "night"),
        }
    }
}

/// Payload of `game_start` and `day_change` events.
#[derive(Debug, Clone, Deserialize)]
pub struct PhaseChange {
    #[serde(default = "default_day")]
    pub day: u32,
    #[serde(default)]
    pub phase: Phase,
}

impl Default for PhaseChange {
    fn default() -> Self {
        Self {
            day: default_day(),
            phase: Phase::default(),
        }
    }
}

fn default_day() -> u32 {
    1
}

/// Payload of a `speak` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Speech {
    #[serde(default)]
    pub speak: String,
    #[serde(default)]
    pub thinking: Option<String>,
}

/// Payload of a `vote` event. A target of `-1` records an abstention.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ballot {
    #[serde(default = "no_target", deserialize_with = "lenient_target")]
    pub vote: i64,
    #[serde(default)]
    pub thinking: Option<String>,
}

impl Ballot {
    /// Voted-for player, `None` for abstentions
    pub fn target(&self) -> Option<u32> {
        to_player(self.vote)
    }
}

/// Payload of a `divine` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Divination {
    #[serde(default = "no_target", deserialize_with = "lenient_target")]
    pub divine: i64,
    #[serde(default)]
    pub thinking: Option<String>,
}

impl Divination {
    pub fn target(&self) -> Option<u32> {
        to_player(self.divine)
    }
}

/// Payload of a `wolf_kill` event.
///
/// The recorder stores the wolf's rationale under `reason`; `thinking` still
/// gates whether the rationale is presented at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WolfKill {
    #[serde(default = "no_target", deserialize_with = "lenient_target")]
    pub kill: i64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
}

impl WolfKill {
    pub fn target(&self) -> Option<u32> {
        to_player(self.kill)
    }

    /// Text for the thought bubble: the kill reason, falling back to the raw
    /// thinking text. `None` when the event carries no thinking at all.
    pub fn rationale(&self) -> Option<&str> {
        let thinking = self.thinking.as_deref()?;
        Some(self.reason.as_deref().unwrap_or(thinking))
    }
}

/// Payload of a `witch_decision` event. `-1` (or `false`, which older
/// recordings emit for an unused cure) means the potion was not used.
#[derive(Debug, Clone, Deserialize)]
pub struct WitchDecision {
    #[serde(default = "no_target", deserialize_with = "lenient_target")]
    pub cure: i64,
    #[serde(default = "no_target", deserialize_with = "lenient_target")]
    pub poison: i64,
    #[serde(default)]
    pub thinking: Option<String>,
}

impl Default for WitchDecision {
    fn default() -> Self {
        Self {
            cure: no_target(),
            poison: no_target(),
            thinking: None,
        }
    }
}

impl WitchDecision {
    pub fn cure_target(&self) -> Option<u32> {
        to_player(self.cure)
    }

    pub fn poison_target(&self) -> Option<u32> {
        to_player(self.poison)
    }
}

fn no_target() -> i64 {
    -1
}

fn to_player(idx: i64) -> Option<u32> {
    u32::try_from(idx).ok()
}

/// Accept a player index as a number, treating `null`/`false` as "no target".
fn lenient_target<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_i64().unwrap_or(no_target())),
        _ => Ok(no_target()),
    }
}

/// What a [`GameEvent`] records, one variant per recognized kind.
#[derive(Debug, Clone)]
pub enum EventAction {
    GameStart(PhaseChange),
    DayChange(PhaseChange),
    Speak(Speech),
    Vote(Ballot),
    Divine(Divination),
    WolfKill(WolfKill),
    WitchDecision(WitchDecision),
    Kill,
    Execute,
    /// Forward-compatibility fallback: the raw tag is kept for display
    Unknown { kind: String },
}

impl EventAction {
    fn parse(kind: &str, data: Value) -> Self {
        match kind {
            "game_start" => Self::GameStart(payload(data)),
            "day_change" => Self::DayChange(payload(data)),
            "speak" => Self::Speak(payload(data)),
            "vote" => Self::Vote(payload(data)),
            "divine" => Self::Divine(payload(data)),
            "wolf_kill" => Self::WolfKill(payload(data)),
            "witch_decision" => Self::WitchDecision(payload(data)),
            "kill" => Self::Kill,
            "execute" => Self::Execute,
            other => Self::Unknown {
                kind: other.to_string(),
            },
        }
    }
}

/// Decode a typed payload, falling back to defaults on any mismatch.
fn payload<T: DeserializeOwned + Default>(data: Value) -> T {
    serde_json::from_value(data).unwrap_or_default()
}

/// Raw wire shape, converted into [`GameEvent`] infallibly.
#[derive(Debug, Clone, Deserialize)]
struct RawEvent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    player_idx: Option<i64>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    data: Value,
}

impl From<RawEvent> for GameEvent {
    fn from(raw: RawEvent) -> Self {
        let action = EventAction::parse(&raw.kind, raw.data);
        GameEvent {
            player_idx: raw.player_idx,
            timestamp: raw.timestamp,
            action,
        }
    }
}

impl GameEvent {
    /// Player index normalized to an actual player, `None` for global events
    /// and the recorder's `-1` sentinel.
    pub fn player(&self) -> Option<u32> {
        self.player_idx.and_then(to_player)
    }

    /// Tag name of the event kind, for logging.
    pub fn kind_name(&self) -> &str {
        match &self.action {
            EventAction::GameStart(_) => "game_start",
            EventAction::DayChange(_) => "day_change",
            EventAction::Speak(_) => "speak",
            EventAction::Vote(_) => "vote",
            EventAction::Divine(_) => "divine",
            EventAction::WolfKill(_) => "wolf_kill",
            EventAction::WitchDecision(_) => "witch_decision",
            EventAction::Kill => "kill",
            EventAction::Execute => "execute",
            EventAction::Unknown { kind } => kind,
        }
    }

    /// Human-readable one-line description of the event.
    pub fn describe(&self) -> String {
        let who = self.player_label();
        match &self.action {
            EventAction::GameStart(change) => {
                format!("game started - day {}, phase {}", change.day, change.phase)
            }
            EventAction::DayChange(change) => {
                format!("day {}, phase {} begins", change.day, change.phase)
            }
            EventAction::Speak(speech) => format!("{who} said: \"{}\"", speech.speak),
            EventAction::Vote(ballot) => match ballot.target() {
                Some(target) => format!("{who} voted for player {target}"),
                None => format!("{who} abstained"),
            },
            EventAction::Divine(sight) => {
                format!("{who} divined {}", target_label(sight.target()))
            }
            EventAction::WolfKill(strike) => {
                format!("{who} chose to eliminate {}", target_label(strike.target()))
            }
            EventAction::WitchDecision(decision) => {
                let mut parts = Vec::new();
                if let Some(target) = decision.cure_target() {
                    parts.push(format!("cure player {target}"));
                }
                if let Some(target) = decision.poison_target() {
                    parts.push(format!("poison player {target}"));
                }
                let verdict = if parts.is_empty() {
                    "none".to_string()
                } else {
                    parts.join(", ")
                };
                format!("{who} decided: {verdict}")
            }
            EventAction::Kill => format!("{who} was eliminated"),
            EventAction::Execute => format!("{who} was executed"),
            EventAction::Unknown { kind } => format!("{kind}: {who}"),
        }
    }

    fn player_label(&self) -> String {
        target_label(self.player())
    }
}

fn target_label(player: Option<u32>) -> String {
    match player {
        Some(idx) => format!("player {idx}"),
        None => "player ?".to_string(),
    }
}

// Constructors used by demo sources and tests.
impl GameEvent {
    fn with_action(player_idx: Option<i64>, action: EventAction) -> Self {
        Self {
            player_idx,
            timestamp: None,
            action,
        }
    }

    /// A `game_start` event.
    pub fn game_start(day: u32, phase: Phase) -> Self {
        Self::with_action(None, EventAction::GameStart(PhaseChange { day, phase }))
    }

    /// A `day_change` event.
    pub fn day_change(day: u32, phase: Phase) -> Self {
        Self::with_action(None, EventAction::DayChange(PhaseChange { day, phase }))
    }

    /// A `speak` event without thinking text.
    pub fn speak(player: u32, text: impl Into<String>) -> Self {
        Self::with_action(
            Some(player as i64),
            EventAction::Speak(Speech {
                speak: text.into(),
                thinking: None,
            }),
        )
    }

    /// A `kill` event.
    pub fn kill(player: u32) -> Self {
        Self::with_action(Some(player as i64), EventAction::Kill)
    }

    /// An `execute` event.
    pub fn execute(player: u32) -> Self {
        Self::with_action(Some(player as i64), EventAction::Execute)
    }
}
