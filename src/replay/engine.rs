//! Replay engine: command surface and event dispatch
//!
//! The [`ReplayEngine`] owns the loaded [`EventLog`] and the
//! [`PlaybackState`] and is the only component that mutates them. Commands
//! mutate state under a short, await-free lock; the interpretation of the
//! visited event against the [`Renderer`] (the dispatch) runs on a spawned
//! task so a long-running presentation never blocks the next command. A new
//! navigation command supersedes the in-flight dispatch.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::PlaybackOptions;
use crate::error::{Result, WolfreelError};
use crate::events::{EventAction, GameEvent, Phase};
use crate::render::Renderer;
use crate::replay::log::EventLog;
use crate::replay::state::{PlaybackState, PlaybackStatus};
use crate::replay::ticker::{cadence_period, Ticker};
use crate::source::ReplaySource;

/// Description shown before any log is loaded
const WAITING_DESCRIPTION: &str = "waiting for replay data";

/// Read-model published on the progress channel after every position or
/// mode change. UI layers subscribe instead of polling the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Current position, `None` while no log is loaded
    pub index: Option<usize>,
    /// Number of events in the log
    pub total: usize,
    /// Whether autoplay is active
    pub playing: bool,
    /// Current speed multiplier
    pub speed: f64,
    /// Playback status
    pub status: PlaybackStatus,
    /// Human-readable description of the current event
    pub description: String,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            index: None,
            total: 0,
            playing: false,
            speed: crate::config::DEFAULT_SPEED,
            status: PlaybackStatus::Idle,
            description: WAITING_DESCRIPTION.to_string(),
        }
    }
}

/// Summary of a successful load, for caller-facing messaging.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    /// Number of events loaded
    pub events: usize,
    /// Recorded game length in seconds
    pub total_duration: f64,
}

/// Log + state, guarded together so every command sees both consistently.
struct Session {
    log: Option<EventLog>,
    state: PlaybackState,
}

impl Session {
    /// The loaded, non-empty log, or [`WolfreelError::NoReplay`]
    fn require_log(&self) -> Result<&EventLog> {
        match &self.log {
            Some(log) if !log.is_empty() => Ok(log),
            _ => Err(WolfreelError::NoReplay),
        }
    }

    fn current_event(&self) -> Option<&GameEvent> {
        self.log.as_ref()?.get(self.state.position()?)
    }
}

/// State shared with the ticker task and dispatch tasks.
struct Shared {
    session: RwLock<Session>,
    renderer: Arc<dyn Renderer>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    progress: watch::Sender<ProgressSnapshot>,
}

impl Shared {
    fn snapshot_of(session: &Session) -> ProgressSnapshot {
        ProgressSnapshot {
            index: session.state.position(),
            total: session.log.as_ref().map(EventLog::len).unwrap_or(0),
            playing: session.state.is_playing(),
            speed: session.state.speed(),
            status: session.state.status(),
            description: session
                .current_event()
                .map(GameEvent::describe)
                .unwrap_or_else(|| WAITING_DESCRIPTION.to_string()),
        }
    }

    fn publish(&self, session: &Session) {
        self.progress.send_replace(Self::snapshot_of(session));
    }

    /// Hand an event to the renderer on a fresh task, superseding whatever
    /// dispatch is still in flight.
    fn dispatch(shared: &Arc<Shared>, event: GameEvent) {
        let mut in_flight = shared.in_flight.lock();
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
        let renderer = Arc::clone(&shared.renderer);
        *in_flight = Some(tokio::spawn(async move {
            if let Err(e) = render_event(renderer.as_ref(), &event).await {
                error!(
                    error = %e,
                    kind = event.kind_name(),
                    "renderer failed while presenting event"
                );
            }
        }));
    }

    /// One autoplay advance. Returns `false` when the cadence must end.
    fn advance_autoplay(shared: &Arc<Shared>) -> bool {
        let mut session = shared.session.write();
        if !session.state.is_playing() {
            // paused between ticks; this cadence is stale
            return false;
        }
        let Some(last) = session.log.as_ref().and_then(EventLog::last_index) else {
            return false;
        };
        let Some(position) = session.state.position() else {
            return false;
        };

        if position >= last {
            session.state.finish();
            shared.publish(&session);
            info!("playback complete");
            return false;
        }

        session.state.seek(position + 1, last);
        shared.publish(&session);
        if let Some(event) = session.current_event().cloned() {
            Shared::dispatch(shared, event);
        }
        true
    }
}

/// Replay playback engine.
///
/// Construction injects the two collaborators: the [`ReplaySource`] that
/// supplies the log and the [`Renderer`] that presents events. All playback
/// state is private to the engine.
pub struct ReplayEngine {
    shared: Arc<Shared>,
    source: Arc<dyn ReplaySource>,
    ticker: Ticker,
    options: PlaybackOptions,
}

impl ReplayEngine {
    /// Create an engine in the idle configuration.
    pub fn new(
        source: Arc<dyn ReplaySource>,
        renderer: Arc<dyn Renderer>,
        options: PlaybackOptions,
    ) -> Result<Self> {
        options.validate()?;
        let (progress, _) = watch::channel(ProgressSnapshot::default());
        let mut state = PlaybackState::new();
        state.set_speed(options.speed);

        Ok(Self {
            shared: Arc::new(Shared {
                session: RwLock::new(Session { log: None, state }),
                renderer,
                in_flight: Mutex::new(None),
                progress,
            }),
            source,
            ticker: Ticker::new(),
            options,
        })
    }

    /// Subscribe to progress snapshots. The receiver immediately holds the
    /// current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.shared.progress.subscribe()
    }

    /// Fetch the log from the source and install it.
    ///
    /// A failed fetch, a malformed payload, or a payload carrying an `error`
    /// field leaves the previously loaded log and the playback state
    /// untouched. On success playback rewinds to index 0, paused, and the
    /// first event is dispatched for the initial display.
    pub async fn load(&mut self) -> Result<LoadSummary> {
        debug!(source = self.source.name(), "loading replay");
        let payload = self.source.fetch().await?;
        if let Some(reason) = payload.error {
            warn!(source = self.source.name(), reason = %reason, "replay source reported an error");
            return Err(WolfreelError::SourceReported(reason));
        }

        let log = EventLog::from_payload(payload);
        let summary = LoadSummary {
            events: log.len(),
            total_duration: log.total_duration(),
        };

        self.ticker.stop();
        {
            let mut session = self.shared.session.write();
            session.state.begin(log.len());
            session.log = Some(log);
            self.shared.publish(&session);
            if let Some(event) = session.current_event().cloned() {
                Shared::dispatch(&self.shared, event);
            }
        }

        info!(
            events = summary.events,
            total_duration = summary.total_duration,
            "replay loaded"
        );
        Ok(summary)
    }

    /// Discard the log and return to the idle configuration. Always
    /// succeeds; the ticker is stopped before this returns.
    pub fn reset(&mut self) {
        self.ticker.stop();
        let mut session = self.shared.session.write();
        session.log = None;
        session.state.clear();
        self.shared.publish(&session);
        info!("replay reset");
    }

    /// Toggle between playing and paused. Returns the new playing flag.
    ///
    /// Starting playback requires a non-empty log. Pausing stops the ticker
    /// before this returns; an already-dispatched presentation is left to
    /// finish on its own.
    pub fn toggle_play_pause(&mut self) -> Result<bool> {
        let playing = {
            let mut session = self.shared.session.write();
            session.require_log()?;
            let playing = !session.state.is_playing();
            session.state.set_playing(playing);
            self.shared.publish(&session);
            playing
        };

        if playing {
            self.start_cadence();
            debug!(speed = self.current_speed(), "autoplay started");
        } else {
            self.ticker.stop();
            debug!("autoplay paused");
        }
        Ok(playing)
    }

    /// Advance one event and dispatch it. Returns `false` at the last
    /// index (no-op). Never starts or stops the autoplay cadence.
    pub fn step_forward(&self) -> Result<bool> {
        let mut session = self.shared.session.write();
        let last = session.require_log()?.last_index().unwrap_or(0);
        if session.state.step_forward(last).is_none() {
            return Ok(false);
        }
        self.shared.publish(&session);
        if let Some(event) = session.current_event().cloned() {
            Shared::dispatch(&self.shared, event);
        }
        Ok(true)
    }

    /// Regress one event and dispatch it. Returns `false` at index 0
    /// (no-op).
    pub fn step_backward(&self) -> Result<bool> {
        let mut session = self.shared.session.write();
        session.require_log()?;
        if session.state.step_back().is_none() {
            return Ok(false);
        }
        self.shared.publish(&session);
        if let Some(event) = session.current_event().cloned() {
            Shared::dispatch(&self.shared, event);
        }
        Ok(true)
    }

    /// Jump to `index`, clamped into range, and dispatch the event there.
    /// Play/pause mode is unchanged. Returns the landing index.
    pub fn seek(&self, index: usize) -> Result<usize> {
        let mut session = self.shared.session.write();
        let last = session.require_log()?.last_index().unwrap_or(0);
        let landed = session.state.seek(index, last);
        self.shared.publish(&session);
        if let Some(event) = session.current_event().cloned() {
            Shared::dispatch(&self.shared, event);
        }
        Ok(landed)
    }

    /// Change the speed multiplier. Any positive value is accepted. While
    /// playing, the cadence restarts so the next tick lands one new period
    /// out, with no phase carried over from the old cadence.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(WolfreelError::InvalidSpeed(speed));
        }
        let playing = {
            let mut session = self.shared.session.write();
            session.state.set_speed(speed);
            self.shared.publish(&session);
            session.state.is_playing()
        };
        if playing {
            self.start_cadence();
        }
        debug!(speed, "speed changed");
        Ok(())
    }

    /// Wait for the in-flight dispatch, if any, to finish presenting.
    /// Useful when stepping manually and presentation order matters.
    pub async fn settle(&self) {
        let task = self.shared.in_flight.lock().take();
        if let Some(task) = task {
            // an aborted or panicked dispatch is already logged; nothing to do
            let _ = task.await;
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.shared.session.read().state.position()
    }

    pub fn total_events(&self) -> usize {
        self.shared
            .session
            .read()
            .log
            .as_ref()
            .map(EventLog::len)
            .unwrap_or(0)
    }

    pub fn is_playing(&self) -> bool {
        self.shared.session.read().state.is_playing()
    }

    pub fn current_speed(&self) -> f64 {
        self.shared.session.read().state.speed()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.shared.session.read().state.status()
    }

    /// Whether a non-empty log is loaded
    pub fn has_log(&self) -> bool {
        self.shared.session.read().require_log().is_ok()
    }

    /// Current progress snapshot, for callers that do not hold a
    /// subscription
    pub fn snapshot(&self) -> ProgressSnapshot {
        Shared::snapshot_of(&self.shared.session.read())
    }

    fn start_cadence(&mut self) {
        let period = cadence_period(self.options.base_interval(), self.current_speed());
        let shared = Arc::clone(&self.shared);
        self.ticker.start(period, move || {
            let shared = Arc::clone(&shared);
            async move { Shared::advance_autoplay(&shared) }
        });
    }
}

impl Drop for ReplayEngine {
    fn drop(&mut self) {
        // the ticker stops itself; reap the dispatch task as well
        if let Some(task) = self.shared.in_flight.lock().take() {
            task.abort();
        }
    }
}

/// Interpret one event into renderer calls, in order, awaiting each.
async fn render_event(renderer: &dyn Renderer, event: &GameEvent) -> Result<()> {
    match &event.action {
        EventAction::GameStart(change) => renderer.show_day(change.day).await,
        EventAction::DayChange(change) => match change.phase {
            Phase::Day => renderer.show_day_background().await,
            Phase::Night => renderer.show_night_background().await,
        },
        EventAction::Speak(speech) => {
            let Some(player) = event.player() else {
                return Ok(());
            };
            render_thinking(renderer, player, speech.thinking.as_deref()).await?;
            renderer
                .speak(&format!("player {player}"), true, &speech.speak, false)
                .await
        }
        EventAction::Vote(ballot) => {
            let Some(player) = event.player() else {
                return Ok(());
            };
            render_thinking(renderer, player, ballot.thinking.as_deref()).await?;
            match ballot.target() {
                Some(target) => renderer.show_vote(player, target).await,
                // abstentions have nothing to point at
                None => Ok(()),
            }
        }
        EventAction::Divine(sight) => {
            let Some(player) = event.player() else {
                return Ok(());
            };
            render_thinking(renderer, player, sight.thinking.as_deref()).await
        }
        EventAction::WolfKill(strike) => {
            let Some(player) = event.player() else {
                return Ok(());
            };
            render_thinking(renderer, player, strike.rationale()).await
        }
        EventAction::WitchDecision(decision) => {
            let Some(player) = event.player() else {
                return Ok(());
            };
            render_thinking(renderer, player, decision.thinking.as_deref()).await
        }
        EventAction::Kill | EventAction::Execute => match event.player() {
            Some(player) => renderer.kill_player(player).await,
            None => Ok(()),
        },
        EventAction::Unknown { .. } => Ok(()),
    }
}

/// The optional hidden-reasoning sequence: focus the player, speak the
/// thought, drop focus. Runs only when the event carries thinking text and
/// the renderer opts in.
async fn render_thinking(
    renderer: &dyn Renderer,
    player: u32,
    thinking: Option<&str>,
) -> Result<()> {
    let Some(text) = thinking else {
        return Ok(());
    };
    if !renderer.display_thinking() {
        return Ok(());
    }
    renderer.show_player(player).await?;
    renderer
        .speak(&format!("player {player} thinking"), true, text, true)
        .await?;
    renderer.hide_player().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullRenderer;
    use crate::source::StaticReplaySource;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn scenario_source() -> Arc<StaticReplaySource> {
        Arc::new(StaticReplaySource::with_events(vec![
            GameEvent::game_start(1, Phase::Night),
            GameEvent::speak(2, "hi"),
            GameEvent::kill(2),
        ]))
    }

    fn engine_with(source: Arc<StaticReplaySource>, options: PlaybackOptions) -> ReplayEngine {
        ReplayEngine::new(source, Arc::new(NullRenderer), options).unwrap()
    }

    #[tokio::test]
    async fn test_commands_require_a_log() {
        let mut engine = engine_with(scenario_source(), PlaybackOptions::default());

        assert!(matches!(
            engine.toggle_play_pause(),
            Err(WolfreelError::NoReplay)
        ));
        assert!(matches!(engine.step_forward(), Err(WolfreelError::NoReplay)));
        assert!(matches!(engine.seek(0), Err(WolfreelError::NoReplay)));
        assert_eq!(engine.current_index(), None);
    }

    #[tokio::test]
    async fn test_load_rewinds_to_start() {
        let mut engine = engine_with(scenario_source(), PlaybackOptions::default());
        let summary = engine.load().await.unwrap();

        assert_eq!(summary.events, 3);
        assert_eq!(engine.current_index(), Some(0));
        assert!(!engine.is_playing());
        assert_eq!(engine.status(), PlaybackStatus::Ready);
        assert_eq!(engine.total_events(), 3);
        assert!(engine.snapshot().description.contains("game started"));
    }

    /// Source whose first fetch succeeds and later fetches report an error.
    struct FlipSource {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ReplaySource for FlipSource {
        async fn fetch(&self) -> Result<crate::source::ReplayPayload> {
            use std::sync::atomic::Ordering;
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                scenario_source().fetch().await
            } else {
                StaticReplaySource::failing("still running").fetch().await
            }
        }
    }

    #[tokio::test]
    async fn test_failed_load_preserves_state() {
        let source = Arc::new(FlipSource {
            calls: std::sync::atomic::AtomicUsize::new(0),
        });
        let mut engine =
            ReplayEngine::new(source, Arc::new(NullRenderer), PlaybackOptions::default()).unwrap();
        engine.load().await.unwrap();
        engine.seek(2).unwrap();

        let result = engine.load().await;
        assert!(matches!(result, Err(WolfreelError::SourceReported(_))));
        assert_eq!(engine.current_index(), Some(2));
        assert_eq!(engine.total_events(), 3);
        assert!(engine.step_backward().unwrap());
    }

    #[tokio::test]
    async fn test_step_and_seek_clamping() {
        let mut engine = engine_with(scenario_source(), PlaybackOptions::default());
        engine.load().await.unwrap();

        assert!(!engine.step_backward().unwrap());
        assert!(engine.step_forward().unwrap());
        assert!(engine.step_forward().unwrap());
        assert!(!engine.step_forward().unwrap());
        assert_eq!(engine.current_index(), Some(2));

        assert_eq!(engine.seek(100).unwrap(), 2);
        assert_eq!(engine.seek(1).unwrap(), 1);
        assert_eq!(engine.current_index(), Some(1));
    }

    #[tokio::test]
    async fn test_toggle_twice_round_trips() {
        let mut engine = engine_with(scenario_source(), PlaybackOptions::default());
        engine.load().await.unwrap();

        assert!(engine.toggle_play_pause().unwrap());
        assert!(engine.is_playing());
        assert_eq!(engine.status(), PlaybackStatus::Playing);

        assert!(!engine.toggle_play_pause().unwrap());
        assert!(!engine.is_playing());
        assert_eq!(engine.status(), PlaybackStatus::Ready);
    }

    #[tokio::test]
    async fn test_autoplay_runs_to_finished() {
        let mut engine = engine_with(
            scenario_source(),
            PlaybackOptions::new().with_base_interval_ms(5),
        );
        engine.load().await.unwrap();
        let mut progress = engine.subscribe();
        engine.toggle_play_pause().unwrap();

        timeout(Duration::from_secs(2), async {
            loop {
                progress.changed().await.unwrap();
                if progress.borrow_and_update().status == PlaybackStatus::Finished {
                    break;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(engine.current_index(), Some(2));
        assert!(!engine.is_playing());

        // no further autonomous ticks after completion
        sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.current_index(), Some(2));
        assert_eq!(engine.status(), PlaybackStatus::Finished);
    }

    #[tokio::test]
    async fn test_set_speed_validation() {
        let mut engine = engine_with(scenario_source(), PlaybackOptions::default());
        assert!(matches!(
            engine.set_speed(0.0),
            Err(WolfreelError::InvalidSpeed(_))
        ));
        assert!(matches!(
            engine.set_speed(-1.0),
            Err(WolfreelError::InvalidSpeed(_))
        ));
        assert_eq!(engine.current_speed(), 1.0);

        engine.set_speed(8.0).unwrap();
        assert_eq!(engine.current_speed(), 8.0);
    }

    #[tokio::test]
    async fn test_set_speed_while_playing_keeps_playing() {
        let mut engine = engine_with(
            scenario_source(),
            PlaybackOptions::new().with_base_interval_ms(10_000),
        );
        engine.load().await.unwrap();
        engine.toggle_play_pause().unwrap();

        engine.set_speed(4.0).unwrap();
        assert!(engine.is_playing());
        assert_eq!(engine.current_speed(), 4.0);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let mut engine = engine_with(scenario_source(), PlaybackOptions::default());
        engine.load().await.unwrap();
        engine.toggle_play_pause().unwrap();

        engine.reset();
        assert!(!engine.has_log());
        assert_eq!(engine.current_index(), None);
        assert!(!engine.is_playing());
        assert_eq!(engine.status(), PlaybackStatus::Idle);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Idle);
        assert_eq!(snapshot.description, WAITING_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_empty_log_counts_as_no_replay() {
        let mut engine = engine_with(
            Arc::new(StaticReplaySource::with_events(Vec::new())),
            PlaybackOptions::default(),
        );
        let summary = engine.load().await.unwrap();
        assert_eq!(summary.events, 0);
        assert!(!engine.has_log());
        assert_eq!(engine.status(), PlaybackStatus::Idle);
        assert!(matches!(
            engine.toggle_play_pause(),
            Err(WolfreelError::NoReplay)
        ));
    }

    #[tokio::test]
    async fn test_speed_survives_reset_and_reload() {
        let mut engine = engine_with(scenario_source(), PlaybackOptions::default());
        engine.set_speed(2.0).unwrap();
        engine.load().await.unwrap();
        assert_eq!(engine.current_speed(), 2.0);

        engine.reset();
        assert_eq!(engine.current_speed(), 2.0);
    }
}
