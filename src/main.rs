//! wolfreel - replay playback driver
//!
//! Loads a recorded game from a file or URL and plays it back on the
//! terminal. This is the operator surface for the playback engine; richer
//! renderers plug in through the library API.

use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wolfreel::config::{DEFAULT_LOG_LEVEL, DEFAULT_SOURCE_TIMEOUT_MS};
use wolfreel::{
    ConfigFile, FileReplaySource, HttpReplaySource, PlaybackOptions, PlaybackStatus, Renderer,
    ReplayEngine, ReplaySource, Result, WolfreelError,
};

/// Command-line arguments for the wolfreel driver
#[derive(Parser, Debug, Clone)]
#[command(name = "wolfreel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay playback for recorded werewolf games")]
struct CliArgs {
    /// Path to configuration file (TOML format).
    /// If not specified, wolfreel.toml in the working directory is used
    /// when present.
    #[arg(short, long, env = "WOLFREEL_CONFIG")]
    config: Option<PathBuf>,

    /// Generate example configuration file and exit
    #[arg(long)]
    generate_config: bool,

    /// Local replay JSON file to play back
    #[arg(long, env = "WOLFREEL_REPLAY_FILE")]
    replay_file: Option<PathBuf>,

    /// URL serving the replay payload
    #[arg(long, env = "WOLFREEL_URL")]
    url: Option<String>,

    /// HTTP fetch timeout in milliseconds
    #[arg(long, env = "WOLFREEL_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Speed multiplier (any positive value; 0.5/1/2/4/8 are the usual picks)
    #[arg(long, env = "WOLFREEL_SPEED")]
    speed: Option<f64>,

    /// Autoplay interval at 1x speed, in milliseconds
    #[arg(long, env = "WOLFREEL_BASE_INTERVAL_MS")]
    base_interval_ms: Option<u64>,

    /// Present hidden-reasoning (thinking) text alongside speech
    #[arg(long)]
    show_thinking: bool,

    /// Auto-play the replay to completion instead of stepping
    #[arg(long)]
    autoplay: bool,

    /// In stepping mode, stop after this many events (0 = walk the whole log)
    #[arg(long, default_value_t = 0)]
    steps: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WOLFREEL_LOG_LEVEL")]
    log_level: Option<String>,
}

/// Renderer that narrates events onto stdout.
struct ConsoleRenderer {
    show_thinking: bool,
}

#[async_trait]
impl Renderer for ConsoleRenderer {
    async fn show_day(&self, day: u32) -> Result<()> {
        println!("  [scene] day {day}");
        Ok(())
    }

    async fn show_day_background(&self) -> Result<()> {
        println!("  [scene] daybreak");
        Ok(())
    }

    async fn show_night_background(&self) -> Result<()> {
        println!("  [scene] nightfall");
        Ok(())
    }

    async fn show_player(&self, player: u32) -> Result<()> {
        println!("  [focus] player {player}");
        Ok(())
    }

    async fn hide_player(&self) -> Result<()> {
        println!("  [focus] cleared");
        Ok(())
    }

    async fn speak(&self, label: &str, _use_bubble: bool, text: &str, thought: bool) -> Result<()> {
        if thought {
            println!("  ({label}) {text}");
        } else {
            println!("  [{label}] {text}");
        }
        Ok(())
    }

    async fn show_vote(&self, voter: u32, target: u32) -> Result<()> {
        println!("  [vote] player {voter} -> player {target}");
        Ok(())
    }

    async fn kill_player(&self, player: u32) -> Result<()> {
        println!("  [eliminated] player {player}");
        Ok(())
    }

    fn display_thinking(&self) -> bool {
        self.show_thinking
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.generate_config {
        println!("{}", ConfigFile::generate_example());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = run(args) {
        eprintln!("wolfreel failed: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn run(args: CliArgs) -> Result<()> {
    // Load configuration file if specified or from the default location
    let config_file = if let Some(ref path) = args.config {
        Some(ConfigFile::load(path)?)
    } else {
        ConfigFile::load_default()
    };
    let file = config_file.clone().unwrap_or_default();

    // CLI arguments take precedence over the config file
    let log_level = args
        .log_level
        .or(file.playback.log_level)
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter)
        .init();

    if config_file.is_some() {
        info!("configuration loaded from file");
    }

    let mut options = PlaybackOptions::default();
    if let Some(ms) = args.base_interval_ms.or(file.playback.base_interval_ms) {
        options = options.with_base_interval_ms(ms);
    }
    if let Some(speed) = args.speed.or(file.playback.speed) {
        options = options.with_speed(speed);
    }
    options.validate()?;

    let show_thinking = args.show_thinking || file.playback.display_thinking.unwrap_or(false);
    let timeout_ms = args
        .timeout_ms
        .or(file.source.timeout_ms)
        .unwrap_or(DEFAULT_SOURCE_TIMEOUT_MS);

    let source: Arc<dyn ReplaySource> =
        if let Some(path) = args.replay_file.or(file.source.replay_file) {
            Arc::new(FileReplaySource::new(path))
        } else if let Some(url) = args.url.or(file.source.url) {
            Arc::new(HttpReplaySource::new(url).with_timeout(Duration::from_millis(timeout_ms)))
        } else {
            return Err(WolfreelError::config(
                "no replay source configured; pass --replay-file or --url",
            ));
        };

    let renderer = Arc::new(ConsoleRenderer { show_thinking });
    let mut engine = ReplayEngine::new(source, renderer, options)?;

    let summary = engine.load().await?;
    println!(
        "loaded {} events, {:.0} seconds of game time",
        summary.events,
        summary.total_duration
    );
    print_position(&engine.snapshot());
    engine.settle().await;

    if args.autoplay {
        play_to_completion(&mut engine).await
    } else {
        step_through(&engine, args.steps).await
    }
}

/// Auto-play until the engine reports completion, narrating progress.
async fn play_to_completion(engine: &mut ReplayEngine) -> Result<()> {
    let mut progress = engine.subscribe();
    engine.toggle_play_pause()?;

    while progress.changed().await.is_ok() {
        let snapshot = progress.borrow_and_update().clone();
        print_position(&snapshot);
        if snapshot.status == PlaybackStatus::Finished {
            break;
        }
    }
    println!("playback complete");
    Ok(())
}

/// Step through the log one event at a time, waiting for each presentation.
async fn step_through(engine: &ReplayEngine, steps: usize) -> Result<()> {
    let limit = if steps == 0 { usize::MAX } else { steps };
    for _ in 0..limit {
        if !engine.step_forward()? {
            break;
        }
        engine.settle().await;
        print_position(&engine.snapshot());
    }
    Ok(())
}

fn print_position(snapshot: &wolfreel::ProgressSnapshot) {
    if let Some(index) = snapshot.index {
        println!(
            "[{}/{}] {}",
            index + 1,
            snapshot.total,
            snapshot.description
        );
    }
}
