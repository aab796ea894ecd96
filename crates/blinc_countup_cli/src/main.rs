//! Count-up in the terminal
//!
//! Animates a number in place on stdout, driven by a tokio interval standing
//! in for the display refresh.

use anyhow::{Context, Result};
use blinc_countup::{
    CountUp, CountUpOptions, CountUpState, DisplayTarget, Easing, FrameQueue, RawValue,
};
use clap::Parser;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::Deserialize;
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod script;

use config::CountUpFile;
use script::{Action, PauseAt, RetargetAt, Script};

#[derive(Parser, Debug)]
#[command(name = "countup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animate a number toward a target in the terminal", long_about = None)]
struct Cli {
    /// Value to start from
    #[arg(long, allow_hyphen_values = true)]
    from: Option<String>,

    /// Value to count toward
    #[arg(long, allow_hyphen_values = true)]
    to: Option<String>,

    /// Duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Number of decimal places
    #[arg(long)]
    decimals: Option<i32>,

    #[arg(long)]
    prefix: Option<String>,

    #[arg(long)]
    suffix: Option<String>,

    /// Grouping separator
    #[arg(long)]
    separator: Option<String>,

    /// Decimal separator
    #[arg(long)]
    decimal: Option<String>,

    /// Ten comma-separated glyphs replacing the digits 0-9
    #[arg(long, value_delimiter = ',')]
    numerals: Option<Vec<String>>,

    /// Disable digit grouping
    #[arg(long)]
    no_grouping: bool,

    /// Count linearly
    #[arg(long)]
    no_easing: bool,

    /// Easing curve (ease-out-expo, linear, ease-out-quad, ease-out-cubic,
    /// ease-out-quart, ease-in-out-cubic)
    #[arg(long, value_parser = parse_easing)]
    easing: Option<Easing>,

    /// Distance above which smart easing splits the run
    #[arg(long)]
    threshold: Option<f64>,

    /// Length of the eased settle for split runs
    #[arg(long)]
    amount: Option<f64>,

    /// countup.toml file, or a directory containing one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame rate of the simulated display
    #[arg(long, default_value = "60")]
    fps: f64,

    /// Pause at SECS for FOR seconds (repeatable)
    #[arg(long, value_name = "SECS:FOR")]
    pause_at: Vec<PauseAt>,

    /// Switch to a new target at AT seconds (repeatable)
    #[arg(long, value_name = "AT:VALUE", allow_hyphen_values = true)]
    retarget: Vec<RetargetAt>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_easing(name: &str) -> Result<Easing, String> {
    let deserializer: StrDeserializer<'_, ValueError> = name.into_deserializer();
    Easing::deserialize(deserializer).map_err(|e| e.to_string())
}

impl Cli {
    /// Layer command-line flags over options loaded from a file
    fn overrides(&self, mut options: CountUpOptions) -> CountUpOptions {
        if let Some(from) = &self.from {
            options.start_value = Some(RawValue::from(from.as_str()));
        }
        if let Some(duration) = self.duration {
            options.duration = Some(duration);
        }
        if let Some(decimals) = self.decimals {
            options.decimal_places = Some(decimals);
        }
        if let Some(prefix) = &self.prefix {
            options.prefix = Some(prefix.clone());
        }
        if let Some(suffix) = &self.suffix {
            options.suffix = Some(suffix.clone());
        }
        if let Some(separator) = &self.separator {
            options.separator = Some(separator.clone());
        }
        if let Some(decimal) = &self.decimal {
            options.decimal = Some(decimal.clone());
        }
        if let Some(numerals) = &self.numerals {
            options.numerals = Some(numerals.clone());
        }
        if self.no_grouping {
            options.use_grouping = Some(false);
        }
        if self.no_easing {
            options.use_easing = Some(false);
        }
        if let Some(easing) = &self.easing {
            options.easing = Some(easing.clone());
        }
        if let Some(threshold) = self.threshold {
            options.smart_easing_threshold = Some(threshold);
        }
        if let Some(amount) = self.amount {
            options.smart_easing_amount = Some(amount);
        }
        options
    }
}

/// Writes each frame over the previous one on the current terminal line
#[derive(Clone, Default)]
struct TerminalLabel {
    shown: Rc<RefCell<String>>,
}

impl DisplayTarget for TerminalLabel {
    fn set_text(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(err) = write!(stdout, "\r{text}\x1b[K").and_then(|_| stdout.flush()) {
            debug!(error = %err, "failed to write frame");
        }
        *self.shown.borrow_mut() = text.to_string();
    }

    fn text(&self) -> Option<String> {
        let shown = self.shown.borrow();
        (!shown.is_empty()).then(|| shown.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; frames own stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        anyhow::bail!("--fps must be a positive number, got {}", cli.fps);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let file = match &cli.config {
        Some(path) => CountUpFile::load(path)?,
        None => CountUpFile::default(),
    };

    let end_value = cli
        .to
        .as_deref()
        .map(RawValue::from)
        .or_else(|| file.end_value.clone());
    let options = cli.overrides(file.options);

    let label = TerminalLabel::default();
    let mut counter = CountUp::new(FrameQueue::new()).with_target(label);
    counter.configure(end_value, None, options);
    if let Some(err) = counter.error() {
        return Err(err.clone()).context("Invalid count-up configuration");
    }

    let mut script = Script::new(&cli.pause_at, &cli.retarget);
    counter.start_with(|| info!("count-up finished"));

    let mut ticker = time::interval(Duration::from_secs_f64(1.0 / cli.fps));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = Instant::now();

    loop {
        ticker.tick().await;
        let now_ms = started.elapsed().as_secs_f64() * 1000.0;

        for action in script.due(now_ms) {
            match action {
                Action::Pause if counter.state() == CountUpState::Running => {
                    counter.pause_resume();
                }
                Action::Resume if counter.state() == CountUpState::Paused => {
                    counter.pause_resume();
                }
                Action::Retarget(value) => {
                    info!(%value, "retargeting");
                    counter.retarget(value);
                    if let Some(err) = counter.error() {
                        return Err(err.clone()).context("Invalid retarget value");
                    }
                }
                Action::Pause | Action::Resume => {}
            }
        }

        counter.advance(now_ms);

        if counter.state() == CountUpState::Completed && script.is_finished() {
            break;
        }
    }

    println!();
    Ok(())
}
