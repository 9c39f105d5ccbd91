//! Sandman entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  TerminalKeyboard  LineRecognizer  QueuedSound  LogEventSink   │
//! │  (KeyboardPort)    (SpeechPort)    (SoundPort)  (EventSink)    │
//! │  GpioPin × 6 (OutputPin)           MonotonicClock (Clock)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          ControllerService (pure logic)                │    │
//! │  │  Tokenizer · Parser · Actuator × 3                     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (60 Hz, single thread)                              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use embedded_hal::digital::OutputPin;
use log::{error, info, warn};

use sandman::adapters::gpio::GpioPin;
use sandman::adapters::log_sink::LogEventSink;
use sandman::adapters::recognizer::{LineRecognizer, SilentRecognizer};
use sandman::adapters::sound::QueuedSound;
use sandman::adapters::terminal::TerminalKeyboard;
use sandman::adapters::time::MonotonicClock;
use sandman::app::ports::{Clock, EventSink, KeyboardPort, SoundPort, SpeechPort};
use sandman::app::service::ControllerService;
use sandman::command::Channel;
use sandman::config::{DEFAULT_CONFIG_PATH, GpioSettings, SandmanConfig};
use sandman::error::Error;
use sandman::scheduler::Scheduler;

#[derive(Parser, Debug)]
#[command(name = "sandman", version, about = "Voice and keyboard bed controller")]
struct Args {
    /// JSON config file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Skip the config file and use built-in defaults.
    #[arg(long)]
    defaults: bool,

    /// Run without keyboard input.
    #[arg(long)]
    daemon: bool,

    /// Log pin writes instead of driving GPIO.
    #[arg(long)]
    simulate_gpio: bool,

    /// File or FIFO of recognized utterances, one per line.
    /// Overrides `inputSettings.utteranceSource`.
    #[arg(long)]
    utterances: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_timestamp_millis()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    info!("Sandman v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let mut config = if args.defaults {
        info!("Using built-in defaults");
        SandmanConfig::default()
    } else {
        let config = SandmanConfig::load(&args.config)
            .map_err(Error::from)
            .with_context(|| format!("loading {}", args.config.display()))?;
        info!("Config loaded from {}", args.config.display());
        config
    };
    if args.simulate_gpio {
        config.gpio.enabled = false;
    }
    if !config.gpio.enabled {
        warn!("GPIO disabled, pin writes will only be logged");
    }

    // ── 2. Hardware ───────────────────────────────────────────
    let pins = open_pins(&config)?;
    let clock = MonotonicClock::new();
    let service = ControllerService::new(config.timing(), pins, clock.now());

    // ── 3. Inputs and outputs ─────────────────────────────────
    let keyboard = if args.daemon {
        info!("Non-interactive mode, keyboard disabled");
        None
    } else {
        Some(TerminalKeyboard::stdin().context("starting keyboard reader")?)
    };
    let sound = QueuedSound::new(&config.sound_settings);
    let mut sink = LogEventSink::new();

    // ── 4. Control loop ───────────────────────────────────────
    match args.utterances.or(config.input_settings.utterance_source) {
        Some(path) => {
            let recognizer =
                LineRecognizer::open(path).context("starting utterance reader")?;
            run_loop(
                Scheduler::new(service, keyboard, recognizer, sound, clock),
                &mut sink,
            )
        }
        None => {
            warn!("No utterance source configured, voice control disabled");
            run_loop(
                Scheduler::new(service, keyboard, SilentRecognizer, sound, clock),
                &mut sink,
            )
        }
    }
}

/// Open the six relay outputs in channel order.
fn open_pins(config: &SandmanConfig) -> Result<[(GpioPin, GpioPin); Channel::COUNT]> {
    let open = |channel: Channel| -> Result<(GpioPin, GpioPin)> {
        let pair = config.controls.get(channel);
        let up = open_pin(pair.up_pin, &config.gpio)?;
        let down = open_pin(pair.down_pin, &config.gpio)?;
        info!(
            "Channel '{}': up=GPIO {} down=GPIO {}",
            channel, pair.up_pin, pair.down_pin
        );
        Ok((up, down))
    };
    Ok([
        open(Channel::Head)?,
        open(Channel::Knee)?,
        open(Channel::Elevation)?,
    ])
}

fn open_pin(number: u32, settings: &GpioSettings) -> Result<GpioPin> {
    GpioPin::open(number, settings)
        .map_err(Error::from)
        .context("opening relay outputs")
}

fn run_loop<P, K, R, S, C>(
    mut scheduler: Scheduler<P, K, R, S, C>,
    sink: &mut impl EventSink,
) -> Result<()>
where
    P: OutputPin,
    K: KeyboardPort,
    R: SpeechPort,
    S: SoundPort,
    C: Clock,
{
    scheduler
        .run(sink)
        .map_err(Error::from)
        .context("control loop terminated")
}
