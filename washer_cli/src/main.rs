//! `washer`: run the washer controller against the simulated panel.

mod cli;
mod error_fmt;
mod events;
mod feed;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use washer_config::Config;
use washer_core::hw_error::{Seam, map_hw_error};
use washer_core::{AverageOpts, SensorCfg, Washer, WasherCfg, WasherError, average};
use washer_hardware::{OutputsHandle, PanelHandle, SimulatedOutputs, SimulatedPanel};
use washer_traits::{
    AnalogChannel, ButtonId, ButtonInput, Buzzer, Clock, DigitDisplay, Indicator, ManualClock,
    MonotonicClock, Rgb,
};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE, json_mode};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::events::{panel_line, print_events, summary_line};
use crate::feed::{Console, PanelCommand, ScriptFeed};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if !cli.json {
        let _ = color_eyre::install();
    }

    if let Err(e) = real_main(cli) {
        tracing::debug!(error = ?e, "command failed");
        if json_mode() {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    match cli.cmd {
        Commands::Run { until_ms } => run_console(&cfg, until_ms, &shutdown),
        Commands::Simulate { script, until_ms } => simulate(&cfg, &script, until_ms, &shutdown),
        Commands::SelfCheck => self_check(&cfg),
    }
}

fn load_config(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| WasherError::Config(format!("read {}: {e}", path.display())))?;
    let cfg = washer_config::load_toml(&text)
        .wrap_err_with(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .map_err(|e| WasherError::Config(format!("{}: {e}", path.display())))?;
    Ok(cfg)
}

/// Console (pretty or JSON) on stderr, plus an optional JSON-lines file.
///
/// `RUST_LOG` overrides `--log-level` for the console; the file sink uses
/// `[logging] level`.
fn init_tracing(json: bool, console_level: &str, logging: &washer_config::Logging) -> eyre::Result<()> {
    use tracing_subscriber::{
        EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    };

    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(console_level))
        .wrap_err_with(|| format!("invalid --log-level {console_level:?}"))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        layers.push(console.json().with_filter(console_filter).boxed());
    } else {
        layers.push(console.with_filter(console_filter).boxed());
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| WasherError::Config(format!("logging.file {file:?} has no file name")))?;
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let level = logging.level.as_deref().unwrap_or("info");
        let file_filter = EnvFilter::try_new(level)
            .map_err(|e| WasherError::Config(format!("logging.level {level:?}: {e}")))?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre::eyre!("init logging: {e}"))
}

/// Controller wired to a fresh simulated panel and output stage.
fn sim_washer(
    cfg: &Config,
    clock: Box<dyn Clock + Send + Sync>,
) -> eyre::Result<(Washer, PanelHandle, OutputsHandle)> {
    let panel = SimulatedPanel::new();
    let outputs = SimulatedOutputs::new();
    let (ph, oh) = (panel.handle(), outputs.handle());
    let washer = Washer::builder()
        .with_config(WasherCfg::from(cfg))
        .with_panel(panel)
        .with_outputs(outputs)
        .with_clock(clock)
        .build()?;
    Ok((washer, ph, oh))
}

fn run_console(cfg: &Config, until_ms: Option<u64>, shutdown: &AtomicBool) -> eyre::Result<()> {
    let (mut washer, panel, outputs) = sim_washer(cfg, Box::new(MonotonicClock::new()))?;
    let console = Console::spawn(std::io::BufReader::new(std::io::stdin()));
    let json = json_mode();
    if !json {
        eprintln!("commands: power | start | <input> <value> | door open|closed | status | quit");
    }

    let summary = washer.run_until(
        shutdown,
        until_ms,
        |_now| {
            for cmd in console.drain() {
                match cmd {
                    PanelCommand::Quit => shutdown.store(true, Ordering::Relaxed),
                    PanelCommand::Status => println!("{}", panel_line(&outputs.snapshot(), json)),
                    other => other.apply(&panel),
                }
            }
            // Without a deadline, end of input ends the session.
            if until_ms.is_none() && console.is_closed() {
                tracing::info!("console closed");
                shutdown.store(true, Ordering::Relaxed);
            }
            Ok(())
        },
        |now, events| {
            print_events(now, events, json);
            Ok(())
        },
    )?;
    println!("{}", summary_line(&summary, json));
    Ok(())
}

/// Replays long enough for the longest cycle started on the last row to finish.
fn default_until_ms(end_ms: u64, cfg: &Config) -> u64 {
    end_ms + 10 * cfg.timing.countdown_step_ms + 2_000
}

fn simulate(
    cfg: &Config,
    script: &Path,
    until_ms: Option<u64>,
    shutdown: &AtomicBool,
) -> eyre::Result<()> {
    let scenario = washer_config::load_scenario_csv(script)
        .map_err(|e| WasherError::Scenario(e.to_string()))?;
    let (mut washer, panel, _outputs) = sim_washer(cfg, Box::new(ManualClock::new()))?;
    let until = until_ms.unwrap_or_else(|| default_until_ms(scenario.end_ms(), cfg));
    let json = json_mode();
    tracing::info!(
        script = %script.display(),
        rows = scenario.rows().len(),
        until_ms = until,
        "simulation start"
    );

    let mut feed = ScriptFeed::new(scenario.rows());
    let summary = washer.run_until(
        shutdown,
        Some(until),
        |now| {
            feed.apply_due(now, &panel);
            Ok(())
        },
        |now, events| {
            print_events(now, events, json);
            Ok(())
        },
    )?;
    if !feed.is_done() {
        tracing::warn!(until_ms = until, "simulation stopped before the end of the script");
    }
    println!("{}", summary_line(&summary, json));
    Ok(())
}

/// Read every analog channel once through the averager and drive every output.
fn self_check(cfg: &Config) -> eyre::Result<()> {
    let mut panel = SimulatedPanel::new();
    let mut outputs = SimulatedOutputs::new();
    let clock = MonotonicClock::new();
    let sensors = SensorCfg::from(&cfg.sensors);
    let opts = AverageOpts {
        samples: cfg.timing.samples_per_frame,
        scale: 1.0,
        inter_sample_delay: Duration::from_millis(cfg.timing.sample_interval_ms),
    };

    let mut channels = serde_json::Map::new();
    for ch in AnalogChannel::ALL {
        let v = average(&mut panel, ch, opts, &clock, None)
            .ok_or_else(|| WasherError::Sensor(format!("{} returned no samples", ch.name())))?;
        tracing::debug!(channel = ch.name(), value = v, "self-check read");
        channels.insert(ch.name().to_string(), serde_json::json!(v));
    }
    for button in [ButtonId::Power, ButtonId::Start] {
        panel
            .read_level(button)
            .map_err(|e| map_hw_error(e.as_ref(), Seam::Input))?;
    }

    let out_err = |e: washer_traits::DeviceError| map_hw_error(e.as_ref(), Seam::Output);
    outputs.set_color(Rgb::OFF).map_err(out_err)?;
    outputs.set_door_lamp(false).map_err(out_err)?;
    for digit in 0..=9 {
        outputs.render_digit(digit).map_err(out_err)?;
    }
    outputs.blank().map_err(out_err)?;
    let tone = cfg.alerts.power;
    outputs
        .tone(tone.frequency_hz, tone.duration_ms)
        .map_err(out_err)?;

    let water_c = channels
        .get(AnalogChannel::WaterTemperature.name())
        .and_then(serde_json::Value::as_f64)
        .map(|v| sensors.water_temperature_c(v as f32).round());

    if json_mode() {
        println!(
            "{}",
            serde_json::json!({
                "event": "self_check",
                "ok": true,
                "channels": channels,
                "water_temp_c": water_c,
            })
        );
    } else {
        for (name, v) in &channels {
            println!("{name:<18} {:.3}", v.as_f64().unwrap_or_default());
        }
        if let Some(c) = water_c {
            println!("{:<18} {c:.0} °C", "water (scaled)");
        }
        println!("self-check ok");
    }
    Ok(())
}
