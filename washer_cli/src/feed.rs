//! Operator input for the simulated panel.
//!
//! Console lines and scenario rows both become `PanelCommand`s. The console
//! reader runs on its own thread and hands commands to the control loop over a
//! bounded channel; the panel itself stays on the loop thread.

use crossbeam_channel as xch;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use washer_config::{ScenarioInput, ScenarioRow};
use washer_hardware::PanelHandle;
use washer_traits::{AnalogChannel, ButtonId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelCommand {
    /// Momentary press seen by exactly one read.
    Tap(ButtonId),
    /// Press (and hold) or release a button.
    Hold(ButtonId, bool),
    Set(AnalogChannel, f32),
    Door(bool),
    Status,
    Quit,
}

const fn channel_for(input: ScenarioInput) -> Option<AnalogChannel> {
    match input {
        ScenarioInput::Rpm => Some(AnalogChannel::RpmKnob),
        ScenarioInput::Temperature => Some(AnalogChannel::TemperatureKnob),
        ScenarioInput::Duration => Some(AnalogChannel::DurationKnob),
        ScenarioInput::Load => Some(AnalogChannel::Load),
        ScenarioInput::Light => Some(AnalogChannel::Light),
        ScenarioInput::WaterTemp => Some(AnalogChannel::WaterTemperature),
        ScenarioInput::Power | ScenarioInput::Start => None,
    }
}

const fn button_for(input: ScenarioInput) -> Option<ButtonId> {
    match input {
        ScenarioInput::Power => Some(ButtonId::Power),
        ScenarioInput::Start => Some(ButtonId::Start),
        _ => None,
    }
}

impl PanelCommand {
    /// Scenario rows hold buttons until a `0` row releases them.
    pub fn from_row(row: &ScenarioRow) -> Self {
        match (button_for(row.input), channel_for(row.input)) {
            (Some(button), _) => PanelCommand::Hold(button, row.value >= 0.5),
            (None, Some(channel)) => PanelCommand::Set(channel, row.value),
            (None, None) => PanelCommand::Status,
        }
    }

    /// Parse one console line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> eyre::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();
        if words.next().is_some() {
            eyre::bail!("too many arguments in {line:?}");
        }

        let cmd = match (head.as_str(), arg) {
            ("quit" | "exit", None) => PanelCommand::Quit,
            ("status", None) => PanelCommand::Status,
            ("door", Some("open")) => PanelCommand::Door(true),
            ("door", Some("closed" | "close")) => PanelCommand::Door(false),
            ("door", _) => eyre::bail!("usage: door open|closed"),
            (name, arg) => {
                let Some(input) = ScenarioInput::from_name(name) else {
                    eyre::bail!("unknown command {name:?}");
                };
                match (button_for(input), channel_for(input), arg) {
                    (Some(button), _, None) => PanelCommand::Tap(button),
                    (Some(_), _, Some(_)) => eyre::bail!("{name} takes no value"),
                    (None, Some(channel), Some(v)) => {
                        let value: f32 = v
                            .parse()
                            .map_err(|_| eyre::eyre!("{name}: {v:?} is not a number"))?;
                        if !(0.0..=1.0).contains(&value) {
                            eyre::bail!("{name}: value must be in [0, 1]");
                        }
                        PanelCommand::Set(channel, value)
                    }
                    (None, _, _) => eyre::bail!("usage: {name} <value in [0, 1]>"),
                }
            }
        };
        Ok(Some(cmd))
    }

    /// Apply to the panel. `Status` and `Quit` are handled by the caller.
    pub fn apply(self, panel: &PanelHandle) {
        match self {
            PanelCommand::Tap(button) => panel.tap(button),
            PanelCommand::Hold(button, pressed) => {
                panel.hold(button, pressed);
                if pressed {
                    // Catch presses released before the next poll.
                    panel.tap(button);
                }
            }
            PanelCommand::Set(channel, value) => panel.set(channel, value),
            PanelCommand::Door(open) => panel.set_door_open(open),
            PanelCommand::Status | PanelCommand::Quit => {}
        }
    }
}

/// Feeds scenario rows to the panel as controller time passes.
pub struct ScriptFeed<'a> {
    rows: &'a [ScenarioRow],
    next: usize,
}

impl<'a> ScriptFeed<'a> {
    pub fn new(rows: &'a [ScenarioRow]) -> Self {
        Self { rows, next: 0 }
    }

    /// Apply every row due at or before `now_ms`; returns how many were applied.
    pub fn apply_due(&mut self, now_ms: u64, panel: &PanelHandle) -> usize {
        let start = self.next;
        while let Some(row) = self.rows.get(self.next) {
            if row.at_ms > now_ms {
                break;
            }
            tracing::debug!(
                at_ms = row.at_ms,
                input = row.input.name(),
                value = row.value,
                "scenario step"
            );
            PanelCommand::from_row(row).apply(panel);
            self.next += 1;
        }
        self.next - start
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.rows.len()
    }
}

/// Reads console lines on a background thread.
pub struct Console {
    rx: xch::Receiver<PanelCommand>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Console {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = xch::bounded(64);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            for line in reader.lines() {
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        tracing::warn!(error = %e, "console read failed");
                        break;
                    }
                };
                match PanelCommand::parse(&line) {
                    Ok(Some(cmd)) => {
                        if tx.send(cmd).is_err() {
                            tracing::debug!("console consumer disconnected, exiting thread");
                            break;
                        }
                        if cmd == PanelCommand::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("? {e}"),
                }
            }
            tracing::trace!("console thread exiting");
        });

        Self {
            rx,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Commands typed since the last call.
    pub fn drain(&self) -> Vec<PanelCommand> {
        self.rx.try_iter().collect()
    }

    /// Input ended (EOF) and every command has been drained.
    pub fn is_closed(&self) -> bool {
        self.rx.is_empty() && self.join_handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // A thread blocked on stdin cannot be woken; only join one that is done.
        if let Some(handle) = self.join_handle.take()
            && handle.is_finished()
            && handle.join().is_err()
        {
            tracing::warn!("console thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_buttons_knobs_and_door() {
        assert_eq!(
            PanelCommand::parse("power").unwrap(),
            Some(PanelCommand::Tap(ButtonId::Power))
        );
        assert_eq!(
            PanelCommand::parse("  duration 0.3 ").unwrap(),
            Some(PanelCommand::Set(AnalogChannel::DurationKnob, 0.3))
        );
        assert_eq!(
            PanelCommand::parse("door open").unwrap(),
            Some(PanelCommand::Door(true))
        );
        assert_eq!(PanelCommand::parse("# note").unwrap(), None);
        assert_eq!(PanelCommand::parse("").unwrap(), None);
    }

    #[test]
    fn rejects_bad_lines() {
        for line in ["spin 0.5", "load", "load 1.5", "load abc", "start 1", "door ajar"] {
            assert!(PanelCommand::parse(line).is_err(), "{line} should fail");
        }
    }

    #[test]
    fn script_feed_applies_rows_in_time_order() {
        let rows = [
            ScenarioRow {
                at_ms: 0,
                input: ScenarioInput::Load,
                value: 0.9,
            },
            ScenarioRow {
                at_ms: 100,
                input: ScenarioInput::Load,
                value: 0.2,
            },
        ];
        let panel = washer_hardware::SimulatedPanel::new();
        let h = panel.handle();
        let mut feed = ScriptFeed::new(&rows);
        assert_eq!(feed.apply_due(50, &h), 1);
        assert!((h.get(AnalogChannel::Load) - 0.9).abs() < 1e-6);
        assert_eq!(feed.apply_due(99, &h), 0);
        assert_eq!(feed.apply_due(100, &h), 1);
        assert!(feed.is_done());
        assert!((h.get(AnalogChannel::Load) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn console_thread_forwards_commands_until_quit() {
        let console = Console::spawn(Cursor::new("start\nbogus\nload 0.5\nquit\npower\n"));
        let mut seen = Vec::new();
        for _ in 0..200 {
            seen.extend(console.drain());
            if seen.last() == Some(&PanelCommand::Quit) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(
            seen,
            vec![
                PanelCommand::Tap(ButtonId::Start),
                PanelCommand::Set(AnalogChannel::Load, 0.5),
                PanelCommand::Quit,
            ]
        );
    }
}
