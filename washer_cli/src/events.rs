//! Text and JSON-lines rendering of controller events.

use serde_json::{Value, json};
use washer_core::{RunSummary, WasherEvent};
use washer_hardware::{OutputSnapshot, segments};

fn opt(v: Option<f32>) -> Value {
    v.map_or(Value::Null, |x| json!(x))
}

/// One JSON object per event, tagged with the controller time.
pub fn event_json(t_ms: u64, ev: &WasherEvent) -> Value {
    let mut obj = json!({ "t_ms": t_ms, "event": ev.name() });
    let extra = match ev {
        WasherEvent::PoweredOff { aborted_cycle } => json!({ "aborted_cycle": aborted_cycle }),
        WasherEvent::StartDenied(reason) => json!({ "reason": reason.name() }),
        WasherEvent::CycleStarted(s) | WasherEvent::SettingsChanged(s) => json!({
            "rpm": s.rpm,
            "temperature_c": s.temperature_c,
            "duration_min": s.duration_min,
        }),
        WasherEvent::CountdownStep { remaining } => json!({ "remaining": remaining }),
        WasherEvent::SensorsChanged(r) => json!({
            "load": opt(r.load),
            "water_temp_c": opt(r.water_temp_c.map(f32::round)),
            "light_pct": opt(r.light_pct),
            "door_reads_open": r.door_reads_open,
        }),
        WasherEvent::LoadLevelChanged(level) => json!({ "level": level.name() }),
        WasherEvent::Tone { kind, tone } => json!({
            "kind": kind.name(),
            "frequency_hz": tone.frequency_hz,
            "duration_ms": tone.duration_ms,
        }),
        _ => Value::Null,
    };
    if let (Value::Object(dst), Value::Object(src)) = (&mut obj, extra) {
        dst.extend(src);
    }
    obj
}

fn fmt_opt(v: Option<f32>, digits: usize) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.digits$}"))
}

pub fn event_text(ev: &WasherEvent) -> String {
    match ev {
        WasherEvent::PoweredOn => "power on".to_string(),
        WasherEvent::PoweredOff { aborted_cycle: true } => "power off (cycle aborted)".to_string(),
        WasherEvent::PoweredOff { aborted_cycle: false } => "power off".to_string(),
        WasherEvent::PowerIgnored => "power ignored while running".to_string(),
        WasherEvent::StartDenied(reason) => format!("start denied: {}", reason.name()),
        WasherEvent::CycleStarted(s) => format!(
            "cycle started: {} rpm, {} °C, {} min",
            s.rpm, s.temperature_c, s.duration_min
        ),
        WasherEvent::AlreadyRunning => "start ignored: already running".to_string(),
        WasherEvent::CountdownStep { remaining } => format!("countdown: {remaining}"),
        WasherEvent::CycleComplete => "cycle complete".to_string(),
        WasherEvent::SettingsChanged(s) => format!(
            "settings: {} rpm, {} °C, {} min",
            s.rpm, s.temperature_c, s.duration_min
        ),
        WasherEvent::SensorsChanged(r) => format!(
            "sensors: load {}, water {} °C, light {}%, door {}",
            fmt_opt(r.load, 2),
            fmt_opt(r.water_temp_c, 0),
            fmt_opt(r.light_pct, 0),
            if r.door_reads_open { "open" } else { "closed" }
        ),
        WasherEvent::Safety(_) => ev.name().replace('_', " "),
        WasherEvent::LoadLevelChanged(level) => format!("load level: {}", level.name()),
        WasherEvent::Tone { kind, tone } => format!(
            "tone {}: {} Hz for {} ms",
            kind.name(),
            tone.frequency_hz,
            tone.duration_ms
        ),
    }
}

/// Print a batch of events on stdout in the selected format.
pub fn print_events(t_ms: u64, events: &[WasherEvent], json: bool) {
    for ev in events {
        if json {
            println!("{}", event_json(t_ms, ev));
        } else {
            println!("[{t_ms:>9} ms] {}", event_text(ev));
        }
    }
}

/// What an operator standing at the machine would see.
pub fn panel_line(snap: &OutputSnapshot, json: bool) -> String {
    if json {
        json!({
            "event": "panel",
            "digit": snap.digit,
            "door_lamp": snap.door_lamp,
            "color": [snap.color.r, snap.color.g, snap.color.b],
        })
        .to_string()
    } else {
        let [top, mid, bottom] = segments::render_ascii(snap.segments);
        format!(
            "{top}\n{mid}   door lamp {}, colour ({:.2}, {:.2}, {:.2})\n{bottom}",
            if snap.door_lamp { "on" } else { "off" },
            snap.color.r,
            snap.color.g,
            snap.color.b
        )
    }
}

pub fn summary_line(summary: &RunSummary, json: bool) -> String {
    if json {
        json!({
            "event": "summary",
            "ticks": summary.ticks,
            "elapsed_ms": summary.elapsed_ms,
            "cycles_completed": summary.cycles_completed,
            "final_state": summary.final_state.to_string(),
        })
        .to_string()
    } else {
        format!(
            "stopped after {} ms ({} ticks): {} cycle(s) completed, state {}",
            summary.elapsed_ms, summary.ticks, summary.cycles_completed, summary.final_state
        )
    }
}
