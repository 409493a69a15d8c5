//! Buzzer tones scheduled on the controller clock.
//!
//! Tones never overlap: each one is due when the previous one has finished,
//! so a burst of alerts plays back in order without blocking the tick.

use std::collections::VecDeque;

use crate::config::AlertCfg;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u32,
}

impl Tone {
    pub const fn new(frequency_hz: f32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Power,
    Start,
    DoorWarning,
    Overload,
    OverloadCleared,
    Denied,
    AlreadyRunning,
    Complete,
}

impl AlertKind {
    pub const fn name(self) -> &'static str {
        match self {
            AlertKind::Power => "power",
            AlertKind::Start => "start",
            AlertKind::DoorWarning => "door_warning",
            AlertKind::Overload => "overload",
            AlertKind::OverloadCleared => "overload_cleared",
            AlertKind::Denied => "denied",
            AlertKind::AlreadyRunning => "already_running",
            AlertKind::Complete => "complete",
        }
    }
}

impl AlertCfg {
    pub fn tone_for(&self, kind: AlertKind) -> Tone {
        match kind {
            AlertKind::Power => self.power,
            AlertKind::Start => self.start,
            AlertKind::DoorWarning => self.door_warning,
            AlertKind::Overload => self.overload,
            AlertKind::OverloadCleared => self.overload_cleared,
            AlertKind::Denied => self.denied,
            AlertKind::AlreadyRunning => self.already_running,
            AlertKind::Complete => self.complete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTone {
    pub due_ms: u64,
    pub kind: AlertKind,
    pub tone: Tone,
}

#[derive(Debug, Default)]
pub struct AlertQueue {
    pending: VecDeque<ScheduledTone>,
    busy_until_ms: u64,
}

impl AlertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the tone(s) for `kind`. `Complete` expands into
    /// `complete_repeats` tones separated by `complete_gap_ms` of silence.
    pub fn push(&mut self, kind: AlertKind, now_ms: u64, cfg: &AlertCfg) {
        let tone = cfg.tone_for(kind);
        let (repeats, gap) = match kind {
            AlertKind::Complete => (cfg.complete_repeats.max(1), cfg.complete_gap_ms),
            _ => (1, 0),
        };
        let mut due = now_ms.max(self.busy_until_ms);
        for _ in 0..repeats {
            self.pending.push_back(ScheduledTone {
                due_ms: due,
                kind,
                tone,
            });
            due = due
                .saturating_add(u64::from(tone.duration_ms))
                .saturating_add(gap);
        }
        self.busy_until_ms = due.saturating_sub(gap);
    }

    /// Remove and return every tone due at or before `now_ms`.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<ScheduledTone> {
        let mut out = Vec::new();
        while let Some(front) = self.pending.front() {
            if front.due_ms > now_ms {
                break;
            }
            if let Some(t) = self.pending.pop_front() {
                out.push(t);
            }
        }
        out
    }

    /// Drop everything still pending.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.busy_until_ms = 0;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the next pending tone.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.front().map(|t| t.due_ms)
    }
}
