//! Appliance lifecycle and the wash countdown.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemState {
    #[default]
    Off,
    Idle,
    Running,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SystemState::Off => "off",
            SystemState::Idle => "idle",
            SystemState::Running => "running",
        })
    }
}

/// Ten-minute steps left in a running cycle, one step per `step_ms`.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    step_ms: u64,
    next_step_ms: u64,
}

impl Countdown {
    pub fn new(steps: u32, step_ms: u64, now_ms: u64) -> Self {
        Self {
            remaining: steps,
            step_ms: step_ms.max(1),
            next_step_ms: now_ms.saturating_add(step_ms.max(1)),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Step down for every period elapsed by `now_ms`; returns each new
    /// remaining value in order, ending with 0 when the cycle finishes.
    pub fn advance(&mut self, now_ms: u64) -> Vec<u32> {
        let mut shown = Vec::new();
        while self.remaining > 0 && now_ms >= self.next_step_ms {
            self.remaining -= 1;
            self.next_step_ms = self.next_step_ms.saturating_add(self.step_ms);
            shown.push(self.remaining);
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_minutes_is_three_steps() {
        let mut c = Countdown::new(3, 1000, 0);
        assert!(c.advance(999).is_empty());
        assert_eq!(c.advance(1000), vec![2]);
        assert_eq!(c.advance(2500), vec![1]);
        assert_eq!(c.advance(3000), vec![0]);
        assert!(c.is_finished());
        assert!(c.advance(10_000).is_empty());
    }

    #[test]
    fn late_tick_catches_up() {
        let mut c = Countdown::new(4, 100, 50);
        assert_eq!(c.advance(400), vec![3, 2, 1]);
        assert_eq!(c.remaining(), 1);
    }

    #[test]
    fn state_names() {
        assert_eq!(SystemState::default().to_string(), "off");
        assert_eq!(SystemState::Running.to_string(), "running");
    }
}
