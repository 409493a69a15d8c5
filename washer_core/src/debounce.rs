//! Consistency-count debouncing and one-tick button edge detection.

/// Stable boolean derived from a noisy one by counting consistent readings.
///
/// Each observation resets the opposite counter. The stable output only
/// flips once the agreeing counter reaches the debounce count.
#[derive(Debug, Clone)]
pub struct Debouncer {
    open_count: u32,
    closed_count: u32,
    stable: bool,
    count: u32,
}

impl Debouncer {
    pub fn new(count: u32) -> Self {
        Self {
            open_count: 0,
            closed_count: 0,
            stable: false,
            count: count.max(1),
        }
    }

    pub fn update(&mut self, raw: bool) -> bool {
        if raw {
            self.open_count = self.open_count.saturating_add(1);
            self.closed_count = 0;
            if !self.stable && self.open_count >= self.count {
                self.stable = true;
            }
        } else {
            self.closed_count = self.closed_count.saturating_add(1);
            self.open_count = 0;
            if self.stable && self.closed_count >= self.count {
                self.stable = false;
            }
        }
        self.stable
    }

    pub fn stable(&self) -> bool {
        self.stable
    }

    /// The stable value is backed by at least `count` agreeing readings.
    pub fn is_settled(&self) -> bool {
        let agreeing = if self.stable {
            self.open_count
        } else {
            self.closed_count
        };
        agreeing >= self.count
    }

    pub fn counts(&self) -> (u32, u32) {
        (self.open_count, self.closed_count)
    }

    pub fn reset(&mut self) {
        self.open_count = 0;
        self.closed_count = 0;
        self.stable = false;
    }
}

/// Transition of a raw button level between two ticks.
///
/// Buttons are active-low, so a press is a `Falling` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLevel {
    Released,
    Pressed,
}

/// Latches the previous level every tick, whether or not an edge fired.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    level: ButtonLevel,
}

impl Default for EdgeDetector {
    // Starts latched as pressed: a button held at boot must be released first.
    fn default() -> Self {
        Self {
            level: ButtonLevel::Pressed,
        }
    }
}

impl EdgeDetector {
    /// Feed the raw electrical level (`false` = pressed).
    pub fn update(&mut self, raw_level: bool) -> Edge {
        let now = if raw_level {
            ButtonLevel::Released
        } else {
            ButtonLevel::Pressed
        };
        let edge = match (self.level, now) {
            (ButtonLevel::Released, ButtonLevel::Pressed) => Edge::Falling,
            (ButtonLevel::Pressed, ButtonLevel::Released) => Edge::Rising,
            _ => Edge::None,
        };
        self.level = now;
        edge
    }

    pub fn level(&self) -> ButtonLevel {
        self.level
    }
}
