//! Door and overload flags that gate the start of a cycle.

use crate::config::SafetyCfg;
use crate::debounce::Debouncer;
use crate::status::DenialReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SafetyFlags {
    pub door_open: bool,
    pub overloaded: bool,
}

impl SafetyFlags {
    /// Both gates clear.
    pub fn permits_start(&self) -> bool {
        !self.door_open && !self.overloaded
    }
}

/// A flag transition. Each one is reported exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyEdge {
    DoorOpened,
    DoorClosed,
    OverloadDetected,
    OverloadCleared,
}

/// Flags only gate a start once both sensors have been read since power-on.
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    door: Debouncer,
    flags: SafetyFlags,
    door_settled: bool,
    load_seen: bool,
    door_open_light_pct: f32,
    overload_threshold: f32,
}

impl SafetyMonitor {
    pub fn new(cfg: &SafetyCfg) -> Self {
        Self {
            door: Debouncer::new(cfg.debounce_count),
            flags: SafetyFlags::default(),
            door_settled: false,
            load_seen: false,
            door_open_light_pct: cfg.door_open_light_pct,
            overload_threshold: cfg.overload_threshold,
        }
    }

    /// Raw (undebounced) door reading for a light level in percent.
    #[inline]
    pub fn door_reads_open(&self, light_pct: f32) -> bool {
        light_pct > self.door_open_light_pct
    }

    #[inline]
    pub fn is_overloaded(&self, load: f32) -> bool {
        load > self.overload_threshold
    }

    /// Fold one frame into the flags. Unavailable readings leave their flag
    /// untouched.
    pub fn update(&mut self, light_pct: Option<f32>, load: Option<f32>) -> Vec<SafetyEdge> {
        let mut edges = Vec::new();

        if let Some(pct) = light_pct {
            let open = self.door.update(self.door_reads_open(pct));
            self.door_settled |= self.door.is_settled();
            if open != self.flags.door_open {
                self.flags.door_open = open;
                edges.push(if open {
                    SafetyEdge::DoorOpened
                } else {
                    SafetyEdge::DoorClosed
                });
            }
        }

        if let Some(load) = load {
            self.load_seen = true;
            let over = self.is_overloaded(load);
            if over != self.flags.overloaded {
                self.flags.overloaded = over;
                edges.push(if over {
                    SafetyEdge::OverloadDetected
                } else {
                    SafetyEdge::OverloadCleared
                });
            }
        }

        edges
    }

    pub fn flags(&self) -> SafetyFlags {
        self.flags
    }

    /// A load reading arrived and the door debouncer confirmed its state.
    pub fn is_ready(&self) -> bool {
        self.door_settled && self.load_seen
    }

    /// Why a start must be refused right now, if at all.
    pub fn start_denial(&self) -> Option<DenialReason> {
        if !self.is_ready() {
            Some(DenialReason::SensorsNotReady)
        } else if self.flags.permits_start() {
            None
        } else if self.flags.door_open {
            Some(DenialReason::DoorOpen)
        } else {
            Some(DenialReason::Overloaded)
        }
    }

    /// Back to a closed, unloaded machine with fresh debounce counters. The
    /// flags gate nothing until the sensors have been read again.
    pub fn reset(&mut self) {
        self.door.reset();
        self.flags = SafetyFlags::default();
        self.door_settled = false;
        self.load_seen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> SafetyMonitor {
        SafetyMonitor::new(&SafetyCfg::default())
    }

    #[test]
    fn door_edge_reported_once_after_debounce() {
        let mut m = monitor();
        assert!(m.update(Some(85.0), Some(0.3)).is_empty());
        assert!(m.update(Some(85.0), Some(0.3)).is_empty());
        assert_eq!(m.update(Some(85.0), Some(0.3)), vec![SafetyEdge::DoorOpened]);
        assert!(m.update(Some(85.0), Some(0.3)).is_empty());
        assert!(m.flags().door_open);
        assert!(!m.flags().permits_start());
    }

    #[test]
    fn door_threshold_is_strict() {
        let m = monitor();
        assert!(!m.door_reads_open(40.0));
        assert!(m.door_reads_open(40.5));
    }

    #[test]
    fn overload_has_no_debounce_and_clears() {
        let mut m = monitor();
        assert!(m.update(Some(10.0), Some(0.7)).is_empty());
        assert_eq!(
            m.update(Some(10.0), Some(0.75)),
            vec![SafetyEdge::OverloadDetected]
        );
        assert!(m.update(Some(10.0), Some(0.9)).is_empty());
        assert_eq!(
            m.update(Some(10.0), Some(0.5)),
            vec![SafetyEdge::OverloadCleared]
        );
    }

    #[test]
    fn start_is_refused_until_both_sensors_have_been_read() {
        let mut m = monitor();
        assert_eq!(m.start_denial(), Some(DenialReason::SensorsNotReady));
        // Load alone: the door is still unconfirmed.
        m.update(None, Some(0.3));
        m.update(Some(10.0), Some(0.3));
        m.update(Some(10.0), Some(0.3));
        assert_eq!(m.start_denial(), Some(DenialReason::SensorsNotReady));
        m.update(Some(10.0), Some(0.3));
        assert!(m.is_ready());
        assert_eq!(m.start_denial(), None);

        m.update(Some(10.0), Some(0.9));
        assert_eq!(m.start_denial(), Some(DenialReason::Overloaded));
        m.reset();
        assert_eq!(m.start_denial(), Some(DenialReason::SensorsNotReady));
    }

    #[test]
    fn readiness_is_latched_until_reset() {
        let mut m = monitor();
        for _ in 0..3 {
            m.update(Some(10.0), Some(0.3));
        }
        // One stray bright reading does not take the gate back.
        m.update(Some(85.0), Some(0.3));
        assert!(m.is_ready());
        assert_eq!(m.start_denial(), None);
    }

    #[test]
    fn door_open_takes_precedence_over_overload() {
        let mut m = monitor();
        for _ in 0..3 {
            m.update(Some(85.0), Some(0.9));
        }
        assert_eq!(m.start_denial(), Some(DenialReason::DoorOpen));
    }

    #[test]
    fn unavailable_readings_keep_flags() {
        let mut m = monitor();
        m.update(Some(10.0), Some(0.9));
        assert!(m.update(None, None).is_empty());
        assert!(m.flags().overloaded);
        m.reset();
        assert_eq!(m.flags(), SafetyFlags::default());
    }
}
