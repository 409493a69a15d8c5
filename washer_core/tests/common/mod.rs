#![allow(dead_code)]

use washer_core::{PowerOffPolicy, Washer, WasherEvent};
use washer_hardware::{OutputsHandle, PanelHandle, SimulatedOutputs, SimulatedPanel, ToneRecord};
use washer_traits::{ButtonId, ManualClock};

/// Controller wired to simulated hardware on a manual clock.
pub struct Rig {
    pub washer: Washer,
    pub clock: ManualClock,
    pub panel: PanelHandle,
    pub out: OutputsHandle,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_policy(PowerOffPolicy::Abort)
    }

    pub fn with_policy(policy: PowerOffPolicy) -> Self {
        let clock = ManualClock::new();
        let panel = SimulatedPanel::new();
        let outputs = SimulatedOutputs::new();
        let (ph, oh) = (panel.handle(), outputs.handle());
        let washer = Washer::builder()
            .with_panel(panel)
            .with_outputs(outputs)
            .with_power_off_policy(policy)
            .with_clock(Box::new(clock.clone()))
            .build()
            .expect("build washer");
        let mut rig = Self {
            washer,
            clock,
            panel: ph,
            out: oh,
        };
        // Buttons boot latched as pressed; one released read arms them.
        rig.step();
        rig
    }

    /// One tick, then sleep the controller's poll interval.
    pub fn step(&mut self) -> Vec<WasherEvent> {
        let ev = self.washer.tick();
        self.clock.advance(self.washer.poll_interval());
        ev
    }

    /// Tick for `ms` of controller time.
    pub fn run_for(&mut self, ms: u64) -> Vec<WasherEvent> {
        let end = self.washer.now_ms() + ms;
        let mut all = Vec::new();
        while self.washer.now_ms() < end {
            all.extend(self.step());
        }
        all
    }

    /// Momentary press seen by exactly one tick.
    pub fn press(&mut self, button: ButtonId) -> Vec<WasherEvent> {
        self.panel.tap(button);
        self.step()
    }

    pub fn power_on(&mut self) {
        let ev = self.press(ButtonId::Power);
        assert!(ev.contains(&WasherEvent::PoweredOn), "got {ev:?}");
    }

    pub fn tones_matching(&self, frequency_hz: f32, duration_ms: u32) -> usize {
        self.out
            .tones()
            .iter()
            .filter(|t| {
                **t == ToneRecord {
                    frequency_hz,
                    duration_ms,
                }
            })
            .count()
    }
}
