//! Simulated front panel and output stage for the washer controller.
//!
//! `SimulatedPanel` answers the controller's reads; its `PanelHandle` lets a
//! console, a scenario script or a test turn knobs, load the drum, open the
//! door and push buttons. `SimulatedOutputs` records what the controller drove
//! and exposes it through an `OutputsHandle`.
pub mod error;
pub mod segments;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use washer_traits::{
    AnalogChannel, AnalogSource, ButtonId, ButtonInput, Buzzer, DeviceError, DigitDisplay,
    Indicator, Rgb,
};

use crate::error::HwError;

#[derive(Debug)]
struct PanelState {
    analog: HashMap<AnalogChannel, f32>,
    held: HashSet<ButtonId>,
    taps: HashMap<ButtonId, u32>,
    failing: HashSet<AnalogChannel>,
    failing_buttons: HashSet<ButtonId>,
    ripple: f32,
    ripple_phase: HashMap<AnalogChannel, bool>,
}

impl Default for PanelState {
    fn default() -> Self {
        let mut analog = HashMap::new();
        for ch in AnalogChannel::ALL {
            analog.insert(ch, 0.0);
        }
        // Closed door, half-empty drum, cold water.
        analog.insert(AnalogChannel::Light, 0.10);
        analog.insert(AnalogChannel::Load, 0.30);
        analog.insert(AnalogChannel::WaterTemperature, 0.12);
        Self {
            analog,
            held: HashSet::new(),
            taps: HashMap::new(),
            failing: HashSet::new(),
            failing_buttons: HashSet::new(),
            ripple: 0.0,
            ripple_phase: HashMap::new(),
        }
    }
}

/// Simulated panel implementation
pub struct SimulatedPanel {
    state: Rc<RefCell<PanelState>>,
}

impl Default for SimulatedPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPanel {
    pub fn new() -> Self {
        SimulatedPanel {
            state: Rc::new(RefCell::new(PanelState::default())),
        }
    }

    /// Handle sharing this panel's state.
    pub fn handle(&self) -> PanelHandle {
        PanelHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl AnalogSource for SimulatedPanel {
    fn read_normalized(&mut self, channel: AnalogChannel) -> Result<f32, DeviceError> {
        let mut st = self.state.borrow_mut();
        if st.failing.contains(&channel) {
            return Err(Box::new(HwError::ChannelUnavailable(channel)));
        }
        let base = st.analog.get(&channel).copied().unwrap_or(0.0);
        let ripple = st.ripple;
        let phase = st.ripple_phase.entry(channel).or_insert(false);
        *phase = !*phase;
        let v = if *phase { base + ripple } else { base - ripple };
        let v = v.clamp(0.0, 1.0);
        tracing::trace!(channel = channel.name(), value = v, "analog read (simulated)");
        Ok(v)
    }
}

impl ButtonInput for SimulatedPanel {
    fn read_level(&mut self, button: ButtonId) -> Result<bool, DeviceError> {
        let mut st = self.state.borrow_mut();
        if st.failing_buttons.contains(&button) {
            return Err(Box::new(HwError::ButtonUnavailable(button.name())));
        }
        if let Some(n) = st.taps.get_mut(&button)
            && *n > 0
        {
            *n -= 1;
            return Ok(false);
        }
        // Active-low: a held button reads low.
        Ok(!st.held.contains(&button))
    }
}

/// Shared control over a `SimulatedPanel`.
#[derive(Clone)]
pub struct PanelHandle {
    state: Rc<RefCell<PanelState>>,
}

impl PanelHandle {
    /// Set the underlying value of an analog channel (clamped to `[0, 1]`).
    pub fn set(&self, channel: AnalogChannel, value: f32) {
        let v = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.borrow_mut().analog.insert(channel, v);
    }

    pub fn get(&self, channel: AnalogChannel) -> f32 {
        self.state
            .borrow()
            .analog
            .get(&channel)
            .copied()
            .unwrap_or(0.0)
    }

    /// Hold or release a button.
    pub fn hold(&self, button: ButtonId, pressed: bool) {
        let mut st = self.state.borrow_mut();
        if pressed {
            st.held.insert(button);
        } else {
            st.held.remove(&button);
        }
    }

    /// Press a button for exactly one read, then release it.
    pub fn tap(&self, button: ButtonId) {
        *self.state.borrow_mut().taps.entry(button).or_insert(0) += 1;
    }

    /// Open or close the door by flooding or darkening the light sensor.
    pub fn set_door_open(&self, open: bool) {
        self.set(AnalogChannel::Light, if open { 0.85 } else { 0.10 });
    }

    /// Make reads of `channel` fail until cleared.
    pub fn set_failing(&self, channel: AnalogChannel, failing: bool) {
        let mut st = self.state.borrow_mut();
        if failing {
            st.failing.insert(channel);
        } else {
            st.failing.remove(&channel);
        }
    }

    /// Make reads of `button` fail until cleared. Pending taps are kept.
    pub fn set_button_failing(&self, button: ButtonId, failing: bool) {
        let mut st = self.state.borrow_mut();
        if failing {
            st.failing_buttons.insert(button);
        } else {
            st.failing_buttons.remove(&button);
        }
    }

    /// Alternating ± noise added to every analog read.
    pub fn set_ripple(&self, amplitude: f32) {
        self.state.borrow_mut().ripple = amplitude.abs();
    }
}

/// One tone as emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneRecord {
    pub frequency_hz: f32,
    pub duration_ms: u32,
}

/// Current state of the simulated outputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputSnapshot {
    pub color: Rgb,
    pub door_lamp: bool,
    /// Digit shown, `None` when blank.
    pub digit: Option<u8>,
    /// Raw segment pattern latched on the display bus.
    pub segments: u8,
    /// Every digit rendered since creation (blanks excluded).
    pub digit_history: Vec<u8>,
    pub tones: Vec<ToneRecord>,
}

#[derive(Debug, Default)]
struct OutputState {
    snapshot: OutputSnapshot,
    failing: bool,
}

/// Simulated output stage (RGB indicator, door lamp, 7-segment display, buzzer).
pub struct SimulatedOutputs {
    state: Rc<RefCell<OutputState>>,
}

impl Default for SimulatedOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedOutputs {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(OutputState::default())),
        }
    }

    pub fn handle(&self) -> OutputsHandle {
        OutputsHandle {
            state: Rc::clone(&self.state),
        }
    }

    fn check(&self, what: &'static str) -> Result<(), DeviceError> {
        if self.state.borrow().failing {
            Err(Box::new(HwError::OutputFault(what)))
        } else {
            Ok(())
        }
    }
}

impl Buzzer for SimulatedOutputs {
    fn tone(&mut self, frequency_hz: f32, duration_ms: u32) -> Result<(), DeviceError> {
        self.check("buzzer")?;
        tracing::debug!(frequency_hz, duration_ms, "tone (simulated)");
        self.state.borrow_mut().snapshot.tones.push(ToneRecord {
            frequency_hz,
            duration_ms,
        });
        Ok(())
    }
}

impl Indicator for SimulatedOutputs {
    fn set_color(&mut self, rgb: Rgb) -> Result<(), DeviceError> {
        self.check("rgb indicator")?;
        self.state.borrow_mut().snapshot.color = rgb;
        Ok(())
    }

    fn set_door_lamp(&mut self, on: bool) -> Result<(), DeviceError> {
        self.check("door lamp")?;
        self.state.borrow_mut().snapshot.door_lamp = on;
        Ok(())
    }
}

impl DigitDisplay for SimulatedOutputs {
    fn render_digit(&mut self, digit: u8) -> Result<(), DeviceError> {
        self.check("display")?;
        let pattern = segments::segments_for(digit)?;
        let mut st = self.state.borrow_mut();
        st.snapshot.segments = pattern;
        st.snapshot.digit = Some(digit);
        st.snapshot.digit_history.push(digit);
        Ok(())
    }

    fn blank(&mut self) -> Result<(), DeviceError> {
        self.check("display")?;
        let mut st = self.state.borrow_mut();
        st.snapshot.segments = segments::BLANK;
        st.snapshot.digit = None;
        Ok(())
    }
}

/// Read access to a `SimulatedOutputs`.
#[derive(Clone)]
pub struct OutputsHandle {
    state: Rc<RefCell<OutputState>>,
}

impl OutputsHandle {
    pub fn snapshot(&self) -> OutputSnapshot {
        self.state.borrow().snapshot.clone()
    }

    pub fn tones(&self) -> Vec<ToneRecord> {
        self.state.borrow().snapshot.tones.clone()
    }

    /// Drain recorded tones.
    pub fn take_tones(&self) -> Vec<ToneRecord> {
        std::mem::take(&mut self.state.borrow_mut().snapshot.tones)
    }

    /// Distinct consecutive digits shown so far, e.g. `[3, 2, 1, 0]`.
    pub fn digit_sequence(&self) -> Vec<u8> {
        let mut seq = self.state.borrow().snapshot.digit_history.clone();
        seq.dedup();
        seq
    }

    pub fn clear_history(&self) {
        let mut st = self.state.borrow_mut();
        st.snapshot.digit_history.clear();
        st.snapshot.tones.clear();
    }

    /// Make every output call fail until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }
}
