//! Collaborator traits for the washer controller.
//!
//! The control core only needs to read normalized scalars, read momentary
//! buttons, beep, light indicators and render a digit. Everything behind these
//! traits (ADC, PWM, GPIO, segment encoding) belongs to the implementor.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type returned across every collaborator boundary.
pub type DeviceError = Box<dyn std::error::Error + Send + Sync>;

/// Analog inputs, each read as a normalized scalar in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogChannel {
    /// Spin speed selector knob.
    RpmKnob,
    /// Wash temperature selector knob.
    TemperatureKnob,
    /// Cycle duration selector knob.
    DurationKnob,
    /// Force sensor under the drum (load).
    Load,
    /// Light sensor behind the door seal; bright means the door is open.
    Light,
    /// Water temperature sensor.
    WaterTemperature,
}

impl AnalogChannel {
    pub const ALL: [AnalogChannel; 6] = [
        AnalogChannel::RpmKnob,
        AnalogChannel::TemperatureKnob,
        AnalogChannel::DurationKnob,
        AnalogChannel::Load,
        AnalogChannel::Light,
        AnalogChannel::WaterTemperature,
    ];

    /// Position of this channel in [`AnalogChannel::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            AnalogChannel::RpmKnob => "rpm_knob",
            AnalogChannel::TemperatureKnob => "temperature_knob",
            AnalogChannel::DurationKnob => "duration_knob",
            AnalogChannel::Load => "load",
            AnalogChannel::Light => "light",
            AnalogChannel::WaterTemperature => "water_temperature",
        }
    }
}

/// Momentary push buttons on the front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Power,
    Start,
}

impl ButtonId {
    pub const fn name(self) -> &'static str {
        match self {
            ButtonId::Power => "power",
            ButtonId::Start => "start",
        }
    }
}

/// RGB triple with each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// All channels dark.
    pub const OFF: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

pub trait AnalogSource {
    /// Read one raw sample from `channel`, normalized to `[0, 1]`.
    fn read_normalized(&mut self, channel: AnalogChannel) -> Result<f32, DeviceError>;
}

pub trait ButtonInput {
    /// Raw electrical level of `button`. Buttons are active-low: `false` means pressed.
    fn read_level(&mut self, button: ButtonId) -> Result<bool, DeviceError>;
}

pub trait Buzzer {
    fn tone(&mut self, frequency_hz: f32, duration_ms: u32) -> Result<(), DeviceError>;
}

pub trait Indicator {
    /// Load/state RGB indicator.
    fn set_color(&mut self, rgb: Rgb) -> Result<(), DeviceError>;
    /// Door warning lamp.
    fn set_door_lamp(&mut self, on: bool) -> Result<(), DeviceError>;
}

pub trait DigitDisplay {
    /// Show a single decimal digit (`0..=9`).
    fn render_digit(&mut self, digit: u8) -> Result<(), DeviceError>;
    /// Turn every segment off.
    fn blank(&mut self) -> Result<(), DeviceError>;
}

/// Everything the controller reads from.
pub trait Panel: AnalogSource + ButtonInput {}
impl<T: AnalogSource + ButtonInput + ?Sized> Panel for T {}

/// Everything the controller drives.
pub trait OutputStage: Buzzer + Indicator + DigitDisplay {}
impl<T: Buzzer + Indicator + DigitDisplay + ?Sized> OutputStage for T {}

impl<T: AnalogSource + ?Sized> AnalogSource for Box<T> {
    fn read_normalized(&mut self, channel: AnalogChannel) -> Result<f32, DeviceError> {
        (**self).read_normalized(channel)
    }
}

impl<T: ButtonInput + ?Sized> ButtonInput for Box<T> {
    fn read_level(&mut self, button: ButtonId) -> Result<bool, DeviceError> {
        (**self).read_level(button)
    }
}

impl<T: Buzzer + ?Sized> Buzzer for Box<T> {
    fn tone(&mut self, frequency_hz: f32, duration_ms: u32) -> Result<(), DeviceError> {
        (**self).tone(frequency_hz, duration_ms)
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set_color(&mut self, rgb: Rgb) -> Result<(), DeviceError> {
        (**self).set_color(rgb)
    }
    fn set_door_lamp(&mut self, on: bool) -> Result<(), DeviceError> {
        (**self).set_door_lamp(on)
    }
}

impl<T: DigitDisplay + ?Sized> DigitDisplay for Box<T> {
    fn render_digit(&mut self, digit: u8) -> Result<(), DeviceError> {
        (**self).render_digit(digit)
    }
    fn blank(&mut self) -> Result<(), DeviceError> {
        (**self).blank()
    }
}
