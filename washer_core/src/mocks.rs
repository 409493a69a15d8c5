//! Test and helper mocks for washer_core

use washer_traits::{
    AnalogChannel, AnalogSource, ButtonId, ButtonInput, Buzzer, DeviceError, DigitDisplay,
    Indicator, Rgb,
};

/// An output stage that accepts and discards everything; useful for driving
/// the controller when only its events matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutputs;

impl Buzzer for NullOutputs {
    fn tone(&mut self, _frequency_hz: f32, _duration_ms: u32) -> Result<(), DeviceError> {
        Ok(())
    }
}

impl Indicator for NullOutputs {
    fn set_color(&mut self, _rgb: Rgb) -> Result<(), DeviceError> {
        Ok(())
    }
    fn set_door_lamp(&mut self, _on: bool) -> Result<(), DeviceError> {
        Ok(())
    }
}

impl DigitDisplay for NullOutputs {
    fn render_digit(&mut self, _digit: u8) -> Result<(), DeviceError> {
        Ok(())
    }
    fn blank(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// A panel frozen in one state: every analog channel reads `level` (or errors
/// when `None`) and both buttons read `button_level`.
#[derive(Debug, Clone, Copy)]
pub struct StuckPanel {
    pub level: Option<f32>,
    pub button_level: Option<bool>,
}

impl StuckPanel {
    /// Mid-scale analog values, buttons released.
    pub fn released() -> Self {
        Self {
            level: Some(0.1),
            button_level: Some(true),
        }
    }

    /// Every read fails.
    pub fn dead() -> Self {
        Self {
            level: None,
            button_level: None,
        }
    }
}

impl AnalogSource for StuckPanel {
    fn read_normalized(&mut self, channel: AnalogChannel) -> Result<f32, DeviceError> {
        self.level.ok_or_else(|| {
            Box::new(std::io::Error::other(format!("{} stuck", channel.name()))) as DeviceError
        })
    }
}

impl ButtonInput for StuckPanel {
    fn read_level(&mut self, button: ButtonId) -> Result<bool, DeviceError> {
        self.button_level.ok_or_else(|| {
            Box::new(std::io::Error::other(format!("{} stuck", button.name()))) as DeviceError
        })
    }
}
