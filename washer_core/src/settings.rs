//! Quantization of the three selector knobs into cycle settings.

/// Settings captured when a cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSettings {
    /// 200..=900 in steps of 100.
    pub rpm: u32,
    /// 20..=60 °C in steps of 10.
    pub temperature_c: u32,
    /// 10..=90 min in steps of 10.
    pub duration_min: u32,
}

#[inline]
fn knob(x: f32) -> f32 {
    if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 }
}

pub fn quantize_rpm(x: f32) -> u32 {
    ((knob(x) * 7.0 + 2.0).floor() as u32) * 100
}

pub fn quantize_temperature(x: f32) -> u32 {
    ((knob(x) * 4.0 + 2.0).floor() as u32) * 10
}

pub fn quantize_duration(x: f32) -> u32 {
    let steps = (knob(x) * 8.0 + 0.5).floor() as u32 + 1;
    steps.min(9) * 10
}

impl CycleSettings {
    pub fn from_knobs(rpm: f32, temperature: f32, duration: f32) -> Self {
        Self {
            rpm: quantize_rpm(rpm),
            temperature_c: quantize_temperature(temperature),
            duration_min: quantize_duration(duration),
        }
    }

    /// Countdown steps, one per ten minutes.
    pub fn steps(&self) -> u32 {
        self.duration_min / 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes() {
        assert_eq!(
            CycleSettings::from_knobs(0.0, 0.0, 0.0),
            CycleSettings {
                rpm: 200,
                temperature_c: 20,
                duration_min: 10
            }
        );
        assert_eq!(
            CycleSettings::from_knobs(1.0, 1.0, 1.0),
            CycleSettings {
                rpm: 900,
                temperature_c: 60,
                duration_min: 90
            }
        );
    }

    #[test]
    fn duration_rounds_to_nearest_step() {
        // 0.25 * 8 = 2.0 -> 3 steps
        assert_eq!(quantize_duration(0.25), 30);
        // 0.0625 * 8 = 0.5 rounds up
        assert_eq!(quantize_duration(0.0625), 20);
        assert_eq!(quantize_duration(0.06), 10);
    }

    #[test]
    fn out_of_range_knobs_clamp() {
        assert_eq!(quantize_rpm(-1.0), 200);
        assert_eq!(quantize_rpm(f32::NAN), 200);
        assert_eq!(quantize_temperature(3.0), 60);
        assert_eq!(CycleSettings::from_knobs(0.0, 0.0, 0.5).steps(), 5);
    }
}
