//! Load bands and their indicator colours.

use washer_traits::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadLevel {
    Light,
    Medium,
    Heavy,
    OverloadRisk,
    Overload,
}

pub const LIGHT_BELOW: f32 = 0.2;
pub const MEDIUM_BELOW: f32 = 0.4;
pub const HEAVY_BELOW: f32 = 0.6;
pub const OVERLOAD_FROM: f32 = 0.7;

/// Band for a normalized load. Boundaries belong to the upper band; NaN
/// classifies as `Overload`.
pub fn classify(load: f32) -> LoadLevel {
    if load < LIGHT_BELOW {
        LoadLevel::Light
    } else if load < MEDIUM_BELOW {
        LoadLevel::Medium
    } else if load < HEAVY_BELOW {
        LoadLevel::Heavy
    } else if load < OVERLOAD_FROM {
        LoadLevel::OverloadRisk
    } else {
        LoadLevel::Overload
    }
}

impl LoadLevel {
    pub const fn color(self) -> Rgb {
        match self {
            LoadLevel::Light => Rgb::new(0.0, 1.0, 0.0),
            LoadLevel::Medium => Rgb::new(0.5, 1.0, 0.0),
            LoadLevel::Heavy => Rgb::new(1.0, 1.0, 0.0),
            LoadLevel::OverloadRisk => Rgb::new(1.0, 0.5, 0.0),
            LoadLevel::Overload => Rgb::new(1.0, 0.0, 0.0),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            LoadLevel::Light => "light",
            LoadLevel::Medium => "medium",
            LoadLevel::Heavy => "heavy",
            LoadLevel::OverloadRisk => "overload_risk",
            LoadLevel::Overload => "overload",
        }
    }
}
