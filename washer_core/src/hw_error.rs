//! Maps `Box<dyn Error>` from trait boundaries to typed `WasherError`.
//!
//! The traits in `washer_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `washer_hardware::HwError` downcasting.

use crate::error::WasherError;

/// Which side of the controller a failing call was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seam {
    Input,
    Output,
}

/// Map a trait-boundary error to a typed `WasherError`.
///
/// Known hardware error types decide the variant themselves; anything else
/// is attributed to the seam it came through.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static), seam: Seam) -> WasherError {
    #[cfg(feature = "hardware-errors")]
    {
        use washer_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::ChannelUnavailable(_) | HwError::ButtonUnavailable(_) => {
                    WasherError::Sensor(hw.to_string())
                }
                HwError::OutputFault(_) | HwError::InvalidDigit(_) => {
                    WasherError::Output(hw.to_string())
                }
            };
        }
    }

    match seam {
        Seam::Input => WasherError::Sensor(e.to_string()),
        Seam::Output => WasherError::Output(e.to_string()),
    }
}
