use thiserror::Error;

use washer_traits::AnalogChannel;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("analog channel {} unavailable", .0.name())]
    ChannelUnavailable(AnalogChannel),
    #[error("button {0} unavailable")]
    ButtonUnavailable(&'static str),
    #[error("output fault: {0}")]
    OutputFault(&'static str),
    #[error("digit {0} has no segment pattern")]
    InvalidDigit(u8),
}

pub type Result<T> = std::result::Result<T, HwError>;
