//! Seven-segment encoding for the single-digit display.
//!
//! Bit layout (LSB first): a, b, c, d, e, f, g.
//!
//! ```text
//!  aaa
//! f   b
//!  ggg
//! e   c
//!  ddd
//! ```

use crate::error::{HwError, Result};

/// Segment patterns for hexadecimal digits `0..=F`.
pub const DIGIT_SEGMENTS: [u8; 16] = [
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F, 0x77, 0x7C, 0x39, 0x5E, 0x79, 0x71,
];

/// Pattern with every segment off.
pub const BLANK: u8 = 0x00;

pub fn segments_for(digit: u8) -> Result<u8> {
    DIGIT_SEGMENTS
        .get(usize::from(digit))
        .copied()
        .ok_or(HwError::InvalidDigit(digit))
}

/// Three-line ASCII drawing of a segment pattern.
pub fn render_ascii(pattern: u8) -> [String; 3] {
    let on = |bit: u8| pattern & (1 << bit) != 0;
    let seg = |bit: u8, c: char| if on(bit) { c } else { ' ' };
    [
        format!(" {} ", seg(0, '_')),
        format!("{}{}{}", seg(5, '|'), seg(6, '_'), seg(1, '|')),
        format!("{}{}{}", seg(4, '|'), seg(3, '_'), seg(2, '|')),
    ]
}
