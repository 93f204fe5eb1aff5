use otspec::ot_round;

/// Multiply a signed font-unit value and round it back onto the grid,
/// saturating at the limits of the 16-bit field.
pub fn scale_i16(value: i16, factor: f64) -> i16 {
    clamp_i16(ot_round(value as f64 * factor))
}

/// As `scale_i16`, for unsigned fields. Never goes below zero.
pub fn scale_u16(value: u16, factor: f64) -> u16 {
    ot_round(value as f64 * factor).clamp(0, u16::MAX as i32) as u16
}

pub fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
