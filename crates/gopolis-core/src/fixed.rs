use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Every stock level, yield and happiness score in the economy is a
/// `Fixed64` so that two runs with the same seed agree bit for bit.
pub type Fixed64 = I32F32;

/// Ticks count input-loop heartbeats; days count simulated days.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Clamp a value into `[min, max]`.
#[inline]
pub fn clamp(v: Fixed64, min: Fixed64, max: Fixed64) -> Fixed64 {
    if v > max {
        max
    } else if v < min {
        min
    } else {
        v
    }
}

/// Clamp a value into the unit interval.
#[inline]
pub fn clamp_unit(v: Fixed64) -> Fixed64 {
    clamp(v, Fixed64::ZERO, Fixed64::ONE)
}
