//! Integer control helpers shared by teleop, autonomous and vision code.
//!
//! All voltages are signed millivolts and all joystick values are raw axis
//! counts. Nothing here allocates or touches hardware.
//!
//! # Example
//! ```rust
//! use pbb_core::utils::math::control::{axis_to_mv, deadband};
//! assert_eq!(deadband(3, 5), 0);
//! assert_eq!(axis_to_mv(100, 127, 12000), 9449);
//! ```

/// Signed millivolt command sent to a motor.
pub type Millivolts = i32;

/// Raw joystick axis value after deadbanding.
pub type AxisSample = i32;

/// Coerce values whose magnitude is below `threshold` to zero.
///
/// Values at or above the threshold pass through unchanged.
pub const fn deadband(
    value: i32,
    threshold: i32,
) -> i32 {
    if value.unsigned_abs() < threshold.unsigned_abs() {
        0
    } else {
        value
    }
}

/// Clamp a voltage to `±max_mv`.
pub fn clamp_mv(
    mv: i64,
    max_mv: i32,
) -> Millivolts {
    let max = i64::from(max_mv).abs();
    mv.clamp(-max, max) as Millivolts
}

/// Scale an axis sample in `±input_max` to a clamped millivolt command.
///
/// The division rounds half away from zero, so `100 * 12000 / 127` maps to
/// 9449 rather than truncating to 9448.
pub fn axis_to_mv(
    sample: AxisSample,
    input_max: i32,
    max_mv: i32,
) -> Millivolts {
    if input_max <= 0 {
        return 0;
    }
    let numerator = i64::from(sample) * i64::from(max_mv);
    let divisor = i64::from(input_max);
    let half = divisor / 2;
    let scaled = if numerator >= 0 {
        (numerator + half) / divisor
    } else {
        (numerator - half) / divisor
    };
    clamp_mv(scaled, max_mv)
}

/// Proportional turn command: `clamp(error * gain, ±cap)`.
pub fn proportional_turn(
    error: i64,
    gain: i32,
    cap_mv: i32,
) -> Millivolts {
    clamp_mv(error.saturating_mul(i64::from(gain)), cap_mv)
}
