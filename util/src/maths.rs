//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Saturate a value into the closed range `[min, max]`.
///
/// Unlike `f64::clamp` this does not panic if `min > max`, in which case `max` wins.
pub fn saturate<T>(value: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    let mut ret = value;

    if ret < min {
        ret = min
    }
    if ret > max {
        ret = max
    }

    ret
}

/// Saturate an integer calibration-style value after applying a signed step, avoiding overflow
/// of the underlying type.
pub fn saturating_step(value: i8, step: i8, min: i8, max: i8) -> i8 {
    saturate(value.saturating_add(step), min, max)
}
