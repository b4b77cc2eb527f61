//! Microsecond time helpers.
//!
//! Every timestamp and duration in a draft document is an integer number
//! of microseconds. Callers and catalogs tend to speak in seconds, so the
//! conversions live in one place and always round to the nearest
//! microsecond instead of truncating.

/// Microseconds, the unit of every draft time field.
pub type Micros = u64;

/// Microseconds per second.
pub const MICROS_PER_SEC: Micros = 1_000_000;

/// Convert seconds to microseconds, rounding to the nearest microsecond.
/// Negative and non-finite inputs clamp to zero.
pub fn secs_to_micros(secs: f64) -> Micros {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * MICROS_PER_SEC as f64).round() as Micros
}

/// Convert microseconds to seconds.
pub fn micros_to_secs(us: Micros) -> f64 {
    us as f64 / MICROS_PER_SEC as f64
}

/// Target (timeline) duration of a source slice played at `speed`.
///
/// Mirrors the segment invariant `target = source / speed`. A non-positive
/// or non-finite speed leaves the duration unchanged.
pub fn scaled_duration(source: Micros, speed: f64) -> Micros {
    if !speed.is_finite() || speed <= 0.0 {
        return source;
    }
    (source as f64 / speed).round() as Micros
}

/// `value * numerator / denominator`, rounded to nearest, without
/// overflowing on long timelines.
pub fn proportional(value: Micros, numerator: Micros, denominator: Micros) -> Micros {
    if denominator == 0 {
        return 0;
    }
    let wide = value as u128 * numerator as u128;
    ((wide + denominator as u128 / 2) / denominator as u128) as Micros
}
