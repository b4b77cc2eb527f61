//! Keyframe editing and evaluation.
//!
//! Keyframe times are relative to the owning segment's target start. Each
//! property keeps its keyframes strictly ascending by time; adding a
//! keyframe at an existing time replaces it.

use std::collections::BTreeMap;

use draftcut_common::{DraftError, DraftResult, Micros};
use draftcut_draft_model::{property, Easing, Keyframe, Segment};

/// Insert a keyframe, replacing any existing one at the same time.
pub fn add_keyframe(segment: &mut Segment, property: &str, time: Micros, value: f64, easing: Easing) -> DraftResult<()> {
    if property.trim().is_empty() {
        return Err(DraftError::invalid("keyframe property name is empty"));
    }
    if !value.is_finite() {
        return Err(DraftError::invalid(format!("keyframe value {value} is not finite")));
    }

    let frames = segment
        .keyframes
        .get_or_insert_with(BTreeMap::new)
        .entry(property.to_string())
        .or_default();
    let keyframe = Keyframe::new(time, value, easing);
    match frames.binary_search_by_key(&time, |k| k.time) {
        Ok(index) => frames[index] = keyframe,
        Err(index) => frames.insert(index, keyframe),
    }

    tracing::debug!(segment_id = %segment.id, property, time, value, "set keyframe");
    Ok(())
}

/// Remove the keyframe at exactly `time`.
pub fn remove_keyframe(segment: &mut Segment, property: &str, time: Micros) -> DraftResult<Keyframe> {
    let not_found = || DraftError::not_found(format!("no {property} keyframe at {time}"));

    let map = segment.keyframes.as_mut().ok_or_else(not_found)?;
    let frames = map.get_mut(property).ok_or_else(not_found)?;
    let index = frames
        .binary_search_by_key(&time, |k| k.time)
        .map_err(|_| not_found())?;
    let removed = frames.remove(index);

    if frames.is_empty() {
        map.remove(property);
    }
    if map.is_empty() {
        segment.keyframes = None;
    }
    Ok(removed)
}

/// Property value at `time`, interpolated with the easing of the keyframe
/// that starts each interval. Outside the keyframe span the nearest
/// endpoint value holds. `None` when the property has no keyframes.
pub fn value_at(segment: &Segment, property: &str, time: Micros) -> Option<f64> {
    let frames = segment.keyframes_for(property);
    let first = frames.first()?;
    let last = frames.last()?;
    if time <= first.time {
        return Some(first.value);
    }
    if time >= last.time {
        return Some(last.value);
    }

    let next = frames.partition_point(|k| k.time <= time);
    let (a, b) = (&frames[next - 1], &frames[next]);
    let t = (time - a.time) as f64 / (b.time - a.time) as f64;
    Some(a.value + (b.value - a.value) * a.easing.apply(t))
}

/// Opacity 0 to 1 over the first `duration` of the segment.
pub fn fade_in(segment: &mut Segment, duration: Micros) -> DraftResult<()> {
    let end = bounded(segment, duration)?;
    add_keyframe(segment, property::OPACITY, 0, 0.0, Easing::EaseOut)?;
    add_keyframe(segment, property::OPACITY, end, 1.0, Easing::Linear)
}

/// Opacity 1 to 0 over the last `duration` of the segment.
pub fn fade_out(segment: &mut Segment, duration: Micros) -> DraftResult<()> {
    let length = segment.target_timerange.duration;
    let start = length - bounded(segment, duration)?;
    add_keyframe(segment, property::OPACITY, start, 1.0, Easing::EaseIn)?;
    add_keyframe(segment, property::OPACITY, length, 0.0, Easing::Linear)
}

/// Scale from `from` to `to` across `[start, start + duration]`.
pub fn zoom(segment: &mut Segment, start: Micros, duration: Micros, from: f64, to: f64) -> DraftResult<()> {
    let end = span_end(segment, start, duration)?;
    require_finite(&[from, to])?;
    if from <= 0.0 || to <= 0.0 {
        return Err(DraftError::invalid("zoom scale must be positive"));
    }
    add_keyframe(segment, property::SCALE, start, from, Easing::EaseInOut)?;
    add_keyframe(segment, property::SCALE, end, to, Easing::Linear)
}

/// Move between two canvas positions across `[start, start + duration]`.
pub fn move_to(
    segment: &mut Segment,
    start: Micros,
    duration: Micros,
    from: (f64, f64),
    to: (f64, f64),
) -> DraftResult<()> {
    let end = span_end(segment, start, duration)?;
    require_finite(&[from.0, from.1, to.0, to.1])?;
    add_keyframe(segment, property::POSITION_X, start, from.0, Easing::EaseInOut)?;
    add_keyframe(segment, property::POSITION_X, end, to.0, Easing::Linear)?;
    add_keyframe(segment, property::POSITION_Y, start, from.1, Easing::EaseInOut)?;
    add_keyframe(segment, property::POSITION_Y, end, to.1, Easing::Linear)
}

/// Rotate by `degrees` across `[start, start + duration]`.
pub fn rotate(segment: &mut Segment, start: Micros, duration: Micros, degrees: f64) -> DraftResult<()> {
    let end = span_end(segment, start, duration)?;
    require_finite(&[degrees])?;
    add_keyframe(segment, property::ROTATION, start, 0.0, Easing::Linear)?;
    add_keyframe(segment, property::ROTATION, end, degrees, Easing::Linear)
}

fn bounded(segment: &Segment, duration: Micros) -> DraftResult<Micros> {
    span_end(segment, 0, duration)
}

fn span_end(segment: &Segment, start: Micros, duration: Micros) -> DraftResult<Micros> {
    let length = segment.target_timerange.duration;
    match start.checked_add(duration) {
        Some(end) if duration > 0 && end <= length => Ok(end),
        _ => Err(DraftError::invalid(format!(
            "animation of {duration} at {start} does not fit segment of length {length}"
        ))),
    }
}

// Composite animations write several keyframes; check every value first.
fn require_finite(values: &[f64]) -> DraftResult<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(DraftError::invalid(format!("animation value {v} is not finite"))),
        None => Ok(()),
    }
}
