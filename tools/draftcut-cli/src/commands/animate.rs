//! Keyframes and composite animations.

use draftcut_common::config::AppConfig;
use draftcut_common::secs_to_micros;
use draftcut_draft_model::Easing;
use draftcut_editing_core::keyframes;

/// Composite animation to add.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    FadeIn,
    FadeOut,
    Zoom,
    Rotate { degrees: f64 },
    Move,
}

#[allow(clippy::too_many_arguments)]
pub fn keyframe(
    config: &AppConfig,
    draft: &str,
    segment: &str,
    property: &str,
    time: f64,
    value: Option<f64>,
    easing: &str,
    remove: bool,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;
    let seg = loaded
        .document
        .segment_mut(segment)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let time = secs_to_micros(time);

    if remove {
        let removed = keyframes::remove_keyframe(seg, property, time)
            .map_err(|e| anyhow::anyhow!("Failed to remove keyframe: {e}"))?;
        println!("Removed {property} keyframe at {}us (value {})", removed.time, removed.value);
    } else {
        let value = value.ok_or_else(|| anyhow::anyhow!("--value is required"))?;
        let easing: Easing = easing.parse()?;
        keyframes::add_keyframe(seg, property, time, value, easing)
            .map_err(|e| anyhow::anyhow!("Failed to set keyframe: {e}"))?;
        println!("Set {property} = {value} at {time}us ({easing:?})");
    }

    super::save_draft(config, &loaded)
}

#[allow(clippy::too_many_arguments)]
pub fn animate(
    config: &AppConfig,
    draft: &str,
    segment: &str,
    kind: Kind,
    start: f64,
    duration: f64,
    from: Option<&str>,
    to: Option<&str>,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;
    let seg = loaded
        .document
        .segment_mut(segment)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let start = secs_to_micros(start);
    let duration = secs_to_micros(duration);

    let result = match kind {
        Kind::FadeIn => keyframes::fade_in(seg, duration),
        Kind::FadeOut => keyframes::fade_out(seg, duration),
        Kind::Zoom => {
            let from = from.map(str::parse::<f64>).transpose()?.unwrap_or(1.0);
            let to = to.map(str::parse::<f64>).transpose()?.unwrap_or(1.5);
            keyframes::zoom(seg, start, duration, from, to)
        }
        Kind::Rotate { degrees } => keyframes::rotate(seg, start, duration, degrees),
        Kind::Move => {
            let from = super::parse_pair(from.unwrap_or("0.5,0.5"))?;
            let to = super::parse_pair(to.ok_or_else(|| anyhow::anyhow!("--to x,y is required"))?)?;
            keyframes::move_to(seg, start, duration, from, to)
        }
    };
    result.map_err(|e| anyhow::anyhow!("Failed to animate: {e}"))?;
    println!("Animated {segment}: {kind:?}");

    super::save_draft(config, &loaded)
}
