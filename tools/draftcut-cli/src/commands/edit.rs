//! Split and trim segments.

use draftcut_common::config::AppConfig;
use draftcut_common::secs_to_micros;
use draftcut_editing_core::timeline;

pub fn split(config: &AppConfig, draft: &str, segment: &str, at: f64) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;

    let (left, right) = timeline::split(&mut loaded.document, segment, secs_to_micros(at))
        .map_err(|e| anyhow::anyhow!("Split failed: {e}"))?;
    println!("Split {segment} at {at}s");
    println!("  Left: {left}");
    println!("  Right: {right}");

    super::save_draft(config, &loaded)
}

pub fn trim(
    config: &AppConfig,
    draft: &str,
    segment: &str,
    start: f64,
    end: f64,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;

    timeline::trim(
        &mut loaded.document,
        segment,
        secs_to_micros(start),
        secs_to_micros(end),
    )
    .map_err(|e| anyhow::anyhow!("Trim failed: {e}"))?;
    println!("Trimmed {segment} to {start}s-{end}s of its source");

    super::save_draft(config, &loaded)
}
