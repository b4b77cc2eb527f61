//! Add background music.

use draftcut_common::config::AppConfig;
use draftcut_common::secs_to_micros;
use draftcut_editing_core::timeline::{add_audio, AudioOptions};

pub fn run(
    config: &AppConfig,
    draft: &str,
    file: &str,
    start: f64,
    duration: Option<f64>,
    volume: f64,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;
    println!("Adding music: {file}");

    let options = AudioOptions {
        start: secs_to_micros(start),
        duration: duration.map(secs_to_micros),
        volume,
    };
    let placed = add_audio(&mut loaded.document, file, options)
        .map_err(|e| anyhow::anyhow!("Failed to add music: {e}"))?;

    println!("  Track: {}", placed.track_id);
    println!("  Segment: {}", placed.segment_id);
    println!("  Material: {}", placed.material_id);

    super::save_draft(config, &loaded)
}
