//! Text and sticker overlays.

use draftcut_common::config::AppConfig;
use draftcut_common::secs_to_micros;
use draftcut_editing_core::effects::{self, StickerSpec, TextSpec};

#[allow(clippy::too_many_arguments)]
pub fn add_text(
    config: &AppConfig,
    draft: &str,
    text: String,
    start: f64,
    duration: f64,
    font_size: f64,
    color: String,
    position: (f64, f64),
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;

    let spec = TextSpec {
        font_size,
        font_color: color,
        position,
        ..TextSpec::new(text, secs_to_micros(start), secs_to_micros(duration))
    };
    let placed = effects::add_text(&mut loaded.document, spec)
        .map_err(|e| anyhow::anyhow!("Failed to add text: {e}"))?;
    println!("Text added: {} on {}", placed.segment_id, placed.track_id);

    super::save_draft(config, &loaded)
}

#[allow(clippy::too_many_arguments)]
pub fn add_sticker(
    config: &AppConfig,
    draft: &str,
    path: Option<String>,
    effect_id: Option<String>,
    start: f64,
    duration: f64,
    position: (f64, f64),
    scale: f64,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;

    let spec = StickerSpec {
        path,
        effect_id,
        start: secs_to_micros(start),
        duration: secs_to_micros(duration),
        position,
        scale,
    };
    let placed = effects::add_sticker(&mut loaded.document, spec)
        .map_err(|e| anyhow::anyhow!("Failed to add sticker: {e}"))?;
    println!("Sticker added: {} on {}", placed.segment_id, placed.track_id);

    super::save_draft(config, &loaded)
}
