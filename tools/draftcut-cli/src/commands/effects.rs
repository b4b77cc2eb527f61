//! Filters, transitions, and color adjustment.

use draftcut_common::config::AppConfig;
use draftcut_common::DraftError;
use draftcut_draft_model::TrackKind;
use draftcut_editing_core::effects::{self, ColorAdjustment};
use draftcut_editing_core::FilterTarget;

pub fn add_filter(
    config: &AppConfig,
    draft: &str,
    name: &str,
    intensity: f64,
    segment: Option<String>,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;
    let target = match segment {
        Some(id) => FilterTarget::Segment(id),
        None => FilterTarget::AllVideo,
    };

    match effects::add_filter(&mut loaded.document, name, intensity, target) {
        Ok(applied) => {
            println!("Filter '{name}' ({})", applied.material_id);
            println!("  Segments: {}", applied.segments.len());
            super::save_draft(config, &loaded)
        }
        Err(DraftError::PartialFailure {
            message,
            affected,
            failed,
        }) => {
            println!("Filter '{name}' applied to {} segment(s)", affected.len());
            for (segment, reason) in &failed {
                println!("  Skipped {segment}: {reason}");
            }
            if !affected.is_empty() {
                super::save_draft(config, &loaded)?;
            }
            Err(anyhow::anyhow!("{message}"))
        }
        Err(e) => Err(anyhow::anyhow!("Failed to add filter: {e}")),
    }
}

pub fn add_transition(
    config: &AppConfig,
    draft: &str,
    name: &str,
    duration: Option<f64>,
    between: Option<(String, String)>,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;

    let pair = between.as_ref().map(|(a, b)| (a.as_str(), b.as_str()));
    let applied = effects::add_transition(&mut loaded.document, name, duration, pair)
        .map_err(|e| anyhow::anyhow!("Failed to add transition: {e}"))?;

    println!("Transition '{name}' ({})", applied.material_id);
    if applied.segments.is_empty() {
        println!("  No adjacent segments; material registered only");
    } else {
        println!("  Cuts: {}", applied.segments.len());
    }

    super::save_draft(config, &loaded)
}

pub fn adjust_color(
    config: &AppConfig,
    draft: &str,
    segment: Option<String>,
    brightness: Option<f64>,
    contrast: Option<f64>,
    saturation: Option<f64>,
) -> anyhow::Result<()> {
    let adjustment = ColorAdjustment {
        brightness,
        contrast,
        saturation,
    };
    if adjustment.is_empty() {
        return Err(anyhow::anyhow!(
            "Nothing to adjust: pass --brightness, --contrast, or --saturation"
        ));
    }

    let mut loaded = super::load_draft(config, draft)?;
    let targets: Vec<String> = match segment {
        Some(id) => vec![id],
        None => loaded
            .document
            .tracks_of(TrackKind::Video)
            .flat_map(|t| &t.segments)
            .map(|s| s.id.clone())
            .collect(),
    };

    let mut adjusted = 0;
    let mut failures = Vec::new();
    for id in &targets {
        match effects::adjust_color(&mut loaded.document, id, adjustment) {
            Ok(_) => adjusted += 1,
            Err(e) => failures.push(format!("{id}: {e}")),
        }
    }

    println!("Color adjusted on {adjusted} of {} segment(s)", targets.len());
    for failure in &failures {
        println!("  Skipped {failure}");
    }
    if adjusted > 0 {
        super::save_draft(config, &loaded)?;
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} segment(s) not adjusted", failures.len()))
    }
}
