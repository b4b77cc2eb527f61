//! Show draft information.

use draftcut_common::config::AppConfig;
use draftcut_common::micros_to_secs;
use draftcut_draft_model::MaterialKind;

pub fn run(config: &AppConfig, draft: &str) -> anyhow::Result<()> {
    let loaded = super::load_draft(config, draft)?;
    let doc = &loaded.document;

    println!("Draft: {}", loaded.root.display());
    if let Some(canvas) = &doc.canvas_config {
        let width = canvas.get("width").and_then(|v| v.as_u64());
        let height = canvas.get("height").and_then(|v| v.as_u64());
        if let (Some(w), Some(h)) = (width, height) {
            println!("  Canvas: {w}x{h}");
        }
    }
    println!("  Duration: {:.2}s", micros_to_secs(doc.duration()));
    println!("  Segments: {}", doc.segment_count());
    println!();

    println!("Tracks:");
    for track in &doc.tracks {
        println!(
            "  {} [{}] {} segment(s), {:.2}s",
            track.id,
            track.kind,
            track.segments.len(),
            micros_to_secs(track.span())
        );
        for segment in &track.segments {
            let range = &segment.target_timerange;
            println!(
                "    {} {:.2}s-{:.2}s material={} speed={}",
                segment.id,
                micros_to_secs(range.start),
                micros_to_secs(range.end()),
                segment.material_id,
                segment.speed()
            );
        }
    }
    println!();

    println!("Materials:");
    for kind in MaterialKind::ALL {
        let bucket = doc.materials.bucket(kind);
        if !bucket.is_empty() {
            println!("  {}: {}", kind.bucket_name(), bucket.len());
        }
    }

    Ok(())
}
