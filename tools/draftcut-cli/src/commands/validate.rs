//! Validate a draft's structure.

use draftcut_common::config::AppConfig;

pub fn run(config: &AppConfig, draft: &str) -> anyhow::Result<()> {
    let loaded = super::load_draft(config, draft)?;
    println!("Validating draft at: {}", loaded.root.display());

    let doc = &loaded.document;
    println!("  Tracks: {}", doc.tracks.len());
    println!("  Materials: {}", doc.materials.len());

    let mut issues: Vec<String> = doc
        .broken_references()
        .into_iter()
        .map(|b| {
            format!(
                "segment {} on track {} references missing material {}",
                b.segment_id, b.track_id, b.material_id
            )
        })
        .collect();
    issues.extend(
        doc.tracks
            .iter()
            .filter(|t| !t.is_sequenced())
            .map(|t| format!("track {} has overlapping or unordered segments", t.id)),
    );

    // Speed changes without a duration resync are allowed; report only.
    let drifted: Vec<&str> = doc
        .tracks
        .iter()
        .flat_map(|t| &t.segments)
        .filter(|s| !s.is_time_consistent())
        .map(|s| s.id.as_str())
        .collect();
    if !drifted.is_empty() {
        println!(
            "  Note: {} segment(s) play at a speed their duration does not reflect: {}",
            drifted.len(),
            drifted.join(", ")
        );
    }

    if issues.is_empty() {
        println!("\nDraft is valid.");
        Ok(())
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        Err(anyhow::anyhow!("{} issue(s) found", issues.len()))
    }
}
