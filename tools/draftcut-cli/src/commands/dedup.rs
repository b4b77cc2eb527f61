//! Randomize video segments.

use draftcut_common::config::{AppConfig, DedupDefaults};
use draftcut_editing_core::{DedupConfig, Deduplicator};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn run(
    config: &AppConfig,
    draft: &str,
    switches: &DedupDefaults,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;
    println!("Deduplicating: {}", loaded.root.display());

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut dedup = Deduplicator::new(rng, DedupConfig::from(switches));
    let report = dedup
        .run(&mut loaded.document)
        .map_err(|e| anyhow::anyhow!("Dedup failed: {e}"))?;

    println!("  Segments: {}", report.segments);
    println!("  Mirrored: {}", report.mirrored);
    if let Some(filter) = report.filter {
        println!("  Filter: {filter}");
    }

    super::save_draft(config, &loaded)
}
