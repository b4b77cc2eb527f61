//! Apply and extract style presets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use draftcut_common::config::AppConfig;
use draftcut_common::{DraftError, DraftResult};
use draftcut_draft_model::LoadedDraft;
use draftcut_editing_core::batch::{run_batch, summarize, BatchOutcome};
use draftcut_editing_core::preset::{apply_preset, preset_from_document, validate_preset, StylePreset};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub async fn apply(
    config: &AppConfig,
    preset_path: &Path,
    drafts: Vec<String>,
    output_dir: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(preset_path)
        .map_err(|e| anyhow::anyhow!("Failed to read preset {}: {e}", preset_path.display()))?;
    let preset = StylePreset::from_json_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse preset: {e}"))?;
    validate_preset(&preset).map_err(|e| anyhow::anyhow!("Invalid preset: {e}"))?;
    let preset = Arc::new(preset);

    println!(
        "Applying preset '{}' to {} draft(s)...",
        preset.name,
        drafts.len()
    );

    let mut handles = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let path = config.resolve_draft(&draft);
        let preset = Arc::clone(&preset);
        let output_dir = output_dir.clone();
        let suffix = config.backup_suffix.clone();
        // Distinct stream per draft so a seeded batch is reproducible.
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        };

        let handle = tokio::task::spawn_blocking(move || -> DraftResult<Option<String>> {
            let mut loaded = LoadedDraft::load(&path)?;
            let report = apply_preset(&mut loaded.document, &preset, rng)?;
            tracing::debug!(draft = %path.display(), ?report, "preset applied");
            loaded.root = super::batch_target(&loaded, output_dir.as_deref());
            loaded.save_with_backup(&suffix)?;
            Ok(Some(loaded.content_path().display().to_string()))
        });
        handles.push((draft, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (draft, handle) in handles {
        let result = handle
            .await
            .unwrap_or_else(|e| Err(DraftError::Other(anyhow::anyhow!("task failed: {e}"))));
        results.push((draft, result));
    }

    let outcomes = run_batch(results, |result| result);
    print_outcomes(&outcomes, json)?;
    super::template::fail_on_errors(&outcomes)
}

pub fn extract(
    config: &AppConfig,
    draft: &str,
    name: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let loaded = super::load_draft(config, draft)?;
    let preset = preset_from_document(&loaded.document, name);

    let json = preset
        .to_json_string()
        .map_err(|e| anyhow::anyhow!("Failed to serialize preset: {e}"))?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)?;
            println!("Preset '{name}' saved to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub(crate) fn print_outcomes(outcomes: &[BatchOutcome], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        return Ok(());
    }
    for outcome in outcomes {
        match (&outcome.error, &outcome.output) {
            (Some(error), _) => println!("  FAIL {}: {error}", outcome.draft),
            (None, Some(output)) => println!("  OK   {} -> {output}", outcome.draft),
            (None, None) => println!("  OK   {}", outcome.draft),
        }
    }
    let (ok, failed) = summarize(outcomes);
    println!("\n{ok} succeeded, {failed} failed.");
    Ok(())
}
