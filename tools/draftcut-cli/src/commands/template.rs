//! Extract and apply timeline templates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use draftcut_common::config::AppConfig;
use draftcut_common::{DraftError, DraftResult};
use draftcut_draft_model::{load_template, save_template, Document, LoadedDraft, Template};
use draftcut_editing_core::batch::{run_batch, summarize, BatchOutcome};
use draftcut_editing_core::template::{self, ApplyReport};

pub fn extract(
    config: &AppConfig,
    draft: &str,
    name: &str,
    description: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let loaded = super::load_draft(config, draft)?;
    let template = template::extract(&loaded.document, name, description);

    let output = output.unwrap_or_else(|| config.templates_dir.join(name).join("template.json"));
    save_template(&template, &output)
        .map_err(|e| anyhow::anyhow!("Failed to save template: {e}"))?;

    println!("Template '{name}' ({})", template.template_type);
    println!("  Tracks: {}", template.tracks.len());
    println!("  Placeholders: {}", template.materials_mapping.len());
    println!("  Saved: {}", output.display());
    Ok(())
}

pub fn apply(
    config: &AppConfig,
    draft: &str,
    template_path: &Path,
    mappings: &[String],
    materials: &[String],
) -> anyhow::Result<()> {
    let template = load_template(template_path)
        .map_err(|e| anyhow::anyhow!("Failed to load template: {e}"))?;
    let pairs = parse_mappings(mappings)?;
    let mut loaded = super::load_draft(config, draft)?;

    let mapping = build_mapping(&template, &loaded.document, &pairs, materials)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let report = template::apply(&mut loaded.document, &template, &mapping);
    print_report(&template, &report);

    super::save_draft(config, &loaded)
}

pub async fn batch_apply(
    config: &AppConfig,
    template_path: &Path,
    drafts: Vec<String>,
    mappings: &[String],
    materials: &[String],
    output_dir: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let template = Arc::new(
        load_template(template_path)
            .map_err(|e| anyhow::anyhow!("Failed to load template: {e}"))?,
    );
    let pairs = Arc::new(parse_mappings(mappings)?);
    let materials = Arc::new(materials.to_vec());

    println!(
        "Applying template '{}' to {} draft(s)...",
        template.name,
        drafts.len()
    );

    let mut handles = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let path = config.resolve_draft(&draft);
        let template = Arc::clone(&template);
        let pairs = Arc::clone(&pairs);
        let materials = Arc::clone(&materials);
        let output_dir = output_dir.clone();
        let suffix = config.backup_suffix.clone();

        let handle = tokio::task::spawn_blocking(move || -> DraftResult<Option<String>> {
            let mut loaded = LoadedDraft::load(&path)?;
            let mapping = build_mapping(&template, &loaded.document, &pairs, &materials)?;
            let report = template::apply(&mut loaded.document, &template, &mapping);
            if !report.dangling.is_empty() {
                return Err(DraftError::invalid(format!(
                    "mapped materials not in draft: {}",
                    report.dangling.join(", ")
                )));
            }
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
    super::preset::print_outcomes(&outcomes, json)?;
    fail_on_errors(&outcomes)
}

pub(crate) fn fail_on_errors(outcomes: &[BatchOutcome]) -> anyhow::Result<()> {
    let (_, failed) = summarize(outcomes);
    if failed > 0 {
        Err(anyhow::anyhow!("{failed} draft(s) failed"))
    } else {
        Ok(())
    }
}

/// Parse `TEMPLATE_ID=MATERIAL_ID` pairs.
fn parse_mappings(mappings: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    mappings
        .iter()
        .map(|pair| {
            let (from, to) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Expected TEMPLATE_ID=MATERIAL_ID, got '{pair}'"))?;
            Ok((from.trim().to_string(), to.trim().to_string()))
        })
        .collect()
}

/// Explicit pairs win. Otherwise candidates pair with placeholders in
/// order. With neither, placeholders the draft already has map to
/// themselves.
fn build_mapping(
    template: &Template,
    doc: &Document,
    pairs: &BTreeMap<String, String>,
    candidates: &[String],
) -> DraftResult<BTreeMap<String, String>> {
    if !pairs.is_empty() {
        return Ok(pairs.clone());
    }
    if !candidates.is_empty() {
        return template::mapping_from_candidates(template, candidates);
    }
    Ok(template
        .placeholders()
        .filter(|(id, _)| doc.materials.contains(id))
        .map(|(id, _)| (id.to_string(), id.to_string()))
        .collect())
}

fn print_report(template: &Template, report: &ApplyReport) {
    println!("Applied template '{}'", template.name);
    println!("  Tracks: {}", report.tracks);
    println!("  References replaced: {}", report.replaced);
    if !report.unresolved.is_empty() {
        println!("  Unmapped placeholders: {}", report.unresolved.join(", "));
    }
    if !report.dangling.is_empty() {
        println!("  Mapped to missing materials: {}", report.dangling.join(", "));
    }
}
