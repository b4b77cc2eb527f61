//! Subcommand implementations.

pub mod animate;
pub mod catalog;
pub mod dedup;
pub mod edit;
pub mod effects;
pub mod info;
pub mod music;
pub mod overlay;
pub mod preset;
pub mod silence;
pub mod template;
pub mod validate;

use std::path::{Path, PathBuf};

use draftcut_common::config::AppConfig;
use draftcut_draft_model::LoadedDraft;

/// Resolve and load a draft argument.
pub(crate) fn load_draft(config: &AppConfig, draft: &str) -> anyhow::Result<LoadedDraft> {
    let path = config.resolve_draft(draft);
    LoadedDraft::load(&path).map_err(|e| anyhow::anyhow!("Failed to load draft: {e}"))
}

/// Write a draft back in place, keeping the previous file as a backup.
pub(crate) fn save_draft(config: &AppConfig, draft: &LoadedDraft) -> anyhow::Result<()> {
    draft
        .save_with_backup(&config.backup_suffix)
        .map_err(|e| anyhow::anyhow!("Failed to save draft: {e}"))?;
    println!("  Saved: {}", draft.content_path().display());
    Ok(())
}

/// Where a batch writes one draft: a same-named folder under `output_dir`
/// when given, otherwise the draft's own folder.
pub(crate) fn batch_target(draft: &LoadedDraft, output_dir: Option<&Path>) -> PathBuf {
    match (output_dir, draft.root.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        (Some(dir), None) => dir.to_path_buf(),
        (None, _) => draft.root.clone(),
    }
}

/// Parse `x,y` into a pair.
pub(crate) fn parse_pair(value: &str) -> anyhow::Result<(f64, f64)> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Expected 'x,y', got '{value}'"))?;
    Ok((x.trim().parse()?, y.trim().parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("0.2, 0.8").unwrap(), (0.2, 0.8));
        assert!(parse_pair("0.2").is_err());
        assert!(parse_pair("a,b").is_err());
    }
}
