//! Reading and writing draft directories and template files.

use std::path::{Path, PathBuf};

use draftcut_common::{DraftError, DraftResult};

use crate::document::Document;
use crate::template::Template;

/// File holding a draft's timeline inside its directory.
pub const CONTENT_FILE: &str = "draft_content.json";

/// Suffix of the copy kept from the previous save.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// A draft loaded from disk with its on-disk location.
#[derive(Debug, Clone)]
pub struct LoadedDraft {
    /// Draft directory.
    pub root: PathBuf,

    pub document: Document,
}

impl LoadedDraft {
    /// Load `draft_content.json` from a draft directory.
    pub fn load(root: impl AsRef<Path>) -> DraftResult<Self> {
        let root = root.as_ref().to_path_buf();
        let path = root.join(CONTENT_FILE);
        if !path.is_file() {
            return Err(DraftError::FileNotFound { path });
        }

        let content = std::fs::read_to_string(&path)?;
        let document = Document::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            tracks = document.tracks.len(),
            materials = document.materials.len(),
            "loaded draft"
        );

        Ok(Self { root, document })
    }

    pub fn content_path(&self) -> PathBuf {
        self.root.join(CONTENT_FILE)
    }

    /// Save with the default backup suffix.
    pub fn save(&self) -> DraftResult<()> {
        self.save_with_backup(DEFAULT_BACKUP_SUFFIX)
    }

    /// Copy the current file aside as `draft_content.json<suffix>`, then
    /// write the document as pretty JSON.
    pub fn save_with_backup(&self, suffix: &str) -> DraftResult<()> {
        let path = self.content_path();
        let json = self.document.to_json_string()?;

        if path.is_file() {
            let backup = backup_path(&path, suffix);
            std::fs::copy(&path, &backup)?;
            tracing::debug!(backup = %backup.display(), "kept previous draft content");
        } else {
            std::fs::create_dir_all(&self.root)?;
        }

        std::fs::write(&path, json)?;
        tracing::info!(path = %path.display(), "saved draft");
        Ok(())
    }
}

fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Read and validate a template file.
pub fn load_template(path: impl AsRef<Path>) -> DraftResult<Template> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DraftError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    Template::from_json_str(&content)
}

/// Write a template as pretty JSON, creating parent directories.
pub fn save_template(template: &Template, path: impl AsRef<Path>) -> DraftResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, template.to_json_string()?)?;
    tracing::info!(path = %path.display(), name = %template.name, "saved template");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("draftcut_store_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_draft_is_file_not_found() {
        let dir = scratch("missing");
        let err = LoadedDraft::load(&dir).unwrap_err();
        assert!(matches!(err, DraftError::FileNotFound { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_encrypted_draft_is_unsupported() {
        let dir = scratch("encrypted");
        std::fs::write(dir.join(CONTENT_FILE), "aGVsbG8gd29ybGQ=").unwrap();
        let err = LoadedDraft::load(&dir).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_keeps_backup_of_previous_content() {
        let dir = scratch("backup");
        let original = r#"{"tracks": [], "materials": {}, "keep_me": 7}"#;
        std::fs::write(dir.join(CONTENT_FILE), original).unwrap();

        let mut draft = LoadedDraft::load(&dir).unwrap();
        draft.document.canvas_config = Some(serde_json::json!({"width": 1080}));
        draft.save().unwrap();

        let backup = std::fs::read_to_string(dir.join("draft_content.json.bak")).unwrap();
        assert_eq!(backup, original);

        let reloaded = LoadedDraft::load(&dir).unwrap();
        assert_eq!(reloaded.document.extra["keep_me"], 7);
        assert!(reloaded.document.canvas_config.is_some());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_template_file_round_trip() {
        let dir = scratch("template");
        let path = dir.join("nested").join("template.json");
        let template = Template::from_json_str(
            r#"{"name": "intro", "tracks": [], "materials_mapping": {}}"#,
        )
        .unwrap();
        save_template(&template, &path).unwrap();
        assert_eq!(load_template(&path).unwrap(), template);
        assert!(load_template(dir.join("nope.json")).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
