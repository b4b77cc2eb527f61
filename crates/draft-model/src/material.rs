//! Materials and the registry that owns them.
//!
//! Segments never embed resources; they reference a [`Material`] by id.
//! Materials live in typed buckets under the document's `materials` key
//! and are created on demand by editing operations. Nothing here deletes
//! them: orphans are left for the consuming application to clean up.

use std::fmt;

use draftcut_common::{DraftError, DraftResult, Micros};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::generate_id;

/// Registry bucket a material is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Video,
    Audio,
    Text,
    Sticker,
    Effect,
    Transition,
    Filter,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 7] = [
        MaterialKind::Video,
        MaterialKind::Audio,
        MaterialKind::Text,
        MaterialKind::Sticker,
        MaterialKind::Effect,
        MaterialKind::Transition,
        MaterialKind::Filter,
    ];

    /// Default `type` discriminator written on new materials.
    pub fn type_tag(&self) -> &'static str {
        match self {
            MaterialKind::Video => "video",
            MaterialKind::Audio => "audio",
            MaterialKind::Text => "text",
            MaterialKind::Sticker => "sticker",
            MaterialKind::Effect => "effect",
            MaterialKind::Transition => "transition",
            MaterialKind::Filter => "filter",
        }
    }

    /// Key of the bucket under `materials`.
    pub fn bucket_name(&self) -> &'static str {
        match self {
            MaterialKind::Video => "videos",
            MaterialKind::Audio => "audios",
            MaterialKind::Text => "texts",
            MaterialKind::Sticker => "stickers",
            MaterialKind::Effect => "effects",
            MaterialKind::Transition => "transitions",
            MaterialKind::Filter => "filters",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

/// A registry entry describing a reusable resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub id: String,

    /// Type discriminator understood by the consuming application.
    #[serde(rename = "type", default)]
    pub material_type: String,

    /// Media file path (video, audio, sticker).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Full media length in microseconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Micros>,

    /// Literal text (text materials).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// `#RRGGBB` font color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,

    /// Catalog identifier for filters, transitions, effects, and stickers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Filter strength in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,

    /// Color adjustment values in `[-1, 1]` (adjust effects).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    /// An empty material of the given kind; the id is assigned on register.
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            material_type: kind.type_tag().to_string(),
            ..Self::default()
        }
    }

    pub fn media(kind: MaterialKind, path: impl Into<String>, duration: Option<Micros>) -> Self {
        let path = path.into();
        let name = std::path::Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self {
            path: Some(path),
            name,
            duration,
            ..Self::new(kind)
        }
    }

    pub fn text(content: impl Into<String>, font_size: f64, font_color: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            font_size: Some(font_size),
            font_color: Some(font_color.into()),
            ..Self::new(MaterialKind::Text)
        }
    }

    pub fn catalog_effect(kind: MaterialKind, effect_id: &str, name: &str) -> Self {
        Self {
            effect_id: Some(effect_id.to_string()),
            name: Some(name.to_string()),
            ..Self::new(kind)
        }
    }
}

/// The document's material collections, one bucket per kind.
///
/// Buckets the engine does not manage (canvases, speeds, ...) stay in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Materials {
    #[serde(default)]
    pub videos: Vec<Material>,
    #[serde(default)]
    pub audios: Vec<Material>,
    #[serde(default)]
    pub texts: Vec<Material>,
    #[serde(default)]
    pub stickers: Vec<Material>,
    #[serde(default)]
    pub effects: Vec<Material>,
    #[serde(default)]
    pub transitions: Vec<Material>,
    #[serde(default)]
    pub filters: Vec<Material>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Materials {
    pub fn bucket(&self, kind: MaterialKind) -> &Vec<Material> {
        match kind {
            MaterialKind::Video => &self.videos,
            MaterialKind::Audio => &self.audios,
            MaterialKind::Text => &self.texts,
            MaterialKind::Sticker => &self.stickers,
            MaterialKind::Effect => &self.effects,
            MaterialKind::Transition => &self.transitions,
            MaterialKind::Filter => &self.filters,
        }
    }

    pub fn bucket_mut(&mut self, kind: MaterialKind) -> &mut Vec<Material> {
        match kind {
            MaterialKind::Video => &mut self.videos,
            MaterialKind::Audio => &mut self.audios,
            MaterialKind::Text => &mut self.texts,
            MaterialKind::Sticker => &mut self.stickers,
            MaterialKind::Effect => &mut self.effects,
            MaterialKind::Transition => &mut self.transitions,
            MaterialKind::Filter => &mut self.filters,
        }
    }

    /// Add a material to its bucket and return its id.
    ///
    /// Generates an id when the material has none and fills in the `type`
    /// discriminator. Fails on malformed materials and on id collisions.
    pub fn register(&mut self, kind: MaterialKind, mut material: Material) -> DraftResult<String> {
        Self::check_required_fields(kind, &material)?;

        if material.id.is_empty() {
            material.id = generate_id();
        } else if self.contains(&material.id) {
            return Err(DraftError::invalid(format!(
                "material id {} is already registered",
                material.id
            )));
        }
        if material.material_type.is_empty() {
            material.material_type = kind.type_tag().to_string();
        }

        let id = material.id.clone();
        tracing::debug!(%id, kind = %kind, "registered material");
        self.bucket_mut(kind).push(material);
        Ok(id)
    }

    fn check_required_fields(kind: MaterialKind, material: &Material) -> DraftResult<()> {
        let missing = match kind {
            MaterialKind::Video | MaterialKind::Audio => {
                blank(&material.path).then_some("path")
            }
            MaterialKind::Text => material.content.is_none().then_some("content"),
            MaterialKind::Sticker => {
                (blank(&material.path) && blank(&material.effect_id)).then_some("path or effect_id")
            }
            MaterialKind::Filter | MaterialKind::Transition | MaterialKind::Effect => {
                blank(&material.effect_id).then_some("effect_id")
            }
        };
        match missing {
            Some(field) => Err(DraftError::invalid(format!(
                "{kind} material is missing required field '{field}'"
            ))),
            None => Ok(()),
        }
    }

    pub fn find(&self, id: &str) -> Option<&Material> {
        self.iter().map(|(_, m)| m).find(|m| m.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Material> {
        let kind = self.kind_of(id)?;
        self.bucket_mut(kind).iter_mut().find(|m| m.id == id)
    }

    /// Bucket holding the material with this id.
    pub fn kind_of(&self, id: &str) -> Option<MaterialKind> {
        self.iter().find(|(_, m)| m.id == id).map(|(k, _)| k)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Existing material in `kind` carrying this catalog identifier.
    ///
    /// This is the semantic key that keeps filter and transition
    /// registration idempotent.
    pub fn find_by_effect_id(&self, kind: MaterialKind, effect_id: &str) -> Option<&Material> {
        self.bucket(kind)
            .iter()
            .find(|m| m.effect_id.as_deref() == Some(effect_id))
    }

    /// Every material with its bucket kind.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialKind, &Material)> + '_ {
        MaterialKind::ALL
            .into_iter()
            .flat_map(move |kind| self.bucket(kind).iter().map(move |m| (kind, m)))
    }

    pub fn len(&self) -> usize {
        MaterialKind::ALL.iter().map(|k| self.bucket(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_generates_uppercase_id_and_type() {
        let mut materials = Materials::default();
        let id = materials
            .register(MaterialKind::Audio, Material::media(MaterialKind::Audio, "/music/a.mp3", None))
            .unwrap();
        assert_eq!(id, id.to_uppercase());
        let stored = materials.find(&id).unwrap();
        assert_eq!(stored.material_type, "audio");
        assert_eq!(stored.name.as_deref(), Some("a.mp3"));
        assert_eq!(materials.kind_of(&id), Some(MaterialKind::Audio));
    }

    #[test]
    fn test_register_rejects_malformed_materials() {
        let mut materials = Materials::default();
        let err = materials
            .register(MaterialKind::Video, Material::new(MaterialKind::Video))
            .unwrap_err();
        assert!(err.to_string().contains("path"));

        let err = materials
            .register(MaterialKind::Filter, Material::new(MaterialKind::Filter))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(materials.is_empty());
    }

    #[test]
    fn test_register_rejects_duplicate_ids() {
        let mut materials = Materials::default();
        let mut text = Material::text("hi", 48.0, "#FFFFFF");
        text.id = "T1".to_string();
        materials.register(MaterialKind::Text, text.clone()).unwrap();
        assert!(materials.register(MaterialKind::Text, text).is_err());
        assert_eq!(materials.len(), 1);
    }

    #[test]
    fn test_find_by_effect_id_is_scoped_to_kind() {
        let mut materials = Materials::default();
        materials
            .register(
                MaterialKind::Filter,
                Material::catalog_effect(MaterialKind::Filter, "filter_warm_001", "warm"),
            )
            .unwrap();
        assert!(materials
            .find_by_effect_id(MaterialKind::Filter, "filter_warm_001")
            .is_some());
        assert!(materials
            .find_by_effect_id(MaterialKind::Transition, "filter_warm_001")
            .is_none());
    }

    #[test]
    fn test_unmanaged_buckets_survive_round_trip() {
        let json = r#"{"videos": [], "canvases": [{"id": "C1", "type": "canvas_color"}]}"#;
        let materials: Materials = serde_json::from_str(json).unwrap();
        assert!(materials.extra.contains_key("canvases"));
        let back = serde_json::to_value(&materials).unwrap();
        assert_eq!(back["canvases"][0]["id"], "C1");
    }
}
