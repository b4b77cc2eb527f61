//! Reusable timeline templates.
//!
//! A template is a copy of a draft's canvas and tracks in which every
//! material reference is a placeholder, listed in `materials_mapping` with
//! the kind of track it was found on. Material payloads are never copied.

use std::collections::BTreeMap;

use draftcut_common::{DraftError, DraftResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::track::{Track, TrackKind};

pub const TEMPLATE_VERSION: &str = "1.0";

/// A placeholder slot for one material reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Kind of the track the reference was found on.
    #[serde(rename = "type")]
    pub kind: TrackKind,
    #[serde(default = "yes")]
    pub placeholder: bool,
}

fn yes() -> bool {
    true
}

fn default_template_type() -> String {
    "mixed".to_string()
}

fn default_version() -> String {
    TEMPLATE_VERSION.to_string()
}

/// Template file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// `video`, `audio`, `text`, or `mixed`.
    #[serde(default = "default_template_type")]
    pub template_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_config: Option<Value>,

    pub tracks: Vec<Track>,

    /// Template material id -> placeholder description.
    pub materials_mapping: BTreeMap<String, Placeholder>,

    #[serde(default = "default_version")]
    pub version: String,

    /// RFC 3339 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Template {
    /// A template stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        canvas_config: Option<Value>,
        tracks: Vec<Track>,
        materials_mapping: BTreeMap<String, Placeholder>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            template_type: default_template_type(),
            canvas_config,
            tracks,
            materials_mapping,
            version: default_version(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            extra: Map::new(),
        }
    }

    /// Check the minimal shape of a template value: a `name`, a `tracks`
    /// array, and a `materials_mapping` object.
    pub fn validate_shape(value: &Value) -> DraftResult<()> {
        let obj = value
            .as_object()
            .ok_or_else(|| DraftError::invalid("template must be a JSON object"))?;

        if !obj.get("name").is_some_and(Value::is_string) {
            return Err(DraftError::invalid("template is missing 'name'"));
        }
        if !obj.get("tracks").is_some_and(Value::is_array) {
            return Err(DraftError::invalid("template 'tracks' must be an array"));
        }
        if !obj.get("materials_mapping").is_some_and(Value::is_object) {
            return Err(DraftError::invalid(
                "template 'materials_mapping' must be an object",
            ));
        }
        Ok(())
    }

    /// Validate the shape, then parse.
    pub fn from_value(value: Value) -> DraftResult<Self> {
        Self::validate_shape(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(content: &str) -> DraftResult<Self> {
        Self::from_value(serde_json::from_str(content)?)
    }

    pub fn to_json_string(&self) -> DraftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Placeholder ids in a stable order.
    pub fn placeholders(&self) -> impl Iterator<Item = (&str, &Placeholder)> + '_ {
        self.materials_mapping.iter().map(|(id, p)| (id.as_str(), p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_shape() {
        let good = json!({"name": "t", "tracks": [], "materials_mapping": {}});
        assert!(Template::validate_shape(&good).is_ok());

        for bad in [
            json!([]),
            json!({"tracks": [], "materials_mapping": {}}),
            json!({"name": "t", "tracks": {}, "materials_mapping": {}}),
            json!({"name": "t", "tracks": [], "materials_mapping": []}),
        ] {
            assert!(Template::validate_shape(&bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_defaults_for_minimal_template() {
        let t = Template::from_value(json!({
            "name": "minimal",
            "tracks": [],
            "materials_mapping": {"M1": {"type": "video", "placeholder": true}}
        }))
        .unwrap();
        assert_eq!(t.template_type, "mixed");
        assert_eq!(t.version, TEMPLATE_VERSION);
        assert_eq!(t.materials_mapping["M1"].kind, TrackKind::Video);
        assert!(t.canvas_config.is_none());
    }
}
