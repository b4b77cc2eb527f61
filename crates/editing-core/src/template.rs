//! Template extraction and application.

use std::collections::{BTreeMap, BTreeSet};

use draftcut_common::{DraftError, DraftResult};
use draftcut_draft_model::{Document, Placeholder, Template, TrackKind};
use serde_json::Value;

/// Outcome of [`apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub tracks: usize,
    /// Segments whose material id was rewritten.
    pub replaced: usize,
    /// Placeholder ids with no entry in the mapping, left as they were.
    pub unresolved: Vec<String>,
    /// Mapping targets that are not in the draft's registry.
    pub dangling: Vec<String>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.dangling.is_empty()
    }
}

/// Capture a draft's canvas and tracks as a template.
///
/// Every segment's material reference becomes a placeholder typed by the
/// kind of its track. Material payloads are not copied.
pub fn extract(doc: &Document, name: &str, description: &str) -> Template {
    let mut mapping = BTreeMap::new();
    for track in &doc.tracks {
        for segment in &track.segments {
            if segment.material_id.is_empty() {
                continue;
            }
            mapping.insert(
                segment.material_id.clone(),
                Placeholder {
                    kind: track.kind,
                    placeholder: true,
                },
            );
        }
    }

    let mut template = Template::new(
        name,
        description,
        doc.canvas_config.clone(),
        doc.tracks.clone(),
        mapping,
    );
    template.template_type = template_type_of(doc).to_string();

    tracing::info!(
        name,
        tracks = template.tracks.len(),
        placeholders = template.materials_mapping.len(),
        "extracted template"
    );
    template
}

fn template_type_of(doc: &Document) -> &'static str {
    let kinds: BTreeSet<TrackKind> = doc
        .tracks
        .iter()
        .filter(|t| !t.segments.is_empty())
        .map(|t| t.kind)
        .collect();
    let kinds: Vec<TrackKind> = kinds.into_iter().collect();
    match kinds.as_slice() {
        [TrackKind::Video] => "video",
        [TrackKind::Audio] => "audio",
        [TrackKind::Text] => "text",
        _ => "mixed",
    }
}

/// Whether a JSON value has the minimal template shape.
pub fn validate(value: &Value) -> bool {
    Template::validate_shape(value).is_ok()
}

/// Replace a draft's canvas and tracks with the template's, rewriting
/// material references through `mapping` (template id -> draft id).
///
/// The canvas is replaced only when the template carries one.
pub fn apply(doc: &mut Document, template: &Template, mapping: &BTreeMap<String, String>) -> ApplyReport {
    let mut tracks = template.tracks.clone();
    let mut report = ApplyReport {
        tracks: tracks.len(),
        ..ApplyReport::default()
    };

    for segment in tracks.iter_mut().flat_map(|t| t.segments.iter_mut()) {
        if let Some(target) = mapping.get(&segment.material_id) {
            segment.material_id = target.clone();
            report.replaced += 1;
        }
    }

    report.unresolved = template
        .materials_mapping
        .keys()
        .filter(|id| !mapping.contains_key(*id))
        .cloned()
        .collect();
    report.dangling = mapping
        .values()
        .filter(|id| !doc.materials.contains(id))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if let Some(canvas) = &template.canvas_config {
        doc.canvas_config = Some(canvas.clone());
    }
    doc.tracks = tracks;

    if report.is_complete() {
        tracing::info!(template = %template.name, replaced = report.replaced, "applied template");
    } else {
        tracing::warn!(
            template = %template.name,
            unresolved = report.unresolved.len(),
            dangling = report.dangling.len(),
            "applied template with unmapped materials"
        );
    }
    report
}

/// Fail when there are fewer candidate materials than placeholders.
/// Candidate kinds are not checked.
pub fn check_compatibility(template: &Template, candidates: &[String]) -> DraftResult<()> {
    let needed = template.materials_mapping.len();
    if candidates.len() < needed {
        return Err(DraftError::invalid(format!(
            "template '{}' needs {needed} materials, got {}",
            template.name,
            candidates.len()
        )));
    }
    Ok(())
}

/// Pair placeholders (in id order) with candidates (in the given order).
pub fn mapping_from_candidates(
    template: &Template,
    candidates: &[String],
) -> DraftResult<BTreeMap<String, String>> {
    check_compatibility(template, candidates)?;
    Ok(template
        .placeholders()
        .map(|(id, _)| id.to_string())
        .zip(candidates.iter().cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{add_text, TextSpec};
    use crate::timeline::tests::one_clip_doc;
    use draftcut_draft_model::{Material, MaterialKind};
    use serde_json::json;

    #[test]
    fn test_extract_builds_typed_placeholders_without_payloads() {
        let mut doc = one_clip_doc();
        doc.canvas_config = Some(json!({"width": 1080, "height": 1920}));
        add_text(&mut doc, TextSpec::new("Title", 0, 1_000_000)).unwrap();

        let template = extract(&doc, "promo", "vertical promo");
        assert_eq!(template.tracks, doc.tracks);
        assert_eq!(template.canvas_config, doc.canvas_config);
        assert_eq!(template.template_type, "mixed");
        assert_eq!(template.materials_mapping.len(), 2);
        assert_eq!(template.materials_mapping["vid1"].kind, TrackKind::Video);
        assert!(template.materials_mapping.values().all(|p| p.placeholder));
        assert!(template.created_at.is_some());

        let value = serde_json::to_value(&template).unwrap();
        assert!(value.get("materials").is_none());
        assert!(validate(&value));
    }

    #[test]
    fn test_apply_rewrites_mapped_ids_and_reports_the_rest() {
        let source = one_clip_doc();
        let template = extract(&source, "t", "");

        let mut target = Document::default();
        target.canvas_config = Some(json!({"width": 1920}));
        let new_id = target
            .materials
            .register(MaterialKind::Video, Material::media(MaterialKind::Video, "/new.mp4", None))
            .unwrap();

        let mapping = BTreeMap::from([("vid1".to_string(), new_id.clone())]);
        let report = apply(&mut target, &template, &mapping);
        assert!(report.is_complete());
        assert_eq!(report.replaced, 1);
        assert_eq!(target.tracks[0].segments[0].material_id, new_id);
        // template without canvas keeps the draft's canvas
        assert_eq!(target.canvas_config, Some(json!({"width": 1920})));
        assert!(target.validate().is_ok());

        let mut other = Document::default();
        let report = apply(&mut other, &template, &BTreeMap::new());
        assert_eq!(report.unresolved, vec!["vid1".to_string()]);
        assert_eq!(other.tracks[0].segments[0].material_id, "vid1");
    }

    #[test]
    fn test_compatibility_counts_candidates_only() {
        let template = extract(&one_clip_doc(), "t", "");
        assert!(check_compatibility(&template, &[]).unwrap_err().is_invalid_argument());
        let mapping = mapping_from_candidates(&template, &["A".into(), "B".into()]).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["vid1"], "A");
    }
}
