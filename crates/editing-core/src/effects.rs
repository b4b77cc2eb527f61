//! Filters, transitions, text, stickers, and color adjustment.
//!
//! Catalog effects are registered once per effect identifier and shared by
//! reference: applying the same filter twice reuses the existing material.

use draftcut_common::{secs_to_micros, DraftError, DraftResult, Micros};
use draftcut_draft_model::{
    Clip, Document, Material, MaterialKind, Segment, SegmentTransition, TimeRange, TrackKind, Vec2,
};

use crate::catalog::{require_filter, require_transition};
use crate::timeline::{place_segment, Placement};

/// Effect identifier of per-segment color adjustment materials.
pub const ADJUST_EFFECT_ID: &str = "adjust";

/// Segments a filter is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTarget {
    Segment(String),
    AllVideo,
}

/// Result of attaching a catalog effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectApplied {
    pub material_id: String,
    /// Segments that now reference the material.
    pub segments: Vec<String>,
}

/// Register (or reuse) a catalog filter and reference it from the target
/// segments.
///
/// With [`FilterTarget::AllVideo`], segments whose own material does not
/// resolve are skipped. If some were skipped the filter is still applied to
/// the rest and the call returns `PartialFailure` listing both sets.
pub fn add_filter(
    doc: &mut Document,
    name: &str,
    intensity: f64,
    target: FilterTarget,
) -> DraftResult<EffectApplied> {
    let preset = require_filter(name)?;
    let intensity = intensity.clamp(0.0, 1.0);

    let mut eligible = Vec::new();
    let mut failed = Vec::new();
    match &target {
        FilterTarget::Segment(id) => {
            let segment = doc
                .segment(id)
                .ok_or_else(|| DraftError::not_found(format!("segment {id}")))?;
            if !doc.materials.contains(&segment.material_id) {
                return Err(DraftError::invalid(format!(
                    "segment {id} references unknown material {}",
                    segment.material_id
                )));
            }
            eligible.push(id.clone());
        }
        FilterTarget::AllVideo => {
            for segment in doc.tracks_of(TrackKind::Video).flat_map(|t| &t.segments) {
                if doc.materials.contains(&segment.material_id) {
                    eligible.push(segment.id.clone());
                } else {
                    tracing::warn!(
                        segment_id = %segment.id,
                        material_id = %segment.material_id,
                        "skipping segment with unresolved material"
                    );
                    failed.push((
                        segment.id.clone(),
                        format!("unknown material {}", segment.material_id),
                    ));
                }
            }
        }
    }

    if eligible.is_empty() && !failed.is_empty() {
        return Err(DraftError::PartialFailure {
            message: format!("filter '{name}' applied to no segment"),
            affected: vec![],
            failed,
        });
    }

    let material_id = match doc.materials.find_by_effect_id(MaterialKind::Filter, preset.effect_id) {
        Some(existing) => existing.id.clone(),
        None => {
            let mut material = Material::catalog_effect(MaterialKind::Filter, preset.effect_id, preset.label);
            material.category = Some(preset.category.to_string());
            doc.materials.register(MaterialKind::Filter, material)?
        }
    };
    if let Some(material) = doc.materials.find_mut(&material_id) {
        material.intensity = Some(intensity);
    }

    for id in &eligible {
        doc.segment_mut(id)?.add_extra_ref(&material_id);
    }

    tracing::info!(filter = name, %material_id, segments = eligible.len(), "applied filter");
    if failed.is_empty() {
        Ok(EffectApplied {
            material_id,
            segments: eligible,
        })
    } else {
        Err(DraftError::PartialFailure {
            message: format!("filter '{name}'"),
            affected: eligible,
            failed,
        })
    }
}

/// Drop a filter reference from one segment.
pub fn remove_filter(doc: &mut Document, segment_id: &str, material_id: &str) -> DraftResult<()> {
    if !doc.segment_mut(segment_id)?.remove_extra_ref(material_id) {
        return Err(DraftError::not_found(format!(
            "segment {segment_id} has no reference to {material_id}"
        )));
    }
    tracing::info!(segment_id, material_id, "removed filter");
    Ok(())
}

/// Attach a catalog transition to cuts between adjacent segments.
///
/// Without `between`, every adjacent pair on every video track gets the
/// transition, attached to the later segment. With `between = (from, to)`
/// only that pair is touched, and the two must be neighbours on one track.
pub fn add_transition(
    doc: &mut Document,
    name: &str,
    duration_secs: Option<f64>,
    between: Option<(&str, &str)>,
) -> DraftResult<EffectApplied> {
    let preset = require_transition(name)?;
    let duration = match duration_secs {
        Some(secs) => secs_to_micros(secs),
        None => preset.default_duration,
    };
    if duration == 0 {
        return Err(DraftError::invalid("transition duration must be positive"));
    }

    let targets: Vec<String> = match between {
        Some((from, to)) => vec![adjacent_later(doc, from, to)?],
        None => doc
            .tracks_of(TrackKind::Video)
            .flat_map(|t| t.segments.iter().skip(1).map(|s| s.id.clone()))
            .collect(),
    };

    let material_id = match doc
        .materials
        .find_by_effect_id(MaterialKind::Transition, preset.effect_id)
    {
        Some(existing) => existing.id.clone(),
        None => {
            let mut material =
                Material::catalog_effect(MaterialKind::Transition, preset.effect_id, preset.label);
            material.category = Some(preset.category.to_string());
            doc.materials.register(MaterialKind::Transition, material)?
        }
    };

    for id in &targets {
        doc.segment_mut(id)?.transition = Some(SegmentTransition {
            material_id: material_id.clone(),
            duration,
        });
    }

    tracing::info!(transition = name, duration, cuts = targets.len(), "applied transition");
    Ok(EffectApplied {
        material_id,
        segments: targets,
    })
}

fn adjacent_later(doc: &Document, from: &str, to: &str) -> DraftResult<String> {
    let a = doc.require(from)?;
    let b = doc.require(to)?;
    if a.track != b.track || b.segment != a.segment + 1 {
        return Err(DraftError::invalid(format!(
            "segments {from} and {to} are not adjacent on one track"
        )));
    }
    Ok(to.to_string())
}

/// Detach the transition from a segment.
pub fn remove_transition(doc: &mut Document, segment_id: &str) -> DraftResult<SegmentTransition> {
    let removed = doc
        .segment_mut(segment_id)?
        .transition
        .take()
        .ok_or_else(|| DraftError::not_found(format!("segment {segment_id} has no transition")))?;
    tracing::info!(segment_id, "removed transition");
    Ok(removed)
}

/// A timed text overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub content: String,
    pub start: Micros,
    pub duration: Micros,
    pub font_size: f64,
    /// `#RRGGBB`.
    pub font_color: String,
    /// Normalized `(x, y)`, `(0, 0)` top-left.
    pub position: (f64, f64),
}

impl TextSpec {
    pub fn new(content: impl Into<String>, start: Micros, duration: Micros) -> Self {
        Self {
            content: content.into(),
            start,
            duration,
            font_size: 48.0,
            font_color: "#FFFFFF".to_string(),
            position: (0.5, 0.9),
        }
    }
}

pub fn add_text(doc: &mut Document, spec: TextSpec) -> DraftResult<Placement> {
    if spec.content.trim().is_empty() {
        return Err(DraftError::invalid("text content is empty"));
    }
    if spec.duration == 0 {
        return Err(DraftError::invalid("text duration must be positive"));
    }
    if !is_hex_color(&spec.font_color) {
        return Err(DraftError::invalid(format!(
            "font color '{}' is not #RRGGBB",
            spec.font_color
        )));
    }

    let material_id = doc.materials.register(
        MaterialKind::Text,
        Material::text(spec.content, spec.font_size, spec.font_color),
    )?;

    let mut segment = Segment::new(material_id.clone(), None, TimeRange::new(spec.start, spec.duration));
    segment.clip = Some(Clip::at_normalized(spec.position.0, spec.position.1));
    let segment_id = segment.id.clone();

    let track_id = place_segment(doc, TrackKind::Text, segment)?;
    tracing::info!(%track_id, %segment_id, "added text");
    Ok(Placement {
        track_id,
        segment_id,
        material_id,
    })
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// A timed sticker overlay from a file or a catalog sticker id.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerSpec {
    pub path: Option<String>,
    pub effect_id: Option<String>,
    pub start: Micros,
    pub duration: Micros,
    pub position: (f64, f64),
    pub scale: f64,
}

impl StickerSpec {
    pub fn from_path(path: impl Into<String>, start: Micros, duration: Micros) -> Self {
        Self {
            path: Some(path.into()),
            effect_id: None,
            start,
            duration,
            position: (0.5, 0.5),
            scale: 1.0,
        }
    }
}

pub fn add_sticker(doc: &mut Document, spec: StickerSpec) -> DraftResult<Placement> {
    if spec.duration == 0 {
        return Err(DraftError::invalid("sticker duration must be positive"));
    }
    if !(spec.scale.is_finite() && spec.scale > 0.0) {
        return Err(DraftError::invalid(format!("sticker scale {} must be positive", spec.scale)));
    }

    let mut material = match &spec.path {
        Some(path) => Material::media(MaterialKind::Sticker, path.as_str(), None),
        None => Material::new(MaterialKind::Sticker),
    };
    material.effect_id = spec.effect_id.clone();
    let material_id = doc.materials.register(MaterialKind::Sticker, material)?;

    let mut segment = Segment::new(material_id.clone(), None, TimeRange::new(spec.start, spec.duration));
    let mut clip = Clip::at_normalized(spec.position.0, spec.position.1);
    clip.scale = Vec2::new(spec.scale, spec.scale);
    segment.clip = Some(clip);
    let segment_id = segment.id.clone();

    let track_id = place_segment(doc, TrackKind::Sticker, segment)?;
    tracing::info!(%track_id, %segment_id, "added sticker");
    Ok(Placement {
        track_id,
        segment_id,
        material_id,
    })
}

/// Color correction values, each in `[-1, 1]`. Unset fields are left as
/// they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorAdjustment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
}

impl ColorAdjustment {
    pub fn is_empty(&self) -> bool {
        self.brightness.is_none() && self.contrast.is_none() && self.saturation.is_none()
    }
}

/// Apply color correction to one segment.
///
/// Values live on an `adjust` effect material referenced by the segment. A
/// material shared with other segments is copied first so the change stays
/// local. Returns the id of the adjust material.
pub fn adjust_color(doc: &mut Document, segment_id: &str, adjustment: ColorAdjustment) -> DraftResult<String> {
    if adjustment.is_empty() {
        return Err(DraftError::invalid("no color adjustment given"));
    }

    let segment = doc
        .segment(segment_id)
        .ok_or_else(|| DraftError::not_found(format!("segment {segment_id}")))?;
    let current = segment.extra_refs().iter().find(|id| {
        doc.materials
            .find(id)
            .is_some_and(|m| m.effect_id.as_deref() == Some(ADJUST_EFFECT_ID))
    });

    let material_id = match current.cloned() {
        Some(id) if reference_count(doc, &id) == 1 => id,
        Some(shared) => {
            let copy = Material {
                id: String::new(),
                ..doc
                    .materials
                    .find(&shared)
                    .cloned()
                    .ok_or_else(|| DraftError::not_found(format!("material {shared}")))?
            };
            let id = doc.materials.register(MaterialKind::Effect, copy)?;
            let segment = doc.segment_mut(segment_id)?;
            segment.remove_extra_ref(&shared);
            segment.add_extra_ref(&id);
            tracing::debug!(%shared, copy = %id, "copied shared adjust material");
            id
        }
        None => {
            let id = doc.materials.register(
                MaterialKind::Effect,
                Material::catalog_effect(MaterialKind::Effect, ADJUST_EFFECT_ID, "Adjust"),
            )?;
            doc.segment_mut(segment_id)?.add_extra_ref(&id);
            id
        }
    };

    let material = doc
        .materials
        .find_mut(&material_id)
        .ok_or_else(|| DraftError::not_found(format!("material {material_id}")))?;
    let clamp = |v: f64| v.clamp(-1.0, 1.0);
    if let Some(v) = adjustment.brightness {
        material.brightness = Some(clamp(v));
    }
    if let Some(v) = adjustment.contrast {
        material.contrast = Some(clamp(v));
    }
    if let Some(v) = adjustment.saturation {
        material.saturation = Some(clamp(v));
    }

    tracing::info!(segment_id, %material_id, "adjusted color");
    Ok(material_id)
}

fn reference_count(doc: &Document, material_id: &str) -> usize {
    doc.tracks
        .iter()
        .flat_map(|t| &t.segments)
        .filter(|s| s.has_extra_ref(material_id))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::split;
    use crate::timeline::tests::one_clip_doc;

    fn three_clip_doc() -> Document {
        let mut doc = one_clip_doc();
        split(&mut doc, "seg1", 1_000_000).unwrap();
        let right = doc.tracks[0].segments[1].id.clone();
        split(&mut doc, &right, 1_000_000).unwrap();
        doc
    }

    #[test]
    fn test_filter_registers_once_and_references_every_video_segment() {
        let mut doc = three_clip_doc();
        let first = add_filter(&mut doc, "vintage_1980", 0.7, FilterTarget::AllVideo).unwrap();
        let second = add_filter(&mut doc, "vintage_1980", 1.7, FilterTarget::AllVideo).unwrap();

        assert_eq!(first.material_id, second.material_id);
        assert_eq!(doc.materials.filters.len(), 1);
        assert_eq!(doc.materials.filters[0].intensity, Some(1.0));
        for seg in &doc.tracks[0].segments {
            assert_eq!(seg.extra_refs(), [first.material_id.clone()]);
        }
    }

    #[test]
    fn test_unknown_filter_is_not_found() {
        let mut doc = one_clip_doc();
        let err = add_filter(&mut doc, "nope", 0.5, FilterTarget::AllVideo).unwrap_err();
        assert!(err.is_not_found());
        assert!(doc.materials.filters.is_empty());
    }

    #[test]
    fn test_filter_reports_partial_failure() {
        let mut doc = three_clip_doc();
        let broken = doc.tracks[0].segments[2].id.clone();
        doc.tracks[0].segments[2].material_id = "missing".into();

        match add_filter(&mut doc, "warm", 0.5, FilterTarget::AllVideo).unwrap_err() {
            DraftError::PartialFailure { affected, failed, .. } => {
                assert_eq!(affected.len(), 2);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].0, broken);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(doc.tracks[0].segments[2].extra_refs().is_empty());
        assert_eq!(doc.tracks[0].segments[0].extra_refs().len(), 1);
    }

    #[test]
    fn test_transition_attaches_to_later_segments() {
        let mut doc = three_clip_doc();
        let applied = add_transition(&mut doc, "fade", None, None).unwrap();
        let segs = &doc.tracks[0].segments;
        assert!(segs[0].transition.is_none());
        assert_eq!(
            segs[1].transition,
            Some(SegmentTransition {
                material_id: applied.material_id.clone(),
                duration: 500_000
            })
        );
        assert!(segs[2].transition.is_some());
        assert_eq!(applied.segments.len(), 2);
        assert_eq!(doc.materials.transitions.len(), 1);
    }

    #[test]
    fn test_transition_between_explicit_pair() {
        let mut doc = three_clip_doc();
        let ids: Vec<_> = doc.tracks[0].segments.iter().map(|s| s.id.clone()).collect();

        let err = add_transition(&mut doc, "dissolve", Some(1.0), Some((&ids[0], &ids[2]))).unwrap_err();
        assert!(err.is_invalid_argument());

        add_transition(&mut doc, "dissolve", Some(1.0), Some((&ids[1], &ids[2]))).unwrap();
        let segs = &doc.tracks[0].segments;
        assert!(segs[1].transition.is_none());
        assert_eq!(segs[2].transition.as_ref().map(|t| t.duration), Some(1_000_000));

        remove_transition(&mut doc, &ids[2]).unwrap();
        assert!(remove_transition(&mut doc, &ids[2]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_text_lands_on_text_track_with_mapped_position() {
        let mut doc = one_clip_doc();
        let placed = add_text(&mut doc, TextSpec::new("Hello", 0, 3_000_000)).unwrap();

        let track = doc.track(&placed.track_id).unwrap();
        assert_eq!(track.kind, TrackKind::Text);
        let seg = &track.segments[0];
        assert!(seg.source_timerange().is_none());
        let clip = seg.clip.as_ref().unwrap();
        assert!(clip.transform.x.abs() < 1e-9);
        assert!((clip.transform.y + 0.8).abs() < 1e-9);
        assert_eq!(
            doc.materials.find(&placed.material_id).unwrap().content.as_deref(),
            Some("Hello")
        );

        let mut bad = TextSpec::new("x", 0, 1);
        bad.font_color = "white".into();
        assert!(add_text(&mut doc, bad).is_err());
    }

    #[test]
    fn test_sticker_requires_a_source() {
        let mut doc = one_clip_doc();
        let spec = StickerSpec {
            path: None,
            ..StickerSpec::from_path("", 0, 1_000_000)
        };
        assert!(add_sticker(&mut doc, spec).unwrap_err().is_invalid_argument());

        let placed = add_sticker(&mut doc, StickerSpec::from_path("/s/star.png", 0, 1_000_000)).unwrap();
        assert_eq!(doc.track(&placed.track_id).unwrap().kind, TrackKind::Sticker);
    }

    #[test]
    fn test_adjust_color_clamps_and_copies_shared_material() {
        let mut doc = three_clip_doc();
        let ids: Vec<_> = doc.tracks[0].segments.iter().map(|s| s.id.clone()).collect();

        let adjustment = ColorAdjustment {
            brightness: Some(2.0),
            ..ColorAdjustment::default()
        };
        let first = adjust_color(&mut doc, &ids[0], adjustment).unwrap();
        assert_eq!(doc.materials.find(&first).unwrap().brightness, Some(1.0));

        // updating again reuses the segment's own material
        let again = adjust_color(&mut doc, &ids[0], ColorAdjustment { contrast: Some(-0.5), ..Default::default() }).unwrap();
        assert_eq!(again, first);

        // share it, then adjust one side
        doc.segment_mut(&ids[1]).unwrap().add_extra_ref(&first);
        let copied = adjust_color(&mut doc, &ids[1], ColorAdjustment { saturation: Some(0.3), ..Default::default() }).unwrap();
        assert_ne!(copied, first);
        assert!(doc.materials.find(&first).unwrap().saturation.is_none());
        let copy = doc.materials.find(&copied).unwrap();
        assert_eq!(copy.saturation, Some(0.3));
        assert_eq!(copy.contrast, Some(-0.5));
        assert!(!doc.segment(&ids[1]).unwrap().has_extra_ref(&first));
    }
}
