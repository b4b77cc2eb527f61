//! Style presets: a named bundle of filter, transition, subtitles, color
//! adjustment, and deduplication settings applied in one step.

use draftcut_common::{micros_to_secs, secs_to_micros, DedupDefaults, DraftError, DraftResult};
use draftcut_draft_model::{Document, MaterialKind, TrackKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{require_filter, require_transition, FILTERS, TRANSITIONS};
use crate::dedup::{DedupConfig, DedupReport, Deduplicator};
use crate::effects::{
    add_filter, add_text, add_transition, adjust_color, ColorAdjustment, FilterTarget, TextSpec,
};

fn default_intensity() -> f64 {
    0.8
}

fn default_transition_secs() -> f64 {
    0.5
}

fn default_subtitle_secs() -> f64 {
    3.0
}

fn default_font_size() -> f64 {
    48.0
}

fn default_font_color() -> String {
    "#FFFFFF".to_string()
}

fn center() -> f64 {
    0.5
}

fn lower_third() -> f64 {
    0.9
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSetting {
    pub name: String,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSetting {
    pub name: String,
    /// Seconds.
    #[serde(default = "default_transition_secs")]
    pub duration: f64,
}

/// A subtitle line; times in seconds, position normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSetting {
    pub text: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_subtitle_secs")]
    pub duration: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "center")]
    pub position_x: f64,
    #[serde(default = "lower_third")]
    pub position_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylePreset {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionSetting>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtitles: Vec<SubtitleSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_adjustments: Option<ColorAdjustment>,
    #[serde(default)]
    pub smart_dedup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup_config: Option<DedupDefaults>,
}

impl StylePreset {
    pub fn from_json_str(content: &str) -> DraftResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_string(&self) -> DraftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetReport {
    pub filter_material: Option<String>,
    pub transitions: usize,
    pub subtitles: usize,
    pub color_adjusted: usize,
    pub dedup: Option<DedupReport>,
}

/// Apply every part of a preset. Work happens on a copy that replaces
/// `doc` only when all steps succeed.
pub fn apply_preset<R: Rng>(doc: &mut Document, preset: &StylePreset, rng: R) -> DraftResult<PresetReport> {
    let mut work = doc.clone();
    let mut report = PresetReport::default();

    if let Some(filter) = &preset.filter {
        let applied = add_filter(&mut work, &filter.name, filter.intensity, FilterTarget::AllVideo)?;
        report.filter_material = Some(applied.material_id);
    }

    if let Some(transition) = &preset.transition {
        let applied = add_transition(&mut work, &transition.name, Some(transition.duration), None)?;
        report.transitions = applied.segments.len();
    }

    for subtitle in &preset.subtitles {
        let spec = TextSpec {
            content: subtitle.text.clone(),
            start: secs_to_micros(subtitle.start_time),
            duration: secs_to_micros(subtitle.duration),
            font_size: subtitle.font_size,
            font_color: subtitle.font_color.clone(),
            position: (subtitle.position_x, subtitle.position_y),
        };
        add_text(&mut work, spec)?;
        report.subtitles += 1;
    }

    if let Some(adjustment) = preset.color_adjustments.filter(|a| !a.is_empty()) {
        let ids: Vec<String> = work
            .tracks_of(TrackKind::Video)
            .flat_map(|t| t.segments.iter().map(|s| s.id.clone()))
            .collect();
        for id in &ids {
            adjust_color(&mut work, id, adjustment)?;
        }
        report.color_adjusted = ids.len();
    }

    if preset.smart_dedup {
        let config = preset
            .dedup_config
            .as_ref()
            .map(DedupConfig::from)
            .unwrap_or_default();
        report.dedup = Some(Deduplicator::new(rng, config).run(&mut work)?);
    }

    *doc = work;
    tracing::info!(preset = %preset.name, "applied style preset");
    Ok(report)
}

/// Derive a preset from what a draft already uses: its first catalog filter
/// and transition, and the lines on its text tracks.
pub fn preset_from_document(doc: &Document, name: &str) -> StylePreset {
    let filter = doc.materials.bucket(MaterialKind::Filter).iter().find_map(|m| {
        let effect_id = m.effect_id.as_deref()?;
        let preset = FILTERS.iter().find(|f| f.effect_id == effect_id)?;
        Some(FilterSetting {
            name: preset.name.to_string(),
            intensity: m.intensity.unwrap_or_else(default_intensity),
        })
    });

    let transition = doc.materials.bucket(MaterialKind::Transition).iter().find_map(|m| {
        let effect_id = m.effect_id.as_deref()?;
        let preset = TRANSITIONS.iter().find(|t| t.effect_id == effect_id)?;
        let duration = doc
            .tracks
            .iter()
            .flat_map(|t| &t.segments)
            .filter_map(|s| s.transition.as_ref())
            .find(|t| t.material_id == m.id)
            .map(|t| t.duration)
            .unwrap_or(preset.default_duration);
        Some(TransitionSetting {
            name: preset.name.to_string(),
            duration: micros_to_secs(duration),
        })
    });

    let subtitles = doc
        .tracks_of(TrackKind::Text)
        .flat_map(|t| &t.segments)
        .filter_map(|segment| {
            let material = doc.materials.find(&segment.material_id)?;
            let (x, y) = segment
                .clip
                .as_ref()
                .map(|c| ((c.transform.x + 1.0) / 2.0, (1.0 - c.transform.y) / 2.0))
                .unwrap_or((center(), lower_third()));
            Some(SubtitleSetting {
                text: material.content.clone()?,
                start_time: micros_to_secs(segment.target_timerange.start),
                duration: micros_to_secs(segment.target_timerange.duration),
                font_size: material.font_size.unwrap_or_else(default_font_size),
                font_color: material.font_color.clone().unwrap_or_else(default_font_color),
                position_x: x,
                position_y: y,
            })
        })
        .collect();

    StylePreset {
        name: name.to_string(),
        version: default_version(),
        description: format!("Derived from draft styling: {name}"),
        filter,
        transition,
        subtitles,
        color_adjustments: None,
        smart_dedup: false,
        dedup_config: None,
    }
}

/// Check that every catalog name in the preset exists.
pub fn validate_preset(preset: &StylePreset) -> DraftResult<()> {
    if let Some(filter) = &preset.filter {
        require_filter(&filter.name)?;
    }
    if let Some(transition) = &preset.transition {
        require_transition(&transition.name)?;
        if !(transition.duration > 0.0) {
            return Err(DraftError::invalid("transition duration must be positive"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::split;
    use crate::timeline::tests::one_clip_doc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PRESET: &str = r##"{
        "name": "vlog",
        "filter": {"name": "warm", "intensity": 0.6},
        "transition": {"name": "dissolve", "duration": 0.8},
        "subtitles": [{"text": "Day one", "start_time": 0.5, "font_color": "#FFCC00"}],
        "color_adjustments": {"brightness": 0.1},
        "smart_dedup": false
    }"##;

    #[test]
    fn test_apply_runs_every_step() {
        let mut doc = one_clip_doc();
        split(&mut doc, "seg1", 2_000_000).unwrap();
        let preset = StylePreset::from_json_str(PRESET).unwrap();
        assert!(validate_preset(&preset).is_ok());

        let report = apply_preset(&mut doc, &preset, StdRng::seed_from_u64(0)).unwrap();
        assert!(report.filter_material.is_some());
        assert_eq!(report.transitions, 1);
        assert_eq!(report.subtitles, 1);
        assert_eq!(report.color_adjusted, 2);
        assert!(report.dedup.is_none());

        let text = doc.tracks_of(TrackKind::Text).next().unwrap();
        assert_eq!(text.segments[0].target_timerange.start, 500_000);
        assert_eq!(text.segments[0].target_timerange.duration, 3_000_000);
    }

    #[test]
    fn test_failed_step_leaves_document_untouched() {
        let mut doc = one_clip_doc();
        let before = doc.clone();
        let mut preset = StylePreset::from_json_str(PRESET).unwrap();
        preset.subtitles[0].font_color = "yellow".into();

        assert!(apply_preset(&mut doc, &preset, StdRng::seed_from_u64(0)).is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_round_trip_through_document() {
        let mut doc = one_clip_doc();
        split(&mut doc, "seg1", 2_000_000).unwrap();
        let preset = StylePreset::from_json_str(PRESET).unwrap();
        apply_preset(&mut doc, &preset, StdRng::seed_from_u64(0)).unwrap();

        let derived = preset_from_document(&doc, "copy");
        assert_eq!(derived.filter, preset.filter);
        assert_eq!(derived.transition, preset.transition);
        assert_eq!(derived.subtitles.len(), 1);
        let line = &derived.subtitles[0];
        assert_eq!(line.text, "Day one");
        assert_eq!(line.font_color, "#FFCC00");
        assert!((line.position_y - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_names_fail_validation() {
        let mut preset = StylePreset::from_json_str(PRESET).unwrap();
        preset.filter = Some(FilterSetting {
            name: "chrome".into(),
            intensity: 1.0,
        });
        assert!(validate_preset(&preset).unwrap_err().is_not_found());
    }
}
