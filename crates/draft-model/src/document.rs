//! The draft document: canvas, tracks, and material registry.

use draftcut_common::{DraftError, DraftResult, Micros};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::material::Materials;
use crate::track::{Segment, Track, TrackKind};

/// Full mutable state of one draft's timeline (`draft_content.json`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Canvas settings, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_config: Option<Value>,

    #[serde(default)]
    pub tracks: Vec<Track>,

    #[serde(default)]
    pub materials: Materials,

    /// Top-level fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Location of a segment inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLocation {
    pub track: usize,
    pub segment: usize,
}

/// A segment whose material reference does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenReference {
    pub track_id: String,
    pub segment_id: String,
    pub material_id: String,
}

impl Document {
    /// Parse document content.
    ///
    /// Content that is not a plain JSON object (newer editor versions
    /// encrypt the file) fails with `Unsupported` before any parsing is
    /// attempted, so callers can tell it apart from a corrupt document.
    pub fn from_json_str(content: &str) -> DraftResult<Self> {
        let trimmed = content.trim_start_matches('\u{feff}').trim_start();
        if !trimmed.starts_with('{') {
            return Err(DraftError::unsupported(
                "draft content is not a plain JSON object (encrypted draft?)",
            ));
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_json_string(&self) -> DraftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }

    pub fn locate(&self, segment_id: &str) -> Option<SegmentLocation> {
        self.tracks.iter().enumerate().find_map(|(ti, track)| {
            track.position(segment_id).map(|si| SegmentLocation {
                track: ti,
                segment: si,
            })
        })
    }

    /// Like [`Document::locate`] but fails with `NotFound`.
    pub fn require(&self, segment_id: &str) -> DraftResult<SegmentLocation> {
        self.locate(segment_id)
            .ok_or_else(|| DraftError::not_found(format!("segment {segment_id}")))
    }

    pub fn segment(&self, segment_id: &str) -> Option<&Segment> {
        let loc = self.locate(segment_id)?;
        Some(&self.tracks[loc.track].segments[loc.segment])
    }

    pub fn segment_mut(&mut self, segment_id: &str) -> DraftResult<&mut Segment> {
        let loc = self.require(segment_id)?;
        Ok(&mut self.tracks[loc.track].segments[loc.segment])
    }

    /// Longest span over all video tracks.
    pub fn video_span(&self) -> Micros {
        self.tracks_of(TrackKind::Video)
            .map(Track::span)
            .max()
            .unwrap_or(0)
    }

    /// Longest span over every track.
    pub fn duration(&self) -> Micros {
        self.tracks.iter().map(Track::span).max().unwrap_or(0)
    }

    pub fn segment_count(&self) -> usize {
        self.tracks.iter().map(|t| t.segments.len()).sum()
    }

    /// Segments whose `material_id` does not resolve in the registry.
    pub fn broken_references(&self) -> Vec<BrokenReference> {
        self.tracks
            .iter()
            .flat_map(|track| {
                track
                    .segments
                    .iter()
                    .filter(|s| !self.materials.contains(&s.material_id))
                    .map(move |s| BrokenReference {
                        track_id: track.id.clone(),
                        segment_id: s.id.clone(),
                        material_id: s.material_id.clone(),
                    })
            })
            .collect()
    }

    /// Check the structural invariants: resolvable references and
    /// non-overlapping, ordered tracks.
    pub fn validate(&self) -> DraftResult<()> {
        if let Some(broken) = self.broken_references().first() {
            return Err(DraftError::invalid(format!(
                "segment {} references unknown material {}",
                broken.segment_id, broken.material_id
            )));
        }
        if let Some(track) = self.tracks.iter().find(|t| !t.is_sequenced()) {
            return Err(DraftError::invalid(format!(
                "track {} has overlapping or unordered segments",
                track.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, MaterialKind};
    use crate::track::TimeRange;

    const DOC: &str = r#"{
        "canvas_config": {"height": 1920, "ratio": "original", "width": 1080},
        "duration": 5000000,
        "tracks": [
            {
                "id": "T1",
                "type": "video",
                "attribute": 0,
                "segments": [
                    {
                        "id": "S1",
                        "material_id": "V1",
                        "source_timerange": {"start": 0, "duration": 5000000},
                        "target_timerange": {"start": 0, "duration": 5000000},
                        "speed": 1.0,
                        "volume": 1.0,
                        "visible": true
                    }
                ]
            }
        ],
        "materials": {
            "videos": [{"id": "V1", "type": "video", "path": "/media/a.mp4", "duration": 8000000, "width": 1080}],
            "audios": [], "texts": [], "stickers": [], "effects": [], "transitions": [], "filters": [],
            "speeds": [{"id": "SP1", "speed": 1.0}]
        },
        "version": 360000
    }"#;

    #[test]
    fn test_load_noop_save_preserves_every_value() {
        let doc = Document::from_json_str(DOC).unwrap();
        let saved: Value = serde_json::from_str(&doc.to_json_string().unwrap()).unwrap();
        let original: Value = serde_json::from_str(DOC).unwrap();
        assert_eq!(saved, original);
    }

    #[test]
    fn test_encrypted_content_is_unsupported_not_a_parse_error() {
        let err = Document::from_json_str("Q2lwaGVyVGV4dA==...").unwrap_err();
        assert!(matches!(err, DraftError::Unsupported { .. }));

        let err = Document::from_json_str("{ broken").unwrap_err();
        assert!(matches!(err, DraftError::Json(_)));
    }

    #[test]
    fn test_locate_and_span() {
        let doc = Document::from_json_str(DOC).unwrap();
        let loc = doc.locate("S1").unwrap();
        assert_eq!(loc, SegmentLocation { track: 0, segment: 0 });
        assert_eq!(doc.video_span(), 5_000_000);
        assert!(doc.require("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_validate_reports_broken_references() {
        let mut doc = Document::from_json_str(DOC).unwrap();
        assert!(doc.validate().is_ok());

        doc.tracks[0].segments.push(crate::track::Segment::new(
            "GHOST",
            Some(TimeRange::new(0, 1)),
            TimeRange::new(6_000_000, 1),
        ));
        let broken = doc.broken_references();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].material_id, "GHOST");
        assert!(doc.validate().is_err());

        doc.materials
            .register(MaterialKind::Video, Material {
                id: "GHOST".into(),
                ..Material::media(MaterialKind::Video, "/media/b.mp4", None)
            })
            .unwrap();
        assert!(doc.validate().is_ok());
    }
}
