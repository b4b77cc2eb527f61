//! Tracks, segments, and the microsecond time ranges that place them.
//!
//! A segment carries two ranges: `source_timerange` is the slice of the
//! underlying material it plays, `target_timerange` is where that slice
//! lands on the timeline. Within a track, segments are kept sorted by
//! target start and never overlap.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use draftcut_common::{scaled_duration, DraftError, DraftResult, Micros};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::generate_id;
use crate::keyframe::Keyframe;

/// A `[start, start + duration)` span in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Micros,
    pub duration: Micros,
}

impl TimeRange {
    pub fn new(start: Micros, duration: Micros) -> Self {
        Self { start, duration }
    }

    /// Exclusive end of the range.
    pub fn end(&self) -> Micros {
        self.start.saturating_add(self.duration)
    }

    /// Whether two ranges share any instant. Touching ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    pub fn contains(&self, t: Micros) -> bool {
        t >= self.start && t < self.end()
    }
}

/// Channel type of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Effect,
    Filter,
    Sticker,
}

impl TrackKind {
    pub const ALL: [TrackKind; 6] = [
        TrackKind::Video,
        TrackKind::Audio,
        TrackKind::Text,
        TrackKind::Effect,
        TrackKind::Filter,
        TrackKind::Sticker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Text => "text",
            TrackKind::Effect => "effect",
            TrackKind::Filter => "filter",
            TrackKind::Sticker => "sticker",
        }
    }

    /// Tracks whose segments carry a playback volume.
    pub fn has_audio(&self) -> bool {
        matches!(self, TrackKind::Video | TrackKind::Audio)
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackKind {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DraftError::invalid(format!("unknown track type '{s}'")))
    }
}

/// Horizontal/vertical mirroring of a visual segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flip {
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub vertical: bool,
}

/// A 2D pair used for scale and position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Render transform of a segment.
///
/// `transform` is in canvas space: `(0, 0)` is the center, `x` grows to
/// the right and `y` grows upward, both spanning `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    #[serde(default = "one")]
    pub alpha: f64,
    #[serde(default)]
    pub flip: Flip,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    #[serde(default = "zero_offset")]
    pub transform: Vec2,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Clip {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            flip: Flip::default(),
            rotation: 0.0,
            scale: Vec2::ONE,
            transform: Vec2::ZERO,
            extra: Map::new(),
        }
    }
}

impl Clip {
    /// Clip placed at a normalized screen position, where `(0, 0)` is the
    /// top-left corner and `(1, 1)` the bottom-right.
    pub fn at_normalized(x: f64, y: f64) -> Self {
        Self {
            transform: Vec2::new(2.0 * x.clamp(0.0, 1.0) - 1.0, 1.0 - 2.0 * y.clamp(0.0, 1.0)),
            ..Self::default()
        }
    }
}

fn one() -> f64 {
    1.0
}

fn unit_scale() -> Vec2 {
    Vec2::ONE
}

fn zero_offset() -> Vec2 {
    Vec2::ZERO
}

/// Transition attached to a segment, played on the cut from the previous
/// segment into this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTransition {
    /// Transition material in the registry.
    pub material_id: String,
    /// Transition length in microseconds.
    pub duration: Micros,
}

/// One placement of a material on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,

    /// Registry id of the material this segment plays.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub material_id: String,

    /// Slice of the material used. The outer `Option` is key presence:
    /// `Some(None)` is an explicit `null` (literal content such as text),
    /// `None` a document that never had the key.
    #[serde(
        rename = "source_timerange",
        default,
        skip_serializing_if = "Option::is_none",
        with = "present_or_null"
    )]
    source: Option<Option<TimeRange>>,

    /// Placement on the timeline.
    pub target_timerange: TimeRange,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<Clip>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<SegmentTransition>,

    /// Filter/effect materials applied on top of the main material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_material_refs: Option<Vec<String>>,

    /// Animation curves keyed by property name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<BTreeMap<String, Vec<Keyframe>>>,

    /// Fields this engine does not interpret, kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Segment {
    /// A segment with a fresh id playing `source` at `target`.
    pub fn new(material_id: impl Into<String>, source: Option<TimeRange>, target: TimeRange) -> Self {
        Self {
            id: generate_id(),
            material_id: material_id.into(),
            source: Some(source),
            target_timerange: target,
            speed: None,
            volume: None,
            clip: None,
            transition: None,
            extra_material_refs: None,
            keyframes: None,
            extra: Map::new(),
        }
    }

    /// Slice of the material played, `None` for literal content.
    pub fn source_timerange(&self) -> Option<TimeRange> {
        self.source.flatten()
    }

    /// Replace the source slice. `None` is written as an explicit `null`.
    pub fn set_source_timerange(&mut self, range: Option<TimeRange>) {
        self.source = Some(range);
    }

    /// Playback speed multiplier (1.0 when absent).
    pub fn speed(&self) -> f64 {
        self.speed.unwrap_or(1.0)
    }

    /// Playback volume (1.0 when absent).
    pub fn volume(&self) -> f64 {
        self.volume.unwrap_or(1.0)
    }

    pub fn clip_mut(&mut self) -> &mut Clip {
        self.clip.get_or_insert_with(Clip::default)
    }

    pub fn extra_refs(&self) -> &[String] {
        self.extra_material_refs.as_deref().unwrap_or(&[])
    }

    pub fn has_extra_ref(&self, material_id: &str) -> bool {
        self.extra_refs().iter().any(|r| r == material_id)
    }

    /// Add a reference unless already present. Returns whether it was added.
    pub fn add_extra_ref(&mut self, material_id: &str) -> bool {
        if self.has_extra_ref(material_id) {
            return false;
        }
        self.extra_material_refs
            .get_or_insert_with(Vec::new)
            .push(material_id.to_string());
        true
    }

    /// Remove a reference. Returns whether it was present.
    pub fn remove_extra_ref(&mut self, material_id: &str) -> bool {
        match self.extra_material_refs.as_mut() {
            Some(refs) => {
                let before = refs.len();
                refs.retain(|r| r != material_id);
                refs.len() != before
            }
            None => false,
        }
    }

    /// Target duration the segment should have according to
    /// `source / speed`, if it has a source range.
    pub fn expected_target_duration(&self) -> Option<Micros> {
        self.source_timerange()
            .map(|src| scaled_duration(src.duration, self.speed()))
    }

    /// Whether the target duration matches the source slice at the current
    /// speed, allowing one microsecond of rounding slack.
    pub fn is_time_consistent(&self) -> bool {
        match self.expected_target_duration() {
            Some(expected) => expected.abs_diff(self.target_timerange.duration) <= 1,
            None => true,
        }
    }

    pub fn keyframes_for(&self, property: &str) -> &[Keyframe] {
        self.keyframes
            .as_ref()
            .and_then(|map| map.get(property))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

mod present_or_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::TimeRange;

    pub fn serialize<S: Serializer>(value: &Option<Option<TimeRange>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<TimeRange>>, D::Error> {
        Option::<TimeRange>::deserialize(deserializer).map(Some)
    }
}

/// A typed channel holding an ordered sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: TrackKind,

    #[serde(default)]
    pub segments: Vec<Segment>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    /// An empty track with a fresh id.
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: generate_id(),
            kind,
            segments: vec![],
            extra: Map::new(),
        }
    }

    /// End of the last-ending segment, in microseconds.
    pub fn span(&self) -> Micros {
        self.segments
            .iter()
            .map(|s| s.target_timerange.end())
            .max()
            .unwrap_or(0)
    }

    pub fn position(&self, segment_id: &str) -> Option<usize> {
        self.segments.iter().position(|s| s.id == segment_id)
    }

    pub fn segment(&self, segment_id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == segment_id)
    }

    pub fn segment_mut(&mut self, segment_id: &str) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == segment_id)
    }

    /// Whether segments are sorted by target start and pairwise disjoint.
    pub fn is_sequenced(&self) -> bool {
        self.segments.windows(2).all(|pair| {
            pair[0].target_timerange.start <= pair[1].target_timerange.start
                && pair[0].target_timerange.end() <= pair[1].target_timerange.start
        })
    }

    /// Index at which `range` can be inserted without overlapping any
    /// existing segment, or `None` if it collides.
    pub fn slot_for(&self, range: &TimeRange) -> Option<usize> {
        if self
            .segments
            .iter()
            .any(|s| s.target_timerange.overlaps(range))
        {
            return None;
        }
        Some(
            self.segments
                .iter()
                .take_while(|s| s.target_timerange.start <= range.start)
                .count(),
        )
    }

    /// Insert a segment keeping target order; rejects overlaps.
    pub fn insert_sorted(&mut self, segment: Segment) -> DraftResult<usize> {
        let index = self.slot_for(&segment.target_timerange).ok_or_else(|| {
            DraftError::invalid(format!(
                "segment at {}..{} overlaps existing segments on track {}",
                segment.target_timerange.start,
                segment.target_timerange.end(),
                self.id
            ))
        })?;
        self.segments.insert(index, segment);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: Micros, duration: Micros) -> Segment {
        Segment::new(
            "M",
            Some(TimeRange::new(0, duration)),
            TimeRange::new(start, duration),
        )
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        let a = TimeRange::new(0, 1_000_000);
        let b = TimeRange::new(1_000_000, 500_000);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&TimeRange::new(999_999, 10)));
    }

    #[test]
    fn test_insert_sorted_keeps_order_and_rejects_overlap() {
        let mut track = Track::new(TrackKind::Audio);
        track.insert_sorted(seg(2_000_000, 1_000_000)).unwrap();
        let idx = track.insert_sorted(seg(0, 1_000_000)).unwrap();
        assert_eq!(idx, 0);
        assert!(track.is_sequenced());
        assert_eq!(track.span(), 3_000_000);

        let err = track.insert_sorted(seg(500_000, 1_000_000)).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(track.segments.len(), 2);
    }

    #[test]
    fn test_track_kind_parses_and_serializes_lowercase() {
        assert_eq!("sticker".parse::<TrackKind>().unwrap(), TrackKind::Sticker);
        assert!("subtitle".parse::<TrackKind>().is_err());
        assert_eq!(serde_json::to_string(&TrackKind::Video).unwrap(), "\"video\"");
    }

    #[test]
    fn test_normalized_position_maps_to_canvas_space() {
        let clip = Clip::at_normalized(0.5, 0.9);
        assert!(clip.transform.x.abs() < 1e-12);
        assert!((clip.transform.y + 0.8).abs() < 1e-12);

        let corner = Clip::at_normalized(0.0, 0.0);
        assert_eq!(corner.transform, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_extra_refs_are_deduplicated() {
        let mut s = seg(0, 1);
        assert!(s.add_extra_ref("F1"));
        assert!(!s.add_extra_ref("F1"));
        assert_eq!(s.extra_refs(), ["F1".to_string()]);
        assert!(s.remove_extra_ref("F1"));
        assert!(!s.remove_extra_ref("F1"));
    }

    #[test]
    fn test_time_consistency_uses_speed() {
        let mut s = seg(0, 4_000_000);
        assert!(s.is_time_consistent());
        s.speed = Some(2.0);
        assert!(!s.is_time_consistent());
        s.target_timerange.duration = 2_000_000;
        assert!(s.is_time_consistent());
    }

    #[test]
    fn test_segment_preserves_unknown_fields() {
        let json = r#"{
            "id": "S1",
            "material_id": "M1",
            "source_timerange": {"start": 0, "duration": 10},
            "target_timerange": {"start": 0, "duration": 10},
            "render_index": 11000,
            "hdr_settings": {"intensity": 1.0, "mode": 1, "nits": 1000}
        }"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.extra["render_index"], 11000);
        assert_eq!(seg.speed(), 1.0);

        let back = serde_json::to_value(&seg).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_absent_keys_stay_absent_and_null_stays_null() {
        let bare = r#"{"id": "S1", "target_timerange": {"start": 0, "duration": 10}}"#;
        let seg: Segment = serde_json::from_str(bare).unwrap();
        assert_eq!(seg.source_timerange(), None);
        assert_eq!(serde_json::to_value(&seg).unwrap(), serde_json::from_str::<Value>(bare).unwrap());

        let null = r#"{"id": "S2", "material_id": "T1", "source_timerange": null,
            "target_timerange": {"start": 0, "duration": 10}}"#;
        let seg: Segment = serde_json::from_str(null).unwrap();
        assert_eq!(serde_json::to_value(&seg).unwrap(), serde_json::from_str::<Value>(null).unwrap());

        let created = Segment::new("T1", None, TimeRange::new(0, 10));
        assert!(serde_json::to_value(&created).unwrap()["source_timerange"].is_null());
    }

    proptest::proptest! {
        #[test]
        fn prop_insert_sorted_never_breaks_sequencing(
            ranges in proptest::collection::vec((0u64..50_000_000, 1u64..5_000_000), 0..24)
        ) {
            let mut track = Track::new(TrackKind::Video);
            for (start, duration) in ranges {
                let before = track.segments.len();
                match track.insert_sorted(seg(start, duration)) {
                    Ok(_) => proptest::prop_assert_eq!(track.segments.len(), before + 1),
                    Err(_) => proptest::prop_assert_eq!(track.segments.len(), before),
                }
                proptest::prop_assert!(track.is_sequenced());
            }
        }
    }
}
