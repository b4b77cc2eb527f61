//! Timeline arithmetic: track lookup, placement, split, trim, and
//! track-wide speed and volume.
//!
//! All times are microseconds. Within a track, segments stay sorted by
//! target start and never overlap; every operation here either keeps that
//! true or fails before mutating.

use std::collections::BTreeMap;

use draftcut_common::{proportional, DraftError, DraftResult, Micros, MICROS_PER_SEC};
use draftcut_draft_model::{
    generate_id, Document, Keyframe, Material, MaterialKind, Segment, TimeRange, Track, TrackKind,
};

/// Length given to inserted audio when the draft has no video to align to.
pub const DEFAULT_AUDIO_DURATION: Micros = 10 * MICROS_PER_SEC;

/// Where an inserted segment ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub track_id: String,
    pub segment_id: String,
    pub material_id: String,
}

/// First track of `kind` in append order, or a newly appended empty one.
pub fn add_track_if_absent(doc: &mut Document, kind: TrackKind) -> &mut Track {
    let index = match doc.tracks.iter().position(|t| t.kind == kind) {
        Some(index) => index,
        None => {
            let track = Track::new(kind);
            tracing::debug!(track_id = %track.id, %kind, "created track");
            doc.tracks.push(track);
            doc.tracks.len() - 1
        }
    };
    &mut doc.tracks[index]
}

/// End of the last-ending segment on the track.
pub fn track_span(track: &Track) -> Micros {
    track.span()
}

pub fn find_segment<'a>(doc: &'a Document, segment_id: &str) -> DraftResult<&'a Segment> {
    doc.segment(segment_id)
        .ok_or_else(|| DraftError::not_found(format!("segment {segment_id}")))
}

pub fn find_segment_mut<'a>(doc: &'a mut Document, segment_id: &str) -> DraftResult<&'a mut Segment> {
    doc.segment_mut(segment_id)
}

/// Insert `segment` into the first track of `kind` where it fits without
/// overlapping, appending a new track of that kind when none does.
///
/// Returns the id of the track that received the segment.
pub fn place_segment(doc: &mut Document, kind: TrackKind, segment: Segment) -> DraftResult<String> {
    if segment.target_timerange.duration == 0 {
        return Err(DraftError::invalid("segment duration must be positive"));
    }

    let fitting = doc
        .tracks
        .iter()
        .position(|t| t.kind == kind && t.slot_for(&segment.target_timerange).is_some());

    let track = match fitting {
        Some(index) => &mut doc.tracks[index],
        None => {
            let has_kind = doc.tracks.iter().any(|t| t.kind == kind);
            if has_kind {
                tracing::debug!(%kind, "no free slot on existing tracks, appending a new one");
            }
            doc.tracks.push(Track::new(kind));
            let last = doc.tracks.len() - 1;
            &mut doc.tracks[last]
        }
    };
    track.insert_sorted(segment)?;
    Ok(track.id.clone())
}

/// Split a segment in two at `offset` microseconds into its target range.
///
/// The source range is partitioned at the proportional source offset. The
/// right half gets a fresh id and lands right after the left one; it takes
/// the keyframes at or after `offset`, shifted to its own start. An attached
/// transition stays on the left half.
pub fn split(doc: &mut Document, segment_id: &str, offset: Micros) -> DraftResult<(String, String)> {
    let loc = doc.require(segment_id)?;
    let track = &mut doc.tracks[loc.track];
    let left = &mut track.segments[loc.segment];

    let target = left.target_timerange;
    if offset == 0 || offset >= target.duration {
        return Err(DraftError::invalid(format!(
            "split offset {offset} must be inside (0, {})",
            target.duration
        )));
    }

    let mut right = left.clone();
    right.id = generate_id();
    right.transition = None;
    right.target_timerange = TimeRange::new(target.start + offset, target.duration - offset);
    left.target_timerange.duration = offset;

    if let Some(source) = left.source_timerange() {
        let source_offset = proportional(offset, source.duration, target.duration);
        left.set_source_timerange(Some(TimeRange::new(source.start, source_offset)));
        right.set_source_timerange(Some(TimeRange::new(
            source.start + source_offset,
            source.duration - source_offset,
        )));
    }

    let (kept, moved) = partition_keyframes(left.keyframes.take(), offset);
    left.keyframes = kept;
    right.keyframes = moved;

    let ids = (left.id.clone(), right.id.clone());
    track.segments.insert(loc.segment + 1, right);

    tracing::info!(left = %ids.0, right = %ids.1, offset, "split segment");
    Ok(ids)
}

type KeyframeMap = Option<BTreeMap<String, Vec<Keyframe>>>;

pub(crate) fn partition_keyframes(keyframes: KeyframeMap, offset: Micros) -> (KeyframeMap, KeyframeMap) {
    let Some(map) = keyframes else {
        return (None, None);
    };

    let mut left = BTreeMap::new();
    let mut right = BTreeMap::new();
    for (property, frames) in map {
        let (before, after): (Vec<_>, Vec<_>) = frames.into_iter().partition(|k| k.time < offset);
        if !before.is_empty() {
            left.insert(property.clone(), before);
        }
        if !after.is_empty() {
            let shifted = after
                .into_iter()
                .map(|k| Keyframe { time: k.time - offset, ..k })
                .collect();
            right.insert(property, shifted);
        }
    }

    let non_empty = |m: BTreeMap<String, Vec<Keyframe>>| (!m.is_empty()).then_some(m);
    (non_empty(left), non_empty(right))
}

/// Re-slice a segment's source to `[source.start + start, source.start + end)`
/// and set its target duration to `end - start`, keeping the target start.
pub fn trim(doc: &mut Document, segment_id: &str, start: Micros, end: Micros) -> DraftResult<()> {
    if end <= start {
        return Err(DraftError::invalid(format!(
            "trim end {end} must be greater than start {start}"
        )));
    }

    let loc = doc.require(segment_id)?;
    let segment = &doc.tracks[loc.track].segments[loc.segment];
    let source = segment.source_timerange().ok_or_else(|| {
        DraftError::invalid(format!("segment {segment_id} has no source range to trim"))
    })?;

    let new_source = source
        .start
        .checked_add(end)
        .map(|_| TimeRange::new(source.start + start, end - start))
        .ok_or_else(|| {
            DraftError::invalid(format!("trim end {end} is out of range for segment {segment_id}"))
        })?;
    if let Some(material_duration) = doc
        .materials
        .find(&segment.material_id)
        .and_then(|m| m.duration)
    {
        if new_source.end() > material_duration {
            return Err(DraftError::invalid(format!(
                "trim end {} is past the material length {material_duration}",
                new_source.end()
            )));
        }
    }

    let target_start = segment.target_timerange.start;
    if target_start.checked_add(end - start).is_none() {
        return Err(DraftError::invalid(format!(
            "trimmed segment {segment_id} would end past the timeline limit"
        )));
    }
    let new_target = TimeRange::new(target_start, end - start);
    if let Some(next) = doc.tracks[loc.track].segments.get(loc.segment + 1) {
        if new_target.end() > next.target_timerange.start {
            return Err(DraftError::invalid(format!(
                "trimmed segment would overlap segment {}",
                next.id
            )));
        }
    }

    let segment = &mut doc.tracks[loc.track].segments[loc.segment];
    segment.set_source_timerange(Some(new_source));
    segment.target_timerange = new_target;
    tracing::info!(segment_id, start, end, "trimmed segment");
    Ok(())
}

/// Options for [`add_audio`].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOptions {
    pub start: Micros,
    /// Defaults to the longest video track span.
    pub duration: Option<Micros>,
    /// Clamped to `[0, 1]`.
    pub volume: f64,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            start: 0,
            duration: None,
            volume: 1.0,
        }
    }
}

/// Register an audio file and place one segment playing it.
pub fn add_audio(doc: &mut Document, path: &str, options: AudioOptions) -> DraftResult<Placement> {
    let duration = match options.duration {
        Some(d) => d,
        None => match doc.video_span() {
            0 => DEFAULT_AUDIO_DURATION,
            span => span,
        },
    };
    if duration == 0 {
        return Err(DraftError::invalid("audio duration must be positive"));
    }

    let material_id = doc
        .materials
        .register(MaterialKind::Audio, Material::media(MaterialKind::Audio, path, None))?;

    let mut segment = Segment::new(
        material_id.clone(),
        Some(TimeRange::new(0, duration)),
        TimeRange::new(options.start, duration),
    );
    segment.speed = Some(1.0);
    segment.volume = Some(options.volume.clamp(0.0, 1.0));
    let segment_id = segment.id.clone();

    let track_id = place_segment(doc, TrackKind::Audio, segment)?;
    tracing::info!(%path, %track_id, duration, "added audio");
    Ok(Placement {
        track_id,
        segment_id,
        material_id,
    })
}

/// Remove a track and its segments. Materials are left in the registry.
pub fn remove_track(doc: &mut Document, track_id: &str) -> DraftResult<Track> {
    let index = doc
        .tracks
        .iter()
        .position(|t| t.id == track_id)
        .ok_or_else(|| DraftError::not_found(format!("track {track_id}")))?;
    let track = doc.tracks.remove(index);
    tracing::info!(track_id, segments = track.segments.len(), "removed track");
    Ok(track)
}

/// Set the volume of every segment on an audio-bearing track.
pub fn set_track_volume(doc: &mut Document, track_id: &str, volume: f64) -> DraftResult<usize> {
    let track = doc
        .track_mut(track_id)
        .ok_or_else(|| DraftError::not_found(format!("track {track_id}")))?;
    if !track.kind.has_audio() {
        return Err(DraftError::invalid(format!(
            "{} track {track_id} has no volume",
            track.kind
        )));
    }

    let volume = volume.clamp(0.0, 1.0);
    for segment in &mut track.segments {
        segment.volume = Some(volume);
    }
    Ok(track.segments.len())
}

/// Set the speed of every segment on a track, then [`resync_track`].
pub fn set_track_speed(doc: &mut Document, track_id: &str, speed: f64) -> DraftResult<()> {
    if !(speed.is_finite() && speed > 0.0) {
        return Err(DraftError::invalid(format!("speed {speed} must be positive")));
    }
    let track = doc
        .track_mut(track_id)
        .ok_or_else(|| DraftError::not_found(format!("track {track_id}")))?;

    for segment in &mut track.segments {
        segment.speed = Some(speed);
    }
    resync_track(track);

    tracing::info!(track_id, speed, "set track speed");
    Ok(())
}

/// Recompute every target duration as `source / speed` and move later
/// segments so the gaps between segments are preserved. Segments without
/// a source range keep their duration.
pub fn resync_track(track: &mut Track) {
    let mut previous: Option<(Micros, Micros)> = None;
    for segment in &mut track.segments {
        let old = segment.target_timerange;
        let start = match previous {
            Some((old_end, new_end)) => new_end + old.start.saturating_sub(old_end),
            None => old.start,
        };
        let duration = segment.expected_target_duration().unwrap_or(old.duration);

        segment.target_timerange = TimeRange::new(start, duration);
        previous = Some((old.end(), segment.target_timerange.end()));
    }
}

/// Point every segment referencing `old_id` at `new_id`.
pub fn replace_material(doc: &mut Document, old_id: &str, new_id: &str) -> DraftResult<usize> {
    if !doc.materials.contains(new_id) {
        return Err(DraftError::not_found(format!("material {new_id}")));
    }

    let mut replaced = 0;
    for segment in doc.tracks.iter_mut().flat_map(|t| t.segments.iter_mut()) {
        if segment.material_id == old_id {
            segment.material_id = new_id.to_string();
            replaced += 1;
        }
    }
    if replaced == 0 {
        return Err(DraftError::not_found(format!(
            "no segment references material {old_id}"
        )));
    }

    tracing::info!(old_id, new_id, replaced, "replaced material");
    Ok(replaced)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use draftcut_draft_model::{property, Easing, SegmentTransition};

    /// One video track with a 5 s segment `seg1` on material `vid1`.
    pub(crate) fn one_clip_doc() -> Document {
        let mut doc = Document::default();
        doc.materials
            .register(
                MaterialKind::Video,
                Material {
                    id: "vid1".into(),
                    ..Material::media(MaterialKind::Video, "/media/clip.mp4", Some(8_000_000))
                },
            )
            .unwrap();
        let mut seg = Segment::new(
            "vid1",
            Some(TimeRange::new(0, 5_000_000)),
            TimeRange::new(0, 5_000_000),
        );
        seg.id = "seg1".into();
        let mut track = Track::new(TrackKind::Video);
        track.segments.push(seg);
        doc.tracks.push(track);
        doc
    }

    #[test]
    fn test_add_audio_aligns_to_video_span() {
        let mut doc = one_clip_doc();
        let placed = add_audio(&mut doc, "music.mp3", AudioOptions::default()).unwrap();

        let audio: Vec<_> = doc.tracks_of(TrackKind::Audio).collect();
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].id, placed.track_id);
        let seg = &audio[0].segments[0];
        assert_eq!(seg.target_timerange, TimeRange::new(0, 5_000_000));
        assert_eq!(seg.volume, Some(1.0));
        assert_eq!(seg.material_id, placed.material_id);
        assert!(doc.materials.find(&placed.material_id).is_some());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_add_audio_without_video_uses_default_length() {
        let mut doc = Document::default();
        let opts = AudioOptions {
            volume: 3.0,
            ..AudioOptions::default()
        };
        add_audio(&mut doc, "music.mp3", opts).unwrap();
        let seg = &doc.tracks[0].segments[0];
        assert_eq!(seg.target_timerange.duration, DEFAULT_AUDIO_DURATION);
        assert_eq!(seg.volume, Some(1.0));
    }

    #[test]
    fn test_overlapping_audio_goes_to_a_new_track() {
        let mut doc = one_clip_doc();
        add_audio(&mut doc, "a.mp3", AudioOptions::default()).unwrap();
        add_audio(&mut doc, "b.mp3", AudioOptions::default()).unwrap();
        let later = AudioOptions {
            start: 5_000_000,
            duration: Some(1_000_000),
            ..AudioOptions::default()
        };
        add_audio(&mut doc, "c.mp3", later).unwrap();

        let audio: Vec<_> = doc.tracks_of(TrackKind::Audio).collect();
        assert_eq!(audio.len(), 2);
        assert_eq!(audio[0].segments.len(), 2);
        assert_eq!(audio[1].segments.len(), 1);
        assert!(audio.iter().all(|t| t.is_sequenced()));
    }

    #[test]
    fn test_split_five_seconds_at_two() {
        let mut doc = one_clip_doc();
        let (left, right) = split(&mut doc, "seg1", 2_000_000).unwrap();
        assert_eq!(left, "seg1");

        let segs = &doc.tracks[0].segments;
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].id, right);
        assert_eq!(segs[0].target_timerange, TimeRange::new(0, 2_000_000));
        assert_eq!(segs[1].target_timerange, TimeRange::new(2_000_000, 3_000_000));
        assert_eq!(segs[0].source_timerange(), Some(TimeRange::new(0, 2_000_000)));
        assert_eq!(segs[1].source_timerange(), Some(TimeRange::new(2_000_000, 3_000_000)));
        assert!(segs.iter().all(|s| s.material_id == "vid1"));
    }

    #[test]
    fn test_split_rejects_offsets_outside_segment() {
        let mut doc = one_clip_doc();
        for offset in [0, 5_000_000, 9_000_000] {
            assert!(split(&mut doc, "seg1", offset).unwrap_err().is_invalid_argument());
        }
        assert_eq!(doc.tracks[0].segments.len(), 1);
        assert!(split(&mut doc, "ghost", 1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_split_moves_late_keyframes_and_keeps_transition_left() {
        let mut doc = one_clip_doc();
        {
            let seg = doc.segment_mut("seg1").unwrap();
            seg.transition = Some(SegmentTransition {
                material_id: "T".into(),
                duration: 500_000,
            });
            let frames = vec![
                Keyframe::new(0, 0.0, Easing::Linear),
                Keyframe::new(2_000_000, 0.5, Easing::Linear),
                Keyframe::new(4_000_000, 1.0, Easing::Linear),
            ];
            seg.keyframes = Some(BTreeMap::from([(property::OPACITY.to_string(), frames)]));
        }

        split(&mut doc, "seg1", 2_000_000).unwrap();
        let segs = &doc.tracks[0].segments;
        assert!(segs[0].transition.is_some());
        assert!(segs[1].transition.is_none());

        let left: Vec<_> = segs[0].keyframes_for(property::OPACITY).iter().map(|k| k.time).collect();
        let right: Vec<_> = segs[1].keyframes_for(property::OPACITY).iter().map(|k| k.time).collect();
        assert_eq!(left, vec![0]);
        assert_eq!(right, vec![0, 2_000_000]);
    }

    #[test]
    fn test_trim_reslices_source_and_keeps_start() {
        let mut doc = one_clip_doc();
        trim(&mut doc, "seg1", 1_000_000, 3_500_000).unwrap();
        let seg = doc.segment("seg1").unwrap();
        assert_eq!(seg.source_timerange(), Some(TimeRange::new(1_000_000, 2_500_000)));
        assert_eq!(seg.target_timerange, TimeRange::new(0, 2_500_000));
    }

    #[test]
    fn test_trim_rejections_leave_segment_untouched() {
        let mut doc = one_clip_doc();
        let before = doc.clone();

        assert!(trim(&mut doc, "seg1", 2, 2).unwrap_err().is_invalid_argument());
        assert!(trim(&mut doc, "seg1", 3, 1).unwrap_err().is_invalid_argument());
        // material is 8 s long
        assert!(trim(&mut doc, "seg1", 0, 9_000_000).unwrap_err().is_invalid_argument());

        let mut next = Segment::new("vid1", Some(TimeRange::new(0, 1)), TimeRange::new(5_000_000, 1));
        next.id = "seg2".into();
        doc.tracks[0].segments.push(next);
        let with_next = doc.clone();
        assert!(trim(&mut doc, "seg1", 0, 6_000_000).unwrap_err().is_invalid_argument());
        assert_eq!(doc, with_next);

        doc.tracks[0].segments.pop();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_trim_offsets_near_max_are_rejected() {
        let mut doc = one_clip_doc();
        doc.materials.find_mut("vid1").unwrap().duration = None;
        doc.tracks[0].segments[0].set_source_timerange(Some(TimeRange::new(10, 5_000_000)));
        let before = doc.clone();

        assert!(trim(&mut doc, "seg1", u64::MAX - 5, u64::MAX)
            .unwrap_err()
            .is_invalid_argument());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_track_speed_recomputes_and_ripples() {
        let mut doc = one_clip_doc();
        let mut second = Segment::new(
            "vid1",
            Some(TimeRange::new(0, 2_000_000)),
            TimeRange::new(6_000_000, 2_000_000),
        );
        second.id = "seg2".into();
        doc.tracks[0].segments.push(second);
        let track_id = doc.tracks[0].id.clone();

        set_track_speed(&mut doc, &track_id, 2.0).unwrap();
        let segs = &doc.tracks[0].segments;
        assert_eq!(segs[0].target_timerange, TimeRange::new(0, 2_500_000));
        // one second gap preserved
        assert_eq!(segs[1].target_timerange, TimeRange::new(3_500_000, 1_000_000));
        assert!(segs.iter().all(Segment::is_time_consistent));
        assert!(doc.tracks[0].is_sequenced());

        assert!(set_track_speed(&mut doc, &track_id, 0.0).is_err());
    }

    #[test]
    fn test_set_track_volume_requires_audio_bearing_track() {
        let mut doc = one_clip_doc();
        let video_id = doc.tracks[0].id.clone();
        assert_eq!(set_track_volume(&mut doc, &video_id, 0.25).unwrap(), 1);
        assert_eq!(doc.tracks[0].segments[0].volume, Some(0.25));

        let text_id = add_track_if_absent(&mut doc, TrackKind::Text).id.clone();
        assert!(set_track_volume(&mut doc, &text_id, 0.5).is_err());
    }

    #[test]
    fn test_add_track_if_absent_reuses_first_track() {
        let mut doc = one_clip_doc();
        let first = doc.tracks[0].id.clone();
        assert_eq!(add_track_if_absent(&mut doc, TrackKind::Video).id, first);
        assert_eq!(doc.tracks.len(), 1);
        add_track_if_absent(&mut doc, TrackKind::Sticker);
        assert_eq!(doc.tracks.len(), 2);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut doc = one_clip_doc();
        let new_id = doc
            .materials
            .register(MaterialKind::Video, Material::media(MaterialKind::Video, "/b.mp4", None))
            .unwrap();
        assert!(replace_material(&mut doc, "vid1", "missing").unwrap_err().is_not_found());
        assert_eq!(replace_material(&mut doc, "vid1", &new_id).unwrap(), 1);
        assert!(replace_material(&mut doc, "vid1", &new_id).unwrap_err().is_not_found());

        let track_id = doc.tracks[0].id.clone();
        remove_track(&mut doc, &track_id).unwrap();
        assert!(doc.tracks.is_empty());
        assert_eq!(doc.materials.len(), 2);
        assert!(remove_track(&mut doc, &track_id).is_err());
    }
}
