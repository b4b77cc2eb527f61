//! Silence removal and highlight extraction.
//!
//! Signal analysis is not done here. An [`AudioAnalyzer`] supplied by the
//! caller reports ranges in material time; this module turns them into
//! timeline edits.

use std::path::Path;

use draftcut_common::{proportional, DraftResult, Micros};
use draftcut_draft_model::{generate_id, Document, MaterialKind, Segment, TimeRange, TrackKind};

use crate::timeline::partition_keyframes;

/// Source of silence and highlight ranges for a media file. Ranges are in
/// microseconds of the file's own timeline.
pub trait AudioAnalyzer {
    fn detect_silence(&self, path: &Path, threshold_db: f64, min_silence: Micros) -> DraftResult<Vec<TimeRange>>;

    fn detect_highlights(&self, path: &Path, percentile: f64, min_duration: Micros) -> DraftResult<Vec<TimeRange>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceOptions {
    pub threshold_db: f64,
    pub min_silence: Micros,
}

impl Default for SilenceOptions {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            min_silence: 500_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightOptions {
    /// Loudness percentile in `[0, 100]` a second must reach.
    pub percentile: f64,
    pub min_duration: Micros,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            percentile: 80.0,
            min_duration: 2_000_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SilenceReport {
    /// Segments that lost at least one silent range.
    pub segments_cut: usize,
    /// Segments that were entirely silent and were dropped.
    pub segments_dropped: usize,
    /// Source microseconds removed.
    pub removed: Micros,
    /// `(segment id, reason)` for segments the analyzer failed on.
    pub skipped: Vec<(String, String)>,
}

/// Cut silent source ranges out of every video segment.
///
/// Each affected segment is replaced by its non-silent pieces, played back
/// to back from the segment's original target start. The first piece keeps
/// the segment id, transition, and keyframes. Later segments do not move,
/// so removed silence leaves a gap on the track.
pub fn remove_silence(
    doc: &mut Document,
    analyzer: &dyn AudioAnalyzer,
    options: SilenceOptions,
) -> DraftResult<SilenceReport> {
    let mut report = SilenceReport::default();
    let materials = &doc.materials;

    for track in doc.tracks.iter_mut().filter(|t| t.kind == TrackKind::Video) {
        let mut rebuilt = Vec::with_capacity(track.segments.len());
        for segment in track.segments.drain(..) {
            let (Some(source), Some(path)) = (segment.source_timerange(), video_path(materials, &segment)) else {
                rebuilt.push(segment);
                continue;
            };

            let silences = match analyzer.detect_silence(Path::new(path), options.threshold_db, options.min_silence) {
                Ok(ranges) => ranges,
                Err(e) => {
                    tracing::warn!(segment_id = %segment.id, error = %e, "silence detection failed");
                    report.skipped.push((segment.id.clone(), e.to_string()));
                    rebuilt.push(segment);
                    continue;
                }
            };

            let pieces = audible_pieces(source, &silences);
            let kept: Micros = pieces.iter().map(|p| p.duration).sum();
            if kept == source.duration {
                rebuilt.push(segment);
                continue;
            }

            report.removed += source.duration - kept;
            let segment_id = segment.id.clone();
            let parts = split_into_pieces(segment, source, &pieces);
            if parts.is_empty() {
                tracing::debug!(%segment_id, "dropped silent segment");
                report.segments_dropped += 1;
                continue;
            }
            report.segments_cut += 1;
            rebuilt.extend(parts);
        }
        track.segments = rebuilt;
    }

    tracing::info!(
        cut = report.segments_cut,
        dropped = report.segments_dropped,
        removed = report.removed,
        "removed silence"
    );
    Ok(report)
}

fn video_path<'a>(materials: &'a draftcut_draft_model::Materials, segment: &Segment) -> Option<&'a str> {
    materials
        .bucket(MaterialKind::Video)
        .iter()
        .find(|m| m.id == segment.material_id)
        .and_then(|m| m.path.as_deref())
}

/// Parts of `source` not covered by any of `silences`.
fn audible_pieces(source: TimeRange, silences: &[TimeRange]) -> Vec<TimeRange> {
    let mut cuts: Vec<(Micros, Micros)> = silences
        .iter()
        .map(|s| (s.start.max(source.start), s.end().min(source.end())))
        .filter(|(a, b)| a < b)
        .collect();
    cuts.sort_unstable();

    let mut pieces = Vec::new();
    let mut cursor = source.start;
    for (a, b) in cuts {
        if a > cursor {
            pieces.push(TimeRange::new(cursor, a - cursor));
        }
        cursor = cursor.max(b);
    }
    if cursor < source.end() {
        pieces.push(TimeRange::new(cursor, source.end() - cursor));
    }
    pieces
}

fn split_into_pieces(segment: Segment, source: TimeRange, pieces: &[TimeRange]) -> Vec<Segment> {
    let target = segment.target_timerange;
    let to_target = |kept: Micros| target.start + proportional(kept, target.duration, source.duration);

    let mut out: Vec<Segment> = Vec::with_capacity(pieces.len());
    let mut kept = 0;
    for piece in pieces {
        let start = to_target(kept);
        kept += piece.duration;
        let end = to_target(kept);
        // Rounding can map a short piece to nothing on the timeline.
        if end == start {
            continue;
        }

        let mut part = segment.clone();
        if out.is_empty() {
            let (left, _) = partition_keyframes(part.keyframes.take(), end - start);
            part.keyframes = left;
        } else {
            part.id = generate_id();
            part.transition = None;
            part.keyframes = None;
        }
        part.set_source_timerange(Some(*piece));
        part.target_timerange = TimeRange::new(start, end - start);
        out.push(part);
    }
    out
}

/// A loud stretch of one segment's material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub segment_id: String,
    pub material_id: String,
    /// Material time.
    pub range: TimeRange,
}

/// List highlight ranges for every video segment with a media path.
/// Segments the analyzer fails on are skipped.
pub fn extract_highlights(
    doc: &Document,
    analyzer: &dyn AudioAnalyzer,
    options: HighlightOptions,
) -> Vec<Highlight> {
    let mut highlights = Vec::new();
    for segment in doc.tracks_of(TrackKind::Video).flat_map(|t| &t.segments) {
        let Some(path) = video_path(&doc.materials, segment) else {
            continue;
        };
        match analyzer.detect_highlights(Path::new(path), options.percentile, options.min_duration) {
            Ok(ranges) => highlights.extend(ranges.into_iter().map(|range| Highlight {
                segment_id: segment.id.clone(),
                material_id: segment.material_id.clone(),
                range,
            })),
            Err(e) => tracing::warn!(segment_id = %segment.id, error = %e, "highlight detection failed"),
        }
    }
    tracing::info!(count = highlights.len(), "extracted highlights");
    highlights
}
