//! Deduplication randomizer.
//!
//! Applies small random perturbations to every video segment so that
//! otherwise identical drafts render differently. All randomness comes from
//! an injected [`Rng`], so a seeded generator reproduces a run exactly.
//!
//! Per segment the draws happen in a fixed order: speed factor, mirror
//! coin, crop factor, each only when its switch is on.

use draftcut_common::{DedupDefaults, DraftResult};
use draftcut_draft_model::{Document, TrackKind, Vec2};
use rand::Rng;

use crate::catalog::random_filter;
use crate::effects::{add_filter, FilterTarget};
use crate::timeline::resync_track;

pub const SPEED_JITTER: (f64, f64) = (0.95, 1.05);
pub const CROP_ZOOM: (f64, f64) = (1.02, 1.05);
pub const FILTER_INTENSITY: (f64, f64) = (0.5, 1.0);
pub const MIRROR_PROBABILITY: f64 = 0.5;

/// Which perturbations to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupConfig {
    pub speed: bool,
    pub mirror: bool,
    pub crop: bool,
    pub filter: bool,
    /// Recompute target durations after the speed jitter. Off by default:
    /// the jitter changes `speed` only, and target durations keep their
    /// previous length.
    pub resync_duration: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            speed: true,
            mirror: true,
            crop: true,
            filter: true,
            resync_duration: false,
        }
    }
}

impl From<&DedupDefaults> for DedupConfig {
    fn from(defaults: &DedupDefaults) -> Self {
        Self {
            speed: defaults.speed,
            mirror: defaults.mirror,
            crop: defaults.crop,
            filter: defaults.filter,
            resync_duration: defaults.resync_duration,
        }
    }
}

/// What a run changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupReport {
    pub segments: usize,
    pub mirrored: usize,
    /// Catalog name of the filter attached to all video segments.
    pub filter: Option<&'static str>,
}

/// Randomized perturbation service over an injected RNG.
pub struct Deduplicator<R: Rng> {
    rng: R,
    config: DedupConfig,
}

impl<R: Rng> Deduplicator<R> {
    pub fn new(rng: R, config: DedupConfig) -> Self {
        Self { rng, config }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Perturb every segment of every video track.
    pub fn run(&mut self, doc: &mut Document) -> DraftResult<DedupReport> {
        let config = self.config;
        let mut report = DedupReport::default();

        for track in doc.tracks.iter_mut().filter(|t| t.kind == TrackKind::Video) {
            for segment in &mut track.segments {
                if config.speed {
                    let factor = self.rng.gen_range(SPEED_JITTER.0..=SPEED_JITTER.1);
                    segment.speed = Some(segment.speed() * factor);
                }
                if config.mirror && self.rng.gen_bool(MIRROR_PROBABILITY) {
                    segment.clip_mut().flip.horizontal = true;
                    report.mirrored += 1;
                }
                if config.crop {
                    let factor = self.rng.gen_range(CROP_ZOOM.0..=CROP_ZOOM.1);
                    let clip = segment.clip_mut();
                    clip.scale = Vec2::new(clip.scale.x * factor, clip.scale.y * factor);
                }
                tracing::debug!(segment_id = %segment.id, speed = segment.speed(), "perturbed segment");
                report.segments += 1;
            }
            if config.speed && config.resync_duration {
                resync_track(track);
            }
        }

        if config.filter && report.segments > 0 {
            if let Some(preset) = random_filter(&mut self.rng, None) {
                let intensity = self.rng.gen_range(FILTER_INTENSITY.0..=FILTER_INTENSITY.1);
                add_filter(doc, preset.name, intensity, FilterTarget::AllVideo)?;
                report.filter = Some(preset.name);
            }
        }

        tracing::info!(
            segments = report.segments,
            mirrored = report.mirrored,
            filter = report.filter.unwrap_or("none"),
            "deduplicated draft"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::split;
    use crate::timeline::tests::one_clip_doc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn only(speed: bool, mirror: bool, crop: bool, filter: bool) -> DedupConfig {
        DedupConfig {
            speed,
            mirror,
            crop,
            filter,
            resync_duration: false,
        }
    }

    fn four_clip_doc() -> Document {
        let mut doc = one_clip_doc();
        for _ in 0..3 {
            let last = doc.tracks[0].segments.last().unwrap().id.clone();
            split(&mut doc, &last, 500_000).unwrap();
        }
        doc
    }

    #[test]
    fn test_speed_stays_within_bounds() {
        let mut doc = four_clip_doc();
        let mut dedup = Deduplicator::new(StdRng::seed_from_u64(1), only(true, false, false, false));
        dedup.run(&mut doc).unwrap();
        for seg in &doc.tracks[0].segments {
            let speed = seg.speed.unwrap();
            assert!((0.95..=1.05).contains(&speed), "{speed}");
        }
    }

    #[test]
    fn test_speed_jitter_keeps_target_duration_by_default() {
        let mut doc = four_clip_doc();
        let before: Vec<_> = doc.tracks[0].segments.iter().map(|s| s.target_timerange).collect();

        Deduplicator::new(StdRng::seed_from_u64(2), only(true, false, false, false))
            .run(&mut doc)
            .unwrap();

        let after: Vec<_> = doc.tracks[0].segments.iter().map(|s| s.target_timerange).collect();
        assert_eq!(before, after);
        assert!(doc.tracks[0].segments.iter().any(|s| !s.is_time_consistent()));
    }

    #[test]
    fn test_resync_duration_restores_time_invariant() {
        let mut doc = four_clip_doc();
        let config = DedupConfig {
            resync_duration: true,
            ..only(true, false, false, false)
        };
        Deduplicator::new(StdRng::seed_from_u64(2), config).run(&mut doc).unwrap();
        assert!(doc.tracks[0].segments.iter().all(|s| s.is_time_consistent()));
        assert!(doc.tracks[0].is_sequenced());
    }

    #[test]
    fn test_mirror_matches_replayed_draws() {
        let seed = 42;
        let mut doc = four_clip_doc();
        Deduplicator::new(StdRng::seed_from_u64(seed), only(false, true, false, false))
            .run(&mut doc)
            .unwrap();

        let mut replay = StdRng::seed_from_u64(seed);
        for seg in &doc.tracks[0].segments {
            let expected = replay.gen_bool(MIRROR_PROBABILITY);
            let flipped = seg.clip.as_ref().is_some_and(|c| c.flip.horizontal);
            assert_eq!(flipped, expected);
        }
    }

    #[test]
    fn test_crop_compounds_scale() {
        let mut doc = one_clip_doc();
        let mut dedup = Deduplicator::new(StdRng::seed_from_u64(3), only(false, false, true, false));
        dedup.run(&mut doc).unwrap();
        let first = doc.tracks[0].segments[0].clip.as_ref().unwrap().scale.x;
        assert!((1.02..=1.05).contains(&first));

        dedup.run(&mut doc).unwrap();
        let second = doc.tracks[0].segments[0].clip.as_ref().unwrap().scale.x;
        assert!(second > first * 1.019);
    }

    #[test]
    fn test_filter_is_attached_to_every_video_segment() {
        let mut doc = four_clip_doc();
        let report = Deduplicator::new(StdRng::seed_from_u64(9), only(false, false, false, true))
            .run(&mut doc)
            .unwrap();
        assert!(report.filter.is_some());
        assert_eq!(doc.materials.filters.len(), 1);
        let intensity = doc.materials.filters[0].intensity.unwrap();
        assert!((0.5..=1.0).contains(&intensity));
        let id = &doc.materials.filters[0].id;
        assert!(doc.tracks[0].segments.iter().all(|s| s.has_extra_ref(id)));
    }

    #[test]
    fn test_no_video_means_no_filter() {
        let mut doc = Document::default();
        let report = Deduplicator::new(StdRng::seed_from_u64(0), DedupConfig::default())
            .run(&mut doc)
            .unwrap();
        assert_eq!(report, DedupReport::default());
        assert!(doc.materials.is_empty());
    }
}
