//! Silence removal and highlight listing driven by precomputed ranges.
//!
//! The ranges file is produced by an external audio analysis pass:
//!
//! ```json
//! {
//!   "/media/clip1.mp4": {
//!     "silence": [{ "start": 0, "duration": 800000 }],
//!     "highlights": [{ "start": 4000000, "duration": 2500000 }]
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use draftcut_common::config::AppConfig;
use draftcut_common::{micros_to_secs, secs_to_micros, DraftError, DraftResult, Micros};
use draftcut_draft_model::TimeRange;
use draftcut_editing_core::silence::{
    extract_highlights, remove_silence, AudioAnalyzer, HighlightOptions, SilenceOptions,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct MediaRanges {
    #[serde(default)]
    silence: Vec<TimeRange>,
    #[serde(default)]
    highlights: Vec<TimeRange>,
}

/// Analyzer answering from a ranges file. Ranges shorter than the
/// requested minimum are dropped.
struct RangesFile {
    media: HashMap<String, MediaRanges>,
}

impl RangesFile {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read ranges file {}: {e}", path.display()))?;
        let media = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ranges file: {e}"))?;
        Ok(Self { media })
    }

    fn lookup(&self, path: &Path) -> DraftResult<&MediaRanges> {
        self.media
            .get(path.to_string_lossy().as_ref())
            .ok_or_else(|| DraftError::not_found(format!("no ranges for {}", path.display())))
    }
}

impl AudioAnalyzer for RangesFile {
    fn detect_silence(&self, path: &Path, _threshold_db: f64, min_silence: Micros) -> DraftResult<Vec<TimeRange>> {
        Ok(self
            .lookup(path)?
            .silence
            .iter()
            .filter(|r| r.duration >= min_silence)
            .copied()
            .collect())
    }

    fn detect_highlights(&self, path: &Path, _percentile: f64, min_duration: Micros) -> DraftResult<Vec<TimeRange>> {
        Ok(self
            .lookup(path)?
            .highlights
            .iter()
            .filter(|r| r.duration >= min_duration)
            .copied()
            .collect())
    }
}

pub fn run(
    config: &AppConfig,
    draft: &str,
    ranges: &Path,
    threshold_db: f64,
    min_silence: f64,
    highlights: bool,
) -> anyhow::Result<()> {
    let mut loaded = super::load_draft(config, draft)?;
    let analyzer = RangesFile::load(ranges)?;

    if highlights {
        let found = extract_highlights(&loaded.document, &analyzer, HighlightOptions::default());
        println!("Highlights: {}", found.len());
        for h in &found {
            println!(
                "  {} ({}): {:.2}s-{:.2}s",
                h.segment_id,
                h.material_id,
                micros_to_secs(h.range.start),
                micros_to_secs(h.range.end())
            );
        }
        return Ok(());
    }

    let options = SilenceOptions {
        threshold_db,
        min_silence: secs_to_micros(min_silence),
    };
    let report = remove_silence(&mut loaded.document, &analyzer, options)
        .map_err(|e| anyhow::anyhow!("Silence removal failed: {e}"))?;

    println!("Silence removed: {:.2}s", micros_to_secs(report.removed));
    println!("  Segments cut: {}", report.segments_cut);
    println!("  Segments dropped: {}", report.segments_dropped);
    for (segment, reason) in &report.skipped {
        println!("  Skipped {segment}: {reason}");
    }

    if report.segments_cut + report.segments_dropped > 0 {
        super::save_draft(config, &loaded)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_file_filters_short_ranges() {
        let analyzer = RangesFile {
            media: serde_json::from_str(
                r#"{"/m/a.mp4": {"silence": [
                    {"start": 0, "duration": 100000},
                    {"start": 1000000, "duration": 900000}
                ]}}"#,
            )
            .unwrap(),
        };
        let found = analyzer
            .detect_silence(Path::new("/m/a.mp4"), -40.0, 500_000)
            .unwrap();
        assert_eq!(found, vec![TimeRange::new(1_000_000, 900_000)]);
        assert!(analyzer
            .detect_highlights(Path::new("/m/a.mp4"), 80.0, 0)
            .unwrap()
            .is_empty());
        assert!(analyzer
            .detect_silence(Path::new("/m/b.mp4"), -40.0, 0)
            .unwrap_err()
            .is_not_found());
    }
}
