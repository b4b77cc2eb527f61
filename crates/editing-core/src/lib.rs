//! draftcut Editing Core
//!
//! Operations that mutate a draft [`Document`](draftcut_draft_model::Document):
//! - **Timeline:** track lookup, segment placement, split, trim, audio insertion
//! - **Effects:** catalog filters and transitions, text, stickers, color adjustment
//! - **Keyframes:** per-property animation curves and composite animations
//! - **Dedup:** randomized speed, mirror, crop, and filter jitter
//! - **Templates and presets:** extraction and application of reusable structure
//!
//! This crate is pure computation. Callers own loading and saving; every
//! operation takes `&mut Document` and validates before it mutates.

pub mod batch;
pub mod catalog;
pub mod dedup;
pub mod effects;
pub mod keyframes;
pub mod preset;
pub mod silence;
pub mod template;
pub mod timeline;

pub use batch::{run_batch, BatchOutcome};
pub use dedup::{DedupConfig, Deduplicator};
pub use effects::FilterTarget;
