//! draftcut Draft Model
//!
//! Defines the data contracts for editor drafts:
//! - **Document:** canvas, tracks, and the material registry of one draft
//! - **Tracks:** typed channels of segments placed in microsecond time
//! - **Materials:** typed registry buckets referenced by segments
//! - **Keyframes:** per-property animation curves on a segment
//! - **Templates:** reusable timeline structure with material placeholders
//!
//! Fields this crate does not interpret are carried in per-object `extra`
//! maps so that a load followed by a save keeps them.

pub mod document;
pub mod keyframe;
pub mod material;
pub mod store;
pub mod template;
pub mod track;

pub use document::*;
pub use keyframe::*;
pub use material::*;
pub use store::*;
pub use template::*;
pub use track::*;

/// Fresh identifier in the editor's format: an uppercase hyphenated UUID v4.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string().to_uppercase()
}
