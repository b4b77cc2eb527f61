//! Built-in filter and transition catalogs.
//!
//! Each entry maps a stable preset name to the opaque effect identifier the
//! consuming application understands. The tables are static; lookups never
//! allocate.

use std::fmt;
use std::str::FromStr;

use draftcut_common::{DraftError, Micros};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    Basic,
    Film,
    Vintage,
    Portrait,
    Landscape,
    Food,
}

impl FilterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterCategory::Basic => "basic",
            FilterCategory::Film => "film",
            FilterCategory::Vintage => "vintage",
            FilterCategory::Portrait => "portrait",
            FilterCategory::Landscape => "landscape",
            FilterCategory::Food => "food",
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterCategory {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(FilterCategory::Basic),
            "film" => Ok(FilterCategory::Film),
            "vintage" => Ok(FilterCategory::Vintage),
            "portrait" => Ok(FilterCategory::Portrait),
            "landscape" => Ok(FilterCategory::Landscape),
            "food" => Ok(FilterCategory::Food),
            other => Err(DraftError::invalid(format!("unknown filter category '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionCategory {
    Basic,
    Dynamic,
    Creative,
    Glitch,
}

impl TransitionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionCategory::Basic => "basic",
            TransitionCategory::Dynamic => "dynamic",
            TransitionCategory::Creative => "creative",
            TransitionCategory::Glitch => "glitch",
        }
    }
}

impl fmt::Display for TransitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionCategory {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(TransitionCategory::Basic),
            "dynamic" => Ok(TransitionCategory::Dynamic),
            "creative" => Ok(TransitionCategory::Creative),
            "glitch" => Ok(TransitionCategory::Glitch),
            other => Err(DraftError::invalid(format!(
                "unknown transition category '{other}'"
            ))),
        }
    }
}

/// A catalog filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterPreset {
    pub name: &'static str,
    pub effect_id: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    pub category: FilterCategory,
    pub description: &'static str,
}

/// A catalog transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionPreset {
    pub name: &'static str,
    pub effect_id: &'static str,
    pub label: &'static str,
    pub category: TransitionCategory,
    /// Length used when the caller does not give one.
    pub default_duration: Micros,
}

const fn filter(
    name: &'static str,
    effect_id: &'static str,
    label: &'static str,
    category: FilterCategory,
    description: &'static str,
) -> FilterPreset {
    FilterPreset {
        name,
        effect_id,
        label,
        category,
        description,
    }
}

const fn transition(
    name: &'static str,
    effect_id: &'static str,
    label: &'static str,
    category: TransitionCategory,
    default_duration: Micros,
) -> TransitionPreset {
    TransitionPreset {
        name,
        effect_id,
        label,
        category,
        default_duration,
    }
}

use FilterCategory as F;
use TransitionCategory as T;

pub static FILTERS: [FilterPreset; 15] = [
    filter("black_white", "filter_black_white_001", "Black & White", F::Basic, "Classic monochrome"),
    filter("sepia", "filter_sepia_001", "Sepia", F::Basic, "Nostalgic brown tint"),
    filter("warm", "filter_warm_001", "Warm", F::Basic, "Warm color temperature"),
    filter("cool", "filter_cool_001", "Cool", F::Basic, "Cool color temperature"),
    filter("vivid", "filter_vivid_001", "Vivid", F::Basic, "Boosted saturation"),
    filter("soft", "filter_soft_001", "Soft", F::Basic, "Soft haze"),
    filter("film_classic", "filter_film_classic_001", "Classic Film", F::Film, "Film stock look"),
    filter("film_noir", "filter_film_noir_001", "Noir", F::Film, "High-contrast noir"),
    filter("vintage_1980", "filter_vintage_1980_001", "1980s", F::Vintage, "Eighties retro grade"),
    filter("vintage_polaroid", "filter_vintage_polaroid_001", "Polaroid", F::Vintage, "Instant camera look"),
    filter("portrait_natural", "filter_portrait_natural_001", "Natural Portrait", F::Portrait, "Natural skin tones"),
    filter("portrait_beauty", "filter_portrait_beauty_001", "Beauty", F::Portrait, "Smoothed skin"),
    filter("landscape_vibrant", "filter_landscape_vibrant_001", "Vibrant Landscape", F::Landscape, "Richer scenery colors"),
    filter("landscape_sunset", "filter_landscape_sunset_001", "Sunset", F::Landscape, "Golden hour warmth"),
    filter("food_delicious", "filter_food_delicious_001", "Delicious", F::Food, "Appetizing food colors"),
];

pub static TRANSITIONS: [TransitionPreset; 17] = [
    transition("fade", "transition_fade_001", "Fade", T::Basic, 500_000),
    transition("dissolve", "transition_dissolve_001", "Dissolve", T::Basic, 800_000),
    transition("wipe_left", "transition_wipe_left_001", "Wipe Left", T::Basic, 600_000),
    transition("wipe_right", "transition_wipe_right_001", "Wipe Right", T::Basic, 600_000),
    transition("wipe_up", "transition_wipe_up_001", "Wipe Up", T::Basic, 600_000),
    transition("wipe_down", "transition_wipe_down_001", "Wipe Down", T::Basic, 600_000),
    transition("slide_left", "transition_slide_left_001", "Slide Left", T::Dynamic, 500_000),
    transition("slide_right", "transition_slide_right_001", "Slide Right", T::Dynamic, 500_000),
    transition("zoom_in", "transition_zoom_in_001", "Zoom In", T::Dynamic, 700_000),
    transition("zoom_out", "transition_zoom_out_001", "Zoom Out", T::Dynamic, 700_000),
    transition("rotate_clockwise", "transition_rotate_cw_001", "Rotate CW", T::Dynamic, 800_000),
    transition("rotate_counterclockwise", "transition_rotate_ccw_001", "Rotate CCW", T::Dynamic, 800_000),
    transition("blur", "transition_blur_001", "Blur", T::Creative, 600_000),
    transition("flash", "transition_flash_001", "Flash", T::Creative, 300_000),
    transition("circle", "transition_circle_001", "Circle", T::Creative, 700_000),
    transition("glitch", "transition_glitch_001", "Glitch", T::Glitch, 400_000),
    transition("rgb_split", "transition_rgb_split_001", "RGB Split", T::Glitch, 500_000),
];

pub fn filter_by_name(name: &str) -> Option<&'static FilterPreset> {
    FILTERS.iter().find(|f| f.name == name)
}

/// Like [`filter_by_name`] but fails with `NotFound`.
pub fn require_filter(name: &str) -> Result<&'static FilterPreset, DraftError> {
    filter_by_name(name).ok_or_else(|| DraftError::not_found(format!("filter '{name}'")))
}

pub fn filters_in(category: Option<FilterCategory>) -> impl Iterator<Item = &'static FilterPreset> {
    FILTERS
        .iter()
        .filter(move |f| category.map_or(true, |c| f.category == c))
}

pub fn random_filter<R: Rng + ?Sized>(
    rng: &mut R,
    category: Option<FilterCategory>,
) -> Option<&'static FilterPreset> {
    filters_in(category).collect::<Vec<_>>().choose(rng).copied()
}

pub fn transition_by_name(name: &str) -> Option<&'static TransitionPreset> {
    TRANSITIONS.iter().find(|t| t.name == name)
}

pub fn require_transition(name: &str) -> Result<&'static TransitionPreset, DraftError> {
    transition_by_name(name).ok_or_else(|| DraftError::not_found(format!("transition '{name}'")))
}

pub fn transitions_in(
    category: Option<TransitionCategory>,
) -> impl Iterator<Item = &'static TransitionPreset> {
    TRANSITIONS
        .iter()
        .filter(move |t| category.map_or(true, |c| t.category == c))
}

pub fn random_transition<R: Rng + ?Sized>(
    rng: &mut R,
    category: Option<TransitionCategory>,
) -> Option<&'static TransitionPreset> {
    transitions_in(category).collect::<Vec<_>>().choose(rng).copied()
}
