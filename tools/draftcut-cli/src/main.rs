//! draftcut CLI: command-line editing of video editor drafts.
//!
//! Usage:
//!   draftcut info <DRAFT>                   Show draft contents
//!   draftcut validate <DRAFT>               Check material references and track order
//!   draftcut add-music <DRAFT> <FILE>       Add background music
//!   draftcut dedup <DRAFT>                  Randomize segments to avoid duplicate detection
//!   draftcut split <DRAFT> <SEGMENT> --at   Split a segment
//!   draftcut template extract|apply|batch-apply
//!   draftcut preset apply|extract
//!
//! A `<DRAFT>` is a draft directory path or a draft name under the
//! configured drafts directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use draftcut_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "draftcut",
    about = "Automated editing for video editor drafts",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show draft information
    Info {
        /// Draft directory or name
        draft: String,
    },

    /// Validate a draft's structure
    Validate {
        /// Draft directory or name
        draft: String,
    },

    /// Add background music
    AddMusic {
        draft: String,

        /// Audio file path
        file: String,

        /// Start on the timeline (seconds)
        #[arg(long, default_value = "0.0")]
        start: f64,

        /// Length (seconds); defaults to the video length
        #[arg(long)]
        duration: Option<f64>,

        /// Volume [0.0, 1.0]
        #[arg(long, default_value = "1.0")]
        volume: f64,
    },

    /// Randomize speed, mirroring, crop, and filter of every video segment
    Dedup {
        draft: String,

        #[arg(long)]
        no_speed: bool,

        #[arg(long)]
        no_mirror: bool,

        #[arg(long)]
        no_crop: bool,

        #[arg(long)]
        no_filter: bool,

        /// Recompute segment durations after changing speed
        #[arg(long)]
        resync_duration: bool,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Apply a catalog filter
    AddFilter {
        draft: String,

        /// Catalog filter name (see `draftcut catalog filters`)
        name: String,

        /// Strength [0.0, 1.0]
        #[arg(long, default_value = "0.8")]
        intensity: f64,

        /// Only this segment; defaults to every video segment
        #[arg(long)]
        segment: Option<String>,
    },

    /// Apply a catalog transition between segments
    AddTransition {
        draft: String,

        /// Catalog transition name (see `draftcut catalog transitions`)
        name: String,

        /// Length (seconds); defaults to the catalog value
        #[arg(long)]
        duration: Option<f64>,

        /// Earlier segment of a single cut
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Later segment of a single cut
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Add a text overlay
    AddText {
        draft: String,

        text: String,

        #[arg(long, default_value = "0.0")]
        start: f64,

        #[arg(long, default_value = "3.0")]
        duration: f64,

        #[arg(long, default_value = "48.0")]
        font_size: f64,

        /// #RRGGBB
        #[arg(long, default_value = "#FFFFFF")]
        color: String,

        /// Horizontal position [0.0, 1.0], left to right
        #[arg(long, default_value = "0.5")]
        x: f64,

        /// Vertical position [0.0, 1.0], top to bottom
        #[arg(long, default_value = "0.9")]
        y: f64,
    },

    /// Add a sticker overlay
    AddSticker {
        draft: String,

        /// Image file
        #[arg(long, required_unless_present = "effect_id")]
        path: Option<String>,

        /// Catalog sticker identifier
        #[arg(long)]
        effect_id: Option<String>,

        #[arg(long, default_value = "0.0")]
        start: f64,

        #[arg(long, default_value = "3.0")]
        duration: f64,

        #[arg(long, default_value = "0.5")]
        x: f64,

        #[arg(long, default_value = "0.5")]
        y: f64,

        #[arg(long, default_value = "1.0")]
        scale: f64,
    },

    /// Split a segment in two
    Split {
        draft: String,

        segment: String,

        /// Offset into the segment (seconds)
        #[arg(long)]
        at: f64,
    },

    /// Re-slice a segment's source media
    Trim {
        draft: String,

        segment: String,

        /// New start, relative to the current source start (seconds)
        #[arg(long)]
        start: f64,

        /// New end, relative to the current source start (seconds)
        #[arg(long)]
        end: f64,
    },

    /// Adjust brightness, contrast, or saturation
    AdjustColor {
        draft: String,

        /// Only this segment; defaults to every video segment
        #[arg(long)]
        segment: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        brightness: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        contrast: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        saturation: Option<f64>,
    },

    /// Set or remove a single keyframe
    Keyframe {
        draft: String,

        segment: String,

        /// Property name (position_x, position_y, scale, rotation, opacity, volume)
        property: String,

        /// Time from the segment start (seconds)
        #[arg(long)]
        time: f64,

        #[arg(long, allow_hyphen_values = true, required_unless_present = "remove")]
        value: Option<f64>,

        /// linear | ease_in | ease_out | ease_in_out
        #[arg(long, default_value = "linear")]
        easing: String,

        /// Remove the keyframe at `time` instead of setting one
        #[arg(long)]
        remove: bool,
    },

    /// Add a composite animation
    Animate {
        draft: String,

        segment: String,

        #[arg(value_enum)]
        animation: Animation,

        /// Start from the segment start (seconds); ignored by fades
        #[arg(long, default_value = "0.0")]
        start: f64,

        #[arg(long, default_value = "1.0")]
        duration: f64,

        /// Zoom start scale, or move start position as `x,y`
        #[arg(long, allow_hyphen_values = true)]
        from: Option<String>,

        /// Zoom end scale, or move end position as `x,y`
        #[arg(long, allow_hyphen_values = true)]
        to: Option<String>,

        /// Rotation amount
        #[arg(long, default_value = "360.0", allow_hyphen_values = true)]
        degrees: f64,
    },

    /// Cut silent parts out of video segments
    RemoveSilence {
        draft: String,

        /// Analyzer output: JSON with `silence` and `highlights` range lists per media path
        #[arg(long)]
        ranges: PathBuf,

        #[arg(long, default_value = "-40.0", allow_hyphen_values = true)]
        threshold_db: f64,

        /// Shortest silence to cut (seconds)
        #[arg(long, default_value = "0.5")]
        min_silence: f64,

        /// List highlights instead of cutting silence
        #[arg(long)]
        highlights: bool,
    },

    /// List catalog filters or transitions
    Catalog {
        #[arg(value_enum)]
        kind: CatalogKind,

        #[arg(long)]
        category: Option<String>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract and apply timeline templates
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },

    /// Apply and extract style presets
    Preset {
        #[command(subcommand)]
        action: PresetCommand,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Save a draft's canvas and tracks as a template
    Extract {
        draft: String,

        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Output file; defaults to `<templates_dir>/<name>/template.json`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a draft's tracks with a template's
    Apply {
        draft: String,

        template: PathBuf,

        /// Explicit `TEMPLATE_ID=MATERIAL_ID` pairs
        #[arg(long = "map")]
        mappings: Vec<String>,

        /// Material ids paired with placeholders in order
        #[arg(long = "material")]
        materials: Vec<String>,
    },

    /// Apply one template to many drafts in parallel
    BatchApply {
        template: PathBuf,

        #[arg(required = true)]
        drafts: Vec<String>,

        #[arg(long = "map")]
        mappings: Vec<String>,

        #[arg(long = "material")]
        materials: Vec<String>,

        /// Write results here instead of overwriting the drafts
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the per-draft results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PresetCommand {
    /// Apply a style preset to one or more drafts
    Apply {
        preset: PathBuf,

        #[arg(required = true)]
        drafts: Vec<String>,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// Derive a style preset from a draft
    Extract {
        draft: String,

        name: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Animation {
    FadeIn,
    FadeOut,
    Zoom,
    Rotate,
    Move,
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogKind {
    Filters,
    Transitions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    draftcut_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Info { draft } => commands::info::run(&config, &draft),
        Commands::Validate { draft } => commands::validate::run(&config, &draft),
        Commands::AddMusic {
            draft,
            file,
            start,
            duration,
            volume,
        } => commands::music::run(&config, &draft, &file, start, duration, volume),
        Commands::Dedup {
            draft,
            no_speed,
            no_mirror,
            no_crop,
            no_filter,
            resync_duration,
            seed,
        } => {
            let mut switches = config.dedup.clone();
            switches.speed &= !no_speed;
            switches.mirror &= !no_mirror;
            switches.crop &= !no_crop;
            switches.filter &= !no_filter;
            switches.resync_duration |= resync_duration;
            commands::dedup::run(&config, &draft, &switches, seed)
        }
        Commands::AddFilter {
            draft,
            name,
            intensity,
            segment,
        } => commands::effects::add_filter(&config, &draft, &name, intensity, segment),
        Commands::AddTransition {
            draft,
            name,
            duration,
            from,
            to,
        } => commands::effects::add_transition(&config, &draft, &name, duration, from.zip(to)),
        Commands::AddText {
            draft,
            text,
            start,
            duration,
            font_size,
            color,
            x,
            y,
        } => commands::overlay::add_text(
            &config, &draft, text, start, duration, font_size, color, (x, y),
        ),
        Commands::AddSticker {
            draft,
            path,
            effect_id,
            start,
            duration,
            x,
            y,
            scale,
        } => commands::overlay::add_sticker(
            &config,
            &draft,
            path,
            effect_id,
            start,
            duration,
            (x, y),
            scale,
        ),
        Commands::Split { draft, segment, at } => {
            commands::edit::split(&config, &draft, &segment, at)
        }
        Commands::Trim {
            draft,
            segment,
            start,
            end,
        } => commands::edit::trim(&config, &draft, &segment, start, end),
        Commands::AdjustColor {
            draft,
            segment,
            brightness,
            contrast,
            saturation,
        } => commands::effects::adjust_color(
            &config,
            &draft,
            segment,
            brightness,
            contrast,
            saturation,
        ),
        Commands::Keyframe {
            draft,
            segment,
            property,
            time,
            value,
            easing,
            remove,
        } => commands::animate::keyframe(
            &config, &draft, &segment, &property, time, value, &easing, remove,
        ),
        Commands::Animate {
            draft,
            segment,
            animation,
            start,
            duration,
            from,
            to,
            degrees,
        } => {
            let animation = match animation {
                Animation::FadeIn => commands::animate::Kind::FadeIn,
                Animation::FadeOut => commands::animate::Kind::FadeOut,
                Animation::Zoom => commands::animate::Kind::Zoom,
                Animation::Rotate => commands::animate::Kind::Rotate { degrees },
                Animation::Move => commands::animate::Kind::Move,
            };
            commands::animate::animate(
                &config,
                &draft,
                &segment,
                animation,
                start,
                duration,
                from.as_deref(),
                to.as_deref(),
            )
        }
        Commands::RemoveSilence {
            draft,
            ranges,
            threshold_db,
            min_silence,
            highlights,
        } => commands::silence::run(&config, &draft, &ranges, threshold_db, min_silence, highlights),
        Commands::Catalog {
            kind,
            category,
            json,
        } => match kind {
            CatalogKind::Filters => commands::catalog::filters(category.as_deref(), json),
            CatalogKind::Transitions => commands::catalog::transitions(category.as_deref(), json),
        },
        Commands::Template { action } => match action {
            TemplateCommand::Extract {
                draft,
                name,
                description,
                output,
            } => commands::template::extract(&config, &draft, &name, &description, output),
            TemplateCommand::Apply {
                draft,
                template,
                mappings,
                materials,
            } => commands::template::apply(&config, &draft, &template, &mappings, &materials),
            TemplateCommand::BatchApply {
                template,
                drafts,
                mappings,
                materials,
                output_dir,
                json,
            } => {
                commands::template::batch_apply(
                    &config, &template, drafts, &mappings, &materials, output_dir, json,
                )
                .await
            }
        },
        Commands::Preset { action } => match action {
            PresetCommand::Apply {
                preset,
                drafts,
                output_dir,
                seed,
                json,
            } => commands::preset::apply(&config, &preset, drafts, output_dir, seed, json).await,
            PresetCommand::Extract {
                draft,
                name,
                output,
            } => commands::preset::extract(&config, &draft, &name, output),
        },
    }
}
