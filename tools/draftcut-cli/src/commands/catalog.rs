//! List the built-in filter and transition catalogs.

use draftcut_common::micros_to_secs;
use draftcut_editing_core::catalog::{self, FilterCategory, TransitionCategory};

pub fn filters(category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let category: Option<FilterCategory> = category.map(str::parse).transpose()?;
    let presets: Vec<_> = catalog::filters_in(category).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }
    for preset in presets {
        println!(
            "{:<14} {:<10} {}  {}",
            preset.name,
            preset.category.as_str(),
            preset.label,
            preset.description
        );
    }
    Ok(())
}

pub fn transitions(category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let category: Option<TransitionCategory> = category.map(str::parse).transpose()?;
    let presets: Vec<_> = catalog::transitions_in(category).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }
    for preset in presets {
        println!(
            "{:<14} {:<10} {}  {:.1}s",
            preset.name,
            preset.category.as_str(),
            preset.label,
            micros_to_secs(preset.default_duration)
        );
    }
    Ok(())
}
