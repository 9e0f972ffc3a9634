//! Heatmap command: resolve a time selection and render it

use super::shared::{input_config, load_input_with};
use crate::cli::args::{Args, HeatmapArgs};
use crate::config::HeatmapConfig;
use crate::render::render_heatmap;
use crate::time_range::resolve;
use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

/// Run the heatmap command
pub fn run_heatmap(args: &Args, heatmap_args: &HeatmapArgs) -> Result<()> {
    let selector = heatmap_args.selector().context("Invalid time selection")?;
    let config = input_config(args, &heatmap_args.input).with_heatmap(
        HeatmapConfig::default().with_color_range(heatmap_args.color_min, heatmap_args.color_max),
    );
    config
        .heatmap
        .validate()
        .context("Invalid heatmap configuration")?;

    let dataset = load_input_with(args, &heatmap_args.input, config.clone())?;
    let resolution = resolve(&dataset, &selector, heatmap_args.output_time_zone.as_deref())
        .context("Failed to resolve the time selection")?;
    info!("Selected {}", resolution.label);

    let path = render_heatmap(
        &dataset,
        &resolution,
        &config.heatmap,
        heatmap_args.output_dir.as_deref(),
    )
    .context("Failed to render heatmap")?;

    if !args.quiet {
        println!("{}", resolution.subtitle(&dataset).bold());
        println!("{} {}", "Heatmap saved to".green(), path.display());
    }
    Ok(())
}
