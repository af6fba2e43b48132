//! Batch export of widget outputs.
//!
//! Reads an analytics response and a pipeline configuration, runs the
//! derived-state graph once, and prints the widget output as JSON.
//!
//! # Usage
//!
//! ```bash
//! gfw-widget --payload alerts.json --config gfw-widgets.toml --widget cumulative
//! gfw-widget --payload alerts.json --settings settings.json --today 2021-06-20
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gfw_widgets::config::PipelineConfig;
use gfw_widgets::models::WidgetSettings;
use gfw_widgets::preprocessing::WidgetPipeline;
use gfw_widgets::time::{FixedClock, SystemClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Widget {
    Weekly,
    Cumulative,
}

#[derive(Debug, Parser)]
#[clap(
    name = "gfw-widget",
    about = "Derives weekly alert widget data, sentences and chart configs from an analytics response.",
    version
)]
struct Cli {
    /// Analytics response with `alerts` rows and a `latest` date
    #[clap(short, long)]
    payload: PathBuf,
    /// Pipeline configuration (TOML); searched in the default locations when absent
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Widget settings (JSON)
    #[clap(short, long)]
    settings: Option<PathBuf>,
    #[clap(short, long, value_enum, default_value = "weekly")]
    widget: Widget,
    /// Location name used in sentences
    #[clap(short, long)]
    location: Option<String>,
    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[clap(short, long)]
    today: Option<NaiveDate>,
}

fn init_logging() {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(PipelineConfig::from_default_location().unwrap_or_else(|e| {
            info!("{}; using defaults", e);
            PipelineConfig::default()
        })),
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<WidgetSettings> {
    let Some(path) = path else {
        return Ok(WidgetSettings::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid settings {}", path.display()))
}

fn run<C: gfw_widgets::time::Clock>(cli: &Cli, mut pipeline: WidgetPipeline<C>) -> Result<String> {
    let payload = fs::read_to_string(&cli.payload)
        .with_context(|| format!("Failed to read payload {}", cli.payload.display()))?;
    let settings = load_settings(cli.settings.as_ref())?;

    let mut snapshot = pipeline
        .snapshot_from_json(&payload)
        .context("Failed to parse payload")?
        .with_settings(settings);
    if let Some(location) = &cli.location {
        snapshot = snapshot.with_location(location.clone());
    }

    let json = match cli.widget {
        Widget::Weekly => pipeline
            .weekly_output(&snapshot)
            .map(|out| serde_json::to_string_pretty(out.as_ref()))
            .transpose()?,
        Widget::Cumulative => pipeline
            .cumulative_output(&snapshot)
            .map(|out| serde_json::to_string_pretty(out.as_ref()))
            .transpose()?,
    };

    Ok(json.unwrap_or_else(|| {
        info!("No data for the {:?} widget", cli.widget);
        "null".to_string()
    }))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    info!(
        "Running {:?} widget for dataset {}",
        cli.widget, config.dataset.name
    );

    let output = match cli.today {
        Some(today) => run(&cli, WidgetPipeline::with_clock(config, FixedClock::new(today)))?,
        None => run(&cli, WidgetPipeline::with_clock(config, SystemClock))?,
    };
    println!("{}", output);

    Ok(())
}
