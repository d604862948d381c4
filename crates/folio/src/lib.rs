//! Library interface for the `folio` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for documentation generation and testing. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations

pub mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                 Log filter (e.g., debug, folio=trace)
    FOLIO_LOG_PATH           Explicit log file path
    FOLIO_LOG_DIR            Log directory
    FOLIO_BACKEND__URL       Backend project URL
    FOLIO_BACKEND__API_KEY   Backend anonymous key
    FOLIO_AI__API_KEY        Chat-completion API key
    FOLIO_ADMIN_USERNAME     Admin username for content changes
    FOLIO_ADMIN_PASSWORD     Admin password for content changes
";
/// Command-line interface definition for folio.
#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio and blog toolkit with AI writing helpers", long_about = None)]
#[command(version, arg_required_else_help = true)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print only the version number (for scripting)
    #[arg(long)]
    pub version_only: bool,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Show package information
    Info(commands::info::InfoArgs),

    /// Estimate reading time of a file
    ReadingTime(commands::reading_time::ReadingTimeArgs),

    /// Render markdown to sanitized HTML
    Render(commands::render::RenderArgs),

    /// Fix grammar, translate, or restyle a file with AI
    Enhance(commands::enhance::EnhanceArgs),

    /// Generate an SEO draft from a title
    Generate(commands::generate::GenerateArgs),

    /// Apply an editor formatting operation to a file
    Format(commands::format::FormatArgs),

    /// Manage blog posts
    Posts(commands::posts::PostsArgs),

    /// Manage portfolio projects
    Projects(commands::projects::ProjectsArgs),

    /// Upload an image and print its markdown
    Upload(commands::upload::UploadArgs),

    /// Show dashboard statistics
    Stats(commands::stats::StatsArgs),

    /// List published posts grouped by year
    Archive(commands::archive::ArchiveArgs),

    /// Resolve a site path through the admin guard
    Route(commands::route::RouteArgs),
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}
