//! Reading-time command.

use camino::Utf8PathBuf;
use clap::Args;
use folio_core::reading_time::ReadingTimeReport;
use tracing::{debug, instrument};

use super::read_input_file;

/// Arguments for the `reading-time` subcommand.
#[derive(Args, Debug)]
pub struct ReadingTimeArgs {
    /// File to measure.
    pub file: Utf8PathBuf,
}

/// Print word count and reading time of a file.
#[instrument(name = "cmd_reading_time", skip_all, fields(file = %args.file))]
pub fn cmd_reading_time(
    args: ReadingTimeArgs,
    global_json: bool,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    let content = read_input_file(&args.file, max_input_bytes)?;
    let report = ReadingTimeReport::measure(&content);
    debug!(words = report.words, minutes = report.minutes, "measured");

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} min read ({} words)", report.minutes, report.words);
    }
    Ok(())
}
