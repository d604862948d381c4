//! Format command: toolbar operations on a file.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use folio_core::editor::{EditableBlock, Format, Range};
use serde::Serialize;
use tracing::{debug, instrument};

use super::read_input_file;

/// Arguments for the `format` subcommand.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Markdown file to edit.
    pub file: Utf8PathBuf,

    /// Formatting to wrap the selection in.
    #[arg(long, value_enum, requires = "start", conflicts_with = "image")]
    pub format: Option<Format>,

    /// Selection start, in characters.
    #[arg(long)]
    pub start: Option<usize>,

    /// Selection end, in characters (defaults to start).
    #[arg(long)]
    pub end: Option<usize>,

    /// Insert an image with this URL instead of formatting.
    #[arg(long, value_name = "URL", requires = "at")]
    pub image: Option<String>,

    /// Character offset for the image.
    #[arg(long)]
    pub at: Option<usize>,

    /// Write the result back to the file instead of printing it.
    #[arg(long)]
    pub write: bool,
}

#[derive(Serialize)]
struct FormatOutput<'a> {
    text: &'a str,
    cursor: usize,
}

/// Apply one editor operation to a file.
#[instrument(name = "cmd_format", skip_all, fields(file = %args.file))]
pub fn cmd_format(
    args: FormatArgs,
    global_json: bool,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    let content = read_input_file(&args.file, max_input_bytes)?;
    let mut block = EditableBlock::new(content);

    let cursor = match (args.format, args.image) {
        (Some(format), None) => {
            let start = args.start.unwrap_or_default();
            let range = Range::new(start, args.end.unwrap_or(start));
            debug!(%format, ?range, "applying format");
            block.apply_format(format, range)
        }
        (None, Some(url)) => {
            block.set_cursor(args.at.unwrap_or_default());
            block.insert_image(&url)
        }
        _ => anyhow::bail!("pass either --format with --start, or --image with --at"),
    };

    if args.write {
        std::fs::write(args.file.as_std_path(), block.text())
            .with_context(|| format!("failed to write {}", args.file))?;
    }

    if global_json {
        let output = FormatOutput {
            text: block.text(),
            cursor,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !args.write {
        print!("{}", block.text());
    }
    Ok(())
}
