//! Render command: markdown to sanitized HTML.

use camino::Utf8PathBuf;
use clap::Args;
use folio_core::markdown;
use serde::Serialize;
use tracing::instrument;

use super::read_input_file;

/// Arguments for the `render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Markdown file to render.
    pub file: Utf8PathBuf,

    /// Print the heading outline instead of HTML.
    #[arg(long)]
    pub outline: bool,
}

#[derive(Serialize)]
struct Heading {
    level: u8,
    text: String,
}

/// Render a markdown file.
#[instrument(name = "cmd_render", skip_all, fields(file = %args.file))]
pub fn cmd_render(
    args: RenderArgs,
    global_json: bool,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    let content = read_input_file(&args.file, max_input_bytes)?;

    if args.outline {
        let headings: Vec<Heading> = markdown::extract_headings(&content)
            .into_iter()
            .map(|(level, text)| Heading { level, text })
            .collect();
        if global_json {
            println!("{}", serde_json::to_string_pretty(&headings)?);
        } else {
            for heading in headings {
                let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
                println!("{indent}{}", heading.text);
            }
        }
        return Ok(());
    }

    let html = markdown::render_safe(&content);
    if global_json {
        println!("{}", serde_json::json!({ "html": html }));
    } else {
        print!("{html}");
    }
    Ok(())
}
