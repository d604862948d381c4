//! Generate command: draft an article from a title.

use std::time::Duration;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use folio_core::ai::AiClient;
use folio_core::editor::session::EditorSession;
use folio_core::{Config, ContentLength, Notifier};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::instrument;

use super::print_notifications;

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Article title.
    #[arg(long)]
    pub title: String,

    /// Length level: 1 brief, 2 short, 3 medium, 4 long, 5 detailed.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub length: u8,

    /// Write the draft to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<Utf8PathBuf>,
}

#[derive(Serialize)]
struct Draft<'a> {
    title: &'a str,
    slug: &'a str,
    length: ContentLength,
    target_words: u32,
    content: &'a str,
}

/// Generate a draft with the editor's generate action.
#[instrument(name = "cmd_generate", skip_all, fields(length = args.length))]
pub async fn cmd_generate(
    args: GenerateArgs,
    global_json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();
    let mut editor = EditorSession::new(AiClient::from_config(&config.ai), notifier);
    editor.title = args.title;
    editor.set_length_level(args.length)?;
    editor.suggest_slug();

    let spinner = (!global_json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Generating {}...", editor.length));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });
    let result = editor.generate().await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    print_notifications(&mut rx);
    result?;

    let content = editor.content();
    if let Some(ref path) = args.out {
        std::fs::write(path.as_std_path(), &content)
            .with_context(|| format!("failed to write {path}"))?;
    }

    if global_json {
        let draft = Draft {
            title: &editor.title,
            slug: &editor.slug,
            length: editor.length,
            target_words: editor.length.target_words(),
            content: &content,
        };
        println!("{}", serde_json::to_string_pretty(&draft)?);
    } else if args.out.is_none() {
        println!("{content}");
    }
    Ok(())
}
