//! Enhance command: AI grammar, translation and restyling with a live reveal.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use folio_core::ai::AiClient;
use folio_core::editor::reveal::RevealTarget;
use folio_core::editor::session::{EditorSession, EnhanceAction};
use folio_core::{Config, Notifier, WritingStyle};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, instrument};

use super::{print_notifications, read_input_file};

/// Which transform to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Fix grammar.
    Grammar,
    /// Translate to English.
    Translate,
    /// Rewrite in the `--style` writing style.
    Style,
}

/// Arguments for the `enhance` subcommand.
#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Markdown file to transform.
    pub file: Utf8PathBuf,

    /// Transform to apply.
    #[arg(long, value_enum)]
    pub action: ActionArg,

    /// Writing style for `--action style`.
    #[arg(long, value_enum, default_value_t)]
    pub style: WritingStyle,

    /// Write the result back to the file.
    #[arg(long)]
    pub write: bool,
}

impl EnhanceArgs {
    const fn enhance_action(&self) -> EnhanceAction {
        match self.action {
            ActionArg::Grammar => EnhanceAction::Grammar,
            ActionArg::Translate => EnhanceAction::Translate,
            ActionArg::Style => EnhanceAction::Style(self.style),
        }
    }
}

/// Streams revealed text to stdout, keeping the source's own whitespace.
///
/// Each update carries one more word than the last; the matching slice of
/// the source (word plus the whitespace before it) is printed.
#[derive(Debug, Default)]
struct TerminalReveal {
    source: String,
    word_ends: Vec<usize>,
    printed: usize,
}

impl TerminalReveal {
    /// Byte offset of the source covered by `text`.
    fn covered(&self, text: &str) -> usize {
        if text == self.source {
            return self.source.len();
        }
        let words = text.split_whitespace().count();
        words
            .checked_sub(1)
            .and_then(|i| self.word_ends.get(i).copied())
            .unwrap_or(0)
    }
}

impl RevealTarget for TerminalReveal {
    fn begin(&mut self, text: &str) {
        self.word_ends.clear();
        let mut in_word = false;
        for (i, c) in text.char_indices() {
            if c.is_whitespace() {
                if in_word {
                    self.word_ends.push(i);
                }
                in_word = false;
            } else {
                in_word = true;
            }
        }
        if in_word {
            self.word_ends.push(text.len());
        }
        self.source = text.to_string();
        self.printed = 0;
    }

    fn update(&mut self, text: &str) {
        let end = self.covered(text);
        if end > self.printed {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(self.source[self.printed..end].as_bytes());
            let _ = stdout.flush();
            self.printed = end;
        }
    }
}

#[derive(Serialize)]
struct EnhanceOutput<'a> {
    action: &'a str,
    text: &'a str,
}

/// Run an AI transform on a file.
#[instrument(name = "cmd_enhance", skip_all, fields(file = %args.file, action = ?args.action))]
pub async fn cmd_enhance(
    args: EnhanceArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    let content = read_input_file(&args.file, max_input_bytes)?;
    let action = args.enhance_action();

    let notifier = Notifier::new();
    let mut toasts = notifier.subscribe();
    // JSON output gets the final text in one step.
    let interval = if global_json {
        Duration::ZERO
    } else {
        config.reveal_interval()
    };
    let mut editor = EditorSession::new(AiClient::from_config(&config.ai), notifier)
        .with_reveal_interval(interval);
    if !global_json {
        editor = editor.with_reveal_echo(TerminalReveal::default());
    }
    editor.set_content(content);

    let spinner = (!global_json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Processing...");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });
    let result = editor.enhance(action).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    if let Err(e) = result {
        print_notifications(&mut toasts);
        return Err(e.into());
    }

    let completed = editor.wait_for_reveal().await;
    if !global_json {
        println!();
    }
    print_notifications(&mut toasts);
    if !completed {
        anyhow::bail!("reveal stopped before the result was written");
    }

    let text = editor.content();
    debug!(len = text.len(), "transform complete");

    if global_json {
        let output = EnhanceOutput {
            action: match args.action {
                ActionArg::Grammar => "grammar",
                ActionArg::Translate => "translate",
                ActionArg::Style => args.style.id(),
            },
            text: &text,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if args.write {
        std::fs::write(args.file.as_std_path(), &text)
            .with_context(|| format!("failed to write {}", args.file))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_ends_track_source_offsets() {
        let mut target = TerminalReveal::default();
        target.begin("one  two\nthree ");
        assert_eq!(target.word_ends, vec![3, 8, 14]);
        assert_eq!(target.covered("one two"), 8);
        assert_eq!(target.covered("one  two\nthree "), 15);
        assert_eq!(target.covered(""), 0);
    }

    #[test]
    fn style_action_uses_style_flag() {
        let args = EnhanceArgs {
            file: Utf8PathBuf::from("x.md"),
            action: ActionArg::Style,
            style: WritingStyle::Seo,
            write: false,
        };
        assert_eq!(
            args.enhance_action(),
            EnhanceAction::Style(WritingStyle::Seo)
        );
    }
}
