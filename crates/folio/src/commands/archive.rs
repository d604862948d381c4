//! Archive command: published posts by year.

use clap::Args;
use folio_core::Config;
use folio_core::analytics::group_by_year;
use folio_core::model::Table;
use owo_colors::OwoColorize;
use tracing::instrument;

use super::Remote;

/// Arguments for the `archive` subcommand.
#[derive(Args, Debug, Default)]
pub struct ArchiveArgs {}

/// Print the blog archive.
#[instrument(name = "cmd_archive", skip_all)]
pub async fn cmd_archive(
    _args: ArchiveArgs,
    global_json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut remote = Remote::connect(config)?;
    remote.load(Table::Posts).await?;
    let posts = remote.store.posts().await;
    let archive = group_by_year(&posts);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&archive)?);
        return Ok(());
    }

    for year in &archive {
        println!("{}", year.year.to_string().bold());
        for entry in &year.posts {
            println!(
                "  {}  {}  {}",
                entry.post.created_at.format("%b %d").dimmed(),
                entry.post.title,
                format!("{} min", entry.minutes).dimmed()
            );
        }
    }
    Ok(())
}
