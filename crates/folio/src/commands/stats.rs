//! Stats command: dashboard numbers.

use chrono::Utc;
use clap::Args;
use folio_core::Config;
use folio_core::analytics::summarize;
use folio_core::model::Table;
use owo_colors::OwoColorize;
use tracing::instrument;

use super::Remote;

/// Arguments for the `stats` subcommand.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

/// Print the dashboard summary.
#[instrument(name = "cmd_stats", skip_all)]
pub async fn cmd_stats(_args: StatsArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let mut remote = Remote::connect(config)?;
    remote.load(Table::Posts).await?;
    remote.load(Table::Projects).await?;

    let posts = remote.store.posts().await;
    let projects = remote.store.projects().await;
    let summary = summarize(&posts, &projects, Utc::now());

    if global_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Dashboard".bold().underline());
    println!(
        "{}: {} ({} published, {}%)",
        "Posts".dimmed(),
        summary.total_posts,
        summary.published_posts,
        summary.published_ratio
    );
    println!("{}: {}", "This month".dimmed(), summary.posts_this_month);
    println!("{}: {}", "Total words".dimmed(), summary.total_words);
    println!("{}: {} min", "Avg. read time".dimmed(), summary.avg_read_time);
    println!("{}: {}", "Projects".dimmed(), summary.project_count);
    Ok(())
}
