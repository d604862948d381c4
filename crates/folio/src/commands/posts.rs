//! Posts command: list, show and manage blog posts.

use camino::Utf8PathBuf;
use clap::{Args, Subcommand};
use folio_core::analytics::search_posts;
use folio_core::markdown::render_safe;
use folio_core::model::{NewPost, Post, PostPatch, Table, slugify};
use folio_core::reading_time::reading_time;
use folio_core::Config;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use super::{AdminArgs, Remote, read_input_file};

const SAVE_FAILED: &str = "An error occurred while saving the post";

/// Arguments for the `posts` subcommand.
#[derive(Args, Debug)]
pub struct PostsArgs {
    /// Action to run.
    #[command(subcommand)]
    pub command: PostsCommand,
}

/// Post actions.
#[derive(Subcommand, Debug)]
pub enum PostsCommand {
    /// List posts, newest first
    List {
        /// Only published posts.
        #[arg(long)]
        published: bool,

        /// Only posts whose title or body contains this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one post by id or slug
    Show {
        /// Post id or slug.
        key: String,

        /// Print sanitized HTML instead of markdown.
        #[arg(long)]
        html: bool,
    },

    /// Create a post from a markdown file
    Add {
        /// Title.
        #[arg(long)]
        title: String,

        /// Markdown body.
        #[arg(long)]
        file: Utf8PathBuf,

        /// Slug (derived from the title when omitted).
        #[arg(long)]
        slug: Option<String>,

        /// Publish immediately.
        #[arg(long)]
        published: bool,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Update fields of a post
    Edit {
        /// Post id.
        id: String,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        /// New markdown body.
        #[arg(long)]
        file: Option<Utf8PathBuf>,

        /// New slug.
        #[arg(long)]
        slug: Option<String>,

        /// New visibility.
        #[arg(long)]
        published: Option<bool>,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Delete a post
    Delete {
        /// Post id.
        id: String,

        #[command(flatten)]
        admin: AdminArgs,
    },
}

/// Run a posts action against the configured backend.
#[instrument(name = "cmd_posts", skip_all)]
pub async fn cmd_posts(
    args: PostsArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    let mut remote = Remote::connect(config)?;

    match args.command {
        PostsCommand::List { published, search } => {
            remote.load(Table::Posts).await?;
            let posts = if published {
                remote.store.published_posts().await
            } else {
                remote.store.posts().await
            };
            let shown: Vec<&Post> = search_posts(&posts, search.as_deref().unwrap_or_default());
            debug!(total = posts.len(), shown = shown.len(), "listing posts");
            print_list(&shown, global_json)
        }
        PostsCommand::Show { key, html } => {
            remote.load(Table::Posts).await?;
            let post = match remote.store.post_by_id(&key).await {
                Some(post) => post,
                None => remote
                    .store
                    .post_by_slug(&key)
                    .await
                    .ok_or_else(|| anyhow::anyhow!("no post with id or slug {key}"))?,
            };
            if global_json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                println!("{}", post.title.bold());
                println!(
                    "{}",
                    format!(
                        "{} · {} min read · {}",
                        post.created_at.format("%Y-%m-%d"),
                        reading_time(&post.content),
                        if post.published { "published" } else { "draft" }
                    )
                    .dimmed()
                );
                println!();
                if html {
                    print!("{}", render_safe(&post.content));
                } else {
                    println!("{}", post.content);
                }
            }
            Ok(())
        }
        PostsCommand::Add {
            title,
            file,
            slug,
            published,
            admin,
        } => {
            remote.login(&admin)?;
            let content = read_input_file(&file, max_input_bytes)?;
            let slug = slug.unwrap_or_else(|| slugify(&title));
            let post = NewPost {
                title,
                content,
                slug,
                published,
            };
            let result = remote.store.add_post(&post).await;
            remote.report(result, "Post created successfully", SAVE_FAILED)
        }
        PostsCommand::Edit {
            id,
            title,
            file,
            slug,
            published,
            admin,
        } => {
            remote.login(&admin)?;
            let content = file
                .map(|path| read_input_file(&path, max_input_bytes))
                .transpose()?;
            let patch = PostPatch {
                title,
                content,
                slug,
                published,
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to change: pass --title, --file, --slug or --published");
            }
            let result = remote.store.update_post(&id, &patch).await;
            remote.report(result, "Post updated successfully", SAVE_FAILED)
        }
        PostsCommand::Delete { id, admin } => {
            remote.login(&admin)?;
            let result = remote.store.delete_post(&id).await;
            remote.report(result, "Post deleted successfully", "Failed to delete post")?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

fn print_list(posts: &[&Post], global_json: bool) -> anyhow::Result<()> {
    if global_json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }
    if posts.is_empty() {
        println!("{}", "no posts".dimmed());
    }
    for post in posts {
        let status = if post.published {
            "published".green().to_string()
        } else {
            "draft".yellow().to_string()
        };
        println!(
            "{}  {}  {}  {} {}",
            post.created_at.format("%Y-%m-%d").dimmed(),
            status,
            post.title.bold(),
            post.slug.cyan(),
            format!("({})", post.id).dimmed()
        );
    }
    Ok(())
}
