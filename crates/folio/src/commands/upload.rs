//! Upload command: push an image to the bucket and print its markdown.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use folio_core::backend::ServiceClient;
use folio_core::editor::image_markdown;
use folio_core::storage::ImageStore;
use folio_core::{Config, Notifier, Session};
use serde::Serialize;
use tracing::instrument;

use super::{AdminArgs, print_notifications};

/// Arguments for the `upload` subcommand.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Image file (jpeg, png, gif or webp).
    pub file: Utf8PathBuf,

    #[command(flatten)]
    pub admin: AdminArgs,
}

#[derive(Serialize)]
struct Uploaded<'a> {
    url: &'a str,
    markdown: &'a str,
}

/// Upload an image, creating the bucket on first use.
#[instrument(name = "cmd_upload", skip_all, fields(file = %args.file))]
pub async fn cmd_upload(args: UploadArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();
    let mut session = Session::new(config.admin.clone(), notifier);
    let login = args.admin.login(&mut session);
    print_notifications(&mut rx);
    login?;

    let service = ServiceClient::from_config(config).context("backend is not configured")?;
    let images = ImageStore::new(service, config.storage.clone());
    images
        .ensure_bucket()
        .await
        .context("failed to prepare image bucket")?;
    let url = images
        .upload_file(&args.file)
        .await
        .with_context(|| format!("failed to upload {}", args.file))?;

    let markdown = image_markdown(&url);
    if global_json {
        let out = Uploaded {
            url: &url,
            markdown: &markdown,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{markdown}");
    }
    Ok(())
}
