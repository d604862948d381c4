//! Route command: resolve a path as a visitor would see it.

use clap::Args;
use folio_core::routes::{Route, guard};
use folio_core::{Config, Notifier, Session};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::instrument;

use super::{AdminArgs, print_notifications};

/// Arguments for the `route` subcommand.
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Site path, e.g. `/admin/blog/edit/42`.
    pub path: String,

    #[command(flatten)]
    pub admin: AdminArgs,
}

#[derive(Serialize)]
struct Resolution {
    requested: String,
    shown: String,
    requires_auth: bool,
    authenticated: bool,
}

/// Resolve a path through the admin guard.
///
/// Logs in first when credentials are given; a failed login still resolves
/// the path as a logged-out visitor.
#[instrument(name = "cmd_route", skip_all, fields(path = %args.path))]
pub fn cmd_route(args: RouteArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let route = Route::parse(&args.path)
        .ok_or_else(|| anyhow::anyhow!("unknown route: {}", args.path))?;

    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();
    let mut session = Session::new(config.admin.clone(), notifier);
    if args.admin.username.is_some() || args.admin.password.is_some() {
        // Rejected logins are reported as a notification.
        let _ = args.admin.login(&mut session);
        print_notifications(&mut rx);
    }

    let requires_auth = route.requires_auth();
    let shown = guard(route.clone(), &session);
    let resolution = Resolution {
        requested: route.path(),
        shown: shown.path(),
        requires_auth,
        authenticated: session.is_authenticated(),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else if shown == route {
        println!("{}", resolution.shown);
    } else {
        println!(
            "{} {} {}",
            resolution.requested.dimmed(),
            "→".yellow(),
            resolution.shown
        );
    }
    Ok(())
}
