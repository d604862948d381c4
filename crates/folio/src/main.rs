//! folio CLI
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use folio::{Cli, Commands, commands};
use folio_core::config::ConfigLoader;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    if cli.version_only {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // arg_required_else_help ensures we have --version-only or a subcommand
    let Some(command) = cli.command else {
        return Ok(());
    };

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = camino::Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;
    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        let config_path = camino::Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let (config, config_sources) = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::from_env_with_overrides(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    );
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging/tracing")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        "CLI initialized"
    );

    let max_input = if config.disable_input_limit {
        None
    } else {
        config
            .max_input_bytes
            .or(Some(folio_core::DEFAULT_MAX_INPUT_BYTES))
    };

    let result = match command {
        Commands::Info(args) => commands::info::cmd_info(args, cli.json, &config, &config_sources),
        Commands::ReadingTime(args) => {
            commands::reading_time::cmd_reading_time(args, cli.json, max_input)
        }
        Commands::Render(args) => commands::render::cmd_render(args, cli.json, max_input),
        Commands::Format(args) => commands::format::cmd_format(args, cli.json, max_input),
        Commands::Route(args) => commands::route::cmd_route(args, cli.json, &config),
        Commands::Enhance(args) => block_on(commands::enhance::cmd_enhance(
            args, cli.json, &config, max_input,
        )),
        Commands::Generate(args) => {
            block_on(commands::generate::cmd_generate(args, cli.json, &config))
        }
        Commands::Posts(args) => block_on(commands::posts::cmd_posts(
            args, cli.json, &config, max_input,
        )),
        Commands::Projects(args) => {
            block_on(commands::projects::cmd_projects(args, cli.json, &config))
        }
        Commands::Upload(args) => block_on(commands::upload::cmd_upload(args, cli.json, &config)),
        Commands::Stats(args) => block_on(commands::stats::cmd_stats(args, cli.json, &config)),
        Commands::Archive(args) => {
            block_on(commands::archive::cmd_archive(args, cli.json, &config))
        }
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}

/// Run an async command on a fresh multi-threaded runtime.
fn block_on<F>(future: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
    rt.block_on(future)
}
