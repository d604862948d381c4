//! Projects command.

use clap::{Args, Subcommand};
use folio_core::Config;
use folio_core::model::{NewProject, Project, ProjectPatch, Table};
use owo_colors::OwoColorize;
use tracing::instrument;

use super::{AdminArgs, Remote};

const SAVE_FAILED: &str = "An error occurred while saving the project";

/// Arguments for the `projects` subcommand.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Action to run.
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

/// Project actions.
#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects, newest first
    List {
        /// Only current-focus projects.
        #[arg(long)]
        focus: bool,
    },

    /// Create a project
    Add {
        /// Title.
        #[arg(long)]
        title: String,

        /// Short description.
        #[arg(long, default_value = "")]
        description: String,

        /// Icon glyph or name.
        #[arg(long, default_value = "")]
        icon: String,

        /// Category label.
        #[arg(long, default_value = "")]
        category: String,

        /// Mark as a current focus.
        #[arg(long)]
        focus: bool,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Update fields of a project
    Edit {
        /// Project id.
        id: String,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        /// New description.
        #[arg(long)]
        description: Option<String>,

        /// New icon.
        #[arg(long)]
        icon: Option<String>,

        /// New category.
        #[arg(long)]
        category: Option<String>,

        /// New current-focus flag.
        #[arg(long)]
        focus: Option<bool>,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Delete a project
    Delete {
        /// Project id.
        id: String,

        #[command(flatten)]
        admin: AdminArgs,
    },
}

/// Run a projects action against the configured backend.
#[instrument(name = "cmd_projects", skip_all)]
pub async fn cmd_projects(
    args: ProjectsArgs,
    global_json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut remote = Remote::connect(config)?;

    match args.command {
        ProjectsCommand::List { focus } => {
            remote.load(Table::Projects).await?;
            let projects = if focus {
                remote.store.current_focus().await
            } else {
                remote.store.projects().await
            };
            print_list(&projects, global_json)?;
        }
        ProjectsCommand::Add {
            title,
            description,
            icon,
            category,
            focus,
            admin,
        } => {
            remote.login(&admin)?;
            let project = NewProject {
                title,
                description,
                icon,
                category,
                is_current_focus: focus,
            };
            let result = remote.store.add_project(&project).await;
            remote.report(result, "Project created successfully", SAVE_FAILED)?;
            println!("added {}", project.title);
        }
        ProjectsCommand::Edit {
            id,
            title,
            description,
            icon,
            category,
            focus,
            admin,
        } => {
            remote.login(&admin)?;
            let patch = ProjectPatch {
                title,
                description,
                icon,
                category,
                is_current_focus: focus,
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to change");
            }
            let result = remote.store.update_project(&id, &patch).await;
            remote.report(result, "Project updated successfully", SAVE_FAILED)?;
            println!("updated {id}");
        }
        ProjectsCommand::Delete { id, admin } => {
            remote.login(&admin)?;
            let result = remote.store.delete_project(&id).await;
            remote.report(result, "Project deleted successfully", "Failed to delete project")?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn print_list(projects: &[Project], global_json: bool) -> anyhow::Result<()> {
    if global_json {
        println!("{}", serde_json::to_string_pretty(projects)?);
        return Ok(());
    }
    if projects.is_empty() {
        println!("{}", "no projects".dimmed());
    }
    for project in projects {
        let marker = if project.is_current_focus { "★" } else { " " };
        println!(
            "{} {} {}  {}  {}",
            marker.yellow(),
            project.icon,
            project.title.bold(),
            project.category.cyan(),
            format!("({})", project.id).dimmed()
        );
        if !project.description.is_empty() {
            println!("    {}", project.description);
        }
    }
    Ok(())
}
