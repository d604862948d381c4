//! Command implementations.

use std::sync::Arc;

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use folio_core::backend::RestBackend;
use folio_core::model::Table;
use folio_core::notify::{Level, Notification};
use folio_core::{Config, DataStore, Notifier, Session, StoreResult};
use owo_colors::OwoColorize;
use tokio::sync::broadcast;

pub mod archive;
pub mod enhance;
pub mod format;
pub mod generate;
pub mod info;
pub mod posts;
pub mod projects;
pub mod reading_time;
pub mod render;
pub mod route;
pub mod stats;
pub mod upload;

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Admin credentials for commands that change content.
#[derive(Args, Debug, Default, Clone)]
pub struct AdminArgs {
    /// Admin username.
    #[arg(long, env = "FOLIO_ADMIN_USERNAME")]
    pub username: Option<String>,

    /// Admin password.
    #[arg(long, env = "FOLIO_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl AdminArgs {
    /// Log `session` in, failing when credentials are absent or wrong.
    pub fn login(&self, session: &mut Session) -> anyhow::Result<()> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            anyhow::bail!("admin login required: pass --username and --password");
        };
        session.login(username, password)?;
        Ok(())
    }
}

/// Print queued notifications to stderr.
pub fn print_notifications(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(note) = rx.try_recv() {
        match note.level {
            Level::Success => eprintln!("{} {}", "✓".green(), note.message),
            Level::Error => eprintln!("{} {}", "✗".red(), note.message.red()),
            Level::Info => eprintln!("{} {}", "•".dimmed(), note.message),
        }
    }
}

/// Shared context for commands that talk to the backend.
pub struct Remote {
    /// Store over the REST backend.
    pub store: DataStore<RestBackend>,
    /// Session checked before mutations.
    pub session: Session,
    /// Publisher shared by the store and session.
    pub notifier: Notifier,
    /// Toast channel for everything above.
    pub notifications: broadcast::Receiver<Notification>,
}

impl Remote {
    /// Connect to the configured backend. Nothing is fetched yet.
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        let backend = RestBackend::from_config(config).context("backend is not configured")?;
        let notifier = Notifier::new();
        let notifications = notifier.subscribe();
        Ok(Self {
            store: DataStore::new(Arc::new(backend), notifier.clone()),
            session: Session::new(config.admin.clone(), notifier.clone()),
            notifier,
            notifications,
        })
    }

    /// Fetch `table`, failing if the fetch did.
    pub async fn load(&mut self, table: Table) -> anyhow::Result<()> {
        let ok = self.store.refresh(table).await;
        self.flush();
        if !ok {
            anyhow::bail!("could not load {table}");
        }
        Ok(())
    }

    /// Log in with `admin`, printing the outcome.
    pub fn login(&mut self, admin: &AdminArgs) -> anyhow::Result<()> {
        let result = admin.login(&mut self.session);
        self.flush();
        result
    }

    /// Toast the outcome of a mutation and print it before returning.
    pub fn report(
        &mut self,
        result: StoreResult<()>,
        success: &str,
        failure: &str,
    ) -> anyhow::Result<()> {
        match &result {
            Ok(()) => self.notifier.success(success),
            Err(_) => self.notifier.error(failure),
        }
        self.flush();
        Ok(result?)
    }

    /// Print pending notifications.
    pub fn flush(&mut self) {
        print_notifications(&mut self.notifications);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::config::AdminCredentials;
    use std::io::Write;

    #[test]
    fn read_input_file_enforces_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "0123456789").unwrap();
        let path = Utf8Path::from_path(file.path()).unwrap();

        assert_eq!(read_input_file(path, Some(10)).unwrap(), "0123456789");
        assert_eq!(read_input_file(path, None).unwrap(), "0123456789");
        let err = read_input_file(path, Some(5)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
    }

    #[test]
    fn admin_args_require_both_values() {
        let mut session = Session::new(AdminCredentials::default(), Notifier::new());
        let missing = AdminArgs {
            username: Some("admin".into()),
            password: None,
        };
        assert!(missing.login(&mut session).is_err());
        assert!(!session.is_authenticated());

        let good = AdminArgs {
            username: Some("admin".into()),
            password: Some("umutadmin".into()),
        };
        good.login(&mut session).unwrap();
        assert!(session.is_authenticated());
    }

    #[test]
    fn connect_needs_backend_settings() {
        assert!(Remote::connect(&Config::default()).is_err());
    }

    #[test]
    fn report_toasts_failures_before_returning() {
        let mut config = Config::default();
        config.backend.url = Some("http://127.0.0.1:9".into());
        config.backend.api_key = Some("anon".into());
        let mut remote = Remote::connect(&config).unwrap();
        let mut toasts = remote.notifier.subscribe();

        remote.report(Ok(()), "Post deleted successfully", "Failed to delete post").unwrap();
        let failed = Err(folio_core::StoreError::Delete {
            entity: "post",
            source: folio_core::BackendError::NotFound {
                table: "posts",
                id: "p1".into(),
            },
        });
        let err = remote
            .report(failed, "Post deleted successfully", "Failed to delete post")
            .unwrap_err();
        assert!(err.to_string().contains("failed to delete post"));

        let ok = toasts.try_recv().unwrap();
        assert_eq!((ok.level, ok.message.as_str()), (Level::Success, "Post deleted successfully"));
        let failure = toasts.try_recv().unwrap();
        assert_eq!((failure.level, failure.message.as_str()), (Level::Error, "Failed to delete post"));
    }
}
