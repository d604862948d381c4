//! Hosted backend access.
//!
//! [`Backend`] is the CRUD + change-feed surface the data store needs. Two
//! implementations ship with the crate:
//!
//! - [`rest::RestBackend`] talks to a PostgREST-style API and listens for
//!   changes over the realtime websocket ([`realtime`]).
//! - [`memory::MemoryBackend`] keeps rows in process, for tests and offline
//!   demos.

pub mod memory;
pub mod realtime;
pub mod rest;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::BackendResult;
use crate::model::{ChangeEvent, NewPost, NewProject, Post, PostPatch, Project, ProjectPatch, Table};

pub use memory::MemoryBackend;
pub use rest::{RestBackend, ServiceClient};

/// A row type stored in one backend table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table holding the rows.
    const TABLE: Table;
    /// Insert payload.
    type New: Serialize + Send + Sync;
    /// Partial update payload.
    type Patch: Serialize + Send + Sync;

    /// Row identifier.
    fn id(&self) -> &str;

    /// Creation time, used for newest-first ordering.
    fn created_at(&self) -> DateTime<Utc>;
}

impl Record for Post {
    const TABLE: Table = Table::Posts;
    type New = NewPost;
    type Patch = PostPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Project {
    const TABLE: Table = Table::Projects;
    type New = NewProject;
    type Patch = ProjectPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Generic CRUD and change notifications over the backend tables.
pub trait Backend: Send + Sync + 'static {
    /// Every row of `R`'s table, newest first.
    fn fetch_all<R: Record>(&self) -> impl Future<Output = BackendResult<Vec<R>>> + Send;

    /// Insert one row.
    fn insert<R: Record>(&self, row: &R::New) -> impl Future<Output = BackendResult<()>> + Send;

    /// Apply a partial update to the row with `id`.
    fn update<R: Record>(
        &self,
        id: &str,
        patch: &R::Patch,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    /// Delete the row with `id`.
    fn delete<R: Record>(&self, id: &str) -> impl Future<Output = BackendResult<()>> + Send;

    /// Start receiving change events for `table`.
    fn subscribe(&self, table: Table) -> ChangeFeed;
}

/// Stream of change events for one table.
///
/// Dropping the feed stops any background connection behind it.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: mpsc::Receiver<ChangeEvent>,
    task: Option<JoinHandle<()>>,
}

impl ChangeFeed {
    /// Capacity of the event channel behind a feed.
    pub const CAPACITY: usize = 256;

    /// Feed backed by a channel only.
    pub const fn new(rx: mpsc::Receiver<ChangeEvent>) -> Self {
        Self { rx, task: None }
    }

    /// Feed backed by a channel and the task producing into it.
    pub const fn with_task(rx: mpsc::Receiver<ChangeEvent>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Next event, or `None` once the producer is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
