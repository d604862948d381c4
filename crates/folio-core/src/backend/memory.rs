//! In-process backend.
//!
//! Rows are kept as JSON objects, the same shape the REST API returns, so the
//! store sees identical data from either backend. Inserts get a fresh UUID and
//! timestamps. Every mutation publishes a [`ChangeEvent`] to the table's
//! subscribers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{Backend, ChangeFeed, Record};
use crate::error::{BackendError, BackendResult};
use crate::model::{ChangeEvent, ChangeKind, Table};

#[derive(Debug, Default)]
struct Tables {
    posts: Vec<Map<String, Value>>,
    projects: Vec<Map<String, Value>>,
    subscribers: Vec<(Table, mpsc::Sender<ChangeEvent>)>,
}

impl Tables {
    const fn rows(&mut self, table: Table) -> &mut Vec<Map<String, Value>> {
        match table {
            Table::Posts => &mut self.posts,
            Table::Projects => &mut self.projects,
        }
    }

    fn publish(&mut self, table: Table, kind: ChangeKind) {
        self.subscribers.retain(|(_, tx)| !tx.is_closed());
        for (subscribed, tx) in &self.subscribers {
            if *subscribed == table {
                // A full channel already has a refetch pending.
                let _ = tx.try_send(ChangeEvent { table, kind });
            }
        }
    }
}

/// Backend holding rows in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    fail_fetches: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every fetch fail until reset.
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Make every insert, update and delete fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(flag: &AtomicBool) -> BackendResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn to_object<T: serde::Serialize>(value: &T) -> BackendResult<Map<String, Value>> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map),
            other => Err(BackendError::Status {
                status: 400,
                message: format!("expected a JSON object, got {other}"),
            }),
        }
    }

    fn position(rows: &[Map<String, Value>], id: &str) -> Option<usize> {
        rows.iter()
            .position(|row| row.get("id").and_then(Value::as_str) == Some(id))
    }
}

impl Backend for MemoryBackend {
    async fn fetch_all<R: Record>(&self) -> BackendResult<Vec<R>> {
        Self::check(&self.fail_fetches)?;
        let rows = self.lock().rows(R::TABLE).clone();

        let mut records = rows
            .into_iter()
            .rev()
            .map(|row| serde_json::from_value::<R>(Value::Object(row)))
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort keeps later inserts first on equal timestamps.
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        Ok(records)
    }

    async fn insert<R: Record>(&self, row: &R::New) -> BackendResult<()> {
        Self::check(&self.fail_writes)?;
        let mut object = Self::to_object(row)?;
        let now = Value::String(Utc::now().to_rfc3339());
        object.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        object.insert("created_at".into(), now.clone());
        object.insert("updated_at".into(), now);

        let mut tables = self.lock();
        tables.rows(R::TABLE).push(object);
        tables.publish(R::TABLE, ChangeKind::Insert);
        Ok(())
    }

    async fn update<R: Record>(&self, id: &str, patch: &R::Patch) -> BackendResult<()> {
        Self::check(&self.fail_writes)?;
        let changes = Self::to_object(patch)?;

        let mut tables = self.lock();
        let rows = tables.rows(R::TABLE);
        let index = Self::position(rows, id).ok_or_else(|| BackendError::NotFound {
            table: R::TABLE.name(),
            id: id.to_string(),
        })?;
        let row = &mut rows[index];
        row.extend(changes);
        row.insert(
            "updated_at".into(),
            Value::String(Utc::now().to_rfc3339()),
        );
        tables.publish(R::TABLE, ChangeKind::Update);
        Ok(())
    }

    async fn delete<R: Record>(&self, id: &str) -> BackendResult<()> {
        Self::check(&self.fail_writes)?;

        let mut tables = self.lock();
        let rows = tables.rows(R::TABLE);
        let index = Self::position(rows, id).ok_or_else(|| BackendError::NotFound {
            table: R::TABLE.name(),
            id: id.to_string(),
        })?;
        rows.remove(index);
        tables.publish(R::TABLE, ChangeKind::Delete);
        Ok(())
    }

    fn subscribe(&self, table: Table) -> ChangeFeed {
        let (tx, rx) = mpsc::channel(ChangeFeed::CAPACITY);
        self.lock().subscribers.push((table, tx));
        ChangeFeed::new(rx)
    }
}
