//! Cached posts and projects kept in sync with the backend.
//!
//! The store never patches its collections incrementally. Every refresh
//! replaces a whole collection with what the backend returns, so concurrent
//! refreshes (a change event racing a mutation's own refetch) converge on
//! the backend's latest state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::backend::{Backend, Record};
use crate::error::{StoreError, StoreResult};
use crate::model::{NewPost, NewProject, Post, PostPatch, Project, ProjectPatch, Table};
use crate::notify::Notifier;

/// In-memory view of the backend's posts and projects.
#[derive(Debug)]
pub struct DataStore<B> {
    backend: Arc<B>,
    posts: Arc<RwLock<Vec<Post>>>,
    projects: Arc<RwLock<Vec<Project>>>,
    notifier: Notifier,
}

impl<B> Clone for DataStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            posts: Arc::clone(&self.posts),
            projects: Arc::clone(&self.projects),
            notifier: self.notifier.clone(),
        }
    }
}

/// Keeps the store's change listeners alive. Dropping it stops them.
#[derive(Debug)]
pub struct SyncHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SyncHandle {
    /// Stop listening for changes.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl<B: Backend> DataStore<B> {
    /// Empty store over `backend`. Call [`DataStore::refresh_all`] to load it.
    pub fn new(backend: Arc<B>, notifier: Notifier) -> Self {
        Self {
            backend,
            posts: Arc::default(),
            projects: Arc::default(),
            notifier,
        }
    }

    /// Load both collections and refetch whenever the backend reports a change.
    #[tracing::instrument(skip_all)]
    pub async fn start(backend: Arc<B>, notifier: Notifier) -> (Self, SyncHandle) {
        let store = Self::new(backend, notifier);
        store.refresh_all().await;

        let tasks = [Table::Posts, Table::Projects]
            .into_iter()
            .map(|table| {
                let mut feed = store.backend.subscribe(table);
                let listener = store.clone();
                tokio::spawn(async move {
                    while let Some(event) = feed.recv().await {
                        tracing::debug!(table = %event.table, kind = ?event.kind, "refetching after change");
                        listener.refresh(event.table).await;
                    }
                })
            })
            .collect();

        (store, SyncHandle { tasks })
    }

    /// Refetch both collections.
    pub async fn refresh_all(&self) {
        tokio::join!(self.refresh(Table::Posts), self.refresh(Table::Projects));
    }

    /// Refetch one collection. On failure, notify and keep the previous rows.
    ///
    /// Returns whether the fetch succeeded.
    pub async fn refresh(&self, table: Table) -> bool {
        match table {
            Table::Posts => self.reload(&self.posts).await,
            Table::Projects => self.reload(&self.projects).await,
        }
    }

    async fn reload<R: Record>(&self, slot: &RwLock<Vec<R>>) -> bool {
        match self.backend.fetch_all::<R>().await {
            Ok(rows) => {
                *slot.write().await = rows;
                true
            }
            Err(source) => {
                let error = StoreError::Fetch {
                    table: R::TABLE.name(),
                    source,
                };
                tracing::error!(%error, "fetch failed");
                self.notifier
                    .error(format!("Failed to fetch {}", R::TABLE.name()));
                false
            }
        }
    }

    /// All posts, newest first.
    pub async fn posts(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    /// All projects, newest first.
    pub async fn projects(&self) -> Vec<Project> {
        self.projects.read().await.clone()
    }

    /// Post with `id`.
    pub async fn post_by_id(&self, id: &str) -> Option<Post> {
        self.posts.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// Post with `slug`.
    pub async fn post_by_slug(&self, slug: &str) -> Option<Post> {
        self.posts
            .read()
            .await
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
    }

    /// Published posts, newest first.
    pub async fn published_posts(&self) -> Vec<Post> {
        self.posts
            .read()
            .await
            .iter()
            .filter(|p| p.published)
            .cloned()
            .collect()
    }

    /// Project with `id`.
    pub async fn project_by_id(&self, id: &str) -> Option<Project> {
        self.projects
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Projects flagged as a current focus.
    pub async fn current_focus(&self) -> Vec<Project> {
        self.projects
            .read()
            .await
            .iter()
            .filter(|p| p.is_current_focus)
            .cloned()
            .collect()
    }

    /// Create a post, then refetch posts.
    #[tracing::instrument(skip_all, fields(slug = %post.slug))]
    pub async fn add_post(&self, post: &NewPost) -> StoreResult<()> {
        self.backend
            .insert::<Post>(post)
            .await
            .map_err(|source| StoreError::Add {
                entity: "post",
                source,
            })?;
        self.refresh(Table::Posts).await;
        Ok(())
    }

    /// Update a post, then refetch posts.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_post(&self, id: &str, patch: &PostPatch) -> StoreResult<()> {
        self.backend
            .update::<Post>(id, patch)
            .await
            .map_err(|source| StoreError::Update {
                entity: "post",
                source,
            })?;
        self.refresh(Table::Posts).await;
        Ok(())
    }

    /// Delete a post, then refetch posts.
    #[tracing::instrument(skip(self))]
    pub async fn delete_post(&self, id: &str) -> StoreResult<()> {
        self.backend
            .delete::<Post>(id)
            .await
            .map_err(|source| StoreError::Delete {
                entity: "post",
                source,
            })?;
        self.refresh(Table::Posts).await;
        Ok(())
    }

    /// Create a project, then refetch projects.
    #[tracing::instrument(skip_all, fields(title = %project.title))]
    pub async fn add_project(&self, project: &NewProject) -> StoreResult<()> {
        self.backend
            .insert::<Project>(project)
            .await
            .map_err(|source| StoreError::Add {
                entity: "project",
                source,
            })?;
        self.refresh(Table::Projects).await;
        Ok(())
    }

    /// Update a project, then refetch projects.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> StoreResult<()> {
        self.backend
            .update::<Project>(id, patch)
            .await
            .map_err(|source| StoreError::Update {
                entity: "project",
                source,
            })?;
        self.refresh(Table::Projects).await;
        Ok(())
    }

    /// Delete a project, then refetch projects.
    #[tracing::instrument(skip(self))]
    pub async fn delete_project(&self, id: &str) -> StoreResult<()> {
        self.backend
            .delete::<Project>(id)
            .await
            .map_err(|source| StoreError::Delete {
                entity: "project",
                source,
            })?;
        self.refresh(Table::Projects).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::notify::Level;
    use std::time::Duration;

    fn new_post(title: &str, published: bool) -> NewPost {
        NewPost {
            title: title.into(),
            content: "words here".into(),
            slug: crate::model::slugify(title),
            published,
        }
    }

    async fn wait_for_posts<B: Backend>(store: &DataStore<B>, count: usize) {
        for _ in 0..100 {
            if store.posts().await.len() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("store never reached {count} posts");
    }

    #[tokio::test]
    async fn deleted_post_is_gone_after_fetch() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DataStore::new(Arc::clone(&backend), Notifier::new());

        store.add_post(&new_post("Keep", true)).await.unwrap();
        store.add_post(&new_post("Drop", true)).await.unwrap();
        let id = store.post_by_slug("drop").await.unwrap().id;

        store.delete_post(&id).await.unwrap();

        assert!(store.post_by_id(&id).await.is_none());
        let fetched: Vec<Post> = backend.fetch_all().await.unwrap();
        assert!(fetched.iter().all(|p| p.id != id));
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn start_loads_both_collections() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert::<Post>(&new_post("Existing", true)).await.unwrap();
        backend
            .insert::<Project>(&NewProject {
                title: "Tool".into(),
                is_current_focus: true,
                ..NewProject::default()
            })
            .await
            .unwrap();

        let (store, _sync) = DataStore::start(backend, Notifier::new()).await;
        assert_eq!(store.posts().await.len(), 1);
        assert_eq!(store.projects().await.len(), 1);
        assert_eq!(store.current_focus().await.len(), 1);
    }

    #[tokio::test]
    async fn external_changes_trigger_refetch() {
        let backend = Arc::new(MemoryBackend::new());
        let (store, sync) = DataStore::start(Arc::clone(&backend), Notifier::new()).await;
        assert!(store.posts().await.is_empty());

        // Another client writes directly to the backend.
        backend.insert::<Post>(&new_post("Remote", true)).await.unwrap();
        wait_for_posts(&store, 1).await;

        sync.stop();
        backend.insert::<Post>(&new_post("Later", true)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.posts().await.len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_notifies_and_keeps_rows() {
        let backend = Arc::new(MemoryBackend::new());
        let notifier = Notifier::new();
        let mut toasts = notifier.subscribe();
        let store = DataStore::new(Arc::clone(&backend), notifier);

        store.add_post(&new_post("Stays", false)).await.unwrap();
        backend.set_fail_fetches(true);

        assert!(!store.refresh(Table::Posts).await);
        assert_eq!(store.posts().await.len(), 1);

        let toast = toasts.recv().await.unwrap();
        assert_eq!(toast.level, Level::Error);
        assert_eq!(toast.message, "Failed to fetch posts");
    }

    #[tokio::test]
    async fn project_fetch_failure_message() {
        let backend = Arc::new(MemoryBackend::new());
        let notifier = Notifier::new();
        let mut toasts = notifier.subscribe();
        backend.set_fail_fetches(true);

        let store = DataStore::new(backend, notifier);
        assert!(!store.refresh(Table::Projects).await);
        assert_eq!(toasts.recv().await.unwrap().message, "Failed to fetch projects");
    }

    #[tokio::test]
    async fn mutation_failure_returns_error_and_keeps_state() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DataStore::new(Arc::clone(&backend), Notifier::new());
        store.add_post(&new_post("One", true)).await.unwrap();

        backend.set_fail_writes(true);
        let err = store.add_post(&new_post("Two", true)).await.unwrap_err();
        assert!(matches!(err, StoreError::Add { entity: "post", .. }));
        assert_eq!(store.posts().await.len(), 1);
    }

    #[tokio::test]
    async fn update_and_readers() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DataStore::new(backend, Notifier::new());
        store.add_post(&new_post("Draft", false)).await.unwrap();
        store.add_post(&new_post("Live", true)).await.unwrap();
        assert_eq!(store.published_posts().await.len(), 1);

        let id = store.post_by_slug("draft").await.unwrap().id;
        let patch = PostPatch {
            published: Some(true),
            ..PostPatch::default()
        };
        store.update_post(&id, &patch).await.unwrap();
        assert_eq!(store.published_posts().await.len(), 2);
    }

    #[tokio::test]
    async fn project_crud() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DataStore::new(backend, Notifier::new());
        store
            .add_project(&NewProject {
                title: "Tool".into(),
                category: "cli".into(),
                ..NewProject::default()
            })
            .await
            .unwrap();
        let id = store.projects().await[0].id.clone();

        let patch = ProjectPatch {
            is_current_focus: Some(true),
            ..ProjectPatch::default()
        };
        store.update_project(&id, &patch).await.unwrap();
        assert_eq!(store.current_focus().await.len(), 1);
        assert!(store.project_by_id(&id).await.is_some());

        store.delete_project(&id).await.unwrap();
        assert!(store.projects().await.is_empty());

        let err = store.delete_project(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::Delete { entity: "project", .. }));
    }

    /// Rows from memory, change events from a realtime websocket.
    struct SocketBackend {
        rows: MemoryBackend,
        base: String,
    }

    impl Backend for SocketBackend {
        fn fetch_all<R: Record>(
            &self,
        ) -> impl std::future::Future<Output = crate::error::BackendResult<Vec<R>>> + Send {
            self.rows.fetch_all::<R>()
        }

        fn insert<R: Record>(
            &self,
            row: &R::New,
        ) -> impl std::future::Future<Output = crate::error::BackendResult<()>> + Send {
            self.rows.insert::<R>(row)
        }

        fn update<R: Record>(
            &self,
            id: &str,
            patch: &R::Patch,
        ) -> impl std::future::Future<Output = crate::error::BackendResult<()>> + Send {
            self.rows.update::<R>(id, patch)
        }

        fn delete<R: Record>(
            &self,
            id: &str,
        ) -> impl std::future::Future<Output = crate::error::BackendResult<()>> + Send {
            self.rows.delete::<R>(id)
        }

        fn subscribe(&self, table: Table) -> crate::backend::ChangeFeed {
            crate::backend::realtime::spawn_feed(&self.base, "anon", table, Duration::from_millis(20))
        }
    }

    /// Websocket server that answers a posts join with one insert frame once
    /// `release` fires. Returns the http base URL.
    async fn realtime_server(release: tokio::sync::oneshot::Receiver<()>) -> String {
        use futures_util::{SinkExt, StreamExt};
        use tokio_tungstenite::tungstenite::Message;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let release = Arc::new(tokio::sync::Mutex::new(Some(release)));

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let release = Arc::clone(&release);
                tokio::spawn(async move {
                    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                    let Some(Ok(Message::Text(join))) = ws.next().await else {
                        return;
                    };
                    let join: serde_json::Value = serde_json::from_str(&join).unwrap();
                    assert_eq!(join["event"], "phx_join");
                    if join["topic"] == "realtime:public:posts" {
                        if let Some(release) = release.lock().await.take() {
                            let _ = release.await;
                        }
                        let frame = serde_json::json!({
                            "topic": "realtime:public:posts",
                            "event": "postgres_changes",
                            "payload": {"data": {"type": "INSERT", "table": "posts"}},
                            "ref": null,
                        });
                        ws.send(Message::text(frame.to_string())).await.unwrap();
                    }
                    while let Some(Ok(_)) = ws.next().await {}
                });
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn realtime_insert_frame_refetches_posts() {
        let (release_tx, release_rx) = tokio::sync::oneshot::channel();
        let backend = Arc::new(SocketBackend {
            rows: MemoryBackend::new(),
            base: realtime_server(release_rx).await,
        });
        let (store, _sync) = DataStore::start(Arc::clone(&backend), Notifier::new()).await;
        assert!(store.posts().await.is_empty());

        // Written behind the store's back; only the websocket frame announces it.
        backend.rows.insert::<Post>(&new_post("Pushed", true)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.posts().await.is_empty());

        release_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.posts().await.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("store never refetched after the realtime frame");
        assert_eq!(store.posts().await[0].title, "Pushed");
    }
}
