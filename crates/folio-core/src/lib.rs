//! Core library for folio.
//!
//! This crate provides the content model, the data store, the editor and the
//! AI client used by the `folio` CLI and any downstream consumers.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`reading_time`] - Word counts and reading-time estimates
//! - [`markdown`] - Markdown rendering and HTML sanitization
//! - [`style`] - Content lengths and writing styles for AI prompts
//! - [`ai`] - Chat-completion client for grammar, style, translation and drafts
//! - [`editor`] - Editable text block, formatting, and the streaming revealer
//! - [`backend`] - REST, realtime and in-memory backends
//! - [`store`] - Cached posts and projects kept fresh by change events
//! - [`storage`] - Image uploads
//! - [`session`] / [`routes`] - Admin login and route guarding
//! - [`analytics`] - Dashboard numbers, archive and search
//!
//! # Quick Start
//!
//! ```no_run
//! use folio_core::{ConfigLoader, reading_time};
//!
//! let (config, _sources) = ConfigLoader::new()
//!     .with_user_config(true)
//!     .load()
//!     .expect("Failed to load configuration");
//!
//! println!("Log level: {:?}", config.log_level);
//! println!("{} min", reading_time::reading_time("A short post."));
//! ```
#![deny(unsafe_code)]

pub mod ai;
pub mod analytics;
pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod model;
pub mod notify;
pub mod reading_time;
pub mod routes;
pub mod session;
pub mod storage;
pub mod store;
pub mod style;

pub use ai::{AiClient, AiResponse};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use editor::{EditableBlock, Format, Range};
pub use error::{
    AuthError, BackendError, ConfigError, ConfigResult, EditorError, StorageError, StoreError,
    StoreResult,
};
pub use model::{Post, Project, SocialLinks};
pub use notify::{Notification, Notifier};
pub use routes::Route;
pub use session::Session;
pub use store::DataStore;
pub use style::{ContentLength, WritingStyle};

/// Default maximum input file size: 5 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;
