//! Post editor state and its AI actions.
//!
//! An [`EditorSession`] holds the title, slug and body of one post, owns the
//! single reveal slot for that body, and reports outcomes through the
//! [`Notifier`].

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::ai::{AiClient, AiResponse, ChatTransport, HttpTransport};
use crate::editor::reveal::{DEFAULT_INTERVAL, RevealSlot, RevealTarget};
use crate::editor::{Format, Range, SharedBlock};
use crate::error::EditorError;
use crate::model::{NewPost, Post, PostPatch, slugify};
use crate::notify::Notifier;
use crate::style::{ContentLength, WritingStyle};

/// An AI transform applied to the existing body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceAction {
    /// Fix grammar.
    Grammar,
    /// Translate to English.
    Translate,
    /// Rewrite in a writing style.
    Style(WritingStyle),
}

impl EnhanceAction {
    /// Toast shown when the action succeeds.
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Grammar => "Text corrected successfully",
            Self::Translate => "Text translated successfully",
            Self::Style(_) => "Text enhanced successfully",
        }
    }

    /// Send `text` through the matching AI operation.
    pub async fn run<T: ChatTransport>(self, ai: &AiClient<T>, text: &str) -> AiResponse {
        match self {
            Self::Grammar => ai.fix_grammar(text).await,
            Self::Translate => ai.translate_to_english(text).await,
            Self::Style(style) => ai.expand_text(text, &style.enhance_prompt()).await,
        }
    }
}

/// A second display that follows every reveal, such as a terminal.
#[derive(Clone)]
struct Echo(Arc<Mutex<dyn RevealTarget>>);

impl Echo {
    fn with<R>(&self, f: impl FnOnce(&mut dyn RevealTarget) -> R) -> R {
        let mut target = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *target)
    }
}

impl fmt::Debug for Echo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Echo")
    }
}

/// Writes a reveal into the body and mirrors it to the echo.
struct BodyTarget {
    body: SharedBlock,
    echo: Option<Echo>,
}

impl RevealTarget for BodyTarget {
    fn begin(&mut self, text: &str) {
        if let Some(echo) = &self.echo {
            echo.with(|target| target.begin(text));
        }
    }

    fn update(&mut self, text: &str) {
        self.body.update(text);
        if let Some(echo) = &self.echo {
            echo.with(|target| target.update(text));
        }
    }

    fn scroll_offset(&self) -> u32 {
        self.body.scroll_offset()
    }

    fn restore_scroll(&mut self, offset: u32) {
        self.body.restore_scroll(offset);
    }
}

/// Editing state for one post.
#[derive(Debug)]
pub struct EditorSession<T = HttpTransport> {
    /// Post title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Visibility.
    pub published: bool,
    /// Target length for generated drafts.
    pub length: ContentLength,
    body: SharedBlock,
    reveal: RevealSlot,
    ai: AiClient<T>,
    notifier: Notifier,
    interval: Duration,
    echo: Option<Echo>,
}

impl<T: ChatTransport> EditorSession<T> {
    /// Empty editor.
    pub fn new(ai: AiClient<T>, notifier: Notifier) -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            published: false,
            length: ContentLength::default(),
            body: SharedBlock::default(),
            reveal: RevealSlot::new(),
            ai,
            notifier,
            interval: DEFAULT_INTERVAL,
            echo: None,
        }
    }

    /// Editor pre-filled from an existing post.
    pub fn from_post(post: &Post, ai: AiClient<T>, notifier: Notifier) -> Self {
        let mut session = Self::new(ai, notifier);
        session.title.clone_from(&post.title);
        session.slug.clone_from(&post.slug);
        session.published = post.published;
        session.set_content(post.content.clone());
        session
    }

    /// Set the delay between revealed words.
    #[must_use]
    pub const fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Mirror every reveal into `target` as well as the body.
    #[must_use]
    pub fn with_reveal_echo(mut self, target: impl RevealTarget) -> Self {
        let shared: Arc<Mutex<dyn RevealTarget>> = Arc::new(Mutex::new(target));
        self.echo = Some(Echo(shared));
        self
    }

    /// Copy of the markdown body.
    pub fn content(&self) -> String {
        self.body.text()
    }

    /// Sanitized preview of the body.
    pub fn preview(&self) -> String {
        self.body.preview()
    }

    /// Handle to the body, shared with any running reveal.
    pub fn body(&self) -> SharedBlock {
        self.body.clone()
    }

    /// Replace the body, stopping any running reveal.
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.reveal.clear();
        self.body.lock().set_text(text);
    }

    /// Fill the slug from the title when it is still empty.
    pub fn suggest_slug(&mut self) -> &str {
        if self.slug.is_empty() {
            self.slug = slugify(&self.title);
        }
        &self.slug
    }

    /// Apply a toolbar format to `range` of the body, stopping any running
    /// reveal.
    pub fn apply_format(&mut self, format: Format, range: Range) -> usize {
        self.reveal.clear();
        self.body.lock().apply_format(format, range)
    }

    /// Insert an uploaded image at `cursor`, stopping any running reveal.
    pub fn insert_image(&mut self, cursor: usize, url: &str) -> usize {
        self.reveal.clear();
        let mut body = self.body.lock();
        body.set_cursor(cursor);
        body.insert_image(url)
    }

    /// Run an AI transform on the body and reveal the result.
    ///
    /// The reveal runs in the background; use [`EditorSession::wait_for_reveal`]
    /// to wait for the final text.
    #[tracing::instrument(skip(self))]
    pub async fn enhance(&mut self, action: EnhanceAction) -> Result<(), EditorError> {
        let text = self.content();
        if text.trim().is_empty() {
            self.notifier.error(EditorError::EmptyText.to_string());
            return Err(EditorError::EmptyText);
        }

        match action.run(&self.ai, &text).await.into_result() {
            Ok(result) => {
                let target = BodyTarget {
                    body: self.body.clone(),
                    echo: self.echo.clone(),
                };
                self.reveal.start(result, target, self.interval);
                self.notifier.success(action.success_message());
                Ok(())
            }
            Err(error) => {
                self.notifier.error("Failed to process text. Please try again.");
                Err(EditorError::Ai(error))
            }
        }
    }

    /// Replace the body with a draft generated from the title.
    #[tracing::instrument(skip(self), fields(length = ?self.length))]
    pub async fn generate(&mut self) -> Result<(), EditorError> {
        if self.title.trim().is_empty() {
            self.notifier.error(EditorError::EmptyTitle.to_string());
            return Err(EditorError::EmptyTitle);
        }

        let response = self.ai.generate_seo_content(&self.title, self.length).await;
        match response.into_result() {
            Ok(text) => {
                self.set_content(text);
                self.notifier.success("Content generated successfully");
                Ok(())
            }
            Err(error) => {
                self.notifier
                    .error("Failed to generate content. Please try again.");
                Err(EditorError::Ai(error))
            }
        }
    }

    /// Set the draft length from a 1-5 level.
    pub fn set_length_level(&mut self, level: u8) -> Result<(), EditorError> {
        self.length = ContentLength::from_level(level).ok_or(EditorError::InvalidLength(level))?;
        Ok(())
    }

    /// Whether a reveal is still writing into the body.
    pub fn is_revealing(&self) -> bool {
        self.reveal.is_running()
    }

    /// Wait for the running reveal, if any.
    pub async fn wait_for_reveal(&mut self) -> bool {
        self.reveal.wait().await
    }

    /// Insert payload for the current state.
    pub fn to_new_post(&self) -> NewPost {
        NewPost {
            title: self.title.clone(),
            content: self.content(),
            slug: self.slug.clone(),
            published: self.published,
        }
    }

    /// Full update payload for the current state.
    pub fn to_patch(&self) -> PostPatch {
        PostPatch {
            title: Some(self.title.clone()),
            content: Some(self.content()),
            slug: Some(self.slug.clone()),
            published: Some(self.published),
        }
    }
}
