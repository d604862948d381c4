//! Markdown editing surface.
//!
//! [`EditableBlock`] owns the raw markdown, a cursor, and a sanitized HTML
//! preview that is re-rendered synchronously on every change. Offsets are
//! measured in characters, not bytes.

pub mod reveal;
pub mod session;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::markdown;

/// A range in the text, measured in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    /// First selected character.
    pub start: usize,
    /// One past the last selected character.
    pub end: usize,
}

impl Range {
    /// Range from `start` to `end`.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty range at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Whether the range selects nothing.
    pub const fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Number of selected characters.
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Alias for [`Range::is_caret`].
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize range so start <= end.
    #[must_use]
    pub const fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Normalize and clamp both ends to `len`.
    #[must_use]
    pub fn clamp(self, len: usize) -> Self {
        let range = self.normalize();
        Self {
            start: range.start.min(len),
            end: range.end.min(len),
        }
    }
}

/// Toolbar formatting operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Format {
    /// `**selection**`
    Bold,
    /// `*selection*`
    Italic,
    /// `# selection`
    #[serde(rename = "h1")]
    #[cfg_attr(feature = "clap", value(name = "h1"))]
    Heading1,
    /// `## selection`
    #[serde(rename = "h2")]
    #[cfg_attr(feature = "clap", value(name = "h2"))]
    Heading2,
    /// `- selection`
    List,
    /// `[selection](url)`
    Link,
    /// `> selection`
    Quote,
    /// `` `selection` ``
    Code,
}

impl Format {
    /// Every format, in toolbar order.
    pub const ALL: [Self; 8] = [
        Self::Bold,
        Self::Italic,
        Self::Heading1,
        Self::Heading2,
        Self::List,
        Self::Link,
        Self::Quote,
        Self::Code,
    ];

    /// Toolbar identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Heading1 => "h1",
            Self::Heading2 => "h2",
            Self::List => "list",
            Self::Link => "link",
            Self::Quote => "quote",
            Self::Code => "code",
        }
    }

    /// Text inserted before and after the selection.
    pub const fn markers(self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("**", "**"),
            Self::Italic => ("*", "*"),
            Self::Heading1 => ("# ", ""),
            Self::Heading2 => ("## ", ""),
            Self::List => ("- ", ""),
            Self::Link => ("[", "](url)"),
            Self::Quote => ("> ", ""),
            Self::Code => ("`", "`"),
        }
    }

    /// Characters of markup added around the selection.
    pub fn markup_len(self) -> usize {
        let (before, after) = self.markers();
        before.chars().count() + after.chars().count()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.id() == s)
            .ok_or_else(|| format!("unknown format: {s}"))
    }
}

/// Markdown text with a cursor and a live sanitized preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableBlock {
    text: String,
    cursor: usize,
    scroll_offset: u32,
    preview: String,
}

impl EditableBlock {
    /// Create a block holding `text`, cursor at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let mut block = Self::default();
        block.set_text(text);
        block.cursor = block.char_len();
        block
    }

    /// Raw markdown.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sanitized HTML preview of the current text.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Cursor position in characters.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Move the cursor, clamped to the text length.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.char_len());
    }

    /// Vertical scroll position of whatever surface shows the text.
    pub const fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    /// Record the surface's scroll position.
    pub const fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    /// Replace the whole text and re-render the preview.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.cursor.min(self.char_len());
        self.preview = markdown::render_safe(&self.text);
    }

    /// Wrap or prefix the selection with `format`'s markup.
    ///
    /// The cursor lands right after the inserted markup (`end + markup
    /// length`). Returns the new cursor.
    pub fn apply_format(&mut self, format: Format, range: Range) -> usize {
        let range = range.clamp(self.char_len());
        let start = char_to_byte(&self.text, range.start);
        let end = char_to_byte(&self.text, range.end);
        let (before, after) = format.markers();

        let mut next = String::with_capacity(self.text.len() + before.len() + after.len());
        next.push_str(&self.text[..start]);
        next.push_str(before);
        next.push_str(&self.text[start..end]);
        next.push_str(after);
        next.push_str(&self.text[end..]);

        self.set_text(next);
        self.cursor = range.end + format.markup_len();
        tracing::trace!(%format, cursor = self.cursor, "format applied");
        self.cursor
    }

    /// Insert `![Image](url)` at the cursor without replacing anything.
    ///
    /// Returns the new cursor, just past the inserted text.
    pub fn insert_image(&mut self, url: &str) -> usize {
        let snippet = image_markdown(url);
        let at = char_to_byte(&self.text, self.cursor);
        let cursor = self.cursor + snippet.chars().count();

        let mut next = self.text.clone();
        next.insert_str(at, &snippet);
        self.set_text(next);
        self.cursor = cursor;
        self.cursor
    }
}

/// Markdown for an inline image.
pub fn image_markdown(url: &str) -> String {
    format!("![Image]({url})")
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(i, _)| i)
}

/// An [`EditableBlock`] shared between an editor and a running reveal.
#[derive(Debug, Clone, Default)]
pub struct SharedBlock(Arc<Mutex<EditableBlock>>);

impl SharedBlock {
    /// Share `block`.
    pub fn new(block: EditableBlock) -> Self {
        Self(Arc::new(Mutex::new(block)))
    }

    /// Lock the block.
    pub fn lock(&self) -> MutexGuard<'_, EditableBlock> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current text.
    pub fn text(&self) -> String {
        self.lock().text().to_string()
    }

    /// Copy of the current preview.
    pub fn preview(&self) -> String {
        self.lock().preview().to_string()
    }
}

impl reveal::RevealTarget for SharedBlock {
    fn update(&mut self, text: &str) {
        self.lock().set_text(text);
    }

    fn scroll_offset(&self) -> u32 {
        self.lock().scroll_offset()
    }

    fn restore_scroll(&mut self, offset: u32) {
        self.lock().set_scroll_offset(offset);
    }
}
