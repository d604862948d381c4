//! Rows stored in the backend and the values derived from them.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Backend-assigned identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// URL slug. Uniqueness is enforced by the backend, if at all.
    pub slug: String,
    /// Whether the post is visible on the public blog.
    pub published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    /// Title.
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// URL slug.
    pub slug: String,
    /// Visibility.
    pub published: bool,
}

/// Partial update for a post; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl PostPatch {
    /// Whether the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.slug.is_none()
            && self.published.is_none()
    }

    /// Apply to a post in place.
    pub fn apply(&self, post: &mut Post) {
        if let Some(ref title) = self.title {
            post.title.clone_from(title);
        }
        if let Some(ref content) = self.content {
            post.content.clone_from(content);
        }
        if let Some(ref slug) = self.slug {
            post.slug.clone_from(slug);
        }
        if let Some(published) = self.published {
            post.published = published;
        }
    }
}

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Backend-assigned identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Icon glyph or name.
    pub icon: String,
    /// Category label.
    pub category: String,
    /// Whether the project is a current focus.
    pub is_current_focus: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    /// Title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Icon glyph or name.
    pub icon: String,
    /// Category label.
    pub category: String,
    /// Current-focus flag.
    pub is_current_focus: bool,
}

/// Partial update for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New current-focus flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current_focus: Option<bool>,
}

impl ProjectPatch {
    /// Whether the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.category.is_none()
            && self.is_current_focus.is_none()
    }

    /// Apply to a project in place.
    pub fn apply(&self, project: &mut Project) {
        if let Some(ref title) = self.title {
            project.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            project.description.clone_from(description);
        }
        if let Some(ref icon) = self.icon {
            project.icon.clone_from(icon);
        }
        if let Some(ref category) = self.category {
            project.category.clone_from(category);
        }
        if let Some(focus) = self.is_current_focus {
            project.is_current_focus = focus;
        }
    }
}

/// Backend collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Blog posts.
    Posts,
    /// Portfolio projects.
    Projects,
}

impl Table {
    /// Wire name of the table.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Projects => "projects",
        }
    }

    /// Singular noun used in messages.
    pub const fn entity(self) -> &'static str {
        match self {
            Self::Posts => "post",
            Self::Projects => "project",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(Self::Posts),
            "projects" => Ok(Self::Projects),
            other => Err(format!("unknown table: {other}")),
        }
    }
}

/// Kind of row change reported by the realtime feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Row inserted.
    Insert,
    /// Row updated.
    Update,
    /// Row deleted.
    Delete,
    /// Anything else the feed reports.
    Unknown,
}

impl ChangeKind {
    /// Parse the feed's `INSERT` / `UPDATE` / `DELETE` tags.
    pub fn from_wire(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Unknown,
        }
    }
}

/// Something changed in `table`. Consumers refetch the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Affected table.
    pub table: Table,
    /// What happened.
    pub kind: ChangeKind,
}

/// Profile links shown in the site header. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    /// GitHub profile URL.
    pub github: String,
    /// X/Twitter profile URL.
    pub twitter: String,
}

impl Default for SocialLinks {
    fn default() -> Self {
        Self {
            github: "https://github.com/test".to_string(),
            twitter: "https://x.com/test".to_string(),
        }
    }
}

/// Runs of characters that cannot appear in a slug.
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Derive a URL slug from a title: lowercase ASCII alphanumerics joined by `-`.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_SLUG
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: "p1".into(),
            title: "Hello".into(),
            content: "body".into(),
            slug: "hello".into(),
            published: false,
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
            updated_at: "2024-03-01T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn post_deserializes_backend_row() {
        let row = r##"{
            "id": "7f0c",
            "title": "First",
            "content": "# Hi",
            "slug": "first",
            "published": true,
            "created_at": "2024-05-01T12:30:00.123456+00:00",
            "updated_at": "2024-05-02T08:00:00+00:00"
        }"##;
        let post: Post = serde_json::from_str(row).unwrap();
        assert_eq!(post.slug, "first");
        assert!(post.published);
        assert_eq!(post.created_at.to_rfc3339(), "2024-05-01T12:30:00.123456+00:00");
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = PostPatch {
            published: Some(true),
            ..PostPatch::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"published":true}"#);
        assert!(!patch.is_empty());
        assert!(PostPatch::default().is_empty());
    }

    #[test]
    fn patch_applies_in_place() {
        let mut post = sample_post();
        PostPatch {
            title: Some("Renamed".into()),
            published: Some(true),
            ..PostPatch::default()
        }
        .apply(&mut post);
        assert_eq!(post.title, "Renamed");
        assert!(post.published);
        assert_eq!(post.slug, "hello");
    }

    #[test]
    fn project_patch_applies_focus() {
        let mut project = Project {
            id: "x".into(),
            title: "Tool".into(),
            description: "d".into(),
            icon: "🔧".into(),
            category: "cli".into(),
            is_current_focus: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        ProjectPatch {
            is_current_focus: Some(true),
            ..ProjectPatch::default()
        }
        .apply(&mut project);
        assert!(project.is_current_focus);
        assert_eq!(project.title, "Tool");
    }

    #[test]
    fn table_names() {
        assert_eq!(Table::Posts.name(), "posts");
        assert_eq!(Table::Projects.to_string(), "projects");
        assert_eq!("posts".parse::<Table>(), Ok(Table::Posts));
        assert!("users".parse::<Table>().is_err());
    }

    #[test]
    fn change_kind_from_wire_tags() {
        assert_eq!(ChangeKind::from_wire("INSERT"), ChangeKind::Insert);
        assert_eq!(ChangeKind::from_wire("update"), ChangeKind::Update);
        assert_eq!(ChangeKind::from_wire("DELETE"), ChangeKind::Delete);
        assert_eq!(ChangeKind::from_wire("TRUNCATE"), ChangeKind::Unknown);
    }

    #[test]
    fn social_link_defaults() {
        let links = SocialLinks::default();
        assert_eq!(links.github, "https://github.com/test");
        assert_eq!(links.twitter, "https://x.com/test");
    }

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust 2024: What's New?  "), "rust-2024-what-s-new");
        assert_eq!(slugify("---"), "");
    }
}
