//! Dashboard statistics, the yearly archive, and post search.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::model::{Post, Project};
use crate::reading_time::{reading_time, word_count};

/// Aggregate numbers shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Posts of any status.
    pub total_posts: usize,
    /// Published posts.
    pub published_posts: usize,
    /// Words across every post.
    pub total_words: usize,
    /// Mean reading time in minutes, rounded up. Zero with no posts.
    pub avg_read_time: u32,
    /// Posts created in the current calendar month.
    pub posts_this_month: usize,
    /// Published share in whole percent. Zero with no posts.
    pub published_ratio: u32,
    /// Projects of any focus.
    pub project_count: usize,
}

/// Compute the dashboard summary as of `now`.
pub fn summarize(posts: &[Post], projects: &[Project], now: DateTime<Utc>) -> Summary {
    let total_posts = posts.len();
    let published_posts = posts.iter().filter(|p| p.published).count();
    let total_words = posts.iter().map(|p| word_count(&p.content)).sum();
    let total_minutes: u64 = posts.iter().map(|p| u64::from(reading_time(&p.content))).sum();
    let posts_this_month = posts
        .iter()
        .filter(|p| p.created_at.year() == now.year() && p.created_at.month() == now.month())
        .count();

    let (avg_read_time, published_ratio) = if total_posts == 0 {
        (0, 0)
    } else {
        let count = total_posts as u64;
        let avg = total_minutes.div_ceil(count);
        // Round half up.
        let ratio = (published_posts as u64 * 200 + count) / (count * 2);
        (
            u32::try_from(avg).unwrap_or(u32::MAX),
            u32::try_from(ratio).unwrap_or(100),
        )
    };

    Summary {
        total_posts,
        published_posts,
        total_words,
        avg_read_time,
        posts_this_month,
        published_ratio,
        project_count: projects.len(),
    }
}

/// One published post in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry<'a> {
    /// The post.
    pub post: &'a Post,
    /// Reading time in minutes.
    pub minutes: u32,
}

/// Published posts created in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveYear<'a> {
    /// Calendar year of creation.
    pub year: i32,
    /// Posts in input order.
    pub posts: Vec<ArchiveEntry<'a>>,
}

/// Group published posts by creation year, newest year first.
pub fn group_by_year(posts: &[Post]) -> Vec<ArchiveYear<'_>> {
    let mut years: Vec<ArchiveYear<'_>> = Vec::new();
    for post in posts.iter().filter(|p| p.published) {
        let year = post.created_at.year();
        let entry = ArchiveEntry {
            post,
            minutes: reading_time(&post.content),
        };
        match years.iter_mut().find(|y| y.year == year) {
            Some(group) => group.posts.push(entry),
            None => years.push(ArchiveYear {
                year,
                posts: vec![entry],
            }),
        }
    }
    years.sort_by(|a, b| b.year.cmp(&a.year));
    years
}

/// Posts whose title or body contains `query`, ignoring case. An empty
/// query matches everything.
pub fn search_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let needle = query.trim().to_lowercase();
    posts
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.title.to_lowercase().contains(&needle)
                || p.content.to_lowercase().contains(&needle)
        })
        .collect()
}
