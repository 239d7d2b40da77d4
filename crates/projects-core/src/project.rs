//! Project board and item models.

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A page of a paginated remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default)]
    pub total_count: usize,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            nodes: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

/// Cursor information for a [`Connection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// The cursor to request the next page with, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

/// A user or bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// A project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub title: String,

    /// Short description.
    #[serde(default, alias = "shortDescription")]
    pub description: Option<String>,

    /// Readme.
    #[serde(default, alias = "readme")]
    pub body: Option<String>,

    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub creator: Option<Actor>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// First page of items, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Connection<ProjectItem>>,
}

/// Kind of content an item wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Issue,
    PullRequest,
    DraftIssue,
    Redacted,
    #[serde(other)]
    Unknown,
}

/// An item attached to a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub id: String,
    #[serde(default, rename = "type")]
    pub item_type: Option<ItemType>,

    /// The wrapped issue, pull request, or draft; `None` when redacted.
    #[serde(default)]
    pub content: Option<ItemContent>,
}

impl ProjectItem {
    /// Issue or pull request number of the wrapped content, if any.
    #[must_use]
    pub fn content_number(&self) -> Option<u64> {
        self.content.as_ref().and_then(|c| c.number)
    }
}

/// Content wrapped by an item.
///
/// Issues and pull requests carry a number; drafts do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub creator: Option<Actor>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Scalar board properties to change; `None` leaves a property as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

impl ProjectUpdate {
    /// Whether there is anything to send.
    ///
    /// An empty title does not count as a change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
            || self.description.is_some()
            || self.body.is_some()
            || self.public.is_some()
    }
}

/// Parse a board, issue, or pull request number, allowing a leading `#`.
///
/// `kind` names what is being parsed in the error, e.g. "issue".
///
/// # Errors
/// Returns `CoreError::InvalidNumber` unless the input is a positive integer.
pub fn parse_number(input: &str, kind: &'static str) -> Result<u64> {
    let digits = input.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);

    match digits.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CoreError::InvalidNumber {
            kind,
            input: input.to_string(),
        }),
    }
}
