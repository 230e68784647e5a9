use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChorusError;

/// Post identifier as it appears in the source corpus.
pub type PostId = String;

/// A single social-media post.
///
/// `created_at` is optional because source dumps occasionally lack it; such
/// posts are still loadable and countable but never take part in
/// time-based analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub community: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_comments: Option<i64>,
    /// Author this post was reposted from, when the source records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repost_of: Option<String>,
}

impl Post {
    /// Minimal constructor; optional fields start empty.
    pub fn new(
        id: impl Into<PostId>,
        author: impl Into<String>,
        created_at: Option<DateTime<Utc>>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            created_at,
            title: title.into(),
            body: body.into(),
            community: String::new(),
            permalink: String::new(),
            url: String::new(),
            score: None,
            num_comments: None,
            repost_of: None,
        }
    }

    /// Text handed to similarity scoring: title and body joined by a space.
    pub fn text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body)
        }
    }

    /// Check the fields time-based analysis depends on, returning the
    /// timestamp of a well-formed post.
    pub fn validate(&self) -> Result<DateTime<Utc>, ChorusError> {
        if self.id.trim().is_empty() {
            return Err(ChorusError::MalformedPost {
                id: self.id.clone(),
                reason: "missing id",
            });
        }
        self.created_at.ok_or_else(|| ChorusError::MalformedPost {
            id: self.id.clone(),
            reason: "missing created_at",
        })
    }
}
