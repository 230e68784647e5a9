//! Post corpus loading and query filtering.
//!
//! The corpus is a JSONL dump with one record per line. Records may be flat
//! or wrapped in a `{"data": {...}}` envelope, as Reddit API dumps are.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ChorusResult;
use crate::post::Post;

/// Counters from a JSONL load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub lines: usize,
    pub loaded: usize,
    pub skipped: usize,
}

/// Query and optional inclusive date range applied to the corpus.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring matched against title or body. Empty matches all.
    pub query: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl PostFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    fn is_date_bounded(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    fn matches(&self, post: &Post, needle: &str) -> bool {
        if !needle.is_empty()
            && !post.title.to_lowercase().contains(needle)
            && !post.body.to_lowercase().contains(needle)
        {
            return false;
        }
        if !self.is_date_bounded() {
            return true;
        }
        let Some(day) = post.created_at.map(|ts| ts.date_naive()) else {
            return false;
        };
        self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
    }
}

/// In-memory post corpus.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    posts: Vec<Post>,
}

impl DatasetStore {
    pub fn from_posts(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Load a JSONL corpus. Unparsable lines are skipped and counted;
    /// failing to open or read the file is an error.
    pub fn load_jsonl(path: &Path) -> ChorusResult<(Self, LoadStats)> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut stats = LoadStats::default();
        let mut posts = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            stats.lines += 1;
            match parse_record(&line) {
                Ok(post) => {
                    posts.push(post);
                    stats.loaded += 1;
                }
                Err(e) => {
                    debug!(line = line_no + 1, error = %e, "skipping unparsable record");
                    stats.skipped += 1;
                }
            }
        }

        if stats.skipped > 0 {
            warn!(
                "Skipped {} of {} records in {}",
                stats.skipped,
                stats.lines,
                path.display()
            );
        }
        info!("Loaded {} posts from {}", stats.loaded, path.display());
        Ok((Self { posts }, stats))
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Posts matching the filter, in corpus order.
    pub fn filter(&self, filter: &PostFilter) -> Vec<Post> {
        let needle = filter.query.to_lowercase();
        let matched: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| filter.matches(p, &needle))
            .cloned()
            .collect();
        debug!(
            query = %filter.query,
            matched = matched.len(),
            total = self.posts.len(),
            "Filtered corpus"
        );
        matched
    }
}

// ── Record parsing ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_utc: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    subreddit: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    num_comments: Option<i64>,
    #[serde(default)]
    repost_of: Option<String>,
}

fn parse_record(line: &str) -> ChorusResult<Post> {
    let mut value: Value = serde_json::from_str(line)?;
    if value.get("data").is_some_and(Value::is_object) {
        value = value["data"].take();
    }
    let raw: RawRecord = serde_json::from_value(value)?;

    Ok(Post {
        id: raw.id.as_ref().map(value_to_string).unwrap_or_default(),
        author: raw.author.unwrap_or_default(),
        created_at: raw.created_utc.as_ref().and_then(parse_unix_seconds),
        title: raw.title.unwrap_or_default(),
        body: raw.selftext.unwrap_or_default(),
        community: raw.subreddit.unwrap_or_default(),
        permalink: raw.permalink.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        score: raw.score,
        num_comments: raw.num_comments,
        repost_of: raw.repost_of.filter(|s| !s.is_empty()),
    })
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Unix seconds given as an integer, a float, or a numeric string.
fn parse_unix_seconds(v: &Value) -> Option<DateTime<Utc>> {
    let secs = match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }?;
    Utc.timestamp_opt(secs, 0).single()
}
