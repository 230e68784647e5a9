//! Coordinated-posting detection.
//!
//! Posts are linked when their texts score at or above a similarity
//! threshold and they were published within a time window of each other.
//! Linked posts are merged transitively, so a group's overall time span may
//! exceed the window even though every direct link respects it.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use chorus_core::config::DetectionConfig;
use chorus_core::{ChorusError, ChorusResult, Post, PostId};

use crate::algorithms::union_find::UnionFind;
use crate::similarity::{clamp_score, TextSimilarityScorer};

/// Window and threshold for one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionParams {
    pub time_window_seconds: f64,
    pub similarity_threshold: f64,
}

impl DetectionParams {
    /// Validated constructor. Out-of-range values are rejected, never clamped.
    pub fn new(time_window_seconds: f64, similarity_threshold: f64) -> ChorusResult<Self> {
        let params = Self {
            time_window_seconds,
            similarity_threshold,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> ChorusResult<()> {
        if !self.time_window_seconds.is_finite() || self.time_window_seconds <= 0.0 {
            return Err(ChorusError::InvalidParameter {
                name: "time_window_seconds",
                value: self.time_window_seconds.to_string(),
                reason: "must be a positive number of seconds",
            });
        }
        if !self.similarity_threshold.is_finite()
            || self.similarity_threshold <= 0.0
            || self.similarity_threshold > 1.0
        {
            return Err(ChorusError::InvalidParameter {
                name: "similarity_threshold",
                value: self.similarity_threshold.to_string(),
                reason: "must be in (0, 1]",
            });
        }
        Ok(())
    }
}

impl From<&DetectionConfig> for DetectionParams {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            time_window_seconds: config.time_window_seconds,
            similarity_threshold: config.similarity_threshold,
        }
    }
}

/// A qualifying link between two posts; `source` is the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityEdge {
    pub source: PostId,
    pub target: PostId,
    pub score: f64,
}

/// Posts joined by a chain of qualifying links.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatedGroup {
    pub group_id: usize,
    pub size: usize,
    pub unique_authors: usize,
    /// Seconds between the earliest and latest post.
    pub time_span: i64,
    /// Chronological order.
    pub posts: Vec<Post>,
    /// Direct links that joined this group.
    #[serde(skip)]
    pub edges: Vec<SimilarityEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionMetrics {
    pub total_groups: usize,
    pub total_authors: usize,
    pub avg_group_size: f64,
    pub authors_involved_percentage: f64,
    pub time_window_seconds: f64,
    pub similarity_threshold: f64,
    pub posts_considered: usize,
    pub posts_skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub groups: Vec<CoordinatedGroup>,
    pub metrics: DetectionMetrics,
}

/// A well-formed post with its timestamp unwrapped.
struct TimedPost<'a> {
    post: &'a Post,
    at: DateTime<Utc>,
}

/// Find groups of similar posts published close together.
///
/// Malformed posts (blank id, missing timestamp, repeated id) are skipped
/// and counted. The output depends only on the input order and parameters.
pub fn detect<S>(posts: &[Post], params: &DetectionParams, scorer: &S) -> ChorusResult<Detection>
where
    S: TextSimilarityScorer + ?Sized,
{
    params.validate()?;

    let (timeline, skipped) = build_timeline(posts);
    if skipped > 0 {
        warn!("Skipped {} malformed posts of {}", skipped, posts.len());
    }

    let texts: Vec<String> = timeline.iter().map(|t| t.post.text()).collect();
    let (edges, pairs_compared) = window_edges(&timeline, &texts, params, scorer);

    let mut forest = UnionFind::new(timeline.len());
    for &(i, j, _) in &edges {
        forest.union(i, j);
    }

    let components: Vec<Vec<usize>> = forest
        .components()
        .into_iter()
        .filter(|c| c.len() >= 2)
        .collect();

    let mut group_of: Vec<Option<usize>> = vec![None; timeline.len()];
    for (g, members) in components.iter().enumerate() {
        for &m in members {
            group_of[m] = Some(g);
        }
    }

    let mut group_edges: Vec<Vec<SimilarityEdge>> = vec![Vec::new(); components.len()];
    for &(i, j, score) in &edges {
        if let Some(g) = group_of[i] {
            group_edges[g].push(SimilarityEdge {
                source: timeline[i].post.id.clone(),
                target: timeline[j].post.id.clone(),
                score,
            });
        }
    }

    let groups: Vec<CoordinatedGroup> = components
        .iter()
        .zip(group_edges)
        .enumerate()
        .map(|(group_id, (members, edges))| build_group(group_id, members, edges, &timeline))
        .collect();

    let metrics = aggregate_metrics(&groups, &timeline, params, skipped);

    info!(
        "Coordination detection done - posts={}, pairs_compared={}, edges={}, groups={}",
        timeline.len(),
        pairs_compared,
        edges.len(),
        groups.len()
    );

    Ok(Detection { groups, metrics })
}

/// Posts `detect` considers, in input order with their timestamps, plus the
/// number skipped for a blank id, a missing timestamp, or an id seen earlier.
pub fn well_formed(posts: &[Post]) -> (Vec<(&Post, DateTime<Utc>)>, usize) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(posts.len());
    let mut valid = Vec::with_capacity(posts.len());
    let mut skipped = 0;

    for post in posts {
        let checked = post.validate().and_then(|at| {
            if seen.insert(post.id.as_str()) {
                Ok(at)
            } else {
                Err(ChorusError::MalformedPost {
                    id: post.id.clone(),
                    reason: "duplicate id",
                })
            }
        });
        match checked {
            Ok(at) => valid.push((post, at)),
            Err(e) => {
                debug!(error = %e, "skipping post");
                skipped += 1;
            }
        }
    }
    (valid, skipped)
}

/// Well-formed posts sorted by `(created_at, id)`, plus the number skipped.
fn build_timeline(posts: &[Post]) -> (Vec<TimedPost<'_>>, usize) {
    let (valid, skipped) = well_formed(posts);
    let mut timeline: Vec<TimedPost<'_>> = valid
        .into_iter()
        .map(|(post, at)| TimedPost { post, at })
        .collect();
    timeline.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.post.id.cmp(&b.post.id)));
    (timeline, skipped)
}

/// Score each post against the later posts inside its time window.
///
/// Returns `(earlier, later, score)` index triples in scan order and the
/// number of pairs scored.
fn window_edges<S>(
    timeline: &[TimedPost<'_>],
    texts: &[String],
    params: &DetectionParams,
    scorer: &S,
) -> (Vec<(usize, usize, f64)>, usize)
where
    S: TextSimilarityScorer + ?Sized,
{
    let mut edges = Vec::new();
    let mut pairs_compared = 0;

    for i in 0..timeline.len() {
        for j in (i + 1)..timeline.len() {
            let delta = (timeline[j].at - timeline[i].at).num_seconds() as f64;
            if delta > params.time_window_seconds {
                break;
            }
            pairs_compared += 1;
            let score = clamp_score(scorer.score(&texts[i], &texts[j]));
            if score >= params.similarity_threshold {
                edges.push((i, j, score));
            }
        }
    }
    (edges, pairs_compared)
}

fn build_group(
    group_id: usize,
    members: &[usize],
    edges: Vec<SimilarityEdge>,
    timeline: &[TimedPost<'_>],
) -> CoordinatedGroup {
    let authors: BTreeSet<&str> = members
        .iter()
        .map(|&m| timeline[m].post.author.as_str())
        .collect();

    // Members are ascending timeline indices, so first and last bound the span.
    let time_span = match (members.first(), members.last()) {
        (Some(&first), Some(&last)) => (timeline[last].at - timeline[first].at).num_seconds(),
        _ => 0,
    };

    CoordinatedGroup {
        group_id,
        size: members.len(),
        unique_authors: authors.len(),
        time_span,
        posts: members.iter().map(|&m| timeline[m].post.clone()).collect(),
        edges,
    }
}

fn aggregate_metrics(
    groups: &[CoordinatedGroup],
    timeline: &[TimedPost<'_>],
    params: &DetectionParams,
    skipped: usize,
) -> DetectionMetrics {
    let involved: BTreeSet<&str> = groups
        .iter()
        .flat_map(|g| g.posts.iter().map(|p| p.author.as_str()))
        .collect();
    let corpus_authors: BTreeSet<&str> = timeline.iter().map(|t| t.post.author.as_str()).collect();

    let grouped_posts: usize = groups.iter().map(|g| g.size).sum();
    let avg_group_size = if groups.is_empty() {
        0.0
    } else {
        grouped_posts as f64 / groups.len() as f64
    };
    let authors_involved_percentage = if corpus_authors.is_empty() {
        0.0
    } else {
        involved.len() as f64 / corpus_authors.len() as f64 * 100.0
    };

    DetectionMetrics {
        total_groups: groups.len(),
        total_authors: involved.len(),
        avg_group_size,
        authors_involved_percentage,
        time_window_seconds: params.time_window_seconds,
        similarity_threshold: params.similarity_threshold,
        posts_considered: timeline.len(),
        posts_skipped: skipped,
    }
}
