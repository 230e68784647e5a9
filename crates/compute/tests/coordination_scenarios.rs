//! End-to-end properties of coordinated-group detection.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use chorus_compute::{detect, Detection, DetectionParams, TextSimilarityScorer};
use chorus_core::Post;

fn post(id: &str, author: &str, secs: i64, text: &str) -> Post {
    Post::new(id, author, Utc.timestamp_opt(secs, 0).single(), text, "")
}

/// Scores pairs from an explicit table keyed by post text; unlisted pairs score 0.
struct PairTable(HashMap<(String, String), f64>);

impl PairTable {
    fn new(pairs: &[(&str, &str, f64)]) -> Self {
        let mut table = HashMap::new();
        for &(a, b, s) in pairs {
            table.insert((a.to_string(), b.to_string()), s);
            table.insert((b.to_string(), a.to_string()), s);
        }
        Self(table)
    }
}

impl TextSimilarityScorer for PairTable {
    fn score(&self, a: &str, b: &str) -> f64 {
        self.0.get(&(a.to_string(), b.to_string())).copied().unwrap_or(0.0)
    }
}

fn group_ids(d: &Detection) -> Vec<Vec<&str>> {
    d.groups
        .iter()
        .map(|g| g.posts.iter().map(|p| p.id.as_str()).collect())
        .collect()
}

fn two_bursts() -> (Vec<Post>, PairTable) {
    let posts = vec![
        post("p0", "a0", 0, "t0"),
        post("p1", "a1", 10, "t1"),
        post("p2", "a2", 20, "t2"),
        post("p3", "a3", 3600, "t3"),
        post("p4", "a4", 3610, "t4"),
    ];
    let table = PairTable::new(&[
        ("t0", "t1", 0.9),
        ("t1", "t2", 0.9),
        ("t0", "t2", 0.9),
        ("t3", "t4", 0.9),
    ]);
    (posts, table)
}

#[test]
fn two_bursts_form_two_groups() {
    let (posts, table) = two_bursts();
    let params = DetectionParams::new(30.0, 0.8).unwrap();
    let d = detect(&posts, &params, &table).unwrap();

    assert_eq!(group_ids(&d), vec![vec!["p0", "p1", "p2"], vec!["p3", "p4"]]);
    assert_eq!(d.groups[0].group_id, 0);
    assert_eq!(d.groups[1].group_id, 1);
    assert_eq!(d.groups[0].time_span, 20);
    assert_eq!(d.groups[1].time_span, 10);

    let m = &d.metrics;
    assert_eq!(m.total_groups, 2);
    assert_eq!(m.total_authors, 5);
    assert_eq!(m.avg_group_size, 2.5);
    assert_eq!(m.authors_involved_percentage, 100.0);
    assert_eq!(m.time_window_seconds, 30.0);
    assert_eq!(m.similarity_threshold, 0.8);
}

#[test]
fn transitive_chain_may_exceed_window() {
    let posts = vec![
        post("a", "u1", 0, "ta"),
        post("b", "u2", 1500, "tb"),
        post("c", "u3", 2900, "tc"),
    ];
    let table = PairTable::new(&[("ta", "tb", 0.95), ("tb", "tc", 0.95), ("ta", "tc", 0.95)]);
    let params = DetectionParams::new(1600.0, 0.8).unwrap();
    let d = detect(&posts, &params, &table).unwrap();

    assert_eq!(group_ids(&d), vec![vec!["a", "b", "c"]]);
    assert_eq!(d.groups[0].time_span, 2900);
    assert!(d.groups[0].time_span as f64 > params.time_window_seconds);

    // a-c is 2900s apart, so it must not be a direct edge even though it scores high.
    let direct: Vec<(&str, &str)> = d.groups[0]
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(direct, vec![("a", "b"), ("b", "c")]);
}

#[test]
fn input_order_does_not_change_grouping_of_distinct_timestamps() {
    let (mut posts, table) = two_bursts();
    let params = DetectionParams::new(30.0, 0.8).unwrap();
    let forward = detect(&posts, &params, &table).unwrap();
    posts.reverse();
    let reversed = detect(&posts, &params, &table).unwrap();
    assert_eq!(group_ids(&forward), group_ids(&reversed));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let (posts, table) = two_bursts();
    let params = DetectionParams::new(30.0, 0.8).unwrap();
    let first = serde_json::to_string(&detect(&posts, &params, &table).unwrap()).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&detect(&posts, &params, &table).unwrap()).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn groups_respect_size_threshold_and_window() {
    // A denser corpus: ten near-copies spread over time plus unrelated noise.
    let mut posts = Vec::new();
    for i in 0..10 {
        posts.push(post(&format!("copy{i}"), &format!("acct{}", i % 4), i * 400, "vote at noon"));
        posts.push(post(&format!("noise{i}"), "someone", i * 400 + 7, &format!("unrelated {i}")));
    }
    let scorer = |a: &str, b: &str| if a == b { 0.97 } else { 0.1 };
    let params = DetectionParams::new(900.0, 0.9).unwrap();
    let d = detect(&posts, &params, &scorer).unwrap();

    let by_id: HashMap<&str, &Post> = posts.iter().map(|p| (p.id.as_str(), p)).collect();
    for g in &d.groups {
        assert!(g.size >= 2);
        assert_eq!(g.size, g.posts.len());
        assert!(g.unique_authors <= g.size);
        for e in &g.edges {
            assert!(e.score >= params.similarity_threshold);
            let (s, t) = (by_id[e.source.as_str()], by_id[e.target.as_str()]);
            let delta = (t.created_at.unwrap() - s.created_at.unwrap()).num_seconds().abs();
            assert!(delta as f64 <= params.time_window_seconds);
        }
    }
    // Copies 400s apart chain into a single group; noise never pairs.
    assert_eq!(d.groups.len(), 1);
    assert_eq!(d.groups[0].size, 10);
    assert_eq!(d.groups[0].unique_authors, 4);
}

#[test]
fn dissimilar_or_distant_posts_yield_nothing() {
    let params = DetectionParams::new(60.0, 0.5).unwrap();

    let dissimilar = vec![post("a", "u1", 0, "x"), post("b", "u2", 1, "y"), post("c", "u3", 2, "z")];
    let zero = |_: &str, _: &str| 0.0;
    assert!(detect(&dissimilar, &params, &zero).unwrap().groups.is_empty());

    let distant = vec![post("a", "u1", 0, "x"), post("b", "u2", 1000, "x"), post("c", "u3", 5000, "x")];
    let one = |_: &str, _: &str| 1.0;
    let d = detect(&distant, &params, &one).unwrap();
    assert!(d.groups.is_empty());
    assert_eq!(d.metrics.total_groups, 0);
    assert_eq!(d.metrics.avg_group_size, 0.0);
}

#[test]
fn empty_input_for_any_valid_params() {
    for (w, t) in [(1.0, 1.0), (3600.0, 0.7), (86_400.0, 0.01)] {
        let params = DetectionParams::new(w, t).unwrap();
        let d = detect(&[], &params, &|_: &str, _: &str| 1.0).unwrap();
        assert!(d.groups.is_empty());
        assert_eq!(d.metrics.total_authors, 0);
        assert_eq!(d.metrics.authors_involved_percentage, 0.0);
    }
}
