//! Pairwise text similarity used to draw edges between posts.
//!
//! The detector only needs a score in `[0, 1]` for two texts, so scoring is
//! a trait. Closures work directly; [`TfIdfCosine`] is the default scorer
//! and [`TokenJaccard`] a cheaper alternative that needs no fitting.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scores how similar two post texts are, in `[0, 1]`.
pub trait TextSimilarityScorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

impl<F> TextSimilarityScorer for F
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn score(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}

/// Map any raw score into `[0, 1]`; NaN counts as no similarity.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Built-in scorer selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    TfIdf,
    Jaccard,
}

impl std::str::FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(ScorerKind::TfIdf),
            "jaccard" => Ok(ScorerKind::Jaccard),
            other => Err(format!("unknown scorer '{other}' (expected tfidf or jaccard)")),
        }
    }
}

// ── Tokenization ──────────────────────────────────────────────

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "he",
    "her", "his", "i", "if", "in", "into", "is", "it", "its", "me", "my", "not", "of", "on", "or",
    "our", "she", "so", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "to", "was", "we", "were", "what", "when", "which", "who", "will", "with", "you", "your",
];

/// Lowercased alphanumeric runs of at least two characters, minus stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Fallback for texts that yield no tokens (emoji, punctuation, stop words):
/// 1.0 when the trimmed, lowercased texts are equal and non-empty.
fn tokenless_match(a: &str, b: &str) -> f64 {
    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    if !a.is_empty() && a == b {
        1.0
    } else {
        0.0
    }
}

// ── TF-IDF cosine ─────────────────────────────────────────────

/// L2-normalized sparse vector, sorted by term so dot products sum in a fixed order.
type SparseVector = Vec<(String, f64)>;

/// Cosine similarity over TF-IDF vectors fitted on a corpus.
///
/// IDF uses the smoothed form `ln((1 + n) / (1 + df)) + 1`. Vectors for the
/// fitted texts are cached; other texts are vectorized on demand with the
/// same IDF table, unseen terms getting `df = 0`.
#[derive(Debug, Clone, Default)]
pub struct TfIdfCosine {
    idf: HashMap<String, f64>,
    unseen_idf: f64,
    vectors: HashMap<String, SparseVector>,
}

impl TfIdfCosine {
    pub fn fit<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let texts: Vec<&str> = texts.into_iter().collect();
        let n = texts.len() as f64;

        let token_lists: Vec<Vec<String>> = texts.par_iter().map(|t| tokenize(t)).collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &token_lists {
            let distinct: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in distinct {
                *df.entry(term).or_default() += 1;
            }
        }

        let idf: HashMap<String, f64> = df
            .into_iter()
            .map(|(term, count)| (term.to_string(), ((1.0 + n) / (1.0 + count as f64)).ln() + 1.0))
            .collect();

        let mut scorer = Self {
            idf,
            unseen_idf: (1.0 + n).ln() + 1.0,
            vectors: HashMap::new(),
        };

        let unique: BTreeSet<&str> = texts.iter().copied().collect();
        let unique: Vec<&str> = unique.into_iter().collect();
        let vectors: Vec<(String, SparseVector)> = unique
            .par_iter()
            .map(|t| (t.to_string(), scorer.vectorize(t)))
            .collect();
        scorer.vectors = vectors.into_iter().collect();

        debug!(
            "TF-IDF fitted - documents={}, vocabulary={}, cached_vectors={}",
            texts.len(),
            scorer.idf.len(),
            scorer.vectors.len()
        );
        scorer
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    fn vectorize(&self, text: &str) -> SparseVector {
        let mut tf: BTreeMap<String, f64> = BTreeMap::new();
        for token in tokenize(text) {
            *tf.entry(token).or_default() += 1.0;
        }

        let mut vector: SparseVector = tf
            .into_iter()
            .map(|(term, count)| {
                let idf = self.idf.get(&term).copied().unwrap_or(self.unseen_idf);
                (term, count * idf)
            })
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut vector {
                *w /= norm;
            }
        }
        vector
    }

    fn with_vector<R>(&self, text: &str, f: impl FnOnce(&SparseVector) -> R) -> R {
        match self.vectors.get(text) {
            Some(v) => f(v),
            None => f(&self.vectorize(text)),
        }
    }
}

impl TextSimilarityScorer for TfIdfCosine {
    fn score(&self, a: &str, b: &str) -> f64 {
        self.with_vector(a, |va| {
            self.with_vector(b, |vb| {
                if va.is_empty() && vb.is_empty() {
                    tokenless_match(a, b)
                } else {
                    clamp_score(sorted_dot(va, vb))
                }
            })
        })
    }
}

/// Dot product of two term-sorted sparse vectors (merge join).
fn sorted_dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

// ── Token Jaccard ─────────────────────────────────────────────

/// Jaccard overlap of token sets. Texts without tokens only match verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl TextSimilarityScorer for TokenJaccard {
    fn score(&self, a: &str, b: &str) -> f64 {
        let ta: BTreeSet<String> = tokenize(a).into_iter().collect();
        let tb: BTreeSet<String> = tokenize(b).into_iter().collect();
        let union = ta.union(&tb).count();
        if union == 0 {
            return tokenless_match(a, b);
        }
        ta.intersection(&tb).count() as f64 / union as f64
    }
}
