use std::time::Instant;

use tracing::info;

use chorus_core::{ChorusResult, DatasetStore, Post, PostFilter};

use crate::algorithms::coordination::{self, Detection, DetectionParams};
use crate::analytics::{self, AuthorCount, DailyCount, RepostNetwork};
use crate::similarity::{ScorerKind, TfIdfCosine, TokenJaccard};

/// Runs corpus analyses against a loaded dataset.
///
/// Every call filters the corpus afresh; nothing is cached between calls.
pub struct AnalysisEngine {
    store: DatasetStore,
}

impl AnalysisEngine {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    fn select(&self, filter: &PostFilter) -> Vec<Post> {
        let posts = self.store.filter(filter);
        info!(
            "Selected {} of {} posts (query={:?})",
            posts.len(),
            self.store.len(),
            filter.query
        );
        posts
    }

    /// Filter, then detect coordinated groups with the chosen scorer. The
    /// TF-IDF scorer is fitted only on the filtered posts detection will
    /// consider, so skipped posts never shape the IDF table.
    pub fn coordinated_groups(
        &self,
        filter: &PostFilter,
        params: &DetectionParams,
        scorer: ScorerKind,
    ) -> ChorusResult<Detection> {
        params.validate()?;
        let posts = self.select(filter);
        let start = Instant::now();

        let detection = match scorer {
            ScorerKind::TfIdf => {
                let fitted = fit_tfidf(&posts);
                coordination::detect(&posts, params, &fitted)?
            }
            ScorerKind::Jaccard => coordination::detect(&posts, params, &TokenJaccard)?,
        };

        info!(
            "Coordinated groups computed in {:.2}s - {} groups",
            start.elapsed().as_secs_f64(),
            detection.groups.len()
        );
        Ok(detection)
    }

    pub fn timeseries(&self, filter: &PostFilter) -> Vec<DailyCount> {
        analytics::daily_counts(&self.select(filter))
    }

    pub fn top_contributors(&self, filter: &PostFilter, limit: usize) -> Vec<AuthorCount> {
        analytics::top_contributors(&self.select(filter), limit)
    }

    pub fn repost_network(&self, filter: &PostFilter) -> RepostNetwork {
        analytics::repost_network(&self.select(filter))
    }
}

fn fit_tfidf(posts: &[Post]) -> TfIdfCosine {
    let (valid, _) = coordination::well_formed(posts);
    let texts: Vec<String> = valid.iter().map(|(p, _)| p.text()).collect();
    TfIdfCosine::fit(texts.iter().map(String::as_str))
}
