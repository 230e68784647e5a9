pub mod algorithms;
pub mod analytics;
pub mod engine;
pub mod similarity;

pub use algorithms::coordination::{
    detect, CoordinatedGroup, Detection, DetectionMetrics, DetectionParams, SimilarityEdge,
};
pub use engine::AnalysisEngine;
pub use similarity::{ScorerKind, TextSimilarityScorer, TfIdfCosine, TokenJaccard};
