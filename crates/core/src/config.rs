use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub dataset: DatasetConfig,
    pub detection: DetectionConfig,
    pub analytics: AnalyticsConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CHORUS_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CHORUS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            dataset: DatasetConfig::from_env_profiled(p),
            detection: DetectionConfig::from_env_profiled(p),
            analytics: AnalyticsConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  dataset:     path={}", self.dataset.path.display());
        tracing::info!(
            "  detection:   time_window={}s, similarity_threshold={}",
            self.detection.time_window_seconds,
            self.detection.similarity_threshold
        );
        tracing::info!("  analytics:   top_contributors={}", self.analytics.top_contributors_limit);
    }
}

// ── Dataset ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// JSONL corpus, one post per line.
    pub path: PathBuf,
}

impl DatasetConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: PathBuf::from(profiled_env_or(p, "CHORUS_DATA_PATH", "data/posts.jsonl")),
        }
    }
}

// ── Coordinated-group detection ───────────────────────────────

pub const DEFAULT_TIME_WINDOW_SECONDS: f64 = 3600.0;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub time_window_seconds: f64,
    pub similarity_threshold: f64,
}

impl DetectionConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            time_window_seconds: profiled_env_f64(p, "DETECT_TIME_WINDOW", DEFAULT_TIME_WINDOW_SECONDS),
            similarity_threshold: profiled_env_f64(
                p,
                "DETECT_SIMILARITY_THRESHOLD",
                DEFAULT_SIMILARITY_THRESHOLD,
            ),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            time_window_seconds: DEFAULT_TIME_WINDOW_SECONDS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

// ── Analytics ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub top_contributors_limit: usize,
}

impl AnalyticsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_contributors_limit: profiled_env_usize(p, "TOP_CONTRIBUTORS_LIMIT", 10),
        }
    }
}
