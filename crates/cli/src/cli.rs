use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use chorus_compute::ScorerKind;
use chorus_core::PostFilter;

/// Query a post corpus for coordinated posting and basic activity analytics.
///
/// Every command prints JSON to stdout; logs go to stderr (see RUST_LOG).
#[derive(Parser, Debug)]
#[command(name = "chorus", version, about)]
pub struct CliArgs {
    /// JSONL corpus (overrides CHORUS_DATA_PATH)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find groups of similar posts published close together
    Detect {
        #[command(flatten)]
        filter: FilterArgs,

        /// Max seconds between two directly linked posts (default from DETECT_TIME_WINDOW)
        #[arg(long)]
        time_window: Option<f64>,

        /// Minimum similarity in (0, 1] for a direct link (default from DETECT_SIMILARITY_THRESHOLD)
        #[arg(long)]
        similarity_threshold: Option<f64>,

        /// Similarity scorer: tfidf or jaccard
        #[arg(long, default_value = "tfidf")]
        scorer: ScorerKind,
    },

    /// Posts per day
    Timeseries {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Most active authors
    Contributors {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of authors to list (default from TOP_CONTRIBUTORS_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Author repost graph
    Network {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text to match in title or body
    #[arg(long, default_value = "")]
    pub query: String,

    /// First day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> PostFilter {
        PostFilter::query(self.query.clone()).between(self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_detect_with_overrides() {
        let args = CliArgs::try_parse_from([
            "chorus",
            "--data",
            "posts.jsonl",
            "detect",
            "--query",
            "vote",
            "--time-window",
            "600",
            "--similarity-threshold",
            "0.85",
            "--scorer",
            "jaccard",
            "--start-date",
            "2024-03-01",
        ])
        .unwrap();

        assert_eq!(args.data, Some(PathBuf::from("posts.jsonl")));
        match args.command {
            Command::Detect { filter, time_window, similarity_threshold, scorer } => {
                assert_eq!(filter.query, "vote");
                assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(time_window, Some(600.0));
                assert_eq!(similarity_threshold, Some(0.85));
                assert_eq!(scorer, ScorerKind::Jaccard);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn detect_defaults() {
        let args = CliArgs::try_parse_from(["chorus", "detect"]).unwrap();
        match args.command {
            Command::Detect { filter, time_window, scorer, .. } => {
                assert!(filter.query.is_empty());
                assert!(time_window.is_none());
                assert_eq!(scorer, ScorerKind::TfIdf);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_date() {
        assert!(CliArgs::try_parse_from(["chorus", "timeseries", "--start-date", "March"]).is_err());
    }
}
