//! Corpus-level views over a filtered post set: volume over time, most
//! active authors, and the repost graph.

pub mod contributors;
pub mod network;
pub mod timeseries;

pub use contributors::{top_contributors, AuthorCount};
pub use network::{repost_network, NetworkLink, NetworkNode, RepostNetwork};
pub use timeseries::{daily_counts, DailyCount};
