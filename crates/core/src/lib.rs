pub mod config;
pub mod dataset;
pub mod error;
pub mod post;

pub use config::Config;
pub use dataset::{DatasetStore, LoadStats, PostFilter};
pub use error::*;
pub use post::*;
