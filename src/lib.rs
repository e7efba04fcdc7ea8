// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod alerts;
pub mod api;
pub mod article;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod fusion;
pub mod lexicon;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod snapshot;
pub mod status;
pub mod topics;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{Article, ArticleKey, RawArticle, ScoredArticle};
pub use crate::error::{Result, SentimentError};
pub use crate::fusion::{FusedScore, FusionEngine};
pub use crate::pipeline::{run_cycle, IngestReport};
pub use crate::snapshot::Snapshot;
