pub mod category;
pub mod shapes;
pub mod ingest;
pub mod templates;
pub mod samples;
pub mod value_classifier;
pub mod context_classifier;
pub mod merger;
pub mod config;
pub mod discoverer;
pub mod discovery;

pub use category::{Category, ScoreMap};
pub use config::DiscoveryConfig;
pub use discoverer::{DiscoveryReport, VariableDiscoverer};
pub use ingest::{IngestError, IngestStats};
pub use merger::AliasSuggestions;
pub use templates::Position;
