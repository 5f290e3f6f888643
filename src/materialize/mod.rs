//! Response-to-document materialization
//!
//! ```text
//! response ──► ContentClassifier ──► TabularParser ─────┐
//!                     │         ├──► SlideDeckParser ───┤
//!                     │         └──► ChartIntentDetector┤
//!                     └─────────────── (plain text) ────┴──► HostWriter ──► HostDocument
//! ```
//!
//! Classification is partitioned by host: spreadsheets get formulas, charts
//! or grids; presentations get slides; everything else gets text.

pub mod chart;
pub mod classifier;
pub mod lines;
pub mod pipeline;
pub mod slides;
pub mod tabular;
pub mod types;
pub mod writer;

pub use chart::ChartIntentDetector;
pub use classifier::ContentClassifier;
pub use pipeline::MaterializationPipeline;
pub use slides::SlideDeckParser;
pub use tabular::TabularParser;
pub use types::*;
pub use writer::HostWriter;
