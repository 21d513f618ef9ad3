pub mod aggregation;
pub mod alerts;
pub mod engine;
pub mod export_guard;
pub mod overview;
pub mod rules;
pub mod service;
pub mod status;
pub mod thresholds;
pub mod trends;

pub use engine::InsightEngine;
pub use export_guard::{ExportSlot, ExportTracker};
pub use service::InsightsService;
