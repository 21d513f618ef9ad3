pub mod config;
pub mod datasources;
pub mod db;
pub mod error;
pub mod logic;
pub mod models;
pub mod report;

pub use config::Config;
pub use db::Database;
pub use error::{AgroError, ReportError, Result};
pub use logic::{InsightEngine, InsightsService};
