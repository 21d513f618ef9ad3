use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgroError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Export already in progress for parcela {0}")]
    ExportInProgress(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Failures while turning an analysis into an exportable document.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("missing parcela metadata: {0}")]
    MissingMetadata(&'static str),

    #[error("analysis belongs to parcela {analysis} but metadata is for {parcela}")]
    ParcelaMismatch { analysis: String, parcela: String },

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to render report: {0}")]
    Rendering(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, AgroError>;
