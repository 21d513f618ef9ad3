mod narrative;
mod structured;

use crate::error::ReportError;
use crate::models::{AnalysisResult, Parcela, SensorReading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output format of an exported report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Machine-readable JSON document.
    #[default]
    Structured,
    /// Human-readable Markdown document.
    Narrative,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Structured => "structured",
            ReportFormat::Narrative => "narrative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "json" => Some(ReportFormat::Structured),
            "narrative" | "markdown" | "md" => Some(ReportFormat::Narrative),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Structured => "json",
            ReportFormat::Narrative => "md",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully rendered report, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub filename: String,
    pub format: ReportFormat,
    pub content: String,
}

/// Render `result` plus its source readings as a report document.
///
/// Fails without producing anything when the parcela metadata is incomplete
/// or does not match the analysis. Readings of other parcelas are left out.
pub fn format(
    parcela: &Parcela,
    result: &AnalysisResult,
    readings: &[SensorReading],
    format: ReportFormat,
    generated_at: DateTime<Utc>,
) -> Result<ExportedReport, ReportError> {
    validate(parcela, result)?;

    let own: Vec<&SensorReading> = readings
        .iter()
        .filter(|r| r.parcela_id == parcela.parcela_id)
        .collect();

    let content = match format {
        ReportFormat::Structured => structured::render(parcela, result, &own, generated_at)?,
        ReportFormat::Narrative => narrative::render(parcela, result, &own, generated_at)?,
    };

    Ok(ExportedReport {
        filename: filename(&parcela.parcela_id, format, generated_at),
        format,
        content,
    })
}

fn validate(parcela: &Parcela, result: &AnalysisResult) -> Result<(), ReportError> {
    if parcela.parcela_id.trim().is_empty() {
        return Err(ReportError::MissingMetadata("parcelaId"));
    }
    if parcela.nombre.trim().is_empty() {
        return Err(ReportError::MissingMetadata("nombre"));
    }
    if result.parcela_id != parcela.parcela_id {
        return Err(ReportError::ParcelaMismatch {
            analysis: result.parcela_id.clone(),
            parcela: parcela.parcela_id.clone(),
        });
    }
    Ok(())
}

/// `reporte-{id}-{YYYY-MM-DD}.{ext}`, with the id reduced to filename-safe characters.
pub fn filename(parcela_id: &str, format: ReportFormat, generated_at: DateTime<Utc>) -> String {
    let safe_id: String = parcela_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "reporte-{}-{}.{}",
        safe_id,
        generated_at.format("%Y-%m-%d"),
        format.extension()
    )
}

/// First and last reading timestamps.
pub(crate) fn period(readings: &[&SensorReading]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = readings.iter().map(|r| r.fecha).min()?;
    let last = readings.iter().map(|r| r.fecha).max()?;
    Some((first, last))
}
