use super::engine::InsightEngine;
use super::export_guard::{ExportSlot, ExportTracker};
use super::overview;
use crate::config::{AnalysisConfig, Config};
use crate::db::Database;
use crate::error::{AgroError, Result};
use crate::models::{AnalysisResult, InsightsOverview, Parcela};
use crate::report::{self, ExportedReport, ReportFormat};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Wires the reading store, the engine and the export tracker together.
///
/// Cheap to clone; clones share the store connection and the in-flight set.
#[derive(Clone)]
pub struct InsightsService {
    db: Database,
    engine: Arc<InsightEngine>,
    tracker: ExportTracker,
    windows: AnalysisConfig,
}

impl InsightsService {
    pub fn new(config: &Config, db: Database) -> Self {
        let engine = InsightEngine::new(
            Arc::new(config.crop_profiles.clone()),
            config.analysis.trend_recent_days,
        );
        Self {
            db,
            engine: Arc::new(engine),
            tracker: ExportTracker::new(),
            windows: config.analysis.clone(),
        }
    }

    pub fn tracker(&self) -> &ExportTracker {
        &self.tracker
    }

    pub fn general_insights(&self) -> Result<InsightsOverview> {
        self.general_insights_at(Utc::now())
    }

    /// Fleet statistics plus one analysis per parcela with recent readings.
    pub fn general_insights_at(&self, now: DateTime<Utc>) -> Result<InsightsOverview> {
        let parcelas = self.db.list_parcelas()?;
        let readings = self
            .db
            .readings_between(now - Duration::days(self.windows.insight_window_days), now)?;

        Ok(overview::overview(&self.engine, &parcelas, &readings, now))
    }

    pub fn parcela_insights(&self, parcela_id: &str) -> Result<AnalysisResult> {
        self.parcela_insights_at(parcela_id, Utc::now())
    }

    pub fn parcela_insights_at(&self, parcela_id: &str, now: DateTime<Utc>) -> Result<AnalysisResult> {
        let parcela = self.parcela(parcela_id)?;
        let readings = self.db.readings_for_parcela_between(
            parcela_id,
            now - Duration::days(self.windows.insight_window_days),
            now,
        )?;

        Ok(self.engine.analyze_at(&parcela, &readings, now))
    }

    /// Analyzes the export window and renders it, without touching the filesystem.
    pub fn render_report(
        &self,
        parcela_id: &str,
        format: ReportFormat,
        now: DateTime<Utc>,
    ) -> Result<ExportedReport> {
        let parcela = self.parcela(parcela_id)?;
        let readings = self.db.readings_for_parcela_between(
            parcela_id,
            now - Duration::days(self.windows.export_window_days),
            now,
        )?;

        let result = self.engine.analyze_at(&parcela, &readings, now);
        Ok(report::format(&parcela, &result, &readings, format, now)?)
    }

    /// Renders and writes a report into `out_dir`, returning the file path.
    ///
    /// Fails with [`AgroError::ExportInProgress`] while another export of the
    /// same parcela is running.
    pub async fn export(
        &self,
        parcela_id: &str,
        format: ReportFormat,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let slot = self.claim_export(parcela_id)?;
        self.export_claimed(slot, format, out_dir).await
    }

    pub fn claim_export(&self, parcela_id: &str) -> Result<ExportSlot> {
        self.tracker
            .try_acquire(parcela_id)
            .ok_or_else(|| AgroError::ExportInProgress(parcela_id.to_string()))
    }

    /// Export under a slot claimed earlier; the slot is released on return.
    pub async fn export_claimed(
        &self,
        slot: ExportSlot,
        format: ReportFormat,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let parcela_id = slot.parcela_id();
        let report = self.render_report(parcela_id, format, Utc::now())?;

        tokio::fs::create_dir_all(out_dir).await?;
        let path = out_dir.join(&report.filename);
        tokio::fs::write(&path, report.content.as_bytes()).await?;

        info!(
            parcela = %parcela_id,
            format = %format,
            path = %path.display(),
            "Report exported"
        );
        Ok(path)
    }

    fn parcela(&self, parcela_id: &str) -> Result<Parcela> {
        self.db
            .get_parcela(parcela_id)?
            .ok_or_else(|| AgroError::NotFound(format!("parcela {}", parcela_id)))
    }
}
