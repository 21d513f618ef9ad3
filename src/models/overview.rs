use super::analysis::AnalysisResult;
use super::reading::Parameter;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fleet-wide statistics across every parcela.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStats {
    pub total_parcelas: usize,
    pub total_lecturas: usize,
    pub distribucion_cultivos: BTreeMap<String, usize>,
    pub distribucion_estados: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub promedios_generales: BTreeMap<Parameter, f64>,
}

/// What the insights listing returns: general statistics first, then one
/// analysis per parcela that had readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsOverview {
    pub estadisticas: GeneralStats,
    pub parcelas: Vec<AnalysisResult>,
}
