use super::rules::{RecommendationEngine, RuleContext};
use super::trends::TrendAnalyzer;
use super::{aggregation, alerts, status, thresholds};
use crate::models::{AnalysisResult, CropProfiles, OverallStatus, Parcela, SensorReading};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub const INSUFFICIENT_SUMMARY: &str = "No hay datos suficientes para realizar análisis";
pub const INSUFFICIENT_RECOMMENDATION: &str = "Generar más datos de sensores";

/// Turns a parcela's reading history into an [`AnalysisResult`].
///
/// Pure apart from reading the clock in [`InsightEngine::analyze`]; share it
/// freely across tasks.
pub struct InsightEngine {
    profiles: Arc<CropProfiles>,
    trends: TrendAnalyzer,
    recommendations: RecommendationEngine,
}

impl InsightEngine {
    pub fn new(profiles: Arc<CropProfiles>, trend_recent_days: i64) -> Self {
        Self {
            profiles,
            trends: TrendAnalyzer::new(trend_recent_days),
            recommendations: RecommendationEngine::new(),
        }
    }

    pub fn profiles(&self) -> &CropProfiles {
        &self.profiles
    }

    pub fn analyze(&self, parcela: &Parcela, readings: &[SensorReading]) -> AnalysisResult {
        self.analyze_at(parcela, readings, Utc::now())
    }

    /// Analysis with an explicit "now", which anchors the trend window and
    /// stamps `fechaAnalisis`.
    pub fn analyze_at(
        &self,
        parcela: &Parcela,
        readings: &[SensorReading],
        now: DateTime<Utc>,
    ) -> AnalysisResult {
        let own = own_readings(parcela, readings);

        let averages = aggregation::averages(&own);
        if averages.is_empty() {
            debug!(parcela = %parcela.parcela_id, readings = own.len(), "Nothing to analyze");
            return insufficient(parcela, own.len(), now);
        }

        // Non-empty averages always leave a classifiable parameter, unless the
        // profile table was never validated.
        let Some(crop_profile) = self.profiles.resolve(&parcela.tipo_cultivo) else {
            warn!(crop = %parcela.tipo_cultivo, "No crop profile available");
            return insufficient(parcela, own.len(), now);
        };
        let profile = crop_profile.with_overrides(&parcela.rangos_optimos);
        let Some(evaluation) = status::aggregate(thresholds::evaluate(&averages, &profile)) else {
            return insufficient(parcela, own.len(), now);
        };

        let tendencias = self.trends.analyze(&own, now);

        let recomendaciones = self.recommendations.evaluate(&RuleContext {
            cultivo: &parcela.tipo_cultivo,
            profile: &profile,
            own_profile: self.profiles.get(&parcela.tipo_cultivo).is_some(),
            averages: &averages,
            trends: &tendencias,
            evaluation: &evaluation,
        });
        let alertas = alerts::generate(&averages, &tendencias);

        debug!(
            parcela = %parcela.parcela_id,
            estado = %evaluation.estado_general,
            puntuacion = evaluation.puntuacion,
            "Parcela analyzed"
        );

        AnalysisResult {
            parcela_id: parcela.parcela_id.clone(),
            cultivo: parcela.tipo_cultivo.clone(),
            total_lecturas: own.len(),
            resumen: format!(
                "Análisis de {} lecturas para parcela {} ({})",
                own.len(),
                parcela.nombre,
                parcela.tipo_cultivo
            ),
            promedios: averages,
            tendencias,
            estado: evaluation.estado_general.into(),
            evaluacion: Some(evaluation),
            recomendaciones,
            alertas,
            fecha_analisis: now,
        }
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new(Arc::new(CropProfiles::builtin()), super::trends::DEFAULT_RECENT_DAYS)
    }
}

fn own_readings(parcela: &Parcela, readings: &[SensorReading]) -> Vec<SensorReading> {
    let (own, foreign): (Vec<_>, Vec<_>) = readings
        .iter()
        .cloned()
        .partition(|r| r.parcela_id == parcela.parcela_id);

    if !foreign.is_empty() {
        warn!(
            parcela = %parcela.parcela_id,
            dropped = foreign.len(),
            "Ignoring readings that belong to other parcelas"
        );
    }
    own
}

fn insufficient(parcela: &Parcela, total: usize, now: DateTime<Utc>) -> AnalysisResult {
    AnalysisResult {
        parcela_id: parcela.parcela_id.clone(),
        cultivo: parcela.tipo_cultivo.clone(),
        total_lecturas: total,
        resumen: INSUFFICIENT_SUMMARY.to_string(),
        promedios: BTreeMap::new(),
        tendencias: BTreeMap::new(),
        evaluacion: None,
        recomendaciones: vec![INSUFFICIENT_RECOMMENDATION.to_string()],
        alertas: Vec::new(),
        estado: OverallStatus::Insuficiente,
        fecha_analisis: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertKind, Classification, CropType, Parameter};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn maiz() -> Parcela {
        Parcela::new("PAR-001", "Lote Norte", CropType::Maiz)
    }

    fn reading(days_ago: i64, h: f64, ph: f64, n: f64, t: f64) -> SensorReading {
        SensorReading::new("PAR-001", now() - Duration::days(days_ago)).with_values(h, ph, n, t)
    }

    #[test]
    fn empty_history_is_insufficient() {
        let result = InsightEngine::default().analyze_at(&maiz(), &[], now());
        assert!(result.is_insufficient());
        assert_eq!(result.resumen, INSUFFICIENT_SUMMARY);
        assert_eq!(result.recomendaciones, vec![INSUFFICIENT_RECOMMENDATION]);
        assert!(result.evaluacion.is_none());
        assert!(result.alertas.is_empty());
    }

    #[test]
    fn readings_without_values_are_insufficient() {
        let readings = vec![SensorReading::new("PAR-001", now())];
        let result = InsightEngine::default().analyze_at(&maiz(), &readings, now());
        assert!(result.is_insufficient());
        assert_eq!(result.total_lecturas, 1);
    }

    #[test]
    fn optimal_maiz_is_excellent() {
        let readings = vec![reading(1, 70.0, 6.5, 150.0, 25.0)];
        let result = InsightEngine::default().analyze_at(&maiz(), &readings, now());

        assert_eq!(result.estado, OverallStatus::Excelente);
        for p in Parameter::ALL {
            assert_eq!(result.classification(p), Some(Classification::Excelente));
        }
        let evaluation = result.evaluacion.as_ref().unwrap();
        assert!((evaluation.puntuacion - 4.0).abs() < 1e-9);
        assert!(result.alertas.is_empty());
        assert_eq!(
            result.recomendaciones,
            vec!["✅ Condiciones óptimas para maíz. Continuar con manejo actual."]
        );
        assert_eq!(
            result.resumen,
            "Análisis de 1 lecturas para parcela Lote Norte (Maíz)"
        );
    }

    #[test]
    fn dry_maiz_is_critical_with_alert() {
        let readings = vec![reading(1, 20.0, 6.5, 150.0, 25.0)];
        let result = InsightEngine::default().analyze_at(&maiz(), &readings, now());

        assert_eq!(result.estado, OverallStatus::Critico);
        assert_eq!(result.classification(Parameter::Humedad), Some(Classification::Critico));
        assert!(result.recomendaciones[0].contains("Aumentar riego"));
        assert!(result
            .alertas
            .iter()
            .any(|a| a.tipo == AlertKind::Critico && a.parametro == Parameter::Humedad));
    }

    #[test]
    fn ph_trend_of_fifteen_percent_notes_but_does_not_alert() {
        let readings = vec![
            reading(6, 70.0, 6.0, 150.0, 25.0),
            reading(5, 70.0, 6.0, 150.0, 25.0),
            reading(1, 70.0, 6.9, 150.0, 25.0),
        ];
        let result = InsightEngine::default().analyze_at(&maiz(), &readings, now());

        assert_eq!(result.tendencias.get(&Parameter::Ph), Some(&15.0));
        assert!(result
            .recomendaciones
            .iter()
            .any(|r| r.contains("Tendencia de pH: 15.0%")));
        assert!(!result.alertas.iter().any(|a| a.tipo == AlertKind::Tendencia));
    }

    #[test]
    fn foreign_readings_are_dropped() {
        let readings = vec![
            reading(1, 70.0, 6.5, 150.0, 25.0),
            SensorReading::new("PAR-999", now()).with_values(10.0, 3.0, 10.0, 50.0),
        ];
        let result = InsightEngine::default().analyze_at(&maiz(), &readings, now());
        assert_eq!(result.total_lecturas, 1);
        assert_eq!(result.estado, OverallStatus::Excelente);
    }

    #[test]
    fn missing_parameter_is_not_classified() {
        let mut r = reading(1, 70.0, 6.5, 150.0, 25.0);
        r.nitrogeno = None;
        let result = InsightEngine::default().analyze_at(&maiz(), &[r], now());

        assert_eq!(result.classification(Parameter::Nitrogeno), None);
        assert!(!result.promedios.contains_key(&Parameter::Nitrogeno));
        // three excellent parameters still reach rule 4
        assert_eq!(result.estado, OverallStatus::Excelente);
    }

    #[test]
    fn unknown_crop_uses_default_profile() {
        let girasol = Parcela::new("PAR-001", "Lote Sur", CropType::Other("Girasol".into()));
        let readings = vec![reading(1, 70.0, 6.5, 150.0, 25.0)];
        let result = InsightEngine::default().analyze_at(&girasol, &readings, now());
        assert_eq!(result.estado, OverallStatus::Excelente);
        assert_eq!(result.cultivo, CropType::Other("Girasol".into()));
        // Maíz ranges apply, its reinforcement message does not
        assert_eq!(
            result.recomendaciones,
            vec![crate::logic::rules::engine::FALLBACK_RECOMMENDATION]
        );
    }

    #[test]
    fn parcela_ranges_take_precedence_over_the_crop() {
        use crate::models::{OptimalRange, RangeOverrides};
        // 98% moisture is critical for maize but centered in this parcela's range
        let readings = vec![reading(1, 98.0, 6.5, 150.0, 25.0)];
        let engine = InsightEngine::default();
        assert_eq!(
            engine.analyze_at(&maiz(), &readings, now()).classification(Parameter::Humedad),
            Some(Classification::Critico)
        );

        let bajo = maiz().with_rangos_optimos(RangeOverrides {
            humedad: Some(OptimalRange::new(96.0, 100.0)),
            ..Default::default()
        });
        let result = engine.analyze_at(&bajo, &readings, now());
        assert_eq!(result.classification(Parameter::Humedad), Some(Classification::Excelente));
        assert_eq!(result.estado, OverallStatus::Excelente);
        assert!(!result.recomendaciones.iter().any(|r| r.contains("riego")));
    }

    #[test]
    fn analysis_is_idempotent_for_a_fixed_clock() {
        let readings = vec![
            reading(6, 55.0, 6.2, 110.0, 19.0),
            reading(2, 62.0, 6.8, 140.0, 27.0),
        ];
        let engine = InsightEngine::default();
        assert_eq!(
            engine.analyze_at(&maiz(), &readings, now()),
            engine.analyze_at(&maiz(), &readings, now())
        );
    }
}
