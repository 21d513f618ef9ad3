use super::{
    crop_practices::CropPracticesRule, moisture::MoistureRule, nitrogen::NitrogenRule,
    soil_ph::SoilPhRule, temperature::TemperatureRule, trend_watch::TrendWatchRule, Rule,
    RuleContext,
};

pub const FALLBACK_RECOMMENDATION: &str =
    "✅ Condiciones dentro de rangos aceptables. Mantener monitoreo regular.";

/// Runs every rule in a fixed order and concatenates what they emit.
pub struct RecommendationEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(MoistureRule),
            Box::new(SoilPhRule),
            Box::new(NitrogenRule),
            Box::new(TemperatureRule),
            Box::new(TrendWatchRule),
            Box::new(CropPracticesRule),
        ];

        Self { rules }
    }

    pub fn evaluate(&self, ctx: &RuleContext) -> Vec<String> {
        let mut recommendations: Vec<String> = self
            .rules
            .iter()
            .flat_map(|rule| rule.evaluate(ctx))
            .collect();

        if recommendations.is_empty() {
            recommendations.push(FALLBACK_RECOMMENDATION.to_string());
        }

        recommendations
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::test_support::Fixture;
    use crate::models::{CropType, Parameter};

    #[test]
    fn fallback_when_nothing_fires() {
        let fx = Fixture::new(CropType::Maiz, 62.0, 6.1, 125.0, 21.0);
        assert_eq!(
            RecommendationEngine::new().evaluate(&fx.ctx()),
            vec![FALLBACK_RECOMMENDATION]
        );
    }

    #[test]
    fn all_matching_rules_contribute_in_order() {
        let fx = Fixture::new(CropType::Maiz, 20.0, 4.5, 150.0, 38.0)
            .with_trend(Parameter::Humedad, -25.0);
        let recs = RecommendationEngine::new().evaluate(&fx.ctx());
        assert_eq!(recs.len(), 4);
        assert!(recs[0].contains("Aumentar riego"));
        assert!(recs[1].contains("cal agrícola"));
        assert!(recs[2].contains("sombreado"));
        assert!(recs[3].contains("Tendencia de humedad: -25.0%"));
        assert!(!recs.iter().any(|r| r == FALLBACK_RECOMMENDATION));
    }

    #[test]
    fn reinforcement_counts_as_a_fired_rule() {
        let fx = Fixture::new(CropType::Maiz, 70.0, 6.5, 150.0, 25.0);
        let recs = RecommendationEngine::new().evaluate(&fx.ctx());
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("Condiciones óptimas para maíz"));
    }

    #[test]
    fn rules_are_listed_in_evaluation_order() {
        let ids: Vec<_> = RecommendationEngine::new()
            .list_rules()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(
            ids,
            vec!["humedad", "ph", "nitrogeno", "temperatura", "tendencias", "practicas_cultivo"]
        );
    }
}
