use super::{parameter_guidance, ParameterMessages, Rule, RuleContext};
use crate::models::Parameter;

/// Soil moisture rule
///
/// Critical deficit calls for immediate irrigation, critical excess for
/// less irrigation and better drainage. A regular reading only asks to
/// tune the irrigation schedule.
pub struct MoistureRule;

const MESSAGES: ParameterMessages = ParameterMessages {
    deficit: "🚨 URGENTE: Aumentar riego inmediatamente. Humedad crítica.",
    excess: "🚨 URGENTE: Reducir riego y mejorar drenaje. Exceso de humedad.",
    regular: "⚠️ Ajustar programa de riego para optimizar humedad del suelo.",
};

impl Rule for MoistureRule {
    fn id(&self) -> &'static str {
        "humedad"
    }

    fn name(&self) -> &'static str {
        "Soil Moisture"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<String> {
        parameter_guidance(ctx, Parameter::Humedad, &MESSAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::test_support::Fixture;
    use crate::models::CropType;

    #[test]
    fn critical_deficit_asks_for_irrigation() {
        let fx = Fixture::new(CropType::Maiz, 20.0, 6.5, 150.0, 25.0);
        assert_eq!(MoistureRule.evaluate(&fx.ctx()), vec![MESSAGES.deficit]);
    }

    #[test]
    fn critical_excess_asks_for_drainage() {
        let fx = Fixture::new(CropType::Maiz, 99.0, 6.5, 150.0, 25.0);
        assert_eq!(MoistureRule.evaluate(&fx.ctx()), vec![MESSAGES.excess]);
    }

    #[test]
    fn direction_follows_crop_range_not_fixed_split() {
        // Arroz wants 80-95; 60 is a critical deficit even though it is above 50
        let fx = Fixture::new(CropType::Arroz, 60.0, 6.0, 175.0, 27.0);
        assert_eq!(MoistureRule.evaluate(&fx.ctx()), vec![MESSAGES.deficit]);
    }

    #[test]
    fn regular_gets_advisory() {
        let fx = Fixture::new(CropType::Maiz, 55.0, 6.5, 150.0, 25.0);
        assert_eq!(MoistureRule.evaluate(&fx.ctx()), vec![MESSAGES.regular]);
    }

    #[test]
    fn in_range_is_silent() {
        let fx = Fixture::new(CropType::Maiz, 78.0, 6.5, 150.0, 25.0);
        assert!(MoistureRule.evaluate(&fx.ctx()).is_empty());
    }
}
