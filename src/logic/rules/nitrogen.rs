use super::{parameter_guidance, ParameterMessages, Rule, RuleContext};
use crate::models::Parameter;

/// Nitrogen fertilization rule
pub struct NitrogenRule;

const MESSAGES: ParameterMessages = ParameterMessages {
    deficit: "🚨 Aplicar fertilizante nitrogenado urgentemente.",
    excess: "🚨 Suspender fertilización nitrogenada temporalmente.",
    regular: "⚠️ Revisar el plan de fertilización nitrogenada.",
};

impl Rule for NitrogenRule {
    fn id(&self) -> &'static str {
        "nitrogeno"
    }

    fn name(&self) -> &'static str {
        "Nitrogen"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<String> {
        parameter_guidance(ctx, Parameter::Nitrogeno, &MESSAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::test_support::Fixture;
    use crate::models::CropType;

    #[test]
    fn deficiency_calls_for_fertilizer() {
        let fx = Fixture::new(CropType::Soja, 65.0, 6.5, 50.0, 23.0);
        assert_eq!(NitrogenRule.evaluate(&fx.ctx()), vec![MESSAGES.deficit]);
    }

    #[test]
    fn surplus_suspends_fertilizer() {
        let fx = Fixture::new(CropType::Soja, 65.0, 6.5, 200.0, 23.0);
        assert_eq!(NitrogenRule.evaluate(&fx.ctx()), vec![MESSAGES.excess]);
    }

    #[test]
    fn optimal_is_silent() {
        let fx = Fixture::new(CropType::Soja, 65.0, 6.5, 100.0, 23.0);
        assert!(NitrogenRule.evaluate(&fx.ctx()).is_empty());
    }
}
