use super::{parameter_guidance, ParameterMessages, Rule, RuleContext};
use crate::models::Parameter;

/// Soil pH correction rule
///
/// Acidic soil gets agricultural lime, alkaline soil gets sulfur or organic
/// matter.
pub struct SoilPhRule;

const MESSAGES: ParameterMessages = ParameterMessages {
    deficit: "🚨 Aplicar cal agrícola para corregir acidez del suelo.",
    excess: "🚨 Aplicar azufre o materia orgánica para reducir alcalinidad.",
    regular: "⚠️ Monitorear el pH del suelo y planificar enmiendas graduales.",
};

impl Rule for SoilPhRule {
    fn id(&self) -> &'static str {
        "ph"
    }

    fn name(&self) -> &'static str {
        "Soil pH"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<String> {
        parameter_guidance(ctx, Parameter::Ph, &MESSAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::test_support::Fixture;
    use crate::models::CropType;

    #[test]
    fn acidic_soil_gets_lime() {
        let fx = Fixture::new(CropType::Maiz, 70.0, 4.5, 150.0, 25.0);
        assert_eq!(SoilPhRule.evaluate(&fx.ctx()), vec![MESSAGES.deficit]);
    }

    #[test]
    fn alkaline_soil_gets_sulfur() {
        let fx = Fixture::new(CropType::Maiz, 70.0, 8.6, 150.0, 25.0);
        assert_eq!(SoilPhRule.evaluate(&fx.ctx()), vec![MESSAGES.excess]);
    }

    #[test]
    fn slightly_off_is_regular() {
        let fx = Fixture::new(CropType::Trigo, 60.0, 6.2, 125.0, 20.0);
        assert_eq!(SoilPhRule.evaluate(&fx.ctx()), vec![MESSAGES.regular]);
    }
}
