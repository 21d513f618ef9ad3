use super::{parameter_guidance, ParameterMessages, Rule, RuleContext};
use crate::models::Parameter;

/// Temperature stress rule
///
/// Heat stress: shade or sprinkler irrigation to cool the canopy.
/// Cold stress: frost protection or cover crops.
pub struct TemperatureRule;

const MESSAGES: ParameterMessages = ParameterMessages {
    deficit: "🚨 Considerar protección contra heladas o cultivos de cobertura.",
    excess: "🚨 Implementar sombreado o riego por aspersión para reducir temperatura.",
    regular: "⚠️ Vigilar la temperatura y ajustar horarios de riego.",
};

impl Rule for TemperatureRule {
    fn id(&self) -> &'static str {
        "temperatura"
    }

    fn name(&self) -> &'static str {
        "Temperature Stress"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<String> {
        parameter_guidance(ctx, Parameter::Temperatura, &MESSAGES)
    }
}
