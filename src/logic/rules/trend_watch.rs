use super::{Rule, RuleContext};
use crate::models::Parameter;

/// Trend magnitude (percent) worth a monitoring note. Strictly greater than.
pub const TREND_NOTE_PERCENT: f64 = 10.0;

/// Short-term trend monitoring rule
///
/// Any parameter whose recent average moved more than 10% against the older
/// readings gets a note quoting the percentage.
pub struct TrendWatchRule;

impl Rule for TrendWatchRule {
    fn id(&self) -> &'static str {
        "tendencias"
    }

    fn name(&self) -> &'static str {
        "Trend Monitoring"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<String> {
        ctx.trends
            .iter()
            .filter(|(_, delta)| delta.abs() > TREND_NOTE_PERCENT)
            .map(|(&parameter, &delta)| {
                let icon = if delta >= 0.0 { "📈" } else { "📉" };
                format!(
                    "{} Tendencia de {}: {:.1}% - Monitorear de cerca.",
                    icon,
                    noun(parameter),
                    delta
                )
            })
            .collect()
    }
}

fn noun(parameter: Parameter) -> &'static str {
    match parameter {
        Parameter::Humedad => "humedad",
        Parameter::Ph => "pH",
        Parameter::Nitrogeno => "nitrógeno",
        Parameter::Temperatura => "temperatura",
    }
}
