pub mod crop_practices;
pub mod engine;
pub mod moisture;
pub mod nitrogen;
pub mod soil_ph;
pub mod temperature;
pub mod trend_watch;

pub use engine::RecommendationEngine;

use crate::models::{Classification, CropThresholdProfile, CropType, Evaluation, Parameter};
use std::collections::BTreeMap;

/// Everything a rule may look at for one parcela.
pub struct RuleContext<'a> {
    pub cultivo: &'a CropType,
    pub profile: &'a CropThresholdProfile,
    /// False when `profile` is the default crop's, borrowed for an unprofiled crop.
    pub own_profile: bool,
    pub averages: &'a BTreeMap<Parameter, f64>,
    pub trends: &'a BTreeMap<Parameter, f64>,
    pub evaluation: &'a Evaluation,
}

impl RuleContext<'_> {
    /// Classification and average of a parameter, if it was evaluated.
    pub fn parameter(&self, parameter: Parameter) -> Option<(Classification, f64)> {
        let class = self.evaluation.get(parameter)?;
        let value = *self.averages.get(&parameter)?;
        Some((class, value))
    }

    /// Which side of the optimal range the average sits on.
    pub fn direction(&self, parameter: Parameter, value: f64) -> Direction {
        if value < self.profile.range(parameter).center() {
            Direction::Deficit
        } else {
            Direction::Excess
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Deficit,
    Excess,
}

/// Trait for agronomic recommendation rules
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate the rule; every returned message is emitted in order
    fn evaluate(&self, ctx: &RuleContext) -> Vec<String>;
}

/// Messages for a single-parameter rule.
pub(crate) struct ParameterMessages {
    pub deficit: &'static str,
    pub excess: &'static str,
    pub regular: &'static str,
}

/// Shared body of the per-parameter rules: urgent directional message when
/// critical, softer advisory when regular, nothing otherwise.
pub(crate) fn parameter_guidance(
    ctx: &RuleContext,
    parameter: Parameter,
    messages: &ParameterMessages,
) -> Vec<String> {
    let Some((class, value)) = ctx.parameter(parameter) else {
        return Vec::new();
    };

    let message = match class {
        Classification::Critico => match ctx.direction(parameter, value) {
            Direction::Deficit => messages.deficit,
            Direction::Excess => messages.excess,
        },
        Classification::Regular => messages.regular,
        Classification::Excelente | Classification::Bueno => return Vec::new(),
    };

    vec![message.to_string()]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::logic::{status, thresholds};
    use crate::models::CropProfiles;

    /// Owns the pieces a [`RuleContext`] borrows.
    pub struct Fixture {
        pub cultivo: CropType,
        pub profile: CropThresholdProfile,
        pub own_profile: bool,
        pub averages: BTreeMap<Parameter, f64>,
        pub trends: BTreeMap<Parameter, f64>,
        pub evaluation: Evaluation,
    }

    impl Fixture {
        pub fn new(cultivo: CropType, h: f64, ph: f64, n: f64, t: f64) -> Self {
            let profiles = CropProfiles::builtin();
            let own_profile = profiles.get(&cultivo).is_some();
            let profile = profiles.resolve(&cultivo).unwrap().clone();
            let averages = BTreeMap::from([
                (Parameter::Humedad, h),
                (Parameter::Ph, ph),
                (Parameter::Nitrogeno, n),
                (Parameter::Temperatura, t),
            ]);
            let evaluation = status::aggregate(thresholds::evaluate(&averages, &profile)).unwrap();
            Self {
                cultivo,
                profile,
                own_profile,
                averages,
                trends: BTreeMap::new(),
                evaluation,
            }
        }

        pub fn with_trend(mut self, parameter: Parameter, delta: f64) -> Self {
            self.trends.insert(parameter, delta);
            self
        }

        pub fn ctx(&self) -> RuleContext<'_> {
            RuleContext {
                cultivo: &self.cultivo,
                profile: &self.profile,
                own_profile: self.own_profile,
                averages: &self.averages,
                trends: &self.trends,
                evaluation: &self.evaluation,
            }
        }
    }
}
