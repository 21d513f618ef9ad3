use super::{Rule, RuleContext};
use crate::models::Classification;

/// Positive reinforcement for crops whose profile carries an "optimal" message,
/// emitted only when the parcela as a whole is excellent. A crop analyzed
/// under the default profile gets no reinforcement.
pub struct CropPracticesRule;

impl Rule for CropPracticesRule {
    fn id(&self) -> &'static str {
        "practicas_cultivo"
    }

    fn name(&self) -> &'static str {
        "Crop Practices"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<String> {
        if !ctx.own_profile || ctx.evaluation.estado_general != Classification::Excelente {
            return Vec::new();
        }
        ctx.profile.mensaje_optimo.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::test_support::Fixture;
    use crate::models::CropType;

    #[test]
    fn excellent_maiz_is_reinforced() {
        let fx = Fixture::new(CropType::Maiz, 70.0, 6.5, 150.0, 25.0);
        assert_eq!(
            CropPracticesRule.evaluate(&fx.ctx()),
            vec!["✅ Condiciones óptimas para maíz. Continuar con manejo actual."]
        );
    }

    #[test]
    fn excellent_trigo_has_no_message() {
        let fx = Fixture::new(CropType::Trigo, 60.0, 7.0, 125.0, 20.0);
        assert_eq!(fx.evaluation.estado_general, Classification::Excelente);
        assert!(CropPracticesRule.evaluate(&fx.ctx()).is_empty());
    }

    #[test]
    fn unprofiled_crop_does_not_borrow_the_default_message() {
        let fx = Fixture::new(CropType::Other("Girasol".into()), 70.0, 6.5, 150.0, 25.0);
        assert!(!fx.own_profile);
        assert_eq!(fx.evaluation.estado_general, Classification::Excelente);
        assert!(CropPracticesRule.evaluate(&fx.ctx()).is_empty());
    }

    #[test]
    fn good_maiz_is_not_reinforced() {
        let fx = Fixture::new(CropType::Maiz, 62.0, 6.1, 125.0, 21.0);
        assert_eq!(fx.evaluation.estado_general, Classification::Bueno);
        assert!(CropPracticesRule.evaluate(&fx.ctx()).is_empty());
    }
}
