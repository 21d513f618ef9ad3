use crate::models::{Classification, Evaluation, Parameter};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationCounts {
    pub excelente: usize,
    pub bueno: usize,
    pub regular: usize,
    pub critico: usize,
}

impl ClassificationCounts {
    pub fn tally<'a>(classes: impl IntoIterator<Item = &'a Classification>) -> Self {
        let mut counts = Self::default();
        for class in classes {
            match class {
                Classification::Excelente => counts.excelente += 1,
                Classification::Bueno => counts.bueno += 1,
                Classification::Regular => counts.regular += 1,
                Classification::Critico => counts.critico += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.excelente + self.bueno + self.regular + self.critico
    }
}

/// Overall status from the per-parameter mix.
///
/// Rules are checked in this exact order and the first match wins:
/// 1. any critical parameter
/// 2. more than one regular
/// 3. at least two good
/// 4. at least three excellent
/// 5. otherwise good
///
/// Note that 3 excellent + 1 good still lands on rule 4, while
/// 2 excellent + 2 good stops at rule 3.
pub fn overall_status(counts: &ClassificationCounts) -> Classification {
    if counts.critico > 0 {
        Classification::Critico
    } else if counts.regular > 1 {
        Classification::Regular
    } else if counts.bueno >= 2 {
        Classification::Bueno
    } else if counts.excelente >= 3 {
        Classification::Excelente
    } else {
        Classification::Bueno
    }
}

/// Weighted mean on the 1..=4 scale over the classified parameters.
pub fn score(counts: &ClassificationCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    let weighted: u32 = [
        (Classification::Excelente, counts.excelente),
        (Classification::Bueno, counts.bueno),
        (Classification::Regular, counts.regular),
        (Classification::Critico, counts.critico),
    ]
    .iter()
    .map(|(class, n)| class.score() * *n as u32)
    .sum();
    weighted as f64 / total as f64
}

/// Combine per-parameter classifications into an [`Evaluation`].
///
/// Returns `None` when nothing was classified.
pub fn aggregate(parameters: BTreeMap<Parameter, Classification>) -> Option<Evaluation> {
    if parameters.is_empty() {
        return None;
    }
    let counts = ClassificationCounts::tally(parameters.values());
    Some(Evaluation {
        estado_general: overall_status(&counts),
        puntuacion: score(&counts),
        parameters,
    })
}
