use crate::models::{Classification, CropThresholdProfile, OptimalRange, Parameter};
use std::collections::BTreeMap;

/// Share of the range width around the center that still counts as excellent.
const EXCELLENT_TOLERANCE: f64 = 0.10;

/// Relative deviation (percent) beyond which an out-of-range value is critical.
const CRITICAL_DEVIATION_PERCENT: f64 = 20.0;

/// Classify a single value against its optimal range.
///
/// - inside the range (bounds included): `Excelente` near the center, else `Bueno`
/// - below/above: `Critico` when the relative deficit/excess exceeds 20%, else `Regular`
pub fn classify(value: f64, range: OptimalRange) -> Classification {
    if range.contains(value) {
        let tolerance = (range.max - range.min) * EXCELLENT_TOLERANCE;
        if (value - range.center()).abs() <= tolerance {
            Classification::Excelente
        } else {
            Classification::Bueno
        }
    } else if value < range.min {
        deviation_class(range.min - value, range.min)
    } else {
        deviation_class(value - range.max, range.max)
    }
}

fn deviation_class(distance: f64, reference: f64) -> Classification {
    // A zero bound leaves no relative scale; any miss is unbounded.
    if reference == 0.0 {
        return Classification::Critico;
    }
    let deviation = distance * 100.0 / reference.abs();
    if deviation > CRITICAL_DEVIATION_PERCENT {
        Classification::Critico
    } else {
        Classification::Regular
    }
}

/// Classify every averaged parameter against the crop profile.
pub fn evaluate(
    averages: &BTreeMap<Parameter, f64>,
    profile: &CropThresholdProfile,
) -> BTreeMap<Parameter, Classification> {
    averages
        .iter()
        .map(|(&parameter, &value)| (parameter, classify(value, profile.range(parameter))))
        .collect()
}
