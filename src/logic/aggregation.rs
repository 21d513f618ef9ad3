use crate::models::{Parameter, SensorReading};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean of one parameter over the readings that reported it.
pub fn average<'a>(
    readings: impl IntoIterator<Item = &'a SensorReading>,
    parameter: Parameter,
) -> Option<f64> {
    let values: Vec<f64> = readings
        .into_iter()
        .filter_map(|r| r.value(parameter))
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Full-precision averages for every parameter that has at least one value.
pub fn averages(readings: &[SensorReading]) -> BTreeMap<Parameter, f64> {
    Parameter::ALL
        .iter()
        .filter_map(|&p| average(readings, p).map(|avg| (p, avg)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterStats {
    pub promedio: f64,
    pub min: f64,
    pub max: f64,
    pub muestras: usize,
}

/// Mean, minimum and maximum per parameter, rounded to two decimals.
pub fn basic_stats(readings: &[SensorReading]) -> BTreeMap<Parameter, ParameterStats> {
    let mut stats = BTreeMap::new();

    for parameter in Parameter::ALL {
        let values: Vec<f64> = readings
            .iter()
            .filter_map(|r| r.value(parameter))
            .collect();

        if values.is_empty() {
            continue;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        stats.insert(
            parameter,
            ParameterStats {
                promedio: round_to(mean, 2),
                min: round_to(min, 2),
                max: round_to(max, 2),
                muestras: values.len(),
            },
        );
    }

    stats
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(h: f64, ph: f64, n: f64, t: f64) -> SensorReading {
        SensorReading::new("PAR-001", Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap())
            .with_values(h, ph, n, t)
    }

    #[test]
    fn averages_are_arithmetic_means() {
        let readings = vec![
            reading(60.0, 6.2, 140.0, 22.0),
            reading(70.0, 6.6, 150.0, 25.0),
            reading(80.0, 6.7, 163.0, 28.3),
        ];
        let avgs = averages(&readings);
        assert!((avgs[&Parameter::Humedad] - 70.0).abs() < 1e-6);
        assert!((avgs[&Parameter::Ph] - 19.5 / 3.0).abs() < 1e-6);
        assert!((avgs[&Parameter::Nitrogeno] - 151.0).abs() < 1e-6);
        assert!((avgs[&Parameter::Temperatura] - 75.3 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn missing_values_are_excluded_not_zeroed() {
        let mut partial = reading(0.0, 0.0, 0.0, 0.0);
        partial.humedad = None;
        partial.ph = Some(7.0);
        partial.nitrogeno = None;
        partial.temperatura = None;

        let readings = vec![reading(60.0, 6.0, 120.0, 20.0), partial];
        let avgs = averages(&readings);
        assert!((avgs[&Parameter::Humedad] - 60.0).abs() < 1e-9);
        assert!((avgs[&Parameter::Ph] - 6.5).abs() < 1e-9);
    }

    #[test]
    fn parameter_without_values_is_absent() {
        let mut r = SensorReading::new("PAR-001", Utc::now());
        r.humedad = Some(55.0);
        let avgs = averages(&[r]);
        assert_eq!(avgs.len(), 1);
        assert!(avgs.contains_key(&Parameter::Humedad));
        assert!(average(&[] as &[SensorReading], Parameter::Ph).is_none());
    }

    #[test]
    fn basic_stats_min_max() {
        let readings = vec![
            reading(45.123, 6.0, 100.0, 15.0),
            reading(75.456, 7.0, 200.0, 35.0),
        ];
        let stats = basic_stats(&readings);
        let humedad = stats[&Parameter::Humedad];
        assert_eq!(humedad.min, 45.12);
        assert_eq!(humedad.max, 75.46);
        assert_eq!(humedad.muestras, 2);
        assert!((stats[&Parameter::Temperatura].promedio - 25.0).abs() < 1e-9);
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(14.96, 1), 15.0);
        assert_eq!(round_to(-12.34, 1), -12.3);
        assert_eq!(round_to(6.456, 2), 6.46);
    }
}
