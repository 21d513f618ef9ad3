use crate::models::{Alert, AlertKind, Parameter};
use std::collections::BTreeMap;

/// Absolute safety bounds, independent of crop. Nitrogen has none.
const SAFETY_LIMITS: &[(Parameter, f64, f64, &str)] = &[
    (Parameter::Humedad, 30.0, 90.0, "Humedad en niveles críticos"),
    (Parameter::Ph, 5.0, 8.0, "pH fuera de rango seguro"),
    (Parameter::Temperatura, 5.0, 40.0, "Temperatura extrema detectada"),
];

/// Trend magnitude (percent) that raises a trend alert. Strictly greater than.
pub const TREND_ALERT_PERCENT: f64 = 15.0;

/// Safety alerts for a parcela: absolute bounds first, then trend shocks.
pub fn generate(
    averages: &BTreeMap<Parameter, f64>,
    trends: &BTreeMap<Parameter, f64>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for &(parameter, low, high, message) in SAFETY_LIMITS {
        if let Some(&value) = averages.get(&parameter) {
            if value < low || value > high {
                alerts.push(Alert::new(AlertKind::Critico, parameter, message));
            }
        }
    }

    for (&parameter, &delta) in trends {
        if delta.abs() > TREND_ALERT_PERCENT {
            alerts.push(Alert::new(
                AlertKind::Tendencia,
                parameter,
                format!("Cambio rápido en {}: {:.1}%", parameter, delta),
            ));
        }
    }

    alerts
}
