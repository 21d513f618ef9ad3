use super::aggregation::{averages, round_to};
use super::engine::InsightEngine;
use crate::models::{GeneralStats, InsightsOverview, Parcela, SensorReading};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Fleet-wide counts and averages over the given window of readings.
pub fn general_stats(parcelas: &[Parcela], readings: &[SensorReading]) -> GeneralStats {
    let mut distribucion_cultivos = BTreeMap::new();
    for parcela in parcelas {
        let crop = parcela.tipo_cultivo.as_str().trim();
        if crop.is_empty() {
            continue;
        }
        *distribucion_cultivos.entry(crop.to_string()).or_insert(0) += 1;
    }

    let mut distribucion_estados = BTreeMap::new();
    for reading in readings {
        *distribucion_estados
            .entry(reading.status_or_default().as_str().to_string())
            .or_insert(0) += 1;
    }

    let promedios_generales = averages(readings)
        .into_iter()
        .map(|(p, avg)| (p, round_to(avg, 2)))
        .collect();

    GeneralStats {
        total_parcelas: parcelas.len(),
        total_lecturas: readings.len(),
        distribucion_cultivos,
        distribucion_estados,
        promedios_generales,
    }
}

/// General statistics plus one analysis per parcela that has readings in the
/// window. Parcelas keep their input order.
pub fn overview(
    engine: &InsightEngine,
    parcelas: &[Parcela],
    readings: &[SensorReading],
    now: DateTime<Utc>,
) -> InsightsOverview {
    let mut by_parcela: HashMap<&str, Vec<SensorReading>> = HashMap::new();
    for reading in readings {
        by_parcela
            .entry(reading.parcela_id.as_str())
            .or_default()
            .push(reading.clone());
    }

    let analyses = parcelas
        .iter()
        .filter_map(|parcela| {
            let own = by_parcela.get(parcela.parcela_id.as_str())?;
            Some(engine.analyze_at(parcela, own, now))
        })
        .collect();

    InsightsOverview {
        estadisticas: general_stats(parcelas, readings),
        parcelas: analyses,
    }
}
