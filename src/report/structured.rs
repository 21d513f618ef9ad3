use super::period;
use crate::error::ReportError;
use crate::logic::aggregation::{basic_stats, ParameterStats};
use crate::models::{AnalysisResult, Parameter, Parcela, ReadingStatus, SensorReading};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const REPORT_KIND: &str = "Análisis Completo";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    metadata: Metadata<'a>,
    parcela: &'a Parcela,
    analisis: &'a AnalysisResult,
    datos_originales: SourceData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    parcela_id: &'a str,
    fecha_generacion: DateTime<Utc>,
    tipo_reporte: &'static str,
    formato: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceData {
    lecturas: Vec<Lectura>,
    total_lecturas: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    periodo_analisis: Option<Period>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    estadisticas_basicas: BTreeMap<Parameter, ParameterStats>,
}

#[derive(Serialize)]
struct Period {
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
}

/// A reading as exported: the status is always spelled out.
#[derive(Serialize)]
struct Lectura {
    fecha: DateTime<Utc>,
    humedad: Option<f64>,
    ph: Option<f64>,
    nitrogeno: Option<f64>,
    temperatura: Option<f64>,
    estado: ReadingStatus,
}

impl From<&SensorReading> for Lectura {
    fn from(r: &SensorReading) -> Self {
        Self {
            fecha: r.fecha,
            humedad: r.humedad,
            ph: r.ph,
            nitrogeno: r.nitrogeno,
            temperatura: r.temperatura,
            estado: r.status_or_default(),
        }
    }
}

pub(super) fn render(
    parcela: &Parcela,
    result: &AnalysisResult,
    readings: &[&SensorReading],
    generated_at: DateTime<Utc>,
) -> Result<String, ReportError> {
    let owned: Vec<SensorReading> = readings.iter().map(|r| (*r).clone()).collect();

    let document = Document {
        metadata: Metadata {
            parcela_id: &parcela.parcela_id,
            fecha_generacion: generated_at,
            tipo_reporte: REPORT_KIND,
            formato: "structured",
        },
        parcela,
        analisis: result,
        datos_originales: SourceData {
            lecturas: readings.iter().map(|r| Lectura::from(*r)).collect(),
            total_lecturas: readings.len(),
            periodo_analisis: period(readings).map(|(desde, hasta)| Period { desde, hasta }),
            estadisticas_basicas: basic_stats(&owned),
        },
    };

    Ok(serde_json::to_string_pretty(&document)?)
}
