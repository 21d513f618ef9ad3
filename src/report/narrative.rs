use super::period;
use crate::logic::aggregation::basic_stats;
use crate::models::{AnalysisResult, Parameter, Parcela, SensorReading};
use crate::error::ReportError;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

pub(super) fn render(
    parcela: &Parcela,
    result: &AnalysisResult,
    readings: &[&SensorReading],
    generated_at: DateTime<Utc>,
) -> Result<String, ReportError> {
    let mut out = String::new();
    write_header(&mut out, parcela, result, generated_at)?;
    write_parameters(&mut out, result)?;
    write_recommendations(&mut out, result)?;
    write_alerts(&mut out, result)?;
    write_readings(&mut out, readings)?;
    Ok(out)
}

fn write_header(
    out: &mut String,
    parcela: &Parcela,
    result: &AnalysisResult,
    generated_at: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(out, "# Reporte agronómico: {}", parcela.nombre)?;
    writeln!(out)?;
    writeln!(out, "- **Parcela:** {}", parcela.parcela_id)?;
    writeln!(out, "- **Cultivo:** {}", parcela.tipo_cultivo)?;
    if let Some(area) = parcela.area_hectareas {
        writeln!(out, "- **Área:** {:.1} ha", area)?;
    }
    if let Some(ubicacion) = &parcela.ubicacion {
        writeln!(out, "- **Ubicación:** {}", ubicacion)?;
    }
    writeln!(out, "- **Estado de la parcela:** {}", parcela.estado)?;
    if let Some(siembra) = parcela.fecha_siembra {
        writeln!(out, "- **Siembra:** {}", siembra.format("%Y-%m-%d"))?;
    }
    writeln!(out, "- **Generado:** {}", generated_at.format(DATE_FORMAT))?;
    match &result.evaluacion {
        Some(evaluation) => writeln!(
            out,
            "- **Estado general:** {} (puntuación {:.2} / 4)",
            result.estado, evaluation.puntuacion
        )?,
        None => writeln!(out, "- **Estado general:** {}", result.estado)?,
    }
    writeln!(out)?;
    writeln!(out, "## Resumen")?;
    writeln!(out)?;
    writeln!(out, "{}", result.resumen)?;
    writeln!(out)
}

fn write_parameters(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    if result.promedios.is_empty() {
        return Ok(());
    }

    writeln!(out, "## Parámetros")?;
    writeln!(out)?;
    writeln!(out, "| Parámetro | Promedio | Clasificación | Tendencia |")?;
    writeln!(out, "|---|---|---|---|")?;
    for parameter in Parameter::ALL {
        let Some(&avg) = result.promedios.get(&parameter) else {
            continue;
        };
        let class = result
            .classification(parameter)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".into());
        let trend = result
            .tendencias
            .get(&parameter)
            .map(|t| format!("{:+.1}%", t))
            .unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            parameter.label(),
            parameter.format_value(avg),
            class,
            trend
        )?;
    }
    writeln!(out)
}

fn write_recommendations(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Recomendaciones")?;
    writeln!(out)?;
    for rec in &result.recomendaciones {
        writeln!(out, "- {}", rec)?;
    }
    writeln!(out)
}

fn write_alerts(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Alertas")?;
    writeln!(out)?;
    if result.alertas.is_empty() {
        writeln!(out, "Sin alertas activas.")?;
    }
    for alert in &result.alertas {
        writeln!(
            out,
            "- **{}** ({}): {}",
            alert.tipo,
            alert.parametro.label(),
            alert.mensaje
        )?;
    }
    writeln!(out)
}

fn write_readings(out: &mut String, readings: &[&SensorReading]) -> std::fmt::Result {
    writeln!(out, "## Datos de origen")?;
    writeln!(out)?;

    let Some((first, last)) = period(readings) else {
        return writeln!(out, "Sin lecturas en el período analizado.");
    };
    writeln!(
        out,
        "{} lecturas entre {} y {}.",
        readings.len(),
        first.format(DATE_FORMAT),
        last.format(DATE_FORMAT)
    )?;

    let owned: Vec<SensorReading> = readings.iter().map(|r| (*r).clone()).collect();
    let stats = basic_stats(&owned);
    if stats.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "| Parámetro | Mínimo | Máximo | Promedio | Muestras |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for (parameter, s) in &stats {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            parameter.label(),
            parameter.format_value(s.min),
            parameter.format_value(s.max),
            parameter.format_value(s.promedio),
            s.muestras
        )?;
    }
    Ok(())
}
