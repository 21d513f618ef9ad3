use super::parcela::CropType;
use super::reading::Parameter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Ordinal health level of a single parameter, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Excelente,
    Bueno,
    Regular,
    Critico,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Excelente => "EXCELENTE",
            Classification::Bueno => "BUENO",
            Classification::Regular => "REGULAR",
            Classification::Critico => "CRITICO",
        }
    }

    /// Weight used by the overall score (4 best, 1 worst).
    pub fn score(&self) -> u32 {
        match self {
            Classification::Excelente => 4,
            Classification::Bueno => 3,
            Classification::Regular => 2,
            Classification::Critico => 1,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall parcela status. `Insuficiente` means there was nothing to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Excelente,
    Bueno,
    Regular,
    Critico,
    Insuficiente,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Excelente => "EXCELENTE",
            OverallStatus::Bueno => "BUENO",
            OverallStatus::Regular => "REGULAR",
            OverallStatus::Critico => "CRITICO",
            OverallStatus::Insuficiente => "INSUFICIENTE",
        }
    }
}

impl From<Classification> for OverallStatus {
    fn from(c: Classification) -> Self {
        match c {
            Classification::Excelente => OverallStatus::Excelente,
            Classification::Bueno => OverallStatus::Bueno,
            Classification::Regular => OverallStatus::Regular,
            Classification::Critico => OverallStatus::Critico,
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-parameter classifications plus the combined verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(flatten)]
    pub parameters: BTreeMap<Parameter, Classification>,
    pub estado_general: Classification,
    pub puntuacion: f64,
}

impl Evaluation {
    pub fn get(&self, parameter: Parameter) -> Option<Classification> {
        self.parameters.get(&parameter).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// Absolute safety bound crossed.
    Critico,
    /// Sharp change between recent and older readings.
    Tendencia,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Critico => "CRITICO",
            AlertKind::Tendencia => "TENDENCIA",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub tipo: AlertKind,
    pub mensaje: String,
    pub parametro: Parameter,
}

impl Alert {
    pub fn new(tipo: AlertKind, parametro: Parameter, mensaje: impl Into<String>) -> Self {
        Self {
            tipo,
            mensaje: mensaje.into(),
            parametro,
        }
    }
}

/// Outcome of analyzing one parcela. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub parcela_id: String,
    pub cultivo: CropType,
    pub total_lecturas: usize,
    pub resumen: String,
    pub promedios: BTreeMap<Parameter, f64>,
    pub tendencias: BTreeMap<Parameter, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluacion: Option<Evaluation>,
    pub recomendaciones: Vec<String>,
    pub alertas: Vec<Alert>,
    pub estado: OverallStatus,
    pub fecha_analisis: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn is_insufficient(&self) -> bool {
        self.estado == OverallStatus::Insuficiente
    }

    pub fn classification(&self, parameter: Parameter) -> Option<Classification> {
        self.evaluacion.as_ref().and_then(|e| e.get(parameter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_ordering_best_to_worst() {
        assert!(Classification::Excelente < Classification::Bueno);
        assert!(Classification::Regular < Classification::Critico);
        assert_eq!(
            [
                Classification::Excelente,
                Classification::Bueno,
                Classification::Regular,
                Classification::Critico
            ]
            .iter()
            .max(),
            Some(&Classification::Critico)
        );
    }

    #[test]
    fn evaluation_serializes_flat() {
        let mut parameters = BTreeMap::new();
        parameters.insert(Parameter::Humedad, Classification::Excelente);
        parameters.insert(Parameter::Ph, Classification::Regular);
        let evaluation = Evaluation {
            parameters,
            estado_general: Classification::Bueno,
            puntuacion: 3.0,
        };
        let value = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(value["humedad"], "EXCELENTE");
        assert_eq!(value["ph"], "REGULAR");
        assert_eq!(value["estadoGeneral"], "BUENO");
        assert_eq!(value["puntuacion"], 3.0);
    }

    #[test]
    fn alert_serializes_with_spanish_keys() {
        let alert = Alert::new(AlertKind::Tendencia, Parameter::Ph, "Cambio rápido en ph: 16.0%");
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["tipo"], "TENDENCIA");
        assert_eq!(value["parametro"], "ph");
    }
}
