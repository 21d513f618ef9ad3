use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Soil/climate parameters tracked for every parcela.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Humedad,
    Ph,
    Nitrogeno,
    Temperatura,
}

impl Parameter {
    /// Evaluation order used everywhere results are emitted.
    pub const ALL: [Parameter; 4] = [
        Parameter::Humedad,
        Parameter::Ph,
        Parameter::Nitrogeno,
        Parameter::Temperatura,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Humedad => "humedad",
            Parameter::Ph => "ph",
            Parameter::Nitrogeno => "nitrogeno",
            Parameter::Temperatura => "temperatura",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Humedad => "Humedad",
            Parameter::Ph => "pH",
            Parameter::Nitrogeno => "Nitrógeno",
            Parameter::Temperatura => "Temperatura",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Humedad => "%",
            Parameter::Ph => "",
            Parameter::Nitrogeno => " ppm",
            Parameter::Temperatura => "°C",
        }
    }

    /// Decimals shown to end users; pH needs the extra digit.
    pub fn display_precision(&self) -> usize {
        match self {
            Parameter::Ph => 2,
            _ => 1,
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        format!(
            "{:.*}{}",
            self.display_precision(),
            value,
            self.unit()
        )
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "humedad" => Some(Parameter::Humedad),
            "ph" => Some(Parameter::Ph),
            "nitrogeno" | "nitrógeno" => Some(Parameter::Nitrogeno),
            "temperatura" => Some(Parameter::Temperatura),
            _ => None,
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status flag attached by the acquisition side to a single reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingStatus {
    #[default]
    Normal,
    Alerta,
    Critico,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Normal => "NORMAL",
            ReadingStatus::Alerta => "ALERTA",
            ReadingStatus::Critico => "CRITICO",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NORMAL" => Some(ReadingStatus::Normal),
            "ALERTA" => Some(ReadingStatus::Alerta),
            "CRITICO" | "CRÍTICO" => Some(ReadingStatus::Critico),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One timestamped sensor reading (lectura) for a parcela.
///
/// Parameters are optional: a sensor that failed to report a value leaves it
/// out instead of recording zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub parcela_id: String,
    pub fecha: DateTime<Utc>,
    #[serde(default)]
    pub humedad: Option<f64>,
    #[serde(default)]
    pub nitrogeno: Option<f64>,
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub temperatura: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<ReadingStatus>,
}

impl SensorReading {
    pub fn new(parcela_id: impl Into<String>, fecha: DateTime<Utc>) -> Self {
        Self {
            parcela_id: parcela_id.into(),
            fecha,
            humedad: None,
            nitrogeno: None,
            ph: None,
            temperatura: None,
            estado: None,
        }
    }

    pub fn with_values(mut self, humedad: f64, ph: f64, nitrogeno: f64, temperatura: f64) -> Self {
        self.humedad = Some(humedad);
        self.ph = Some(ph);
        self.nitrogeno = Some(nitrogeno);
        self.temperatura = Some(temperatura);
        self
    }

    pub fn with_status(mut self, estado: ReadingStatus) -> Self {
        self.estado = Some(estado);
        self
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Humedad => self.humedad,
            Parameter::Ph => self.ph,
            Parameter::Nitrogeno => self.nitrogeno,
            Parameter::Temperatura => self.temperatura,
        }
    }

    pub fn status_or_default(&self) -> ReadingStatus {
        self.estado.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parameter_from_str() {
        assert_eq!(Parameter::from_str("humedad"), Some(Parameter::Humedad));
        assert_eq!(Parameter::from_str("PH"), Some(Parameter::Ph));
        assert_eq!(Parameter::from_str("nitrógeno"), Some(Parameter::Nitrogeno));
        assert_eq!(Parameter::from_str("luminosidad"), None);
    }

    #[test]
    fn parameter_display_precision() {
        assert_eq!(Parameter::Ph.format_value(6.456), "6.46");
        assert_eq!(Parameter::Humedad.format_value(70.04), "70.0%");
        assert_eq!(Parameter::Temperatura.format_value(25.24), "25.2°C");
    }

    #[test]
    fn reading_status_defaults_to_normal() {
        let fecha = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let reading = SensorReading::new("PAR-001", fecha);
        assert_eq!(reading.status_or_default(), ReadingStatus::Normal);
        assert_eq!(
            reading.with_status(ReadingStatus::Alerta).status_or_default(),
            ReadingStatus::Alerta
        );
    }

    #[test]
    fn reading_deserializes_with_missing_fields() {
        let json = r#"{"parcelaId":"PAR-001","fecha":"2024-05-01T12:00:00Z","humedad":65.5,"estado":"CRITICO"}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.humedad, Some(65.5));
        assert_eq!(reading.ph, None);
        assert_eq!(reading.estado, Some(ReadingStatus::Critico));
    }
}
