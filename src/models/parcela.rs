use super::crop_profile::RangeOverrides;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Crop planted on a parcela. Crops without a built-in variant keep their
/// name so a configured profile can still match them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CropType {
    Maiz,
    Trigo,
    Soja,
    Arroz,
    Other(String),
}

impl CropType {
    pub fn as_str(&self) -> &str {
        match self {
            CropType::Maiz => "Maíz",
            CropType::Trigo => "Trigo",
            CropType::Soja => "Soja",
            CropType::Arroz => "Arroz",
            CropType::Other(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        let trimmed = s.trim();
        match normalize(trimmed).as_str() {
            "maiz" | "corn" => CropType::Maiz,
            "trigo" | "wheat" => CropType::Trigo,
            "soja" | "soya" | "soy" => CropType::Soja,
            "arroz" | "rice" => CropType::Arroz,
            _ => CropType::Other(trimmed.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CropType::Other(_))
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

impl From<String> for CropType {
    fn from(s: String) -> Self {
        CropType::from_str(&s)
    }
}

impl From<CropType> for String {
    fn from(crop: CropType) -> Self {
        crop.as_str().to_string()
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParcelaState {
    #[default]
    Activa,
    Cosechada,
    EnPreparacion,
}

impl ParcelaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelaState::Activa => "ACTIVA",
            ParcelaState::Cosechada => "COSECHADA",
            ParcelaState::EnPreparacion => "EN_PREPARACION",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace(' ', "_").as_str() {
            "ACTIVA" => Some(ParcelaState::Activa),
            "COSECHADA" => Some(ParcelaState::Cosechada),
            "EN_PREPARACION" | "EN_PREPARACIÓN" => Some(ParcelaState::EnPreparacion),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParcelaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A managed land parcel, the unit of analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcela {
    pub parcela_id: String,
    pub nombre: String,
    pub tipo_cultivo: CropType,
    #[serde(default)]
    pub area_hectareas: Option<f64>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub estado: ParcelaState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_siembra: Option<DateTime<Utc>>,
    /// Ranges agreed for this parcela, ahead of its crop's profile.
    #[serde(default, skip_serializing_if = "RangeOverrides::is_empty")]
    pub rangos_optimos: RangeOverrides,
}

impl Parcela {
    pub fn new(
        parcela_id: impl Into<String>,
        nombre: impl Into<String>,
        tipo_cultivo: CropType,
    ) -> Self {
        Self {
            parcela_id: parcela_id.into(),
            nombre: nombre.into(),
            tipo_cultivo,
            area_hectareas: None,
            ubicacion: None,
            estado: ParcelaState::Activa,
            fecha_siembra: None,
            rangos_optimos: RangeOverrides::default(),
        }
    }

    pub fn with_area(mut self, hectareas: f64) -> Self {
        self.area_hectareas = Some(hectareas);
        self
    }

    pub fn with_ubicacion(mut self, ubicacion: impl Into<String>) -> Self {
        self.ubicacion = Some(ubicacion.into());
        self
    }

    pub fn with_fecha_siembra(mut self, fecha: DateTime<Utc>) -> Self {
        self.fecha_siembra = Some(fecha);
        self
    }

    pub fn with_rangos_optimos(mut self, rangos: RangeOverrides) -> Self {
        self.rangos_optimos = rangos;
        self
    }
}
