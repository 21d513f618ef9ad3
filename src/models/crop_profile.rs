use super::parcela::CropType;
use super::reading::Parameter;
use crate::error::{AgroError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive optimal range for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalRange {
    pub min: f64,
    pub max: f64,
}

impl OptimalRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl std::fmt::Display for OptimalRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.min, self.max)
    }
}

/// Optimal ranges for a single crop (perfil de cultivo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropThresholdProfile {
    pub humedad: OptimalRange,
    pub ph: OptimalRange,
    pub nitrogeno: OptimalRange,
    pub temperatura: OptimalRange,
    /// Reinforcement emitted when the parcela is in excellent shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensaje_optimo: Option<String>,
}

impl CropThresholdProfile {
    pub fn range(&self, parameter: Parameter) -> OptimalRange {
        match parameter {
            Parameter::Humedad => self.humedad,
            Parameter::Ph => self.ph,
            Parameter::Nitrogeno => self.nitrogeno,
            Parameter::Temperatura => self.temperatura,
        }
    }

    /// This profile with a parcela's own ranges laid over it.
    pub fn with_overrides(&self, overrides: &RangeOverrides) -> Self {
        Self {
            humedad: overrides.humedad.unwrap_or(self.humedad),
            ph: overrides.ph.unwrap_or(self.ph),
            nitrogeno: overrides.nitrogeno.unwrap_or(self.nitrogeno),
            ..self.clone()
        }
    }

    fn validate(&self, crop: &CropType) -> Result<()> {
        for parameter in Parameter::ALL {
            let range = self.range(parameter);
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(AgroError::Config(format!(
                    "invalid {} range [{}, {}] for crop {}",
                    parameter, range.min, range.max, crop
                )));
            }
        }
        Ok(())
    }
}

/// Optimal ranges set on a single parcela. Each one replaces the crop
/// profile's range for that parameter; temperature always comes from the crop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humedad: Option<OptimalRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<OptimalRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nitrogeno: Option<OptimalRange>,
}

impl RangeOverrides {
    pub fn is_empty(&self) -> bool {
        self.humedad.is_none() && self.ph.is_none() && self.nitrogeno.is_none()
    }

    pub fn get(&self, parameter: Parameter) -> Option<OptimalRange> {
        match parameter {
            Parameter::Humedad => self.humedad,
            Parameter::Ph => self.ph,
            Parameter::Nitrogeno => self.nitrogeno,
            Parameter::Temperatura => None,
        }
    }

    pub fn validate(&self, parcela_id: &str) -> Result<()> {
        for parameter in Parameter::ALL {
            let Some(range) = self.get(parameter) else {
                continue;
            };
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(AgroError::InvalidData(format!(
                    "invalid {} range [{}, {}] on parcela {}",
                    parameter, range.min, range.max, parcela_id
                )));
            }
        }
        Ok(())
    }
}

/// Read-only crop profile table, looked up by crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfiles {
    pub default_crop: CropType,
    pub profiles: BTreeMap<CropType, CropThresholdProfile>,
}

impl CropProfiles {
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            CropType::Maiz,
            CropThresholdProfile {
                humedad: OptimalRange::new(60.0, 80.0),
                ph: OptimalRange::new(6.0, 7.0),
                nitrogeno: OptimalRange::new(120.0, 180.0),
                temperatura: OptimalRange::new(20.0, 30.0),
                mensaje_optimo: Some(
                    "✅ Condiciones óptimas para maíz. Continuar con manejo actual.".to_string(),
                ),
            },
        );
        profiles.insert(
            CropType::Trigo,
            CropThresholdProfile {
                humedad: OptimalRange::new(50.0, 70.0),
                ph: OptimalRange::new(6.5, 7.5),
                nitrogeno: OptimalRange::new(100.0, 150.0),
                temperatura: OptimalRange::new(15.0, 25.0),
                mensaje_optimo: None,
            },
        );
        profiles.insert(
            CropType::Soja,
            CropThresholdProfile {
                humedad: OptimalRange::new(55.0, 75.0),
                ph: OptimalRange::new(6.0, 7.0),
                nitrogeno: OptimalRange::new(80.0, 120.0),
                temperatura: OptimalRange::new(18.0, 28.0),
                mensaje_optimo: None,
            },
        );
        profiles.insert(
            CropType::Arroz,
            CropThresholdProfile {
                humedad: OptimalRange::new(80.0, 95.0),
                ph: OptimalRange::new(5.5, 6.5),
                nitrogeno: OptimalRange::new(150.0, 200.0),
                temperatura: OptimalRange::new(22.0, 32.0),
                mensaje_optimo: None,
            },
        );

        Self {
            default_crop: CropType::Maiz,
            profiles,
        }
    }

    /// Checks every range and that the default crop has a profile.
    pub fn validate(&self) -> Result<()> {
        if !self.profiles.contains_key(&self.default_crop) {
            return Err(AgroError::Config(format!(
                "default crop {} has no profile",
                self.default_crop
            )));
        }
        for (crop, profile) in &self.profiles {
            profile.validate(crop)?;
        }
        Ok(())
    }

    pub fn get(&self, crop: &CropType) -> Option<&CropThresholdProfile> {
        self.profiles.get(crop)
    }

    /// Profile for `crop`, falling back to the default crop's profile.
    ///
    /// Returns `None` only for a table that failed validation.
    pub fn resolve(&self, crop: &CropType) -> Option<&CropThresholdProfile> {
        self.profiles.get(crop).or_else(|| {
            tracing::debug!(
                crop = %crop,
                default = %self.default_crop,
                "No profile for crop, using default"
            );
            self.profiles.get(&self.default_crop)
        })
    }

    pub fn crops(&self) -> impl Iterator<Item = &CropType> {
        self.profiles.keys()
    }
}

impl Default for CropProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}
