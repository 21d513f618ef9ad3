use crate::db::Database;
use crate::error::{AgroError, Result};
use crate::models::{Parcela, SensorReading};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A file of parcelas and their readings, as exported by the acquisition side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBundle {
    #[serde(default)]
    pub parcelas: Vec<Parcela>,
    #[serde(default)]
    pub lecturas: Vec<SensorReading>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub parcelas: usize,
    pub lecturas: usize,
    pub duplicadas: usize,
}

impl ImportBundle {
    /// Loads a bundle, picking the parser from the extension (`.yaml`/`.yml`, else JSON).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Rejects bundles the store would only partially accept.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for parcela in &self.parcelas {
            if parcela.parcela_id.trim().is_empty() {
                return Err(AgroError::InvalidData("parcela without parcelaId".into()));
            }
            if !ids.insert(parcela.parcela_id.as_str()) {
                return Err(AgroError::InvalidData(format!(
                    "parcela {} listed twice",
                    parcela.parcela_id
                )));
            }
        }
        for parcela in &self.parcelas {
            parcela.rangos_optimos.validate(&parcela.parcela_id)?;
        }
        for reading in &self.lecturas {
            for parameter in crate::models::Parameter::ALL {
                if let Some(value) = reading.value(parameter) {
                    if !value.is_finite() {
                        return Err(AgroError::InvalidData(format!(
                            "non-finite {} in reading of {} at {}",
                            parameter, reading.parcela_id, reading.fecha
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes the bundle into the store, all or nothing. Readings may reference
    /// parcelas that already exist there; duplicates (same parcela and instant)
    /// are skipped.
    pub fn import_into(&self, db: &Database) -> Result<ImportSummary> {
        self.validate()?;

        let mut known: HashSet<String> = db
            .list_parcelas()?
            .into_iter()
            .map(|p| p.parcela_id)
            .collect();
        known.extend(self.parcelas.iter().map(|p| p.parcela_id.clone()));
        if let Some(orphan) = self.lecturas.iter().find(|r| !known.contains(&r.parcela_id)) {
            return Err(AgroError::NotFound(format!(
                "parcela {} referenced by a reading",
                orphan.parcela_id
            )));
        }

        let inserted = db.import_batch(&self.parcelas, &self.lecturas)?;
        let summary = ImportSummary {
            parcelas: self.parcelas.len(),
            lecturas: inserted,
            duplicadas: self.lecturas.len() - inserted,
        };

        tracing::info!(
            parcelas = summary.parcelas,
            lecturas = summary.lecturas,
            duplicadas = summary.duplicadas,
            "Bundle imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropType, ReadingStatus};

    const JSON: &str = r#"{
        "parcelas": [
            { "parcelaId": "PAR-001", "nombre": "Lote Norte", "tipoCultivo": "Maíz",
              "areaHectareas": 12.5, "ubicacion": "Pergamino", "estado": "ACTIVA" },
            { "parcelaId": "PAR-002", "nombre": "Lote Sur", "tipoCultivo": "Arroz" }
        ],
        "lecturas": [
            { "parcelaId": "PAR-001", "fecha": "2024-06-14T10:00:00Z",
              "humedad": 68.2, "ph": 6.4, "nitrogeno": 150.0, "temperatura": 24.5 },
            { "parcelaId": "PAR-002", "fecha": "2024-06-14T10:00:00Z",
              "humedad": 85.0, "ph": 6.0, "estado": "ALERTA" }
        ]
    }"#;

    #[test]
    fn json_bundle_parses() {
        let bundle: ImportBundle = serde_json::from_str(JSON).unwrap();
        assert_eq!(bundle.parcelas.len(), 2);
        assert_eq!(bundle.parcelas[1].tipo_cultivo, CropType::Arroz);
        assert_eq!(bundle.lecturas[1].nitrogeno, None);
        assert_eq!(bundle.lecturas[1].estado, Some(ReadingStatus::Alerta));
    }

    #[test]
    fn yaml_bundle_parses() {
        let yaml = r#"
parcelas:
  - parcelaId: PAR-010
    nombre: Chacra
    tipoCultivo: soja
lecturas:
  - parcelaId: PAR-010
    fecha: 2024-06-14T10:00:00Z
    humedad: 60
"#;
        let bundle: ImportBundle = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(bundle.parcelas[0].tipo_cultivo, CropType::Soja);
        assert_eq!(bundle.lecturas[0].humedad, Some(60.0));
    }

    #[test]
    fn import_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let bundle: ImportBundle = serde_json::from_str(JSON).unwrap();

        let first = bundle.import_into(&db).unwrap();
        assert_eq!(first.lecturas, 2);
        let second = bundle.import_into(&db).unwrap();
        assert_eq!(second.lecturas, 0);
        assert_eq!(second.duplicadas, 2);
        assert_eq!(db.count_readings().unwrap(), 2);
    }

    #[test]
    fn orphan_reading_is_rejected_before_writing() {
        let db = Database::open_in_memory().unwrap();
        let bundle = ImportBundle {
            parcelas: vec![],
            lecturas: vec![SensorReading::new("PAR-404", chrono::Utc::now())],
        };
        assert!(matches!(bundle.import_into(&db), Err(AgroError::NotFound(_))));
        assert_eq!(db.count_readings().unwrap(), 0);
    }

    #[test]
    fn rejected_bundle_writes_no_parcelas() {
        let db = Database::open_in_memory().unwrap();
        let bundle = ImportBundle {
            parcelas: vec![Parcela::new("PAR-NEW", "Nueva", CropType::Maiz)],
            lecturas: vec![
                SensorReading::new("PAR-NEW", chrono::Utc::now()).with_values(70.0, 6.5, 150.0, 25.0),
                SensorReading::new("PAR-GHOST", chrono::Utc::now()),
            ],
        };
        assert!(matches!(bundle.import_into(&db), Err(AgroError::NotFound(_))));
        assert!(db.list_parcelas().unwrap().is_empty());
        assert_eq!(db.count_readings().unwrap(), 0);
    }

    #[test]
    fn bundle_with_inverted_parcela_range_is_invalid() {
        use crate::models::{OptimalRange, RangeOverrides};
        let bundle = ImportBundle {
            parcelas: vec![Parcela::new("PAR-001", "A", CropType::Maiz).with_rangos_optimos(
                RangeOverrides {
                    ph: Some(OptimalRange::new(7.0, 6.0)),
                    ..Default::default()
                },
            )],
            lecturas: vec![],
        };
        assert!(matches!(bundle.validate(), Err(AgroError::InvalidData(_))));
    }

    #[test]
    fn duplicate_parcela_ids_are_invalid() {
        let p = Parcela::new("PAR-001", "A", CropType::Maiz);
        let bundle = ImportBundle {
            parcelas: vec![p.clone(), p],
            lecturas: vec![],
        };
        assert!(matches!(bundle.validate(), Err(AgroError::InvalidData(_))));
    }
}
