use crate::db::Database;
use crate::error::Result;
use crate::models::{
    CropType, OptimalRange, Parcela, ParcelaState, RangeOverrides, ReadingStatus, SensorReading,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row, Statement};
use tracing::warn;

/// Fixed-width UTC timestamps so text comparison in SQL is chronological.
/// Microseconds keep readings taken within the same second apart.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Parcela Queries

impl Database {
    pub fn upsert_parcela(&self, parcela: &Parcela) -> Result<()> {
        self.with_conn(|conn| {
            upsert_parcela_on(conn, parcela)?;
            Ok(())
        })
    }

    /// Upserts parcelas and stores readings in one transaction; returns how
    /// many readings were new. Nothing is written if any statement fails.
    pub fn import_batch(&self, parcelas: &[Parcela], readings: &[SensorReading]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for parcela in parcelas {
                upsert_parcela_on(&tx, parcela)?;
            }
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare(INSERT_READING)?;
                for reading in readings {
                    inserted += insert_with(&mut stmt, reading)?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
    }

    pub fn list_parcelas(&self) -> Result<Vec<Parcela>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM parcelas ORDER BY parcela_id")?;
            let parcelas = stmt
                .query_map([], row_to_parcela)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(parcelas)
        })
    }

    pub fn get_parcela(&self, parcela_id: &str) -> Result<Option<Parcela>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM parcelas WHERE parcela_id = ?1",
                [parcela_id],
                row_to_parcela,
            )
            .optional()
            .map_err(Into::into)
        })
    }
}

fn upsert_parcela_on(conn: &Connection, parcela: &Parcela) -> rusqlite::Result<usize> {
    let rangos = &parcela.rangos_optimos;
    conn.execute(
        r#"
        INSERT INTO parcelas
            (parcela_id, nombre, tipo_cultivo, area_hectareas, ubicacion, estado,
             fecha_siembra, humedad_optima_min, humedad_optima_max,
             ph_optimo_min, ph_optimo_max, nitrogeno_optimo_min, nitrogeno_optimo_max,
             updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT(parcela_id) DO UPDATE SET
            nombre = excluded.nombre,
            tipo_cultivo = excluded.tipo_cultivo,
            area_hectareas = excluded.area_hectareas,
            ubicacion = excluded.ubicacion,
            estado = excluded.estado,
            fecha_siembra = excluded.fecha_siembra,
            humedad_optima_min = excluded.humedad_optima_min,
            humedad_optima_max = excluded.humedad_optima_max,
            ph_optimo_min = excluded.ph_optimo_min,
            ph_optimo_max = excluded.ph_optimo_max,
            nitrogeno_optimo_min = excluded.nitrogeno_optimo_min,
            nitrogeno_optimo_max = excluded.nitrogeno_optimo_max,
            updated_at = excluded.updated_at
        "#,
        params![
            parcela.parcela_id,
            parcela.nombre,
            parcela.tipo_cultivo.as_str(),
            parcela.area_hectareas,
            parcela.ubicacion,
            parcela.estado.as_str(),
            parcela.fecha_siembra.map(timestamp),
            rangos.humedad.map(|r| r.min),
            rangos.humedad.map(|r| r.max),
            rangos.ph.map(|r| r.min),
            rangos.ph.map(|r| r.max),
            rangos.nitrogeno.map(|r| r.min),
            rangos.nitrogeno.map(|r| r.max),
            timestamp(Utc::now()),
        ],
    )
}

fn row_to_parcela(row: &Row) -> rusqlite::Result<Parcela> {
    let tipo_cultivo: String = row.get("tipo_cultivo")?;
    let estado_str: String = row.get("estado")?;

    let estado = ParcelaState::from_str(&estado_str).unwrap_or_else(|| {
        warn!(estado = %estado_str, "Unknown parcela estado in database, defaulting to ACTIVA");
        ParcelaState::Activa
    });

    let fecha_siembra: Option<String> = row.get("fecha_siembra")?;
    let fecha_siembra = fecha_siembra.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            warn!(fecha_siembra = %s, "Unparseable sowing date in database, ignoring");
            None
        }
    });

    Ok(Parcela {
        parcela_id: row.get("parcela_id")?,
        nombre: row.get("nombre")?,
        tipo_cultivo: CropType::from_str(&tipo_cultivo),
        area_hectareas: row.get("area_hectareas")?,
        ubicacion: row.get("ubicacion")?,
        estado,
        fecha_siembra,
        rangos_optimos: RangeOverrides {
            humedad: range_columns(row, "humedad_optima_min", "humedad_optima_max")?,
            ph: range_columns(row, "ph_optimo_min", "ph_optimo_max")?,
            nitrogeno: range_columns(row, "nitrogeno_optimo_min", "nitrogeno_optimo_max")?,
        },
    })
}

/// A stored range counts only when both bounds are set.
fn range_columns(row: &Row, min: &str, max: &str) -> rusqlite::Result<Option<OptimalRange>> {
    let min: Option<f64> = row.get(min)?;
    let max: Option<f64> = row.get(max)?;
    Ok(min.zip(max).map(|(min, max)| OptimalRange::new(min, max)))
}

// Reading Queries

impl Database {
    /// Stores a reading. Returns `false` if the parcela already has one at that instant.
    pub fn insert_reading(&self, reading: &SensorReading) -> Result<bool> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(INSERT_READING)?;
            Ok(insert_with(&mut stmt, reading)? > 0)
        })
    }

    /// Stores a batch of readings in one transaction; returns how many were new.
    pub fn insert_readings(&self, readings: &[SensorReading]) -> Result<usize> {
        self.import_batch(&[], readings)
    }

    /// Readings of one parcela taken in `[since, until]`, oldest first.
    pub fn readings_for_parcela_between(
        &self,
        parcela_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM lecturas
                WHERE parcela_id = ?1 AND fecha >= ?2 AND fecha <= ?3
                ORDER BY fecha ASC
                "#,
            )?;
            let rows = stmt
                .query_map(
                    params![parcela_id, timestamp(since), timestamp(until)],
                    row_to_reading,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().flatten().collect())
        })
    }

    /// Readings of every parcela taken in `[since, until]`, oldest first.
    pub fn readings_between(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM lecturas
                WHERE fecha >= ?1 AND fecha <= ?2
                ORDER BY fecha ASC, parcela_id ASC
                "#,
            )?;
            let rows = stmt
                .query_map([timestamp(since), timestamp(until)], row_to_reading)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().flatten().collect())
        })
    }

    pub fn count_readings(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM lecturas", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }
}

const INSERT_READING: &str = r#"
    INSERT OR IGNORE INTO lecturas
        (parcela_id, fecha, humedad, ph, nitrogeno, temperatura, estado)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

fn insert_with(stmt: &mut Statement, reading: &SensorReading) -> rusqlite::Result<usize> {
    stmt.execute(params![
        reading.parcela_id,
        timestamp(reading.fecha),
        reading.humedad,
        reading.ph,
        reading.nitrogeno,
        reading.temperatura,
        reading.estado.map(|e| e.as_str()),
    ])
}

/// `Ok(None)` for a row whose timestamp cannot be parsed; such rows are skipped.
fn row_to_reading(row: &Row) -> rusqlite::Result<Option<SensorReading>> {
    let fecha_str: String = row.get("fecha")?;
    let estado_str: Option<String> = row.get("estado")?;

    let Ok(fecha) = DateTime::parse_from_rfc3339(&fecha_str) else {
        warn!(fecha = %fecha_str, "Unparseable reading timestamp in database, skipping");
        return Ok(None);
    };

    let estado = estado_str.as_ref().and_then(|s| {
        ReadingStatus::from_str(s).or_else(|| {
            warn!(estado = %s, "Unknown reading estado in database, ignoring");
            None
        })
    });

    Ok(Some(SensorReading {
        parcela_id: row.get("parcela_id")?,
        fecha: fecha.with_timezone(&Utc),
        humedad: row.get("humedad")?,
        ph: row.get("ph")?,
        nitrogeno: row.get("nitrogeno")?,
        temperatura: row.get("temperatura")?,
        estado,
    }))
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
