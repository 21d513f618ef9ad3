use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS parcelas (
        parcela_id TEXT PRIMARY KEY,
        nombre TEXT NOT NULL,
        tipo_cultivo TEXT NOT NULL,
        area_hectareas REAL,
        ubicacion TEXT,
        estado TEXT NOT NULL DEFAULT 'ACTIVA',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS lecturas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        parcela_id TEXT NOT NULL REFERENCES parcelas(parcela_id) ON DELETE CASCADE,
        fecha TEXT NOT NULL,
        humedad REAL,
        ph REAL,
        nitrogeno REAL,
        temperatura REAL,
        estado TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(parcela_id, fecha)
    );

    CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Add indexes
    r#"
    CREATE INDEX IF NOT EXISTS idx_lecturas_parcela_fecha
        ON lecturas(parcela_id, fecha);
    CREATE INDEX IF NOT EXISTS idx_lecturas_fecha
        ON lecturas(fecha);
    "#,
    // Migration 3: Per-parcela optimal ranges and sowing date
    r#"
    ALTER TABLE parcelas ADD COLUMN fecha_siembra TEXT;
    ALTER TABLE parcelas ADD COLUMN humedad_optima_min REAL;
    ALTER TABLE parcelas ADD COLUMN humedad_optima_max REAL;
    ALTER TABLE parcelas ADD COLUMN ph_optimo_min REAL;
    ALTER TABLE parcelas ADD COLUMN ph_optimo_max REAL;
    ALTER TABLE parcelas ADD COLUMN nitrogeno_optimo_min REAL;
    ALTER TABLE parcelas ADD COLUMN nitrogeno_optimo_max REAL;
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        // Ensure schema_migrations table exists
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        let current_version: i32 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;

        // Apply pending migrations atomically
        let tx = conn.transaction()?;
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                tx.execute_batch(migration)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
            }
        }
        tx.commit()?;

        Ok(())
    })
}
