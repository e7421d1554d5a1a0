use crate::models::error::StorageError;
use crate::repo::DurableSlot;
use log::{debug, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

type DbPool = Pool<SqliteConnectionManager>;

/// History slot stored as one row of the `History_Slots` table
pub struct SqliteSlot {
    pool: DbPool,
    slot: String,
}

impl SqliteSlot {
    /// Open (or create) `db_file` and make sure the slot table exists.
    ///
    /// `:memory:` gets a private shared-cache database so every pooled
    /// connection sees the same data.
    pub fn open(db_file: &str, slot: &str) -> Result<Self, StorageError> {
        let is_in_memory = db_file == ":memory:" || db_file.starts_with("file::memory:");
        let use_wal = !is_in_memory;

        let location = if db_file == ":memory:" {
            format!("file:rustylogview-{}?mode=memory&cache=shared", uuid::Uuid::new_v4())
        } else {
            db_file.to_string()
        };

        info!("Initializing database connection pool: {}", location);

        let manager = SqliteConnectionManager::file(&location).with_init(move |conn| {
            let mut pragmas = String::from(
                "PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            );

            if use_wal {
                pragmas.push_str(" PRAGMA journal_mode = WAL;");
            }

            conn.execute_batch(&pragmas)
        });

        // Writes are serialized by the reconciler, so a small pool is enough
        let pool_size = num_cpus::get_physical().min(4) + 1;
        let pool = r2d2::Pool::builder()
            .max_size(pool_size as u32)
            .build(manager)
            .map_err(|cause| StorageError::Pool {
                path: location.clone(),
                cause,
            })?;

        info!("Database pool created with {} connections", pool_size);

        let slot = SqliteSlot {
            pool,
            slot: slot.to_string(),
        };
        slot.setup_database()?;
        Ok(slot)
    }

    fn setup_database(&self) -> Result<(), StorageError> {
        info!("Initializing database schema");
        let setup_queries = "BEGIN;
        PRAGMA ENCODING = 'UTF-8';

        CREATE TABLE IF NOT EXISTS History_Slots(
            Name          TEXT    not null
                constraint History_Slots_pk
                    primary key,
            Value         TEXT    not null,
            Updated_At    integer not null);

        COMMIT;";

        let conn = self.pool.get()?;
        conn.execute_batch(setup_queries)
            .map_err(|cause| StorageError::Query {
                operation: "create tables".to_string(),
                cause,
            })?;
        info!("Database schema initialized successfully");
        Ok(())
    }
}

impl DurableSlot for SqliteSlot {
    fn name(&self) -> &str {
        &self.slot
    }

    fn read(&self) -> Result<Option<String>, StorageError> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT Value FROM History_Slots WHERE Name=?1",
            [&self.slot],
            |row| row.get(0),
        )
        .optional()
        .map_err(|cause| StorageError::Query {
            operation: format!("read slot {}", self.slot),
            cause,
        })
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        let updated_at = chrono::Utc::now().timestamp();

        // Single-statement upsert: readers see either the old or the new blob
        let changed = conn.execute(
            "INSERT INTO History_Slots (Name, Value, Updated_At)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (Name) DO UPDATE SET
                Value=excluded.Value,
                Updated_At=excluded.Updated_At;",
            (&self.slot, value, updated_at),
        )
        .map_err(|cause| StorageError::Write {
            slot: self.slot.clone(),
            cause,
        })?;

        if changed == 0 {
            return Err(StorageError::Rejected(self.slot.clone()));
        }

        debug!("Wrote {} bytes to slot {}", value.len(), self.slot);
        Ok(())
    }
}
