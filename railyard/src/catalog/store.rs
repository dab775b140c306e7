//! SQLite-backed catalog store.
//!
//! Create/lookup/listing for stations and locomotives, plus the two
//! assignment operations the arrival worker consumes:
//! [`SqliteCatalog::current_station`] (read) and [`SqliteCatalog::assign`]
//! (last-writer-wins write). `assign` deliberately performs no conflict
//! re-check; conflict detection happens at submission time in the
//! orchestrator.

use super::{EngineType, Locomotive, NewLocomotive, NewStation, Station, StationView};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

/// Default connection pool size for file-backed databases.
pub const DEFAULT_POOL_SIZE: u32 = 5;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Station name violates the unique constraint.
    #[error("Key (name)=({0}) already exists.")]
    DuplicateName(String),

    /// A station payload carried a negative duration.
    #[error("Duration {0} must be non-negative.")]
    NegativeDuration(&'static str),

    /// An assignment write referenced a locomotive that does not exist.
    #[error("no locomotive with id {0}")]
    MissingLocomotive(i64),

    /// A stored engine type could not be parsed.
    #[error("unknown engine type: {0}")]
    InvalidEngineType(String),

    /// Underlying database error.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Catalog store over a SQLite connection pool.
#[derive(Clone, Debug)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Connects to the database at the given URL.
    ///
    /// The schema is not created; call [`Self::init_schema`] once at startup.
    pub async fn connect(url: &str) -> Result<Self, CatalogError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_POOL_SIZE)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Opens a fresh in-memory database with the schema applied.
    ///
    /// A single connection is used so every operation sees the same
    /// in-memory database.
    pub async fn in_memory() -> Result<Self, CatalogError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let catalog = Self { pool };
        catalog.init_schema().await?;
        Ok(catalog)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the tables if they do not exist.
    pub async fn init_schema(&self) -> Result<(), CatalogError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS railwaystation (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                longitude REAL NOT NULL,
                latitude REAL NOT NULL,
                arrival_duration REAL NOT NULL,
                departure_duration REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS locomotive (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                number TEXT NOT NULL,
                engine_type TEXT NOT NULL,
                railwaystation_id INTEGER REFERENCES railwaystation(id)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a station, returning the stored record.
    ///
    /// Both durations are simulated transit times and must be non-negative.
    pub async fn create_station(&self, new: NewStation) -> Result<Station, CatalogError> {
        if new.arrival_duration < 0.0 {
            return Err(CatalogError::NegativeDuration("arrival_duration"));
        }
        if new.departure_duration < 0.0 {
            return Err(CatalogError::NegativeDuration("departure_duration"));
        }

        let result = sqlx::query(
            "INSERT INTO railwaystation
                (name, longitude, latitude, arrival_duration, departure_duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&new.name)
        .bind(new.longitude)
        .bind(new.latitude)
        .bind(new.arrival_duration)
        .bind(new.departure_duration)
        .execute(&self.pool)
        .await;

        let result = match result {
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(CatalogError::DuplicateName(new.name));
            }
            other => other?,
        };

        Ok(Station {
            id: result.last_insert_rowid(),
            name: new.name,
            longitude: new.longitude,
            latitude: new.latitude,
            arrival_duration: new.arrival_duration,
            departure_duration: new.departure_duration,
        })
    }

    /// Looks up a station by id.
    pub async fn station(&self, id: i64) -> Result<Option<Station>, CatalogError> {
        let row = sqlx::query("SELECT * FROM railwaystation WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(station_from_row).transpose()
    }

    /// Lists stations ordered by name, each with its locomotives.
    ///
    /// With `locomotive_name` set, only stations currently hosting a
    /// locomotive with that name are returned.
    pub async fn list_stations(
        &self,
        locomotive_name: Option<&str>,
    ) -> Result<Vec<StationView>, CatalogError> {
        let rows = match locomotive_name {
            Some(name) => {
                sqlx::query(
                    "SELECT * FROM railwaystation s
                     WHERE EXISTS (
                         SELECT 1 FROM locomotive l
                         WHERE l.railwaystation_id = s.id AND l.name = ?1
                     )
                     ORDER BY s.name",
                )
                .bind(name)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM railwaystation ORDER BY name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut views = Vec::with_capacity(rows.len());
        for row in &rows {
            let station = station_from_row(row)?;
            let locomotives = self.locomotives_at(station.id).await?;
            views.push(StationView::new(station, locomotives));
        }
        Ok(views)
    }

    /// Inserts a locomotive with no station assignment.
    pub async fn create_locomotive(&self, new: NewLocomotive) -> Result<Locomotive, CatalogError> {
        let result = sqlx::query(
            "INSERT INTO locomotive (name, number, engine_type, railwaystation_id)
             VALUES (?1, ?2, ?3, NULL)",
        )
        .bind(&new.name)
        .bind(&new.number)
        .bind(new.engine_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(Locomotive {
            id: result.last_insert_rowid(),
            name: new.name,
            number: new.number,
            engine_type: new.engine_type,
            railwaystation_id: None,
        })
    }

    /// Looks up a locomotive by id.
    pub async fn locomotive(&self, id: i64) -> Result<Option<Locomotive>, CatalogError> {
        let row = sqlx::query("SELECT * FROM locomotive WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(locomotive_from_row).transpose()
    }

    /// Locomotives currently at the given station, ordered by id.
    pub async fn locomotives_at(&self, station_id: i64) -> Result<Vec<Locomotive>, CatalogError> {
        let rows = sqlx::query("SELECT * FROM locomotive WHERE railwaystation_id = ?1 ORDER BY id")
            .bind(station_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(locomotive_from_row).collect()
    }

    /// Reads a locomotive's current station reference.
    ///
    /// `None` when the locomotive is unassigned or unknown.
    pub async fn current_station(&self, locomotive_id: i64) -> Result<Option<i64>, CatalogError> {
        Ok(self
            .locomotive(locomotive_id)
            .await?
            .and_then(|locomotive| locomotive.railwaystation_id))
    }

    /// Writes a locomotive's station reference.
    ///
    /// Last-writer-wins; no conflict re-check.
    pub async fn assign(&self, locomotive_id: i64, station_id: i64) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE locomotive SET railwaystation_id = ?1 WHERE id = ?2")
            .bind(station_id)
            .bind(locomotive_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::MissingLocomotive(locomotive_id));
        }
        Ok(())
    }
}

fn station_from_row(row: &SqliteRow) -> Result<Station, CatalogError> {
    Ok(Station {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        longitude: row.try_get("longitude")?,
        latitude: row.try_get("latitude")?,
        arrival_duration: row.try_get("arrival_duration")?,
        departure_duration: row.try_get("departure_duration")?,
    })
}

fn locomotive_from_row(row: &SqliteRow) -> Result<Locomotive, CatalogError> {
    let raw_engine: String = row.try_get("engine_type")?;
    let engine_type =
        EngineType::parse(&raw_engine).ok_or(CatalogError::InvalidEngineType(raw_engine))?;
    Ok(Locomotive {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        number: row.try_get("number")?,
        engine_type,
        railwaystation_id: row.try_get("railwaystation_id")?,
    })
}
