//! SQLite-backed order store.
//!
//! One `stops` table, one row per stop. Dates are stored as ISO-8601 text
//! and statuses as their wire names, so fixtures stay readable with plain
//! `sqlite3`.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, Row, ToSql, params};
use thiserror::Error;

use crate::{DriverId, FulfillmentStatus, RoutePosition, Stop, StopId};

use super::{OrderStore, OrderStoreError, StopFilter};

const CREATE_STOPS_TABLE: &str = "CREATE TABLE IF NOT EXISTS stops (
    id INTEGER PRIMARY KEY,
    driver_id INTEGER,
    delivery_date TEXT,
    destination_zip TEXT,
    fulfillment_status TEXT NOT NULL,
    route_position INTEGER,
    route_override INTEGER NOT NULL DEFAULT 0
)";

const STOP_COLUMNS: &str = "id, driver_id, delivery_date, destination_zip, \
                            fulfillment_status, route_position, route_override";

/// Error raised when opening the database or reading persisted stops.
#[derive(Debug, Error)]
pub enum SqliteOrderStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the `stops` table failed.
    #[error("failed to create stops table: {source}")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Inserting a stop row failed.
    #[error("failed to insert stop {id}: {source}")]
    InsertStop {
        /// Identifier of the stop being inserted.
        id: StopId,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A row held a status text outside the known wire names.
    #[error("stop {id} has unknown fulfillment status '{status}'")]
    InvalidStatus {
        /// Identifier of the offending stop.
        id: StopId,
        /// Status text as stored.
        status: String,
    },
    /// A row held a delivery date that is not ISO-8601.
    #[error("stop {id} has unparseable delivery date '{date}'")]
    InvalidDate {
        /// Identifier of the offending stop.
        id: StopId,
        /// Date text as stored.
        date: String,
        /// Date parsing failure.
        #[source]
        source: chrono::ParseError,
    },
    /// A row held a zero route position.
    #[error("stop {id} has invalid route position {position}")]
    InvalidPosition {
        /// Identifier of the offending stop.
        id: StopId,
        /// Position value as stored.
        position: u32,
    },
    /// Generic SQLite error when reading stop rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-write order store backed by a single SQLite database.
///
/// The connection sits behind a `Mutex` so the store can be shared across
/// threads; statements are short-lived and the lock is held per call.
pub struct SqliteOrderStore {
    connection: Mutex<Connection>,
    path: PathBuf,
}

impl fmt::Debug for SqliteOrderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteOrderStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteOrderStore {
    /// Open an existing stops database read-write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteOrderStoreError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|source| SqliteOrderStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            connection: Mutex::new(connection),
            path: path.to_path_buf(),
        })
    }

    /// Create (or open) a stops database and ensure the schema exists.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SqliteOrderStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteOrderStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        connection
            .execute(CREATE_STOPS_TABLE, [])
            .map_err(|source| SqliteOrderStoreError::CreateSchema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
            path: path.to_path_buf(),
        })
    }

    /// Insert or replace stops, e.g. when importing a fixture.
    pub fn insert_stops(&self, stops: &[Stop]) -> Result<(), SqliteOrderStoreError> {
        let connection = self.lock_connection();
        for stop in stops {
            connection
                .execute(
                    "INSERT OR REPLACE INTO stops (id, driver_id, delivery_date, \
                     destination_zip, fulfillment_status, route_position, route_override) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        stop.id.0,
                        stop.driver.map(|driver| driver.0),
                        stop.delivery_date.map(|date| date.to_string()),
                        stop.destination_zip,
                        stop.fulfillment_status.as_str(),
                        stop.route_position.map(RoutePosition::get),
                        stop.route_override,
                    ],
                )
                .map_err(|source| SqliteOrderStoreError::InsertStop {
                    id: stop.id,
                    source,
                })?;
        }
        Ok(())
    }

    /// Load a driver's visible stops ordered by id.
    fn load_stops(
        &self,
        driver: DriverId,
        filter: &StopFilter,
    ) -> Result<Vec<Stop>, SqliteOrderStoreError> {
        let date_text = filter.date.map(|date| date.to_string());
        let status_text = filter.status.map(|status| status.as_str());
        let driver_id = driver.0;

        let mut sql = format!(
            "SELECT {STOP_COLUMNS} FROM stops WHERE (driver_id = ? OR driver_id IS NULL)"
        );
        let mut bindings: Vec<&dyn ToSql> = vec![&driver_id];
        if let Some(ref date) = date_text {
            sql.push_str(" AND delivery_date = ?");
            bindings.push(date);
        }
        if let Some(ref status) = status_text {
            sql.push_str(" AND fulfillment_status = ?");
            bindings.push(status);
        }
        sql.push_str(" ORDER BY id");

        let connection = self.lock_connection();
        let mut statement = connection.prepare(&sql)?;
        let mut rows = statement.query(&bindings[..])?;
        let mut stops = Vec::new();
        while let Some(row) = rows.next()? {
            stops.push(stop_from_row(row)?);
        }
        Ok(stops)
    }

    fn lock_connection(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another thread panicked mid-statement;
        // the connection itself remains usable.
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn stop_from_row(row: &Row<'_>) -> Result<Stop, SqliteOrderStoreError> {
    let id: u64 = row.get(0)?;
    let driver: Option<u64> = row.get(1)?;
    let date_text: Option<String> = row.get(2)?;
    let destination_zip: Option<String> = row.get(3)?;
    let status_text: String = row.get(4)?;
    let position: Option<u32> = row.get(5)?;
    let route_override: bool = row.get(6)?;

    let fulfillment_status = FulfillmentStatus::from_str(&status_text).map_err(|_| {
        SqliteOrderStoreError::InvalidStatus {
            id: StopId(id),
            status: status_text.clone(),
        }
    })?;
    let delivery_date = date_text
        .map(|date| {
            NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|source| {
                SqliteOrderStoreError::InvalidDate {
                    id: StopId(id),
                    date,
                    source,
                }
            })
        })
        .transpose()?;
    let route_position = position
        .map(|value| {
            RoutePosition::new(value).ok_or(SqliteOrderStoreError::InvalidPosition {
                id: StopId(id),
                position: value,
            })
        })
        .transpose()?;

    Ok(Stop {
        id: StopId(id),
        driver: driver.map(DriverId),
        delivery_date,
        destination_zip,
        fulfillment_status,
        route_position,
        route_override,
    })
}

impl OrderStore for SqliteOrderStore {
    fn list_stops(
        &self,
        driver: DriverId,
        filter: &StopFilter,
    ) -> Result<Vec<Stop>, OrderStoreError> {
        self.load_stops(driver, filter)
            .map_err(|err| OrderStoreError::ListFailed {
                driver,
                message: err.to_string(),
            })
    }

    fn update_route_position(
        &self,
        stop: StopId,
        position: RoutePosition,
    ) -> Result<(), OrderStoreError> {
        let connection = self.lock_connection();
        let affected = connection
            .execute(
                "UPDATE stops SET route_position = ?1 WHERE id = ?2",
                params![position.get(), stop.0],
            )
            .map_err(|err| OrderStoreError::UpdateFailed {
                stop,
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(OrderStoreError::StopNotFound { stop });
        }
        Ok(())
    }
}
