//! Access to the logger's `datalog` table: the batches each view is built
//! from, plus appending uploaded lines.
//!
//! Batches are loaded whole, in display order, and never aggregated in SQL.
//!
//! | Batch | Time text | Rows |
//! |-------|-----------|------|
//! | day   | `HH:MM:SS` | `DATE(date) = day` |
//! | week  | day offset from `day - 6`, 4 decimals | `day - 6 ..= day` |

use chrono::{Duration, Local, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    FromQueryResult, Set, Statement,
};
use sea_orm_migration::MigratorTrait;

use crate::analysis::RawRecord;
use crate::config::Config;
use crate::entity::datalog;
use crate::error::AppResult;

/// Days covered by a week batch, ending with the selected day.
pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, FromQueryResult)]
struct BatchRow {
    t: String,
    source: String,
    value: String,
}

impl From<BatchRow> for RawRecord {
    fn from(row: BatchRow) -> Self {
        Self::new(row.t, row.source, row.value)
    }
}

/// Connect to the database and bring the schema up to date.
///
/// # Errors
///
/// Returns `DbErr` if the connection or a migration fails.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    if config.database_url.contains(":memory:") {
        // Every pooled connection would otherwise get its own empty database.
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    tracing::info!("Database connection established");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations completed");

    Ok(db)
}

fn iso(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

async fn query_batch(
    db: &DatabaseConnection,
    sql: &str,
    values: Vec<sea_orm::Value>,
) -> AppResult<Vec<RawRecord>> {
    let records = db
        .query_all(Statement::from_sql_and_values(
            db.get_database_backend(),
            sql,
            values,
        ))
        .await?
        .into_iter()
        .filter_map(|row| BatchRow::from_query_result(&row, "").ok())
        .map(RawRecord::from)
        .collect();
    Ok(records)
}

/// All lines logged on `day`, ordered by time of day.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn day_batch(db: &DatabaseConnection, day: NaiveDate) -> AppResult<Vec<RawRecord>> {
    let records = query_batch(
        db,
        "SELECT COALESCE(TIME(date), '') AS t, COALESCE(source, '') AS source, \
         COALESCE(value, '') AS value FROM datalog \
         WHERE DATE(date) = DATE(?) ORDER BY t, id",
        vec![iso(day).into()],
    )
    .await?;

    tracing::debug!(day = %day, records = records.len(), "day_batch_loaded");
    Ok(records)
}

/// Lines of the seven days ending with `day`. The time text is the
/// fractional number of days since the start of the first day.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn week_batch(db: &DatabaseConnection, day: NaiveDate) -> AppResult<Vec<RawRecord>> {
    let first = day - Duration::days(WEEK_DAYS - 1);
    let records = query_batch(
        db,
        "SELECT COALESCE(printf('%.4f', julianday(date) - julianday(DATE(?))), '0') AS t, \
         COALESCE(source, '') AS source, COALESCE(value, '') AS value FROM datalog \
         WHERE DATE(date) BETWEEN DATE(?) AND DATE(?) ORDER BY date, id",
        vec![iso(first).into(), iso(first).into(), iso(day).into()],
    )
    .await?;

    tracing::debug!(first = %first, last = %day, records = records.len(), "week_batch_loaded");
    Ok(records)
}

/// Store one uploaded line stamped with the current local time.
///
/// # Errors
///
/// Returns `AppError::Database` if the insert fails.
pub async fn append(db: &DatabaseConnection, source: &str, value: &str) -> AppResult<datalog::Model> {
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    insert_at(db, &stamp, source, value).await
}

/// Store one line with an explicit `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// # Errors
///
/// Returns `AppError::Database` if the insert fails.
pub async fn insert_at(
    db: &DatabaseConnection,
    stamp: &str,
    source: &str,
    value: &str,
) -> AppResult<datalog::Model> {
    let model = datalog::ActiveModel {
        date: Set(Some(stamp.to_string())),
        source: Set(Some(source.to_string())),
        value: Set(Some(value.to_string())),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(id = model.id, source = %source, "record_appended");
    Ok(model)
}
