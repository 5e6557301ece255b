use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Table definitions. References between tables are plain integer columns;
/// referential integrity on delete is enforced by the cascade coordinator,
/// not by the database. AUTOINCREMENT keeps row ids from ever being reused.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        object_key TEXT NOT NULL UNIQUE,
        original_name TEXT NOT NULL,
        content_type TEXT NOT NULL,
        file_size INTEGER,
        uploaded_by TEXT,
        description TEXT,
        material TEXT,
        part_number TEXT,
        quantity_unit TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_id INTEGER NOT NULL,
        object_key TEXT NOT NULL,
        part_name TEXT NOT NULL,
        material TEXT,
        part_number TEXT,
        quantity_unit TEXT,
        uploaded_by TEXT,
        description TEXT,
        is_read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS quotes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        notification_id INTEGER NOT NULL,
        file_id INTEGER NOT NULL,
        part_name TEXT NOT NULL,
        part_number TEXT,
        material TEXT,
        quantity_unit TEXT,
        material_cost REAL NOT NULL,
        labor_cost REAL NOT NULL,
        machine_time_cost REAL NOT NULL,
        subtotal REAL NOT NULL,
        profit_margin_percent REAL NOT NULL,
        profit_amount REAL NOT NULL,
        total_price REAL NOT NULL,
        status TEXT NOT NULL,
        notes TEXT,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        accepted_at TEXT,
        rejected_at TEXT,
        rejection_reason TEXT
    )",
    "CREATE TABLE IF NOT EXISTS quote_notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        quote_id INTEGER NOT NULL,
        file_id INTEGER NOT NULL,
        sent_by TEXT NOT NULL,
        sent_to TEXT NOT NULL,
        part_name TEXT NOT NULL,
        is_read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS material_prices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        material_name TEXT NOT NULL UNIQUE,
        base_price_per_unit REAL NOT NULL,
        currency TEXT NOT NULL DEFAULT 'INR',
        unit TEXT NOT NULL DEFAULT 'kg',
        machining_complexity_factor REAL NOT NULL DEFAULT 1.0,
        minimum_order_quantity INTEGER NOT NULL DEFAULT 1,
        bulk_discount_threshold INTEGER NOT NULL DEFAULT 10,
        bulk_discount_percentage REAL NOT NULL DEFAULT 5.0,
        labor_cost_per_hour REAL NOT NULL DEFAULT 500.0,
        estimated_hours_per_unit REAL NOT NULL DEFAULT 1.0,
        markup_percentage REAL NOT NULL DEFAULT 20.0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_notifications_file_id ON notifications (file_id)",
    "CREATE INDEX IF NOT EXISTS idx_quotes_file_id ON quotes (file_id)",
    "CREATE INDEX IF NOT EXISTS idx_quotes_notification_id ON quotes (notification_id)",
    "CREATE INDEX IF NOT EXISTS idx_quotes_created_by ON quotes (created_by)",
    "CREATE INDEX IF NOT EXISTS idx_quote_notifications_quote_id ON quote_notifications (quote_id)",
    "CREATE INDEX IF NOT EXISTS idx_quote_notifications_sent_to ON quote_notifications (sent_to)",
];

/// Open the pool described by the configuration and make sure the schema
/// exists.
pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<SqlitePool> {
    info!("Connecting to database: {}", config.url);

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| RepositoryError::connection(format!("Invalid database url: {}", e)))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| RepositoryError::connection(format!("Failed to connect: {}", e)))?;

    init_schema(&pool).await?;

    info!("Database connection established");
    Ok(pool)
}

/// Execute the schema DDL. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> RepositoryResult<()> {
    for statement in SCHEMA {
        debug!("Applying schema statement");
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
