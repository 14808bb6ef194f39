pub mod error;
pub mod models;
pub mod read_only;
pub mod value;

pub use error::StoreError;

use futures::future::join_all;
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::{str::FromStr, time::Duration};

use models::{
    ContactMessage, MessageStatus, NewContactMessage, Project, Service, TableColumn, TableSummary,
};

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

fn log_url(url: &str) {
    tracing::debug!(
        "Database URL: {}",
        url.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != ':' && c != '/' && c != '.',
            "*"
        )
    );
}

pub async fn init_pool(config: &DbConfig) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Initializing database connection pool...");
    log_url(&config.url);

    // WAL keeps readers on the admin pool from blocking writers.
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");

    Ok(pool)
}

/// Pool for ad-hoc admin queries. Its connections are opened read-only, so
/// nothing run on them can write, whatever pragmas the statement sets.
///
/// The database file must already exist; open it with [`init_pool`] first.
pub async fn init_read_pool(config: &DbConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(false)
        .read_only(true)
        .pragma("query_only", "ON");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    tracing::info!("Read-only query pool initialized");

    Ok(pool)
}

/// Creates the site tables if they do not exist. Existing tables are left untouched.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            category TEXT,
            featured INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_projects_featured_created
        ON projects(featured, created_at)
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            order_index INTEGER NOT NULL DEFAULT 0
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_messages (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            company TEXT,
            service TEXT,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'new' CHECK (status IN ('new', 'read', 'replied')),
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_contact_messages_created
        ON contact_messages(created_at)
    "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Quotes a table name as an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Pairs table names with their counts. A failed count becomes 0 for that table only.
fn summarize(names: Vec<String>, counts: Vec<Result<i64, StoreError>>) -> Vec<TableSummary> {
    names
        .into_iter()
        .zip(counts)
        .map(|(name, count)| {
            let count = count.unwrap_or_else(|e| {
                tracing::warn!(table = %name, error = %e, "failed to count table rows");
                0
            });
            TableSummary { name, count }
        })
        .collect()
}

/// One page of an arbitrary table.
#[derive(Debug, Clone)]
pub struct TablePage {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub total: i64,
}

/// Result of an ad-hoc read query.
#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
}

/// Query layer over the site database.
///
/// Every method returns a [`StoreError`] instead of falling back to defaults;
/// handlers decide how a failure is presented.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    read_pool: SqlitePool,
}

impl Store {
    /// `read_pool` serves [`Store::run_read_query`] and should come from [`init_read_pool`].
    pub fn new(pool: SqlitePool, read_pool: SqlitePool) -> Self {
        Self { pool, read_pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.read_pool.close().await;
        self.pool.close().await;
    }

    /// Round-trips a trivial query and reports how long it took.
    pub async fn ping(&self) -> Result<Duration, StoreError> {
        let start = std::time::Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }

    pub async fn featured_projects(&self, limit: i64) -> Result<Vec<Project>, StoreError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, image_url, category, featured, created_at
            FROM projects
            WHERE featured = 1
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn project(&self, id: i64) -> Result<Option<Project>, StoreError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, image_url, category, featured, created_at
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    pub async fn services(&self) -> Result<Vec<Service>, StoreError> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT id, name, description, icon, order_index FROM services ORDER BY order_index ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    /// Stores a submission with status `new` and returns its id.
    pub async fn insert_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contact_messages (name, email, phone, company, service, message, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.phone)
        .bind(&message.company)
        .bind(&message.service)
        .bind(&message.message)
        .bind(MessageStatus::New)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn contact_messages(&self) -> Result<Vec<ContactMessage>, StoreError> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, name, email, phone, company, service, message, status, created_at
            FROM contact_messages
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    /// Returns `false` when no message has the given id.
    pub async fn set_message_status(
        &self,
        id: i64,
        status: MessageStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE contact_messages SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// User table names, skipping SQLite internals and host-reserved tables.
    pub async fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let names: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_cf_%'",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    pub async fn row_count(&self, table: &str) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Lists tables with their row counts. A table whose count fails is reported with 0.
    pub async fn table_summaries(&self) -> Result<Vec<TableSummary>, StoreError> {
        let names = self.table_names().await?;

        let counts = join_all(names.iter().map(|name| self.row_count(name))).await;

        Ok(summarize(names, counts))
    }

    pub async fn table_columns(&self, table: &str) -> Result<Vec<TableColumn>, StoreError> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table));
        let columns = sqlx::query_as::<_, TableColumn>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(columns)
    }

    pub async fn table_page(
        &self,
        table: &str,
        limit: i64,
        offset: i64,
    ) -> Result<TablePage, StoreError> {
        let columns = self
            .table_columns(table)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        let sql = format!("SELECT * FROM {} LIMIT ? OFFSET ?", quote_identifier(table));
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = self.row_count(table).await?;

        Ok(TablePage {
            columns,
            rows: value::rows_to_json(&rows)?,
            total,
        })
    }

    /// Runs a statement that already passed [`read_only::check_read_only`]
    /// on the read-only pool.
    pub async fn run_read_query(&self, sql: &str) -> Result<QueryOutput, StoreError> {
        let rows = sqlx::query(sql)
            .persistent(false)
            .fetch_all(&self.read_pool)
            .await?;

        Ok(QueryOutput {
            columns: rows.first().map(value::column_names).unwrap_or_default(),
            rows: value::rows_to_json(&rows)?,
        })
    }
}
