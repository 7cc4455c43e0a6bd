//! Novelty store: the durable set of job postings already sent to the operator.
//!
//! [`NoveltyStore`] is the interface the pipeline depends on. [`AlertStore`]
//! implements it on an embedded libSQL database.
//!
//! **Access rules:**
//! - One writer per database; overlapping runs are not supported.
//! - Rows are only ever inserted. Nothing updates or deletes them.
//! - Writes touch only `title`, `department_name`, `last_date` and `pdf_link`,
//!   so a `job_alerts` table created elsewhere with just those columns works.

mod migrations;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobwatch_shared::{JobRecord, JobWatchError, Result};
use libsql::{Connection, Database, params};

/// Persisted record of which document links have been notified.
#[async_trait]
pub trait NoveltyStore: Send + Sync {
    /// Whether a posting with exactly this link has been recorded.
    async fn exists(&self, link: &str) -> Result<bool>;

    /// Remember `job` as notified. Does not check for an existing row first.
    async fn record(&self, job: &JobRecord) -> Result<()>;
}

/// One stored alert, as returned by [`AlertStore::list_recent`].
#[derive(Debug, Clone)]
pub struct StoredAlert {
    pub job: JobRecord,
    /// `None` when the table has no `notified_at` column or the row predates it.
    pub notified_at: Option<DateTime<Utc>>,
}

/// libSQL-backed [`NoveltyStore`].
pub struct AlertStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    has_notified_at: bool,
}

impl AlertStore {
    /// Open or create a database at `path` and bring its schema up to date.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| JobWatchError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| JobWatchError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| JobWatchError::Storage(e.to_string()))?;

        let mut store = Self {
            db,
            conn,
            has_notified_at: false,
        };
        store.run_migrations().await?;
        store.has_notified_at = store.has_column("job_alerts", "notified_at").await?;
        if !store.has_notified_at {
            tracing::debug!("job_alerts has no notified_at column; history shows no send times");
        }
        Ok(store)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    JobWatchError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    async fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
                params![table, column],
            )
            .await
            .map_err(|e| JobWatchError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n > 0)
                .map_err(|e| JobWatchError::Storage(e.to_string())),
            Ok(None) => Ok(false),
            Err(e) => Err(JobWatchError::Storage(e.to_string())),
        }
    }

    /// Number of stored alerts.
    pub async fn count(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM job_alerts", params![])
            .await
            .map_err(|e| JobWatchError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n as u64)
                .map_err(|e| JobWatchError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(JobWatchError::Storage(e.to_string())),
        }
    }

    /// Most recently notified alerts first, at most `limit` of them.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<StoredAlert>> {
        let sql = if self.has_notified_at {
            "SELECT title, department_name, last_date, pdf_link, notified_at
             FROM job_alerts ORDER BY rowid DESC LIMIT ?1"
        } else {
            "SELECT title, department_name, last_date, pdf_link, NULL
             FROM job_alerts ORDER BY rowid DESC LIMIT ?1"
        };
        let mut rows = self
            .conn
            .query(sql, params![i64::from(limit)])
            .await
            .map_err(|e| JobWatchError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_alert(&row)?);
        }
        Ok(results)
    }
}

#[async_trait]
impl NoveltyStore for AlertStore {
    async fn exists(&self, link: &str) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM job_alerts WHERE pdf_link = ?1 LIMIT 1)",
                params![link],
            )
            .await
            .map_err(|e| JobWatchError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|found| found != 0)
                .map_err(|e| JobWatchError::Storage(e.to_string())),
            Ok(None) => Ok(false),
            Err(e) => Err(JobWatchError::Storage(e.to_string())),
        }
    }

    async fn record(&self, job: &JobRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO job_alerts (title, department_name, last_date, pdf_link)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    job.title.as_str(),
                    job.department_name.as_str(),
                    job.last_date.as_str(),
                    job.document_link.as_str(),
                ],
            )
            .await
            .map_err(|e| JobWatchError::Storage(e.to_string()))?;
        Ok(())
    }
}

fn row_to_alert(row: &libsql::Row) -> Result<StoredAlert> {
    Ok(StoredAlert {
        job: JobRecord {
            title: row
                .get::<String>(0)
                .map_err(|e| JobWatchError::Storage(e.to_string()))?,
            department_name: row
                .get::<String>(1)
                .map_err(|e| JobWatchError::Storage(e.to_string()))?,
            last_date: row
                .get::<String>(2)
                .map_err(|e| JobWatchError::Storage(e.to_string()))?,
            document_link: row
                .get::<String>(3)
                .map_err(|e| JobWatchError::Storage(e.to_string()))?,
        },
        notified_at: match row
            .get_value(4)
            .map_err(|e| JobWatchError::Storage(e.to_string()))?
        {
            libsql::Value::Text(s) => Some(
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| JobWatchError::Storage(format!("invalid date: {e}")))?,
            ),
            _ => None,
        },
    })
}
