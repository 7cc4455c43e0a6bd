//! SQL migration definitions for the jobwatch database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: job_alerts keyed by pdf_link",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Postings already sent to the operator; append-only.
-- A pre-existing job_alerts table is kept as is and may lack notified_at.
CREATE TABLE IF NOT EXISTS job_alerts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    department_name TEXT NOT NULL,
    last_date       TEXT NOT NULL,
    pdf_link        TEXT NOT NULL UNIQUE,
    notified_at     TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
