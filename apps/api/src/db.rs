use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteSynchronous,
};
use tracing::{debug, info};

/// Full schema for the submission store. Every statement is idempotent so it
/// can be replayed on each pool start.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS submissions (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    participation_type     TEXT NOT NULL CHECK (participation_type IN ('solo', 'team')),
    contact_person_name    TEXT NOT NULL,
    mobile_number          TEXT NOT NULL,
    email                  TEXT NOT NULL,
    team_name              TEXT,
    concept                TEXT NOT NULL,
    objective              TEXT NOT NULL,
    requirements           TEXT NOT NULL,
    technical_applications TEXT NOT NULL,
    slides_link            TEXT NOT NULL,
    submission_timestamp   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS team_members (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
    name          TEXT NOT NULL CHECK (length(trim(name)) > 0),
    email         TEXT NOT NULL CHECK (length(trim(email)) > 0)
);

CREATE INDEX IF NOT EXISTS idx_team_members_submission_id
    ON team_members(submission_id);

CREATE INDEX IF NOT EXISTS idx_submissions_timestamp
    ON submissions(submission_timestamp);

CREATE TRIGGER IF NOT EXISTS team_members_cap
BEFORE INSERT ON team_members
WHEN (SELECT COUNT(*) FROM team_members WHERE submission_id = NEW.submission_id) >= 3
BEGIN
    SELECT RAISE(ABORT, 'a submission may have at most 3 team members');
END
"#;

/// Opens a SQLite pool on `path`, creating the file if needed, and applies the schema.
/// The parent directory must already exist.
pub async fn create_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    info!("Opening SQLite database at {}", path.display());

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Opens an existing database without write access. Nothing is created,
/// converted or migrated, so the file is left exactly as found.
pub async fn open_read_only(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    debug!("Opening SQLite database at {} read-only", path.display());

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// Whether both submission tables exist on the connection's database.
pub async fn has_schema(conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('submissions', 'team_members')",
    )
    .fetch_one(conn)
    .await?;
    Ok(tables == 2)
}

/// Replays the schema. Safe to call any number of times.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // The trigger body contains a ';', so split on blank lines between statements.
    for statement in SCHEMA.split("\n\n") {
        let stmt = statement.trim();
        if stmt.is_empty() {
            continue;
        }
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
