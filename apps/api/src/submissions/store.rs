//! SQLite-backed persistence for submissions and their team members.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::db::{create_pool, has_schema, open_read_only};
use crate::submissions::models::{
    NewSubmission, ParticipationType, Submission, SubmissionRow, TeamMember,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to prepare storage at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt submission row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Handle to the submission database. Cheap to clone; clones share one pool.
///
/// The write pool is opened on first write. Until then reads go through a
/// read-only pool and never create, convert or migrate the file; a location
/// that does not exist yet, or holds no tables, reads as empty.
#[derive(Clone)]
pub struct SubmissionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    pool: OnceCell<SqlitePool>,
    reader: OnceCell<SqlitePool>,
}

impl SubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path: path.into(),
                pool: OnceCell::new(),
                reader: OnceCell::new(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Writes a submission and its team members in one transaction.
    /// Returns the id assigned to the submission.
    pub async fn create_submission(&self, record: &NewSubmission) -> Result<i64, StoreError> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO submissions
                (participation_type, contact_person_name, mobile_number, email, team_name,
                 concept, objective, requirements, technical_applications, slides_link,
                 submission_timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.participation_type.as_str())
        .bind(&record.contact_person_name)
        .bind(&record.mobile_number)
        .bind(&record.email)
        .bind(&record.team_name)
        .bind(&record.concept)
        .bind(&record.objective)
        .bind(&record.requirements)
        .bind(&record.technical_applications)
        .bind(&record.slides_link)
        .bind(encode_timestamp(Utc::now()))
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        // Solo entries never own member rows.
        if record.participation_type == ParticipationType::Team {
            for member in &record.team_members {
                sqlx::query(
                    "INSERT INTO team_members (submission_id, name, email) VALUES (?, ?, ?)",
                )
                .bind(id)
                .bind(&member.name)
                .bind(&member.email)
                .execute(&mut *tx)
                .await?;
            }
        }

        // Any early return above drops `tx`, which rolls the whole unit back.
        tx.commit().await?;

        info!(
            "Stored submission {id} ({}, {} team member(s))",
            record.participation_type,
            record.team_members.len()
        );
        Ok(id)
    }

    /// All submissions, newest first, each with its team members attached.
    pub async fn list_submissions(&self) -> Result<Vec<Submission>, StoreError> {
        let pool = match self.inner.pool.get() {
            Some(pool) => pool,
            None => {
                if !self.location_exists().await? {
                    self.log_uninitialized();
                    return Ok(Vec::new());
                }
                self.reader().await?
            }
        };
        // One transaction so every read sees the same snapshot.
        let mut tx = pool.begin().await?;

        if !has_schema(&mut *tx).await? {
            self.log_uninitialized();
            return Ok(Vec::new());
        }

        let rows: Vec<SubmissionRow> = sqlx::query_as(
            r#"
            SELECT id, participation_type, contact_person_name, mobile_number, email, team_name,
                   concept, objective, requirements, technical_applications, slides_link,
                   submission_timestamp
            FROM submissions
            ORDER BY submission_timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let members: Vec<TeamMember> = sqlx::query_as(
            "SELECT id, submission_id, name, email FROM team_members ORDER BY submission_id, id",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut by_submission: HashMap<i64, Vec<TeamMember>> = HashMap::new();
        for member in members {
            by_submission
                .entry(member.submission_id)
                .or_default()
                .push(member);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                let team_members = by_submission.remove(&id).unwrap_or_default();
                Submission::from_row(row, team_members)
                    .map_err(|reason| StoreError::CorruptRow { id, reason })
            })
            .collect()
    }

    fn log_uninitialized(&self) {
        debug!(
            "Submission store at {} not initialized; returning no submissions",
            self.inner.path.display()
        );
    }

    async fn location_exists(&self) -> Result<bool, StoreError> {
        tokio::fs::try_exists(&self.inner.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.inner.path.clone(),
                source,
            })
    }

    async fn reader(&self) -> Result<&SqlitePool, StoreError> {
        self.inner
            .reader
            .get_or_try_init(|| async {
                Ok::<_, StoreError>(open_read_only(&self.inner.path).await?)
            })
            .await
    }

    /// Opens the write pool on first call, creating the parent directory if needed.
    async fn pool(&self) -> Result<&SqlitePool, StoreError> {
        self.inner
            .pool
            .get_or_try_init(|| async {
                let path = &self.inner.path;
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| StoreError::Io {
                            path: parent.to_path_buf(),
                            source,
                        })?;
                }
                Ok::<_, StoreError>(create_pool(path).await?)
            })
            .await
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
