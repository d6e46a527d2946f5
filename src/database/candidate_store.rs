use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateRow, NewCandidate};

/// Persistence operations over the candidate collection.
///
/// Implementations must enforce email uniqueness atomically and report a
/// violation as [`Error::DuplicateEmail`]; the application-level check in
/// `CandidateService` only exists to produce the friendly error early.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn insert(&self, record: NewCandidate) -> Result<Candidate>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>>;

    /// All candidates, newest first.
    async fn list_newest_first(&self) -> Result<Vec<Candidate>>;

    /// Writes every mutable field of `candidate` and bumps `updated_at`.
    /// Returns `None` when the row no longer exists.
    async fn replace(&self, candidate: &Candidate) -> Result<Option<Candidate>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

const CANDIDATE_COLUMNS: &str = "id, name, email, department, phone, photo, rating, ai_score, \
                                 skills, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error, email: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::DuplicateEmail(email.to_string())
        }
        _ => Error::from(err),
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn insert(&self, record: NewCandidate) -> Result<Candidate> {
        let query = format!(
            r#"
            INSERT INTO candidates (id, name, email, department, phone, photo, rating, ai_score, skills, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let row = sqlx::query_as::<_, CandidateRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.department)
            .bind(&record.phone)
            .bind(&record.photo)
            .bind(record.rating)
            .bind(record.ai_score)
            .bind(&record.skills)
            .bind(record.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &record.email))?;
        Candidate::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        let query = format!("SELECT {} FROM candidates WHERE id = $1", CANDIDATE_COLUMNS);
        let row = sqlx::query_as::<_, CandidateRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>> {
        let query = format!("SELECT {} FROM candidates WHERE email = $1", CANDIDATE_COLUMNS);
        let row = sqlx::query_as::<_, CandidateRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn list_newest_first(&self) -> Result<Vec<Candidate>> {
        let query = format!(
            "SELECT {} FROM candidates ORDER BY created_at DESC",
            CANDIDATE_COLUMNS
        );
        let rows = sqlx::query_as::<_, CandidateRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Candidate::try_from).collect()
    }

    async fn replace(&self, candidate: &Candidate) -> Result<Option<Candidate>> {
        let query = format!(
            r#"
            UPDATE candidates
            SET
                name = $2,
                email = $3,
                department = $4,
                phone = $5,
                photo = $6,
                rating = $7,
                ai_score = $8,
                skills = $9,
                status = $10,
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let row = sqlx::query_as::<_, CandidateRow>(&query)
            .bind(candidate.id)
            .bind(&candidate.name)
            .bind(&candidate.email)
            .bind(&candidate.department)
            .bind(&candidate.phone)
            .bind(&candidate.photo)
            .bind(candidate.rating)
            .bind(candidate.ai_score)
            .bind(&candidate.skills)
            .bind(candidate.status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &candidate.email))?;
        row.map(Candidate::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
