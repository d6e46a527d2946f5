use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::candidate_store::CandidateStore;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, NewCandidate};

/// In-process candidate store with the same uniqueness and ordering
/// guarantees as the PostgreSQL table. Used by the test suite.
#[derive(Default)]
pub struct MemoryCandidateStore {
    // Insertion order doubles as the creation-time tie breaker.
    rows: Mutex<Vec<Candidate>>,
}

impl MemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn insert(&self, record: NewCandidate) -> Result<Candidate> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|c| c.email == record.email) {
            return Err(Error::DuplicateEmail(record.email));
        }
        let now = Utc::now();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            name: record.name,
            email: record.email,
            department: record.department,
            phone: record.phone,
            photo: record.photo,
            rating: record.rating,
            ai_score: record.ai_score,
            skills: record.skills,
            status: record.status,
            created_at: now,
            updated_at: now,
        };
        rows.push(candidate.clone());
        Ok(candidate)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        Ok(self.rows.lock().await.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<Candidate>> {
        let rows = self.rows.lock().await;
        let mut ordered: Vec<Candidate> = rows.iter().rev().cloned().collect();
        // Stable sort keeps later insertions first among equal timestamps.
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ordered)
    }

    async fn replace(&self, candidate: &Candidate) -> Result<Option<Candidate>> {
        let mut rows = self.rows.lock().await;
        if rows
            .iter()
            .any(|c| c.id != candidate.id && c.email == candidate.email)
        {
            return Err(Error::DuplicateEmail(candidate.email.clone()));
        }
        let Some(slot) = rows.iter_mut().find(|c| c.id == candidate.id) else {
            return Ok(None);
        };
        *slot = Candidate {
            id: slot.id,
            created_at: slot.created_at,
            updated_at: Utc::now(),
            ..candidate.clone()
        };
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|c| c.id != id);
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
