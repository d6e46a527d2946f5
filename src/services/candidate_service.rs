use std::sync::Arc;
use uuid::Uuid;

use crate::database::candidate_store::CandidateStore;
use crate::dto::candidate_dto::{CandidateBoard, CandidateFilter, CandidatePatch};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, NewCandidate};
use crate::utils::validation::validate;

#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: NewCandidate) -> Result<Candidate> {
        validate(&record)?;

        if self.find_by_email(&record.email).await?.is_some() {
            tracing::info!(email = %record.email, "Rejected candidate with duplicate email");
            return Err(Error::DuplicateEmail(record.email));
        }

        let candidate = self.store.insert(record).await?;
        tracing::info!(candidate_id = %candidate.id, "Candidate created");
        Ok(candidate)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Candidate> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Employee not found".into()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>> {
        self.store.find_by_email(email).await
    }

    pub async fn list_all(&self) -> Result<Vec<Candidate>> {
        self.store.list_newest_first().await
    }

    pub async fn list_filtered(&self, filter: &CandidateFilter) -> Result<Vec<Candidate>> {
        let mut candidates = self.list_all().await?;
        candidates.retain(|c| filter.matches(c));
        Ok(candidates)
    }

    pub async fn board(&self, filter: &CandidateFilter) -> Result<CandidateBoard> {
        Ok(self.list_filtered(filter).await?.into_iter().collect())
    }

    pub async fn update(&self, id: Uuid, patch: CandidatePatch) -> Result<Candidate> {
        let mut candidate = self.find_by_id(id).await?;

        if let Some(email) = patch.email.as_set() {
            if email != &candidate.email {
                if let Some(other) = self.find_by_email(email).await? {
                    if other.id != id {
                        tracing::info!(candidate_id = %id, email = %email, "Rejected email change to a taken address");
                        return Err(Error::DuplicateEmail(email.clone()));
                    }
                }
            }
        }

        patch.apply_to(&mut candidate);
        validate(&candidate)?;

        let updated = self
            .store
            .replace(&candidate)
            .await?
            .ok_or_else(|| Error::NotFound("Employee not found".into()))?;
        tracing::info!(candidate_id = %id, status = %updated.status, "Candidate updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(Error::NotFound("Employee not found".into()));
        }
        tracing::info!(candidate_id = %id, "Candidate deleted");
        Ok(())
    }
}
