use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_RATING: f64 = 4.0;

/// Recruitment pipeline column a candidate sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Applied,
    Shortlisted,
    Interview,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 3] = [
        CandidateStatus::Applied,
        CandidateStatus::Shortlisted,
        CandidateStatus::Interview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Applied => "applied",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Interview => "interview",
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(CandidateStatus::Applied),
            "shortlisted" => Ok(CandidateStatus::Shortlisted),
            "interview" => Ok(CandidateStatus::Interview),
            other => Err(format!(
                "status must be one of applied, shortlisted, interview (got '{}')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    pub phone: String,
    pub photo: String,
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: f64,
    #[validate(range(min = 0, max = 100, message = "aiScore must be between 0 and 100"))]
    pub ai_score: Option<i32>,
    pub skills: String,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated candidate that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewCandidate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    pub phone: String,
    pub photo: String,
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: f64,
    #[validate(range(min = 0, max = 100, message = "aiScore must be between 0 and 100"))]
    pub ai_score: Option<i32>,
    pub skills: String,
    pub status: CandidateStatus,
}

impl NewCandidate {
    /// Minimal record with every optional field at its default.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            department: department.into(),
            phone: String::new(),
            photo: String::new(),
            rating: DEFAULT_RATING,
            ai_score: None,
            skills: String::new(),
            status: CandidateStatus::default(),
        }
    }
}

/// Row shape of the `candidates` table; status is stored as text.
#[derive(Debug, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: String,
    pub phone: String,
    pub photo: String,
    pub rating: f64,
    pub ai_score: Option<i32>,
    pub skills: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = crate::error::Error;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| crate::error::Error::Internal(format!("corrupt candidate row {}: {}", row.id, e)))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            department: row.department,
            phone: row.phone,
            photo: row.photo,
            rating: row.rating,
            ai_score: row.ai_score,
            skills: row.skills,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_round_trips_through_text() {
        for status in CandidateStatus::ALL {
            assert_eq!(status.as_str().parse::<CandidateStatus>(), Ok(status));
        }
        assert!("hired".parse::<CandidateStatus>().is_err());
        assert!("Applied".parse::<CandidateStatus>().is_err());
    }

    #[test]
    fn serializes_with_dashboard_field_names() {
        let now = Utc::now();
        let candidate = Candidate {
            id: Uuid::nil(),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            department: "Eng".into(),
            phone: String::new(),
            photo: String::new(),
            rating: DEFAULT_RATING,
            ai_score: Some(88),
            skills: "rust, sql".into(),
            status: CandidateStatus::Shortlisted,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["_id"], json!(Uuid::nil()));
        assert_eq!(value["aiScore"], json!(88));
        assert_eq!(value["status"], json!("shortlisted"));
        assert_eq!(value["rating"], json!(4.0));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn new_candidate_defaults() {
        let record = NewCandidate::new("Ann", "ann@x.com", "Eng");
        assert_eq!(record.rating, 4.0);
        assert_eq!(record.status, CandidateStatus::Applied);
        assert_eq!(record.ai_score, None);
        assert!(record.phone.is_empty() && record.photo.is_empty() && record.skills.is_empty());
    }

    #[test]
    fn rejects_corrupt_status_rows() {
        let now = Utc::now();
        let row = CandidateRow {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            department: "Eng".into(),
            phone: String::new(),
            photo: String::new(),
            rating: 4.0,
            ai_score: None,
            skills: String::new(),
            status: "hired".into(),
            created_at: now,
            updated_at: now,
        };
        assert!(Candidate::try_from(row).is_err());
    }
}
