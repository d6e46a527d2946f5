use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::ValidationErrors;

use crate::models::candidate::{Candidate, CandidateStatus, NewCandidate, DEFAULT_RATING};
use crate::utils::validation::{
    field_error, merge_field_errors, parse_ai_score, parse_rating, parse_status, scalar_text,
    validate,
};

/// Candidate fields exactly as the client sent them. `None` means the key was
/// absent; `Some("")` means it was present but empty (or JSON `null`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidatePayload {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub photo: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub ai_score: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub skills: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub status: Option<String>,
}

impl RawCandidatePayload {
    /// Records a form field by its wire name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "department" => &mut self.department,
            "phone" => &mut self.phone,
            "photo" => &mut self.photo,
            "rating" => &mut self.rating,
            "aiScore" => &mut self.ai_score,
            "skills" => &mut self.skills,
            "status" => &mut self.status,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut payload = Self::default();
        for (name, value) in fields {
            payload.set_field(&name, value);
        }
        payload
    }

    /// Normalizes a creation payload. Empty optional fields fall back to their
    /// defaults; an uploaded photo wins over any `photo` text.
    pub fn into_new_candidate(
        self,
        uploaded_photo: Option<String>,
    ) -> Result<NewCandidate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let rating = match non_empty(self.rating) {
            None => DEFAULT_RATING,
            Some(raw) => parse_rating(&raw).unwrap_or_else(|err| {
                errors.add("rating", err);
                DEFAULT_RATING
            }),
        };
        let ai_score = non_empty(self.ai_score).and_then(|raw| match parse_ai_score(&raw) {
            Ok(score) => Some(score),
            Err(err) => {
                errors.add("aiScore", err);
                None
            }
        });
        let status = match non_empty(self.status) {
            None => CandidateStatus::default(),
            Some(raw) => parse_status(&raw).unwrap_or_else(|err| {
                errors.add("status", err);
                CandidateStatus::default()
            }),
        };

        let record = NewCandidate {
            name: trimmed(self.name),
            email: trimmed(self.email),
            department: trimmed(self.department),
            phone: self.phone.unwrap_or_default(),
            photo: uploaded_photo.or(self.photo).unwrap_or_default(),
            rating,
            ai_score,
            skills: self.skills.unwrap_or_default(),
            status,
        };

        if let Err(found) = validate(&record) {
            merge_field_errors(&mut errors, found);
        }
        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }

    /// Normalizes an update payload: only present fields become `Patch::Set`.
    pub fn into_patch(
        self,
        uploaded_photo: Option<String>,
    ) -> Result<CandidatePatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let mut required = |field: &'static str, value: Option<String>| match value {
            None => Patch::Absent,
            Some(raw) if raw.trim().is_empty() => {
                errors.add(field, field_error("length", format!("{} cannot be empty", field)));
                Patch::Absent
            }
            Some(raw) => Patch::Set(raw.trim().to_string()),
        };
        let name = required("name", self.name);
        let email = required("email", self.email);
        let department = required("department", self.department);

        let rating = match self.rating {
            None => Patch::Absent,
            Some(raw) => match parse_rating(&raw) {
                Ok(value) => Patch::Set(value),
                Err(err) => {
                    errors.add("rating", err);
                    Patch::Absent
                }
            },
        };
        let ai_score = match self.ai_score {
            None => Patch::Absent,
            Some(raw) if raw.trim().is_empty() => Patch::Set(None),
            Some(raw) => match parse_ai_score(&raw) {
                Ok(score) => Patch::Set(Some(score)),
                Err(err) => {
                    errors.add("aiScore", err);
                    Patch::Absent
                }
            },
        };
        let status = match self.status {
            None => Patch::Absent,
            Some(raw) => match parse_status(&raw) {
                Ok(status) => Patch::Set(status),
                Err(err) => {
                    errors.add("status", err);
                    Patch::Absent
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CandidatePatch {
            name,
            email,
            department,
            phone: self.phone.into(),
            photo: uploaded_photo.or(self.photo).into(),
            rating,
            ai_score,
            skills: self.skills.into(),
            status,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// A single field of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Absent,
        }
    }
}

impl<T> Patch<T> {
    pub fn apply(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePatch {
    pub name: Patch<String>,
    pub email: Patch<String>,
    pub department: Patch<String>,
    pub phone: Patch<String>,
    pub photo: Patch<String>,
    pub rating: Patch<f64>,
    /// `Set(None)` clears the score.
    pub ai_score: Patch<Option<i32>>,
    pub skills: Patch<String>,
    pub status: Patch<CandidateStatus>,
}

impl CandidatePatch {
    pub fn status(status: CandidateStatus) -> Self {
        Self {
            status: Patch::Set(status),
            ..Self::default()
        }
    }

    pub fn apply_to(self, candidate: &mut Candidate) {
        let CandidatePatch {
            name,
            email,
            department,
            phone,
            photo,
            rating,
            ai_score,
            skills,
            status,
        } = self;
        name.apply(&mut candidate.name);
        email.apply(&mut candidate.email);
        department.apply(&mut candidate.department);
        phone.apply(&mut candidate.phone);
        photo.apply(&mut candidate.photo);
        rating.apply(&mut candidate.rating);
        ai_score.apply(&mut candidate.ai_score);
        skills.apply(&mut candidate.skills);
        status.apply(&mut candidate.status);
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct CandidateListQuery {
    /// Case-insensitive substring over name, email and department.
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    pub search: Option<String>,
    pub status: Option<CandidateStatus>,
}

impl CandidateFilter {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(status) = self.status {
            if candidate.status != status {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(needle) => [&candidate.name, &candidate.email, &candidate.department]
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
        }
    }
}

impl TryFrom<CandidateListQuery> for CandidateFilter {
    type Error = crate::error::Error;

    fn try_from(query: CandidateListQuery) -> Result<Self, Self::Error> {
        let status = match non_empty(query.status) {
            None => None,
            Some(raw) => Some(
                raw.trim()
                    .parse::<CandidateStatus>()
                    .map_err(crate::error::Error::BadRequest)?,
            ),
        };
        Ok(Self {
            search: non_empty(query.search).map(|s| s.trim().to_lowercase()),
            status,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CandidateBoard {
    pub applied: Vec<Candidate>,
    pub shortlisted: Vec<Candidate>,
    pub interview: Vec<Candidate>,
}

impl FromIterator<Candidate> for CandidateBoard {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        let mut board = CandidateBoard::default();
        for candidate in iter {
            match candidate.status {
                CandidateStatus::Applied => board.applied.push(candidate),
                CandidateStatus::Shortlisted => board.shortlisted.push(candidate),
                CandidateStatus::Interview => board.interview.push(candidate),
            }
        }
        board
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
