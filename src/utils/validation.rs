use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::models::candidate::CandidateStatus;

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;
pub const AI_SCORE_MIN: i32 = 0;
pub const AI_SCORE_MAX: i32 = 100;

pub fn validate<T: Validate>(val: &T) -> Result<(), ValidationErrors> {
    val.validate()
}

pub fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Copies every field-level error of `from` into `into`.
pub fn merge_field_errors(into: &mut ValidationErrors, from: ValidationErrors) {
    for (field, kind) in from.into_errors() {
        if let ValidationErrorsKind::Field(list) = kind {
            for err in list {
                into.add(field, err);
            }
        }
    }
}

/// Deserializes a JSON scalar into its text form. `null` becomes an empty
/// string so that "present but empty" survives deserialization.
pub fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(Some(String::new())),
        JsonValue::String(s) => Ok(Some(s)),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            Err(D::Error::custom("expected a string or number"))
        }
    }
}

pub fn parse_rating(raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| field_error("number", format!("rating must be a number (got '{}')", raw)))?;
    if !value.is_finite() || !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err(field_error(
            "range",
            format!("rating must be between {} and {}", RATING_MIN, RATING_MAX),
        ));
    }
    Ok(value)
}

pub fn parse_ai_score(raw: &str) -> Result<i32, ValidationError> {
    let trimmed = raw.trim();
    let not_integer =
        || field_error("integer", format!("aiScore must be an integer (got '{}')", raw));

    let value = match trimmed.parse::<i64>() {
        Ok(v) => v,
        // JSON clients may send 85.0 for an integral score.
        Err(_) => match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
            _ => return Err(not_integer()),
        },
    };
    if !(i64::from(AI_SCORE_MIN)..=i64::from(AI_SCORE_MAX)).contains(&value) {
        return Err(field_error(
            "range",
            format!("aiScore must be between {} and {}", AI_SCORE_MIN, AI_SCORE_MAX),
        ));
    }
    Ok(value as i32)
}

pub fn parse_status(raw: &str) -> Result<CandidateStatus, ValidationError> {
    raw.trim().parse().map_err(|msg: String| field_error("status", msg))
}
