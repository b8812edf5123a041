use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_FIELD_CHARS: usize = 2;
const MAX_FIELD_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Rtl,
    Ltr,
}

impl FromStr for Direction {
    type Err = FormError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rtl" => Ok(Direction::Rtl),
            "ltr" => Ok(Direction::Ltr),
            other => Err(FormError::InvalidDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{field} must be between {min} and {max} characters (got {actual})")]
    FieldLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("locale must not be empty")]
    EmptyLocale,
    #[error("direction must be \"rtl\" or \"ltr\", got {0:?}")]
    InvalidDirection(String),
}

/// Input for a new pipeline job, serialized as the create-job request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobForm {
    pub business_name: String,
    pub business_type: String,
    pub target_city: String,
    pub locale: String,
    pub direction: Direction,
}

impl JobForm {
    pub fn new(
        business_name: impl Into<String>,
        business_type: impl Into<String>,
        target_city: impl Into<String>,
    ) -> Self {
        Self {
            business_name: business_name.into(),
            business_type: business_type.into(),
            target_city: target_city.into(),
            locale: "ar-SA".to_string(),
            direction: Direction::default(),
        }
    }

    /// Checks the same bounds the backend enforces, so obviously bad input
    /// never costs a round trip.
    pub fn validate(&self) -> Result<(), FormError> {
        check_length("business_name", &self.business_name)?;
        check_length("business_type", &self.business_type)?;
        check_length("target_city", &self.target_city)?;
        if self.locale.trim().is_empty() {
            return Err(FormError::EmptyLocale);
        }
        Ok(())
    }
}

fn check_length(field: &'static str, value: &str) -> Result<(), FormError> {
    let actual = value.trim().chars().count();
    if (MIN_FIELD_CHARS..=MAX_FIELD_CHARS).contains(&actual) {
        Ok(())
    } else {
        Err(FormError::FieldLength {
            field,
            min: MIN_FIELD_CHARS,
            max: MAX_FIELD_CHARS,
            actual,
        })
    }
}
