//! Request bodies for the resource API.
//!
//! Update payloads keep "field absent" and "field present as null" apart for
//! the nullable columns (`link`, `date`, `description`) through
//! [`double_option`]. Non-nullable fields treat `null` the same as absent.

use axum::extract::{FromRequest, FromRequestParts};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::errors::AppError;

/// JSON body extractor whose rejections become `AppError::Validation`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor whose rejections become `AppError::NotFound`, so a
/// non-integer id reads the same as an unknown one.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Deserializes a present field into `Some(inner)`. Paired with
/// `#[serde(default)]` an absent field stays `None`, so the outer option
/// records presence and the inner one records null.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub link: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStageRequest {
    pub stage_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStageRequest {
    #[serde(default)]
    pub stage_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub order: Option<i64>,
}

/// Rejects a required string field that is present but blank.
pub fn require(field: &str, value: String) -> Result<String, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value)
}

/// Parses a stage date from a request body. An empty string means no date.
pub fn parse_stage_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::Validation(format!("date must be formatted YYYY-MM-DD, got '{value}'"))
            }),
    }
}
