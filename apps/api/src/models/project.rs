use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row joined with the number of companies it owns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub company_count: i64,
}
