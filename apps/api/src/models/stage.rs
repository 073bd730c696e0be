use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StageRow {
    pub id: i64,
    pub company_id: i64,
    pub stage_name: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub order: i64,
}
