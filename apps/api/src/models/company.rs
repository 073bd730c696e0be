use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::stage::StageRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRow {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub position: String,
    pub link: Option<String>,
}

/// Serialized company: the row with its stages inlined, sorted by `order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyView {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub position: String,
    pub link: Option<String>,
    pub stages: Vec<StageRow>,
}

impl CompanyView {
    pub fn new(row: CompanyRow, stages: Vec<StageRow>) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            position: row.position,
            link: row.link,
            stages,
        }
    }
}
