//! CSV import: sniff the file layout, plan the rows, persist in one transaction.
//!
//! Two layouts are accepted:
//!
//! - **single-stage**: the header has both `Stage` and `Date`. Each row is one
//!   company with one stage named by the `Stage` cell. Other columns outside
//!   `Company`, `Position` and `Link` are ignored.
//! - **multi-stage**: every column other than `Company`, `Position` and `Link`
//!   names a stage. A non-empty cell creates that stage, dated from the cell.
//!
//! Parsing happens entirely before the transaction opens, so a malformed file
//! never touches the database.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::errors::AppError;
use crate::tracker::companies::insert_company;
use crate::tracker::projects::get_project;
use crate::tracker::stages::{insert_stage, NewStage};
use crate::transfer::dates::parse_cell_date;

pub const COMPANY_COLUMN: &str = "Company";
pub const POSITION_COLUMN: &str = "Position";
pub const LINK_COLUMN: &str = "Link";
const STAGE_COLUMN: &str = "Stage";
const DATE_COLUMN: &str = "Date";

/// Columns that describe the company rather than a stage.
pub const FIXED_COLUMNS: [&str; 3] = [COMPANY_COLUMN, POSITION_COLUMN, LINK_COLUMN];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    SingleStage { stage: usize, date: usize },
    MultiStage,
}

impl CsvLayout {
    pub fn detect(headers: &StringRecord) -> Self {
        let stage = headers.iter().position(|h| h == STAGE_COLUMN);
        let date = headers.iter().position(|h| h == DATE_COLUMN);
        match (stage, date) {
            (Some(stage), Some(date)) => CsvLayout::SingleStage { stage, date },
            _ => CsvLayout::MultiStage,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStage {
    pub stage_name: String,
    pub date: Option<NaiveDate>,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCompany {
    pub name: String,
    pub position: String,
    pub link: Option<String>,
    pub stages: Vec<PlannedStage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    pub layout: CsvLayout,
    pub companies: Vec<PlannedCompany>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub project_id: i64,
    pub companies_imported: usize,
}

fn import_failure(err: impl std::fmt::Display) -> AppError {
    AppError::Import(err.to_string())
}

/// Parses raw CSV bytes into the companies and stages they describe.
pub fn plan_import(content: &[u8]) -> Result<ImportPlan, AppError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(content);

    let headers = reader.headers().map_err(import_failure)?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(AppError::Import("CSV file has no header row".to_string()));
    }

    let layout = CsvLayout::detect(&headers);
    let column = |name: &str| headers.iter().position(|h| h == name);
    let company_idx = column(COMPANY_COLUMN);
    let position_idx = column(POSITION_COLUMN);
    let link_idx = column(LINK_COLUMN);

    // Left-to-right stage columns for the multi-stage layout.
    let stage_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !FIXED_COLUMNS.contains(h))
        .collect();

    let mut companies = Vec::new();
    for record in reader.records() {
        let record = record.map_err(import_failure)?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let stages = match layout {
            CsvLayout::SingleStage { stage, date } => vec![PlannedStage {
                stage_name: cell(Some(stage)).to_string(),
                date: parse_cell_date(cell(Some(date))),
                order: 0,
            }],
            CsvLayout::MultiStage => stage_columns
                .iter()
                .filter_map(|(idx, name)| {
                    let value = cell(Some(*idx));
                    (!value.is_empty()).then_some((*name, value))
                })
                .enumerate()
                .map(|(order, (name, value))| PlannedStage {
                    stage_name: name.to_string(),
                    date: parse_cell_date(value),
                    order: order as i64,
                })
                .collect(),
        };

        let link = cell(link_idx);
        companies.push(PlannedCompany {
            name: cell(company_idx).to_string(),
            position: cell(position_idx).to_string(),
            link: (!link.is_empty()).then(|| link.to_string()),
            stages,
        });
    }

    Ok(ImportPlan { layout, companies })
}

/// Writes every planned company and stage on `conn`. The caller owns the
/// transaction.
pub async fn write_plan(
    conn: &mut SqliteConnection,
    project_id: i64,
    plan: &ImportPlan,
) -> Result<(), sqlx::Error> {
    for company in &plan.companies {
        let row = insert_company(
            &mut *conn,
            project_id,
            &company.name,
            &company.position,
            company.link.as_deref(),
        )
        .await?;

        for stage in &company.stages {
            let new_stage = NewStage {
                stage_name: &stage.stage_name,
                date: stage.date,
                description: None,
                order: stage.order,
            };
            insert_stage(&mut *conn, row.id, &new_stage).await?;
        }
    }
    Ok(())
}

/// Writes a plan into a project inside a single transaction. Any failure
/// rolls back every row written so far.
pub async fn apply_plan(
    pool: &SqlitePool,
    project_id: i64,
    plan: &ImportPlan,
) -> Result<usize, AppError> {
    let mut tx = pool.begin().await.map_err(import_failure)?;
    write_plan(&mut tx, project_id, plan)
        .await
        .map_err(import_failure)?;
    tx.commit().await.map_err(import_failure)?;
    Ok(plan.companies.len())
}

/// Imports CSV content into an existing project.
pub async fn import_csv(
    pool: &SqlitePool,
    project_id: i64,
    content: &[u8],
) -> Result<ImportResponse, AppError> {
    get_project(pool, project_id).await?;

    let plan = plan_import(content)?;
    let imported = apply_plan(pool, project_id, &plan).await?;
    info!(
        "Imported {imported} companies into project {project_id} ({:?} layout)",
        plan.layout
    );

    Ok(ImportResponse {
        message: "Import successful".to_string(),
        project_id,
        companies_imported: imported,
    })
}
