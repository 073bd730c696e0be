use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

use crate::errors::AppError;
use crate::models::stage::StageRow;
use crate::tracker::companies::find_company;
use crate::tracker::payload::{parse_stage_date, require, UpdateStageRequest};

const STAGE_COLUMNS: &str = r#"id, company_id, stage_name, date, description, "order""#;

/// Stages of one company sorted by `order`, ties broken by id.
pub async fn stages_of(pool: &SqlitePool, company_id: i64) -> Result<Vec<StageRow>, AppError> {
    Ok(sqlx::query_as::<_, StageRow>(&format!(
        r#"SELECT {STAGE_COLUMNS} FROM stages WHERE company_id = ? ORDER BY "order", id"#
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?)
}

pub async fn list_stages(pool: &SqlitePool, company_id: i64) -> Result<Vec<StageRow>, AppError> {
    find_company(pool, company_id).await?;
    stages_of(pool, company_id).await
}

pub async fn get_stage(pool: &SqlitePool, id: i64) -> Result<StageRow, AppError> {
    sqlx::query_as::<_, StageRow>(&format!("SELECT {STAGE_COLUMNS} FROM stages WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::stage_not_found(id))
}

/// Fields of a stage about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStage<'a> {
    pub stage_name: &'a str,
    pub date: Option<NaiveDate>,
    pub description: Option<&'a str>,
    pub order: i64,
}

/// Inserts a stage row. Usable with the pool or inside a transaction.
pub async fn insert_stage<'e, E>(
    executor: E,
    company_id: i64,
    stage: &NewStage<'_>,
) -> Result<StageRow, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, StageRow>(&format!(
        r#"
        INSERT INTO stages (company_id, stage_name, date, description, "order")
        VALUES (?, ?, ?, ?, ?)
        RETURNING {STAGE_COLUMNS}
        "#
    ))
    .bind(company_id)
    .bind(stage.stage_name)
    .bind(stage.date)
    .bind(stage.description)
    .bind(stage.order)
    .fetch_one(executor)
    .await
}

pub async fn create_stage(
    pool: &SqlitePool,
    company_id: i64,
    stage: &NewStage<'_>,
) -> Result<StageRow, AppError> {
    find_company(pool, company_id).await?;
    let row = insert_stage(pool, company_id, stage).await?;
    info!(
        "Created stage {} '{}' for company {company_id}",
        row.id, row.stage_name
    );
    Ok(row)
}

/// Applies a partial update. `date` and `description` distinguish an explicit
/// null (clear) from an absent field (keep).
pub async fn update_stage(
    pool: &SqlitePool,
    id: i64,
    req: UpdateStageRequest,
) -> Result<StageRow, AppError> {
    let existing = get_stage(pool, id).await?;

    let stage_name = req
        .stage_name
        .map(|name| require("stage_name", name))
        .transpose()?
        .unwrap_or(existing.stage_name);
    let date = match req.date {
        Some(raw) => parse_stage_date(raw.as_deref())?,
        None => existing.date,
    };
    let description = match req.description {
        Some(description) => description,
        None => existing.description,
    };
    let order = req.order.unwrap_or(existing.order);

    sqlx::query(
        r#"UPDATE stages SET stage_name = ?, date = ?, description = ?, "order" = ? WHERE id = ?"#,
    )
    .bind(&stage_name)
    .bind(date)
    .bind(&description)
    .bind(order)
    .bind(id)
    .execute(pool)
    .await?;

    get_stage(pool, id).await
}

pub async fn delete_stage(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM stages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::stage_not_found(id));
    }
    info!("Deleted stage {id}");
    Ok(())
}
