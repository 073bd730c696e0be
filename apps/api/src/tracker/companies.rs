use std::collections::HashMap;

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

use crate::errors::AppError;
use crate::models::company::{CompanyRow, CompanyView};
use crate::models::stage::StageRow;
use crate::tracker::payload::{require, UpdateCompanyRequest};
use crate::tracker::projects::get_project;

/// Returns every company of a project, in stored order, with stages inlined.
pub async fn list_companies(
    pool: &SqlitePool,
    project_id: i64,
) -> Result<Vec<CompanyView>, AppError> {
    get_project(pool, project_id).await?;
    load_project_tree(pool, project_id).await
}

/// Loads companies and stages for a project in two queries. Does not check
/// that the project exists.
pub async fn load_project_tree(
    pool: &SqlitePool,
    project_id: i64,
) -> Result<Vec<CompanyView>, AppError> {
    let companies = sqlx::query_as::<_, CompanyRow>(
        "SELECT id, project_id, name, position, link FROM companies WHERE project_id = ? ORDER BY id",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    let stages = sqlx::query_as::<_, StageRow>(
        r#"
        SELECT s.id, s.company_id, s.stage_name, s.date, s.description, s."order"
        FROM stages s
        JOIN companies c ON c.id = s.company_id
        WHERE c.project_id = ?
        ORDER BY s.company_id, s."order", s.id
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    let mut by_company: HashMap<i64, Vec<StageRow>> = HashMap::new();
    for stage in stages {
        by_company.entry(stage.company_id).or_default().push(stage);
    }

    Ok(companies
        .into_iter()
        .map(|company| {
            let stages = by_company.remove(&company.id).unwrap_or_default();
            CompanyView::new(company, stages)
        })
        .collect())
}

pub async fn find_company(pool: &SqlitePool, id: i64) -> Result<CompanyRow, AppError> {
    sqlx::query_as::<_, CompanyRow>(
        "SELECT id, project_id, name, position, link FROM companies WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::company_not_found(id))
}

pub async fn get_company(pool: &SqlitePool, id: i64) -> Result<CompanyView, AppError> {
    let company = find_company(pool, id).await?;
    let stages = crate::tracker::stages::stages_of(pool, id).await?;
    Ok(CompanyView::new(company, stages))
}

/// Inserts a company row. Usable with the pool or inside a transaction.
pub async fn insert_company<'e, E>(
    executor: E,
    project_id: i64,
    name: &str,
    position: &str,
    link: Option<&str>,
) -> Result<CompanyRow, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, CompanyRow>(
        r#"
        INSERT INTO companies (project_id, name, position, link)
        VALUES (?, ?, ?, ?)
        RETURNING id, project_id, name, position, link
        "#,
    )
    .bind(project_id)
    .bind(name)
    .bind(position)
    .bind(link)
    .fetch_one(executor)
    .await
}

pub async fn create_company(
    pool: &SqlitePool,
    project_id: i64,
    name: &str,
    position: &str,
    link: Option<&str>,
) -> Result<CompanyView, AppError> {
    get_project(pool, project_id).await?;
    let company = insert_company(pool, project_id, name, position, link).await?;
    info!("Created company {} in project {project_id}", company.id);
    Ok(CompanyView::new(company, Vec::new()))
}

/// Applies a partial update. `link: null` clears the link; an absent `link`
/// keeps it.
pub async fn update_company(
    pool: &SqlitePool,
    id: i64,
    req: UpdateCompanyRequest,
) -> Result<CompanyView, AppError> {
    let existing = find_company(pool, id).await?;
    let name = req
        .name
        .map(|name| require("name", name))
        .transpose()?
        .unwrap_or(existing.name);
    let position = req
        .position
        .map(|position| require("position", position))
        .transpose()?
        .unwrap_or(existing.position);
    let link = match req.link {
        Some(link) => link,
        None => existing.link,
    };

    sqlx::query("UPDATE companies SET name = ?, position = ?, link = ? WHERE id = ?")
        .bind(&name)
        .bind(&position)
        .bind(&link)
        .bind(id)
        .execute(pool)
        .await?;

    get_company(pool, id).await
}

pub async fn delete_company(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM companies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::company_not_found(id));
    }
    info!("Deleted company {id}");
    Ok(())
}
