use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

use crate::errors::AppError;
use crate::models::project::ProjectRow;
use crate::tracker::payload::{require, UpdateProjectRequest};

const SELECT_PROJECT: &str = r#"
    SELECT p.id, p.name, p.created_at,
           (SELECT COUNT(*) FROM companies c WHERE c.project_id = p.id) AS company_count
    FROM projects p
"#;

pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<ProjectRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ProjectRow>(&format!("{SELECT_PROJECT} ORDER BY p.id"))
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_project(pool: &SqlitePool, id: i64) -> Result<ProjectRow, AppError> {
    sqlx::query_as::<_, ProjectRow>(&format!("{SELECT_PROJECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::project_not_found(id))
}

pub async fn count_projects(pool: &SqlitePool) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await?)
}

/// Inserts a project row and returns its id. Usable with the pool or inside
/// a transaction.
pub async fn insert_project<'e, E>(executor: E, name: &str) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("INSERT INTO projects (name, created_at) VALUES (?, ?) RETURNING id")
        .bind(name)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
}

pub async fn create_project(pool: &SqlitePool, name: &str) -> Result<ProjectRow, AppError> {
    let id = insert_project(pool, name).await?;

    info!("Created project {id} '{name}'");
    get_project(pool, id).await
}

/// Applies a partial update. Only `name` is mutable; `created_at` never changes.
pub async fn update_project(
    pool: &SqlitePool,
    id: i64,
    req: UpdateProjectRequest,
) -> Result<ProjectRow, AppError> {
    let existing = get_project(pool, id).await?;
    let name = req
        .name
        .map(|name| require("name", name))
        .transpose()?
        .unwrap_or(existing.name);

    sqlx::query("UPDATE projects SET name = ? WHERE id = ?")
        .bind(&name)
        .bind(id)
        .execute(pool)
        .await?;

    get_project(pool, id).await
}

/// Deletes a project. Companies and their stages go with it through the
/// foreign-key cascade.
pub async fn delete_project(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::project_not_found(id));
    }
    info!("Deleted project {id}");
    Ok(())
}
