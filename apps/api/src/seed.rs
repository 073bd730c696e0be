//! Optional first-run import of a CSV file into a fresh database.

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::config::Config;
use crate::tracker::projects::{count_projects, insert_project};
use crate::transfer::import::{plan_import, write_plan};

/// Seeds the database from `SEED_CSV_PATH` when it holds no projects yet.
/// Returns the id of the created project, or `None` when nothing was seeded.
pub async fn seed_if_empty(pool: &SqlitePool, config: &Config) -> Result<Option<i64>> {
    let Some(path) = config.seed_csv_path.as_deref() else {
        return Ok(None);
    };

    if count_projects(pool).await? > 0 {
        info!("Database already contains projects, skipping seed import");
        return Ok(None);
    }

    let content = read_seed_file(path).await?;
    let plan = plan_import(&content)?;

    // The project and its rows commit together, so a failed seed leaves the
    // database empty and the next startup tries again.
    let mut tx = pool.begin().await?;
    let project_id = insert_project(&mut *tx, &config.seed_project_name).await?;
    write_plan(&mut tx, project_id, &plan)
        .await
        .context("Failed to write seed rows")?;
    tx.commit().await?;

    info!(
        "Seeded {} companies into project '{}' from {}",
        plan.companies.len(),
        config.seed_project_name,
        path.display()
    );
    Ok(Some(project_id))
}

async fn read_seed_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read seed CSV {}", path.display()))
}

/// Runs the seed and logs instead of failing startup.
pub async fn run_seed(pool: &SqlitePool, config: &Config) {
    if let Err(e) = seed_if_empty(pool, config).await {
        warn!("Seed import failed: {e:#}");
    }
}
