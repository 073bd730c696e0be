//! CSV export: one row per company, one column per distinct stage name.

use std::collections::HashMap;

use csv::WriterBuilder;
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::AppError;
use crate::models::company::CompanyView;
use crate::models::stage::StageRow;
use crate::tracker::companies::load_project_tree;
use crate::tracker::projects::get_project;
use crate::transfer::import::FIXED_COLUMNS;

#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

fn sorted_stages(company: &CompanyView) -> Vec<&StageRow> {
    let mut stages: Vec<&StageRow> = company.stages.iter().collect();
    stages.sort_by_key(|s| (s.order, s.id));
    stages
}

/// Distinct stage names in order of first appearance across companies.
pub fn stage_columns(companies: &[CompanyView]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for company in companies {
        for stage in sorted_stages(company) {
            if !columns.contains(&stage.stage_name) {
                columns.push(stage.stage_name.clone());
            }
        }
    }
    columns
}

/// Renders the export document. When a company has two stages with the same
/// name, the later one in `order` fills the column.
pub fn render_csv(companies: &[CompanyView]) -> Result<String, AppError> {
    let columns = stage_columns(companies);
    let column_index: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(FIXED_COLUMNS.iter().copied().chain(columns.iter().map(String::as_str)))
        .map_err(|e| AppError::Export(e.to_string()))?;

    for company in companies {
        let mut cells = vec![String::new(); columns.len()];
        for stage in sorted_stages(company) {
            if let Some(&idx) = column_index.get(stage.stage_name.as_str()) {
                cells[idx] = stage.date.map(|d| d.to_string()).unwrap_or_default();
            }
        }

        let fixed = [
            company.name.as_str(),
            company.position.as_str(),
            company.link.as_deref().unwrap_or(""),
        ];
        writer
            .write_record(fixed.into_iter().chain(cells.iter().map(String::as_str)))
            .map_err(|e| AppError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
}

/// `{project}_export.csv`, with characters that cannot sit inside a quoted
/// header value replaced by `_`.
pub fn export_filename(project_name: &str) -> String {
    let safe: String = project_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}_export.csv")
}

pub async fn export_project(pool: &SqlitePool, project_id: i64) -> Result<CsvExport, AppError> {
    let project = get_project(pool, project_id).await?;
    let companies = load_project_tree(pool, project_id).await?;
    let content = render_csv(&companies)?;

    info!(
        "Exported {} companies from project {project_id}",
        companies.len()
    );
    Ok(CsvExport {
        filename: export_filename(&project.name),
        content,
    })
}
