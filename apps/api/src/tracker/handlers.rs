//! Axum route handlers for projects, companies and stages.

use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::models::company::CompanyView;
use crate::models::project::ProjectRow;
use crate::models::stage::StageRow;
use crate::state::AppState;
use crate::tracker::payload::{
    parse_stage_date, require, AppJson, AppPath, CreateCompanyRequest, CreateProjectRequest,
    CreateStageRequest, UpdateCompanyRequest, UpdateProjectRequest, UpdateStageRequest,
};
use crate::tracker::stages::NewStage;
use crate::tracker::{companies, projects, stages};

// ────────────────────────────────────────────────────────────────────────────
// Projects
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    Ok(Json(projects::list_projects(&state.db).await?))
}

/// POST /api/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    let name = require("name", req.name)?;
    let project = projects::create_project(&state.db, &name).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ProjectRow>, AppError> {
    Ok(Json(projects::get_project(&state.db, id).await?))
}

/// PUT /api/projects/:id
pub async fn handle_update_project(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectRow>, AppError> {
    Ok(Json(projects::update_project(&state.db, id, req).await?))
}

/// DELETE /api/projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    projects::delete_project(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Companies
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/projects/:id/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    AppPath(project_id): AppPath<i64>,
) -> Result<Json<Vec<CompanyView>>, AppError> {
    Ok(Json(companies::list_companies(&state.db, project_id).await?))
}

/// POST /api/projects/:id/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    AppPath(project_id): AppPath<i64>,
    AppJson(req): AppJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyView>), AppError> {
    let name = require("name", req.name)?;
    let position = require("position", req.position)?;
    let company = companies::create_company(
        &state.db,
        project_id,
        &name,
        &position,
        req.link.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<CompanyView>, AppError> {
    Ok(Json(companies::get_company(&state.db, id).await?))
}

/// PUT /api/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateCompanyRequest>,
) -> Result<Json<CompanyView>, AppError> {
    Ok(Json(companies::update_company(&state.db, id, req).await?))
}

/// DELETE /api/companies/:id
pub async fn handle_delete_company(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    companies::delete_company(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Stages
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/companies/:id/stages
pub async fn handle_list_stages(
    State(state): State<AppState>,
    AppPath(company_id): AppPath<i64>,
) -> Result<Json<Vec<StageRow>>, AppError> {
    Ok(Json(stages::list_stages(&state.db, company_id).await?))
}

/// POST /api/companies/:id/stages
pub async fn handle_create_stage(
    State(state): State<AppState>,
    AppPath(company_id): AppPath<i64>,
    AppJson(req): AppJson<CreateStageRequest>,
) -> Result<(StatusCode, Json<StageRow>), AppError> {
    let stage_name = require("stage_name", req.stage_name)?;
    let date = parse_stage_date(req.date.as_deref())?;
    let stage = NewStage {
        stage_name: &stage_name,
        date,
        description: req.description.as_deref(),
        order: req.order.unwrap_or(0),
    };
    let row = stages::create_stage(&state.db, company_id, &stage).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/stages/:id
pub async fn handle_get_stage(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<StageRow>, AppError> {
    Ok(Json(stages::get_stage(&state.db, id).await?))
}

/// PUT /api/stages/:id
pub async fn handle_update_stage(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateStageRequest>,
) -> Result<Json<StageRow>, AppError> {
    Ok(Json(stages::update_stage(&state.db, id, req).await?))
}

/// DELETE /api/stages/:id
pub async fn handle_delete_stage(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    stages::delete_stage(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
