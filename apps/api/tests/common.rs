#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use job_tracker_api::config::Config;
use job_tracker_api::db::{create_pool, run_migrations};
use job_tracker_api::routes::build_router;
use job_tracker_api::state::AppState;

pub async fn test_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

pub fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

/// Router over a fresh in-memory database, plus the pool for direct checks.
pub async fn create_test_server() -> (TestServer, SqlitePool) {
    let pool = test_pool().await;
    let state = AppState { db: pool.clone() };
    (TestServer::new(build_router(state)).unwrap(), pool)
}

pub async fn create_project(server: &TestServer, name: &str) -> i64 {
    let response = server
        .post("/api/projects")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

pub async fn create_company(server: &TestServer, project_id: i64, name: &str) -> i64 {
    let response = server
        .post(&format!("/api/projects/{project_id}/companies"))
        .json(&json!({ "name": name, "position": "Engineer", "link": "https://example.com" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

pub async fn create_stage(server: &TestServer, company_id: i64, body: Value) -> Value {
    let response = server
        .post(&format!("/api/companies/{company_id}/stages"))
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}
