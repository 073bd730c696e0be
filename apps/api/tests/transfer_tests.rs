//! Integration tests for CSV import, export and startup seeding.

mod common;

use std::path::PathBuf;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

use common::{create_company, create_project, create_stage, create_test_server, test_config, test_pool};
use job_tracker_api::config::Config;
use job_tracker_api::errors::AppError;
use job_tracker_api::seed::seed_if_empty;
use job_tracker_api::transfer::import::{apply_plan, plan_import};

const SINGLE_STAGE_CSV: &str = "Stage,Company,Position,Link,Date\n\
Applied,TestCo,Engineer,https://test.com,2025-01-15\n\
Rejected,OtherCo,Developer,https://other.com,2025-01-20";

const MULTI_STAGE_CSV: &str = "Company,Position,Link,Applied,Interview,Offer\n\
Acme,Engineer,https://acme.test,2025-01-10,,2025-02-20\n\
Globex,Analyst,,2025-01-12,2025-01-30,";

fn csv_form(content: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.as_bytes().to_vec())
            .file_name("applications.csv")
            .mime_type("text/csv"),
    )
}

async fn import(server: &TestServer, project_id: i64, content: &str) -> axum_test::TestResponse {
    server
        .post(&format!("/api/projects/{project_id}/import"))
        .multipart(csv_form(content))
        .await
}

async fn companies_of(server: &TestServer, project_id: i64) -> Vec<Value> {
    server
        .get(&format!("/api/projects/{project_id}/companies"))
        .await
        .json()
}

// =============================================================================
// IMPORT
// =============================================================================

#[tokio::test]
async fn test_single_stage_import() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;

    let response = import(&server, project_id, SINGLE_STAGE_CSV).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Import successful");
    assert_eq!(body["project_id"], project_id);
    assert_eq!(body["companies_imported"], 2);

    let companies = companies_of(&server, project_id).await;
    assert_eq!(companies.len(), 2);
    for company in &companies {
        let stages = company["stages"].as_array().unwrap();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0]["order"], 0);
    }
    assert_eq!(companies[0]["name"], "TestCo");
    assert_eq!(companies[0]["link"], "https://test.com");
    assert_eq!(companies[0]["stages"][0]["stage_name"], "Applied");
    assert_eq!(companies[0]["stages"][0]["date"], "2025-01-15");
    assert_eq!(companies[1]["stages"][0]["stage_name"], "Rejected");
}

#[tokio::test]
async fn test_multi_stage_import_skips_empty_cells() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;

    import(&server, project_id, MULTI_STAGE_CSV)
        .await
        .assert_status_ok();

    let companies = companies_of(&server, project_id).await;
    let acme = &companies[0];
    assert_eq!(acme["link"], "https://acme.test");
    assert_eq!(
        acme["stages"],
        json!([
            {
                "id": acme["stages"][0]["id"],
                "company_id": acme["id"],
                "stage_name": "Applied",
                "date": "2025-01-10",
                "description": null,
                "order": 0
            },
            {
                "id": acme["stages"][1]["id"],
                "company_id": acme["id"],
                "stage_name": "Offer",
                "date": "2025-02-20",
                "description": null,
                "order": 1
            }
        ])
    );

    let globex = &companies[1];
    assert_eq!(globex["link"], Value::Null);
    let names: Vec<&str> = globex["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stage_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Applied", "Interview"]);
}

#[tokio::test]
async fn test_import_keeps_unparseable_dates_as_null() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;

    import(
        &server,
        project_id,
        "Company,Position,Link,Applied\nAcme,Engineer,,last spring",
    )
    .await
    .assert_status_ok();

    let companies = companies_of(&server, project_id).await;
    assert_eq!(companies[0]["stages"][0]["stage_name"], "Applied");
    assert_eq!(companies[0]["stages"][0]["date"], Value::Null);
}

#[tokio::test]
async fn test_import_appends_to_existing_companies() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;
    create_company(&server, project_id, "Existing").await;

    import(&server, project_id, SINGLE_STAGE_CSV)
        .await
        .assert_status_ok();

    let project: Value = server.get(&format!("/api/projects/{project_id}")).await.json();
    assert_eq!(project["company_count"], 3);
}

#[tokio::test]
async fn test_malformed_import_commits_nothing() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;
    create_company(&server, project_id, "Existing").await;

    let ragged = "Company,Position,Link,Applied\nAcme,Engineer,,2025-01-10\nBroken,Row";
    let response = import(&server, project_id, ragged).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "IMPORT_ERROR");

    let project: Value = server.get(&format!("/api/projects/{project_id}")).await.json();
    assert_eq!(project["company_count"], 1);
}

#[tokio::test]
async fn test_import_rejects_empty_file() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;

    import(&server, project_id, "")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_requires_file_field() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;

    let response = server
        .post(&format!("/api/projects/{project_id}/import"))
        .multipart(MultipartForm::new().add_text("note", "no file here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["message"], "No file provided");
}

#[tokio::test]
async fn test_import_requires_filename() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(SINGLE_STAGE_CSV.as_bytes().to_vec()).file_name(""),
    );
    let response = server
        .post(&format!("/api/projects/{project_id}/import"))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["message"], "No file selected");
}

#[tokio::test]
async fn test_import_into_unknown_project() {
    let (server, _pool) = create_test_server().await;

    import(&server, 404, SINGLE_STAGE_CSV)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_write_rolls_back_whole_import() {
    let pool = test_pool().await;
    let project_id: i64 = sqlx::query_scalar(
        "INSERT INTO projects (name, created_at) VALUES ('Search', '2025-01-01T00:00:00Z') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query(
        r#"
        CREATE TRIGGER reject_explode BEFORE INSERT ON companies
        WHEN NEW.name = 'Explode'
        BEGIN SELECT RAISE(ABORT, 'company rejected'); END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let plan = plan_import(
        b"Company,Position,Link,Applied\nFine,Engineer,,2025-01-10\nExplode,Engineer,,2025-01-11",
    )
    .unwrap();
    let err = apply_plan(&pool, project_id, &plan).await.unwrap_err();

    assert!(matches!(err, AppError::Import(ref msg) if msg.contains("company rejected")));
    let companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
        .fetch_one(&pool)
        .await
        .unwrap();
    let stages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((companies, stages), (0, 0));
}

// =============================================================================
// EXPORT
// =============================================================================

#[tokio::test]
async fn test_export_columns_and_rows() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Fall 2025").await;
    import(&server, project_id, MULTI_STAGE_CSV)
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/api/projects/{project_id}/export"))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"Fall 2025_export.csv\""
    );
    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Company,Position,Link,Applied,Offer,Interview",
            "Acme,Engineer,https://acme.test,2025-01-10,2025-02-20,",
            "Globex,Analyst,,2025-01-12,,2025-01-30",
        ]
    );
}

#[tokio::test]
async fn test_export_then_import_round_trip() {
    let (server, _pool) = create_test_server().await;
    let source = create_project(&server, "Source").await;
    import(&server, source, MULTI_STAGE_CSV)
        .await
        .assert_status_ok();
    let exported = server
        .get(&format!("/api/projects/{source}/export"))
        .await
        .text();

    let target = create_project(&server, "Target").await;
    import(&server, target, &exported).await.assert_status_ok();

    let companies = companies_of(&server, target).await;
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0]["stages"].as_array().unwrap().len(), 2);
    assert_eq!(companies[1]["stages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_export_duplicate_stage_uses_latest() {
    let (server, _pool) = create_test_server().await;
    let project_id = create_project(&server, "Search").await;
    let company_id = create_company(&server, project_id, "Acme").await;
    create_stage(
        &server,
        company_id,
        json!({ "stage_name": "Interview", "date": "2025-03-01", "order": 2 }),
    )
    .await;
    create_stage(
        &server,
        company_id,
        json!({ "stage_name": "Interview", "date": "2025-02-01", "order": 1 }),
    )
    .await;

    let text = server
        .get(&format!("/api/projects/{project_id}/export"))
        .await
        .text();

    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![
            "Company,Position,Link,Interview",
            "Acme,Engineer,https://example.com,2025-03-01",
        ]
    );
}

#[tokio::test]
async fn test_export_unknown_project() {
    let (server, _pool) = create_test_server().await;

    server
        .get("/api/projects/9/export")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// SEEDING
// =============================================================================

fn seed_config(path: PathBuf) -> Config {
    Config {
        seed_csv_path: Some(path),
        seed_project_name: "Job Applications 2025".to_string(),
        ..test_config()
    }
}

#[tokio::test]
async fn test_seed_imports_into_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example_import.csv");
    std::fs::write(
        &path,
        "Company,Position,Link,Stage,Date\nAcme,Engineer,,Applied,\"January 15, 2025\"\n",
    )
    .unwrap();
    let pool = test_pool().await;

    let project_id = seed_if_empty(&pool, &seed_config(path)).await.unwrap().unwrap();

    let (name, date): (String, Option<String>) = sqlx::query_as(
        r#"
        SELECT p.name, s.date
        FROM projects p
        JOIN companies c ON c.project_id = p.id
        JOIN stages s ON s.company_id = c.id
        WHERE p.id = ?
        "#,
    )
    .bind(project_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(name, "Job Applications 2025");
    assert_eq!(date.as_deref(), Some("2025-01-15"));
}

#[tokio::test]
async fn test_seed_skips_when_projects_exist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example_import.csv");
    std::fs::write(&path, SINGLE_STAGE_CSV).unwrap();
    let pool = test_pool().await;
    job_tracker_api::tracker::projects::create_project(&pool, "Mine")
        .await
        .unwrap();

    let seeded = seed_if_empty(&pool, &seed_config(path)).await.unwrap();

    assert!(seeded.is_none());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_failed_seed_leaves_no_project_and_retries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example_import.csv");
    std::fs::write(&path, "Company,Position,Link,Applied\nAcme,Eng\n").unwrap();
    let pool = test_pool().await;
    let config = seed_config(path.clone());

    assert!(seed_if_empty(&pool, &config).await.is_err());
    let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(projects, 0);

    std::fs::write(&path, "Company,Position,Link,Applied\nAcme,Eng,,2025-01-10\n").unwrap();
    let seeded = seed_if_empty(&pool, &config).await.unwrap();
    assert!(seeded.is_some());
}

#[tokio::test]
async fn test_seed_write_failure_rolls_back_project() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example_import.csv");
    std::fs::write(
        &path,
        "Company,Position,Link,Applied\nFine,Eng,,2025-01-10\nExplode,Eng,,2025-01-11\n",
    )
    .unwrap();
    let pool = test_pool().await;
    sqlx::query(
        r#"
        CREATE TRIGGER reject_explode BEFORE INSERT ON companies
        WHEN NEW.name = 'Explode'
        BEGIN SELECT RAISE(ABORT, 'company rejected'); END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    assert!(seed_if_empty(&pool, &seed_config(path)).await.is_err());

    let (projects, companies): (i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM projects), (SELECT COUNT(*) FROM companies)",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!((projects, companies), (0, 0));
}

#[tokio::test]
async fn test_seed_without_path_does_nothing() {
    let pool = test_pool().await;

    assert!(seed_if_empty(&pool, &test_config()).await.unwrap().is_none());
}
