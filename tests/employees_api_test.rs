use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use candidate_tracker::{
    database::{candidate_store::CandidateStore, memory_store::MemoryCandidateStore},
    error::{Error, Result},
    models::candidate::{Candidate, NewCandidate},
    routes,
    services::upload_service::UploadService,
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];
const BOUNDARY: &str = "candidate-form-boundary";

struct TestApp {
    router: Router,
    store: Arc<MemoryCandidateStore>,
    uploads: TempDir,
}

fn setup_app_with(uploads_enabled: bool) -> TestApp {
    let uploads = TempDir::new().expect("temp uploads dir");
    let store = Arc::new(MemoryCandidateStore::new());
    let upload_service = UploadService::new(uploads.path(), uploads_enabled, 1024 * 1024);
    let state = AppState::new(store.clone(), upload_service);
    TestApp {
        router: routes::app(state),
        store,
        uploads,
    }
}

fn setup_app() -> TestApp {
    setup_app_with(true)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, headers, body)
}

fn json_request(method: &str, uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn create(app: &Router, body: JsonValue) -> JsonValue {
    let (status, _, created) = send(app, json_request("POST", "/api/employees", body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    created
}

fn uploaded_files(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn create_then_fetch_applies_defaults() {
    let app = setup_app();
    let created = create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng" }),
    )
    .await;

    let id = created["_id"].as_str().unwrap();
    let (status, _, fetched) = send(&app.router, get(&format!("/api/employees/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["rating"], json!(4.0));
    assert_eq!(fetched["status"], json!("applied"));
    assert_eq!(fetched["skills"], json!(""));
    assert_eq!(fetched["phone"], json!(""));
    assert_eq!(fetched["photo"], json!(""));
    assert_eq!(fetched["aiScore"], JsonValue::Null);
    assert!(fetched["createdAt"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_a_distinct_400() {
    let app = setup_app();
    let payload = json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng" });
    create(&app.router, payload.clone()).await;

    let (status, _, body) = send(&app.router, json_request("POST", "/api/employees", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("DUPLICATE_EMAIL"));

    let (_, _, list) = send(&app.router, get("/api/employees")).await;
    let matching = list
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["email"] == json!("ann@x.com"))
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn concurrent_duplicate_posts_leave_one_record() {
    let app = setup_app();
    let requests = (0..6).map(|i| {
        let router = app.router.clone();
        tokio::spawn(async move {
            let req = json_request(
                "POST",
                "/api/employees",
                json!({ "name": format!("Ann {i}"), "email": "race@x.com", "department": "Eng" }),
            );
            router.oneshot(req).await.unwrap().status()
        })
    });

    let mut created = 0;
    for handle in requests.collect::<Vec<_>>() {
        let status = handle.await.unwrap();
        if status == StatusCode::CREATED {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }
    assert_eq!(created, 1);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let app = setup_app();
    for name in ["A", "B", "C"] {
        create(
            &app.router,
            json!({ "name": name, "email": format!("{name}@x.com"), "department": "Eng" }),
        )
        .await;
    }

    let (status, _, list) = send(&app.router, get("/api/employees")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[tokio::test]
async fn status_only_update_leaves_other_fields() {
    let app = setup_app();
    let created = create(
        &app.router,
        json!({
            "name": "Ann",
            "email": "ann@x.com",
            "department": "Eng",
            "phone": "555-0100",
            "rating": 3.5,
            "aiScore": 72,
            "skills": "rust, sql"
        }),
    )
    .await;
    let id = created["_id"].as_str().unwrap();

    let (status, _, updated) = send(
        &app.router,
        json_request("PUT", &format!("/api/employees/{id}"), json!({ "status": "interview" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], json!("interview"));
    for field in ["_id", "name", "email", "department", "phone", "rating", "aiScore", "skills", "photo", "createdAt"] {
        assert_eq!(updated[field], created[field], "{field} changed");
    }
}

#[tokio::test]
async fn update_clears_ai_score_and_rejects_bad_values() {
    let app = setup_app();
    let created = create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng", "aiScore": "90" }),
    )
    .await;
    assert_eq!(created["aiScore"], json!(90));
    let uri = format!("/api/employees/{}", created["_id"].as_str().unwrap());

    let (status, _, updated) =
        send(&app.router, json_request("PUT", &uri, json!({ "aiScore": "" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["aiScore"], JsonValue::Null);

    let (status, _, body) =
        send(&app.router, json_request("PUT", &uri, json!({ "status": "hired", "rating": 12 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    assert!(body["details"].get("status").is_some());
    assert!(body["details"].get("rating").is_some());

    let (_, _, unchanged) = send(&app.router, get(&uri)).await;
    assert_eq!(unchanged["status"], json!("applied"));
}

#[tokio::test]
async fn update_unknown_candidate_is_404_and_creates_nothing() {
    let app = setup_app();
    let (status, _, body) = send(
        &app.router,
        json_request(
            "PUT",
            "/api/employees/6f1c2a9e-6a7b-4d3e-9a55-0b7a4c1d2e3f",
            json!({ "status": "shortlisted" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("NOT_FOUND"));
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn delete_flow_and_missing_ids() {
    let app = setup_app();
    let created = create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng" }),
    )
    .await;
    let uri = format!("/api/employees/{}", created["_id"].as_str().unwrap());

    let delete = |uri: &str| Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap();

    let (status, _, _) = send(&app.router, delete("/api/employees/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(
        &app.router,
        delete("/api/employees/6f1c2a9e-6a7b-4d3e-9a55-0b7a4c1d2e3f"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.len().await, 1);

    let (status, _, body) = send(&app.router, delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Employee deleted successfully"));

    let (status, _, _) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_range_and_missing_fields_are_validation_errors() {
    let app = setup_app();
    let (status, _, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/employees",
            json!({ "email": "ann@x.com", "rating": 5.5, "aiScore": 101 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    for field in ["name", "department", "rating", "aiScore"] {
        assert!(body["details"].get(field).is_some(), "{field} not reported: {body}");
    }
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn unsupported_methods_return_405_with_allow() {
    let app = setup_app();
    let patch = Request::builder()
        .method("PATCH")
        .uri("/api/employees/6f1c2a9e-6a7b-4d3e-9a55-0b7a4c1d2e3f")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app.router, patch).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers[header::ALLOW], "GET, PUT, DELETE");
    assert_eq!(body["code"], json!("METHOD_NOT_ALLOWED"));

    let delete_all = Request::builder()
        .method("DELETE")
        .uri("/api/employees")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app.router, delete_all).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers[header::ALLOW], "GET, POST");
}

#[tokio::test]
async fn unsupported_content_type_is_415() {
    let app = setup_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/employees")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("name=Ann"))
        .unwrap();
    let (status, _, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["code"], json!("UNSUPPORTED_MEDIA_TYPE"));
}

#[tokio::test]
async fn bodiless_update_of_unknown_candidate_is_404() {
    let app = setup_app();
    let req = Request::builder()
        .method("PUT")
        .uri("/api/employees/6f1c2a9e-6a7b-4d3e-9a55-0b7a4c1d2e3f")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("NOT_FOUND"));

    let untyped = Request::builder()
        .method("PUT")
        .uri("/api/employees/6f1c2a9e-6a7b-4d3e-9a55-0b7a4c1d2e3f")
        .body(Body::from("name=Ann"))
        .unwrap();
    let (status, _, _) = send(&app.router, untyped).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn bodiless_update_keeps_existing_candidate() {
    let app = setup_app();
    let created = create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng" }),
    )
    .await;
    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/employees/{}", created["_id"].as_str().unwrap()))
        .body(Body::empty())
        .unwrap();
    let (status, _, updated) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["status"], created["status"]);
}

#[tokio::test]
async fn urlencoded_form_creates_candidate() {
    let app = setup_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/employees")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "name=Ann&email=ann%40x.com&department=Eng&rating=4.5&status=shortlisted",
        ))
        .unwrap();
    let (status, _, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], json!("ann@x.com"));
    assert_eq!(body["rating"], json!(4.5));
    assert_eq!(body["status"], json!("shortlisted"));
}

#[tokio::test]
async fn multipart_photo_is_stored_and_served() {
    let app = setup_app();
    let req = multipart_request(
        "POST",
        "/api/employees",
        &[
            ("name", "Ann"),
            ("email", "ann@x.com"),
            ("department", "Eng"),
            ("photo", "https://cdn.example/ignored.png"),
        ],
        Some(("ann.png", PNG)),
    );
    let (status, _, created) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let photo = created["photo"].as_str().unwrap().to_string();
    assert!(photo.ends_with(".png"));
    assert_eq!(uploaded_files(&app.uploads), vec![photo.clone()]);

    let resp = app
        .router
        .clone()
        .oneshot(get(&format!("/uploads/{photo}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), PNG);
}

#[tokio::test]
async fn multipart_update_replaces_photo_and_keeps_fields() {
    let app = setup_app();
    let created = create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng", "skills": "rust" }),
    )
    .await;
    let uri = format!("/api/employees/{}", created["_id"].as_str().unwrap());

    let req = multipart_request("PUT", &uri, &[("phone", "555-0199")], Some(("new.png", PNG)));
    let (status, _, updated) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["phone"], json!("555-0199"));
    assert_eq!(updated["skills"], json!("rust"));
    assert!(updated["photo"].as_str().unwrap().ends_with(".png"));
}

#[tokio::test]
async fn failed_create_removes_uploaded_photo() {
    let app = setup_app();
    create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng" }),
    )
    .await;

    let req = multipart_request(
        "POST",
        "/api/employees",
        &[("name", "Annie"), ("email", "ann@x.com"), ("department", "Ops")],
        Some(("annie.png", PNG)),
    );
    let (status, _, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("DUPLICATE_EMAIL"));
    assert!(uploaded_files(&app.uploads).is_empty());
}

#[tokio::test]
async fn disabled_uploads_reject_files_but_accept_json() {
    let app = setup_app_with(false);
    let req = multipart_request(
        "POST",
        "/api/employees",
        &[("name", "Ann"), ("email", "ann@x.com"), ("department", "Eng")],
        Some(("ann.png", PNG)),
    );
    let (status, _, _) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);

    create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng", "photo": "" }),
    )
    .await;
}

#[tokio::test]
async fn board_groups_and_filters() {
    let app = setup_app();
    for (name, email, department, status) in [
        ("Ann", "ann@x.com", "Engineering", "applied"),
        ("Bob", "bob@x.com", "Sales", "interview"),
        ("Cid", "cid@x.com", "Engineering", "shortlisted"),
    ] {
        create(
            &app.router,
            json!({ "name": name, "email": email, "department": department, "status": status }),
        )
        .await;
    }

    let (status, _, board) = send(&app.router, get("/api/employees/board")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["applied"].as_array().unwrap().len(), 1);
    assert_eq!(board["shortlisted"].as_array().unwrap().len(), 1);
    assert_eq!(board["interview"].as_array().unwrap().len(), 1);

    let (_, _, filtered) = send(&app.router, get("/api/employees?search=ENGINEER")).await;
    let names: Vec<&str> = filtered
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cid", "Ann"]);

    let (_, _, interviews) = send(&app.router, get("/api/employees?status=interview")).await;
    assert_eq!(interviews.as_array().unwrap().len(), 1);

    let (status, _, _) = send(&app.router, get("/api/employees?status=hired")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = setup_app();
    let (status, _, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, _, doc) = send(&app.router, get("/api/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/api/employees").is_some());
}

#[tokio::test]
async fn store_is_shared_with_state() {
    let app = setup_app();
    create(
        &app.router,
        json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng" }),
    )
    .await;
    let found = app.store.find_by_email("ann@x.com").await.unwrap();
    assert_eq!(found.map(|c| c.name), Some("Ann".to_string()));
}

/// Store whose backend is never reachable.
struct UnreachableStore;

fn pool_timeout() -> Error {
    Error::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl CandidateStore for UnreachableStore {
    async fn insert(&self, _record: NewCandidate) -> Result<Candidate> {
        Err(pool_timeout())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Candidate>> {
        Err(pool_timeout())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<Candidate>> {
        Err(pool_timeout())
    }

    async fn list_newest_first(&self) -> Result<Vec<Candidate>> {
        Err(pool_timeout())
    }

    async fn replace(&self, _candidate: &Candidate) -> Result<Option<Candidate>> {
        Err(pool_timeout())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool> {
        Err(pool_timeout())
    }

    async fn ping(&self) -> Result<()> {
        Err(pool_timeout())
    }
}

#[tokio::test]
async fn store_failures_are_opaque_500s() {
    let uploads = TempDir::new().unwrap();
    let state = AppState::new(
        Arc::new(UnreachableStore),
        UploadService::new(uploads.path(), true, 1024 * 1024),
    );
    let app = routes::app(state);
    let item = "/api/employees/6f1c2a9e-6a7b-4d3e-9a55-0b7a4c1d2e3f";

    let requests = vec![
        get("/api/employees"),
        get("/api/employees/board"),
        get(item),
        json_request(
            "POST",
            "/api/employees",
            json!({ "name": "Ann", "email": "ann@x.com", "department": "Eng" }),
        ),
        json_request("PUT", item, json!({ "status": "interview" })),
        Request::builder().method("DELETE").uri(item).body(Body::empty()).unwrap(),
    ];

    // Configuration is never initialized here, so the service runs outside
    // development mode and must not leak the underlying error.
    for req in requests {
        let label = format!("{} {}", req.method(), req.uri());
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{label}");
        assert_eq!(body["code"], json!("INTERNAL_ERROR"), "{label}");
        assert_eq!(body["message"], json!("An unexpected error occurred"), "{label}");
        assert!(body.get("error").is_none(), "{label} leaked details: {body}");
    }

    let (status, _, health) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["database"], json!("down"));
}
