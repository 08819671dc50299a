//! # API REST
//!
//! REST API implementation for StoreIt.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, bearer sessions, CORS, body limits)
//!
//! Uses `api-shared` for request/response types and `storeit-core` for every file operation.

#![warn(rust_2018_idioms)]

mod error;

pub use error::{ApiError, Session};

use api_shared::{
    CategoryUsageRes, ErrorRes, FileRes, HealthRes, HealthService, ListFilesQuery, ListFilesRes,
    RenameFileReq, SpaceSummaryRes, UpdateFileUsersReq, UploadFileQuery,
};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, patch, put},
    Router,
};
use storeit_core::{constants::MAX_FILE_SIZE, EmailAddress, FileService, UniqueId};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub files: FileService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_files,
        upload_file,
        get_file,
        rename_file,
        update_file_users,
        remove_file_user,
        delete_file,
        download_file,
        space,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        FileRes,
        ListFilesRes,
        RenameFileReq,
        UpdateFileUsersReq,
        CategoryUsageRes,
        SpaceSummaryRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/files", get(list_files).post(upload_file))
        .route("/files/:id", get(get_file).delete(delete_file))
        .route("/files/:id/name", patch(rename_file))
        .route("/files/:id/users", put(update_file_users))
        .route("/files/:id/users/:email", delete(remove_file_user))
        .route("/files/:id/download", get(download_file))
        .route("/space", get(space))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // One byte over the cap still reaches the service, which reports it as too large.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE as usize + 1))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_id(id: &str) -> Result<UniqueId, ApiError> {
    UniqueId::parse(id).map_err(|_| ApiError::BadRequest(format!("invalid file id '{id}'")))
}

fn parse_email(email: &str) -> Result<EmailAddress, ApiError> {
    EmailAddress::parse(email).map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Files visible to the caller", body = ListFilesRes),
        (status = 400, description = "Unknown file type or sort field", body = ErrorRes),
        (status = 401, description = "Missing or unknown session", body = ErrorRes)
    )
)]
/// List files the caller owns or that are shared with them.
#[axum::debug_handler]
async fn list_files(
    State(state): State<AppState>,
    Session(session): Session,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ListFilesRes>, ApiError> {
    let filter = query
        .into_filter()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let list = state.files.get_files(&session, &filter).await?;
    Ok(Json(list.into()))
}

#[utoipa::path(
    post,
    path = "/files",
    params(UploadFileQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File uploaded", body = FileRes),
        (status = 401, description = "Missing or unknown session", body = ErrorRes),
        (status = 413, description = "File larger than 50 MB", body = ErrorRes)
    )
)]
/// Upload a file. The raw request body is the file content.
#[axum::debug_handler]
async fn upload_file(
    State(state): State<AppState>,
    Session(session): Session,
    Query(query): Query<UploadFileQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<FileRes>), ApiError> {
    let record = state.files.upload_file(&session, &query.name, &body).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "File details", body = FileRes),
        (status = 404, description = "No such file visible to the caller", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_file(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<String>,
) -> Result<Json<FileRes>, ApiError> {
    let record = state.files.get_file(&session, &parse_id(&id)?).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    patch,
    path = "/files/{id}/name",
    params(("id" = String, Path, description = "File id")),
    request_body = RenameFileReq,
    responses(
        (status = 200, description = "File renamed; the extension is kept", body = FileRes),
        (status = 400, description = "Empty name", body = ErrorRes),
        (status = 404, description = "No such file visible to the caller", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn rename_file(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<String>,
    Json(req): Json<RenameFileReq>,
) -> Result<Json<FileRes>, ApiError> {
    let record = state
        .files
        .rename_file(&session, &parse_id(&id)?, &req.name)
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    put,
    path = "/files/{id}/users",
    params(("id" = String, Path, description = "File id")),
    request_body = UpdateFileUsersReq,
    responses(
        (status = 200, description = "Share list replaced", body = FileRes),
        (status = 400, description = "Invalid email", body = ErrorRes),
        (status = 404, description = "No such file visible to the caller", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn update_file_users(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<String>,
    Json(req): Json<UpdateFileUsersReq>,
) -> Result<Json<FileRes>, ApiError> {
    let file_id = parse_id(&id)?;
    let emails = req
        .emails
        .iter()
        .map(|email| parse_email(email))
        .collect::<Result<Vec<_>, _>>()?;
    let record = state
        .files
        .update_file_users(&session, &file_id, &emails)
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/files/{id}/users/{email}",
    params(
        ("id" = String, Path, description = "File id"),
        ("email" = String, Path, description = "Collaborator to remove")
    ),
    responses(
        (status = 200, description = "Collaborator removed", body = FileRes),
        (status = 404, description = "No such file visible to the caller", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn remove_file_user(
    State(state): State<AppState>,
    Session(session): Session,
    Path((id, email)): Path<(String, String)>,
) -> Result<Json<FileRes>, ApiError> {
    let file_id = parse_id(&id)?;
    let email = parse_email(&email)?;
    let record = state
        .files
        .remove_file_user(&session, &file_id, &email)
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 204, description = "File and its content deleted"),
        (status = 404, description = "No such file visible to the caller", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_file(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.files.delete_file(&session, &parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/files/{id}/download",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "File content as an attachment", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No such file visible to the caller", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn download_file(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (record, bytes) = state.files.download_file(&session, &parse_id(&id)?).await?;
    let file_name: String = record
        .name
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .filter(|c| *c != '"' && *c != '\\')
        .collect();
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/space",
    responses(
        (status = 200, description = "Storage used by the caller's own files", body = SpaceSummaryRes),
        (status = 401, description = "Missing or unknown session", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn space(
    State(state): State<AppState>,
    Session(session): Session,
) -> Result<Json<SpaceSummaryRes>, ApiError> {
    let summary = state.files.total_space_used(&session).await?;
    Ok(Json(SpaceSummaryRes::from(&summary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use storeit_core::CoreConfig;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const USERS: &str = "users:
  - {id: alice, account_id: a1, full_name: Alice, email: alice@example.com, sessions: [alice-token]}
  - {id: bob, account_id: b1, full_name: Bob, email: bob@example.com, sessions: [bob-token]}
";

    fn app(dir: &TempDir) -> Router {
        std::fs::write(dir.path().join("users.yaml"), USERS).unwrap();
        let cfg = CoreConfig::new(
            dir.path().to_path_buf(),
            "storeit".into(),
            "files".into(),
            "files".into(),
            "http://localhost:3000/v1".into(),
            "storeit".into(),
        )
        .unwrap();
        let files = FileService::local(Arc::new(cfg)).unwrap();
        router(AppState { files })
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(body).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, req).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn upload(app: &Router, token: &str, name: &str, content: &'static [u8]) -> Value {
        let (status, body) = send_json(
            app,
            request(
                "POST",
                &format!("/files?name={name}"),
                Some(token),
                Body::from(content),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send_json(&app(&dir), request("GET", "/health", None, Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_requires_session() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, body) = send_json(&app, request("GET", "/files", None, Body::empty())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().contains("Authorization"));

        let (status, _) = send_json(&app, request("GET", "/space", Some("nobody"), Body::empty())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_list_and_filter() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let uploaded = upload(&app, "alice-token", "photo.png", b"png-ish").await;
        assert_eq!(uploaded["type"], "image");
        assert_eq!(uploaded["section"], "images");
        upload(&app, "alice-token", "notes.txt", b"hello").await;

        let (status, body) = send_json(&app, request("GET", "/files", Some("alice-token"), Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["totalSize"], 12);

        let (_, body) = send_json(
            &app,
            request("GET", "/files?section=images", Some("alice-token"), Body::empty()),
        )
        .await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["files"][0]["name"], "photo.png");

        let (_, body) = send_json(&app, request("GET", "/files", Some("bob-token"), Body::empty())).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_bad_filters_are_client_errors() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, _) = send_json(
            &app,
            request("GET", "/files?types=hologram", Some("alice-token"), Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(
            &app,
            request("GET", "/files?sort=colour-asc", Some("alice-token"), Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rename_share_and_delete() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let uploaded = upload(&app, "alice-token", "draft.pdf", b"%PDF-1.4").await;
        let id = uploaded["id"].as_str().unwrap().to_string();

        let (status, body) = send_json(
            &app,
            Request::builder()
                .method("PATCH")
                .uri(format!("/files/{id}/name"))
                .header(header::AUTHORIZATION, "Bearer alice-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "final"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "final.pdf");

        let (status, body) = send_json(
            &app,
            Request::builder()
                .method("PUT")
                .uri(format!("/files/{id}/users"))
                .header(header::AUTHORIZATION, "Bearer alice-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"emails": ["Bob@Example.com"]}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"], serde_json::json!(["bob@example.com"]));

        let (status, _) = send_json(
            &app,
            request("GET", &format!("/files/{id}"), Some("bob-token"), Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            request("DELETE", &format!("/files/{id}"), Some("alice-token"), Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send_json(
            &app,
            request("GET", &format!("/files/{id}"), Some("alice-token"), Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_is_attachment() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let uploaded = upload(&app, "alice-token", "report.csv", b"a,b\n1,2\n").await;
        let id = uploaded["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                &format!("/files/{id}/download"),
                Some("alice-token"),
                Body::empty(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.csv\""
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_invalid_id_and_unknown_file() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, _) = send_json(
            &app,
            request("GET", "/files/not-an-id", Some("alice-token"), Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = UniqueId::new();
        let (status, _) = send_json(
            &app,
            request("GET", &format!("/files/{missing}"), Some("alice-token"), Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_space_summary() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        upload(&app, "alice-token", "song.mp3", b"0123456789").await;

        let (status, body) = send_json(&app, request("GET", "/space", Some("alice-token"), Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["audio"]["size"], 10);
        assert_eq!(body["used"], 10);
        assert_eq!(body["all"], 2_147_483_648u64);
        assert!(body["image"]["latestDate"].is_null());
    }
}
