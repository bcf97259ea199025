//! HTTP API and static dashboard hosting.
//!
//! Routes:
//! - `GET /healthz`: liveness, no auth
//! - `GET /api/prisoners[?page=&per_page=]`: records ordered by id
//! - `GET /api/prisoners/{id}`: one record, or 404
//! - `GET /api/analysis`: the full report
//! - anything else: files from the static directory
//!
//! Every `/api` route requires HTTP basic auth.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, Query, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use prisonstatslib::{run_report, Page, PrisonerRecord, Report, SqliteStore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::Credentials;

pub const AUTH_REALM: &str = "prisonstats";

#[derive(Clone)]
pub struct AppState {
    store: SqliteStore,
    credentials: Arc<Credentials>,
    static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: SqliteStore, credentials: Credentials, static_dir: PathBuf) -> Self {
        Self {
            store,
            credentials: Arc::new(credentials),
            static_dir: Arc::new(static_dir),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn json_error(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: code.into(),
            message: message.into(),
        }),
    )
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/prisoners", get(list_prisoners))
        .route("/prisoners/{id}", get(get_prisoner))
        .route("/analysis", get(analysis))
        .fallback(api_not_found)
        .layer(from_fn_with_state(state.clone(), require_basic_auth));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .fallback(serve_static)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn api_not_found() -> ApiError {
    json_error(StatusCode::NOT_FOUND, "not_found", "no such endpoint")
}

async fn require_basic_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let provided = basic_credentials(req.headers());
    match provided {
        Some((username, password))
            if credentials_match(&state.credentials, &username, &password) =>
        {
            next.run(req).await
        }
        _ => {
            tracing::debug!(path = %req.uri().path(), "rejected unauthenticated request");
            unauthorized()
        }
    }
}

/// Both fields are always compared, each in constant time.
fn credentials_match(expected: &Credentials, username: &str, password: &str) -> bool {
    let username_ok = secret_eq(username, &expected.username);
    let password_ok = secret_eq(password, &expected.password);
    username_ok & password_ok
}

/// MAC both values and verify the tags; `verify_slice` compares in constant
/// time and the fixed tag length hides the secret's length.
fn secret_eq(provided: &str, expected: &str) -> bool {
    let mac_of = |value: &str| -> Option<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(AUTH_REALM.as_bytes()).ok()?;
        mac.update(value.as_bytes());
        Some(mac)
    };
    match (mac_of(provided), mac_of(expected)) {
        (Some(provided), Some(expected)) => provided
            .verify_slice(&expected.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}

fn unauthorized() -> Response {
    let mut response = json_error(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "valid credentials are required",
    )
    .into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", AUTH_REALM)) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }
    response
}

/// Username and password from an `Authorization: Basic` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Run a store call on the blocking pool.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&SqliteStore) -> prisonstatslib::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "store task failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "store task failed",
            )
        })?
        .map_err(|err| {
            tracing::error!(error = %err, "store call failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                err.to_string(),
            )
        })
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    page: Option<String>,
    per_page: Option<String>,
}

fn parse_page(params: &PageParams) -> Result<Option<Page>, ApiError> {
    let bad_request = || {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_pagination",
            "page and per_page must be given together as integers >= 1",
        )
    };

    match (&params.page, &params.per_page) {
        (None, None) => Ok(None),
        (Some(page), Some(per_page)) => {
            let page: u32 = page.trim().parse().map_err(|_| bad_request())?;
            let per_page: u32 = per_page.trim().parse().map_err(|_| bad_request())?;
            Page::new(page, per_page).map(Some).ok_or_else(bad_request)
        }
        _ => Err(bad_request()),
    }
}

async fn list_prisoners(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<PrisonerRecord>>, ApiError> {
    let page = parse_page(&params)?;
    let records = with_store(&state, move |store| store.list_prisoners(page)).await?;
    Ok(Json(records))
}

async fn get_prisoner(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<PrisonerRecord>, ApiError> {
    let not_found = || {
        json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no prisoner with id {}", id),
        )
    };

    let Ok(prisoner_id) = id.trim().parse::<u32>() else {
        return Err(not_found());
    };
    with_store(&state, move |store| store.get_prisoner(prisoner_id))
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

async fn analysis(State(state): State<AppState>) -> Result<Json<Report>, ApiError> {
    let report = with_store(&state, |store| {
        let records = store.load_all()?;
        Ok(run_report(&records))
    })
    .await?;
    Ok(Json(report))
}

async fn serve_static(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return json_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "only GET is supported",
        )
        .into_response();
    }

    let not_found = || json_error(StatusCode::NOT_FOUND, "not_found", "no such file").into_response();

    let Some(relative) = static_relative_path(uri.path()) else {
        tracing::debug!(path = %uri.path(), "rejected static path");
        return not_found();
    };

    let mut path = state.static_dir.join(relative);
    if tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
    {
        path.push("index.html");
    }

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return not_found(),
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response(),
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to read static file");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "failed to read file",
            )
            .into_response()
        }
    }
}

/// Map a request path onto a path under the static directory.
///
/// Only plain file name components are accepted, so `..`, absolute paths
/// and drive prefixes yield `None`.
fn static_relative_path(request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    let trimmed = if trimmed.is_empty() {
        "index.html"
    } else {
        trimmed
    };

    let mut relative = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            _ => return None,
        }
    }
    Some(relative)
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
