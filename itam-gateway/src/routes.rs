//! Axum route handlers for the ITAM API.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use itam_core::{
    Asset, Contract, ContractFile, DashboardStats, Keyed, NewContractFile, Resource,
    SystemInterface,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::GatewayError,
    extract::{IdParam, JsonBody},
    notify::{self, Announce},
    state::AppState,
};

/// Uploader recorded when the form does not name one.
const DEFAULT_UPLOADER: &str = "admin";

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over the given state.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/ping", any(ping))
        .route("/api/v1/dashboard/stats", get(dashboard_stats))
        .route("/api/v1/assets", get(list::<Asset>).post(create::<Asset>))
        .route(
            "/api/v1/assets/{id}",
            get(fetch::<Asset>).put(update::<Asset>).delete(remove::<Asset>),
        )
        .route("/api/v1/contracts", get(list::<Contract>).post(create::<Contract>))
        .route(
            "/api/v1/contracts/{id}",
            get(fetch::<Contract>).put(update::<Contract>).delete(remove::<Contract>),
        )
        .route(
            "/api/v1/contracts/{id}/files",
            get(list_contract_files).post(upload_contract_file),
        )
        .route("/api/v1/contract-files/{id}/download", get(download_contract_file))
        .route(
            "/api/v1/interfaces",
            get(list::<SystemInterface>).post(create::<SystemInterface>),
        )
        .route(
            "/api/v1/interfaces/{id}",
            get(fetch::<SystemInterface>)
                .put(update::<SystemInterface>)
                .delete(remove::<SystemInterface>),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(answer_preflight))
}

/// Answer every `OPTIONS` request with an empty 204 before routing.
async fn answer_preflight(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return (
            StatusCode::NO_CONTENT,
            [
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS"),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            ],
        )
            .into_response();
    }
    next.run(req).await
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// `ANY /api/v1/ping`
pub async fn ping() -> impl IntoResponse {
    Json(json!({"message": "pong"}))
}

async fn not_found() -> GatewayError {
    GatewayError::RouteNotFound
}

/// `GET /api/v1/dashboard/stats`: recomputed from the live asset collection.
///
/// # Errors
/// Returns [`GatewayError::Store`] if the asset collection is unavailable.
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, GatewayError> {
    Ok(Json(DashboardStats::collect(&state.store, state.static_stats)?))
}

/// `GET /api/v1/{collection}`: all records in creation order.
///
/// # Errors
/// Returns [`GatewayError::Store`] if the collection is unavailable.
pub async fn list<R: Resource + Serialize>(
    State(state): State<AppState>,
) -> Result<Json<Vec<R>>, GatewayError> {
    Ok(Json(state.store.list::<R>()?))
}

/// `GET /api/v1/{collection}/{id}`
///
/// # Errors
/// Returns [`GatewayError::Store`] with `NotFound` if the ID is unknown.
pub async fn fetch<R: Resource + Serialize>(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<R>, GatewayError> {
    Ok(Json(state.store.get::<R>(id)?))
}

/// `POST /api/v1/{collection}`: store a new record.
///
/// Responds 200 with the stored record, including its assigned `ID` and
/// timestamps. Kinds that announce creation get an alert dispatched in the
/// background.
///
/// # Errors
/// Returns [`GatewayError::InvalidJson`] if the body does not decode.
pub async fn create<R: Resource + Serialize + Announce>(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<R::Draft>,
) -> Result<Json<R>, GatewayError> {
    let record = state.store.create::<R>(draft)?;
    tracing::info!(kind = R::LABEL, id = %Keyed::id(&record), "record created");
    if let Some(alert) = record.created_alert() {
        notify::dispatch(&state.notifier, alert);
    }
    Ok(Json(record))
}

/// `PUT /api/v1/{collection}/{id}`: merge the supplied fields.
///
/// # Errors
/// Returns [`GatewayError::Store`] with `NotFound` if the ID is unknown, or
/// [`GatewayError::InvalidJson`] if the body does not decode.
pub async fn update<R: Resource + Serialize>(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    JsonBody(patch): JsonBody<R::Patch>,
) -> Result<Json<R>, GatewayError> {
    Ok(Json(state.store.update::<R>(id, patch)?))
}

/// `DELETE /api/v1/{collection}/{id}`
///
/// # Errors
/// Returns [`GatewayError::Store`] with `NotFound` if the ID is unknown.
pub async fn remove<R: Resource + Announce>(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<impl IntoResponse, GatewayError> {
    let removed = state.store.delete::<R>(id)?;
    tracing::info!(kind = R::LABEL, %id, "record deleted");
    if let Some(alert) = removed.deleted_alert() {
        notify::dispatch(&state.notifier, alert);
    }
    Ok(Json(json!({"message": format!("{} deleted", R::LABEL)})))
}

/// `GET /api/v1/contracts/{id}/files`: newest version first.
///
/// # Errors
/// Returns [`GatewayError::Store`] if the file collection is unavailable.
pub async fn list_contract_files(
    State(state): State<AppState>,
    IdParam(contract_id): IdParam,
) -> Result<Json<Vec<ContractFile>>, GatewayError> {
    Ok(Json(state.store.contract_files(contract_id)?))
}

/// `POST /api/v1/contracts/{id}/files`: multipart upload of a new version.
///
/// Expects a `file` part and an optional `uploaded_by` text part. The blob is
/// written before the record is inserted.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if the form is malformed or has
/// no `file` part, or [`GatewayError::Storage`] if the blob cannot be saved.
pub async fn upload_contract_file(
    State(state): State<AppState>,
    IdParam(contract_id): IdParam,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ContractFile>, GatewayError> {
    let mut multipart = multipart.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let mut upload = None;
    let mut uploaded_by = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?
    {
        match field.name().map(str::to_owned).as_deref() {
            Some("file") => {
                let file_name = match field.file_name() {
                    Some(name) if !name.is_empty() => name.to_owned(),
                    _ => "upload.bin".to_owned(),
                };
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
                upload = Some((file_name, data));
            }
            Some("uploaded_by") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
                uploaded_by = Some(text.trim().to_owned()).filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = upload else {
        return Err(GatewayError::InvalidRequest("No file uploaded".to_owned()));
    };
    let size = data.len();
    let file_path = state.files.put(contract_id, &file_name, data).await?;
    let file = state.store.add_contract_file(
        contract_id,
        NewContractFile {
            file_name,
            file_path,
            uploaded_by: uploaded_by.unwrap_or_else(|| DEFAULT_UPLOADER.to_owned()),
        },
    )?;

    tracing::info!(
        %contract_id,
        file_id = %file.id,
        version = file.version,
        size,
        "contract file uploaded"
    );
    Ok(Json(file))
}

/// `GET /api/v1/contract-files/{id}/download`: the stored bytes.
///
/// # Errors
/// Returns 404 if the file record or its blob is missing.
pub async fn download_contract_file(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Response, GatewayError> {
    let file = state.store.get_contract_file(id)?;
    let data = state.files.get(&file.file_path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_DISPOSITION, content_disposition(&file.file_name)),
        ],
        data,
    )
        .into_response())
}

/// `attachment; filename="..."`. Names outside printable ASCII also carry an
/// RFC 5987 `filename*` with the UTF-8 name, next to an ASCII fallback where
/// every other character becomes `_`.
fn content_disposition(file_name: &str) -> HeaderValue {
    let fallback: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\')
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect();
    let value = if file_name.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(file_name)
        )
    };
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
