//! HTTP handlers: listing, streaming and diagnostics surfaces.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::range::parse_range_header;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct AssetListResponse {
    pub assets: Vec<AssetSummary>,
    pub skipped: Vec<core_catalog::SkippedFolder>,
}

#[derive(Serialize)]
pub struct AssetSummary {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

/// GET /assets: discover playable assets under the target folder.
pub async fn list_assets(
    State(state): State<SharedState>,
) -> Result<Json<AssetListResponse>, AppError> {
    let resolution = state
        .resolver
        .resolve(&state.target_folder_id, &state.shutdown)
        .await?;

    info!(
        assets = resolution.assets.len(),
        skipped = resolution.skipped.len(),
        "Asset listing served"
    );

    Ok(Json(AssetListResponse {
        assets: resolution
            .assets
            .into_iter()
            .map(|a| AssetSummary {
                id: a.id,
                name: a.name,
                size: a.size,
                mime_type: a.mime_type,
            })
            .collect(),
        skipped: resolution.skipped,
    }))
}

/// GET /assets/{id}/content: stream asset bytes, honoring `Range`.
pub async fn stream_asset(
    State(state): State<SharedState>,
    Path(asset_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range_header);
    let ranged = range.is_some();

    let response = state
        .proxy
        .open(&asset_id, range, &state.shutdown)
        .await?;

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, response.mime_type.clone())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, response.body.len());

    builder = if ranged && response.total_size > 0 {
        builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(
                header::CONTENT_RANGE,
                format!(
                    "bytes {}-{}/{}",
                    response.start, response.end, response.total_size
                ),
            )
    } else {
        builder.status(StatusCode::OK)
    };

    builder
        .body(axum::body::Body::from(response.body))
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[derive(Deserialize)]
pub struct DiagnosticsQuery {
    /// `json` (default) or `text`.
    pub format: Option<String>,
}

/// GET /diagnostics: run the probe sequence and report.
pub async fn diagnostics(
    State(state): State<SharedState>,
    Query(query): Query<DiagnosticsQuery>,
) -> Response {
    let report = state.diagnostics.run(&state.shutdown).await;

    match query.format.as_deref() {
        Some("text") => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report.render_text(),
        )
            .into_response(),
        _ => Json(report).into_response(),
    }
}
