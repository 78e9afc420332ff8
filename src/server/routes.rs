use axum::{
    extract::{Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::github::{normalize_keyword, SearchResults};
use crate::ingest::search_and_store;
use crate::record::{parse_positive, Page};
use crate::server::AppState;
use crate::storage::{ConnectionState, StoredResults};
use crate::Error;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub page: Option<String>,
}

#[derive(Deserialize)]
pub struct ReposParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub db: ConnectionState,
    pub ok: bool,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Upstream { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let keyword = normalize_keyword(params.keyword.as_deref()).map_err(error_response)?;
    let page = parse_positive(params.page.as_deref(), "page")
        .and_then(|n| Page::search(n.unwrap_or(1)))
        .map_err(error_response)?;

    let results = search_and_store(&state.github, &state.store, keyword, page)
        .await
        .map_err(|e| {
            tracing::warn!("Search for {:?} failed: {}", keyword, e);
            error_response(e)
        })?;

    Ok(Json(results))
}

pub async fn list_repos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReposParams>,
) -> Result<Json<StoredResults>, ApiError> {
    let page = Page::from_query(params.page.as_deref(), params.per_page.as_deref())
        .map_err(error_response)?;

    let results = state.store.list(page).map_err(|e| {
        tracing::error!("Failed to read stored repos: {}", e);
        error_response(e)
    })?;

    Ok(Json(results))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db = state.store.state();
    Json(HealthResponse { db, ok: db.is_ready() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, body) = error_response(Error::InvalidInput("Keyword is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.error, "Keyword is required");

        let (status, body) = error_response(Error::Upstream { status: 422, message: "Validation Failed".into() });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.0.error, "Validation Failed");

        let (status, _) = error_response(Error::NotConnected);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
