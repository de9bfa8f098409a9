//! HTTP request handlers

use super::state::AppState;
use crate::error::GatewayError;
use crate::search::{SearchParams, SearchRequest};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

/// `POST /search` with a JSON body
pub async fn search_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => search(&state, &headers, request).await,
        Err(rejection) => GatewayError::Validation(rejection.body_text()).into_response(),
    }
}

/// `GET /search` with query-string parameters
pub async fn search_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let request = params
        .map_err(|rejection| GatewayError::Validation(rejection.body_text()))
        .and_then(|Query(params)| params.into_request());

    match request {
        Ok(request) => search(&state, &headers, request).await,
        Err(e) => e.into_response(),
    }
}

async fn search(state: &AppState, headers: &HeaderMap, request: SearchRequest) -> Response {
    // A missing query is a 400 whether or not the caller is authorized
    if !request.has_query() {
        return GatewayError::MissingQuery.into_response();
    }

    if let Err(e) = state.authorize(headers, request.api_key.as_deref()) {
        return e.into_response();
    }

    match state.gateway.handle(request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
