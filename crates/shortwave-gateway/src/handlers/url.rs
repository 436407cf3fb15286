use axum::extract::{Path, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortwave_core::{BatchItem, LinkRecord, Resolved, StoreError};

use crate::error::{AppError, Result};
use crate::model::{ShortenRequest, ShortenResponse};
use crate::session;
use crate::state::AppState;

/// Returns the request's verified owner token, minting (and queueing a
/// cookie for) a fresh one when absent or forged.
fn ensure_owner(headers: &HeaderMap) -> (String, Option<HeaderValue>) {
    match session::owner_from_headers(headers) {
        Some(token) => (token, None),
        None => {
            let token = session::issue_token();
            let cookie = session::token_cookie(&token);
            (token, cookie)
        }
    }
}

fn with_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = cookie {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

/// `GET /{id}` — 307 to the original URL, 410 when soft-deleted.
pub async fn resolve_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    match state.store.get(&id).await? {
        Resolved::Active(url) => {
            let location = HeaderValue::from_str(&url)
                .map_err(|_| AppError::BadRequest(format!("unroutable stored url: {url}")))?;
            let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
            response.headers_mut().insert(LOCATION, location);
            Ok(response)
        }
        Resolved::Deleted => Ok(StatusCode::GONE.into_response()),
    }
}

/// `POST /` — plain-text URL body, answers with the short URL as text.
pub async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    let url = body.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("empty request body".to_owned()));
    }

    let (owner, cookie) = ensure_owner(&headers);
    let record = LinkRecord::new(url, &state.base_url, Some(owner));
    let short = record.short_url.clone();
    state.store.put(record).await?;

    Ok(with_cookie(
        (StatusCode::CREATED, short).into_response(),
        cookie,
    ))
}

/// `POST /api/shorten` — JSON body; a duplicate URL answers 409 with the
/// existing short URL so the caller sees "already shortened", not an
/// internal error.
pub async fn create_json_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ShortenRequest>,
) -> Result<Response> {
    let (owner, cookie) = ensure_owner(&headers);
    let record = LinkRecord::new(&request.url, &state.base_url, Some(owner));
    let payload = ShortenResponse {
        result: record.short_url.clone(),
    };

    let status = match state.store.put(record).await {
        Ok(()) => StatusCode::CREATED,
        Err(StoreError::DuplicateUrl(_)) => StatusCode::CONFLICT,
        Err(err) => return Err(err.into()),
    };

    Ok(with_cookie((status, Json(payload)).into_response(), cookie))
}

/// `POST /api/shorten/batch` — atomic multi-insert; results come back in
/// input order keyed by the caller's correlation ids.
pub async fn create_batch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut items): Json<Vec<BatchItem>>,
) -> Result<Response> {
    let (owner, cookie) = ensure_owner(&headers);
    for item in &mut items {
        item.owner = Some(owner.clone());
    }

    let created = state.store.batch_insert(items, &state.base_url).await?;

    Ok(with_cookie(
        (StatusCode::CREATED, Json(created)).into_response(),
        cookie,
    ))
}

/// `GET /api/user/urls` — the session's non-deleted links; 204 when the
/// request carries no verifiable token or the session has no links.
pub async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let Some(owner) = session::owner_from_headers(&headers) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let links = state.store.get_all(Some(&owner)).await?;
    if links.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(links).into_response())
}

/// `DELETE /api/user/urls` — batched soft delete of short-link ids;
/// accepted for processing, all-or-nothing on the database backend.
pub async fn delete_batch_handler(
    State(state): State<AppState>,
    Json(ids): Json<Vec<String>>,
) -> Result<StatusCode> {
    state.store.batch_soft_delete(&ids).await?;
    Ok(StatusCode::ACCEPTED)
}
