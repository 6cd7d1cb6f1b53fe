use super::dto::{BookRequest, BookResponse, ListBooksResponse, ListQuery};
use super::{AppState, Result, WebError};
use crate::coordinator::SideEffectStatsSnapshot;
use crate::core::{BookError, PageRequest};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::{Value as JsonValue, json};

fn parse_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| WebError::from(BookError::validation("invalid book ID")))
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| WebError::from(BookError::Validation(rejection.body_text())))
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>)> {
    let request = body(payload)?;
    let book = state
        .coordinator
        .create_book(&state.request_context(), request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookResponse>> {
    let id = parse_id(&raw_id)?;
    let book = state
        .coordinator
        .get_book(&state.request_context(), id)
        .await?;
    Ok(Json(book.into()))
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListBooksResponse>> {
    let (page, size) = (query.page(), query.size());
    let listed = state
        .coordinator
        .list_books(&state.request_context(), page, size)
        .await?;
    Ok(Json(ListBooksResponse::new(
        listed,
        PageRequest::normalize(page, size),
    )))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: std::result::Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<BookResponse>> {
    let id = parse_id(&raw_id)?;
    let request = body(payload)?;
    let book = state
        .coordinator
        .update_book(&state.request_context(), id, request.into())
        .await?;
    Ok(Json(book.into()))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&raw_id)?;
    state
        .coordinator
        .delete_book(&state.request_context(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<AppState>) -> Result<Json<JsonValue>> {
    state.coordinator.ping(&state.request_context()).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn stats(State(state): State<AppState>) -> Json<SideEffectStatsSnapshot> {
    Json(state.coordinator.stats())
}
