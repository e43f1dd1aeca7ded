use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::Value;

use crate::{
    errors::ApiError,
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::game::{CheckAnswersRequest, CreateGameRequest, UpdateGameRequest},
    services::{
        game_kinds::{kind_for_slug, GameKind},
        game_service::GameService,
        AppState,
    },
};

fn resolve_kind(slug: &str) -> Result<&'static dyn GameKind, ApiError> {
    kind_for_slug(slug).ok_or_else(|| ApiError::not_found("Unknown game type"))
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(req): AppJson<CreateGameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = resolve_kind(&kind)?;
    let response = GameService::new(&state)
        .create_game(kind, req, &claims)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_games(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = resolve_kind(&kind)?;
    let games = GameService::new(&state).list_games(kind, &claims).await?;
    Ok(Json(games))
}

pub async fn get_game_detail(
    State(state): State<Arc<AppState>>,
    Path((kind, game_id)): Path<(String, String)>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;
    let detail = GameService::new(&state)
        .get_game_detail(kind, &game_id, &claims)
        .await?;
    Ok(Json(detail))
}

/// Public play view: published games only, answers stripped.
pub async fn get_game_play(
    State(state): State<Arc<AppState>>,
    Path((kind, game_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;
    let view = GameService::new(&state)
        .get_game_play(kind, &game_id, None)
        .await?;
    Ok(Json(view))
}

/// Owner/admin preview of the play view, published or not.
pub async fn preview_game_play(
    State(state): State<Arc<AppState>>,
    Path((kind, game_id)): Path<(String, String)>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&kind)?;
    let view = GameService::new(&state)
        .get_game_play(kind, &game_id, Some(&claims))
        .await?;
    Ok(Json(view))
}

pub async fn check_answers(
    State(state): State<Arc<AppState>>,
    Path((kind, game_id)): Path<(String, String)>,
    AppJson(req): AppJson<CheckAnswersRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = resolve_kind(&kind)?;
    let result = GameService::new(&state)
        .check_answers(kind, &game_id, req)
        .await?;
    Ok(Json(result))
}

pub async fn update_game(
    State(state): State<Arc<AppState>>,
    Path((kind, game_id)): Path<(String, String)>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(req): AppJson<UpdateGameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = resolve_kind(&kind)?;
    let response = GameService::new(&state)
        .update_game(kind, &game_id, req, &claims)
        .await?;
    Ok(Json(response))
}

pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    Path((kind, game_id)): Path<(String, String)>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = resolve_kind(&kind)?;
    let response = GameService::new(&state)
        .delete_game(kind, &game_id, &claims)
        .await?;
    Ok(Json(response))
}
