use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::metrics;
use crate::middlewares::auth::JwtClaims;
use crate::models::game::{
    CheckAnswersRequest, CreateGameRequest, CreatedGameResponse, Game, GameDeletedResponse,
    GameSummary, GameUpdatedResponse, GradeResult, TemplateInfo, UpdateGameRequest,
};
use crate::services::file_store::FileStore;
use crate::services::game_kinds::GameKind;
use crate::services::store::GameStore;
use crate::services::AppState;

/// Orchestrates the game-document lifecycle: one document read plus at
/// most one write per operation, with generation, projection, grading and
/// reconciliation delegated to the `GameKind`.
pub struct GameService {
    games: Arc<dyn GameStore>,
    files: Arc<dyn FileStore>,
}

impl GameService {
    pub fn new(state: &AppState) -> Self {
        Self {
            games: state.games.clone(),
            files: state.files.clone(),
        }
    }

    pub async fn create_game(
        &self,
        kind: &dyn GameKind,
        req: CreateGameRequest,
        actor: &JwtClaims,
    ) -> Result<CreatedGameResponse, ApiError> {
        req.validate()?;

        if self.games.find_by_name(&req.name).await?.is_some() {
            return Err(ApiError::conflict("Game name already exists"));
        }

        let mut rng = StdRng::from_os_rng();
        let game_json = kind.create_document(&req.params, &mut rng)?;

        let id = Uuid::new_v4().to_string();

        let thumbnail_image = match &req.thumbnail_image {
            Some(encoded) => {
                let bytes = decode_thumbnail(encoded)?;
                self.files
                    .upload(
                        &format!("game/{}/{}", kind.slug(), id),
                        bytes,
                        &req.thumbnail_content_type,
                    )
                    .await?
            }
            None => String::new(),
        };

        let now = Utc::now();
        let game = Game {
            id: id.clone(),
            name: req.name,
            description: req.description,
            thumbnail_image,
            is_published: req.is_publish_immediately,
            creator_id: actor.sub.clone(),
            template_slug: kind.slug().to_string(),
            game_json,
            total_played: 0,
            liked_by_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.games.save(&game).await?;

        metrics::GAMES_CREATED_TOTAL
            .with_label_values(&[kind.slug()])
            .inc();
        tracing::info!(game_id = %id, template = kind.slug(), "Game created");

        Ok(CreatedGameResponse {
            id,
            template: TemplateInfo {
                name: kind.title().to_string(),
                slug: kind.slug().to_string(),
            },
        })
    }

    /// Play-mode view: answers stripped. Without an actor the game must be
    /// published; with one, owner-or-admin may preview unpublished games.
    pub async fn get_game_play(
        &self,
        kind: &dyn GameKind,
        game_id: &str,
        actor: Option<&JwtClaims>,
    ) -> Result<Value, ApiError> {
        let game = self.load_game(kind, game_id).await?;

        match actor {
            None => {
                if !game.is_published {
                    return Err(ApiError::forbidden("Game is not published"));
                }
            }
            Some(claims) => ensure_owner_or_admin(&game, claims)?,
        }

        let mut body = settings_body(kind, &game)?;
        body.insert("id".to_string(), Value::String(game.id.clone()));
        body.insert("name".to_string(), Value::String(game.name.clone()));
        body.insert(
            "description".to_string(),
            Value::String(game.description.clone()),
        );
        body.insert(
            "thumbnail_image".to_string(),
            Value::String(game.thumbnail_image.clone()),
        );

        let questions = kind.play_questions(&game.game_json)?;
        body.insert(
            "questions".to_string(),
            serde_json::to_value(questions).map_err(anyhow::Error::from)?,
        );

        Ok(Value::Object(body))
    }

    /// Creator/admin detail view: settings plus record metadata, never the
    /// question array.
    pub async fn get_game_detail(
        &self,
        kind: &dyn GameKind,
        game_id: &str,
        actor: &JwtClaims,
    ) -> Result<Value, ApiError> {
        let game = self.load_game(kind, game_id).await?;
        ensure_owner_or_admin(&game, actor)?;

        let mut body = settings_body(kind, &game)?;
        body.insert("id".to_string(), Value::String(game.id.clone()));
        body.insert("name".to_string(), Value::String(game.name.clone()));
        body.insert(
            "description".to_string(),
            Value::String(game.description.clone()),
        );
        body.insert(
            "thumbnail_image".to_string(),
            Value::String(game.thumbnail_image.clone()),
        );
        body.insert("is_published".to_string(), Value::Bool(game.is_published));
        body.insert(
            "creator_id".to_string(),
            Value::String(game.creator_id.clone()),
        );
        body.insert("total_played".to_string(), game.total_played.into());
        body.insert("liked_by_count".to_string(), game.liked_by_count.into());
        body.insert(
            "created_at".to_string(),
            serde_json::to_value(game.created_at).map_err(anyhow::Error::from)?,
        );
        body.insert(
            "updated_at".to_string(),
            serde_json::to_value(game.updated_at).map_err(anyhow::Error::from)?,
        );

        Ok(Value::Object(body))
    }

    /// Grades a submission batch. Read-only: play counters stay with the
    /// caller, the stored document is never touched.
    pub async fn check_answers(
        &self,
        kind: &dyn GameKind,
        game_id: &str,
        req: CheckAnswersRequest,
    ) -> Result<GradeResult, ApiError> {
        let game = self.load_game(kind, game_id).await?;
        kind.grade(&game.game_json, &req.answers)
    }

    pub async fn update_game(
        &self,
        kind: &dyn GameKind,
        game_id: &str,
        req: UpdateGameRequest,
        actor: &JwtClaims,
    ) -> Result<GameUpdatedResponse, ApiError> {
        req.validate()?;

        let mut game = self.load_game(kind, game_id).await?;
        ensure_owner_or_admin(&game, actor)?;

        // Name collision check excludes the game itself.
        if let Some(name) = &req.name {
            if name != &game.name && self.games.find_by_name(name).await?.is_some() {
                return Err(ApiError::conflict("Game name already exists"));
            }
        }

        let mut rng = StdRng::from_os_rng();
        let outcome = kind.reconcile(&game.game_json, &req.params, &mut rng)?;
        if outcome.regenerated {
            metrics::GAMES_REGENERATED_TOTAL.inc();
            tracing::info!(game_id = %game.id, "Questions regenerated on edit");
        }
        game.game_json = outcome.game_json;

        // Thumbnail replacement: decode and store the new object before
        // anything existing is touched, so a bad payload fails the request
        // with the stored state intact. The old object is released only
        // after the record persists.
        let mut replaced_thumbnail = None;
        if let Some(encoded) = &req.thumbnail_image {
            let bytes = decode_thumbnail(encoded)?;
            let uploaded = self
                .files
                .upload(
                    &format!("game/{}/{}", kind.slug(), game.id),
                    bytes,
                    &req.thumbnail_content_type,
                )
                .await?;
            if game.thumbnail_image.is_empty() {
                game.thumbnail_image = uploaded;
            } else {
                replaced_thumbnail = Some(std::mem::replace(&mut game.thumbnail_image, uploaded));
            }
        }

        if let Some(name) = req.name {
            game.name = name;
        }
        if let Some(description) = req.description {
            game.description = description;
        }
        if let Some(is_publish) = req.is_publish {
            game.is_published = is_publish;
        }
        game.updated_at = Utc::now();

        self.games.save(&game).await?;

        // Post-persist cleanup; a failure here orphans the old object but
        // never the record.
        if let Some(old) = replaced_thumbnail {
            if let Err(e) = self.files.remove(&old).await {
                tracing::warn!(path = %old, "Failed to remove replaced thumbnail: {:#}", e);
            }
        }

        Ok(GameUpdatedResponse {
            id: game.id,
            updated: true,
        })
    }

    pub async fn delete_game(
        &self,
        kind: &dyn GameKind,
        game_id: &str,
        actor: &JwtClaims,
    ) -> Result<GameDeletedResponse, ApiError> {
        let game = self.load_game(kind, game_id).await?;
        ensure_owner_or_admin(&game, actor)?;

        if !game.thumbnail_image.is_empty() {
            self.files.remove(&game.thumbnail_image).await?;
        }

        self.games.delete(&game.id).await?;
        tracing::info!(game_id = %game.id, "Game deleted");

        Ok(GameDeletedResponse {
            id: game.id,
            deleted: true,
        })
    }

    /// Creator dashboard: own games only, unless the actor is an admin.
    pub async fn list_games(
        &self,
        kind: &dyn GameKind,
        actor: &JwtClaims,
    ) -> Result<Vec<GameSummary>, ApiError> {
        let creator_filter = if actor.is_admin() {
            None
        } else {
            Some(actor.sub.as_str())
        };

        let games = self
            .games
            .list_by_template(kind.slug(), creator_filter)
            .await?;

        Ok(games.iter().map(GameSummary::from_game).collect())
    }

    async fn load_game(&self, kind: &dyn GameKind, game_id: &str) -> Result<Game, ApiError> {
        let game = self
            .games
            .load(game_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Game not found"))?;

        // A record of another template is as good as absent for this kind.
        if game.template_slug != kind.slug() {
            return Err(ApiError::not_found("Game not found"));
        }

        Ok(game)
    }
}

fn settings_body(kind: &dyn GameKind, game: &Game) -> Result<Map<String, Value>, ApiError> {
    match kind.settings_view(&game.game_json)? {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::Internal(anyhow::anyhow!(
            "Settings view must be an object, got {}",
            other
        ))),
    }
}

fn ensure_owner_or_admin(game: &Game, claims: &JwtClaims) -> Result<(), ApiError> {
    if claims.is_admin() || game.creator_id == claims.sub {
        Ok(())
    } else {
        Err(ApiError::forbidden("Access denied"))
    }
}

fn decode_thumbnail(encoded: &str) -> Result<Vec<u8>, ApiError> {
    general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::validation("thumbnail_image must be valid base64"))
}
