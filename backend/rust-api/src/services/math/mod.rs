pub mod generator;
pub mod grading;
pub mod projection;
pub mod reconcile;

use anyhow::anyhow;
use rand::RngCore;
use serde_json::Value;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::game::{AnswerSubmission, GradeResult, PlayQuestion};
use crate::models::math::{
    CreateMathParams, GameDocument, MathDocument, MathEditParams, MathSettings,
};
use crate::services::game_kinds::{GameKind, ReconcileOutcome};

pub const MATH_GENERATOR_SLUG: &str = "math-generator";

/// The arithmetic-quiz game kind: parametrized generation, answer-stripped
/// play views and exact-match grading.
pub struct MathGenerator;

impl MathGenerator {
    fn parse_document(game_json: &Value) -> Result<MathDocument, ApiError> {
        GameDocument::from_value(game_json)
            .map(GameDocument::into_math)
            .map_err(|e| ApiError::Internal(anyhow!("Stored game document is corrupt: {}", e)))
    }
}

/// Assembles one versioned document from validated authoring parameters
/// and a generated question sequence. Rejects a zero question count even
/// when request validation was bypassed.
pub fn assemble_document(
    params: &CreateMathParams,
    questions: Vec<crate::models::math::Question>,
) -> Result<GameDocument, ApiError> {
    if params.question_count < 1 {
        return Err(ApiError::validation("question_count must be at least 1"));
    }

    Ok(GameDocument::V1(MathDocument {
        settings: MathSettings {
            operation: params.operation,
            difficulty: params.difficulty,
            game_type: params.game_type.clone(),
            theme: params.theme.clone(),
            question_count: params.question_count,
        },
        score_per_question: params.score_per_question,
        questions,
    }))
}

impl GameKind for MathGenerator {
    fn slug(&self) -> &'static str {
        MATH_GENERATOR_SLUG
    }

    fn title(&self) -> &'static str {
        "Math Generator"
    }

    fn create_document(&self, params: &Value, rng: &mut dyn RngCore) -> Result<Value, ApiError> {
        let params: CreateMathParams = serde_json::from_value(params.clone())
            .map_err(|e| ApiError::validation(format!("Invalid math generator params: {}", e)))?;
        params.validate()?;

        let questions = generator::generate_questions(
            rng,
            params.operation,
            params.difficulty,
            params.question_count,
        );

        let document = assemble_document(&params, questions)?;
        document
            .to_value()
            .map_err(|e| ApiError::Internal(anyhow!("Failed to serialize document: {}", e)))
    }

    fn play_questions(&self, game_json: &Value) -> Result<Vec<PlayQuestion>, ApiError> {
        let document = Self::parse_document(game_json)?;
        Ok(projection::play_questions(&document))
    }

    fn settings_view(&self, game_json: &Value) -> Result<Value, ApiError> {
        let document = Self::parse_document(game_json)?;
        Ok(projection::settings_view(&document))
    }

    fn grade(
        &self,
        game_json: &Value,
        submissions: &[AnswerSubmission],
    ) -> Result<GradeResult, ApiError> {
        let document = Self::parse_document(game_json)?;
        Ok(grading::grade(&document, submissions))
    }

    fn reconcile(
        &self,
        game_json: &Value,
        edit: &Value,
        rng: &mut dyn RngCore,
    ) -> Result<ReconcileOutcome, ApiError> {
        let edit: MathEditParams = serde_json::from_value(edit.clone())
            .map_err(|e| ApiError::validation(format!("Invalid math generator params: {}", e)))?;
        edit.validate()?;

        let current = Self::parse_document(game_json)?;
        let (next, regenerated) = reconcile::apply_edit(rng, &current, &edit);

        let game_json = GameDocument::V1(next)
            .to_value()
            .map_err(|e| ApiError::Internal(anyhow!("Failed to serialize document: {}", e)))?;

        Ok(ReconcileOutcome {
            game_json,
            regenerated,
        })
    }
}
