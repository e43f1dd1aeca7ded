use rand::RngCore;
use serde_json::Value;

use crate::errors::ApiError;
use crate::models::game::{AnswerSubmission, GradeResult, PlayQuestion};
use crate::services::math::{MathGenerator, MATH_GENERATOR_SLUG};

/// Result of reconciling an edit against a stored document.
pub struct ReconcileOutcome {
    pub game_json: Value,
    pub regenerated: bool,
}

/// One mini-game kind, selected by its template slug. Each kind owns the
/// shape of its `game_json` payload; the service layer passes it around
/// opaquely. Randomness is injected so generation stays testable.
pub trait GameKind: Send + Sync {
    fn slug(&self) -> &'static str;
    fn title(&self) -> &'static str;

    /// Builds a fresh document from authoring parameters.
    fn create_document(&self, params: &Value, rng: &mut dyn RngCore) -> Result<Value, ApiError>;

    /// Player-safe question list with answers stripped.
    fn play_questions(&self, game_json: &Value) -> Result<Vec<PlayQuestion>, ApiError>;

    /// Aggregate settings for play and detail responses; never contains
    /// per-question answers.
    fn settings_view(&self, game_json: &Value) -> Result<Value, ApiError>;

    /// Grades a batch of submissions against the stored document.
    fn grade(
        &self,
        game_json: &Value,
        submissions: &[AnswerSubmission],
    ) -> Result<GradeResult, ApiError>;

    /// Decides regenerate-vs-patch for a partial edit and applies it.
    fn reconcile(
        &self,
        game_json: &Value,
        edit: &Value,
        rng: &mut dyn RngCore,
    ) -> Result<ReconcileOutcome, ApiError>;
}

static MATH_GENERATOR: MathGenerator = MathGenerator;

/// Resolves a template slug at the API boundary. Unknown slugs are the
/// caller's NotFound.
pub fn kind_for_slug(slug: &str) -> Option<&'static dyn GameKind> {
    match slug {
        MATH_GENERATOR_SLUG => Some(&MATH_GENERATOR),
        _ => None,
    }
}
