use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Persisted game record. The core only ever rewrites `game_json` and
/// `thumbnail_image`; identity, publication state and counters belong to
/// the surrounding service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub thumbnail_image: String,
    pub is_published: bool,
    pub creator_id: String,
    pub template_slug: String,
    pub game_json: Value,
    pub total_played: i64,
    pub liked_by_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_publish_immediately: bool,
    /// Base64-encoded image payload, uploaded to the file store on create.
    pub thumbnail_image: Option<String>,
    #[serde(default = "default_image_content_type")]
    pub thumbnail_content_type: String,
    /// Kind-specific authoring parameters, interpreted by the `GameKind`.
    #[serde(flatten)]
    pub params: Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_publish: Option<bool>,
    pub thumbnail_image: Option<String>,
    #[serde(default = "default_image_content_type")]
    pub thumbnail_content_type: String,
    #[serde(flatten)]
    pub params: Value,
}

fn default_image_content_type() -> String {
    "image/png".to_string()
}

#[derive(Debug, Serialize)]
pub struct CreatedGameResponse {
    pub id: String,
    pub template: TemplateInfo,
}

#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct GameUpdatedResponse {
    pub id: String,
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct GameDeletedResponse {
    pub id: String,
    pub deleted: bool,
}

/// Summary row for creator dashboards; never carries the document payload.
#[derive(Debug, Serialize)]
pub struct GameSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub thumbnail_image: String,
    pub is_published: bool,
    pub total_played: i64,
    pub liked_by_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameSummary {
    pub fn from_game(game: &Game) -> Self {
        Self {
            id: game.id.clone(),
            name: game.name.clone(),
            description: game.description.clone(),
            thumbnail_image: game.thumbnail_image.clone(),
            is_published: game.is_published,
            total_played: game.total_played,
            liked_by_count: game.liked_by_count,
            created_at: game.created_at,
            updated_at: game.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckAnswersRequest {
    pub answers: Vec<AnswerSubmission>,
}

/// One submitted answer. Indices are untrusted input: out-of-range values
/// grade as incorrect rather than erroring.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerSubmission {
    pub question_index: i64,
    pub selected_answer: SubmittedAnswer,
}

/// Players may submit either a number or its string form ("7" grades the
/// same as 7).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Number(f64),
    Text(String),
}

impl SubmittedAnswer {
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            SubmittedAnswer::Number(n) => Some(*n),
            SubmittedAnswer::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GradeResult {
    pub score: f64,
    pub correct_count: u32,
    pub max_score: f64,
    pub results: Vec<AnswerResult>,
}

/// Per-submission grading detail. `correct_answer` is present only for a
/// graded-but-wrong answer; a correct or out-of-range submission omits it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnswerResult {
    pub question_index: i64,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PlayQuestion {
    pub index: usize,
    pub question: String,
    pub options: Vec<i64>,
}
