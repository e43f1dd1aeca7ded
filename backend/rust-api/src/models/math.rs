use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Upper bound for the two base operands (inclusive, lower bound is 1).
    pub fn operand_range(self) -> i64 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 50,
        }
    }
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
            Operation::Random => "random",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathSettings {
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub game_type: String,
    pub theme: String,
    pub question_count: u32,
}

/// One generated question. Invariants: `answer` appears in `options`
/// exactly once, `options` holds 4 distinct values, all positive unless
/// the distractor-search safety valve was exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub answer: i64,
    pub options: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathDocument {
    pub settings: MathSettings,
    pub score_per_question: f64,
    pub questions: Vec<Question>,
}

/// Versioned wrapper around the persisted document. The original payload
/// carried no version tag; new writes always carry `schema_version` so the
/// generator's output shape can evolve without breaking stored games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema_version")]
pub enum GameDocument {
    #[serde(rename = "1")]
    V1(MathDocument),
}

impl GameDocument {
    /// Parses a stored `game_json` payload. Untagged legacy documents are
    /// migrated to V1 on read.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        if value.get("schema_version").is_some() {
            serde_json::from_value(value.clone())
        } else {
            serde_json::from_value::<MathDocument>(value.clone()).map(GameDocument::V1)
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn as_math(&self) -> &MathDocument {
        match self {
            GameDocument::V1(doc) => doc,
        }
    }

    pub fn into_math(self) -> MathDocument {
        match self {
            GameDocument::V1(doc) => doc,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMathParams {
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub game_type: String,
    pub theme: String,
    #[validate(range(min = 1, max = 100))]
    pub question_count: u32,
    #[validate(range(exclusive_min = 0.0))]
    pub score_per_question: f64,
}

/// Partial edit payload for the reconciler. A present `operation`,
/// `difficulty` or `question_count` forces full regeneration; the rest
/// patch in place.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MathEditParams {
    pub operation: Option<Operation>,
    pub difficulty: Option<Difficulty>,
    pub game_type: Option<String>,
    pub theme: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub question_count: Option<u32>,
    #[validate(range(exclusive_min = 0.0))]
    pub score_per_question: Option<f64>,
}
