use serde_json::{json, Value};

use crate::models::game::PlayQuestion;
use crate::models::math::MathDocument;

/// Player-safe projection: one record per question with the answer and the
/// distractor internals stripped. Generation order is preserved, so
/// `index` matches the `question_index` the grader expects.
pub fn play_questions(document: &MathDocument) -> Vec<PlayQuestion> {
    document
        .questions
        .iter()
        .enumerate()
        .map(|(index, q)| PlayQuestion {
            index,
            question: q.question.clone(),
            options: q.options.clone(),
        })
        .collect()
}

/// Creator-facing settings view. Intentionally omits the question array:
/// the detail screen shows aggregate settings only and never re-exposes
/// answers in bulk.
pub fn settings_view(document: &MathDocument) -> Value {
    json!({
        "settings": document.settings,
        "score_per_question": document.score_per_question,
    })
}
