use rand::Rng;

use super::generator::generate_questions;
use crate::models::math::{MathDocument, MathEditParams, MathSettings};

/// The regenerate-vs-patch decision. Regeneration is the expensive path;
/// keeping the branch explicit keeps that cost visible to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum EditPlan {
    /// A generation-relevant setting changed: rebuild every question from
    /// the merged settings. Prior question state (and any in-flight
    /// submissions referencing old indices) is discarded wholesale.
    Regenerate {
        settings: MathSettings,
        score_per_question: f64,
    },
    /// Display-only changes: patch fields in place, questions untouched.
    Patch,
}

/// Decides the edit path. Any present `operation`, `difficulty` or
/// `question_count` forces regeneration; missing fields inherit the
/// current settings.
pub fn plan_edit(current: &MathDocument, edit: &MathEditParams) -> EditPlan {
    let settings_changed =
        edit.operation.is_some() || edit.difficulty.is_some() || edit.question_count.is_some();
    // game_type and theme never require regeneration.

    if !settings_changed {
        return EditPlan::Patch;
    }

    EditPlan::Regenerate {
        settings: MathSettings {
            operation: edit.operation.unwrap_or(current.settings.operation),
            difficulty: edit.difficulty.unwrap_or(current.settings.difficulty),
            game_type: edit
                .game_type
                .clone()
                .unwrap_or_else(|| current.settings.game_type.clone()),
            theme: edit
                .theme
                .clone()
                .unwrap_or_else(|| current.settings.theme.clone()),
            question_count: edit.question_count.unwrap_or(current.settings.question_count),
        },
        score_per_question: edit
            .score_per_question
            .unwrap_or(current.score_per_question),
    }
}

/// Applies an edit, returning the new document and whether questions were
/// regenerated.
pub fn apply_edit<R: Rng + ?Sized>(
    rng: &mut R,
    current: &MathDocument,
    edit: &MathEditParams,
) -> (MathDocument, bool) {
    match plan_edit(current, edit) {
        EditPlan::Regenerate {
            settings,
            score_per_question,
        } => {
            let questions = generate_questions(
                rng,
                settings.operation,
                settings.difficulty,
                settings.question_count,
            );
            (
                MathDocument {
                    settings,
                    score_per_question,
                    questions,
                },
                true,
            )
        }
        EditPlan::Patch => {
            let mut next = current.clone();
            if let Some(game_type) = &edit.game_type {
                next.settings.game_type = game_type.clone();
            }
            if let Some(theme) = &edit.theme {
                next.settings.theme = theme.clone();
            }
            if let Some(score) = edit.score_per_question {
                next.score_per_question = score;
            }
            (next, false)
        }
    }
}
