use crate::metrics;
use crate::models::game::{AnswerResult, AnswerSubmission, GradeResult};
use crate::models::math::MathDocument;

/// Grades a batch of submissions against one document. Pure: never mutates
/// the document and never touches play counters. Out-of-range indices are
/// deliberate non-matches, not errors.
pub fn grade(document: &MathDocument, submissions: &[AnswerSubmission]) -> GradeResult {
    let mut correct_count: u32 = 0;

    let results: Vec<AnswerResult> = submissions
        .iter()
        .map(|submission| {
            let question = usize::try_from(submission.question_index)
                .ok()
                .and_then(|i| document.questions.get(i));

            let Some(question) = question else {
                // No correct_answer here: an ungraded submission must stay
                // distinguishable from a graded-but-wrong one.
                return AnswerResult {
                    question_index: submission.question_index,
                    is_correct: false,
                    correct_answer: None,
                };
            };

            let is_correct = submission
                .selected_answer
                .as_numeric()
                .map(|value| value == question.answer as f64)
                .unwrap_or(false);

            metrics::record_answer_graded(is_correct);
            if is_correct {
                correct_count += 1;
            }

            AnswerResult {
                question_index: submission.question_index,
                is_correct,
                correct_answer: if is_correct { None } else { Some(question.answer) },
            }
        })
        .collect();

    let question_count = document.questions.len() as u32;
    let max_score = question_count as f64 * document.score_per_question;
    // Guard the empty document: no questions means score 0, not NaN.
    let score = if question_count > 0 {
        (correct_count as f64 / question_count as f64) * 100.0
    } else {
        0.0
    };

    GradeResult {
        score,
        correct_count,
        max_score,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::SubmittedAnswer;
    use crate::models::math::{Difficulty, MathSettings, Operation, Question};

    fn document(answers: &[i64], score_per_question: f64) -> MathDocument {
        MathDocument {
            settings: MathSettings {
                operation: Operation::Addition,
                difficulty: Difficulty::Easy,
                game_type: "classic".to_string(),
                theme: "space".to_string(),
                question_count: answers.len() as u32,
            },
            score_per_question,
            questions: answers
                .iter()
                .map(|&answer| Question {
                    question: format!("{} + 0", answer),
                    answer,
                    options: vec![answer, answer + 1, answer + 2, answer + 3],
                })
                .collect(),
        }
    }

    fn submit(index: i64, answer: SubmittedAnswer) -> AnswerSubmission {
        AnswerSubmission {
            question_index: index,
            selected_answer: answer,
        }
    }

    #[test]
    fn string_answers_coerce_to_numbers() {
        let doc = document(&[7], 10.0);
        let result = grade(&doc, &[submit(0, SubmittedAnswer::Text("7".to_string()))]);

        assert_eq!(result.correct_count, 1);
        assert_eq!(result.score, 100.0);
        assert!(result.results[0].is_correct);
        // Correct submissions omit the correct_answer field.
        assert_eq!(result.results[0].correct_answer, None);
    }

    #[test]
    fn wrong_answers_carry_the_correct_value() {
        let doc = document(&[7], 10.0);
        let result = grade(&doc, &[submit(0, SubmittedAnswer::Number(8.0))]);

        assert_eq!(result.correct_count, 0);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.results[0].correct_answer, Some(7));
    }

    #[test]
    fn out_of_range_indices_grade_as_incorrect_without_correct_answer() {
        let doc = document(&[7, 9], 10.0);
        let result = grade(
            &doc,
            &[
                submit(5, SubmittedAnswer::Number(7.0)),
                submit(-1, SubmittedAnswer::Number(7.0)),
            ],
        );

        assert_eq!(result.correct_count, 0);
        for r in &result.results {
            assert!(!r.is_correct);
            assert_eq!(r.correct_answer, None);
        }
    }

    #[test]
    fn non_numeric_submissions_never_match() {
        let doc = document(&[7], 10.0);
        let result = grade(&doc, &[submit(0, SubmittedAnswer::Text("seven".to_string()))]);
        assert!(!result.results[0].is_correct);
        assert_eq!(result.results[0].correct_answer, Some(7));
    }

    #[test]
    fn aggregates_follow_the_scoring_formula() {
        let doc = document(&[1, 2, 3, 4], 2.5);
        let result = grade(
            &doc,
            &[
                submit(0, SubmittedAnswer::Number(1.0)),
                submit(1, SubmittedAnswer::Number(2.0)),
                submit(2, SubmittedAnswer::Number(99.0)),
            ],
        );

        assert_eq!(result.correct_count, 2);
        assert_eq!(result.max_score, 10.0);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn empty_document_scores_zero() {
        let doc = document(&[], 10.0);
        let result = grade(&doc, &[submit(0, SubmittedAnswer::Number(1.0))]);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.max_score, 0.0);
        assert_eq!(result.correct_count, 0);
    }

    #[test]
    fn grading_is_deterministic_and_submission_order_independent_in_aggregate() {
        let doc = document(&[1, 2, 3], 1.0);
        let forward = vec![
            submit(0, SubmittedAnswer::Number(1.0)),
            submit(1, SubmittedAnswer::Number(9.0)),
            submit(2, SubmittedAnswer::Number(3.0)),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = grade(&doc, &forward);
        let b = grade(&doc, &reversed);
        assert_eq!(a, grade(&doc, &forward));
        assert_eq!(a.correct_count, b.correct_count);
        assert_eq!(a.score, b.score);
        assert_eq!(a.max_score, b.max_score);
    }

    #[test]
    fn duplicate_indices_are_each_graded() {
        let doc = document(&[7], 10.0);
        let result = grade(
            &doc,
            &[
                submit(0, SubmittedAnswer::Number(7.0)),
                submit(0, SubmittedAnswer::Number(7.0)),
            ],
        );
        // No uniqueness constraint on indices; both submissions count.
        assert_eq!(result.correct_count, 2);
    }
}
