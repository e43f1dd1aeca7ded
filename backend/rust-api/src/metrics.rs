use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // Business metrics
    pub static ref GAMES_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "games_created_total",
        "Total number of games created",
        &["template"]
    )
    .unwrap();

    pub static ref GAMES_REGENERATED_TOTAL: IntCounter = register_int_counter!(
        "games_regenerated_total",
        "Total number of edits that triggered full question regeneration"
    )
    .unwrap();

    pub static ref QUESTIONS_GENERATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "questions_generated_total",
        "Total number of questions generated",
        &["operation"]
    )
    .unwrap();

    pub static ref ANSWERS_GRADED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_graded_total",
        "Total number of submitted answers graded",
        &["correct"]
    )
    .unwrap();

    // Quality signal: the bounded distractor search fell back to the
    // deterministic filler (see the generator).
    pub static ref DISTRACTOR_FALLBACKS_TOTAL: IntCounter = register_int_counter!(
        "distractor_fallbacks_total",
        "Total number of distractor slots filled by the deterministic fallback"
    )
    .unwrap();
}

pub fn record_answer_graded(is_correct: bool) {
    let label = if is_correct { "true" } else { "false" };
    ANSWERS_GRADED_TOTAL.with_label_values(&[label]).inc();
}

/// Renders all registered metrics in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
