//! Terminal rendering for the questionnaire and advice cards.

use moodlayer_client::{Submission, SubmissionState};
use moodlayer_core::mood::{MAX_RATING, MIN_RATING, field_index, rating_glyph};
use moodlayer_core::{AdviceResponse, MoodData, QUESTIONS};
use serde_json::json;

/// Emotions listed under "Dominant emotions".
const DOMINANT_COUNT: usize = 3;

// ── Public API ──

pub fn print_questions(as_json: bool) -> anyhow::Result<()> {
    if as_json {
        let items: Vec<_> = QUESTIONS
            .iter()
            .map(|q| {
                json!({
                    "key": q.key,
                    "label": q.label,
                    "low": q.low_label,
                    "high": q.high_label,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!("=== Mood Assessment ({MIN_RATING}-{MAX_RATING}) ===");
    println!();
    for q in &QUESTIONS {
        println!("  {:<26} {}", q.key, q.label);
        println!("  {:<26} {} .. {}", "", q.low_label, q.high_label);
    }
    Ok(())
}

/// Print the result of a submission as a card, or as one JSON object.
pub fn print_submission(
    mood: &MoodData,
    submission: &Submission,
    as_json: bool,
) -> anyhow::Result<()> {
    let dominant = mood.dominant(DOMINANT_COUNT);

    if as_json {
        let out = json!({
            "state": submission.state,
            "advice": submission.advice,
            "warning": submission.warning,
            "dominant": dominant,
            "ratings": mood,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if let Some(warning) = &submission.warning {
        println!("! {warning}");
        println!();
    }

    let heading = match submission.state {
        SubmissionState::Success => "Your Results",
        _ => "Your Results (sample)",
    };
    println!("=== {heading} ===");
    println!();

    println!("Dominant Emotions");
    for key in &dominant {
        let rating = mood.get(key).unwrap_or_default();
        println!(
            "  {:<26} {} {}",
            label_for(key),
            rating_glyph(rating),
            rating
        );
    }
    println!();

    print_advice_sections(&submission.advice);
    Ok(())
}

pub fn print_advice(advice: &AdviceResponse, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(advice)?);
        return Ok(());
    }
    println!("=== Latest Advice ===");
    println!();
    print_advice_sections(advice);
    Ok(())
}

// ── Section rendering ──

fn print_advice_sections(advice: &AdviceResponse) {
    println!("Personalized Advice");
    println!("  {}", advice.advice);
    println!();
    println!("Suggested Action");
    println!("  {}", advice.suggested_action);
}

fn label_for(key: &str) -> &str {
    field_index(key).map_or(key, |i| QUESTIONS[i].label)
}
