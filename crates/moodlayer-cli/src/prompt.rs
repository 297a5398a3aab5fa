//! Rating input: `key=value` flags and the interactive questionnaire.

use std::io::{BufRead, Write};

use anyhow::bail;
use moodlayer_core::mood::{DEFAULT_RATING, MAX_RATING, MIN_RATING, field_index, rating_glyph};
use moodlayer_core::{MoodDataBuilder, QUESTIONS};

/// Parse a `--rating key=value` argument.
pub fn parse_rating_arg(s: &str) -> Result<(String, i64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if field_index(key).is_none() {
        return Err(format!("unknown mood field '{key}'"));
    }
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("rating for '{key}' must be a whole number"))?;
    Ok((key.to_string(), value))
}

/// Ask every question in order. An empty answer keeps the current rating
/// (neutral unless set earlier by a flag or file).
pub fn ask_all<R: BufRead, W: Write>(
    mut builder: MoodDataBuilder,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<MoodDataBuilder> {
    writeln!(
        output,
        "Rate each feeling from {MIN_RATING} to {MAX_RATING}. Press enter to keep the shown value."
    )?;

    for q in &QUESTIONS {
        let current = builder.get(q.key).unwrap_or(DEFAULT_RATING);
        loop {
            write!(
                output,
                "{} ({} .. {}) [{} {}]: ",
                q.label,
                q.low_label,
                q.high_label,
                rating_glyph(current),
                current
            )?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                bail!("input ended before the questionnaire was complete");
            }
            let answer = line.trim();
            if answer.is_empty() {
                break;
            }
            match answer.parse::<i64>() {
                Ok(value) => match builder.set(q.key, value) {
                    Ok(()) => break,
                    Err(e) => writeln!(output, "  {e}")?,
                },
                Err(_) => writeln!(output, "  enter a number from {MIN_RATING} to {MAX_RATING}")?,
            }
        }
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_key_value() {
        assert_eq!(parse_rating_arg("joyful=4"), Ok(("joyful".into(), 4)));
        assert_eq!(parse_rating_arg(" anxiety = 1 "), Ok(("anxiety".into(), 1)));
    }

    #[test]
    fn rejects_malformed_ratings() {
        assert!(parse_rating_arg("joyful").is_err());
        assert!(parse_rating_arg("sleepy=3").is_err());
        assert!(parse_rating_arg("joyful=high").is_err());
    }

    #[test]
    fn interactive_answers_and_defaults() {
        // First answer sets joyful, the rest keep their values.
        let mut answers = String::from("5\n");
        answers.push_str(&"\n".repeat(QUESTIONS.len() - 1));
        let mut input = Cursor::new(answers);
        let mut output = Vec::new();

        let builder = MoodDataBuilder::default().rating("anxiety", 2).unwrap();
        let mood = ask_all(builder, &mut input, &mut output).unwrap().build();
        assert_eq!(mood.get("joyful"), Some(5));
        assert_eq!(mood.get("anxiety"), Some(2));
        assert_eq!(mood.get("peace"), Some(DEFAULT_RATING));
    }

    #[test]
    fn out_of_range_answer_is_asked_again() {
        let mut answers = String::from("9\nx\n1\n");
        answers.push_str(&"\n".repeat(QUESTIONS.len() - 1));
        let mut input = Cursor::new(answers);
        let mut output = Vec::new();

        let mood = ask_all(MoodDataBuilder::default(), &mut input, &mut output)
            .unwrap()
            .build();
        assert_eq!(mood.get("joyful"), Some(1));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("enter a number"));
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut input = Cursor::new("4\n");
        let mut output = Vec::new();
        assert!(ask_all(MoodDataBuilder::default(), &mut input, &mut output).is_err());
    }
}
