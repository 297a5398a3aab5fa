//! The 19-item mood questionnaire and the validated answer record.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::CoreError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
/// Neutral slider position every rating starts at.
pub const DEFAULT_RATING: u8 = 3;

/// A single questionnaire item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Field name sent to the contract.
    pub key: &'static str,
    pub label: &'static str,
    /// Description of the low end of the scale (rating 1).
    pub low_label: &'static str,
    /// Description of the high end of the scale (rating 5).
    pub high_label: &'static str,
}

const fn q(
    key: &'static str,
    label: &'static str,
    low_label: &'static str,
    high_label: &'static str,
) -> Question {
    Question {
        key,
        label,
        low_label,
        high_label,
    }
}

pub const MOOD_FIELDS: usize = 19;

/// Questionnaire items in the order they are asked and serialized.
pub const QUESTIONS: [Question; MOOD_FIELDS] = [
    q("joyful", "Joyful", "Content", "Euphoric"),
    q("melancholy", "Melancholy", "Pensive", "Deeply Sad"),
    q("energy", "Energy", "Exhausted", "Hyperactive"),
    q("bravery", "Bravery", "Paralyzed", "Fearless"),
    q("focus", "Focus", "Distracted", "Flow State"),
    q("irritation", "Irritation", "Calm", "Enraged"),
    q("social", "Social", "Withdrawn", "Outgoing"),
    q("anxiety", "Anxiety", "Uneasy", "Panic"),
    q("anger", "Anger", "Annoyed", "Livid"),
    q("excitement", "Excitement", "Interested", "Thrilled"),
    q("confidence", "Confidence", "Uncertain", "Unstoppable"),
    q("burnout", "Burnout", "Tired", "Physically Drained"),
    q("loneliness", "Loneliness", "Solitary", "Isolated"),
    q("peace", "Peace", "Quiet", "Deep Serenity"),
    q("boredom", "Boredom", "Disengaged", "Apathetic"),
    q("productivity", "Productivity", "Stagnant", "Flow State"),
    q("confusion", "Confusion", "Vague", "Overwhelmed"),
    q("gratitude", "Gratitude", "Aware", "Deeply Thankful"),
    q("insecurity", "Insecurity", "Self-conscious", "Inadequate"),
];

/// Index of a questionnaire key, or `None` if the key is not a mood field.
pub fn field_index(key: &str) -> Option<usize> {
    QUESTIONS.iter().position(|q| q.key == key)
}

/// Glyph shown next to a rating: calm for 1–2, neutral for 3, intense above.
pub fn rating_glyph(rating: u8) -> &'static str {
    match rating {
        0..=2 => "😌",
        3 => "😐",
        _ => "😤",
    }
}

fn check_rating(field: &str, value: i64) -> Result<u8, CoreError> {
    if (MIN_RATING as i64..=MAX_RATING as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(CoreError::RatingOutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

/// Integer value of a JSON number, accepting integral floats like `4.0`.
fn whole_number(value: &serde_json::Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}

/// One completed assessment: a rating in `1..=5` for every questionnaire field.
///
/// Built through [`MoodDataBuilder`], so every instance holds in-range
/// ratings. There are no setters; a new session builds a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodData {
    ratings: [u8; MOOD_FIELDS],
}

impl MoodData {
    pub fn builder() -> MoodDataBuilder {
        MoodDataBuilder::default()
    }

    /// Rating for a questionnaire key.
    pub fn get(&self, key: &str) -> Option<u8> {
        field_index(key).map(|i| self.ratings[i])
    }

    /// `(key, rating)` pairs in questionnaire order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u8)> + '_ {
        QUESTIONS
            .iter()
            .zip(self.ratings.iter())
            .map(|(q, &r)| (q.key, r))
    }

    /// The `n` highest-rated fields, highest first.
    ///
    /// Ties keep questionnaire order.
    pub fn dominant(&self, n: usize) -> Vec<&'static str> {
        let mut entries: Vec<(&'static str, u8)> = self.iter().collect();
        // sort_by is stable, so equal ratings stay in questionnaire order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter().take(n).map(|(key, _)| key).collect()
    }

    /// JSON object string passed as the single `analyze_mood` argument.
    pub fn to_contract_arg(&self) -> String {
        // Serializing a map of &str -> u8 cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for MoodData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MOOD_FIELDS))?;
        for (key, rating) in self.iter() {
            map.serialize_entry(key, &rating)?;
        }
        map.end()
    }
}

/// Collects ratings for a new [`MoodData`]; unset fields stay at
/// [`DEFAULT_RATING`].
#[derive(Debug, Clone)]
pub struct MoodDataBuilder {
    ratings: [u8; MOOD_FIELDS],
}

impl Default for MoodDataBuilder {
    fn default() -> Self {
        Self {
            ratings: [DEFAULT_RATING; MOOD_FIELDS],
        }
    }
}

impl MoodDataBuilder {
    /// Set one rating, validating the key and the range.
    pub fn rating(mut self, key: &str, value: i64) -> Result<Self, CoreError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// In-place variant of [`rating`](Self::rating) for loops.
    pub fn set(&mut self, key: &str, value: i64) -> Result<(), CoreError> {
        let idx = field_index(key).ok_or_else(|| CoreError::UnknownField(key.to_string()))?;
        self.ratings[idx] = check_rating(key, value)?;
        Ok(())
    }

    /// Rating currently held for a key.
    pub fn get(&self, key: &str) -> Option<u8> {
        field_index(key).map(|i| self.ratings[i])
    }

    /// Apply every entry of a JSON object (`{"joyful": 4, ...}`).
    pub fn merge_json(
        mut self,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, CoreError> {
        for (key, value) in object {
            let n = whole_number(value).ok_or_else(|| CoreError::NotAWholeNumber {
                field: key.clone(),
                value: value.to_string(),
            })?;
            self.set(key, n)?;
        }
        Ok(self)
    }

    pub fn build(self) -> MoodData {
        MoodData {
            ratings: self.ratings,
        }
    }
}
