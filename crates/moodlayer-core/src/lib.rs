//! Core types for Moodlayer: the mood questionnaire, advice records, and the
//! normalizer that coerces contract return values into advice.

mod error;
pub use error::CoreError;

pub mod advice;
pub mod mood;
pub mod normalize;
pub mod raw;

pub use advice::AdviceResponse;
pub use mood::{MoodData, MoodDataBuilder, QUESTIONS, Question};
pub use normalize::normalize;
pub use raw::RawResult;
