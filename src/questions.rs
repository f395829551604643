//! Question generation: recency bands, distractor sampling, and scoring.
//!
//! This module narrows the playable records to the session's recency band
//! and turns a sampled record into a four-option multiple-choice question.
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::catalog::{Catalog, PlayableRecord};

/// Wrong answers offered alongside the correct one
pub const DISTRACTOR_COUNT: usize = 3;

/// Total answer options shown per question
pub const OPTION_COUNT: usize = DISTRACTOR_COUNT + 1;

/// Recency band picked at the start of a session. Higher tiers admit older
/// films and pay more per correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    LastDecade,
    LastTwoDecades,
    AnyEra,
}

impl Difficulty {
    pub fn tier(self) -> u32 {
        match self {
            Difficulty::LastDecade => 1,
            Difficulty::LastTwoDecades => 2,
            Difficulty::AnyEra => 3,
        }
    }

    /// Points awarded for a correct answer at this band
    pub fn points(self) -> u32 {
        10 * self.tier()
    }

    fn cutoff_year(self, current_year: f64) -> Option<f64> {
        match self {
            Difficulty::LastDecade => Some(current_year - 10.0),
            Difficulty::LastTwoDecades => Some(current_year - 20.0),
            Difficulty::AnyEra => None,
        }
    }
}

/// Points for one answered round. Pure; the session owns the running total.
pub fn score(correct: bool, difficulty: Difficulty) -> u32 {
    if correct {
        difficulty.points()
    } else {
        0
    }
}

/// Keeps the records released on or after the band's cutoff year. Records
/// with an unknown year coerce to year 0 and survive only the unbounded band.
pub fn filter_by_recency<'a>(
    records: &'a [PlayableRecord],
    difficulty: Difficulty,
    current_year: f64,
) -> Vec<&'a PlayableRecord> {
    match difficulty.cutoff_year(current_year) {
        Some(cutoff) => records.iter().filter(|r| r.year() >= cutoff).collect(),
        None => records.iter().collect(),
    }
}

/// A fully formed multiple-choice question. `answer` always appears exactly
/// once in `options`.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// Reasons a sampled record cannot become a question
#[derive(Debug, Error, PartialEq)]
pub enum GenerateError {
    #[error("the sampled record has no cast member id")]
    MissingCastId,
    #[error("no name on file for cast id {0}")]
    UnknownPerson(String),
    #[error("need 3 distractors but the cast pool yielded only {available}")]
    PoolTooSmall { available: usize },
}

/// Builds a question for one playable record.
///
/// Distractors come from the full acting pool minus the correct cast member.
/// The pool is walked in a random order and ids without a display name are
/// passed over, so a question either carries three real names or fails with
/// `PoolTooSmall`.
pub fn generate<R: Rng + ?Sized>(
    record: &PlayableRecord,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Question, GenerateError> {
    let correct_id = record
        .person_id
        .as_deref()
        .ok_or(GenerateError::MissingCastId)?;
    let correct_name = catalog
        .display_name(correct_id)
        .ok_or_else(|| GenerateError::UnknownPerson(correct_id.to_string()))?;

    let alternates: Vec<&str> = catalog
        .cast_pool()
        .iter()
        .map(String::as_str)
        .filter(|id| *id != correct_id)
        .collect();
    let mut options: Vec<String> = alternates
        .choose_multiple(rng, alternates.len())
        .filter_map(|id| catalog.display_name(id))
        .take(DISTRACTOR_COUNT)
        .map(String::from)
        .collect();
    if options.len() < DISTRACTOR_COUNT {
        return Err(GenerateError::PoolTooSmall {
            available: options.len(),
        });
    }

    options.push(correct_name.to_string());
    options.shuffle(rng);

    Ok(Question {
        prompt: format!(
            "Who starred in the film '{}' ({})?",
            record.primary_title, record.start_year
        ),
        options,
        answer: correct_name.to_string(),
    })
}
