//! Interactive session flow: menu prompts, rounds, scoring, and the final
//! report. All I/O goes through `BufRead`/`Write` parameters so the whole
//! session can run against in-memory buffers in tests.
use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::catalog::{Catalog, PlayableRecord};
use crate::questions::{self, Difficulty, GenerateError, Question, OPTION_COUNT};

/// Fewest questions a session may ask for
pub const MIN_ROUNDS: i64 = 1;

/// Most questions a session may ask for
pub const MAX_ROUNDS: i64 = 10;

/// Rejected menu input. The display text is the corrective message shown to
/// the player verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("Please enter a valid number.")]
    NotANumber,
    #[error("Please enter a number between {lo} and {hi}.")]
    OutOfRange { lo: i64, hi: i64 },
}

/// Validates one line of menu input against an inclusive range.
///
/// Anything that does not parse as an integer is `NotANumber`; integers
/// outside `lo..=hi` (including negatives) are `OutOfRange`.
pub fn parse_choice(raw: &str, lo: i64, hi: i64) -> Result<i64, ChoiceError> {
    let value: i64 = raw.trim().parse().map_err(|_| ChoiceError::NotANumber)?;
    if value < lo || value > hi {
        return Err(ChoiceError::OutOfRange { lo, hi });
    }
    Ok(value)
}

fn read_line<I: BufRead>(input: &mut I) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before the session finished",
        ));
    }
    Ok(line)
}

/// Prints `prompt` and re-asks until the player supplies a number in
/// `lo..=hi`. Each rejected line gets its own corrective message.
fn prompt_choice<I: BufRead, O: Write>(
    input: &mut I,
    out: &mut O,
    prompt: &str,
    lo: i64,
    hi: i64,
) -> io::Result<i64> {
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;
        let line = read_line(input)?;
        match parse_choice(&line, lo, hi) {
            Ok(value) => return Ok(value),
            Err(err) => writeln!(out, "{err}")?,
        }
    }
}

/// Session settings collected up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub rounds: u32,
    pub difficulty: Difficulty,
}

/// Asks for the round count and the difficulty, re-prompting until both are
/// valid.
pub fn collect_config<I: BufRead, O: Write>(input: &mut I, out: &mut O) -> io::Result<GameConfig> {
    let rounds = prompt_choice(
        input,
        out,
        "How many questions do you want (1-10)? ",
        MIN_ROUNDS,
        MAX_ROUNDS,
    )? as u32;
    let difficulty = match prompt_choice(input, out, "Choose the difficulty (1-3): ", 1, 3)? {
        1 => Difficulty::LastDecade,
        2 => Difficulty::LastTwoDecades,
        _ => Difficulty::AnyEra,
    };
    Ok(GameConfig { rounds, difficulty })
}

/// Runs one question: shows the prompt and the numbered options, collects an
/// answer, and returns the points earned.
pub fn play_round<I: BufRead, O: Write>(
    question: &Question,
    difficulty: Difficulty,
    input: &mut I,
    out: &mut O,
) -> io::Result<u32> {
    writeln!(out, "{}", question.prompt)?;
    for (index, option) in question.options.iter().enumerate() {
        writeln!(out, "{}. {option}", index + 1)?;
    }
    let choice = prompt_choice(input, out, "Your answer (1-4): ", 1, OPTION_COUNT as i64)?;

    let picked = &question.options[(choice - 1) as usize];
    let correct = *picked == question.answer;
    if correct {
        writeln!(out, "Correct!")?;
    } else {
        writeln!(out, "Wrong. The correct answer was: {}", question.answer)?;
    }
    writeln!(out)?;
    Ok(questions::score(correct, difficulty))
}

/// What a finished (or aborted) session amounted to
#[derive(Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub questions_asked: u32,
}

fn record_key(record: &PlayableRecord) -> (String, String) {
    (
        record.title_id.clone(),
        record.person_id.clone().unwrap_or_default(),
    )
}

/// Plays the configured number of rounds against the catalog.
///
/// Each round samples one not-yet-used record from the difficulty band, and a
/// record is spent once sampled whether or not it yields a question. Running
/// out of records aborts the session. A record that cannot become a question
/// is skipped with a notice, except when the distractor pool itself is too
/// small: that would fail every later round the same way, so the session
/// aborts instead.
pub fn run_session<R, I, O>(
    catalog: &Catalog,
    config: GameConfig,
    current_year: f64,
    rng: &mut R,
    input: &mut I,
    out: &mut O,
) -> io::Result<SessionSummary>
where
    R: Rng + ?Sized,
    I: BufRead,
    O: Write,
{
    let eligible =
        questions::filter_by_recency(catalog.playable(), config.difficulty, current_year);
    let mut used: HashSet<(String, String)> = HashSet::new();
    let mut score = 0u32;
    let mut questions_asked = 0u32;

    for _ in 0..config.rounds {
        let candidates: Vec<&PlayableRecord> = eligible
            .iter()
            .copied()
            .filter(|record| !used.contains(&record_key(record)))
            .collect();
        let Some(&record) = candidates.choose(rng) else {
            writeln!(out, "NO QUESTION CAN BE FORMULATED")?;
            break;
        };
        used.insert(record_key(record));

        match questions::generate(record, catalog, rng) {
            Ok(question) => {
                score += play_round(&question, config.difficulty, input, out)?;
                questions_asked += 1;
            }
            Err(err @ GenerateError::PoolTooSmall { .. }) => {
                warn!("aborting session: {err}");
                writeln!(out, "NO QUESTION CAN BE FORMULATED ({err})")?;
                break;
            }
            Err(err) => {
                debug!("skipping '{}': {err}", record.primary_title);
                writeln!(out, "Cannot generate a question for this film. Moving on.")?;
            }
        }
    }

    if questions_asked > 0 {
        writeln!(out, "Your final score is: {score}. Thanks for playing!")?;
    } else {
        writeln!(out, "No question could be formulated.")?;
    }
    Ok(SessionSummary {
        score,
        questions_asked,
    })
}
