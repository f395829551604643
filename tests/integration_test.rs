#![allow(deprecated)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::{Datelike, Local};
use predicates::prelude::*;
use tempfile::TempDir;

const NAMES_HEADER: &str = "nconst\tprimaryName\tbirthYear\n";
const TITLES_HEADER: &str = "tconst\ttitleType\tprimaryTitle\tstartYear\tgenres\n";
const PRINCIPALS_HEADER: &str = "tconst\tordering\tnconst\tcategory\n";
const RATINGS_HEADER: &str = "tconst\taverageRating\tnumVotes\n";

fn write_dataset(dir: &Path, names: &str, titles: &str, principals: &str, ratings: &str) {
    fs::write(dir.join("name.basics.tsv"), names).unwrap();
    fs::write(dir.join("title.basics.tsv"), titles).unwrap();
    fs::write(dir.join("title.principals.tsv"), principals).unwrap();
    fs::write(dir.join("title.ratings.tsv"), ratings).unwrap();
}

fn quiz_command(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cast_quiz").unwrap();
    cmd.arg("--data-dir").arg(dir.path());
    cmd
}

// Everyone shares one name, so whichever option the player picks is the
// correct one and transcripts stay deterministic.
fn same_name_rows() -> String {
    format!(
        "{NAMES_HEADER}\
         nm1\tAlba Rey\t1970\n\
         nm2\tAlba Rey\t1980\n\
         nm3\tAlba Rey\t1985\n\
         nm4\tAlba Rey\t1990\n"
    )
}

/// Two recent qualifying films with two acting credits each.
fn recent_films_dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    let recent = Local::now().year() - 1;
    write_dataset(
        dir.path(),
        &same_name_rows(),
        &format!(
            "{TITLES_HEADER}\
             tt1\tmovie\tThe Long Night\t{recent}\tDrama\n\
             tt2\tmovie\tSecond Wind\t{recent}\tDrama\n"
        ),
        &format!(
            "{PRINCIPALS_HEADER}\
             tt1\t1\tnm1\tactor\n\
             tt1\t2\tnm2\tactress\n\
             tt2\t1\tnm3\tactor\n\
             tt2\t2\tnm4\tactor\n"
        ),
        &format!(
            "{RATINGS_HEADER}\
             tt1\t7.5\t150000\n\
             tt2\t8.1\t90000\n"
        ),
    );
    dir
}

/// One film inside the ten-year band and one far outside it.
fn one_recent_film_dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    let recent = Local::now().year() - 1;
    write_dataset(
        dir.path(),
        &same_name_rows(),
        &format!(
            "{TITLES_HEADER}\
             tt1\tmovie\tThe Long Night\t{recent}\tDrama\n\
             tt2\tmovie\tForgotten Reel\t1950\tDrama\n"
        ),
        &format!(
            "{PRINCIPALS_HEADER}\
             tt1\t1\tnm1\tactor\n\
             tt2\t1\tnm2\tactor\n\
             tt2\t2\tnm3\tactor\n\
             tt2\t3\tnm4\tactress\n"
        ),
        &format!(
            "{RATINGS_HEADER}\
             tt1\t7.5\t150000\n\
             tt2\t7.0\t80000\n"
        ),
    );
    dir
}

// Test that a full two-round session greets, asks, and totals the score
#[test]
fn test_two_round_session_scores_twenty_at_the_easiest_tier() {
    let dir = recent_films_dataset();

    quiz_command(&dir)
        .write_stdin("2\n1\n1\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome to Cast Quiz"))
        .stdout(predicate::str::contains("How many questions do you want (1-10)? "))
        .stdout(predicate::str::contains("Choose the difficulty (1-3): "))
        .stdout(predicate::str::contains("Who starred in the film"))
        .stdout(predicate::str::contains("Correct!"))
        .stdout(predicate::str::contains(
            "Your final score is: 20. Thanks for playing!",
        ));
}

// Test that rejected input at every prompt gets its own message and the
// session still finishes
#[test]
fn test_invalid_entries_are_reprompted_with_distinct_messages() {
    let dir = recent_films_dataset();

    quiz_command(&dir)
        .write_stdin("abc\n0\n1\nxyz\n9\n1\n5\nfoo\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter a valid number."))
        .stdout(predicate::str::contains(
            "Please enter a number between 1 and 10.",
        ))
        .stdout(predicate::str::contains(
            "Please enter a number between 1 and 3.",
        ))
        .stdout(predicate::str::contains(
            "Please enter a number between 1 and 4.",
        ))
        .stdout(predicate::str::contains(
            "Your final score is: 10. Thanks for playing!",
        ));
}

// Test that a spent difficulty band ends the session early but keeps the
// points already earned
#[test]
fn test_band_with_one_film_aborts_after_the_first_round() {
    let dir = one_recent_film_dataset();

    quiz_command(&dir)
        .write_stdin("3\n1\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct!"))
        .stdout(predicate::str::contains("NO QUESTION CAN BE FORMULATED"))
        .stdout(predicate::str::contains(
            "Your final score is: 10. Thanks for playing!",
        ));
}

// Test that a catalog with no qualifying movies never asks anything
#[test]
fn test_dataset_without_movies_formulates_no_question() {
    let dir = TempDir::new().unwrap();
    write_dataset(
        dir.path(),
        &same_name_rows(),
        &format!("{TITLES_HEADER}tt1\ttvSeries\tCliffhangers\t2019\tDrama\n"),
        &format!(
            "{PRINCIPALS_HEADER}\
             tt1\t1\tnm1\tactor\n\
             tt1\t2\tnm2\tactor\n\
             tt1\t3\tnm3\tactor\n\
             tt1\t4\tnm4\tactor\n"
        ),
        &format!("{RATINGS_HEADER}tt1\t8.9\t99999\n"),
    );

    quiz_command(&dir)
        .write_stdin("3\n3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("NO QUESTION CAN BE FORMULATED"))
        .stdout(predicate::str::contains("No question could be formulated."))
        .stdout(predicate::str::contains("Your answer").not());
}

// Test that too few distinct cast members aborts with the reason
#[test]
fn test_tiny_cast_pool_cannot_fill_four_options() {
    let dir = TempDir::new().unwrap();
    write_dataset(
        dir.path(),
        &same_name_rows(),
        &format!("{TITLES_HEADER}tt1\tmovie\tThe Long Night\t2015\tDrama\n"),
        &format!(
            "{PRINCIPALS_HEADER}\
             tt1\t1\tnm1\tactor\n\
             tt1\t2\tnm2\tactor\n\
             tt1\t3\tnm3\tactress\n"
        ),
        &format!("{RATINGS_HEADER}tt1\t7.5\t150000\n"),
    );

    quiz_command(&dir)
        .write_stdin("1\n3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "NO QUESTION CAN BE FORMULATED (need 3 distractors",
        ))
        .stdout(predicate::str::contains("No question could be formulated."));
}

// Test that a missing data file fails fast and names the file
#[test]
fn test_missing_data_file_is_a_startup_error() {
    let dir = TempDir::new().unwrap();

    quiz_command(&dir)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("name.basics.tsv"));
}

// Test that the same seed replays the same session byte for byte
#[test]
fn test_seeded_runs_are_reproducible() {
    let dir = TempDir::new().unwrap();
    write_dataset(
        dir.path(),
        &format!(
            "{NAMES_HEADER}\
             nm1\tAlba Rey\t1970\n\
             nm2\tJon Price\t1980\n\
             nm3\tMia Flynn\t1985\n\
             nm4\tSam Ode\t1990\n\
             nm5\tIra Lake\t1991\n"
        ),
        &format!(
            "{TITLES_HEADER}\
             tt1\tmovie\tThe Long Night\t2015\tDrama\n\
             tt2\tmovie\tSecond Wind\t2018\tDrama\n"
        ),
        &format!(
            "{PRINCIPALS_HEADER}\
             tt1\t1\tnm1\tactor\n\
             tt1\t2\tnm2\tactress\n\
             tt2\t1\tnm3\tactor\n\
             tt2\t2\tnm4\tactor\n\
             tt2\t3\tnm5\tactress\n"
        ),
        &format!(
            "{RATINGS_HEADER}\
             tt1\t7.5\t150000\n\
             tt2\t8.1\t90000\n"
        ),
    );

    let run = || {
        quiz_command(&dir)
            .arg("--seed")
            .arg("7")
            .write_stdin("2\n3\n1\n1\n")
            .output()
            .unwrap()
    };

    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}
