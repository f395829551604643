//! IMDb TSV ingestion into an in-memory SQLite database.
//!
//! The four source files are tab-separated with a header row, no quoting, and
//! the literal token `\N` for missing values. Every field is stored as TEXT;
//! numeric coercion happens later, when the catalog is built. Acquiring the
//! files is out of scope; this module only reads a directory that already
//! contains them.
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Missing-value marker used throughout the IMDb dump files.
pub const NULL_TOKEN: &str = "\\N";

/// People (`nconst`, `primaryName`).
pub const NAMES_FILE: &str = "name.basics.tsv";
/// Titles (`tconst`, `titleType`, `primaryTitle`, `startYear`).
pub const TITLES_FILE: &str = "title.basics.tsv";
/// Cast and crew credits (`tconst`, `nconst`, `category`).
pub const PRINCIPALS_FILE: &str = "title.principals.tsv";
/// Ratings (`tconst`, `averageRating`, `numVotes`).
pub const RATINGS_FILE: &str = "title.ratings.tsv";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read {}: {source}", .file.display())]
    Read {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

/// Row counts observed while loading, reported for logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadStats {
    pub names: usize,
    pub titles: usize,
    pub principals: usize,
    pub ratings: usize,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    nconst: String,
    #[serde(rename = "primaryName")]
    primary_name: String,
}

#[derive(Debug, Deserialize)]
struct TitleRow {
    tconst: String,
    #[serde(rename = "titleType")]
    title_type: String,
    #[serde(rename = "primaryTitle")]
    primary_title: String,
    #[serde(rename = "startYear")]
    start_year: String,
}

#[derive(Debug, Deserialize)]
struct PrincipalRow {
    tconst: String,
    nconst: String,
    category: String,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    tconst: String,
    #[serde(rename = "averageRating")]
    average_rating: String,
    #[serde(rename = "numVotes")]
    num_votes: String,
}

/// Creates the four string-typed tables the loader fills.
pub(crate) fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE names (nconst TEXT, primary_name TEXT);
         CREATE TABLE titles (tconst TEXT, title_type TEXT, primary_title TEXT, start_year TEXT);
         CREATE TABLE principals (tconst TEXT, nconst TEXT, category TEXT);
         CREATE TABLE ratings (tconst TEXT, average_rating TEXT, num_votes TEXT);",
    )
}

/// Loads all four tables from `dir` into `conn`.
///
/// Fails on the first file that is missing, unreadable, or lacks an expected
/// column, naming the offending file. On success the connection holds every
/// row of every table, verbatim.
pub fn load_dir(conn: &mut Connection, dir: &Path) -> Result<LoadStats, DatasetError> {
    create_schema(conn)?;

    let stats = LoadStats {
        names: copy_rows(conn, &dir.join(NAMES_FILE), INSERT_NAME, |row: NameRow| {
            [row.nconst, row.primary_name]
        })?,
        titles: copy_rows(conn, &dir.join(TITLES_FILE), INSERT_TITLE, |row: TitleRow| {
            [row.tconst, row.title_type, row.primary_title, row.start_year]
        })?,
        principals: copy_rows(
            conn,
            &dir.join(PRINCIPALS_FILE),
            INSERT_PRINCIPAL,
            |row: PrincipalRow| [row.tconst, row.nconst, row.category],
        )?,
        ratings: copy_rows(
            conn,
            &dir.join(RATINGS_FILE),
            INSERT_RATING,
            |row: RatingRow| [row.tconst, row.average_rating, row.num_votes],
        )?,
    };

    // The catalog join probes these two tables by title id.
    conn.execute_batch(
        "CREATE INDEX principals_by_title ON principals (tconst);
         CREATE INDEX ratings_by_title ON ratings (tconst);",
    )?;

    Ok(stats)
}

const INSERT_NAME: &str = "INSERT INTO names (nconst, primary_name) VALUES (?1, ?2)";
const INSERT_TITLE: &str =
    "INSERT INTO titles (tconst, title_type, primary_title, start_year) VALUES (?1, ?2, ?3, ?4)";
const INSERT_PRINCIPAL: &str =
    "INSERT INTO principals (tconst, nconst, category) VALUES (?1, ?2, ?3)";
const INSERT_RATING: &str =
    "INSERT INTO ratings (tconst, average_rating, num_votes) VALUES (?1, ?2, ?3)";

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, csv::Error> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .from_path(path)
}

/// Streams one TSV file into one table inside a single transaction.
///
/// Columns are matched by header name, so extra columns in the source file
/// are ignored and reordered columns still land in the right place.
fn copy_rows<T, const N: usize>(
    conn: &mut Connection,
    path: &Path,
    insert_sql: &str,
    fields: fn(T) -> [String; N],
) -> Result<usize, DatasetError>
where
    T: DeserializeOwned,
{
    let read_err = |source| DatasetError::Read {
        file: path.to_path_buf(),
        source,
    };

    let mut reader = open_reader(path).map_err(read_err)?;
    let tx = conn.transaction()?;
    let mut count = 0usize;
    {
        let mut insert = tx.prepare(insert_sql)?;
        for row in reader.deserialize() {
            let row: T = row.map_err(read_err)?;
            insert.execute(rusqlite::params_from_iter(fields(row)))?;
            count += 1;
        }
    }
    tx.commit()?;

    Ok(count)
}
