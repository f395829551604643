//! Builds the playable movie-cast catalog out of the loaded tables.
//!
//! A playable record is one movie paired with one credited actor or actress,
//! kept only when the title clears the popularity and rating floors. The
//! catalog also carries the person-name lookup and the distractor pool, and
//! once built it is never mutated.
use std::collections::HashMap;

use log::info;
use rusqlite::Connection;

use crate::dataset::NULL_TOKEN;

/// Titles below this many votes never enter the catalog.
pub const MIN_VOTES: f64 = 1000.0;

/// Floor on the average rating.
pub const MIN_RATING: f64 = 6.0;

/// One movie/cast-member pairing the game can build a question from. A title
/// with several qualifying cast members contributes several records.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayableRecord {
    pub title_id: String,
    pub primary_title: String,
    /// Raw release-year field; stays `\N` when the source marks it unknown.
    pub start_year: String,
    /// Credited person, `None` when the source row carried a null id.
    pub person_id: Option<String>,
    pub average_rating: f64,
    pub num_votes: f64,
}

impl PlayableRecord {
    /// Release year for recency comparisons; unparseable years count as 0 and
    /// therefore never land in a bounded recency band.
    pub fn year(&self) -> f64 {
        coerce_numeric(&self.start_year)
    }
}

/// Parses a numeric table field, treating missing or malformed text as 0.
pub fn coerce_numeric(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

fn null_to_none(raw: String) -> Option<String> {
    if raw.is_empty() || raw == NULL_TOKEN {
        None
    } else {
        Some(raw)
    }
}

/// Immutable game data derived from the four source tables.
#[derive(Debug)]
pub struct Catalog {
    playable: Vec<PlayableRecord>,
    names: HashMap<String, String>,
    cast_pool: Vec<String>,
}

impl Catalog {
    /// Joins titles, credits, and ratings into the playable table and derives
    /// the name lookup and distractor pool.
    ///
    /// An empty playable table is not an error; the session surfaces it as
    /// "no question formulable" once play starts.
    pub fn build(conn: &Connection) -> rusqlite::Result<Catalog> {
        let playable = playable_records(conn)?;
        let names = person_names(conn)?;
        let cast_pool = cast_pool(conn)?;
        info!(
            "catalog ready: {} playable records, {} names, {} cast ids in the pool",
            playable.len(),
            names.len(),
            cast_pool.len()
        );
        Ok(Catalog {
            playable,
            names,
            cast_pool,
        })
    }

    /// Every playable movie/cast-member pairing.
    pub fn playable(&self) -> &[PlayableRecord] {
        &self.playable
    }

    /// Display name for a person id, when the name table has one.
    pub fn display_name(&self, person_id: &str) -> Option<&str> {
        self.names.get(person_id).map(String::as_str)
    }

    /// Distinct non-null person ids credited as actor or actress anywhere in
    /// the dataset, qualifying title or not.
    pub fn cast_pool(&self) -> &[String] {
        &self.cast_pool
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        playable: Vec<PlayableRecord>,
        names: HashMap<String, String>,
        cast_pool: Vec<String>,
    ) -> Catalog {
        Catalog {
            playable,
            names,
            cast_pool,
        }
    }
}

fn playable_records(conn: &Connection) -> rusqlite::Result<Vec<PlayableRecord>> {
    let mut stmt = conn.prepare(
        "SELECT t.tconst, t.primary_title, t.start_year, p.nconst, r.average_rating, r.num_votes
         FROM titles t
         JOIN principals p ON p.tconst = t.tconst
         JOIN ratings r ON r.tconst = t.tconst
         WHERE t.title_type = 'movie'
           AND p.category IN ('actor', 'actress')
         ORDER BY t.tconst, p.nconst",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(PlayableRecord {
            title_id: row.get(0)?,
            primary_title: row.get(1)?,
            start_year: row.get(2)?,
            person_id: null_to_none(row.get(3)?),
            average_rating: coerce_numeric(&row.get::<_, String>(4)?),
            num_votes: coerce_numeric(&row.get::<_, String>(5)?),
        })
    })?;

    let mut playable = Vec::new();
    for record in rows {
        let record = record?;
        if record.num_votes >= MIN_VOTES && record.average_rating >= MIN_RATING {
            playable.push(record);
        }
    }
    Ok(playable)
}

fn person_names(conn: &Connection) -> rusqlite::Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT nconst, primary_name FROM names")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut names = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        if let (Some(id), Some(name)) = (null_to_none(id), null_to_none(name)) {
            names.insert(id, name);
        }
    }
    Ok(names)
}

fn cast_pool(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT nconst
         FROM principals
         WHERE category IN ('actor', 'actress')
           AND nconst != ?1
           AND nconst != ''
         ORDER BY nconst",
    )?;
    let rows = stmt.query_map([NULL_TOKEN], |row| row.get(0))?;
    rows.collect()
}
