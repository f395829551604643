//! Command-line movie-cast trivia quiz over IMDb-style tab-separated data.
mod catalog;
mod dataset;
mod game;
mod questions;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Local};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;

use crate::catalog::Catalog;

/// Movie-cast trivia: guess who starred in films drawn from the datasets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding name.basics.tsv, title.basics.tsv,
    /// title.principals.tsv, and title.ratings.tsv
    #[arg(long, default_value = "datasets/imdb")]
    data_dir: PathBuf,

    /// Seed for reproducible sampling; drawn from the OS when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut conn = Connection::open_in_memory().context("cannot open the in-memory database")?;
    let stats = dataset::load_dir(&mut conn, &args.data_dir)
        .with_context(|| format!("cannot load datasets from {}", args.data_dir.display()))?;
    info!(
        "loaded {} names, {} titles, {} principals, {} ratings",
        stats.names, stats.titles, stats.principals, stats.ratings
    );
    let catalog = Catalog::build(&conn).context("cannot build the quiz catalog")?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let current_year = f64::from(Local::now().year());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();

    writeln!(out, "Welcome to Cast Quiz (IMDb edition)")?;
    writeln!(out)?;

    let config = game::collect_config(&mut input, &mut out)?;
    let summary = game::run_session(
        &catalog,
        config,
        current_year,
        &mut rng,
        &mut input,
        &mut out,
    )?;
    info!(
        "session over: {} questions asked, {} points",
        summary.questions_asked, summary.score
    );
    Ok(())
}
