use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use country_duel_engine::{
    CountryLookup, Dataset, GameSeed, GameService, HighScores, JsonFileCountrySource,
    JsonLinesHighScoreStore, MemorySessionStore,
};
use log::LevelFilter;

use self::{
    check_dataset::CheckDatasetArg, high_score::HighScoreArg, play::PlayArg, stdio::StdioArg,
};
use crate::util;

mod check_dataset;
mod high_score;
mod play;
mod stdio;

pub(crate) const DEFAULT_DATASET_PATH: &str = "data/worldbank.json";
pub(crate) const DEFAULT_HIGH_SCORES_PATH: &str = "data/high_scores.jsonl";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log level; `RUST_LOG` takes precedence
    #[clap(long, global = true, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Serve JSON requests on stdin, one per line
    Stdio(#[clap(flatten)] StdioArg),
    /// Show the best streak of the recent past
    HighScore(#[clap(flatten)] HighScoreArg),
    /// Validate a dataset and summarize its coverage
    CheckDataset(#[clap(flatten)] CheckDatasetArg),
}

/// Options shared by the commands that run a game.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GameArgs {
    /// Dataset JSON file
    #[clap(long, default_value = DEFAULT_DATASET_PATH)]
    dataset: PathBuf,
    /// High score records file (JSON lines)
    #[clap(long, default_value = DEFAULT_HIGH_SCORES_PATH)]
    high_scores: PathBuf,
    /// Country names and flags JSON file
    #[clap(long)]
    countries: Option<PathBuf>,
    /// Round selection seed (32 hex digits); random if omitted
    #[clap(long)]
    seed: Option<GameSeed>,
}

impl Default for GameArgs {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET_PATH),
            high_scores: PathBuf::from(DEFAULT_HIGH_SCORES_PATH),
            countries: None,
            seed: None,
        }
    }
}

impl GameArgs {
    pub(crate) fn build_service(&self) -> anyhow::Result<GameService> {
        let dataset = load_dataset(&self.dataset)?;
        let high_scores = open_high_scores(&self.high_scores)?;
        let seed = self.seed.unwrap_or_else(rand::random);
        log::info!("round selection seed: {seed}");
        Ok(GameService::new(
            Arc::new(dataset),
            MemorySessionStore::default(),
            high_scores,
            seed,
        ))
    }

    pub(crate) fn country_lookup(&self) -> CountryLookup {
        match &self.countries {
            Some(path) => CountryLookup::with_source(Box::new(JsonFileCountrySource::new(path))),
            None => CountryLookup::offline(),
        }
    }
}

pub(crate) fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    Dataset::load(path).with_context(|| format!("Failed to load dataset: {}", path.display()))
}

pub(crate) fn open_high_scores(path: &Path) -> anyhow::Result<HighScores> {
    let store = JsonLinesHighScoreStore::open(path)
        .with_context(|| format!("Failed to open high score file: {}", path.display()))?;
    Ok(HighScores::new(Arc::new(store)))
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let mode = args.mode.unwrap_or(Mode::Play(PlayArg::default()));

    match &mode {
        // The terminal is taken over by the game; logs go to a file or nowhere.
        Mode::Play(arg) => {
            if let Some(path) = arg.log_file() {
                util::init_file_logger(args.log_level, path)?;
            }
        }
        _ => util::init_stderr_logger(args.log_level),
    }

    match mode {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Stdio(arg) => stdio::run(&arg)?,
        Mode::HighScore(arg) => high_score::run(&arg)?,
        Mode::CheckDataset(arg) => check_dataset::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_play() {
        let args = CommandArgs::try_parse_from(["country-duel"]).unwrap();
        assert!(args.mode.is_none());
        assert_eq!(args.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_game_args_defaults_and_seed() {
        let args = CommandArgs::try_parse_from([
            "country-duel",
            "stdio",
            "--seed",
            "0123456789abcdeffedcba9876543210",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.log_level, LevelFilter::Debug);
        let Some(Mode::Stdio(arg)) = args.mode else {
            panic!("expected stdio mode");
        };
        let game = &arg.game;
        assert_eq!(game.dataset, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(game.high_scores, PathBuf::from(DEFAULT_HIGH_SCORES_PATH));
        assert_eq!(
            game.seed.map(|seed| seed.to_string()).as_deref(),
            Some("0123456789abcdeffedcba9876543210")
        );
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        let result = CommandArgs::try_parse_from(["country-duel", "play", "--seed", "xyz"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_dataset_has_context() {
        let err = load_dataset(Path::new("/nonexistent/worldbank.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/worldbank.json"));
    }
}
