//! Game logic and state management.
//!
//! This module builds the game on top of the [`core`](crate::core) data:
//!
//! - [`select_round`] - Random comparable round, keeping the previous winner on the left
//! - [`evaluate_guess`] - Decides whether a guess picked the higher value
//! - [`GameSession`] - One player's streak and current round
//! - [`HighScores`] - Append-only streak records and the weekly leaderboard
//! - [`CountryLookup`] - Cached display names and flags
//! - [`GameService`] - Sessions keyed by [`SessionToken`], one transition per request
//!
//! # Game Flow
//!
//! 1. [`GameService::open_session`] hands out a token with a round already served
//! 2. The client shows the round from [`GameService::view`]
//! 3. [`GameService::submit_guess`] evaluates the answer
//!    - correct: the streak grows and the winner stays for the next round
//!    - wrong: the game is over and the streak is recorded as a high score
//! 4. [`GameService::restart`] starts a new game in the same session
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use country_duel_engine::{
//!     Dataset, GameService, GameSeed, GuessRequest, HighScores, MemorySessionStore, Screen,
//! };
//!
//! let dataset = Dataset::from_json_str(
//!     r#"{"countries": {"A": {"pop": 10}, "B": {"pop": 20}}, "indicators": ["pop"]}"#,
//! )
//! .unwrap();
//! let seed: GameSeed = rand::random();
//! let service = GameService::new(
//!     Arc::new(dataset),
//!     MemorySessionStore::default(),
//!     HighScores::in_memory(),
//!     seed,
//! );
//!
//! let token = service.open_session();
//! let Screen::Round { round, .. } = service.view(&token).screen else {
//!     unreachable!();
//! };
//! let response = service
//!     .submit_guess(&token, &GuessRequest::new(&round, &round.left))
//!     .unwrap();
//! assert_eq!(response.streak, u32::from(response.outcome.correct));
//! ```

pub use self::{
    country_info::*, game_session::*, guess::*, hex_id::*, high_score::*, round_selector::*,
    service::*,
};

mod country_info;
mod game_session;
mod guess;
mod hex_id;
mod high_score;
mod round_selector;
mod service;
