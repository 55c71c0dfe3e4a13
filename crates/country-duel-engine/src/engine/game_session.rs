use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    DataIntegrityError,
    core::{CountryCode, Dataset, Round},
};

use super::{
    guess::{GuessOutcome, evaluate_guess},
    round_selector::select_round,
};

/// Observable state of a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    /// A round is ready (or will be served on the next read) and no result is pending.
    AwaitingGuess,
    /// A correct guess was made and its result has not been displayed yet.
    ShowingCorrectResult,
    /// The last guess was wrong; only [`GameSession::restart`] leaves this state.
    GameOver,
}

/// Snapshot of an evaluated round, kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: Round,
    pub outcome: GuessOutcome,
    pub indicator_year: Option<i32>,
}

/// What a guess did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessVerdict {
    /// The streak grew and the next round is already stored.
    Correct {
        outcome: GuessOutcome,
        next_round: Round,
    },
    /// The game is over. `final_streak` is the streak the guess ended.
    GameOver {
        outcome: GuessOutcome,
        final_streak: u32,
    },
}

impl GuessVerdict {
    #[must_use]
    pub fn outcome(&self) -> &GuessOutcome {
        match self {
            Self::Correct { outcome, .. } | Self::GameOver { outcome, .. } => outcome,
        }
    }

    /// Streak that has to be recorded as a high score, if any.
    ///
    /// Only a lost game with a positive streak produces one.
    #[must_use]
    pub fn high_score(&self) -> Option<u32> {
        match self {
            Self::GameOver { final_streak, .. } if *final_streak > 0 => Some(*final_streak),
            _ => None,
        }
    }
}

/// What a player sees when they look at their session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Round {
        round: Round,
        indicator_year: Option<i32>,
    },
    CorrectResult {
        result: RoundResult,
    },
    GameOver {
        result: RoundResult,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub streak: u32,
    #[serde(flatten)]
    pub screen: Screen,
}

/// One player's game: win streak, current round and results awaiting display.
///
/// The session holds no dataset or random source; both are passed into each
/// transition so that a session is plain data that can live in any
/// [`SessionStore`](crate::SessionStore).
///
/// # Game Flow
///
/// 1. [`serve_round`](Self::serve_round) stores a round if none is pending
/// 2. [`submit_guess`](Self::submit_guess) evaluates the player's answer
///    - correct: streak +1, the winner stays on the left of the next round
///    - wrong: the game is over and the streak is reported for recording
/// 3. [`take_pending_result`](Self::take_pending_result) hands out a correct result once
/// 4. [`restart`](Self::restart) starts over with streak 0
///
/// # Example
///
/// ```
/// use country_duel_engine::{CountryCode, Dataset, GameSession};
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg32;
///
/// let dataset = Dataset::from_json_str(
///     r#"{"countries": {"A": {"pop": 10}, "B": {"pop": 20}}, "indicators": ["pop"]}"#,
/// )
/// .unwrap();
/// let mut rng = Pcg32::seed_from_u64(0);
///
/// let mut session = GameSession::start(&dataset, &mut rng);
/// let round = session.current_round().unwrap().clone();
///
/// let verdict = session
///     .submit_guess(&dataset, &mut rng, &round, &CountryCode::from("B"))
///     .unwrap();
/// assert!(verdict.outcome().correct);
/// assert_eq!(session.streak(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    streak: u32,
    current_round: Option<Round>,
    previous_winner: Option<CountryCode>,
    game_over: bool,
    last_result: Option<RoundResult>,
    pending_result: Option<RoundResult>,
}

impl GameSession {
    /// Creates an empty session; the first [`serve_round`](Self::serve_round) picks a round.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with its first round already served.
    pub fn start<R>(dataset: &Dataset, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut session = Self::new();
        session.serve_round(dataset, rng);
        session
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.pending_result.is_some() {
            SessionState::ShowingCorrectResult
        } else if self.game_over {
            SessionState::GameOver
        } else {
            SessionState::AwaitingGuess
        }
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        self.current_round.as_ref()
    }

    #[must_use]
    pub fn previous_winner(&self) -> Option<&CountryCode> {
        self.previous_winner.as_ref()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The losing round and its outcome while the game is over.
    #[must_use]
    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    /// Ensures a round is stored when the player is waiting for one.
    ///
    /// Does nothing while a round is already stored, the game is over, or a
    /// result is waiting to be displayed.
    pub fn serve_round<R>(&mut self, dataset: &Dataset, rng: &mut R) -> Option<&Round>
    where
        R: Rng + ?Sized,
    {
        if self.current_round.is_none() && !self.game_over && self.pending_result.is_none() {
            self.current_round = Some(select_round(
                dataset,
                self.previous_winner.as_ref(),
                rng,
            ));
        }
        self.current_round.as_ref()
    }

    /// Evaluates `guess` for `round` and advances the session.
    ///
    /// `round` is the round the player answered, as echoed back by the client.
    /// The session is left untouched if the round does not match the dataset.
    pub fn submit_guess<R>(
        &mut self,
        dataset: &Dataset,
        rng: &mut R,
        round: &Round,
        guess: &CountryCode,
    ) -> Result<GuessVerdict, DataIntegrityError>
    where
        R: Rng + ?Sized,
    {
        let outcome = evaluate_guess(dataset, round, guess)?;
        let result = RoundResult {
            round: round.clone(),
            outcome: outcome.clone(),
            indicator_year: dataset.indicator_year(&round.indicator),
        };

        if outcome.correct
            && let Some(winner) = outcome.winner.clone()
        {
            self.streak += 1;
            let next_round = select_round(dataset, Some(&winner), rng);
            self.previous_winner = Some(winner);
            self.current_round = Some(next_round.clone());
            self.pending_result = Some(result);
            self.game_over = false;
            self.last_result = None;
            return Ok(GuessVerdict::Correct {
                outcome,
                next_round,
            });
        }

        // The streak stays visible on the game over screen until restart.
        self.game_over = true;
        self.last_result = Some(result);
        Ok(GuessVerdict::GameOver {
            outcome,
            final_streak: self.streak,
        })
    }

    /// Hands out the pending correct result; later calls return `None`.
    pub fn take_pending_result(&mut self) -> Option<RoundResult> {
        self.pending_result.take()
    }

    /// Returns what the player should see now.
    ///
    /// A pending correct result is shown first and consumed by this call. Then
    /// the game over screen, if the game is over. Otherwise the current round,
    /// which is served first if missing.
    pub fn view<R>(&mut self, dataset: &Dataset, rng: &mut R) -> SessionView
    where
        R: Rng + ?Sized,
    {
        if let Some(result) = self.take_pending_result() {
            return SessionView {
                streak: self.streak,
                screen: Screen::CorrectResult { result },
            };
        }
        if self.game_over {
            if let Some(result) = &self.last_result {
                return SessionView {
                    streak: self.streak,
                    screen: Screen::GameOver {
                        result: result.clone(),
                    },
                };
            }
            // A game over without a stored result cannot be displayed; start over.
            self.restart();
        }

        let round = self
            .serve_round(dataset, rng)
            .cloned()
            .unwrap_or_else(|| select_round(dataset, None, rng));
        SessionView {
            streak: self.streak,
            screen: Screen::Round {
                indicator_year: dataset.indicator_year(&round.indicator),
                round,
            },
        }
    }

    /// Starts over: streak 0, no round, no winner carried over, no stored results.
    pub fn restart(&mut self) {
        *self = Self::new();
    }
}
