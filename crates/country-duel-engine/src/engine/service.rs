use std::{
    collections::HashMap,
    convert::Infallible,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    DataIntegrityError,
    core::{CountryCode, Dataset, IndicatorKey, Round},
};

use super::{
    game_session::{GameSession, GuessVerdict, SessionView},
    guess::GuessOutcome,
    hex_id::{GameSeed, SessionToken},
    high_score::{BestScore, HighScores},
};

/// Storage of game sessions keyed by session token.
pub trait SessionStore: fmt::Debug + Send + Sync {
    fn load(&self, token: &SessionToken) -> Option<GameSession>;
    fn save(&self, token: SessionToken, session: GameSession);
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionToken, GameSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, token: &SessionToken) -> Option<GameSession> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    fn save(&self, token: SessionToken, session: GameSession) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, session);
    }
}

/// A guess as submitted by a client: the round it answers and the chosen country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRequest {
    pub left: CountryCode,
    pub right: CountryCode,
    pub indicator: IndicatorKey,
    pub guess: CountryCode,
}

impl GuessRequest {
    #[must_use]
    pub fn new(round: &Round, guess: &CountryCode) -> Self {
        Self {
            left: round.left.clone(),
            right: round.right.clone(),
            indicator: round.indicator.clone(),
            guess: guess.clone(),
        }
    }

    #[must_use]
    pub fn round(&self) -> Round {
        Round {
            left: self.left.clone(),
            right: self.right.clone(),
            indicator: self.indicator.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessResponse {
    #[serde(flatten)]
    pub outcome: GuessOutcome,
    pub streak: u32,
    pub game_over: bool,
    /// Round to play next; absent once the game is over.
    pub next_round: Option<Round>,
}

/// Request-level entry point to the game.
///
/// Every call loads the session for a token, applies one transition and saves
/// the session back. A call that fails saves nothing, so a rejected request
/// never leaves a session half-updated. Calls for the same token are expected
/// to arrive one at a time.
#[derive(Debug)]
pub struct GameService<S = MemorySessionStore> {
    dataset: Arc<Dataset>,
    sessions: S,
    high_scores: HighScores,
    rng: Mutex<Pcg32>,
}

impl<S> GameService<S>
where
    S: SessionStore,
{
    #[must_use]
    pub fn new(dataset: Arc<Dataset>, sessions: S, high_scores: HighScores, seed: GameSeed) -> Self {
        Self {
            dataset,
            sessions,
            high_scores,
            rng: Mutex::new(Pcg32::from_seed(seed.to_bytes())),
        }
    }

    #[must_use]
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    #[must_use]
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    #[must_use]
    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Starts a new session with its first round served.
    pub fn open_session(&self) -> SessionToken {
        let token = rand::rng().random();
        let Ok(()) = self.transact(&token, |session, dataset, rng| {
            session.serve_round(dataset, rng);
            Ok::<_, Infallible>(())
        });
        log::debug!("opened session {token}");
        token
    }

    /// Returns the current screen of a session, consuming a pending correct result.
    ///
    /// Unknown tokens see the first round of a fresh session, which is not
    /// stored until a guess is made on it.
    pub fn view(&self, token: &SessionToken) -> SessionView {
        self.update_existing(token, |session, dataset, rng| session.view(dataset, rng))
            .unwrap_or_else(|| {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                GameSession::new().view(&self.dataset, &mut *rng)
            })
    }

    /// Evaluates a guess and advances the session.
    ///
    /// A lost streak is recorded as a high score. Failing to record it is
    /// logged and does not stop the game from ending.
    pub fn submit_guess(
        &self,
        token: &SessionToken,
        request: &GuessRequest,
    ) -> Result<GuessResponse, DataIntegrityError> {
        let round = request.round();
        let (verdict, streak) = self
            .transact(token, |session, dataset, rng| {
                let verdict = session.submit_guess(dataset, rng, &round, &request.guess)?;
                Ok((verdict, session.streak()))
            })
            .inspect_err(|e| log::info!("rejected guess for session {token}: {e}"))?;

        if let Some(final_streak) = verdict.high_score()
            && let Err(e) = self.high_scores.record(final_streak)
        {
            log::error!("failed to record high score {final_streak}: {e}");
        }

        Ok(match verdict {
            GuessVerdict::Correct {
                outcome,
                next_round,
            } => GuessResponse {
                outcome,
                streak,
                game_over: false,
                next_round: Some(next_round),
            },
            GuessVerdict::GameOver { outcome, .. } => GuessResponse {
                outcome,
                streak,
                game_over: true,
                next_round: None,
            },
        })
    }

    /// Resets the session: streak 0 and a fresh round on the next view.
    ///
    /// Unknown tokens already read as a fresh session and are left unstored.
    pub fn restart(&self, token: &SessionToken) {
        if self
            .update_existing(token, |session, _, _| session.restart())
            .is_none()
        {
            log::debug!("restart of unknown session {token} ignored");
        }
    }

    /// Best streak of the trailing week; storage failures read as no score.
    pub fn best_score(&self) -> BestScore {
        self.high_scores
            .best_in_window(HighScores::default_window())
            .unwrap_or_else(|e| {
                log::error!("failed to read high scores: {e}");
                BestScore::default()
            })
    }

    fn transact<T, E, F>(&self, token: &SessionToken, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut GameSession, &Dataset, &mut Pcg32) -> Result<T, E>,
    {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut session = self.sessions.load(token).unwrap_or_default();
        let value = f(&mut session, &self.dataset, &mut rng)?;
        self.sessions.save(*token, session);
        Ok(value)
    }

    fn update_existing<T, F>(&self, token: &SessionToken, f: F) -> Option<T>
    where
        F: FnOnce(&mut GameSession, &Dataset, &mut Pcg32) -> T,
    {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut session = self.sessions.load(token)?;
        let value = f(&mut session, &self.dataset, &mut rng);
        self.sessions.save(*token, session);
        Some(value)
    }
}
