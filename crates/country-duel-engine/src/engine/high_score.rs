use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, BufRead as _, BufReader, Write as _},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Length of the trailing window the leaderboard looks at, in days.
pub const HIGH_SCORE_WINDOW_DAYS: i64 = 7;

/// A finished streak. Records are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub streak: u32,
    pub created_at: DateTime<Utc>,
}

/// Best streak of a window; `streak` is 0 and `set_at` is `None` if the window is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub streak: u32,
    pub set_at: Option<DateTime<Utc>>,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum HighScoreError {
    #[display("high score storage failed: {_0}")]
    Io(io::Error),
    #[display("failed to encode high score record: {_0}")]
    Encode(serde_json::Error),
}

/// Durable, append-only storage of high score records.
///
/// Implementations are shared by every session and must accept concurrent appends.
pub trait HighScoreStore: fmt::Debug + Send + Sync {
    fn append(&self, record: &HighScoreRecord) -> Result<(), HighScoreError>;

    /// Record with the highest streak created at or after `since`.
    fn best_since(&self, since: DateTime<Utc>) -> Result<Option<HighScoreRecord>, HighScoreError>;
}

/// Records completed streaks and answers leaderboard queries.
#[derive(Debug, Clone)]
pub struct HighScores {
    store: Arc<dyn HighScoreStore>,
}

impl HighScores {
    #[must_use]
    pub fn new(store: Arc<dyn HighScoreStore>) -> Self {
        Self { store }
    }

    /// High scores kept in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryHighScoreStore::default()))
    }

    #[must_use]
    pub fn default_window() -> TimeDelta {
        TimeDelta::days(HIGH_SCORE_WINDOW_DAYS)
    }

    /// Records `streak` now. A streak of 0 is not recorded.
    pub fn record(&self, streak: u32) -> Result<Option<HighScoreRecord>, HighScoreError> {
        self.record_at(streak, Utc::now())
    }

    pub fn record_at(
        &self,
        streak: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<HighScoreRecord>, HighScoreError> {
        if streak == 0 {
            return Ok(None);
        }
        let record = HighScoreRecord {
            streak,
            created_at: now,
        };
        self.store.append(&record)?;
        log::info!("recorded high score {streak}");
        Ok(Some(record))
    }

    /// Best streak recorded within `window` before now.
    pub fn best_in_window(&self, window: TimeDelta) -> Result<BestScore, HighScoreError> {
        self.best_in_window_at(Utc::now(), window)
    }

    pub fn best_in_window_at(
        &self,
        now: DateTime<Utc>,
        window: TimeDelta,
    ) -> Result<BestScore, HighScoreError> {
        let best = self.store.best_since(now - window)?;
        Ok(best.map_or_else(BestScore::default, |record| BestScore {
            streak: record.streak,
            set_at: Some(record.created_at),
        }))
    }
}

fn best_of<'a, I>(records: I, since: DateTime<Utc>) -> Option<HighScoreRecord>
where
    I: IntoIterator<Item = &'a HighScoreRecord>,
{
    records
        .into_iter()
        .filter(|record| record.created_at >= since)
        .max_by_key(|record| record.streak)
        .cloned()
}

#[derive(Debug, Default)]
pub struct MemoryHighScoreStore {
    records: Mutex<Vec<HighScoreRecord>>,
}

impl HighScoreStore for MemoryHighScoreStore {
    fn append(&self, record: &HighScoreRecord) -> Result<(), HighScoreError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn best_since(&self, since: DateTime<Utc>) -> Result<Option<HighScoreRecord>, HighScoreError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(best_of(records.iter(), since))
    }
}

/// High scores stored as one JSON record per line.
///
/// Each append writes a whole line in a single call while holding the store's
/// lock, so records from concurrent sessions never interleave. Unreadable lines
/// are skipped with a warning.
#[derive(Debug)]
pub struct JsonLinesHighScoreStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesHighScoreStore {
    /// Opens the store at `path`, creating the file and its directory if needed.
    pub fn open<P>(path: P) -> Result<Self, HighScoreError>
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<HighScoreRecord>, HighScoreError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = vec![];
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("{}:{}: skipping high score: {e}", self.path.display(), i + 1),
            }
        }
        Ok(records)
    }
}

impl HighScoreStore for JsonLinesHighScoreStore {
    fn append(&self, record: &HighScoreRecord) -> Result<(), HighScoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }

    fn best_since(&self, since: DateTime<Utc>) -> Result<Option<HighScoreRecord>, HighScoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let records = self.read_records()?;
        Ok(best_of(&records, since))
    }
}
