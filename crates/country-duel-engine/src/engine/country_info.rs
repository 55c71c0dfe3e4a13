use std::{
    collections::HashMap,
    fmt,
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::core::CountryCode;

/// How long a looked-up country stays cached.
pub const COUNTRY_INFO_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Countries the usual metadata sources do not know about.
const FALLBACK_COUNTRIES: &[(&str, &str, &str)] = &[("XKX", "Kosovo", "https://flagcdn.com/xk.svg")];

/// Display name and flag image of a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfo {
    pub name: String,
    #[serde(default)]
    pub flag_url: String,
}

impl CountryInfo {
    /// Info showing only the code, used when nothing better is known.
    #[must_use]
    pub fn placeholder(code: &CountryCode) -> Self {
        Self {
            name: code.to_string(),
            flag_url: String::new(),
        }
    }

    fn fallback(code: &CountryCode) -> Option<Self> {
        let code = code.as_str().to_ascii_uppercase();
        FALLBACK_COUNTRIES
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, name, flag_url)| Self {
                name: (*name).to_owned(),
                flag_url: (*flag_url).to_owned(),
            })
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CountrySourceError {
    #[display("country {_0} not found")]
    #[from(ignore)]
    NotFound(#[error(not(source))] CountryCode),
    #[display("country source unavailable: {_0}")]
    Io(io::Error),
    #[display("malformed country data: {_0}")]
    Parse(serde_json::Error),
}

/// Where country metadata comes from. May be slow or unavailable.
pub trait CountrySource: fmt::Debug + Send + Sync {
    fn fetch(&self, code: &CountryCode) -> Result<CountryInfo, CountrySourceError>;
}

/// Country metadata read from a JSON file mapping codes to `{name, flagUrl}`.
///
/// The file is read on every fetch, so it can be replaced while the game runs.
#[derive(Debug)]
pub struct JsonFileCountrySource {
    path: PathBuf,
}

impl JsonFileCountrySource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CountrySource for JsonFileCountrySource {
    fn fetch(&self, code: &CountryCode) -> Result<CountryInfo, CountrySourceError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut countries: HashMap<CountryCode, CountryInfo> = serde_json::from_reader(reader)?;
        countries
            .remove(code)
            .ok_or_else(|| CountrySourceError::NotFound(code.clone()))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    info: CountryInfo,
    fetched_at: Instant,
}

/// Cached country metadata lookup that never fails.
///
/// Lookups go to the built-in fallback table first, then the cache, then the
/// source. Failed fetches are not cached and degrade to
/// [`CountryInfo::placeholder`].
///
/// ```
/// use country_duel_engine::{CountryCode, CountryLookup};
///
/// let lookup = CountryLookup::offline();
/// assert_eq!(lookup.info(&CountryCode::from("XKX")).name, "Kosovo");
/// assert_eq!(lookup.info(&CountryCode::from("FRA")).name, "FRA");
/// ```
#[derive(Debug)]
pub struct CountryLookup {
    source: Option<Box<dyn CountrySource>>,
    ttl: Duration,
    cache: Mutex<HashMap<CountryCode, CacheEntry>>,
}

impl CountryLookup {
    /// Lookup using only the built-in fallback table.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            source: None,
            ttl: COUNTRY_INFO_TTL,
            cache: Mutex::default(),
        }
    }

    #[must_use]
    pub fn with_source(source: Box<dyn CountrySource>) -> Self {
        Self {
            source: Some(source),
            ..Self::offline()
        }
    }

    #[must_use]
    pub fn ttl(self, ttl: Duration) -> Self {
        Self { ttl, ..self }
    }

    #[must_use]
    pub fn info(&self, code: &CountryCode) -> CountryInfo {
        self.info_at(code, Instant::now())
    }

    #[must_use]
    pub fn info_at(&self, code: &CountryCode, now: Instant) -> CountryInfo {
        if let Some(info) = CountryInfo::fallback(code) {
            return info;
        }
        let Some(source) = &self.source else {
            return CountryInfo::placeholder(code);
        };

        if let Some(info) = self.cached(code, now) {
            return info;
        }

        // The cache is not locked while fetching; concurrent misses may fetch twice.
        log::debug!("fetching country info for {code}");
        match source.fetch(code) {
            Ok(info) => {
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(
                        code.clone(),
                        CacheEntry {
                            info: info.clone(),
                            fetched_at: now,
                        },
                    );
                info
            }
            Err(e) => {
                log::warn!("country info for {code} unavailable: {e}");
                CountryInfo::placeholder(code)
            }
        }
    }

    fn cached(&self, code: &CountryCode, now: Instant) -> Option<CountryInfo> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(code)
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| entry.info.clone())
    }
}
