use std::{fmt, str::FromStr};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 128 random bits written as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Hex128([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex: {_0}")]
pub struct ParseHexIdError(#[error(not(source))] String);

impl fmt::Display for Hex128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for Hex128 {
    type Err = ParseHexIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseHexIdError(format!(
                "expected 32 characters, got {}",
                s.len()
            )));
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| ParseHexIdError(format!("{s} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for Hex128 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hex128 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<Hex128> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Hex128 {
        let mut bytes = [0; 16];
        rng.fill(&mut bytes);
        Hex128(bytes)
    }
}

/// Seed for the round selection random number generator.
///
/// Two services started with the same seed serve the same sequence of rounds
/// for the same sequence of requests.
///
/// ```
/// use country_duel_engine::GameSeed;
///
/// let seed: GameSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct GameSeed(Hex128);

impl FromStr for GameSeed {
    type Err = ParseHexIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl GameSeed {
    #[must_use]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0.0
    }
}

impl Distribution<GameSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GameSeed {
        GameSeed(rng.random())
    }
}

/// Opaque key of a player's session in a [`SessionStore`](crate::SessionStore).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct SessionToken(Hex128);

impl FromStr for SessionToken {
    type Err = ParseHexIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Distribution<SessionToken> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionToken {
        SessionToken(rng.random())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> GameSeed {
        GameSeed(Hex128(bytes))
    }

    #[test]
    fn test_format_is_32_char_hex_string() {
        let seed: GameSeed = rand::rng().random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let hex_str = serialized.trim_matches('"');
        assert_eq!(hex_str.len(), 32);
        assert!(hex_str.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_value_sequential_bytes() {
        let seed = seed_from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

        let deserialized: GameSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_known_value_all_zeros() {
        let seed = seed_from_bytes([0; 16]);
        assert_eq!(seed.to_string(), "00000000000000000000000000000000");
    }

    #[test]
    fn test_parse_uppercase_hex() {
        let token: SessionToken = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(token.to_string(), "0123456789abcdeffedcba9876543210");
    }

    #[test]
    fn test_error_invalid_hex_characters() {
        let result: Result<GameSeed, _> = serde_json::from_str("\"ghijklmnopqrstuvwxyzghijklmnopqr\"");
        assert!(result.unwrap_err().to_string().contains("invalid hex"));
    }

    #[test]
    fn test_error_wrong_length() {
        assert!("0123456789abcdef".parse::<SessionToken>().is_err());
        assert!("".parse::<GameSeed>().is_err());
        assert!(
            "0123456789abcdef0123456789abcdef0"
                .parse::<GameSeed>()
                .is_err()
        );
    }

    #[test]
    fn test_tokens_from_seeded_rng_are_reproducible() {
        let mut rng1 = Pcg32::seed_from_u64(11);
        let mut rng2 = Pcg32::seed_from_u64(11);
        let a: SessionToken = rng1.random();
        let b: SessionToken = rng2.random();
        assert_eq!(a, b);
        let c: SessionToken = rng1.random();
        assert_ne!(a, c);
    }
}
