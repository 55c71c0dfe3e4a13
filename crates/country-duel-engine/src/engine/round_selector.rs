use rand::{
    Rng,
    seq::{IndexedRandom as _, index},
};

use crate::core::{Country, CountryCode, Dataset, Round};

/// Maximum number of random pairs tried before falling back to a scan.
pub const MAX_SELECTION_ATTEMPTS: usize = 500;

/// Picks a comparable pair of countries and an indicator both of them define.
///
/// If `previous_winner` is in the dataset it is kept on the left and only the
/// right side is drawn; otherwise both sides are drawn as an unordered pair of
/// distinct countries. The indicator is drawn uniformly from the indicators the
/// two countries share.
///
/// Pairs without a shared indicator are redrawn up to [`MAX_SELECTION_ATTEMPTS`]
/// times. After that the dataset is scanned in order for the first comparable
/// pair (keeping `previous_winner` on the left when possible). A dataset without
/// any comparable pair yields its first two countries and first indicator,
/// unverified; evaluating such a round fails with
/// [`DataIntegrityError`](crate::DataIntegrityError).
///
/// # Example
///
/// ```
/// use country_duel_engine::{Dataset, select_round};
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg32;
///
/// let dataset = Dataset::from_json_str(
///     r#"{"countries": {"A": {"pop": 10}, "B": {"pop": 20}}, "indicators": ["pop"]}"#,
/// )
/// .unwrap();
/// let mut rng = Pcg32::seed_from_u64(7);
///
/// let round = select_round(&dataset, None, &mut rng);
/// assert_ne!(round.left, round.right);
/// assert_eq!(round.indicator.as_str(), "pop");
/// ```
pub fn select_round<R>(dataset: &Dataset, previous_winner: Option<&CountryCode>, rng: &mut R) -> Round
where
    R: Rng + ?Sized,
{
    let countries = dataset.countries();
    let anchor = previous_winner.and_then(|code| countries.iter().position(|c| c.code() == code));

    for attempt in 1..=MAX_SELECTION_ATTEMPTS {
        let (left, right) = match anchor {
            Some(left) => (left, pick_other(countries.len(), left, rng)),
            None => pick_pair(countries.len(), rng),
        };
        let (left, right) = (&countries[left], &countries[right]);
        if let Some(indicator) = dataset.shared_indicators(left, right).choose(rng) {
            if attempt > 1 {
                log::debug!("selected comparable pair after {attempt} attempts");
            }
            return Round {
                left: left.code().clone(),
                right: right.code().clone(),
                indicator: (*indicator).clone(),
            };
        }
    }

    log::warn!("no comparable pair after {MAX_SELECTION_ATTEMPTS} attempts, scanning dataset");
    scan_round(dataset, anchor)
}

/// Draws an index in `0..len` other than `excluded`.
fn pick_other<R>(len: usize, excluded: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let i = rng.random_range(0..len - 1);
    if i >= excluded { i + 1 } else { i }
}

/// Draws two distinct indices in `0..len`.
fn pick_pair<R>(len: usize, rng: &mut R) -> (usize, usize)
where
    R: Rng + ?Sized,
{
    let pair = index::sample(rng, len, 2);
    (pair.index(0), pair.index(1))
}

fn scan_round(dataset: &Dataset, anchor: Option<usize>) -> Round {
    let countries = dataset.countries();
    let first_shared = |left: &Country, right: &Country| {
        dataset
            .shared_indicators(left, right)
            .first()
            .map(|indicator| Round {
                left: left.code().clone(),
                right: right.code().clone(),
                indicator: (*indicator).clone(),
            })
    };

    let anchored = anchor.and_then(|a| {
        countries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != a)
            .find_map(|(_, right)| first_shared(&countries[a], right))
    });
    if let Some(round) = anchored {
        return round;
    }

    let scanned = countries.iter().enumerate().find_map(|(i, left)| {
        countries[i + 1..]
            .iter()
            .find_map(|right| first_shared(left, right))
    });
    if let Some(round) = scanned {
        return round;
    }

    log::warn!("dataset has no comparable pair, serving an unverified round");
    Round {
        left: countries[0].code().clone(),
        right: countries[1].code().clone(),
        indicator: dataset.indicators()[0].clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::core::IndicatorKey;

    const WORLD: &str = r#"{
        "countries": {
            "AAA": {"pop": 1, "gdp": 5},
            "BBB": {"pop": 2},
            "CCC": {"gdp": 7, "life": 70},
            "DDD": {"pop": 4, "life": 80},
            "EEE": {"pop": 5, "gdp": 3, "life": 60}
        },
        "indicators": ["pop", "gdp", "life"]
    }"#;

    fn world() -> Dataset {
        Dataset::from_json_str(WORLD).unwrap()
    }

    fn assert_valid(dataset: &Dataset, round: &Round) {
        assert_ne!(round.left, round.right);
        assert!(dataset.value(&round.left, &round.indicator).is_some());
        assert!(dataset.value(&round.right, &round.indicator).is_some());
    }

    #[test]
    fn test_rounds_are_always_valid() {
        let dataset = world();
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let round = select_round(&dataset, None, &mut rng);
            assert_valid(&dataset, &round);
        }
    }

    #[test]
    fn test_previous_winner_stays_on_left() {
        let dataset = world();
        let winner = CountryCode::from("CCC");
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let round = select_round(&dataset, Some(&winner), &mut rng);
            assert_eq!(round.left, winner);
            assert_valid(&dataset, &round);
        }
    }

    #[test]
    fn test_unknown_previous_winner_is_ignored() {
        let dataset = world();
        let unknown = CountryCode::from("ZZZ");
        let mut rng = Pcg32::seed_from_u64(3);
        let round = select_round(&dataset, Some(&unknown), &mut rng);
        assert!(!round.involves(&unknown));
        assert_valid(&dataset, &round);
    }

    #[test]
    fn test_same_seed_same_rounds() {
        let dataset = world();
        let mut rng1 = Pcg32::seed_from_u64(42);
        let mut rng2 = Pcg32::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(
                select_round(&dataset, None, &mut rng1),
                select_round(&dataset, None, &mut rng2)
            );
        }
    }

    #[test]
    fn test_every_country_and_indicator_gets_drawn() {
        let dataset = world();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut countries = HashSet::new();
        let mut indicators = HashSet::new();
        for _ in 0..500 {
            let round = select_round(&dataset, None, &mut rng);
            countries.insert(round.left);
            countries.insert(round.right);
            indicators.insert(round.indicator);
        }
        assert_eq!(countries.len(), 5);
        assert_eq!(indicators.len(), 3);
    }

    #[test]
    fn test_sparse_dataset_finds_only_comparable_pair() {
        let dataset = Dataset::from_json_str(
            r#"{
                "countries": {"A": {"x": 1}, "B": {"y": 2}, "C": {"z": 3}, "D": {"y": 4}},
                "indicators": ["x", "y", "z"]
            }"#,
        )
        .unwrap();
        for seed in 0..50 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let round = select_round(&dataset, None, &mut rng);
            assert_eq!(round.indicator, IndicatorKey::from("y"));
            assert!(round.involves(&CountryCode::from("B")));
            assert!(round.involves(&CountryCode::from("D")));
        }
    }

    #[test]
    fn test_previous_winner_without_partner_falls_back_to_any_pair() {
        let dataset = Dataset::from_json_str(
            r#"{
                "countries": {"A": {"x": 1}, "B": {"y": 2}, "C": {"y": 3}},
                "indicators": ["x", "y"]
            }"#,
        )
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(9);
        let round = select_round(&dataset, Some(&CountryCode::from("A")), &mut rng);
        assert_eq!(round, Round::new("B", "C", "y"));
    }

    #[test]
    fn test_no_comparable_pair_yields_first_two_countries() {
        let dataset = Dataset::from_json_str(
            r#"{
                "countries": {"A": {"x": 1}, "B": {"y": 2}, "C": {}},
                "indicators": ["y", "x"]
            }"#,
        )
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        let round = select_round(&dataset, None, &mut rng);
        assert_eq!(round, Round::new("A", "B", "y"));
    }

    #[test]
    fn test_pick_other_never_returns_excluded() {
        let mut rng = Pcg32::seed_from_u64(5);
        for excluded in 0..4 {
            for _ in 0..100 {
                let i = pick_other(4, excluded, &mut rng);
                assert_ne!(i, excluded);
                assert!(i < 4);
            }
        }
    }
}
