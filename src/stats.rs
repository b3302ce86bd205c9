//! Derived statistics over a resident collection
//!
//! Everything here is a pure function of `&[Resident]`: nothing is cached and
//! the collection is never touched, so the dashboard simply recomputes on
//! every draw.
//!
//! Rounding is half-up and done in integer arithmetic, so no NaN or float
//! noise can reach the display. An empty collection has no averages and
//! reports [`StatsError::EmptyDataset`] instead.

use std::fmt;

use serde::Serialize;

use crate::error::StatsError;
use crate::population::{Fsa, Resident};

/// Fixed age ranges for the demographics chart, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBucket {
    Age25To34,
    Age35To44,
    Age45To54,
    Age55To64,
    Age65Plus,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::Age25To34,
        AgeBucket::Age35To44,
        AgeBucket::Age45To54,
        AgeBucket::Age55To64,
        AgeBucket::Age65Plus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Age25To34 => "25-34",
            AgeBucket::Age35To44 => "35-44",
            AgeBucket::Age45To54 => "45-54",
            AgeBucket::Age55To64 => "55-64",
            AgeBucket::Age65Plus => "65+",
        }
    }

    /// The bucket an age falls in. Generated ages start at 25; anything
    /// younger is counted with the first bucket so the histogram always sums
    /// to the population.
    pub fn for_age(age: u32) -> AgeBucket {
        match age {
            0..=34 => AgeBucket::Age25To34,
            35..=44 => AgeBucket::Age35To44,
            45..=54 => AgeBucket::Age45To54,
            55..=64 => AgeBucket::Age55To64,
            _ => AgeBucket::Age65Plus,
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket counts in [`AgeBucket::ALL`] order.
pub type AgeHistogram = Vec<(AgeBucket, usize)>;

/// A non-negative value with exactly one fractional digit, stored in tenths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct OneDecimal(pub u32);

impl fmt::Display for OneDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// `numerator / denominator` rounded half up. `denominator` must be non-zero.
fn round_half_up(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

fn non_empty(residents: &[Resident]) -> Result<u64, StatsError> {
    match residents.len() {
        0 => Err(StatsError::EmptyDataset),
        n => Ok(n as u64),
    }
}

pub fn total_count(residents: &[Resident]) -> usize {
    residents.len()
}

/// Mean age, rounded half up (51.25 -> 51, 51.5 -> 52).
pub fn average_age(residents: &[Resident]) -> Result<u32, StatsError> {
    let n = non_empty(residents)?;
    let sum: u64 = residents.iter().map(|r| r.age as u64).sum();
    Ok(round_half_up(sum, n) as u32)
}

/// Percentage of home owners, rounded half up.
pub fn home_ownership_rate(residents: &[Resident]) -> Result<u32, StatsError> {
    let n = non_empty(residents)?;
    let owners = residents.iter().filter(|r| r.home_owner).count() as u64;
    Ok(round_half_up(100 * owners, n) as u32)
}

/// Mean household size to one decimal place, rounded half up.
pub fn average_household_size(residents: &[Resident]) -> Result<OneDecimal, StatsError> {
    let n = non_empty(residents)?;
    let sum: u64 = residents.iter().map(|r| r.household_size as u64).sum();
    Ok(OneDecimal(round_half_up(10 * sum, n) as u32))
}

/// Counts per age bucket. Empty input gives five zero buckets.
pub fn age_histogram(residents: &[Resident]) -> AgeHistogram {
    let mut counts = [0usize; AgeBucket::ALL.len()];
    for resident in residents {
        counts[AgeBucket::for_age(resident.age) as usize] += 1;
    }
    AgeBucket::ALL.iter().copied().zip(counts).collect()
}

/// The four headline numbers on the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PopulationStats {
    pub total_residents: usize,
    pub average_age: u32,
    pub home_ownership_rate: u32,
    pub average_household_size: OneDecimal,
}

impl PopulationStats {
    pub fn compute(residents: &[Resident]) -> Result<Self, StatsError> {
        Ok(Self {
            total_residents: total_count(residents),
            average_age: average_age(residents)?,
            home_ownership_rate: home_ownership_rate(residents)?,
            average_household_size: average_household_size(residents)?,
        })
    }
}

/// Headline stats and the age histogram in one pass over the API.
pub fn aggregate(residents: &[Resident]) -> Result<(PopulationStats, AgeHistogram), StatsError> {
    let stats = PopulationStats::compute(residents)?;
    Ok((stats, age_histogram(residents)))
}

/// Headline stats for each FSA on its own, in [`Fsa::ALL`] order.
pub fn area_breakdown(residents: &[Resident]) -> Vec<(Fsa, Result<PopulationStats, StatsError>)> {
    Fsa::ALL
        .iter()
        .map(|&fsa| {
            let in_area: Vec<Resident> = residents
                .iter()
                .filter(|r| r.fsa == fsa)
                .cloned()
                .collect();
            (fsa, PopulationStats::compute(&in_area))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{generate, Vocabulary};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample(id: u32, age: u32, home_owner: bool, household_size: u32) -> Resident {
        Resident {
            id,
            first_name: "Mia".to_string(),
            last_name: "Kim".to_string(),
            age,
            address: "10 Beech Ave".to_string(),
            fsa: if id % 2 == 0 { Fsa::M4L } else { Fsa::M4E },
            occupation: "Nurse".to_string(),
            household_size,
            children: household_size - 1,
            interests: vec!["Running".to_string(), "Art".to_string()],
            years_in_neighborhood: 3,
            home_owner,
        }
    }

    #[test]
    fn test_four_resident_scenario() {
        let residents: Vec<Resident> = [25, 40, 70, 70]
            .iter()
            .enumerate()
            .map(|(i, &age)| sample(i as u32 + 1, age, false, 1))
            .collect();

        assert_eq!(average_age(&residents), Ok(51));
        let histogram: Vec<(&str, usize)> = age_histogram(&residents)
            .iter()
            .map(|(bucket, count)| (bucket.label(), *count))
            .collect();
        assert_eq!(
            histogram,
            vec![("25-34", 1), ("35-44", 1), ("45-54", 0), ("55-64", 0), ("65+", 2)]
        );
    }

    #[test]
    fn test_all_owners_is_one_hundred_percent() {
        let residents = vec![sample(1, 30, true, 2), sample(2, 50, true, 3)];
        assert_eq!(home_ownership_rate(&residents), Ok(100));
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(total_count(&[]), 0);
        assert_eq!(average_age(&[]), Err(StatsError::EmptyDataset));
        assert_eq!(home_ownership_rate(&[]), Err(StatsError::EmptyDataset));
        assert_eq!(average_household_size(&[]), Err(StatsError::EmptyDataset));
        assert_eq!(aggregate(&[]), Err(StatsError::EmptyDataset));

        let histogram = age_histogram(&[]);
        assert_eq!(histogram.len(), 5);
        assert!(histogram.iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 25.5 -> 26
        let residents = vec![sample(1, 25, true, 1), sample(2, 26, false, 1)];
        assert_eq!(average_age(&residents), Ok(26));

        // 1 owner of 8 = 12.5% -> 13
        let mut residents: Vec<Resident> = (1..=8).map(|id| sample(id, 40, false, 1)).collect();
        residents[0].home_owner = true;
        assert_eq!(home_ownership_rate(&residents), Ok(13));

        // 49 people over 20 households = 2.45 -> 2.5
        let mut residents: Vec<Resident> = (1..=20).map(|id| sample(id, 40, false, 2)).collect();
        for resident in residents.iter_mut().take(9) {
            resident.household_size = 3;
            resident.children = 2;
        }
        let size = average_household_size(&residents).unwrap();
        assert_eq!(size, OneDecimal(25));
        assert_eq!(size.to_string(), "2.5");
    }

    #[test]
    fn test_one_decimal_display() {
        assert_eq!(OneDecimal(0).to_string(), "0.0");
        assert_eq!(OneDecimal(23).to_string(), "2.3");
        assert_eq!(OneDecimal(40).to_string(), "4.0");
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(AgeBucket::for_age(25), AgeBucket::Age25To34);
        assert_eq!(AgeBucket::for_age(34), AgeBucket::Age25To34);
        assert_eq!(AgeBucket::for_age(35), AgeBucket::Age35To44);
        assert_eq!(AgeBucket::for_age(54), AgeBucket::Age45To54);
        assert_eq!(AgeBucket::for_age(55), AgeBucket::Age55To64);
        assert_eq!(AgeBucket::for_age(64), AgeBucket::Age55To64);
        assert_eq!(AgeBucket::for_age(65), AgeBucket::Age65Plus);
        assert_eq!(AgeBucket::for_age(84), AgeBucket::Age65Plus);
    }

    #[test]
    fn test_area_breakdown_splits_by_fsa() {
        let residents = vec![
            sample(1, 30, true, 1),
            sample(2, 60, false, 2),
            sample(3, 40, true, 3),
        ];
        let breakdown = area_breakdown(&residents);

        assert_eq!(breakdown[0].0, Fsa::M4E);
        let m4e = breakdown[0].1.unwrap();
        assert_eq!(m4e.total_residents, 2);
        assert_eq!(m4e.average_age, 35);
        assert_eq!(m4e.home_ownership_rate, 100);

        assert_eq!(breakdown[1].0, Fsa::M4L);
        let m4l = breakdown[1].1.unwrap();
        assert_eq!(m4l.total_residents, 1);
        assert_eq!(m4l.home_ownership_rate, 0);

        let only_m4e = vec![sample(1, 30, true, 1)];
        assert_eq!(area_breakdown(&only_m4e)[1].1, Err(StatsError::EmptyDataset));
    }

    #[test]
    fn test_aggregate_reference_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let residents = generate(250, &Vocabulary::default(), &mut rng);
        let (stats, histogram) = aggregate(&residents).unwrap();

        assert_eq!(stats.total_residents, 250);
        assert!((25..=84).contains(&stats.average_age));
        assert!(stats.home_ownership_rate <= 100);
        assert!((10..=60).contains(&stats.average_household_size.0));
        assert_eq!(histogram.iter().map(|(_, c)| c).sum::<usize>(), 250);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn histogram_sums_to_total(count in 1usize..300, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let residents = generate(count, &Vocabulary::default(), &mut rng);
            let sum: usize = age_histogram(&residents).iter().map(|(_, c)| c).sum();
            prop_assert_eq!(sum, total_count(&residents));
        }

        #[test]
        fn aggregation_ignores_order(count in 1usize..200, seed in any::<u64>(), rotate in 0usize..200) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let residents = generate(count, &Vocabulary::default(), &mut rng);

            let mut shuffled = residents.clone();
            shuffled.reverse();
            shuffled.rotate_left(rotate % count);

            prop_assert_eq!(average_age(&residents), average_age(&shuffled));
            prop_assert_eq!(home_ownership_rate(&residents), home_ownership_rate(&shuffled));
            prop_assert_eq!(
                average_household_size(&residents),
                average_household_size(&shuffled)
            );
            prop_assert_eq!(age_histogram(&residents), age_histogram(&shuffled));
        }
    }
}
