//! Resident generation
//!
//! Every field is drawn independently from a [`DrawSource`], except that the
//! child count is gated by a has-children coin and the household size is
//! derived from the child count plus an extra-adult coin.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::vocabulary::Vocabulary;
use super::{Fsa, Resident};

pub const AGE_MIN: u32 = 25;
pub const AGE_MAX: u32 = 84;
pub const STREET_NUMBER_MAX: u32 = 500;
pub const MAX_CHILDREN: u32 = 3;
pub const INTERESTS_MIN: u32 = 2;
pub const INTERESTS_MAX: u32 = 4;
pub const TENURE_MAX: u32 = 25;

/// Probability that a resident has any children (0.6 have none).
const CHILDREN_CHANCE: f64 = 0.4;
/// Probability of a second adult in the household.
const EXTRA_ADULT_CHANCE: f64 = 0.5;
const HOME_OWNER_CHANCE: f64 = 0.65;

/// Source of the uniform draws behind every resident field.
///
/// Any [`rand::Rng`] is a source, so a seeded `ChaCha8Rng` gives repeatable
/// sessions. Tests can script the exact draws instead.
pub trait DrawSource {
    /// Uniform index in `0..len`. Callers never pass zero.
    fn pick(&mut self, len: usize) -> usize;

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

impl<R: Rng + ?Sized> DrawSource for R {
    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.gen_bool(p)
    }
}

/// Uniform integer in `lo..=hi`.
fn draw_in<S: DrawSource + ?Sized>(source: &mut S, lo: u32, hi: u32) -> u32 {
    lo + source.pick((hi - lo + 1) as usize) as u32
}

fn draw_word<S: DrawSource + ?Sized>(source: &mut S, words: &[String]) -> String {
    words[source.pick(words.len())].clone()
}

/// Build the resident at `index` (id `index + 1`).
///
/// Draw order: age, has-children coin, child count (only when the coin
/// fired), first name, last name, street number, street, FSA, occupation,
/// extra-adult coin, interest count, each interest, tenure, home-owner coin.
fn build_resident<S: DrawSource + ?Sized>(
    index: usize,
    vocab: &Vocabulary,
    source: &mut S,
) -> Resident {
    let age = draw_in(source, AGE_MIN, AGE_MAX);
    let children = if source.chance(CHILDREN_CHANCE) {
        draw_in(source, 1, MAX_CHILDREN)
    } else {
        0
    };

    let first_name = draw_word(source, &vocab.first_names);
    let last_name = draw_word(source, &vocab.last_names);

    let street_number = draw_in(source, 1, STREET_NUMBER_MAX);
    let street = draw_word(source, &vocab.streets);
    let address = format!("{} {}", street_number, street);
    let fsa = Fsa::ALL[source.pick(Fsa::ALL.len())];

    let occupation = draw_word(source, &vocab.occupations);

    let extra_adult = u32::from(source.chance(EXTRA_ADULT_CHANCE));
    let household_size = 1 + children + extra_adult;

    let interest_count = draw_in(source, INTERESTS_MIN, INTERESTS_MAX);
    let interests = (0..interest_count)
        .map(|_| draw_word(source, &vocab.interests))
        .collect();

    let years_in_neighborhood = draw_in(source, 1, TENURE_MAX);
    let home_owner = source.chance(HOME_OWNER_CHANCE);

    Resident {
        id: index as u32 + 1,
        first_name,
        last_name,
        age,
        address,
        fsa,
        occupation,
        household_size,
        children,
        interests,
        years_in_neighborhood,
        home_owner,
    }
}

/// Generate `count` residents with ids `1..=count`.
///
/// `vocab` must already have passed [`Vocabulary::validate`]; generation
/// itself has no failure mode. `count == 0` gives an empty collection.
pub fn generate<S: DrawSource + ?Sized>(
    count: usize,
    vocab: &Vocabulary,
    source: &mut S,
) -> Vec<Resident> {
    let residents: Vec<Resident> = (0..count)
        .map(|index| build_resident(index, vocab, source))
        .collect();

    tracing::debug!(count = residents.len(), "generated residents");
    residents
}

/// Per-record generator: the session seed picks the key, the record index
/// picks the ChaCha stream.
fn record_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

/// Parallel variant of [`generate`].
///
/// Each record owns its random stream, so both its id and its content are a
/// function of `(seed, index)` alone and the output does not depend on how
/// rayon splits the work. The result differs from `generate` with the same
/// seed.
pub fn generate_par(count: usize, vocab: &Vocabulary, seed: u64) -> Vec<Resident> {
    let residents: Vec<Resident> = (0..count)
        .into_par_iter()
        .map(|index| build_resident(index, vocab, &mut record_rng(seed, index)))
        .collect();

    tracing::debug!(count = residents.len(), seed, "generated residents in parallel");
    residents
}
