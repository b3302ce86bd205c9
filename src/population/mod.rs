//! Synthetic population of the Beaches
//!
//! Residents are built once per session from the word banks in
//! [`vocabulary`] and a caller-supplied random source, then only read.
//!
//! # Usage
//!
//! ```ignore
//! use beaches_twin::population::{generate, Vocabulary};
//!
//! let vocab = Vocabulary::default();
//! vocab.validate()?;
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let residents = generate(250, &vocab, &mut rng);
//! ```

pub mod generator;
pub mod vocabulary;

pub use generator::{generate, generate_par, DrawSource};
pub use vocabulary::Vocabulary;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Forward sortation area: the first three characters of a Canadian postal
/// code. The twin covers exactly these two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fsa {
    M4E,
    M4L,
}

impl Fsa {
    pub const ALL: [Fsa; 2] = [Fsa::M4E, Fsa::M4L];

    pub fn code(&self) -> &'static str {
        match self {
            Fsa::M4E => "M4E",
            Fsa::M4L => "M4L",
        }
    }
}

impl fmt::Display for Fsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One synthetic person.
///
/// Field ranges (all closed):
/// - `age`: 25..=84
/// - street number in `address`: 1..=500
/// - `children`: 0..=3
/// - `household_size`: `1 + children` or `2 + children`
/// - `interests`: 2..=4 entries, duplicates allowed
/// - `years_in_neighborhood`: 1..=25
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub address: String,
    pub fsa: Fsa,
    pub occupation: String,
    pub household_size: u32,
    pub children: u32,
    pub interests: Vec<String>,
    pub years_in_neighborhood: u32,
    pub home_owner: bool,
}

impl Resident {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "Homeowner" or "Renter", as shown on resident cards.
    pub fn tenure_label(&self) -> &'static str {
        if self.home_owner {
            "Homeowner"
        } else {
            "Renter"
        }
    }
}
