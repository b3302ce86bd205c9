//! Beaches digital twin
//!
//! A synthetic population for two Toronto postal areas (M4E and M4L), the
//! statistics derived from it, a terminal dashboard, and a client that asks a
//! hosted language model questions about the data.

pub mod ask;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod logging;
pub mod population;
pub mod stats;

pub use config::TwinParams;
pub use error::{ConfigError, StatsError};
pub use population::{generate, generate_par, DrawSource, Fsa, Resident, Vocabulary};
pub use stats::{aggregate, AgeBucket, AgeHistogram, OneDecimal, PopulationStats};
