//! Word banks for synthetic residents
//!
//! Fixed pools of names, Beaches streets, occupations and pastimes. The
//! defaults are the reference tables; a config file may replace any of them,
//! which is why every table is checked once by [`Vocabulary::validate`]
//! before generation starts.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// NAMES
// ============================================================================

const FIRST_NAMES: &[&str] = &[
    "Emma", "Liam", "Olivia", "Noah", "Ava", "Ethan", "Sophia", "Mason", "Isabella", "James",
    "Charlotte", "Benjamin", "Amelia", "Lucas", "Mia", "Henry", "Harper", "Alexander", "Evelyn",
    "Sebastian", "Priya", "Arjun", "Yuki", "Wei", "Fatima", "Ahmed", "Maria", "Diego", "Ling", "Raj",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Chen", "Patel", "Lee", "Kumar", "Nguyen", "Kim", "Singh", "Ali", "Wang", "Zhang",
];

// ============================================================================
// PLACES AND LIVES
// ============================================================================

const STREETS: &[&str] = &[
    "Queen St E", "Kingston Rd", "Beech Ave", "Lee Ave", "Woodbine Ave", "Glen Manor Dr",
    "Kenilworth Ave", "Waverley Rd", "Maclean Ave", "Leuty Ave", "Kippendavie Ave",
];

const OCCUPATIONS: &[&str] = &[
    "Teacher", "Software Developer", "Nurse", "Artist", "Small Business Owner", "Consultant",
    "Marketing Manager", "Architect", "Writer", "Engineer", "Therapist", "Designer", "Accountant",
    "Chef",
];

const INTERESTS: &[&str] = &[
    "Cycling", "Beach volleyball", "Yoga", "Running", "Gardening", "Photography", "Reading",
    "Cooking", "Swimming", "Hiking", "Music", "Art", "Board games", "Community volunteering",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// The tables every resident field is drawn from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    pub streets: Vec<String>,
    pub occupations: Vec<String>,
    pub interests: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            first_names: owned(FIRST_NAMES),
            last_names: owned(LAST_NAMES),
            streets: owned(STREETS),
            occupations: owned(OCCUPATIONS),
            interests: owned(INTERESTS),
        }
    }
}

impl Vocabulary {
    /// Table names paired with their contents, in declaration order.
    fn tables(&self) -> [(&'static str, &[String]); 5] {
        [
            ("first_names", self.first_names.as_slice()),
            ("last_names", self.last_names.as_slice()),
            ("streets", self.streets.as_slice()),
            ("occupations", self.occupations.as_slice()),
            ("interests", self.interests.as_slice()),
        ]
    }

    /// Fail fast on any empty table so that per-record sampling never has to.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (table, words) in self.tables() {
            if words.is_empty() {
                return Err(ConfigError::EmptyVocabulary { table });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        let vocab = Vocabulary::default();
        assert!(vocab.validate().is_ok());
        assert_eq!(vocab.first_names.len(), 30);
        assert_eq!(vocab.last_names.len(), 20);
        assert_eq!(vocab.streets.len(), 11);
        assert_eq!(vocab.occupations.len(), 14);
        assert_eq!(vocab.interests.len(), 14);
    }

    #[test]
    fn test_each_empty_table_is_named() {
        let cases: [(&str, fn(&mut Vocabulary)); 5] = [
            ("first_names", |v| v.first_names.clear()),
            ("last_names", |v| v.last_names.clear()),
            ("streets", |v| v.streets.clear()),
            ("occupations", |v| v.occupations.clear()),
            ("interests", |v| v.interests.clear()),
        ];

        for (expected, clear) in cases {
            let mut vocab = Vocabulary::default();
            clear(&mut vocab);
            match vocab.validate() {
                Err(ConfigError::EmptyVocabulary { table }) => assert_eq!(table, expected),
                other => panic!("expected empty {} to be rejected, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let vocab: Vocabulary = serde_json::from_str(r#"{"streets": ["Boardwalk"]}"#).unwrap();
        assert_eq!(vocab.streets, vec!["Boardwalk".to_string()]);
        assert_eq!(vocab.first_names.len(), 30);
    }
}
