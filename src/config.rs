//! Session configuration
//!
//! Defaults reproduce the reference dashboard: 250 residents, six sample
//! cards, the stock word banks and the hosted question service. A JSON file
//! can override any subset of fields; command-line flags override the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ask::AskConfig;
use crate::error::ConfigError;
use crate::population::Vocabulary;

/// Configuration for one dashboard session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinParams {
    /// Number of residents to synthesize
    pub resident_count: usize,
    /// Residents shown on the sample cards
    pub sample_size: usize,
    /// Build residents on the rayon pool instead of one seeded stream
    pub parallel: bool,
    /// Word banks for names, streets, occupations and interests
    pub vocabulary: Vocabulary,
    /// Question service settings (the API key only ever comes from the environment)
    pub ask: AskConfig,
}

impl Default for TwinParams {
    fn default() -> Self {
        Self {
            resident_count: 250,
            sample_size: 6,
            parallel: false,
            vocabulary: Vocabulary::default(),
            ask: AskConfig::default(),
        }
    }
}

impl TwinParams {
    /// A small population for quick demos and tests
    pub fn small() -> Self {
        Self {
            resident_count: 25,
            sample_size: 3,
            ..Default::default()
        }
    }

    /// Read a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let params: TwinParams =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(params)
    }

    /// Checks that must pass before any resident is generated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resident_count == 0 {
            return Err(ConfigError::NonPositiveCount);
        }
        self.vocabulary.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "beaches_twin_{}_{}.json",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_reference_dashboard() {
        let params = TwinParams::default();
        assert_eq!(params.resident_count, 250);
        assert_eq!(params.sample_size, 6);
        assert!(!params.parallel);
        assert!(params.validate().is_ok());
        assert!(TwinParams::small().validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let path = write_temp("partial", r#"{"resident_count": 40, "ask": {"timeout_secs": 5}}"#);
        let params = TwinParams::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(params.resident_count, 40);
        assert_eq!(params.sample_size, 6);
        assert_eq!(params.ask.timeout_secs, 5);
        assert_eq!(params.ask.max_tokens, 1000);
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let path = write_temp("zero", r#"{"resident_count": 0}"#);
        let params = TwinParams::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(matches!(params.validate(), Err(ConfigError::NonPositiveCount)));
    }

    #[test]
    fn test_empty_vocabulary_is_rejected() {
        let path = write_temp("vocab", r#"{"vocabulary": {"occupations": []}}"#);
        let params = TwinParams::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            params.validate(),
            Err(ConfigError::EmptyVocabulary { table: "occupations" })
        ));
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let missing = std::env::temp_dir().join("beaches_twin_definitely_missing.json");
        assert!(matches!(TwinParams::load(&missing), Err(ConfigError::Read { .. })));

        let path = write_temp("broken", "{ not json");
        let err = TwinParams::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("beaches_twin_broken"));
    }

    #[test]
    fn test_round_trip_defaults() {
        let json = serde_json::to_string(&TwinParams::default()).unwrap();
        let back: TwinParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resident_count, 250);
        assert_eq!(back.vocabulary, Vocabulary::default());
    }
}
