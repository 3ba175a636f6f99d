use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// COCO class index of "person"
pub const PERSON_CLASS: i32 = 0;

/// How to treat several observations carrying the same track id within one frame.
///
/// `Sequential` applies every one of them in input order, so a later box is compared
/// against the earlier box of the same frame. The other variants keep a single box.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Sequential,
    LastWins,
    FirstWins,
    HighestConfidence,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(DuplicatePolicy::Sequential),
            "last" | "last_wins" => Ok(DuplicatePolicy::LastWins),
            "first" | "first_wins" => Ok(DuplicatePolicy::FirstWins),
            "confidence" | "highest_confidence" => Ok(DuplicatePolicy::HighestConfidence),
            other => Err(Error::ConfigError(format!(
                "unknown duplicate policy `{}`",
                other
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub person_class: i32,
    pub min_confidence: f32,
    pub duplicate_policy: DuplicatePolicy,

    /// Drop tracks not seen for this many frames; `None` keeps every track for the whole run
    pub evict_after: Option<u64>,
}

impl ClassifierConfig {
    pub fn new(person_class: i32) -> Self {
        Self {
            person_class,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.min_confidence >= 0.0) {
            return Err(Error::ConfigError(format!(
                "min_confidence must be a non-negative number, got {}",
                self.min_confidence
            )));
        }

        if self.evict_after == Some(0) {
            return Err(Error::ConfigError(
                "evict_after must be at least one frame".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            person_class: PERSON_CLASS,
            min_confidence: 0.0,
            duplicate_policy: DuplicatePolicy::Sequential,
            evict_after: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierConfig,

    /// Log progress every N frames, 0 disables it
    pub progress_every: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            progress_every: 500,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), Error> {
        self.classifier.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"classifier": {"duplicate_policy": "highest_confidence"}}"#)
                .unwrap();

        assert_eq!(config.progress_every, 500);
        assert_eq!(config.classifier.person_class, PERSON_CLASS);
        assert_eq!(
            config.classifier.duplicate_policy,
            DuplicatePolicy::HighestConfidence
        );
        assert_eq!(config.classifier.evict_after, None);
        assert_eq!(
            ClassifierConfig::default().duplicate_policy,
            DuplicatePolicy::Sequential
        );
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = ClassifierConfig::default();
        config.min_confidence = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = ClassifierConfig::default();
        config.evict_after = Some(0);
        assert!(config.validate().is_err());

        assert!(ClassifierConfig::default().validate().is_ok());
    }

    #[test]
    fn policy_from_cli_names() {
        assert_eq!("first".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::FirstWins);
        assert_eq!("last_wins".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::LastWins);
        assert_eq!("sequential".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Sequential);
        assert!("newest".parse::<DuplicatePolicy>().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"progress_every": 10, "classifier": {"evict_after": 30}}"#)
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.progress_every, 10);
        assert_eq!(config.classifier.evict_after, Some(30));
    }
}
