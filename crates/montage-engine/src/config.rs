//! Configuration for a montage engine.

use std::path::Path;

use montage_core::TestDifficulty;
use montage_core::record::{DEFAULT_MAX_ROUNDS, MAX_ROUNDS};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Engine settings. Every key is optional in the TOML form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RNG seed for the generic roller; unseeded rolls draw from the OS.
    pub seed: Option<u64>,
    /// Round budget for tests created without one.
    pub default_max_rounds: u32,
    /// Test difficulty used when a roll is approved without one.
    pub default_test_difficulty: TestDifficulty,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            default_max_rounds: DEFAULT_MAX_ROUNDS,
            default_test_difficulty: TestDifficulty::Medium,
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the default round budget, clamped to `1..=MAX_ROUNDS`.
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.default_max_rounds = rounds.clamp(1, MAX_ROUNDS);
        self
    }

    /// Set the fallback test difficulty.
    pub fn with_test_difficulty(mut self, difficulty: TestDifficulty) -> Self {
        self.default_test_difficulty = difficulty;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> EngineResult<Self> {
        let parsed: Self = toml::from_str(raw)?;
        let rounds = parsed.default_max_rounds;
        Ok(parsed.with_max_rounds(rounds))
    }

    /// Load from a TOML file, or defaults if the file does not exist.
    pub fn load(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.default_max_rounds, 2);
        assert_eq!(cfg.default_test_difficulty, TestDifficulty::Medium);
    }

    #[test]
    fn builder_methods() {
        let cfg = EngineConfig::default()
            .with_seed(9)
            .with_max_rounds(0)
            .with_test_difficulty(TestDifficulty::Hard);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.default_max_rounds, 1);
        assert_eq!(cfg.default_test_difficulty, TestDifficulty::Hard);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = EngineConfig::from_toml_str("seed = 42\n").unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.default_max_rounds, 2);
    }

    #[test]
    fn toml_values() {
        let cfg = EngineConfig::from_toml_str(
            "default_max_rounds = 3\ndefault_test_difficulty = \"easy\"\n",
        )
        .unwrap();
        assert_eq!(cfg.default_max_rounds, 3);
        assert_eq!(cfg.default_test_difficulty, TestDifficulty::Easy);
    }

    #[test]
    fn toml_round_budget_is_clamped() {
        let cfg = EngineConfig::from_toml_str("default_max_rounds = 4294967295\n").unwrap();
        assert_eq!(cfg.default_max_rounds, MAX_ROUNDS);
        let cfg = EngineConfig::from_toml_str("default_max_rounds = 0\n").unwrap();
        assert_eq!(cfg.default_max_rounds, 1);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(EngineConfig::from_toml_str("default_max_rounds = \"many\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig::load(&dir.path().join("montage.toml")).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }
}
