//! Session configuration.

use crate::persist::SAVE_FILE;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Configuration for a game session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Player character name used by New Game.
    pub player_name: String,

    /// Chance of an encounter when entering a location with enemies.
    pub encounter_chance: f64,

    /// Chance that fleeing succeeds.
    pub flee_chance: f64,

    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Path of the save slot file.
    pub save_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: "Hero".to_string(),
            encounter_chance: 0.6,
            flee_chance: 0.5,
            seed: None,
            save_path: PathBuf::from(SAVE_FILE),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from `ELDORIA_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seed) = env_parse::<u64>("ELDORIA_SEED") {
            config = config.with_seed(seed);
        }
        if let Ok(path) = std::env::var("ELDORIA_SAVE_PATH") {
            config = config.with_save_path(path);
        }
        if let Some(chance) = env_parse::<f64>("ELDORIA_ENCOUNTER_CHANCE") {
            config = config.with_encounter_chance(chance);
        }
        if let Some(chance) = env_parse::<f64>("ELDORIA_FLEE_CHANCE") {
            config = config.with_flee_chance(chance);
        }

        config
    }

    /// Set the player character name.
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Set the encounter chance, clamped to `[0, 1]`.
    pub fn with_encounter_chance(mut self, chance: f64) -> Self {
        self.encounter_chance = clamp_chance(chance);
        self
    }

    /// Set the flee chance, clamped to `[0, 1]`.
    pub fn with_flee_chance(mut self, chance: f64) -> Self {
        self.flee_chance = clamp_chance(chance);
        self
    }

    /// Use a fixed RNG seed for reproducible sessions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn clamp_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.player_name, "Hero");
        assert_eq!(config.encounter_chance, 0.6);
        assert_eq!(config.flee_chance, 0.5);
        assert_eq!(config.seed, None);
        assert_eq!(config.save_path, PathBuf::from("rpg_save.json"));
    }

    #[test]
    fn test_chances_are_clamped() {
        let config = GameConfig::new()
            .with_encounter_chance(1.7)
            .with_flee_chance(-0.2);
        assert_eq!(config.encounter_chance, 1.0);
        assert_eq!(config.flee_chance, 0.0);
        assert_eq!(GameConfig::new().with_flee_chance(f64::NAN).flee_chance, 0.0);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;

        let config = GameConfig::new().with_seed(42);
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
