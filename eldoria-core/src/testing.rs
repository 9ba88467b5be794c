//! Testing utilities for the RPG engine.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripted, deterministic game scenarios
//! - Assertion helpers for verifying game state

use crate::combat::{CombatAction, SubAction};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{Arrival, CombatReport, Game};
use crate::items::{create_item, ItemId};
use crate::player::Player;
use crate::world::{world, Direction};

/// Seed used by every harness unless overridden.
pub const TEST_SEED: u64 = 0xE1D0;

/// A game wrapped for scripted tests.
///
/// By default nothing is left to chance: encounters never roll and fleeing
/// never succeeds. Use the `with_*` constructors to force either.
pub struct TestHarness {
    game: Game,
    /// Log of the most recent call.
    last_log: Vec<String>,
}

impl TestHarness {
    /// A fresh New Game with encounters disabled.
    pub fn new() -> Self {
        Self::with_config(Self::quiet_config())
    }

    /// A fresh New Game where every enemy location spawns a fight.
    pub fn with_encounters() -> Self {
        Self::with_config(Self::quiet_config().with_encounter_chance(1.0))
    }

    /// A fresh New Game where fleeing always works.
    pub fn with_sure_flee() -> Self {
        Self::with_config(Self::quiet_config().with_flee_chance(1.0))
    }

    pub fn with_config(config: GameConfig) -> Self {
        match Game::new_game(config) {
            Ok((game, arrival)) => Self {
                game,
                last_log: arrival.log,
            },
            Err(e) => panic!("new game failed: {e}"),
        }
    }

    /// Wrap an existing game, e.g. one rebuilt from a save.
    pub fn from_game(game: Game) -> Self {
        Self {
            game,
            last_log: Vec::new(),
        }
    }

    /// The deterministic config harnesses start from.
    pub fn quiet_config() -> GameConfig {
        GameConfig::new()
            .with_seed(TEST_SEED)
            .with_encounter_chance(0.0)
            .with_flee_chance(0.0)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn player(&self) -> &Player {
        self.game.player()
    }

    /// Move in a direction, panicking on an invalid exit.
    pub fn go(&mut self, direction: Direction) -> Arrival {
        match self.game.move_player(direction) {
            Ok(arrival) => {
                self.last_log = arrival.log.clone();
                arrival
            }
            Err(e) => panic!("move {direction} failed: {e}"),
        }
    }

    /// Walk a route of directions.
    pub fn walk(&mut self, route: &[Direction]) -> &mut Self {
        for direction in route {
            self.go(*direction);
        }
        self
    }

    /// Start a fight with the named enemy.
    pub fn fight(&mut self, enemy: &str) -> &mut Self {
        match self.game.start_combat(enemy) {
            Ok(log) => self.last_log = log,
            Err(e) => panic!("could not start combat with {enemy}: {e}"),
        }
        self
    }

    pub fn act(&mut self, action: CombatAction) -> Result<CombatReport, GameError> {
        let result = self.game.perform_combat_action(action, None);
        self.record(result)
    }

    pub fn act_with(
        &mut self,
        action: CombatAction,
        choice: SubAction,
    ) -> Result<CombatReport, GameError> {
        let result = self.game.perform_combat_action(action, Some(choice));
        self.record(result)
    }

    /// Attack until the fight ends or `max_rounds` pass.
    pub fn attack_until_over(&mut self, max_rounds: usize) -> Option<CombatReport> {
        for _ in 0..max_rounds {
            match self.act(CombatAction::Attack) {
                Ok(report) if report.combat_over => return Some(report),
                Ok(_) => {}
                Err(_) => return None,
            }
        }
        None
    }

    /// Give the player a fresh catalog item and return its id.
    pub fn give(&mut self, name: &str) -> ItemId {
        let item = match create_item(name) {
            Some(item) => item,
            None => panic!("no catalog item named {name}"),
        };
        let id = item.id;
        self.game.player_mut().add_item(item);
        id
    }

    /// The id of the first inventory item with this name.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.player()
            .inventory
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.id)
    }

    /// Place the player somewhere without walking or rolling encounters.
    pub fn teleport(&mut self, location: &str) -> &mut Self {
        assert!(
            world().location(location).is_some(),
            "no location with key {location}"
        );
        self.game.player_mut().location = location.to_string();
        self
    }

    pub fn set_hp(&mut self, hp: i32) -> &mut Self {
        self.game.player_mut().entity.hp = hp;
        self
    }

    pub fn set_mana(&mut self, mana: i32) -> &mut Self {
        self.game.player_mut().mana = mana;
        self
    }

    pub fn player_hp(&self) -> (i32, i32) {
        let entity = &self.player().entity;
        (entity.hp, entity.max_hp)
    }

    pub fn enemy_hp(&self) -> Option<i32> {
        self.game.encounter().map(|e| e.enemy.entity.hp)
    }

    pub fn in_combat(&self) -> bool {
        self.game.in_combat()
    }

    pub fn last_log(&self) -> &[String] {
        &self.last_log
    }

    pub fn log_contains(&self, text: &str) -> bool {
        self.last_log.iter().any(|line| line.contains(text))
    }

    fn record(
        &mut self,
        result: Result<CombatReport, GameError>,
    ) -> Result<CombatReport, GameError> {
        if let Ok(report) = &result {
            self.last_log = report.log.clone();
            if let Some(arrival) = &report.arrival {
                self.last_log.extend(arrival.log.iter().cloned());
            }
        }
        result
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the player's HP.
pub fn assert_hp(harness: &TestHarness, current: i32, max: i32) {
    let (hp, max_hp) = harness.player_hp();
    assert_eq!(
        (hp, max_hp),
        (current, max),
        "Expected HP {current}/{max}, got {hp}/{max_hp}"
    );
}

pub fn assert_in_combat(harness: &TestHarness) {
    assert!(harness.in_combat(), "Expected to be in combat");
}

pub fn assert_not_in_combat(harness: &TestHarness) {
    assert!(!harness.in_combat(), "Expected not to be in combat");
}

/// Assert the player carries an item with this name.
pub fn assert_has_item(harness: &TestHarness, name: &str) {
    assert!(
        harness.player().has_item_named(name),
        "Expected inventory to contain {name}"
    );
}

/// Assert that effective stats match `base(level) + equipped bonuses`.
pub fn assert_stats_consistent(harness: &TestHarness) {
    use crate::player::{base_attack, base_defense};

    let player = harness.player();
    let weapon = player.weapon.as_ref().map_or(0, |w| w.attack_bonus());
    let armor = player.armor.as_ref().map_or(0, |a| a.defense_bonus());
    assert_eq!(player.entity.attack, base_attack(player.level) + weapon);
    assert_eq!(player.entity.defense, base_defense(player.level) + armor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_starts_quietly() {
        let mut harness = TestHarness::new();
        assert_eq!(harness.last_log()[0], "--- Eldoria Town ---");
        harness.go(Direction::North);
        assert_not_in_combat(&harness);
        assert_hp(&harness, 100, 100);
        assert_stats_consistent(&harness);
    }

    #[test]
    fn test_harness_fight() {
        let mut harness = TestHarness::new();
        harness.teleport("forest").fight("Goblin");
        assert_in_combat(&harness);
        assert_eq!(harness.enemy_hp(), Some(30));

        let report = harness.attack_until_over(5).unwrap();
        assert!(report.combat_over);
        assert!(harness.log_contains("You defeated the Goblin!"));
        assert!(harness.log_contains("--- Whispering Forest ---"));
    }

    #[test]
    fn test_give_and_lookup() {
        let mut harness = TestHarness::new();
        let id = harness.give("Steel Armor");
        assert_eq!(harness.item_id("Steel Armor"), Some(id));
        assert_has_item(&harness, "Steel Armor");
    }
}
