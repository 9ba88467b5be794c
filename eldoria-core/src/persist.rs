//! Save/load of player state.
//!
//! A [`SaveDocument`] is the stored form of a [`Player`]. It keeps item and
//! spell *names* rather than instances, and it does not trust stored attack
//! or defense: loading re-derives both from the level and then re-equips
//! the saved weapon and armor, so the effective stats come out identical.
//!
//! The game has exactly one save slot, a pretty-printed JSON file.

use crate::items::{create_item, Item};
use crate::player::{base_attack, base_defense, Player};
use crate::quest::Quest;
use crate::spells::create_spell;
use crate::world::world;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Default file name of the save slot.
pub const SAVE_FILE: &str = "rpg_save.json";

/// Highest level a save document may claim.
pub const MAX_SAVED_LEVEL: u32 = 10_000;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt save document: {0}")]
    CorruptSaveDocument(String),
}

/// The stored form of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub mana: i32,
    pub max_mana: i32,

    /// Written for reference only; recomputed on load.
    #[serde(default)]
    pub attack: i32,
    /// Written for reference only; recomputed on load.
    #[serde(default)]
    pub defense: i32,

    pub xp: u32,
    pub level: u32,
    pub location: String,

    /// Item names in inventory order.
    pub inventory: Vec<String>,
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default)]
    pub armor: Option<String>,

    pub quests: BTreeMap<String, Quest>,
    pub spells: Vec<String>,
}

impl SaveDocument {
    /// Capture a player.
    pub fn from_player(player: &Player) -> Self {
        Self {
            name: player.entity.name.clone(),
            hp: player.entity.hp,
            max_hp: player.entity.max_hp,
            stamina: player.entity.stamina,
            max_stamina: player.entity.max_stamina,
            mana: player.mana,
            max_mana: player.max_mana,
            attack: player.entity.attack,
            defense: player.entity.defense,
            xp: player.xp,
            level: player.level,
            location: player.location.clone(),
            inventory: player.inventory.iter().map(|i| i.name.clone()).collect(),
            weapon: player.weapon.as_ref().map(|w| w.name.clone()),
            armor: player.armor.as_ref().map(|a| a.name.clone()),
            quests: player.quests.clone(),
            spells: player.spells.iter().map(|s| s.name.clone()).collect(),
        }
    }

    /// Rebuild a player.
    ///
    /// Unknown item and spell names are dropped. A saved weapon or armor is
    /// matched by name against the first such item in the rebuilt inventory
    /// and is only equipped when the item is of that slot's kind.
    pub fn to_player(&self) -> Result<Player, PersistError> {
        self.validate()?;

        let mut player = Player::new(
            self.name.clone(),
            self.max_hp,
            self.max_stamina,
            base_attack(self.level),
            base_defense(self.level),
        );
        player.entity.hp = self.hp;
        player.entity.stamina = self.stamina;
        player.mana = self.mana;
        player.max_mana = self.max_mana;
        player.xp = self.xp;
        player.level = self.level;
        player.location = self.location.clone();

        for name in &self.inventory {
            match create_item(name) {
                Some(item) => player.add_item(item),
                None => tracing::warn!(item = %name, "dropping unknown item from save"),
            }
        }

        let slots: [(&Option<String>, fn(&Item) -> bool); 2] =
            [(&self.weapon, Item::is_weapon), (&self.armor, Item::is_armor)];
        for (slot, fits) in slots {
            let Some(slot) = slot else { continue };
            let found = player
                .inventory
                .iter()
                .find(|i| &i.name == slot)
                .map(|i| (i.id, fits(i)));
            match found {
                // Only an item of the slot's own kind is equipped.
                Some((id, true)) => {
                    if player.equip_item(id).is_err() {
                        tracing::warn!(item = %slot, "saved equipment is not equippable");
                    }
                }
                Some((_, false)) => {
                    tracing::warn!(item = %slot, "saved equipment is in the wrong slot")
                }
                None => tracing::warn!(item = %slot, "saved equipment missing from inventory"),
            }
        }

        for name in &self.spells {
            match create_spell(name) {
                Some(spell) => player.learn_spell(spell),
                None => tracing::warn!(spell = %name, "dropping unknown spell from save"),
            }
        }

        player.quests = self.quests.clone();
        Ok(player)
    }

    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        serde_json::from_str(json).map_err(|e| PersistError::CorruptSaveDocument(e.to_string()))
    }

    /// Parse a document from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, PersistError> {
        serde_json::from_value(value).map_err(|e| PersistError::CorruptSaveDocument(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), PersistError> {
        if !(1..=MAX_SAVED_LEVEL).contains(&self.level) {
            return Err(PersistError::CorruptSaveDocument(format!(
                "level {} is outside 1..={MAX_SAVED_LEVEL}",
                self.level
            )));
        }
        check_pool("hp", self.hp, self.max_hp, 1)?;
        check_pool("stamina", self.stamina, self.max_stamina, 0)?;
        check_pool("mana", self.mana, self.max_mana, 0)?;
        if world().location(&self.location).is_none() {
            return Err(PersistError::CorruptSaveDocument(format!(
                "unknown location '{}'",
                self.location
            )));
        }
        if let Some(quest) = self.quests.values().find(|q| !q.is_consistent()) {
            return Err(PersistError::CorruptSaveDocument(format!(
                "quest '{}' is at stage {} of {}",
                quest.name,
                quest.current_stage,
                quest.stages.len()
            )));
        }
        Ok(())
    }
}

/// `current` must lie in `min..=max` and `max` must be positive.
fn check_pool(what: &str, current: i32, max: i32, min: i32) -> Result<(), PersistError> {
    if max < 1 || !(min..=max).contains(&current) {
        return Err(PersistError::CorruptSaveDocument(format!(
            "{what} {current}/{max} is out of range"
        )));
    }
    Ok(())
}

/// The single save slot on disk.
#[derive(Debug, Clone)]
pub struct SaveSlot {
    path: PathBuf,
}

impl SaveSlot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a save exists (decides if "Load Game" is offered).
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    pub async fn save(&self, document: &SaveDocument) -> Result<(), PersistError> {
        let content = document.to_json()?;
        fs::write(&self.path, content).await?;
        tracing::info!(path = %self.path.display(), "game saved");
        Ok(())
    }

    pub async fn load(&self) -> Result<SaveDocument, PersistError> {
        let content = fs::read_to_string(&self.path).await?;
        let document = SaveDocument::from_json(&content)?;
        tracing::info!(path = %self.path.display(), "game loaded");
        Ok(document)
    }
}

impl Default for SaveSlot {
    fn default() -> Self {
        Self::new(SAVE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest_engine::{check_progress, talk_to_npc};

    fn seasoned_hero() -> Player {
        let mut hero = Player::starting_character("Hero").unwrap();
        hero.gain_xp(150);
        hero.gain_xp(40);
        hero.entity.hp = 77;
        hero.mana = 12;
        hero.add_item(create_item("Greatsword").unwrap());
        hero.add_item(create_item("Health Potion").unwrap());
        let greatsword = hero.inventory[3].id;
        hero.equip_item(greatsword).unwrap();
        talk_to_npc(&mut hero, "Old Man").unwrap();
        hero.location = "cave".to_string();
        hero
    }

    #[test]
    fn test_round_trip_preserves_stored_and_effective_stats() {
        let hero = seasoned_hero();
        let document = SaveDocument::from_player(&hero);
        let loaded = document.to_player().unwrap();

        assert_eq!(loaded.location, "cave");
        assert_eq!(loaded.level, hero.level);
        assert_eq!(loaded.xp, 40);
        assert_eq!(loaded.entity.hp, 77);
        assert_eq!(loaded.mana, 12);
        assert_eq!(loaded.entity.max_hp, hero.entity.max_hp);
        assert_eq!(loaded.entity.attack, hero.entity.attack);
        assert_eq!(loaded.entity.defense, hero.entity.defense);
        assert_eq!(
            loaded.inventory.iter().map(|i| &i.name).collect::<Vec<_>>(),
            hero.inventory.iter().map(|i| &i.name).collect::<Vec<_>>()
        );
        assert_eq!(loaded.weapon.as_ref().unwrap().name, "Greatsword");
        assert_eq!(loaded.quests, hero.quests);
        assert_eq!(loaded.spells, hero.spells);
    }

    #[test]
    fn test_stored_attack_is_ignored() {
        let hero = seasoned_hero();
        let mut document = SaveDocument::from_player(&hero);
        document.attack = 9999;
        document.defense = -3;

        let loaded = document.to_player().unwrap();
        assert_eq!(loaded.entity.attack, base_attack(2) + 18);
        assert_eq!(loaded.entity.defense, base_defense(2) + 5);
    }

    #[test]
    fn test_unknown_names_are_dropped() {
        let mut document = SaveDocument::from_player(&Player::starting_character("Hero").unwrap());
        document.inventory.push("Cursed Spoon".to_string());
        document.spells.push("Wish".to_string());
        document.weapon = Some("Cursed Spoon".to_string());

        let loaded = document.to_player().unwrap();
        assert_eq!(loaded.inventory.len(), 3);
        assert_eq!(loaded.spells.len(), 1);
        assert!(loaded.weapon.is_none());
        assert_eq!(loaded.entity.attack, base_attack(1));
    }

    #[test]
    fn test_loads_legacy_save_file() {
        let json = r#"{
            "name": "Hero", "hp": 64, "max_hp": 120,
            "stamina": 60, "max_stamina": 60,
            "mana": 40, "max_mana": 40,
            "attack": 30, "defense": 12, "xp": 10,
            "level": 2, "location": "forest",
            "inventory": ["Health Potion", "Iron Sword", "Leather Armor", "Amulet of the Forest"],
            "weapon": "Iron Sword", "armor": "Leather Armor",
            "quests": {
                "Slay the Dragon": {
                    "name": "Slay the Dragon",
                    "description": "Help the Old Man and save the town.",
                    "stages": [
                        {"type": "find_item", "item": "Amulet of the Forest", "location": "forest", "target_description": "Find the Old Man's amulet."},
                        {"type": "kill_enemy", "enemy": "Dragon", "location": "boss_room", "target_description": "Slay the Dragon."}
                    ],
                    "current_stage": 1,
                    "reward": "You saved the town! The Old Man gives you a Greatsword.",
                    "completed": false
                }
            },
            "spells": ["Heal"]
        }"#;

        let document = SaveDocument::from_json(json).unwrap();
        let mut hero = document.to_player().unwrap();
        assert_eq!(hero.entity.attack, 30);
        assert_eq!(hero.entity.defense, 12);
        assert_eq!(hero.quests["Slay the Dragon"].current_stage, 1);

        check_progress(&mut hero, Some("Dragon"));
        assert!(hero.quests["Slay the Dragon"].completed);
    }

    #[test]
    fn test_missing_field_is_corrupt() {
        let err = SaveDocument::from_json(r#"{"name": "Hero", "hp": 10}"#).unwrap_err();
        assert!(matches!(err, PersistError::CorruptSaveDocument(_)));
    }

    #[test]
    fn test_out_of_range_quest_stage_is_corrupt() {
        let mut document = SaveDocument::from_player(&seasoned_hero());
        if let Some(quest) = document.quests.values_mut().next() {
            quest.current_stage = 9;
        }
        assert!(matches!(
            document.to_player(),
            Err(PersistError::CorruptSaveDocument(_))
        ));
    }

    #[test]
    fn test_unknown_location_is_corrupt() {
        let mut document = SaveDocument::from_player(&seasoned_hero());
        document.location = "moon".to_string();
        assert!(document.to_player().is_err());
    }

    #[test]
    fn test_huge_level_is_corrupt() {
        let mut document = SaveDocument::from_player(&seasoned_hero());
        document.level = 500_000_000;
        assert!(matches!(
            document.to_player(),
            Err(PersistError::CorruptSaveDocument(_))
        ));

        document.level = MAX_SAVED_LEVEL;
        document.xp = u32::MAX;
        let mut hero = document.to_player().unwrap();
        assert_eq!(hero.entity.attack, base_attack(MAX_SAVED_LEVEL) + 18);
        assert!(hero.gain_xp(u32::MAX).is_some());
    }

    #[test]
    fn test_resource_pools_out_of_range_are_corrupt() {
        let hero = seasoned_hero();
        let corrupt: [fn(&mut SaveDocument); 6] = [
            |d: &mut SaveDocument| d.hp = -40,
            |d: &mut SaveDocument| d.hp = 0,
            |d: &mut SaveDocument| d.hp = 9999,
            |d: &mut SaveDocument| d.max_hp = 0,
            |d: &mut SaveDocument| d.stamina = -1,
            |d: &mut SaveDocument| d.mana = d.max_mana + 1,
        ];
        for tamper in corrupt {
            let mut document = SaveDocument::from_player(&hero);
            tamper(&mut document);
            assert!(matches!(
                document.to_player(),
                Err(PersistError::CorruptSaveDocument(_))
            ));
        }
    }

    #[test]
    fn test_equipment_in_wrong_slot_stays_unequipped() {
        let mut document = SaveDocument::from_player(&Player::starting_character("Hero").unwrap());
        document.weapon = Some("Leather Armor".to_string());
        document.armor = None;

        let loaded = document.to_player().unwrap();
        assert!(loaded.weapon.is_none());
        assert!(loaded.armor.is_none());
        assert_eq!(loaded.entity.attack, base_attack(1));
        assert_eq!(loaded.entity.defense, base_defense(1));
    }

    #[tokio::test]
    async fn test_save_slot_round_trip() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let slot = SaveSlot::new(temp_dir.path().join(SAVE_FILE));
        assert!(!slot.exists().await);

        let document = SaveDocument::from_player(&seasoned_hero());
        slot.save(&document).await.expect("Save should succeed");
        assert!(slot.exists().await);

        let loaded = slot.load().await.expect("Load should succeed");
        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn test_load_missing_slot_is_io_error() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let slot = SaveSlot::new(temp_dir.path().join("nothing.json"));
        assert!(matches!(slot.load().await, Err(PersistError::Io(_))));
    }
}
