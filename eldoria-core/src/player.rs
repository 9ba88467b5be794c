//! The player character.
//!
//! Composes an [`Entity`] with progression, mana, inventory, equipment
//! slots, quests and spells.
//!
//! Effective attack and defense are always `base(level)` plus the bonus of
//! whatever is equipped. Every equip and unequip adjusts the stat by the
//! exact bonus it adds or removes, so the two never drift apart.

use crate::entity::Entity;
use crate::error::GameError;
use crate::items::{create_item, Item, ItemId, ItemKind, PotionEffect};
use crate::quest::Quest;
use crate::spells::{create_spell, Spell};
use crate::world::START_LOCATION;
use std::collections::BTreeMap;
use std::fmt;

/// Attack of an unequipped character at `level`.
pub fn base_attack(level: u32) -> i32 {
    level_scaled(level, 5).saturating_add(10)
}

/// Defense of an unequipped character at `level`.
pub fn base_defense(level: u32) -> i32 {
    level_scaled(level, 2).saturating_add(3)
}

fn level_scaled(level: u32, per_level: i32) -> i32 {
    i32::try_from(level)
        .unwrap_or(i32::MAX)
        .saturating_mul(per_level)
}

/// Emitted when a character gains a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub new_level: u32,
}

impl LevelUp {
    pub fn message(&self) -> String {
        format!("*** You leveled up to level {}! ***", self.new_level)
    }
}

/// Numeric summary shown alongside every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSummary {
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
}

impl fmt::Display for StatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HP: {}/{} | MP: {}/{} | Stamina: {}/{} | Level: {} | XP: {}/{}",
            self.hp,
            self.max_hp,
            self.mana,
            self.max_mana,
            self.stamina,
            self.max_stamina,
            self.level,
            self.xp,
            self.xp_to_next
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub entity: Entity,
    pub xp: u32,
    pub level: u32,
    pub mana: i32,
    pub max_mana: i32,
    pub inventory: Vec<Item>,
    /// Equipped weapon. Holds a copy of the inventory instance; its id links the two.
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
    pub location: String,
    pub quests: BTreeMap<String, Quest>,
    pub spells: Vec<Spell>,
}

impl Player {
    /// Create a level 1 character with nothing equipped.
    pub fn new(name: impl Into<String>, hp: i32, stamina: i32, attack: i32, defense: i32) -> Self {
        Self {
            entity: Entity::new(name, hp, stamina, attack, defense),
            xp: 0,
            level: 1,
            mana: 30,
            max_mana: 30,
            inventory: Vec::new(),
            weapon: None,
            armor: None,
            location: START_LOCATION.to_string(),
            quests: BTreeMap::new(),
            spells: Vec::new(),
        }
    }

    /// The New Game loadout: a Health Potion, an equipped Iron Sword and
    /// Leather Armor, and the Heal spell.
    pub fn starting_character(name: impl Into<String>) -> Result<Self, GameError> {
        let mut player = Self::new(name, 100, 50, base_attack(1), base_defense(1));

        player.add_item(catalog_item("Health Potion")?);
        for name in ["Iron Sword", "Leather Armor"] {
            let item = catalog_item(name)?;
            let id = item.id;
            player.add_item(item);
            player.equip_item(id)?;
        }
        player.learn_spell(
            create_spell("Heal").ok_or_else(|| GameError::UnknownCatalogName("Heal".to_string()))?,
        );

        Ok(player)
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    pub fn is_alive(&self) -> bool {
        self.entity.is_alive()
    }

    pub fn stats(&self) -> StatSummary {
        StatSummary {
            hp: self.entity.hp,
            max_hp: self.entity.max_hp,
            mana: self.mana,
            max_mana: self.max_mana,
            stamina: self.entity.stamina,
            max_stamina: self.entity.max_stamina,
            level: self.level,
            xp: self.xp,
            xp_to_next: self.xp_to_next(),
        }
    }

    // ========================================================================
    // Progression
    // ========================================================================

    /// XP needed to reach the next level.
    pub fn xp_to_next(&self) -> u32 {
        self.level.saturating_mul(100)
    }

    /// Add experience, levelling up at most once.
    ///
    /// The threshold is checked a single time per award, so one huge reward
    /// only ever grants one level and the excess is discarded.
    pub fn gain_xp(&mut self, amount: u32) -> Option<LevelUp> {
        self.xp = self.xp.saturating_add(amount);
        if self.xp >= self.xp_to_next() {
            Some(self.level_up())
        } else {
            None
        }
    }

    pub fn level_up(&mut self) -> LevelUp {
        self.level = self.level.saturating_add(1);
        self.xp = 0;

        self.entity.max_hp = self.entity.max_hp.saturating_add(20);
        self.entity.hp = self.entity.max_hp;
        self.entity.max_stamina = self.entity.max_stamina.saturating_add(10);
        self.entity.stamina = self.entity.max_stamina;
        self.max_mana = self.max_mana.saturating_add(10);
        self.mana = self.max_mana;
        self.entity.attack = self.entity.attack.saturating_add(5);
        self.entity.defense = self.entity.defense.saturating_add(2);

        tracing::info!(level = self.level, "player levelled up");
        LevelUp {
            new_level: self.level,
        }
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    /// Remove an item instance.
    ///
    /// Equipment slots are left alone: drop flows must unequip first.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.inventory.iter().position(|i| i.id == id)?;
        Some(self.inventory.remove(index))
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.inventory.iter().find(|i| i.id == id)
    }

    pub fn has_item_named(&self, name: &str) -> bool {
        self.inventory.iter().any(|i| i.name == name)
    }

    pub fn potions(&self) -> impl Iterator<Item = &Item> {
        self.inventory.iter().filter(|i| i.is_potion())
    }

    pub fn is_equipped_weapon(&self, id: ItemId) -> bool {
        self.weapon.as_ref().is_some_and(|w| w.id == id)
    }

    pub fn is_equipped_armor(&self, id: ItemId) -> bool {
        self.armor.as_ref().is_some_and(|a| a.id == id)
    }

    /// Drink a potion from the inventory, consuming it.
    ///
    /// Returns the log line describing the effect.
    pub fn drink_potion(&mut self, id: ItemId) -> Result<String, GameError> {
        let item = self.find_item(id).ok_or(GameError::ItemNotFound(id))?;
        let ItemKind::Potion { effect, amount } = item.kind else {
            return Err(GameError::NotUsable(item.name.clone()));
        };
        let name = item.name.clone();

        let line = match effect {
            PotionEffect::Heal => {
                self.entity.heal(amount);
                format!("You used a {name} and healed for {amount} HP.")
            }
            PotionEffect::Stamina => {
                self.entity.restore_stamina(amount);
                format!("You used a {name} and restored {amount} stamina.")
            }
        };
        self.remove_item(id);
        Ok(line)
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// Equip an inventory item, replacing whatever occupied its slot.
    ///
    /// The item stays in the inventory.
    pub fn equip_item(&mut self, id: ItemId) -> Result<&Item, GameError> {
        let item = self.find_item(id).cloned().ok_or(GameError::ItemNotFound(id))?;

        if item.is_weapon() {
            if let Some(old) = self.weapon.take() {
                self.entity.attack -= old.attack_bonus();
            }
            self.entity.attack += item.attack_bonus();
            Ok(self.weapon.insert(item))
        } else if item.is_armor() {
            if let Some(old) = self.armor.take() {
                self.entity.defense -= old.defense_bonus();
            }
            self.entity.defense += item.defense_bonus();
            Ok(self.armor.insert(item))
        } else {
            Err(GameError::NotEquippable(item.name))
        }
    }

    pub fn unequip_weapon(&mut self) -> Option<Item> {
        let old = self.weapon.take()?;
        self.entity.attack -= old.attack_bonus();
        Some(old)
    }

    pub fn unequip_armor(&mut self) -> Option<Item> {
        let old = self.armor.take()?;
        self.entity.defense -= old.defense_bonus();
        Some(old)
    }

    /// Take off a specific instance if it is equipped in either slot.
    pub fn unequip(&mut self, id: ItemId) -> Option<Item> {
        if self.is_equipped_weapon(id) {
            self.unequip_weapon()
        } else if self.is_equipped_armor(id) {
            self.unequip_armor()
        } else {
            None
        }
    }

    // ========================================================================
    // Spells
    // ========================================================================

    pub fn learn_spell(&mut self, spell: Spell) {
        self.spells.push(spell);
    }
}

fn catalog_item(name: &str) -> Result<Item, GameError> {
    create_item(name).ok_or_else(|| GameError::UnknownCatalogName(name.to_string()))
}
