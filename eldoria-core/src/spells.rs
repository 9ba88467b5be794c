//! Spell database.
//!
//! Spells encode healing as negative damage: a spell with `damage: -40`
//! restores 40 hit points to the caster instead of hurting the enemy.

use std::collections::HashMap;
use std::sync::LazyLock;

/// A known spell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spell {
    pub name: String,
    pub description: String,
    pub mana_cost: i32,
    pub damage: i32,
}

/// What casting a spell does, decoded from its signed `damage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellEffect {
    Damage(i32),
    Heal(i32),
}

impl Spell {
    pub fn effect(&self) -> SpellEffect {
        if self.damage > 0 {
            SpellEffect::Damage(self.damage)
        } else {
            SpellEffect::Heal(-self.damage)
        }
    }
}

/// Static definition a [`Spell`] is created from.
#[derive(Debug, Clone)]
pub struct SpellData {
    pub name: &'static str,
    pub description: &'static str,
    pub mana_cost: i32,
    pub damage: i32,
}

impl SpellData {
    pub fn to_spell(&self) -> Spell {
        Spell {
            name: self.name.to_string(),
            description: self.description.to_string(),
            mana_cost: self.mana_cost,
            damage: self.damage,
        }
    }
}

fn build_spell_database() -> HashMap<String, SpellData> {
    let spells = [
        SpellData {
            name: "Fireball",
            description: "Hurls a ball of fire.",
            mana_cost: 15,
            damage: 30,
        },
        SpellData {
            name: "Heal",
            description: "A minor healing spell.",
            mana_cost: 20,
            damage: -40,
        },
    ];

    spells
        .into_iter()
        .map(|s| (s.name.to_lowercase(), s))
        .collect()
}

static SPELL_DATABASE: LazyLock<HashMap<String, SpellData>> = LazyLock::new(build_spell_database);

/// Look up a spell by name (case-insensitive).
pub fn get_spell(name: &str) -> Option<&'static SpellData> {
    SPELL_DATABASE.get(&name.to_lowercase())
}

/// Create a spell from its catalog name.
pub fn create_spell(name: &str) -> Option<Spell> {
    get_spell(name).map(SpellData::to_spell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fireball_deals_damage() {
        let fireball = create_spell("Fireball").unwrap();
        assert_eq!(fireball.mana_cost, 15);
        assert_eq!(fireball.effect(), SpellEffect::Damage(30));
    }

    #[test]
    fn test_heal_encoded_as_negative_damage() {
        let heal = create_spell("heal").unwrap();
        assert_eq!(heal.name, "Heal");
        assert_eq!(heal.effect(), SpellEffect::Heal(40));
    }

    #[test]
    fn test_unknown_spell() {
        assert!(create_spell("Meteor Swarm").is_none());
        assert_eq!(SPELL_DATABASE.len(), 2);
    }
}
