//! Item database.
//!
//! Contains the potions, weapons, armor and quest items the world can hand
//! out, plus a factory that turns a catalog name into a fresh item instance.

use std::fmt;
use uuid::Uuid;

// ============================================================================
// Item Types
// ============================================================================

/// Identity of one item instance.
///
/// Two Health Potions in the same inventory share a name but not an id, so
/// equip and drop always target exactly the instance the caller picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a potion restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotionEffect {
    Heal,
    Stamina,
}

/// Variant-specific data of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Plain item with no mechanical effect (quest items).
    Generic,
    Potion { effect: PotionEffect, amount: i32 },
    Weapon { attack_bonus: i32 },
    Armor { defense_bonus: i32 },
}

/// A single item instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. })
    }

    pub fn is_armor(&self) -> bool {
        matches!(self.kind, ItemKind::Armor { .. })
    }

    pub fn is_potion(&self) -> bool {
        matches!(self.kind, ItemKind::Potion { .. })
    }

    pub fn is_equippable(&self) -> bool {
        self.is_weapon() || self.is_armor()
    }

    /// Attack bonus granted when equipped (zero for non-weapons).
    pub fn attack_bonus(&self) -> i32 {
        match self.kind {
            ItemKind::Weapon { attack_bonus } => attack_bonus,
            _ => 0,
        }
    }

    /// Defense bonus granted when equipped (zero for non-armor).
    pub fn defense_bonus(&self) -> i32 {
        match self.kind {
            ItemKind::Armor { defense_bonus } => defense_bonus,
            _ => 0,
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A catalog entry that items are instantiated from.
#[derive(Debug, Clone)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ItemKind,
}

impl ItemTemplate {
    const fn new(name: &'static str, description: &'static str, kind: ItemKind) -> Self {
        Self {
            name,
            description,
            kind,
        }
    }

    /// Create a fresh instance with its own id.
    pub fn instantiate(&self) -> Item {
        Item::new(self.name, self.description, self.kind)
    }
}

lazy_static::lazy_static! {
    /// Every item the game knows about.
    pub static ref ITEMS: Vec<ItemTemplate> = vec![
        ItemTemplate::new(
            "Health Potion",
            "Restores 50 HP.",
            ItemKind::Potion { effect: PotionEffect::Heal, amount: 50 },
        ),
        ItemTemplate::new(
            "Stamina Potion",
            "Restores 40 Stamina.",
            ItemKind::Potion { effect: PotionEffect::Stamina, amount: 40 },
        ),
        ItemTemplate::new("Iron Sword", "A basic sword.", ItemKind::Weapon { attack_bonus: 10 }),
        ItemTemplate::new(
            "Greatsword",
            "A heavy two-handed sword.",
            ItemKind::Weapon { attack_bonus: 18 },
        ),
        ItemTemplate::new(
            "Leather Armor",
            "Simple leather armor.",
            ItemKind::Armor { defense_bonus: 5 },
        ),
        ItemTemplate::new(
            "Steel Armor",
            "Sturdy steel plate armor.",
            ItemKind::Armor { defense_bonus: 12 },
        ),
        ItemTemplate::new("Amulet of the Forest", "A quest item.", ItemKind::Generic),
    ];
}

/// Look up an item template by name (case-insensitive).
pub fn get_template(name: &str) -> Option<&'static ItemTemplate> {
    let name_lower = name.to_lowercase();
    ITEMS.iter().find(|t| t.name.to_lowercase() == name_lower)
}

/// Create a new item instance from its catalog name.
///
/// Returns `None` for names the catalog doesn't know.
pub fn create_item(name: &str) -> Option<Item> {
    get_template(name).map(ItemTemplate::instantiate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_items() {
        let sword = create_item("Iron Sword").unwrap();
        assert_eq!(sword.kind, ItemKind::Weapon { attack_bonus: 10 });
        assert_eq!(sword.attack_bonus(), 10);
        assert_eq!(sword.defense_bonus(), 0);

        let potion = create_item("health potion").unwrap();
        assert_eq!(potion.name, "Health Potion");
        assert!(potion.is_potion());
        assert!(!potion.is_equippable());
    }

    #[test]
    fn test_unknown_item_is_none() {
        assert!(create_item("Vorpal Blade").is_none());
    }

    #[test]
    fn test_instances_have_distinct_ids() {
        let a = create_item("Health Potion").unwrap();
        let b = create_item("Health Potion").unwrap();
        assert_eq!(a.name, b.name);
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
    }

    #[test]
    fn test_catalog_names_unique() {
        for (i, a) in ITEMS.iter().enumerate() {
            for b in ITEMS.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
