//! The static game world.
//!
//! Locations, the enemy bestiary, NPCs with their quests, and the rewards
//! granted when a quest completes. Everything here is built once on first
//! access and never mutated afterwards.

use crate::entity::{Enemy, Entity};
use crate::error::GameError;
use crate::quest::{Quest, QuestStage};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Where a new character starts.
pub const START_LOCATION: &str = "town";

// ============================================================================
// Directions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            _ => Err(GameError::InvalidDirection(s.to_string())),
        }
    }
}

// ============================================================================
// Locations
// ============================================================================

/// A one-shot find hidden at a location.
#[derive(Debug, Clone)]
pub struct Secret {
    /// Catalog name of the item granted.
    pub item: &'static str,
}

#[derive(Debug, Clone)]
pub struct Location {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub exits: Vec<(Direction, &'static str)>,
    pub enemies: Vec<&'static str>,
    pub npc: Option<&'static str>,
    pub secret: Option<Secret>,
}

impl Location {
    fn new(key: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            key,
            name,
            description,
            exits: Vec::new(),
            enemies: Vec::new(),
            npc: None,
            secret: None,
        }
    }

    fn with_exit(mut self, direction: Direction, destination: &'static str) -> Self {
        self.exits.push((direction, destination));
        self
    }

    fn with_enemies(mut self, enemies: &[&'static str]) -> Self {
        self.enemies = enemies.to_vec();
        self
    }

    fn with_npc(mut self, npc: &'static str) -> Self {
        self.npc = Some(npc);
        self
    }

    fn with_secret(mut self, item: &'static str) -> Self {
        self.secret = Some(Secret { item });
        self
    }

    /// Destination key for a direction, if there is an exit that way.
    pub fn exit(&self, direction: Direction) -> Option<&'static str> {
        self.exits
            .iter()
            .find(|(d, _)| *d == direction)
            .map(|(_, dest)| *dest)
    }

    pub fn has_enemies(&self) -> bool {
        !self.enemies.is_empty()
    }
}

// ============================================================================
// Bestiary
// ============================================================================

#[derive(Debug, Clone)]
pub struct EnemyTemplate {
    pub name: &'static str,
    pub hp: i32,
    pub stamina: i32,
    pub attack: i32,
    pub defense: i32,
    pub xp_reward: u32,
}

impl EnemyTemplate {
    /// Create a fresh, full-health enemy.
    pub fn spawn(&self) -> Enemy {
        Enemy::new(
            Entity::new(self.name, self.hp, self.stamina, self.attack, self.defense),
            self.xp_reward,
        )
    }
}

// ============================================================================
// NPCs and Quest Rewards
// ============================================================================

#[derive(Debug, Clone)]
pub struct NpcDefinition {
    pub name: &'static str,
    /// Dialogue keyed by the current stage of the NPC's quest.
    pub dialogue: HashMap<usize, &'static str>,
    /// Template for the quest this NPC hands out.
    pub quest: Quest,
}

impl NpcDefinition {
    /// Line for a quest stage, or a placeholder when the NPC has nothing to say.
    pub fn line_for_stage(&self, stage: usize) -> &'static str {
        self.dialogue.get(&stage).copied().unwrap_or("...")
    }
}

/// Concrete grants attached to a quest by name.
#[derive(Debug, Clone)]
pub struct QuestReward {
    pub quest: &'static str,
    pub items: Vec<&'static str>,
    pub spells: Vec<&'static str>,
}

// ============================================================================
// World Registry
// ============================================================================

/// The immutable world registry.
#[derive(Debug)]
pub struct World {
    locations: HashMap<&'static str, Location>,
    enemies: HashMap<&'static str, EnemyTemplate>,
    npcs: HashMap<&'static str, NpcDefinition>,
    rewards: Vec<QuestReward>,
}

impl World {
    pub fn location(&self, key: &str) -> Option<&Location> {
        self.locations.get(key)
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn enemy(&self, name: &str) -> Option<&EnemyTemplate> {
        self.enemies.get(name)
    }

    pub fn npc(&self, name: &str) -> Option<&NpcDefinition> {
        self.npcs.get(name)
    }

    pub fn npcs(&self) -> impl Iterator<Item = &NpcDefinition> {
        self.npcs.values()
    }

    pub fn reward(&self, quest: &str) -> Option<&QuestReward> {
        self.rewards.iter().find(|r| r.quest == quest)
    }
}

static WORLD: LazyLock<World> = LazyLock::new(build_world);

/// Access the world registry.
pub fn world() -> &'static World {
    &WORLD
}

fn build_world() -> World {
    use Direction::*;

    let locations = vec![
        Location::new(
            "town",
            "Eldoria Town",
            "A peaceful town, a sanctuary from the dangers of the world.",
        )
        .with_exit(North, "forest")
        .with_exit(West, "swamp")
        .with_npc("Old Man"),
        Location::new(
            "forest",
            "Whispering Forest",
            "A dark and eerie forest. You find a small, moss-covered shrine.",
        )
        .with_exit(South, "town")
        .with_exit(East, "cave")
        .with_enemies(&["Goblin", "Wolf"])
        .with_secret("Amulet of the Forest"),
        Location::new(
            "swamp",
            "Haunted Swamp",
            "A murky swamp filled with fog. The air is heavy and cold.",
        )
        .with_exit(East, "town")
        .with_exit(North, "mountain_pass")
        .with_enemies(&["Banshee", "Giant Spider"])
        .with_npc("Witch"),
        Location::new(
            "cave",
            "Shadowy Cave",
            "A damp and cold cave. Something dangerous lurks here.",
        )
        .with_exit(West, "forest")
        .with_exit(North, "boss_room")
        .with_enemies(&["Troll", "Stone Golem"]),
        Location::new(
            "mountain_pass",
            "Frozen Mountain Pass",
            "A treacherous path through snowy mountains.",
        )
        .with_exit(South, "swamp")
        .with_exit(East, "castle_ruins")
        .with_enemies(&["Wolf", "Stone Golem"]),
        Location::new(
            "castle_ruins",
            "Ruins of Castle Varden",
            "The crumbling remains of a once-mighty fortress.",
        )
        .with_exit(West, "mountain_pass")
        .with_enemies(&["Cursed Knight", "Troll"]),
        Location::new(
            "boss_room",
            "Dragon's Lair",
            "A massive cavern with a fearsome dragon.",
        )
        .with_enemies(&["Dragon"]),
    ];

    let enemies = [
        ("Goblin", 30, 20, 10, 5, 25),
        ("Wolf", 40, 30, 15, 3, 35),
        ("Banshee", 50, 60, 22, 6, 70),
        ("Troll", 80, 50, 25, 10, 100),
        ("Giant Spider", 60, 40, 20, 8, 80),
        ("Stone Golem", 100, 30, 20, 18, 120),
        ("Cursed Knight", 90, 70, 30, 15, 150),
        ("Dragon", 250, 100, 40, 20, 500),
    ];

    let npcs = vec![
        NpcDefinition {
            name: "Old Man",
            dialogue: HashMap::from([
                (0, "Welcome, traveler. The world is in peril. A fearsome dragon has appeared in the nearby cave. But first, I need you to find my lost amulet. I think I dropped it in the Whispering Forest."),
                (1, "Thank you for finding my amulet! Now, please, defeat the dragon and bring peace back to our lands."),
            ]),
            quest: Quest::new(
                "Slay the Dragon",
                "Help the Old Man and save the town.",
                vec![
                    QuestStage::find("Amulet of the Forest", "forest", "Find the Old Man's amulet."),
                    QuestStage::kill("Dragon", "boss_room", "Slay the Dragon."),
                ],
                "You saved the town! The Old Man gives you a Greatsword.",
            ),
        },
        NpcDefinition {
            name: "Witch",
            dialogue: HashMap::from([
                (0, "What do you want, stranger? This swamp is no place for you... unless you can help me. A Cursed Knight in the castle ruins to the east stole my spellbook. Bring it back, and I shall reward you with knowledge."),
                (1, "You have my spellbook! As promised, I will teach you a powerful spell."),
            ]),
            quest: Quest::new(
                "The Stolen Spellbook",
                "Retrieve the Witch's spellbook.",
                vec![QuestStage::kill(
                    "Cursed Knight",
                    "castle_ruins",
                    "Defeat the Cursed Knight to get the spellbook.",
                )],
                "The Witch teaches you the Fireball spell.",
            ),
        },
    ];

    let rewards = vec![
        QuestReward {
            quest: "Slay the Dragon",
            items: vec!["Greatsword"],
            spells: vec![],
        },
        QuestReward {
            quest: "The Stolen Spellbook",
            items: vec![],
            spells: vec!["Fireball"],
        },
    ];

    World {
        locations: locations.into_iter().map(|l| (l.key, l)).collect(),
        enemies: enemies
            .into_iter()
            .map(|(name, hp, stamina, attack, defense, xp_reward)| {
                (
                    name,
                    EnemyTemplate {
                        name,
                        hp,
                        stamina,
                        attack,
                        defense,
                        xp_reward,
                    },
                )
            })
            .collect(),
        npcs: npcs.into_iter().map(|n| (n.name, n)).collect(),
        rewards,
    }
}
