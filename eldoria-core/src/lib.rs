//! Turn-based RPG rules engine.
//!
//! This crate provides:
//! - Character progression, equipment and inventory
//! - A turn-based combat state machine with spell and potion sub-actions
//! - Multi-stage quests driven by NPCs, victories and searches
//! - A small static world of connected locations
//! - A JSON save slot
//!
//! # Quick Start
//!
//! ```ignore
//! use eldoria_core::{CombatAction, Direction, Game, GameConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut game, arrival) = Game::new_game(GameConfig::from_env())?;
//!     arrival.log.iter().for_each(|line| println!("{line}"));
//!
//!     let arrival = game.move_player(Direction::North)?;
//!     if arrival.encounter.is_some() {
//!         let report = game.perform_combat_action(CombatAction::Attack, None)?;
//!         println!("{}", report.log.join("\n"));
//!     }
//!
//!     game.save_to_slot().await?;
//!     Ok(())
//! }
//! ```

pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod items;
pub mod persist;
pub mod player;
pub mod quest;
pub mod quest_engine;
pub mod spells;
pub mod testing;
pub mod world;

// Primary public API
pub use combat::{
    CombatAction, CombatOutcome, CombatPhase, Notice, PendingChoice, SubAction, SubActionOption,
};
pub use config::GameConfig;
pub use error::GameError;
pub use game::{Arrival, CombatReport, Game, GameStatus, InventoryEntry, LocationView, Response};
pub use items::{Item, ItemId, ItemKind};
pub use persist::{PersistError, SaveDocument, SaveSlot};
pub use player::{Player, StatSummary};
pub use quest_engine::{Conversation, SearchOutcome};
pub use testing::TestHarness;
pub use world::Direction;
