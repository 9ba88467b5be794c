//! Error types for game operations.
//!
//! Only calls that are illegal in the current state return an error. In-game
//! setbacks such as a failed flee or running out of mana are not errors; they
//! come back as [`crate::combat::Notice`]s inside an otherwise successful
//! response.

use crate::items::ItemId;
use crate::persist::PersistError;
use thiserror::Error;

/// Errors from [`crate::Game`] operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("You can't go '{0}' from here.")]
    InvalidDirection(String),

    #[error("Unknown catalog entry: {0}")]
    UnknownCatalogName(String),

    #[error("Corrupt save document: {0}")]
    CorruptSaveDocument(String),

    #[error("No item with id {0} in the inventory")]
    ItemNotFound(ItemId),

    #[error("The {0} can't be equipped")]
    NotEquippable(String),

    #[error("The {0} can't be used")]
    NotUsable(String),

    #[error("{0} is not here")]
    NpcNotHere(String),

    #[error("You don't know a spell at slot {0}")]
    UnknownSpell(usize),

    #[error("You are not in combat")]
    NotInCombat,

    #[error("You can't do that during combat")]
    InCombat,

    #[error("No spell or item choice is pending")]
    NoPendingChoice,

    #[error("The game is over")]
    GameOver,

    #[error("Persistence error: {0}")]
    Persist(PersistError),
}

impl From<PersistError> for GameError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::CorruptSaveDocument(reason) => GameError::CorruptSaveDocument(reason),
            other => GameError::Persist(other),
        }
    }
}
