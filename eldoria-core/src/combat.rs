//! Turn-based combat between the player and a single enemy.
//!
//! An [`Encounter`] is a small state machine:
//!
//! ```text
//! PlayerTurn --Attack/Defend/Flee(fail)/sub-action--> EnemyTurn --> PlayerTurn
//!     |  \--Magic/UseItem--> AwaitingSubaction --resolve--> EnemyTurn
//!     |                            \--cancel / no mana--> PlayerTurn
//!     \--enemy dies / flee ok / player dies--> Resolved(outcome)
//! ```
//!
//! The enemy turn runs inside the same call that ended the player's turn,
//! so callers only ever observe `PlayerTurn`, `AwaitingSubaction` or
//! `Resolved`. Rewards for a victory are handed out by [`crate::Game`],
//! which owns the quest log and the world.

use crate::entity::Enemy;
use crate::error::GameError;
use crate::items::ItemId;
use crate::player::Player;
use crate::spells::SpellEffect;
use rand::Rng;
use std::fmt;

/// Top-level choices on the player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatAction {
    Attack,
    Defend,
    Magic,
    UseItem,
    Flee,
}

/// The concrete choice that completes a Magic or UseItem turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubAction {
    /// Index into the player's spell list.
    CastSpell(usize),
    UsePotion(ItemId),
}

/// Which kind of sub-action the encounter is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingChoice {
    Spell,
    Potion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Fled,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    PlayerTurn,
    AwaitingSubaction(PendingChoice),
    EnemyTurn,
    Resolved(CombatOutcome),
}

/// A recoverable setback reported to the player. None of these cost a turn
/// except a failed flee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoTargetAvailable(PendingChoice),
    InsufficientResource {
        resource: &'static str,
        needed: i32,
        available: i32,
    },
    FleeFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoTargetAvailable(PendingChoice::Spell) => {
                write!(f, "You don't know any spells.")
            }
            Notice::NoTargetAvailable(PendingChoice::Potion) => {
                write!(f, "You have no potions to use.")
            }
            Notice::InsufficientResource { resource, .. } => write!(f, "Not enough {resource}!"),
            Notice::FleeFailed => write!(f, "You failed to flee!"),
        }
    }
}

/// One selectable sub-action, for presenting a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubActionOption {
    pub label: String,
    pub choice: SubAction,
}

/// Everything that happened during one combat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatTurn {
    pub log: Vec<String>,
    pub notices: Vec<Notice>,
    /// Choices on offer when the phase is `AwaitingSubaction`.
    pub options: Vec<SubActionOption>,
    pub phase: CombatPhase,
}

impl CombatTurn {
    fn new() -> Self {
        Self {
            log: Vec::new(),
            notices: Vec::new(),
            options: Vec::new(),
            phase: CombatPhase::PlayerTurn,
        }
    }

    fn notice(&mut self, notice: Notice) {
        self.log.push(notice.to_string());
        self.notices.push(notice);
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        match self.phase {
            CombatPhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }
}

/// A single fight against one freshly spawned enemy.
#[derive(Debug, Clone)]
pub struct Encounter {
    pub enemy: Enemy,
    phase: CombatPhase,
}

impl Encounter {
    pub fn new(enemy: Enemy) -> Self {
        tracing::debug!(enemy = enemy.name(), "encounter started");
        Self {
            enemy,
            phase: CombatPhase::PlayerTurn,
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        match self.phase {
            CombatPhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Take a top-level action on the player's turn.
    ///
    /// Choosing a new action while a spell or potion choice is pending
    /// abandons that choice. Passing `sub_choice` with Magic or UseItem
    /// resolves the choice in the same call.
    pub fn act<R: Rng>(
        &mut self,
        player: &mut Player,
        action: CombatAction,
        sub_choice: Option<SubAction>,
        rng: &mut R,
        flee_chance: f64,
    ) -> Result<CombatTurn, GameError> {
        if self.outcome().is_some() {
            return Err(GameError::NotInCombat);
        }
        self.phase = CombatPhase::PlayerTurn;
        let mut turn = CombatTurn::new();

        match action {
            CombatAction::Attack => {
                let dealt = self.enemy.entity.take_damage(player.entity.attack);
                turn.log.push(format!(
                    "You attack the {} for {dealt} damage.",
                    self.enemy.name()
                ));
                self.finish_player_turn(player, &mut turn);
            }
            CombatAction::Defend => {
                player.entity.is_defending = true;
                turn.log
                    .push("You brace for the next attack, reducing incoming damage.".to_string());
                self.enemy_turn(player, &mut turn);
            }
            CombatAction::Magic => {
                let options = spell_options(player);
                if options.is_empty() {
                    turn.notice(Notice::NoTargetAvailable(PendingChoice::Spell));
                } else {
                    self.phase = CombatPhase::AwaitingSubaction(PendingChoice::Spell);
                    if let Some(choice) = sub_choice {
                        return self.resolve_subaction(player, choice);
                    }
                    turn.options = options;
                }
            }
            CombatAction::UseItem => {
                let options = potion_options(player);
                if options.is_empty() {
                    turn.notice(Notice::NoTargetAvailable(PendingChoice::Potion));
                } else {
                    self.phase = CombatPhase::AwaitingSubaction(PendingChoice::Potion);
                    if let Some(choice) = sub_choice {
                        return self.resolve_subaction(player, choice);
                    }
                    turn.options = options;
                }
            }
            CombatAction::Flee => {
                if rng.gen::<f64>() < flee_chance {
                    turn.log.push("You successfully fled the battle.".to_string());
                    self.phase = CombatPhase::Resolved(CombatOutcome::Fled);
                } else {
                    turn.notice(Notice::FleeFailed);
                    self.enemy_turn(player, &mut turn);
                }
            }
        }

        turn.phase = self.phase;
        tracing::debug!(?action, phase = ?self.phase, "combat action resolved");
        Ok(turn)
    }

    /// Complete a pending Magic or UseItem choice.
    ///
    /// Running short on mana reports a notice and hands the turn back
    /// without cost. Errors leave the pending choice in place.
    pub fn resolve_subaction(
        &mut self,
        player: &mut Player,
        choice: SubAction,
    ) -> Result<CombatTurn, GameError> {
        let mut turn = CombatTurn::new();

        match (self.phase, choice) {
            (CombatPhase::AwaitingSubaction(PendingChoice::Spell), SubAction::CastSpell(index)) => {
                let spell = player
                    .spells
                    .get(index)
                    .cloned()
                    .ok_or(GameError::UnknownSpell(index))?;

                if player.mana < spell.mana_cost {
                    turn.notice(Notice::InsufficientResource {
                        resource: "mana",
                        needed: spell.mana_cost,
                        available: player.mana,
                    });
                    self.phase = CombatPhase::PlayerTurn;
                } else {
                    player.mana -= spell.mana_cost;
                    match spell.effect() {
                        SpellEffect::Damage(amount) => {
                            let dealt = self.enemy.entity.take_damage(amount);
                            turn.log
                                .push(format!("You cast {}, dealing {dealt} damage!", spell.name));
                            self.finish_player_turn(player, &mut turn);
                        }
                        SpellEffect::Heal(amount) => {
                            player.entity.heal(amount);
                            turn.log
                                .push(format!("You cast {}, healing for {amount} HP.", spell.name));
                            self.enemy_turn(player, &mut turn);
                        }
                    }
                }
            }
            (CombatPhase::AwaitingSubaction(PendingChoice::Potion), SubAction::UsePotion(id)) => {
                let line = player.drink_potion(id)?;
                turn.log.push(line);
                self.enemy_turn(player, &mut turn);
            }
            _ => return Err(GameError::NoPendingChoice),
        }

        turn.phase = self.phase;
        tracing::debug!(?choice, phase = ?self.phase, "sub-action resolved");
        Ok(turn)
    }

    /// Abandon a pending spell or potion choice at no cost.
    pub fn cancel_subaction(&mut self) -> Result<(), GameError> {
        match self.phase {
            CombatPhase::AwaitingSubaction(_) => {
                self.phase = CombatPhase::PlayerTurn;
                Ok(())
            }
            _ => Err(GameError::NoPendingChoice),
        }
    }

    fn finish_player_turn(&mut self, player: &mut Player, turn: &mut CombatTurn) {
        if self.enemy.is_alive() {
            self.enemy_turn(player, turn);
        } else {
            turn.log.push(format!("You defeated the {}!", self.enemy.name()));
            self.phase = CombatPhase::Resolved(CombatOutcome::Victory);
        }
    }

    fn enemy_turn(&mut self, player: &mut Player, turn: &mut CombatTurn) {
        self.phase = CombatPhase::EnemyTurn;
        let dealt = player.entity.take_damage(self.enemy.entity.attack);
        turn.log.push(format!(
            "The {} attacks you for {dealt} damage.",
            self.enemy.name()
        ));

        if player.is_alive() {
            self.phase = CombatPhase::PlayerTurn;
        } else {
            turn.log.push("You have been defeated. Game Over.".to_string());
            self.phase = CombatPhase::Resolved(CombatOutcome::Defeat);
        }
    }
}

fn spell_options(player: &Player) -> Vec<SubActionOption> {
    player
        .spells
        .iter()
        .enumerate()
        .map(|(index, spell)| SubActionOption {
            label: format!("{} ({} MP)", spell.name, spell.mana_cost),
            choice: SubAction::CastSpell(index),
        })
        .collect()
}

fn potion_options(player: &Player) -> Vec<SubActionOption> {
    player
        .potions()
        .map(|item| SubActionOption {
            label: item.name.clone(),
            choice: SubAction::UsePotion(item.id),
        })
        .collect()
}
