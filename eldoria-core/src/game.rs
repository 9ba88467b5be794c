//! The game session: the single entry point a front end talks to.
//!
//! A [`Game`] owns the player, the encounter in progress (if any) and the
//! random number generator. Every call returns the log lines it produced
//! together with a fresh [`StatSummary`], and never prints anything itself.

use crate::combat::{
    CombatAction, CombatOutcome, CombatPhase, CombatTurn, Encounter, Notice, SubAction,
    SubActionOption,
};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::items::{Item, ItemId};
use crate::persist::{SaveDocument, SaveSlot};
use crate::player::{Player, StatSummary};
use crate::quest_engine::{self, Conversation, SearchOutcome};
use crate::world::{world, Direction, Location};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Coarse state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Exploring,
    InCombat,
    GameOver,
}

/// What the player sees at their current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationView {
    pub key: String,
    pub name: String,
    pub description: String,
    pub exits: Vec<(Direction, String)>,
    pub npc: Option<String>,
    pub has_secret: bool,
    /// Whether entering this location can start a fight.
    pub possible_encounter: bool,
}

impl LocationView {
    fn of(location: &Location) -> Self {
        Self {
            key: location.key.to_string(),
            name: location.name.to_string(),
            description: location.description.to_string(),
            exits: location
                .exits
                .iter()
                .map(|(dir, key)| (*dir, key.to_string()))
                .collect(),
            npc: location.npc.map(str::to_string),
            has_secret: location.secret.is_some(),
            possible_encounter: location.has_enemies(),
        }
    }

    fn header(&self) -> Vec<String> {
        vec![format!("--- {} ---", self.name), self.description.clone()]
    }
}

/// The result of entering (or re-entering) a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub view: LocationView,
    /// Name of the enemy that appeared, if an encounter was rolled.
    pub encounter: Option<String>,
    pub log: Vec<String>,
    pub stats: StatSummary,
}

/// One row of the inventory screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub item: Item,
    pub equipped_as_weapon: bool,
    pub equipped_as_armor: bool,
}

impl InventoryEntry {
    /// Item name with a `(W)` or `(A)` marker when equipped.
    pub fn label(&self) -> String {
        if self.equipped_as_weapon {
            format!("{} (W)", self.item.name)
        } else if self.equipped_as_armor {
            format!("{} (A)", self.item.name)
        } else {
            self.item.name.clone()
        }
    }
}

/// Outcome of a non-combat mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub log: Vec<String>,
    pub stats: StatSummary,
}

/// Outcome of a combat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatReport {
    pub log: Vec<String>,
    pub notices: Vec<Notice>,
    /// Choices on offer while a spell or potion choice is pending.
    pub options: Vec<SubActionOption>,
    pub phase: CombatPhase,
    pub combat_over: bool,
    pub outcome: Option<CombatOutcome>,
    /// Where the player ends up after a victory or a successful flee.
    pub arrival: Option<Arrival>,
    pub stats: StatSummary,
}

/// A running game session.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    player: Player,
    encounter: Option<Encounter>,
    rng: StdRng,
    over: bool,
}

impl Game {
    fn with_player(config: GameConfig, player: Player) -> Self {
        let rng = config.rng();
        Self {
            config,
            player,
            encounter: None,
            rng,
            over: false,
        }
    }

    /// Start a New Game with the default character at the starting location.
    pub fn new_game(config: GameConfig) -> Result<(Self, Arrival), GameError> {
        let player = Player::starting_character(config.player_name.clone())?;
        tracing::info!(player = %player.name(), "new game");
        let mut game = Self::with_player(config, player);
        let arrival = game.enter_location()?;
        Ok((game, arrival))
    }

    /// Resume from a save document. The saved location is re-entered, which
    /// may roll an encounter.
    pub fn load_game(
        config: GameConfig,
        document: &SaveDocument,
    ) -> Result<(Self, Arrival), GameError> {
        let player = document.to_player()?;
        let mut game = Self::with_player(config, player);
        let mut arrival = game.enter_location()?;
        arrival.log.insert(0, "Game loaded. Welcome back.".to_string());
        Ok((game, arrival))
    }

    /// Load from the configured save slot.
    pub async fn load_from_slot(config: GameConfig) -> Result<(Self, Arrival), GameError> {
        let document = SaveSlot::new(&config.save_path).load().await?;
        Self::load_game(config, &document)
    }

    /// Capture the player for saving. Not allowed mid-fight.
    pub fn save_game(&self) -> Result<SaveDocument, GameError> {
        self.ensure_exploring()?;
        Ok(SaveDocument::from_player(&self.player))
    }

    /// Save to the configured slot.
    pub async fn save_to_slot(&self) -> Result<Response, GameError> {
        let document = self.save_game()?;
        SaveSlot::new(&self.config.save_path).save(&document).await?;
        Ok(self.response(vec!["Game saved.".to_string()]))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct access to the player, for tools and test setup.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    pub fn stats(&self) -> StatSummary {
        self.player.stats()
    }

    pub fn status(&self) -> GameStatus {
        if self.over {
            GameStatus::GameOver
        } else if self.encounter.is_some() {
            GameStatus::InCombat
        } else {
            GameStatus::Exploring
        }
    }

    pub fn in_combat(&self) -> bool {
        self.status() == GameStatus::InCombat
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn describe_location(&self) -> Result<LocationView, GameError> {
        Ok(LocationView::of(self.current_location()?))
    }

    pub fn open_inventory(&self) -> Vec<InventoryEntry> {
        self.player
            .inventory
            .iter()
            .map(|item| InventoryEntry {
                item: item.clone(),
                equipped_as_weapon: self.player.is_equipped_weapon(item.id),
                equipped_as_armor: self.player.is_equipped_armor(item.id),
            })
            .collect()
    }

    // ========================================================================
    // Exploration
    // ========================================================================

    /// Walk through an exit of the current location.
    pub fn move_player(&mut self, direction: Direction) -> Result<Arrival, GameError> {
        self.ensure_exploring()?;
        let destination = self
            .current_location()?
            .exit(direction)
            .ok_or_else(|| GameError::InvalidDirection(direction.to_string()))?;

        tracing::debug!(from = %self.player.location, to = destination, "player moved");
        self.player.location = destination.to_string();
        self.enter_location()
    }

    /// Start a fight with a named enemy regardless of location.
    pub fn start_combat(&mut self, enemy_name: &str) -> Result<Vec<String>, GameError> {
        self.ensure_exploring()?;
        let enemy = world()
            .enemy(enemy_name)
            .ok_or_else(|| GameError::UnknownCatalogName(enemy_name.to_string()))?
            .spawn();

        let log = vec![format!("A wild {} appears!", enemy.name())];
        self.encounter = Some(Encounter::new(enemy));
        Ok(log)
    }

    pub fn talk_to_npc(&mut self, npc_name: &str) -> Result<Conversation, GameError> {
        self.ensure_exploring()?;
        quest_engine::talk_to_npc(&mut self.player, npc_name)
    }

    pub fn search_area(&mut self) -> Result<SearchOutcome, GameError> {
        self.ensure_exploring()?;
        Ok(quest_engine::search_area(&mut self.player))
    }

    /// Show the location and roll for an encounter.
    fn enter_location(&mut self) -> Result<Arrival, GameError> {
        let location = self.current_location()?;
        let view = LocationView::of(location);
        let mut log = view.header();

        let mut encounter = None;
        if location.has_enemies() && self.rng.gen::<f64>() < self.config.encounter_chance {
            if let Some(name) = location.enemies.choose(&mut self.rng) {
                log.extend(self.start_combat(name)?);
                encounter = Some(name.to_string());
            }
        }

        Ok(Arrival {
            view,
            encounter,
            log,
            stats: self.stats(),
        })
    }

    fn current_location(&self) -> Result<&'static Location, GameError> {
        world()
            .location(&self.player.location)
            .ok_or_else(|| GameError::UnknownCatalogName(self.player.location.clone()))
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    pub fn equip_item(&mut self, id: ItemId) -> Result<Response, GameError> {
        self.ensure_exploring()?;
        let name = self.player.equip_item(id)?.name.clone();
        Ok(self.response(vec![format!("You equipped the {name}.")]))
    }

    pub fn unequip_item(&mut self, id: ItemId) -> Result<Response, GameError> {
        self.ensure_exploring()?;
        let name = self
            .player
            .find_item(id)
            .map(|i| i.name.clone())
            .ok_or(GameError::ItemNotFound(id))?;

        let line = match self.player.unequip(id) {
            Some(_) => format!("You unequipped the {name}."),
            None => format!("The {name} is not equipped."),
        };
        Ok(self.response(vec![line]))
    }

    /// Drink a potion outside of combat.
    pub fn use_item(&mut self, id: ItemId) -> Result<Response, GameError> {
        self.ensure_exploring()?;
        let line = self.player.drink_potion(id)?;
        Ok(self.response(vec![line]))
    }

    /// Discard an item, taking it off first if it is equipped.
    pub fn drop_item(&mut self, id: ItemId) -> Result<Response, GameError> {
        self.ensure_exploring()?;
        if self.player.find_item(id).is_none() {
            return Err(GameError::ItemNotFound(id));
        }

        self.player.unequip(id);
        let item = self
            .player
            .remove_item(id)
            .ok_or(GameError::ItemNotFound(id))?;
        Ok(self.response(vec![format!("You dropped the {}.", item.name)]))
    }

    // ========================================================================
    // Combat
    // ========================================================================

    pub fn perform_combat_action(
        &mut self,
        action: CombatAction,
        sub_choice: Option<SubAction>,
    ) -> Result<CombatReport, GameError> {
        self.ensure_alive()?;
        let encounter = self.encounter.as_mut().ok_or(GameError::NotInCombat)?;
        let turn = encounter.act(
            &mut self.player,
            action,
            sub_choice,
            &mut self.rng,
            self.config.flee_chance,
        )?;
        self.settle(turn)
    }

    pub fn resolve_subaction(&mut self, choice: SubAction) -> Result<CombatReport, GameError> {
        self.ensure_alive()?;
        let encounter = self.encounter.as_mut().ok_or(GameError::NotInCombat)?;
        let turn = encounter.resolve_subaction(&mut self.player, choice)?;
        self.settle(turn)
    }

    /// Back out of a pending spell or potion choice without spending the turn.
    pub fn cancel_subaction(&mut self) -> Result<CombatReport, GameError> {
        self.ensure_alive()?;
        let encounter = self.encounter.as_mut().ok_or(GameError::NotInCombat)?;
        encounter.cancel_subaction()?;
        Ok(CombatReport {
            log: Vec::new(),
            notices: Vec::new(),
            options: Vec::new(),
            phase: encounter.phase(),
            combat_over: false,
            outcome: None,
            arrival: None,
            stats: self.player.stats(),
        })
    }

    /// Apply the consequences of a finished fight.
    fn settle(&mut self, turn: CombatTurn) -> Result<CombatReport, GameError> {
        let CombatTurn {
            mut log,
            notices,
            options,
            phase,
        } = turn;
        let outcome = match phase {
            CombatPhase::Resolved(outcome) => Some(outcome),
            _ => None,
        };

        let arrival = match outcome {
            Some(CombatOutcome::Victory) => {
                if let Some(encounter) = self.encounter.take() {
                    let enemy = encounter.enemy;
                    tracing::info!(enemy = %enemy.name(), xp = enemy.xp_reward, "enemy defeated");
                    if let Some(level_up) = self.player.gain_xp(enemy.xp_reward) {
                        log.push(level_up.message());
                    }
                    log.extend(quest_engine::check_progress(
                        &mut self.player,
                        Some(enemy.name()),
                    ));
                }
                Some(self.enter_location()?)
            }
            Some(CombatOutcome::Fled) => {
                self.encounter = None;
                let view = self.describe_location()?;
                Some(Arrival {
                    log: view.header(),
                    view,
                    encounter: None,
                    stats: self.stats(),
                })
            }
            Some(CombatOutcome::Defeat) => {
                tracing::info!(player = %self.player.name(), "player defeated");
                self.encounter = None;
                self.over = true;
                None
            }
            None => None,
        };

        Ok(CombatReport {
            log,
            notices,
            options,
            phase,
            combat_over: outcome.is_some(),
            outcome,
            arrival,
            stats: self.stats(),
        })
    }

    // ========================================================================
    // Guards
    // ========================================================================

    fn ensure_alive(&self) -> Result<(), GameError> {
        if self.over {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    fn ensure_exploring(&self) -> Result<(), GameError> {
        self.ensure_alive()?;
        if self.encounter.is_some() {
            Err(GameError::InCombat)
        } else {
            Ok(())
        }
    }

    fn response(&self, log: Vec<String>) -> Response {
        Response {
            log,
            stats: self.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::create_item;

    fn calm_game() -> Game {
        let config = GameConfig::new().with_seed(1).with_encounter_chance(0.0);
        Game::new_game(config).unwrap().0
    }

    #[test]
    fn test_new_game_starts_in_town() {
        let (game, arrival) = Game::new_game(GameConfig::new().with_seed(3)).unwrap();
        assert_eq!(arrival.view.key, "town");
        assert_eq!(arrival.log[0], "--- Eldoria Town ---");
        assert!(arrival.encounter.is_none(), "town has no enemies");
        assert_eq!(game.status(), GameStatus::Exploring);
        assert_eq!(game.player().entity.attack, 25);
        assert_eq!(game.player().entity.defense, 10);
    }

    #[test]
    fn test_invalid_direction_changes_nothing() {
        let mut game = calm_game();
        let err = game.move_player(Direction::East).unwrap_err();
        assert!(matches!(err, GameError::InvalidDirection(_)));
        assert_eq!(game.player().location, "town");
    }

    #[test]
    fn test_certain_encounter_on_entry() {
        let config = GameConfig::new().with_seed(5).with_encounter_chance(1.0);
        let (mut game, _) = Game::new_game(config).unwrap();
        let arrival = game.move_player(Direction::North).unwrap();

        let enemy = arrival.encounter.expect("forest always spawns an enemy");
        assert!(enemy == "Goblin" || enemy == "Wolf");
        assert_eq!(arrival.log.last().unwrap(), &format!("A wild {enemy} appears!"));
        assert!(game.in_combat());
    }

    #[test]
    fn test_exploration_is_blocked_in_combat() {
        let mut game = calm_game();
        game.start_combat("Goblin").unwrap();
        assert!(matches!(game.move_player(Direction::North), Err(GameError::InCombat)));
        assert!(matches!(game.search_area(), Err(GameError::InCombat)));
        assert!(matches!(game.save_game(), Err(GameError::InCombat)));
    }

    #[test]
    fn test_combat_requires_an_encounter() {
        let mut game = calm_game();
        assert!(matches!(
            game.perform_combat_action(CombatAction::Attack, None),
            Err(GameError::NotInCombat)
        ));
    }

    #[test]
    fn test_drop_equipped_weapon_restores_base_attack() {
        let mut game = calm_game();
        let sword = game.player().weapon.as_ref().unwrap().id;
        let response = game.drop_item(sword).unwrap();

        assert_eq!(response.log, vec!["You dropped the Iron Sword.".to_string()]);
        assert!(game.player().weapon.is_none());
        assert_eq!(game.player().entity.attack, 15);
        assert_eq!(game.player().inventory.len(), 2);
    }

    #[test]
    fn test_drop_duplicate_keeps_equipped_instance() {
        let mut game = calm_game();
        let spare = create_item("Iron Sword").unwrap();
        let spare_id = spare.id;
        game.player.add_item(spare);

        game.drop_item(spare_id).unwrap();
        assert!(game.player().weapon.is_some());
        assert_eq!(game.player().entity.attack, 25);
    }

    #[test]
    fn test_inventory_labels() {
        let game = calm_game();
        let labels: Vec<String> = game.open_inventory().iter().map(|e| e.label()).collect();
        assert_eq!(
            labels,
            vec!["Health Potion", "Iron Sword (W)", "Leather Armor (A)"]
        );
    }

    #[test]
    fn test_unequip_and_use() {
        let mut game = calm_game();
        let armor = game.player().armor.as_ref().unwrap().id;
        game.unequip_item(armor).unwrap();
        assert_eq!(game.player().entity.defense, 5);

        let again = game.unequip_item(armor).unwrap();
        assert_eq!(again.log, vec!["The Leather Armor is not equipped.".to_string()]);

        assert!(matches!(game.use_item(armor), Err(GameError::NotUsable(_))));
        let potion = game.player().inventory[0].id;
        let used = game.use_item(potion).unwrap();
        assert_eq!(used.log, vec!["You used a Health Potion and healed for 50 HP.".to_string()]);
        assert_eq!(used.stats.hp, 100);
    }

    #[test]
    fn test_defeat_ends_the_game() {
        let mut game = calm_game();
        game.start_combat("Dragon").unwrap();
        game.player.entity.hp = 1;

        let report = game.perform_combat_action(CombatAction::Attack, None).unwrap();
        assert_eq!(report.outcome, Some(CombatOutcome::Defeat));
        assert!(game.is_over());
        assert!(matches!(game.move_player(Direction::North), Err(GameError::GameOver)));
        assert!(matches!(
            game.perform_combat_action(CombatAction::Attack, None),
            Err(GameError::GameOver)
        ));
    }

    #[test]
    fn test_fled_shows_location_without_reroll() {
        let config = GameConfig::new()
            .with_seed(2)
            .with_encounter_chance(1.0)
            .with_flee_chance(1.0);
        let (mut game, _) = Game::new_game(config).unwrap();
        game.move_player(Direction::North).unwrap();

        let report = game.perform_combat_action(CombatAction::Flee, None).unwrap();
        assert_eq!(report.outcome, Some(CombatOutcome::Fled));
        let arrival = report.arrival.unwrap();
        assert_eq!(arrival.view.key, "forest");
        assert!(arrival.encounter.is_none());
        assert!(!game.in_combat());
    }
}
