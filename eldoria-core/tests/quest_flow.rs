//! Integration tests for NPCs, searching and quest rewards.
//!
//! Run with: `cargo test -p eldoria-core --test quest_flow`

use eldoria_core::testing::{assert_has_item, assert_not_in_combat};
use eldoria_core::{CombatAction, CombatOutcome, Direction, GameError, TestHarness};

// =============================================================================
// TEST 1: Slay the Dragon
// =============================================================================

#[test]
fn test_slay_the_dragon_from_start_to_reward() {
    let mut harness = TestHarness::new();

    let talk = harness.game_mut().talk_to_npc("Old Man").unwrap();
    assert!(talk.new_quest);
    assert_eq!(
        talk.log[0],
        "New quest: Slay the Dragon - Help the Old Man and save the town."
    );
    assert_eq!(talk.log.last().unwrap(), "Current Objective: Find the Old Man's amulet.");

    harness.go(Direction::North);
    let search = harness.game_mut().search_area().unwrap();
    assert!(search.found);
    assert_eq!(search.item_name.as_deref(), Some("Amulet of the Forest"));
    assert_eq!(search.log[0], "You search the area and find the Amulet of the Forest!");
    assert_eq!(search.log[1], "Quest Progress: 'Slay the Dragon'");

    harness.walk(&[Direction::East, Direction::North]);
    assert_eq!(harness.player().location, "boss_room");

    harness.fight("Dragon");
    harness.game_mut().player_mut().entity.attack = 300;
    let report = harness.act(CombatAction::Attack).unwrap();
    assert_eq!(report.outcome, Some(CombatOutcome::Victory));
    assert!(report.log.contains(&"*** Quest Completed: Slay the Dragon ***".to_string()));
    assert!(report
        .log
        .contains(&"You saved the town! The Old Man gives you a Greatsword.".to_string()));

    let quest = &harness.player().quests["Slay the Dragon"];
    assert!(quest.completed);
    assert_eq!(quest.current_stage, quest.stages.len() - 1);
    assert_has_item(&harness, "Greatsword");
    assert_not_in_combat(&harness);
}

#[test]
fn test_dragon_before_amulet_does_not_count() {
    let mut harness = TestHarness::new();
    harness.game_mut().talk_to_npc("Old Man").unwrap();
    harness.teleport("boss_room").fight("Dragon");
    harness.game_mut().player_mut().entity.attack = 300;

    let report = harness.act(CombatAction::Attack).unwrap();
    assert!(!report.log.iter().any(|l| l.starts_with("Quest Progress")));
    assert_eq!(harness.player().quests["Slay the Dragon"].current_stage, 0);
}

// =============================================================================
// TEST 2: The Stolen Spellbook
// =============================================================================

#[test]
fn test_spellbook_reward_adds_castable_fireball() {
    let mut harness = TestHarness::new();
    harness.go(Direction::West);
    harness.game_mut().talk_to_npc("Witch").unwrap();

    harness.walk(&[Direction::North, Direction::East]);
    assert_eq!(harness.player().location, "castle_ruins");
    harness.fight("Cursed Knight");
    harness.game_mut().player_mut().entity.attack = 200;
    harness.act(CombatAction::Attack).unwrap();

    assert!(harness.player().quests["The Stolen Spellbook"].completed);
    let fireball = harness
        .player()
        .spells
        .iter()
        .position(|s| s.name == "Fireball")
        .expect("Fireball learned");

    harness.fight("Goblin");
    let menu = harness.act(CombatAction::Magic).unwrap();
    assert_eq!(menu.options.len(), 2);
    assert_eq!(menu.options[fireball].label, "Fireball (15 MP)");
}

// =============================================================================
// TEST 3: Rejections
// =============================================================================

#[test]
fn test_talking_to_absent_npc() {
    let mut harness = TestHarness::new();
    harness.go(Direction::North);
    assert!(matches!(
        harness.game_mut().talk_to_npc("Old Man"),
        Err(GameError::NpcNotHere(_))
    ));
}

#[test]
fn test_search_is_one_shot() {
    let mut harness = TestHarness::new();
    harness.go(Direction::North);
    assert!(harness.game_mut().search_area().unwrap().found);

    let again = harness.game_mut().search_area().unwrap();
    assert!(!again.found);
    assert_eq!(again.log, ["You find nothing of interest."]);
}

#[test]
fn test_dropping_the_amulet_allows_finding_it_again() {
    let mut harness = TestHarness::new();
    harness.go(Direction::North);
    harness.game_mut().search_area().unwrap();

    let amulet = harness.item_id("Amulet of the Forest").unwrap();
    harness.game_mut().drop_item(amulet).unwrap();
    assert!(harness.game_mut().search_area().unwrap().found);
}
