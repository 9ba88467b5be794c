//! Quest progression driven by world and combat events.
//!
//! NPC conversations hand out quests, victories and searches advance them,
//! and completion looks up the concrete grants in the world's reward table.

use crate::error::GameError;
use crate::items::create_item;
use crate::player::{Player, StatSummary};
use crate::quest::StageGoal;
use crate::spells::create_spell;
use crate::world::world;

/// Result of talking to an NPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub npc: String,
    pub dialogue: String,
    pub objective: String,
    /// True when this conversation handed out the quest.
    pub new_quest: bool,
    pub log: Vec<String>,
    pub stats: StatSummary,
}

/// Result of searching the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: bool,
    pub item_name: Option<String>,
    pub log: Vec<String>,
    pub stats: StatSummary,
}

/// Talk to an NPC standing at the player's location.
///
/// The NPC's quest is started on first contact. Dialogue follows the
/// quest's current stage.
pub fn talk_to_npc(player: &mut Player, npc_name: &str) -> Result<Conversation, GameError> {
    let here = world()
        .location(&player.location)
        .and_then(|l| l.npc)
        .filter(|npc| *npc == npc_name);
    let npc = here
        .and_then(|name| world().npc(name))
        .ok_or_else(|| GameError::NpcNotHere(npc_name.to_string()))?;

    let mut log = Vec::new();
    let quest_name = npc.quest.name.clone();
    let new_quest = !player.quests.contains_key(&quest_name);
    if new_quest {
        log.push(format!(
            "New quest: {} - {}",
            npc.quest.name, npc.quest.description
        ));
        tracing::info!(quest = %quest_name, "quest started");
        player.quests.insert(quest_name.clone(), npc.quest.clone());
    }

    let quest = player
        .quests
        .get(&quest_name)
        .ok_or_else(|| GameError::UnknownCatalogName(quest_name.clone()))?;
    let dialogue = npc.line_for_stage(quest.current_stage).to_string();
    let objective = quest
        .current_stage_info()
        .map(|s| s.target_description.clone())
        .unwrap_or_default();

    log.push(format!("{}: {dialogue}", npc.name));
    log.push(format!("Current Objective: {objective}"));

    Ok(Conversation {
        npc: npc.name.to_string(),
        dialogue,
        objective,
        new_quest,
        log,
        stats: player.stats(),
    })
}

/// Advance every active quest whose current stage is satisfied.
///
/// `defeated` names the enemy just beaten, if any. Each quest moves at most
/// one stage per call. Returns the log lines produced.
pub fn check_progress(player: &mut Player, defeated: Option<&str>) -> Vec<String> {
    let mut log = Vec::new();
    let names: Vec<String> = player.quests.keys().cloned().collect();

    for name in names {
        let Some(quest) = player.quests.get(&name) else {
            continue;
        };
        if quest.completed {
            continue;
        }

        let satisfied = match quest.current_stage_info().map(|s| &s.goal) {
            Some(StageGoal::KillEnemy { enemy }) => defeated == Some(enemy.as_str()),
            Some(StageGoal::FindItem { item }) => player.has_item_named(item),
            None => false,
        };
        if !satisfied {
            continue;
        }

        let Some(quest) = player.quests.get_mut(&name) else {
            continue;
        };
        log.push(format!("Quest Progress: '{}'", quest.name));
        if quest.advance_stage() {
            log.push(format!("*** Quest Completed: {} ***", quest.name));
            log.push(quest.reward.clone());
            tracing::info!(quest = %name, "quest completed");
            grant_reward(player, &name);
        } else {
            tracing::debug!(quest = %name, stage = quest.current_stage, "quest advanced");
        }
    }

    log
}

/// Hand out the catalog grants for a completed quest.
fn grant_reward(player: &mut Player, quest: &str) {
    let Some(reward) = world().reward(quest) else {
        return;
    };

    for name in &reward.items {
        match create_item(name) {
            Some(item) => player.add_item(item),
            None => tracing::warn!(item = %name, "quest reward names an unknown item"),
        }
    }
    for name in &reward.spells {
        match create_spell(name) {
            Some(spell) => player.learn_spell(spell),
            None => tracing::warn!(spell = %name, "quest reward names an unknown spell"),
        }
    }
}

/// Search the player's location for its hidden item.
///
/// Each secret can be found once: while the player carries the item,
/// searching again turns up nothing.
pub fn search_area(player: &mut Player) -> SearchOutcome {
    let secret = world()
        .location(&player.location)
        .and_then(|l| l.secret.as_ref());

    let item = secret
        .filter(|s| !player.has_item_named(s.item))
        .and_then(|s| create_item(s.item));

    match item {
        Some(item) => {
            let name = item.name.clone();
            player.add_item(item);
            let mut log = vec![format!("You search the area and find the {name}!")];
            log.extend(check_progress(player, None));
            SearchOutcome {
                found: true,
                item_name: Some(name),
                log,
                stats: player.stats(),
            }
        }
        None => SearchOutcome {
            found: false,
            item_name: None,
            log: vec!["You find nothing of interest.".to_string()],
            stats: player.stats(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero_at(location: &str) -> Player {
        let mut hero = Player::starting_character("Hero").unwrap();
        hero.location = location.to_string();
        hero
    }

    #[test]
    fn test_talking_starts_quest_once() {
        let mut hero = hero_at("town");
        let first = talk_to_npc(&mut hero, "Old Man").unwrap();
        assert!(first.new_quest);
        assert_eq!(first.objective, "Find the Old Man's amulet.");
        assert!(first.dialogue.starts_with("Welcome, traveler."));

        let second = talk_to_npc(&mut hero, "Old Man").unwrap();
        assert!(!second.new_quest);
        assert_eq!(hero.quests.len(), 1);
    }

    #[test]
    fn test_npc_must_be_present() {
        let mut hero = hero_at("town");
        assert!(matches!(
            talk_to_npc(&mut hero, "Witch"),
            Err(GameError::NpcNotHere(_))
        ));
        assert!(hero.quests.is_empty());
    }

    #[test]
    fn test_two_stage_quest_progression() {
        let mut hero = hero_at("town");
        talk_to_npc(&mut hero, "Old Man").unwrap();

        hero.location = "forest".to_string();
        let found = search_area(&mut hero);
        assert!(found.found);
        assert!(found.log.contains(&"Quest Progress: 'Slay the Dragon'".to_string()));

        let quest = &hero.quests["Slay the Dragon"];
        assert_eq!(quest.current_stage, 1);
        assert!(!quest.completed);

        // Wrong enemy does nothing.
        assert!(check_progress(&mut hero, Some("Goblin")).is_empty());

        let log = check_progress(&mut hero, Some("Dragon"));
        let quest = &hero.quests["Slay the Dragon"];
        assert!(quest.completed);
        assert_eq!(quest.current_stage, 1);
        assert!(log.contains(&"*** Quest Completed: Slay the Dragon ***".to_string()));
        assert!(hero.has_item_named("Greatsword"));
    }

    #[test]
    fn test_dialogue_follows_stage() {
        let mut hero = hero_at("town");
        talk_to_npc(&mut hero, "Old Man").unwrap();
        hero.add_item(create_item("Amulet of the Forest").unwrap());
        check_progress(&mut hero, None);

        let talk = talk_to_npc(&mut hero, "Old Man").unwrap();
        assert!(talk.dialogue.starts_with("Thank you for finding my amulet!"));
        assert_eq!(talk.objective, "Slay the Dragon.");
    }

    #[test]
    fn test_spellbook_quest_teaches_fireball() {
        let mut hero = hero_at("swamp");
        talk_to_npc(&mut hero, "Witch").unwrap();
        check_progress(&mut hero, Some("Cursed Knight"));

        assert!(hero.quests["The Stolen Spellbook"].completed);
        assert!(hero.spells.iter().any(|s| s.name == "Fireball"));

        // Completed quests are never revisited.
        check_progress(&mut hero, Some("Cursed Knight"));
        assert_eq!(hero.spells.iter().filter(|s| s.name == "Fireball").count(), 1);
    }

    #[test]
    fn test_secret_is_one_shot() {
        let mut hero = hero_at("forest");
        assert!(search_area(&mut hero).found);
        let again = search_area(&mut hero);
        assert!(!again.found);
        assert_eq!(again.log, vec!["You find nothing of interest.".to_string()]);

        let mut elsewhere = hero_at("cave");
        assert!(!search_area(&mut elsewhere).found);
    }
}
