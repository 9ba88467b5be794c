//! Multi-stage quests.
//!
//! A quest is an ordered list of stages. Each stage is either "defeat this
//! enemy" or "carry this item"; the quest engine advances at most one stage
//! per progress check.

use serde::{Deserialize, Serialize};

/// The condition a stage waits for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageGoal {
    KillEnemy { enemy: String },
    FindItem { item: String },
}

/// One objective within a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStage {
    #[serde(flatten)]
    pub goal: StageGoal,
    /// World key where the objective can be completed.
    pub location: String,
    /// Objective text shown to the player.
    pub target_description: String,
}

impl QuestStage {
    pub fn kill(
        enemy: impl Into<String>,
        location: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            goal: StageGoal::KillEnemy {
                enemy: enemy.into(),
            },
            location: location.into(),
            target_description: text.into(),
        }
    }

    pub fn find(
        item: impl Into<String>,
        location: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            goal: StageGoal::FindItem { item: item.into() },
            location: location.into(),
            target_description: text.into(),
        }
    }
}

/// A quest held by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    pub description: String,
    pub stages: Vec<QuestStage>,
    pub current_stage: usize,
    pub reward: String,
    pub completed: bool,
}

impl Quest {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        stages: Vec<QuestStage>,
        reward: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            stages,
            current_stage: 0,
            reward: reward.into(),
            completed: false,
        }
    }

    pub fn current_stage_info(&self) -> Option<&QuestStage> {
        self.stages.get(self.current_stage)
    }

    /// Move to the next stage. Returns true when this completes the quest.
    ///
    /// Completing leaves `current_stage` on the last stage.
    pub fn advance_stage(&mut self) -> bool {
        if self.completed {
            return false;
        }
        if self.current_stage + 1 < self.stages.len() {
            self.current_stage += 1;
            false
        } else {
            self.completed = true;
            true
        }
    }

    /// Whether `current_stage` points at a real stage.
    pub fn is_consistent(&self) -> bool {
        self.current_stage < self.stages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stage_quest() -> Quest {
        Quest::new(
            "Slay the Dragon",
            "Help the Old Man and save the town.",
            vec![
                QuestStage::find("Amulet of the Forest", "forest", "Find the Old Man's amulet."),
                QuestStage::kill("Dragon", "boss_room", "Slay the Dragon."),
            ],
            "You saved the town!",
        )
    }

    #[test]
    fn test_advance_through_stages() {
        let mut quest = two_stage_quest();
        assert!(!quest.advance_stage());
        assert_eq!(quest.current_stage, 1);
        assert!(!quest.completed);

        assert!(quest.advance_stage());
        assert!(quest.completed);
        assert_eq!(quest.current_stage, 1);
    }

    #[test]
    fn test_completed_quest_does_not_advance() {
        let mut quest = two_stage_quest();
        quest.advance_stage();
        quest.advance_stage();
        assert!(!quest.advance_stage());
        assert_eq!(quest.current_stage, 1);
    }

    #[test]
    fn test_stage_json_shape() {
        let stage = QuestStage::kill("Cursed Knight", "castle_ruins", "Defeat the Cursed Knight.");
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["type"], "kill_enemy");
        assert_eq!(json["enemy"], "Cursed Knight");
        assert_eq!(json["location"], "castle_ruins");
    }

    #[test]
    fn test_inconsistent_stage_index() {
        let mut quest = two_stage_quest();
        assert!(quest.is_consistent());
        quest.current_stage = 5;
        assert!(!quest.is_consistent());
        assert!(quest.current_stage_info().is_none());
    }
}
