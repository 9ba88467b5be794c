//! Combat-capable actors.
//!
//! [`Entity`] holds the numbers every fighter shares (hit points, stamina,
//! attack, defense) and the single shared damage formula. The player and
//! enemies both embed one.

/// Shared stat block for the player and enemies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub attack: i32,
    pub defense: i32,
    /// Set by the Defend action, consumed by the next hit.
    pub is_defending: bool,
}

impl Entity {
    pub fn new(name: impl Into<String>, hp: i32, stamina: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.into(),
            hp,
            max_hp: hp,
            stamina,
            max_stamina: stamina,
            attack,
            defense,
            is_defending: false,
        }
    }

    /// Apply a raw attack value and return the damage actually dealt.
    ///
    /// A defending entity halves the raw amount (rounding down) before its
    /// defense is subtracted. The defending flag is spent by any hit, even one
    /// that ends up dealing no damage. Hit points never drop below zero.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let mut amount = amount.max(0);
        if self.is_defending {
            amount /= 2;
        }
        self.is_defending = false;

        let dealt = (amount - self.defense).max(0);
        self.hp = (self.hp - dealt).max(0);
        dealt
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Restore hit points up to the maximum. Returns the amount restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - old
    }

    /// Restore stamina up to the maximum. Returns the amount restored.
    pub fn restore_stamina(&mut self, amount: i32) -> i32 {
        let old = self.stamina;
        self.stamina = (self.stamina + amount.max(0)).min(self.max_stamina);
        self.stamina - old
    }
}

/// A hostile combatant, created fresh for each encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub entity: Entity,
    pub xp_reward: u32,
}

impl Enemy {
    pub fn new(entity: Entity, xp_reward: u32) -> Self {
        Self { entity, xp_reward }
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    pub fn is_alive(&self) -> bool {
        self.entity.is_alive()
    }
}
