//! Hero roster: who can take part and what their characteristics are.

use std::collections::HashMap;

use montage_core::{ActorId, Characteristic, Hero};
use serde::{Deserialize, Serialize};

/// Source of hero data for auto-rolls and test setup.
pub trait Roster: Send + Sync {
    /// Heroes available for a new test.
    fn heroes(&self) -> Vec<Hero>;
    /// A hero's characteristic score; 0 if unknown.
    fn characteristic(&self, actor: &ActorId, characteristic: Characteristic) -> i32;
}

/// A fixed roster, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoster {
    #[serde(default)]
    heroes: Vec<Hero>,
    #[serde(default)]
    characteristics: HashMap<ActorId, HashMap<Characteristic, i32>>,
}

impl StaticRoster {
    /// An empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hero.
    pub fn with_hero(mut self, hero: Hero) -> Self {
        self.heroes.push(hero);
        self
    }

    /// Set a characteristic score.
    pub fn with_characteristic(
        mut self,
        actor: impl Into<ActorId>,
        characteristic: Characteristic,
        value: i32,
    ) -> Self {
        self.set_characteristic(actor.into(), characteristic, value);
        self
    }

    /// Add or replace a hero.
    pub fn upsert_hero(&mut self, hero: Hero) {
        match self.heroes.iter_mut().find(|h| h.actor_id == hero.actor_id) {
            Some(existing) => *existing = hero,
            None => self.heroes.push(hero),
        }
    }

    /// Set a characteristic score.
    pub fn set_characteristic(&mut self, actor: ActorId, characteristic: Characteristic, value: i32) {
        self.characteristics
            .entry(actor)
            .or_default()
            .insert(characteristic, value);
    }
}

impl Roster for StaticRoster {
    fn heroes(&self) -> Vec<Hero> {
        self.heroes.clone()
    }

    fn characteristic(&self, actor: &ActorId, characteristic: Characteristic) -> i32 {
        self.characteristics
            .get(actor)
            .and_then(|scores| scores.get(&characteristic))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_default_to_zero() {
        let roster = StaticRoster::new()
            .with_hero(Hero::new("hero-1", "Aria"))
            .with_characteristic("hero-1", Characteristic::Agility, 2);
        let id = ActorId::from("hero-1");
        assert_eq!(roster.characteristic(&id, Characteristic::Agility), 2);
        assert_eq!(roster.characteristic(&id, Characteristic::Might), 0);
        assert_eq!(roster.characteristic(&"ghost".into(), Characteristic::Agility), 0);
    }

    #[test]
    fn upsert_replaces_by_actor() {
        let mut roster = StaticRoster::new().with_hero(Hero::new("hero-1", "Aria"));
        roster.upsert_hero(Hero::new("hero-1", "Aria the Bold"));
        roster.upsert_hero(Hero::new("hero-2", "Bram"));
        let names: Vec<_> = roster.heroes().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Aria the Bold", "Bram"]);
    }

    #[test]
    fn roster_json_round_trip() {
        let roster = StaticRoster::new()
            .with_hero(Hero::new("hero-1", "Aria"))
            .with_characteristic("hero-1", Characteristic::Reason, -1);
        let json = serde_json::to_string(&roster).unwrap();
        assert!(json.contains("\"reason\":-1"));
        let back: StaticRoster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roster);
    }
}
