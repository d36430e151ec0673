//! The content catalog: packages, modes, generals, card prototypes and
//! registered skills.
//!
//! There is no global registry. An embedder builds a `Catalog` at
//! startup, packages and modes register into it, and the catalog is
//! passed by reference into each match. Card ids, general ids and skill
//! ids are assigned here, at registration time.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::card::Suit;
use super::face::CardFace;
use crate::events::EventHandler;
use crate::skills::{SkillDef, SkillEntry, SkillId};

/// General identifier, assigned by the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneralId(pub u32);

impl GeneralId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// A registered general.
#[derive(Clone)]
pub struct General {
    pub id: GeneralId,
    pub name: String,
    pub kingdom: String,
    pub max_hp: i32,
    pub gender: Gender,
    pub lord: bool,
    pub skills: Vec<SkillId>,
}

/// An instantiable card: its face plus printed suit and number. One
/// arena card is cloned from each prototype at match start.
#[derive(Clone)]
pub struct CardPrototype {
    pub id: u32,
    pub suit: Suit,
    pub number: i32,
    pub face: Arc<dyn CardFace>,
}

/// A general being defined by a package, before ids are assigned.
pub struct GeneralDef {
    name: String,
    kingdom: String,
    max_hp: i32,
    gender: Gender,
    lord: bool,
    skills: Vec<SkillDef>,
}

impl GeneralDef {
    #[must_use]
    pub fn new(name: impl Into<String>, kingdom: impl Into<String>, max_hp: i32) -> Self {
        Self {
            name: name.into(),
            kingdom: kingdom.into(),
            max_hp,
            gender: Gender::Male,
            lord: false,
            skills: Vec::new(),
        }
    }

    #[must_use]
    pub fn female(mut self) -> Self {
        self.gender = Gender::Female;
        self
    }

    #[must_use]
    pub fn lord(mut self) -> Self {
        self.lord = true;
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: SkillDef) -> Self {
        self.skills.push(skill);
        self
    }
}

/// A package under construction: card instances and generals.
pub struct Package {
    name: String,
    cards: Vec<(Arc<dyn CardFace>, Suit, i32)>,
    generals: Vec<GeneralDef>,
}

impl Package {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
            generals: Vec::new(),
        }
    }

    /// Add one printed card instance.
    pub fn add_card(&mut self, face: Arc<dyn CardFace>, suit: Suit, number: i32) {
        self.cards.push((face, suit, number));
    }

    pub fn add_general(&mut self, general: GeneralDef) {
        self.generals.push(general);
    }
}

/// A registered game mode: the rule handler that drives turns plus the
/// packages it draws content from.
#[derive(Clone)]
pub struct GameMode {
    pub name: String,
    pub rule: Arc<dyn EventHandler>,
    pub packages: Vec<String>,
}

impl GameMode {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        rule: Arc<dyn EventHandler>,
        packages: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rule,
            packages,
        }
    }
}

/// A package after registration: prototypes with assigned ids.
pub struct RegisteredPackage {
    pub name: String,
    pub cards: Vec<CardPrototype>,
    pub generals: Vec<GeneralId>,
}

/// All registered content, built once at startup.
#[derive(Default)]
pub struct Catalog {
    modes: FxHashMap<String, GameMode>,
    packages: FxHashMap<String, RegisteredPackage>,
    generals: FxHashMap<GeneralId, General>,
    skills: FxHashMap<SkillId, SkillEntry>,
    skill_names: FxHashMap<String, SkillId>,
    next_card_id: u32,
    next_general_id: u32,
    next_skill_id: u32,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_card_id: 1,
            next_general_id: 1,
            next_skill_id: 1,
            ..Self::default()
        }
    }

    /// Register a game mode.
    ///
    /// Panics if the name is taken.
    pub fn add_mode(&mut self, mode: GameMode) {
        let name = mode.name.clone();
        let previous = self.modes.insert(name.clone(), mode);
        assert!(previous.is_none(), "mode {:?} registered twice", name);
    }

    #[must_use]
    pub fn mode(&self, name: &str) -> Option<&GameMode> {
        self.modes.get(name)
    }

    /// Register a package, assigning card, general and skill ids.
    ///
    /// Panics if the name is taken.
    pub fn add_package(&mut self, package: Package) {
        assert!(
            !self.packages.contains_key(&package.name),
            "package {:?} registered twice",
            package.name
        );

        let mut cards = Vec::with_capacity(package.cards.len());
        for (face, suit, number) in package.cards {
            let id = self.next_card_id;
            self.next_card_id += 1;
            cards.push(CardPrototype {
                id,
                suit,
                number,
                face,
            });
        }

        let mut generals = Vec::with_capacity(package.generals.len());
        for def in package.generals {
            let id = GeneralId::new(self.next_general_id);
            self.next_general_id += 1;

            let skills = def
                .skills
                .into_iter()
                .map(|skill| self.add_skill(skill))
                .collect();

            self.generals.insert(
                id,
                General {
                    id,
                    name: def.name,
                    kingdom: def.kingdom,
                    max_hp: def.max_hp,
                    gender: def.gender,
                    lord: def.lord,
                    skills,
                },
            );
            generals.push(id);
        }

        self.packages.insert(
            package.name.clone(),
            RegisteredPackage {
                name: package.name,
                cards,
                generals,
            },
        );
    }

    /// Register a standalone skill (acquired skills, test skills).
    pub fn add_skill(&mut self, def: SkillDef) -> SkillId {
        if let Some(&existing) = self.skill_names.get(def.name()) {
            return existing;
        }
        let id = SkillId::new(self.next_skill_id);
        self.next_skill_id += 1;
        self.skill_names.insert(def.name().to_string(), id);
        self.skills.insert(id, SkillEntry::new(id, def));
        id
    }

    #[must_use]
    pub fn package(&self, name: &str) -> Option<&RegisteredPackage> {
        self.packages.get(name)
    }

    /// The packages a mode draws from, in declaration order.
    #[must_use]
    pub fn packages_for_mode(&self, mode: &str) -> Vec<&RegisteredPackage> {
        let Some(mode) = self.modes.get(mode) else {
            return Vec::new();
        };
        mode.packages
            .iter()
            .filter_map(|name| self.packages.get(name))
            .collect()
    }

    #[must_use]
    pub fn general(&self, id: GeneralId) -> Option<&General> {
        self.generals.get(&id)
    }

    /// All generals available to a mode.
    #[must_use]
    pub fn generals_for_mode(&self, mode: &str) -> Vec<GeneralId> {
        self.packages_for_mode(mode)
            .iter()
            .flat_map(|package| package.generals.iter().copied())
            .collect()
    }

    #[must_use]
    pub fn skill(&self, id: SkillId) -> Option<&SkillEntry> {
        self.skills.get(&id)
    }

    #[must_use]
    pub fn skill_by_name(&self, name: &str) -> Option<&SkillEntry> {
        self.skill_names.get(name).and_then(|id| self.skills.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::face::tests_support::plain_face;
    use crate::core::{GameResult, PlayerId};
    use crate::events::{EventData, EventMap, EventType};
    use crate::game::GameLogic;
    use crate::skills::{Skill, TriggerSkill};

    struct NoopSkill;

    impl Skill for NoopSkill {
        fn name(&self) -> &str {
            "noop"
        }
    }

    impl TriggerSkill for NoopSkill {
        fn events(&self) -> &[EventType] {
            &[EventType::TurnStart]
        }

        fn triggerable(
            &self,
            _logic: &GameLogic,
            _event: EventType,
            _target: Option<PlayerId>,
            _data: &EventData,
        ) -> EventMap {
            EventMap::new()
        }

        fn effect(
            &self,
            _logic: &mut GameLogic,
            _event: EventType,
            _target: Option<PlayerId>,
            _data: &mut EventData,
            _invoker: PlayerId,
        ) -> GameResult<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_card_ids_assigned_sequentially() {
        let mut catalog = Catalog::new();

        let mut package = Package::new("test");
        package.add_card(plain_face("slash"), Suit::Spade, 7);
        package.add_card(plain_face("slash"), Suit::Heart, 10);
        catalog.add_package(package);

        let registered = catalog.package("test").unwrap();
        assert_eq!(registered.cards.len(), 2);
        assert_eq!(registered.cards[0].id, 1);
        assert_eq!(registered.cards[1].id, 2);
    }

    #[test]
    fn test_generals_and_skills() {
        let mut catalog = Catalog::new();

        let mut package = Package::new("test");
        package.add_general(
            GeneralDef::new("caocao", "wei", 4)
                .lord()
                .with_skill(SkillDef::Trigger(std::sync::Arc::new(NoopSkill))),
        );
        catalog.add_package(package);

        let generals = catalog.generals_for_mode("none");
        assert!(generals.is_empty()); // no mode registered

        let registered = catalog.package("test").unwrap();
        assert_eq!(registered.generals.len(), 1);

        let general = catalog.general(registered.generals[0]).unwrap();
        assert_eq!(general.name, "caocao");
        assert!(general.lord);
        assert_eq!(general.skills.len(), 1);

        let entry = catalog.skill(general.skills[0]).unwrap();
        assert_eq!(entry.name(), "noop");
        assert!(entry.handler.is_some());
    }

    #[test]
    fn test_skill_registration_dedupes_by_name() {
        let mut catalog = Catalog::new();
        let a = catalog.add_skill(SkillDef::Trigger(std::sync::Arc::new(NoopSkill)));
        let b = catalog.add_skill(SkillDef::Trigger(std::sync::Arc::new(NoopSkill)));
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_package_panics() {
        let mut catalog = Catalog::new();
        catalog.add_package(Package::new("test"));
        catalog.add_package(Package::new("test"));
    }
}
