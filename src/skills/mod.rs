//! Skill variants.
//!
//! Skills come in three behavioral families, modeled as traits behind a
//! tagged `SkillDef`:
//!
//! - **Trigger** skills are event handlers; attaching one to a player
//!   registers it with the dispatcher (once, however many players carry
//!   it). `StatusSkill` and `MasochismSkill` are specializations.
//! - **ViewAs** skills convert a selection of real cards into a
//!   synthesized virtual card (*convert*), or execute their own effect
//!   on chosen targets without producing a card (*proactive*).
//! - **CardMod** skills are pure functions a card's feasibility checks
//!   sum across the user's skills: extra distance, extra targets, extra
//!   uses per turn.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::CardHandle;
use crate::core::{GameResult, PlayerId};
use crate::events::{EventData, EventHandler, EventMap, EventType};
use crate::game::structs::DamageStruct;
use crate::game::GameLogic;

/// Skill identifier, assigned by the catalog at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillId(pub u32);

impl SkillId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Skill({})", self.0)
    }
}

/// The behavioral family of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    Trigger,
    ViewAs,
    CardMod,
}

/// How freely a skill invokes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    NotFrequent,
    Frequent,
    /// Cannot be declined.
    Compulsory,
    /// Once per match.
    Limited,
    /// Once per match, with a wake condition.
    Wake,
}

/// Common surface of every skill.
pub trait Skill: Send + Sync {
    fn name(&self) -> &str;

    fn frequency(&self) -> Frequency {
        Frequency::NotFrequent
    }
}

// === Trigger skills ===

/// A skill that participates in event dispatch.
///
/// The default `triggerable` nominates the event's target when that
/// player is alive and carries this skill; the default `cost` accepts.
pub trait TriggerSkill: Skill {
    fn events(&self) -> &[EventType];

    /// Trigger skills outrank the game rule by default.
    fn priority(&self, _event: EventType) -> i32 {
        1
    }

    fn triggerable(
        &self,
        logic: &GameLogic,
        _event: EventType,
        target: Option<PlayerId>,
        _data: &EventData,
    ) -> EventMap {
        match target {
            Some(who)
                if logic.player(who).is_alive() && logic.player_has_skill_named(who, self.name()) =>
            {
                EventMap::single(who)
            }
            _ => EventMap::new(),
        }
    }

    fn cost(
        &self,
        _logic: &mut GameLogic,
        _event: EventType,
        _target: Option<PlayerId>,
        _data: &mut EventData,
        _invoker: PlayerId,
    ) -> GameResult<bool> {
        Ok(true)
    }

    fn effect(
        &self,
        logic: &mut GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        data: &mut EventData,
        invoker: PlayerId,
    ) -> GameResult<bool>;
}

/// Adapts a `TriggerSkill` to the dispatcher's handler contract.
pub struct TriggerSkillHandler {
    skill: Arc<dyn TriggerSkill>,
}

impl TriggerSkillHandler {
    #[must_use]
    pub fn new(skill: Arc<dyn TriggerSkill>) -> Self {
        Self { skill }
    }
}

impl EventHandler for TriggerSkillHandler {
    fn name(&self) -> &str {
        self.skill.name()
    }

    fn events(&self) -> &[EventType] {
        self.skill.events()
    }

    fn priority(&self, event: EventType) -> i32 {
        self.skill.priority(event)
    }

    fn is_compulsory(&self) -> bool {
        matches!(
            self.skill.frequency(),
            Frequency::Compulsory | Frequency::Wake
        )
    }

    fn triggerable(
        &self,
        logic: &GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        data: &EventData,
    ) -> EventMap {
        self.skill.triggerable(logic, event, target, data)
    }

    fn on_cost(
        &self,
        logic: &mut GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        data: &mut EventData,
        invoker: PlayerId,
    ) -> GameResult<bool> {
        self.skill.cost(logic, event, target, data, invoker)
    }

    fn effect(
        &self,
        logic: &mut GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        data: &mut EventData,
        invoker: PlayerId,
    ) -> GameResult<bool> {
        let broken = self.skill.effect(logic, event, target, data, invoker)?;
        logic.record_skill_invocation(invoker, self.skill.name());
        Ok(broken)
    }
}

// === Masochism skills ===

/// A trigger skill specialized on `Damaged`: `trigger_count` says how
/// many times it may invoke for one damage, `on_damaged` is the effect.
pub trait MasochismSkill: Skill {
    fn trigger_count(&self, logic: &GameLogic, target: PlayerId, damage: &DamageStruct) -> u32;

    fn on_damaged(
        &self,
        logic: &mut GameLogic,
        target: PlayerId,
        damage: &mut DamageStruct,
    ) -> GameResult<bool>;
}

/// Adapts a `MasochismSkill` into a `TriggerSkill`.
pub struct Masochism<T: MasochismSkill>(pub T);

impl<T: MasochismSkill> Skill for Masochism<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn frequency(&self) -> Frequency {
        self.0.frequency()
    }
}

impl<T: MasochismSkill> TriggerSkill for Masochism<T> {
    fn events(&self) -> &[EventType] {
        &[EventType::Damaged]
    }

    fn triggerable(
        &self,
        logic: &GameLogic,
        _event: EventType,
        target: Option<PlayerId>,
        data: &EventData,
    ) -> EventMap {
        let Some(who) = target else {
            return EventMap::new();
        };
        if !logic.player(who).is_alive() || !logic.player_has_skill_named(who, self.name()) {
            return EventMap::new();
        }
        let Some(damage) = data.try_damage() else {
            return EventMap::new();
        };
        EventMap::repeated(who, self.0.trigger_count(logic, who, damage))
    }

    fn effect(
        &self,
        logic: &mut GameLogic,
        _event: EventType,
        target: Option<PlayerId>,
        data: &mut EventData,
        _invoker: PlayerId,
    ) -> GameResult<bool> {
        let who = target.expect("masochism skill fired without a target");
        self.0.on_damaged(logic, who, data.damage_mut())
    }
}

// === Status skills ===

/// A trigger skill that maintains per-player validity of some state:
/// `validate` applies it, `invalidate` removes it.
pub trait StatusSkill: Skill {
    fn validate(&self, logic: &mut GameLogic, target: PlayerId);

    fn invalidate(&self, logic: &mut GameLogic, target: PlayerId);

    fn is_valid(&self, _logic: &GameLogic, _target: PlayerId) -> bool {
        true
    }
}

/// Adapts a `StatusSkill` into a `TriggerSkill` listening on skill
/// lifecycle events.
pub struct Status<T: StatusSkill>(pub T);

impl<T: StatusSkill> Skill for Status<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn frequency(&self) -> Frequency {
        Frequency::Compulsory
    }
}

impl<T: StatusSkill> TriggerSkill for Status<T> {
    fn events(&self) -> &[EventType] {
        &[EventType::SkillAdded, EventType::SkillRemoved]
    }

    fn triggerable(
        &self,
        logic: &GameLogic,
        _event: EventType,
        target: Option<PlayerId>,
        data: &EventData,
    ) -> EventMap {
        let Some(who) = target else {
            return EventMap::new();
        };
        let change = data.skill_change();
        if logic.skill_name(change.skill) == Some(self.name()) {
            EventMap::single(who)
        } else {
            EventMap::new()
        }
    }

    fn effect(
        &self,
        logic: &mut GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        _data: &mut EventData,
        _invoker: PlayerId,
    ) -> GameResult<bool> {
        let who = target.expect("status skill fired without a target");
        match event {
            EventType::SkillAdded if self.0.is_valid(logic, who) => self.0.validate(logic, who),
            EventType::SkillAdded | EventType::SkillRemoved => self.0.invalidate(logic, who),
            _ => {}
        }
        Ok(false)
    }
}

// === ViewAs skills ===

/// Converts selected real cards into a synthesized virtual card.
pub trait ViewAsSkill: Skill {
    /// Whether the skill applies; an empty pattern means the play phase.
    fn is_available(&self, _logic: &GameLogic, _player: PlayerId, pattern: &str) -> bool {
        pattern.is_empty()
    }

    /// Whether `card` may join the current selection.
    fn view_filter(
        &self,
        logic: &GameLogic,
        selected: &[CardHandle],
        card: CardHandle,
        player: PlayerId,
        pattern: &str,
    ) -> bool;

    /// Synthesize the virtual card. `None` if the selection is not
    /// viewable.
    fn view_as(
        &self,
        logic: &mut GameLogic,
        cards: &[CardHandle],
        player: PlayerId,
    ) -> Option<CardHandle>;

    /// Whether a full selection is acceptable.
    fn is_valid(
        &self,
        logic: &GameLogic,
        cards: &[CardHandle],
        player: PlayerId,
        pattern: &str,
    ) -> bool {
        let mut selected = Vec::new();
        for &card in cards {
            if !self.view_filter(logic, &selected, card, player, pattern) {
                return false;
            }
            selected.push(card);
        }
        true
    }
}

/// Single-card view-as conversions.
pub trait OneCardViewAs: Skill {
    fn is_available(&self, _logic: &GameLogic, _player: PlayerId, pattern: &str) -> bool {
        pattern.is_empty()
    }

    /// Whether this single card can be converted.
    fn filter(&self, logic: &GameLogic, card: CardHandle, player: PlayerId, pattern: &str) -> bool;

    /// Convert the card.
    fn convert(
        &self,
        logic: &mut GameLogic,
        card: CardHandle,
        player: PlayerId,
    ) -> Option<CardHandle>;
}

/// Adapts a `OneCardViewAs` into a `ViewAsSkill`.
pub struct OneCard<T: OneCardViewAs>(pub T);

impl<T: OneCardViewAs> Skill for OneCard<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn frequency(&self) -> Frequency {
        self.0.frequency()
    }
}

impl<T: OneCardViewAs> ViewAsSkill for OneCard<T> {
    fn is_available(&self, logic: &GameLogic, player: PlayerId, pattern: &str) -> bool {
        self.0.is_available(logic, player, pattern)
    }

    fn view_filter(
        &self,
        logic: &GameLogic,
        selected: &[CardHandle],
        card: CardHandle,
        player: PlayerId,
        pattern: &str,
    ) -> bool {
        selected.is_empty() && self.0.filter(logic, card, player, pattern)
    }

    fn view_as(
        &self,
        logic: &mut GameLogic,
        cards: &[CardHandle],
        player: PlayerId,
    ) -> Option<CardHandle> {
        match cards {
            [card] => self.0.convert(logic, *card, player),
            _ => None,
        }
    }
}

// === Proactive skills ===

/// A view-as skill that applies its own effect to chosen targets
/// instead of producing a card.
pub trait ProactiveSkill: Skill {
    /// Whether the skill applies; an empty pattern means the play phase.
    fn is_available(&self, _logic: &GameLogic, _player: PlayerId, pattern: &str) -> bool {
        pattern.is_empty()
    }

    fn card_feasible(&self, _logic: &GameLogic, selected: &[CardHandle], _source: PlayerId) -> bool {
        let _ = selected;
        true
    }

    fn card_filter(
        &self,
        _logic: &GameLogic,
        _selected: &[CardHandle],
        _card: CardHandle,
        _source: PlayerId,
        _pattern: &str,
    ) -> bool {
        false
    }

    fn player_feasible(&self, _logic: &GameLogic, _selected: &[PlayerId], _source: PlayerId) -> bool {
        true
    }

    fn player_filter(
        &self,
        _logic: &GameLogic,
        _selected: &[PlayerId],
        _to_select: PlayerId,
        _source: PlayerId,
    ) -> bool {
        false
    }

    /// Whether a full card selection is acceptable.
    fn cards_valid(
        &self,
        logic: &GameLogic,
        cards: &[CardHandle],
        source: PlayerId,
        pattern: &str,
    ) -> bool {
        let mut selected = Vec::new();
        for &card in cards {
            if !self.card_filter(logic, &selected, card, source, pattern) {
                return false;
            }
            selected.push(card);
        }
        self.card_feasible(logic, &selected, source)
    }

    /// Whether a full target selection is acceptable.
    fn players_valid(&self, logic: &GameLogic, targets: &[PlayerId], source: PlayerId) -> bool {
        let mut selected = Vec::new();
        for &target in targets {
            if !self.player_filter(logic, &selected, target, source) {
                return false;
            }
            selected.push(target);
        }
        self.player_feasible(logic, &selected, source)
    }

    fn cost(
        &self,
        _logic: &mut GameLogic,
        _from: PlayerId,
        _to: &[PlayerId],
        _cards: &[CardHandle],
    ) -> GameResult<bool> {
        Ok(true)
    }

    fn effect(
        &self,
        logic: &mut GameLogic,
        from: PlayerId,
        to: &[PlayerId],
        cards: &[CardHandle],
    ) -> GameResult<()>;
}

// === CardMod skills ===

/// Pure modifiers of card feasibility, summed across a player's skills.
pub trait CardModSkill: Skill {
    fn target_filter(
        &self,
        _logic: &GameLogic,
        _card: CardHandle,
        _selected: &[PlayerId],
        _to_select: PlayerId,
        _source: PlayerId,
    ) -> bool {
        true
    }

    fn extra_distance_limit(
        &self,
        _logic: &GameLogic,
        _card: CardHandle,
        _selected: &[PlayerId],
        _to_select: PlayerId,
        _source: PlayerId,
    ) -> i32 {
        0
    }

    fn extra_max_target_num(
        &self,
        _logic: &GameLogic,
        _card: CardHandle,
        _selected: &[PlayerId],
        _to_select: PlayerId,
        _source: PlayerId,
    ) -> i32 {
        0
    }

    fn extra_use_num(&self, _logic: &GameLogic, _card: CardHandle, _player: PlayerId) -> i32 {
        0
    }
}

// === Registration ===

/// The tagged behavior of a registered skill.
#[derive(Clone)]
pub enum SkillDef {
    Trigger(Arc<dyn TriggerSkill>),
    ViewAs(Arc<dyn ViewAsSkill>),
    Proactive(Arc<dyn ProactiveSkill>),
    CardMod(Arc<dyn CardModSkill>),
}

impl SkillDef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SkillDef::Trigger(skill) => skill.name(),
            SkillDef::ViewAs(skill) => skill.name(),
            SkillDef::Proactive(skill) => skill.name(),
            SkillDef::CardMod(skill) => skill.name(),
        }
    }

    #[must_use]
    pub fn frequency(&self) -> Frequency {
        match self {
            SkillDef::Trigger(skill) => skill.frequency(),
            SkillDef::ViewAs(skill) => skill.frequency(),
            SkillDef::Proactive(skill) => skill.frequency(),
            SkillDef::CardMod(skill) => skill.frequency(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SkillKind {
        match self {
            SkillDef::Trigger(_) => SkillKind::Trigger,
            SkillDef::ViewAs(_) | SkillDef::Proactive(_) => SkillKind::ViewAs,
            SkillDef::CardMod(_) => SkillKind::CardMod,
        }
    }
}

/// A registered skill: catalog id, behavior, and the dispatcher handler
/// shared by every player carrying it.
#[derive(Clone)]
pub struct SkillEntry {
    pub id: SkillId,
    pub def: SkillDef,
    /// Present for trigger skills; attach registers it, the last detach
    /// removes it.
    pub handler: Option<Arc<dyn EventHandler>>,
    /// Parent skill, for subskills.
    pub parent: Option<SkillId>,
    /// Subskills attached and detached together with this one.
    pub subskills: Vec<SkillId>,
}

impl SkillEntry {
    #[must_use]
    pub fn new(id: SkillId, def: SkillDef) -> Self {
        let handler: Option<Arc<dyn EventHandler>> = match &def {
            SkillDef::Trigger(skill) => {
                Some(Arc::new(TriggerSkillHandler::new(Arc::clone(skill))))
            }
            _ => None,
        };
        Self {
            id,
            def,
            handler,
            parent: None,
            subskills: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.def.name()
    }
}
