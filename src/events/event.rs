//! Event taxonomy and dispatch payloads.
//!
//! Every observable moment of a match is one of the `EventType` variants
//! below, partitioned by the family of action it belongs to. Handlers
//! registered for an event receive the event's mutable payload as an
//! `EventData`; whatever they write is visible to every handler after
//! them and to the pipeline that fired the event.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::game::structs::{
    CardEffect, CardResponse, CardUse, CardsMove, DamageStruct, DeathStruct, HpLoss, JudgeStruct,
    PhaseChange, RecoverStruct, SkillChange,
};

/// Everything that can be triggered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    // Turn
    GameStart,
    TurnStart,
    TurnBroken,
    PhaseChanging,
    PhaseSkipping,
    PhaseStart,
    PhaseProceeding,
    PhaseEnd,

    // Card use
    PreCardUsed,
    CardUsed,
    TargetChoosing,
    TargetConfirming,
    TargetChosen,
    TargetConfirmed,
    CardFinished,

    // Card effect
    CardEffect,
    CardEffected,
    PostCardEffected,

    // Card move
    BeforeCardsMove,
    CardsMove,
    AfterCardsMove,

    // Damage
    ConfirmDamage,
    BeforeDamage,
    DamageStart,
    Damaging,
    Damaged,
    BeforeHpReduced,
    AfterHpReduced,
    AfterDamaging,
    AfterDamaged,
    DamageComplete,

    // Hp
    HpLost,
    AfterHpLost,
    BeforeRecover,
    AfterRecover,

    // Judge
    StartJudge,
    AskForRetrial,
    FinishRetrial,
    FinishJudge,

    // Skill lifecycle
    SkillAdded,
    SkillRemoved,

    // Death
    BeforeGameOverJudge,
    GameOverJudge,
    Died,
    BuryVictim,

    // Response
    CardResponded,
}

/// The mutable payload of one dispatch.
///
/// Owned by the firing pipeline; handlers mutate it in place. The
/// `expect`-style accessors panic on a variant mismatch - a handler
/// registered for an event knows what rides with it.
#[derive(Debug, Default)]
pub enum EventData {
    #[default]
    None,
    CardUse(CardUse),
    CardEffect(CardEffect),
    CardResponse(CardResponse),
    Moves(Vec<CardsMove>),
    Damage(DamageStruct),
    Recover(RecoverStruct),
    HpLoss(HpLoss),
    Judge(JudgeStruct),
    Death(DeathStruct),
    PhaseChange(PhaseChange),
    SkillChange(SkillChange),
}

macro_rules! event_data_accessors {
    ($variant:ident, $ty:ty, $get:ident, $get_mut:ident) => {
        #[must_use]
        pub fn $get(&self) -> &$ty {
            match self {
                EventData::$variant(inner) => inner,
                other => panic!(
                    concat!("event data is not a ", stringify!($variant), ": {:?}"),
                    other
                ),
            }
        }

        pub fn $get_mut(&mut self) -> &mut $ty {
            match self {
                EventData::$variant(inner) => inner,
                other => panic!(
                    concat!("event data is not a ", stringify!($variant), ": {:?}"),
                    other
                ),
            }
        }
    };
}

impl EventData {
    event_data_accessors!(CardUse, CardUse, card_use, card_use_mut);
    event_data_accessors!(CardEffect, CardEffect, card_effect, card_effect_mut);
    event_data_accessors!(CardResponse, CardResponse, card_response, card_response_mut);
    event_data_accessors!(Moves, Vec<CardsMove>, moves, moves_mut);
    event_data_accessors!(Damage, DamageStruct, damage, damage_mut);
    event_data_accessors!(Recover, RecoverStruct, recover, recover_mut);
    event_data_accessors!(HpLoss, HpLoss, hp_loss, hp_loss_mut);
    event_data_accessors!(Judge, JudgeStruct, judge, judge_mut);
    event_data_accessors!(Death, DeathStruct, death, death_mut);
    event_data_accessors!(PhaseChange, PhaseChange, phase_change, phase_change_mut);
    event_data_accessors!(SkillChange, SkillChange, skill_change, skill_change_mut);

    /// Non-panicking damage accessor, for handlers listening on events
    /// that can ride with either damage or plain hp-loss data.
    #[must_use]
    pub fn try_damage(&self) -> Option<&DamageStruct> {
        match self {
            EventData::Damage(damage) => Some(damage),
            _ => None,
        }
    }

    #[must_use]
    pub fn try_damage_mut(&mut self) -> Option<&mut DamageStruct> {
        match self {
            EventData::Damage(damage) => Some(damage),
            _ => None,
        }
    }
}

/// A payload type that can ride in `EventData`.
///
/// Pipelines own their payload structs; `GameLogic::trigger_mut` wraps
/// one for a dispatch and hands it back afterwards, so handler mutations
/// land in the pipeline's local.
pub trait EventPayload: Default {
    fn wrap(self) -> EventData;

    /// Unwrap after a dispatch. Panics if a handler replaced the variant.
    fn unwrap(data: EventData) -> Self;
}

macro_rules! event_payload {
    ($variant:ident, $ty:ty) => {
        impl EventPayload for $ty {
            fn wrap(self) -> EventData {
                EventData::$variant(self)
            }

            fn unwrap(data: EventData) -> Self {
                match data {
                    EventData::$variant(inner) => inner,
                    other => panic!(
                        concat!("event data is not a ", stringify!($variant), ": {:?}"),
                        other
                    ),
                }
            }
        }
    };
}

event_payload!(CardUse, CardUse);
event_payload!(CardEffect, CardEffect);
event_payload!(CardResponse, CardResponse);
event_payload!(Moves, Vec<CardsMove>);
event_payload!(Damage, DamageStruct);
event_payload!(Recover, RecoverStruct);
event_payload!(HpLoss, HpLoss);
event_payload!(Judge, JudgeStruct);
event_payload!(Death, DeathStruct);
event_payload!(PhaseChange, PhaseChange);
event_payload!(SkillChange, SkillChange);

/// What `triggerable` returns: for each player empowered to invoke the
/// handler, one entry per invocation option, each with its queue of
/// secondary targets (usually empty).
#[derive(Clone, Debug, Default)]
pub struct EventMap {
    entries: FxHashMap<PlayerId, Vec<Vec<PlayerId>>>,
}

impl EventMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One option for `invoker`, with no secondary targets.
    #[must_use]
    pub fn single(invoker: PlayerId) -> Self {
        let mut map = Self::new();
        map.add(invoker);
        map
    }

    /// `count` identical options for `invoker`.
    #[must_use]
    pub fn repeated(invoker: PlayerId, count: u32) -> Self {
        let mut map = Self::new();
        for _ in 0..count {
            map.add(invoker);
        }
        map
    }

    /// Add an option with no secondary targets.
    pub fn add(&mut self, invoker: PlayerId) {
        self.entries.entry(invoker).or_default().push(Vec::new());
    }

    /// Add an option with a queue of secondary targets.
    pub fn add_with_targets(&mut self, invoker: PlayerId, to: Vec<PlayerId>) {
        self.entries.entry(invoker).or_default().push(to);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn options_for(&self, invoker: PlayerId) -> &[Vec<PlayerId>] {
        self.entries.get(&invoker).map_or(&[], Vec::as_slice)
    }

    /// Drain the options of one invoker.
    pub fn take(&mut self, invoker: PlayerId) -> Vec<Vec<PlayerId>> {
        self.entries.remove(&invoker).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_map_single() {
        let map = EventMap::single(PlayerId::new(2));
        assert!(!map.is_empty());
        assert_eq!(map.options_for(PlayerId::new(2)).len(), 1);
        assert_eq!(map.options_for(PlayerId::new(0)).len(), 0);
    }

    #[test]
    fn test_event_map_repeated() {
        let map = EventMap::repeated(PlayerId::new(1), 3);
        assert_eq!(map.options_for(PlayerId::new(1)).len(), 3);
    }

    #[test]
    fn test_event_map_targets() {
        let mut map = EventMap::new();
        map.add_with_targets(PlayerId::new(0), vec![PlayerId::new(1), PlayerId::new(2)]);

        let options = map.options_for(PlayerId::new(0));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0], vec![PlayerId::new(1), PlayerId::new(2)]);
    }

    #[test]
    fn test_payload_round_trip() {
        let mut damage = DamageStruct::new(None, PlayerId::new(1), 2);
        damage.chain = true;

        let data = damage.wrap();
        let back = DamageStruct::unwrap(data);
        assert_eq!(back.to, PlayerId::new(1));
        assert_eq!(back.damage, 2);
        assert!(back.chain);
    }

    #[test]
    #[should_panic(expected = "event data is not a")]
    fn test_accessor_mismatch_panics() {
        let data = EventData::None;
        let _ = data.damage();
    }

    #[test]
    fn test_try_damage() {
        let data = EventData::None;
        assert!(data.try_damage().is_none());

        let data = DamageStruct::new(None, PlayerId::new(0), 1).wrap();
        assert!(data.try_damage().is_some());
    }
}
