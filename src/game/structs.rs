//! Pipeline payload structs.
//!
//! Each pipeline owns one of these for its run and hands it through the
//! dispatcher, so handlers can rewrite targets, amounts and verdicts
//! mid-flight.

use serde::{Deserialize, Serialize};

use crate::areas::{AreaId, Direction};
use crate::cards::{CardArena, CardHandle, CardPattern};
use crate::core::{Phase, PlayerId, SkillArea};
use crate::skills::SkillId;

pub use crate::client::Prompt;

/// One card use moving through the card-use pipeline.
#[derive(Clone, Debug, Default)]
pub struct CardUse {
    /// The user; absent only for synthetic uses such as a delayed trick
    /// hopping between holders.
    pub from: Option<PlayerId>,
    /// Surviving targets; handlers prune and extend this.
    pub to: Vec<PlayerId>,
    pub card: CardHandle,
    /// A card this use targets instead of players (nullification).
    pub target: Option<CardHandle>,
    /// Whether every real subcard came from the user's hand.
    pub is_handcard: bool,
    /// Whether a play-phase use counts against the per-turn history.
    pub add_history: bool,
}

impl CardUse {
    #[must_use]
    pub fn new(from: PlayerId, card: CardHandle) -> Self {
        Self {
            from: Some(from),
            to: Vec::new(),
            card,
            target: None,
            is_handcard: false,
            add_history: true,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, to: Vec<PlayerId>) -> Self {
        self.to = to;
        self
    }

    /// A userless use: a movable delayed trick arriving at a new holder.
    #[must_use]
    pub fn hop(card: CardHandle, holder: PlayerId) -> Self {
        Self {
            from: None,
            to: vec![holder],
            card,
            target: None,
            is_handcard: false,
            add_history: false,
        }
    }
}

/// One card effect on one target (or on a targeted card).
#[derive(Clone, Debug, Default)]
pub struct CardEffect {
    pub from: Option<PlayerId>,
    pub to: Option<PlayerId>,
    pub card: CardHandle,
    /// The card this effect targets, for nullifications.
    pub target_card: Option<CardHandle>,
    /// Set when a nullification answered this effect.
    pub nullified: bool,
}

impl CardEffect {
    #[must_use]
    pub fn from_use(use_: &CardUse, to: Option<PlayerId>) -> Self {
        Self {
            from: use_.from,
            to,
            card: use_.card,
            target_card: use_.target,
            nullified: false,
        }
    }
}

/// Bookkeeping for one nullification offer in flight. Stacked, because
/// a nullification can itself be answered with a nullification.
#[derive(Clone, Debug)]
pub struct NullifyScope {
    /// The target of the effect being answered.
    pub to: Option<PlayerId>,
    /// Whether the card being answered is itself a nullification.
    pub card_is_nullification: bool,
    /// Set by a resolving nullification: cancel the effect.
    pub nullified: bool,
    /// Set when the answered card is a nullification: flip its verdict.
    pub flipped: bool,
}

impl NullifyScope {
    #[must_use]
    pub fn for_effect(logic: &crate::game::GameLogic, effect: &CardEffect) -> Self {
        Self {
            to: effect.to,
            card_is_nullification: logic.cards().name(effect.card) == "nullification",
            nullified: false,
            flipped: false,
        }
    }
}

/// A card played in response to a prompt (not used for its effect).
#[derive(Clone, Debug, Default)]
pub struct CardResponse {
    pub from: Option<PlayerId>,
    pub to: Option<PlayerId>,
    pub card: CardHandle,
    /// The card being answered.
    pub target: Option<CardHandle>,
}

/// One batch entry of the movement pipeline.
#[derive(Clone, Debug)]
pub struct CardsMove {
    pub from: AreaId,
    pub to: AreaId,
    pub to_direction: Direction,
    pub cards: Vec<CardHandle>,
    /// Open moves are visible to every player.
    pub open: bool,
}

impl Default for CardsMove {
    fn default() -> Self {
        Self {
            from: AreaId::unknown(),
            to: AreaId::unknown(),
            // Appending keeps batch order: cards arrive in the order
            // they were listed.
            to_direction: Direction::Bottom,
            cards: Vec::new(),
            open: false,
        }
    }
}

impl CardsMove {
    /// A move into `to`; the source is resolved from the cards' actual
    /// positions during filtering.
    #[must_use]
    pub fn to_area(to: AreaId) -> Self {
        Self {
            to,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_area(mut self, from: AreaId) -> Self {
        self.from = from;
        self
    }

    #[must_use]
    pub fn with_cards(mut self, cards: Vec<CardHandle>) -> Self {
        self.cards = cards;
        self
    }

    #[must_use]
    pub fn top(mut self) -> Self {
        self.to_direction = Direction::Top;
        self
    }

    #[must_use]
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    /// Whether a viewer may see the card ids of this move.
    #[must_use]
    pub fn is_relevant(&self, viewer: PlayerId) -> bool {
        self.open || self.from.owner == Some(viewer) || self.to.owner == Some(viewer)
    }
}

/// Element of damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageNature {
    #[default]
    Normal,
    Fire,
    Thunder,
}

/// One damage moving through the damage pipeline.
#[derive(Clone, Debug, Default)]
pub struct DamageStruct {
    pub from: Option<PlayerId>,
    pub to: PlayerId,
    pub card: Option<CardHandle>,
    pub damage: i32,
    pub nature: DamageNature,
    /// Part of an iron-chain propagation.
    pub chain: bool,
    /// Transferred from another victim.
    pub transfer: bool,
    /// Whether a player's own card use dealt it.
    pub by_user: bool,
}

impl DamageStruct {
    #[must_use]
    pub fn new(from: Option<PlayerId>, to: PlayerId, damage: i32) -> Self {
        Self {
            from,
            to,
            card: None,
            damage,
            nature: DamageNature::Normal,
            chain: false,
            transfer: false,
            by_user: true,
        }
    }

    #[must_use]
    pub fn with_card(mut self, card: CardHandle) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_nature(mut self, nature: DamageNature) -> Self {
        self.nature = nature;
        self
    }
}

/// One recovery.
#[derive(Clone, Debug, Default)]
pub struct RecoverStruct {
    pub from: Option<PlayerId>,
    pub to: PlayerId,
    pub recover: i32,
    pub card: Option<CardHandle>,
}

impl RecoverStruct {
    #[must_use]
    pub fn new(from: Option<PlayerId>, to: PlayerId) -> Self {
        Self {
            from,
            to,
            recover: 1,
            card: None,
        }
    }
}

/// Hp loss outside the damage pipeline. Handlers of `HpLost` may
/// rewrite the amount.
#[derive(Clone, Debug, Default)]
pub struct HpLoss {
    pub victim: PlayerId,
    pub amount: i32,
}

/// One judge: a forced draw matched against a pattern, swappable by
/// retrial skills.
#[derive(Clone, Debug, Default)]
pub struct JudgeStruct {
    pub who: PlayerId,
    pub pattern: String,
    pub card: Option<CardHandle>,
    pub matched: bool,
}

impl JudgeStruct {
    #[must_use]
    pub fn new(who: PlayerId, pattern: impl Into<String>) -> Self {
        Self {
            who,
            pattern: pattern.into(),
            card: None,
            matched: false,
        }
    }

    /// Recompute `matched` from the current judge card.
    pub fn update_result(&mut self, cards: &CardArena) {
        self.matched = match self.card {
            Some(card) => CardPattern::parse(&self.pattern).matches(cards, card),
            None => false,
        };
    }
}

/// A death being adjudicated.
#[derive(Clone, Debug, Default)]
pub struct DeathStruct {
    pub who: PlayerId,
    pub damage: Option<DamageStruct>,
}

/// One phase transition. `PhaseChanging` handlers returning broken skip
/// the incoming phase's body.
#[derive(Clone, Debug, Default)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

/// A skill being attached to or detached from a player.
#[derive(Clone, Debug)]
pub struct SkillChange {
    pub owner: PlayerId,
    pub skill: SkillId,
    pub area: SkillArea,
}

impl Default for SkillChange {
    fn default() -> Self {
        Self {
            owner: PlayerId::new(0),
            skill: SkillId::new(0),
            area: SkillArea::Acquired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::AreaType;
    use crate::cards::face::tests_support::plain_face;
    use crate::cards::Suit;

    #[test]
    fn test_card_use_builders() {
        let use_ = CardUse::new(PlayerId::new(0), CardHandle(3))
            .with_targets(vec![PlayerId::new(1)]);

        assert_eq!(use_.from, Some(PlayerId::new(0)));
        assert_eq!(use_.to, vec![PlayerId::new(1)]);
        assert!(use_.add_history);

        let hop = CardUse::hop(CardHandle(3), PlayerId::new(2));
        assert_eq!(hop.from, None);
        assert!(!hop.add_history);
    }

    #[test]
    fn test_effect_from_use() {
        let mut use_ = CardUse::new(PlayerId::new(0), CardHandle(3));
        use_.target = Some(CardHandle(9));

        let effect = CardEffect::from_use(&use_, Some(PlayerId::new(1)));
        assert_eq!(effect.from, Some(PlayerId::new(0)));
        assert_eq!(effect.to, Some(PlayerId::new(1)));
        assert_eq!(effect.card, CardHandle(3));
        assert_eq!(effect.target_card, Some(CardHandle(9)));
        assert!(!effect.nullified);
    }

    #[test]
    fn test_move_relevance() {
        let hidden = CardsMove::to_area(AreaId::of_player(AreaType::Hand, PlayerId::new(1)))
            .from_area(AreaId::global(AreaType::DrawPile))
            .with_cards(vec![CardHandle(1)]);

        assert!(hidden.is_relevant(PlayerId::new(1)));
        assert!(!hidden.is_relevant(PlayerId::new(0)));

        let open = CardsMove::to_area(AreaId::global(AreaType::DiscardPile)).open();
        assert!(open.is_relevant(PlayerId::new(0)));
    }

    #[test]
    fn test_judge_update_result() {
        let mut arena = CardArena::new();
        let spade = arena.insert_real(1, Suit::Spade, 5, plain_face("lightning"));

        let mut judge = JudgeStruct::new(PlayerId::new(0), ".|spade|2~9");
        assert!(!judge.matched);

        judge.card = Some(spade);
        judge.update_result(&arena);
        assert!(judge.matched);

        judge.pattern = ".|heart".to_string();
        judge.update_result(&arena);
        assert!(!judge.matched);
    }

    #[test]
    fn test_damage_builders() {
        let damage = DamageStruct::new(Some(PlayerId::new(0)), PlayerId::new(1), 3)
            .with_card(CardHandle(7))
            .with_nature(DamageNature::Thunder);

        assert_eq!(damage.damage, 3);
        assert_eq!(damage.nature, DamageNature::Thunder);
        assert!(damage.by_user);
    }
}
