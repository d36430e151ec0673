//! Card areas: typed, ordered bags of cards.
//!
//! Every card in a match sits in exactly one area. Global areas (draw
//! pile, discard pile, table, wugu) have no owner; hand, equip, judge and
//! delayed-trick areas belong to a player. An `AreaId` names an area by
//! `(type, owner)`, so areas are looked up in the match's table instead of
//! being reached through pointers.
//!
//! Index 0 of an area is its top: the draw pile is consumed from the
//! front, and reshuffled cards are appended at the back.

use serde::{Deserialize, Serialize};

use crate::cards::CardHandle;
use crate::core::{GameRng, PlayerId};

/// The semantic bucket an area represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaType {
    Hand,
    Equip,
    Judge,
    DelayedTrick,
    DrawPile,
    DiscardPile,
    Table,
    Wugu,
    /// Source placeholder for moves; resolved to the cards' actual areas
    /// during move filtering.
    Unknown,
}

/// Where to insert cards into an area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Top,
    Bottom,
}

/// Identifies an area: a type plus, for player areas, its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaId {
    pub kind: AreaType,
    pub owner: Option<PlayerId>,
}

impl AreaId {
    /// A global (ownerless) area.
    #[must_use]
    pub const fn global(kind: AreaType) -> Self {
        Self { kind, owner: None }
    }

    /// A player-owned area.
    #[must_use]
    pub const fn of_player(kind: AreaType, owner: PlayerId) -> Self {
        Self {
            kind,
            owner: Some(owner),
        }
    }

    /// The unknown source area.
    #[must_use]
    pub const fn unknown() -> Self {
        Self::global(AreaType::Unknown)
    }
}

/// An ordered multiset of card references.
///
/// Areas flagged `keep_virtual` (table, equip, delayed trick) retain
/// virtual-card tokens; moves into any other area decompose a virtual
/// card into its real subcards first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardArea {
    id: AreaId,
    cards: Vec<CardHandle>,
    keep_virtual: bool,
}

impl CardArea {
    /// Create an empty area.
    #[must_use]
    pub fn new(id: AreaId) -> Self {
        let keep_virtual = matches!(
            id.kind,
            AreaType::Table | AreaType::Equip | AreaType::DelayedTrick
        );
        Self {
            id,
            cards: Vec::new(),
            keep_virtual,
        }
    }

    #[must_use]
    pub fn id(&self) -> AreaId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> AreaType {
        self.id.kind
    }

    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        self.id.owner
    }

    /// Whether this area retains virtual-card tokens.
    #[must_use]
    pub fn keeps_virtual(&self) -> bool {
        self.keep_virtual
    }

    /// Add a card at the given end.
    pub fn add(&mut self, card: CardHandle, direction: Direction) {
        match direction {
            Direction::Top => self.cards.insert(0, card),
            Direction::Bottom => self.cards.push(card),
        }
    }

    /// Remove a card.
    ///
    /// Returns true if the card was present.
    pub fn remove(&mut self, card: CardHandle) -> bool {
        if let Some(pos) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, card: CardHandle) -> bool {
        self.cards.contains(&card)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The cards in order, top first.
    #[must_use]
    pub fn cards(&self) -> &[CardHandle] {
        &self.cards
    }

    /// The top `n` cards (fewer if the area is shorter).
    #[must_use]
    pub fn top(&self, n: usize) -> &[CardHandle] {
        &self.cards[..n.min(self.cards.len())]
    }

    /// A uniformly random card, or `None` if empty.
    #[must_use]
    pub fn random(&self, rng: &mut GameRng) -> Option<CardHandle> {
        rng.choose(&self.cards).copied()
    }

    /// Shuffle the area's order.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.cards);
    }

    /// Drain all cards, leaving the area empty.
    pub fn take_all(&mut self) -> Vec<CardHandle> {
        std::mem::take(&mut self.cards)
    }
}
