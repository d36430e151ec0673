//! The card data model and the per-match card arena.
//!
//! ## Real and virtual cards
//!
//! A *real* card has a unique non-zero id and physical presence in an
//! area. A *virtual* card is synthesized by a view-as skill over zero or
//! more real subcards; its id is 0 and its printed attributes derive from
//! the subcards: one subcard passes suit, number and color through, two
//! or more yield no suit and the capped number sum.
//!
//! ## Arena
//!
//! All card objects, real and virtual, live in the match's `CardArena`
//! keyed by `CardHandle`. A real card's handle equals its id; virtual
//! handles come from a separate high counter. Cross-references (subcards,
//! positions) are handles, never pointers.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::face::CardFace;
use crate::skills::SkillId;

/// Sentinel for "no limit" on use counts, target counts and distances.
/// Kept well below `i32::MAX` so skill-granted extras cannot overflow.
pub const UNLIMITED: i32 = i32::MAX / 2;

/// Arena key for a card object, real or virtual. The default handle, 0,
/// never names a card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardHandle(pub u32);

impl CardHandle {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card suits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Heart,
    Club,
    Diamond,
    #[default]
    NoSuit,
}

impl Suit {
    /// The color this suit implies.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Suit::Spade | Suit::Club => Color::Black,
            Suit::Heart | Suit::Diamond => Color::Red,
            Suit::NoSuit => Color::NoColor,
        }
    }

    /// Parse a lowercase suit name, as used in card patterns.
    #[must_use]
    pub fn parse(name: &str) -> Option<Suit> {
        match name {
            "spade" => Some(Suit::Spade),
            "heart" => Some(Suit::Heart),
            "club" => Some(Suit::Club),
            "diamond" => Some(Suit::Diamond),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Suit::Spade => "spade",
            Suit::Heart => "heart",
            Suit::Club => "club",
            Suit::Diamond => "diamond",
            Suit::NoSuit => "no_suit",
        }
    }
}

/// Card colors, derived from suits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
    #[default]
    NoColor,
}

/// Top-level card variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Basic,
    Trick,
    Equip,
    /// Synthesized by a skill; never printed in a package.
    Skill,
}

/// Kind-specific variant tags.
///
/// Equip subtypes determine slot exclusivity: installing an equip
/// displaces the existing equip of the same subtype. Delayed tricks use
/// the card name as their variant identity instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardSubtype {
    #[default]
    None,
    GlobalEffect,
    AreaOfEffect,
    SingleTarget,
    Delayed,
    Weapon,
    Armor,
    OffensiveHorse,
    DefensiveHorse,
    Treasure,
}

/// A card object in the arena.
#[derive(Clone)]
pub struct Card {
    handle: CardHandle,
    /// Non-zero for real cards, 0 for virtual ones.
    id: u32,
    suit: Suit,
    number: i32,
    /// The view-as skill that synthesized this card, if any.
    skill: Option<SkillId>,
    subcards: SmallVec<[CardHandle; 2]>,
    face: Arc<dyn CardFace>,
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("handle", &self.handle)
            .field("id", &self.id)
            .field("name", &self.face.name())
            .field("suit", &self.suit)
            .field("number", &self.number)
            .field("subcards", &self.subcards)
            .finish()
    }
}

impl Card {
    #[must_use]
    pub fn handle(&self) -> CardHandle {
        self.handle
    }

    /// The card's printed id; 0 marks a virtual card.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.id == 0
    }

    /// Raw printed suit, ignoring subcards.
    #[must_use]
    pub fn printed_suit(&self) -> Suit {
        self.suit
    }

    /// Raw printed number, ignoring subcards.
    #[must_use]
    pub fn printed_number(&self) -> i32 {
        self.number
    }

    #[must_use]
    pub fn skill(&self) -> Option<SkillId> {
        self.skill
    }

    #[must_use]
    pub fn subcards(&self) -> &[CardHandle] {
        &self.subcards
    }

    /// The behavior descriptor shared by all instances of this card name.
    #[must_use]
    pub fn face(&self) -> &Arc<dyn CardFace> {
        &self.face
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.face.name()
    }
}

/// Owns every card object of a match.
#[derive(Clone)]
pub struct CardArena {
    cards: FxHashMap<CardHandle, Card>,
    next_virtual: u32,
}

/// Virtual handles start here; real card ids stay far below.
const VIRTUAL_BASE: u32 = 0x8000_0000;

impl CardArena {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cards: FxHashMap::default(),
            next_virtual: VIRTUAL_BASE,
        }
    }

    /// Insert a real card cloned from a catalog prototype.
    ///
    /// Panics if the id is 0 or already present.
    pub fn insert_real(&mut self, id: u32, suit: Suit, number: i32, face: Arc<dyn CardFace>) -> CardHandle {
        assert!(id != 0, "real cards must have a non-zero id");
        let handle = CardHandle(id);
        let card = Card {
            handle,
            id,
            suit,
            number,
            skill: None,
            subcards: SmallVec::new(),
            face,
        };
        let previous = self.cards.insert(handle, card);
        assert!(previous.is_none(), "card id {} inserted twice", id);
        handle
    }

    /// Synthesize a virtual card over the given subcards.
    pub fn new_virtual(
        &mut self,
        face: Arc<dyn CardFace>,
        subcards: &[CardHandle],
        skill: Option<SkillId>,
    ) -> CardHandle {
        let handle = CardHandle(self.next_virtual);
        self.next_virtual += 1;
        let card = Card {
            handle,
            id: 0,
            suit: Suit::NoSuit,
            number: 0,
            skill,
            subcards: subcards.iter().copied().collect(),
            face,
        };
        self.cards.insert(handle, card);
        handle
    }

    #[must_use]
    pub fn try_get(&self, handle: CardHandle) -> Option<&Card> {
        self.cards.get(&handle)
    }

    /// Get a card, panicking if the handle is stale.
    #[must_use]
    pub fn get(&self, handle: CardHandle) -> &Card {
        self.cards.get(&handle).expect("card handle not in arena")
    }

    #[must_use]
    pub fn contains(&self, handle: CardHandle) -> bool {
        self.cards.contains_key(&handle)
    }

    /// The behavior descriptor of a card.
    #[must_use]
    pub fn face(&self, handle: CardHandle) -> Arc<dyn CardFace> {
        Arc::clone(self.get(handle).face())
    }

    #[must_use]
    pub fn name(&self, handle: CardHandle) -> &str {
        self.get(handle).name()
    }

    #[must_use]
    pub fn is_virtual(&self, handle: CardHandle) -> bool {
        self.get(handle).is_virtual()
    }

    /// Effective suit, derived through subcards.
    #[must_use]
    pub fn suit(&self, handle: CardHandle) -> Suit {
        let card = self.get(handle);
        match card.subcards() {
            [] => card.printed_suit(),
            [only] => self.suit(*only),
            _ => Suit::NoSuit,
        }
    }

    /// Effective number, derived through subcards and capped at 13.
    #[must_use]
    pub fn number(&self, handle: CardHandle) -> i32 {
        let card = self.get(handle);
        if card.printed_number() > 0 {
            return card.printed_number();
        }
        match card.subcards() {
            [] => 0,
            [only] => self.number(*only),
            subcards => {
                let sum: i32 = subcards.iter().map(|&c| self.number(c)).sum();
                sum.min(13)
            }
        }
    }

    /// Effective color, derived from the effective suit.
    #[must_use]
    pub fn color(&self, handle: CardHandle) -> Color {
        self.suit(handle).color()
    }

    /// The id this card stands for: its own if real, its sole subcard's
    /// if it has exactly one, 0 otherwise.
    #[must_use]
    pub fn effective_id(&self, handle: CardHandle) -> u32 {
        let card = self.get(handle);
        if !card.is_virtual() {
            return card.id();
        }
        match card.subcards() {
            [only] => self.effective_id(*only),
            _ => 0,
        }
    }

    /// The real cards a card is composed of (itself, if real).
    #[must_use]
    pub fn real_cards(&self, handle: CardHandle) -> Vec<CardHandle> {
        let card = self.get(handle);
        if !card.is_virtual() {
            return vec![handle];
        }
        card.subcards()
            .iter()
            .flat_map(|&sub| self.real_cards(sub))
            .collect()
    }

    /// Remove a virtual card from the arena once no area keeps its token.
    pub fn release_virtual(&mut self, handle: CardHandle) {
        if self.cards.get(&handle).is_some_and(Card::is_virtual) {
            self.cards.remove(&handle);
        }
    }

    /// Look up a real card handle by printed id.
    #[must_use]
    pub fn find_by_id(&self, id: u32) -> Option<CardHandle> {
        if id == 0 {
            return None;
        }
        let handle = CardHandle(id);
        self.cards.contains_key(&handle).then_some(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate all cards in the arena.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::face::tests_support::plain_face;

    #[test]
    fn test_suit_color() {
        assert_eq!(Suit::Spade.color(), Color::Black);
        assert_eq!(Suit::Club.color(), Color::Black);
        assert_eq!(Suit::Heart.color(), Color::Red);
        assert_eq!(Suit::Diamond.color(), Color::Red);
        assert_eq!(Suit::NoSuit.color(), Color::NoColor);
    }

    #[test]
    fn test_suit_parse() {
        assert_eq!(Suit::parse("spade"), Some(Suit::Spade));
        assert_eq!(Suit::parse("hearts"), None);
    }

    #[test]
    fn test_real_card_attributes() {
        let mut arena = CardArena::new();
        let h = arena.insert_real(5, Suit::Heart, 9, plain_face("slash"));

        assert_eq!(h, CardHandle(5));
        assert_eq!(arena.suit(h), Suit::Heart);
        assert_eq!(arena.number(h), 9);
        assert_eq!(arena.color(h), Color::Red);
        assert_eq!(arena.effective_id(h), 5);
        assert_eq!(arena.real_cards(h), vec![h]);
        assert!(!arena.is_virtual(h));
    }

    #[test]
    fn test_virtual_one_subcard_inherits() {
        let mut arena = CardArena::new();
        let sub = arena.insert_real(1, Suit::Spade, 7, plain_face("slash"));
        let v = arena.new_virtual(plain_face("jink"), &[sub], None);

        assert!(arena.is_virtual(v));
        assert_eq!(arena.suit(v), Suit::Spade);
        assert_eq!(arena.number(v), 7);
        assert_eq!(arena.color(v), Color::Black);
        assert_eq!(arena.effective_id(v), 1);
        assert_eq!(arena.real_cards(v), vec![sub]);
    }

    #[test]
    fn test_virtual_many_subcards() {
        let mut arena = CardArena::new();
        let a = arena.insert_real(1, Suit::Spade, 7, plain_face("slash"));
        let b = arena.insert_real(2, Suit::Heart, 9, plain_face("slash"));
        let v = arena.new_virtual(plain_face("duel"), &[a, b], None);

        assert_eq!(arena.suit(v), Suit::NoSuit);
        assert_eq!(arena.number(v), 13); // 16 capped
        assert_eq!(arena.color(v), Color::NoColor);
        assert_eq!(arena.effective_id(v), 0);
        assert_eq!(arena.real_cards(v), vec![a, b]);
    }

    #[test]
    fn test_virtual_no_subcards() {
        let mut arena = CardArena::new();
        let v = arena.new_virtual(plain_face("slash"), &[], None);

        assert_eq!(arena.effective_id(v), 0);
        assert!(arena.real_cards(v).is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let mut arena = CardArena::new();
        let h = arena.insert_real(3, Suit::Club, 2, plain_face("slash"));
        let v = arena.new_virtual(plain_face("jink"), &[h], None);

        assert_eq!(arena.find_by_id(3), Some(h));
        assert_eq!(arena.find_by_id(0), None);
        assert_eq!(arena.find_by_id(99), None);
        assert_ne!(arena.find_by_id(3), Some(v));
    }

    #[test]
    fn test_release_virtual() {
        let mut arena = CardArena::new();
        let real = arena.insert_real(1, Suit::Spade, 1, plain_face("slash"));
        let v = arena.new_virtual(plain_face("jink"), &[real], None);

        arena.release_virtual(v);
        assert!(!arena.contains(v));

        // Real cards are never released this way.
        arena.release_virtual(real);
        assert!(arena.contains(real));
    }

    #[test]
    #[should_panic(expected = "inserted twice")]
    fn test_duplicate_id_panics() {
        let mut arena = CardArena::new();
        arena.insert_real(1, Suit::Spade, 1, plain_face("slash"));
        arena.insert_real(1, Suit::Heart, 2, plain_face("slash"));
    }
}
