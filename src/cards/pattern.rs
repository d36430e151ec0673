//! Card patterns.
//!
//! Compact strings select cards for prompts and judges. Segments are
//! separated by `|`: name, suit, number. Within a segment, commas
//! separate alternatives, `.` matches anything and a `^` prefix negates
//! one alternative. Numbers accept `a~b` ranges.
//!
//! Examples: `slash`, `.|^heart`, `.|spade|2~9`.

use serde::{Deserialize, Serialize};

use super::card::{CardArena, CardHandle};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum Alternative {
    Any,
    Is(String),
    Not(String),
}

impl Alternative {
    fn parse(text: &str) -> Self {
        if text == "." {
            Alternative::Any
        } else if let Some(negated) = text.strip_prefix('^') {
            Alternative::Not(negated.to_string())
        } else {
            Alternative::Is(text.to_string())
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Alternative::Any => true,
            Alternative::Is(expected) => value == expected,
            Alternative::Not(rejected) => value != rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum NumberAlternative {
    Any,
    Exact(i32),
    Range(i32, i32),
}

impl NumberAlternative {
    fn parse(text: &str) -> Option<Self> {
        if text == "." {
            return Some(NumberAlternative::Any);
        }
        if let Some((low, high)) = text.split_once('~') {
            return Some(NumberAlternative::Range(
                low.parse().ok()?,
                high.parse().ok()?,
            ));
        }
        text.parse().ok().map(NumberAlternative::Exact)
    }

    fn matches(&self, number: i32) -> bool {
        match *self {
            NumberAlternative::Any => true,
            NumberAlternative::Exact(expected) => number == expected,
            NumberAlternative::Range(low, high) => (low..=high).contains(&number),
        }
    }
}

/// A parsed card pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPattern {
    names: Vec<Alternative>,
    suits: Vec<Alternative>,
    numbers: Vec<NumberAlternative>,
}

impl CardPattern {
    /// Parse a pattern string. Unparseable number alternatives are
    /// treated as matching nothing.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let mut segments = pattern.split('|');

        let names = segments
            .next()
            .map(|segment| segment.split(',').map(Alternative::parse).collect())
            .unwrap_or_default();
        let suits = segments
            .next()
            .map(|segment| segment.split(',').map(Alternative::parse).collect())
            .unwrap_or_default();
        let numbers = segments
            .next()
            .map(|segment| {
                segment
                    .split(',')
                    .filter_map(NumberAlternative::parse)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            names,
            suits,
            numbers,
        }
    }

    /// Whether a card matches. Missing segments match everything.
    #[must_use]
    pub fn matches(&self, cards: &CardArena, card: CardHandle) -> bool {
        let name = cards.name(card);
        if !self.names.is_empty() && !self.names.iter().any(|alt| alt.matches(name)) {
            return false;
        }

        let suit = cards.suit(card).as_str();
        if !self.suits.is_empty() && !self.suits.iter().any(|alt| alt.matches(suit)) {
            return false;
        }

        let number = cards.number(card);
        if !self.numbers.is_empty() && !self.numbers.iter().any(|alt| alt.matches(number)) {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::face::tests_support::plain_face;
    use crate::cards::Suit;

    fn arena_with(suit: Suit, number: i32, name: &str) -> (CardArena, CardHandle) {
        let mut arena = CardArena::new();
        let handle = arena.insert_real(1, suit, number, plain_face(name));
        (arena, handle)
    }

    #[test]
    fn test_name_match() {
        let (arena, card) = arena_with(Suit::Spade, 7, "slash");

        assert!(CardPattern::parse("slash").matches(&arena, card));
        assert!(CardPattern::parse(".").matches(&arena, card));
        assert!(!CardPattern::parse("jink").matches(&arena, card));
        assert!(CardPattern::parse("slash,jink").matches(&arena, card));
    }

    #[test]
    fn test_suit_negation() {
        let (arena, spade) = arena_with(Suit::Spade, 7, "slash");
        assert!(CardPattern::parse(".|^heart").matches(&arena, spade));

        let (arena, heart) = arena_with(Suit::Heart, 7, "slash");
        assert!(!CardPattern::parse(".|^heart").matches(&arena, heart));
    }

    #[test]
    fn test_number_range() {
        let pattern = CardPattern::parse(".|spade|2~9");

        let (arena, card) = arena_with(Suit::Spade, 2, "lightning");
        assert!(pattern.matches(&arena, card));

        let (arena, card) = arena_with(Suit::Spade, 1, "lightning");
        assert!(!pattern.matches(&arena, card));

        let (arena, card) = arena_with(Suit::Heart, 5, "lightning");
        assert!(!pattern.matches(&arena, card));
    }

    #[test]
    fn test_exact_number() {
        let (arena, card) = arena_with(Suit::Club, 13, "slash");
        assert!(CardPattern::parse(".|.|13").matches(&arena, card));
        assert!(!CardPattern::parse(".|.|12").matches(&arena, card));
    }

    #[test]
    fn test_missing_segments_match_all() {
        let (arena, card) = arena_with(Suit::Diamond, 4, "peach");
        assert!(CardPattern::parse("peach").matches(&arena, card));
    }
}
