//! The standard package: basic cards, tricks, equips, generals and the
//! game rule, plus the catalog assembly an embedder calls at startup.

pub mod basic;
pub mod equips;
pub mod generals;
pub mod rule;
pub mod tricks;

use std::sync::Arc;

use crate::cards::{Catalog, GameMode, Package, Suit};

pub use rule::GameRule;

/// Build the standard package.
#[must_use]
pub fn standard_package() -> Package {
    use Suit::*;

    let mut package = Package::new("standard");

    // Basic cards.
    for (suit, number) in [
        (Spade, 7),
        (Spade, 8),
        (Spade, 9),
        (Spade, 10),
        (Club, 2),
        (Club, 3),
        (Club, 8),
        (Heart, 10),
        (Diamond, 6),
        (Diamond, 9),
    ] {
        package.add_card(basic::Slash::face(), suit, number);
    }
    for (suit, number) in [
        (Heart, 2),
        (Heart, 13),
        (Diamond, 2),
        (Diamond, 7),
        (Diamond, 8),
        (Diamond, 11),
    ] {
        package.add_card(basic::Jink::face(), suit, number);
    }
    for (suit, number) in [
        (Heart, 3),
        (Heart, 4),
        (Heart, 6),
        (Heart, 7),
        (Heart, 9),
        (Heart, 12),
    ] {
        package.add_card(basic::Peach::face(), suit, number);
    }

    // Trick cards.
    package.add_card(tricks::AmazingGrace::face(), Heart, 3);
    package.add_card(tricks::AmazingGrace::face(), Heart, 4);
    package.add_card(tricks::GodSalvation::face(), Heart, 1);
    package.add_card(tricks::SavageAssault::face(), Spade, 7);
    package.add_card(tricks::SavageAssault::face(), Spade, 13);
    package.add_card(tricks::SavageAssault::face(), Club, 7);
    package.add_card(tricks::ArcheryAttack::face(), Heart, 1);
    package.add_card(tricks::Duel::face(), Spade, 1);
    package.add_card(tricks::Duel::face(), Club, 1);
    package.add_card(tricks::Duel::face(), Diamond, 1);
    package.add_card(tricks::ExNihilo::face(), Heart, 7);
    package.add_card(tricks::ExNihilo::face(), Heart, 8);
    package.add_card(tricks::ExNihilo::face(), Heart, 9);
    package.add_card(tricks::ExNihilo::face(), Heart, 11);
    package.add_card(tricks::Snatch::face(), Spade, 3);
    package.add_card(tricks::Snatch::face(), Spade, 4);
    package.add_card(tricks::Snatch::face(), Spade, 11);
    package.add_card(tricks::Snatch::face(), Diamond, 3);
    package.add_card(tricks::Snatch::face(), Diamond, 4);
    package.add_card(tricks::Dismantlement::face(), Spade, 3);
    package.add_card(tricks::Dismantlement::face(), Spade, 4);
    package.add_card(tricks::Dismantlement::face(), Spade, 12);
    package.add_card(tricks::Dismantlement::face(), Club, 3);
    package.add_card(tricks::Dismantlement::face(), Club, 4);
    package.add_card(tricks::Dismantlement::face(), Heart, 12);
    package.add_card(tricks::Collateral::face(), Club, 12);
    package.add_card(tricks::Collateral::face(), Club, 13);
    package.add_card(tricks::Nullification::face(), Spade, 11);
    package.add_card(tricks::Nullification::face(), Club, 12);
    package.add_card(tricks::Nullification::face(), Club, 13);
    package.add_card(tricks::Indulgence::face(), Spade, 6);
    package.add_card(tricks::Indulgence::face(), Club, 6);
    package.add_card(tricks::Indulgence::face(), Heart, 6);
    package.add_card(tricks::Lightning::face(), Spade, 1);

    // Equips.
    package.add_card(equips::Crossbow::face(), Club, 1);
    package.add_card(equips::Crossbow::face(), Diamond, 1);
    package.add_card(equips::QinggangSword::face(), Spade, 6);
    package.add_card(equips::SpearOfSerpent::face(), Spade, 12);
    package.add_card(equips::EightDiagram::face(), Spade, 2);
    package.add_card(equips::EightDiagram::face(), Club, 2);
    package.add_card(equips::RedHare::face(), Heart, 5);
    package.add_card(equips::HexMark::face(), Club, 5);
    package.add_card(equips::JadeSeal::face(), Spade, 9);

    // Generals.
    for general in generals::generals() {
        package.add_general(general);
    }

    package
}

/// Build a catalog holding the standard package and mode.
#[must_use]
pub fn standard_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.add_package(standard_package());
    catalog.add_mode(GameMode::new(
        "standard",
        Arc::new(GameRule),
        vec!["standard".to_string()],
    ));
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_contents() {
        let catalog = standard_catalog();

        assert!(catalog.mode("standard").is_some());
        let package = catalog.package("standard").unwrap();
        assert!(!package.cards.is_empty());
        assert_eq!(package.generals.len(), 10);

        // Card ids are dense from 1.
        let ids: Vec<u32> = package.cards.iter().map(|proto| proto.id).collect();
        assert_eq!(ids[0], 1);
        assert_eq!(*ids.last().unwrap() as usize, ids.len());

        assert!(catalog.skill_by_name("jianxiong").is_some());
        assert!(catalog.skill_by_name("qingguo").is_some());
        assert!(catalog.skill_by_name("paoxiao").is_some());
    }
}
