//! Standard equip cards. Installing one displaces the equip of the
//! same subtype through the table into the discard pile.

use std::sync::Arc;

use crate::cards::face::{equip_on_use, equip_use};
use crate::cards::{CardFace, CardHandle, CardKind, CardSubtype};
use crate::core::GameResult;
use crate::game::structs::CardUse;
use crate::game::GameLogic;

macro_rules! equip_face {
    ($ty:ident, $name:literal, $subtype:expr) => {
        pub struct $ty;

        impl $ty {
            #[must_use]
            pub fn face() -> Arc<dyn CardFace> {
                Arc::new($ty)
            }
        }

        impl CardFace for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn kind(&self) -> CardKind {
                CardKind::Equip
            }

            fn subtype(&self) -> CardSubtype {
                $subtype
            }

            fn target_fixed(&self) -> bool {
                true
            }

            fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
                equip_on_use(logic, use_)
            }

            fn use_card(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
                equip_use(logic, use_)
            }

            fn complete(&self, _logic: &mut GameLogic, _card: CardHandle) -> GameResult<()> {
                Ok(())
            }
        }
    };
}

macro_rules! weapon_face {
    ($ty:ident, $name:literal, $range:literal) => {
        pub struct $ty;

        impl $ty {
            #[must_use]
            pub fn face() -> Arc<dyn CardFace> {
                Arc::new($ty)
            }
        }

        impl CardFace for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn kind(&self) -> CardKind {
                CardKind::Equip
            }

            fn subtype(&self) -> CardSubtype {
                CardSubtype::Weapon
            }

            fn target_fixed(&self) -> bool {
                true
            }

            fn attack_range(&self) -> i32 {
                $range
            }

            fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
                equip_on_use(logic, use_)
            }

            fn use_card(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
                equip_use(logic, use_)
            }

            fn complete(&self, _logic: &mut GameLogic, _card: CardHandle) -> GameResult<()> {
                Ok(())
            }
        }
    };
}

weapon_face!(Crossbow, "crossbow", 1);
weapon_face!(QinggangSword, "qinggang_sword", 2);
weapon_face!(SpearOfSerpent, "spear_of_serpent", 3);

equip_face!(EightDiagram, "eight_diagram", CardSubtype::Armor);
equip_face!(RedHare, "red_hare", CardSubtype::OffensiveHorse);
equip_face!(HexMark, "hex_mark", CardSubtype::DefensiveHorse);
equip_face!(JadeSeal, "jade_seal", CardSubtype::Treasure);
