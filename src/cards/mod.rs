//! Cards: the data model, behavior descriptors, patterns and the
//! content catalog.

pub mod card;
pub mod catalog;
pub mod face;
pub mod pattern;

pub use card::{Card, CardArena, CardHandle, CardKind, CardSubtype, Color, Suit, UNLIMITED};
pub use catalog::{Catalog, CardPrototype, GameMode, Gender, General, GeneralDef, GeneralId, Package};
pub use face::CardFace;
pub use pattern::CardPattern;
