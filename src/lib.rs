//! # sanguo-core
//!
//! The server-side rule engine of a Sanguosha-style trick-taking card
//! game: the event/trigger pipeline, the card-use state machine, the
//! card-movement protocol, the judge sub-protocol, the damage and
//! recovery pipelines, and the data model they operate on.
//!
//! ## Design principles
//!
//! 1. **Arenas over pointers**: a match owns its players, cards and
//!    areas in tables; every cross-reference is a stable index
//!    (`PlayerId`, `CardHandle`, `AreaId`).
//!
//! 2. **Signals over exceptions**: `TurnBroken`, `StageChange` and
//!    `GameFinish` travel as a typed `Result` error through every
//!    pipeline; the turn loop is the sole catcher.
//!
//! 3. **An explicit catalog**: packages and modes register into a
//!    `Catalog` the embedder builds at startup and passes into each
//!    match. No global registry.
//!
//! 4. **A typed client port**: every prompt is one method on the
//!    `Client` trait with a typed reply; humans and robots sit behind
//!    the same port, and a declined or timed-out request always falls
//!    back to a documented default.
//!
//! ## Modules
//!
//! - `core`: player identity and model, RNG, room settings, signals
//! - `areas`: card areas (typed ordered bags)
//! - `cards`: card data model, behavior faces, patterns, the catalog
//! - `events`: event taxonomy, dispatch payloads, the handler contract
//! - `skills`: trigger / view-as / card-mod skill variants
//! - `client`: the typed client-io port
//! - `game`: the match logic and its pipelines
//! - `standard`: the standard package and game rule

pub mod areas;
pub mod cards;
pub mod client;
pub mod core;
pub mod events;
pub mod game;
pub mod skills;
pub mod standard;

pub use crate::areas::{AreaId, AreaType, CardArea, Direction};
pub use crate::cards::{
    Card, CardArena, CardFace, CardHandle, CardKind, CardPattern, CardSubtype, Catalog, Color,
    GameMode, General, GeneralDef, GeneralId, Package, Suit, UNLIMITED,
};
pub use crate::client::{
    BotClient, CardReply, CardRequest, Client, Notification, PlayerProperty, Prompt,
    ScriptHandle, ScriptedClient, TriggerOrderRequest, UseCardReply, UseCardRequest,
};
pub use crate::core::{
    ControlSignal, GameResult, GameRng, Phase, Player, PlayerId, RoomSettings, SkillArea,
};
pub use crate::events::{EventData, EventHandler, EventMap, EventType};
pub use crate::game::structs::{
    CardEffect, CardResponse, CardUse, CardsMove, DamageNature, DamageStruct, DeathStruct,
    HpLoss, JudgeStruct, PhaseChange, RecoverStruct, SkillChange,
};
pub use crate::game::GameLogic;
pub use crate::skills::{
    CardModSkill, Frequency, Masochism, MasochismSkill, OneCard, OneCardViewAs, ProactiveSkill,
    Skill, SkillDef, SkillEntry, SkillId, SkillKind, Status, StatusSkill, TriggerSkill,
    ViewAsSkill,
};
