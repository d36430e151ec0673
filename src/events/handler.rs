//! The handler contract for the trigger pipeline.

use std::sync::Arc;

use crate::core::{GameResult, PlayerId};
use crate::game::GameLogic;

use super::event::{EventData, EventMap, EventType};

/// A participant in event dispatch: the game rule, and every attached
/// trigger skill.
///
/// Dispatch per event: handlers are stably sorted by descending
/// `priority` and processed in bands of equal priority. Within a band,
/// each handler's `triggerable` nominates invokers; each invoker, in
/// action order, picks among its options (or is forced, if an option is
/// compulsory), pays `on_cost`, and if the cost stands, `effect` runs.
/// An `effect` returning `true` breaks the dispatch for its caller.
pub trait EventHandler: Send + Sync {
    /// Name shown in trigger-order prompts and used for identification
    /// in tests and logs.
    fn name(&self) -> &str;

    /// The events this handler wants to see.
    fn events(&self) -> &[EventType];

    /// Dispatch priority for an event; higher runs earlier. May depend
    /// on the event.
    fn priority(&self, _event: EventType) -> i32 {
        0
    }

    /// Compulsory handlers cannot be declined in trigger-order prompts.
    fn is_compulsory(&self) -> bool {
        false
    }

    /// Which players may invoke this handler for the fired event, and
    /// with which options.
    fn triggerable(
        &self,
        logic: &GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        data: &EventData,
    ) -> EventMap;

    /// The cost step: return `Ok(false)` to drop this invocation
    /// without running `effect`.
    fn on_cost(
        &self,
        _logic: &mut GameLogic,
        _event: EventType,
        _target: Option<PlayerId>,
        _data: &mut EventData,
        _invoker: PlayerId,
    ) -> GameResult<bool> {
        Ok(true)
    }

    /// The effect step: return `Ok(true)` to break the dispatch.
    fn effect(
        &self,
        logic: &mut GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        data: &mut EventData,
        invoker: PlayerId,
    ) -> GameResult<bool>;
}

/// One invocation option held by an invoker during dispatch: the handler
/// plus its remaining queue of secondary targets.
#[derive(Clone)]
pub struct PendingTrigger {
    pub handler: Arc<dyn EventHandler>,
    pub to: Vec<PlayerId>,
}

impl PendingTrigger {
    #[must_use]
    pub fn new(handler: Arc<dyn EventHandler>, to: Vec<PlayerId>) -> Self {
        Self { handler, to }
    }

    /// The target this option would fire against, if it names one.
    #[must_use]
    pub fn first_target(&self) -> Option<PlayerId> {
        self.to.first().copied()
    }
}

impl std::fmt::Debug for PendingTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTrigger")
            .field("handler", &self.handler.name())
            .field("to", &self.to)
            .finish()
    }
}
