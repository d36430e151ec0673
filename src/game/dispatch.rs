//! The trigger pipeline.
//!
//! Firing an event stably sorts the registered handlers by descending
//! per-event priority and walks them in *bands* of equal priority. Each
//! band collects every handler's `triggerable` nominations into a
//! per-invoker option list; invokers are then visited in action order.
//! An invoker keeps choosing among its options (forced, when exactly one
//! compulsory option remains) until the list runs dry or it cancels.
//! Each chosen option pays `on_cost`, runs `effect`, and then prunes
//! options the consumed target subsumes.
//!
//! A broken `effect` ends its invoker's run and marks the dispatch
//! broken; remaining invokers and later bands still execute, and the
//! sticky flag is what the caller sees.

use crate::client::{TriggerOrderOption, TriggerOrderRequest};
use crate::core::{GameResult, PlayerId};
use crate::events::{EventData, EventPayload, EventType, PendingTrigger};
use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::GameLogic;

impl GameLogic {
    /// Fire an event with no payload.
    pub fn trigger_simple(&mut self, event: EventType, target: PlayerId) -> GameResult<bool> {
        let mut data = EventData::None;
        self.trigger(event, Some(target), &mut data)
    }

    /// Fire an event whose payload lives in a pipeline local. Handler
    /// mutations land back in `payload` when the dispatch returns.
    pub fn trigger_mut<T: EventPayload>(
        &mut self,
        event: EventType,
        target: Option<PlayerId>,
        payload: &mut T,
    ) -> GameResult<bool> {
        let mut data = std::mem::take(payload).wrap();
        let result = self.trigger(event, target, &mut data);
        *payload = T::unwrap(data);
        result
    }

    /// Fire an event. Returns whether any handler broke the dispatch.
    pub fn trigger(
        &mut self,
        event: EventType,
        target: Option<PlayerId>,
        data: &mut EventData,
    ) -> GameResult<bool> {
        let mut handlers = self.handlers_for(event);
        handlers.sort_by_key(|handler| std::cmp::Reverse(handler.priority(event)));

        let mut broken = false;
        let mut index = 0;
        while index < handlers.len() {
            let band_priority = handlers[index].priority(event);

            // Collect the band's nominations per invoker, preserving
            // handler order within each invoker's list.
            let mut pending: FxHashMap<PlayerId, Vec<PendingTrigger>> = FxHashMap::default();
            while index < handlers.len() && handlers[index].priority(event) == band_priority {
                let handler = Arc::clone(&handlers[index]);
                let mut nominated = handler.triggerable(self, event, target, data);
                for invoker in PlayerId::all(self.player_count()) {
                    for to in nominated.take(invoker) {
                        pending
                            .entry(invoker)
                            .or_default()
                            .push(PendingTrigger::new(Arc::clone(&handler), to));
                    }
                }
                index += 1;
            }

            if pending.is_empty() {
                continue;
            }

            for invoker in self.alive_players() {
                let Some(mut options) = pending.remove(&invoker) else {
                    continue;
                };

                loop {
                    if options.is_empty() {
                        break;
                    }

                    let has_compulsory =
                        options.iter().any(|option| option.handler.is_compulsory());

                    // A lone compulsory option is forced; everything
                    // else goes through the trigger-order prompt.
                    let choice_index = if options.len() == 1 && has_compulsory {
                        Some(0)
                    } else {
                        self.ask_for_trigger_order(invoker, &options, !has_compulsory)
                    };

                    let Some(choice_index) = choice_index else {
                        break;
                    };
                    let choice = options[choice_index].clone();
                    let event_target = choice.first_target().or(target);

                    let take_effect =
                        choice
                            .handler
                            .on_cost(self, event, event_target, data, invoker)?;
                    if take_effect {
                        if choice.handler.effect(self, event, event_target, data, invoker)? {
                            broken = true;
                            break;
                        }
                    }

                    prune_options(&mut options, &choice);
                }
            }
        }

        Ok(broken)
    }

    /// Ask an invoker to order its trigger options. `None` means cancel
    /// (only offered when no option is compulsory); on decline or an
    /// out-of-range reply the first option is forced instead.
    fn ask_for_trigger_order(
        &mut self,
        invoker: PlayerId,
        options: &[PendingTrigger],
        cancelable: bool,
    ) -> Option<usize> {
        let request = TriggerOrderRequest {
            options: options
                .iter()
                .map(|option| TriggerOrderOption {
                    name: option.handler.name().to_string(),
                    to: option.to.clone(),
                })
                .collect(),
            cancelable,
        };

        let reply = self.client_mut(invoker).ask_trigger_order(&request);
        match reply {
            Some(index) if index < options.len() => Some(index),
            _ if cancelable => None,
            _ => Some(0),
        }
    }
}

/// Drop options the chosen invocation subsumes: for every option of the
/// same handler, targets up to and including each consumed target are
/// spent; an option whose target queue empties (or that never had one,
/// when the choice had none either) is dropped.
fn prune_options(options: &mut Vec<PendingTrigger>, choice: &PendingTrigger) {
    let mut index = 0;
    while index < options.len() {
        if !Arc::ptr_eq(&options[index].handler, &choice.handler) {
            index += 1;
            continue;
        }

        if choice.to.is_empty() {
            options.remove(index);
            continue;
        }

        let mut removed = false;
        for consumed in &choice.to {
            if let Some(pos) = options[index].to.iter().position(|to| to == consumed) {
                if pos == options[index].to.len() - 1 {
                    options.remove(index);
                    removed = true;
                    break;
                }
                options[index].to.drain(..=pos);
            }
        }
        if !removed {
            index += 1;
        }
    }
}
