//! The standard game rule: drives phases, resolves delayed tricks,
//! enforces the discard-down-to-hp step, and adjudicates death.

use crate::areas::{AreaId, AreaType};
use crate::cards::CardHandle;
use crate::core::{GameResult, Phase, PlayerId};
use crate::events::{EventData, EventHandler, EventMap, EventType};
use crate::game::structs::{CardEffect, CardsMove};
use crate::game::GameLogic;

const INITIAL_HAND: usize = 4;
const DRAW_PER_TURN: usize = 2;

/// The rule handler of the standard mode. Compulsory, priority 0, so
/// trigger skills see every event first.
pub struct GameRule;

impl GameRule {
    fn proceed_phase(&self, logic: &mut GameLogic, player: PlayerId) -> GameResult<()> {
        match logic.player(player).phase() {
            Phase::Judge => self.resolve_delayed_tricks(logic, player),
            Phase::Draw => logic.draw_cards(player, DRAW_PER_TURN),
            Phase::Play => {
                while !logic.activate(player)? {
                    if logic.player(player).is_dead() {
                        break;
                    }
                }
                Ok(())
            }
            Phase::Discard => self.discard_to_hand_limit(logic, player),
            _ => Ok(()),
        }
    }

    /// Resolve the judge-phase delayed tricks, newest first (cards
    /// append to the area, so newest is last).
    fn resolve_delayed_tricks(&self, logic: &mut GameLogic, player: PlayerId) -> GameResult<()> {
        let area = AreaId::of_player(AreaType::DelayedTrick, player);
        let tricks: Vec<CardHandle> = logic.area(area).cards().to_vec();

        for card in tricks.into_iter().rev() {
            if !logic.area(area).contains(card) || logic.player(player).is_dead() {
                continue;
            }

            let face = logic.card_face(card);
            let mut effect = CardEffect {
                from: None,
                to: Some(player),
                card,
                target_card: None,
                nullified: false,
            };
            logic.take_card_effect(&mut effect)?;
            face.complete(logic, card)?;
        }
        Ok(())
    }

    fn discard_to_hand_limit(&self, logic: &mut GameLogic, player: PlayerId) -> GameResult<()> {
        let hand = logic.hand_cards(player).len() as i32;
        let keep = logic.player(player).hp().max(0);
        let over = hand - keep;
        if over <= 0 {
            return Ok(());
        }

        let cards = logic.ask_for_cards(player, ".", over as usize, over as usize, false);
        if cards.is_empty() {
            return Ok(());
        }
        let discard = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
            .with_cards(cards)
            .open();
        logic.move_cards(vec![discard])
    }

    /// Dump a dead player's cards into the discard pile.
    fn bury(&self, logic: &mut GameLogic, victim: PlayerId) -> GameResult<()> {
        let mut moves = Vec::new();
        for kind in [
            AreaType::Hand,
            AreaType::Equip,
            AreaType::DelayedTrick,
            AreaType::Judge,
        ] {
            let area = AreaId::of_player(kind, victim);
            let cards = logic.area(area).cards().to_vec();
            if !cards.is_empty() {
                moves.push(
                    CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
                        .from_area(area)
                        .with_cards(cards)
                        .open(),
                );
            }
        }
        if moves.is_empty() {
            return Ok(());
        }
        logic.move_cards(moves)
    }
}

impl EventHandler for GameRule {
    fn name(&self) -> &str {
        "game_rule"
    }

    fn events(&self) -> &[EventType] {
        &[
            EventType::GameStart,
            EventType::TurnStart,
            EventType::PhaseProceeding,
            EventType::PhaseEnd,
            EventType::AfterHpReduced,
            EventType::GameOverJudge,
            EventType::BuryVictim,
        ]
    }

    fn is_compulsory(&self) -> bool {
        true
    }

    fn triggerable(
        &self,
        _logic: &GameLogic,
        _event: EventType,
        target: Option<PlayerId>,
        _data: &EventData,
    ) -> EventMap {
        match target {
            Some(target) => EventMap::single(target),
            None => EventMap::new(),
        }
    }

    fn effect(
        &self,
        logic: &mut GameLogic,
        event: EventType,
        target: Option<PlayerId>,
        data: &mut EventData,
        _invoker: PlayerId,
    ) -> GameResult<bool> {
        let Some(player) = target else {
            return Ok(false);
        };

        match event {
            EventType::GameStart => {
                logic.draw_cards(player, INITIAL_HAND)?;
            }
            EventType::TurnStart => {
                logic.clear_card_history(player);
                logic.clear_skill_history(player);
                logic.play_turn(player)?;
            }
            EventType::PhaseProceeding => {
                self.proceed_phase(logic, player)?;
            }
            EventType::PhaseEnd => {}
            EventType::AfterHpReduced => {
                if logic.player(player).hp() <= 0 && logic.player(player).is_alive() {
                    let damage = data.try_damage().cloned();
                    logic.kill(player, damage)?;
                }
            }
            EventType::GameOverJudge => {
                let survivors = logic.alive_players();
                if survivors.len() <= 1 {
                    logic.game_over(survivors)?;
                }
            }
            EventType::BuryVictim => {
                self.bury(logic, player)?;
            }
            _ => {}
        }
        Ok(false)
    }
}
