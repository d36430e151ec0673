//! Match preparation, the turn loop, and the play-phase action loop.

use std::sync::Arc;

use crate::areas::{AreaId, AreaType, Direction};
use crate::cards::CardHandle;
use crate::client::{Notification, PlayerProperty, UseCardRequest};
use crate::core::{ControlSignal, GameResult, Phase, PlayerId};
use crate::events::{EventData, EventType};
use crate::skills::SkillDef;

use super::structs::{CardUse, PhaseChange};
use super::GameLogic;

impl GameLogic {
    /// Drive the match to completion.
    pub fn run(&mut self) {
        if self.start_match().is_err() {
            return;
        }

        loop {
            match self.turn_cycle() {
                Ok(()) => return,
                Err(ControlSignal::GameFinish) => return,
                Err(ControlSignal::TurnBroken) => {
                    if self.recover_turn_broken().is_err() {
                        return;
                    }
                }
                Err(ControlSignal::StageChange) => {}
            }
        }
    }

    /// Prepare the match and fire `GameStart` for every player.
    pub fn start_match(&mut self) -> GameResult<()> {
        self.prepare_to_start()?;
        for player in self.alive_players() {
            self.trigger_simple(EventType::GameStart, player)?;
        }
        Ok(())
    }

    /// Seat rotation and turn dispatch; exits only through a signal.
    fn turn_cycle(&mut self) -> GameResult<()> {
        let mut current = self.current_player();
        loop {
            if self.player(current).seat() == 1 {
                self.round += 1;
            }
            if self.player(current).is_dead() {
                current = self.player(current).next();
                continue;
            }

            self.current_player = current;
            self.trigger_simple(EventType::TurnStart, current)?;
            current = self.player(current).next();

            while let Some(extra) = self.extra_turns.pop_front() {
                self.current_player = extra;
                self.trigger_simple(EventType::TurnStart, extra)?;
            }
        }
    }

    /// Close out a broken turn and advance to the next living player.
    fn recover_turn_broken(&mut self) -> GameResult<()> {
        let current = self.current_player();
        self.trigger_simple(EventType::TurnBroken, current)?;

        let next = self.next_alive(current);
        if self.player(current).phase() != Phase::Inactive {
            if let Some(rule) = self.game_rule() {
                let mut data = EventData::None;
                rule.effect(self, EventType::PhaseEnd, Some(current), &mut data, current)?;
            }
            self.set_phase(current, Phase::Inactive);
        }
        self.current_player = next;
        Ok(())
    }

    /// One full turn of the standard phase sequence.
    pub fn play_turn(&mut self, player: PlayerId) -> GameResult<()> {
        self.play_phases(player, &Phase::TURN)
    }

    /// Walk a phase list: `PhaseChanging` may skip a phase, a skipped
    /// phase fires `PhaseSkipping`, a taken phase runs
    /// `PhaseStart`/`PhaseProceeding`/`PhaseEnd`. Ends with the
    /// transition back to `Inactive` and a cleared skip set.
    pub fn play_phases(&mut self, player: PlayerId, phases: &[Phase]) -> GameResult<()> {
        for &to in phases {
            if to == Phase::Inactive {
                break;
            }

            let mut change = PhaseChange {
                from: self.player(player).phase(),
                to,
            };
            let skip = self.trigger_mut(EventType::PhaseChanging, Some(player), &mut change)?;

            self.set_phase(player, change.to);

            if (skip || self.player(player).is_phase_skipped(change.to))
                && !self.trigger_mut(EventType::PhaseSkipping, Some(player), &mut change)?
            {
                continue;
            }

            if !self.trigger_simple(EventType::PhaseStart, player)? {
                self.trigger_simple(EventType::PhaseProceeding, player)?;
            }
            self.trigger_simple(EventType::PhaseEnd, player)?;
        }

        let mut change = PhaseChange {
            from: self.player(player).phase(),
            to: Phase::Inactive,
        };
        self.trigger_mut(EventType::PhaseChanging, Some(player), &mut change)?;
        self.set_phase(player, Phase::Inactive);
        self.player_mut(player).clear_skipped_phases();
        Ok(())
    }

    // === Play-phase actions ===

    /// One play-phase action round. Returns `Ok(true)` when the player
    /// ends the phase.
    pub fn activate(&mut self, player: PlayerId) -> GameResult<bool> {
        let request = UseCardRequest {
            pattern: None,
            assigned_targets: Vec::new(),
        };
        let Some(reply) = self.client_mut(player).ask_use_card(&request) else {
            return Ok(true);
        };
        if reply.cards.is_empty() && reply.skill.is_none() {
            return Ok(true);
        }

        let targets: Vec<PlayerId> = reply
            .to
            .iter()
            .copied()
            .filter(|to| to.index() < self.player_count())
            .collect();
        let cards = self.find_cards(&reply.cards);

        let card = if let Some(skill_id) = reply.skill {
            if !self.player(player).has_skill(skill_id) {
                return Ok(false);
            }
            let Some(entry) = self.catalog.skill(skill_id).cloned() else {
                return Ok(false);
            };
            match entry.def {
                SkillDef::Proactive(skill) => {
                    if !skill.is_available(self, player, "")
                        || !skill.cards_valid(self, &cards, player, "")
                        || !skill.players_valid(self, &targets, player)
                    {
                        return Ok(false);
                    }
                    if skill.cost(self, player, &targets, &cards)? {
                        skill.effect(self, player, &targets, &cards)?;
                    }
                    self.record_skill_use(player, skill_id, &cards, &targets);
                    return Ok(false);
                }
                SkillDef::ViewAs(skill) => {
                    if !skill.is_available(self, player, "")
                        || !skill.is_valid(self, &cards, player, "")
                    {
                        return Ok(false);
                    }
                    let viewed = skill.view_as(self, &cards, player);
                    if viewed.is_some() {
                        self.record_skill_use(player, skill_id, &cards, &[]);
                    }
                    viewed
                }
                _ => return Ok(false),
            }
        } else {
            cards.first().copied()
        };

        let Some(card) = card else {
            return Ok(true);
        };

        if self.card_face(card).can_recast() && targets.is_empty() {
            self.recast_card(player, card)?;
            return Ok(false);
        }

        if !self.can_use_card(player, card, &targets) {
            return Ok(false);
        }

        let use_ = CardUse::new(player, card).with_targets(targets);
        self.use_card(use_)?;
        Ok(false)
    }

    /// Play-phase validation: availability (per-turn limit with
    /// card-mod extras) and the target rules.
    #[must_use]
    pub fn can_use_card(&self, player: PlayerId, card: CardHandle, targets: &[PlayerId]) -> bool {
        let face = self.card_face(card);
        if !face.is_available(self, player, card) {
            return false;
        }
        if face.target_fixed() {
            return true;
        }

        let mut selected = Vec::new();
        for &target in targets {
            if !face.target_filter(self, card, &selected, target, player) {
                return false;
            }
            selected.push(target);
        }
        face.target_feasible(self, &selected, player)
    }

    /// Ask a player to use a card matching a pattern against assigned
    /// targets (Collateral's forced slash). Returns whether a use
    /// happened.
    pub fn ask_to_use_card(
        &mut self,
        player: PlayerId,
        pattern: &str,
        assigned_targets: &[PlayerId],
    ) -> GameResult<bool> {
        let request = UseCardRequest {
            pattern: Some(pattern.to_string()),
            assigned_targets: assigned_targets.to_vec(),
        };
        let Some(reply) = self.client_mut(player).ask_use_card(&request) else {
            return Ok(false);
        };

        let targets: Vec<PlayerId> = reply
            .to
            .iter()
            .copied()
            .filter(|to| to.index() < self.player_count())
            .collect();
        let cards = self.find_cards(&reply.cards);

        let card = if let Some(skill_id) = reply.skill {
            if !self.player(player).has_skill(skill_id) {
                return Ok(false);
            }
            let Some(entry) = self.catalog.skill(skill_id).cloned() else {
                return Ok(false);
            };
            match entry.def {
                SkillDef::Proactive(skill) => {
                    if !skill.is_available(self, player, pattern)
                        || !skill.cards_valid(self, &cards, player, pattern)
                        || !skill.players_valid(self, &targets, player)
                    {
                        return Ok(false);
                    }
                    if skill.cost(self, player, &targets, &cards)? {
                        skill.effect(self, player, &targets, &cards)?;
                    }
                    self.record_skill_use(player, skill_id, &cards, &targets);
                    return Ok(true);
                }
                SkillDef::ViewAs(skill) => {
                    if !skill.is_available(self, player, pattern)
                        || !skill.is_valid(self, &cards, player, pattern)
                    {
                        return Ok(false);
                    }
                    skill.view_as(self, &cards, player)
                }
                _ => return Ok(false),
            }
        } else {
            cards.first().copied()
        };

        let Some(card) = card else {
            return Ok(false);
        };
        if !assigned_targets.iter().all(|target| targets.contains(target)) {
            return Ok(false);
        }

        let use_ = CardUse::new(player, card).with_targets(targets);
        self.use_card(use_)
    }

    // === Preparation ===

    /// Stand the match up: install the mode's rule, seat the players,
    /// clone the packages' cards into the draw pile, shuffle, and deal
    /// generals.
    ///
    /// Panics if the configured mode is not in the catalog.
    pub fn prepare_to_start(&mut self) -> GameResult<()> {
        let mode = self
            .catalog
            .mode(&self.settings.mode)
            .cloned()
            .expect("configured game mode not in catalog");
        self.set_game_rule(Arc::clone(&mode.rule));

        // Seats in join order; the lobby shuffles if it wants to.
        let player_count = self.player_count();
        for (index, player) in PlayerId::all(player_count).enumerate() {
            let next = PlayerId::new(((index + 1) % player_count) as u8);
            self.player_mut(player).set_seat(index + 1);
            self.player_mut(player).set_next(next);
            self.broadcast_property(player, PlayerProperty::Seat(index + 1));
        }
        self.current_player = PlayerId::new(0);
        let seats = PlayerId::all(player_count).collect();
        self.broadcast(Notification::ArrangeSeat { seats });

        // One arena card per prototype, straight into the draw pile.
        let draw_pile = AreaId::global(AreaType::DrawPile);
        let mut card_ids = Vec::new();
        for package in self.catalog.packages_for_mode(&mode.name) {
            for proto in &package.cards {
                card_ids.push((proto.id, proto.suit, proto.number, Arc::clone(&proto.face)));
            }
        }
        for (id, suit, number, face) in card_ids {
            let handle = self.cards.insert_real(id, suit, number, face);
            self.area_mut(draw_pile).add(handle, Direction::Bottom);
            self.positions.insert(handle, draw_pile);
        }
        let ids = self
            .area(draw_pile)
            .cards()
            .iter()
            .map(|&card| self.cards.get(card).id())
            .collect();
        self.broadcast(Notification::PrepareCards { cards: ids });

        self.shuffle_draw_pile();

        self.deal_generals(&mode.name)?;
        Ok(())
    }

    /// Shuffle the draw pile in place.
    pub fn shuffle_draw_pile(&mut self) {
        let draw_pile = AreaId::global(AreaType::DrawPile);
        if let Some(area) = self.areas.get_mut(&draw_pile) {
            area.shuffle(&mut self.rng);
        }
    }

    /// Offer each player a slate of general candidates and apply the
    /// choice; a decline takes the first candidate.
    fn deal_generals(&mut self, mode: &str) -> GameResult<()> {
        const CANDIDATES_PER_PLAYER: usize = 3;

        let mut pool = self.catalog.generals_for_mode(mode);
        if pool.is_empty() {
            return Ok(());
        }
        self.rng_mut().shuffle(&mut pool);

        let needed = CANDIDATES_PER_PLAYER * self.player_count();
        let originals = pool.len();
        while pool.len() < needed {
            let fill = pool[pool.len() % originals];
            pool.push(fill);
        }

        for player in PlayerId::all(self.player_count()) {
            let seat = self.player(player).seat();
            let candidates =
                pool[(seat - 1) * CANDIDATES_PER_PLAYER..seat * CANDIDATES_PER_PLAYER].to_vec();

            let reply = self.client_mut(player).ask_general(&candidates, 1);
            let chosen = reply
                .and_then(|choices| {
                    choices
                        .into_iter()
                        .find(|choice| candidates.contains(choice))
                })
                .unwrap_or(candidates[0]);

            self.apply_general(player, chosen);
        }
        Ok(())
    }
}
