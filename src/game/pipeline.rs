//! The card pipelines: movement, draw, use and effect, response, judge,
//! and the hp family.

use crate::areas::{AreaId, AreaType, Direction};
use crate::cards::{CardHandle, CardPattern};
use crate::client::{
    CardRequest, CardsMoveInfo, ChooseCardRequest, Notification, PlayerProperty,
};
use crate::core::{ControlSignal, GameResult, Phase, PlayerId};
use crate::events::{EventData, EventType};
use crate::skills::SkillDef;

use super::structs::{
    CardEffect, CardResponse, CardUse, CardsMove, DamageStruct, DeathStruct, HpLoss, JudgeStruct,
    RecoverStruct,
};
use super::GameLogic;

impl GameLogic {
    // === Movement ===

    /// The only mutator of area membership. Fires `BeforeCardsMove` and
    /// `CardsMove` for each living player (re-filtering in between),
    /// performs the transfers, notifies every viewer under its
    /// visibility mask, then fires `AfterCardsMove`.
    pub fn move_cards(&mut self, moves: Vec<CardsMove>) -> GameResult<()> {
        let mut moves = moves;
        self.filter_moves(&mut moves);

        let mut data = EventData::Moves(moves);
        for player in self.alive_players() {
            self.trigger(EventType::BeforeCardsMove, Some(player), &mut data)?;
        }

        let mut moves = match data {
            EventData::Moves(moves) => moves,
            _ => unreachable!("move dispatch changed its payload variant"),
        };
        self.filter_moves(&mut moves);

        let mut data = EventData::Moves(moves);
        for player in self.alive_players() {
            self.trigger(EventType::CardsMove, Some(player), &mut data)?;
        }

        let mut moves = match data {
            EventData::Moves(moves) => moves,
            _ => unreachable!("move dispatch changed its payload variant"),
        };
        self.filter_moves(&mut moves);

        // Transfers, guarded by each card's current position.
        for move_ in &moves {
            if !self.areas.contains_key(&move_.to) || !self.areas.contains_key(&move_.from) {
                continue;
            }
            for &card in &move_.cards {
                if self.positions.get(&card) != Some(&move_.from) {
                    continue;
                }
                let removed = self
                    .areas
                    .get_mut(&move_.from)
                    .is_some_and(|area| area.remove(card));
                if removed {
                    self.area_mut(move_.to).add(card, move_.to_direction);
                    self.positions.insert(card, move_.to);
                }
            }
        }

        for viewer in PlayerId::all(self.player_count()) {
            let infos: Vec<CardsMoveInfo> = moves
                .iter()
                .map(|move_| self.move_info_for(move_, viewer))
                .collect();
            self.notify(viewer, Notification::MoveCards { moves: infos });
        }

        let mut data = EventData::Moves(moves);
        for player in self.alive_players() {
            self.trigger(EventType::AfterCardsMove, Some(player), &mut data)?;
        }
        Ok(())
    }

    fn move_info_for(&self, move_: &CardsMove, viewer: PlayerId) -> CardsMoveInfo {
        let cards = move_.is_relevant(viewer).then(|| {
            move_
                .cards
                .iter()
                .map(|&card| self.cards.get(card).id())
                .collect()
        });
        CardsMoveInfo {
            from: move_.from,
            to: move_.to,
            count: move_.cards.len(),
            cards,
        }
    }

    /// The filtering pass: decompose virtual cards (relocating their
    /// tokens between keep-virtual areas) and split unknown-source
    /// moves by the cards' actual positions.
    fn filter_moves(&mut self, moves: &mut Vec<CardsMove>) {
        let mut index = 0;
        while index < moves.len() {
            let destination = moves[index].to;
            let direction = moves[index].to_direction;
            let keep = self
                .areas
                .get(&destination)
                .is_some_and(|area| area.keeps_virtual());

            let mut cards = Vec::with_capacity(moves[index].cards.len());
            for card in moves[index].cards.clone() {
                if !self.cards.is_virtual(card) {
                    cards.push(card);
                    continue;
                }

                cards.extend(self.cards.real_cards(card));

                let name = self.cards.name(card).to_string();
                if let Some(old_area) = self.positions.remove(&card) {
                    if let Some(area) = self.areas.get_mut(&old_area) {
                        area.remove(card);
                    }
                    self.broadcast(Notification::SetVirtualCard {
                        name: name.clone(),
                        area: old_area,
                        exists: false,
                    });
                }
                if keep {
                    self.area_mut(destination).add(card, direction);
                    self.positions.insert(card, destination);
                    self.broadcast(Notification::SetVirtualCard {
                        name,
                        area: destination,
                        exists: true,
                    });
                }
            }

            if moves[index].from.kind != AreaType::Unknown {
                moves[index].cards = cards;
                index += 1;
                continue;
            }

            // Partition by actual position, preserving card order.
            let mut groups: Vec<(AreaId, Vec<CardHandle>)> = Vec::new();
            for card in cards {
                let Some(&position) = self.positions.get(&card) else {
                    continue;
                };
                match groups.iter_mut().find(|(area, _)| *area == position) {
                    Some((_, group)) => group.push(card),
                    None => groups.push((position, vec![card])),
                }
            }

            let template = moves.remove(index);
            for (from, cards) in groups {
                moves.push(CardsMove {
                    from,
                    cards,
                    ..template.clone()
                });
            }
        }
    }

    // === Draw pile ===

    /// Peek the top `n` draw-pile cards, reshuffling the discard pile
    /// underneath first if needed. An unfillable request ends the match
    /// as a stalemate.
    pub fn draw_pile_cards(&mut self, n: usize) -> GameResult<Vec<CardHandle>> {
        let draw_pile = AreaId::global(AreaType::DrawPile);
        loop {
            if self.area(draw_pile).len() >= n {
                return Ok(self.area(draw_pile).top(n).to_vec());
            }
            if self.area(AreaId::global(AreaType::DiscardPile)).is_empty() {
                self.game_over(Vec::new())?;
            }
            if let Some(cap) = self.settings.reshuffle_cap {
                if self.reshuffle_count >= cap {
                    self.game_over(Vec::new())?;
                }
            }
            self.reshuffle_draw_pile();
        }
    }

    /// Shuffle the discard pile and append it under the draw pile.
    pub fn reshuffle_draw_pile(&mut self) {
        self.reshuffle_count += 1;

        let mut cards = self
            .area_mut(AreaId::global(AreaType::DiscardPile))
            .take_all();
        self.rng_mut().shuffle(&mut cards);

        let draw_pile = AreaId::global(AreaType::DrawPile);
        for &card in &cards {
            self.area_mut(draw_pile).add(card, Direction::Bottom);
            self.positions.insert(card, draw_pile);
        }
    }

    /// Move `n` cards from the top of the draw pile into a hand.
    pub fn draw_cards(&mut self, player: PlayerId, n: usize) -> GameResult<()> {
        if n == 0 {
            return Ok(());
        }
        let cards = self.draw_pile_cards(n)?;
        let move_ = CardsMove::to_area(AreaId::of_player(AreaType::Hand, player))
            .from_area(AreaId::global(AreaType::DrawPile))
            .with_cards(cards);
        self.move_cards(vec![move_])
    }

    // === Card use ===

    /// The card-use pipeline.
    pub fn use_card(&mut self, use_: CardUse) -> GameResult<bool> {
        let mut use_ = use_;
        let Some(from) = use_.from else {
            return Ok(false);
        };

        let hand = AreaId::of_player(AreaType::Hand, from);
        let real_cards = self.cards.real_cards(use_.card);
        use_.is_handcard = real_cards
            .iter()
            .all(|&card| self.position(card) == Some(hand));

        if self.player(from).phase() == Phase::Play && use_.add_history {
            let name = self.cards.name(use_.card).to_string();
            self.add_card_history(from, &name, 1);
        }

        let face = self.card_face(use_.card);
        face.on_use(self, &mut use_)?;

        self.trigger_mut(EventType::CardUsed, Some(from), &mut use_)?;

        if self.player(from).is_alive() {
            self.trigger_mut(EventType::TargetChoosing, Some(from), &mut use_)?;

            let card_id = self.cards.effective_id(use_.card);
            self.broadcast(Notification::UseCard {
                from,
                to: use_.to.clone(),
                card: card_id,
            });

            if !use_.to.is_empty() {
                for to in use_.to.clone() {
                    if use_.to.contains(&to) {
                        self.trigger_mut(EventType::TargetConfirming, Some(to), &mut use_)?;
                    }
                }

                if !use_.to.is_empty() {
                    self.trigger_mut(EventType::TargetChosen, Some(from), &mut use_)?;

                    if !use_.to.is_empty() {
                        for to in use_.to.clone() {
                            if use_.to.contains(&to) {
                                self.trigger_mut(
                                    EventType::TargetConfirmed,
                                    Some(to),
                                    &mut use_,
                                )?;
                            }
                        }
                        face.use_card(self, &mut use_)?;
                    }
                }
            } else if use_.target.is_some() {
                face.use_card(self, &mut use_)?;
            }
        }

        self.trigger_mut(EventType::CardFinished, Some(from), &mut use_)?;
        Ok(true)
    }

    /// Resolve one card effect. Returns whether the effect took place
    /// (was not cancelled by `CardEffect`/`CardEffected` handlers).
    pub fn take_card_effect(&mut self, effect: &mut CardEffect) -> GameResult<bool> {
        let face = self.card_face(effect.card);
        let mut canceled = false;

        if let Some(to) = effect.to {
            if self.player(to).is_alive() {
                canceled = self.trigger_mut(EventType::CardEffect, Some(to), effect)?;
                if !canceled {
                    canceled = self.trigger_mut(EventType::CardEffected, Some(to), effect)?;
                    if !canceled {
                        face.on_effect(self, effect)?;
                        if self.player(to).is_alive() && !effect.nullified {
                            face.effect(self, effect)?;
                        }
                    }
                }
            }
        } else if effect.target_card.is_some() {
            face.on_effect(self, effect)?;
            if !effect.nullified {
                face.effect(self, effect)?;
            }
        }

        self.trigger_mut(EventType::PostCardEffected, effect.to, effect)?;
        Ok(!canceled)
    }

    /// A card played in answer to a prompt: staged on the table, fires
    /// `CardResponded`, then discarded. Returns whether the response
    /// held (no handler broke it).
    pub fn respond_card(&mut self, response: CardResponse) -> GameResult<bool> {
        let card = response.card;
        let stage = CardsMove::to_area(AreaId::global(AreaType::Table))
            .with_cards(vec![card])
            .open();
        self.move_cards(vec![stage])?;

        let mut response = response;
        let broken = self.trigger_mut(EventType::CardResponded, response.from, &mut response)?;

        if self.area(AreaId::global(AreaType::Table)).contains(card) {
            let discard = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
                .with_cards(vec![card])
                .open();
            self.move_cards(vec![discard])?;
        }
        Ok(!broken)
    }

    /// Recast: discard the card through the table and draw a fresh one.
    pub fn recast_card(&mut self, player: PlayerId, card: CardHandle) -> GameResult<()> {
        let stage = CardsMove::to_area(AreaId::global(AreaType::Table))
            .with_cards(vec![card])
            .open();
        self.move_cards(vec![stage])?;

        if self.area(AreaId::global(AreaType::Table)).contains(card) {
            let discard = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
                .with_cards(vec![card])
                .open();
            self.move_cards(vec![discard])?;
        }

        self.draw_cards(player, 1)
    }

    // === Prompts for cards ===

    /// Ask a player for one card matching a pattern. A mandatory
    /// request that is declined auto-picks the first matching card from
    /// the hand, then the equip area.
    pub fn ask_for_card(
        &mut self,
        player: PlayerId,
        pattern: &str,
        optional: bool,
    ) -> Option<CardHandle> {
        let request = CardRequest {
            pattern: pattern.to_string(),
            min: 1,
            max: 1,
            optional,
        };
        let reply = self.client_mut(player).ask_for_card(&request);

        if let Some(reply) = reply {
            if let Some(skill_id) = reply.skill {
                if self.player(player).has_skill(skill_id) {
                    if let Some(entry) = self.catalog.skill(skill_id).cloned() {
                        if let SkillDef::ViewAs(skill) = entry.def {
                            let cards = self.find_cards(&reply.cards);
                            if skill.is_available(self, player, pattern)
                                && skill.is_valid(self, &cards, player, pattern)
                            {
                                if let Some(card) = skill.view_as(self, &cards, player) {
                                    self.record_skill_use(player, skill_id, &cards, &[]);
                                    return Some(card);
                                }
                            }
                        }
                    }
                }
            } else {
                let cards = self.find_cards(&reply.cards);
                if cards.len() == 1 {
                    return Some(cards[0]);
                }
            }
        }

        if !optional {
            let pattern = CardPattern::parse(pattern);
            for kind in [AreaType::Hand, AreaType::Equip] {
                let area = AreaId::of_player(kind, player);
                for &card in self.area(area).cards() {
                    if pattern.matches(&self.cards, card) {
                        return Some(card);
                    }
                }
            }
        }
        None
    }

    /// Ask a player for `min..=max` cards. A mandatory request is
    /// padded to `min` with matching cards from hand and equips, and
    /// truncated to `max`.
    pub fn ask_for_cards(
        &mut self,
        player: PlayerId,
        pattern: &str,
        min: usize,
        max: usize,
        optional: bool,
    ) -> Vec<CardHandle> {
        let max = max.max(min);
        let request = CardRequest {
            pattern: pattern.to_string(),
            min,
            max,
            optional,
        };
        let reply = self.client_mut(player).ask_for_card(&request);
        let mut cards = reply
            .map(|reply| self.find_cards(&reply.cards))
            .unwrap_or_default();

        if optional {
            return cards;
        }

        if cards.len() < min {
            let pattern = CardPattern::parse(pattern);
            'fill: for kind in [AreaType::Hand, AreaType::Equip] {
                let area = AreaId::of_player(kind, player);
                for &card in self.area(area).cards() {
                    if cards.len() >= min {
                        break 'fill;
                    }
                    if !cards.contains(&card) && pattern.matches(&self.cards, card) {
                        cards.push(card);
                    }
                }
            }
        } else if cards.len() > max {
            cards.truncate(max);
        }
        cards
    }

    /// Let `chooser` pick a card of `owner`'s, from the areas named by
    /// `flags` (`h` hand, `e` equips, `j` delayed tricks). A hidden
    /// hand is exposed as a count; a decline picks at random.
    pub fn ask_to_choose_card(
        &mut self,
        chooser: PlayerId,
        owner: PlayerId,
        flags: &str,
        handcard_visible: bool,
    ) -> Option<CardHandle> {
        let hand = self
            .area(AreaId::of_player(AreaType::Hand, owner))
            .cards()
            .to_vec();
        let equips = self
            .area(AreaId::of_player(AreaType::Equip, owner))
            .cards()
            .to_vec();
        let tricks = self
            .area(AreaId::of_player(AreaType::DelayedTrick, owner))
            .cards()
            .to_vec();

        let ids = |cards: &[CardHandle]| -> Vec<u32> {
            cards.iter().map(|&card| self.cards.get(card).id()).collect()
        };

        let request = ChooseCardRequest {
            owner,
            handcards: (flags.contains('h') && handcard_visible).then(|| ids(&hand)),
            handcard_count: if flags.contains('h') { hand.len() } else { 0 },
            equips: if flags.contains('e') { ids(&equips) } else { Vec::new() },
            delayed_tricks: if flags.contains('j') { ids(&tricks) } else { Vec::new() },
        };
        let reply = self.client_mut(chooser).ask_choose_player_card(&request);

        if let Some(id) = reply {
            if let Some(card) = self.find_card(id) {
                if flags.contains('h') && handcard_visible && hand.contains(&card) {
                    return Some(card);
                }
                if flags.contains('e') && equips.contains(&card) {
                    return Some(card);
                }
                if flags.contains('j') && tricks.contains(&card) {
                    return Some(card);
                }
            }
        }

        for (flag, cards) in [('h', &hand), ('e', &equips), ('j', &tricks)] {
            if flags.contains(flag) && !cards.is_empty() {
                let index = self.rng_mut().gen_range(0..cards.len());
                return Some(cards[index]);
            }
        }
        None
    }

    /// Ask a player to split `cards` into piles of the given
    /// capacities. A decline or short reply yields empty piles.
    pub fn ask_to_arrange_cards(
        &mut self,
        player: PlayerId,
        cards: &[CardHandle],
        capacities: &[usize],
        area_names: &[&str],
    ) -> Vec<Vec<CardHandle>> {
        let request = crate::client::ArrangeCardRequest {
            cards: cards.iter().map(|&card| self.cards.get(card).id()).collect(),
            capacities: capacities.to_vec(),
            area_names: area_names.iter().map(|name| name.to_string()).collect(),
        };
        let reply = self
            .client_mut(player)
            .ask_arrange_cards(&request)
            .unwrap_or_default();

        capacities
            .iter()
            .enumerate()
            .map(|(index, &capacity)| {
                reply
                    .get(index)
                    .map(|ids| {
                        self.find_cards(ids)
                            .into_iter()
                            .filter(|card| cards.contains(card))
                            .take(capacity)
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Ask a player to pick one of several options. A decline or an
    /// out-of-range reply takes the first option.
    pub fn ask_for_option(&mut self, player: PlayerId, options: &[String]) -> usize {
        if options.len() <= 1 {
            return 0;
        }
        match self.client_mut(player).ask_option(options) {
            Some(choice) if choice < options.len() => choice,
            _ => 0,
        }
    }

    // === Judge ===

    /// The judge sub-protocol: draw a verdict card, invite retrials in
    /// action order, then discard the final judge card.
    pub fn judge(&mut self, judge: &mut JudgeStruct) -> GameResult<()> {
        if self.trigger_mut(EventType::StartJudge, Some(judge.who), judge)? {
            return Ok(());
        }

        let card = self.draw_pile_cards(1)?[0];
        judge.card = Some(card);
        judge.update_result(&self.cards);

        let reveal = CardsMove::to_area(AreaId::of_player(AreaType::Judge, judge.who))
            .from_area(AreaId::global(AreaType::DrawPile))
            .with_cards(vec![card])
            .open();
        self.move_cards(vec![reveal])?;

        for player in self.alive_players() {
            if self.trigger_mut(EventType::AskForRetrial, Some(player), judge)? {
                break;
            }
        }
        self.trigger_mut(EventType::FinishRetrial, Some(judge.who), judge)?;
        self.trigger_mut(EventType::FinishJudge, Some(judge.who), judge)?;

        if let Some(card) = judge.card {
            if self
                .area(AreaId::of_player(AreaType::Judge, judge.who))
                .contains(card)
            {
                let discard = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
                    .with_cards(vec![card])
                    .open();
                self.move_cards(vec![discard])?;
            }
        }
        Ok(())
    }

    // === Damage and hp ===

    /// The damage pipeline.
    pub fn damage(&mut self, damage: DamageStruct) -> GameResult<()> {
        if self.player(damage.to).is_dead() {
            return Ok(());
        }

        let mut damage = damage;
        if !damage.chain && !damage.transfer {
            self.trigger_mut(EventType::ConfirmDamage, damage.from, &mut damage)?;
        }

        if self.trigger_mut(EventType::BeforeDamage, damage.from, &mut damage)? {
            return Ok(());
        }

        let mut broken = self.trigger_mut(EventType::DamageStart, Some(damage.to), &mut damage)?;
        if !broken {
            if let Some(from) = damage.from {
                broken = self.trigger_mut(EventType::Damaging, Some(from), &mut damage)?;
            }
        }
        if !broken {
            self.trigger_mut(EventType::Damaged, Some(damage.to), &mut damage)?;
        }

        self.trigger_mut(EventType::BeforeHpReduced, Some(damage.to), &mut damage)?;

        self.broadcast(Notification::Damage {
            to: damage.to,
            nature: damage.nature,
            amount: damage.damage,
        });
        let new_hp = self.player(damage.to).hp() - damage.damage;
        self.set_hp(damage.to, new_hp);

        self.trigger_mut(EventType::AfterHpReduced, Some(damage.to), &mut damage)?;

        if let Some(from) = damage.from {
            self.trigger_mut(EventType::AfterDamaging, Some(from), &mut damage)?;
        }
        self.trigger_mut(EventType::AfterDamaged, Some(damage.to), &mut damage)?;
        self.trigger_mut(EventType::DamageComplete, Some(damage.to), &mut damage)?;
        Ok(())
    }

    /// Hp loss outside the damage pipeline. `HpLost` handlers may
    /// rewrite the amount; a non-positive result is a no-op.
    pub fn lose_hp(&mut self, victim: PlayerId, amount: i32) -> GameResult<()> {
        if amount <= 0 || self.player(victim).is_dead() {
            return Ok(());
        }

        let mut loss = HpLoss { victim, amount };
        if self.trigger_mut(EventType::HpLost, Some(victim), &mut loss)? {
            return Ok(());
        }
        if loss.amount <= 0 {
            return Ok(());
        }

        let new_hp = self.player(victim).hp() - loss.amount;
        self.set_hp(victim, new_hp);
        self.broadcast(Notification::LoseHp {
            victim,
            amount: loss.amount,
        });

        self.trigger_mut(EventType::AfterHpReduced, Some(victim), &mut loss)?;
        self.trigger_mut(EventType::AfterHpLost, Some(victim), &mut loss)?;
        Ok(())
    }

    /// The recovery pipeline: clamped to max hp, a no-op on the dead or
    /// unwounded.
    pub fn recover(&mut self, recover: RecoverStruct) -> GameResult<()> {
        if self.player(recover.to).is_dead() || self.player(recover.to).lost_hp() == 0 {
            return Ok(());
        }

        let mut recover = recover;
        if self.trigger_mut(EventType::BeforeRecover, Some(recover.to), &mut recover)? {
            return Ok(());
        }

        let player = self.player(recover.to);
        let new_hp = (player.hp() + recover.recover).min(player.max_hp());
        self.set_hp(recover.to, new_hp);
        self.broadcast(Notification::Recover {
            from: recover.from,
            to: recover.to,
            amount: recover.recover,
        });

        self.trigger_mut(EventType::AfterRecover, Some(recover.to), &mut recover)?;
        Ok(())
    }

    /// The death pipeline.
    pub fn kill(&mut self, victim: PlayerId, damage: Option<DamageStruct>) -> GameResult<()> {
        self.player_mut(victim).set_alive(false);
        self.broadcast_property(victim, PlayerProperty::Alive(false));

        let mut death = DeathStruct {
            who: victim,
            damage,
        };
        self.trigger_mut(EventType::BeforeGameOverJudge, Some(victim), &mut death)?;
        self.trigger_mut(EventType::GameOverJudge, Some(victim), &mut death)?;
        self.trigger_mut(EventType::Died, Some(victim), &mut death)?;
        self.trigger_mut(EventType::BuryVictim, Some(victim), &mut death)?;
        Ok(())
    }

    /// Broadcast the result and end the match.
    pub fn game_over(&mut self, winners: Vec<PlayerId>) -> GameResult<()> {
        self.broadcast(Notification::GameOver { winners });
        Err(ControlSignal::GameFinish)
    }
}
