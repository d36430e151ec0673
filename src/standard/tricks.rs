//! Standard trick cards.

use std::sync::Arc;

use crate::areas::{AreaId, AreaType};
use crate::cards::face::{
    area_of_effect_on_use, delayed_on_effect, delayed_on_use, delayed_use, discard_from_table,
    global_effect_on_use, movable_complete, movable_on_use, standard_on_use, trick_on_effect,
    effect_each_target,
};
use crate::cards::{CardFace, CardHandle, CardKind, CardSubtype, UNLIMITED};
use crate::client::Notification;
use crate::core::{ControlSignal, GameResult, PlayerId};
use crate::game::structs::{
    CardEffect, CardResponse, CardUse, CardsMove, DamageNature, DamageStruct, JudgeStruct, Prompt,
    RecoverStruct,
};
use crate::game::GameLogic;

/// The shared part of a single-target trick's target filter.
fn single_target_filter(
    face: &dyn CardFace,
    logic: &GameLogic,
    card: CardHandle,
    selected: &[PlayerId],
    to_select: PlayerId,
    source: PlayerId,
) -> bool {
    if !logic.player(to_select).is_alive() {
        return false;
    }

    let mut distance_limit = face.distance_limit();
    let mut max_targets = face.max_target_num();
    for skill in logic.card_mod_skills(source) {
        if !skill.target_filter(logic, card, selected, to_select, source) {
            return false;
        }
        distance_limit += skill.extra_distance_limit(logic, card, selected, to_select, source);
        max_targets += skill.extra_max_target_num(logic, card, selected, to_select, source);
    }

    (selected.len() as i32) < max_targets && logic.distance(source, to_select) <= distance_limit
}

/// Amazing Grace: reveal one card per living player; everyone picks one
/// in action order.
pub struct AmazingGrace;

impl AmazingGrace {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(AmazingGrace)
    }

    fn clear_rest(&self, logic: &mut GameLogic) -> GameResult<()> {
        logic.broadcast(Notification::ClearAmazingGrace);

        let wugu = AreaId::global(AreaType::Wugu);
        if logic.area(wugu).is_empty() {
            return Ok(());
        }
        let rest = logic.area(wugu).cards().to_vec();
        let move_ = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
            .from_area(wugu)
            .with_cards(rest)
            .open();
        logic.move_cards(vec![move_])
    }
}

impl CardFace for AmazingGrace {
    fn name(&self) -> &str {
        "amazing_grace"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::GlobalEffect
    }

    fn target_fixed(&self) -> bool {
        true
    }

    fn max_target_num(&self) -> i32 {
        UNLIMITED
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        global_effect_on_use(logic, use_)
    }

    fn use_card(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        let count = logic.alive_players().len();
        let cards = logic.draw_pile_cards(count)?;
        let reveal = CardsMove::to_area(AreaId::global(AreaType::Wugu))
            .from_area(AreaId::global(AreaType::DrawPile))
            .with_cards(cards)
            .open();
        logic.move_cards(vec![reveal])?;
        logic.broadcast(Notification::ShowAmazingGrace);

        let result =
            effect_each_target(logic, use_).and_then(|()| discard_from_table(logic, use_.card));
        match result {
            Ok(()) => self.clear_rest(logic),
            Err(signal @ (ControlSignal::TurnBroken | ControlSignal::StageChange)) => {
                self.clear_rest(logic)?;
                Err(signal)
            }
            Err(signal) => Err(signal),
        }
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };

        let wugu = AreaId::global(AreaType::Wugu);
        let choices = logic.area(wugu).cards().to_vec();
        if choices.is_empty() {
            return Ok(());
        }

        let reply = logic.client_mut(to).take_amazing_grace();
        let taken = reply
            .and_then(|id| logic.find_card(id))
            .filter(|card| choices.contains(card))
            .unwrap_or(choices[0]);

        let move_ = CardsMove::to_area(AreaId::of_player(AreaType::Hand, to))
            .from_area(wugu)
            .with_cards(vec![taken])
            .open();
        logic.move_cards(vec![move_])
    }

    fn complete(&self, _logic: &mut GameLogic, _card: CardHandle) -> GameResult<()> {
        // Cleanup already ran inside use_card.
        Ok(())
    }
}

/// God Salvation: every wounded player recovers 1.
pub struct GodSalvation;

impl GodSalvation {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(GodSalvation)
    }
}

impl CardFace for GodSalvation {
    fn name(&self) -> &str {
        "god_salvation"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::GlobalEffect
    }

    fn target_fixed(&self) -> bool {
        true
    }

    fn max_target_num(&self) -> i32 {
        UNLIMITED
    }

    fn is_nullifiable(&self, logic: &GameLogic, effect: &CardEffect) -> bool {
        effect
            .to
            .is_some_and(|to| logic.player(to).is_wounded())
    }

    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        global_effect_on_use(logic, use_)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };
        if logic.player(to).is_wounded() {
            let mut recover = RecoverStruct::new(effect.from, to);
            recover.card = Some(effect.card);
            logic.recover(recover)?;
        }
        Ok(())
    }
}

/// An area-of-effect trick that lets each target answer with a card or
/// take 1 damage.
macro_rules! aoe_trick {
    ($ty:ident, $name:literal, $answer:literal, $prompt:literal) => {
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
                CardKind::Trick
            }

            fn subtype(&self) -> CardSubtype {
                CardSubtype::AreaOfEffect
            }

            fn target_fixed(&self) -> bool {
                true
            }

            fn max_target_num(&self) -> i32 {
                UNLIMITED
            }

            fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
                true
            }

            fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
                area_of_effect_on_use(logic, use_)
            }

            fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
                trick_on_effect(logic, effect)
            }

            fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
                let Some(to) = effect.to else {
                    return Ok(());
                };

                let mut prompt = Prompt::new($prompt);
                if let Some(from) = effect.from {
                    prompt = prompt.with_player(from);
                }
                logic.show_prompt(to, prompt);

                if let Some(answer) = logic.ask_for_card(to, $answer, true) {
                    let response = CardResponse {
                        from: Some(to),
                        to: effect.from,
                        card: answer,
                        target: Some(effect.card),
                    };
                    logic.respond_card(response)?;
                } else {
                    let from = effect
                        .from
                        .filter(|&from| logic.player(from).is_alive());
                    let damage = DamageStruct::new(from, to, 1).with_card(effect.card);
                    logic.damage(damage)?;
                }
                Ok(())
            }
        }
    };
}

aoe_trick!(SavageAssault, "savage_assault", "slash", "savage-assault-slash");
aoe_trick!(ArcheryAttack, "archery_attack", "jink", "archery-attack-jink");

/// Ex Nihilo: draw two, self-targeted.
pub struct ExNihilo;

impl ExNihilo {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(ExNihilo)
    }
}

impl CardFace for ExNihilo {
    fn name(&self) -> &str {
        "ex_nihilo"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::SingleTarget
    }

    fn target_fixed(&self) -> bool {
        true
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        if use_.to.is_empty() {
            if let Some(from) = use_.from {
                use_.to.push(from);
            }
        }
        standard_on_use(logic, use_)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };
        logic.draw_cards(to, 2)
    }
}

/// Duel: the target and the user alternate slashes until one cannot;
/// that one takes 1 damage from the other.
pub struct Duel;

impl Duel {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Duel)
    }
}

impl CardFace for Duel {
    fn name(&self) -> &str {
        "duel"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::SingleTarget
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn target_filter(
        &self,
        logic: &GameLogic,
        card: CardHandle,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        selected.is_empty()
            && to_select != source
            && single_target_filter(self, logic, card, selected, to_select, source)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let (Some(to), Some(from)) = (effect.to, effect.from) else {
            return Ok(());
        };

        let mut first = to;
        let mut second = from;
        loop {
            if !logic.player(first).is_alive() {
                break;
            }
            logic.show_prompt(first, Prompt::new("duel-slash").with_player(second));
            let Some(slash) = logic.ask_for_card(first, "slash", true) else {
                break;
            };
            let response = CardResponse {
                from: Some(first),
                to: Some(second),
                card: slash,
                target: Some(effect.card),
            };
            if !logic.respond_card(response)? {
                break;
            }
            std::mem::swap(&mut first, &mut second);
        }

        let source = (logic.player(second).is_alive()).then_some(second);
        let mut damage = DamageStruct::new(source, first, 1).with_card(effect.card);
        if second != from {
            damage.by_user = false;
        }
        logic.damage(damage)
    }
}

/// Snatch: take one card, hand or field, from a player at distance 1.
pub struct Snatch;

impl Snatch {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Snatch)
    }
}

impl CardFace for Snatch {
    fn name(&self) -> &str {
        "snatch"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::SingleTarget
    }

    fn distance_limit(&self) -> i32 {
        1
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn target_filter(
        &self,
        logic: &GameLogic,
        card: CardHandle,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        selected.is_empty()
            && to_select != source
            && !logic.is_all_nude(to_select)
            && single_target_filter(self, logic, card, selected, to_select, source)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let (Some(to), Some(from)) = (effect.to, effect.from) else {
            return Ok(());
        };
        if logic.player(from).is_dead() || logic.is_all_nude(to) {
            return Ok(());
        }

        if let Some(card) = logic.ask_to_choose_card(from, to, "hej", false) {
            let move_ = CardsMove::to_area(AreaId::of_player(AreaType::Hand, from))
                .with_cards(vec![card]);
            logic.move_cards(vec![move_])?;
        }
        Ok(())
    }
}

/// Dismantlement: discard one card, hand or field, of any player.
pub struct Dismantlement;

impl Dismantlement {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Dismantlement)
    }
}

impl CardFace for Dismantlement {
    fn name(&self) -> &str {
        "dismantlement"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::SingleTarget
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn target_filter(
        &self,
        logic: &GameLogic,
        card: CardHandle,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        selected.is_empty()
            && to_select != source
            && !logic.is_all_nude(to_select)
            && single_target_filter(self, logic, card, selected, to_select, source)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let (Some(to), Some(from)) = (effect.to, effect.from) else {
            return Ok(());
        };
        if logic.player(from).is_dead() || logic.is_all_nude(to) {
            return Ok(());
        }

        if let Some(card) = logic.ask_to_choose_card(from, to, "hej", false) {
            let move_ = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
                .with_cards(vec![card])
                .open();
            logic.move_cards(vec![move_])?;
        }
        Ok(())
    }
}

/// Collateral: order a weapon holder to slash a player in their range,
/// or surrender the weapon.
pub struct Collateral;

impl Collateral {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Collateral)
    }

    const VICTIM_TAG: &'static str = "collateral_victim";

    fn victim(logic: &GameLogic, user: Option<PlayerId>) -> Option<PlayerId> {
        let user = user?;
        let index = logic.player(user).tag(Self::VICTIM_TAG)?;
        (index >= 0 && (index as usize) < logic.player_count())
            .then(|| PlayerId::new(index as u8))
    }

    fn demand_slash(
        logic: &mut GameLogic,
        effect: &CardEffect,
        victim: PlayerId,
    ) -> GameResult<bool> {
        let to = effect.to.expect("collateral resolved without a target");
        if !logic.in_attack_range(to, victim) {
            return Ok(false);
        }
        let mut prompt = Prompt::new("collateral-slash").with_player(victim);
        if let Some(from) = effect.from {
            prompt = prompt.with_player(from);
        }
        logic.show_prompt(to, prompt);
        logic.ask_to_use_card(to, "slash", &[victim])
    }
}

impl CardFace for Collateral {
    fn name(&self) -> &str {
        "collateral"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::SingleTarget
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn is_available(&self, logic: &GameLogic, player: PlayerId, card: CardHandle) -> bool {
        let has_armed_target = logic.other_players(player).into_iter().any(|other| {
            logic
                .equip_of_subtype(other, CardSubtype::Weapon)
                .is_some()
        });

        let mut limit = self.use_limit();
        for skill in logic.card_mod_skills(player) {
            limit += skill.extra_use_num(logic, card, player);
        }
        has_armed_target && (logic.player(player).card_history(self.name()) as i32) < limit
    }

    fn target_feasible(&self, _logic: &GameLogic, selected: &[PlayerId], _source: PlayerId) -> bool {
        selected.len() == 2
    }

    fn target_filter(
        &self,
        logic: &GameLogic,
        card: CardHandle,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        if selected.is_empty() {
            logic.equip_of_subtype(to_select, CardSubtype::Weapon).is_some()
                && to_select != source
                && single_target_filter(self, logic, card, selected, to_select, source)
        } else if selected.len() == 1 {
            logic.in_attack_range(selected[0], to_select)
        } else {
            false
        }
    }

    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        if use_.to.len() >= 2 {
            let victim = use_.to.remove(1);
            if let Some(from) = use_.from {
                logic
                    .player_mut(from)
                    .set_tag(Self::VICTIM_TAG, victim.index() as i64);
                logic.broadcast_tag(from, Self::VICTIM_TAG);
            }
        }
        standard_on_use(logic, use_)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };
        let Some(victim) = Self::victim(logic, effect.from) else {
            return Ok(());
        };

        let weapon = logic.equip_of_subtype(to, CardSubtype::Weapon);
        let surrender_weapon = |logic: &mut GameLogic| -> GameResult<()> {
            if let (Some(weapon), Some(from)) = (weapon, effect.from) {
                if logic.player(from).is_alive() && logic.player(to).is_alive() {
                    let move_ = CardsMove::to_area(AreaId::of_player(AreaType::Hand, from))
                        .with_cards(vec![weapon]);
                    logic.move_cards(vec![move_])?;
                }
            }
            Ok(())
        };

        if logic.player(victim).is_dead() {
            surrender_weapon(logic)?;
        } else if effect.from.is_some_and(|from| logic.player(from).is_dead()) {
            if logic.player(to).is_alive() {
                Self::demand_slash(logic, effect, victim)?;
            }
        } else if logic.player(to).is_alive() {
            if weapon.is_none() {
                Self::demand_slash(logic, effect, victim)?;
            } else if !Self::demand_slash(logic, effect, victim)? {
                surrender_weapon(logic)?;
            }
        }
        Ok(())
    }

    fn complete(&self, logic: &mut GameLogic, card: CardHandle) -> GameResult<()> {
        for player in PlayerId::all(logic.player_count()) {
            logic.player_mut(player).remove_tag(Self::VICTIM_TAG);
        }
        discard_from_table(logic, card)
    }
}

/// Nullification: cancels the trick effect it answers; answering
/// another nullification flips that one's verdict instead.
pub struct Nullification;

impl Nullification {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Nullification)
    }
}

impl CardFace for Nullification {
    fn name(&self) -> &str {
        "nullification"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::SingleTarget
    }

    fn target_fixed(&self) -> bool {
        true
    }

    fn is_available(&self, _logic: &GameLogic, _player: PlayerId, _card: CardHandle) -> bool {
        false
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        trick_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, _effect: &mut CardEffect) -> GameResult<()> {
        if let Some(scope) = logic.nullify_scope_mut() {
            if scope.to.is_some() {
                scope.nullified = true;
            } else if scope.card_is_nullification {
                scope.flipped = true;
            }
        }
        Ok(())
    }
}

/// Indulgence: on the target's judge phase, a non-heart verdict skips
/// their play phase.
pub struct Indulgence;

impl Indulgence {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Indulgence)
    }
}

impl CardFace for Indulgence {
    fn name(&self) -> &str {
        "indulgence"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::Delayed
    }

    fn judge_pattern(&self) -> &str {
        ".|^heart"
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn target_filter(
        &self,
        logic: &GameLogic,
        card: CardHandle,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        selected.is_empty()
            && to_select != source
            && !logic.delayed_trick_contains(to_select, self.name())
            && single_target_filter(self, logic, card, selected, to_select, source)
    }

    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        delayed_on_use(logic, use_)
    }

    fn use_card(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        delayed_use(logic, use_)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        delayed_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };

        let mut judge = JudgeStruct::new(to, self.judge_pattern());
        logic.judge(&mut judge)?;

        if judge.matched {
            logic.clear_card_history(to);
            logic.player_mut(to).skip_phase(crate::core::Phase::Play);
        }
        Ok(())
    }
}

/// Lightning: hops around the ring until a spade 2-9 judge drops 3
/// thunder damage on its holder.
pub struct Lightning;

impl Lightning {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Lightning)
    }
}

impl CardFace for Lightning {
    fn name(&self) -> &str {
        "lightning"
    }

    fn kind(&self) -> CardKind {
        CardKind::Trick
    }

    fn subtype(&self) -> CardSubtype {
        CardSubtype::Delayed
    }

    fn target_fixed(&self) -> bool {
        true
    }

    fn judge_pattern(&self) -> &str {
        ".|spade|2~9"
    }

    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        true
    }

    fn is_available(&self, logic: &GameLogic, player: PlayerId, card: CardHandle) -> bool {
        if logic.delayed_trick_contains(player, self.name()) {
            return false;
        }
        let mut limit = self.use_limit();
        for skill in logic.card_mod_skills(player) {
            limit += skill.extra_use_num(logic, card, player);
        }
        (logic.player(player).card_history(self.name()) as i32) < limit
    }

    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        movable_on_use(logic, use_)
    }

    fn use_card(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        delayed_use(logic, use_)
    }

    fn on_effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        delayed_on_effect(logic, effect)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };

        let mut judge = JudgeStruct::new(to, self.judge_pattern());
        logic.judge(&mut judge)?;

        if judge.matched {
            let damage = DamageStruct::new(None, to, 3)
                .with_card(effect.card)
                .with_nature(DamageNature::Thunder);
            logic.damage(damage)?;
            discard_from_table(logic, effect.card)?;
        }
        Ok(())
    }

    fn complete(&self, logic: &mut GameLogic, card: CardHandle) -> GameResult<()> {
        movable_complete(logic, card)
    }
}
