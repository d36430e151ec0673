//! Card behavior descriptors.
//!
//! A `CardFace` is the immutable behavior of a card name: its kind and
//! subtype, targeting rules, and the hooks the card-use pipeline calls.
//! Every instance of "duel" in the arena shares one face.
//!
//! The hook defaults implement the plain-card lifecycle: `on_use` sorts
//! targets, fires `PreCardUsed` and puts the card on the table;
//! `use_card` resolves one effect per target and then `complete`s, which
//! discards the card if it is still on the table. Variant families
//! (tricks, equips, delayed tricks) reuse the free functions below the
//! trait instead of a class hierarchy.

use crate::areas::{AreaId, AreaType};
use crate::cards::{CardHandle, CardKind, CardSubtype, UNLIMITED};
use crate::core::{GameResult, PlayerId};
use crate::events::EventType;
use crate::game::structs::{CardEffect, CardUse, CardsMove, NullifyScope, Prompt};
use crate::game::GameLogic;

/// Behavior of one card name.
///
/// Faces are stateless and shared (`Arc<dyn CardFace>`); all mutable
/// state lives on the arena card and in the match.
pub trait CardFace: Send + Sync {
    /// The card's name, also its variant identity: no player may hold
    /// two delayed tricks of the same name, and use limits count by it.
    fn name(&self) -> &str;

    fn kind(&self) -> CardKind;

    fn subtype(&self) -> CardSubtype {
        CardSubtype::None
    }

    /// Whether targets are implied rather than chosen.
    fn target_fixed(&self) -> bool {
        false
    }

    fn can_recast(&self) -> bool {
        false
    }

    fn is_transferable(&self) -> bool {
        false
    }

    /// Uses allowed per turn, before card-mod extras.
    fn use_limit(&self) -> i32 {
        UNLIMITED
    }

    fn max_target_num(&self) -> i32 {
        1
    }

    fn min_target_num(&self) -> i32 {
        1
    }

    /// Maximum seat distance to a target, before card-mod extras.
    fn distance_limit(&self) -> i32 {
        UNLIMITED
    }

    /// Weapons override; 0 means "not a weapon".
    fn attack_range(&self) -> i32 {
        0
    }

    /// Judge pattern of a delayed trick.
    fn judge_pattern(&self) -> &str {
        "."
    }

    /// Whether this card may be played right now, honoring the per-turn
    /// use limit and card-mod extras.
    fn is_available(&self, logic: &GameLogic, player: PlayerId, card: CardHandle) -> bool {
        let mut limit = self.use_limit();
        for skill in logic.card_mod_skills(player) {
            limit += skill.extra_use_num(logic, card, player);
        }
        (logic.player(player).card_history(self.name()) as i32) < limit
    }

    /// Whether the selected target set is complete enough to use.
    fn target_feasible(&self, _logic: &GameLogic, selected: &[PlayerId], _source: PlayerId) -> bool {
        let n = selected.len() as i32;
        self.min_target_num() <= n && n <= self.max_target_num()
    }

    /// Whether one more target may be selected.
    fn target_filter(
        &self,
        logic: &GameLogic,
        card: CardHandle,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        if !logic.player(to_select).is_alive() {
            return false;
        }

        let mut distance_limit = self.distance_limit();
        let mut max_targets = self.max_target_num();
        for skill in logic.card_mod_skills(source) {
            if !skill.target_filter(logic, card, selected, to_select, source) {
                return false;
            }
            distance_limit += skill.extra_distance_limit(logic, card, selected, to_select, source);
            max_targets += skill.extra_max_target_num(logic, card, selected, to_select, source);
        }

        (selected.len() as i32) < max_targets && logic.distance(source, to_select) <= distance_limit
    }

    /// Whether a trick's effect may be answered with a nullification.
    fn is_nullifiable(&self, _logic: &GameLogic, _effect: &CardEffect) -> bool {
        false
    }

    // === Pipeline hooks ===

    /// Pre-use step: arrange targets, announce, stage the card.
    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        standard_on_use(logic, use_)
    }

    /// The card's substantive action once targets are locked in.
    fn use_card(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        effect_each_target(logic, use_)?;
        self.complete(logic, use_.card)
    }

    /// Per-target preamble, before the effect proper.
    fn on_effect(&self, _logic: &mut GameLogic, _effect: &mut CardEffect) -> GameResult<()> {
        Ok(())
    }

    /// The effect proper on one target.
    fn effect(&self, _logic: &mut GameLogic, _effect: &mut CardEffect) -> GameResult<()> {
        Ok(())
    }

    /// Cleanup after all effects resolved.
    fn complete(&self, logic: &mut GameLogic, card: CardHandle) -> GameResult<()> {
        discard_from_table(logic, card)
    }
}

// === Shared behaviors ===

/// The per-target half of the default `use_card`: one effect per
/// surviving target, plus the targeted-card branch.
pub fn effect_each_target(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    for to in use_.to.clone() {
        if !use_.to.contains(&to) {
            continue;
        }
        let mut effect = CardEffect::from_use(use_, Some(to));
        logic.take_card_effect(&mut effect)?;
    }

    if use_.target.is_some() {
        let mut effect = CardEffect::from_use(use_, None);
        logic.take_card_effect(&mut effect)?;
    }
    Ok(())
}

/// Plain-card `on_use`: sort targets into action order, fire
/// `PreCardUsed`, stage the card on the table.
pub fn standard_on_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    logic.sort_by_action_order(&mut use_.to);
    logic.trigger_mut(EventType::PreCardUsed, use_.from, use_)?;

    let move_ = CardsMove::to_area(AreaId::global(AreaType::Table))
        .with_cards(vec![use_.card])
        .open();
    logic.move_cards(vec![move_])
}

/// Discard a card if it is still on the table.
pub fn discard_from_table(logic: &mut GameLogic, card: CardHandle) -> GameResult<()> {
    if !logic.area(AreaId::global(AreaType::Table)).contains(card) {
        return Ok(());
    }
    let move_ = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
        .with_cards(vec![card])
        .open();
    logic.move_cards(vec![move_])
}

/// Trick `on_effect`: offer every living player, in action order, the
/// chance to answer with a nullification. The first acceptance uses the
/// nullification against this effect; its outcome lands in
/// `effect.nullified` when the scope is popped.
pub fn trick_on_effect(logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
    let face = logic.card_face(effect.card);
    if !face.is_nullifiable(logic, effect) {
        return Ok(());
    }

    logic.push_nullify_scope(NullifyScope::for_effect(logic, effect));
    let round = nullification_round(logic, effect);
    let scope = logic.pop_nullify_scope();
    round?;

    if scope.nullified {
        effect.nullified = true;
    }
    if scope.flipped {
        effect.nullified = !effect.nullified;
    }
    Ok(())
}

fn nullification_round(logic: &mut GameLogic, effect: &CardEffect) -> GameResult<()> {
    for player in logic.alive_players() {
        let mut prompt = Prompt::new("trick-nullification");
        if let Some(from) = effect.from {
            prompt = prompt.with_player(from);
        }
        if let Some(to) = effect.to {
            prompt = prompt.with_player(to);
        }
        prompt = prompt.with_card(logic.cards().effective_id(effect.card));
        logic.show_prompt(player, prompt);

        if let Some(card) = logic.ask_for_card(player, "nullification", true) {
            let mut use_ = CardUse::new(player, card);
            use_.target = Some(effect.card);
            logic.use_card(use_)?;
            break;
        }
    }
    Ok(())
}

/// Global-effect `on_use`: an empty target list auto-fills with every
/// player passing the target filter.
pub fn global_effect_on_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    if use_.to.is_empty() {
        if let Some(from) = use_.from {
            let face = logic.card_face(use_.card);
            let mut selected = Vec::new();
            for candidate in logic.alive_players() {
                if face.target_filter(logic, use_.card, &selected, candidate, from) {
                    selected.push(candidate);
                }
            }
            use_.to = selected;
        }
    }
    standard_on_use(logic, use_)
}

/// Area-of-effect `on_use`: auto-fills with every *other* player
/// passing the target filter.
pub fn area_of_effect_on_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    if use_.to.is_empty() {
        if let Some(from) = use_.from {
            let face = logic.card_face(use_.card);
            let mut selected = Vec::new();
            for candidate in logic.other_players(from) {
                if face.target_filter(logic, use_.card, &selected, candidate, from) {
                    selected.push(candidate);
                }
            }
            use_.to = selected;
        }
    }
    standard_on_use(logic, use_)
}

/// Equip `on_use`: default the target to the user; no table staging -
/// the card installs directly from where it is.
pub fn equip_on_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    if use_.to.is_empty() {
        if let Some(from) = use_.from {
            use_.to.push(from);
        }
    }
    logic.trigger_mut(EventType::PreCardUsed, use_.from, use_)?;
    Ok(())
}

/// Equip `use`: install onto the single target, displacing any equip of
/// the same subtype through the table into the discard pile.
pub fn equip_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    let Some(&target) = use_.to.first() else {
        let discard = CardsMove::to_area(AreaId::global(AreaType::DiscardPile))
            .with_cards(vec![use_.card])
            .open();
        return logic.move_cards(vec![discard]);
    };

    let subtype = logic.card_face(use_.card).subtype();
    let equip_area = AreaId::of_player(AreaType::Equip, target);
    let displaced = logic
        .area(equip_area)
        .cards()
        .iter()
        .copied()
        .find(|&card| logic.card_face(card).subtype() == subtype);

    let mut moves = vec![CardsMove::to_area(equip_area)
        .with_cards(vec![use_.card])
        .open()];
    if let Some(old) = displaced {
        moves.push(
            CardsMove::to_area(AreaId::global(AreaType::Table))
                .with_cards(vec![old])
                .open(),
        );
    }
    logic.move_cards(moves)?;

    if let Some(old) = displaced {
        discard_from_table(logic, old)?;
    }
    Ok(())
}

/// Delayed-trick `on_use`: no table staging; the card travels straight
/// to the target's delayed-trick area in `delayed_use`.
pub fn delayed_on_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    logic.sort_by_action_order(&mut use_.to);
    logic.trigger_mut(EventType::PreCardUsed, use_.from, use_)?;
    Ok(())
}

/// Delayed-trick `use`: attach to the surviving target, or discard if
/// none survived.
pub fn delayed_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    let to = match use_.to.first() {
        Some(&target) => AreaId::of_player(AreaType::DelayedTrick, target),
        None => AreaId::global(AreaType::DiscardPile),
    };
    let move_ = CardsMove::to_area(to).with_cards(vec![use_.card]).open();
    logic.move_cards(vec![move_])
}

/// Delayed-trick `on_effect` when resolving in the judge phase: lift the
/// card onto the table, then run the nullification offer.
pub fn delayed_on_effect(logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
    let move_ = CardsMove::to_area(AreaId::global(AreaType::Table))
        .with_cards(vec![effect.card])
        .open();
    logic.move_cards(vec![move_])?;
    trick_on_effect(logic, effect)
}

/// Movable delayed-trick `on_use`: self-targeted when no target given.
pub fn movable_on_use(logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
    if use_.to.is_empty() {
        if let Some(from) = use_.from {
            use_.to.push(from);
        }
    }
    delayed_on_use(logic, use_)
}

/// Movable delayed-trick `complete`: if the card survived its judge
/// (still on the table), it hops to the next player around the ring who
/// does not already carry this variant, firing the target-confirmation
/// events for the new holder.
pub fn movable_complete(logic: &mut GameLogic, card: CardHandle) -> GameResult<()> {
    let table = AreaId::global(AreaType::Table);
    if !logic.area(table).contains(card) {
        return Ok(());
    }

    let name = logic.cards().name(card).to_string();
    let current = logic.current_player();
    let mut target = current;
    loop {
        target = logic.next_alive(target);

        let occupied = logic.delayed_trick_contains(target, &name);
        if occupied && target != current {
            continue;
        }

        let move_ = CardsMove::to_area(AreaId::of_player(AreaType::DelayedTrick, target))
            .with_cards(vec![card])
            .open();
        logic.move_cards(vec![move_])?;

        let mut hop = CardUse::hop(card, target);
        for to in hop.to.clone() {
            if hop.to.contains(&to) {
                logic.trigger_mut(EventType::TargetConfirming, Some(to), &mut hop)?;
            }
        }
        if hop.to.is_empty() {
            continue;
        }
        for to in hop.to.clone() {
            if hop.to.contains(&to) {
                logic.trigger_mut(EventType::TargetConfirmed, Some(to), &mut hop)?;
            }
        }
        if !hop.to.is_empty() {
            return Ok(());
        }
    }
}

#[cfg(test)]
pub mod tests_support {
    //! Minimal faces for unit tests of neighboring modules.

    use std::sync::Arc;

    use super::CardFace;
    use crate::cards::CardKind;

    struct PlainFace {
        name: String,
    }

    impl CardFace for PlainFace {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> CardKind {
            CardKind::Basic
        }
    }

    /// A basic card face with defaults everywhere.
    pub fn plain_face(name: &str) -> Arc<dyn CardFace> {
        Arc::new(PlainFace {
            name: name.to_string(),
        })
    }
}
