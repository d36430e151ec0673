//! Standard basic cards: slash, jink, peach.

use std::sync::Arc;

use crate::cards::face::standard_on_use;
use crate::cards::{CardFace, CardHandle, CardKind};
use crate::core::{GameResult, PlayerId};
use crate::game::structs::{CardEffect, CardUse, DamageStruct, RecoverStruct};
use crate::game::GameLogic;

/// Slash: 1 damage to one target in attack range, once per play phase.
pub struct Slash;

impl Slash {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Slash)
    }
}

impl CardFace for Slash {
    fn name(&self) -> &str {
        "slash"
    }

    fn kind(&self) -> CardKind {
        CardKind::Basic
    }

    fn use_limit(&self) -> i32 {
        1
    }

    fn target_filter(
        &self,
        logic: &GameLogic,
        card: CardHandle,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        if !selected.is_empty() || to_select == source {
            return false;
        }
        if !logic.player(to_select).is_alive() || !logic.in_attack_range(source, to_select) {
            return false;
        }
        logic
            .card_mod_skills(source)
            .iter()
            .all(|skill| skill.target_filter(logic, card, selected, to_select, source))
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };
        let damage = DamageStruct::new(effect.from, to, 1).with_card(effect.card);
        logic.damage(damage)
    }
}

/// Jink: playable only in response to a prompt, never proactively.
pub struct Jink;

impl Jink {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Jink)
    }
}

impl CardFace for Jink {
    fn name(&self) -> &str {
        "jink"
    }

    fn kind(&self) -> CardKind {
        CardKind::Basic
    }

    fn target_fixed(&self) -> bool {
        true
    }

    fn is_available(&self, _logic: &GameLogic, _player: PlayerId, _card: CardHandle) -> bool {
        false
    }
}

/// Peach: recover 1 hp; self-targeted, only while wounded.
pub struct Peach;

impl Peach {
    #[must_use]
    pub fn face() -> Arc<dyn CardFace> {
        Arc::new(Peach)
    }
}

impl CardFace for Peach {
    fn name(&self) -> &str {
        "peach"
    }

    fn kind(&self) -> CardKind {
        CardKind::Basic
    }

    fn target_fixed(&self) -> bool {
        true
    }

    fn is_available(&self, logic: &GameLogic, player: PlayerId, card: CardHandle) -> bool {
        logic.player(player).is_wounded() && default_available(self, logic, player, card)
    }

    fn on_use(&self, logic: &mut GameLogic, use_: &mut CardUse) -> GameResult<()> {
        if use_.to.is_empty() {
            if let Some(from) = use_.from {
                use_.to.push(from);
            }
        }
        standard_on_use(logic, use_)
    }

    fn effect(&self, logic: &mut GameLogic, effect: &mut CardEffect) -> GameResult<()> {
        let Some(to) = effect.to else {
            return Ok(());
        };
        let mut recover = RecoverStruct::new(effect.from, to);
        recover.card = Some(effect.card);
        logic.recover(recover)
    }
}

/// The use-limit check a face override still wants to apply.
fn default_available(
    face: &dyn CardFace,
    logic: &GameLogic,
    player: PlayerId,
    card: CardHandle,
) -> bool {
    let mut limit = face.use_limit();
    for skill in logic.card_mod_skills(player) {
        limit += skill.extra_use_num(logic, card, player);
    }
    (logic.player(player).card_history(face.name()) as i32) < limit
}
