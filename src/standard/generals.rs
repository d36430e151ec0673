//! Standard generals and their skills.

use std::sync::Arc;

use crate::areas::{AreaId, AreaType};
use crate::cards::{CardHandle, Color, GeneralDef};
use crate::core::{GameResult, PlayerId};
use crate::game::structs::{CardsMove, DamageStruct};
use crate::game::GameLogic;
use crate::skills::{
    CardModSkill, Masochism, MasochismSkill, OneCard, OneCardViewAs, ProactiveSkill, Skill,
    SkillDef,
};

use super::basic::Jink;

/// Jianxiong: after taking damage carried by a card, obtain that card.
pub struct Jianxiong;

impl Skill for Jianxiong {
    fn name(&self) -> &str {
        "jianxiong"
    }
}

impl MasochismSkill for Jianxiong {
    fn trigger_count(&self, _logic: &GameLogic, _target: PlayerId, damage: &DamageStruct) -> u32 {
        u32::from(damage.card.is_some())
    }

    fn on_damaged(
        &self,
        logic: &mut GameLogic,
        target: PlayerId,
        damage: &mut DamageStruct,
    ) -> GameResult<bool> {
        if let Some(card) = damage.card {
            let obtain = CardsMove::to_area(AreaId::of_player(AreaType::Hand, target))
                .with_cards(vec![card])
                .open();
            logic.move_cards(vec![obtain])?;
        }
        Ok(false)
    }
}

/// Qingguo: play a black hand card as a jink.
pub struct Qingguo;

impl Skill for Qingguo {
    fn name(&self) -> &str {
        "qingguo"
    }
}

impl OneCardViewAs for Qingguo {
    fn is_available(&self, _logic: &GameLogic, _player: PlayerId, pattern: &str) -> bool {
        pattern == "jink"
    }

    fn filter(&self, logic: &GameLogic, card: CardHandle, _player: PlayerId, _pattern: &str) -> bool {
        logic.cards().color(card) == Color::Black
    }

    fn convert(
        &self,
        logic: &mut GameLogic,
        card: CardHandle,
        _player: PlayerId,
    ) -> Option<CardHandle> {
        let skill = logic.catalog().skill_by_name(self.name()).map(|entry| entry.id);
        Some(logic.new_virtual_card(Jink::face(), &[card], skill))
    }
}

/// Rende: give any number of hand cards to another player.
pub struct Rende;

impl Skill for Rende {
    fn name(&self) -> &str {
        "rende"
    }
}

impl ProactiveSkill for Rende {
    fn card_feasible(&self, _logic: &GameLogic, selected: &[CardHandle], _source: PlayerId) -> bool {
        !selected.is_empty()
    }

    fn card_filter(
        &self,
        logic: &GameLogic,
        _selected: &[CardHandle],
        card: CardHandle,
        source: PlayerId,
        _pattern: &str,
    ) -> bool {
        logic.hand_cards(source).contains(&card)
    }

    fn player_feasible(&self, _logic: &GameLogic, selected: &[PlayerId], _source: PlayerId) -> bool {
        selected.len() == 1
    }

    fn player_filter(
        &self,
        logic: &GameLogic,
        selected: &[PlayerId],
        to_select: PlayerId,
        source: PlayerId,
    ) -> bool {
        selected.is_empty() && to_select != source && logic.player(to_select).is_alive()
    }

    fn effect(
        &self,
        logic: &mut GameLogic,
        _from: PlayerId,
        to: &[PlayerId],
        cards: &[CardHandle],
    ) -> GameResult<()> {
        let Some(&receiver) = to.first() else {
            return Ok(());
        };
        let give = CardsMove::to_area(AreaId::of_player(AreaType::Hand, receiver))
            .with_cards(cards.to_vec());
        logic.move_cards(vec![give])
    }
}

/// Paoxiao: no per-turn limit on slashes.
pub struct Paoxiao;

impl Skill for Paoxiao {
    fn name(&self) -> &str {
        "paoxiao"
    }
}

impl CardModSkill for Paoxiao {
    fn extra_use_num(&self, logic: &GameLogic, card: CardHandle, _player: PlayerId) -> i32 {
        if logic.cards().name(card) == "slash" {
            1000
        } else {
            0
        }
    }
}

/// The standard roster.
pub fn generals() -> Vec<GeneralDef> {
    vec![
        GeneralDef::new("caocao", "wei", 4)
            .lord()
            .with_skill(SkillDef::Trigger(Arc::new(Masochism(Jianxiong)))),
        GeneralDef::new("simayi", "wei", 3),
        GeneralDef::new("xiahoudun", "wei", 4),
        GeneralDef::new("zhangliao", "wei", 4),
        GeneralDef::new("xuchu", "wei", 4),
        GeneralDef::new("guojia", "wei", 3),
        GeneralDef::new("zhenji", "wei", 3)
            .female()
            .with_skill(SkillDef::ViewAs(Arc::new(OneCard(Qingguo)))),
        GeneralDef::new("liubei", "shu", 4)
            .lord()
            .with_skill(SkillDef::Proactive(Arc::new(Rende))),
        GeneralDef::new("zhangfei", "shu", 4)
            .with_skill(SkillDef::CardMod(Arc::new(Paoxiao))),
        GeneralDef::new("zhaoyun", "shu", 4),
    ]
}
