//! Trigger-skill behavior through the damage pipeline.

use std::sync::Arc;

use sanguo_core::standard::standard_catalog;
use sanguo_core::{
    AreaId, AreaType, CardHandle, Client, DamageStruct, GameLogic, Notification, PlayerId,
    RoomSettings, ScriptHandle, ScriptedClient, SkillArea,
};

fn setup(player_count: usize) -> (GameLogic, Vec<ScriptHandle>) {
    let catalog = Arc::new(standard_catalog());
    let mut clients: Vec<Box<dyn Client>> = Vec::new();
    let mut handles = Vec::new();
    for _ in 0..player_count {
        let (client, handle) = ScriptedClient::new();
        clients.push(Box::new(client));
        handles.push(handle);
    }
    let mut logic = GameLogic::new(catalog, RoomSettings::default(), clients, 42);
    logic.prepare_to_start().unwrap();
    (logic, handles)
}

fn some_draw_pile_card(logic: &GameLogic) -> CardHandle {
    logic.area(AreaId::global(AreaType::DrawPile)).top(1)[0]
}

#[test]
fn test_jianxiong_obtains_the_damage_card() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(a).set_max_hp(4);
    logic.player_mut(a).set_hp(4);

    let jianxiong = logic.catalog().skill_by_name("jianxiong").unwrap().id;
    logic.attach_skill(a, jianxiong, SkillArea::Head);

    // Accept the lone trigger option.
    handles[0].push_trigger_order(Some(0));

    let carrier = some_draw_pile_card(&logic);
    let damage = DamageStruct::new(Some(b), a, 1).with_card(carrier);
    logic.damage(damage).unwrap();

    assert_eq!(logic.player(a).hp(), 3);
    assert_eq!(
        logic.position(carrier),
        Some(AreaId::of_player(AreaType::Hand, a))
    );
    assert_eq!(logic.player(a).skill_history(jianxiong), 1);

    let invoked = handles[1].notifications().into_iter().any(|notification| {
        matches!(
            notification,
            Notification::InvokeSkill { player, skill, .. }
                if player == a && skill == jianxiong
        )
    });
    assert!(invoked, "skill invocation was broadcast");
}

#[test]
fn test_jianxiong_can_be_declined() {
    let (mut logic, _handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(a).set_max_hp(4);
    logic.player_mut(a).set_hp(4);

    let jianxiong = logic.catalog().skill_by_name("jianxiong").unwrap().id;
    logic.attach_skill(a, jianxiong, SkillArea::Head);

    // No scripted reply: the cancelable prompt defaults to cancel.
    let carrier = some_draw_pile_card(&logic);
    let damage = DamageStruct::new(Some(b), a, 1).with_card(carrier);
    logic.damage(damage).unwrap();

    assert_eq!(logic.player(a).hp(), 3);
    assert_eq!(
        logic.position(carrier),
        Some(AreaId::global(AreaType::DrawPile))
    );
    assert_eq!(logic.player(a).skill_history(jianxiong), 0);
}

#[test]
fn test_jianxiong_silent_without_a_card() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(a).set_max_hp(4);
    logic.player_mut(a).set_hp(4);

    let jianxiong = logic.catalog().skill_by_name("jianxiong").unwrap().id;
    logic.attach_skill(a, jianxiong, SkillArea::Head);
    handles[0].push_trigger_order(Some(0));

    // Cardless damage: the skill must not even be offered.
    logic.damage(DamageStruct::new(Some(b), a, 1)).unwrap();

    assert_eq!(logic.player(a).hp(), 3);
    assert_eq!(logic.player(a).skill_history(jianxiong), 0);
}

#[test]
fn test_rende_gives_hand_cards_through_activation() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(a).set_phase(sanguo_core::Phase::Play);

    let rende = logic.catalog().skill_by_name("rende").unwrap().id;
    logic.attach_skill(a, rende, SkillArea::Head);

    logic.draw_cards(a, 2).unwrap();
    let given: Vec<u32> = logic
        .hand_cards(a)
        .iter()
        .map(|&card| logic.cards().get(card).id())
        .collect();

    handles[0].push_use_card(Some(sanguo_core::UseCardReply {
        cards: given.clone(),
        to: vec![b],
        skill: Some(rende),
    }));

    // The proactive skill resolves without producing a card; the phase
    // continues.
    assert!(!logic.activate(a).unwrap());
    assert!(logic.hand_cards(a).is_empty());
    assert_eq!(logic.hand_cards(b).len(), 2);
    assert_eq!(logic.player(a).skill_history(rende), 1);

    // Nothing queued: the next activation ends the phase.
    assert!(logic.activate(a).unwrap());
}

#[test]
fn test_damage_broadcast_precedes_hp_update() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(a).set_max_hp(4);
    logic.player_mut(a).set_hp(4);

    logic.damage(DamageStruct::new(Some(b), a, 1)).unwrap();

    let notifications = handles[1].notifications();
    let damage_at = notifications
        .iter()
        .position(|n| matches!(n, Notification::Damage { .. }))
        .expect("damage broadcast");
    let hp_at = notifications
        .iter()
        .position(|n| {
            matches!(
                n,
                Notification::UpdatePlayerProperty {
                    player,
                    property: sanguo_core::PlayerProperty::Hp(3),
                } if *player == a
            )
        })
        .expect("hp property broadcast");
    assert!(damage_at < hp_at);
}

#[test]
fn test_lethal_damage_ends_the_match() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(a).set_max_hp(4);
    logic.player_mut(a).set_hp(1);

    let result = logic.damage(DamageStruct::new(Some(b), a, 1));
    assert_eq!(result, Err(sanguo_core::ControlSignal::GameFinish));

    assert!(logic.player(a).is_dead());
    let winners = handles[0]
        .notifications()
        .into_iter()
        .find_map(|notification| match notification {
            Notification::GameOver { winners } => Some(winners),
            _ => None,
        })
        .expect("GameOver broadcast");
    assert_eq!(winners, vec![b]);
}
