//! End-to-end trick resolutions: duel, nullification chains, delayed
//! tricks, and amazing grace.

use std::sync::Arc;

use sanguo_core::standard::standard_catalog;
use sanguo_core::{
    AreaId, AreaType, CardHandle, CardUse, CardsMove, Client, DamageNature, GameLogic,
    Notification, Phase, PlayerId, RoomSettings, ScriptHandle, ScriptedClient,
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

fn find_in_draw_pile(logic: &GameLogic, name: &str) -> CardHandle {
    logic
        .cards()
        .iter()
        .find(|card| {
            card.name() == name
                && logic.position(card.handle()) == Some(AreaId::global(AreaType::DrawPile))
        })
        .map(|card| card.handle())
        .unwrap_or_else(|| panic!("no {} left in the draw pile", name))
}

fn give(logic: &mut GameLogic, player: PlayerId, name: &str) -> CardHandle {
    let card = find_in_draw_pile(logic, name);
    logic
        .move_cards(vec![CardsMove::to_area(AreaId::of_player(
            AreaType::Hand,
            player,
        ))
        .with_cards(vec![card])])
        .unwrap();
    card
}

fn put_delayed(logic: &mut GameLogic, player: PlayerId, name: &str) -> CardHandle {
    let card = find_in_draw_pile(logic, name);
    logic
        .move_cards(vec![CardsMove::to_area(AreaId::of_player(
            AreaType::DelayedTrick,
            player,
        ))
        .with_cards(vec![card])
        .open()])
        .unwrap();
    card
}

/// Put a card of the given suit on top of the draw pile, to rig the
/// next judge.
fn rig_judge(logic: &mut GameLogic, suit: sanguo_core::Suit) -> CardHandle {
    let draw_pile = AreaId::global(AreaType::DrawPile);
    let card = logic
        .cards()
        .iter()
        .find(|card| {
            card.printed_suit() == suit && logic.position(card.handle()) == Some(draw_pile)
        })
        .map(|card| card.handle())
        .expect("suit available in draw pile");
    let move_ = CardsMove::to_area(draw_pile)
        .from_area(draw_pile)
        .with_cards(vec![card])
        .top();
    logic.move_cards(vec![move_]).unwrap();
    card
}

fn discard_pile() -> AreaId {
    AreaId::global(AreaType::DiscardPile)
}

#[test]
fn test_duel_damages_the_side_that_runs_dry() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(b).set_max_hp(4);
    logic.player_mut(b).set_hp(4);

    let duel = give(&mut logic, a, "duel");
    let b_slash = give(&mut logic, b, "slash");
    let a_slash = give(&mut logic, a, "slash");

    // B answers once, A answers once, then B runs dry.
    handles[1].push_card("slash", logic.cards().get(b_slash).id());
    handles[0].push_card("slash", logic.cards().get(a_slash).id());

    logic
        .use_card(CardUse::new(a, duel).with_targets(vec![b]))
        .unwrap();

    assert_eq!(logic.player(b).hp(), 3);
    assert_eq!(logic.player(a).hp(), logic.player(a).max_hp());
    assert_eq!(logic.position(duel), Some(discard_pile()));
    assert_eq!(logic.position(b_slash), Some(discard_pile()));
    assert_eq!(logic.position(a_slash), Some(discard_pile()));
}

#[test]
fn test_duel_damages_the_user_when_they_decline_first() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    logic.player_mut(a).set_max_hp(4);
    logic.player_mut(a).set_hp(4);

    let duel = give(&mut logic, a, "duel");
    let b_slash = give(&mut logic, b, "slash");

    // B answers; A has nothing queued and declines.
    handles[1].push_card("slash", logic.cards().get(b_slash).id());

    logic
        .use_card(CardUse::new(a, duel).with_targets(vec![b]))
        .unwrap();

    assert_eq!(logic.player(a).hp(), 3);
    assert_eq!(logic.player(b).hp(), logic.player(b).max_hp());
}

#[test]
fn test_nullification_cancels_a_trick() {
    let (mut logic, handles) = setup(3);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    let c = PlayerId::new(2);

    let dismantlement = give(&mut logic, a, "dismantlement");
    let kept = give(&mut logic, b, "slash");
    let nullification = give(&mut logic, c, "nullification");

    handles[2].push_card("nullification", logic.cards().get(nullification).id());

    logic
        .use_card(CardUse::new(a, dismantlement).with_targets(vec![b]))
        .unwrap();

    // The dismantlement effect was cancelled: B keeps the slash.
    assert_eq!(logic.hand_cards(b), &[kept]);
    assert_eq!(logic.position(dismantlement), Some(discard_pile()));
    assert_eq!(logic.position(nullification), Some(discard_pile()));
}

#[test]
fn test_nullification_of_nullification_flips_the_verdict() {
    let (mut logic, handles) = setup(4);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);
    let c = PlayerId::new(2);
    let d = PlayerId::new(3);

    let dismantlement = give(&mut logic, a, "dismantlement");
    give(&mut logic, b, "slash");
    give(&mut logic, b, "jink");
    let first_null = give(&mut logic, c, "nullification");
    let second_null = give(&mut logic, d, "nullification");

    handles[2].push_card("nullification", logic.cards().get(first_null).id());
    handles[3].push_card("nullification", logic.cards().get(second_null).id());

    logic
        .use_card(CardUse::new(a, dismantlement).with_targets(vec![b]))
        .unwrap();

    // The counter-nullification restored the dismantlement: B is down
    // to one hand card, the other went to the discard pile.
    assert_eq!(logic.hand_cards(b).len(), 1);
    assert_eq!(logic.position(first_null), Some(discard_pile()));
    assert_eq!(logic.position(second_null), Some(discard_pile()));
}

#[test]
fn test_indulgence_skips_the_play_phase() {
    let (mut logic, handles) = setup(2);
    let b = PlayerId::new(1);

    let indulgence = put_delayed(&mut logic, b, "indulgence");
    rig_judge(&mut logic, sanguo_core::Suit::Spade);

    logic.play_phases(b, &Phase::TURN).unwrap();

    assert_eq!(logic.position(indulgence), Some(discard_pile()));
    // Draw phase still happened, the play phase did not.
    assert_eq!(logic.hand_cards(b).len(), 2);
    assert_eq!(handles[1].use_card_request_count(), 0);
    assert_eq!(logic.player(b).phase(), Phase::Inactive);
    assert!(!logic.player(b).is_phase_skipped(Phase::Play));
}

#[test]
fn test_indulgence_heart_judge_spares_the_play_phase() {
    let (mut logic, handles) = setup(2);
    let b = PlayerId::new(1);

    let indulgence = put_delayed(&mut logic, b, "indulgence");
    rig_judge(&mut logic, sanguo_core::Suit::Heart);

    logic.play_phases(b, &Phase::TURN).unwrap();

    // Missed judge: the card still leaves play, but the phase ran.
    assert_eq!(logic.position(indulgence), Some(discard_pile()));
    assert_eq!(handles[1].use_card_request_count(), 1);
}

#[test]
fn test_lightning_enters_own_delayed_area() {
    let (mut logic, _handles) = setup(2);
    let a = PlayerId::new(0);

    let lightning = give(&mut logic, a, "lightning");
    logic.use_card(CardUse::new(a, lightning)).unwrap();

    assert_eq!(
        logic.position(lightning),
        Some(AreaId::of_player(AreaType::DelayedTrick, a))
    );
}

#[test]
fn test_lightning_hops_to_next_player_when_judge_misses() {
    let (mut logic, _handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);

    let lightning = put_delayed(&mut logic, a, "lightning");
    rig_judge(&mut logic, sanguo_core::Suit::Heart);

    logic.play_phases(a, &Phase::TURN).unwrap();

    assert_eq!(
        logic.position(lightning),
        Some(AreaId::of_player(AreaType::DelayedTrick, b))
    );
    assert_eq!(logic.player(a).hp(), logic.player(a).max_hp());
}

#[test]
fn test_lightning_strikes_on_a_matched_judge() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    logic.player_mut(a).set_max_hp(4);
    logic.player_mut(a).set_hp(4);

    let lightning = put_delayed(&mut logic, a, "lightning");

    // A spade between 2 and 9.
    let draw_pile = AreaId::global(AreaType::DrawPile);
    let verdict = logic
        .cards()
        .iter()
        .find(|card| {
            card.printed_suit() == sanguo_core::Suit::Spade
                && (2..=9).contains(&card.printed_number())
                && logic.position(card.handle()) == Some(draw_pile)
        })
        .map(|card| card.handle())
        .unwrap();
    let rig = CardsMove::to_area(draw_pile)
        .from_area(draw_pile)
        .with_cards(vec![verdict])
        .top();
    logic.move_cards(vec![rig]).unwrap();

    logic.play_phases(a, &Phase::TURN).unwrap();

    assert_eq!(logic.player(a).hp(), 1);
    assert_eq!(logic.position(lightning), Some(discard_pile()));

    let thunder = handles[0]
        .notifications()
        .into_iter()
        .any(|notification| {
            matches!(
                notification,
                Notification::Damage {
                    nature: DamageNature::Thunder,
                    amount: 3,
                    ..
                }
            )
        });
    assert!(thunder, "thunder damage was broadcast");
}

#[test]
fn test_amazing_grace_deals_one_card_each() {
    let (mut logic, _handles) = setup(3);
    let a = PlayerId::new(0);

    let grace = give(&mut logic, a, "amazing_grace");
    logic.use_card(CardUse::new(a, grace)).unwrap();

    for player in PlayerId::all(3) {
        assert_eq!(logic.hand_cards(player).len(), 1, "{} took a card", player);
    }
    assert!(logic.area(AreaId::global(AreaType::Wugu)).is_empty());
    assert_eq!(logic.position(grace), Some(discard_pile()));
}
