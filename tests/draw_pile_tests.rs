//! Draw pile, reshuffle and movement invariants.

use std::sync::Arc;

use sanguo_core::standard::standard_catalog;
use sanguo_core::{
    AreaId, AreaType, CardHandle, CardsMove, Client, GameLogic, Notification, PlayerId,
    RoomSettings, ScriptHandle, ScriptedClient,
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

fn draw_pile() -> AreaId {
    AreaId::global(AreaType::DrawPile)
}

fn discard_pile() -> AreaId {
    AreaId::global(AreaType::DiscardPile)
}

fn hand(player: PlayerId) -> AreaId {
    AreaId::of_player(AreaType::Hand, player)
}

#[test]
fn test_draw_takes_pile_prefix() {
    let (mut logic, _handles) = setup(4);
    let a = PlayerId::new(0);

    let expected: Vec<CardHandle> = logic.area(draw_pile()).top(4).to_vec();
    logic.draw_cards(a, 4).unwrap();

    assert_eq!(logic.hand_cards(a), expected.as_slice());
    for card in expected {
        assert_eq!(logic.position(card), Some(hand(a)));
    }
}

#[test]
fn test_every_card_in_exactly_one_area() {
    let (mut logic, _handles) = setup(4);
    let a = PlayerId::new(0);
    logic.draw_cards(a, 5).unwrap();

    for card in logic.cards().iter() {
        let position = logic.position(card.handle()).expect("card has a position");
        let mut holders = 0;
        for kind in [
            AreaType::DrawPile,
            AreaType::DiscardPile,
            AreaType::Table,
            AreaType::Wugu,
        ] {
            if logic.area(AreaId::global(kind)).contains(card.handle()) {
                holders += 1;
            }
        }
        for player in PlayerId::all(4) {
            for kind in [
                AreaType::Hand,
                AreaType::Equip,
                AreaType::Judge,
                AreaType::DelayedTrick,
            ] {
                if logic
                    .area(AreaId::of_player(kind, player))
                    .contains(card.handle())
                {
                    holders += 1;
                }
            }
        }
        assert_eq!(holders, 1, "card {} held once", card.handle());
        assert!(logic.area(position).contains(card.handle()));
    }
}

#[test]
fn test_reshuffle_refills_draw_pile() {
    let (mut logic, _handles) = setup(2);
    let a = PlayerId::new(0);
    let total = logic.area(draw_pile()).len();

    // Leave five cards in the pile, the rest in the discard pile.
    let buried: Vec<CardHandle> = logic.area(draw_pile()).top(total - 5).to_vec();
    let count = buried.len();
    logic
        .move_cards(vec![CardsMove::to_area(discard_pile())
            .from_area(draw_pile())
            .with_cards(buried)
            .open()])
        .unwrap();
    assert_eq!(logic.area(draw_pile()).len(), 5);
    assert_eq!(logic.area(discard_pile()).len(), count);

    logic.draw_cards(a, 10).unwrap();

    assert_eq!(logic.reshuffle_count(), 1);
    assert_eq!(logic.hand_cards(a).len(), 10);
    assert!(logic.area(discard_pile()).is_empty());
    assert_eq!(logic.area(draw_pile()).len(), total - 10);
}

#[test]
fn test_exhausted_piles_end_in_stalemate() {
    let (mut logic, handles) = setup(2);
    let a = PlayerId::new(0);
    let total = logic.area(draw_pile()).len();

    let result = logic.draw_cards(a, total + 1);
    assert_eq!(result, Err(sanguo_core::ControlSignal::GameFinish));

    let game_over = handles[0]
        .notifications()
        .into_iter()
        .find_map(|notification| match notification {
            Notification::GameOver { winners } => Some(winners),
            _ => None,
        })
        .expect("GameOver broadcast");
    assert!(game_over.is_empty());
}

#[test]
fn test_reshuffle_cap_from_settings() {
    let catalog = Arc::new(standard_catalog());
    let mut clients: Vec<Box<dyn Client>> = Vec::new();
    for _ in 0..2 {
        let (client, _) = ScriptedClient::new();
        clients.push(Box::new(client));
    }
    let settings = RoomSettings {
        reshuffle_cap: Some(0),
        ..RoomSettings::default()
    };
    let mut logic = GameLogic::new(catalog, settings, clients, 42);
    logic.prepare_to_start().unwrap();

    let a = PlayerId::new(0);
    let total = logic.area(draw_pile()).len();
    let buried: Vec<CardHandle> = logic.area(draw_pile()).top(total - 1).to_vec();
    logic
        .move_cards(vec![CardsMove::to_area(discard_pile())
            .from_area(draw_pile())
            .with_cards(buried)
            .open()])
        .unwrap();

    // Refilling would need a reshuffle, which the cap forbids.
    assert_eq!(
        logic.draw_cards(a, 3),
        Err(sanguo_core::ControlSignal::GameFinish)
    );
}

#[test]
fn test_move_round_trip_restores_position() {
    let (mut logic, _handles) = setup(2);
    let b = PlayerId::new(1);

    let card = logic.area(draw_pile()).top(1)[0];
    logic
        .move_cards(vec![CardsMove::to_area(hand(b)).with_cards(vec![card])])
        .unwrap();
    assert_eq!(logic.position(card), Some(hand(b)));

    logic
        .move_cards(vec![CardsMove::to_area(draw_pile()).with_cards(vec![card])])
        .unwrap();
    assert_eq!(logic.position(card), Some(draw_pile()));
    assert!(logic.area(draw_pile()).contains(card));
    assert!(!logic.area(hand(b)).contains(card));
}

#[test]
fn test_stale_source_moves_are_skipped() {
    let (mut logic, _handles) = setup(2);
    let b = PlayerId::new(1);

    let card = logic.area(draw_pile()).top(1)[0];
    // Claim the card comes from the discard pile; it does not.
    logic
        .move_cards(vec![CardsMove::to_area(hand(b))
            .from_area(discard_pile())
            .with_cards(vec![card])])
        .unwrap();

    assert_eq!(logic.position(card), Some(draw_pile()));
    assert!(logic.hand_cards(b).is_empty());
}
