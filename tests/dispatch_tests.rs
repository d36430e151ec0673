//! Dispatcher behavior: empty dispatch, compulsory ordering rules, and
//! the skill attach/detach round trip.

use std::sync::{Arc, Mutex};

use sanguo_core::standard::standard_catalog;
use sanguo_core::{
    Client, EventData, EventHandler, EventMap, EventType, GameLogic, GameResult, PlayerId,
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

/// A handler that records its firings into a shared log.
struct Probe {
    name: &'static str,
    events: Vec<EventType>,
    compulsory: bool,
    priority: i32,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl EventHandler for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn events(&self) -> &[EventType] {
        &self.events
    }

    fn priority(&self, _event: EventType) -> i32 {
        self.priority
    }

    fn is_compulsory(&self) -> bool {
        self.compulsory
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
        _logic: &mut GameLogic,
        _event: EventType,
        _target: Option<PlayerId>,
        _data: &mut EventData,
        _invoker: PlayerId,
    ) -> GameResult<bool> {
        self.log.lock().unwrap().push(self.name);
        Ok(false)
    }
}

fn probe(
    name: &'static str,
    event: EventType,
    compulsory: bool,
    priority: i32,
    log: &Arc<Mutex<Vec<&'static str>>>,
) -> Arc<dyn EventHandler> {
    Arc::new(Probe {
        name,
        events: vec![event],
        compulsory,
        priority,
        log: Arc::clone(log),
    })
}

#[test]
fn test_empty_dispatch_is_unbroken_and_inert() {
    let (mut logic, _handles) = setup(2);

    let mut data = EventData::None;
    let broken = logic
        .trigger(EventType::CardResponded, Some(PlayerId::new(0)), &mut data)
        .unwrap();

    assert!(!broken);
    assert!(matches!(data, EventData::None));
}

#[test]
fn test_compulsory_option_fires_despite_decline() {
    let (mut logic, _handles) = setup(2);
    let log = Arc::new(Mutex::new(Vec::new()));

    logic.add_handler(probe(
        "forced",
        EventType::FinishJudge,
        true,
        1,
        &log,
    ));

    // The client never answers; a lone compulsory option is forced.
    logic
        .trigger_simple(EventType::FinishJudge, PlayerId::new(0))
        .unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["forced"]);
}

#[test]
fn test_optional_only_list_cancels_on_decline() {
    let (mut logic, _handles) = setup(2);
    let log = Arc::new(Mutex::new(Vec::new()));

    logic.add_handler(probe(
        "declinable",
        EventType::FinishJudge,
        false,
        1,
        &log,
    ));

    logic
        .trigger_simple(EventType::FinishJudge, PlayerId::new(0))
        .unwrap();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_mixed_list_cannot_cancel() {
    let (mut logic, _handles) = setup(2);
    let log = Arc::new(Mutex::new(Vec::new()));

    logic.add_handler(probe("forced", EventType::FinishJudge, true, 1, &log));
    logic.add_handler(probe("declinable", EventType::FinishJudge, false, 1, &log));

    // Declining the order prompt forces the first option each round, so
    // the compulsory handler is guaranteed to fire.
    logic
        .trigger_simple(EventType::FinishJudge, PlayerId::new(0))
        .unwrap();
    assert!(log.lock().unwrap().contains(&"forced"));
}

#[test]
fn test_priority_bands_run_high_first() {
    let (mut logic, _handles) = setup(2);
    let log = Arc::new(Mutex::new(Vec::new()));

    logic.add_handler(probe("low", EventType::FinishJudge, true, 0, &log));
    logic.add_handler(probe("high", EventType::FinishJudge, true, 5, &log));

    logic
        .trigger_simple(EventType::FinishJudge, PlayerId::new(0))
        .unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["high", "low"]);
}

#[test]
fn test_trigger_order_choice_is_respected() {
    let (mut logic, handles) = setup(2);
    let log = Arc::new(Mutex::new(Vec::new()));

    logic.add_handler(probe("first", EventType::FinishJudge, true, 1, &log));
    logic.add_handler(probe("second", EventType::FinishJudge, true, 1, &log));

    // The invoker picks option 1, then option 0 remains (forced).
    handles[0].push_trigger_order(Some(1));

    logic
        .trigger_simple(EventType::FinishJudge, PlayerId::new(0))
        .unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["second", "first"]);
}

#[test]
fn test_attach_detach_round_trip() {
    let (mut logic, _handles) = setup(2);
    let a = PlayerId::new(0);

    let jianxiong = logic.catalog().skill_by_name("jianxiong").unwrap().id;
    // Make sure nobody holds it from general assignment.
    for player in PlayerId::all(2) {
        for area in [SkillArea::Head, SkillArea::Deputy, SkillArea::Acquired] {
            logic.detach_skill(player, jianxiong, area);
        }
    }
    let before = logic.handler_names(EventType::Damaged);

    logic.attach_skill(a, jianxiong, SkillArea::Acquired);
    let during = logic.handler_names(EventType::Damaged);
    assert!(during.contains(&"jianxiong".to_string()));
    assert_eq!(during.len(), before.len() + 1);

    logic.detach_skill(a, jianxiong, SkillArea::Acquired);
    assert_eq!(logic.handler_names(EventType::Damaged), before);
}

#[test]
fn test_detach_keeps_handler_while_another_player_has_it() {
    let (mut logic, _handles) = setup(2);
    let a = PlayerId::new(0);
    let b = PlayerId::new(1);

    let jianxiong = logic.catalog().skill_by_name("jianxiong").unwrap().id;
    for player in PlayerId::all(2) {
        for area in [SkillArea::Head, SkillArea::Deputy, SkillArea::Acquired] {
            logic.detach_skill(player, jianxiong, area);
        }
    }
    let baseline = logic.handler_names(EventType::Damaged).len();

    logic.attach_skill(a, jianxiong, SkillArea::Acquired);
    logic.attach_skill(b, jianxiong, SkillArea::Acquired);
    assert_eq!(logic.handler_names(EventType::Damaged).len(), baseline + 1);

    logic.detach_skill(a, jianxiong, SkillArea::Acquired);
    assert!(logic
        .handler_names(EventType::Damaged)
        .contains(&"jianxiong".to_string()));

    logic.detach_skill(b, jianxiong, SkillArea::Acquired);
    assert_eq!(logic.handler_names(EventType::Damaged).len(), baseline);
}
