//! The client-io port.
//!
//! The engine talks to every agent, human or robot, through the `Client`
//! trait: notifications flow out, requests expect a typed reply. A
//! request returning `None` means the client declined or timed out; the
//! engine substitutes the documented default in either case, so a
//! malformed transport reply can never corrupt a match.
//!
//! `BotClient` declines everything - the engine's defaults make it a
//! legal (if passive) player. `ScriptedClient` plays back canned
//! replies and records what it saw; tests and replay-driven robots use
//! it.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::areas::AreaId;
use crate::cards::GeneralId;
use crate::core::{Phase, PlayerId};
use crate::skills::SkillId;

/// One argument of a user-facing prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptArg {
    Player(PlayerId),
    Card(u32),
    Number(i32),
}

/// A localizable prompt shown to one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub message: String,
    pub args: Vec<PromptArg>,
}

impl Prompt {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.args.push(PromptArg::Player(player));
        self
    }

    #[must_use]
    pub fn with_card(mut self, card_id: u32) -> Self {
        self.args.push(PromptArg::Card(card_id));
        self
    }

    #[must_use]
    pub fn with_number(mut self, number: i32) -> Self {
        self.args.push(PromptArg::Number(number));
        self
    }
}

/// An observable player property, broadcast on change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerProperty {
    Hp(i32),
    MaxHp(i32),
    Phase(Phase),
    Alive(bool),
    Seat(usize),
    General(Option<GeneralId>),
}

/// One card move as a viewer sees it: card ids are present only where
/// the move is visible to that viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardsMoveInfo {
    pub from: AreaId,
    pub to: AreaId,
    pub count: usize,
    pub cards: Option<Vec<u32>>,
}

/// Notifications the engine sends; no reply expected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    MoveCards {
        moves: Vec<CardsMoveInfo>,
    },
    UseCard {
        from: PlayerId,
        to: Vec<PlayerId>,
        card: u32,
    },
    Damage {
        to: PlayerId,
        nature: crate::game::structs::DamageNature,
        amount: i32,
    },
    LoseHp {
        victim: PlayerId,
        amount: i32,
    },
    Recover {
        from: Option<PlayerId>,
        to: PlayerId,
        amount: i32,
    },
    GameOver {
        winners: Vec<PlayerId>,
    },
    ArrangeSeat {
        seats: Vec<PlayerId>,
    },
    PrepareCards {
        cards: Vec<u32>,
    },
    ShowCard {
        from: PlayerId,
        cards: Vec<u32>,
    },
    SetVirtualCard {
        name: String,
        area: AreaId,
        exists: bool,
    },
    ShowAmazingGrace,
    ClearAmazingGrace,
    UpdatePlayerProperty {
        player: PlayerId,
        property: PlayerProperty,
    },
    SetPlayerTag {
        player: PlayerId,
        key: String,
        value: Option<i64>,
    },
    InvokeSkill {
        player: PlayerId,
        skill: SkillId,
        cards: Vec<u32>,
        targets: Vec<PlayerId>,
    },
    AddSkill {
        player: PlayerId,
        skill: SkillId,
    },
    RemoveSkill {
        player: PlayerId,
        skill: SkillId,
    },
    ClearSkillHistory {
        player: PlayerId,
    },
    AddCardHistory {
        name: Option<String>,
        times: u32,
    },
    ShowPrompt {
        prompt: Prompt,
    },
}

/// One option in a trigger-order prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOrderOption {
    pub name: String,
    pub to: Vec<PlayerId>,
}

/// Choose-trigger-order request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOrderRequest {
    pub options: Vec<TriggerOrderOption>,
    pub cancelable: bool,
}

/// Ask-for-card request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRequest {
    pub pattern: String,
    pub min: usize,
    pub max: usize,
    pub optional: bool,
}

/// Reply to an ask-for-card request: real card ids, optionally viewed
/// through a skill.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardReply {
    pub cards: Vec<u32>,
    pub skill: Option<SkillId>,
}

/// Use-card request, both for the active play phase (`pattern: None`)
/// and for pattern-constrained responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCardRequest {
    pub pattern: Option<String>,
    pub assigned_targets: Vec<PlayerId>,
}

/// Reply to a use-card request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCardReply {
    pub cards: Vec<u32>,
    pub to: Vec<PlayerId>,
    pub skill: Option<SkillId>,
}

/// Choose-a-card-of-a-player request. Hidden hands expose a count only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseCardRequest {
    pub owner: PlayerId,
    pub handcards: Option<Vec<u32>>,
    pub handcard_count: usize,
    pub equips: Vec<u32>,
    pub delayed_tricks: Vec<u32>,
}

/// Arrange-cards request: split `cards` into piles of the given
/// capacities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangeCardRequest {
    pub cards: Vec<u32>,
    pub capacities: Vec<usize>,
    pub area_names: Vec<String>,
}

/// The typed io port one agent sits behind.
///
/// Replies are `None` on decline or timeout; the engine substitutes its
/// documented default in both cases.
pub trait Client {
    fn notify(&mut self, notification: &Notification);

    fn ask_trigger_order(&mut self, request: &TriggerOrderRequest) -> Option<usize>;

    fn ask_for_card(&mut self, request: &CardRequest) -> Option<CardReply>;

    fn ask_use_card(&mut self, request: &UseCardRequest) -> Option<UseCardReply>;

    fn ask_choose_player_card(&mut self, request: &ChooseCardRequest) -> Option<u32>;

    fn ask_arrange_cards(&mut self, request: &ArrangeCardRequest) -> Option<Vec<Vec<u32>>>;

    fn ask_option(&mut self, options: &[String]) -> Option<usize>;

    fn ask_general(&mut self, candidates: &[GeneralId], num: usize) -> Option<Vec<GeneralId>>;

    fn take_amazing_grace(&mut self) -> Option<u32>;
}

/// A client that declines every request. The engine's defaults take
/// over, so a bot seat never stalls a match.
#[derive(Debug, Default)]
pub struct BotClient;

impl Client for BotClient {
    fn notify(&mut self, _notification: &Notification) {}

    fn ask_trigger_order(&mut self, _request: &TriggerOrderRequest) -> Option<usize> {
        None
    }

    fn ask_for_card(&mut self, _request: &CardRequest) -> Option<CardReply> {
        None
    }

    fn ask_use_card(&mut self, _request: &UseCardRequest) -> Option<UseCardReply> {
        None
    }

    fn ask_choose_player_card(&mut self, _request: &ChooseCardRequest) -> Option<u32> {
        None
    }

    fn ask_arrange_cards(&mut self, _request: &ArrangeCardRequest) -> Option<Vec<Vec<u32>>> {
        None
    }

    fn ask_option(&mut self, _options: &[String]) -> Option<usize> {
        None
    }

    fn ask_general(&mut self, _candidates: &[GeneralId], _num: usize) -> Option<Vec<GeneralId>> {
        None
    }

    fn take_amazing_grace(&mut self) -> Option<u32> {
        None
    }
}

/// Shared view into a `ScriptedClient`: push replies, read the record.
#[derive(Clone, Default)]
pub struct ScriptHandle {
    inner: Rc<RefCell<ScriptState>>,
}

#[derive(Default)]
struct ScriptState {
    trigger_order: VecDeque<Option<usize>>,
    /// Card replies, keyed by the request's pattern so that an
    /// interleaved prompt (a nullification offer, say) cannot consume a
    /// reply scripted for another pattern.
    cards: HashMap<String, VecDeque<Option<CardReply>>>,
    use_card: VecDeque<Option<UseCardReply>>,
    choose_card: VecDeque<Option<u32>>,
    options: VecDeque<Option<usize>>,
    generals: VecDeque<Option<Vec<GeneralId>>>,
    amazing_grace: VecDeque<Option<u32>>,
    notifications: Vec<Notification>,
    card_requests: Vec<CardRequest>,
    use_card_requests: usize,
}

impl ScriptHandle {
    pub fn push_trigger_order(&self, reply: Option<usize>) {
        self.inner.borrow_mut().trigger_order.push_back(reply);
    }

    pub fn push_card_reply(&self, pattern: &str, reply: Option<CardReply>) {
        self.inner
            .borrow_mut()
            .cards
            .entry(pattern.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a single-card reply by id, for one pattern.
    pub fn push_card(&self, pattern: &str, id: u32) {
        self.push_card_reply(
            pattern,
            Some(CardReply {
                cards: vec![id],
                skill: None,
            }),
        );
    }

    pub fn push_use_card(&self, reply: Option<UseCardReply>) {
        self.inner.borrow_mut().use_card.push_back(reply);
    }

    pub fn push_choose_card(&self, reply: Option<u32>) {
        self.inner.borrow_mut().choose_card.push_back(reply);
    }

    pub fn push_option(&self, reply: Option<usize>) {
        self.inner.borrow_mut().options.push_back(reply);
    }

    pub fn push_general(&self, reply: Option<Vec<GeneralId>>) {
        self.inner.borrow_mut().generals.push_back(reply);
    }

    pub fn push_amazing_grace(&self, reply: Option<u32>) {
        self.inner.borrow_mut().amazing_grace.push_back(reply);
    }

    /// Everything the client was notified of, in order.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.borrow().notifications.clone()
    }

    /// The ask-for-card requests received, in order.
    #[must_use]
    pub fn card_requests(&self) -> Vec<CardRequest> {
        self.inner.borrow().card_requests.clone()
    }

    /// How many use-card requests this client received.
    #[must_use]
    pub fn use_card_request_count(&self) -> usize {
        self.inner.borrow().use_card_requests
    }
}

/// A client that plays back queued replies, declining once its queue
/// for a request kind runs dry.
#[derive(Default)]
pub struct ScriptedClient {
    handle: ScriptHandle,
}

impl ScriptedClient {
    /// Create a client and the handle that scripts and observes it.
    #[must_use]
    pub fn new() -> (Self, ScriptHandle) {
        let client = Self::default();
        let handle = client.handle.clone();
        (client, handle)
    }
}

impl Client for ScriptedClient {
    fn notify(&mut self, notification: &Notification) {
        self.handle
            .inner
            .borrow_mut()
            .notifications
            .push(notification.clone());
    }

    fn ask_trigger_order(&mut self, _request: &TriggerOrderRequest) -> Option<usize> {
        self.handle
            .inner
            .borrow_mut()
            .trigger_order
            .pop_front()
            .flatten()
    }

    fn ask_for_card(&mut self, request: &CardRequest) -> Option<CardReply> {
        let mut state = self.handle.inner.borrow_mut();
        state.card_requests.push(request.clone());
        state
            .cards
            .get_mut(&request.pattern)
            .and_then(VecDeque::pop_front)
            .flatten()
    }

    fn ask_use_card(&mut self, _request: &UseCardRequest) -> Option<UseCardReply> {
        let mut state = self.handle.inner.borrow_mut();
        state.use_card_requests += 1;
        state.use_card.pop_front().flatten()
    }

    fn ask_choose_player_card(&mut self, _request: &ChooseCardRequest) -> Option<u32> {
        self.handle
            .inner
            .borrow_mut()
            .choose_card
            .pop_front()
            .flatten()
    }

    fn ask_arrange_cards(&mut self, _request: &ArrangeCardRequest) -> Option<Vec<Vec<u32>>> {
        None
    }

    fn ask_option(&mut self, _options: &[String]) -> Option<usize> {
        self.handle.inner.borrow_mut().options.pop_front().flatten()
    }

    fn ask_general(&mut self, _candidates: &[GeneralId], _num: usize) -> Option<Vec<GeneralId>> {
        self.handle
            .inner
            .borrow_mut()
            .generals
            .pop_front()
            .flatten()
    }

    fn take_amazing_grace(&mut self) -> Option<u32> {
        self.handle
            .inner
            .borrow_mut()
            .amazing_grace
            .pop_front()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_declines_everything() {
        let mut bot = BotClient;
        assert_eq!(
            bot.ask_trigger_order(&TriggerOrderRequest {
                options: vec![],
                cancelable: true,
            }),
            None
        );
        assert_eq!(bot.ask_option(&["a".into(), "b".into()]), None);
    }

    #[test]
    fn test_scripted_replies_in_order() {
        let (mut client, handle) = ScriptedClient::new();
        handle.push_card("slash", 3);
        handle.push_card_reply("slash", None);

        let request = CardRequest {
            pattern: "slash".into(),
            min: 1,
            max: 1,
            optional: true,
        };
        assert_eq!(
            client.ask_for_card(&request),
            Some(CardReply {
                cards: vec![3],
                skill: None,
            })
        );
        assert_eq!(client.ask_for_card(&request), None);
        // Queue exhausted: decline.
        assert_eq!(client.ask_for_card(&request), None);
        assert_eq!(handle.card_requests().len(), 3);
    }

    #[test]
    fn test_scripted_replies_keyed_by_pattern() {
        let (mut client, handle) = ScriptedClient::new();
        handle.push_card("slash", 3);

        let nullification = CardRequest {
            pattern: "nullification".into(),
            min: 1,
            max: 1,
            optional: true,
        };
        // The nullification prompt must not eat the slash reply.
        assert_eq!(client.ask_for_card(&nullification), None);

        let slash = CardRequest {
            pattern: "slash".into(),
            min: 1,
            max: 1,
            optional: true,
        };
        assert!(client.ask_for_card(&slash).is_some());
    }

    #[test]
    fn test_scripted_records_notifications() {
        let (mut client, handle) = ScriptedClient::new();
        client.notify(&Notification::ShowAmazingGrace);

        assert_eq!(handle.notifications(), vec![Notification::ShowAmazingGrace]);
    }

    #[test]
    fn test_prompt_builder() {
        let prompt = Prompt::new("duel-slash")
            .with_player(PlayerId::new(1))
            .with_card(7);

        assert_eq!(prompt.message, "duel-slash");
        assert_eq!(prompt.args.len(), 2);
    }
}
