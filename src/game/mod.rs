//! The match logic: state ownership, event dispatch, and the pipelines.
//!
//! `GameLogic` owns everything mutable in a match - players, the card
//! arena, areas and positions, the handler table, the RNG - and is the
//! only mutator of any of it. One match runs on one logical thread;
//! client prompts are blocking calls through the typed `Client` port.
//!
//! The implementation is split by concern:
//! - this module: state, accessors, seating and distance, skills,
//!   notifications and prompts
//! - [`dispatch`]: the priority-banded trigger pipeline
//! - [`pipeline`]: card use and effects, movement, damage, judge
//! - [`turn`]: match preparation and the turn loop

pub mod structs;

mod dispatch;
mod pipeline;
mod turn;

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::areas::{AreaId, AreaType, CardArea};
use crate::cards::{
    CardArena, CardFace, CardHandle, CardSubtype, Catalog, GeneralId,
};
use crate::client::{Client, Notification, PlayerProperty, Prompt};
use crate::core::{GameResult, GameRng, Phase, Player, PlayerId, RoomSettings, SkillArea};
use crate::events::{EventHandler, EventType};
use crate::skills::{CardModSkill, SkillDef, SkillEntry, SkillId};

use structs::{NullifyScope, SkillChange};

/// The rule engine of one match.
pub struct GameLogic {
    catalog: Arc<Catalog>,
    settings: RoomSettings,
    players: Vec<Player>,
    clients: Vec<Box<dyn Client>>,
    cards: CardArena,
    areas: FxHashMap<AreaId, CardArea>,
    positions: FxHashMap<CardHandle, AreaId>,
    handlers: FxHashMap<EventType, Vec<Arc<dyn EventHandler>>>,
    game_rule: Option<Arc<dyn EventHandler>>,
    rng: GameRng,
    current_player: PlayerId,
    round: u32,
    reshuffle_count: u32,
    extra_turns: VecDeque<PlayerId>,
    nullify_stack: Vec<NullifyScope>,
}

impl GameLogic {
    /// Create the logic for one match: one client per seat.
    ///
    /// Panics on fewer than two clients or more than the room's
    /// capacity.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        settings: RoomSettings,
        clients: Vec<Box<dyn Client>>,
        seed: u64,
    ) -> Self {
        assert!(clients.len() >= 2, "a match needs at least 2 players");
        assert!(
            clients.len() <= settings.capacity,
            "{} players exceed room capacity {}",
            clients.len(),
            settings.capacity
        );

        let player_count = clients.len();
        let players: Vec<Player> = PlayerId::all(player_count).map(Player::new).collect();

        let mut areas = FxHashMap::default();
        for kind in [
            AreaType::DrawPile,
            AreaType::DiscardPile,
            AreaType::Table,
            AreaType::Wugu,
        ] {
            let id = AreaId::global(kind);
            areas.insert(id, CardArea::new(id));
        }
        for player in PlayerId::all(player_count) {
            for kind in [
                AreaType::Hand,
                AreaType::Equip,
                AreaType::Judge,
                AreaType::DelayedTrick,
            ] {
                let id = AreaId::of_player(kind, player);
                areas.insert(id, CardArea::new(id));
            }
        }

        Self {
            catalog,
            settings,
            players,
            clients,
            cards: CardArena::new(),
            areas,
            positions: FxHashMap::default(),
            handlers: FxHashMap::default(),
            game_rule: None,
            rng: GameRng::new(seed),
            current_player: PlayerId::new(0),
            round: 0,
            reshuffle_count: 0,
            extra_turns: VecDeque::new(),
            nullify_stack: Vec::new(),
        }
    }

    // === Players ===

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn reshuffle_count(&self) -> u32 {
        self.reshuffle_count
    }

    /// Queue an extra turn, taken after the current turn ends.
    pub fn add_extra_turn(&mut self, player: PlayerId) {
        self.extra_turns.push_back(player);
    }

    /// The next living player after `from`, walking the seat ring.
    /// Returns `from` itself if nobody else lives.
    #[must_use]
    pub fn next_alive(&self, from: PlayerId) -> PlayerId {
        let mut current = self.player(from).next();
        for _ in 0..self.players.len() {
            if self.player(current).is_alive() {
                return current;
            }
            current = self.player(current).next();
        }
        from
    }

    /// All players in action order: seat order anchored at the current
    /// player. A current player already out of its turn (phase
    /// `Inactive`) sorts last instead of first.
    #[must_use]
    pub fn all_players(&self, include_dead: bool) -> Vec<PlayerId> {
        let mut seats: Vec<PlayerId> = self.players.iter().map(Player::id).collect();
        seats.sort_by_key(|&id| self.player(id).seat());

        let anchor = seats
            .iter()
            .position(|&id| id == self.current_player)
            .unwrap_or(0);
        seats.rotate_left(anchor);

        let mut ordered: Vec<PlayerId> = seats
            .into_iter()
            .filter(|&id| include_dead || self.player(id).is_alive())
            .collect();

        if self.player(self.current_player).phase() == Phase::Inactive {
            if let Some(pos) = ordered.iter().position(|&id| id == self.current_player) {
                let current = ordered.remove(pos);
                ordered.push(current);
            }
        }
        ordered
    }

    /// Living players in action order.
    #[must_use]
    pub fn alive_players(&self) -> Vec<PlayerId> {
        self.all_players(false)
    }

    /// Living players in action order, except one.
    #[must_use]
    pub fn other_players(&self, except: PlayerId) -> Vec<PlayerId> {
        let mut players = self.alive_players();
        players.retain(|&id| id != except);
        players
    }

    /// Sort a player list into action order.
    pub fn sort_by_action_order(&self, players: &mut Vec<PlayerId>) {
        let order = self.all_players(true);
        players.sort_by_key(|&id| order.iter().position(|&o| o == id).unwrap_or(usize::MAX));
    }

    // === Distance ===

    /// Seat distance between two living players, adjusted by horses,
    /// minimum 1 (0 to oneself).
    #[must_use]
    pub fn distance(&self, from: PlayerId, to: PlayerId) -> i32 {
        if from == to {
            return 0;
        }

        let mut seats: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_alive() || p.id() == from || p.id() == to)
            .map(Player::id)
            .collect();
        seats.sort_by_key(|&id| self.player(id).seat());

        let Some(from_pos) = seats.iter().position(|&id| id == from) else {
            return crate::cards::UNLIMITED;
        };
        let Some(to_pos) = seats.iter().position(|&id| id == to) else {
            return crate::cards::UNLIMITED;
        };

        let gap = from_pos.abs_diff(to_pos);
        let base = gap.min(seats.len() - gap) as i32;

        let mut distance = base;
        if self.equip_of_subtype(to, CardSubtype::DefensiveHorse).is_some() {
            distance += 1;
        }
        if self
            .equip_of_subtype(from, CardSubtype::OffensiveHorse)
            .is_some()
        {
            distance -= 1;
        }
        distance.max(1)
    }

    /// A player's attack range: the equipped weapon's, or 1 bare-handed.
    #[must_use]
    pub fn attack_range(&self, player: PlayerId) -> i32 {
        self.equip_of_subtype(player, CardSubtype::Weapon)
            .map_or(1, |weapon| self.card_face(weapon).attack_range().max(1))
    }

    #[must_use]
    pub fn in_attack_range(&self, source: PlayerId, target: PlayerId) -> bool {
        source != target && self.distance(source, target) <= self.attack_range(source)
    }

    /// The equipped card of a subtype, if any.
    #[must_use]
    pub fn equip_of_subtype(&self, player: PlayerId, subtype: CardSubtype) -> Option<CardHandle> {
        self.area(AreaId::of_player(AreaType::Equip, player))
            .cards()
            .iter()
            .copied()
            .find(|&card| self.card_face(card).subtype() == subtype)
    }

    // === Cards and areas ===

    #[must_use]
    pub fn cards(&self) -> &CardArena {
        &self.cards
    }

    #[must_use]
    pub fn card_face(&self, card: CardHandle) -> Arc<dyn CardFace> {
        self.cards.face(card)
    }

    /// Synthesize a virtual card (for view-as skills).
    pub fn new_virtual_card(
        &mut self,
        face: Arc<dyn CardFace>,
        subcards: &[CardHandle],
        skill: Option<SkillId>,
    ) -> CardHandle {
        self.cards.new_virtual(face, subcards, skill)
    }

    /// Resolve a real card id from a client reply.
    #[must_use]
    pub fn find_card(&self, id: u32) -> Option<CardHandle> {
        self.cards.find_by_id(id)
    }

    /// Resolve a batch of ids, dropping unknown ones.
    #[must_use]
    pub fn find_cards(&self, ids: &[u32]) -> Vec<CardHandle> {
        ids.iter().filter_map(|&id| self.find_card(id)).collect()
    }

    /// An area by id. Panics for an id this match never created.
    #[must_use]
    pub fn area(&self, id: AreaId) -> &CardArea {
        self.areas.get(&id).expect("area not present in this match")
    }

    pub(crate) fn area_mut(&mut self, id: AreaId) -> &mut CardArea {
        self.areas.get_mut(&id).expect("area not present in this match")
    }

    #[must_use]
    pub fn try_area(&self, id: AreaId) -> Option<&CardArea> {
        self.areas.get(&id)
    }

    /// Which area a card currently sits in.
    #[must_use]
    pub fn position(&self, card: CardHandle) -> Option<AreaId> {
        self.positions.get(&card).copied()
    }

    #[must_use]
    pub fn hand_cards(&self, player: PlayerId) -> &[CardHandle] {
        self.area(AreaId::of_player(AreaType::Hand, player)).cards()
    }

    /// Whether a player holds no hand cards, equips or delayed tricks.
    #[must_use]
    pub fn is_all_nude(&self, player: PlayerId) -> bool {
        [AreaType::Hand, AreaType::Equip, AreaType::DelayedTrick]
            .into_iter()
            .all(|kind| self.area(AreaId::of_player(kind, player)).is_empty())
    }

    /// Whether a player's delayed-trick area holds a card of this name.
    #[must_use]
    pub fn delayed_trick_contains(&self, player: PlayerId, name: &str) -> bool {
        self.area(AreaId::of_player(AreaType::DelayedTrick, player))
            .cards()
            .iter()
            .any(|&card| self.cards.name(card) == name)
    }

    // === Catalog and skills ===

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    #[must_use]
    pub fn skill_name(&self, skill: SkillId) -> Option<&str> {
        self.catalog.skill(skill).map(SkillEntry::name)
    }

    #[must_use]
    pub fn player_has_skill_named(&self, player: PlayerId, name: &str) -> bool {
        self.player(player)
            .skills()
            .any(|id| self.skill_name(id) == Some(name))
    }

    /// The card-mod skills a player carries, for feasibility sums.
    #[must_use]
    pub fn card_mod_skills(&self, player: PlayerId) -> Vec<Arc<dyn CardModSkill>> {
        self.player(player)
            .skills()
            .filter_map(|id| self.catalog.skill(id))
            .filter_map(|entry| match &entry.def {
                SkillDef::CardMod(skill) => Some(Arc::clone(skill)),
                _ => None,
            })
            .collect()
    }

    /// Attach a skill without firing lifecycle events (setup path).
    pub fn attach_skill(&mut self, player: PlayerId, skill: SkillId, area: SkillArea) {
        let Some(entry) = self.catalog.skill(skill).cloned() else {
            return;
        };

        self.player_mut(player).add_skill(area, skill);
        if let Some(handler) = entry.handler {
            self.add_handler(handler);
        }
        for sub in entry.subskills {
            if let Some(handler) = self.catalog.skill(sub).and_then(|e| e.handler.clone()) {
                self.add_handler(handler);
            }
        }
        self.broadcast(Notification::AddSkill { player, skill });
    }

    /// Detach a skill without firing lifecycle events. The dispatcher
    /// handler is removed only when no other living player still
    /// carries the skill.
    pub fn detach_skill(&mut self, player: PlayerId, skill: SkillId, area: SkillArea) {
        if !self.player_mut(player).remove_skill(area, skill) {
            return;
        }

        let still_carried = self
            .players
            .iter()
            .any(|p| p.id() != player && p.is_alive() && p.has_skill(skill));
        if !still_carried {
            if let Some(entry) = self.catalog.skill(skill).cloned() {
                if let Some(handler) = entry.handler {
                    self.remove_handler(&handler);
                }
                for sub in entry.subskills {
                    if let Some(handler) = self.catalog.skill(sub).and_then(|e| e.handler.clone()) {
                        self.remove_handler(&handler);
                    }
                }
            }
        }
        self.broadcast(Notification::RemoveSkill { player, skill });
    }

    /// Attach a skill and fire `SkillAdded`.
    pub fn add_skill(
        &mut self,
        player: PlayerId,
        skill: SkillId,
        area: SkillArea,
    ) -> GameResult<()> {
        self.attach_skill(player, skill, area);
        let mut change = SkillChange {
            owner: player,
            skill,
            area,
        };
        self.trigger_mut(EventType::SkillAdded, Some(player), &mut change)?;
        Ok(())
    }

    /// Detach a skill and fire `SkillRemoved`.
    pub fn remove_skill(
        &mut self,
        player: PlayerId,
        skill: SkillId,
        area: SkillArea,
    ) -> GameResult<()> {
        self.detach_skill(player, skill, area);
        let mut change = SkillChange {
            owner: player,
            skill,
            area,
        };
        self.trigger_mut(EventType::SkillRemoved, Some(player), &mut change)?;
        Ok(())
    }

    /// Count a skill invocation and announce it.
    pub fn record_skill_invocation(&mut self, invoker: PlayerId, name: &str) {
        let Some(id) = self.catalog.skill_by_name(name).map(|entry| entry.id) else {
            return;
        };
        self.record_skill_use(invoker, id, &[], &[]);
    }

    /// Count a skill invocation with its cards and targets.
    pub fn record_skill_use(
        &mut self,
        invoker: PlayerId,
        skill: SkillId,
        cards: &[CardHandle],
        targets: &[PlayerId],
    ) {
        self.player_mut(invoker).add_skill_history(skill);
        let cards = cards
            .iter()
            .map(|&card| self.cards.effective_id(card))
            .collect();
        self.broadcast(Notification::InvokeSkill {
            player: invoker,
            skill,
            cards,
            targets: targets.to_vec(),
        });
    }

    /// Reset a player's per-turn skill history.
    pub fn clear_skill_history(&mut self, player: PlayerId) {
        self.player_mut(player).clear_skill_history();
        self.broadcast(Notification::ClearSkillHistory { player });
    }

    /// Count a play-phase card use.
    pub fn add_card_history(&mut self, player: PlayerId, name: &str, times: u32) {
        self.player_mut(player).add_card_history(name, times);
        self.notify(
            player,
            Notification::AddCardHistory {
                name: Some(name.to_string()),
                times,
            },
        );
    }

    /// Reset a player's per-turn card history.
    pub fn clear_card_history(&mut self, player: PlayerId) {
        self.player_mut(player).clear_card_history();
        self.notify(
            player,
            Notification::AddCardHistory {
                name: None,
                times: 0,
            },
        );
    }

    // === Handlers ===

    /// Register an event handler for the events it declares. A handler
    /// already present (same allocation) is not added twice.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        for &event in handler.events() {
            let list = self.handlers.entry(event).or_default();
            if !list.iter().any(|existing| Arc::ptr_eq(existing, &handler)) {
                list.push(Arc::clone(&handler));
            }
        }
    }

    /// Unregister an event handler.
    pub fn remove_handler(&mut self, handler: &Arc<dyn EventHandler>) {
        for &event in handler.events() {
            if let Some(list) = self.handlers.get_mut(&event) {
                list.retain(|existing| !Arc::ptr_eq(existing, handler));
            }
        }
    }

    /// Install the mode's rule handler, replacing any previous one.
    pub fn set_game_rule(&mut self, rule: Arc<dyn EventHandler>) {
        if let Some(old) = self.game_rule.take() {
            self.remove_handler(&old);
        }
        self.add_handler(Arc::clone(&rule));
        self.game_rule = Some(rule);
    }

    pub(crate) fn game_rule(&self) -> Option<Arc<dyn EventHandler>> {
        self.game_rule.clone()
    }

    /// The names of handlers registered for an event, in registration
    /// order.
    #[must_use]
    pub fn handler_names(&self, event: EventType) -> Vec<String> {
        self.handlers
            .get(&event)
            .map(|list| list.iter().map(|h| h.name().to_string()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn handlers_for(&self, event: EventType) -> Vec<Arc<dyn EventHandler>> {
        self.handlers.get(&event).cloned().unwrap_or_default()
    }

    // === Generals ===

    /// Apply a chosen general: hp, and its skills as head skills.
    pub fn apply_general(&mut self, player: PlayerId, general: GeneralId) {
        let Some(info) = self.catalog.general(general).cloned() else {
            return;
        };

        self.player_mut(player).set_general(Some(general));
        self.player_mut(player).set_max_hp(info.max_hp);
        self.player_mut(player).set_hp(info.max_hp);
        self.broadcast_property(player, PlayerProperty::General(Some(general)));
        self.broadcast_property(player, PlayerProperty::MaxHp(info.max_hp));
        self.broadcast_property(player, PlayerProperty::Hp(info.max_hp));

        for skill in info.skills {
            self.attach_skill(player, skill, SkillArea::Head);
        }
    }

    // === Notifications ===

    /// Send to every client.
    pub fn broadcast(&mut self, notification: Notification) {
        for client in &mut self.clients {
            client.notify(&notification);
        }
    }

    /// Send to one client.
    pub fn notify(&mut self, player: PlayerId, notification: Notification) {
        self.clients[player.index()].notify(&notification);
    }

    /// Broadcast one observable property change.
    pub fn broadcast_property(&mut self, player: PlayerId, property: PlayerProperty) {
        self.broadcast(Notification::UpdatePlayerProperty { player, property });
    }

    /// Broadcast a tag value (or its removal).
    pub fn broadcast_tag(&mut self, player: PlayerId, key: &str) {
        let value = self.player(player).tag(key);
        self.broadcast(Notification::SetPlayerTag {
            player,
            key: key.to_string(),
            value,
        });
    }

    /// Show a prompt to one player.
    pub fn show_prompt(&mut self, player: PlayerId, prompt: Prompt) {
        self.notify(player, Notification::ShowPrompt { prompt });
    }

    /// Reveal cards to everyone.
    pub fn show_card(&mut self, player: PlayerId, cards: &[CardHandle]) {
        let ids = cards
            .iter()
            .map(|&card| self.cards.effective_id(card))
            .collect();
        self.broadcast(Notification::ShowCard { from: player, cards: ids });
    }

    /// Set a player's hp and broadcast the change.
    pub(crate) fn set_hp(&mut self, player: PlayerId, hp: i32) {
        self.player_mut(player).set_hp(hp);
        self.broadcast_property(player, PlayerProperty::Hp(hp));
    }

    pub(crate) fn set_phase(&mut self, player: PlayerId, phase: Phase) {
        self.player_mut(player).set_phase(phase);
        self.broadcast_property(player, PlayerProperty::Phase(phase));
    }

    // === Nullification scopes ===

    pub(crate) fn push_nullify_scope(&mut self, scope: NullifyScope) {
        self.nullify_stack.push(scope);
    }

    pub(crate) fn pop_nullify_scope(&mut self) -> NullifyScope {
        self.nullify_stack
            .pop()
            .expect("nullification scope stack underflow")
    }

    /// The innermost nullification offer in flight, if any. A resolving
    /// nullification writes its verdict here.
    pub fn nullify_scope_mut(&mut self) -> Option<&mut NullifyScope> {
        self.nullify_stack.last_mut()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    pub(crate) fn client_mut(&mut self, player: PlayerId) -> &mut Box<dyn Client> {
        &mut self.clients[player.index()]
    }
}
