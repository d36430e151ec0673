//! Player identification and the player model.
//!
//! ## PlayerId
//!
//! Type-safe player identifier; indices are 0-based and double as the
//! index into the match's player vector. Seats are 1-based and assigned
//! when the match is prepared.
//!
//! ## Player
//!
//! All per-player mutable state: seat and ring position, hp, phase, known
//! skills partitioned by skill area, per-turn histories, skipped phases
//! and the tag map. Card areas are *not* stored here - they live in the
//! match's area table, keyed by `(AreaType, owner)`, so every
//! cross-reference stays an index rather than a pointer cycle.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::GeneralId;
use crate::skills::SkillId;

/// Player identifier supporting up to 255 players.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a match with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Turn phases, in the order a normal turn visits them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Not this player's turn.
    #[default]
    Inactive,
    RoundStart,
    Start,
    Judge,
    Draw,
    Play,
    Discard,
    Finish,
}

impl Phase {
    /// The phases of a full, unmodified turn.
    pub const TURN: [Phase; 7] = [
        Phase::RoundStart,
        Phase::Start,
        Phase::Judge,
        Phase::Draw,
        Phase::Play,
        Phase::Discard,
        Phase::Finish,
    ];
}

/// Which slot of a player's kit a skill belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillArea {
    Head,
    Deputy,
    Acquired,
}

/// A player in a match.
///
/// Owned by the match logic; all mutation goes through it. The `next`
/// pointer forms the seating ring as an index, so players are plain data
/// with no self-references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    seat: usize,
    next: PlayerId,
    alive: bool,
    hp: i32,
    max_hp: i32,
    phase: Phase,
    general: Option<GeneralId>,

    /// Skills this player knows, with the area each occupies.
    skills: Vec<(SkillArea, SkillId)>,

    /// Per-turn count of card uses by card name.
    card_history: FxHashMap<String, u32>,

    /// Per-turn count of skill invocations.
    skill_history: FxHashMap<SkillId, u32>,

    /// Phases to skip this turn.
    skipped_phases: SmallVec<[Phase; 4]>,

    /// Open extension state, keyed by name. Values follow the i64
    /// encoding used for all observable state: booleans as 0/1, player
    /// references as their index, card references as their id.
    tags: FxHashMap<String, i64>,
}

impl Player {
    /// Create a player at the given index. Seat and ring are assigned
    /// later, when the match arranges seating.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            seat: 0,
            next: id,
            alive: true,
            hp: 0,
            max_hp: 0,
            phase: Phase::Inactive,
            general: None,
            skills: Vec::new(),
            card_history: FxHashMap::default(),
            skill_history: FxHashMap::default(),
            skipped_phases: SmallVec::new(),
            tags: FxHashMap::default(),
        }
    }

    /// This player's ID.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    // === Seating ===

    /// Seat number (1-based).
    #[must_use]
    pub fn seat(&self) -> usize {
        self.seat
    }

    pub fn set_seat(&mut self, seat: usize) {
        self.seat = seat;
    }

    /// The next player around the table.
    #[must_use]
    pub fn next(&self) -> PlayerId {
        self.next
    }

    pub fn set_next(&mut self, next: PlayerId) {
        self.next = next;
    }

    // === Life ===

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        !self.alive
    }

    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    #[must_use]
    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp;
    }

    #[must_use]
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn set_max_hp(&mut self, max_hp: i32) {
        self.max_hp = max_hp;
    }

    /// How far below max hp this player is.
    #[must_use]
    pub fn lost_hp(&self) -> i32 {
        (self.max_hp - self.hp).max(0)
    }

    #[must_use]
    pub fn is_wounded(&self) -> bool {
        self.alive && self.hp < self.max_hp
    }

    #[must_use]
    pub fn general(&self) -> Option<GeneralId> {
        self.general
    }

    pub fn set_general(&mut self, general: Option<GeneralId>) {
        self.general = general;
    }

    // === Phase ===

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Mark a phase to be skipped this turn.
    pub fn skip_phase(&mut self, phase: Phase) {
        if !self.skipped_phases.contains(&phase) {
            self.skipped_phases.push(phase);
        }
    }

    #[must_use]
    pub fn is_phase_skipped(&self, phase: Phase) -> bool {
        self.skipped_phases.contains(&phase)
    }

    pub fn clear_skipped_phases(&mut self) {
        self.skipped_phases.clear();
    }

    // === Skills ===

    /// Add a skill to the given area. Duplicates are ignored.
    pub fn add_skill(&mut self, area: SkillArea, skill: SkillId) {
        if !self.has_skill(skill) {
            self.skills.push((area, skill));
        }
    }

    /// Remove a skill from the given area.
    ///
    /// Returns true if the skill was present.
    pub fn remove_skill(&mut self, area: SkillArea, skill: SkillId) -> bool {
        let before = self.skills.len();
        self.skills.retain(|&(a, s)| !(a == area && s == skill));
        self.skills.len() != before
    }

    #[must_use]
    pub fn has_skill(&self, skill: SkillId) -> bool {
        self.skills.iter().any(|&(_, s)| s == skill)
    }

    /// All skills this player knows, in attach order.
    pub fn skills(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.skills.iter().map(|&(_, s)| s)
    }

    /// Skills with their areas.
    #[must_use]
    pub fn skill_areas(&self) -> &[(SkillArea, SkillId)] {
        &self.skills
    }

    // === Per-turn histories ===

    /// Record `times` uses of the named card this turn.
    pub fn add_card_history(&mut self, name: &str, times: u32) {
        *self.card_history.entry(name.to_string()).or_insert(0) += times;
    }

    /// How many times the named card was used this turn.
    #[must_use]
    pub fn card_history(&self, name: &str) -> u32 {
        self.card_history.get(name).copied().unwrap_or(0)
    }

    pub fn clear_card_history(&mut self) {
        self.card_history.clear();
    }

    /// Record one invocation of a skill this turn.
    pub fn add_skill_history(&mut self, skill: SkillId) {
        *self.skill_history.entry(skill).or_insert(0) += 1;
    }

    /// How many times a skill was invoked this turn.
    #[must_use]
    pub fn skill_history(&self, skill: SkillId) -> u32 {
        self.skill_history.get(&skill).copied().unwrap_or(0)
    }

    pub fn clear_skill_history(&mut self) {
        self.skill_history.clear();
    }

    // === Tags ===

    pub fn set_tag(&mut self, key: impl Into<String>, value: i64) {
        self.tags.insert(key.into(), value);
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<i64> {
        self.tags.get(key).copied()
    }

    pub fn remove_tag(&mut self, key: &str) -> Option<i64> {
        self.tags.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let p0 = PlayerId::new(0);
        assert_eq!(p0.index(), 0);
        assert_eq!(format!("{}", p0), "Player 0");

        let all: Vec<_> = PlayerId::all(4).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3], PlayerId::new(3));
    }

    #[test]
    fn test_hp_accounting() {
        let mut player = Player::new(PlayerId::new(0));
        player.set_max_hp(4);
        player.set_hp(4);

        assert!(!player.is_wounded());
        assert_eq!(player.lost_hp(), 0);

        player.set_hp(1);
        assert!(player.is_wounded());
        assert_eq!(player.lost_hp(), 3);
    }

    #[test]
    fn test_phase_skipping() {
        let mut player = Player::new(PlayerId::new(0));

        player.skip_phase(Phase::Play);
        player.skip_phase(Phase::Play);
        assert!(player.is_phase_skipped(Phase::Play));
        assert!(!player.is_phase_skipped(Phase::Draw));

        player.clear_skipped_phases();
        assert!(!player.is_phase_skipped(Phase::Play));
    }

    #[test]
    fn test_skill_list() {
        let mut player = Player::new(PlayerId::new(0));
        let skill = SkillId::new(7);

        player.add_skill(SkillArea::Head, skill);
        player.add_skill(SkillArea::Head, skill);
        assert!(player.has_skill(skill));
        assert_eq!(player.skills().count(), 1);

        assert!(player.remove_skill(SkillArea::Head, skill));
        assert!(!player.has_skill(skill));
        assert!(!player.remove_skill(SkillArea::Head, skill));
    }

    #[test]
    fn test_card_history() {
        let mut player = Player::new(PlayerId::new(0));

        assert_eq!(player.card_history("slash"), 0);
        player.add_card_history("slash", 1);
        player.add_card_history("slash", 1);
        assert_eq!(player.card_history("slash"), 2);

        player.clear_card_history();
        assert_eq!(player.card_history("slash"), 0);
    }

    #[test]
    fn test_tags() {
        let mut player = Player::new(PlayerId::new(0));

        assert_eq!(player.tag("drank"), None);
        player.set_tag("drank", 1);
        assert_eq!(player.tag("drank"), Some(1));
        assert_eq!(player.remove_tag("drank"), Some(1));
        assert_eq!(player.tag("drank"), None);
    }
}
