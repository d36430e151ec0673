//! Room settings consumed by the engine.

use serde::{Deserialize, Serialize};

/// Per-room configuration handed to the engine when a match starts.
///
/// The engine reads these; it never writes them. `reshuffle_cap` bounds how
/// often the discard pile may be shuffled back into the draw pile before
/// the match is declared a stalemate (`None` = unbounded).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Game mode name, resolved against the catalog.
    pub mode: String,

    /// Player capacity of the room.
    pub capacity: usize,

    /// Per-prompt timeout in seconds.
    pub timeout_secs: u64,

    /// Optional cap on draw-pile reshuffles.
    pub reshuffle_cap: Option<u32>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            mode: "standard".to_string(),
            capacity: 8,
            timeout_secs: 15,
            reshuffle_cap: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RoomSettings::default();
        assert_eq!(settings.mode, "standard");
        assert_eq!(settings.capacity, 8);
        assert_eq!(settings.timeout_secs, 15);
        assert_eq!(settings.reshuffle_cap, None);
    }

    #[test]
    fn test_serialization() {
        let settings = RoomSettings {
            reshuffle_cap: Some(3),
            ..RoomSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: RoomSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }
}
