//! Save artifact domain
//!
//! Payload schema, generation records, and the generator collaborator
//! boundary. The production save encoder ships outside this repository
//! and is reached only through the [`SaveGenerator`] trait.

pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAP_FLAGS: usize = 45;
pub const BOSS_FLAGS: usize = 4;
pub const ENCOUNTER_ALT_FLAGS: usize = 36;
pub const ENCOUNTER_FLAGS: usize = 89;
pub const ACHIEVEMENT_FLAGS: usize = 128;
pub const SURVIVED_BOSS_FLAGS: usize = 4;
pub const SURVIVED_ALT_FLAGS: usize = 35;
pub const SURVIVED_FLAGS: usize = 89;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save generation failed: {0}")]
    Generation(String),
    #[error("store error: {0}")]
    Store(String),
}

/// Statistics bundle submitted for save generation. Field names follow
/// the wire format the game client emits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SavePayload {
    #[serde(rename = "playername")]
    pub player_name: String,
    #[serde(rename = "totalplaytime")]
    pub total_play_time: i64,
    #[serde(rename = "damagetaken")]
    pub damage_taken: i64,
    #[serde(rename = "stepstaken")]
    pub steps_taken: i64,
    #[serde(rename = "crystalsbroken")]
    pub crystals_broken: i64,
    #[serde(rename = "killersstunned")]
    pub killers_stunned: i64,
    #[serde(rename = "totaldeaths")]
    pub total_deaths: i64,
    #[serde(rename = "totalpurchase")]
    pub total_purchase: i64,
    #[serde(rename = "roundswon")]
    pub rounds_won: i64,
    #[serde(rename = "totalenkephalin")]
    pub total_enkephalin: i64,
    #[serde(rename = "HasBeenToMap")]
    pub has_been_to_map: Vec<i64>,
    #[serde(rename = "bossUnlocked")]
    pub boss_unlocked: Vec<i64>,
    #[serde(rename = "HasEncounteredAlt")]
    pub has_encountered_alt: Vec<i64>,
    #[serde(rename = "HasEncountered")]
    pub has_encountered: Vec<i64>,
    #[serde(rename = "Achievements")]
    pub achievements: Vec<i64>,
    #[serde(rename = "HasSurvivedBoss")]
    pub has_survived_boss: Vec<i64>,
    #[serde(rename = "HasSurvivedAlt")]
    pub has_survived_alt: Vec<i64>,
    #[serde(rename = "HasSurvived")]
    pub has_survived: Vec<i64>,
}

impl SavePayload {
    /// Check the fixed array lengths and the player name. Integer-ness of
    /// every element is already enforced by deserialization.
    pub fn is_valid(&self) -> bool {
        !self.player_name.is_empty()
            && self.has_been_to_map.len() == MAP_FLAGS
            && self.boss_unlocked.len() == BOSS_FLAGS
            && self.has_encountered_alt.len() == ENCOUNTER_ALT_FLAGS
            && self.has_encountered.len() == ENCOUNTER_FLAGS
            && self.achievements.len() == ACHIEVEMENT_FLAGS
            && self.has_survived_boss.len() == SURVIVED_BOSS_FLAGS
            && self.has_survived_alt.len() == SURVIVED_ALT_FLAGS
            && self.has_survived.len() == SURVIVED_FLAGS
    }
}

/// Builds the save artifact string handed back to the client.
pub trait SaveGenerator: Send + Sync {
    fn make_save(&self, player_name: &str, payload: &SavePayload) -> Result<String, SaveError>;
}

/// Serializes the payload to a plain JSON artifact. Wired by default
/// until the proprietary encoder is linked in.
pub struct PlainGenerator;

impl SaveGenerator for PlainGenerator {
    fn make_save(&self, _player_name: &str, payload: &SavePayload) -> Result<String, SaveError> {
        serde_json::to_string(payload).map_err(|e| SaveError::Generation(e.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::valid_payload;
    use super::*;

    #[test]
    fn test_payload_validation() {
        assert!(valid_payload("agent").is_valid());

        let mut payload = valid_payload("agent");
        payload.player_name.clear();
        assert!(!payload.is_valid());

        let mut payload = valid_payload("agent");
        payload.achievements.pop();
        assert!(!payload.is_valid());

        let mut payload = valid_payload("agent");
        payload.has_been_to_map.push(1);
        assert!(!payload.is_valid());
    }

    #[test]
    fn test_payload_wire_names() {
        let json = serde_json::to_value(valid_payload("agent")).unwrap();
        assert_eq!(json["playername"], "agent");
        assert!(json["HasBeenToMap"].is_array());
        assert!(json["totalenkephalin"].is_i64());
    }

    #[test]
    fn test_payload_rejects_non_integer_elements() {
        let mut json = serde_json::to_value(valid_payload("agent")).unwrap();
        json["Achievements"][0] = serde_json::json!("yes");
        assert!(serde_json::from_value::<SavePayload>(json).is_err());
    }

    #[test]
    fn test_plain_generator_produces_artifact() {
        let payload = valid_payload("agent");
        let artifact = PlainGenerator.make_save("agent", &payload).unwrap();
        let round: SavePayload = serde_json::from_str(&artifact).unwrap();
        assert_eq!(round.player_name, "agent");
    }
}
