//! Player snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::building::BuildingSnapshot;

/// Sanity (energy) as returned by the server: a baseline plus the instant at
/// which regeneration completes. The live value is derived on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnergySnapshot {
    pub current: i64,
    pub max: i64,
    pub last_add_time: i64,
    /// Unix seconds; `<= 0` means no regeneration in progress.
    pub complete_recovery_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CampaignInfo {
    pub current: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutineInfo {
    pub daily_current: i64,
    pub daily_total: i64,
    pub weekly_current: i64,
    pub weekly_total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TowerInfo {
    pub higher_current: i64,
    pub higher_total: i64,
    pub lower_current: i64,
    pub lower_total: i64,
    pub term_ts: i64,
}

/// A character lent out on the support roster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssistChar {
    pub char_id: String,
    pub skin_id: String,
    pub level: i64,
    pub evolve_phase: i64,
    pub potential_rank: i64,
    pub skill_id: String,
    pub skill_level: i64,
    pub specialize_level: i64,
}

/// One successful player-info fetch. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub uid: String,
    pub name: String,
    pub level: i64,
    pub sanity: EnergySnapshot,
    pub register_ts: i64,
    pub last_online_ts: i64,
    pub secretary_id: String,
    pub secretary_skin_id: String,
    pub avatar_url: String,
    pub resume: String,
    pub main_stage_progress: String,
    pub char_count: i64,
    pub furniture_count: i64,
    pub skin_count: i64,
    pub medal_count: i64,
    pub building: Option<BuildingSnapshot>,
    pub campaign: Option<CampaignInfo>,
    pub routine: Option<RoutineInfo>,
    pub tower: Option<TowerInfo>,
    pub assist_chars: Vec<AssistChar>,
    pub fetched_at: DateTime<Utc>,
}

impl PlayerStatus {
    /// Registration date as `YYYY-MM-DD` (UTC).
    pub fn register_date(&self) -> Option<String> {
        DateTime::from_timestamp(self.register_ts, 0).map(|d| d.format("%Y-%m-%d").to_string())
    }
}
