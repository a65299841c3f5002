//! Read-only projections of a player snapshot.
//!
//! These are the response shapes of the query surface. Every time-derived
//! value is evaluated at the `now` passed in, so two reads of the same
//! snapshot at the same instant are identical.
//!
//! ```json
//! {
//!     "uid": "12345678",
//!     "name": "Doctor",
//!     "level": 120,
//!     "sanity": { "current": 133, "max": 135, "minutes_to_full": 12, "complete_recovery_time": 1700000720 },
//!     "building": { "...": "..." } | null,
//!     "campaign": { "current": 1800, "total": 1800 } | null
//! }
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use skland_api::{AssistChar, CampaignInfo, PlayerStatus, RoutineInfo, TowerInfo};

// ============================================================================
// Account list
// ============================================================================

/// One entry of the account list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub uid: String,
    pub name: String,
    pub level: i64,
}

impl From<&PlayerStatus> for AccountSummary {
    fn from(status: &PlayerStatus) -> Self {
        Self {
            uid: status.uid.clone(),
            name: status.name.clone(),
            level: status.level,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountSummary>,
}

// ============================================================================
// Account data
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanityData {
    pub current: i64,
    pub max: i64,
    pub minutes_to_full: i64,
    pub complete_recovery_time: i64,
}

/// Building metrics projected to one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingData {
    pub trading_stock: i64,
    pub trading_stock_limit: i64,
    pub manufacture_complete: i64,
    pub manufacture_capacity: i64,
    pub drone_current: i64,
    pub drone_max: i64,
    /// Display text, e.g. "空闲".
    pub training_state: String,
    pub training_remaining_secs: i64,
    pub trainee_char_id: String,
    pub hire_refresh_count: i64,
    pub hire_refresh_cooldown_minutes: i64,
    pub recruit_finished: i64,
    pub recruit_total: i64,
    pub resting_count: i64,
    pub rested_count: i64,
    pub clue_own: i64,
    pub clue_received: i64,
    pub clue_collected: i64,
    /// Slot number ("1".."7") to occupancy.
    pub clue_board: BTreeMap<String, bool>,
    pub tired_count: i64,
}

/// Full denormalized view of one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountData {
    pub uid: String,
    pub name: String,
    pub level: i64,
    pub avatar_url: String,
    pub secretary_id: String,
    pub secretary_skin_id: String,
    pub resume: String,
    pub main_stage_progress: String,
    pub char_count: i64,
    pub furniture_count: i64,
    pub skin_count: i64,
    pub register_ts: i64,
    pub last_online_ts: i64,
    pub sanity: SanityData,
    pub building: Option<BuildingData>,
    pub medal_count: i64,
    pub campaign: Option<CampaignInfo>,
    pub routine: Option<RoutineInfo>,
    pub tower: Option<TowerInfo>,
    pub assist_chars: Vec<AssistChar>,
}

impl AccountData {
    pub fn project(status: &PlayerStatus, now: i64) -> Self {
        let building = status.building.as_ref().map(|b| {
            let view = b.view(now);
            BuildingData {
                trading_stock: view.trading_stock,
                trading_stock_limit: view.trading_stock_limit,
                manufacture_complete: view.manufacture_complete,
                manufacture_capacity: view.manufacture_capacity,
                drone_current: view.drone_current,
                drone_max: view.drone_max,
                training_state: view.training_state.to_string(),
                training_remaining_secs: view.training_remaining_secs,
                trainee_char_id: view.trainee_char_id,
                hire_refresh_count: view.hire_refresh_count,
                hire_refresh_cooldown_minutes: view.hire_refresh_cooldown_minutes,
                recruit_finished: view.recruit_finished,
                recruit_total: view.recruit_total,
                resting_count: view.resting_count,
                rested_count: view.rested_count,
                clue_own: view.clue_own,
                clue_received: view.clue_received,
                clue_collected: view.clue_collected,
                clue_board: view
                    .clue_board
                    .into_iter()
                    .map(|(slot, occupied)| (slot.to_string(), occupied))
                    .collect(),
                tired_count: view.tired_count,
            }
        });

        Self {
            uid: status.uid.clone(),
            name: status.name.clone(),
            level: status.level,
            avatar_url: status.avatar_url.clone(),
            secretary_id: status.secretary_id.clone(),
            secretary_skin_id: status.secretary_skin_id.clone(),
            resume: status.resume.clone(),
            main_stage_progress: status.main_stage_progress.clone(),
            char_count: status.char_count,
            furniture_count: status.furniture_count,
            skin_count: status.skin_count,
            register_ts: status.register_ts,
            last_online_ts: status.last_online_ts,
            sanity: SanityData {
                current: status.sanity.current_at(now),
                max: status.sanity.max,
                minutes_to_full: status.sanity.minutes_to_full(now),
                complete_recovery_time: status.sanity.complete_recovery_time,
            },
            building,
            medal_count: status.medal_count,
            campaign: status.campaign,
            routine: status.routine,
            tower: status.tower,
            assist_chars: status.assist_chars.clone(),
        }
    }
}
