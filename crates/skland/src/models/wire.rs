//! Raw upstream payload shapes.
//!
//! Every field is defaulted: the game API omits or nulls sections freely
//! depending on account progress. Non-optional fields also read `null` as
//! their default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Missing keys use the container default; explicit `null` lands here.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_no_skill<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(-1))
}

fn null_dorm_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(1))
}

/// `{current, total}` counters used by several progress sections.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Progress {
    #[serde(deserialize_with = "null_default")]
    pub current: i64,
    #[serde(deserialize_with = "null_default")]
    pub total: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PlayerInfoData {
    pub status: Option<StatusData>,
    #[serde(deserialize_with = "null_default")]
    pub chars: Vec<CharData>,
    pub building: Option<BuildingData>,
    #[serde(deserialize_with = "null_default")]
    pub recruit: Vec<RecruitSlotData>,
    pub campaign: Option<CampaignData>,
    pub routine: Option<RoutineData>,
    pub tower: Option<TowerData>,
    #[serde(deserialize_with = "null_default")]
    pub assist_chars: Vec<AssistCharData>,
    pub medal: Option<MedalData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StatusData {
    pub uid: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub level: i64,
    #[serde(deserialize_with = "null_default")]
    pub ap: ApData,
    #[serde(deserialize_with = "null_default")]
    pub register_ts: i64,
    #[serde(deserialize_with = "null_default")]
    pub last_online_ts: i64,
    pub secretary: Option<SecretaryData>,
    pub avatar: Option<AvatarData>,
    pub resume: Option<String>,
    pub main_stage_progress: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub char_cnt: i64,
    #[serde(deserialize_with = "null_default")]
    pub furniture_cnt: i64,
    #[serde(deserialize_with = "null_default")]
    pub skin_cnt: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ApData {
    #[serde(deserialize_with = "null_default")]
    pub current: i64,
    #[serde(deserialize_with = "null_default")]
    pub max: i64,
    #[serde(deserialize_with = "null_default")]
    pub last_ap_add_time: i64,
    #[serde(deserialize_with = "null_default")]
    pub complete_recovery_time: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SecretaryData {
    pub char_id: Option<String>,
    pub skin_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AvatarData {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CharData {
    pub char_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct BuildingData {
    #[serde(deserialize_with = "null_default")]
    pub tradings: Vec<TradingData>,
    #[serde(deserialize_with = "null_default")]
    pub manufactures: Vec<ManufactureData>,
    pub labor: Option<LaborData>,
    pub training: Option<TrainingData>,
    pub hire: Option<HireData>,
    #[serde(deserialize_with = "null_default")]
    pub dormitories: Vec<DormData>,
    pub meeting: Option<MeetingData>,
    #[serde(deserialize_with = "null_default")]
    pub tired_chars: Vec<Value>,
}

impl BuildingData {
    /// The API sends `{}` for accounts without base data.
    pub fn is_empty(&self) -> bool {
        self.tradings.is_empty()
            && self.manufactures.is_empty()
            && self.labor.is_none()
            && self.training.is_none()
            && self.hire.is_none()
            && self.dormitories.is_empty()
            && self.meeting.is_none()
            && self.tired_chars.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TradingData {
    #[serde(deserialize_with = "null_default")]
    pub stock: Vec<Value>,
    #[serde(deserialize_with = "null_default")]
    pub stock_limit: i64,
    #[serde(deserialize_with = "null_default")]
    pub complete_work_time: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ManufactureData {
    #[serde(deserialize_with = "null_default")]
    pub complete: i64,
    #[serde(deserialize_with = "null_default")]
    pub capacity: i64,
    #[serde(deserialize_with = "null_default")]
    pub weight: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct LaborData {
    #[serde(deserialize_with = "null_default")]
    pub value: i64,
    #[serde(deserialize_with = "null_default")]
    pub max_value: i64,
    #[serde(deserialize_with = "null_default")]
    pub last_update_time: i64,
    #[serde(deserialize_with = "null_default")]
    pub remain_secs: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TrainingData {
    pub trainee: Option<TraineeData>,
    #[serde(deserialize_with = "null_default")]
    pub remain_secs: i64,
    #[serde(deserialize_with = "null_default")]
    pub last_update_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TraineeData {
    pub char_id: Option<String>,
    #[serde(deserialize_with = "null_no_skill")]
    pub target_skill: i64,
}

impl Default for TraineeData {
    fn default() -> Self {
        Self {
            char_id: None,
            target_skill: -1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct HireData {
    #[serde(deserialize_with = "null_default")]
    pub refresh_count: i64,
    #[serde(deserialize_with = "null_default")]
    pub complete_work_time: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RecruitSlotData {
    #[serde(deserialize_with = "null_default")]
    pub state: i64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct DormData {
    #[serde(deserialize_with = "null_default")]
    pub chars: Vec<DormCharData>,
    #[serde(deserialize_with = "null_dorm_level")]
    pub level: i64,
    #[serde(deserialize_with = "null_default")]
    pub comfort: i64,
}

impl Default for DormData {
    fn default() -> Self {
        Self {
            chars: Vec::new(),
            level: 1,
            comfort: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DormCharData {
    #[serde(deserialize_with = "null_default")]
    pub ap: i64,
    #[serde(deserialize_with = "null_default")]
    pub last_ap_add_time: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MeetingData {
    pub clue: Option<ClueData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ClueData {
    #[serde(deserialize_with = "null_default")]
    pub own: i64,
    #[serde(deserialize_with = "null_default")]
    pub received: i64,
    #[serde(deserialize_with = "null_default")]
    pub board: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CampaignData {
    #[serde(deserialize_with = "null_default")]
    pub reward: Progress,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RoutineData {
    #[serde(deserialize_with = "null_default")]
    pub daily: Progress,
    #[serde(deserialize_with = "null_default")]
    pub weekly: Progress,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TowerData {
    #[serde(deserialize_with = "null_default")]
    pub reward: TowerRewardData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TowerRewardData {
    #[serde(deserialize_with = "null_default")]
    pub higher_item: Progress,
    #[serde(deserialize_with = "null_default")]
    pub lower_item: Progress,
    #[serde(deserialize_with = "null_default")]
    pub term_ts: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AssistCharData {
    pub char_id: Option<String>,
    pub skin_id: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub level: i64,
    #[serde(deserialize_with = "null_default")]
    pub evolve_phase: i64,
    #[serde(deserialize_with = "null_default")]
    pub potential_rank: i64,
    pub skill_id: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub main_skill_lvl: i64,
    #[serde(deserialize_with = "null_default")]
    pub specialize_level: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MedalData {
    #[serde(deserialize_with = "null_default")]
    pub total: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct BindingApp {
    pub app_code: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub binding_list: Vec<BindingData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct BindingData {
    pub uid: Option<String>,
    pub nick_name: Option<String>,
    pub channel_master_id: Option<String>,
    pub channel_name: Option<String>,
    pub is_official: Option<bool>,
    #[serde(deserialize_with = "null_default")]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AttendanceData {
    #[serde(deserialize_with = "null_default")]
    pub awards: Vec<AwardData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AwardData {
    pub resource: Option<AwardResource>,
    #[serde(deserialize_with = "null_default")]
    pub count: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AwardResource {
    pub name: Option<String>,
}
