//! Upstream payload parsing into owned snapshot types.

mod account;
mod building;
mod player;
pub(crate) mod wire;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use account::{Award, BindingCharacter, SignInResult};
pub use building::{
    BuildingSnapshot, ClueBoard, DormCharacter, Dormitory, HireSnapshot, LaborSnapshot,
    ManufactureStation, RecruitSlot, TradingStation, TrainingSnapshot,
};
pub use player::{AssistChar, CampaignInfo, EnergySnapshot, PlayerStatus, RoutineInfo, TowerInfo};

use crate::constants::GAME_APP_CODE;
use crate::error::{Result, SklandError};
use wire::{BuildingData, PlayerInfoData, RecruitSlotData};

/// The Amiya guard form is listed in `chars` but counts as the same operator.
const AMIYA_FORM_PREFIX: &str = "char_1001_amiya";

fn data_of<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    let data = payload
        .get("data")
        .ok_or_else(|| SklandError::Parse("no data field".to_string()))?;
    serde_json::from_value(data.clone()).map_err(|e| SklandError::Parse(e.to_string()))
}

/// Parse a player-info envelope.
pub fn parse_player_info(payload: &Value, fetched_at: DateTime<Utc>) -> Result<PlayerStatus> {
    let data: PlayerInfoData = data_of(payload)?;
    let status = data
        .status
        .ok_or_else(|| SklandError::Parse("no status in player info".to_string()))?;

    let char_count = if status.char_cnt == 0 {
        data.chars
            .iter()
            .filter(|c| {
                !c.char_id
                    .as_deref()
                    .unwrap_or_default()
                    .starts_with(AMIYA_FORM_PREFIX)
            })
            .count() as i64
    } else {
        status.char_cnt
    };

    let building = data
        .building
        .filter(|b| !b.is_empty())
        .map(|b| building_from_wire(b, &data.recruit));

    let (secretary_id, secretary_skin_id) = status
        .secretary
        .map(|s| (s.char_id.unwrap_or_default(), s.skin_id.unwrap_or_default()))
        .unwrap_or_default();

    Ok(PlayerStatus {
        uid: status
            .uid
            .ok_or_else(|| SklandError::Parse("no uid in player status".to_string()))?,
        name: status.name.unwrap_or_default(),
        level: status.level,
        sanity: EnergySnapshot {
            current: status.ap.current,
            max: status.ap.max,
            last_add_time: status.ap.last_ap_add_time,
            complete_recovery_time: status.ap.complete_recovery_time,
        },
        register_ts: status.register_ts,
        last_online_ts: status.last_online_ts,
        secretary_id,
        secretary_skin_id,
        avatar_url: status.avatar.and_then(|a| a.url).unwrap_or_default(),
        resume: status.resume.unwrap_or_default(),
        main_stage_progress: status.main_stage_progress.unwrap_or_default(),
        char_count,
        furniture_count: status.furniture_cnt,
        skin_count: status.skin_cnt,
        medal_count: data.medal.map(|m| m.total).unwrap_or_default(),
        building,
        campaign: data.campaign.map(|c| CampaignInfo {
            current: c.reward.current,
            total: c.reward.total,
        }),
        routine: data.routine.map(|r| RoutineInfo {
            daily_current: r.daily.current,
            daily_total: r.daily.total,
            weekly_current: r.weekly.current,
            weekly_total: r.weekly.total,
        }),
        tower: data.tower.map(|t| TowerInfo {
            higher_current: t.reward.higher_item.current,
            higher_total: t.reward.higher_item.total,
            lower_current: t.reward.lower_item.current,
            lower_total: t.reward.lower_item.total,
            term_ts: t.reward.term_ts,
        }),
        assist_chars: data
            .assist_chars
            .into_iter()
            .map(|a| AssistChar {
                char_id: a.char_id.unwrap_or_default(),
                skin_id: a.skin_id.unwrap_or_default(),
                level: a.level,
                evolve_phase: a.evolve_phase,
                potential_rank: a.potential_rank,
                skill_id: a.skill_id.unwrap_or_default(),
                skill_level: a.main_skill_lvl,
                specialize_level: a.specialize_level,
            })
            .collect(),
        fetched_at,
    })
}

fn building_from_wire(building: BuildingData, recruit: &[RecruitSlotData]) -> BuildingSnapshot {
    let labor = building.labor.unwrap_or_default();
    let hire = building.hire.unwrap_or_default();
    let clue = building
        .meeting
        .and_then(|m| m.clue)
        .unwrap_or_default();

    let training = building.training.and_then(|t| {
        let trainee = t.trainee?;
        let char_id = trainee.char_id.filter(|id| !id.is_empty())?;
        Some(TrainingSnapshot {
            trainee_char_id: char_id,
            target_skill: trainee.target_skill,
            remain_secs: t.remain_secs.max(0),
            last_update_time: t.last_update_time,
        })
    });

    BuildingSnapshot {
        tradings: building
            .tradings
            .iter()
            .map(|t| TradingStation {
                stock: t.stock.len() as i64,
                stock_limit: t.stock_limit,
                complete_work_time: t.complete_work_time,
            })
            .collect(),
        manufactures: building
            .manufactures
            .iter()
            .map(|m| ManufactureStation {
                complete: m.complete,
                capacity: m.capacity,
                weight: m.weight,
            })
            .collect(),
        labor: LaborSnapshot {
            current: labor.value,
            max: labor.max_value,
            last_update_time: labor.last_update_time,
            remain_secs: labor.remain_secs,
        },
        training,
        hire: HireSnapshot {
            refresh_count: hire.refresh_count,
            complete_work_time: hire.complete_work_time,
        },
        recruit: recruit
            .iter()
            .map(|slot| RecruitSlot {
                finished: slot.state == 1,
            })
            .collect(),
        dormitories: building
            .dormitories
            .iter()
            .map(|d| Dormitory {
                level: d.level,
                comfort: d.comfort,
                chars: d
                    .chars
                    .iter()
                    .map(|c| DormCharacter {
                        ap: c.ap,
                        last_ap_add_time: c.last_ap_add_time,
                    })
                    .collect(),
            })
            .collect(),
        clue: ClueBoard {
            own: clue.own,
            received: clue.received,
            board: clue.board,
        },
        tired_count: building.tired_chars.len() as i64,
    }
}

/// Parse the binding-list envelope, keeping only Arknights characters.
pub fn parse_bindings(payload: &Value) -> Result<Vec<BindingCharacter>> {
    #[derive(serde::Deserialize, Default)]
    #[serde(default)]
    struct BindingList {
        #[serde(deserialize_with = "wire::null_default")]
        list: Vec<wire::BindingApp>,
    }

    let data: BindingList = data_of(payload)?;
    let characters = data
        .list
        .into_iter()
        .filter(|app| app.app_code.as_deref() == Some(GAME_APP_CODE))
        .flat_map(|app| app.binding_list)
        .filter_map(|b| {
            Some(BindingCharacter {
                uid: b.uid?,
                nickname: b.nick_name.unwrap_or_default(),
                channel_master_id: b.channel_master_id.unwrap_or_else(|| "1".to_string()),
                channel_name: b.channel_name.unwrap_or_else(|| "官服".to_string()),
                is_official: b.is_official.unwrap_or(true),
                is_default: b.is_default,
            })
        })
        .collect();

    Ok(characters)
}

/// Parse the awards of an attendance envelope.
pub fn parse_awards(payload: &Value) -> Result<Vec<Award>> {
    let data: wire::AttendanceData = data_of(payload)?;
    Ok(data
        .awards
        .into_iter()
        .map(|a| Award {
            name: a
                .resource
                .and_then(|r| r.name)
                .unwrap_or_else(|| "未知".to_string()),
            count: a.count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetched_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn player_payload() -> Value {
        json!({
            "code": 0,
            "message": "OK",
            "data": {
                "status": {
                    "uid": "12345678",
                    "name": "Doctor#1234",
                    "level": 120,
                    "registerTs": 1_600_000_000,
                    "lastOnlineTs": 1_699_990_000,
                    "secretary": {"charId": "char_002_amiya", "skinId": "char_002_amiya#1"},
                    "avatar": {"url": "https://example.invalid/a.png"},
                    "resume": "hello",
                    "mainStageProgress": null,
                    "charCnt": 0,
                    "furnitureCnt": 900,
                    "skinCnt": 80,
                    "ap": {
                        "current": 50,
                        "max": 135,
                        "lastApAddTime": 1_699_999_000,
                        "completeRecoveryTime": 1_700_030_000
                    }
                },
                "chars": [
                    {"charId": "char_002_amiya"},
                    {"charId": "char_1001_amiya2"},
                    {"charId": "char_103_angel"}
                ],
                "building": {
                    "tradings": [
                        {"stock": [{}, {}], "stockLimit": 10, "completeWorkTime": 1_699_000_000},
                        {"stock": [], "stockLimit": 8, "completeWorkTime": 0}
                    ],
                    "manufactures": [{"complete": 30, "capacity": 54, "weight": 2}],
                    "labor": {"value": 100, "maxValue": 200, "lastUpdateTime": 1_699_990_000, "remainSecs": 36_000},
                    "training": {
                        "trainee": {"charId": "char_103_angel", "targetSkill": 2},
                        "remainSecs": 7200,
                        "lastUpdateTime": 1_699_999_000
                    },
                    "hire": {"refreshCount": 1, "completeWorkTime": 1_700_003_600},
                    "dormitories": [
                        {"level": 5, "comfort": 5000, "chars": [{"ap": 8_640_000, "lastApAddTime": 1_699_000_000}]}
                    ],
                    "meeting": {"clue": {"own": 3, "received": 2, "board": ["RHINE", "URSUS"]}},
                    "tiredChars": [{}, {}, {}]
                },
                "recruit": [{"state": 1}, {"state": 2}, {"state": 0}, {"state": 1}],
                "campaign": {"reward": {"current": 1500, "total": 1800}},
                "routine": {"daily": {"current": 8, "total": 10}, "weekly": {"current": 3, "total": 13}},
                "tower": {"reward": {"higherItem": {"current": 1, "total": 24}, "lowerItem": {"current": 60, "total": 60}, "termTs": 1_700_500_000}},
                "assistChars": [
                    {"charId": "char_103_angel", "skinId": "char_103_angel#2", "level": 90, "evolvePhase": 2,
                     "potentialRank": 5, "skillId": "skchr_angel_3", "mainSkillLvl": 7, "specializeLevel": 3}
                ],
                "medal": {"total": 42}
            }
        })
    }

    #[test]
    fn test_parse_player_info_identity() {
        let status = parse_player_info(&player_payload(), fetched_at()).unwrap();
        assert_eq!(status.uid, "12345678");
        assert_eq!(status.name, "Doctor#1234");
        assert_eq!(status.level, 120);
        assert_eq!(status.secretary_id, "char_002_amiya");
        assert_eq!(status.main_stage_progress, "");
        assert_eq!(status.sanity.current, 50);
        assert_eq!(status.sanity.complete_recovery_time, 1_700_030_000);
        assert_eq!(status.medal_count, 42);
        assert_eq!(status.fetched_at, fetched_at());
    }

    #[test]
    fn test_char_count_excludes_amiya_forms_when_server_count_missing() {
        let status = parse_player_info(&player_payload(), fetched_at()).unwrap();
        assert_eq!(status.char_count, 2);

        let mut payload = player_payload();
        payload["data"]["status"]["charCnt"] = json!(321);
        let status = parse_player_info(&payload, fetched_at()).unwrap();
        assert_eq!(status.char_count, 321);
    }

    #[test]
    fn test_parse_building_baselines() {
        let status = parse_player_info(&player_payload(), fetched_at()).unwrap();
        let building = status.building.unwrap();
        assert_eq!(building.tradings.len(), 2);
        assert_eq!(building.tradings[0].stock, 2);
        assert_eq!(building.trading_stock_limit(), 18);
        assert_eq!(building.manufacture_complete(), 30);
        assert_eq!(building.labor.max, 200);
        assert_eq!(building.recruit_finished(), 2);
        assert_eq!(building.recruit_total(), 4);
        assert_eq!(building.clue_collected(), 2);
        assert_eq!(building.tired_count, 3);
        let training = building.training.unwrap();
        assert_eq!(training.trainee_char_id, "char_103_angel");
        assert_eq!(training.target_skill, 2);
    }

    #[test]
    fn test_parse_optional_sections() {
        let status = parse_player_info(&player_payload(), fetched_at()).unwrap();
        assert_eq!(
            status.campaign,
            Some(CampaignInfo {
                current: 1500,
                total: 1800
            })
        );
        assert_eq!(status.routine.unwrap().weekly_total, 13);
        assert_eq!(status.tower.unwrap().lower_current, 60);
        assert_eq!(status.assist_chars.len(), 1);
        assert_eq!(status.assist_chars[0].skill_level, 7);
    }

    #[test]
    fn test_missing_sections_are_none() {
        let payload = json!({
            "code": 0,
            "data": {
                "status": {"uid": "1", "name": "n", "level": 1, "ap": {"current": 1, "max": 82}},
                "building": {}
            }
        });
        let status = parse_player_info(&payload, fetched_at()).unwrap();
        assert!(status.building.is_none());
        assert!(status.campaign.is_none());
        assert!(status.routine.is_none());
        assert!(status.tower.is_none());
        assert!(status.assist_chars.is_empty());
        assert_eq!(status.sanity.complete_recovery_time, 0);
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let payload = json!({
            "code": 0,
            "data": {
                "status": {
                    "uid": "1", "name": "n", "level": null, "charCnt": null,
                    "ap": {"current": 10, "max": 135, "lastApAddTime": null, "completeRecoveryTime": null}
                },
                "chars": null,
                "recruit": null,
                "assistChars": null,
                "campaign": {"reward": null},
                "building": {
                    "tradings": [{"stock": null, "stockLimit": null, "completeWorkTime": 0}],
                    "labor": {"value": null, "maxValue": 200, "lastUpdateTime": null, "remainSecs": null},
                    "training": {"trainee": {"charId": "char_103_angel", "targetSkill": null}, "remainSecs": null},
                    "dormitories": [{"level": null, "comfort": null, "chars": null}],
                    "meeting": {"clue": {"own": null, "board": null}},
                    "tiredChars": null
                }
            }
        });

        let status = parse_player_info(&payload, fetched_at()).unwrap();
        assert_eq!(status.level, 0);
        assert_eq!(status.char_count, 0);
        assert_eq!(status.sanity.current, 10);
        assert_eq!(status.sanity.complete_recovery_time, 0);
        assert!(status.assist_chars.is_empty());
        assert_eq!(status.campaign.unwrap().total, 0);

        let building = status.building.unwrap();
        assert_eq!(building.tradings[0].stock, 0);
        assert_eq!(building.labor.max, 200);
        assert_eq!(building.labor.current, 0);
        assert_eq!(building.training.unwrap().target_skill, -1);
        assert_eq!(building.dormitories[0].level, 1);
        assert!(building.dormitories[0].chars.is_empty());
        assert!(building.clue.board.is_empty());
        assert_eq!(building.tired_count, 0);
        assert!(building.recruit.is_empty());
    }

    #[test]
    fn test_missing_status_is_parse_error() {
        let err = parse_player_info(&json!({"code": 0, "data": {}}), fetched_at()).unwrap_err();
        assert!(matches!(err, SklandError::Parse(_)));
    }

    #[test]
    fn test_parse_bindings_filters_other_games() {
        let payload = json!({
            "code": 0,
            "data": {"list": [
                {"appCode": "arknights", "bindingList": [
                    {"uid": "111", "nickName": "Doctor", "channelMasterId": "1", "channelName": "官服", "isOfficial": true, "isDefault": true},
                    {"uid": "222", "nickName": "Alt"}
                ]},
                {"appCode": "endfield", "bindingList": [{"uid": "333"}]}
            ]}
        });
        let chars = parse_bindings(&payload).unwrap();
        assert_eq!(chars.len(), 2);
        assert_eq!(chars[0].uid, "111");
        assert!(chars[0].is_default);
        assert_eq!(chars[1].channel_master_id, "1");
        assert_eq!(chars[1].channel_name, "官服");
        assert!(chars[1].is_official);
    }

    #[test]
    fn test_parse_awards() {
        let payload = json!({
            "code": 0,
            "data": {"awards": [
                {"resource": {"name": "龙门币"}, "count": 3000},
                {"count": 1}
            ]}
        });
        let awards = parse_awards(&payload).unwrap();
        assert_eq!(awards[0].name, "龙门币");
        assert_eq!(awards[1].name, "未知");
        assert_eq!(awards[1].count, 1);
    }
}
