//! Metric key to accessor table.
//!
//! Each [`SensorDescription`] names one metric and knows how to read it
//! (and optional detail attributes) from a snapshot at a given instant.

use serde::Serialize;
use serde_json::{Map, Value, json};
use skland_api::PlayerStatus;
use skland_api::metrics::{BuildingView, CLUE_SLOTS, TrainingState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Sensor,
    Binary,
}

/// A sensor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Int(i64),
    Text(String),
    Bool(bool),
    /// Unix timestamp rendered as RFC 3339.
    Timestamp(String),
    Unknown,
}

type ValueFn = fn(&PlayerStatus, i64) -> SensorValue;
type AttributesFn = fn(&PlayerStatus, i64) -> Option<Map<String, Value>>;

pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub icon: &'static str,
    pub kind: SensorKind,
    pub value: ValueFn,
    pub attributes: AttributesFn,
}

/// One evaluated sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub icon: &'static str,
    pub kind: SensorKind,
    pub value: SensorValue,
    pub attributes: Option<Map<String, Value>>,
}

impl SensorDescription {
    pub fn evaluate(&self, status: &PlayerStatus, now: i64) -> SensorReading {
        SensorReading {
            key: self.key,
            name: self.name,
            unit: self.unit,
            icon: self.icon,
            kind: self.kind,
            value: (self.value)(status, now),
            attributes: (self.attributes)(status, now),
        }
    }
}

/// Evaluate every sensor.
pub fn evaluate_all(status: &PlayerStatus, now: i64) -> Vec<SensorReading> {
    SENSORS.iter().map(|s| s.evaluate(status, now)).collect()
}

pub fn find(key: &str) -> Option<&'static SensorDescription> {
    SENSORS.iter().find(|s| s.key == key)
}

fn percentage(current: i64, total: i64) -> f64 {
    (current as f64 / total.max(1) as f64 * 1000.0).round() / 10.0
}

fn to_map(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn no_attributes(_: &PlayerStatus, _: i64) -> Option<Map<String, Value>> {
    None
}

fn building_int(status: &PlayerStatus, now: i64, f: fn(&BuildingView) -> i64) -> SensorValue {
    SensorValue::Int(status.building.as_ref().map_or(0, |b| f(&b.view(now))))
}

pub static SENSORS: &[SensorDescription] = &[
    SensorDescription {
        key: "sanity",
        name: "理智",
        unit: Some("点"),
        icon: "mdi:brain",
        kind: SensorKind::Sensor,
        value: |s, now| SensorValue::Int(s.sanity.current_at(now)),
        attributes: |s, now| {
            let current = s.sanity.current_at(now);
            to_map(json!({
                "current": current,
                "max": s.sanity.max,
                "percentage": percentage(current, s.sanity.max),
                "recovery_time": s.sanity.recovery_time().map(|t| t.to_rfc3339()),
                "minutes_to_full": s.sanity.minutes_to_full(now),
            }))
        },
    },
    SensorDescription {
        key: "sanity_max",
        name: "最大理智",
        unit: Some("点"),
        icon: "mdi:brain",
        kind: SensorKind::Sensor,
        value: |s, _| SensorValue::Int(s.sanity.max),
        attributes: no_attributes,
    },
    SensorDescription {
        key: "sanity_recovery_time",
        name: "理智恢复时间",
        unit: None,
        icon: "mdi:clock-outline",
        kind: SensorKind::Sensor,
        value: |s, now| match s.sanity.recovery_time() {
            Some(t) if !s.sanity.is_full(now) => SensorValue::Timestamp(t.to_rfc3339()),
            _ => SensorValue::Unknown,
        },
        attributes: no_attributes,
    },
    SensorDescription {
        key: "sanity_minutes_to_full",
        name: "理智恢复剩余",
        unit: Some("分钟"),
        icon: "mdi:timer-sand",
        kind: SensorKind::Sensor,
        value: |s, now| {
            if s.sanity.is_full(now) {
                SensorValue::Int(0)
            } else {
                SensorValue::Int(s.sanity.minutes_to_full(now))
            }
        },
        attributes: no_attributes,
    },
    SensorDescription {
        key: "level",
        name: "等级",
        unit: Some("级"),
        icon: "mdi:account-star",
        kind: SensorKind::Sensor,
        value: |s, _| SensorValue::Int(s.level),
        attributes: |s, _| {
            to_map(json!({
                "name": s.name,
                "uid": s.uid,
                "register_date": s.register_date(),
                "main_stage_progress": s.main_stage_progress,
                "resume": s.resume,
            }))
        },
    },
    SensorDescription {
        key: "char_count",
        name: "干员数量",
        unit: Some("人"),
        icon: "mdi:account-group",
        kind: SensorKind::Sensor,
        value: |s, _| SensorValue::Int(s.char_count),
        attributes: no_attributes,
    },
    SensorDescription {
        key: "sanity_status",
        name: "理智状态",
        unit: None,
        icon: "mdi:alert-circle",
        kind: SensorKind::Sensor,
        value: |s, now| {
            let state = if s.sanity.is_full(now) { "full" } else { "not_full" };
            SensorValue::Text(state.to_string())
        },
        attributes: |s, now| {
            to_map(json!({
                "sanity": s.sanity.current_at(now),
                "max_sanity": s.sanity.max,
            }))
        },
    },
    SensorDescription {
        key: "trading_stock",
        name: "贸易站库存",
        unit: Some("单"),
        icon: "mdi:package-variant",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.trading_stock),
        attributes: |s, now| {
            let v = s.building.as_ref()?.view(now);
            to_map(json!({
                "current": v.trading_stock,
                "limit": v.trading_stock_limit,
                "percentage": percentage(v.trading_stock, v.trading_stock_limit),
            }))
        },
    },
    SensorDescription {
        key: "manufacture_complete",
        name: "制造站产出",
        unit: Some("个"),
        icon: "mdi:factory",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.manufacture_complete),
        attributes: |s, now| {
            let v = s.building.as_ref()?.view(now);
            to_map(json!({
                "current": v.manufacture_complete,
                "capacity": v.manufacture_capacity,
                "percentage": percentage(v.manufacture_complete, v.manufacture_capacity),
            }))
        },
    },
    SensorDescription {
        key: "drone",
        name: "无人机",
        unit: Some("架"),
        icon: "mdi:quadcopter",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.drone_current),
        attributes: |s, now| {
            let v = s.building.as_ref()?.view(now);
            to_map(json!({
                "current": v.drone_current,
                "max": v.drone_max,
                "percentage": percentage(v.drone_current, v.drone_max),
            }))
        },
    },
    SensorDescription {
        key: "training_state",
        name: "训练室状态",
        unit: None,
        icon: "mdi:arm-flex",
        kind: SensorKind::Sensor,
        value: |s, now| {
            let state = s
                .building
                .as_ref()
                .map_or(TrainingState::Idle, |b| b.view(now).training_state);
            SensorValue::Text(state.to_string())
        },
        attributes: |s, now| {
            let v = s.building.as_ref()?.view(now);
            to_map(json!({
                "remaining_minutes": v.training_remaining_minutes(),
                "trainee_char_id": v.trainee_char_id,
            }))
        },
    },
    SensorDescription {
        key: "training_remaining",
        name: "训练剩余时间",
        unit: Some("分钟"),
        icon: "mdi:timer",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.training_remaining_minutes()),
        attributes: no_attributes,
    },
    SensorDescription {
        key: "hire_refresh_count",
        name: "公招刷新次数",
        unit: Some("次"),
        icon: "mdi:refresh",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.hire_refresh_count),
        attributes: no_attributes,
    },
    SensorDescription {
        key: "hire_refresh_cooldown",
        name: "公招刷新冷却",
        unit: Some("分钟"),
        icon: "mdi:timer-refresh",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.hire_refresh_cooldown_minutes),
        attributes: no_attributes,
    },
    SensorDescription {
        key: "recruit_finished",
        name: "公招完成数",
        unit: Some("个"),
        icon: "mdi:account-check",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.recruit_finished),
        attributes: |s, now| {
            let v = s.building.as_ref()?.view(now);
            to_map(json!({
                "finished": v.recruit_finished,
                "total": v.recruit_total,
            }))
        },
    },
    SensorDescription {
        key: "clue_collected",
        name: "线索收集",
        unit: Some("个"),
        icon: "mdi:puzzle",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.clue_collected),
        attributes: |s, now| {
            let v = s.building.as_ref()?.view(now);
            let board: Vec<bool> = v.clue_board.iter().map(|(_, occupied)| *occupied).collect();
            to_map(json!({
                "own": v.clue_own,
                "received": v.clue_received,
                "total": CLUE_SLOTS.len(),
                "board": board,
            }))
        },
    },
    SensorDescription {
        key: "dormitory_rested",
        name: "宿舍休息完成",
        unit: Some("人"),
        icon: "mdi:bed",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.rested_count),
        attributes: |s, now| {
            let v = s.building.as_ref()?.view(now);
            to_map(json!({
                "rested": v.rested_count,
                "resting": v.resting_count,
            }))
        },
    },
    SensorDescription {
        key: "tired_char_count",
        name: "疲劳干员",
        unit: Some("人"),
        icon: "mdi:sleep-off",
        kind: SensorKind::Sensor,
        value: |s, now| building_int(s, now, |v| v.tired_count),
        attributes: no_attributes,
    },
    SensorDescription {
        key: "campaign_reward",
        name: "剿灭进度",
        unit: Some("合成玉"),
        icon: "mdi:skull-crossbones",
        kind: SensorKind::Sensor,
        value: |s, _| SensorValue::Int(s.campaign.map_or(0, |c| c.current)),
        attributes: |s, _| {
            let c = s.campaign?;
            to_map(json!({
                "current": c.current,
                "total": c.total,
                "missing": c.total - c.current,
            }))
        },
    },
    SensorDescription {
        key: "daily_task",
        name: "日常任务",
        unit: None,
        icon: "mdi:calendar-check",
        kind: SensorKind::Sensor,
        value: |s, _| {
            let (current, total) = s
                .routine
                .map_or((0, 0), |r| (r.daily_current, r.daily_total));
            SensorValue::Text(format!("{current}/{total}"))
        },
        attributes: |s, _| {
            let r = s.routine?;
            to_map(json!({
                "current": r.daily_current,
                "total": r.daily_total,
                "percentage": percentage(r.daily_current, r.daily_total),
            }))
        },
    },
    SensorDescription {
        key: "weekly_task",
        name: "周常任务",
        unit: None,
        icon: "mdi:calendar-week",
        kind: SensorKind::Sensor,
        value: |s, _| {
            let (current, total) = s
                .routine
                .map_or((0, 0), |r| (r.weekly_current, r.weekly_total));
            SensorValue::Text(format!("{current}/{total}"))
        },
        attributes: |s, _| {
            let r = s.routine?;
            to_map(json!({
                "current": r.weekly_current,
                "total": r.weekly_total,
                "percentage": percentage(r.weekly_current, r.weekly_total),
            }))
        },
    },
    SensorDescription {
        key: "sanity_full",
        name: "理智已满",
        unit: None,
        icon: "mdi:brain",
        kind: SensorKind::Binary,
        value: |s, now| SensorValue::Bool(s.sanity.is_full(now)),
        attributes: |s, now| {
            to_map(json!({
                "sanity": s.sanity.current_at(now),
                "max_sanity": s.sanity.max,
            }))
        },
    },
];
