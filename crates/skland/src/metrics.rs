//! Time-derived metrics.
//!
//! Upstream snapshots carry a baseline and a timestamp instead of live
//! values. Everything here projects a baseline to an explicit `now` (unix
//! seconds) and never mutates the snapshot, so repeated reads at the same
//! instant agree and later reads never go backwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    BuildingSnapshot, Dormitory, EnergySnapshot, HireSnapshot, LaborSnapshot, ManufactureStation,
    TradingStation, TrainingSnapshot,
};

/// Seconds per regenerated sanity point.
pub const SANITY_REGEN_SECS: i64 = 360;

/// Dorm ap at which a character is fully rested.
pub const DORM_FULL_AP: f64 = 8_640_000.0;

/// Hire refreshes available per day.
pub const HIRE_REFRESH_CAP: i64 = 3;

/// Clue names in board slot order (slot 1..=7).
pub const CLUE_SLOTS: [&str; 7] = [
    "RHINE",
    "PENGUIN",
    "BLACKSTEEL",
    "URSUS",
    "GLASGOW",
    "KJERAG",
    "RHODES",
];

/// Unix seconds for `now`.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

impl EnergySnapshot {
    fn regenerating(&self) -> bool {
        self.complete_recovery_time > 0
    }

    /// Sanity at `now`.
    pub fn current_at(&self, now: i64) -> i64 {
        if !self.regenerating() {
            return self.current;
        }
        if now >= self.complete_recovery_time {
            return self.max;
        }
        let remaining = self.complete_recovery_time - now;
        let missing = (remaining + SANITY_REGEN_SECS - 1) / SANITY_REGEN_SECS;
        (self.max - missing).clamp(0, self.max.max(0))
    }

    pub fn minutes_to_full(&self, now: i64) -> i64 {
        if !self.regenerating() {
            return 0;
        }
        ((self.complete_recovery_time - now) / 60).max(0)
    }

    /// Completion instant, `None` when nothing is regenerating.
    pub fn recovery_time(&self) -> Option<DateTime<Utc>> {
        if !self.regenerating() {
            return None;
        }
        DateTime::from_timestamp(self.complete_recovery_time, 0)
    }

    pub fn is_full(&self, now: i64) -> bool {
        self.current_at(now) >= self.max
    }
}

impl LaborSnapshot {
    /// Drones available at `now`.
    ///
    /// The pool fills linearly: `remain_secs` covers the `max - current`
    /// missing drones as of `last_update_time`.
    pub fn current_at(&self, now: i64) -> i64 {
        if self.current >= self.max || self.last_update_time <= 0 || self.remain_secs <= 0 {
            return self.current;
        }
        let missing = self.max - self.current;
        let elapsed = (now - self.last_update_time).max(0);
        let gained = elapsed.saturating_mul(missing) / self.remain_secs;
        (self.current + gained).min(self.max)
    }
}

impl TradingStation {
    /// Stock including an order that finished but was not collected yet.
    pub fn stock_at(&self, now: i64) -> i64 {
        if self.complete_work_time > 0 && now >= self.complete_work_time {
            self.stock + 1
        } else {
            self.stock
        }
    }
}

impl ManufactureStation {
    /// Products the output slot holds.
    pub fn product_capacity(&self) -> i64 {
        self.capacity / self.weight.max(1)
    }
}

impl HireSnapshot {
    /// Minutes until the next free refresh, 0 once the daily cap is reached.
    pub fn refresh_cooldown_minutes(&self, now: i64) -> i64 {
        if self.refresh_count >= HIRE_REFRESH_CAP || self.complete_work_time <= 0 {
            return 0;
        }
        ((self.complete_work_time - now) / 60).max(0)
    }
}

/// Dorm occupancy at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DormRest {
    pub resting: i64,
    pub rested: i64,
}

impl Dormitory {
    /// Per-second ap gain for characters in this room.
    pub fn ap_rate(&self) -> f64 {
        1.5 + 0.1 * self.level as f64 + 0.0004 * self.comfort as f64
    }

    pub fn rest_at(&self, now: i64) -> DormRest {
        let rate = self.ap_rate();
        let rested = self
            .chars
            .iter()
            .filter(|c| {
                let ap = if c.last_ap_add_time > 0 {
                    let elapsed = (now - c.last_ap_add_time).max(0) as f64;
                    (c.ap as f64 + elapsed * rate).min(DORM_FULL_AP)
                } else {
                    c.ap as f64
                };
                ap >= DORM_FULL_AP
            })
            .count() as i64;
        DormRest {
            resting: self.chars.len() as i64,
            rested,
        }
    }
}

/// What the training room is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrainingState {
    Idle,
    /// 0-based skill index.
    Training { skill: i64 },
}

impl fmt::Display for TrainingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("空闲"),
            Self::Training { skill } => write!(f, "训练中 ({}技能)", skill + 1),
        }
    }
}

impl TrainingSnapshot {
    pub fn state(&self) -> TrainingState {
        if self.target_skill >= 0 {
            TrainingState::Training {
                skill: self.target_skill,
            }
        } else {
            TrainingState::Idle
        }
    }

    pub fn remaining_secs_at(&self, now: i64) -> i64 {
        if self.target_skill < 0 {
            return 0;
        }
        if self.last_update_time <= 0 {
            return self.remain_secs.max(0);
        }
        let elapsed = (now - self.last_update_time).max(0);
        (self.remain_secs - elapsed).max(0)
    }
}

/// Projected building metrics at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingView {
    pub trading_stock: i64,
    pub trading_stock_limit: i64,
    pub manufacture_complete: i64,
    pub manufacture_capacity: i64,
    pub drone_current: i64,
    pub drone_max: i64,
    pub training_state: TrainingState,
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
    /// Slot number (1..=7) to whether the slot holds a clue.
    pub clue_board: Vec<(u8, bool)>,
    pub tired_count: i64,
}

impl BuildingView {
    pub fn training_remaining_minutes(&self) -> i64 {
        self.training_remaining_secs / 60
    }
}

impl BuildingSnapshot {
    pub fn trading_stock_at(&self, now: i64) -> i64 {
        self.tradings.iter().map(|t| t.stock_at(now)).sum()
    }

    pub fn manufacture_capacity(&self) -> i64 {
        self.manufactures
            .iter()
            .map(ManufactureStation::product_capacity)
            .sum()
    }

    pub fn dorm_rest_at(&self, now: i64) -> DormRest {
        self.dormitories
            .iter()
            .map(|d| d.rest_at(now))
            .fold(DormRest::default(), |acc, r| DormRest {
                resting: acc.resting + r.resting,
                rested: acc.rested + r.rested,
            })
    }

    /// Occupancy of each board slot, in slot order.
    pub fn clue_slots(&self) -> Vec<(u8, bool)> {
        CLUE_SLOTS
            .iter()
            .zip(1u8..)
            .map(|(name, slot)| (slot, self.clue.board.iter().any(|c| c == name)))
            .collect()
    }

    /// Project every building metric to `now`.
    pub fn view(&self, now: i64) -> BuildingView {
        let rest = self.dorm_rest_at(now);
        let (training_state, training_remaining_secs, trainee_char_id) = match &self.training {
            Some(t) => (t.state(), t.remaining_secs_at(now), t.trainee_char_id.clone()),
            None => (TrainingState::Idle, 0, String::new()),
        };

        BuildingView {
            trading_stock: self.trading_stock_at(now),
            trading_stock_limit: self.trading_stock_limit(),
            manufacture_complete: self.manufacture_complete(),
            manufacture_capacity: self.manufacture_capacity(),
            drone_current: self.labor.current_at(now),
            drone_max: self.labor.max,
            training_state,
            training_remaining_secs,
            trainee_char_id,
            hire_refresh_count: self.hire.refresh_count,
            hire_refresh_cooldown_minutes: self.hire.refresh_cooldown_minutes(now),
            recruit_finished: self.recruit_finished(),
            recruit_total: self.recruit_total(),
            resting_count: rest.resting,
            rested_count: rest.rested,
            clue_own: self.clue.own,
            clue_received: self.clue.received,
            clue_collected: self.clue_collected(),
            clue_board: self.clue_slots(),
            tired_count: self.tired_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClueBoard, DormCharacter, RecruitSlot};

    const NOW: i64 = 1_700_000_000;

    fn energy(current: i64, max: i64, complete_recovery_time: i64) -> EnergySnapshot {
        EnergySnapshot {
            current,
            max,
            last_add_time: NOW - 100,
            complete_recovery_time,
        }
    }

    #[test]
    fn test_energy_two_points_short() {
        let snapshot = energy(50, 135, NOW + 720);
        assert_eq!(snapshot.current_at(NOW), 133);
        assert_eq!(snapshot.minutes_to_full(NOW), 12);
        assert!(!snapshot.is_full(NOW));
    }

    #[test]
    fn test_energy_full_after_recovery() {
        let snapshot = energy(50, 135, NOW - 1);
        assert_eq!(snapshot.current_at(NOW), 135);
        assert_eq!(snapshot.minutes_to_full(NOW), 0);
        assert!(snapshot.is_full(NOW));

        let exact = energy(50, 135, NOW);
        assert_eq!(exact.current_at(NOW), 135);
    }

    #[test]
    fn test_energy_static_without_recovery() {
        let snapshot = energy(77, 135, 0);
        assert_eq!(snapshot.current_at(NOW), 77);
        assert_eq!(snapshot.current_at(NOW + 1_000_000), 77);
        assert_eq!(snapshot.minutes_to_full(NOW), 0);
        assert!(snapshot.recovery_time().is_none());
    }

    #[test]
    fn test_energy_clamped_to_zero() {
        let snapshot = energy(0, 135, NOW + 360 * 500);
        assert_eq!(snapshot.current_at(NOW), 0);
    }

    #[test]
    fn test_energy_monotonic() {
        let snapshot = energy(10, 135, NOW + 36_000);
        let mut last_value = i64::MIN;
        let mut last_minutes = i64::MAX;
        for t in (NOW..=NOW + 36_100).step_by(37) {
            let value = snapshot.current_at(t);
            let minutes = snapshot.minutes_to_full(t);
            assert!(value >= last_value, "value went backwards at {t}");
            assert!(minutes <= last_minutes, "minutes went up at {t}");
            assert!((0..=135).contains(&value));
            last_value = value;
            last_minutes = minutes;
        }
        assert_eq!(last_value, 135);
        assert_eq!(last_minutes, 0);
    }

    #[test]
    fn test_energy_recovery_time() {
        let snapshot = energy(50, 135, NOW + 720);
        assert_eq!(
            snapshot.recovery_time().map(|t| t.timestamp()),
            Some(NOW + 720)
        );
    }

    #[test]
    fn test_drone_projection() {
        let labor = LaborSnapshot {
            current: 100,
            max: 200,
            last_update_time: NOW - 3600,
            remain_secs: 36_000,
        };
        // 100 drones over 10h => 10 per hour
        assert_eq!(labor.current_at(NOW), 110);
        assert_eq!(labor.current_at(NOW + 100_000), 200);
        assert_eq!(labor.current_at(NOW - 7200), 100);
    }

    #[test]
    fn test_drone_static_cases() {
        let full = LaborSnapshot {
            current: 200,
            max: 200,
            last_update_time: NOW - 3600,
            remain_secs: 0,
        };
        assert_eq!(full.current_at(NOW), 200);

        let unknown_rate = LaborSnapshot {
            current: 50,
            max: 200,
            last_update_time: 0,
            remain_secs: 1000,
        };
        assert_eq!(unknown_rate.current_at(NOW), 50);
    }

    #[test]
    fn test_trading_stock_counts_ready_order() {
        let done = TradingStation {
            stock: 2,
            stock_limit: 10,
            complete_work_time: NOW - 1,
        };
        let pending = TradingStation {
            stock: 3,
            stock_limit: 10,
            complete_work_time: NOW + 60,
        };
        let idle = TradingStation {
            stock: 1,
            stock_limit: 10,
            complete_work_time: 0,
        };
        assert_eq!(done.stock_at(NOW), 3);
        assert_eq!(pending.stock_at(NOW), 3);
        assert_eq!(pending.stock_at(NOW + 60), 4);
        assert_eq!(idle.stock_at(NOW), 1);
    }

    #[test]
    fn test_manufacture_capacity_guards_zero_weight() {
        let building = BuildingSnapshot {
            manufactures: vec![
                ManufactureStation {
                    complete: 10,
                    capacity: 54,
                    weight: 2,
                },
                ManufactureStation {
                    complete: 5,
                    capacity: 10,
                    weight: 0,
                },
                ManufactureStation {
                    complete: 0,
                    capacity: 7,
                    weight: 3,
                },
            ],
            ..Default::default()
        };
        assert_eq!(building.manufacture_capacity(), 27 + 10 + 2);
    }

    #[test]
    fn test_hire_cooldown() {
        let hire = HireSnapshot {
            refresh_count: 1,
            complete_work_time: NOW + 3600,
        };
        assert_eq!(hire.refresh_cooldown_minutes(NOW), 60);
        assert_eq!(hire.refresh_cooldown_minutes(NOW + 7200), 0);

        let capped = HireSnapshot {
            refresh_count: 3,
            complete_work_time: NOW + 3600,
        };
        assert_eq!(capped.refresh_cooldown_minutes(NOW), 0);
    }

    #[test]
    fn test_dorm_rest() {
        let dorm = Dormitory {
            level: 5,
            comfort: 5000,
            chars: vec![
                // rate = 1.5 + 0.5 + 2.0 = 4.0 ap/s
                DormCharacter {
                    ap: 8_640_000 - 3000,
                    last_ap_add_time: NOW - 1000,
                },
                DormCharacter {
                    ap: 0,
                    last_ap_add_time: NOW - 1000,
                },
                DormCharacter {
                    ap: 8_640_000,
                    last_ap_add_time: 0,
                },
                DormCharacter {
                    ap: 100,
                    last_ap_add_time: 0,
                },
            ],
        };
        assert!((dorm.ap_rate() - 4.0).abs() < 1e-9);
        assert_eq!(
            dorm.rest_at(NOW),
            DormRest {
                resting: 4,
                rested: 2
            }
        );
        assert_eq!(dorm.rest_at(NOW - 500).rested, 1);
    }

    #[test]
    fn test_dorm_rest_without_baseline_uses_stored_ap() {
        let dorm = Dormitory {
            level: 5,
            comfort: 5000,
            chars: vec![
                DormCharacter {
                    ap: 8_640_000,
                    last_ap_add_time: 0,
                },
                DormCharacter {
                    ap: 8_640_000,
                    last_ap_add_time: -1,
                },
                DormCharacter {
                    ap: 8_640_000 - 1,
                    last_ap_add_time: 0,
                },
            ],
        };
        for now in [0, NOW, NOW + 86_400] {
            assert_eq!(
                dorm.rest_at(now),
                DormRest {
                    resting: 3,
                    rested: 2
                }
            );
        }
    }

    #[test]
    fn test_training_state_and_remaining() {
        let training = TrainingSnapshot {
            trainee_char_id: "char_103_angel".into(),
            target_skill: 2,
            remain_secs: 7200,
            last_update_time: NOW - 600,
        };
        assert_eq!(training.state(), TrainingState::Training { skill: 2 });
        assert_eq!(training.state().to_string(), "训练中 (3技能)");
        assert_eq!(training.remaining_secs_at(NOW), 6600);
        assert_eq!(training.remaining_secs_at(NOW + 100_000), 0);

        let idle = TrainingSnapshot {
            target_skill: -1,
            ..training
        };
        assert_eq!(idle.state(), TrainingState::Idle);
        assert_eq!(idle.state().to_string(), "空闲");
        assert_eq!(idle.remaining_secs_at(NOW), 0);
    }

    #[test]
    fn test_clue_slots() {
        let building = BuildingSnapshot {
            clue: ClueBoard {
                own: 4,
                received: 1,
                board: vec!["RHINE".into(), "URSUS".into(), "RHODES".into()],
            },
            ..Default::default()
        };
        let slots = building.clue_slots();
        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0], (1, true));
        assert_eq!(slots[1], (2, false));
        assert_eq!(slots[3], (4, true));
        assert_eq!(slots[6], (7, true));
        assert_eq!(building.clue_collected(), 3);
    }

    #[test]
    fn test_building_view() {
        let building = BuildingSnapshot {
            tradings: vec![TradingStation {
                stock: 2,
                stock_limit: 10,
                complete_work_time: NOW - 5,
            }],
            manufactures: vec![ManufactureStation {
                complete: 30,
                capacity: 54,
                weight: 2,
            }],
            labor: LaborSnapshot {
                current: 100,
                max: 200,
                last_update_time: NOW - 3600,
                remain_secs: 36_000,
            },
            training: None,
            hire: HireSnapshot {
                refresh_count: 3,
                complete_work_time: NOW + 60,
            },
            recruit: vec![RecruitSlot { finished: true }, RecruitSlot { finished: false }],
            dormitories: vec![],
            clue: ClueBoard::default(),
            tired_count: 4,
        };
        let view = building.view(NOW);
        assert_eq!(view.trading_stock, 3);
        assert_eq!(view.trading_stock_limit, 10);
        assert_eq!(view.manufacture_capacity, 27);
        assert_eq!(view.drone_current, 110);
        assert_eq!(view.training_state, TrainingState::Idle);
        assert_eq!(view.training_remaining_minutes(), 0);
        assert_eq!(view.hire_refresh_cooldown_minutes, 0);
        assert_eq!(view.recruit_finished, 1);
        assert_eq!(view.recruit_total, 2);
        assert!(view.clue_board.iter().all(|(_, placed)| !placed));
        assert_eq!(view.tired_count, 4);

        assert_eq!(building.view(NOW), view);
    }
}
