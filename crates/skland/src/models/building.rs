//! Base-building snapshot.
//!
//! Only raw baselines are stored here; live values come from
//! [`crate::metrics`] at read time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradingStation {
    /// Orders already in stock.
    pub stock: i64,
    pub stock_limit: i64,
    /// Completion instant of the order in production (`<= 0` when idle).
    pub complete_work_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManufactureStation {
    pub complete: i64,
    pub capacity: i64,
    pub weight: i64,
}

/// Drone pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaborSnapshot {
    pub current: i64,
    pub max: i64,
    pub last_update_time: i64,
    /// Seconds until the pool is full, as of `last_update_time`.
    pub remain_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrainingSnapshot {
    pub trainee_char_id: String,
    /// 0-based skill index, negative when no skill is being trained.
    pub target_skill: i64,
    pub remain_secs: i64,
    pub last_update_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HireSnapshot {
    pub refresh_count: i64,
    pub complete_work_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecruitSlot {
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DormCharacter {
    pub ap: i64,
    pub last_ap_add_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dormitory {
    pub level: i64,
    pub comfort: i64,
    pub chars: Vec<DormCharacter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClueBoard {
    pub own: i64,
    pub received: i64,
    /// Clue names currently placed (e.g. `"RHINE"`).
    pub board: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub tradings: Vec<TradingStation>,
    pub manufactures: Vec<ManufactureStation>,
    pub labor: LaborSnapshot,
    pub training: Option<TrainingSnapshot>,
    pub hire: HireSnapshot,
    pub recruit: Vec<RecruitSlot>,
    pub dormitories: Vec<Dormitory>,
    pub clue: ClueBoard,
    pub tired_count: i64,
}

impl BuildingSnapshot {
    pub fn trading_stock_limit(&self) -> i64 {
        self.tradings.iter().map(|t| t.stock_limit).sum()
    }

    pub fn manufacture_complete(&self) -> i64 {
        self.manufactures.iter().map(|m| m.complete).sum()
    }

    pub fn recruit_finished(&self) -> i64 {
        self.recruit.iter().filter(|s| s.finished).count() as i64
    }

    pub fn recruit_total(&self) -> i64 {
        self.recruit.len() as i64
    }

    pub fn clue_collected(&self) -> i64 {
        self.clue.board.len() as i64
    }
}
