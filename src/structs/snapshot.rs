use {
    chrono::{NaiveDate, NaiveDateTime},
    serde::Serialize,
};

use crate::structs::{drink_event::DrinkEvent, hydration_state::HydrationState};

/// What the front-end redraws from after every change.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub weight_kg: f64,
    pub daily_goal_ml: u32,
    pub current_intake_ml: u32,
    pub remaining_ml: u32,
    pub percentage: f64,
    pub cup_size_ml: u32,
    pub history: Vec<DrinkEvent>,
    pub goal_reached_today: bool,
    pub lifetime_total_ml: u64,
    pub last_date: Option<NaiveDate>,
    pub last_saved: Option<NaiveDateTime>,
}

impl Snapshot {
    pub fn new(state: &HydrationState, last_saved: Option<NaiveDateTime>) -> Self {
        Self {
            weight_kg: state.weight_kg,
            daily_goal_ml: state.daily_goal_ml,
            current_intake_ml: state.current_intake_ml,
            remaining_ml: state.remaining_ml(),
            percentage: state.percentage(),
            cup_size_ml: state.cup_size_ml,
            history: state.history.clone(),
            goal_reached_today: state.goal_reached_today,
            lifetime_total_ml: state.lifetime_total_ml,
            last_date: state.last_date,
            last_saved,
        }
    }
}

/// One line of the history table, newest first.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub event: DrinkEvent,

    /// Progress towards the goal right after this drink
    pub percent: f64,
}
