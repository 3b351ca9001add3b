use {
    chrono::NaiveDate,
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{
    goal::{daily_goal_ml, DEFAULT_CUP_SIZE_ML},
    structs::drink_event::DrinkEvent,
};

/// Everything that is persisted between sessions.
///
/// Unknown fields are ignored and missing fields fall back to [`Default`], so
/// records written by older versions load over the current defaults instead of
/// being rejected. The aliases accept the field names those versions used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HydrationState {
    /// Body weight in kilograms; `0` means no goal has been set yet
    #[serde(alias = "weight")]
    pub weight_kg: f64,

    /// Always `round(weight_kg * 33)`
    #[serde(alias = "dailyGoal")]
    pub daily_goal_ml: u32,

    #[serde(alias = "currentIntake")]
    pub current_intake_ml: u32,

    #[serde(alias = "selectedCupSize")]
    pub cup_size_ml: u32,

    /// Today's drinks, oldest first
    pub history: Vec<DrinkEvent>,

    /// Day that `current_intake_ml` and `history` belong to
    #[serde(with = "day_token")]
    pub last_date: Option<NaiveDate>,

    pub goal_reached_today: bool,

    /// Sum of every drink ever logged. Only grows.
    pub lifetime_total_ml: u64,
}

impl Default for HydrationState {
    fn default() -> Self {
        Self {
            weight_kg: 0.0,
            daily_goal_ml: 0,
            current_intake_ml: 0,
            cup_size_ml: DEFAULT_CUP_SIZE_ML,
            history: vec![],
            last_date: None,
            goal_reached_today: false,
            lifetime_total_ml: 0,
        }
    }
}

impl HydrationState {
    pub fn has_goal(&self) -> bool {
        self.daily_goal_ml > 0
    }

    /// Progress towards the goal, clamped to `0..=100`.
    pub fn percentage(&self) -> f64 {
        self.percent_of_goal(self.current_intake_ml)
    }

    pub fn percent_of_goal(&self, amount_ml: u32) -> f64 {
        if !self.has_goal() {
            return 0.0;
        }

        (f64::from(amount_ml) / f64::from(self.daily_goal_ml) * 100.0).min(100.0)
    }

    pub fn remaining_ml(&self) -> u32 {
        self.daily_goal_ml.saturating_sub(self.current_intake_ml)
    }

    /// Drops today's progress. Weight, goal, cup size and the lifetime total stay.
    pub fn clear_day(&mut self) {
        self.current_intake_ml = 0;
        self.history.clear();
        self.goal_reached_today = false;
    }

    /// Appends a drink, dropping the oldest entries past `cap`. Returns the
    /// newest of the dropped entries.
    pub fn push_history(&mut self, event: DrinkEvent, cap: usize) -> Option<DrinkEvent> {
        self.history.push(event);

        let cap = cap.max(1);
        if self.history.len() <= cap {
            return None;
        }

        let overflow = self.history.len() - cap;
        self.history.drain(..overflow).last()
    }

    /// Repairs a freshly loaded record so it holds the usual invariants.
    ///
    /// A valid record comes out unchanged.
    pub fn normalized(mut self, history_cap: usize) -> Self {
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            self.weight_kg = 0.0;
        }

        let expected_goal = daily_goal_ml(self.weight_kg);
        if self.daily_goal_ml != expected_goal {
            debug!(
                stored = self.daily_goal_ml,
                expected = expected_goal,
                "Recomputing stale daily goal"
            );
            self.daily_goal_ml = expected_goal;
        }

        if self.cup_size_ml == 0 {
            self.cup_size_ml = DEFAULT_CUP_SIZE_ML;
        }

        let recorded = self.history.len();
        self.history.retain(|event| event.amount_ml > 0);
        if self.history.len() != recorded {
            debug!(
                dropped = recorded - self.history.len(),
                "Dropping history entries without an amount"
            );
        }

        let cap = history_cap.max(1);
        if self.history.len() > cap {
            let overflow = self.history.len() - cap;
            self.history.drain(..overflow);
        }

        self
    }
}

/// `lastDate` is written as an ISO date. Records from older versions used the
/// `Mon Jan 01 2024` form, which is still read.
mod day_token {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const ISO: &str = "%Y-%m-%d";
    const LEGACY: &str = "%a %b %d %Y";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.serialize_str(&date.format(ISO).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;

        raw.filter(|s| !s.trim().is_empty())
            .map(|s| parse(&s).ok_or_else(|| D::Error::custom(format!("unrecognised date `{s}`"))))
            .transpose()
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, ISO)
            .or_else(|_| NaiveDate::parse_from_str(raw, LEGACY))
            .ok()
    }
}
