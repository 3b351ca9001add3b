use {
    chrono::NaiveDateTime,
    serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DrinkEvent {
    /// Wall-clock time the drink was logged, e.g. `14:05`
    pub time: String,

    /// Amount of water drank in milliliters
    #[serde(alias = "amount")]
    pub amount_ml: u32,

    /// Intake for the day right after this drink
    #[serde(alias = "total")]
    pub total_after_ml: u32,
}

impl DrinkEvent {
    pub fn new(at: NaiveDateTime, amount_ml: u32, total_after_ml: u32) -> Self {
        Self {
            time: at.format("%H:%M").to_string(),
            amount_ml,
            total_after_ml,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn formats_time_as_hours_and_minutes() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 7, 42)
            .unwrap();
        let event = DrinkEvent::new(at, 350, 700);

        assert_eq!(event.time, "09:07");
        assert_eq!(event.amount_ml, 350);
        assert_eq!(event.total_after_ml, 700);
    }

    #[test]
    fn reads_older_entry_shape() {
        // Entries written before amounts were suffixed, some without a running total
        let event: DrinkEvent = serde_json::from_str(r#"{"time":"08:30","amount":250}"#).unwrap();

        assert_eq!(event.amount_ml, 250);
        assert_eq!(event.total_after_ml, 0);
    }

    #[test]
    fn writes_camel_case_fields() {
        let json = serde_json::to_value(DrinkEvent {
            time: "10:00".into(),
            amount_ml: 500,
            total_after_ml: 1500,
        })
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "time": "10:00", "amountMl": 500, "totalAfterMl": 1500 })
        );
    }
}
