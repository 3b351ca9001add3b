//! Day rollover.
//!
//! Intake and history belong to a single calendar day. When the stored day is
//! not today the day's progress is dropped; skipped days are not back-filled.

use chrono::NaiveDate;
use tracing::info;

use crate::structs::hydration_state::HydrationState;

/// Returns `state` unchanged when it already belongs to `today`, otherwise a
/// copy with today's progress cleared and `last_date` moved to `today`.
///
/// Weight, goal, cup size and the lifetime total are carried over. Calling it
/// again on the result is a no-op.
pub fn reconcile(mut state: HydrationState, today: NaiveDate) -> HydrationState {
    if is_current(&state, today) {
        return state;
    }

    info!(
        previous = ?state.last_date,
        %today,
        dropped_ml = state.current_intake_ml,
        "New day detected, resetting progress"
    );

    state.clear_day();
    state.last_date = Some(today);
    state
}

pub fn is_current(state: &HydrationState, today: NaiveDate) -> bool {
    state.last_date == Some(today)
}
