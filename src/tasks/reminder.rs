use std::time::Duration;

use tokio::{
    select,
    sync::{mpsc, watch},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, instrument, trace};

use crate::store::SharedStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub intake_ml: u32,
    pub goal_ml: u32,
}

impl Reminder {
    pub fn message(&self) -> String {
        if self.goal_ml > 0 {
            format!(
                "Time to drink water! You've had {}ml today. Goal: {}ml",
                self.intake_ml, self.goal_ml
            )
        } else {
            format!("Stay hydrated! You've had {}ml today.", self.intake_ml)
        }
    }
}

/// Sends a [`Reminder`] every `period` until `shutdown` changes or the
/// receiving side goes away. Showing it is up to the receiver.
#[instrument(skip_all, fields(period_secs = period.as_secs()))]
pub async fn reminder_task(
    store: SharedStore,
    period: Duration,
    reminders: mpsc::Sender<Reminder>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            _ = ticker.tick() => {
                let reminder = {
                    let store = store.lock().await;
                    Reminder {
                        intake_ml: store.intake_today_ml(),
                        goal_ml: store.state().daily_goal_ml,
                    }
                };

                trace!(?reminder, "Sending reminder");
                if reminders.send(reminder).await.is_err() {
                    debug!("Reminder receiver dropped, stopping");
                    break;
                }
            },
            _ = shutdown.changed() => {
                debug!("Reminder task stopping");
                break;
            },
        };
    }
}
