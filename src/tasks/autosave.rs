use std::time::Duration;

use tokio::{
    select,
    sync::watch,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, instrument, trace, warn};

use crate::store::SharedStore;

/// Saves the store every `period`, whether or not anything changed, until
/// `shutdown` changes. Mutations already save on their own; this only covers
/// saves that were missed.
#[instrument(skip_all, fields(period_secs = period.as_secs()))]
pub async fn autosave_task(store: SharedStore, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            _ = ticker.tick() => {
                match store.lock().await.save() {
                    Ok(()) => trace!("Auto-saved"),
                    Err(e) => warn!(error = %e, "Auto-save failed"),
                }
            },
            _ = shutdown.changed() => {
                debug!("Auto-save task stopping");
                break;
            },
        };
    }
}
