//! The state store.
//!
//! Owns the one in-memory [`HydrationState`] of a session and keeps the durable
//! record in sync with it. Every mutation saves before returning. A failed save
//! never undoes the mutation; it is handed back in [`Applied::save_error`] and
//! announced as [`Notice::SaveFailed`].

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    config::TrackerConfig,
    error::{StoreError, ValidationError},
    goal, rollover,
    storage::Storage,
    structs::{
        drink_event::DrinkEvent,
        hydration_state::HydrationState,
        snapshot::{HistoryRow, Snapshot},
    },
};

pub type SharedStore = Arc<Mutex<StateStore>>;

const NOTICE_CAPACITY: usize = 32;

/// Things the front-end should tell the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Stored progress belonged to another day and was reset
    NewDay { date: NaiveDate },

    /// Saved data from earlier today was picked up
    WelcomeBack,

    /// Fired once per day, on the drink that crosses the goal
    GoalReached { goal_ml: u32, intake_ml: u32 },

    SaveFailed { reason: String },

    /// The saved record could not be read and defaults were used instead
    LoadFailed { reason: String },
}

/// Result of a mutation that has already been applied in memory.
#[derive(Debug)]
#[must_use]
pub struct Applied<T> {
    pub value: T,

    /// Set when the follow-up save failed. The mutation still stands.
    pub save_error: Option<StoreError>,
}

impl<T> Applied<T> {
    pub fn is_persisted(&self) -> bool {
        self.save_error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrinkOutcome {
    pub event: DrinkEvent,
    pub percentage: f64,

    /// True only on the first drink of the day that leaves intake at or above
    /// the goal
    pub goal_just_reached: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightOutcome {
    pub goal_ml: u32,

    /// Set when the new goal is already covered by today's intake
    pub goal_just_reached: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    Undone(DrinkEvent),
    NothingToUndo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    /// Stored state was from today and continues as is
    SameDay,

    /// Stored state was stale (or missing) and today's progress starts from zero
    NewDay,
}

pub struct StateStore {
    state: HydrationState,
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
    key: String,
    history_cap: usize,
    last_saved: Option<NaiveDateTime>,

    /// One entry per drink added this session: the history entry that drink
    /// pushed out, if any. Lets undo put it back.
    undo_trail: Vec<Option<DrinkEvent>>,

    snapshots: watch::Sender<Snapshot>,
    notices: broadcast::Sender<Notice>,
}

impl StateStore {
    /// Creates a store holding defaults. Nothing is read until [`StateStore::restore`].
    pub fn new(
        storage: impl Storage + 'static,
        clock: impl Clock + 'static,
        config: &TrackerConfig,
    ) -> Self {
        let state = HydrationState::default();
        let (snapshots, _) = watch::channel(Snapshot::new(&state, None));
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            state,
            storage: Box::new(storage),
            clock: Box::new(clock),
            key: config.storage_key.clone(),
            history_cap: config.history_cap(),
            last_saved: None,
            undo_trail: vec![],
            snapshots,
            notices,
        }
    }

    /// [`StateStore::new`] followed by [`StateStore::restore`].
    pub fn open(
        storage: impl Storage + 'static,
        clock: impl Clock + 'static,
        config: &TrackerConfig,
    ) -> Self {
        let mut store = Self::new(storage, clock, config);
        store.restore();
        store
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Reads the durable record.
    ///
    /// Missing, unreadable and corrupt records all come back as defaults. Fields
    /// missing from an older record keep their default value.
    pub fn load(&self) -> HydrationState {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No saved data, starting fresh");
                return HydrationState::default();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Unable to read saved data, starting fresh");
                self.notify(Notice::LoadFailed {
                    reason: e.to_string(),
                });
                return HydrationState::default();
            }
        };

        match decode(&raw) {
            Ok(state) => {
                debug!(key = %self.key, "Saved data loaded");
                state.normalized(self.history_cap)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Saved data is corrupt, starting fresh");
                self.notify(Notice::LoadFailed {
                    reason: e.to_string(),
                });
                HydrationState::default()
            }
        }
    }

    /// Loads the durable record and applies the day rollover to it.
    ///
    /// A rolled-over state is written back right away.
    pub fn restore(&mut self) -> Resumed {
        let loaded = self.load();
        let today = self.clock.today();
        let resumed = if rollover::is_current(&loaded, today) {
            Resumed::SameDay
        } else {
            Resumed::NewDay
        };

        self.state = rollover::reconcile(loaded, today);
        self.undo_trail.clear();

        match resumed {
            Resumed::NewDay => {
                self.notify(Notice::NewDay { date: today });
                let _ = self.commit(());
            }
            Resumed::SameDay => {
                info!(
                    intake_ml = self.state.current_intake_ml,
                    "Continuing from earlier today"
                );
                if self.state.weight_kg > 0.0 {
                    self.notify(Notice::WelcomeBack);
                }
                self.publish();
            }
        }

        resumed
    }

    /// Writes the current state. Also used by the periodic save and on exit.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.state)?;
        self.storage.set(&self.key, &raw)?;

        self.last_saved = Some(self.clock.now());
        debug!(
            key = %self.key,
            intake_ml = self.state.current_intake_ml,
            "State saved"
        );

        self.publish();
        Ok(())
    }

    /// Validates and stores a new body weight, recomputing the daily goal.
    ///
    /// Raising the goal above today's intake re-arms the goal celebration.
    /// A goal that today's intake already covers is celebrated right away.
    pub fn set_weight(
        &mut self,
        weight_kg: f64,
    ) -> Result<Applied<WeightOutcome>, ValidationError> {
        let weight_kg = goal::validate_weight(weight_kg)?;
        self.roll_over();

        let goal_ml = goal::daily_goal_ml(weight_kg);
        self.state.weight_kg = weight_kg;
        self.state.daily_goal_ml = goal_ml;
        if goal_ml > self.state.current_intake_ml {
            self.state.goal_reached_today = false;
        }

        info!(weight_kg, goal_ml, "Daily goal set");
        let goal_just_reached = self.check_goal_reached();
        Ok(self.commit(WeightOutcome {
            goal_ml,
            goal_just_reached,
        }))
    }

    pub fn set_cup_size(&mut self, size_ml: u32) -> Result<Applied<u32>, ValidationError> {
        let size_ml = goal::validate_cup_size(size_ml)?;
        self.roll_over();

        self.state.cup_size_ml = size_ml;

        debug!(size_ml, "Cup size set");
        Ok(self.commit(size_ml))
    }

    /// Logs one cup of water.
    pub fn add_drink(&mut self) -> Applied<DrinkOutcome> {
        self.roll_over();

        let amount_ml = self.state.cup_size_ml;
        self.state.current_intake_ml = self.state.current_intake_ml.saturating_add(amount_ml);
        self.state.lifetime_total_ml = self
            .state
            .lifetime_total_ml
            .saturating_add(u64::from(amount_ml));

        let event = DrinkEvent::new(self.clock.now(), amount_ml, self.state.current_intake_ml);
        let evicted = self.state.push_history(event.clone(), self.history_cap);

        self.undo_trail.push(evicted);
        if self.undo_trail.len() > self.history_cap {
            let overflow = self.undo_trail.len() - self.history_cap;
            self.undo_trail.drain(..overflow);
        }

        let goal_just_reached = self.check_goal_reached();

        debug!(
            amount_ml,
            intake_ml = self.state.current_intake_ml,
            "Drink added"
        );

        let outcome = DrinkOutcome {
            event,
            percentage: self.state.percentage(),
            goal_just_reached,
        };
        self.commit(outcome)
    }

    /// Takes back the most recent drink. An empty history is not an error.
    pub fn undo_last_drink(&mut self) -> Applied<UndoOutcome> {
        let rolled_over = self.roll_over();

        let Some(event) = self.state.history.pop() else {
            debug!("Nothing to undo");
            return if rolled_over {
                self.commit(UndoOutcome::NothingToUndo)
            } else {
                Applied {
                    value: UndoOutcome::NothingToUndo,
                    save_error: None,
                }
            };
        };

        self.state.current_intake_ml = self.state.current_intake_ml.saturating_sub(event.amount_ml);
        if let Some(Some(evicted)) = self.undo_trail.pop() {
            self.state.history.insert(0, evicted);
        }

        debug!(
            amount_ml = event.amount_ml,
            intake_ml = self.state.current_intake_ml,
            "Drink undone"
        );
        self.commit(UndoOutcome::Undone(event))
    }

    /// Clears today's progress, keeping weight, goal, cup size and the lifetime total.
    pub fn reset_today(&mut self) -> Applied<()> {
        self.roll_over();
        self.state.clear_day();
        self.undo_trail.clear();

        info!("Today's progress reset");
        self.commit(())
    }

    /// Returns to hard defaults and erases the durable record. The cleared state
    /// still belongs to today, so the next change does not start a new day.
    pub fn clear_all(&mut self) -> Applied<()> {
        self.state = HydrationState {
            last_date: Some(self.clock.today()),
            ..HydrationState::default()
        };
        self.undo_trail.clear();
        self.last_saved = None;

        let save_error = self.storage.remove(&self.key).err();
        if let Some(e) = &save_error {
            warn!(key = %self.key, error = %e, "Unable to erase saved data");
            self.notify(Notice::SaveFailed {
                reason: e.to_string(),
            });
        }

        info!("All data cleared");
        self.publish();
        Applied {
            value: (),
            save_error,
        }
    }

    pub fn state(&self) -> &HydrationState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.state, self.last_saved)
    }

    /// Latest snapshot, updated after every mutation and save.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Notices sent after this call. Subscribe before [`StateStore::restore`] to
    /// catch the startup ones.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Today's intake as of now, even if no mutation has rolled the day over yet.
    pub fn intake_today_ml(&self) -> u32 {
        if rollover::is_current(&self.state, self.clock.today()) {
            self.state.current_intake_ml
        } else {
            0
        }
    }

    pub fn last_saved(&self) -> Option<NaiveDateTime> {
        self.last_saved
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    /// Up to `limit` drinks, newest first, each with its progress at the time.
    pub fn recent_history(&self, limit: usize) -> Vec<HistoryRow> {
        self.state
            .history
            .iter()
            .rev()
            .take(limit)
            .map(|event| HistoryRow {
                event: event.clone(),
                percent: self.state.percent_of_goal(event.total_after_ml),
            })
            .collect()
    }

    pub fn storage_usage_bytes(&self) -> u64 {
        self.storage.usage_bytes()
    }

    /// Applies the day rollover if the date changed since the last mutation.
    fn roll_over(&mut self) -> bool {
        let today = self.clock.today();
        if rollover::is_current(&self.state, today) {
            return false;
        }

        self.state = rollover::reconcile(std::mem::take(&mut self.state), today);
        self.undo_trail.clear();
        self.notify(Notice::NewDay { date: today });
        true
    }

    fn commit<T>(&mut self, value: T) -> Applied<T> {
        let save_error = self.save().err();

        if let Some(e) = &save_error {
            warn!(key = %self.key, error = %e, "Unable to save, change kept in memory");
            self.notify(Notice::SaveFailed {
                reason: e.to_string(),
            });
            self.publish();
        }

        Applied { value, save_error }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    /// Marks the goal as reached the first time today's intake covers it.
    fn check_goal_reached(&mut self) -> bool {
        let goal_ml = self.state.daily_goal_ml;
        let intake_ml = self.state.current_intake_ml;
        if !self.state.has_goal() || intake_ml < goal_ml || self.state.goal_reached_today {
            return false;
        }

        self.state.goal_reached_today = true;
        info!(goal_ml, intake_ml, "Daily goal reached");
        self.notify(Notice::GoalReached { goal_ml, intake_ml });
        true
    }

    fn notify(&self, notice: Notice) {
        // No receivers is fine
        let _ = self.notices.send(notice);
    }
}

fn decode(raw: &str) -> Result<HydrationState, StoreError> {
    serde_json::from_str(raw).map_err(StoreError::Deserialization)
}
