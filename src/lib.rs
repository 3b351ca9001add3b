//! # HydraTrack
//!
//! Keeps a daily water-intake tally that survives restarts.
//!
//! - [`store::StateStore`] owns the [`HydrationState`], saves it after every
//!   change and loads it back fail-soft.
//! - [`rollover::reconcile`] resets the day's progress when the calendar day changes.
//! - [`goal::daily_goal_ml`] turns body weight into a goal (33 ml per kg).
//! - [`tasks`] holds the periodic auto-save and reminder timers.
//!
//! ```no_run
//! use hydratrack::{FileStorage, StateStore, SystemClock, TrackerConfig};
//!
//! let config = TrackerConfig::default();
//! let mut store = StateStore::open(FileStorage::new("./data"), SystemClock, &config);
//!
//! let _ = store.set_weight(70.0).expect("valid weight");
//! let drink = store.add_drink();
//! if drink.value.goal_just_reached {
//!     println!("Goal reached!");
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod goal;
pub mod logging;
pub mod rollover;
pub mod storage;
pub mod store;
pub mod structs;
pub mod tasks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use error::{StoreError, ValidationError};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{
    Applied, DrinkOutcome, Notice, Resumed, SharedStore, StateStore, UndoOutcome,
    WeightOutcome,
};
pub use structs::{
    drink_event::DrinkEvent,
    hydration_state::HydrationState,
    snapshot::{HistoryRow, Snapshot},
};
