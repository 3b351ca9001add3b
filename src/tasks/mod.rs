//! Timers that run next to the store. The store works the same with or without them.

pub mod autosave;
pub mod reminder;
