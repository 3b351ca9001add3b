pub mod drink_event;
pub mod hydration_state;
pub mod snapshot;
