pub mod interest_events;
pub mod lifecycle;
