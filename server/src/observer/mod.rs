pub mod observer_config;
pub mod observer_ref;
pub mod observer_state;
pub mod pair_state_store;
