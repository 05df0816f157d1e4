pub mod interest_config;
pub mod interest_server;
