pub mod observable_kind;
pub mod observable_registry;
