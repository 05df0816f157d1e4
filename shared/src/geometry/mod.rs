pub mod capsule;
pub mod collider;
pub mod error;
pub mod geometry_cache;
pub mod height_field;
pub mod raycast;
