pub mod error;
pub mod identity_allocator;
pub mod observable_id;
