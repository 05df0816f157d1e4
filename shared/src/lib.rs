//! # Sightline Shared
//! Value types, identity allocation and occlusion geometry used by the
//! sightline interest-management server.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod constants;
mod geometry;
mod identity;
mod send_period;
mod vector;
mod visibility;

pub use constants::{DEFAULT_MAX_SEND_PERIOD, MAX_OBSERVABLES};
pub use geometry::{
    capsule::CapsuleShape,
    collider::{ColliderPose, TerrainCollider},
    error::GeometryError,
    geometry_cache::{GeometryCache, GeometrySnapshot},
    height_field::HeightField,
    raycast::{HeightFieldRaycaster, RaycastHit, Raycaster},
};
pub use identity::{
    error::IdentityError, identity_allocator::IdentityAllocator, observable_id::ObservableId,
};
pub use send_period::SendPeriod;
pub use vector::Vec3;
pub use visibility::bitset::{ByteBitset, PackedBitset, VisibilityBitset};
