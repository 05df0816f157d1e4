//! # Sightline Server
//! Server-side interest management: for every observer (an entity with a
//! player connection) and every observable it decides whether the observable
//! is visible and how often its state should be replicated, and tells the
//! replication layer only when that changes.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod shared {
    pub use sightline_shared::{
        ByteBitset, CapsuleShape, ColliderPose, GeometryCache, GeometryError, GeometrySnapshot,
        HeightField, HeightFieldRaycaster, IdentityError, ObservableId, PackedBitset, RaycastHit,
        Raycaster, SendPeriod, TerrainCollider, Vec3, VisibilityBitset, DEFAULT_MAX_SEND_PERIOD,
        MAX_OBSERVABLES,
    };
}

mod error;
mod evaluators;
mod events;
mod observable;
mod observer;
mod server;
mod world;

pub use error::InterestError;
pub use evaluators::coarse_throttle::{distance_send_period, DistanceTiers};
pub use events::{
    interest_events::{
        ErrorEvent, HideEvent, IdentityAssignedEvent, IdentityFreedEvent, InterestEvent,
        InterestEvents, SendPeriodEvent, ShowEvent,
    },
    lifecycle::LifecycleEvent,
};
pub use observable::observable_kind::ObservableKind;
pub use observer::{
    observer_config::ObserverConfig,
    observer_ref::{ObserverMut, ObserverRef},
};
pub use server::{interest_config::InterestConfig, interest_server::InterestServer};
pub use world::{ReplicationSink, WorldRefType};
