//! klonk: rigid-body physics core (broadphase pairing, narrowphase contacts,
//! penetration correction and impulse response, trigger events, raycasts)

pub mod types;
pub mod api;
pub mod bounds;
pub mod world;
pub mod narrowphase;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::bounds::Bounds;
pub use crate::narrowphase::{Contact, Narrowphase};
pub use crate::world::PhysicsWorld;
