//! Entity storage for the scene graph
//!
//! Every scene-graph node (transform node, mesh, light, camera) is a hecs
//! entity carrying a stable [`EntityId`], a [`Name`], a numeric [`UniqueId`]
//! and a [`Transform`], plus the component that gives it its kind.

pub mod components;
pub mod world;

// Re-export commonly used types
pub use components::{
    EntityId, EntityKind, Name, Parent, Transform, TransformNode, UniqueId, WaitingParent,
};
pub use world::World;

// Re-export hecs types that users will need
pub use hecs::Entity;
