//! Core components shared by every scene-graph entity

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Transform component representing position, rotation, and scale in local space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// Position in local space
    pub position: Vec3,
    /// Rotation in local space as a quaternion
    pub rotation: Quat,
    /// Scale in local space
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the transform to look at a target position with the given up vector
    pub fn looking_at(mut self, target: Vec3, up: Vec3) -> Self {
        let forward = (target - self.position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        let rotation_matrix = Mat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            (-forward).extend(0.0),
            Vec3::ZERO.extend(1.0),
        );

        self.rotation = Quat::from_mat4(&rotation_matrix);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Set the scale of the transform
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// Stable string identity of an entity.
///
/// Assigned at creation or import time and used as the file name key when
/// the entity is written to a scene directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Numeric identity used to link entities together.
///
/// Only meaningful within one session; descriptors carry it so that parent
/// references can be resolved after every entity of a scene has been built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueId(pub u64);

/// Parent component establishing a parent-child relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub hecs::Entity);

/// Parent reference read from a descriptor that has not been resolved yet.
///
/// Holds the parent's [`UniqueId`]. Removed by the resolution pass once every
/// entity of the scene exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitingParent(pub u64);

/// Name component for user-friendly entity identification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    /// Create a new name component
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Marker for plain transform nodes (grouping nodes without geometry)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformNode;

/// The kinds of scene-graph entities the persistence layer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    TransformNode,
    Mesh,
    Light,
    Camera,
    ShadowGenerator,
    Geometry,
    Config,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::TransformNode => "transform node",
            EntityKind::Mesh => "mesh",
            EntityKind::Light => "light",
            EntityKind::Camera => "camera",
            EntityKind::ShadowGenerator => "shadow generator",
            EntityKind::Geometry => "geometry",
            EntityKind::Config => "configuration",
        };
        f.write_str(label)
    }
}
