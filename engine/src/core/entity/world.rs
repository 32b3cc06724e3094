//! World wrapper providing helper methods for scene-graph management

use super::components::{EntityId, EntityKind, Name, Parent, Transform, TransformNode, UniqueId};
use crate::core::camera::{Camera, EditorCamera};
use crate::core::environment::Environment;
use crate::core::light::{Light, ShadowGenerator};
use crate::graphics::{MeshRenderer, SceneAssets};
use hecs::Entity;
use tracing::debug;

/// The live scene graph
///
/// Wraps a `hecs::World` holding one entity per scene-graph node and keeps
/// the scene-level resources (geometries, materials, environment) next to
/// it. Also hands out the numeric [`UniqueId`]s used to link entities.
pub struct World {
    inner: hecs::World,
    assets: SceneAssets,
    environment: Environment,
    next_unique_id: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
            assets: SceneAssets::new(),
            environment: Environment::default(),
            next_unique_id: 1,
        }
    }

    /// Spawn a new entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Get a reference to a component on an entity
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Whether the entity carries a component of type `T`
    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.inner
            .entity(entity)
            .map(|entity_ref| entity_ref.has::<T>())
            .unwrap_or(false)
    }

    /// Query a single entity for a mutable component reference
    pub fn query_one_mut<Q: hecs::Query>(
        &mut self,
        entity: Entity,
    ) -> Result<Q::Item<'_>, hecs::QueryOneError> {
        self.inner.query_one_mut::<Q>(entity)
    }

    /// Insert a component into an entity
    pub fn insert_one(
        &mut self,
        entity: Entity,
        component: impl hecs::Component,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, component)
    }

    /// Remove a component from an entity
    pub fn remove_one<T: hecs::Component>(&mut self, entity: Entity) -> Result<T, hecs::ComponentError> {
        self.inner.remove_one::<T>(entity)
    }

    /// Query entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query()
    }

    /// Query entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut()
    }

    /// Despawn an entity and all its components
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    pub fn assets(&self) -> &SceneAssets {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut SceneAssets {
        &mut self.assets
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Hand out a fresh unique id
    pub fn allocate_unique_id(&mut self) -> u64 {
        let id = self.next_unique_id;
        self.next_unique_id = self.next_unique_id.saturating_add(1);
        id
    }

    /// Make sure ids handed out later never collide with `id`
    ///
    /// Returns `false` for `u64::MAX`, which leaves no id above it to hand out.
    pub fn reserve_unique_id(&mut self, id: u64) -> bool {
        let Some(next) = id.checked_add(1) else {
            return false;
        };
        self.next_unique_id = self.next_unique_id.max(next);
        true
    }

    fn spawn_node(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        transform: Transform,
        kind: impl hecs::DynamicBundle,
    ) -> Entity {
        let unique_id = self.allocate_unique_id();
        let mut builder = hecs::EntityBuilder::new();
        builder
            .add(EntityId::new(id))
            .add(Name::new(name))
            .add(UniqueId(unique_id))
            .add(transform)
            .add_bundle(kind);
        let entity = self.inner.spawn(builder.build());
        debug!(entity = ?entity, unique_id, "Spawned scene node");
        entity
    }

    /// Spawn a grouping node without geometry
    pub fn spawn_transform_node(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        transform: Transform,
    ) -> Entity {
        self.spawn_node(id, name, transform, (TransformNode,))
    }

    /// Spawn a mesh entity
    pub fn spawn_mesh(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        transform: Transform,
        mesh: MeshRenderer,
    ) -> Entity {
        self.spawn_node(id, name, transform, (mesh,))
    }

    /// Spawn a light entity
    pub fn spawn_light(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        transform: Transform,
        light: Light,
    ) -> Entity {
        self.spawn_node(id, name, transform, (light,))
    }

    /// Spawn a camera entity
    pub fn spawn_camera(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        transform: Transform,
        camera: Camera,
    ) -> Entity {
        self.spawn_node(id, name, transform, (camera,))
    }

    /// Spawn the editor camera, replacing the current one if any
    pub fn spawn_editor_camera(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        transform: Transform,
        camera: Camera,
    ) -> Entity {
        if let Some(previous) = self.editor_camera() {
            debug!(entity = ?previous, "Disposing previous editor camera");
            self.remove_entity(previous);
        }
        self.spawn_node(id, name, transform, (camera, EditorCamera))
    }

    /// The camera the editor renders through
    pub fn editor_camera(&self) -> Option<Entity> {
        self.inner
            .query::<&EditorCamera>()
            .iter()
            .map(|(entity, _)| entity)
            .next()
    }

    /// Classify an entity; lights and cameras win over the mesh/node markers
    pub fn kind_of(&self, entity: Entity) -> Option<EntityKind> {
        if self.has::<Camera>(entity) {
            Some(EntityKind::Camera)
        } else if self.has::<Light>(entity) {
            Some(EntityKind::Light)
        } else if self.has::<MeshRenderer>(entity) {
            Some(EntityKind::Mesh)
        } else if self.has::<TransformNode>(entity) {
            Some(EntityKind::TransformNode)
        } else {
            None
        }
    }

    pub fn is_mesh(&self, entity: Entity) -> bool {
        self.kind_of(entity) == Some(EntityKind::Mesh)
    }

    pub fn is_light(&self, entity: Entity) -> bool {
        self.kind_of(entity) == Some(EntityKind::Light)
    }

    pub fn is_camera(&self, entity: Entity) -> bool {
        self.kind_of(entity) == Some(EntityKind::Camera)
    }

    pub fn is_transform_node(&self, entity: Entity) -> bool {
        self.kind_of(entity) == Some(EntityKind::TransformNode)
    }

    /// Any entity that takes part in the scene hierarchy
    pub fn is_node(&self, entity: Entity) -> bool {
        self.kind_of(entity).is_some()
    }

    /// All entities of one kind
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<Entity> {
        self.inner
            .iter()
            .map(|entity_ref| entity_ref.entity())
            .filter(|&entity| self.kind_of(entity) == Some(kind))
            .collect()
    }

    /// Find a node by its stable id
    pub fn find_by_id(&self, id: &str) -> Option<Entity> {
        self.inner
            .query::<&EntityId>()
            .iter()
            .find(|(_, entity_id)| entity_id.as_str() == id)
            .map(|(entity, _)| entity)
    }

    /// Stable id of a node
    pub fn entity_id(&self, entity: Entity) -> Option<String> {
        self.get::<EntityId>(entity).ok().map(|id| id.0.clone())
    }

    /// Display name of a node, empty when unnamed
    pub fn name(&self, entity: Entity) -> String {
        self.get::<Name>(entity)
            .map(|name| name.0.clone())
            .unwrap_or_default()
    }

    pub fn unique_id(&self, entity: Entity) -> Option<u64> {
        self.get::<UniqueId>(entity).ok().map(|id| id.0)
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.get::<Parent>(entity).ok().map(|parent| parent.0)
    }

    /// Attach `child` under `parent`, or make it a root when `parent` is `None`
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), hecs::NoSuchEntity> {
        match parent {
            Some(parent) => self.inner.insert_one(child, Parent(parent)),
            None => {
                let _ = self.inner.remove_one::<Parent>(child);
                Ok(())
            }
        }
    }

    /// Direct children of `parent`
    pub fn children(&self, parent: Entity) -> Vec<Entity> {
        self.inner
            .query::<&Parent>()
            .iter()
            .filter(|(_, p)| p.0 == parent)
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Remove a node from the scene
    ///
    /// Its children become roots and it is dropped from every shadow render
    /// list. Returns `false` when the entity did not exist.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        if !self.inner.contains(entity) {
            return false;
        }

        for child in self.children(entity) {
            let _ = self.inner.remove_one::<Parent>(child);
        }

        for (_, generator) in self.inner.query_mut::<&mut ShadowGenerator>() {
            generator.remove_caster(entity);
        }

        let removed = self.inner.despawn(entity).is_ok();
        debug!(entity = ?entity, "Removed scene node");
        removed
    }

    /// Remove every entity and resource
    pub fn clear(&mut self) {
        self.inner.clear();
        self.assets.clear();
        self.environment = Environment::default();
    }

    /// Number of entities in the world
    pub fn len(&self) -> usize {
        self.inner.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get mutable access to the inner hecs::World for advanced operations
    pub fn inner_mut(&mut self) -> &mut hecs::World {
        &mut self.inner
    }
}
