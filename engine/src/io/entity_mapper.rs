//! Unique-id lookup tables for linking loaded entities
//!
//! Descriptor files are read in no particular order, so a parent may be
//! created after its children. Every entity is built first with its parent
//! reference parked in a [`WaitingParent`]; once the whole scene exists the
//! mapper indexes it and [`resolve_references`] turns the parked ids into
//! live [`Parent`](crate::core::entity::Parent) edges.

use crate::core::entity::{Entity, EntityKind, WaitingParent, World};
use crate::core::light::{ShadowGenerator, WaitingRenderList};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Kinds searched when resolving a parent id, in priority order
pub const PARENT_SEARCH_ORDER: [EntityKind; 4] = [
    EntityKind::TransformNode,
    EntityKind::Mesh,
    EntityKind::Light,
    EntityKind::Camera,
];

/// Maps unique ids to entities, one table per entity kind
///
/// Unique ids are only expected to be unique within the scene; the tables
/// are kept per kind so a collision across kinds resolves by
/// [`PARENT_SEARCH_ORDER`] instead of by load order.
#[derive(Debug, Default)]
pub struct EntityMapper {
    by_kind: HashMap<EntityKind, HashMap<u64, Entity>>,
    meshes_by_id: HashMap<String, Entity>,
}

impl EntityMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every node of `world`
    ///
    /// Within one kind, entities are registered in stable-id order so that
    /// duplicate unique ids resolve the same way whatever the load order.
    pub fn from_world(world: &World) -> Self {
        let mut mapper = Self::new();
        for kind in PARENT_SEARCH_ORDER {
            let mut entities: Vec<(String, Entity)> = world
                .entities_of_kind(kind)
                .into_iter()
                .filter_map(|entity| world.entity_id(entity).map(|id| (id, entity)))
                .collect();
            entities.sort_by(|a, b| a.0.cmp(&b.0));

            for (id, entity) in entities {
                if let Some(unique_id) = world.unique_id(entity) {
                    mapper.register(kind, unique_id, entity);
                }
                if kind == EntityKind::Mesh {
                    mapper.meshes_by_id.entry(id).or_insert(entity);
                }
            }
        }
        debug!(entries = mapper.len(), "Indexed scene entities");
        mapper
    }

    /// Register an entity; the first entity registered for an id wins
    pub fn register(&mut self, kind: EntityKind, unique_id: u64, entity: Entity) {
        let table = self.by_kind.entry(kind).or_default();
        if let Some(existing) = table.get(&unique_id) {
            warn!(kind = %kind, unique_id, kept = ?existing, ignored = ?entity, "Duplicate unique id");
            return;
        }
        table.insert(unique_id, entity);
    }

    /// Find the entity for a unique id, searching kinds in [`PARENT_SEARCH_ORDER`]
    pub fn remap(&self, unique_id: u64) -> Option<(EntityKind, Entity)> {
        PARENT_SEARCH_ORDER
            .iter()
            .find_map(|&kind| self.remap_kind(kind, unique_id).map(|entity| (kind, entity)))
    }

    /// Find the entity for a unique id among one kind only
    pub fn remap_kind(&self, kind: EntityKind, unique_id: u64) -> Option<Entity> {
        self.by_kind.get(&kind)?.get(&unique_id).copied()
    }

    /// Find a mesh by stable id
    pub fn mesh(&self, id: &str) -> Option<Entity> {
        self.meshes_by_id.get(id).copied()
    }

    /// Number of registered unique ids across all kinds
    pub fn len(&self) -> usize {
        self.by_kind.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of the linking pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResolveOutcome {
    /// Parent edges created
    pub resolved: usize,
    /// Stable ids of entities left as roots because their parent id matched nothing
    pub unresolved: Vec<String>,
    /// `(shadow generator id, mesh id)` pairs whose mesh does not exist
    pub missing_casters: Vec<(String, String)>,
}

/// Turn every pending reference in `world` into a live link
///
/// Parent ids are matched by unique id in [`PARENT_SEARCH_ORDER`]; an id
/// matching nothing, or only the entity itself, leaves the entity a root.
/// Shadow render lists are matched by mesh stable id.
pub fn resolve_references(world: &mut World) -> ResolveOutcome {
    let mapper = EntityMapper::from_world(world);
    let mut outcome = ResolveOutcome::default();

    let waiting: Vec<(Entity, u64)> = world
        .query::<&WaitingParent>()
        .iter()
        .map(|(entity, waiting)| (entity, waiting.0))
        .collect();

    for (entity, parent_id) in waiting {
        let _ = world.remove_one::<WaitingParent>(entity);

        match mapper.remap(parent_id) {
            Some((kind, parent)) if parent != entity => {
                if world.set_parent(entity, Some(parent)).is_ok() {
                    debug!(child = ?entity, parent = ?parent, parent_kind = %kind, "Resolved parent");
                    outcome.resolved += 1;
                }
            }
            _ => {
                let id = world.entity_id(entity).unwrap_or_default();
                debug!(entity_id = %id, parent_id, "Parent not found, keeping entity as root");
                let _ = world.set_parent(entity, None);
                outcome.unresolved.push(id);
            }
        }
    }
    outcome.unresolved.sort();

    let pending: Vec<(Entity, Vec<String>)> = world
        .query::<&WaitingRenderList>()
        .iter()
        .map(|(entity, list)| (entity, list.0.clone()))
        .collect();

    for (entity, mesh_ids) in pending {
        let _ = world.remove_one::<WaitingRenderList>(entity);
        let Ok(generator) = world.query_one_mut::<&mut ShadowGenerator>(entity) else {
            continue;
        };
        for mesh_id in mesh_ids {
            match mapper.mesh(&mesh_id) {
                Some(mesh) => generator.add_caster(mesh),
                None => {
                    warn!(shadow_generator = %generator.id, mesh_id = %mesh_id, "Shadow caster not found");
                    outcome.missing_casters.push((generator.id.clone(), mesh_id));
                }
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::core::entity::Transform;
    use crate::core::light::{Light, ShadowSettings};
    use crate::graphics::MeshRenderer;

    #[test]
    fn test_remap_prefers_transform_nodes() {
        let mut mapper = EntityMapper::new();
        let mut world = hecs::World::new();
        let light = world.spawn(());
        let node = world.spawn(());

        mapper.register(EntityKind::Light, 5, light);
        mapper.register(EntityKind::TransformNode, 5, node);

        assert_eq!(mapper.remap(5), Some((EntityKind::TransformNode, node)));
        assert_eq!(mapper.remap_kind(EntityKind::Light, 5), Some(light));
        assert_eq!(mapper.remap(6), None);
        assert_eq!(mapper.len(), 2);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut mapper = EntityMapper::new();
        let mut world = hecs::World::new();
        let first = world.spawn(());
        let second = world.spawn(());

        mapper.register(EntityKind::Mesh, 1, first);
        mapper.register(EntityKind::Mesh, 1, second);

        assert_eq!(mapper.remap(1), Some((EntityKind::Mesh, first)));
        assert_eq!(mapper.len(), 1);
    }

    #[test]
    fn test_resolve_parents_across_kinds() {
        let mut world = World::new();
        let camera = world.spawn_camera("cam", "Camera", Transform::default(), Camera::default());
        let mesh = world.spawn_mesh("mesh", "Mesh", Transform::default(), MeshRenderer::default());
        let light = world.spawn_light("light", "Light", Transform::default(), Light::point());

        let camera_id = world.unique_id(camera).unwrap();
        let mesh_id = world.unique_id(mesh).unwrap();
        world.insert_one(mesh, WaitingParent(camera_id)).unwrap();
        world.insert_one(light, WaitingParent(mesh_id)).unwrap();

        let outcome = resolve_references(&mut world);

        assert_eq!(outcome.resolved, 2);
        assert_eq!(world.parent(mesh), Some(camera));
        assert_eq!(world.parent(light), Some(mesh));
        assert!(!world.has::<WaitingParent>(mesh));
    }

    #[test]
    fn test_unknown_and_self_parent_become_roots() {
        let mut world = World::new();
        let orphan = world.spawn_transform_node("orphan", "Orphan", Transform::default());
        let narcissist = world.spawn_transform_node("self", "Self", Transform::default());
        let own_id = world.unique_id(narcissist).unwrap();
        world.insert_one(orphan, WaitingParent(999)).unwrap();
        world.insert_one(narcissist, WaitingParent(own_id)).unwrap();

        let outcome = resolve_references(&mut world);

        assert_eq!(outcome.resolved, 0);
        assert_eq!(outcome.unresolved, vec!["orphan".to_string(), "self".to_string()]);
        assert_eq!(world.parent(orphan), None);
        assert_eq!(world.parent(narcissist), None);
    }

    #[test]
    fn test_resolve_render_lists() {
        let mut world = World::new();
        let mesh = world.spawn_mesh("crate", "Crate", Transform::default(), MeshRenderer::default());
        let light = world.spawn_light("sun", "Sun", Transform::default(), Light::point());
        world
            .insert_one(light, ShadowGenerator::new("shadows", ShadowSettings::default()))
            .unwrap();
        world
            .insert_one(light, WaitingRenderList(vec!["crate".to_string(), "gone".to_string()]))
            .unwrap();

        let outcome = resolve_references(&mut world);

        assert_eq!(world.get::<ShadowGenerator>(light).unwrap().render_list, vec![mesh]);
        assert_eq!(outcome.missing_casters, vec![("shadows".to_string(), "gone".to_string())]);
        assert!(!world.has::<WaitingRenderList>(light));
    }
}
