//! Named generators for primitive geometries

use crate::graphics::mesh::Geometry;
use std::collections::BTreeMap;
use tracing::debug;

type GeometryGenerator = Box<dyn Fn(&str) -> Geometry + Send + Sync>;

/// Library of primitive geometry generators, looked up by name
pub struct PrimitiveLibrary {
    generators: BTreeMap<String, GeometryGenerator>,
}

impl Default for PrimitiveLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimitiveLibrary {
    /// Create a new library with the default primitives
    pub fn new() -> Self {
        let mut library = Self {
            generators: BTreeMap::new(),
        };

        library.register("cube", |id| Geometry::cube(id, 1.0));
        library.register("sphere", |id| Geometry::sphere(id, 0.5, 32, 16));
        library.register("plane", |id| Geometry::plane(id, 2.0, 2.0));
        library.register("ground", |id| Geometry::plane(id, 20.0, 20.0));

        debug!(
            "Initialized primitive library with {} generators",
            library.generators.len()
        );

        library
    }

    /// Register a geometry generator; it receives the id to give the geometry
    pub fn register<F>(&mut self, name: &str, generator: F)
    where
        F: Fn(&str) -> Geometry + Send + Sync + 'static,
    {
        self.generators
            .insert(name.to_string(), Box::new(generator));
        debug!(primitive = name, "Registered primitive generator");
    }

    /// Generate the named primitive with the given geometry id
    pub fn generate(&self, name: &str, geometry_id: &str) -> Option<Geometry> {
        self.generators.get(name).map(|generator| {
            debug!(primitive = name, geometry_id, "Generating primitive");
            generator(geometry_id)
        })
    }

    pub fn has_primitive(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Names of all available primitives, sorted
    pub fn available(&self) -> Vec<String> {
        self.generators.keys().cloned().collect()
    }
}
