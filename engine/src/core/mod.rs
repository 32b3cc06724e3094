//! Scene-graph data model: entities, cameras, lights and environment

pub mod camera;
pub mod entity;
pub mod environment;
pub mod light;
