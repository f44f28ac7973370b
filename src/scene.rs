pub mod camera;
pub mod context;
pub mod light;
pub mod loader;
pub mod mesh;
pub mod mesh_builder;
pub mod model;
pub mod player;
