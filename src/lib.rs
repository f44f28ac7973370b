//! Textured OBJ scene renderer.
//!
//! Meshes are flattened into interleaved vertex buffers, uploaded through a
//! [`GpuDevice`](pipeline::device::GpuDevice) and drawn with a Phong program
//! lit by one directional and one point light. A player model can be steered
//! from third person, first person or a top-down view.

pub mod app;
pub mod core;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod scene;
pub mod ui;
