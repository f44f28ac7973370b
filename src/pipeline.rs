pub mod device;
pub mod passes;
pub mod recording;
pub mod renderer;
pub mod resources;
pub mod shaders;
pub mod software;
