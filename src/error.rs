use std::path::PathBuf;
use thiserror::Error;

/// Which attribute array a corner index points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeArray {
    Position,
    Normal,
    Texcoord,
}

impl std::fmt::Display for AttributeArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeArray::Position => "position",
            AttributeArray::Normal => "normal",
            AttributeArray::Texcoord => "texcoord",
        };
        f.write_str(name)
    }
}

/// Failure to turn an OBJ file into an interleaved vertex buffer.
#[derive(Debug, Error)]
pub enum MeshLoadError {
    #[error("mesh path is empty")]
    EmptyPath,
    #[error("mesh file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to parse OBJ '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("mesh contains no triangles")]
    Empty,
    #[error("{attribute} index {index} out of bounds (array holds {len} entries)")]
    IndexOutOfBounds {
        attribute: AttributeArray,
        index: usize,
        len: usize,
    },
    #[error("malformed faces: {0}")]
    MalformedFaces(String),
}

/// Failure to decode a texture. Never fatal to a model.
#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("texture path is empty")]
    EmptyPath,
    #[error("failed to decode texture '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors reported by a [`GpuDevice`](crate::pipeline::device::GpuDevice).
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("shader program '{name}' failed to build: {reason}")]
    ShaderCompile { name: String, reason: String },
    #[error("vertex data length {len} is not a multiple of stride {stride}")]
    BadVertexData { len: usize, stride: usize },
    #[error("texture data is {actual} bytes, expected {expected}")]
    BadTextureData { expected: usize, actual: usize },
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },
    #[error("draw range {first}..{end} exceeds {available} vertices")]
    DrawOutOfRange {
        first: usize,
        end: usize,
        available: usize,
    },
}

/// Failure to construct a renderable model.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("mesh '{path}' could not be loaded: {source}")]
    Mesh {
        path: String,
        #[source]
        source: MeshLoadError,
    },
    #[error("upload failed: {0}")]
    Upload(#[from] GpuError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error for the headless application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetLoadError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error("unknown key '{0}' in input script")]
    UnknownKey(String),
    #[error("failed to write '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
