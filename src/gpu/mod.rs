pub mod backend;
pub use backend::*;
pub mod commands;
pub mod context;
pub mod defaults;
pub use defaults::NON_FATAL_VALIDATION_ENV;
pub mod device;
pub use device::*;
pub mod dynamic;
pub mod error;
pub use error::*;
pub mod format;
pub use format::*;
pub mod lifecycle;
pub mod null;
pub use null::*;
pub mod resources;
pub use resources::*;
pub mod sampler_cache;
pub use sampler_cache::*;
pub mod structs;
pub use structs::*;
pub mod validate;
pub use validate::*;

pub const CUBEFACE_NUM: usize = 6;
pub const MAX_MIPMAPS: usize = 16;
pub const MAX_COLOR_ATTACHMENTS: usize = 4;
pub const MAX_SHADERSTAGE_BUFFERS: usize = 8;
pub const MAX_SHADERSTAGE_IMAGES: usize = 12;
pub const MAX_SHADERSTAGE_UBS: usize = 4;
pub const MAX_UB_MEMBERS: usize = 16;
pub const MAX_VERTEX_ATTRIBUTES: usize = 16;
pub const MAX_TEXTUREARRAY_LAYERS: u32 = 128;
pub const NUM_SHADER_STAGES: usize = 2;
/// Backing copies kept for every dynamic buffer and image.
pub const NUM_INFLIGHT_FRAMES: usize = 2;
