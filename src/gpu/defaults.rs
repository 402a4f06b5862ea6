//! Replacement of zero / unset description fields by their defaults.

use super::{
    BufferInfo, ContextDesc, Desc, GPUError, ImageInfo, PassInfo, PipelineInfo, PixelFormat,
    Result, ShaderInfo, ShaderStageInfo, MAX_SHADERSTAGE_BUFFERS,
};
use crate::utils::MAX_POOL_SIZE;

pub const DEFAULT_BUFFER_POOL_SIZE: usize = 128;
pub const DEFAULT_IMAGE_POOL_SIZE: usize = 128;
pub const DEFAULT_SHADER_POOL_SIZE: usize = 32;
pub const DEFAULT_PIPELINE_POOL_SIZE: usize = 64;
pub const DEFAULT_PASS_POOL_SIZE: usize = 16;
pub const DEFAULT_CONTEXT_POOL_SIZE: usize = 16;
pub const DEFAULT_UNIFORM_BUFFER_SIZE: usize = 4 * 1024 * 1024;
pub const DEFAULT_STAGING_BUFFER_SIZE: usize = 8 * 1024 * 1024;
pub const DEFAULT_SAMPLER_CACHE_SIZE: usize = 64;

/// Setting this to `1` in the environment makes validation failures non-fatal.
pub const NON_FATAL_VALIDATION_ENV: &str = "SLOTGFX_NON_FATAL_VALIDATION";

fn def<T: PartialEq + Default>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}

impl ContextDesc {
    pub fn resolved(&self) -> Self {
        Self {
            color_format: Some(self.color_format.unwrap_or(PixelFormat::Rgba8)),
            depth_format: Some(self.depth_format.unwrap_or(PixelFormat::DepthStencil)),
            sample_count: def(self.sample_count, 1),
        }
    }

    pub fn color(&self) -> PixelFormat {
        self.color_format.unwrap_or(PixelFormat::Rgba8)
    }

    pub fn depth(&self) -> PixelFormat {
        self.depth_format.unwrap_or(PixelFormat::DepthStencil)
    }
}

impl Desc {
    /// Fill in defaults and check the pool sizes fit a 16-bit slot index.
    pub fn resolved(&self) -> Result<Desc> {
        let desc = Desc {
            buffer_pool_size: def(self.buffer_pool_size, DEFAULT_BUFFER_POOL_SIZE),
            image_pool_size: def(self.image_pool_size, DEFAULT_IMAGE_POOL_SIZE),
            shader_pool_size: def(self.shader_pool_size, DEFAULT_SHADER_POOL_SIZE),
            pipeline_pool_size: def(self.pipeline_pool_size, DEFAULT_PIPELINE_POOL_SIZE),
            pass_pool_size: def(self.pass_pool_size, DEFAULT_PASS_POOL_SIZE),
            context_pool_size: def(self.context_pool_size, DEFAULT_CONTEXT_POOL_SIZE),
            uniform_buffer_size: def(self.uniform_buffer_size, DEFAULT_UNIFORM_BUFFER_SIZE),
            staging_buffer_size: def(self.staging_buffer_size, DEFAULT_STAGING_BUFFER_SIZE),
            sampler_cache_size: def(self.sampler_cache_size, DEFAULT_SAMPLER_CACHE_SIZE),
            non_fatal_validation: self.non_fatal_validation || non_fatal_from_env(),
            context: self.context.resolved(),
        };

        let pools = [
            desc.buffer_pool_size,
            desc.image_pool_size,
            desc.shader_pool_size,
            desc.pipeline_pool_size,
            desc.pass_pool_size,
            desc.context_pool_size,
        ];
        if pools.iter().any(|&size| size > MAX_POOL_SIZE) {
            return Err(GPUError::InvalidConfig("pool size must be below 65536"));
        }
        Ok(desc)
    }
}

fn non_fatal_from_env() -> bool {
    std::env::var(NON_FATAL_VALIDATION_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

impl<'a> BufferInfo<'a> {
    pub fn with_defaults(&self) -> Self {
        let mut info = *self;
        if info.size == 0 {
            info.size = info.data.map(|d| d.len()).unwrap_or(0);
        }
        info
    }
}

impl<'a> ImageInfo<'a> {
    pub fn with_defaults(&self, ctx: &ContextDesc) -> Self {
        let mut info = *self;
        info.num_slices = def(info.num_slices, 1);
        info.num_mipmaps = def(info.num_mipmaps, 1);
        info.sample_count = def(info.sample_count, 1);
        info.max_anisotropy = def(info.max_anisotropy, 1);
        info.max_lod = def(info.max_lod, f32::MAX);
        if info.pixel_format.is_none() {
            info.pixel_format = Some(if info.render_target {
                ctx.color()
            } else {
                PixelFormat::Rgba8
            });
        }
        info
    }
}

fn stage_defaults<'a>(stage: &ShaderStageInfo<'a>) -> ShaderStageInfo<'a> {
    let mut stage = *stage;
    if stage.entry.is_empty() {
        stage.entry = "main";
    }
    for ub in stage.uniform_blocks.iter_mut() {
        for u in ub.uniforms.iter_mut().filter(|u| u.uniform_type.is_some()) {
            u.array_count = def(u.array_count, 1);
        }
    }
    stage
}

impl<'a> ShaderInfo<'a> {
    pub fn with_defaults(&self) -> Self {
        let mut info = *self;
        info.vs = stage_defaults(&self.vs);
        info.fs = stage_defaults(&self.fs);
        info
    }
}

impl<'a> PipelineInfo<'a> {
    /// Resolves formats against the default framebuffer and, when every
    /// attribute offset is zero, packs attributes tightly per buffer.
    pub fn with_defaults(&self, ctx: &ContextDesc) -> Self {
        let mut info = *self;
        info.color_count = def(info.color_count, 1);
        info.sample_count = def(info.sample_count, ctx.sample_count.max(1));
        if info.depth.pixel_format.is_none() {
            info.depth.pixel_format = Some(ctx.depth());
        }
        for color in info.colors.iter_mut().take(info.color_count) {
            if color.pixel_format.is_none() {
                color.pixel_format = Some(ctx.color());
            }
        }
        for buf in info.layout.buffers.iter_mut() {
            buf.step_rate = def(buf.step_rate, 1);
        }

        let auto_offset = info
            .layout
            .attrs
            .iter()
            .all(|a| a.format.is_none() || a.offset == 0);
        let mut offsets = [0u32; MAX_SHADERSTAGE_BUFFERS];
        for attr in info.layout.attrs.iter_mut() {
            let Some(format) = attr.format else {
                continue;
            };
            let Some(offset) = offsets.get_mut(attr.buffer_index) else {
                continue;
            };
            if auto_offset {
                attr.offset = *offset;
            }
            *offset += format.byte_size();
        }
        for (buf, offset) in info.layout.buffers.iter_mut().zip(offsets) {
            buf.stride = def(buf.stride, offset);
        }
        info
    }
}

impl<'a> PassInfo<'a> {
    pub fn with_defaults(&self) -> Self {
        *self
    }
}
