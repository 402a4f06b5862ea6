use super::{
    BorderColor, BufferType, Color, CullMode, FaceWinding, Filter, ImageType, IndexType,
    PixelFormat, PrimitiveType, SamplerId, SamplerType, Usage, Wrap, MAX_COLOR_ATTACHMENTS,
    MAX_SHADERSTAGE_BUFFERS, MAX_SHADERSTAGE_IMAGES, MAX_SHADERSTAGE_UBS, NUM_SHADER_STAGES,
};
use crate::utils::{Handle, Pool, Resource, ResourceState, Slot};

macro_rules! impl_resource {
    ($ty:ty, $kind:literal) => {
        impl Resource for $ty {
            const KIND: &'static str = $kind;

            fn slot(&self) -> &Slot {
                &self.slot
            }

            fn slot_mut(&mut self) -> &mut Slot {
                &mut self.slot
            }
        }
    };
}

/// A context groups the resources created while it was active.
#[derive(Debug, Default, Clone)]
pub struct Context {
    pub slot: Slot,
}

#[derive(Debug, Default, Clone)]
pub struct Buffer {
    pub slot: Slot,
    pub debug_name: String,
    pub size: usize,
    pub buffer_type: BufferType,
    pub usage: Usage,
    /// 1 for immutable buffers, `NUM_INFLIGHT_FRAMES` otherwise.
    pub num_slots: usize,
    pub active_slot: usize,
    pub update_frame_index: u32,
    pub append_frame_index: u32,
    pub append_pos: usize,
    pub append_overflow: bool,
}

#[derive(Debug, Default, Clone)]
pub struct Image {
    pub slot: Slot,
    pub debug_name: String,
    pub image_type: ImageType,
    pub render_target: bool,
    pub width: u32,
    pub height: u32,
    pub num_slices: u32,
    pub num_mipmaps: u32,
    pub usage: Usage,
    pub pixel_format: PixelFormat,
    pub sample_count: u32,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_u: Wrap,
    pub wrap_v: Wrap,
    pub wrap_w: Wrap,
    pub border_color: BorderColor,
    pub max_anisotropy: u32,
    pub min_lod: f32,
    pub max_lod: f32,
    /// Shared sampler object resolved through the sampler cache.
    pub sampler: SamplerId,
    pub num_slots: usize,
    pub active_slot: usize,
    pub update_frame_index: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShaderUniformBlock {
    pub size: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShaderImage {
    pub image_type: ImageType,
    pub sampler_type: SamplerType,
}

/// Reflection a shader stage exposes to bind-time validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShaderStageLayout {
    pub num_uniform_blocks: usize,
    pub uniform_blocks: [ShaderUniformBlock; MAX_SHADERSTAGE_UBS],
    pub num_images: usize,
    pub images: [ShaderImage; MAX_SHADERSTAGE_IMAGES],
}

#[derive(Debug, Default, Clone)]
pub struct Shader {
    pub slot: Slot,
    pub debug_name: String,
    pub stage: [ShaderStageLayout; NUM_SHADER_STAGES],
}

#[derive(Debug, Default, Clone)]
pub struct Pipeline {
    pub slot: Slot,
    pub debug_name: String,
    pub shader: Handle<Shader>,
    pub primitive_type: PrimitiveType,
    pub index_type: IndexType,
    pub vertex_buffer_layout_active: [bool; MAX_SHADERSTAGE_BUFFERS],
    pub use_instanced_draw: bool,
    pub color_count: usize,
    pub color_formats: [PixelFormat; MAX_COLOR_ATTACHMENTS],
    pub depth_format: PixelFormat,
    pub sample_count: u32,
    pub cull_mode: CullMode,
    pub face_winding: FaceWinding,
    pub blend_color: Color,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassAttachment {
    pub image: Handle<Image>,
    pub mip_level: u32,
    pub slice: u32,
    pub pixel_format: PixelFormat,
}

#[derive(Debug, Default, Clone)]
pub struct Pass {
    pub slot: Slot,
    pub debug_name: String,
    pub num_color_atts: usize,
    pub color_atts: [PassAttachment; MAX_COLOR_ATTACHMENTS],
    pub ds_att: PassAttachment,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
}

impl_resource!(Context, "context");
impl_resource!(Buffer, "buffer");
impl_resource!(Image, "image");
impl_resource!(Shader, "shader");
impl_resource!(Pipeline, "pipeline");
impl_resource!(Pass, "pass");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolSizes {
    pub buffers: usize,
    pub images: usize,
    pub shaders: usize,
    pub pipelines: usize,
    pub passes: usize,
    pub contexts: usize,
}

pub struct Pools {
    pub buffers: Pool<Buffer>,
    pub images: Pool<Image>,
    pub shaders: Pool<Shader>,
    pub pipelines: Pool<Pipeline>,
    pub passes: Pool<Pass>,
    pub contexts: Pool<Context>,
}

impl Pools {
    pub fn new(sizes: &PoolSizes) -> Self {
        Self {
            buffers: Pool::new(sizes.buffers),
            images: Pool::new(sizes.images),
            shaders: Pool::new(sizes.shaders),
            pipelines: Pool::new(sizes.pipelines),
            passes: Pool::new(sizes.passes),
            contexts: Pool::new(sizes.contexts),
        }
    }
}

/// Snapshot of a record's slot bookkeeping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    pub state: ResourceState,
    pub res_id: u32,
    pub ctx_id: u32,
}

impl SlotInfo {
    pub(crate) fn from_slot(slot: &Slot) -> Self {
        Self {
            state: slot.state,
            res_id: slot.id,
            ctx_id: slot.ctx_id,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferStatus {
    pub slot: SlotInfo,
    pub update_frame_index: u32,
    pub append_frame_index: u32,
    pub append_pos: usize,
    pub append_overflow: bool,
    pub num_slots: usize,
    pub active_slot: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageStatus {
    pub slot: SlotInfo,
    pub update_frame_index: u32,
    pub num_slots: usize,
    pub active_slot: usize,
    pub width: u32,
    pub height: u32,
    pub sampler: SamplerId,
}

impl From<&Buffer> for BufferStatus {
    fn from(buf: &Buffer) -> Self {
        Self {
            slot: SlotInfo::from_slot(&buf.slot),
            update_frame_index: buf.update_frame_index,
            append_frame_index: buf.append_frame_index,
            append_pos: buf.append_pos,
            append_overflow: buf.append_overflow,
            num_slots: buf.num_slots,
            active_slot: buf.active_slot,
        }
    }
}

impl From<&Image> for ImageStatus {
    fn from(img: &Image) -> Self {
        Self {
            slot: SlotInfo::from_slot(&img.slot),
            update_frame_index: img.update_frame_index,
            num_slots: img.num_slots,
            active_slot: img.active_slot,
            width: img.width,
            height: img.height,
            sampler: img.sampler,
        }
    }
}
