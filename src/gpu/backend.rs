use super::{
    Buffer, Context, Desc, Image, ImageData, ImageInfo, Pass, PassAction, PassInfo, Pipeline,
    PipelineInfo, PixelFormat, SamplerCacheKey, SamplerId, Shader, ShaderInfo, ShaderStage,
    BufferInfo,
};
use crate::utils::ResourceState;

#[cfg(feature = "slotgfx-serde")]
use serde::{Deserialize, Serialize};

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum BackendKind {
    Null,
    GlCore33,
    Gles3,
    D3D11,
    MetalMacos,
    MetalIos,
    WebGpu,
}

/// Optional capabilities plus the shader conventions a backend expects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct Features {
    pub instancing: bool,
    pub origin_top_left: bool,
    pub multiple_render_targets: bool,
    pub msaa_render_targets: bool,
    pub imagetype_3d: bool,
    pub imagetype_array: bool,
    pub image_clamp_to_border: bool,
    pub mrt_independent_blend_state: bool,
    pub mrt_independent_write_mask: bool,
    /// Shaders are created from byte code rather than source.
    pub shader_bytecode: bool,
    /// Uniform block members are bound by name, so they must be declared.
    pub uniform_names: bool,
    /// Vertex attributes are matched by semantic name.
    pub attr_semantics: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct Limits {
    pub max_image_size_2d: u32,
    pub max_image_size_cube: u32,
    pub max_image_size_3d: u32,
    pub max_image_size_array: u32,
    pub max_image_array_layers: u32,
    pub max_vertex_attrs: u32,
}

/// What a backend can do with a pixel format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct PixelFormatInfo {
    pub sample: bool,
    pub filter: bool,
    pub render: bool,
    pub blend: bool,
    pub msaa: bool,
    pub depth: bool,
}

/// Resolved, state-checked records for one `apply_bindings` call.
pub struct BindingsRef<'a> {
    pub pipeline: &'a Pipeline,
    pub vertex_buffers: &'a [&'a Buffer],
    pub vertex_buffer_offsets: &'a [u32],
    pub index_buffer: Option<&'a Buffer>,
    pub index_buffer_offset: u32,
    pub vs_images: &'a [&'a Image],
    pub fs_images: &'a [&'a Image],
}

/// The interface a native graphics API translation layer implements.
///
/// The [`Device`](super::Device) owns every piece of bookkeeping (handles,
/// lifecycle, validation, frame pipelining, sampler deduplication) and calls
/// into the backend only with records that passed those checks. Creation
/// entry points report `Valid` or `Failed`; everything else is infallible
/// from the device's point of view.
///
/// # Examples
/// ```ignore
/// use slotgfx::{Desc, Device, GraphicsBackend};
/// fn init<B: GraphicsBackend>(backend: B) {
///     let device = Device::new(&Desc::default(), backend).unwrap();
///     let _ = device.shutdown();
/// }
/// ```
pub trait GraphicsBackend {
    fn kind(&self) -> BackendKind;
    fn features(&self) -> Features;
    fn limits(&self) -> Limits;
    fn pixelformat(&self, fmt: PixelFormat) -> PixelFormatInfo;

    /// Called once by `Device::new` with the resolved configuration.
    fn setup(&mut self, desc: &Desc);
    /// Called once by `Device::shutdown` after every resource is gone.
    fn discard(&mut self);

    fn create_context(&mut self, ctx: &mut Context) -> ResourceState;
    fn destroy_context(&mut self, ctx: &mut Context);
    fn activate_context(&mut self, ctx: Option<&Context>);

    fn create_buffer(&mut self, buf: &mut Buffer, info: &BufferInfo) -> ResourceState;
    fn destroy_buffer(&mut self, buf: &mut Buffer);
    /// Overwrite `buf.active_slot` with `data`.
    fn update_buffer(&mut self, buf: &mut Buffer, data: &[u8]);
    /// Copy `data` into `buf.active_slot` at `buf.append_pos`; returns the
    /// number of bytes written.
    fn append_buffer(&mut self, buf: &mut Buffer, data: &[u8], new_frame: bool) -> usize;

    /// Returns `None` when the sampler could not be created.
    fn create_sampler(&mut self, key: &SamplerCacheKey) -> Option<SamplerId>;
    fn destroy_sampler(&mut self, sampler: SamplerId);

    fn create_image(&mut self, img: &mut Image, info: &ImageInfo) -> ResourceState;
    fn destroy_image(&mut self, img: &mut Image);
    /// Overwrite `img.active_slot` with `data`.
    fn update_image(&mut self, img: &mut Image, data: &ImageData);

    fn create_shader(&mut self, shd: &mut Shader, info: &ShaderInfo) -> ResourceState;
    fn destroy_shader(&mut self, shd: &mut Shader);

    fn create_pipeline(
        &mut self,
        pip: &mut Pipeline,
        shd: &Shader,
        info: &PipelineInfo,
    ) -> ResourceState;
    fn destroy_pipeline(&mut self, pip: &mut Pipeline);

    fn create_pass(
        &mut self,
        pass: &mut Pass,
        color_images: &[&Image],
        ds_image: Option<&Image>,
        info: &PassInfo,
    ) -> ResourceState;
    fn destroy_pass(&mut self, pass: &mut Pass);

    /// `pass` is `None` for the default framebuffer.
    fn begin_pass(&mut self, pass: Option<&Pass>, action: &PassAction, width: u32, height: u32);
    fn end_pass(&mut self);
    fn apply_viewport(&mut self, x: i32, y: i32, width: i32, height: i32, origin_top_left: bool);
    fn apply_scissor_rect(&mut self, x: i32, y: i32, width: i32, height: i32, origin_top_left: bool);
    fn apply_pipeline(&mut self, pip: &Pipeline);
    fn apply_bindings(&mut self, bindings: &BindingsRef);
    fn apply_uniforms(&mut self, stage: ShaderStage, ub_index: usize, data: &[u8]);
    fn draw(&mut self, base_element: u32, num_elements: u32, num_instances: u32);
    /// End of frame.
    fn commit(&mut self);
    fn reset_state_cache(&mut self);

    fn push_debug_group(&mut self, _name: &str) {}
    fn pop_debug_group(&mut self) {}
}
