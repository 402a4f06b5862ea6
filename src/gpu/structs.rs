use super::{
    Buffer, Image, PixelFormat, Shader, UniformType, VertexFormat, CUBEFACE_NUM,
    MAX_COLOR_ATTACHMENTS, MAX_MIPMAPS, MAX_SHADERSTAGE_BUFFERS, MAX_SHADERSTAGE_IMAGES,
    MAX_SHADERSTAGE_UBS, MAX_UB_MEMBERS, MAX_VERTEX_ATTRIBUTES,
};
use crate::utils::Handle;
use bitflags::bitflags;

#[cfg(feature = "slotgfx-serde")]
use serde::{Deserialize, Serialize};

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum Usage {
    /// Written once at creation.
    #[default]
    Immutable,
    /// Rewritten occasionally by the CPU.
    Dynamic,
    /// Rewritten every frame by the CPU.
    Stream,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum BufferType {
    #[default]
    VertexBuffer,
    IndexBuffer,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum IndexType {
    #[default]
    None,
    U16,
    U32,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum ImageType {
    #[default]
    Dim2,
    Cube,
    Dim3,
    Array,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum SamplerType {
    #[default]
    Float,
    SInt,
    UInt,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum Wrap {
    #[default]
    Repeat,
    ClampToEdge,
    ClampToBorder,
    MirroredRepeat,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum BorderColor {
    #[default]
    TransparentBlack,
    OpaqueBlack,
    OpaqueWhite,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn index(self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Fragment => 1,
        }
    }
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum VertexStep {
    #[default]
    PerVertex,
    PerInstance,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum FaceWinding {
    #[default]
    Ccw,
    Cw,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrClamp,
    DecrClamp,
    Invert,
    IncrWrap,
    DecrWrap,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturated,
    BlendColor,
    OneMinusBlendColor,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
}

#[derive(Hash, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum LoadOp {
    #[default]
    Clear,
    Load,
    DontCare,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorMask: u8 {
        const R = 0x1;
        const G = 0x2;
        const B = 0x4;
        const A = 0x8;
        const RGB = Self::R.bits() | Self::G.bits() | Self::B.bits();
        const RGBA = Self::RGB.bits() | Self::A.bits();
    }
}

impl Default for ColorMask {
    fn default() -> Self {
        ColorMask::RGBA
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/////////////////////////////////////////////////////////////////////////////////
// Setup
/////////////////////////////////////////////////////////////////////////////////

/// Properties of the default framebuffer rendered to by `begin_default_pass`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct ContextDesc {
    pub color_format: Option<PixelFormat>,
    pub depth_format: Option<PixelFormat>,
    pub sample_count: u32,
}

/// Device configuration. Every zero / `None` field is replaced by its
/// default in [`Desc::resolved`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct Desc {
    pub buffer_pool_size: usize,
    pub image_pool_size: usize,
    pub shader_pool_size: usize,
    pub pipeline_pool_size: usize,
    pub pass_pool_size: usize,
    pub context_pool_size: usize,
    pub uniform_buffer_size: usize,
    pub staging_buffer_size: usize,
    pub sampler_cache_size: usize,
    /// Log failed validation and degrade to a no-op instead of panicking.
    pub non_fatal_validation: bool,
    pub context: ContextDesc,
}

/////////////////////////////////////////////////////////////////////////////////
// Buffers and images
/////////////////////////////////////////////////////////////////////////////////

#[derive(Hash, Clone, Copy, Debug, Default)]
pub struct BufferInfo<'a> {
    pub debug_name: &'a str,
    pub size: usize,
    pub buffer_type: BufferType,
    pub usage: Usage,
    pub data: Option<&'a [u8]>,
}

/// Content for every face and mip level of an image; 3D and array images
/// put all slices of a mip level in one slice.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageData<'a> {
    pub subimage: [[Option<&'a [u8]>; MAX_MIPMAPS]; CUBEFACE_NUM],
}

impl<'a> ImageData<'a> {
    /// Content for a single-face, single-mip image.
    pub fn single(data: &'a [u8]) -> Self {
        let mut d = Self::default();
        d.subimage[0][0] = Some(data);
        d
    }

    pub fn total_size(&self) -> usize {
        self.subimage
            .iter()
            .flat_map(|face| face.iter())
            .filter_map(|s| s.map(|s| s.len()))
            .sum()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ImageInfo<'a> {
    pub debug_name: &'a str,
    pub image_type: ImageType,
    pub render_target: bool,
    pub width: u32,
    pub height: u32,
    /// Depth for 3D images, layer count for array images.
    pub num_slices: u32,
    pub num_mipmaps: u32,
    pub usage: Usage,
    pub pixel_format: Option<PixelFormat>,
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
    pub data: ImageData<'a>,
}

/////////////////////////////////////////////////////////////////////////////////
// Shaders
/////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderUniformInfo<'a> {
    pub name: &'a str,
    /// `None` marks an unused member slot.
    pub uniform_type: Option<UniformType>,
    pub array_count: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderUniformBlockInfo<'a> {
    /// 0 marks an unused block slot.
    pub size: usize,
    pub uniforms: [ShaderUniformInfo<'a>; MAX_UB_MEMBERS],
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderImageInfo<'a> {
    pub name: &'a str,
    /// `None` marks an unused image slot.
    pub image_type: Option<ImageType>,
    pub sampler_type: SamplerType,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderStageInfo<'a> {
    pub source: Option<&'a str>,
    pub bytecode: Option<&'a [u8]>,
    pub entry: &'a str,
    pub uniform_blocks: [ShaderUniformBlockInfo<'a>; MAX_SHADERSTAGE_UBS],
    pub images: [ShaderImageInfo<'a>; MAX_SHADERSTAGE_IMAGES],
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderAttrInfo<'a> {
    pub name: &'a str,
    pub sem_name: &'a str,
    pub sem_index: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderInfo<'a> {
    pub debug_name: &'a str,
    pub attrs: [ShaderAttrInfo<'a>; MAX_VERTEX_ATTRIBUTES],
    pub vs: ShaderStageInfo<'a>,
    pub fs: ShaderStageInfo<'a>,
}

impl<'a> ShaderInfo<'a> {
    pub fn stage(&self, stage: ShaderStage) -> &ShaderStageInfo<'a> {
        match stage {
            ShaderStage::Vertex => &self.vs,
            ShaderStage::Fragment => &self.fs,
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////
// Pipelines
/////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferLayoutInfo {
    pub stride: u32,
    pub step_func: VertexStep,
    pub step_rate: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexAttrInfo {
    pub buffer_index: usize,
    pub offset: u32,
    /// `None` marks an unused attribute slot.
    pub format: Option<VertexFormat>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutInfo {
    pub buffers: [BufferLayoutInfo; MAX_SHADERSTAGE_BUFFERS],
    pub attrs: [VertexAttrInfo; MAX_VERTEX_ATTRIBUTES],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StencilFaceState {
    pub compare: CompareFunc,
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StencilState {
    pub enabled: bool,
    pub front: StencilFaceState,
    pub back: StencilFaceState,
    pub read_mask: u8,
    pub write_mask: u8,
    pub reference: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DepthState {
    /// `None` selects the default framebuffer's depth format.
    pub pixel_format: Option<PixelFormat>,
    pub compare: CompareFunc,
    pub write_enabled: bool,
    pub bias: f32,
    pub bias_slope_scale: f32,
    pub bias_clamp: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendState {
    pub enabled: bool,
    pub src_factor_rgb: BlendFactor,
    pub dst_factor_rgb: BlendFactor,
    pub op_rgb: BlendOp,
    pub src_factor_alpha: BlendFactor,
    pub dst_factor_alpha: BlendFactor,
    pub op_alpha: BlendOp,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            src_factor_rgb: BlendFactor::One,
            dst_factor_rgb: BlendFactor::Zero,
            op_rgb: BlendOp::Add,
            src_factor_alpha: BlendFactor::One,
            dst_factor_alpha: BlendFactor::Zero,
            op_alpha: BlendOp::Add,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorState {
    /// `None` selects the default framebuffer's color format.
    pub pixel_format: Option<PixelFormat>,
    pub write_mask: ColorMask,
    pub blend: BlendState,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineInfo<'a> {
    pub debug_name: &'a str,
    pub shader: Handle<Shader>,
    pub layout: LayoutInfo,
    pub depth: DepthState,
    pub stencil: StencilState,
    pub color_count: usize,
    pub colors: [ColorState; MAX_COLOR_ATTACHMENTS],
    pub primitive_type: PrimitiveType,
    pub index_type: IndexType,
    pub cull_mode: CullMode,
    pub face_winding: FaceWinding,
    pub sample_count: u32,
    pub blend_color: Color,
    pub alpha_to_coverage_enabled: bool,
}

/////////////////////////////////////////////////////////////////////////////////
// Passes and per-frame state
/////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassAttachmentInfo {
    pub image: Handle<Image>,
    pub mip_level: u32,
    /// Cube face, array layer or 3D depth slice.
    pub slice: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PassInfo<'a> {
    pub debug_name: &'a str,
    pub color_attachments: [PassAttachmentInfo; MAX_COLOR_ATTACHMENTS],
    pub depth_stencil_attachment: PassAttachmentInfo,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorAttachmentAction {
    pub action: LoadOp,
    pub value: Color,
}

impl Default for ColorAttachmentAction {
    fn default() -> Self {
        Self {
            action: LoadOp::Clear,
            value: Color::new(0.5, 0.5, 0.5, 1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthAttachmentAction {
    pub action: LoadOp,
    pub value: f32,
}

impl Default for DepthAttachmentAction {
    fn default() -> Self {
        Self {
            action: LoadOp::Clear,
            value: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StencilAttachmentAction {
    pub action: LoadOp,
    pub value: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PassAction {
    pub colors: [ColorAttachmentAction; MAX_COLOR_ATTACHMENTS],
    pub depth: DepthAttachmentAction,
    pub stencil: StencilAttachmentAction,
}

/// Resources bound for the next draw calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    pub vertex_buffers: [Handle<Buffer>; MAX_SHADERSTAGE_BUFFERS],
    pub vertex_buffer_offsets: [u32; MAX_SHADERSTAGE_BUFFERS],
    pub index_buffer: Handle<Buffer>,
    pub index_buffer_offset: u32,
    pub vs_images: [Handle<Image>; MAX_SHADERSTAGE_IMAGES],
    pub fs_images: [Handle<Image>; MAX_SHADERSTAGE_IMAGES],
}

impl Bindings {
    pub fn images(&self, stage: ShaderStage) -> &[Handle<Image>; MAX_SHADERSTAGE_IMAGES] {
        match stage {
            ShaderStage::Vertex => &self.vs_images,
            ShaderStage::Fragment => &self.fs_images,
        }
    }
}
