//! Debug-time precondition checks run before every creating or mutating call.
//!
//! Each `Validator` method checks one entry point. They return `true` when
//! the call may proceed. With the layer compiled out they always return
//! `true` and malformed input is the caller's problem.

use super::{
    num_faces, subimage_size, Bindings, Buffer, BufferInfo, BufferType, ContextDesc,
    GraphicsBackend, Image, ImageData, ImageInfo, ImageType, IndexType, Pass, PassInfo,
    Pipeline, PipelineInfo, PixelFormat, SamplerType, Shader, ShaderInfo, ShaderStage,
    ShaderStageInfo, Usage, VertexStep, MAX_COLOR_ATTACHMENTS, MAX_MIPMAPS,
    MAX_SHADERSTAGE_BUFFERS, MAX_TEXTUREARRAY_LAYERS,
};
use crate::utils::{Pool, ResourceState};
use thiserror::Error;

/// Whether the validation layer is compiled in.
pub const VALIDATION_ENABLED: bool = cfg!(any(debug_assertions, feature = "slotgfx-validation"));

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidateError {
    // buffer creation
    #[error("buffer size cannot be 0")]
    BufferSizeZero,
    #[error("immutable buffers must be initialized with data")]
    BufferImmutableNeedsData,
    #[error("immutable buffer data size differs from buffer size")]
    BufferDataSizeMismatch,
    #[error("dynamic/stream buffers cannot be initialized with data")]
    BufferDynamicWithData,

    // image creation
    #[error("image width must be > 0")]
    ImageWidthZero,
    #[error("image height must be > 0")]
    ImageHeightZero,
    #[error("image num_slices must be > 0")]
    ImageSlicesZero,
    #[error("image num_mipmaps must not exceed 16")]
    ImageTooManyMipmaps,
    #[error("image size exceeds the backend limit for its type")]
    ImageTooLarge,
    #[error("array images cannot have more than 128 layers")]
    ImageTooManyLayers,
    #[error("3D images are not supported by this backend")]
    Image3dUnsupported,
    #[error("array images are not supported by this backend")]
    ImageArrayUnsupported,
    #[error("MSAA images must be render targets")]
    ImageMsaaButNoRenderTarget,
    #[error("MSAA render targets are not supported for this pixel format")]
    ImageMsaaUnsupported,
    #[error("MSAA images must have a single mipmap")]
    ImageMsaaWithMipmaps,
    #[error("render target images must be immutable")]
    ImageRenderTargetNotImmutable,
    #[error("render target images cannot be initialized with data")]
    ImageRenderTargetWithData,
    #[error("pixel format {0:?} cannot be rendered to")]
    ImageFormatNotRenderable(PixelFormat),
    #[error("pixel format {0:?} cannot be sampled")]
    ImageFormatNotSampleable(PixelFormat),
    #[error("compressed images must be immutable")]
    ImageCompressedNotImmutable,
    #[error("dynamic/stream images cannot be initialized with data")]
    ImageDynamicWithData,
    #[error("missing image data for face {face}, mip {mip}")]
    ImageDataMissing { face: usize, mip: usize },
    #[error("image data for face {face}, mip {mip} is {actual} bytes, expected {expected}")]
    ImageDataSize {
        face: usize,
        mip: usize,
        expected: usize,
        actual: usize,
    },

    // shader creation
    #[error("{0:?} shader stage needs source code")]
    ShaderSourceMissing(ShaderStage),
    #[error("{0:?} shader stage needs byte code")]
    ShaderBytecodeMissing(ShaderStage),
    #[error("{0:?} shader uniform blocks must occupy consecutive slots")]
    ShaderUniformBlocksNotContiguous(ShaderStage),
    #[error("{stage:?} uniform block {block} members must occupy consecutive slots")]
    ShaderUniformsNotContiguous { stage: ShaderStage, block: usize },
    #[error("{stage:?} uniform block {block} must declare its members")]
    ShaderUniformsMissing { stage: ShaderStage, block: usize },
    #[error("{stage:?} uniform block {block} member {member} needs a name")]
    ShaderUniformNameMissing {
        stage: ShaderStage,
        block: usize,
        member: usize,
    },
    #[error("{stage:?} uniform block {block} members add up to {actual} bytes, block size is {expected}")]
    ShaderUniformBlockSize {
        stage: ShaderStage,
        block: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{0:?} shader images must occupy consecutive slots")]
    ShaderImagesNotContiguous(ShaderStage),
    #[error("vertex attribute {0} needs a semantic name")]
    ShaderAttrSemanticMissing(usize),

    // pipeline creation
    #[error("pipeline shader is not valid")]
    PipelineShaderNotValid,
    #[error("pipeline layout declares no vertex attributes")]
    PipelineNoAttrs,
    #[error("pipeline vertex attributes must occupy consecutive slots")]
    PipelineAttrsNotContiguous,
    #[error("vertex attribute {0} references a buffer slot out of range")]
    PipelineAttrBufferIndex(usize),
    #[error("vertex buffer {0} stride must be a multiple of 4")]
    PipelineStrideNotAligned(usize),
    #[error("per-instance vertex data needs instancing support")]
    PipelineInstancingUnsupported,
    #[error("pipeline color_count must be between 1 and 4")]
    PipelineColorCount,
    #[error("multiple render targets are not supported by this backend")]
    PipelineMrtUnsupported,

    // pass creation
    #[error("pass needs at least one color attachment")]
    PassNoColorAttachments,
    #[error("pass color attachments must occupy consecutive slots")]
    PassColorAttachmentsNotContiguous,
    #[error("pass attachment image is not valid")]
    PassImageNotValid,
    #[error("pass attachment image is not a render target")]
    PassImageNotRenderTarget,
    #[error("pass attachment mip level is out of range")]
    PassMipLevel,
    #[error("pass attachment slice is out of range")]
    PassSlice,
    #[error("pass color attachment format {0:?} is not renderable")]
    PassColorFormat(PixelFormat),
    #[error("pass depth-stencil attachment format {0:?} is not a depth format")]
    PassDepthFormat(PixelFormat),
    #[error("all pass attachments must have the same size")]
    PassImageSizes,
    #[error("all pass attachments must have the same sample count")]
    PassSampleCounts,

    // render commands
    #[error("{0} must be called inside a pass")]
    NotInPass(&'static str),
    #[error("begin_pass called while a pass is active")]
    PassAlreadyActive,
    #[error("commit called inside a pass")]
    CommitInPass,
    #[error("begin_pass: pass is not valid")]
    BeginPassNotValid,
    #[error("begin_pass: attachment image is no longer valid")]
    BeginPassImageNotValid,
    #[error("apply_pipeline: pipeline does not exist")]
    ApplyPipelineMissing,
    #[error("apply_pipeline: pipeline is not valid")]
    ApplyPipelineNotValid,
    #[error("apply_pipeline: pipeline shader is no longer valid")]
    ApplyPipelineShaderNotValid,
    #[error("apply_pipeline: color attachment count does not match the pass")]
    ApplyPipelineColorCount,
    #[error("apply_pipeline: color format does not match pass attachment {0}")]
    ApplyPipelineColorFormat(usize),
    #[error("apply_pipeline: depth format does not match the pass")]
    ApplyPipelineDepthFormat,
    #[error("apply_pipeline: sample count does not match the pass")]
    ApplyPipelineSampleCount,
    #[error("apply_bindings: no valid pipeline applied")]
    ApplyBindingsNoPipeline,
    #[error("apply_bindings: vertex buffer {0} is missing")]
    ApplyBindingsVertexBufferMissing(usize),
    #[error("apply_bindings: vertex buffer {0} is not valid")]
    ApplyBindingsVertexBufferNotValid(usize),
    #[error("apply_bindings: buffer in vertex slot {0} is not a vertex buffer")]
    ApplyBindingsVertexBufferType(usize),
    #[error("apply_bindings: pipeline expects an index buffer")]
    ApplyBindingsIndexBufferMissing,
    #[error("apply_bindings: pipeline does not use an index buffer")]
    ApplyBindingsIndexBufferUnexpected,
    #[error("apply_bindings: index buffer is not valid")]
    ApplyBindingsIndexBufferNotValid,
    #[error("apply_bindings: index buffer slot holds a vertex buffer")]
    ApplyBindingsIndexBufferType,
    #[error("apply_bindings: {stage:?} image {index} is missing")]
    ApplyBindingsImageMissing { stage: ShaderStage, index: usize },
    #[error("apply_bindings: {stage:?} image {index} is not valid")]
    ApplyBindingsImageNotValid { stage: ShaderStage, index: usize },
    #[error("apply_bindings: {stage:?} image {index} has the wrong image type")]
    ApplyBindingsImageType { stage: ShaderStage, index: usize },
    #[error("apply_bindings: {stage:?} image {index} pixel format does not match the sampler type")]
    ApplyBindingsImageSamplerType { stage: ShaderStage, index: usize },
    #[error("apply_bindings: {stage:?} image {index} is bound but not declared by the shader")]
    ApplyBindingsImageUnexpected { stage: ShaderStage, index: usize },
    #[error("apply_uniforms: no valid pipeline applied")]
    ApplyUniformsNoPipeline,
    #[error("apply_uniforms: {stage:?} has no uniform block {index}")]
    ApplyUniformsBlockIndex { stage: ShaderStage, index: usize },
    #[error("apply_uniforms: data is {actual} bytes, uniform block is {expected}")]
    ApplyUniformsSize { expected: usize, actual: usize },

    // dynamic updates
    #[error("update_buffer: buffer is immutable")]
    UpdateBufferImmutable,
    #[error("update_buffer: data is larger than the buffer")]
    UpdateBufferSize,
    #[error("update_buffer: only one update per buffer and frame")]
    UpdateBufferOnce,
    #[error("update_buffer: buffer was already appended to this frame")]
    UpdateBufferAfterAppend,
    #[error("append_buffer: buffer is immutable")]
    AppendBufferImmutable,
    #[error("append_buffer: buffer was already updated this frame")]
    AppendBufferAfterUpdate,
    #[error("update_image: image is immutable")]
    UpdateImageImmutable,
    #[error("update_image: only one update per image and frame")]
    UpdateImageOnce,
}

/// Accumulates the first failure of the call being validated.
#[derive(Debug)]
pub struct Validator {
    non_fatal: bool,
    first_error: Option<ValidateError>,
    last_error: Option<ValidateError>,
}

impl Validator {
    pub fn new(non_fatal: bool) -> Self {
        Self {
            non_fatal,
            first_error: None,
            last_error: None,
        }
    }

    pub fn begin(&mut self) {
        self.first_error = None;
    }

    pub fn validate(&mut self, cond: bool, err: ValidateError) {
        if !cond {
            log::error!("VALIDATION FAILED: {}", err);
            self.first_error.get_or_insert(err);
        }
    }

    /// # Panics
    /// When a check failed and validation is fatal.
    pub fn end(&mut self) -> bool {
        let Some(err) = self.first_error.take() else {
            return true;
        };
        self.last_error = Some(err);
        if !self.non_fatal {
            panic!("validation layer: {err} (aborting on first error)");
        }
        false
    }

    /// First failure of the most recent call that did not pass.
    pub fn last_error(&self) -> Option<ValidateError> {
        self.last_error
    }

    pub fn buffer_info(&mut self, info: &BufferInfo) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(info.size > 0, ValidateError::BufferSizeZero);
        if info.usage == Usage::Immutable {
            self.validate(info.data.is_some(), ValidateError::BufferImmutableNeedsData);
            if let Some(data) = info.data {
                self.validate(data.len() == info.size, ValidateError::BufferDataSizeMismatch);
            }
        } else {
            self.validate(info.data.is_none(), ValidateError::BufferDynamicWithData);
        }
        self.end()
    }

    fn image_data(
        &mut self,
        fmt: PixelFormat,
        image_type: ImageType,
        width: u32,
        height: u32,
        num_slices: u32,
        num_mipmaps: u32,
        data: &ImageData,
    ) {
        for face in 0..num_faces(image_type) {
            for mip in 0..(num_mipmaps as usize).min(MAX_MIPMAPS) {
                let Some(sub) = data.subimage[face][mip] else {
                    self.validate(false, ValidateError::ImageDataMissing { face, mip });
                    continue;
                };
                let expected =
                    subimage_size(fmt, image_type, width, height, num_slices, mip as u32);
                self.validate(
                    sub.len() == expected,
                    ValidateError::ImageDataSize {
                        face,
                        mip,
                        expected,
                        actual: sub.len(),
                    },
                );
            }
        }
    }

    /// Expects an `info` with defaults already resolved.
    pub fn image_info<B: GraphicsBackend>(&mut self, info: &ImageInfo, backend: &B) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        let features = backend.features();
        let limits = backend.limits();
        let fmt = info.pixel_format.unwrap_or_default();
        let caps = backend.pixelformat(fmt);

        self.begin();
        self.validate(info.width > 0, ValidateError::ImageWidthZero);
        self.validate(info.height > 0, ValidateError::ImageHeightZero);
        self.validate(info.num_slices > 0, ValidateError::ImageSlicesZero);
        self.validate(
            info.num_mipmaps as usize <= MAX_MIPMAPS,
            ValidateError::ImageTooManyMipmaps,
        );
        let max_dim = info.width.max(info.height);
        match info.image_type {
            ImageType::Dim2 => {
                self.validate(max_dim <= limits.max_image_size_2d, ValidateError::ImageTooLarge)
            }
            ImageType::Cube => {
                self.validate(max_dim <= limits.max_image_size_cube, ValidateError::ImageTooLarge)
            }
            ImageType::Dim3 => {
                self.validate(features.imagetype_3d, ValidateError::Image3dUnsupported);
                self.validate(
                    max_dim.max(info.num_slices) <= limits.max_image_size_3d,
                    ValidateError::ImageTooLarge,
                );
            }
            ImageType::Array => {
                self.validate(features.imagetype_array, ValidateError::ImageArrayUnsupported);
                self.validate(max_dim <= limits.max_image_size_array, ValidateError::ImageTooLarge);
                self.validate(
                    info.num_slices <= MAX_TEXTUREARRAY_LAYERS
                        && info.num_slices <= limits.max_image_array_layers,
                    ValidateError::ImageTooManyLayers,
                );
            }
        }

        if info.sample_count > 1 {
            self.validate(info.render_target, ValidateError::ImageMsaaButNoRenderTarget);
            self.validate(
                features.msaa_render_targets && caps.msaa,
                ValidateError::ImageMsaaUnsupported,
            );
            self.validate(info.num_mipmaps == 1, ValidateError::ImageMsaaWithMipmaps);
        }

        if info.render_target {
            self.validate(
                info.usage == Usage::Immutable,
                ValidateError::ImageRenderTargetNotImmutable,
            );
            self.validate(
                info.data.total_size() == 0,
                ValidateError::ImageRenderTargetWithData,
            );
            self.validate(
                caps.render || caps.depth,
                ValidateError::ImageFormatNotRenderable(fmt),
            );
        } else {
            self.validate(caps.sample, ValidateError::ImageFormatNotSampleable(fmt));
            if fmt.is_compressed() {
                self.validate(
                    info.usage == Usage::Immutable,
                    ValidateError::ImageCompressedNotImmutable,
                );
            }
            if info.usage == Usage::Immutable {
                self.image_data(
                    fmt,
                    info.image_type,
                    info.width,
                    info.height,
                    info.num_slices,
                    info.num_mipmaps,
                    &info.data,
                );
            } else {
                self.validate(
                    info.data.total_size() == 0,
                    ValidateError::ImageDynamicWithData,
                );
            }
        }
        self.end()
    }

    fn shader_stage<B: GraphicsBackend>(
        &mut self,
        stage: ShaderStage,
        info: &ShaderStageInfo,
        backend: &B,
    ) {
        let features = backend.features();
        if features.shader_bytecode {
            self.validate(
                info.bytecode.is_some(),
                ValidateError::ShaderBytecodeMissing(stage),
            );
        } else {
            self.validate(info.source.is_some(), ValidateError::ShaderSourceMissing(stage));
        }

        let mut blocks_done = false;
        for (block, ub) in info.uniform_blocks.iter().enumerate() {
            if ub.size == 0 {
                blocks_done = true;
                continue;
            }
            self.validate(
                !blocks_done,
                ValidateError::ShaderUniformBlocksNotContiguous(stage),
            );

            let mut members_done = false;
            let mut num_members = 0;
            let mut members_size = 0;
            for (member, u) in ub.uniforms.iter().enumerate() {
                let Some(ty) = u.uniform_type else {
                    members_done = true;
                    continue;
                };
                self.validate(
                    !members_done,
                    ValidateError::ShaderUniformsNotContiguous { stage, block },
                );
                if features.uniform_names {
                    self.validate(
                        !u.name.is_empty(),
                        ValidateError::ShaderUniformNameMissing {
                            stage,
                            block,
                            member,
                        },
                    );
                }
                num_members += 1;
                members_size += ty.byte_size(u.array_count);
            }
            if features.uniform_names {
                self.validate(
                    num_members > 0,
                    ValidateError::ShaderUniformsMissing { stage, block },
                );
            }
            if num_members > 0 {
                self.validate(
                    members_size == ub.size,
                    ValidateError::ShaderUniformBlockSize {
                        stage,
                        block,
                        expected: ub.size,
                        actual: members_size,
                    },
                );
            }
        }

        let mut images_done = false;
        for img in info.images.iter() {
            if img.image_type.is_none() {
                images_done = true;
                continue;
            }
            self.validate(!images_done, ValidateError::ShaderImagesNotContiguous(stage));
        }
    }

    pub fn shader_info<B: GraphicsBackend>(&mut self, info: &ShaderInfo, backend: &B) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.shader_stage(ShaderStage::Vertex, &info.vs, backend);
        self.shader_stage(ShaderStage::Fragment, &info.fs, backend);
        if backend.features().attr_semantics {
            for (i, attr) in info.attrs.iter().enumerate() {
                if !attr.name.is_empty() {
                    self.validate(
                        !attr.sem_name.is_empty(),
                        ValidateError::ShaderAttrSemanticMissing(i),
                    );
                }
            }
        }
        self.end()
    }

    /// Expects an `info` with defaults already resolved.
    pub fn pipeline_info<B: GraphicsBackend>(
        &mut self,
        info: &PipelineInfo,
        shader: Option<&Shader>,
        backend: &B,
    ) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        let features = backend.features();
        self.begin();
        self.validate(
            shader.is_some_and(|s| s.slot.state == ResourceState::Valid),
            ValidateError::PipelineShaderNotValid,
        );

        let attrs = &info.layout.attrs;
        self.validate(attrs[0].format.is_some(), ValidateError::PipelineNoAttrs);
        let mut attrs_done = false;
        for (i, attr) in attrs.iter().enumerate() {
            if attr.format.is_none() {
                attrs_done = true;
                continue;
            }
            self.validate(!attrs_done, ValidateError::PipelineAttrsNotContiguous);
            self.validate(
                attr.buffer_index < MAX_SHADERSTAGE_BUFFERS,
                ValidateError::PipelineAttrBufferIndex(i),
            );
        }
        for (i, buf) in info.layout.buffers.iter().enumerate() {
            self.validate(buf.stride % 4 == 0, ValidateError::PipelineStrideNotAligned(i));
            if buf.step_func == VertexStep::PerInstance && buf.stride > 0 {
                self.validate(features.instancing, ValidateError::PipelineInstancingUnsupported);
            }
        }

        self.validate(
            (1..=MAX_COLOR_ATTACHMENTS).contains(&info.color_count),
            ValidateError::PipelineColorCount,
        );
        if info.color_count > 1 {
            self.validate(
                features.multiple_render_targets,
                ValidateError::PipelineMrtUnsupported,
            );
        }
        self.end()
    }

    pub fn pass_info<B: GraphicsBackend>(
        &mut self,
        info: &PassInfo,
        images: &Pool<Image>,
        backend: &B,
    ) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(
            info.color_attachments[0].image.valid(),
            ValidateError::PassNoColorAttachments,
        );

        let mut size: Option<(u32, u32)> = None;
        let mut sample_count: Option<u32> = None;
        let mut atts_done = false;
        let colors = info.color_attachments.iter().map(|a| (a, false));
        let depth = std::iter::once((&info.depth_stencil_attachment, true));
        for (att, is_depth) in colors.chain(depth) {
            if !att.image.valid() {
                if !is_depth {
                    atts_done = true;
                }
                continue;
            }
            if !is_depth {
                self.validate(!atts_done, ValidateError::PassColorAttachmentsNotContiguous);
            }
            let Some(img) = images
                .lookup(att.image)
                .filter(|img| img.slot.state == ResourceState::Valid)
            else {
                self.validate(false, ValidateError::PassImageNotValid);
                continue;
            };
            self.validate(img.render_target, ValidateError::PassImageNotRenderTarget);
            self.validate(att.mip_level < img.num_mipmaps, ValidateError::PassMipLevel);
            let num_slices = match img.image_type {
                ImageType::Cube => num_faces(img.image_type) as u32,
                ImageType::Dim3 | ImageType::Array => img.num_slices,
                ImageType::Dim2 => 1,
            };
            self.validate(att.slice < num_slices, ValidateError::PassSlice);

            let caps = backend.pixelformat(img.pixel_format);
            if is_depth {
                self.validate(
                    img.pixel_format.is_depth() && caps.depth,
                    ValidateError::PassDepthFormat(img.pixel_format),
                );
            } else {
                self.validate(
                    !img.pixel_format.is_depth() && caps.render,
                    ValidateError::PassColorFormat(img.pixel_format),
                );
            }

            let mip_size = (
                (img.width >> att.mip_level).max(1),
                (img.height >> att.mip_level).max(1),
            );
            self.validate(
                *size.get_or_insert(mip_size) == mip_size,
                ValidateError::PassImageSizes,
            );
            self.validate(
                *sample_count.get_or_insert(img.sample_count) == img.sample_count,
                ValidateError::PassSampleCounts,
            );
        }
        self.end()
    }

    pub fn begin_pass(&mut self, in_pass: bool, pass: Option<&Pass>, images: &Pool<Image>) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(!in_pass, ValidateError::PassAlreadyActive);
        match pass {
            Some(pass) if pass.slot.state == ResourceState::Valid => {
                let atts = pass.color_atts[..pass.num_color_atts]
                    .iter()
                    .chain(std::iter::once(&pass.ds_att))
                    .filter(|a| a.image.valid());
                for att in atts {
                    self.validate(
                        images.state(att.image) == ResourceState::Valid,
                        ValidateError::BeginPassImageNotValid,
                    );
                }
            }
            _ => self.validate(false, ValidateError::BeginPassNotValid),
        }
        self.end()
    }

    pub fn begin_default_pass(&mut self, in_pass: bool) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(!in_pass, ValidateError::PassAlreadyActive);
        self.end()
    }

    /// Checks that a command issued outside of any creation call happens
    /// inside a pass.
    pub fn in_pass(&mut self, in_pass: bool, call: &'static str) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(in_pass, ValidateError::NotInPass(call));
        self.end()
    }

    pub fn commit(&mut self, in_pass: bool) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(!in_pass, ValidateError::CommitInPass);
        self.end()
    }

    /// `pass` is `None` while rendering to the default framebuffer.
    pub fn apply_pipeline(
        &mut self,
        in_pass: bool,
        pipeline: Option<&Pipeline>,
        shader: Option<&Shader>,
        pass: Option<&Pass>,
        ctx: &ContextDesc,
    ) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(in_pass, ValidateError::NotInPass("apply_pipeline"));
        let Some(pip) = pipeline else {
            self.validate(false, ValidateError::ApplyPipelineMissing);
            return self.end();
        };
        self.validate(
            pip.slot.state == ResourceState::Valid,
            ValidateError::ApplyPipelineNotValid,
        );
        self.validate(
            shader.is_some_and(|s| s.slot.state == ResourceState::Valid),
            ValidateError::ApplyPipelineShaderNotValid,
        );
        if pip.slot.state != ResourceState::Valid {
            return self.end();
        }

        match pass {
            Some(pass) => {
                self.validate(
                    pip.color_count == pass.num_color_atts,
                    ValidateError::ApplyPipelineColorCount,
                );
                for i in 0..pip.color_count.min(pass.num_color_atts) {
                    self.validate(
                        pip.color_formats[i] == pass.color_atts[i].pixel_format,
                        ValidateError::ApplyPipelineColorFormat(i),
                    );
                }
                self.validate(
                    pip.depth_format == pass.ds_att.pixel_format,
                    ValidateError::ApplyPipelineDepthFormat,
                );
                self.validate(
                    pip.sample_count == pass.sample_count,
                    ValidateError::ApplyPipelineSampleCount,
                );
            }
            None => {
                self.validate(pip.color_count == 1, ValidateError::ApplyPipelineColorCount);
                self.validate(
                    pip.color_formats[0] == ctx.color(),
                    ValidateError::ApplyPipelineColorFormat(0),
                );
                self.validate(
                    pip.depth_format == ctx.depth(),
                    ValidateError::ApplyPipelineDepthFormat,
                );
                self.validate(
                    pip.sample_count == ctx.sample_count.max(1),
                    ValidateError::ApplyPipelineSampleCount,
                );
            }
        }
        self.end()
    }

    pub fn apply_bindings(
        &mut self,
        in_pass: bool,
        bindings: &Bindings,
        pipeline: Option<&Pipeline>,
        shader: Option<&Shader>,
        buffers: &Pool<Buffer>,
        images: &Pool<Image>,
    ) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(in_pass, ValidateError::NotInPass("apply_bindings"));
        let (Some(pip), Some(shd)) = (
            pipeline.filter(|p| p.slot.state == ResourceState::Valid),
            shader.filter(|s| s.slot.state == ResourceState::Valid),
        ) else {
            self.validate(false, ValidateError::ApplyBindingsNoPipeline);
            return self.end();
        };

        for (i, &needed) in pip.vertex_buffer_layout_active.iter().enumerate() {
            let handle = bindings.vertex_buffers[i];
            if !needed {
                continue;
            }
            self.validate(handle.valid(), ValidateError::ApplyBindingsVertexBufferMissing(i));
            if !handle.valid() {
                continue;
            }
            match buffers.lookup(handle) {
                Some(buf) if buf.slot.state == ResourceState::Valid => self.validate(
                    buf.buffer_type == BufferType::VertexBuffer,
                    ValidateError::ApplyBindingsVertexBufferType(i),
                ),
                _ => self.validate(false, ValidateError::ApplyBindingsVertexBufferNotValid(i)),
            }
        }

        if pip.index_type == IndexType::None {
            self.validate(
                !bindings.index_buffer.valid(),
                ValidateError::ApplyBindingsIndexBufferUnexpected,
            );
        } else {
            self.validate(
                bindings.index_buffer.valid(),
                ValidateError::ApplyBindingsIndexBufferMissing,
            );
        }
        if bindings.index_buffer.valid() {
            match buffers.lookup(bindings.index_buffer) {
                Some(buf) if buf.slot.state == ResourceState::Valid => self.validate(
                    buf.buffer_type == BufferType::IndexBuffer,
                    ValidateError::ApplyBindingsIndexBufferType,
                ),
                _ => self.validate(false, ValidateError::ApplyBindingsIndexBufferNotValid),
            }
        }

        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            let layout = &shd.stage[stage.index()];
            for (index, &handle) in bindings.images(stage).iter().enumerate() {
                if index >= layout.num_images {
                    self.validate(
                        !handle.valid(),
                        ValidateError::ApplyBindingsImageUnexpected { stage, index },
                    );
                    continue;
                }
                self.validate(
                    handle.valid(),
                    ValidateError::ApplyBindingsImageMissing { stage, index },
                );
                if !handle.valid() {
                    continue;
                }
                let Some(img) = images
                    .lookup(handle)
                    .filter(|img| img.slot.state == ResourceState::Valid)
                else {
                    self.validate(false, ValidateError::ApplyBindingsImageNotValid { stage, index });
                    continue;
                };
                let expected = layout.images[index];
                self.validate(
                    img.image_type == expected.image_type,
                    ValidateError::ApplyBindingsImageType { stage, index },
                );
                let sampler_ok = match expected.sampler_type {
                    SamplerType::Float => !img.pixel_format.is_integer(),
                    SamplerType::SInt | SamplerType::UInt => img.pixel_format.is_integer(),
                };
                self.validate(
                    sampler_ok,
                    ValidateError::ApplyBindingsImageSamplerType { stage, index },
                );
            }
        }
        self.end()
    }

    pub fn apply_uniforms(
        &mut self,
        in_pass: bool,
        stage: ShaderStage,
        ub_index: usize,
        data: &[u8],
        shader: Option<&Shader>,
    ) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(in_pass, ValidateError::NotInPass("apply_uniforms"));
        let Some(shd) = shader else {
            self.validate(false, ValidateError::ApplyUniformsNoPipeline);
            return self.end();
        };
        let layout = &shd.stage[stage.index()];
        if ub_index >= layout.num_uniform_blocks {
            self.validate(
                false,
                ValidateError::ApplyUniformsBlockIndex {
                    stage,
                    index: ub_index,
                },
            );
            return self.end();
        }
        let expected = layout.uniform_blocks[ub_index].size;
        self.validate(
            data.len() == expected,
            ValidateError::ApplyUniformsSize {
                expected,
                actual: data.len(),
            },
        );
        self.end()
    }

    pub fn update_buffer(&mut self, buf: &Buffer, data: &[u8], frame_index: u32) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(buf.usage != Usage::Immutable, ValidateError::UpdateBufferImmutable);
        self.validate(data.len() <= buf.size, ValidateError::UpdateBufferSize);
        self.validate(
            buf.update_frame_index != frame_index,
            ValidateError::UpdateBufferOnce,
        );
        self.validate(
            buf.append_frame_index != frame_index,
            ValidateError::UpdateBufferAfterAppend,
        );
        self.end()
    }

    pub fn append_buffer(&mut self, buf: &Buffer, frame_index: u32) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(buf.usage != Usage::Immutable, ValidateError::AppendBufferImmutable);
        self.validate(
            buf.update_frame_index != frame_index,
            ValidateError::AppendBufferAfterUpdate,
        );
        self.end()
    }

    pub fn update_image(&mut self, img: &Image, data: &ImageData, frame_index: u32) -> bool {
        if !VALIDATION_ENABLED {
            return true;
        }
        self.begin();
        self.validate(img.usage != Usage::Immutable, ValidateError::UpdateImageImmutable);
        self.validate(
            img.update_frame_index != frame_index,
            ValidateError::UpdateImageOnce,
        );
        self.image_data(
            img.pixel_format,
            img.image_type,
            img.width,
            img.height,
            img.num_slices,
            img.num_mipmaps,
            data,
        );
        self.end()
    }
}
