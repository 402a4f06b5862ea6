//! alloc → init → valid/failed → uninit → dealloc for every resource kind.

use super::{
    Buffer, BufferInfo, BufferStatus, Device, GPUError, GraphicsBackend, Image, ImageInfo,
    ImageStatus, Pass, PassAttachment, PassInfo, Pipeline, PipelineInfo, PixelFormat, Pools,
    Result, SamplerCacheKey, SamplerId, Shader, ShaderImage, ShaderInfo, ShaderStage,
    ShaderStageInfo, ShaderStageLayout, ShaderUniformBlock, SlotInfo, Usage, VertexStep,
    MAX_SHADERSTAGE_BUFFERS, NUM_INFLIGHT_FRAMES,
};
use crate::utils::{Handle, Pool, Resource, ResourceState};

/// A resource kind the device keeps in one of its pools.
pub(crate) trait PooledResource: Resource + Sized {
    fn pool(pools: &Pools) -> &Pool<Self>;
    fn pool_mut(pools: &mut Pools) -> &mut Pool<Self>;
    /// Destroy the backend object behind `record`.
    fn release<B: GraphicsBackend>(backend: &mut B, record: &mut Self);
}

macro_rules! impl_pooled {
    ($ty:ty, $field:ident, $destroy:ident) => {
        impl PooledResource for $ty {
            fn pool(pools: &Pools) -> &Pool<Self> {
                &pools.$field
            }

            fn pool_mut(pools: &mut Pools) -> &mut Pool<Self> {
                &mut pools.$field
            }

            fn release<B: GraphicsBackend>(backend: &mut B, record: &mut Self) {
                backend.$destroy(record);
            }
        }
    };
}

impl_pooled!(Buffer, buffers, destroy_buffer);
impl_pooled!(Image, images, destroy_image);
impl_pooled!(Shader, shaders, destroy_shader);
impl_pooled!(Pipeline, pipelines, destroy_pipeline);
impl_pooled!(Pass, passes, destroy_pass);

fn num_slots(usage: Usage) -> usize {
    match usage {
        Usage::Immutable => 1,
        Usage::Dynamic | Usage::Stream => NUM_INFLIGHT_FRAMES,
    }
}

fn has_backend_object(state: ResourceState) -> bool {
    matches!(state, ResourceState::Valid | ResourceState::Failed)
}

// Generic state machine.
impl<B: GraphicsBackend> Device<B> {
    fn alloc_resource<T: PooledResource>(&mut self) -> Handle<T> {
        let ctx_id = self.active_context.raw();
        let pool = T::pool_mut(&mut self.pools);
        let Some(handle) = pool.alloc() else {
            log::error!("slotgfx: {} pool exhausted", T::KIND);
            return Handle::INVALID;
        };
        if let Some(record) = pool.lookup_mut(handle) {
            record.slot_mut().ctx_id = ctx_id;
        }
        log::debug!("slotgfx: alloc {} {:?}", T::KIND, handle);
        handle
    }

    /// The handle must be live and in `Alloc`.
    fn check_alloc_state<T: PooledResource>(&self, handle: Handle<T>, call: &str) -> Result<()> {
        let state = T::pool(&self.pools).state(handle);
        match state {
            ResourceState::Alloc => Ok(()),
            ResourceState::Invalid => {
                log::warn!("slotgfx: {} with dead {} {:?}", call, T::KIND, handle);
                Err(GPUError::InvalidHandle)
            }
            _ => {
                log::warn!(
                    "slotgfx: {} on {} {:?} in state {:?}",
                    call,
                    T::KIND,
                    handle,
                    state
                );
                Err(GPUError::InvalidState(state))
            }
        }
    }

    fn fail_resource<T: PooledResource>(&mut self, handle: Handle<T>) -> Result<()> {
        self.check_alloc_state(handle, "fail")?;
        let ctx_id = self.active_context.raw();
        let record = T::pool_mut(&mut self.pools)
            .lookup_mut(handle)
            .ok_or(GPUError::InvalidHandle)?;
        let slot = record.slot_mut();
        slot.ctx_id = ctx_id;
        slot.state = ResourceState::Failed;
        Ok(())
    }

    fn uninit_resource<T: PooledResource>(&mut self, handle: Handle<T>) -> Result<()> {
        let active = self.active_context.raw();
        let Some(record) = T::pool_mut(&mut self.pools).lookup_mut(handle) else {
            log::warn!("slotgfx: uninit with dead {} {:?}", T::KIND, handle);
            return Err(GPUError::InvalidHandle);
        };
        let owner = record.slot().ctx_id;
        if owner != active {
            log::error!(
                "slotgfx: {} {:?} belongs to context {:#x}, active context is {:#x}",
                T::KIND,
                handle,
                owner,
                active
            );
            return Err(GPUError::ContextMismatch { owner, active });
        }
        if has_backend_object(record.slot().state) {
            T::release(&mut self.backend, record);
        }
        record.reset_to_alloc();
        Ok(())
    }

    fn dealloc_resource<T: PooledResource>(&mut self, handle: Handle<T>) -> Result<()> {
        self.check_alloc_state(handle, "dealloc")?;
        T::pool_mut(&mut self.pools).dealloc(handle);
        log::debug!("slotgfx: dealloc {} {:?}", T::KIND, handle);
        Ok(())
    }

    fn destroy_resource<T: PooledResource>(&mut self, handle: Handle<T>) -> Result<()> {
        self.uninit_resource(handle)?;
        self.dealloc_resource(handle)
    }

    /// Destroy without the context check; used by `discard_context`.
    pub(crate) fn discard_resource<T: PooledResource>(&mut self, handle: Handle<T>) {
        let pool = T::pool_mut(&mut self.pools);
        let Some(record) = pool.lookup_mut(handle) else {
            return;
        };
        if has_backend_object(record.slot().state) {
            T::release(&mut self.backend, record);
        }
        pool.dealloc(handle);
    }

    fn slot_info<T: PooledResource>(&self, handle: Handle<T>) -> Option<SlotInfo> {
        T::pool(&self.pools)
            .lookup(handle)
            .map(|r| SlotInfo::from_slot(r.slot()))
    }

    /// Record the outcome of an init call.
    fn finish_init<T: PooledResource>(&mut self, handle: Handle<T>, state: ResourceState) {
        debug_assert!(has_backend_object(state));
        if let Some(record) = T::pool_mut(&mut self.pools).lookup_mut(handle) {
            record.slot_mut().state = state;
        }
        match state {
            ResourceState::Valid => log::debug!("slotgfx: {} {:?} valid", T::KIND, handle),
            _ => log::warn!("slotgfx: {} {:?} failed to initialize", T::KIND, handle),
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////
// Buffers
/////////////////////////////////////////////////////////////////////////////////

impl<B: GraphicsBackend> Device<B> {
    /// Reserve a buffer handle. Returns `Handle::INVALID` when the pool is
    /// exhausted.
    pub fn alloc_buffer(&mut self) -> Handle<Buffer> {
        self.alloc_resource()
    }

    pub fn init_buffer(&mut self, handle: Handle<Buffer>, info: &BufferInfo) -> Result<()> {
        self.check_alloc_state(handle, "init_buffer")?;
        let info = info.with_defaults();
        let valid = self.validator.buffer_info(&info);
        let buf = self
            .pools
            .buffers
            .lookup_mut(handle)
            .ok_or(GPUError::InvalidHandle)?;
        buf.debug_name = info.debug_name.to_string();
        buf.size = info.size;
        buf.buffer_type = info.buffer_type;
        buf.usage = info.usage;
        buf.num_slots = num_slots(info.usage);
        buf.active_slot = 0;
        let state = if valid {
            self.backend.create_buffer(buf, &info)
        } else {
            ResourceState::Failed
        };
        self.finish_init(handle, state);
        Ok(())
    }

    /// `alloc_buffer` + `init_buffer`.
    pub fn make_buffer(&mut self, info: &BufferInfo) -> Handle<Buffer> {
        let handle = self.alloc_buffer();
        if handle.valid() {
            if let Err(err) = self.init_buffer(handle, info) {
                log::error!("slotgfx: make_buffer: {}", err);
            }
        }
        handle
    }

    /// Mark an allocated buffer as failed, for resources populated outside
    /// the device.
    pub fn fail_buffer(&mut self, handle: Handle<Buffer>) -> Result<()> {
        self.fail_resource(handle)
    }

    pub fn uninit_buffer(&mut self, handle: Handle<Buffer>) -> Result<()> {
        self.uninit_resource(handle)
    }

    pub fn dealloc_buffer(&mut self, handle: Handle<Buffer>) -> Result<()> {
        self.dealloc_resource(handle)
    }

    pub fn destroy_buffer(&mut self, handle: Handle<Buffer>) -> Result<()> {
        self.destroy_resource(handle)
    }

    pub fn query_buffer_state(&self, handle: Handle<Buffer>) -> ResourceState {
        self.pools.buffers.state(handle)
    }

    pub fn query_buffer_info(&self, handle: Handle<Buffer>) -> Option<BufferStatus> {
        self.pools.buffers.lookup(handle).map(BufferStatus::from)
    }

    pub fn query_buffer_defaults<'a>(&self, info: &BufferInfo<'a>) -> BufferInfo<'a> {
        info.with_defaults()
    }
}

/////////////////////////////////////////////////////////////////////////////////
// Images
/////////////////////////////////////////////////////////////////////////////////

impl<B: GraphicsBackend> Device<B> {
    pub fn alloc_image(&mut self) -> Handle<Image> {
        self.alloc_resource()
    }

    /// Look up a shared sampler for `key`, creating it on a miss.
    fn resolve_sampler(&mut self, key: &SamplerCacheKey) -> Option<SamplerId> {
        if let Some(sampler) = self.sampler_cache.find(key) {
            return Some(sampler);
        }
        if self.sampler_cache.is_full() {
            log::error!(
                "slotgfx: sampler cache full ({} entries), raise Desc::sampler_cache_size",
                self.sampler_cache.capacity()
            );
            return None;
        }
        let sampler = self.backend.create_sampler(key)?;
        self.sampler_cache.add(*key, sampler);
        log::debug!("slotgfx: new sampler {:?} for {:?}", sampler, key);
        Some(sampler)
    }

    pub fn init_image(&mut self, handle: Handle<Image>, info: &ImageInfo) -> Result<()> {
        self.check_alloc_state(handle, "init_image")?;
        let info = info.with_defaults(&self.desc.context);
        let mut valid = self.validator.image_info(&info, &self.backend);
        let sampler = if valid {
            self.resolve_sampler(&SamplerCacheKey::from_image_info(&info))
        } else {
            None
        };
        valid &= sampler.is_some();

        let img = self
            .pools
            .images
            .lookup_mut(handle)
            .ok_or(GPUError::InvalidHandle)?;
        img.debug_name = info.debug_name.to_string();
        img.image_type = info.image_type;
        img.render_target = info.render_target;
        img.width = info.width;
        img.height = info.height;
        img.num_slices = info.num_slices;
        img.num_mipmaps = info.num_mipmaps;
        img.usage = info.usage;
        img.pixel_format = info.pixel_format.unwrap_or(PixelFormat::Rgba8);
        img.sample_count = info.sample_count;
        img.min_filter = info.min_filter;
        img.mag_filter = info.mag_filter;
        img.wrap_u = info.wrap_u;
        img.wrap_v = info.wrap_v;
        img.wrap_w = info.wrap_w;
        img.border_color = info.border_color;
        img.max_anisotropy = info.max_anisotropy;
        img.min_lod = info.min_lod;
        img.max_lod = info.max_lod;
        img.sampler = sampler.unwrap_or_default();
        img.num_slots = num_slots(info.usage);
        img.active_slot = 0;
        let state = if valid {
            self.backend.create_image(img, &info)
        } else {
            ResourceState::Failed
        };
        self.finish_init(handle, state);
        Ok(())
    }

    pub fn make_image(&mut self, info: &ImageInfo) -> Handle<Image> {
        let handle = self.alloc_image();
        if handle.valid() {
            if let Err(err) = self.init_image(handle, info) {
                log::error!("slotgfx: make_image: {}", err);
            }
        }
        handle
    }

    pub fn fail_image(&mut self, handle: Handle<Image>) -> Result<()> {
        self.fail_resource(handle)
    }

    pub fn uninit_image(&mut self, handle: Handle<Image>) -> Result<()> {
        self.uninit_resource(handle)
    }

    pub fn dealloc_image(&mut self, handle: Handle<Image>) -> Result<()> {
        self.dealloc_resource(handle)
    }

    pub fn destroy_image(&mut self, handle: Handle<Image>) -> Result<()> {
        self.destroy_resource(handle)
    }

    pub fn query_image_state(&self, handle: Handle<Image>) -> ResourceState {
        self.pools.images.state(handle)
    }

    pub fn query_image_info(&self, handle: Handle<Image>) -> Option<ImageStatus> {
        self.pools.images.lookup(handle).map(ImageStatus::from)
    }

    pub fn query_image_defaults<'a>(&self, info: &ImageInfo<'a>) -> ImageInfo<'a> {
        info.with_defaults(&self.desc.context)
    }
}

/////////////////////////////////////////////////////////////////////////////////
// Shaders
/////////////////////////////////////////////////////////////////////////////////

fn stage_layout(info: &ShaderStageInfo) -> ShaderStageLayout {
    let mut layout = ShaderStageLayout::default();
    for (i, ub) in info.uniform_blocks.iter().take_while(|ub| ub.size > 0).enumerate() {
        layout.uniform_blocks[i] = ShaderUniformBlock { size: ub.size };
        layout.num_uniform_blocks = i + 1;
    }
    for (i, img) in info.images.iter().enumerate() {
        let Some(image_type) = img.image_type else {
            break;
        };
        layout.images[i] = ShaderImage {
            image_type,
            sampler_type: img.sampler_type,
        };
        layout.num_images = i + 1;
    }
    layout
}

impl<B: GraphicsBackend> Device<B> {
    pub fn alloc_shader(&mut self) -> Handle<Shader> {
        self.alloc_resource()
    }

    pub fn init_shader(&mut self, handle: Handle<Shader>, info: &ShaderInfo) -> Result<()> {
        self.check_alloc_state(handle, "init_shader")?;
        let info = info.with_defaults();
        let valid = self.validator.shader_info(&info, &self.backend);
        let shd = self
            .pools
            .shaders
            .lookup_mut(handle)
            .ok_or(GPUError::InvalidHandle)?;
        shd.debug_name = info.debug_name.to_string();
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            shd.stage[stage.index()] = stage_layout(info.stage(stage));
        }
        let state = if valid {
            self.backend.create_shader(shd, &info)
        } else {
            ResourceState::Failed
        };
        self.finish_init(handle, state);
        Ok(())
    }

    pub fn make_shader(&mut self, info: &ShaderInfo) -> Handle<Shader> {
        let handle = self.alloc_shader();
        if handle.valid() {
            if let Err(err) = self.init_shader(handle, info) {
                log::error!("slotgfx: make_shader: {}", err);
            }
        }
        handle
    }

    pub fn fail_shader(&mut self, handle: Handle<Shader>) -> Result<()> {
        self.fail_resource(handle)
    }

    pub fn uninit_shader(&mut self, handle: Handle<Shader>) -> Result<()> {
        self.uninit_resource(handle)
    }

    pub fn dealloc_shader(&mut self, handle: Handle<Shader>) -> Result<()> {
        self.dealloc_resource(handle)
    }

    pub fn destroy_shader(&mut self, handle: Handle<Shader>) -> Result<()> {
        self.destroy_resource(handle)
    }

    pub fn query_shader_state(&self, handle: Handle<Shader>) -> ResourceState {
        self.pools.shaders.state(handle)
    }

    pub fn query_shader_info(&self, handle: Handle<Shader>) -> Option<SlotInfo> {
        self.slot_info(handle)
    }

    pub fn query_shader_defaults<'a>(&self, info: &ShaderInfo<'a>) -> ShaderInfo<'a> {
        info.with_defaults()
    }
}

/////////////////////////////////////////////////////////////////////////////////
// Pipelines
/////////////////////////////////////////////////////////////////////////////////

impl<B: GraphicsBackend> Device<B> {
    pub fn alloc_pipeline(&mut self) -> Handle<Pipeline> {
        self.alloc_resource()
    }

    pub fn init_pipeline(&mut self, handle: Handle<Pipeline>, info: &PipelineInfo) -> Result<()> {
        self.check_alloc_state(handle, "init_pipeline")?;
        let info = info.with_defaults(&self.desc.context);
        let shader = self.pools.shaders.lookup(info.shader);
        let valid = self.validator.pipeline_info(&info, shader, &self.backend);

        let pip = self
            .pools
            .pipelines
            .lookup_mut(handle)
            .ok_or(GPUError::InvalidHandle)?;
        pip.debug_name = info.debug_name.to_string();
        pip.shader = info.shader;
        pip.primitive_type = info.primitive_type;
        pip.index_type = info.index_type;
        for attr in info.layout.attrs.iter().filter(|a| a.format.is_some()) {
            if attr.buffer_index < MAX_SHADERSTAGE_BUFFERS {
                pip.vertex_buffer_layout_active[attr.buffer_index] = true;
            }
        }
        pip.use_instanced_draw = info
            .layout
            .buffers
            .iter()
            .zip(pip.vertex_buffer_layout_active)
            .any(|(buf, active)| active && buf.step_func == VertexStep::PerInstance);
        pip.color_count = info.color_count;
        for (fmt, color) in pip.color_formats.iter_mut().zip(&info.colors).take(info.color_count) {
            *fmt = color.pixel_format.unwrap_or_default();
        }
        pip.depth_format = info.depth.pixel_format.unwrap_or_default();
        pip.sample_count = info.sample_count;
        pip.cull_mode = info.cull_mode;
        pip.face_winding = info.face_winding;
        pip.blend_color = info.blend_color;

        let state = match shader.filter(|s| valid && s.slot.state == ResourceState::Valid) {
            Some(shd) => self.backend.create_pipeline(pip, shd, &info),
            None => ResourceState::Failed,
        };
        self.finish_init(handle, state);
        Ok(())
    }

    pub fn make_pipeline(&mut self, info: &PipelineInfo) -> Handle<Pipeline> {
        let handle = self.alloc_pipeline();
        if handle.valid() {
            if let Err(err) = self.init_pipeline(handle, info) {
                log::error!("slotgfx: make_pipeline: {}", err);
            }
        }
        handle
    }

    pub fn fail_pipeline(&mut self, handle: Handle<Pipeline>) -> Result<()> {
        self.fail_resource(handle)
    }

    pub fn uninit_pipeline(&mut self, handle: Handle<Pipeline>) -> Result<()> {
        self.uninit_resource(handle)
    }

    pub fn dealloc_pipeline(&mut self, handle: Handle<Pipeline>) -> Result<()> {
        self.dealloc_resource(handle)
    }

    pub fn destroy_pipeline(&mut self, handle: Handle<Pipeline>) -> Result<()> {
        self.destroy_resource(handle)
    }

    pub fn query_pipeline_state(&self, handle: Handle<Pipeline>) -> ResourceState {
        self.pools.pipelines.state(handle)
    }

    pub fn query_pipeline_info(&self, handle: Handle<Pipeline>) -> Option<SlotInfo> {
        self.slot_info(handle)
    }

    pub fn query_pipeline_defaults<'a>(&self, info: &PipelineInfo<'a>) -> PipelineInfo<'a> {
        info.with_defaults(&self.desc.context)
    }
}

/////////////////////////////////////////////////////////////////////////////////
// Passes
/////////////////////////////////////////////////////////////////////////////////

impl<B: GraphicsBackend> Device<B> {
    pub fn alloc_pass(&mut self) -> Handle<Pass> {
        self.alloc_resource()
    }

    pub fn init_pass(&mut self, handle: Handle<Pass>, info: &PassInfo) -> Result<()> {
        self.check_alloc_state(handle, "init_pass")?;
        let info = info.with_defaults();
        let valid = self
            .validator
            .pass_info(&info, &self.pools.images, &self.backend);

        let images = &self.pools.images;
        let live = |h: Handle<Image>| {
            images
                .lookup(h)
                .filter(|img| img.slot.state == ResourceState::Valid)
        };
        let color_images: Vec<&Image> = info
            .color_attachments
            .iter()
            .map_while(|att| live(att.image))
            .collect();
        let ds_image = live(info.depth_stencil_attachment.image);

        let pass = self
            .pools
            .passes
            .lookup_mut(handle)
            .ok_or(GPUError::InvalidHandle)?;
        pass.debug_name = info.debug_name.to_string();
        pass.num_color_atts = color_images.len();
        for (i, (att, img)) in info.color_attachments.iter().zip(&color_images).enumerate() {
            pass.color_atts[i] = PassAttachment {
                image: att.image,
                mip_level: att.mip_level,
                slice: att.slice,
                pixel_format: img.pixel_format,
            };
        }
        if let Some(img) = ds_image {
            let att = info.depth_stencil_attachment;
            pass.ds_att = PassAttachment {
                image: att.image,
                mip_level: att.mip_level,
                slice: att.slice,
                pixel_format: img.pixel_format,
            };
        }
        if let Some(first) = color_images.first() {
            let mip = info.color_attachments[0].mip_level;
            pass.width = (first.width >> mip).max(1);
            pass.height = (first.height >> mip).max(1);
            pass.sample_count = first.sample_count;
        }

        let state = if valid && !color_images.is_empty() {
            self.backend
                .create_pass(pass, &color_images, ds_image, &info)
        } else {
            ResourceState::Failed
        };
        self.finish_init(handle, state);
        Ok(())
    }

    pub fn make_pass(&mut self, info: &PassInfo) -> Handle<Pass> {
        let handle = self.alloc_pass();
        if handle.valid() {
            if let Err(err) = self.init_pass(handle, info) {
                log::error!("slotgfx: make_pass: {}", err);
            }
        }
        handle
    }

    pub fn fail_pass(&mut self, handle: Handle<Pass>) -> Result<()> {
        self.fail_resource(handle)
    }

    pub fn uninit_pass(&mut self, handle: Handle<Pass>) -> Result<()> {
        self.uninit_resource(handle)
    }

    pub fn dealloc_pass(&mut self, handle: Handle<Pass>) -> Result<()> {
        self.dealloc_resource(handle)
    }

    pub fn destroy_pass(&mut self, handle: Handle<Pass>) -> Result<()> {
        self.destroy_resource(handle)
    }

    pub fn query_pass_state(&self, handle: Handle<Pass>) -> ResourceState {
        self.pools.passes.state(handle)
    }

    pub fn query_pass_info(&self, handle: Handle<Pass>) -> Option<SlotInfo> {
        self.slot_info(handle)
    }

    pub fn query_pass_defaults<'a>(&self, info: &PassInfo<'a>) -> PassInfo<'a> {
        info.with_defaults()
    }
}
