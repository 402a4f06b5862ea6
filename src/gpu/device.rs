use super::{
    BackendKind, Context, Desc, Features, GraphicsBackend, Limits, Pass, Pipeline, PixelFormat,
    PixelFormatInfo, Pools, PoolSizes, Result, SamplerCache, ValidateError, Validator,
};
use crate::utils::Handle;

/// Render-command bookkeeping between `begin_*pass` and `end_pass`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DrawState {
    pub in_pass: bool,
    pub pass_valid: bool,
    pub bindings_valid: bool,
    pub next_draw_valid: bool,
    /// `INVALID` while rendering to the default framebuffer.
    pub cur_pass: Handle<Pass>,
    pub cur_pipeline: Handle<Pipeline>,
    pub cur_width: u32,
    pub cur_height: u32,
}

/// Owns every pool, the sampler cache, the validation layer and the backend.
///
/// All resource operations go through a `Device`. There is no global state;
/// several devices can coexist, each with its own backend.
pub struct Device<B: GraphicsBackend> {
    pub(crate) desc: Desc,
    pub(crate) backend: B,
    pub(crate) pools: Pools,
    pub(crate) sampler_cache: SamplerCache,
    pub(crate) validator: Validator,
    pub(crate) active_context: Handle<Context>,
    pub(crate) default_context: Handle<Context>,
    pub(crate) frame_index: u32,
    pub(crate) draw: DrawState,
}

impl<B: GraphicsBackend> Device<B> {
    /// Set up a device on `backend` and create and activate a default context.
    pub fn new(desc: &Desc, mut backend: B) -> Result<Self> {
        let desc = desc.resolved()?;
        log::info!(
            "slotgfx: setting up {:?} device (buffers {}, images {}, shaders {}, pipelines {}, passes {}, contexts {})",
            backend.kind(),
            desc.buffer_pool_size,
            desc.image_pool_size,
            desc.shader_pool_size,
            desc.pipeline_pool_size,
            desc.pass_pool_size,
            desc.context_pool_size,
        );
        backend.setup(&desc);

        let pools = Pools::new(&PoolSizes {
            buffers: desc.buffer_pool_size,
            images: desc.image_pool_size,
            shaders: desc.shader_pool_size,
            pipelines: desc.pipeline_pool_size,
            passes: desc.pass_pool_size,
            contexts: desc.context_pool_size,
        });

        let mut device = Self {
            sampler_cache: SamplerCache::new(desc.sampler_cache_size),
            validator: Validator::new(desc.non_fatal_validation),
            desc,
            backend,
            pools,
            active_context: Handle::INVALID,
            default_context: Handle::INVALID,
            frame_index: 1,
            draw: DrawState::default(),
        };
        device.default_context = device.setup_context()?;
        Ok(device)
    }

    /// Discard every context and cached sampler, then hand the backend back.
    pub fn shutdown(mut self) -> B {
        let mut contexts = Vec::new();
        self.pools.contexts.for_each_live(|ctx| contexts.push(Handle::from_raw(ctx.slot.id)));
        for ctx in contexts {
            if let Err(err) = self.discard_context(ctx) {
                log::warn!("slotgfx: discarding {:?} at shutdown: {}", ctx, err);
            }
        }
        for entry in self.sampler_cache.drain() {
            self.backend.destroy_sampler(entry.sampler);
        }
        self.backend.discard();
        log::info!("slotgfx: device shut down after {} frames", self.frame_index - 1);
        self.backend
    }

    pub fn query_backend(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn query_features(&self) -> Features {
        self.backend.features()
    }

    pub fn query_limits(&self) -> Limits {
        self.backend.limits()
    }

    pub fn query_pixelformat(&self, fmt: PixelFormat) -> PixelFormatInfo {
        self.backend.pixelformat(fmt)
    }

    /// The configuration with every default filled in.
    pub fn query_desc(&self) -> &Desc {
        &self.desc
    }

    /// Starts at 1 and advances on every `commit`.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn active_context(&self) -> Handle<Context> {
        self.active_context
    }

    pub fn default_context(&self) -> Handle<Context> {
        self.default_context
    }

    pub fn last_validation_error(&self) -> Option<ValidateError> {
        self.validator.last_error()
    }

    pub fn num_cached_samplers(&self) -> usize {
        self.sampler_cache.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
