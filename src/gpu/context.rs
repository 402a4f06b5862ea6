use super::{
    Buffer, Context, Device, GPUError, GraphicsBackend, Image, Pass, Pipeline, Result, Shader,
};
use crate::utils::{Handle, ResourceState};

impl<B: GraphicsBackend> Device<B> {
    /// Create a context and make it the active one.
    pub fn setup_context(&mut self) -> Result<Handle<Context>> {
        let Some(handle) = self.pools.contexts.alloc() else {
            log::error!("slotgfx: context pool exhausted");
            return Err(GPUError::SlotError);
        };
        let Some(ctx) = self.pools.contexts.lookup_mut(handle) else {
            return Err(GPUError::InvalidHandle);
        };
        ctx.slot.ctx_id = handle.raw();
        ctx.slot.state = self.backend.create_context(ctx);
        if ctx.slot.state != ResourceState::Valid {
            log::error!("slotgfx: backend failed to create {:?}", handle);
            self.pools.contexts.dealloc(handle);
            return Err(GPUError::InvalidState(ResourceState::Failed));
        }
        self.active_context = handle;
        self.backend.activate_context(Some(&*ctx));
        self.draw = Default::default();
        log::debug!("slotgfx: set up {:?}", handle);
        Ok(handle)
    }

    pub fn activate_context(&mut self, handle: Handle<Context>) -> Result<()> {
        let Some(ctx) = self
            .pools
            .contexts
            .lookup(handle)
            .filter(|ctx| ctx.slot.state == ResourceState::Valid)
        else {
            log::warn!("slotgfx: activate_context with dead {:?}", handle);
            return Err(GPUError::InvalidHandle);
        };
        self.active_context = handle;
        self.backend.activate_context(Some(ctx));
        self.draw = Default::default();
        Ok(())
    }

    /// Destroy every resource created under `handle`, then the context
    /// itself. Intended for shutdown: owned resources are destroyed whatever
    /// context is active.
    pub fn discard_context(&mut self, handle: Handle<Context>) -> Result<()> {
        if self.pools.contexts.lookup(handle).is_none() {
            log::warn!("slotgfx: discard_context with dead {:?}", handle);
            return Err(GPUError::InvalidHandle);
        }

        let ctx_id = handle.raw();
        let passes = self.pools.passes.handles_owned_by(ctx_id);
        let pipelines = self.pools.pipelines.handles_owned_by(ctx_id);
        let shaders = self.pools.shaders.handles_owned_by(ctx_id);
        let images = self.pools.images.handles_owned_by(ctx_id);
        let buffers = self.pools.buffers.handles_owned_by(ctx_id);
        log::debug!(
            "slotgfx: discarding {:?} ({} passes, {} pipelines, {} shaders, {} images, {} buffers)",
            handle,
            passes.len(),
            pipelines.len(),
            shaders.len(),
            images.len(),
            buffers.len()
        );
        for h in passes {
            self.discard_resource::<Pass>(h);
        }
        for h in pipelines {
            self.discard_resource::<Pipeline>(h);
        }
        for h in shaders {
            self.discard_resource::<Shader>(h);
        }
        for h in images {
            self.discard_resource::<Image>(h);
        }
        for h in buffers {
            self.discard_resource::<Buffer>(h);
        }

        if let Some(ctx) = self.pools.contexts.lookup_mut(handle) {
            self.backend.destroy_context(ctx);
        }
        self.pools.contexts.dealloc(handle);
        if self.active_context == handle {
            self.active_context = Handle::INVALID;
            self.backend.activate_context(None);
            self.draw = Default::default();
        }
        if self.default_context == handle {
            self.default_context = Handle::INVALID;
        }
        Ok(())
    }

    pub fn query_context_state(&self, handle: Handle<Context>) -> ResourceState {
        self.pools.contexts.state(handle)
    }
}
