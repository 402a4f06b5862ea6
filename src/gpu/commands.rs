use super::{
    Bindings, BindingsRef, Buffer, Device, GraphicsBackend, Image, Pass, PassAction, Pipeline,
    ShaderStage,
};
use crate::utils::{Handle, ResourceState};

impl<B: GraphicsBackend> Device<B> {
    /// Start rendering to the default framebuffer.
    pub fn begin_default_pass(&mut self, action: &PassAction, width: u32, height: u32) {
        let valid = self.validator.begin_default_pass(self.draw.in_pass);
        if self.draw.in_pass {
            log::warn!("slotgfx: begin_default_pass inside an open pass ignored");
            return;
        }
        self.draw.in_pass = true;
        self.draw.pass_valid = valid;
        self.draw.bindings_valid = true;
        self.draw.next_draw_valid = true;
        self.draw.cur_pass = Handle::INVALID;
        self.draw.cur_pipeline = Handle::INVALID;
        self.draw.cur_width = width;
        self.draw.cur_height = height;
        if valid {
            self.backend.begin_pass(None, action, width, height);
        }
    }

    /// Start rendering into the attachments of an offscreen pass.
    pub fn begin_pass(&mut self, handle: Handle<Pass>, action: &PassAction) {
        let pass = self.pools.passes.lookup(handle);
        let mut valid = self
            .validator
            .begin_pass(self.draw.in_pass, pass, &self.pools.images);
        if self.draw.in_pass {
            log::warn!("slotgfx: begin_pass inside an open pass ignored");
            return;
        }
        valid &= pass.is_some_and(|p| p.slot.state == ResourceState::Valid);

        self.draw.in_pass = true;
        self.draw.pass_valid = valid;
        self.draw.bindings_valid = true;
        self.draw.next_draw_valid = true;
        self.draw.cur_pass = handle;
        self.draw.cur_pipeline = Handle::INVALID;
        match pass {
            Some(pass) if valid => {
                self.draw.cur_width = pass.width;
                self.draw.cur_height = pass.height;
                self.backend
                    .begin_pass(Some(pass), action, pass.width, pass.height);
            }
            _ => {
                log::debug!("slotgfx: begin_pass with unusable {:?}, pass skipped", handle);
            }
        }
    }

    pub fn apply_viewport(&mut self, x: i32, y: i32, width: i32, height: i32, origin_top_left: bool) {
        if !self.validator.in_pass(self.draw.in_pass, "apply_viewport") || !self.draw.pass_valid {
            return;
        }
        self.backend
            .apply_viewport(x, y, width, height, origin_top_left);
    }

    pub fn apply_scissor_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        origin_top_left: bool,
    ) {
        if !self.validator.in_pass(self.draw.in_pass, "apply_scissor_rect") || !self.draw.pass_valid
        {
            return;
        }
        self.backend
            .apply_scissor_rect(x, y, width, height, origin_top_left);
    }

    pub fn apply_pipeline(&mut self, handle: Handle<Pipeline>) {
        self.draw.bindings_valid = false;
        let pip = self.pools.pipelines.lookup(handle);
        let shd = pip.and_then(|p| self.pools.shaders.lookup(p.shader));
        let pass = self.pools.passes.lookup(self.draw.cur_pass);
        if !self
            .validator
            .apply_pipeline(self.draw.in_pass, pip, shd, pass, &self.desc.context)
        {
            self.draw.next_draw_valid = false;
            return;
        }
        if !self.draw.pass_valid {
            return;
        }
        self.draw.cur_pipeline = handle;
        let Some(pip) = pip.filter(|p| p.slot.state == ResourceState::Valid) else {
            log::debug!("slotgfx: apply_pipeline with unusable {:?}", handle);
            self.draw.next_draw_valid = false;
            return;
        };
        self.draw.next_draw_valid =
            shd.is_some_and(|s| s.slot.state == ResourceState::Valid);
        if self.draw.next_draw_valid {
            self.backend.apply_pipeline(pip);
        }
    }

    /// Bind buffers and images for the next draws.
    ///
    /// Draws are dropped until the next successful `apply_bindings` when any
    /// bound resource is not valid or a bound buffer overflowed this frame.
    pub fn apply_bindings(&mut self, bindings: &Bindings) {
        let pip = self.pools.pipelines.lookup(self.draw.cur_pipeline);
        let shd = pip.and_then(|p| self.pools.shaders.lookup(p.shader));
        if !self.validator.apply_bindings(
            self.draw.in_pass,
            bindings,
            pip,
            shd,
            &self.pools.buffers,
            &self.pools.images,
        ) {
            self.draw.next_draw_valid = false;
            return;
        }
        self.draw.bindings_valid = true;
        if !self.draw.pass_valid {
            return;
        }
        let Some(pip) = pip else {
            self.draw.next_draw_valid = false;
            return;
        };

        let frame = self.frame_index;
        let mut usable = true;
        let mut check_buffer = |buf: Option<&Buffer>, h: Handle<Buffer>| {
            match buf {
                Some(buf) if buf.slot.state == ResourceState::Valid => {
                    if buf.overflowed_in(frame) {
                        log::debug!("slotgfx: {:?} overflowed this frame, dropping draws", h);
                        usable = false;
                    }
                }
                _ => usable = false,
            }
        };

        let mut vertex_buffers = Vec::new();
        let mut vertex_buffer_offsets = Vec::new();
        for (&h, &offset) in bindings
            .vertex_buffers
            .iter()
            .zip(&bindings.vertex_buffer_offsets)
            .take_while(|(h, _)| h.valid())
        {
            let buf = self.pools.buffers.lookup(h);
            check_buffer(buf, h);
            if let Some(buf) = buf {
                vertex_buffers.push(buf);
                vertex_buffer_offsets.push(offset);
            }
        }
        let index_buffer = if bindings.index_buffer.valid() {
            let buf = self.pools.buffers.lookup(bindings.index_buffer);
            check_buffer(buf, bindings.index_buffer);
            buf
        } else {
            None
        };

        let images = &self.pools.images;
        let mut stage_images = |stage: ShaderStage| {
            let mut out: Vec<&Image> = Vec::new();
            for &h in bindings.images(stage).iter().take_while(|h| h.valid()) {
                match images.lookup(h) {
                    Some(img) if img.slot.state == ResourceState::Valid => out.push(img),
                    _ => usable = false,
                }
            }
            out
        };
        let vs_images = stage_images(ShaderStage::Vertex);
        let fs_images = stage_images(ShaderStage::Fragment);

        self.draw.next_draw_valid &= usable;
        if !self.draw.next_draw_valid {
            return;
        }
        self.backend.apply_bindings(&BindingsRef {
            pipeline: pip,
            vertex_buffers: &vertex_buffers,
            vertex_buffer_offsets: &vertex_buffer_offsets,
            index_buffer,
            index_buffer_offset: bindings.index_buffer_offset,
            vs_images: &vs_images,
            fs_images: &fs_images,
        });
    }

    /// Upload the content of uniform block `ub_index` of `stage`.
    pub fn apply_uniforms(&mut self, stage: ShaderStage, ub_index: usize, data: &[u8]) {
        let shd = self
            .pools
            .pipelines
            .lookup(self.draw.cur_pipeline)
            .and_then(|p| self.pools.shaders.lookup(p.shader));
        if !self
            .validator
            .apply_uniforms(self.draw.in_pass, stage, ub_index, data, shd)
        {
            self.draw.next_draw_valid = false;
            return;
        }
        if !self.draw.pass_valid || !self.draw.next_draw_valid {
            return;
        }
        self.backend.apply_uniforms(stage, ub_index, data);
    }

    /// [`Device::apply_uniforms`] for a plain-old-data uniform block.
    pub fn apply_uniforms_typed<T: bytemuck::Pod>(
        &mut self,
        stage: ShaderStage,
        ub_index: usize,
        data: &T,
    ) {
        self.apply_uniforms(stage, ub_index, bytemuck::bytes_of(data))
    }

    /// Draw with the applied pipeline and bindings. Dropped without a
    /// backend call when anything since `begin_*pass` failed.
    pub fn draw(&mut self, base_element: u32, num_elements: u32, num_instances: u32) {
        if !self.validator.in_pass(self.draw.in_pass, "draw") {
            return;
        }
        if !self.draw.bindings_valid {
            log::debug!("slotgfx: draw without resource bindings dropped");
            return;
        }
        if !self.draw.pass_valid || !self.draw.next_draw_valid {
            log::debug!("slotgfx: draw dropped, pass or bindings are not usable");
            return;
        }
        if num_elements == 0 || num_instances == 0 {
            return;
        }
        self.backend.draw(base_element, num_elements, num_instances);
    }

    pub fn end_pass(&mut self) {
        if !self.validator.in_pass(self.draw.in_pass, "end_pass") {
            return;
        }
        if self.draw.pass_valid {
            self.backend.end_pass();
        }
        self.draw.in_pass = false;
        self.draw.pass_valid = false;
        self.draw.cur_pass = Handle::INVALID;
        self.draw.cur_pipeline = Handle::INVALID;
    }

    /// Finish the frame. Advances the frame index that gates per-frame
    /// updates and append cursors.
    pub fn commit(&mut self) {
        if !self.validator.commit(self.draw.in_pass) {
            return;
        }
        self.backend.commit();
        self.frame_index = self.frame_index.wrapping_add(1);
        log::trace!("slotgfx: frame {} begins", self.frame_index);
    }

    /// Forget every piece of render state the backend caches, for embedders
    /// that issue native API calls of their own.
    pub fn reset_state_cache(&mut self) {
        self.backend.reset_state_cache();
    }

    pub fn push_debug_group(&mut self, name: &str) {
        self.backend.push_debug_group(name);
    }

    pub fn pop_debug_group(&mut self) {
        self.backend.pop_debug_group();
    }
}
