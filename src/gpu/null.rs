//! A backend that keeps every resource in CPU memory.
//!
//! Used for headless runs and tests: it honors the full `GraphicsBackend`
//! contract (backing copies per in-flight frame, deferred destruction,
//! uniform scratch space, staging budget) and counts every command it
//! receives, so dropped work can be observed.

use std::collections::{HashMap, HashSet};

use super::{
    num_faces, round_up, subimage_size, BackendKind, BindingsRef, Buffer, BufferInfo, Context,
    Desc, Features, GraphicsBackend, Image, ImageData, ImageInfo, Limits, Pass, PassAction,
    PassInfo, Pipeline, PipelineInfo, PixelFormat, PixelFormatInfo, SamplerCacheKey, SamplerId,
    Shader, ShaderInfo, ShaderStage, MAX_MIPMAPS, MAX_SHADERSTAGE_UBS, NUM_INFLIGHT_FRAMES,
    NUM_SHADER_STAGES,
};
use crate::utils::{Handle, PerFrame, ReleaseQueue, ResourceState};

/// Alignment of uniform blocks within the per-frame scratch buffer.
const UNIFORM_ALIGN: usize = 256;

/// Cumulative command counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NullStats {
    pub passes: u32,
    pub pipelines: u32,
    pub bindings: u32,
    pub uniforms: u32,
    pub draws: u32,
    pub elements: u64,
    pub buffer_updates: u32,
    pub buffer_appends: u32,
    pub image_updates: u32,
    pub commits: u32,
}

#[derive(Debug)]
enum Released {
    Buffer(u32, PerFrame<Vec<u8>>),
    Image(u32, PerFrame<Vec<u8>>),
}

pub struct NullBackend {
    features: Features,
    limits: Limits,
    unsupported: HashSet<PixelFormat>,
    frame: u64,
    contexts: HashSet<u32>,
    active_context: Option<u32>,
    buffers: HashMap<u32, PerFrame<Vec<u8>>>,
    images: HashMap<u32, PerFrame<Vec<u8>>>,
    samplers: HashMap<u64, SamplerCacheKey>,
    next_sampler: u64,
    uniforms: PerFrame<Vec<u8>>,
    uniform_pos: usize,
    uniform_blocks: [[Option<(usize, usize)>; MAX_SHADERSTAGE_UBS]; NUM_SHADER_STAGES],
    staging_size: usize,
    staging_used: usize,
    releases: ReleaseQueue<Released>,
    in_pass: bool,
    debug_depth: usize,
    stats: NullStats,
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            features: Features {
                instancing: true,
                origin_top_left: true,
                multiple_render_targets: true,
                msaa_render_targets: true,
                imagetype_3d: true,
                imagetype_array: true,
                image_clamp_to_border: true,
                mrt_independent_blend_state: true,
                mrt_independent_write_mask: true,
                shader_bytecode: false,
                uniform_names: false,
                attr_semantics: false,
            },
            limits: Limits {
                max_image_size_2d: 16 * 1024,
                max_image_size_cube: 16 * 1024,
                max_image_size_3d: 2 * 1024,
                max_image_size_array: 16 * 1024,
                max_image_array_layers: 2 * 1024,
                max_vertex_attrs: 16,
            },
            unsupported: HashSet::new(),
            frame: 0,
            contexts: HashSet::new(),
            active_context: None,
            buffers: HashMap::new(),
            images: HashMap::new(),
            samplers: HashMap::new(),
            next_sampler: 1,
            uniforms: PerFrame::new(NUM_INFLIGHT_FRAMES),
            uniform_pos: 0,
            uniform_blocks: Default::default(),
            staging_size: 0,
            staging_used: 0,
            releases: ReleaseQueue::new(NUM_INFLIGHT_FRAMES),
            in_pass: false,
            debug_depth: 0,
            stats: NullStats::default(),
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Report `fmt` as unusable for anything; creating resources with it
    /// fails.
    pub fn with_unsupported_format(mut self, fmt: PixelFormat) -> Self {
        self.unsupported.insert(fmt);
        self
    }

    pub fn stats(&self) -> NullStats {
        self.stats
    }

    /// Number of live sampler objects.
    pub fn num_samplers(&self) -> usize {
        self.samplers.len()
    }

    pub fn num_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    /// Objects destroyed but still waiting for their frames to retire.
    pub fn pending_releases(&self) -> usize {
        self.releases.len()
    }

    pub fn active_context(&self) -> Option<u32> {
        self.active_context
    }

    /// Content of backing copy `slot` of a buffer.
    pub fn buffer_contents(&self, handle: Handle<Buffer>, slot: usize) -> Option<&[u8]> {
        self.buffers
            .get(&handle.raw())
            .and_then(|ring| ring.get(slot))
            .map(|data| data.as_slice())
    }

    /// Content of backing copy `slot` of an image: every face and mip level,
    /// tightly packed in face-major order.
    pub fn image_contents(&self, handle: Handle<Image>, slot: usize) -> Option<&[u8]> {
        self.images
            .get(&handle.raw())
            .and_then(|ring| ring.get(slot))
            .map(|data| data.as_slice())
    }

    /// Last data applied to a uniform block in the current frame.
    pub fn uniform_contents(&self, stage: ShaderStage, ub_index: usize) -> Option<&[u8]> {
        let (offset, len) = self.uniform_blocks[stage.index()].get(ub_index).copied()??;
        self.uniforms.curr().get(offset..offset + len)
    }

    fn supported(&self, fmt: PixelFormat) -> bool {
        fmt != PixelFormat::None && !self.unsupported.contains(&fmt)
    }

    fn image_size(img: &Image) -> usize {
        let mips = img.num_mipmaps.max(1);
        let per_face: usize = (0..mips)
            .map(|mip| {
                subimage_size(
                    img.pixel_format,
                    img.image_type,
                    img.width,
                    img.height,
                    img.num_slices,
                    mip,
                )
            })
            .sum();
        per_face * num_faces(img.image_type)
    }

    /// Copy every provided subimage into `dst`, face-major, clamped to `dst`.
    fn pack_image(img: &Image, data: &ImageData, dst: &mut [u8]) {
        let mut pos = 0;
        for face in 0..num_faces(img.image_type) {
            for mip in 0..img.num_mipmaps.clamp(1, MAX_MIPMAPS as u32) {
                let size = subimage_size(
                    img.pixel_format,
                    img.image_type,
                    img.width,
                    img.height,
                    img.num_slices,
                    mip,
                );
                if let Some(src) = data.subimage[face][mip as usize] {
                    let start = pos.min(dst.len());
                    let end = (start + src.len().min(size)).min(dst.len());
                    dst[start..end].copy_from_slice(&src[..end - start]);
                }
                pos += size;
            }
        }
    }

    fn retire(&mut self) {
        for item in self.releases.drain_retired(self.frame) {
            match item {
                Released::Buffer(id, ring) => {
                    log::trace!("null: released buffer {:#x} ({} copies)", id, ring.len())
                }
                Released::Image(id, ring) => {
                    log::trace!("null: released image {:#x} ({} copies)", id, ring.len())
                }
            }
        }
    }
}

impl GraphicsBackend for NullBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Null
    }

    fn features(&self) -> Features {
        self.features
    }

    fn limits(&self) -> Limits {
        self.limits
    }

    fn pixelformat(&self, fmt: PixelFormat) -> PixelFormatInfo {
        if !self.supported(fmt) {
            return PixelFormatInfo::default();
        }
        let renderable = !fmt.is_compressed() && !fmt.is_depth();
        PixelFormatInfo {
            sample: true,
            filter: !fmt.is_integer(),
            render: renderable,
            blend: renderable && !fmt.is_integer(),
            msaa: renderable || fmt.is_depth(),
            depth: fmt.is_depth(),
        }
    }

    fn setup(&mut self, desc: &Desc) {
        self.uniforms =
            PerFrame::new_with_clone(NUM_INFLIGHT_FRAMES, vec![0; desc.uniform_buffer_size]);
        self.staging_size = desc.staging_buffer_size;
        log::debug!(
            "null: setup with {} bytes of uniform scratch and {} bytes of staging per frame",
            desc.uniform_buffer_size,
            desc.staging_buffer_size
        );
    }

    fn discard(&mut self) {
        let pending = self.releases.drain_all();
        log::debug!("null: discard, dropping {} pending releases", pending.len());
        if !self.buffers.is_empty() || !self.images.is_empty() {
            log::warn!(
                "null: {} buffers and {} images still alive at discard",
                self.buffers.len(),
                self.images.len()
            );
        }
    }

    fn create_context(&mut self, ctx: &mut Context) -> ResourceState {
        self.contexts.insert(ctx.slot.id);
        ResourceState::Valid
    }

    fn destroy_context(&mut self, ctx: &mut Context) {
        self.contexts.remove(&ctx.slot.id);
    }

    fn activate_context(&mut self, ctx: Option<&Context>) {
        self.active_context = ctx.map(|c| c.slot.id);
    }

    fn create_buffer(&mut self, buf: &mut Buffer, info: &BufferInfo) -> ResourceState {
        let mut contents = vec![0u8; buf.size];
        if let Some(data) = info.data {
            let len = data.len().min(contents.len());
            contents[..len].copy_from_slice(&data[..len]);
        }
        let mut ring = PerFrame::new_with_clone(buf.num_slots, contents);
        ring.advance_to_frame(buf.active_slot);
        self.buffers.insert(buf.slot.id, ring);
        log::trace!("null: create buffer {:#x} ({} bytes)", buf.slot.id, buf.size);
        ResourceState::Valid
    }

    fn destroy_buffer(&mut self, buf: &mut Buffer) {
        if let Some(ring) = self.buffers.remove(&buf.slot.id) {
            self.releases
                .push(self.frame, Released::Buffer(buf.slot.id, ring));
        }
    }

    fn update_buffer(&mut self, buf: &mut Buffer, data: &[u8]) {
        let Some(ring) = self.buffers.get_mut(&buf.slot.id) else {
            return;
        };
        ring.advance_to_frame(buf.active_slot);
        let dst = ring.curr_mut();
        let len = data.len().min(dst.len());
        dst[..len].copy_from_slice(&data[..len]);
        self.stats.buffer_updates += 1;
    }

    fn append_buffer(&mut self, buf: &mut Buffer, data: &[u8], new_frame: bool) -> usize {
        let Some(ring) = self.buffers.get_mut(&buf.slot.id) else {
            return 0;
        };
        if new_frame {
            ring.advance_to_frame(buf.active_slot);
        }
        let dst = ring.curr_mut();
        let start = buf.append_pos.min(dst.len());
        let end = (start + data.len()).min(dst.len());
        dst[start..end].copy_from_slice(&data[..end - start]);
        self.stats.buffer_appends += 1;
        end - start
    }

    fn create_sampler(&mut self, key: &SamplerCacheKey) -> Option<SamplerId> {
        let id = self.next_sampler;
        self.next_sampler += 1;
        self.samplers.insert(id, *key);
        Some(SamplerId(id))
    }

    fn destroy_sampler(&mut self, sampler: SamplerId) {
        self.samplers.remove(&sampler.0);
    }

    fn create_image(&mut self, img: &mut Image, info: &ImageInfo) -> ResourceState {
        if !self.supported(img.pixel_format) {
            log::warn!("null: pixel format {:?} is not supported", img.pixel_format);
            return ResourceState::Failed;
        }
        let mut contents = vec![0u8; Self::image_size(img)];
        if !img.render_target {
            Self::pack_image(img, &info.data, &mut contents);
        }
        let mut ring = PerFrame::new_with_clone(img.num_slots, contents);
        ring.advance_to_frame(img.active_slot);
        self.images.insert(img.slot.id, ring);
        log::trace!(
            "null: create image {:#x} ({}x{} {:?})",
            img.slot.id,
            img.width,
            img.height,
            img.pixel_format
        );
        ResourceState::Valid
    }

    fn destroy_image(&mut self, img: &mut Image) {
        if let Some(ring) = self.images.remove(&img.slot.id) {
            self.releases
                .push(self.frame, Released::Image(img.slot.id, ring));
        }
    }

    fn update_image(&mut self, img: &mut Image, data: &ImageData) {
        let size = data.total_size();
        if self.staging_used + size > self.staging_size {
            log::warn!(
                "null: staging budget of {} bytes exhausted, image update of {} bytes skipped",
                self.staging_size,
                size
            );
            return;
        }
        let Some(ring) = self.images.get_mut(&img.slot.id) else {
            return;
        };
        self.staging_used += size;
        ring.advance_to_frame(img.active_slot);
        Self::pack_image(img, data, ring.curr_mut());
        self.stats.image_updates += 1;
    }

    fn create_shader(&mut self, shd: &mut Shader, info: &ShaderInfo) -> ResourceState {
        log::trace!(
            "null: create shader {:#x} ({} / {})",
            shd.slot.id,
            info.vs.entry,
            info.fs.entry
        );
        ResourceState::Valid
    }

    fn destroy_shader(&mut self, _shd: &mut Shader) {}

    fn create_pipeline(
        &mut self,
        pip: &mut Pipeline,
        _shd: &Shader,
        _info: &PipelineInfo,
    ) -> ResourceState {
        let formats = pip.color_formats[..pip.color_count]
            .iter()
            .chain(std::iter::once(&pip.depth_format))
            .filter(|fmt| **fmt != PixelFormat::None);
        for &fmt in formats {
            if !self.supported(fmt) {
                log::warn!("null: pipeline uses unsupported format {:?}", fmt);
                return ResourceState::Failed;
            }
        }
        ResourceState::Valid
    }

    fn destroy_pipeline(&mut self, _pip: &mut Pipeline) {}

    fn create_pass(
        &mut self,
        pass: &mut Pass,
        color_images: &[&Image],
        ds_image: Option<&Image>,
        _info: &PassInfo,
    ) -> ResourceState {
        let all_backed = color_images
            .iter()
            .copied()
            .chain(ds_image)
            .all(|img| self.images.contains_key(&img.slot.id));
        if !all_backed {
            log::warn!("null: pass {:#x} references images without storage", pass.slot.id);
            return ResourceState::Failed;
        }
        ResourceState::Valid
    }

    fn destroy_pass(&mut self, _pass: &mut Pass) {}

    fn begin_pass(&mut self, pass: Option<&Pass>, action: &PassAction, width: u32, height: u32) {
        debug_assert!(!self.in_pass);
        self.in_pass = true;
        self.stats.passes += 1;
        log::trace!(
            "null: begin pass {:?} {}x{} clear {:?}",
            pass.map(|p| p.slot.id),
            width,
            height,
            action.colors[0].value
        );
    }

    fn end_pass(&mut self) {
        self.in_pass = false;
    }

    fn apply_viewport(&mut self, x: i32, y: i32, width: i32, height: i32, _origin_top_left: bool) {
        log::trace!("null: viewport {} {} {} {}", x, y, width, height);
    }

    fn apply_scissor_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        _origin_top_left: bool,
    ) {
        log::trace!("null: scissor {} {} {} {}", x, y, width, height);
    }

    fn apply_pipeline(&mut self, pip: &Pipeline) {
        self.stats.pipelines += 1;
        self.uniform_blocks = Default::default();
        log::trace!("null: apply pipeline {:#x}", pip.slot.id);
    }

    fn apply_bindings(&mut self, bindings: &BindingsRef) {
        self.stats.bindings += 1;
        log::trace!(
            "null: bind {} vertex buffers, {} + {} images",
            bindings.vertex_buffers.len(),
            bindings.vs_images.len(),
            bindings.fs_images.len()
        );
    }

    fn apply_uniforms(&mut self, stage: ShaderStage, ub_index: usize, data: &[u8]) {
        let scratch = self.uniforms.curr_mut();
        let start = self.uniform_pos;
        if start + data.len() > scratch.len() {
            log::warn!(
                "null: uniform scratch buffer of {} bytes exhausted",
                scratch.len()
            );
            return;
        }
        scratch[start..start + data.len()].copy_from_slice(data);
        self.uniform_pos = round_up(start + data.len(), UNIFORM_ALIGN);
        if let Some(block) = self.uniform_blocks[stage.index()].get_mut(ub_index) {
            *block = Some((start, data.len()));
        }
        self.stats.uniforms += 1;
    }

    fn draw(&mut self, base_element: u32, num_elements: u32, num_instances: u32) {
        debug_assert!(self.in_pass);
        self.stats.draws += 1;
        self.stats.elements += num_elements as u64 * num_instances as u64;
        log::trace!(
            "null: draw {}..{} x{}",
            base_element,
            base_element.saturating_add(num_elements),
            num_instances
        );
    }

    fn commit(&mut self) {
        self.frame += 1;
        self.stats.commits += 1;
        self.uniforms.advance_next_frame();
        self.uniform_pos = 0;
        self.uniform_blocks = Default::default();
        self.staging_used = 0;
        self.retire();
    }

    fn reset_state_cache(&mut self) {
        self.uniform_blocks = Default::default();
    }

    fn push_debug_group(&mut self, name: &str) {
        self.debug_depth += 1;
        log::trace!("null: push debug group {} ({})", name, self.debug_depth);
    }

    fn pop_debug_group(&mut self) {
        self.debug_depth = self.debug_depth.saturating_sub(1);
    }
}
