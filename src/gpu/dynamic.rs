//! Per-frame content updates of dynamic and stream resources.
//!
//! Every non-immutable resource keeps `NUM_INFLIGHT_FRAMES` backing copies.
//! The first write of a frame moves `active_slot` to the next copy, so the
//! CPU never touches a copy the GPU may still read from an earlier frame.

use super::{round_up, Buffer, Device, GraphicsBackend, Image, ImageData};
use crate::utils::{Handle, ResourceState};

/// Append chunks advance the cursor in multiples of this.
pub const APPEND_ALIGN: usize = 4;

impl Buffer {
    /// Whether an append overflowed this buffer during `frame_index`.
    pub fn overflowed_in(&self, frame_index: u32) -> bool {
        self.append_overflow && self.append_frame_index == frame_index
    }
}

impl<B: GraphicsBackend> Device<B> {
    /// Overwrite the content of a dynamic buffer. Allowed once per frame and
    /// not in a frame that already appended to the buffer.
    pub fn update_buffer(&mut self, handle: Handle<Buffer>, data: &[u8]) {
        let frame = self.frame_index;
        let Some(buf) = self.pools.buffers.lookup_mut(handle) else {
            log::warn!("slotgfx: update_buffer with dead {:?}", handle);
            return;
        };
        if buf.slot.state != ResourceState::Valid {
            log::debug!("slotgfx: update_buffer skipped, {:?} is {:?}", handle, buf.slot.state);
            return;
        }
        if !self.validator.update_buffer(buf, data, frame) {
            return;
        }
        buf.active_slot = (buf.active_slot + 1) % buf.num_slots.max(1);
        buf.update_frame_index = frame;
        self.backend.update_buffer(buf, data);
    }

    /// Copy `data` behind the previous appends of this frame and return the
    /// byte offset it was written at.
    ///
    /// The cursor restarts at 0 in every frame and advances by `data.len()`
    /// rounded up to 4. A chunk that would run past the end of the buffer is
    /// not written; the buffer is flagged as overflowed for the rest of the
    /// frame and draws that bind it are dropped.
    pub fn append_buffer(&mut self, handle: Handle<Buffer>, data: &[u8]) -> usize {
        let frame = self.frame_index;
        let Some(buf) = self.pools.buffers.lookup_mut(handle) else {
            log::warn!("slotgfx: append_buffer with dead {:?}", handle);
            return 0;
        };
        if buf.slot.state != ResourceState::Valid {
            log::debug!("slotgfx: append_buffer skipped, {:?} is {:?}", handle, buf.slot.state);
            return 0;
        }
        if !self.validator.append_buffer(buf, frame) {
            return 0;
        }

        if buf.append_frame_index != frame {
            buf.append_frame_index = frame;
            buf.append_pos = 0;
            buf.append_overflow = false;
            buf.active_slot = (buf.active_slot + 1) % buf.num_slots.max(1);
        }

        let start = buf.append_pos;
        let chunk = round_up(data.len(), APPEND_ALIGN);
        if start + chunk > buf.size && !buf.append_overflow {
            log::debug!(
                "slotgfx: append of {} bytes at {} overflows {:?} ({} bytes)",
                data.len(),
                start,
                handle,
                buf.size
            );
            buf.append_overflow = true;
        }
        if !buf.append_overflow && !data.is_empty() {
            let written = self.backend.append_buffer(buf, data, start == 0);
            debug_assert_eq!(written, data.len());
            buf.append_pos += chunk;
        }
        start
    }

    /// [`Device::append_buffer`] for a slice of plain-old-data values.
    pub fn append_buffer_typed<T: bytemuck::Pod>(
        &mut self,
        handle: Handle<Buffer>,
        data: &[T],
    ) -> usize {
        self.append_buffer(handle, bytemuck::cast_slice(data))
    }

    /// [`Device::update_buffer`] for a slice of plain-old-data values.
    pub fn update_buffer_typed<T: bytemuck::Pod>(&mut self, handle: Handle<Buffer>, data: &[T]) {
        self.update_buffer(handle, bytemuck::cast_slice(data))
    }

    /// Overwrite every face and mip level of a dynamic image. Allowed once
    /// per frame.
    pub fn update_image(&mut self, handle: Handle<Image>, data: &ImageData) {
        let frame = self.frame_index;
        let Some(img) = self.pools.images.lookup_mut(handle) else {
            log::warn!("slotgfx: update_image with dead {:?}", handle);
            return;
        };
        if img.slot.state != ResourceState::Valid {
            log::debug!("slotgfx: update_image skipped, {:?} is {:?}", handle, img.slot.state);
            return;
        }
        if !self.validator.update_image(img, data, frame) {
            return;
        }
        img.active_slot = (img.active_slot + 1) % img.num_slots.max(1);
        img.update_frame_index = frame;
        self.backend.update_image(img, data);
    }

    /// Whether an append overflowed the buffer in the current frame.
    pub fn query_buffer_overflow(&self, handle: Handle<Buffer>) -> bool {
        self.pools
            .buffers
            .lookup(handle)
            .is_some_and(|buf| buf.overflowed_in(self.frame_index))
    }

    /// Whether appending `size` more bytes this frame would overflow.
    pub fn query_buffer_will_overflow(&self, handle: Handle<Buffer>, size: usize) -> bool {
        let Some(buf) = self.pools.buffers.lookup(handle) else {
            return false;
        };
        let pos = if buf.append_frame_index == self.frame_index {
            buf.append_pos
        } else {
            0
        };
        pos + round_up(size, APPEND_ALIGN) > buf.size
    }
}
