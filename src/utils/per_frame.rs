/// A fixed ring of `N` copies of `T`, one per frame in flight, with a cursor
/// selecting the copy the CPU writes next.
#[derive(Debug, Clone)]
pub struct PerFrame<T> {
    frames: Vec<T>,
    curr_frame: u16,
}

impl<T> PerFrame<T>
where
    T: Clone + Default,
{
    pub fn new_with_clone(num_frames: usize, cpy: T) -> Self {
        Self {
            frames: vec![cpy; num_frames.max(1)],
            curr_frame: 0,
        }
    }

    pub fn new(num_frames: usize) -> Self {
        Self::new_with_clone(num_frames, Default::default())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn curr(&self) -> &T {
        &self.frames[self.curr_frame as usize]
    }

    pub fn curr_mut(&mut self) -> &mut T {
        &mut self.frames[self.curr_frame as usize]
    }

    pub fn curr_idx(&self) -> usize {
        self.curr_frame as usize
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.frames.get(idx)
    }

    pub fn advance_to_frame(&mut self, frame_idx: usize) {
        if frame_idx < self.frames.len() {
            self.curr_frame = frame_idx as u16;
        }
    }

    pub fn advance_next_frame(&mut self) {
        self.curr_frame = (self.curr_frame + 1) % self.frames.len() as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_wraps() {
        let mut ring = PerFrame::<u32>::new(2);
        assert_eq!(ring.curr_idx(), 0);
        ring.advance_next_frame();
        assert_eq!(ring.curr_idx(), 1);
        ring.advance_next_frame();
        assert_eq!(ring.curr_idx(), 0);
    }

    #[test]
    fn advance_to_out_of_range_is_ignored() {
        let mut ring = PerFrame::<u32>::new(2);
        ring.advance_to_frame(1);
        *ring.curr_mut() = 7;
        ring.advance_to_frame(5);
        assert_eq!(ring.curr_idx(), 1);
        assert_eq!(*ring.curr(), 7);
        assert_eq!(ring.get(0), Some(&0));
    }
}
