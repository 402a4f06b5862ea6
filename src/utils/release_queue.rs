use std::collections::VecDeque;

/// Ring of `(frame_index, item)` pairs for objects that must outlive the
/// frames the GPU may still be executing.
///
/// Items pushed during frame `f` are handed back by [`ReleaseQueue::drain_retired`]
/// once `f + depth <= current_frame`.
#[derive(Debug)]
pub struct ReleaseQueue<T> {
    depth: u64,
    items: VecDeque<(u64, T)>,
}

impl<T> ReleaseQueue<T> {
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth as u64,
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, frame_index: u64, item: T) {
        debug_assert!(self.items.back().map_or(true, |(f, _)| *f <= frame_index));
        self.items.push_back((frame_index, item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pop every item whose frame has retired at `current_frame`.
    pub fn drain_retired(&mut self, current_frame: u64) -> Vec<T> {
        let mut out = Vec::new();
        while let Some((frame, _)) = self.items.front() {
            if frame + self.depth > current_frame {
                break;
            }
            if let Some((_, item)) = self.items.pop_front() {
                out.push(item);
            }
        }
        out
    }

    /// Pop everything regardless of frame; used at shutdown.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.items.drain(..).map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_items_until_retired() {
        let mut q = ReleaseQueue::new(2);
        q.push(1, "a");
        q.push(2, "b");
        assert!(q.drain_retired(2).is_empty());
        assert_eq!(q.drain_retired(3), vec!["a"]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.drain_retired(4), vec!["b"]);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_all_empties_queue() {
        let mut q = ReleaseQueue::new(2);
        q.push(10, 1);
        q.push(10, 2);
        assert_eq!(q.drain_all(), vec![1, 2]);
        assert!(q.is_empty());
    }
}
