pub mod handle;
pub mod per_frame;
pub mod pool;
pub mod release_queue;

pub use handle::Handle;
pub use per_frame::PerFrame;
pub use pool::{Pool, Resource, ResourceState, Slot, MAX_POOL_SIZE};
pub use release_queue::ReleaseQueue;
