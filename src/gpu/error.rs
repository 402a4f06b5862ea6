use crate::utils::ResourceState;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GPUError {
    #[error("Ran out of slots!")]
    SlotError,
    #[error("handle does not refer to a live resource")]
    InvalidHandle,
    #[error("resource belongs to context {owner:#x}, but context {active:#x} is active")]
    ContextMismatch { owner: u32, active: u32 },
    #[error("resource is in state {0:?}")]
    InvalidState(ResourceState),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Convenient crate-wide result type.
pub type Result<T, E = GPUError> = std::result::Result<T, E>;
