//! Shared utilities for depgather.
//!
//! This crate provides the cross-cutting concerns used by every other
//! depgather crate: the unified error type and the cooperative
//! cancellation token threaded through dependency gathering.

pub mod cancel;
pub mod errors;
