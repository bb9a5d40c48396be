//! Infrastructure layer: in-memory browser environment and a sandbox SDK.

pub mod in_memory;
pub mod sandbox;
