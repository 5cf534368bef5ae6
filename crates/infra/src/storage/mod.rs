//! Persisted client state

pub mod local;
pub mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
