//! Session provider implementations

pub mod archive;
pub mod memory;

pub use archive::ArchiveProvider;
pub use memory::MemoryProvider;
