// Implementations of the registry storage port.

pub mod in_memory;
pub mod sqlite_store;

// Re-export for convenience
pub use in_memory::InMemoryRegistryStore;
pub use sqlite_store::SqliteRegistryStore;
