// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "registry/mod.rs"]
pub mod registry;
