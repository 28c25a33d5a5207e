//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, TreeBackend)
//! but are themselves concrete structs, not traits.

mod store;

pub use store::{PunchStore, StoreSummary};
