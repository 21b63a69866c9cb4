//! In-memory store backends for single-node deployments and tests.

pub mod audit;
pub mod session;

pub use audit::MemoryAuditStore;
pub use session::MemorySessionStore;
