//! Database access for grove-portal
//!
//! Per-entity query modules over the shared grove.db pool. Progression
//! counters and the level field are NOT written here; those mutations go
//! through `crate::progression::MetricsStore` so the idempotency and
//! compare-and-set discipline cannot be bypassed.

pub mod assets;
pub mod chat;
pub mod projects;
