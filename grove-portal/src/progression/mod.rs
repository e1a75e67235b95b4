//! The progression engine
//!
//! Everything that decides how a project advances through levels lives
//! here: signal classification, the idempotent metrics store, the pure
//! level gate, and the coordinator that ties them together for every
//! trigger source (webhook, reconciliation sweep, manual check, mint
//! completion).
//!
//! Concurrency discipline: no in-process locks. Counter updates are
//! idempotent increments keyed by activity identity, level transitions
//! are linearized by a compare-and-set on the stored level. Triggers may
//! therefore run in separate tasks or separate replicas.

pub mod classifier;
pub mod coordinator;
pub mod gates;
pub mod metrics;
pub mod paper_score;

pub use classifier::classify;
pub use coordinator::ProgressionCoordinator;
pub use gates::{can_advance, requirement_text, ExternalFlags, MAX_AUTO_LEVEL};
pub use metrics::MetricsStore;
pub use paper_score::{score_document, DocumentScore};

/// Quality contribution credited for a paper-classified activity
/// (low-value contributes 0, ordinary contributes its own scaled score)
pub const PAPER_QUALITY_CONTRIBUTION: u8 = 90;
