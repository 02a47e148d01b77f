//! Multi-tenant customer health scoring engine.
//!
//! The crate turns batches of raw, time-stamped metrics into a normalized,
//! weighted, vertical-aware composite pulse score per account and period:
//! validated CSV ingestion, table-driven normalization onto a 0-100 scale,
//! component aggregation, weighted composite scoring with status bands, and
//! an idempotent tenant-wide recalculation orchestrator.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod scoring;
pub mod store;
pub mod telemetry;
pub mod weights;

pub use engine::{IngestReceipt, PulseEngine, RecalcFailure, RecalcReport};
