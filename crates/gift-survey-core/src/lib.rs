//! # Gift Survey Core
//!
//! Shared, I/O-free logic for Gift Survey: the question catalog, storage
//! key normalization, the incremental scoring engine, the participant
//! record, the store abstraction, key migration and reports.
//!
//! This crate performs no filesystem or network access of its own. The
//! concrete backends (JSON file, remote document store) live in the
//! `gift-survey` application crate and plug in through [`store::Store`].
//!
//! ## Data Flow
//!
//! ```text
//! answer ──▶ ScoringEngine ──▶ MigrationResolver ──▶ Store (remote → local)
//!                                                        │
//!                                   ReportBuilder ◀──────┘ list()
//! ```

pub mod catalog;
pub mod migration;
pub mod models;
pub mod normalize;
pub mod report;
pub mod scoring;
pub mod store;

pub use catalog::{GiftCatalog, GiftDefinition, QUESTION_COUNT};
pub use migration::MigrationResolver;
pub use models::ParticipantRecord;
pub use normalize::normalize_key;
pub use report::ReportBuilder;
pub use scoring::ScoringEngine;
pub use store::{Store, StoreError};
