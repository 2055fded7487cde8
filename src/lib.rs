//! # Gift Survey
//!
//! Operational side of the spiritual gifts self-assessment: configuration,
//! the JSON file and remote document backends, and the command handlers
//! behind the `gifts` binary. Scoring, key migration and reports live in
//! [`gift_survey_core`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────────┐   ┌───────────────────────┐
//! │  gifts   │──▶│ MigrationResolver │──▶│ FallbackStore         │
//! │  (CLI)   │   │ ScoringEngine     │   │  remote ──▶ local JSON│
//! └──────────┘   └───────────────────┘   └───────────┬───────────┘
//!                                                    │ list()
//!                                        ┌───────────▼───────────┐
//!                                        │     ReportBuilder     │
//!                                        └───────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`local_store`] | JSON file backend |
//! | [`remote_store`] | Remote document store backend |
//! | [`backend`] | Backend selection and fallback wiring |
//! | [`answer`] | `answer` and `reset` commands |
//! | [`show`] | `show` command |
//! | [`report`] | `report`, `top` and `summary` commands |
//! | [`migrate`] | `migrate` and `resolve` commands |
//! | [`sources`] | Backend status |
//! | [`questions`] | Question list and catalog check |
//! | [`init`] | Starter config and store |

pub mod answer;
pub mod backend;
pub mod config;
pub mod init;
pub mod local_store;
pub mod logging;
pub mod migrate;
pub mod questions;
pub mod remote_store;
pub mod report;
pub mod show;
pub mod sources;
