//! ```text
//! StoreConfig ──► PromptStore ──► TrustedPrompt
//!                                     │
//!                                     ▼
//! SecurityPipeline ──► execute(prompt, input) ──► PipelineResult
//!                          │
//!                          ├─► InputValidator   (length, encoding, traversal)
//!                          ├─► InputSanitizer   (injection blacklist)
//!                          └─► AuditorStage ──► AuditTrail (access + security logs)
//! ```
//!
//! # promptgate
//!
//! **Security pipeline guarding trusted system prompts from untrusted input.**
//!
//! `promptgate` sits between untrusted text and the trusted, versioned system
//! prompt it is about to be merged with. Each request runs through an ordered,
//! short-circuiting chain of security stages that share one mutable
//! [`PipelineResult`](pipeline::PipelineResult); the first stage to reject the
//! input halts the chain. Trusted prompts themselves are loaded through a
//! checksum-verified [`PromptStore`](store::PromptStore), which establishes
//! the trust boundary the pipeline protects.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use promptgate::prelude::*;
//!
//! let store = PromptStore::builder()
//!     .with_config_file("config/prompts.json")?
//!     .build()?;
//! let prompt = store.load("metaMentorSystem")?;
//!
//! let pipeline = SecurityPipeline::new()
//!     .with_context("user", "system-admin")
//!     .add_stage(InputValidator::default())
//!     .add_stage(InputSanitizer::new())
//!     .add_stage(AuditorStage::new(AuditTrail::new("audit")?));
//!
//! let result = pipeline.execute(&prompt, "What are the core principles?");
//! assert!(result.passed());
//! ```
//!
//! ## Execution model
//!
//! - One fresh [`PipelineResult`](pipeline::PipelineResult) per `execute`
//!   call, seeded with the pipeline's base context.
//! - Stages run in registration order; a stage that marks the result failed
//!   short-circuits the rest of the chain.
//! - Unexpected faults inside a stage are caught at the pipeline boundary
//!   and converted into an ordinary failure — `execute` never panics or
//!   returns an error for stage-level problems.
//! - Everything is synchronous; concurrency comes from callers invoking
//!   `execute` on a shared, already-configured pipeline from multiple
//!   threads. The only internal lock is the audit trail's per-destination
//!   write mutex.
//!
//! ## Modules
//!
//! - [`config`] – Prompt store configuration (JSON/TOML/YAML loading)
//! - [`store`] – Trusted prompt loading and checksum verification
//! - [`pipeline`] – The stage chain, shared result, and stage trait
//! - [`input`] – Validator and sanitizer stages plus the injection blacklist
//! - [`audit`] – Append-only audit trail and the auditor stage

#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod audit;
pub mod config;
pub mod input;
pub mod pipeline;
pub mod store;

/// Re-exports for convenient access to core types
pub mod prelude {
    pub use crate::audit::{AuditTrail, AuditorStage};
    pub use crate::config::{ConfigError, PromptEntry, StoreConfig};
    pub use crate::input::patterns::{INJECTION_PATTERNS, InjectionScanner};
    pub use crate::input::sanitizer::InputSanitizer;
    pub use crate::input::validator::InputValidator;
    pub use crate::pipeline::{PipelineResult, SecurityPipeline, SecurityStage, StageFault};
    pub use crate::store::{LoadError, PromptStore, PromptStoreBuilder, TrustedPrompt, checksum};
}
