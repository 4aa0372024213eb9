//! Core functionality for apitest
//!
//! Synthesizes a conformance test suite from an OpenAPI document, runs it, and
//! reports per-test outcomes through a tracked run lifecycle:
//!
//! - [`source`] fetches the document from a file or URL
//! - [`parser`] resolves it into operations with every reference inlined
//! - [`test_gen`] classifies bodies and writes the generated test package
//! - [`runner`] builds and runs that package and parses its output
//! - [`pipeline`] sequences the stages and drives the run state machine
//! - [`notify`] fans state changes out to storage and subscribers

pub mod config;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod runner;
pub mod source;
pub mod test_gen;

pub use config::PipelineConfig;
pub use pipeline::{Orchestrator, PipelineError, RunStatus, TestDescriptor};
pub use source::{BasicAuth, OpenApiSource};
