//! API schema resolution
//!
//! Turns a parsed OpenAPI document into the resolved operation model the test
//! synthesizer works from. Resolution is a collaborator behind the
//! [`SchemaResolver`] trait; [`OpenApiResolver`] is the bundled implementation.

pub mod model;
pub mod openapi;

use openapiv3::OpenAPI;
use thiserror::Error;

pub use model::*;
pub use openapi::OpenApiResolver;

/// Errors that make a document unusable as a whole
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("Failed to read schema components: {0}")]
    Components(#[from] serde_json::Error),
}

/// A problem in one part of the document that was skipped rather than fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverWarning {
    /// `METHOD /path` of the affected operation, when there is one
    pub path: Option<String>,
    pub message: String,
}

/// Output of a resolver run
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub document: ResolvedDocument,
    pub warnings: Vec<ResolverWarning>,
}

/// Converts a parsed document into resolved operations with every reference inlined
pub trait SchemaResolver: Send + Sync {
    fn resolve(&self, document: &OpenAPI) -> Result<Resolution, ResolveError>;
}
