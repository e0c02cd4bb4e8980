#![deny(missing_docs)]

//! # API Model Core
//!
//! Shape graph, schema synthesis and resource inference for service API
//! models (`api-2.json` / `docs-2.json`).

/// Shared error types.
pub mod error;

/// Raw model and documentation documents.
pub mod spec;

/// Classified shape graph and resolved operations.
pub mod graph;

/// OpenAPI schema constructors over `utoipa`.
pub mod schema;

/// Cycle-safe schema synthesis and the component registry.
pub mod synthesizer;

/// Singular/plural inflection.
pub mod inflection;

/// Resource inference from creation operations.
pub mod resource;

/// Operation and object filters.
pub mod filter;

/// Full OpenAPI document assembly.
pub mod document;

/// Memoizing model facade.
pub mod model;

pub use document::build_openapi;
pub use error::{AppError, AppResult};
pub use filter::{ObjectFilter, OperationFilter};
pub use graph::{Member, Object, ObjectId, ObjectKind, Operation, ShapeGraph};
pub use inflection::{EnglishInflector, Inflector};
pub use model::{ApiModel, ApiSummary};
pub use resource::{infer_resources, Resource};
pub use schema::{RefOr, Schema};
pub use spec::{load_api_spec, load_doc_spec, parse_api_spec, parse_doc_spec, ApiSpec, DocSpec, Protocol};
pub use synthesizer::{ComponentRegistry, Synthesizer};
