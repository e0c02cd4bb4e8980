#![deny(missing_docs)]

//! # Schema Commands
//!
//! Serialized schema documents:
//! - `schema`: one resource as an OpenAPI object schema.
//! - `openapi`: the whole API as an OpenAPI 3.1 document.

use crate::error::CliResult;
use crate::settings::{ApiSource, Format, GlobalArgs};
use apimodel_core::AppError;
use std::io::Write;

/// Arguments for `schema`.
#[derive(clap::Args, Debug, Clone)]
pub struct SchemaArgs {
    /// The API holding the resource.
    #[clap(flatten)]
    pub source: ApiSource,

    /// Resource name; singular or plural, case-insensitive.
    pub resource: String,

    /// Output format.
    #[clap(long, short = 'f', value_enum, default_value_t = Format::Yaml)]
    pub format: Format,
}

/// Arguments for `openapi`.
#[derive(clap::Args, Debug, Clone)]
pub struct OpenApiArgs {
    /// The API to document.
    #[clap(flatten)]
    pub source: ApiSource,

    /// Output format.
    #[clap(long, short = 'f', value_enum, default_value_t = Format::Yaml)]
    pub format: Format,
}

/// Writes the schema of one resource.
pub fn schema(args: &SchemaArgs, global: &GlobalArgs, out: &mut impl Write) -> CliResult<()> {
    let model = args.source.load(global)?;
    let schema = model
        .resource_schema(&args.resource)?
        .ok_or_else(|| AppError::NotFound {
            kind: "resource",
            name: args.resource.clone(),
        })?;
    out.write_all(args.format.render(&schema)?.as_bytes())?;
    Ok(())
}

/// Writes the OpenAPI document of an API.
pub fn openapi(args: &OpenApiArgs, global: &GlobalArgs, out: &mut impl Write) -> CliResult<()> {
    let doc = args.source.load(global)?.openapi()?;
    tracing::debug!(paths = doc.paths.paths.len(), "rendering OpenAPI document");
    out.write_all(args.format.render(&doc)?.as_bytes())?;
    Ok(())
}
