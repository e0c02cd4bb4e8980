#![deny(missing_docs)]

//! # Listing Commands
//!
//! Tabular listings of APIs, operations, objects and resources.

use crate::error::CliResult;
use crate::repo::ApiFilter;
use crate::settings::{ApiSource, GlobalArgs};
use crate::table::Table;
use apimodel_core::{ObjectFilter, ObjectKind, OperationFilter};
use std::io::Write;

/// Arguments for `list-apis`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ListApisArgs {
    /// Comma-delimited API aliases to show.
    #[clap(long, short = 'f', value_delimiter = ',')]
    pub filter: Vec<String>,

    /// Comma-delimited protocols to show (query, rest-json, rest-xml, json, ec2).
    #[clap(long, short = 'p', value_delimiter = ',')]
    pub protocol: Vec<String>,
}

/// Arguments for `list-operations`.
#[derive(clap::Args, Debug, Clone)]
pub struct ListOperationsArgs {
    /// The API to inspect.
    #[clap(flatten)]
    pub source: ApiSource,

    /// Comma-delimited HTTP methods to filter by.
    #[clap(long, short = 'm', value_delimiter = ',')]
    pub method: Vec<String>,

    /// Comma-delimited name prefixes to filter by.
    #[clap(long, short = 'p', value_delimiter = ',')]
    pub prefix: Vec<String>,
}

/// Arguments for `list-objects`.
#[derive(clap::Args, Debug, Clone)]
pub struct ListObjectsArgs {
    /// The API to inspect.
    #[clap(flatten)]
    pub source: ApiSource,

    /// Comma-delimited object types (scalar, object, payload, exception, list).
    #[clap(long = "type", short = 't', value_delimiter = ',', value_parser = parse_kind)]
    pub kind: Vec<ObjectKind>,

    /// Comma-delimited name prefixes to filter by.
    #[clap(long, short = 'p', value_delimiter = ',')]
    pub prefix: Vec<String>,
}

/// Arguments for `list-resources`.
#[derive(clap::Args, Debug, Clone)]
pub struct ListResourcesArgs {
    /// The API to inspect.
    #[clap(flatten)]
    pub source: ApiSource,
}

/// Parses an object type name; plural forms are accepted.
fn parse_kind(s: &str) -> Result<ObjectKind, String> {
    s.parse::<ObjectKind>().map_err(|e| e.to_string())
}

/// Lists the APIs in the model repository.
pub fn list_apis(args: &ListApisArgs, global: &GlobalArgs, out: &mut impl Write) -> CliResult<()> {
    let filter = ApiFilter {
        aliases: args.filter.clone(),
        protocols: args.protocol.clone(),
    };
    let repo = global.repo()?;
    let apis = repo.list_apis(&filter)?;
    tracing::debug!(root = ?repo.root(), count = apis.len(), "listed APIs");
    let mut table = Table::new(["Alias", "API Version", "Protocol", "Full Name"]);
    for api in &apis {
        let metadata = &api.spec().metadata;
        table.push([
            api.alias(),
            metadata.api_version.as_str(),
            metadata.protocol.as_str(),
            metadata.service_full_name.as_str(),
        ]);
    }
    out.write_all(table.render().as_bytes())?;
    Ok(())
}

/// Lists an API's operations.
pub fn list_operations(
    args: &ListOperationsArgs,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> CliResult<()> {
    let model = args.source.load(global)?;
    let filter = OperationFilter::any()
        .with_methods(args.method.iter().cloned())
        .with_prefixes(args.prefix.iter().cloned());
    let mut table = Table::new(["Name", "HTTP Method"]);
    for op in model.operations(&filter)? {
        table.push([op.name.as_str(), op.method.as_str()]);
    }
    out.write_all(table.render().as_bytes())?;
    Ok(())
}

/// Lists an API's objects.
pub fn list_objects(args: &ListObjectsArgs, global: &GlobalArgs, out: &mut impl Write) -> CliResult<()> {
    let model = args.source.load(global)?;
    let filter = ObjectFilter::any()
        .with_kinds(args.kind.iter().copied())
        .with_prefixes(args.prefix.iter().cloned());
    let mut table = Table::new(["Name", "Object Type", "Data Type"]);
    for obj in model.objects(&filter)? {
        table.push([obj.name.as_str(), obj.kind.as_str(), obj.data_type.as_str()]);
    }
    out.write_all(table.render().as_bytes())?;
    Ok(())
}

/// Lists the resources inferred for an API.
pub fn list_resources(
    args: &ListResourcesArgs,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> CliResult<()> {
    let model = args.source.load(global)?;
    let mut table = Table::new(["Singular", "Plural", "Properties", "Required"]);
    for resource in model.resources()?.values() {
        table.push([
            resource.singular_name.clone(),
            resource.plural_name.clone(),
            resource.properties.len().to_string(),
            resource.required.join(", "),
        ]);
    }
    out.write_all(table.render().as_bytes())?;
    Ok(())
}
