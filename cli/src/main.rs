#![deny(missing_docs)]

//! # API Tool
//!
//! Command Line Interface for exploring service API models.
//!
//! Supported Commands:
//! - `list-apis`: APIs in the model repository.
//! - `info`: Summary counts of one API.
//! - `list-operations`, `list-objects`, `list-resources`: Tabular listings.
//! - `schema`: Object schema of one inferred resource.
//! - `openapi`: Full OpenAPI document of an API.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::ExitCode;

use crate::error::CliResult;
use crate::settings::GlobalArgs;

mod error;
mod info;
mod list;
mod repo;
mod schema;
mod settings;
mod table;

#[derive(Parser, Debug)]
#[clap(
    name = "api-tool",
    author,
    version,
    about = "Transform and inspect service API definitions"
)]
struct Cli {
    #[clap(flatten)]
    global: GlobalArgs,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lists the APIs in the model repository.
    #[clap(visible_alias = "apis")]
    ListApis(list::ListApisArgs),
    /// Shows summary information about an API.
    Info(info::InfoArgs),
    /// Lists the operations of an API.
    #[clap(visible_alias = "ops")]
    ListOperations(list::ListOperationsArgs),
    /// Lists the object types of an API.
    #[clap(visible_alias = "objects")]
    ListObjects(list::ListObjectsArgs),
    /// Lists the resources inferred for an API.
    #[clap(visible_alias = "resources")]
    ListResources(list::ListResourcesArgs),
    /// Shows the schema of one resource.
    Schema(schema::SchemaArgs),
    /// Shows the OpenAPI document of an API.
    #[clap(name = "openapi")]
    OpenApi(schema::OpenApiArgs),
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();
}

fn run(cli: &Cli, out: &mut impl Write) -> CliResult<()> {
    let global = &cli.global;
    match &cli.command {
        Commands::ListApis(args) => list::list_apis(args, global, out),
        Commands::Info(args) => info::execute(args, global, out),
        Commands::ListOperations(args) => list::list_operations(args, global, out),
        Commands::ListObjects(args) => list::list_objects(args, global, out),
        Commands::ListResources(args) => list::list_resources(args, global, out),
        Commands::Schema(args) => schema::schema(args, global, out),
        Commands::OpenApi(args) => schema::openapi(args, global, out),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.debug);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_objects() {
        let cli = Cli::try_parse_from([
            "api-tool",
            "objects",
            "sns",
            "--type",
            "scalar,exceptions",
            "--prefix",
            "Topic",
            "--cache-dir",
            "/tmp/cache",
        ])
        .unwrap();
        assert_eq!(cli.global.cache_dir, Some(std::path::PathBuf::from("/tmp/cache")));
        match cli.command {
            Commands::ListObjects(args) => {
                assert_eq!(args.source.api, "sns");
                assert_eq!(
                    args.kind,
                    vec![apimodel_core::ObjectKind::Scalar, apimodel_core::ObjectKind::Exception]
                );
                assert_eq!(args.prefix, vec!["Topic"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_docs_file_requires_model_file() {
        assert!(Cli::try_parse_from(["api-tool", "info", "sns", "--docs-file", "docs-2.json"]).is_err());
    }

    #[test]
    fn test_run_with_model_file() {
        let dir = tempdir().unwrap();
        let model_file = dir.path().join("api-2.json");
        std::fs::write(&model_file, repo::fixtures::EKS_MODEL).unwrap();
        let cli = Cli::try_parse_from([
            "api-tool",
            "schema",
            "eks",
            "Cluster",
            "--format",
            "json",
            "--model-file",
            model_file.to_str().unwrap(),
        ])
        .unwrap();
        let mut out = Vec::new();
        run(&cli, &mut out).unwrap();
        let schema: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(schema["required"], serde_json::json!(["name"]));
    }
}
