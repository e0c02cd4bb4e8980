#![deny(missing_docs)]

//! # Info Command
//!
//! Prints the summary counts of one API.

use crate::error::CliResult;
use crate::settings::{ApiSource, GlobalArgs};
use std::io::Write;

/// Arguments for `info`.
#[derive(clap::Args, Debug, Clone)]
pub struct InfoArgs {
    /// The API to summarize.
    #[clap(flatten)]
    pub source: ApiSource,
}

/// Writes the API summary as aligned `label: value` lines.
pub fn execute(args: &InfoArgs, global: &GlobalArgs, out: &mut impl Write) -> CliResult<()> {
    let summary = args.source.load(global)?.summary()?;
    let lines: [(&str, String); 9] = [
        ("Full name", summary.full_name),
        ("API version", summary.api_version),
        ("Protocol", summary.protocol),
        ("Total operations", summary.operations.to_string()),
        ("Total objects", summary.objects.to_string()),
        ("Total scalars", summary.scalars.to_string()),
        ("Total payloads", summary.payloads.to_string()),
        ("Total exceptions", summary.exceptions.to_string()),
        ("Total lists", summary.lists.to_string()),
    ];
    let width = lines.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
    for (label, value) in lines {
        writeln!(out, "{:<width$} {}", format!("{}:", label), value, width = width)?;
    }
    Ok(())
}
