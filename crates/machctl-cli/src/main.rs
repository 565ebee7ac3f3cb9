use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug, info};

use machctl_core::issues::catalog::{Issue, all_issues};
use machctl_core::report::render;
use machctl_core::{CATALOG_VERSION, IssueConfig, find_issues};

mod args;
mod input;
mod telemetry;

use args::{Command, IssuesArgs, OutputArgs, OutputFormat};

#[derive(Serialize)]
struct CatalogListing {
    catalog_version: &'static str,
    issues: Vec<Issue>,
}

fn main() -> Result<()> {
    let args = args::Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init_tracing(args.log_json, level);

    match args.command {
        Command::Issues(issues) => run_issues(issues),
        Command::Types(output) => run_types(&output),
    }
}

fn run_issues(args: IssuesArgs) -> Result<()> {
    let machines = input::load_inventory(args.inventory.as_deref())?;
    info!(machines = machines.len(), "inventory loaded");

    let config = IssueConfig::new(&machines)
        .with_severity(args.severity)
        .with_only(args.only)
        .with_omit(args.omit)
        .with_last_error_threshold(args.last_error_threshold);
    debug!(
        severity = %config.severity,
        only = ?config.only,
        omit = ?config.omit,
        last_error_threshold_secs = config.last_error_threshold.num_seconds(),
        "evaluating issues"
    );

    let report = find_issues(&config);
    info!(
        machines = report.len(),
        issues = report.finding_count(),
        highest = ?report.highest_severity(),
        "evaluation finished"
    );

    let output = match args.output.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
        OutputFormat::Yaml => serde_yaml::to_string(&report)?,
        OutputFormat::Table => render::render_text(&report),
    };
    write_output(args.output.out.as_deref(), &output)?;

    if args.fail && !report.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_types(args: &OutputArgs) -> Result<()> {
    let issues = all_issues();
    let output = match args.format {
        OutputFormat::Table => render::render_catalog(&issues),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&CatalogListing {
                catalog_version: CATALOG_VERSION,
                issues,
            })? + "\n"
        }
        OutputFormat::Yaml => serde_yaml::to_string(&CatalogListing {
            catalog_version: CATALOG_VERSION,
            issues,
        })?,
    };
    write_output(args.out.as_deref(), &output)
}

fn write_output(out: Option<&Path>, output: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("failed to write output: {}", path.display())),
        None => {
            print!("{output}");
            Ok(())
        }
    }
}
