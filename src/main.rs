mod cli;
mod output;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use cli::{Cli, Command};
use tidycache::{host, logging, CacheManager, ClearOutcome, RegionKind};

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            output::print_warning(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose).context("failed to initialise logging")?;

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let manager = CacheManager::with_layout(&root, cli.layout());

    match &cli.command {
        Command::Stats => {
            if cli.json {
                print_json(&manager.stats())?;
            } else {
                let reports = manager.size_reports();
                output::print_banner(manager.root());
                output::print_summary_header("Cache regions");
                for report in &reports {
                    output::print_size_row(report);
                }
                output::print_separator();
                output::print_grand_total(reports.iter().map(|r| r.size_bytes).sum());
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Clear {
            region,
            older_than_hours,
        } => {
            let region = match region.as_deref() {
                None | Some("all") => None,
                Some(name) => Some(name.parse::<RegionKind>().map_err(anyhow::Error::msg)?),
            };

            if let Some(hours) = older_than_hours {
                if region.is_some_and(|r| r != RegionKind::TempUploads) {
                    bail!("--older-than-hours only applies to the temp region");
                }
                let max_age = Duration::from_secs(hours.saturating_mul(3600));
                let outcome = manager.clear_stale_temp_files(max_age);
                return print_single(&cli, &outcome);
            }

            match region {
                Some(kind) => print_single(&cli, &manager.clear_region(kind)),
                None => {
                    let report = manager.clear_all();
                    if cli.json {
                        print_json(&report)?;
                    } else {
                        output::print_banner(manager.root());
                        output::print_clear_report(&report);
                    }
                    Ok(exit_code(report.all_succeeded()))
                }
            }
        }

        Command::Host => {
            let report = host::host_report(manager.root());
            if cli.json {
                print_json(&report)?;
            } else {
                output::print_host(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_single(cli: &Cli, outcome: &ClearOutcome) -> Result<ExitCode> {
    if cli.json {
        print_json(outcome)?;
    } else {
        output::print_outcome(outcome);
        output::print_clean_complete(outcome.bytes_freed);
    }
    Ok(exit_code(outcome.success))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
