use colored::Colorize;

use tidycache::host::HostReport;
use tidycache::utils::{display_path, format_size};
use tidycache::{ClearAllReport, ClearOutcome, SizeReport};

pub fn print_banner(root: &std::path::Path) {
    println!(
        "{} {}",
        "tidycache".bold().cyan(),
        display_path(root).dimmed()
    );
    println!();
}

pub fn print_summary_header(title: &str) {
    println!("{}", format!("=== {title} ===").bold().white());
}

pub fn print_size_row(report: &SizeReport) {
    println!(
        "  {:<30} {}",
        report.region.label(),
        report.display().green()
    );
}

pub fn print_separator() {
    println!("  {}", "─".repeat(45).dimmed());
}

pub fn print_grand_total(bytes: u64) {
    println!(
        "  {:<30} {}",
        "Total reclaimable:".bold(),
        format_size(bytes).green().bold()
    );
    println!();
}

pub fn print_outcome(outcome: &ClearOutcome) {
    if outcome.success {
        println!(
            "  {} {:<22} {}",
            "Cleared".green(),
            outcome.region.label(),
            outcome.message.dimmed()
        );
    } else {
        println!(
            "  {} {:<23} {}",
            "Failed".red().bold(),
            outcome.region.label(),
            outcome.message.red()
        );
    }
    for failure in outcome.failures.iter().filter(|f| !f.is_vanished()) {
        println!("    {} {}", "skipped".yellow(), failure.to_string().dimmed());
    }
}

pub fn print_clear_report(report: &ClearAllReport) {
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    println!();
    print_clean_complete(report.bytes_freed());
}

pub fn print_clean_complete(freed: u64) {
    println!(
        "{} {}",
        "Cleaned!".green().bold(),
        format!("{} freed.", format_size(freed)).green()
    );
}

pub fn print_host(report: &HostReport) {
    print_summary_header("Host");
    match &report.disk {
        Some(disk) => println!(
            "  {:<30} {} used / {} total ({:.0}%)",
            "Disk:",
            format_size(disk.used),
            format_size(disk.total),
            disk.usage_percent()
        ),
        None => println!("  {:<30} {}", "Disk:", "unavailable".dimmed()),
    }
    println!(
        "  {:<30} {} / {} ({:.0}%)",
        "Memory:",
        format_size(report.memory.used),
        format_size(report.memory.total),
        report.memory.usage_percent()
    );
    let status = report.status.label();
    let status = match report.status {
        tidycache::host::HealthStatus::Good => status.green(),
        tidycache::host::HealthStatus::Warning => status.yellow(),
        tidycache::host::HealthStatus::Critical => status.red().bold(),
    };
    println!("  {:<30} {}", "Status:", status);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg.red());
}
