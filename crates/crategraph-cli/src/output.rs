//! Terminal output formatting.

use colored::Colorize;

use crategraph_core::SourceRow;
use crategraph_graph::{Coverage, SyncReport};

/// One row of the status table.
pub struct StatusLine {
    pub source_rows: i64,
    pub coverage: Coverage,
}

/// Print a single write result.
pub fn print_write(row: &SourceRow, matched: i64) {
    let count = match matched {
        0 => matched.to_string().yellow(),
        1 => matched.to_string().green(),
        _ => matched.to_string().red(),
    };
    println!("  {} {} {}", row.key, row.created_at_param().dimmed(), count);
}

/// Print the summary of one sync run.
pub fn print_report(report: &SyncReport) {
    println!("  Rows read:      {}", report.rows_read.to_string().cyan());
    println!("  Writes:         {}", report.writes.to_string().cyan());
    println!("  Nodes updated:  {}", report.nodes_updated.to_string().green());

    if report.missing > 0 {
        println!("  No match:       {}", report.missing.to_string().yellow());
    }
    if report.duplicates > 0 {
        println!("  Duplicate keys: {}", report.duplicates.to_string().yellow());
    }
    if report.has_failures() {
        println!("  Failed:         {}", report.failed.len().to_string().red());
        for failed in &report.failed {
            println!("    {} {}", failed.key.to_string().bold(), failed.error.dimmed());
        }
    }
    println!();
}

/// Print source counts next to graph coverage.
pub fn print_status(lines: &[StatusLine]) {
    println!("{}", "Sync Status".bold());
    println!("{}", "─".repeat(62));
    println!(
        "{:<10} {:>12} {:>12} {:>12} {:>12}",
        "Label", "Source rows", "Graph nodes", "With date", "Missing"
    );
    println!("{}", "─".repeat(62));

    for line in lines {
        let missing = line.coverage.missing();
        let missing_colored = if missing == 0 {
            format!("{:>12}", missing).green()
        } else {
            format!("{:>12}", missing).yellow()
        };
        println!(
            "{} {:>12} {:>12} {:>12} {}",
            format!("{:<10}", line.coverage.kind.label()).cyan(),
            line.source_rows,
            line.coverage.total,
            line.coverage.with_property,
            missing_colored
        );
    }

    println!("{}", "─".repeat(62));
}
