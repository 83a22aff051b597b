use crate::core::models::{ScanRecord, TaskStatus};
use crate::tools::checker::ToolStatus;
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indexmap::IndexMap;

const OUTPUT_PREVIEW_CHARS: usize = 60;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    table
}

fn status_cell(status: TaskStatus) -> Cell {
    let color = match status {
        TaskStatus::Completed => Color::Green,
        TaskStatus::Failed => Color::Yellow,
        TaskStatus::Error => Color::Red,
        TaskStatus::Pending => Color::Grey,
    };
    Cell::new(status).fg(color)
}

/// First line of `output`, cut to a table-friendly width.
fn preview(output: &str) -> String {
    let line = output.lines().next().unwrap_or("");
    if line.chars().count() > OUTPUT_PREVIEW_CHARS {
        let cut: String = line.chars().take(OUTPUT_PREVIEW_CHARS).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

pub fn print_completed(target: &str, analysis: &str, results: &IndexMap<String, String>) {
    println!("\n{}", "═══════════════════════════════════════".green().bold());
    println!("{}", "Scan Complete".green().bold());
    println!("{}", "═══════════════════════════════════════".green().bold());
    println!("\n{}: {}", "Target".cyan().bold(), target);

    for (description, output) in results {
        println!("\n{}", description.yellow().bold());
        if output.is_empty() {
            println!("  {}", "(no output)".dimmed());
        }
        for line in output.lines() {
            println!("  {}", line);
        }
    }

    println!("\n{}", "Analysis:".yellow().bold());
    println!("{}", analysis);
}

pub fn history_table(records: &[ScanRecord]) -> String {
    let mut table = new_table(&["ID", "Time (UTC)", "Target", "Tool", "Status", "Output"]);
    for record in records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&record.target),
            Cell::new(&record.tool),
            status_cell(record.status),
            Cell::new(preview(&record.output)),
        ]);
    }
    table.to_string()
}

pub fn print_history(records: &[ScanRecord]) {
    if records.is_empty() {
        println!("{}", "No scans recorded yet.".dimmed());
        return;
    }
    println!("{}", history_table(records));
}

pub fn tools_table(statuses: &[ToolStatus]) -> String {
    let mut table = new_table(&["Tool", "Binary", "Status"]);
    for status in statuses {
        let state = match &status.path {
            Some(path) => Cell::new(path.display()).fg(Color::Green),
            None => Cell::new("not found").fg(Color::Red),
        };
        table.add_row(vec![Cell::new(status.tool), Cell::new(&status.binary), state]);
    }
    table.to_string()
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "⚠".yellow().bold(), warning.yellow());
    }
}
