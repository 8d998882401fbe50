//! Console output for the report generator
//!
//! Every status line carries the `[report]` prefix so it can be grepped out
//! of CI logs.

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use storeqa_report::generator::ReportSummary;

pub const PREFIX: &str = "[report]";

/// Print success message
pub fn print_success(message: &str) {
    println!("{} ✅ {}", PREFIX, message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} ❌ {}", PREFIX, message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} ⚠️  {}", PREFIX, message);
}

/// Build the executive summary as a terminal table
pub fn summary_table(summary: &ReportSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Category", "Total", "Passed", "Failed", "Skipped", "Pass Rate"]);

    let rows = summary
        .categories
        .iter()
        .map(|c| (c.name.as_str(), &c.summary))
        .chain(std::iter::once(("overall", &summary.overall)));
    for (name, counts) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(counts.total).set_alignment(CellAlignment::Right),
            Cell::new(counts.passed).set_alignment(CellAlignment::Right),
            Cell::new(counts.failed).set_alignment(CellAlignment::Right),
            Cell::new(counts.skipped).set_alignment(CellAlignment::Right),
            Cell::new(counts.pass_rate_display()).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Print the executive summary table to stdout
pub fn print_summary(summary: &ReportSummary) {
    println!("{}", summary_table(summary));
    println!(
        "{} {} known issue(s), {} new bug(s)",
        PREFIX, summary.known_failures, summary.new_bugs
    );
}
