/// Report output: console table and CSV/HTML files
pub mod export;

use crate::analysis::project::ProjectReport;
use crate::truncate_utf8_safe;

pub use export::{render_csv, render_html, write_reports, ReportPaths};

const FILE_COLUMN_WIDTH: usize = 40;

/// Fixed-width summary table printed by `scan`
pub fn format_table(report: &ProjectReport) -> String {
    let mut out = format!(
        "{:<width$} {:>6} {:>6} {:>7} {:>6} {:<10} {}\n",
        "file",
        "issues",
        "avg_cc",
        "mi",
        "score",
        "grade",
        "warnings",
        width = FILE_COLUMN_WIDTH
    );
    for row in &report.files {
        out.push_str(&format!(
            "{:<width$} {:>6} {:>6.2} {:>7.2} {:>6} {:<10} {}\n",
            truncate_utf8_safe(&row.file.display().to_string(), FILE_COLUMN_WIDTH),
            row.issues.len(),
            row.metrics.avg_complexity,
            row.metrics.maintainability,
            row.metrics.score,
            row.metrics.grade.to_string(),
            row.warnings(),
            width = FILE_COLUMN_WIDTH
        ));
    }
    out.push_str(&format!("\nProject Score: {}\n", report.project_score));
    out
}
