//! CSV and HTML report files
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::analysis::project::{FileReport, ProjectReport};

pub const CSV_FILE_NAME: &str = "report.csv";
pub const HTML_FILE_NAME: &str = "report.html";

pub const COLUMNS: [&str; 13] = [
    "file",
    "functions",
    "classes",
    "loops",
    "conditionals",
    "ast_complexity",
    "issues",
    "ai_feedback",
    "avg_complexity",
    "maintainability",
    "score",
    "grade",
    "warnings",
];

/// Locations of the files written by [`write_reports`]
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub html: PathBuf,
}

/// Cell values of one row, in column order
pub fn row_cells(row: &FileReport) -> Vec<String> {
    let issues = row
        .issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join(" | ");
    vec![
        row.file.display().to_string(),
        row.functions.to_string(),
        row.classes.to_string(),
        row.loops.to_string(),
        row.conditionals.to_string(),
        row.ast_complexity.to_string(),
        issues,
        row.ai_feedback(),
        row.metrics.avg_complexity.to_string(),
        row.metrics.maintainability.to_string(),
        row.metrics.score.to_string(),
        row.metrics.grade.to_string(),
        row.warnings(),
    ]
}

/// RFC 4180 quoting: fields with commas, quotes or line breaks are wrapped in quotes
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_csv(report: &ProjectReport) -> String {
    let mut out = COLUMNS.join(",");
    out.push('\n');
    for row in &report.files {
        let cells: Vec<String> = row_cells(row).iter().map(|c| csv_field(c)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn render_html(report: &ProjectReport) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<title>Code Review Report</title>\n</head>\n<body>\n");
    html.push_str("<table border=\"1\" class=\"dataframe\">\n");
    html.push_str(&format!(
        "<caption>Project Score: {} &middot; generated {}</caption>\n",
        report.project_score,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    html.push_str("<thead>\n<tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in &report.files {
        html.push_str("<tr>");
        for cell in row_cells(row) {
            html.push_str(&format!("<td>{}</td>", html_escape(&cell)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// Write `report.csv` and `report.html` into `dir`
pub fn write_reports(report: &ProjectReport, dir: &Path) -> Result<ReportPaths> {
    let csv = dir.join(CSV_FILE_NAME);
    let html = dir.join(HTML_FILE_NAME);
    std::fs::write(&csv, render_csv(report))
        .with_context(|| format!("Failed to write {}", csv.display()))?;
    std::fs::write(&html, render_html(report))
        .with_context(|| format!("Failed to write {}", html.display()))?;
    Ok(ReportPaths { csv, html })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quotes_special_fields() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn html_escapes_markup() {
        assert_eq!(html_escape("<b>&'\""), "&lt;b&gt;&amp;&#x27;&quot;");
    }

    #[test]
    fn csv_has_header_and_one_line_per_file() {
        let row = FileReport::syntax_failure("bad.py".into(), "Syntax Error: x".into());
        let report = ProjectReport::new(vec![row]);
        let csv = render_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], COLUMNS.join(","));
        assert!(lines[1].starts_with("bad.py,0,0,0,0,0,"));
        assert!(lines[1].ends_with(",0,0,0,Error,Syntax Error: x"));
    }
}
