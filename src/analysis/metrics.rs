/// Complexity, maintainability and quality score for a Python file
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;
use tracing::warn;

use crate::analysis::ast::parser::{named_children, parse_python, ParsedSource};
use crate::analysis::ast::visitor::{ComplexityVisitor, HalsteadCounts};
use crate::analysis::timings;
use crate::config::AnalyzerConfig;

/// Blocks above this complexity get a moderate-complexity warning
pub const MODERATE_COMPLEXITY: f64 = 5.0;
/// Maintainability below this costs ten points
pub const MODERATE_MAINTAINABILITY: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Excellent,
    Good,
    Moderate,
    Poor,
    Error,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::Excellent,
            75..=89 => Grade::Good,
            60..=74 => Grade::Moderate,
            _ => Grade::Poor,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::Moderate => "Moderate",
            Grade::Poor => "Poor",
            Grade::Error => "Error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub avg_complexity: f64,
    pub maintainability: f64,
    pub score: u32,
    pub grade: Grade,
    pub warnings: Vec<String>,
}

impl Metrics {
    /// Zeroed metrics used when computation fails
    pub fn failed() -> Self {
        Self {
            avg_complexity: 0.0,
            maintainability: 0.0,
            score: 0,
            grade: Grade::Error,
            warnings: Vec::new(),
        }
    }

    /// True when a block crossed the critical complexity threshold
    pub fn has_critical_warning(&self) -> bool {
        self.warnings.iter().any(|w| w.starts_with("CRITICAL"))
    }
}

/// Line statistics used by the maintainability index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCounts {
    pub loc: usize,
    pub lloc: usize,
    pub sloc: usize,
    pub comments: usize,
    pub multi: usize,
    pub blank: usize,
    pub single_comments: usize,
}

impl RawCounts {
    pub fn collect(parsed: &ParsedSource) -> Self {
        let source = parsed.source();
        let mut counts = RawCounts::default();
        let mut comment_rows = BTreeSet::new();

        let mut stack = vec![parsed.root()];
        while let Some(node) = stack.pop() {
            let kind = node.kind();
            if kind == "comment" {
                comment_rows.insert(node.start_position().row);
            } else if is_logical_line(kind) {
                counts.lloc += 1;
            }
            if kind == "expression_statement" {
                counts.multi += string_statement_lines(node);
            }
            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }

        for line in source.lines() {
            counts.loc += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                counts.blank += 1;
            } else if trimmed.starts_with('#') {
                counts.single_comments += 1;
            }
        }
        counts.comments = comment_rows.len();
        counts.sloc = counts
            .loc
            .saturating_sub(counts.blank + counts.single_comments + counts.multi);
        counts
    }

    /// Comment lines (multi-line strings included) as a percentage of source lines
    pub fn comment_percent(&self) -> f64 {
        if self.sloc == 0 {
            return 0.0;
        }
        (self.comments + self.multi) as f64 / self.sloc as f64 * 100.0
    }
}

fn is_logical_line(kind: &str) -> bool {
    kind.ends_with("_statement")
        || matches!(
            kind,
            "function_definition"
                | "class_definition"
                | "elif_clause"
                | "else_clause"
                | "except_clause"
                | "except_group_clause"
                | "finally_clause"
                | "case_clause"
        )
}

/// Lines spanned by a standalone multi-line string statement (docstrings)
fn string_statement_lines(stmt: tree_sitter::Node) -> usize {
    match named_children(stmt).as_slice() {
        [expr] if matches!(expr.kind(), "string" | "concatenated_string") => {
            let rows = expr.end_position().row - expr.start_position().row;
            if rows > 0 {
                rows + 1
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Maintainability index on a 0..100 scale. `comment_percent` is 0..100.
pub fn maintainability_index(volume: f64, complexity: f64, lloc: f64, comment_percent: f64) -> f64 {
    if volume <= 0.0 || lloc <= 0.0 {
        return 100.0;
    }
    let comments_scale = (2.46 * comment_percent.to_radians()).sqrt();
    let raw = 171.0 - 5.2 * volume.ln() - 0.23 * complexity - 16.2 * lloc.ln()
        + 50.0 * comments_scale.sin();
    (raw * 100.0 / 171.0).clamp(0.0, 100.0)
}

/// Score from 100 with deductions for complexity and maintainability
pub fn score(avg_complexity: f64, maintainability: f64, config: &AnalyzerConfig) -> u32 {
    let mut score: u32 = 100;
    if avg_complexity > config.complexity_threshold {
        score -= 20;
    } else if avg_complexity > MODERATE_COMPLEXITY {
        score -= 10;
    }
    if maintainability < config.maintainability_threshold {
        score -= 20;
    } else if maintainability < MODERATE_MAINTAINABILITY {
        score -= 10;
    }
    score
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute metrics for `source`. Never fails: errors yield `Metrics::failed()`.
pub fn compute_metrics(source: &str, config: &AnalyzerConfig) -> Metrics {
    match try_compute_metrics(source, config) {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!("metrics computation failed: {e:#}");
            Metrics::failed()
        }
    }
}

pub fn try_compute_metrics(source: &str, config: &AnalyzerConfig) -> Result<Metrics> {
    let t0 = Instant::now();
    let parsed = parse_python(source)?;
    let visitor = ComplexityVisitor::visit(&parsed);

    let mut warnings = Vec::new();
    for block in visitor.blocks() {
        let complexity = f64::from(block.complexity);
        if complexity > config.complexity_threshold {
            warnings.push(format!("CRITICAL: {} highly complex", block.name));
        } else if complexity > MODERATE_COMPLEXITY {
            warnings.push(format!("WARNING: {} moderate complexity", block.name));
        }
    }

    let blocks = visitor.blocks();
    let avg_complexity = if blocks.is_empty() {
        0.0
    } else {
        blocks.iter().map(|b| f64::from(b.complexity)).sum::<f64>() / blocks.len() as f64
    };

    let raw = RawCounts::collect(&parsed);
    let halstead = HalsteadCounts::collect(&parsed);
    let maintainability = maintainability_index(
        halstead.volume(),
        f64::from(visitor.total_complexity()),
        raw.lloc as f64,
        raw.comment_percent(),
    );
    if !maintainability.is_finite() {
        anyhow::bail!("maintainability index is not finite");
    }

    let avg_complexity = round2(avg_complexity);
    let maintainability = round2(maintainability);
    let score = score(avg_complexity, maintainability, config);
    timings::record("metrics/python", t0.elapsed().as_millis());

    Ok(Metrics {
        avg_complexity,
        maintainability,
        score,
        grade: Grade::from_score(score),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bands() {
        assert_eq!(Grade::from_score(100), Grade::Excellent);
        assert_eq!(Grade::from_score(90), Grade::Excellent);
        assert_eq!(Grade::from_score(89), Grade::Good);
        assert_eq!(Grade::from_score(75), Grade::Good);
        assert_eq!(Grade::from_score(74), Grade::Moderate);
        assert_eq!(Grade::from_score(60), Grade::Moderate);
        assert_eq!(Grade::from_score(59), Grade::Poor);
    }

    #[test]
    fn score_deductions() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(score(12.0, 50.0, &cfg), 60);
        assert_eq!(score(3.0, 90.0, &cfg), 100);
        assert_eq!(score(6.0, 70.0, &cfg), 80);
        assert_eq!(score(10.0, 65.0, &cfg), 80);
    }

    #[test]
    fn maintainability_is_full_for_empty_input() {
        assert_eq!(maintainability_index(0.0, 1.0, 0.0, 0.0), 100.0);
    }

    #[test]
    fn maintainability_is_clamped() {
        let mi = maintainability_index(1e12, 500.0, 1e6, 0.0);
        assert_eq!(mi, 0.0);
    }

    #[test]
    fn docstring_lines_count_as_comments() {
        let parsed = parse_python("def run():\n    \"\"\"Run.\n\n    Details.\n    \"\"\"\n    return 2\n").unwrap();
        let raw = RawCounts::collect(&parsed);
        assert_eq!(raw.multi, 4);
        assert!(raw.comment_percent() > 0.0);
    }
}
