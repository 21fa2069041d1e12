//! Project orchestration: discover Python files, run the per-file pipeline and
//! persist the CSV/HTML reports.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::analysis::ast::issues::{Issue, IssueDetector, Severity};
use crate::analysis::ast::parser::{decode_source, parse_python};
use crate::analysis::ast::structure::{ast_complexity, extract_structure};
use crate::analysis::metrics::{compute_metrics, Grade, Metrics};
use crate::config::AnalyzerConfig;
use crate::feedback::{Feedback, FeedbackResolver, FeedbackSource};
use crate::report::export::write_reports;

pub const SYNTAX_ERROR_FEEDBACK: &str = "Fix syntax errors before analysis";
pub const UNANALYZABLE_FEEDBACK: &str = "File could not be analyzed";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("No Python files found in {}", .0.display())]
    NoFilesFound(PathBuf),
}

/// Analysis results for one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file: PathBuf,
    pub functions: usize,
    pub classes: usize,
    pub loops: usize,
    pub conditionals: usize,
    pub ast_complexity: u32,
    pub issues: Vec<Issue>,
    pub feedback: Feedback,
    pub metrics: Metrics,
    pub syntax_error: bool,
}

impl FileReport {
    /// Row for a file that failed to parse
    pub fn syntax_failure(file: PathBuf, message: String) -> Self {
        let mut metrics = Metrics::failed();
        metrics.warnings = vec![message.clone()];
        Self {
            file,
            functions: 0,
            classes: 0,
            loops: 0,
            conditionals: 0,
            ast_complexity: 0,
            issues: vec![Issue::syntax_error(message)],
            feedback: Feedback {
                suggestions: vec![SYNTAX_ERROR_FEEDBACK.to_string()],
                source: FeedbackSource::RuleBased,
            },
            metrics,
            syntax_error: true,
        }
    }

    /// Row for a file the parser refused for a reason other than its syntax
    /// (size limit, grammar or parser failure). No issues, grade Error.
    pub fn unanalyzable(file: PathBuf, message: String) -> Self {
        let mut metrics = Metrics::failed();
        metrics.warnings = vec![message];
        Self {
            file,
            functions: 0,
            classes: 0,
            loops: 0,
            conditionals: 0,
            ast_complexity: 0,
            issues: Vec::new(),
            feedback: Feedback {
                suggestions: vec![UNANALYZABLE_FEEDBACK.to_string()],
                source: FeedbackSource::RuleBased,
            },
            metrics,
            syntax_error: false,
        }
    }

    pub fn ai_feedback(&self) -> String {
        self.feedback.joined()
    }

    pub fn warnings(&self) -> String {
        self.metrics.warnings.join("; ")
    }

    /// Error grade, CRITICAL complexity warning or CRITICAL issue
    pub fn is_failing(&self) -> bool {
        self.metrics.grade == Grade::Error
            || self.metrics.has_critical_warning()
            || self.issues.iter().any(|i| i.level == Severity::Critical)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectReport {
    pub files: Vec<FileReport>,
    pub project_score: f64,
}

impl ProjectReport {
    pub fn new(files: Vec<FileReport>) -> Self {
        let project_score = if files.is_empty() {
            0.0
        } else {
            let total: f64 = files.iter().map(|f| f64::from(f.metrics.score)).sum();
            (total / files.len() as f64 * 100.0).round() / 100.0
        };
        Self { files, project_score }
    }

    pub fn scan_failed(&self) -> bool {
        self.files.iter().any(FileReport::is_failing)
    }
}

/// A `.py` file yields itself, a directory is walked recursively, anything else yields nothing
pub fn collect_python_files(path: &Path, config: &AnalyzerConfig) -> Vec<PathBuf> {
    if path.is_file() {
        return if is_python_file(path) { vec![path.to_path_buf()] } else { Vec::new() };
    }

    let excluded = config.exclude_matcher();
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let skip = entry.depth() > 0
                && entry.file_type().is_dir()
                && excluded.is_match(Path::new(entry.file_name()));
            if skip {
                debug!("skipping excluded directory {}", entry.path().display());
            }
            !skip
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_python_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

/// Run the whole pipeline on one file's source
pub async fn analyze_file(
    path: &Path,
    source: &str,
    config: &AnalyzerConfig,
    resolver: &FeedbackResolver,
) -> FileReport {
    let parsed = match parse_python(source) {
        Ok(parsed) => parsed,
        Err(e) if e.is_syntax() => {
            return FileReport::syntax_failure(path.to_path_buf(), e.to_string())
        }
        Err(e) => {
            warn!("skipping {}: {}", path.display(), e);
            return FileReport::unanalyzable(path.to_path_buf(), e.to_string());
        }
    };

    let structure = extract_structure(&parsed);
    let complexity = ast_complexity(&parsed);
    let issues = IssueDetector::new().detect(&parsed);
    drop(parsed);

    let feedback = resolver.resolve(&issues, source).await;
    let metrics = compute_metrics(source, config);

    FileReport {
        file: path.to_path_buf(),
        functions: structure.functions.len(),
        classes: structure.classes.len(),
        loops: structure.loops,
        conditionals: structure.conditionals,
        ast_complexity: complexity,
        issues,
        feedback,
        metrics,
        syntax_error: false,
    }
}

/// Analyze every collected file without writing anything
pub async fn analyze_path(
    path: &Path,
    config: &AnalyzerConfig,
    resolver: &FeedbackResolver,
) -> Result<ProjectReport> {
    let files = collect_python_files(path, config);
    if files.is_empty() {
        return Err(ProjectError::NoFilesFound(path.to_path_buf()).into());
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let bytes =
            std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
        let row = match decode_source(bytes) {
            Ok(source) => analyze_file(&file, &source, config, resolver).await,
            Err(e) => FileReport::syntax_failure(file, e.to_string()),
        };
        reports.push(row);
    }
    Ok(ProjectReport::new(reports))
}

/// Directory receiving report.csv / report.html for `path`
pub fn report_dir(path: &Path) -> PathBuf {
    if path.is_file() {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        path.to_path_buf()
    }
}

/// Analyze and write `report.csv` and `report.html` next to the analyzed files
pub async fn analyze_project(
    path: &Path,
    config: &AnalyzerConfig,
    resolver: &FeedbackResolver,
) -> Result<ProjectReport> {
    let report = analyze_path(path, config, resolver).await?;
    let written = write_reports(&report, &report_dir(path))?;
    info!(
        "reports written to {} and {}",
        written.csv.display(),
        written.html.display()
    );
    Ok(report)
}
