/// Code analysis modules: AST layer, metrics, timings and project orchestration
pub mod ast;
pub mod metrics;
pub mod project;
pub mod timings;

pub use metrics::{compute_metrics, Grade, Metrics};
pub use project::{analyze_project, FileReport, ProjectReport};
