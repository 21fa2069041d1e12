/// Python AST analysis on Tree-sitter
pub mod error;
pub mod issues;
pub mod parser;
pub mod structure;
pub mod visitor;

// Re-export main types for convenience
pub use error::AstError;
pub use issues::{detect_issues, Issue, IssueDetail, IssueDetector, IssueKind, ScopePolicy, Severity};
pub use parser::{decode_source, parse_python, ParsedSource};
pub use structure::{ast_complexity, extract_structure, Structure};
pub use visitor::{BlockKind, ComplexityBlock, ComplexityVisitor, HalsteadCounts};
