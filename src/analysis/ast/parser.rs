/// Python parsing on top of Tree-sitter
use once_cell::sync::Lazy;
use std::time::Instant;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::analysis::ast::error::AstError;
use crate::analysis::timings;

/// Inputs above this size are rejected before parsing
pub const MAX_SOURCE_BYTES: usize = 10_000_000;

// Grammar objects are immutable and can be shared by every parser we create
static PYTHON_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_python::LANGUAGE.into());

/// Access point for the shared Tree-sitter Python grammar
pub struct LanguageCache;

impl LanguageCache {
    pub fn python() -> &'static Language {
        &PYTHON_LANGUAGE
    }

    /// Create a parser configured for Python
    pub fn create_parser() -> Result<Parser, AstError> {
        let mut parser = Parser::new();
        parser
            .set_language(Self::python())
            .map_err(|e| AstError::GrammarUnavailable(e.to_string()))?;
        Ok(parser)
    }
}

/// A successfully parsed, error-free Python source file
#[derive(Debug)]
pub struct ParsedSource<'src> {
    source: &'src str,
    tree: Tree,
}

impl<'src> ParsedSource<'src> {
    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`
    pub fn text(&self, node: &Node) -> &'src str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

/// Decode file bytes as UTF-8. Invalid input is a syntax error at the first bad byte.
pub fn decode_source(bytes: Vec<u8>) -> Result<String, AstError> {
    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = valid.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        AstError::Syntax {
            line,
            column: valid.len() - line_start + 1,
            reason: "source is not valid UTF-8".to_string(),
        }
    })
}

/// Parse Python source. ERROR and MISSING nodes, and the Python 2 `print`/`exec`
/// statements, are reported as syntax errors.
pub fn parse_python(source: &str) -> Result<ParsedSource<'_>, AstError> {
    if source.len() > MAX_SOURCE_BYTES {
        return Err(AstError::SourceTooLarge(source.len()));
    }

    let t0 = Instant::now();
    let mut parser = LanguageCache::create_parser()?;
    let tree = parser.parse(source, None).ok_or(AstError::ParseFailed)?;
    timings::record("parse/python", t0.elapsed().as_millis());

    if let Some(err) = first_syntax_error(tree.root_node()) {
        return Err(err);
    }

    Ok(ParsedSource { source, tree })
}

/// Python 2 statement forms the grammar still accepts; Python 3 rejects them
const LEGACY_STATEMENTS: [&str; 2] = ["print_statement", "exec_statement"];

/// Locate the first (in source order) error, missing or Python 2 statement node
fn first_syntax_error(root: Node) -> Option<AstError> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() || LEGACY_STATEMENTS.contains(&node.kind()) {
            let pos = node.start_position();
            let reason = if node.is_missing() {
                format!("missing '{}'", node.kind())
            } else {
                "invalid syntax".to_string()
            };
            return Some(AstError::Syntax {
                line: pos.row + 1,
                column: pos.column + 1,
                reason,
            });
        }
        let children = children(node);
        stack.extend(children.into_iter().rev());
    }

    if root.has_error() {
        // has_error() was set but no concrete node was found; point at the root
        return Some(AstError::Syntax {
            line: 1,
            column: 1,
            reason: "invalid syntax".to_string(),
        });
    }
    None
}

/// All direct children of `node`
pub fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named direct children of `node`, comments excluded
pub fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// True when `node` sits in the `field` slot of its parent
pub fn is_field_of(node: Node, parent: Node, field: &str) -> bool {
    parent.child_by_field_name(field) == Some(node)
}
