/// Structural inventory of a Python module: imports, definitions and control flow counts
use serde::Serialize;
use tree_sitter::Node;

use crate::analysis::ast::parser::{children, is_field_of, ParsedSource};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Structure {
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub loops: usize,
    pub conditionals: usize,
}

/// Collect imports, function and class names, loop and conditional counts in one walk
pub fn extract_structure(parsed: &ParsedSource) -> Structure {
    let mut structure = Structure::default();
    let mut stack = vec![parsed.root()];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    let dotted = if name.kind() == "aliased_import" {
                        name.child_by_field_name("name").unwrap_or(name)
                    } else {
                        name
                    };
                    structure.imports.push(parsed.text(&dotted).to_string());
                }
            }
            "import_from_statement" => {
                if let Some(module) = node.child_by_field_name("module_name") {
                    let text: String = parsed
                        .text(&module)
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect();
                    structure.imports.push(text);
                }
            }
            "future_import_statement" => structure.imports.push("__future__".to_string()),
            "function_definition" => {
                if let Some(name) = node.child_by_field_name("name") {
                    structure.functions.push(parsed.text(&name).to_string());
                }
            }
            "class_definition" => {
                if let Some(name) = node.child_by_field_name("name") {
                    structure.classes.push(parsed.text(&name).to_string());
                }
            }
            "for_statement" | "while_statement" => structure.loops += 1,
            "if_statement" | "elif_clause" => structure.conditionals += 1,
            _ => {}
        }

        for child in children(node).into_iter().rev() {
            stack.push(child);
        }
    }

    structure
}

/// 1 + if/elif + for + while + try + boolean operator groups
pub fn ast_complexity(parsed: &ParsedSource) -> u32 {
    let mut complexity = 1;
    let mut stack = vec![parsed.root()];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "if_statement" | "elif_clause" | "for_statement" | "while_statement"
            | "try_statement" => complexity += 1,
            "boolean_operator" if starts_operator_group(node) => complexity += 1,
            _ => {}
        }
        stack.extend(children(node));
    }

    complexity
}

/// `a and b and c` parses as `(a and b) and c`; only the outermost node of a
/// same-operator chain starts a group.
pub(crate) fn starts_operator_group(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    if parent.kind() != "boolean_operator" || !is_field_of(node, parent, "left") {
        return true;
    }
    operator_of(node) != operator_of(parent)
}

fn operator_of(node: Node) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}
