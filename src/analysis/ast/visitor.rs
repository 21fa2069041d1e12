/// Tree-sitter visitors for cyclomatic complexity blocks and Halstead counts
use serde::Serialize;
use std::collections::HashSet;
use tree_sitter::Node;

use crate::analysis::ast::parser::{children, named_children, ParsedSource};
use crate::analysis::ast::structure::starts_operator_group;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Function,
    Method,
    Class,
}

/// A function, method or class with its cyclomatic complexity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityBlock {
    pub name: String,
    pub kind: BlockKind,
    pub classname: Option<String>,
    pub complexity: u32,
}

/// Decision points and definitions found directly in one scope
#[derive(Default)]
struct ScopeScan<'t> {
    decisions: u32,
    functions: Vec<Node<'t>>,
    classes: Vec<Node<'t>>,
}

/// Computes complexity blocks for a module.
///
/// Blocks are module functions, classes and their methods. Closures and nested
/// classes fold out: they are neither blocks nor counted in their parent.
pub struct ComplexityVisitor<'p, 'src> {
    parsed: &'p ParsedSource<'src>,
    module_complexity: u32,
    blocks: Vec<ComplexityBlock>,
    total_complexity: u32,
}

impl<'p, 'src> ComplexityVisitor<'p, 'src> {
    pub fn new(parsed: &'p ParsedSource<'src>) -> Self {
        Self {
            parsed,
            module_complexity: 1,
            blocks: Vec::new(),
            total_complexity: 0,
        }
    }

    /// Convenience constructor that runs the visit immediately
    pub fn visit(parsed: &'p ParsedSource<'src>) -> Self {
        let mut visitor = Self::new(parsed);
        visitor.visit_module();
        visitor
    }

    pub fn visit_module(&mut self) {
        let parsed = self.parsed;
        let scan = scan_scope(parsed.root());
        self.module_complexity = 1 + scan.decisions;
        self.total_complexity = self.module_complexity;

        let mut class_blocks = Vec::new();
        for func in scan.functions {
            let block = self.function_block(func, None);
            self.total_complexity += block.complexity;
            self.blocks.push(block);
        }
        for class in scan.classes {
            let (blocks, real) = self.class_blocks(class);
            self.total_complexity += real;
            class_blocks.extend(blocks);
        }
        self.blocks.extend(class_blocks);
    }

    pub fn blocks(&self) -> &[ComplexityBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<ComplexityBlock> {
        self.blocks
    }

    /// 1 + decision points outside any function or class
    pub fn module_complexity(&self) -> u32 {
        self.module_complexity
    }

    /// Module complexity plus every function and every class (methods included)
    pub fn total_complexity(&self) -> u32 {
        self.total_complexity
    }

    fn name_of(&self, node: Node) -> String {
        node.child_by_field_name("name")
            .map(|n| self.parsed.text(&n).to_string())
            .unwrap_or_default()
    }

    fn function_block(&self, func: Node, classname: Option<&str>) -> ComplexityBlock {
        let decisions = func
            .child_by_field_name("body")
            .map(|body| scan_scope(body).decisions)
            .unwrap_or(0);
        ComplexityBlock {
            name: self.name_of(func),
            kind: if classname.is_some() { BlockKind::Method } else { BlockKind::Function },
            classname: classname.map(str::to_string),
            complexity: 1 + decisions,
        }
    }

    /// Class block followed by its method blocks, plus the class's real complexity
    fn class_blocks(&self, class: Node) -> (Vec<ComplexityBlock>, u32) {
        let name = self.name_of(class);
        let scan = class
            .child_by_field_name("body")
            .map(scan_scope)
            .unwrap_or_default();

        let methods: Vec<ComplexityBlock> = scan
            .functions
            .iter()
            .map(|m| self.function_block(*m, Some(name.as_str())))
            .collect();

        let real = 1 + scan.decisions + methods.iter().map(|m| m.complexity).sum::<u32>();
        let complexity = if methods.is_empty() {
            real
        } else {
            let count = methods.len() as u32;
            real / count + u32::from(count > 1)
        };

        let mut blocks = Vec::with_capacity(methods.len() + 1);
        blocks.push(ComplexityBlock {
            name,
            kind: BlockKind::Class,
            classname: None,
            complexity,
        });
        blocks.extend(methods);
        (blocks, real)
    }
}

/// Walk the descendants of `container`, stopping at nested definitions
fn scan_scope(container: Node) -> ScopeScan {
    let mut scan = ScopeScan::default();
    let mut stack = children(container);
    stack.reverse();

    while let Some(node) = stack.pop() {
        match node.kind() {
            "function_definition" => {
                scan.functions.push(node);
                continue;
            }
            "class_definition" => {
                scan.classes.push(node);
                continue;
            }
            _ => scan.decisions += decision_points(node),
        }
        for child in children(node).into_iter().rev() {
            stack.push(child);
        }
    }
    scan
}

/// Branches contributed by a single node
fn decision_points(node: Node) -> u32 {
    match node.kind() {
        "if_statement" | "elif_clause" | "conditional_expression" => 1,
        "for_statement" | "while_statement" => 1 + u32::from(has_child(node, "else_clause")),
        "try_statement" => {
            let handlers = children(node)
                .into_iter()
                .filter(|c| matches!(c.kind(), "except_clause" | "except_group_clause"))
                .count() as u32;
            handlers + u32::from(has_child(node, "else_clause"))
        }
        "boolean_operator" | "for_in_clause" | "if_clause" | "assert_statement" | "case_clause" => 1,
        _ => 0,
    }
}

fn has_child(node: Node, kind: &str) -> bool {
    children(node).iter().any(|c| c.kind() == kind)
}

/// Halstead operator/operand tallies over the whole module
#[derive(Debug, Default)]
pub struct HalsteadCounts {
    pub total_operators: usize,
    pub total_operands: usize,
    distinct_operators: HashSet<String>,
    distinct_operands: HashSet<String>,
}

impl HalsteadCounts {
    pub fn collect(parsed: &ParsedSource) -> Self {
        let mut counts = Self::default();
        let mut stack = vec![parsed.root()];

        while let Some(node) = stack.pop() {
            match node.kind() {
                "binary_operator" | "augmented_assignment" => {
                    let operator = node.child_by_field_name("operator");
                    let operands = [node.child_by_field_name("left"), node.child_by_field_name("right")];
                    counts.add(parsed, operator.map(|o| o.kind()), operands.into_iter().flatten());
                }
                "unary_operator" | "not_operator" => {
                    let operator = if node.kind() == "not_operator" {
                        Some("not")
                    } else {
                        node.child_by_field_name("operator").map(|o| o.kind())
                    };
                    counts.add(parsed, operator, node.child_by_field_name("argument"));
                }
                "boolean_operator" if starts_operator_group(node) => {
                    let operator = node.child_by_field_name("operator").map(|o| o.kind());
                    counts.add(parsed, operator, flatten_operator_group(node));
                }
                "comparison_operator" => {
                    let mut cursor = node.walk();
                    let operators: Vec<&str> = node
                        .children_by_field_name("operators", &mut cursor)
                        .map(|o| o.kind())
                        .collect();
                    let operands = named_children(node);
                    for op in &operators {
                        counts.total_operators += 1;
                        counts.distinct_operators.insert(op.to_string());
                    }
                    counts.add(parsed, None, operands);
                }
                _ => {}
            }
            stack.extend(children(node));
        }
        counts
    }

    fn add<'t>(
        &mut self,
        parsed: &ParsedSource,
        operator: Option<&str>,
        operands: impl IntoIterator<Item = Node<'t>>,
    ) {
        if let Some(op) = operator {
            self.total_operators += 1;
            self.distinct_operators.insert(op.to_string());
        }
        for operand in operands {
            self.total_operands += 1;
            self.distinct_operands.insert(parsed.text(&operand).to_string());
        }
    }

    pub fn vocabulary(&self) -> usize {
        self.distinct_operators.len() + self.distinct_operands.len()
    }

    pub fn length(&self) -> usize {
        self.total_operators + self.total_operands
    }

    /// N * log2(vocabulary)
    pub fn volume(&self) -> f64 {
        let vocabulary = self.vocabulary();
        if vocabulary == 0 {
            return 0.0;
        }
        self.length() as f64 * (vocabulary as f64).log2()
    }
}

/// Operands of an `a and b and c` chain, left to right
fn flatten_operator_group(node: Node) -> Vec<Node> {
    let operator = node.child_by_field_name("operator").map(|o| o.kind());
    let mut operands = Vec::new();
    let mut current = node;
    loop {
        if let Some(right) = current.child_by_field_name("right") {
            operands.push(right);
        }
        match current.child_by_field_name("left") {
            Some(left)
                if left.kind() == "boolean_operator"
                    && left.child_by_field_name("operator").map(|o| o.kind()) == operator =>
            {
                current = left;
            }
            Some(left) => {
                operands.push(left);
                break;
            }
            None => break,
        }
    }
    operands.reverse();
    operands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ast::parser::parse_python;

    fn blocks_of(src: &str) -> Vec<ComplexityBlock> {
        let parsed = parse_python(src).unwrap();
        ComplexityVisitor::visit(&parsed).into_blocks()
    }

    #[test]
    fn plain_function_has_complexity_one() {
        let blocks = blocks_of("def greet():\n    return 'hi'\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].complexity, 1);
        assert_eq!(blocks[0].kind, BlockKind::Function);
    }

    #[test]
    fn branches_add_to_function_complexity() {
        let src = "\
def check(value):
    if value > 10 and value < 20:
        return 1
    elif value < 0:
        return 2
    for item in range(value):
        pass
    else:
        pass
    try:
        pass
    except ValueError:
        pass
    except KeyError:
        pass
    return [x for x in range(3) if x]
";
        // 1 + if + and + elif + for + for-else + 2 handlers + comprehension for/if
        assert_eq!(blocks_of(src)[0].complexity, 10);
    }

    #[test]
    fn closures_fold_out_of_their_parent() {
        let src = "\
def outer():
    def inner():
        if True:
            pass
    return inner
";
        let blocks = blocks_of(src);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "outer");
        assert_eq!(blocks[0].complexity, 1);
    }

    #[test]
    fn class_complexity_is_averaged_over_methods() {
        let src = "\
class Shape:
    def area(self):
        if self.kind:
            return 1
        return 0

    def name(self):
        return 'shape'
";
        let blocks = blocks_of(src);
        assert_eq!(blocks.len(), 3);
        // real = 1 + 2 + 1 = 4; 4 / 2 + 1
        assert_eq!(blocks[0].kind, BlockKind::Class);
        assert_eq!(blocks[0].complexity, 3);
        assert_eq!(blocks[1].classname.as_deref(), Some("Shape"));
        assert_eq!(blocks[1].complexity, 2);
    }

    #[test]
    fn total_complexity_includes_module_level_branches() {
        let parsed = parse_python("if x:\n    pass\n\ndef run():\n    pass\n").unwrap();
        let visitor = ComplexityVisitor::visit(&parsed);
        assert_eq!(visitor.module_complexity(), 2);
        assert_eq!(visitor.total_complexity(), 3);
    }

    #[test]
    fn halstead_counts_operator_chains_once() {
        let parsed = parse_python("ok = a and b and c\n").unwrap();
        let counts = HalsteadCounts::collect(&parsed);
        assert_eq!(counts.total_operators, 1);
        assert_eq!(counts.total_operands, 3);
        assert!(counts.volume() > 0.0);
    }

    #[test]
    fn empty_module_has_zero_volume() {
        let parsed = parse_python("").unwrap();
        assert_eq!(HalsteadCounts::collect(&parsed).volume(), 0.0);
    }
}
