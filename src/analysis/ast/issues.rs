//! Style and quality issue detection for Python
//! One pre-order walk over the syntax tree, scope-aware, followed by an
//! unused-variable pass and identity-based deduplication.
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tree_sitter::Node;

use crate::analysis::ast::parser::{is_field_of, named_children, parse_python, ParsedSource};

/// Names shorter than this are flagged for functions
const MIN_FUNCTION_NAME_CHARS: usize = 4;
/// Names shorter than this are flagged for parameters and variables
const MIN_SHORT_NAME_CHARS: usize = 3;
const MAX_POSITIONAL_PARAMS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    PoorFunctionName,
    MissingDocstring,
    TooManyParameters,
    PoorParameterName,
    PoorVariableName,
    MagicNumber,
    EmptyExceptBlock,
    DebugPrint,
    UnusedVariable,
    SyntaxError,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::PoorFunctionName => "Poor function name",
            IssueKind::MissingDocstring => "Missing docstring",
            IssueKind::TooManyParameters => "Too many parameters",
            IssueKind::PoorParameterName => "Poor parameter name",
            IssueKind::PoorVariableName => "Poor variable name",
            IssueKind::MagicNumber => "Magic number used",
            IssueKind::EmptyExceptBlock => "Empty except block",
            IssueKind::DebugPrint => "Debug print found",
            IssueKind::UnusedVariable => "Unused variable",
            IssueKind::SyntaxError => "Syntax error",
        }
    }

    /// Fixed severity of each rule
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::PoorFunctionName
            | IssueKind::MissingDocstring
            | IssueKind::PoorParameterName
            | IssueKind::PoorVariableName
            | IssueKind::DebugPrint => Severity::Info,
            IssueKind::TooManyParameters | IssueKind::MagicNumber | IssueKind::UnusedVariable => {
                Severity::Warning
            }
            IssueKind::EmptyExceptBlock | IssueKind::SyntaxError => Severity::Critical,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue payload: a name, a message or a numeric literal value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IssueDetail {
    Text(String),
    Int(i64),
    Float(f64),
}

impl IssueDetail {
    pub fn text(value: impl Into<String>) -> Self {
        IssueDetail::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, IssueDetail::Text(t) if t.is_empty())
    }

    // 2 and 2.0 must collapse to the same key
    fn key(&self) -> DetailKey {
        match self {
            IssueDetail::Text(t) => DetailKey::Text(t.clone()),
            IssueDetail::Int(i) => DetailKey::Int(*i),
            IssueDetail::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    DetailKey::Int(*f as i64)
                } else {
                    DetailKey::Float(f.to_bits())
                }
            }
        }
    }
}

impl fmt::Display for IssueDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueDetail::Text(t) => f.write_str(t),
            IssueDetail::Int(i) => write!(f, "{i}"),
            IssueDetail::Float(v) => f.write_str(&float_repr(*v)),
        }
    }
}

/// Shortest round-trip text in Python's `repr` layout: positional for decimal
/// exponents in -4..16 (with a trailing `.0` when integral), otherwise `1.5e+20`
fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..16).contains(&exponent) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DetailKey {
    Text(String),
    Int(i64),
    Float(u64),
}

/// Identity of an issue; two issues with the same key are duplicates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey {
    kind: IssueKind,
    detail: DetailKey,
    context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub detail: IssueDetail,
    pub context: Option<String>, // enclosing function, None at module level
    pub level: Severity,
}

impl Issue {
    pub fn new(kind: IssueKind, detail: IssueDetail, context: Option<&str>) -> Self {
        Self {
            kind,
            detail,
            context: context.map(str::to_string),
            level: kind.severity(),
        }
    }

    /// The single issue reported for a file that does not parse
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::new(IssueKind::SyntaxError, IssueDetail::Text(message.into()), None)
    }

    pub fn key(&self) -> IssueKey {
        IssueKey {
            kind: self.kind,
            detail: self.detail.key(),
            context: self.context.clone(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} (in {})",
            self.level,
            self.kind,
            self.detail,
            self.context.as_deref().unwrap_or("None")
        )
    }
}

/// How the enclosing-function context is tracked during the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopePolicy {
    /// Context follows nesting; leaving a nested function restores the outer one
    #[default]
    Lexical,
    /// A single cursor set on entering any function and never restored.
    /// Code after a nested function is attributed to that nested function.
    LastEntered,
}

/// Keep the first occurrence of each (kind, detail, context) triple, in order
pub fn dedupe(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen = HashSet::new();
    issues.into_iter().filter(|issue| seen.insert(issue.key())).collect()
}

/// Parse and scan `source`; a parse failure yields a single syntax-error issue
pub fn detect_issues(source: &str) -> Vec<Issue> {
    match parse_python(source) {
        Ok(parsed) => IssueDetector::new().detect(&parsed),
        Err(e) => vec![Issue::syntax_error(e.to_string())],
    }
}

#[derive(Debug, Clone, Default)]
pub struct IssueDetector {
    policy: ScopePolicy,
}

#[derive(Default)]
struct WalkState<'src> {
    raw: Vec<Issue>,
    // first-assignment order; context of the latest assignment
    assigned: Vec<(&'src str, Option<&'src str>)>,
    assigned_index: HashMap<&'src str, usize>,
    read: HashSet<&'src str>,
    parameters: HashMap<&'src str, &'src str>,
    cursor: Option<&'src str>,
}

impl<'src> WalkState<'src> {
    fn push(&mut self, kind: IssueKind, detail: IssueDetail, context: Option<&str>) {
        self.raw.push(Issue::new(kind, detail, context));
    }

    fn assign(&mut self, name: &'src str, context: Option<&'src str>) {
        match self.assigned_index.get(name) {
            Some(&idx) => self.assigned[idx].1 = context,
            None => {
                self.assigned_index.insert(name, self.assigned.len());
                self.assigned.push((name, context));
            }
        }
    }
}

impl IssueDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ScopePolicy) -> Self {
        Self { policy }
    }

    /// Run every rule over the tree and return deduplicated issues in discovery order
    pub fn detect<'src>(&self, parsed: &ParsedSource<'src>) -> Vec<Issue> {
        let mut state = WalkState::default();

        // Iterative pre-order walk; each entry carries the context inherited from its parent
        let mut stack: Vec<(Node, Option<&'src str>)> = vec![(parsed.root(), None)];
        while let Some((node, inherited)) = stack.pop() {
            let mut scope = match self.policy {
                ScopePolicy::Lexical => inherited,
                ScopePolicy::LastEntered => state.cursor,
            };

            if node.kind() == "function_definition" {
                if let Some(name_node) = node.child_by_field_name("name") {
                    let name = parsed.text(&name_node);
                    scope = Some(name);
                    state.cursor = Some(name);
                    self.check_function(parsed, node, name, &mut state);
                }
            }

            self.check_node(parsed, node, scope, &mut state);

            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push((child, scope));
            }
        }

        let assigned = std::mem::take(&mut state.assigned);
        for (name, context) in assigned {
            if !state.read.contains(name) && !state.parameters.contains_key(name) {
                state.push(IssueKind::UnusedVariable, IssueDetail::text(name), context);
            }
        }

        dedupe(state.raw)
    }

    fn check_function<'src>(
        &self,
        parsed: &ParsedSource<'src>,
        node: Node,
        name: &'src str,
        state: &mut WalkState<'src>,
    ) {
        let ctx = Some(name);
        if name.chars().count() < MIN_FUNCTION_NAME_CHARS {
            state.push(IssueKind::PoorFunctionName, IssueDetail::text(name), ctx);
        }
        if !has_docstring(parsed, node) {
            state.push(IssueKind::MissingDocstring, IssueDetail::text(name), ctx);
        }

        let params = positional_parameters(parsed, node);
        if params.len() > MAX_POSITIONAL_PARAMS {
            state.push(IssueKind::TooManyParameters, IssueDetail::text(name), ctx);
        }
        for param in params {
            state.parameters.insert(param, name);
            if param.chars().count() < MIN_SHORT_NAME_CHARS {
                state.push(IssueKind::PoorParameterName, IssueDetail::text(param), ctx);
            }
        }
    }

    fn check_node<'src>(
        &self,
        parsed: &ParsedSource<'src>,
        node: Node,
        scope: Option<&'src str>,
        state: &mut WalkState<'src>,
    ) {
        match node.kind() {
            "assignment" => {
                // annotated assignments carry a `type` field and are not counted
                if node.child_by_field_name("type").is_some() {
                    return;
                }
                let Some(target) = node.child_by_field_name("left") else {
                    return;
                };
                if target.kind() != "identifier" {
                    return;
                }
                let name = parsed.text(&target);
                state.assign(name, scope);
                if name.chars().count() < MIN_SHORT_NAME_CHARS {
                    state.push(IssueKind::PoorVariableName, IssueDetail::text(name), scope);
                }
            }
            "identifier" => {
                if is_load(node) {
                    state.read.insert(parsed.text(&node));
                }
            }
            "integer" | "float" => {
                if let Some(value) = parse_numeric_literal(parsed.text(&node)) {
                    if !is_trivial_number(&value) {
                        state.push(IssueKind::MagicNumber, value, scope);
                    }
                }
            }
            "except_clause" | "except_group_clause" => {
                if handler_is_empty(parsed, node) {
                    state.push(IssueKind::EmptyExceptBlock, IssueDetail::text(""), scope);
                }
            }
            "call" => {
                let callee = node.child_by_field_name("function");
                if callee.is_some_and(|f| f.kind() == "identifier" && parsed.text(&f) == "print") {
                    state.push(IssueKind::DebugPrint, IssueDetail::text(""), scope);
                }
            }
            _ => {}
        }
    }
}

/// Positional parameters: after any `/`, before any `*`, `*args` or `**kwargs`
fn positional_parameters<'src>(parsed: &ParsedSource<'src>, func: Node) -> Vec<&'src str> {
    let Some(params) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut names = Vec::new();
    for param in named_children(params) {
        match param.kind() {
            "identifier" => names.push(parsed.text(&param)),
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = param.child_by_field_name("name") {
                    names.push(parsed.text(&name));
                }
            }
            "typed_parameter" => match param.named_child(0) {
                Some(inner) if inner.kind() == "identifier" => names.push(parsed.text(&inner)),
                _ => break, // typed *args / **kwargs
            },
            "positional_separator" => names.clear(),
            "keyword_separator" | "list_splat_pattern" | "dictionary_splat_pattern" => break,
            _ => {}
        }
    }
    names
}

/// First body statement is a plain string literal
fn has_docstring(parsed: &ParsedSource, func: Node) -> bool {
    let Some(body) = func.child_by_field_name("body") else {
        return false;
    };
    let Some(first) = named_children(body).into_iter().next() else {
        return false;
    };
    if first.kind() != "expression_statement" {
        return false;
    }
    let exprs = named_children(first);
    match exprs.as_slice() {
        [expr] => is_plain_string(parsed, *expr),
        _ => false,
    }
}

fn is_plain_string(parsed: &ParsedSource, node: Node) -> bool {
    match node.kind() {
        "string" => {
            let prefix: String = parsed
                .text(&node)
                .chars()
                .take_while(|c| *c != '"' && *c != '\'')
                .collect::<String>()
                .to_ascii_lowercase();
            !prefix.contains('f') && !prefix.contains('b')
        }
        "concatenated_string" => named_children(node)
            .into_iter()
            .all(|part| is_plain_string(parsed, part)),
        _ => false,
    }
}

/// A handler whose block holds nothing but `pass`, `...` and comments
fn handler_is_empty(parsed: &ParsedSource, handler: Node) -> bool {
    let mut cursor = handler.walk();
    let block = handler
        .named_children(&mut cursor)
        .find(|child| child.kind() == "block");
    let Some(block) = block else {
        return true;
    };

    named_children(block).into_iter().all(|stmt| match stmt.kind() {
        "pass_statement" => true,
        "expression_statement" => {
            let exprs = named_children(stmt);
            exprs.len() == 1 && parsed.text(&exprs[0]) == "..."
        }
        _ => false,
    })
}

/// Whether an identifier is read (as opposed to bound or used as a label)
fn is_load(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    match parent.kind() {
        "function_definition" | "class_definition" => !is_field_of(node, parent, "name"),
        "parameters" | "lambda_parameters" | "typed_parameter" => false,
        "default_parameter" | "typed_default_parameter" => !is_field_of(node, parent, "name"),
        "list_splat_pattern" | "dictionary_splat_pattern" => false,
        "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
            !is_field_of(node, parent, "left")
        }
        "named_expression" => !is_field_of(node, parent, "name"),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "as_pattern_target" => false,
        "attribute" => !is_field_of(node, parent, "attribute"),
        "keyword_argument" => !is_field_of(node, parent, "name"),
        "dotted_name" | "aliased_import" | "relative_import" => false,
        "global_statement" | "nonlocal_statement" | "delete_statement" => false,
        _ => true,
    }
}

/// Parse a Python numeric literal. Imaginary literals yield None.
pub(crate) fn parse_numeric_literal(text: &str) -> Option<IssueDetail> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if lower.ends_with('j') {
        return None;
    }

    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return Some(match i64::from_str_radix(&lower[2..], radix) {
            Ok(v) => IssueDetail::Int(v),
            Err(_) => IssueDetail::Text(cleaned),
        });
    }

    if lower.contains(['.', 'e']) {
        return lower.parse::<f64>().ok().map(IssueDetail::Float);
    }

    Some(match lower.parse::<i64>() {
        Ok(v) => IssueDetail::Int(v),
        Err(_) => IssueDetail::Text(cleaned),
    })
}

fn is_trivial_number(value: &IssueDetail) -> bool {
    match value {
        IssueDetail::Int(v) => *v == 0 || *v == 1,
        IssueDetail::Float(v) => *v == 0.0 || *v == 1.0,
        IssueDetail::Text(_) => false,
    }
}
