use std::fmt::{self, Display, Formatter, Write as _};

use kestrel_ast::nodes::{Location, NodeId, OperatorKind, UnaryOperatorKind};
use thiserror::Error;

use crate::symbol_table::SymbolKind;

/// Context for type mismatch errors to provide better messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchContext {
    Assignment,
    Return,
    VariableDefinition,
    Operator(OperatorKind),
    Condition,
    Argument {
        callee: String,
        parameter: String,
        index: usize,
    },
    ArrayElement {
        index: usize,
    },
    Index,
    /// The expected type handed to inference does not fit the value.
    Inference,
}

impl Display for MismatchContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MismatchContext::Assignment => write!(f, "in assignment"),
            MismatchContext::Return => write!(f, "in return statement"),
            MismatchContext::VariableDefinition => write!(f, "in variable definition"),
            MismatchContext::Operator(op) => write!(f, "in operands of `{op}`"),
            MismatchContext::Condition => write!(f, "in condition"),
            MismatchContext::Argument {
                callee,
                parameter,
                index,
            } => write!(f, "in argument {index} `{parameter}` of `{callee}`"),
            MismatchContext::ArrayElement { index } => write!(f, "in array element {index}"),
            MismatchContext::Index => write!(f, "in index"),
            MismatchContext::Inference => write!(f, "in inferred value"),
        }
    }
}

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    #[error("`{name}` is already declared as {kind} in this scope")]
    Redeclaration { name: String, kind: SymbolKind },

    #[error("cannot find `{name}` in this scope")]
    UnresolvedReference { name: String },

    #[error("unknown type `{name}`")]
    UnresolvedType { name: String },

    #[error("`{name}` expects {expected} type argument(s), found {found}")]
    TypeArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("type mismatch {context}: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: String,
        found: String,
        context: MismatchContext,
    },

    #[error("could not determine the type of {node}: `{found}`")]
    Incomplete { node: String, found: String },

    #[error("`{type_name}` has no member `{member}`")]
    MissingMember { type_name: String, member: String },

    #[error("`{structure}` has no field `{field}`")]
    MissingField { structure: String, field: String },

    #[error("extern function `{name}` must be declared with concrete types")]
    ExternNotConcrete { name: String },

    #[error("`{callee}` expects {expected} argument(s), but {found} were provided")]
    ArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("function `{function}` must return a value of type `{expected}`")]
    MissingReturn { function: String, expected: String },

    #[error("the last statement of function `{function}` must be a return statement")]
    LastStatementNotReturn { function: String },

    #[error("`{name}` needs a type annotation or an initial value")]
    UntypedDeclaration { name: String },

    #[error("a function returning `Void` cannot return a value")]
    VoidReturnValue,

    #[error("return statement must provide a value of type `{expected}`")]
    MissingReturnValue { expected: String },

    #[error("return statement outside of a function")]
    ReturnOutsideFunction,

    #[error("operator `{operator}` cannot be applied to `Void`")]
    VoidOperand { operator: OperatorKind },

    #[error("cannot assign to or from a `Void` value")]
    VoidAssignment,

    #[error("binary operator `{operator}` cannot be applied to `{found}`")]
    InvalidOperand { operator: OperatorKind, found: String },

    #[error("unary operator `{operator}` cannot be applied to `{found}`")]
    InvalidUnaryOperand {
        operator: UnaryOperatorKind,
        found: String,
    },

    #[error("left-hand side of an assignment must be a variable, member or index")]
    InvalidAssignmentTarget,

    #[error("`{found}` is not callable")]
    NotCallable { found: String },

    #[error("`{found}` is not an object")]
    NotAnObject { found: String },

    #[error("`{found}` cannot be indexed")]
    NotIndexable { found: String },

    #[error("`{keyword}` can only be used inside a class")]
    OutsideObject { keyword: &'static str },

    #[error("`super` used in `{object}`, which has no base class")]
    NoBaseClass { object: String },

    #[error("`.{item}` needs an enum type, found `{found}`")]
    NotEnumLike { item: String, found: String },

    #[error("`{enum_name}` has no item `{item}`")]
    UnknownEnumItem { enum_name: String, item: String },

    #[error("structure literal needs a structure type, found `{found}`")]
    NotStructural { found: String },

    #[error("class `{name}` inherits from itself")]
    CyclicInheritance { name: String },

    #[error("top-level statements cannot be combined with an explicit `main` function")]
    AmbiguousEntryPoint,

    #[error("`null` needs an optional object type, found `{found}`")]
    Nullability { found: String },

    #[error("no scope was recorded for node {node}")]
    ScopeNotFound { node: NodeId },
}

/// A semantic error tied to the node it was found on.
///
/// `context` names the innermost enclosing declaration (class, function or
/// variable) when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {kind}{}", in_context(.context))]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub location: Location,
    pub context: Option<String>,
}

fn in_context(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|name| format!(" (in `{name}`)"))
        .unwrap_or_default()
}

impl SemanticError {
    #[must_use]
    pub fn new(kind: SemanticErrorKind, location: &Location) -> Self {
        Self {
            kind,
            location: location.clone(),
            context: None,
        }
    }

    /// Records the enclosing declaration unless a nearer one was recorded already.
    #[must_use]
    pub fn with_context(mut self, name: &str) -> Self {
        if self.context.is_none() {
            self.context = Some(name.to_string());
        }
        self
    }

    /// Formats the error with the offending source line and a caret span under
    /// the reported columns.
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let line = self.location.line.max(1);
        let text = source.lines().nth((line - 1) as usize).unwrap_or_default();
        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());
        let start = self.location.start_column.max(1);
        let width = self.location.end_column.saturating_sub(start).max(1);

        let mut out = String::new();
        let _ = write!(out, "error: {}", self.kind);
        if let Some(context) = &self.context {
            let _ = write!(out, " (in `{context}`)");
        }
        out.push('\n');
        let _ = writeln!(out, "{pad}--> {}", self.location);
        let _ = writeln!(out, "{pad} |");
        let _ = writeln!(out, "{gutter} | {text}");
        let _ = writeln!(
            out,
            "{pad} | {}{}",
            " ".repeat((start - 1) as usize),
            "^".repeat(width as usize)
        );
        out
    }
}
