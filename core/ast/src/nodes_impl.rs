use core::fmt;
use std::fmt::{Display, Formatter};

use crate::nodes::{
    Block, Declaration, Expression, FunctionDeclaration, Identifier, LiteralKind, Location,
    NodeId, OperatorKind, Program, Statement, TypeExpr, UnaryOperatorKind,
};

impl Program {
    #[must_use]
    pub fn new(
        id: NodeId,
        location: Location,
        declarations: Vec<Declaration>,
        statements: Vec<Statement>,
        next_id: NodeId,
    ) -> Self {
        Program {
            id,
            location,
            declarations,
            statements,
            next_id,
        }
    }

    /// Mints a fresh id for a node synthesized after parsing.
    pub fn next_node_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.declarations.iter().find_map(|declaration| match declaration {
            Declaration::Function(function) if function.name.name == name => Some(function),
            _ => None,
        })
    }
}

impl Identifier {
    #[must_use]
    pub fn new(id: NodeId, location: Location, name: impl Into<String>) -> Self {
        Identifier {
            id,
            location,
            name: name.into(),
        }
    }
}

impl Declaration {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Declaration::Object(object) => &object.name.name,
            Declaration::Function(function) => &function.name.name,
            Declaration::Variable(variable) => &variable.name.name,
            Declaration::Enum(enum_declaration) => &enum_declaration.name.name,
            Declaration::Extern(extern_declaration) => &extern_declaration.name.name,
        }
    }

    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Declaration::Variable(_))
    }

    /// Short human readable description, e.g. ``class `A` ``.
    #[must_use]
    pub fn describe(&self) -> String {
        let kind = match self {
            Declaration::Object(_) => "class",
            Declaration::Function(_) => "function",
            Declaration::Variable(_) => "variable",
            Declaration::Enum(_) => "enum",
            Declaration::Extern(_) => "extern function",
        };
        format!("{kind} `{}`", self.name())
    }
}

impl Block {
    #[must_use]
    pub fn ends_with_return(&self) -> bool {
        matches!(self.statements.last(), Some(Statement::Return(_)))
    }
}

impl Statement {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Statement::Expression(_) => "expression statement".to_string(),
            Statement::Variable(variable) => format!("variable `{}`", variable.name.name),
            Statement::Return(_) => "return statement".to_string(),
            Statement::If(_) => "if statement".to_string(),
            Statement::While(_) => "while statement".to_string(),
            Statement::Block(_) => "block".to_string(),
        }
    }
}

impl Expression {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Expression::Literal(literal) => match &literal.kind {
                LiteralKind::Integer(value) | LiteralKind::Float(value) => {
                    format!("literal `{value}`")
                }
                LiteralKind::String(value) => format!("literal \"{value}\""),
                LiteralKind::Boolean(value) => format!("literal `{value}`"),
                LiteralKind::Null => "`null`".to_string(),
            },
            Expression::Identifier(identifier) => format!("identifier `{}`", identifier.name),
            Expression::This(_) => "`this`".to_string(),
            Expression::Super(_) => "`super`".to_string(),
            Expression::Call(_) => "call".to_string(),
            Expression::Binary(binary) => format!("`{}` expression", binary.operator),
            Expression::Unary(unary) => format!("`{}` expression", unary.operator),
            Expression::MemberAccess(access) => format!("member `{}`", access.member.name),
            Expression::Index(_) => "index expression".to_string(),
            Expression::Assignment(_) => "assignment".to_string(),
            Expression::Array(_) => "array literal".to_string(),
            Expression::Structure(_) => "structure literal".to_string(),
            Expression::EnumShorthand(shorthand) => format!("`.{}`", shorthand.item.name),
        }
    }

    #[must_use]
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expression::Literal(literal) if literal.kind == LiteralKind::Null)
    }

    /// Whether the expression may appear on the left of `=`.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Identifier(_) | Expression::MemberAccess(_) | Expression::Index(_)
        )
    }
}

impl TypeExpr {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            TypeExpr::Named(named) => format!("type `{}`", named.name.name),
            TypeExpr::Function(_) => "function type".to_string(),
            TypeExpr::Structure(_) => "structure type".to_string(),
            TypeExpr::InlineEnum(_) => "inline enum type".to_string(),
        }
    }
}

impl OperatorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Add => "+",
            OperatorKind::Sub => "-",
            OperatorKind::Mul => "*",
            OperatorKind::Div => "/",
            OperatorKind::Mod => "%",
            OperatorKind::Eq => "==",
            OperatorKind::Ne => "!=",
            OperatorKind::Lt => "<",
            OperatorKind::Le => "<=",
            OperatorKind::Gt => ">",
            OperatorKind::Ge => ">=",
            OperatorKind::And => "&&",
            OperatorKind::Or => "||",
            OperatorKind::Is => "is",
        }
    }

    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            OperatorKind::Add
                | OperatorKind::Sub
                | OperatorKind::Mul
                | OperatorKind::Div
                | OperatorKind::Mod
        )
    }

    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            OperatorKind::Lt | OperatorKind::Le | OperatorKind::Gt | OperatorKind::Ge
        )
    }

    #[must_use]
    pub fn is_logical(self) -> bool {
        matches!(self, OperatorKind::And | OperatorKind::Or)
    }

    /// Comparison, ordering, logical and `is` operators all produce `Bool`.
    #[must_use]
    pub fn yields_boolean(self) -> bool {
        !self.is_arithmetic()
    }
}

impl Display for OperatorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            UnaryOperatorKind::Neg => f.write_str("-"),
            UnaryOperatorKind::Not => f.write_str("!"),
        }
    }
}
