//! Programmatic construction of Kestrel syntax trees.
//!
//! The parser lives outside this workspace; embedders and the test suite build
//! trees through [`AstBuilder`] instead. Every method takes `&self` so calls can be
//! nested the way the source reads:
//!
//! ```
//! use kestrel_ast::builder::AstBuilder;
//!
//! let b = AstBuilder::new("main.ks");
//! let program = b.program(
//!     vec![b.var("a", None, Some(b.int("1")))],
//!     vec![b.expr_stmt(b.call(b.identifier("print"), vec![b.identifier("a")]))],
//! );
//! assert_eq!(program.declarations.len(), 1);
//! ```
//!
//! # Node ID Assignment
//!
//! IDs are handed out sequentially starting from 1; zero is reserved. The program
//! records the next free id so later passes can mint synthesized nodes.
//!
//! # Locations
//!
//! Nodes are stamped with the position last set through [`AstBuilder::at`]; a
//! node's end column is its start column plus the width of its name where it has
//! one.

use std::cell::Cell;

use crate::nodes::{
    ArrayLiteral, AssignmentExpression, BinaryExpression, Block, CallExpression, Declaration,
    EnumDeclaration, EnumItemDeclaration, EnumShorthand, Expression, ExpressionStatement,
    ExternDeclaration, FunctionDeclaration, FunctionTypeExpr, Identifier, IfStatement,
    IndexExpression, InlineEnumType, Literal, LiteralKind, Location, MemberAccessExpression,
    NamedType, NodeId, ObjectDeclaration, OperatorKind, Parameter, Program, ReturnStatement,
    Statement, StructureLiteral, StructureLiteralField, StructureType, StructureTypeField,
    SuperExpression, ThisExpression, TypeExpr, UnaryExpression, UnaryOperatorKind,
    VariableDeclaration, WhileStatement,
};

pub struct AstBuilder {
    file: String,
    next_id: Cell<NodeId>,
    position: Cell<(u32, u32)>,
}

impl Default for AstBuilder {
    fn default() -> Self {
        AstBuilder::new("")
    }
}

impl AstBuilder {
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            next_id: Cell::new(1),
            position: Cell::new((1, 1)),
        }
    }

    /// Moves the cursor; nodes built afterwards are located at `line:column`.
    pub fn at(&self, line: u32, column: u32) -> &Self {
        self.position.set((line, column));
        self
    }

    fn next_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn location(&self, width: usize) -> Location {
        let (line, column) = self.position.get();
        let width = u32::try_from(width.max(1)).unwrap_or(1);
        Location::new(self.file.clone(), line, column, column + width)
    }

    /// Consumes the built declarations and top-level statements into a program.
    #[must_use]
    pub fn program(&self, declarations: Vec<Declaration>, statements: Vec<Statement>) -> Program {
        let id = self.next_id();
        let location = Location::new(self.file.clone(), 1, 1, 1);
        Program::new(id, location, declarations, statements, self.next_id.get())
    }

    #[must_use]
    pub fn ident(&self, name: &str) -> Identifier {
        Identifier::new(self.next_id(), self.location(name.len()), name)
    }

    // Declarations

    #[must_use]
    pub fn class(
        &self,
        name: &str,
        base: Option<TypeExpr>,
        members: Vec<Declaration>,
    ) -> Declaration {
        let name = self.ident(name);
        Declaration::Object(ObjectDeclaration {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            base,
            members,
        })
    }

    #[must_use]
    pub fn function(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
        returns: Option<TypeExpr>,
        body: Vec<Statement>,
    ) -> Declaration {
        Declaration::Function(self.function_declaration(name, parameters, returns, body))
    }

    #[must_use]
    pub fn function_declaration(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
        returns: Option<TypeExpr>,
        body: Vec<Statement>,
    ) -> FunctionDeclaration {
        let name = self.ident(name);
        let body = self.block(body);
        FunctionDeclaration {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            parameters,
            returns,
            body,
        }
    }

    #[must_use]
    pub fn param(&self, name: &str, ty: TypeExpr) -> Parameter {
        let name = self.ident(name);
        Parameter {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            ty,
        }
    }

    #[must_use]
    pub fn var(&self, name: &str, ty: Option<TypeExpr>, value: Option<Expression>) -> Declaration {
        Declaration::Variable(self.variable_declaration(name, ty, value))
    }

    #[must_use]
    pub fn variable_declaration(
        &self,
        name: &str,
        ty: Option<TypeExpr>,
        value: Option<Expression>,
    ) -> VariableDeclaration {
        let name = self.ident(name);
        VariableDeclaration {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            ty,
            value,
        }
    }

    #[must_use]
    pub fn enumeration(&self, name: &str, items: Vec<EnumItemDeclaration>) -> Declaration {
        let name = self.ident(name);
        Declaration::Enum(EnumDeclaration {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            items,
        })
    }

    #[must_use]
    pub fn enum_item(&self, name: &str, parameters: Vec<TypeExpr>) -> EnumItemDeclaration {
        let name = self.ident(name);
        EnumItemDeclaration {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            parameters,
        }
    }

    #[must_use]
    pub fn extern_function(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
        returns: Option<TypeExpr>,
    ) -> Declaration {
        let name = self.ident(name);
        Declaration::Extern(ExternDeclaration {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            parameters,
            returns,
        })
    }

    // Statements

    #[must_use]
    pub fn block(&self, statements: Vec<Statement>) -> Block {
        Block {
            id: self.next_id(),
            location: self.location(1),
            statements,
        }
    }

    #[must_use]
    pub fn block_stmt(&self, statements: Vec<Statement>) -> Statement {
        Statement::Block(self.block(statements))
    }

    #[must_use]
    pub fn expr_stmt(&self, expression: Expression) -> Statement {
        Statement::Expression(ExpressionStatement {
            id: self.next_id(),
            location: expression.location().clone(),
            expression,
        })
    }

    #[must_use]
    pub fn var_stmt(
        &self,
        name: &str,
        ty: Option<TypeExpr>,
        value: Option<Expression>,
    ) -> Statement {
        Statement::Variable(self.variable_declaration(name, ty, value))
    }

    #[must_use]
    pub fn ret(&self, value: Option<Expression>) -> Statement {
        Statement::Return(ReturnStatement {
            id: self.next_id(),
            location: self.location("return".len()),
            value,
        })
    }

    #[must_use]
    pub fn if_stmt(
        &self,
        condition: Expression,
        then_block: Vec<Statement>,
        else_block: Option<Vec<Statement>>,
    ) -> Statement {
        let location = self.location("if".len());
        let then_block = self.block(then_block);
        let else_block = else_block.map(|statements| self.block(statements));
        Statement::If(IfStatement {
            id: self.next_id(),
            location,
            condition,
            then_block,
            else_block,
        })
    }

    #[must_use]
    pub fn while_stmt(&self, condition: Expression, body: Vec<Statement>) -> Statement {
        let location = self.location("while".len());
        let body = self.block(body);
        Statement::While(WhileStatement {
            id: self.next_id(),
            location,
            condition,
            body,
        })
    }

    // Expressions

    fn literal(&self, kind: LiteralKind, width: usize) -> Expression {
        Expression::Literal(Literal {
            id: self.next_id(),
            location: self.location(width),
            kind,
        })
    }

    #[must_use]
    pub fn int(&self, digits: &str) -> Expression {
        self.literal(LiteralKind::Integer(digits.to_string()), digits.len())
    }

    #[must_use]
    pub fn float(&self, digits: &str) -> Expression {
        self.literal(LiteralKind::Float(digits.to_string()), digits.len())
    }

    #[must_use]
    pub fn string(&self, value: &str) -> Expression {
        self.literal(LiteralKind::String(value.to_string()), value.len() + 2)
    }

    #[must_use]
    pub fn boolean(&self, value: bool) -> Expression {
        let width = if value { 4 } else { 5 };
        self.literal(LiteralKind::Boolean(value), width)
    }

    #[must_use]
    pub fn null(&self) -> Expression {
        self.literal(LiteralKind::Null, "null".len())
    }

    #[must_use]
    pub fn identifier(&self, name: &str) -> Expression {
        Expression::Identifier(self.ident(name))
    }

    #[must_use]
    pub fn this(&self) -> Expression {
        Expression::This(ThisExpression {
            id: self.next_id(),
            location: self.location("this".len()),
        })
    }

    #[must_use]
    pub fn super_(&self) -> Expression {
        Expression::Super(SuperExpression {
            id: self.next_id(),
            location: self.location("super".len()),
        })
    }

    #[must_use]
    pub fn call(&self, callee: Expression, arguments: Vec<Expression>) -> Expression {
        Expression::Call(CallExpression {
            id: self.next_id(),
            location: callee.location().clone(),
            callee: Box::new(callee),
            arguments,
        })
    }

    #[must_use]
    pub fn binary(
        &self,
        left: Expression,
        operator: OperatorKind,
        right: Expression,
    ) -> Expression {
        Expression::Binary(BinaryExpression {
            id: self.next_id(),
            location: left.location().clone(),
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    #[must_use]
    pub fn unary(&self, operator: UnaryOperatorKind, operand: Expression) -> Expression {
        Expression::Unary(UnaryExpression {
            id: self.next_id(),
            location: self.location(1),
            operator,
            operand: Box::new(operand),
        })
    }

    #[must_use]
    pub fn member(&self, object: Expression, member: &str) -> Expression {
        let member = self.ident(member);
        Expression::MemberAccess(MemberAccessExpression {
            id: self.next_id(),
            location: member.location.clone(),
            object: Box::new(object),
            member,
        })
    }

    #[must_use]
    pub fn index(&self, array: Expression, index: Expression) -> Expression {
        Expression::Index(IndexExpression {
            id: self.next_id(),
            location: array.location().clone(),
            array: Box::new(array),
            index: Box::new(index),
        })
    }

    #[must_use]
    pub fn assign(&self, target: Expression, value: Expression) -> Expression {
        Expression::Assignment(AssignmentExpression {
            id: self.next_id(),
            location: target.location().clone(),
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    #[must_use]
    pub fn array(&self, elements: Vec<Expression>) -> Expression {
        Expression::Array(ArrayLiteral {
            id: self.next_id(),
            location: self.location(1),
            elements,
        })
    }

    #[must_use]
    pub fn structure(&self, fields: Vec<(&str, Expression)>) -> Expression {
        let location = self.location(1);
        let fields = fields
            .into_iter()
            .map(|(name, value)| {
                let name = self.ident(name);
                StructureLiteralField {
                    id: self.next_id(),
                    location: name.location.clone(),
                    name,
                    value,
                }
            })
            .collect();
        Expression::Structure(StructureLiteral {
            id: self.next_id(),
            location,
            fields,
        })
    }

    #[must_use]
    pub fn shorthand(&self, item: &str) -> Expression {
        let item = self.ident(item);
        Expression::EnumShorthand(EnumShorthand {
            id: self.next_id(),
            location: item.location.clone(),
            item,
        })
    }

    // Type expressions

    #[must_use]
    pub fn ty(&self, name: &str) -> TypeExpr {
        self.generic(name, vec![])
    }

    #[must_use]
    pub fn generic(&self, name: &str, arguments: Vec<TypeExpr>) -> TypeExpr {
        let name = self.ident(name);
        TypeExpr::Named(NamedType {
            id: self.next_id(),
            location: name.location.clone(),
            name,
            arguments,
        })
    }

    #[must_use]
    pub fn array_of(&self, element: TypeExpr) -> TypeExpr {
        self.generic("Array", vec![element])
    }

    #[must_use]
    pub fn optional(&self, inner: TypeExpr) -> TypeExpr {
        self.generic("Optional", vec![inner])
    }

    #[must_use]
    pub fn function_type(&self, parameters: Vec<TypeExpr>, returns: Option<TypeExpr>) -> TypeExpr {
        TypeExpr::Function(FunctionTypeExpr {
            id: self.next_id(),
            location: self.location(1),
            parameters,
            returns: returns.map(Box::new),
        })
    }

    #[must_use]
    pub fn structure_type(&self, fields: Vec<(&str, TypeExpr)>) -> TypeExpr {
        let location = self.location(1);
        let fields = fields
            .into_iter()
            .map(|(name, ty)| {
                let name = self.ident(name);
                StructureTypeField {
                    id: self.next_id(),
                    location: name.location.clone(),
                    name,
                    ty,
                }
            })
            .collect();
        TypeExpr::Structure(StructureType {
            id: self.next_id(),
            location,
            fields,
        })
    }

    #[must_use]
    pub fn inline_enum(&self, items: Vec<EnumItemDeclaration>) -> TypeExpr {
        TypeExpr::InlineEnum(InlineEnumType {
            id: self.next_id(),
            location: self.location("enum".len()),
            items,
        })
    }
}
