//! Read-only traversal of the syntax tree.
//!
//! [`Visitor`] has one `visit_*` method per node family; each default calls the
//! matching `walk_*` function, which visits the node's children in source order.
//! Override the methods you care about and call the `walk_*` function from the
//! override to keep descending.
//!
//! Visits are fallible: the first error returned by any `visit_*` method stops the
//! traversal and is propagated to the caller.
//!
//! ```
//! use kestrel_ast::builder::AstBuilder;
//! use kestrel_ast::nodes::Expression;
//! use kestrel_ast::visitor::{Visitor, walk_expression};
//!
//! #[derive(Default)]
//! struct CallCounter(usize);
//!
//! impl Visitor for CallCounter {
//!     type Error = std::convert::Infallible;
//!
//!     fn visit_expression(&mut self, expression: &Expression) -> Result<(), Self::Error> {
//!         if matches!(expression, Expression::Call(_)) {
//!             self.0 += 1;
//!         }
//!         walk_expression(self, expression)
//!     }
//! }
//!
//! let b = AstBuilder::default();
//! let program = b.program(vec![], vec![b.expr_stmt(b.call(b.identifier("f"), vec![]))]);
//! let mut counter = CallCounter::default();
//! counter.visit_program(&program).unwrap();
//! assert_eq!(counter.0, 1);
//! ```

use crate::nodes::{
    Block, Declaration, EnumDeclaration, EnumItemDeclaration, Expression, ExternDeclaration,
    FunctionDeclaration, ObjectDeclaration, Parameter, Program, Statement, TypeExpr,
    VariableDeclaration,
};

pub trait Visitor: Sized {
    type Error;

    fn visit_program(&mut self, program: &Program) -> Result<(), Self::Error> {
        walk_program(self, program)
    }

    fn visit_declaration(&mut self, declaration: &Declaration) -> Result<(), Self::Error> {
        walk_declaration(self, declaration)
    }

    fn visit_object(&mut self, object: &ObjectDeclaration) -> Result<(), Self::Error> {
        walk_object(self, object)
    }

    fn visit_function(&mut self, function: &FunctionDeclaration) -> Result<(), Self::Error> {
        walk_function(self, function)
    }

    fn visit_variable(&mut self, variable: &VariableDeclaration) -> Result<(), Self::Error> {
        walk_variable(self, variable)
    }

    fn visit_enum(&mut self, enum_declaration: &EnumDeclaration) -> Result<(), Self::Error> {
        walk_enum(self, enum_declaration)
    }

    fn visit_enum_item(&mut self, item: &EnumItemDeclaration) -> Result<(), Self::Error> {
        walk_enum_item(self, item)
    }

    fn visit_extern(&mut self, extern_declaration: &ExternDeclaration) -> Result<(), Self::Error> {
        walk_extern(self, extern_declaration)
    }

    fn visit_parameter(&mut self, parameter: &Parameter) -> Result<(), Self::Error> {
        walk_parameter(self, parameter)
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), Self::Error> {
        walk_block(self, block)
    }

    fn visit_statement(&mut self, statement: &Statement) -> Result<(), Self::Error> {
        walk_statement(self, statement)
    }

    fn visit_expression(&mut self, expression: &Expression) -> Result<(), Self::Error> {
        walk_expression(self, expression)
    }

    fn visit_type_expr(&mut self, type_expr: &TypeExpr) -> Result<(), Self::Error> {
        walk_type_expr(self, type_expr)
    }
}

pub fn walk_program<V: Visitor>(visitor: &mut V, program: &Program) -> Result<(), V::Error> {
    for declaration in &program.declarations {
        visitor.visit_declaration(declaration)?;
    }
    for statement in &program.statements {
        visitor.visit_statement(statement)?;
    }
    Ok(())
}

pub fn walk_declaration<V: Visitor>(
    visitor: &mut V,
    declaration: &Declaration,
) -> Result<(), V::Error> {
    match declaration {
        Declaration::Object(object) => visitor.visit_object(object),
        Declaration::Function(function) => visitor.visit_function(function),
        Declaration::Variable(variable) => visitor.visit_variable(variable),
        Declaration::Enum(enum_declaration) => visitor.visit_enum(enum_declaration),
        Declaration::Extern(extern_declaration) => visitor.visit_extern(extern_declaration),
    }
}

pub fn walk_object<V: Visitor>(
    visitor: &mut V,
    object: &ObjectDeclaration,
) -> Result<(), V::Error> {
    if let Some(base) = &object.base {
        visitor.visit_type_expr(base)?;
    }
    for member in &object.members {
        visitor.visit_declaration(member)?;
    }
    Ok(())
}

pub fn walk_function<V: Visitor>(
    visitor: &mut V,
    function: &FunctionDeclaration,
) -> Result<(), V::Error> {
    for parameter in &function.parameters {
        visitor.visit_parameter(parameter)?;
    }
    if let Some(returns) = &function.returns {
        visitor.visit_type_expr(returns)?;
    }
    visitor.visit_block(&function.body)
}

pub fn walk_variable<V: Visitor>(
    visitor: &mut V,
    variable: &VariableDeclaration,
) -> Result<(), V::Error> {
    if let Some(ty) = &variable.ty {
        visitor.visit_type_expr(ty)?;
    }
    if let Some(value) = &variable.value {
        visitor.visit_expression(value)?;
    }
    Ok(())
}

pub fn walk_enum<V: Visitor>(
    visitor: &mut V,
    enum_declaration: &EnumDeclaration,
) -> Result<(), V::Error> {
    for item in &enum_declaration.items {
        visitor.visit_enum_item(item)?;
    }
    Ok(())
}

pub fn walk_enum_item<V: Visitor>(
    visitor: &mut V,
    item: &EnumItemDeclaration,
) -> Result<(), V::Error> {
    for parameter in &item.parameters {
        visitor.visit_type_expr(parameter)?;
    }
    Ok(())
}

pub fn walk_extern<V: Visitor>(
    visitor: &mut V,
    extern_declaration: &ExternDeclaration,
) -> Result<(), V::Error> {
    for parameter in &extern_declaration.parameters {
        visitor.visit_parameter(parameter)?;
    }
    if let Some(returns) = &extern_declaration.returns {
        visitor.visit_type_expr(returns)?;
    }
    Ok(())
}

pub fn walk_parameter<V: Visitor>(visitor: &mut V, parameter: &Parameter) -> Result<(), V::Error> {
    visitor.visit_type_expr(&parameter.ty)
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) -> Result<(), V::Error> {
    for statement in &block.statements {
        visitor.visit_statement(statement)?;
    }
    Ok(())
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, statement: &Statement) -> Result<(), V::Error> {
    match statement {
        Statement::Expression(statement) => visitor.visit_expression(&statement.expression),
        Statement::Variable(variable) => visitor.visit_variable(variable),
        Statement::Return(statement) => match &statement.value {
            Some(value) => visitor.visit_expression(value),
            None => Ok(()),
        },
        Statement::If(statement) => {
            visitor.visit_expression(&statement.condition)?;
            visitor.visit_block(&statement.then_block)?;
            match &statement.else_block {
                Some(else_block) => visitor.visit_block(else_block),
                None => Ok(()),
            }
        }
        Statement::While(statement) => {
            visitor.visit_expression(&statement.condition)?;
            visitor.visit_block(&statement.body)
        }
        Statement::Block(block) => visitor.visit_block(block),
    }
}

pub fn walk_expression<V: Visitor>(
    visitor: &mut V,
    expression: &Expression,
) -> Result<(), V::Error> {
    match expression {
        Expression::Literal(_)
        | Expression::Identifier(_)
        | Expression::This(_)
        | Expression::Super(_)
        | Expression::EnumShorthand(_) => Ok(()),
        Expression::Call(call) => {
            visitor.visit_expression(&call.callee)?;
            for argument in &call.arguments {
                visitor.visit_expression(argument)?;
            }
            Ok(())
        }
        Expression::Binary(binary) => {
            visitor.visit_expression(&binary.left)?;
            visitor.visit_expression(&binary.right)
        }
        Expression::Unary(unary) => visitor.visit_expression(&unary.operand),
        Expression::MemberAccess(access) => visitor.visit_expression(&access.object),
        Expression::Index(index) => {
            visitor.visit_expression(&index.array)?;
            visitor.visit_expression(&index.index)
        }
        Expression::Assignment(assignment) => {
            visitor.visit_expression(&assignment.target)?;
            visitor.visit_expression(&assignment.value)
        }
        Expression::Array(array) => {
            for element in &array.elements {
                visitor.visit_expression(element)?;
            }
            Ok(())
        }
        Expression::Structure(structure) => {
            for field in &structure.fields {
                visitor.visit_expression(&field.value)?;
            }
            Ok(())
        }
    }
}

pub fn walk_type_expr<V: Visitor>(visitor: &mut V, type_expr: &TypeExpr) -> Result<(), V::Error> {
    match type_expr {
        TypeExpr::Named(named) => {
            for argument in &named.arguments {
                visitor.visit_type_expr(argument)?;
            }
            Ok(())
        }
        TypeExpr::Function(function) => {
            for parameter in &function.parameters {
                visitor.visit_type_expr(parameter)?;
            }
            match &function.returns {
                Some(returns) => visitor.visit_type_expr(returns),
                None => Ok(()),
            }
        }
        TypeExpr::Structure(structure) => {
            for field in &structure.fields {
                visitor.visit_type_expr(&field.ty)?;
            }
            Ok(())
        }
        TypeExpr::InlineEnum(inline) => {
            for item in &inline.items {
                visitor.visit_enum_item(item)?;
            }
            Ok(())
        }
    }
}
