//! Rejects any node whose type still contains `Unknown` or `Deferred` after
//! resolution, such as `var a = []` or a bare `null;` statement.

use kestrel_ast::{
    nodes::{
        Block, Declaration, EnumItemDeclaration, Expression, Location, NodeId, Parameter, Program,
        Statement, TypeExpr, VariableDeclaration,
    },
    visitor::{self, Visitor},
};

use crate::{
    errors::{SemanticError, SemanticErrorKind},
    passes::SemanticPass,
    scope_policy::{NoScopes, Scoped},
    semantic_context::SemanticContext,
    symbol_table::ScopeKind,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct CompletenessCheck {
    policy: NoScopes,
}

impl Scoped for CompletenessCheck {
    type Policy = NoScopes;

    fn policy(&self) -> NoScopes {
        self.policy
    }
}

impl SemanticPass for CompletenessCheck {
    fn name(&self) -> &'static str {
        "completeness"
    }

    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let (id, location) = (program.id, program.location.clone());
        self.scoped(ctx, ScopeKind::Program, id, &location, |_, ctx| {
            Completeness { ctx }.visit_program(program)
        })
    }
}

struct Completeness<'a> {
    ctx: &'a SemanticContext,
}

impl Completeness<'_> {
    fn check(
        &self,
        node: NodeId,
        description: impl FnOnce() -> String,
        location: &Location,
    ) -> Result<(), SemanticError> {
        let found = match self.ctx.node_type(node) {
            Some(handle) if !self.ctx.types.is_incomplete(handle) => return Ok(()),
            Some(handle) => self.ctx.types.display(handle),
            None => "<untyped>".to_string(),
        };
        Err(SemanticError::new(
            SemanticErrorKind::Incomplete {
                node: description(),
                found,
            },
            location,
        ))
    }
}

impl Visitor for Completeness<'_> {
    type Error = SemanticError;

    fn visit_declaration(&mut self, declaration: &Declaration) -> Result<(), SemanticError> {
        self.check(declaration.id(), || declaration.describe(), declaration.location())
            .and_then(|()| visitor::walk_declaration(self, declaration))
            .map_err(|err| err.with_context(declaration.name()))
    }

    fn visit_variable(&mut self, variable: &VariableDeclaration) -> Result<(), SemanticError> {
        self.check(
            variable.id,
            || format!("variable `{}`", variable.name.name),
            &variable.location,
        )?;
        visitor::walk_variable(self, variable).map_err(|err| err.with_context(&variable.name.name))
    }

    fn visit_enum_item(&mut self, item: &EnumItemDeclaration) -> Result<(), SemanticError> {
        self.check(item.id, || format!("enum item `{}`", item.name.name), &item.location)?;
        visitor::walk_enum_item(self, item)
    }

    fn visit_parameter(&mut self, parameter: &Parameter) -> Result<(), SemanticError> {
        self.check(
            parameter.id,
            || format!("parameter `{}`", parameter.name.name),
            &parameter.location,
        )?;
        visitor::walk_parameter(self, parameter)
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), SemanticError> {
        self.check(block.id, || "block".to_string(), &block.location)?;
        visitor::walk_block(self, block)
    }

    fn visit_statement(&mut self, statement: &Statement) -> Result<(), SemanticError> {
        if let Statement::Variable(variable) = statement {
            return self.visit_variable(variable);
        }
        self.check(statement.id(), || statement.describe(), statement.location())?;
        visitor::walk_statement(self, statement)
    }

    fn visit_expression(&mut self, expression: &Expression) -> Result<(), SemanticError> {
        self.check(expression.id(), || expression.describe(), expression.location())?;
        visitor::walk_expression(self, expression)
    }

    fn visit_type_expr(&mut self, type_expr: &TypeExpr) -> Result<(), SemanticError> {
        self.check(type_expr.id(), || type_expr.describe(), type_expr.location())?;
        visitor::walk_type_expr(self, type_expr)
    }
}
