//! `null` is only a value of optional class types. After inference every
//! `null` literal carries the type it was inferred to; anything other than
//! `Optional<SomeClass>` is rejected.

use kestrel_ast::{
    nodes::{Declaration, Expression, Program, VariableDeclaration},
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
pub struct NullCheck {
    policy: NoScopes,
}

impl Scoped for NullCheck {
    type Policy = NoScopes;

    fn policy(&self) -> NoScopes {
        self.policy
    }
}

impl SemanticPass for NullCheck {
    fn name(&self) -> &'static str {
        "null-check"
    }

    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let (id, location) = (program.id, program.location.clone());
        self.scoped(ctx, ScopeKind::Program, id, &location, |_, ctx| {
            Nullability { ctx }.visit_program(program)
        })
    }
}

struct Nullability<'a> {
    ctx: &'a SemanticContext,
}

impl Nullability<'_> {
    fn accepts_null(&self, expression: &Expression) -> Result<(), SemanticError> {
        let Some(handle) = self.ctx.node_type(expression.id()) else {
            return Ok(());
        };
        let types = &self.ctx.types;
        let is_optional_object = types
            .optional_inner(handle)
            .is_some_and(|inner| types.get(inner).is_object());
        if is_optional_object {
            return Ok(());
        }
        Err(SemanticError::new(
            SemanticErrorKind::Nullability {
                found: types.display(handle),
            },
            expression.location(),
        ))
    }
}

impl Visitor for Nullability<'_> {
    type Error = SemanticError;

    fn visit_declaration(&mut self, declaration: &Declaration) -> Result<(), SemanticError> {
        visitor::walk_declaration(self, declaration)
            .map_err(|err| err.with_context(declaration.name()))
    }

    fn visit_variable(&mut self, variable: &VariableDeclaration) -> Result<(), SemanticError> {
        visitor::walk_variable(self, variable).map_err(|err| err.with_context(&variable.name.name))
    }

    fn visit_expression(&mut self, expression: &Expression) -> Result<(), SemanticError> {
        if expression.is_null_literal() {
            self.accepts_null(expression)?;
        }
        visitor::walk_expression(self, expression)
    }
}
