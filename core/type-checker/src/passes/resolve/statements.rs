use kestrel_ast::nodes::{Expression, IfStatement, ReturnStatement, Statement, WhileStatement};

use crate::{
    errors::{MismatchContext, SemanticError, SemanticErrorKind},
    scope_policy::ScopePolicy,
    semantic_context::SemanticContext,
    symbol_table::ScopeKind,
    type_info::TypeInfo,
};

use super::{Resolver, check_assignable};

impl<P: ScopePolicy> Resolver<'_, P> {
    pub(super) fn resolve_statement(
        &mut self,
        statement: &Statement,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        match statement {
            Statement::Expression(statement) => {
                self.resolve_expression(&statement.expression, ctx)?;
            }
            Statement::Variable(variable) => {
                self.resolve_variable(variable, ctx)
                    .map_err(|err| err.with_context(&variable.name.name))?;
            }
            Statement::Return(statement) => self.resolve_return(statement, ctx)?,
            Statement::If(statement) => self.resolve_if(statement, ctx)?,
            Statement::While(statement) => self.resolve_while(statement, ctx)?,
            Statement::Block(block) => self.resolve_block(block, ctx)?,
        }
        ctx.set_type(statement.id(), TypeInfo::Void);
        Ok(())
    }

    fn resolve_return(
        &mut self,
        statement: &ReturnStatement,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let outside =
            || SemanticError::new(SemanticErrorKind::ReturnOutsideFunction, &statement.location);
        let function_scope = ctx
            .enclosing_scope(ScopeKind::Function)
            .ok_or_else(outside)?;
        let function = ctx.scope(function_scope).node();
        let Some(TypeInfo::Function { return_type, .. }) = ctx.type_info(function) else {
            return Err(outside());
        };
        let return_type = *return_type;
        let returns_void = ctx.types.get(return_type).is_void();

        match &statement.value {
            Some(value) if returns_void => {
                return Err(SemanticError::new(
                    SemanticErrorKind::VoidReturnValue,
                    value.location(),
                ));
            }
            Some(value) => {
                let found = self.resolve_expression(value, ctx)?;
                check_assignable(ctx, return_type, value, found, MismatchContext::Return)?;
            }
            None if !returns_void => {
                return Err(SemanticError::new(
                    SemanticErrorKind::MissingReturnValue {
                        expected: ctx.types.display(return_type),
                    },
                    &statement.location,
                ));
            }
            None => {}
        }
        ctx.scope_mut(function_scope).mark_return_found();
        Ok(())
    }

    fn resolve_if(
        &mut self,
        statement: &IfStatement,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        self.resolve_condition(&statement.condition, ctx)?;
        self.resolve_block(&statement.then_block, ctx)?;
        if let Some(else_block) = &statement.else_block {
            self.resolve_block(else_block, ctx)?;
        }
        Ok(())
    }

    fn resolve_while(
        &mut self,
        statement: &WhileStatement,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        self.resolve_condition(&statement.condition, ctx)?;
        self.resolve_block(&statement.body, ctx)
    }

    fn resolve_condition(
        &mut self,
        condition: &Expression,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let found = self.resolve_expression(condition, ctx)?;
        if ctx.types.is_incomplete(found) || ctx.types.get(found).is_boolean() {
            return Ok(());
        }
        Err(SemanticError::new(
            SemanticErrorKind::TypeMismatch {
                expected: "Bool".to_string(),
                found: ctx.types.display(found),
                context: MismatchContext::Condition,
            },
            condition.location(),
        ))
    }
}
