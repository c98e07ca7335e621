//! How a pass treats scopes while it walks the tree.
//!
//! Declaration collection opens every scope ([`FreshScopes`]). Resolution walks
//! the same tree again and must land in the scopes collection built, except for
//! scopes collection never saw: function bodies ([`CreateOrRecallScopes`]).
//! Read-only passes leave the scope stack alone ([`NoScopes`]).

use kestrel_ast::nodes::{Location, NodeId};

use crate::{
    errors::SemanticError,
    semantic_context::SemanticContext,
    symbol_table::ScopeKind,
};

pub trait ScopePolicy: Copy {
    /// Makes the scope for `node` current.
    ///
    /// # Errors
    ///
    /// Fails when a scope must be recalled but none was recorded for `node`.
    fn enter_scope(
        &self,
        ctx: &mut SemanticContext,
        kind: ScopeKind,
        node: NodeId,
        location: &Location,
    ) -> Result<(), SemanticError>;

    fn exit_scope(&self, ctx: &mut SemanticContext);

    /// Whether entering a scope of `kind` right now re-enters an existing one.
    fn must_recall_scope(&self, ctx: &SemanticContext, kind: ScopeKind) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FreshScopes;

impl ScopePolicy for FreshScopes {
    fn enter_scope(
        &self,
        ctx: &mut SemanticContext,
        kind: ScopeKind,
        node: NodeId,
        _location: &Location,
    ) -> Result<(), SemanticError> {
        ctx.enter_scope(kind, node);
        Ok(())
    }

    fn exit_scope(&self, ctx: &mut SemanticContext) {
        ctx.exit_scope();
    }

    fn must_recall_scope(&self, _ctx: &SemanticContext, _kind: ScopeKind) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CreateOrRecallScopes;

impl ScopePolicy for CreateOrRecallScopes {
    fn enter_scope(
        &self,
        ctx: &mut SemanticContext,
        kind: ScopeKind,
        node: NodeId,
        location: &Location,
    ) -> Result<(), SemanticError> {
        if self.must_recall_scope(ctx, kind) {
            ctx.recall_scope(node, location)?;
        } else {
            ctx.enter_scope(kind, node);
        }
        Ok(())
    }

    fn exit_scope(&self, ctx: &mut SemanticContext) {
        ctx.exit_scope();
    }

    fn must_recall_scope(&self, ctx: &SemanticContext, kind: ScopeKind) -> bool {
        !(kind == ScopeKind::BodyBlock || ctx.is_inside(ScopeKind::Function))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoScopes;

impl ScopePolicy for NoScopes {
    fn enter_scope(
        &self,
        _ctx: &mut SemanticContext,
        _kind: ScopeKind,
        _node: NodeId,
        _location: &Location,
    ) -> Result<(), SemanticError> {
        Ok(())
    }

    fn exit_scope(&self, _ctx: &mut SemanticContext) {}

    fn must_recall_scope(&self, _ctx: &SemanticContext, _kind: ScopeKind) -> bool {
        false
    }
}

/// A pass parameterised by a scope policy.
pub(crate) trait Scoped: Sized {
    type Policy: ScopePolicy;

    fn policy(&self) -> Self::Policy;

    /// Runs `body` inside the scope for `node`. The scope is exited afterwards
    /// whether or not `body` succeeded.
    fn scoped<T>(
        &mut self,
        ctx: &mut SemanticContext,
        kind: ScopeKind,
        node: NodeId,
        location: &Location,
        body: impl FnOnce(&mut Self, &mut SemanticContext) -> Result<T, SemanticError>,
    ) -> Result<T, SemanticError> {
        let policy = self.policy();
        policy.enter_scope(ctx, kind, node, location)?;
        let result = body(self, ctx);
        policy.exit_scope(ctx);
        result
    }
}
