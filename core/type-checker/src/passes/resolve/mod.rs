//! Type resolution and checking.
//!
//! The second walk over the program. It re-enters the scopes built by
//! collection (function bodies and nested blocks get new ones) and:
//!
//! 1. re-resolves every declaration-level annotation so forward references
//!    settle in place, then rejects cyclic or non-object base classes
//! 2. resolves every identifier, call, operator and member access and checks
//!    the types meeting at each boundary
//! 3. checks that functions with a non-`Void` return type return
//!
//! Global and member variables are resolved on demand when something refers to
//! them before their turn. A variable that is referenced while it is being
//! resolved keeps whatever type it has at that point.

use kestrel_ast::nodes::{
    Block, Declaration, Expression, FunctionDeclaration, NodeId, Program, VariableDeclaration,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::{
    comparer::{DefaultComparer, TypeComparer, inherits_from_itself},
    errors::{MismatchContext, SemanticError, SemanticErrorKind},
    inference::Inferrer,
    passes::SemanticPass,
    scope_policy::{CreateOrRecallScopes, ScopePolicy, Scoped},
    semantic_context::SemanticContext,
    symbol_table::{ScopeKind, SymbolKind},
    type_arena::TypeRef,
    type_info::TypeInfo,
    type_resolver::{Strictness, resolve_enum_item, resolve_type_expr},
};

mod expressions;
mod statements;

#[derive(Clone, Copy, Debug, Default)]
pub struct TypeResolutionPass<P: ScopePolicy = CreateOrRecallScopes> {
    policy: P,
}

impl TypeResolutionPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ScopePolicy> TypeResolutionPass<P> {
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }
}

impl<P: ScopePolicy + 'static> SemanticPass for TypeResolutionPass<P> {
    fn name(&self) -> &'static str {
        "resolve-types"
    }

    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        Resolver::new(self.policy, program).run(ctx)
    }
}

/// A global or member variable and the node whose scope it lives in.
#[derive(Clone, Copy)]
struct PendingVariable<'a> {
    declaration: &'a VariableDeclaration,
    owner: NodeId,
}

struct Resolver<'a, P> {
    policy: P,
    program: &'a Program,
    variables: FxHashMap<NodeId, PendingVariable<'a>>,
    variable_slots: FxHashMap<TypeRef, NodeId>,
    resolving: Vec<NodeId>,
    resolved: FxHashSet<NodeId>,
}

impl<P: ScopePolicy> Scoped for Resolver<'_, P> {
    type Policy = P;

    fn policy(&self) -> P {
        self.policy
    }
}

impl<'a, P: ScopePolicy> Resolver<'a, P> {
    fn new(policy: P, program: &'a Program) -> Self {
        Self {
            policy,
            program,
            variables: FxHashMap::default(),
            variable_slots: FxHashMap::default(),
            resolving: Vec::new(),
            resolved: FxHashSet::default(),
        }
    }

    fn run(mut self, ctx: &mut SemanticContext) -> Result<(), SemanticError> {
        let program = self.program;
        self.index_variables(&program.declarations, program.id, ctx);
        self.scoped(ctx, ScopeKind::Program, program.id, &program.location, |this, ctx| {
            this.resolve_signatures(&program.declarations, ctx)?;
            check_inheritance(&program.declarations, ctx)?;
            for declaration in &program.declarations {
                this.resolve_declaration(declaration, ctx)?;
            }
            Ok(())
        })
    }

    fn index_variables(
        &mut self,
        declarations: &'a [Declaration],
        owner: NodeId,
        ctx: &mut SemanticContext,
    ) {
        for declaration in declarations {
            match declaration {
                Declaration::Variable(declaration) => {
                    self.variables
                        .insert(declaration.id, PendingVariable { declaration, owner });
                    let slot = ctx.type_of(declaration.id);
                    self.variable_slots.insert(slot, declaration.id);
                }
                Declaration::Object(object) => {
                    self.index_variables(&object.members, object.id, ctx);
                }
                Declaration::Function(_) | Declaration::Enum(_) | Declaration::Extern(_) => {}
            }
        }
    }

    // Signatures

    fn resolve_signatures(
        &mut self,
        declarations: &[Declaration],
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        for declaration in declarations {
            self.resolve_signature(declaration, ctx)
                .map_err(|err| err.with_context(declaration.name()))?;
        }
        Ok(())
    }

    fn resolve_signature(
        &mut self,
        declaration: &Declaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        match declaration {
            Declaration::Object(object) => {
                self.scoped(ctx, ScopeKind::Object, object.id, &object.location, |this, ctx| {
                    if let Some(base) = &object.base {
                        let base_type = resolve_type_expr(ctx, base, Strictness::Strict)?;
                        if !ctx.types.get(base_type).is_object() {
                            return Err(SemanticError::new(
                                SemanticErrorKind::NotAnObject {
                                    found: ctx.types.display(base_type),
                                },
                                base.location(),
                            ));
                        }
                    }
                    this.resolve_signatures(&object.members, ctx)
                })
            }
            Declaration::Function(function) => {
                let (id, location) = (function.id, &function.location);
                self.scoped(ctx, ScopeKind::Function, id, location, |_, ctx| {
                    for parameter in &function.parameters {
                        let annotation = resolve_type_expr(ctx, &parameter.ty, Strictness::Strict)?;
                        let slot = ctx.type_of(parameter.id);
                        ctx.types.assign(slot, annotation);
                    }
                    if let Some(returns) = &function.returns {
                        resolve_type_expr(ctx, returns, Strictness::Strict)?;
                    }
                    Ok(())
                })
            }
            Declaration::Variable(variable) => {
                if let Some(annotation) = &variable.ty {
                    let declared = resolve_type_expr(ctx, annotation, Strictness::Strict)?;
                    let slot = ctx.type_of(variable.id);
                    ctx.types.assign(slot, declared);
                }
                Ok(())
            }
            Declaration::Enum(enum_declaration) => {
                let (id, location) = (enum_declaration.id, &enum_declaration.location);
                self.scoped(ctx, ScopeKind::Enum, id, location, |_, ctx| {
                    for item in &enum_declaration.items {
                        resolve_enum_item(ctx, item, Strictness::Strict)?;
                    }
                    Ok(())
                })
            }
            Declaration::Extern(_) => Ok(()),
        }
    }

    // Declarations

    fn resolve_declaration(
        &mut self,
        declaration: &Declaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        debug!(declaration = %declaration.describe(), "resolving");
        let result = match declaration {
            Declaration::Variable(variable) => self.resolve_variable(variable, ctx),
            Declaration::Function(function) => self.resolve_function(function, ctx),
            Declaration::Object(object) => {
                self.scoped(ctx, ScopeKind::Object, object.id, &object.location, |this, ctx| {
                    for member in &object.members {
                        this.resolve_declaration(member, ctx)?;
                    }
                    Ok(())
                })
            }
            Declaration::Enum(_) | Declaration::Extern(_) => Ok(()),
        };
        result.map_err(|err| err.with_context(declaration.name()))
    }

    /// Resolves a variable once. Locals become visible only after their
    /// initializer has been resolved.
    fn resolve_variable(
        &mut self,
        variable: &VariableDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        if self.resolved.contains(&variable.id) || self.resolving.contains(&variable.id) {
            return Ok(());
        }
        self.resolving.push(variable.id);
        let result = self.resolve_variable_type(variable, ctx);
        self.resolving.pop();
        result?;
        self.resolved.insert(variable.id);

        if ctx.current_scope_kind() == Some(ScopeKind::BodyBlock) {
            ctx.declare(
                &variable.name.name,
                SymbolKind::Identifier,
                variable.id,
                &variable.location,
            )?;
        }
        Ok(())
    }

    fn resolve_variable_type(
        &mut self,
        variable: &VariableDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let slot = ctx.type_of(variable.id);
        match (&variable.ty, &variable.value) {
            (Some(annotation), value) => {
                let declared = resolve_type_expr(ctx, annotation, Strictness::Strict)?;
                ctx.types.assign(slot, declared);
                if let Some(value) = value {
                    let found = self.resolve_expression(value, ctx)?;
                    check_assignable(ctx, slot, value, found, MismatchContext::VariableDefinition)?;
                }
            }
            (None, Some(value)) => {
                let found = self.resolve_expression(value, ctx)?;
                if ctx.types.get(found).is_void() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::VoidAssignment,
                        value.location(),
                    ));
                }
                ctx.types.assign(slot, found);
            }
            (None, None) => {
                return Err(SemanticError::new(
                    SemanticErrorKind::UntypedDeclaration {
                        name: variable.name.name.clone(),
                    },
                    &variable.location,
                ));
            }
        }
        trace!(variable = %variable.name.name, ty = %ctx.types.display(slot), "resolved variable");
        Ok(())
    }

    /// Resolves a global or member variable out of turn, inside the scopes it
    /// was declared in.
    fn resolve_on_demand(
        &mut self,
        declaration: NodeId,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let Some(pending) = self.variables.get(&declaration).copied() else {
            return Ok(());
        };
        if self.resolved.contains(&declaration) || self.resolving.contains(&declaration) {
            return Ok(());
        }
        let Some(scope) = ctx.scope_of(pending.owner) else {
            return Ok(());
        };
        trace!(variable = %pending.declaration.name.name, "resolving on demand");
        let chain = ctx.scope_chain(scope);
        let saved = ctx.replace_scope_stack(chain);
        let result = self
            .resolve_variable(pending.declaration, ctx)
            .map_err(|err| err.with_context(&pending.declaration.name.name));
        ctx.replace_scope_stack(saved);
        result
    }

    fn resolve_function(
        &mut self,
        function: &FunctionDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let (id, location) = (function.id, &function.location);
        self.scoped(ctx, ScopeKind::Function, id, location, |this, ctx| {
            let function_scope = ctx.current_scope();
            this.resolve_block(&function.body, ctx)?;

            let Some(TypeInfo::Function { return_type, .. }) = ctx.type_info(function.id) else {
                return Ok(());
            };
            let return_type = *return_type;
            if ctx.types.get(return_type).is_void() {
                return Ok(());
            }
            let returned = function_scope
                .is_some_and(|scope| ctx.scope(scope).return_statement_found());
            if !returned {
                return Err(SemanticError::new(
                    SemanticErrorKind::MissingReturn {
                        function: function.name.name.clone(),
                        expected: ctx.types.display(return_type),
                    },
                    &function.location,
                ));
            }
            if !function.body.ends_with_return() {
                return Err(SemanticError::new(
                    SemanticErrorKind::LastStatementNotReturn {
                        function: function.name.name.clone(),
                    },
                    &function.location,
                ));
            }
            Ok(())
        })
    }

    fn resolve_block(
        &mut self,
        block: &Block,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        self.scoped(ctx, ScopeKind::BodyBlock, block.id, &block.location, |this, ctx| {
            for statement in &block.statements {
                this.resolve_statement(statement, ctx)?;
            }
            Ok(())
        })?;
        ctx.set_type(block.id, TypeInfo::Void);
        Ok(())
    }
}

fn check_inheritance(
    declarations: &[Declaration],
    ctx: &mut SemanticContext,
) -> Result<(), SemanticError> {
    for declaration in declarations {
        if let Declaration::Object(object) = declaration {
            let object_type = ctx.type_of(object.id);
            if inherits_from_itself(&ctx.types, object_type) {
                return Err(SemanticError::new(
                    SemanticErrorKind::CyclicInheritance {
                        name: object.name.name.clone(),
                    },
                    &object.location,
                ));
            }
            check_inheritance(&object.members, ctx)?;
        }
    }
    Ok(())
}

/// Checks that a value of type `found` may be stored where `target` is
/// expected, running inference first when the value still has placeholders.
///
/// Comparison is skipped while either side is incomplete; the completeness
/// pass reports those. A `T` is accepted where `Optional<T>` is expected.
pub(super) fn check_assignable(
    ctx: &mut SemanticContext,
    target: TypeRef,
    value: &Expression,
    found: TypeRef,
    context: MismatchContext,
) -> Result<(), SemanticError> {
    if ctx.types.contains_deferred(found) && !ctx.types.is_incomplete(target) {
        Inferrer::infer(ctx, value, target)?;
    }
    if ctx.types.is_incomplete(target) || ctx.types.is_incomplete(found) {
        return Ok(());
    }
    if DefaultComparer.compare(&ctx.types, target, found) {
        return Ok(());
    }
    if let Some(inner) = ctx.types.optional_inner(target)
        && DefaultComparer.compare(&ctx.types, inner, found)
    {
        return Ok(());
    }
    Err(SemanticError::new(
        SemanticErrorKind::TypeMismatch {
            expected: ctx.types.display(target),
            found: ctx.types.display(found),
            context,
        },
        value.location(),
    ))
}
