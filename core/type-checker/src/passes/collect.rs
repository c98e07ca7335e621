//! Declaration collection.
//!
//! A forward walk over declarations (never into function bodies) that opens the
//! program, class, function and enum scopes, registers every named symbol and
//! gives each declaration a best-effort type:
//!
//! - classes register their `Type` symbol before anything inside them, so
//!   members may refer to the class itself; fields and methods are appended to
//!   the class type as they are collected
//! - functions record a `Function` type from their annotations (`Void` when the
//!   return is not annotated); parameters become symbols of the function scope
//! - variables take their annotation, or failing that a shallow guess from the
//!   initializer
//! - enums record one `EnumItem` per item and a value symbol per item
//!
//! Names that cannot be resolved yet (forward references) are left `Unknown` for
//! the resolution pass. Extern functions are the exception: their signature has
//! to be concrete here.

use kestrel_ast::nodes::{
    Declaration, EnumDeclaration, Expression, ExternDeclaration, FunctionDeclaration,
    LiteralKind, ObjectDeclaration, Parameter, Program, VariableDeclaration,
};
use tracing::debug;

use crate::{
    errors::{SemanticError, SemanticErrorKind},
    passes::SemanticPass,
    scope_policy::{FreshScopes, ScopePolicy, Scoped},
    semantic_context::SemanticContext,
    symbol_table::{ScopeId, ScopeKind, SymbolKind},
    type_arena::TypeRef,
    type_info::{NumberType, TypeInfo},
    type_resolver::{Strictness, resolve_enum_item, resolve_type_expr},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct DeclarationCollector<P: ScopePolicy = FreshScopes> {
    policy: P,
}

impl DeclarationCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ScopePolicy> DeclarationCollector<P> {
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }
}

impl<P: ScopePolicy> Scoped for DeclarationCollector<P> {
    type Policy = P;

    fn policy(&self) -> P {
        self.policy
    }
}

impl<P: ScopePolicy + 'static> SemanticPass for DeclarationCollector<P> {
    fn name(&self) -> &'static str {
        "collect-declarations"
    }

    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let program: &Program = program;
        self.scoped(ctx, ScopeKind::Program, program.id, &program.location, |this, ctx| {
            for declaration in &program.declarations {
                this.collect_declaration(declaration, ctx)?;
            }
            Ok(())
        })
    }
}

impl<P: ScopePolicy> DeclarationCollector<P> {
    fn collect_declaration(
        &mut self,
        declaration: &Declaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        debug!(declaration = %declaration.describe(), "collecting");
        let result = match declaration {
            Declaration::Object(object) => self.collect_object(object, ctx),
            Declaration::Function(function) => self.collect_function(function, ctx),
            Declaration::Variable(variable) => Self::collect_variable(variable, ctx),
            Declaration::Enum(enum_declaration) => self.collect_enum(enum_declaration, ctx),
            Declaration::Extern(extern_declaration) => {
                Self::collect_extern(extern_declaration, ctx)
            }
        };
        result.map_err(|err| err.with_context(declaration.name()))
    }

    fn collect_object(
        &mut self,
        object: &ObjectDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        ctx.declare(&object.name.name, SymbolKind::Type, object.id, &object.location)?;
        self.scoped(ctx, ScopeKind::Object, object.id, &object.location, |this, ctx| {
            let scope = ctx.current_scope().unwrap_or(ScopeId::ROOT);
            let base_class = object
                .base
                .as_ref()
                .map(|base| resolve_type_expr(ctx, base, Strictness::Lenient))
                .transpose()?;
            let object_type = ctx.set_type(
                object.id,
                TypeInfo::Object {
                    scope,
                    base_class,
                    name: object.name.name.clone(),
                    fields: vec![],
                },
            );
            for member in &object.members {
                this.collect_declaration(member, ctx)?;
                if matches!(member, Declaration::Variable(_) | Declaration::Function(_)) {
                    let member_type = ctx.type_of(member.id());
                    if let TypeInfo::Object { fields, .. } = ctx.types.get_mut(object_type) {
                        fields.push((member.name().to_string(), member_type));
                    }
                }
            }
            Ok(())
        })
    }

    fn collect_function(
        &mut self,
        function: &FunctionDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        ctx.declare(
            &function.name.name,
            SymbolKind::Identifier,
            function.id,
            &function.location,
        )?;
        self.scoped(ctx, ScopeKind::Function, function.id, &function.location, |_, ctx| {
            let parameters = collect_parameters(&function.parameters, ctx, Strictness::Lenient)?;
            let return_type = match &function.returns {
                Some(returns) => resolve_type_expr(ctx, returns, Strictness::Lenient)?,
                None => ctx.types.alloc(TypeInfo::Void),
            };
            ctx.set_type(
                function.id,
                TypeInfo::Function {
                    return_type,
                    parameters,
                },
            );
            Ok(())
        })
    }

    fn collect_variable(
        variable: &VariableDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        ctx.declare(
            &variable.name.name,
            SymbolKind::Identifier,
            variable.id,
            &variable.location,
        )?;
        let declared = match (&variable.ty, &variable.value) {
            (Some(annotation), _) => resolve_type_expr(ctx, annotation, Strictness::Lenient)?,
            (None, Some(value)) => initializer_type(value, ctx),
            (None, None) => {
                return Err(SemanticError::new(
                    SemanticErrorKind::UntypedDeclaration {
                        name: variable.name.name.clone(),
                    },
                    &variable.location,
                ));
            }
        };
        let slot = ctx.type_of(variable.id);
        ctx.types.assign(slot, declared);
        Ok(())
    }

    fn collect_enum(
        &mut self,
        enum_declaration: &EnumDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        ctx.declare(
            &enum_declaration.name.name,
            SymbolKind::Type,
            enum_declaration.id,
            &enum_declaration.location,
        )?;
        let (id, location) = (enum_declaration.id, &enum_declaration.location);
        self.scoped(ctx, ScopeKind::Enum, id, location, |_, ctx| {
            let scope = ctx.current_scope().unwrap_or(ScopeId::ROOT);
            let mut items = Vec::with_capacity(enum_declaration.items.len());
            for item in &enum_declaration.items {
                ctx.declare(&item.name.name, SymbolKind::Identifier, item.id, &item.location)?;
                items.push(resolve_enum_item(ctx, item, Strictness::Lenient)?);
            }
            ctx.set_type(
                enum_declaration.id,
                TypeInfo::Enum {
                    scope,
                    name: enum_declaration.name.name.clone(),
                    items,
                },
            );
            Ok(())
        })
    }

    fn collect_extern(
        extern_declaration: &ExternDeclaration,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let not_concrete = || {
            SemanticError::new(
                SemanticErrorKind::ExternNotConcrete {
                    name: extern_declaration.name.name.clone(),
                },
                &extern_declaration.location,
            )
        };
        ctx.declare(
            &extern_declaration.name.name,
            SymbolKind::Identifier,
            extern_declaration.id,
            &extern_declaration.location,
        )?;
        let parameters =
            collect_parameters(&extern_declaration.parameters, ctx, Strictness::Strict)
                .map_err(|_| not_concrete())?;
        let return_type = match &extern_declaration.returns {
            Some(returns) => {
                resolve_type_expr(ctx, returns, Strictness::Strict).map_err(|_| not_concrete())?
            }
            None => ctx.types.alloc(TypeInfo::Void),
        };
        let function = ctx.set_type(
            extern_declaration.id,
            TypeInfo::Function {
                return_type,
                parameters,
            },
        );
        if ctx.types.is_incomplete(function) {
            return Err(not_concrete());
        }
        Ok(())
    }
}

/// Types each parameter from its annotation. Inside a function scope the
/// parameters also become symbols of that scope.
fn collect_parameters(
    parameters: &[Parameter],
    ctx: &mut SemanticContext,
    strictness: Strictness,
) -> Result<Vec<(String, TypeRef)>, SemanticError> {
    let in_function = ctx.current_scope_kind() == Some(ScopeKind::Function);
    let mut collected = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        if in_function {
            ctx.declare(
                &parameter.name.name,
                SymbolKind::Identifier,
                parameter.id,
                &parameter.location,
            )?;
        }
        let annotation = resolve_type_expr(ctx, &parameter.ty, strictness)?;
        let slot = ctx.type_of(parameter.id);
        ctx.types.assign(slot, annotation);
        collected.push((parameter.name.name.clone(), slot));
    }
    Ok(collected)
}

/// What an initializer can be seen to produce before anything is resolved:
/// literals, names collected earlier and calls of functions or classes
/// collected earlier. Everything else is left to the resolution pass.
fn initializer_type(value: &Expression, ctx: &mut SemanticContext) -> TypeRef {
    let info = match value {
        Expression::Literal(literal) => match literal.kind {
            LiteralKind::Integer(_) => Some(TypeInfo::Number(NumberType::INT)),
            LiteralKind::Float(_) => Some(TypeInfo::Number(NumberType::FLOAT)),
            LiteralKind::String(_) => Some(TypeInfo::String),
            LiteralKind::Boolean(_) => Some(TypeInfo::Boolean),
            LiteralKind::Null => None,
        },
        Expression::Identifier(identifier) => ctx
            .lookup(&identifier.name, SymbolKind::Identifier)
            .map(|symbol| symbol.declaration)
            .and_then(|declaration| ctx.node_type(declaration))
            .map(|declared| ctx.types.get(declared).clone()),
        Expression::Call(call) => match call.callee.as_ref() {
            Expression::Identifier(callee) => callee_result(&callee.name, ctx),
            _ => None,
        },
        _ => None,
    };
    ctx.types.alloc(info.unwrap_or(TypeInfo::Unknown))
}

fn callee_result(name: &str, ctx: &SemanticContext) -> Option<TypeInfo> {
    let value = ctx
        .lookup(name, SymbolKind::Identifier)
        .and_then(|symbol| ctx.type_info(symbol.declaration));
    if let Some(TypeInfo::Function { return_type, .. }) = value {
        return Some(ctx.types.get(*return_type).clone());
    }
    let class = ctx
        .lookup(name, SymbolKind::Type)
        .and_then(|symbol| ctx.type_info(symbol.declaration))?;
    class.is_object().then(|| class.clone())
}
