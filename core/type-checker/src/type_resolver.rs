//! Turns written type annotations into arena types.
//!
//! A name that denotes a class or enum makes the annotation share the
//! declaration's slot, so the annotation follows the declaration as it is
//! filled in. Annotations that were already resolved once are updated in place.

use kestrel_ast::nodes::{EnumItemDeclaration, NamedType, TypeExpr};

use crate::{
    errors::{SemanticError, SemanticErrorKind},
    semantic_context::SemanticContext,
    symbol_table::{ScopeId, SymbolKind},
    type_arena::TypeRef,
    type_info::TypeInfo,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Strictness {
    /// Unknown names leave the annotation `Unknown`.
    Lenient,
    /// Unknown names are an error.
    Strict,
}

pub(crate) fn resolve_type_expr(
    ctx: &mut SemanticContext,
    type_expr: &TypeExpr,
    strictness: Strictness,
) -> Result<TypeRef, SemanticError> {
    match type_expr {
        TypeExpr::Named(named) => resolve_named(ctx, named, strictness),
        TypeExpr::Function(function) => {
            let mut parameters = Vec::with_capacity(function.parameters.len());
            for (index, parameter) in function.parameters.iter().enumerate() {
                let parameter = resolve_type_expr(ctx, parameter, strictness)?;
                parameters.push((index.to_string(), parameter));
            }
            let return_type = match &function.returns {
                Some(returns) => resolve_type_expr(ctx, returns, strictness)?,
                None => ctx.types.alloc(TypeInfo::Void),
            };
            Ok(ctx.set_type(
                function.id,
                TypeInfo::Function {
                    return_type,
                    parameters,
                },
            ))
        }
        TypeExpr::Structure(structure) => {
            let mut fields = Vec::with_capacity(structure.fields.len());
            for field in &structure.fields {
                let ty = resolve_type_expr(ctx, &field.ty, strictness)?;
                fields.push((field.name.name.clone(), ty));
            }
            let scope = current_scope(ctx);
            Ok(ctx.set_type(structure.id, TypeInfo::Structure { scope, fields }))
        }
        TypeExpr::InlineEnum(inline) => {
            let mut items = Vec::with_capacity(inline.items.len());
            for item in &inline.items {
                items.push(resolve_enum_item(ctx, item, strictness)?);
            }
            let scope = current_scope(ctx);
            Ok(ctx.set_type(inline.id, TypeInfo::InlineEnum { scope, items }))
        }
    }
}

/// Types an enum item (declared or inline) from its payload annotations.
pub(crate) fn resolve_enum_item(
    ctx: &mut SemanticContext,
    item: &EnumItemDeclaration,
    strictness: Strictness,
) -> Result<TypeRef, SemanticError> {
    let mut parameters = Vec::with_capacity(item.parameters.len());
    for parameter in &item.parameters {
        parameters.push(resolve_type_expr(ctx, parameter, strictness)?);
    }
    let scope = current_scope(ctx);
    Ok(ctx.set_type(
        item.id,
        TypeInfo::EnumItem {
            scope,
            name: item.name.name.clone(),
            parameters,
        },
    ))
}

fn resolve_named(
    ctx: &mut SemanticContext,
    named: &NamedType,
    strictness: Strictness,
) -> Result<TypeRef, SemanticError> {
    let name = named.name.name.as_str();
    let argument_count = |expected: usize| {
        SemanticError::new(
            SemanticErrorKind::TypeArgumentCount {
                name: name.to_string(),
                expected,
                found: named.arguments.len(),
            },
            &named.location,
        )
    };

    if named.arguments.is_empty()
        && let Some(info) = TypeInfo::builtin(name)
    {
        return Ok(ctx.set_type(named.id, info));
    }

    if name == TypeInfo::ARRAY || name == TypeInfo::OPTIONAL {
        let [argument] = named.arguments.as_slice() else {
            return Err(argument_count(1));
        };
        let argument = resolve_type_expr(ctx, argument, strictness)?;
        return Ok(ctx.set_type(
            named.id,
            TypeInfo::Generic {
                name: name.to_string(),
                parameters: vec![argument],
            },
        ));
    }

    match ctx.lookup(name, SymbolKind::Type).map(|symbol| symbol.declaration) {
        Some(declaration) => {
            if !named.arguments.is_empty() {
                return Err(argument_count(0));
            }
            let target = ctx.type_of(declaration);
            Ok(ctx.bind_type(named.id, target))
        }
        None if strictness == Strictness::Lenient => Ok(ctx.type_of(named.id)),
        None => Err(SemanticError::new(
            SemanticErrorKind::UnresolvedType {
                name: name.to_string(),
            },
            &named.location,
        )),
    }
}

fn current_scope(ctx: &SemanticContext) -> ScopeId {
    ctx.current_scope().unwrap_or(ScopeId::ROOT)
}
