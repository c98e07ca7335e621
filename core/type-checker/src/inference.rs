//! Expected-type driven inference.
//!
//! Local resolution leaves `Deferred` where a value cannot type itself: empty
//! array literals, `null` and enum shorthand. Once the value meets a complete
//! target type (a variable annotation, a parameter, a return type), the
//! [`Inferrer`] walks the value with that target on an expectation stack and
//! writes the expected types into the placeholder slots in place.
//!
//! Expectations of the form `Optional<T>` are looked through for arrays,
//! structures and enum shorthand; `null` takes the optional itself.

use kestrel_ast::nodes::{
    ArrayLiteral, BinaryExpression, EnumShorthand, Expression, Literal, StructureLiteral,
};
use tracing::trace;

use crate::{
    errors::{MismatchContext, SemanticError, SemanticErrorKind},
    semantic_context::SemanticContext,
    type_arena::TypeRef,
    type_info::TypeInfo,
};

#[derive(Debug, Default)]
pub(crate) struct Inferrer {
    expected: Vec<TypeRef>,
}

impl Inferrer {
    /// Infers the placeholders of `expression` from `target`.
    pub(crate) fn infer(
        ctx: &mut SemanticContext,
        expression: &Expression,
        target: TypeRef,
    ) -> Result<(), SemanticError> {
        Inferrer::default().with_expected(target, |this| this.visit(ctx, expression))
    }

    fn with_expected(
        &mut self,
        expected: TypeRef,
        body: impl FnOnce(&mut Self) -> Result<(), SemanticError>,
    ) -> Result<(), SemanticError> {
        self.expected.push(expected);
        let result = body(self);
        self.expected.pop();
        result
    }

    fn visit(
        &mut self,
        ctx: &mut SemanticContext,
        expression: &Expression,
    ) -> Result<(), SemanticError> {
        match expression {
            Expression::Array(array) => self.visit_array(ctx, array),
            Expression::Structure(structure) => self.visit_structure(ctx, structure),
            Expression::EnumShorthand(shorthand) => self.visit_shorthand(ctx, shorthand),
            Expression::Literal(literal) if expression.is_null_literal() => {
                self.visit_null(ctx, literal);
                Ok(())
            }
            Expression::Binary(binary) => self.visit_binary(ctx, binary),
            _ => Ok(()),
        }
    }

    /// Top of the stack with one `Optional` layer removed.
    fn expected_value(&self, ctx: &SemanticContext) -> Option<TypeRef> {
        let top = *self.expected.last()?;
        Some(ctx.types.optional_inner(top).unwrap_or(top))
    }

    fn visit_array(
        &mut self,
        ctx: &mut SemanticContext,
        array: &ArrayLiteral,
    ) -> Result<(), SemanticError> {
        let Some(expected) = self.expected_value(ctx) else {
            return Ok(());
        };
        let literal = ctx.type_of(array.id);
        let Some(element) = ctx.types.array_element(literal) else {
            return Ok(());
        };
        let Some(expected_element) = ctx.types.array_element(expected) else {
            return Err(SemanticError::new(
                SemanticErrorKind::TypeMismatch {
                    expected: ctx.types.display(expected),
                    found: ctx.types.display(literal),
                    context: MismatchContext::Inference,
                },
                &array.location,
            ));
        };
        self.with_expected(expected_element, |this| {
            for element in &array.elements {
                this.visit(ctx, element)?;
            }
            Ok(())
        })?;
        if ctx.types.is_incomplete(element) {
            ctx.types.assign(element, expected_element);
            trace!(
                node = array.id,
                element = %ctx.types.display(element),
                "inferred array element"
            );
        }
        Ok(())
    }

    fn visit_structure(
        &mut self,
        ctx: &mut SemanticContext,
        structure: &StructureLiteral,
    ) -> Result<(), SemanticError> {
        let Some(expected) = self.expected_value(ctx) else {
            return Ok(());
        };
        let TypeInfo::Structure { fields, .. } = ctx.types.get(expected).clone() else {
            return Err(SemanticError::new(
                SemanticErrorKind::NotStructural {
                    found: ctx.types.display(expected),
                },
                &structure.location,
            ));
        };
        for field in &structure.fields {
            let Some((_, field_type)) = fields
                .iter()
                .find(|(name, _)| *name == field.name.name)
            else {
                return Err(SemanticError::new(
                    SemanticErrorKind::MissingField {
                        structure: ctx.types.display(expected),
                        field: field.name.name.clone(),
                    },
                    &field.location,
                ));
            };
            self.with_expected(*field_type, |this| this.visit(ctx, &field.value))?;
        }
        Ok(())
    }

    fn visit_shorthand(
        &mut self,
        ctx: &mut SemanticContext,
        shorthand: &EnumShorthand,
    ) -> Result<(), SemanticError> {
        let Some(expected) = self.expected_value(ctx) else {
            return Ok(());
        };
        let item = shorthand.item.name.as_str();
        let items = match ctx.types.get(expected) {
            TypeInfo::Enum { items, .. } | TypeInfo::InlineEnum { items, .. } => items.clone(),
            _ => {
                return Err(SemanticError::new(
                    SemanticErrorKind::NotEnumLike {
                        item: item.to_string(),
                        found: ctx.types.display(expected),
                    },
                    &shorthand.location,
                ));
            }
        };
        let known = items.iter().any(|candidate| {
            matches!(ctx.types.get(*candidate), TypeInfo::EnumItem { name, .. } if name == item)
        });
        if !known {
            return Err(SemanticError::new(
                SemanticErrorKind::UnknownEnumItem {
                    enum_name: ctx.types.display(expected),
                    item: item.to_string(),
                },
                &shorthand.location,
            ));
        }
        let slot = ctx.type_of(shorthand.id);
        ctx.types.assign(slot, expected);
        trace!(node = shorthand.id, item, "inferred enum shorthand");
        Ok(())
    }

    fn visit_null(&mut self, ctx: &mut SemanticContext, literal: &Literal) {
        let Some(expected) = self.expected.last().copied() else {
            return;
        };
        let slot = ctx.type_of(literal.id);
        ctx.types.assign(slot, expected);
        trace!(node = literal.id, ty = %ctx.types.display(slot), "inferred null");
    }

    fn visit_binary(
        &mut self,
        ctx: &mut SemanticContext,
        binary: &BinaryExpression,
    ) -> Result<(), SemanticError> {
        let left = ctx.type_of(binary.left.id());
        let right = ctx.type_of(binary.right.id());
        match (
            ctx.types.contains_deferred(left),
            ctx.types.contains_deferred(right),
        ) {
            (true, false) => self.with_expected(right, |this| this.visit(ctx, &binary.left)),
            (false, true) => self.with_expected(left, |this| this.visit(ctx, &binary.right)),
            _ => Ok(()),
        }
    }
}
