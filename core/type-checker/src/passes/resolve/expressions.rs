use kestrel_ast::nodes::{
    ArrayLiteral, AssignmentExpression, BinaryExpression, CallExpression, Expression, Identifier,
    IndexExpression, Literal, LiteralKind, Location, MemberAccessExpression, NodeId, OperatorKind,
    StructureLiteral, UnaryExpression, UnaryOperatorKind,
};
use tracing::trace;

use crate::{
    comparer::{DefaultComparer, ExpressionComparer, SubtypeComparer, TypeComparer},
    errors::{MismatchContext, SemanticError, SemanticErrorKind},
    inference::Inferrer,
    scope_policy::ScopePolicy,
    semantic_context::SemanticContext,
    symbol_table::{ScopeId, ScopeKind, SymbolKind},
    type_arena::TypeRef,
    type_info::{NumberType, TypeInfo},
};

use super::{Resolver, check_assignable};

impl<P: ScopePolicy> Resolver<'_, P> {
    pub(super) fn resolve_expression(
        &mut self,
        expression: &Expression,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let resolved = match expression {
            Expression::Literal(literal) => Ok(resolve_literal(literal, ctx)),
            Expression::Identifier(identifier) => self.resolve_identifier(identifier, ctx),
            Expression::This(this) => {
                let object = enclosing_object(ctx, "this", &this.location)?;
                let object_type = ctx.type_of(object);
                Ok(ctx.bind_type(this.id, object_type))
            }
            Expression::Super(super_expression) => {
                let object = enclosing_object(ctx, "super", &super_expression.location)?;
                let object_type = ctx.type_of(object);
                let Some(base) = ctx.types.base_class(object_type) else {
                    return Err(SemanticError::new(
                        SemanticErrorKind::NoBaseClass {
                            object: ctx.types.display(object_type),
                        },
                        &super_expression.location,
                    ));
                };
                Ok(ctx.bind_type(super_expression.id, base))
            }
            Expression::Call(call) => self.resolve_call(call, ctx),
            Expression::Binary(binary) => self.resolve_binary(binary, ctx),
            Expression::Unary(unary) => self.resolve_unary(unary, ctx),
            Expression::MemberAccess(member) => self.resolve_member_access(member, ctx),
            Expression::Index(index) => self.resolve_index(index, ctx),
            Expression::Assignment(assignment) => self.resolve_assignment(assignment, ctx),
            Expression::Array(array) => self.resolve_array(array, ctx),
            Expression::Structure(structure) => self.resolve_structure(structure, ctx),
            Expression::EnumShorthand(shorthand) => {
                Ok(ctx.set_type(shorthand.id, TypeInfo::Deferred))
            }
        }?;
        trace!(
            node = expression.id(),
            expression = %expression.describe(),
            ty = %ctx.types.display(resolved),
            "resolved expression"
        );
        Ok(resolved)
    }

    fn resolve_identifier(
        &mut self,
        identifier: &Identifier,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let Some(declaration) = ctx
            .lookup(&identifier.name, SymbolKind::Identifier)
            .map(|symbol| symbol.declaration)
        else {
            return Err(SemanticError::new(
                SemanticErrorKind::UnresolvedReference {
                    name: identifier.name.clone(),
                },
                &identifier.location,
            ));
        };
        self.resolve_on_demand(declaration, ctx)?;
        let declared = ctx.type_of(declaration);
        Ok(ctx.bind_type(identifier.id, declared))
    }

    /// Resolves an operand that may also be a bare class or enum name, as in
    /// `Point()`, `a is Point` or `Color.Red`. The flag tells whether a type
    /// name was found.
    fn resolve_operand_or_type(
        &mut self,
        expression: &Expression,
        ctx: &mut SemanticContext,
    ) -> Result<(TypeRef, bool), SemanticError> {
        if let Some(named) = type_name(expression, ctx) {
            return Ok((named, true));
        }
        Ok((self.resolve_expression(expression, ctx)?, false))
    }

    fn resolve_call(
        &mut self,
        call: &CallExpression,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let (callee, is_type) = self.resolve_operand_or_type(&call.callee, ctx)?;
        let callee_name = callee_name(&call.callee);
        let argument_count = |expected: usize| {
            SemanticError::new(
                SemanticErrorKind::ArgumentCount {
                    callee: callee_name.clone(),
                    expected,
                    found: call.arguments.len(),
                },
                &call.location,
            )
        };

        let parameters = match ctx.types.get(callee) {
            TypeInfo::Object { .. } if is_type => {
                if !call.arguments.is_empty() {
                    return Err(argument_count(0));
                }
                return Ok(ctx.bind_type(call.id, callee));
            }
            TypeInfo::Function { parameters, .. } if !is_type => parameters.clone(),
            _ => {
                return Err(SemanticError::new(
                    SemanticErrorKind::NotCallable {
                        found: ctx.types.display(callee),
                    },
                    call.callee.location(),
                ));
            }
        };
        if parameters.len() != call.arguments.len() {
            return Err(argument_count(parameters.len()));
        }

        for (index, (argument, (parameter, expected))) in
            call.arguments.iter().zip(parameters).enumerate()
        {
            let found = self.resolve_expression(argument, ctx)?;
            check_assignable(
                ctx,
                expected,
                argument,
                found,
                MismatchContext::Argument {
                    callee: callee_name.clone(),
                    parameter,
                    index,
                },
            )?;
        }

        let return_type = ExpressionComparer::value_type(&ctx.types, callee);
        Ok(ctx.bind_type(call.id, return_type))
    }

    fn resolve_binary(
        &mut self,
        binary: &BinaryExpression,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let operator = binary.operator;
        let left = self.resolve_expression(&binary.left, ctx)?;
        let right = if operator == OperatorKind::Is {
            self.resolve_operand_or_type(&binary.right, ctx)?.0
        } else {
            self.resolve_expression(&binary.right, ctx)?
        };
        let left_value = ExpressionComparer::value_type(&ctx.types, left);
        let right_value = ExpressionComparer::value_type(&ctx.types, right);

        if ctx.types.get(left_value).is_void() || ctx.types.get(right_value).is_void() {
            return Err(SemanticError::new(
                SemanticErrorKind::VoidOperand { operator },
                &binary.location,
            ));
        }

        let mismatch = |ctx: &SemanticContext| {
            SemanticError::new(
                SemanticErrorKind::TypeMismatch {
                    expected: ctx.types.display(left_value),
                    found: ctx.types.display(right_value),
                    context: MismatchContext::Operator(operator),
                },
                binary.right.location(),
            )
        };

        if operator == OperatorKind::Is {
            let complete = !ctx.types.is_incomplete(left) && !ctx.types.is_incomplete(right);
            if complete && !SubtypeComparer.compare(&ctx.types, left_value, right_value) {
                return Err(mismatch(ctx));
            }
            return Ok(ctx.set_type(binary.id, TypeInfo::Boolean));
        }

        let left_deferred = ctx.types.contains_deferred(left);
        let right_deferred = ctx.types.contains_deferred(right);
        if left_deferred && !ctx.types.is_incomplete(right) {
            Inferrer::infer(ctx, &binary.left, right_value)?;
        } else if right_deferred && !ctx.types.is_incomplete(left) {
            Inferrer::infer(ctx, &binary.right, left_value)?;
        }

        if !ctx.types.is_incomplete(left) && !ctx.types.is_incomplete(right) {
            if !ExpressionComparer.compare(&ctx.types, left, right) {
                return Err(mismatch(ctx));
            }
            if !operand_fits(operator, ctx.types.get(left_value)) {
                return Err(SemanticError::new(
                    SemanticErrorKind::InvalidOperand {
                        operator,
                        found: ctx.types.display(left_value),
                    },
                    binary.left.location(),
                ));
            }
        }

        if operator.yields_boolean() {
            return Ok(ctx.set_type(binary.id, TypeInfo::Boolean));
        }
        let result = ctx.type_of(binary.id);
        ctx.types.assign(result, left_value);
        Ok(result)
    }

    fn resolve_unary(
        &mut self,
        unary: &UnaryExpression,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let operand = self.resolve_expression(&unary.operand, ctx)?;
        let operand = ExpressionComparer::value_type(&ctx.types, operand);
        let info = ctx.types.get(operand);
        let fits = match unary.operator {
            UnaryOperatorKind::Neg => info.is_number(),
            UnaryOperatorKind::Not => info.is_boolean(),
        };
        if !fits && !ctx.types.is_incomplete(operand) {
            return Err(SemanticError::new(
                SemanticErrorKind::InvalidUnaryOperand {
                    operator: unary.operator,
                    found: ctx.types.display(operand),
                },
                unary.operand.location(),
            ));
        }
        match unary.operator {
            UnaryOperatorKind::Not => Ok(ctx.set_type(unary.id, TypeInfo::Boolean)),
            UnaryOperatorKind::Neg => {
                let result = ctx.type_of(unary.id);
                ctx.types.assign(result, operand);
                Ok(result)
            }
        }
    }

    fn resolve_member_access(
        &mut self,
        member: &MemberAccessExpression,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let name = member.member.name.as_str();
        let (object, is_type) = self.resolve_operand_or_type(&member.object, ctx)?;

        if is_type {
            let unknown = match ctx.types.get(object) {
                TypeInfo::Enum {
                    name: enum_name,
                    items,
                    ..
                } => {
                    let known = items.iter().any(|item| {
                        matches!(
                            ctx.types.get(*item),
                            TypeInfo::EnumItem { name: item_name, .. } if item_name == name
                        )
                    });
                    (!known).then(|| SemanticErrorKind::UnknownEnumItem {
                        enum_name: enum_name.clone(),
                        item: name.to_string(),
                    })
                }
                _ => Some(SemanticErrorKind::MissingMember {
                    type_name: ctx.types.display(object),
                    member: name.to_string(),
                }),
            };
            return match unknown {
                Some(kind) => Err(SemanticError::new(kind, &member.member.location)),
                None => Ok(ctx.bind_type(member.id, object)),
            };
        }

        let object = ExpressionComparer::value_type(&ctx.types, object);
        let TypeInfo::Object { name: type_name, .. } = ctx.types.get(object) else {
            if ctx.types.is_incomplete(object) {
                return Ok(ctx.type_of(member.id));
            }
            return Err(SemanticError::new(
                SemanticErrorKind::NotAnObject {
                    found: ctx.types.display(object),
                },
                member.object.location(),
            ));
        };
        let Some(field) = ctx.types.find_field(object, name) else {
            return Err(SemanticError::new(
                SemanticErrorKind::MissingMember {
                    type_name: type_name.clone(),
                    member: name.to_string(),
                },
                &member.member.location,
            ));
        };
        if let Some(declaration) = self.variable_slots.get(&field).copied() {
            self.resolve_on_demand(declaration, ctx)?;
        }
        Ok(ctx.bind_type(member.id, field))
    }

    fn resolve_index(
        &mut self,
        index: &IndexExpression,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let array = self.resolve_expression(&index.array, ctx)?;
        let position = self.resolve_expression(&index.index, ctx)?;
        let Some(element) = ctx.types.array_element(array) else {
            if ctx.types.is_incomplete(array) {
                return Ok(ctx.type_of(index.id));
            }
            return Err(SemanticError::new(
                SemanticErrorKind::NotIndexable {
                    found: ctx.types.display(array),
                },
                index.array.location(),
            ));
        };
        if !ctx.types.is_incomplete(position) && !ctx.types.get(position).is_integer() {
            return Err(SemanticError::new(
                SemanticErrorKind::TypeMismatch {
                    expected: NumberType::INT.to_string(),
                    found: ctx.types.display(position),
                    context: MismatchContext::Index,
                },
                index.index.location(),
            ));
        }
        Ok(ctx.bind_type(index.id, element))
    }

    fn resolve_assignment(
        &mut self,
        assignment: &AssignmentExpression,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        if !assignment.target.is_assignable() {
            return Err(SemanticError::new(
                SemanticErrorKind::InvalidAssignmentTarget,
                assignment.target.location(),
            ));
        }
        let target = self.resolve_expression(&assignment.target, ctx)?;
        let value = self.resolve_expression(&assignment.value, ctx)?;
        if ctx.types.get(value).is_void() || ctx.types.get(target).is_void() {
            return Err(SemanticError::new(
                SemanticErrorKind::VoidAssignment,
                &assignment.location,
            ));
        }
        check_assignable(ctx, target, &assignment.value, value, MismatchContext::Assignment)?;
        Ok(ctx.bind_type(assignment.id, value))
    }

    /// Element types anchor on the first element whose type is complete; the
    /// others must match it or are inferred from it.
    fn resolve_array(
        &mut self,
        array: &ArrayLiteral,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let mut elements = Vec::with_capacity(array.elements.len());
        for element in &array.elements {
            elements.push(self.resolve_expression(element, ctx)?);
        }

        let anchor = elements
            .iter()
            .copied()
            .find(|element| !ctx.types.is_incomplete(*element));
        let element = match anchor {
            Some(anchor) => {
                for (index, (expression, found)) in
                    array.elements.iter().zip(&elements).enumerate()
                {
                    if ctx.types.contains_deferred(*found) {
                        Inferrer::infer(ctx, expression, anchor)?;
                    } else if !ctx.types.is_incomplete(*found)
                        && !element_fits(ctx, anchor, *found)
                    {
                        return Err(SemanticError::new(
                            SemanticErrorKind::TypeMismatch {
                                expected: ctx.types.display(anchor),
                                found: ctx.types.display(*found),
                                context: MismatchContext::ArrayElement { index },
                            },
                            expression.location(),
                        ));
                    }
                }
                let info = ctx.types.get(anchor).clone();
                ctx.types.alloc(info)
            }
            None => ctx.types.alloc(TypeInfo::Deferred),
        };

        Ok(ctx.set_type(
            array.id,
            TypeInfo::Generic {
                name: TypeInfo::ARRAY.to_string(),
                parameters: vec![element],
            },
        ))
    }

    fn resolve_structure(
        &mut self,
        structure: &StructureLiteral,
        ctx: &mut SemanticContext,
    ) -> Result<TypeRef, SemanticError> {
        let mut fields = Vec::with_capacity(structure.fields.len());
        for field in &structure.fields {
            let value = self.resolve_expression(&field.value, ctx)?;
            fields.push((field.name.name.clone(), value));
        }
        let scope = ctx.current_scope().unwrap_or(ScopeId::ROOT);
        Ok(ctx.set_type(structure.id, TypeInfo::Structure { scope, fields }))
    }
}

fn resolve_literal(literal: &Literal, ctx: &mut SemanticContext) -> TypeRef {
    let info = match &literal.kind {
        LiteralKind::Integer(_) => TypeInfo::Number(NumberType::INT),
        LiteralKind::Float(_) => TypeInfo::Number(NumberType::FLOAT),
        LiteralKind::String(_) => TypeInfo::String,
        LiteralKind::Boolean(_) => TypeInfo::Boolean,
        LiteralKind::Null => TypeInfo::Deferred,
    };
    ctx.set_type(literal.id, info)
}

/// The declaration node of the class surrounding the current scope.
fn enclosing_object(
    ctx: &SemanticContext,
    keyword: &'static str,
    location: &Location,
) -> Result<NodeId, SemanticError> {
    ctx.enclosing_scope(ScopeKind::Object)
        .map(|scope| ctx.scope(scope).node())
        .ok_or_else(|| SemanticError::new(SemanticErrorKind::OutsideObject { keyword }, location))
}

/// A bare identifier naming a class or enum, provided no value of that name
/// is visible.
fn type_name(expression: &Expression, ctx: &mut SemanticContext) -> Option<TypeRef> {
    let Expression::Identifier(identifier) = expression else {
        return None;
    };
    if ctx.lookup(&identifier.name, SymbolKind::Identifier).is_some() {
        return None;
    }
    let declaration = ctx.lookup(&identifier.name, SymbolKind::Type)?.declaration;
    let declared = ctx.type_of(declaration);
    Some(ctx.bind_type(identifier.id, declared))
}

fn callee_name(callee: &Expression) -> String {
    match callee {
        Expression::Identifier(identifier) => identifier.name.clone(),
        Expression::MemberAccess(member) => member.member.name.clone(),
        other => other.describe(),
    }
}

fn operand_fits(operator: OperatorKind, operand: &TypeInfo) -> bool {
    if operator.is_arithmetic() {
        operand.is_number()
            || (operator == OperatorKind::Add && matches!(operand, TypeInfo::String))
    } else if operator.is_ordering() {
        operand.is_number()
    } else if operator.is_logical() {
        operand.is_boolean()
    } else {
        true
    }
}

fn element_fits(ctx: &SemanticContext, anchor: TypeRef, found: TypeRef) -> bool {
    DefaultComparer.compare(&ctx.types, anchor, found)
        || ctx
            .types
            .optional_inner(anchor)
            .is_some_and(|inner| DefaultComparer.compare(&ctx.types, inner, found))
}
