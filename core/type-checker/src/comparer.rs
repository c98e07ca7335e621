//! Type equality relations.
//!
//! [`TypeComparer::compare`] matches on the left operand's variant and hands off
//! to one overridable method per variant. Nested types are compared through
//! `compare` again, so an override applies at every depth.
//!
//! Three relations are provided and picked per call site:
//!
//! | comparer | used for |
//! |---|---|
//! | [`DefaultComparer`] | assignment, arguments, returns, conditions, array elements |
//! | [`ExpressionComparer`] | operands of binary operators |
//! | [`SubtypeComparer`] | the `is` operator |
//!
//! The left operand is the expected side: for structures every field it names
//! must be present on the right, extra fields on the right are ignored.

use rustc_hash::FxHashSet;

use crate::{
    type_arena::{TypeArena, TypeRef},
    type_info::TypeInfo,
};

pub trait TypeComparer {
    fn compare(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        dispatch(self, types, a, b)
    }

    /// `Void`, `Bool`, `String` and the two placeholders: equal when the variant
    /// matches.
    fn compare_simple(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        std::mem::discriminant(types.get(a)) == std::mem::discriminant(types.get(b))
    }

    /// Width and signedness must both match; there is no implicit widening.
    fn compare_number(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        types.get(a) == types.get(b)
    }

    fn compare_function(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        let (
            TypeInfo::Function {
                return_type: a_return,
                parameters: a_parameters,
            },
            TypeInfo::Function {
                return_type: b_return,
                parameters: b_parameters,
            },
        ) = (types.get(a), types.get(b))
        else {
            return false;
        };
        a_parameters.len() == b_parameters.len()
            && a_parameters
                .iter()
                .zip(b_parameters)
                .all(|((_, x), (_, y))| self.compare(types, *x, *y))
            && self.compare(types, *a_return, *b_return)
    }

    fn compare_generic(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        let (
            TypeInfo::Generic {
                name: a_name,
                parameters: a_parameters,
            },
            TypeInfo::Generic {
                name: b_name,
                parameters: b_parameters,
            },
        ) = (types.get(a), types.get(b))
        else {
            return false;
        };
        a_name == b_name && self.compare_all(types, a_parameters, b_parameters)
    }

    fn compare_structure(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        let (
            TypeInfo::Structure {
                fields: expected, ..
            },
            TypeInfo::Structure { fields: actual, .. },
        ) = (types.get(a), types.get(b))
        else {
            return false;
        };
        expected.iter().all(|(name, field)| {
            actual
                .iter()
                .find(|(other, _)| other == name)
                .is_some_and(|(_, other_field)| self.compare(types, *field, *other_field))
        })
    }

    /// Nominal: same declared class name.
    fn compare_object(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        match (types.get(a), types.get(b)) {
            (TypeInfo::Object { name: a_name, .. }, TypeInfo::Object { name: b_name, .. }) => {
                a_name == b_name
            }
            _ => false,
        }
    }

    fn compare_enum(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        match (types.get(a), types.get(b)) {
            (TypeInfo::Enum { name: a_name, .. }, TypeInfo::Enum { name: b_name, .. }) => {
                a_name == b_name
            }
            _ => false,
        }
    }

    fn compare_enum_item(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        let (
            TypeInfo::EnumItem {
                name: a_name,
                parameters: a_parameters,
                ..
            },
            TypeInfo::EnumItem {
                name: b_name,
                parameters: b_parameters,
                ..
            },
        ) = (types.get(a), types.get(b))
        else {
            return false;
        };
        a_name == b_name && self.compare_all(types, a_parameters, b_parameters)
    }

    /// Inline enums are compatible when they share at least one item.
    fn compare_inline_enum(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        let (
            TypeInfo::InlineEnum { items: a_items, .. },
            TypeInfo::InlineEnum { items: b_items, .. },
        ) = (types.get(a), types.get(b))
        else {
            return false;
        };
        a_items
            .iter()
            .any(|x| b_items.iter().any(|y| self.compare(types, *x, *y)))
    }

    fn compare_all(&self, types: &TypeArena, a: &[TypeRef], b: &[TypeRef]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.compare(types, *x, *y))
    }
}

/// Variant dispatch shared by every comparer; overrides of
/// [`TypeComparer::compare`] call it after adjusting their operands.
pub fn dispatch<C: TypeComparer + ?Sized>(
    comparer: &C,
    types: &TypeArena,
    a: TypeRef,
    b: TypeRef,
) -> bool {
    if a == b {
        return true;
    }
    match types.get(a) {
        TypeInfo::Void
        | TypeInfo::Unknown
        | TypeInfo::Deferred
        | TypeInfo::Boolean
        | TypeInfo::String => comparer.compare_simple(types, a, b),
        TypeInfo::Number(_) => comparer.compare_number(types, a, b),
        TypeInfo::Function { .. } => comparer.compare_function(types, a, b),
        TypeInfo::Generic { .. } => comparer.compare_generic(types, a, b),
        TypeInfo::Structure { .. } => comparer.compare_structure(types, a, b),
        TypeInfo::Object { .. } => comparer.compare_object(types, a, b),
        TypeInfo::Enum { .. } => comparer.compare_enum(types, a, b),
        TypeInfo::EnumItem { .. } => comparer.compare_enum_item(types, a, b),
        TypeInfo::InlineEnum { .. } => comparer.compare_inline_enum(types, a, b),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultComparer;

impl TypeComparer for DefaultComparer {}

/// Compares the values expressions evaluate to: a function counts as its
/// return type.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpressionComparer;

impl ExpressionComparer {
    #[must_use]
    pub fn value_type(types: &TypeArena, handle: TypeRef) -> TypeRef {
        match types.get(handle) {
            TypeInfo::Function { return_type, .. } => *return_type,
            _ => handle,
        }
    }
}

impl TypeComparer for ExpressionComparer {
    fn compare(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        dispatch(
            self,
            types,
            Self::value_type(types, a),
            Self::value_type(types, b),
        )
    }
}

/// Accepts a class and any of its ancestors or descendants as equal.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubtypeComparer;

impl SubtypeComparer {
    fn inherits(types: &TypeArena, derived: TypeRef, ancestor: &str) -> bool {
        types.ancestor_names(derived).iter().any(|name| name == ancestor)
    }
}

impl TypeComparer for SubtypeComparer {
    fn compare_object(&self, types: &TypeArena, a: TypeRef, b: TypeRef) -> bool {
        let (TypeInfo::Object { name: a_name, .. }, TypeInfo::Object { name: b_name, .. }) =
            (types.get(a), types.get(b))
        else {
            return false;
        };
        a_name == b_name || Self::inherits(types, a, b_name) || Self::inherits(types, b, a_name)
    }
}

/// Whether following the base classes of `object` leads back to it.
#[must_use]
pub(crate) fn inherits_from_itself(types: &TypeArena, object: TypeRef) -> bool {
    let Some(name) = types.get(object).nominal_name() else {
        return false;
    };
    let mut seen = FxHashSet::default();
    let mut current = types.base_class(object);
    while let Some(base) = current {
        if !seen.insert(base) {
            return false;
        }
        if types.get(base).nominal_name() == Some(name) {
            return true;
        }
        current = types.base_class(base);
    }
    false
}
