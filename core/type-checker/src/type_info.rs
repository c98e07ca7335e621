//! Type Information
//!
//! This module defines the closed set of type shapes the semantic passes reason
//! about. A [`TypeInfo`] never owns another type directly: nested types are
//! [`TypeRef`] handles into the [`TypeArena`](crate::type_arena::TypeArena), which
//! is what lets classes refer to each other recursively and lets a placeholder be
//! resolved in place after the fact.
//!
//! Two placeholders exist:
//! - [`TypeInfo::Unknown`] marks a type that failed to resolve so far. It must not
//!   survive a successful pipeline.
//! - [`TypeInfo::Deferred`] marks a type that inference is expected to fill in
//!   (empty array literals, `null`, enum shorthand).

use core::fmt;
use std::fmt::{Display, Formatter};

use crate::{symbol_table::ScopeId, type_arena::TypeRef};

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum NumberKind {
    Signed,
    Unsigned,
    Float,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct NumberType {
    pub kind: NumberKind,
    pub width: u8,
}

impl NumberType {
    /// Type of integer literals.
    pub const INT: NumberType = NumberType::signed(32);
    /// Type of float literals.
    pub const FLOAT: NumberType = NumberType::float(64);

    /// Every builtin numeric type name with the type it denotes.
    ///
    /// `Int`/`Int32` and `Float`/`Float64` are aliases of each other.
    pub const ALL: &'static [(&'static str, NumberType)] = &[
        ("Int", NumberType::INT),
        ("Int8", NumberType::signed(8)),
        ("Int16", NumberType::signed(16)),
        ("Int32", NumberType::signed(32)),
        ("Int64", NumberType::signed(64)),
        ("UInt8", NumberType::unsigned(8)),
        ("UInt16", NumberType::unsigned(16)),
        ("UInt32", NumberType::unsigned(32)),
        ("UInt64", NumberType::unsigned(64)),
        ("Float", NumberType::FLOAT),
        ("Float32", NumberType::float(32)),
        ("Float64", NumberType::float(64)),
    ];

    #[must_use]
    pub const fn signed(width: u8) -> Self {
        Self {
            kind: NumberKind::Signed,
            width,
        }
    }

    #[must_use]
    pub const fn unsigned(width: u8) -> Self {
        Self {
            kind: NumberKind::Unsigned,
            width,
        }
    }

    #[must_use]
    pub const fn float(width: u8) -> Self {
        Self {
            kind: NumberKind::Float,
            width,
        }
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.kind != NumberKind::Float
    }
}

impl std::str::FromStr for NumberType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, number)| *number)
            .ok_or(())
    }
}

impl Display for NumberType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match (self.kind, self.width) {
            (NumberKind::Signed, 32) => write!(f, "Int"),
            (NumberKind::Float, 64) => write!(f, "Float"),
            (NumberKind::Signed, width) => write!(f, "Int{width}"),
            (NumberKind::Unsigned, width) => write!(f, "UInt{width}"),
            (NumberKind::Float, width) => write!(f, "Float{width}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeInfo {
    Void,
    Unknown,
    Deferred,
    Boolean,
    String,
    Number(NumberType),
    Function {
        return_type: TypeRef,
        parameters: Vec<(String, TypeRef)>,
    },
    /// `Array<T>` and `Optional<T>`.
    Generic {
        name: String,
        parameters: Vec<TypeRef>,
    },
    Structure {
        scope: ScopeId,
        fields: Vec<(String, TypeRef)>,
    },
    /// A class. `scope` is the class body scope created during collection.
    Object {
        scope: ScopeId,
        base_class: Option<TypeRef>,
        name: String,
        fields: Vec<(String, TypeRef)>,
    },
    Enum {
        scope: ScopeId,
        name: String,
        items: Vec<TypeRef>,
    },
    EnumItem {
        scope: ScopeId,
        name: String,
        parameters: Vec<TypeRef>,
    },
    InlineEnum {
        scope: ScopeId,
        items: Vec<TypeRef>,
    },
}

impl TypeInfo {
    pub const ARRAY: &'static str = "Array";
    pub const OPTIONAL: &'static str = "Optional";

    /// Resolves a builtin type name (`Void`, `Bool`, `String` and the numeric
    /// names in [`NumberType::ALL`]).
    #[must_use]
    pub fn builtin(name: &str) -> Option<TypeInfo> {
        match name {
            "Void" => Some(TypeInfo::Void),
            "Bool" => Some(TypeInfo::Boolean),
            "String" => Some(TypeInfo::String),
            _ => name.parse().ok().map(TypeInfo::Number),
        }
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeInfo::Void)
    }

    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeInfo::Boolean)
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, TypeInfo::Number(_))
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, TypeInfo::Number(number) if number.is_integer())
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, TypeInfo::Object { .. })
    }

    #[must_use]
    pub fn is_generic(&self, generic: &str) -> bool {
        matches!(self, TypeInfo::Generic { name, .. } if name == generic)
    }

    /// Name of a nominal type (object or enum).
    #[must_use]
    pub fn nominal_name(&self) -> Option<&str> {
        match self {
            TypeInfo::Object { name, .. } | TypeInfo::Enum { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Short name of the variant, used when a type must be described without
    /// rendering its contents.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeInfo::Void => "void",
            TypeInfo::Unknown => "unknown",
            TypeInfo::Deferred => "deferred",
            TypeInfo::Boolean => "boolean",
            TypeInfo::String => "string",
            TypeInfo::Number(_) => "number",
            TypeInfo::Function { .. } => "function",
            TypeInfo::Generic { .. } => "generic",
            TypeInfo::Structure { .. } => "structure",
            TypeInfo::Object { .. } => "object",
            TypeInfo::Enum { .. } => "enum",
            TypeInfo::EnumItem { .. } => "enum item",
            TypeInfo::InlineEnum { .. } => "inline enum",
        }
    }
}
