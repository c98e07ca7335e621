//! Per-compilation storage of [`TypeInfo`] values.
//!
//! A [`TypeRef`] is a `Copy` handle to one mutable slot of the arena. Several AST
//! nodes and symbols may hold the same handle; updating the slot with
//! [`TypeArena::set`] or [`TypeArena::assign`] is then visible through all of them.
//! Handles are never retargeted, only the slot contents change.
//!
//! Objects and enums are nominal: traversals that look for placeholders stop at
//! them, because each class or enum is validated at its own declaration. This is
//! also what keeps traversals of mutually recursive classes finite.

use rustc_hash::FxHashSet;

use crate::type_info::TypeInfo;

/// Handle to a slot in the [`TypeArena`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeRef(u32);

impl TypeRef {
    /// Get the raw index (for debugging)
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct TypeArena {
    slots: Vec<TypeInfo>,
}

impl TypeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn alloc(&mut self, info: TypeInfo) -> TypeRef {
        let handle = TypeRef(self.slots.len() as u32);
        self.slots.push(info);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: TypeRef) -> &TypeInfo {
        &self.slots[handle.0 as usize]
    }

    pub fn get_mut(&mut self, handle: TypeRef) -> &mut TypeInfo {
        &mut self.slots[handle.0 as usize]
    }

    /// Replaces the contents of a slot.
    pub fn set(&mut self, handle: TypeRef, info: TypeInfo) {
        self.slots[handle.0 as usize] = info;
    }

    /// Copies the contents of `source` into `target`.
    pub fn assign(&mut self, target: TypeRef, source: TypeRef) {
        if target != source {
            let info = self.get(source).clone();
            self.set(target, info);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A type is complete when no `Unknown` or `Deferred` is reachable from it
    /// without crossing a nominal type.
    #[must_use]
    pub fn is_incomplete(&self, handle: TypeRef) -> bool {
        self.reaches(handle, |info| {
            matches!(info, TypeInfo::Unknown | TypeInfo::Deferred)
        })
    }

    /// Whether inference could still fill something in.
    #[must_use]
    pub fn contains_deferred(&self, handle: TypeRef) -> bool {
        self.reaches(handle, |info| matches!(info, TypeInfo::Deferred))
    }

    fn reaches(&self, handle: TypeRef, predicate: impl Fn(&TypeInfo) -> bool) -> bool {
        let mut visited = FxHashSet::default();
        let mut pending = vec![handle];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let info = self.get(current);
            if predicate(info) {
                return true;
            }
            match info {
                TypeInfo::Function {
                    return_type,
                    parameters,
                } => {
                    pending.push(*return_type);
                    pending.extend(parameters.iter().map(|(_, parameter)| *parameter));
                }
                TypeInfo::Generic { parameters, .. } | TypeInfo::EnumItem { parameters, .. } => {
                    pending.extend(parameters.iter().copied());
                }
                TypeInfo::Structure { fields, .. } => {
                    pending.extend(fields.iter().map(|(_, field)| *field));
                }
                TypeInfo::InlineEnum { items, .. } => pending.extend(items.iter().copied()),
                TypeInfo::Void
                | TypeInfo::Unknown
                | TypeInfo::Deferred
                | TypeInfo::Boolean
                | TypeInfo::String
                | TypeInfo::Number(_)
                | TypeInfo::Object { .. }
                | TypeInfo::Enum { .. } => {}
            }
        }
        false
    }

    /// `T` for an `Optional<T>`.
    #[must_use]
    pub fn optional_inner(&self, handle: TypeRef) -> Option<TypeRef> {
        self.generic_argument(handle, TypeInfo::OPTIONAL)
    }

    /// `T` for an `Array<T>`.
    #[must_use]
    pub fn array_element(&self, handle: TypeRef) -> Option<TypeRef> {
        self.generic_argument(handle, TypeInfo::ARRAY)
    }

    fn generic_argument(&self, handle: TypeRef, generic: &str) -> Option<TypeRef> {
        match self.get(handle) {
            TypeInfo::Generic { name, parameters } if name == generic && parameters.len() == 1 => {
                Some(parameters[0])
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn base_class(&self, handle: TypeRef) -> Option<TypeRef> {
        match self.get(handle) {
            TypeInfo::Object { base_class, .. } => *base_class,
            _ => None,
        }
    }

    /// Names of the classes `handle` inherits from, nearest first. Stops at the
    /// first repeated name so cyclic hierarchies terminate.
    #[must_use]
    pub fn ancestor_names(&self, handle: TypeRef) -> Vec<String> {
        let mut seen = FxHashSet::default();
        if let Some(name) = self.get(handle).nominal_name() {
            seen.insert(name.to_string());
        }
        let mut ancestors = Vec::new();
        let mut current = self.base_class(handle);
        while let Some(base) = current {
            let Some(name) = self.get(base).nominal_name() else {
                break;
            };
            if !seen.insert(name.to_string()) {
                break;
            }
            ancestors.push(name.to_string());
            current = self.base_class(base);
        }
        ancestors
    }

    /// Looks a field or method up on an object, then on its ancestors.
    #[must_use]
    pub fn find_field(&self, object: TypeRef, field: &str) -> Option<TypeRef> {
        let mut visited = FxHashSet::default();
        let mut current = Some(object);
        while let Some(handle) = current {
            if !visited.insert(handle) {
                break;
            }
            let TypeInfo::Object {
                fields, base_class, ..
            } = self.get(handle)
            else {
                break;
            };
            if let Some((_, found)) = fields.iter().find(|(name, _)| name == field) {
                return Some(*found);
            }
            current = *base_class;
        }
        None
    }

    /// Renders a type the way it is written in source, e.g. `Array<Int>` or
    /// `(Int, String) -> Bool`.
    #[must_use]
    pub fn display(&self, handle: TypeRef) -> String {
        let mut out = String::new();
        self.render(handle, &mut Vec::new(), &mut out);
        out
    }

    fn render(&self, handle: TypeRef, stack: &mut Vec<TypeRef>, out: &mut String) {
        if stack.contains(&handle) {
            out.push_str("...");
            return;
        }
        stack.push(handle);
        match self.get(handle) {
            TypeInfo::Void => out.push_str("Void"),
            TypeInfo::Unknown => out.push_str("<unknown>"),
            TypeInfo::Deferred => out.push_str("<deferred>"),
            TypeInfo::Boolean => out.push_str("Bool"),
            TypeInfo::String => out.push_str("String"),
            TypeInfo::Number(number) => out.push_str(&number.to_string()),
            TypeInfo::Function {
                return_type,
                parameters,
            } => {
                out.push('(');
                self.render_list(parameters.iter().map(|(_, p)| *p), stack, out);
                out.push_str(") -> ");
                self.render(*return_type, stack, out);
            }
            TypeInfo::Generic { name, parameters } => {
                out.push_str(name);
                out.push('<');
                self.render_list(parameters.iter().copied(), stack, out);
                out.push('>');
            }
            TypeInfo::Structure { fields, .. } => {
                out.push('{');
                for (i, (name, field)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(name);
                    out.push_str(": ");
                    self.render(*field, stack, out);
                }
                out.push('}');
            }
            TypeInfo::Object { name, .. } | TypeInfo::Enum { name, .. } => out.push_str(name),
            TypeInfo::EnumItem {
                name, parameters, ..
            } => {
                out.push_str(name);
                if !parameters.is_empty() {
                    out.push('(');
                    self.render_list(parameters.iter().copied(), stack, out);
                    out.push(')');
                }
            }
            TypeInfo::InlineEnum { items, .. } => {
                out.push_str("enum { ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.render(*item, stack, out);
                }
                out.push_str(" }");
            }
        }
        stack.pop();
    }

    fn render_list(
        &self,
        handles: impl Iterator<Item = TypeRef>,
        stack: &mut Vec<TypeRef>,
        out: &mut String,
    ) {
        for (i, handle) in handles.enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.render(handle, stack, out);
        }
    }
}
