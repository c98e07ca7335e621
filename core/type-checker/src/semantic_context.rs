//! Semantic Context - state shared by every pass of one compilation
//!
//! ```text
//! SemanticContext
//! ├─ types: TypeArena            every TypeInfo slot
//! ├─ node_types: NodeId → TypeRef
//! ├─ scopes: [Scope]             flat, parent-linked tree
//! ├─ node_scopes: NodeId → ScopeId
//! ├─ scope_stack: [ScopeId]      scopes entered by the running pass
//! └─ control_flow: NodeId → ControlFlowGraph
//! ```
//!
//! A node that has not been typed yet is treated as `Unknown`; [`type_of`]
//! allocates that `Unknown` slot on first access so later passes can fill it in
//! place.
//!
//! [`type_of`]: SemanticContext::type_of

use kestrel_ast::nodes::{Location, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::{
    errors::{SemanticError, SemanticErrorKind},
    passes::control_flow::ControlFlowGraph,
    symbol_table::{Scope, ScopeId, ScopeKind, Symbol, SymbolKind},
    type_arena::{TypeArena, TypeRef},
    type_info::TypeInfo,
};

#[derive(Debug, Default)]
pub struct SemanticContext {
    pub types: TypeArena,
    scopes: Vec<Scope>,
    scope_stack: Vec<ScopeId>,
    node_types: FxHashMap<NodeId, TypeRef>,
    node_scopes: FxHashMap<NodeId, ScopeId>,
    control_flow: FxHashMap<NodeId, ControlFlowGraph>,
}

impl SemanticContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Scopes

    /// Opens a new scope as a child of the current one and pushes it.
    #[allow(clippy::cast_possible_truncation)]
    pub fn enter_scope(&mut self, kind: ScopeKind, node: NodeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let parent = self.current_scope();
        self.scopes.push(Scope::new(id, parent, kind, node));
        self.node_scopes.insert(node, id);
        self.scope_stack.push(id);
        trace!(scope = id.0, ?kind, node, "enter scope");
        id
    }

    /// Pushes the scope an earlier pass opened for `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SemanticErrorKind::ScopeNotFound`] when no scope was opened for
    /// the node.
    pub fn recall_scope(
        &mut self,
        node: NodeId,
        location: &Location,
    ) -> Result<ScopeId, SemanticError> {
        let id = self.scope_of(node).ok_or_else(|| {
            SemanticError::new(SemanticErrorKind::ScopeNotFound { node }, location)
        })?;
        self.scope_stack.push(id);
        trace!(scope = id.0, node, "recall scope");
        Ok(id)
    }

    /// Pops the current scope. The scope itself stays registered.
    pub fn exit_scope(&mut self) {
        if let Some(id) = self.scope_stack.pop() {
            trace!(scope = id.0, "exit scope");
        }
    }

    #[must_use]
    pub fn current_scope(&self) -> Option<ScopeId> {
        self.scope_stack.last().copied()
    }

    #[must_use]
    pub fn current_scope_kind(&self) -> Option<ScopeKind> {
        self.current_scope().map(|id| self.scope(id).kind())
    }

    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scope_stack.len()
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Scope opened for `node`, if any.
    #[must_use]
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// Nearest scope of `kind` on the stack.
    #[must_use]
    pub fn enclosing_scope(&self, kind: ScopeKind) -> Option<ScopeId> {
        self.scope_stack
            .iter()
            .rev()
            .copied()
            .find(|id| self.scope(*id).kind() == kind)
    }

    #[must_use]
    pub fn is_inside(&self, kind: ScopeKind) -> bool {
        self.enclosing_scope(kind).is_some()
    }

    /// `scope` and its ancestors, outermost first.
    #[must_use]
    pub fn scope_chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = vec![scope];
        let mut current = self.scope(scope).parent();
        while let Some(parent) = current {
            chain.push(parent);
            current = self.scope(parent).parent();
        }
        chain.reverse();
        chain
    }

    /// Swaps the scope stack, returning the previous one so it can be restored.
    pub(crate) fn replace_scope_stack(&mut self, stack: Vec<ScopeId>) -> Vec<ScopeId> {
        std::mem::replace(&mut self.scope_stack, stack)
    }

    // Symbols

    /// Inserts a symbol into the current scope.
    ///
    /// # Errors
    ///
    /// Returns a redeclaration error when `must_be_unique` is set and the name is
    /// taken for the same kind.
    pub fn set_symbol(
        &mut self,
        symbol: Symbol,
        must_be_unique: bool,
        location: &Location,
    ) -> Result<(), SemanticError> {
        let Some(id) = self.current_scope() else {
            return Err(SemanticError::new(
                SemanticErrorKind::ScopeNotFound {
                    node: symbol.declaration,
                },
                location,
            ));
        };
        self.scope_mut(id)
            .set_symbol(symbol, must_be_unique)
            .map_err(|kind| SemanticError::new(kind, location))
    }

    /// Declares `name` in the current scope, applying that scope's
    /// redeclaration policy.
    ///
    /// # Errors
    ///
    /// See [`SemanticContext::set_symbol`].
    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        declaration: NodeId,
        location: &Location,
    ) -> Result<(), SemanticError> {
        let scope = self.current_scope().unwrap_or(ScopeId::ROOT);
        let must_be_unique = self
            .current_scope_kind()
            .is_some_and(|scope_kind| !scope_kind.allows_overwrite());
        let symbol = Symbol {
            name: name.to_string(),
            kind,
            scope,
            declaration,
        };
        self.set_symbol(symbol, must_be_unique, location)
    }

    /// Finds the visible symbol for `name`, walking outwards from the current
    /// scope. Value lookups that pass through a class scope also search the
    /// scopes of its ancestors before moving on.
    #[must_use]
    pub fn lookup(&self, name: &str, kind: SymbolKind) -> Option<&Symbol> {
        let mut current = self.current_scope();
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(symbol) = scope.lookup_local(name, kind) {
                return Some(symbol);
            }
            if kind == SymbolKind::Identifier
                && scope.kind() == ScopeKind::Object
                && let Some(symbol) = self.lookup_inherited(id, name)
            {
                return Some(symbol);
            }
            current = scope.parent();
        }
        None
    }

    fn lookup_inherited(&self, object_scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut visited = FxHashSet::default();
        visited.insert(object_scope);
        let mut base = self.base_scope(object_scope);
        while let Some(id) = base {
            if !visited.insert(id) {
                break;
            }
            if let Some(symbol) = self.scope(id).lookup_local(name, SymbolKind::Identifier) {
                return Some(symbol);
            }
            base = self.base_scope(id);
        }
        None
    }

    fn base_scope(&self, object_scope: ScopeId) -> Option<ScopeId> {
        let object = self.node_type(self.scope(object_scope).node())?;
        let base = self.types.base_class(object)?;
        match self.types.get(base) {
            TypeInfo::Object { scope, .. } => Some(*scope),
            _ => None,
        }
    }

    // Types

    /// The node's type slot, allocating an `Unknown` one on first access.
    pub fn type_of(&mut self, node: NodeId) -> TypeRef {
        if let Some(existing) = self.node_types.get(&node) {
            return *existing;
        }
        let handle = self.types.alloc(TypeInfo::Unknown);
        self.node_types.insert(node, handle);
        handle
    }

    #[must_use]
    pub fn node_type(&self, node: NodeId) -> Option<TypeRef> {
        self.node_types.get(&node).copied()
    }

    #[must_use]
    pub fn type_info(&self, node: NodeId) -> Option<&TypeInfo> {
        self.node_type(node).map(|handle| self.types.get(handle))
    }

    #[must_use]
    pub fn display_type(&self, node: NodeId) -> Option<String> {
        self.node_type(node).map(|handle| self.types.display(handle))
    }

    /// Makes `node` see the type in `source`.
    ///
    /// An untyped node shares the slot; a node that already has a slot keeps it
    /// and gets a copy of the contents, so whoever shares the old slot sees the
    /// update too.
    pub fn bind_type(&mut self, node: NodeId, source: TypeRef) -> TypeRef {
        match self.node_types.get(&node).copied() {
            Some(existing) => {
                self.types.assign(existing, source);
                existing
            }
            None => {
                self.node_types.insert(node, source);
                source
            }
        }
    }

    /// Stores `info` in the node's own slot.
    pub fn set_type(&mut self, node: NodeId, info: TypeInfo) -> TypeRef {
        match self.node_types.get(&node).copied() {
            Some(existing) => {
                self.types.set(existing, info);
                existing
            }
            None => {
                let handle = self.types.alloc(info);
                self.node_types.insert(node, handle);
                handle
            }
        }
    }

    // Control flow

    pub(crate) fn set_control_flow(&mut self, function: NodeId, graph: ControlFlowGraph) {
        self.control_flow.insert(function, graph);
    }

    #[must_use]
    pub fn control_flow(&self, function: NodeId) -> Option<&ControlFlowGraph> {
        self.control_flow.get(&function)
    }
}
