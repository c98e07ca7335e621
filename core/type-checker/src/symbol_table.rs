//! Symbol Table
//!
//! Scopes form a tree through parent links. They are stored flat in the
//! [`SemanticContext`](crate::semantic_context::SemanticContext) and addressed by
//! [`ScopeId`]; each scope remembers the syntax node it was opened for so a later
//! pass can recall it.
//!
//! A symbol binds a `(name, kind)` pair to the node that declared it. Its type is
//! never stored on the symbol: it is always read through the declaration node's
//! [`TypeRef`](crate::type_arena::TypeRef).

use core::fmt;
use std::fmt::{Display, Formatter};

use kestrel_ast::nodes::NodeId;

use crate::errors::SemanticErrorKind;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// The program scope, always the first one created.
    pub const ROOT: ScopeId = ScopeId(0);

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ScopeKind {
    Program,
    BodyBlock,
    Function,
    Object,
    Enum,
}

impl ScopeKind {
    /// Program and class scopes let a later declaration replace an earlier one of
    /// the same name; every other scope rejects duplicates.
    #[must_use]
    pub fn allows_overwrite(self) -> bool {
        matches!(self, ScopeKind::Program | ScopeKind::Object)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SymbolKind {
    Identifier,
    Type,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SymbolKind::Identifier => write!(f, "a value"),
            SymbolKind::Type => write!(f, "a type"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    pub declaration: NodeId,
}

#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    parent: Option<ScopeId>,
    kind: ScopeKind,
    node: NodeId,
    symbols: Vec<Symbol>,
    return_statement_found: bool,
}

impl Scope {
    #[must_use = "scope constructor returns a new scope that should be used"]
    pub(crate) fn new(id: ScopeId, parent: Option<ScopeId>, kind: ScopeKind, node: NodeId) -> Self {
        Self {
            id,
            parent,
            kind,
            node,
            symbols: Vec::new(),
            return_statement_found: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// The node the scope was opened for.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[must_use]
    pub fn return_statement_found(&self) -> bool {
        self.return_statement_found
    }

    pub(crate) fn mark_return_found(&mut self) {
        self.return_statement_found = true;
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub fn lookup_local(&self, name: &str, kind: SymbolKind) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|symbol| symbol.kind == kind && symbol.name == name)
    }

    /// Inserts `symbol`, replacing an existing entry with the same name and kind
    /// unless `must_be_unique` is set.
    pub(crate) fn set_symbol(
        &mut self,
        symbol: Symbol,
        must_be_unique: bool,
    ) -> Result<(), SemanticErrorKind> {
        match self
            .symbols
            .iter_mut()
            .find(|existing| existing.kind == symbol.kind && existing.name == symbol.name)
        {
            Some(existing) if existing.declaration == symbol.declaration => Ok(()),
            Some(_) if must_be_unique => Err(SemanticErrorKind::Redeclaration {
                name: symbol.name,
                kind: symbol.kind,
            }),
            Some(existing) => {
                *existing = symbol;
                Ok(())
            }
            None => {
                self.symbols.push(symbol);
                Ok(())
            }
        }
    }
}
