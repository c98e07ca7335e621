//! Analysis - the result of a successful run of the pass pipeline
//!
//! ```text
//! Analysis
//! ├─ Program           the tree after reordering and entry point synthesis
//! └─ SemanticContext
//!    ├─ TypeArena      every type slot
//!    ├─ node types     NodeId → TypeRef
//!    ├─ scopes         with their symbols
//!    └─ control flow   one graph per function
//! ```
//!
//! Every declaration, statement, expression and type annotation of the program
//! has a complete type once analysis succeeded.

use kestrel_ast::{
    nodes::{Declaration, Expression, Location, NodeId, Program},
    visitor::{self, Visitor},
};

use crate::{
    passes::control_flow::ControlFlowGraph, semantic_context::SemanticContext, type_info::TypeInfo,
};

#[derive(Debug)]
pub struct Analysis {
    program: Program,
    context: SemanticContext,
}

/// An expression the passes left without a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingExpressionType {
    pub id: NodeId,
    pub kind: String,
    pub location: Location,
}

impl Analysis {
    pub(crate) fn new(program: Program, context: SemanticContext) -> Self {
        Self { program, context }
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[must_use]
    pub fn context(&self) -> &SemanticContext {
        &self.context
    }

    #[must_use]
    pub fn into_parts(self) -> (Program, SemanticContext) {
        (self.program, self.context)
    }

    #[must_use]
    pub fn type_info(&self, node: NodeId) -> Option<&TypeInfo> {
        self.context.type_info(node)
    }

    /// The type of `node` rendered as it would be written in source.
    #[must_use]
    pub fn display_type(&self, node: NodeId) -> Option<String> {
        self.context.display_type(node)
    }

    /// The type of the named top-level function or variable, or of a member
    /// when written as `Class.member`.
    #[must_use]
    pub fn declaration_type(&self, path: &str) -> Option<String> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut declaration = self
            .program
            .declarations
            .iter()
            .find(|declaration| declaration.name() == first)?;
        for segment in segments {
            let Declaration::Object(object) = declaration else {
                return None;
            };
            declaration = object
                .members
                .iter()
                .find(|member| member.name() == segment)?;
        }
        self.display_type(declaration.id())
    }

    #[must_use]
    pub fn control_flow(&self, function: NodeId) -> Option<&ControlFlowGraph> {
        self.context.control_flow(function)
    }

    #[must_use]
    pub fn find_untyped_expressions(&self) -> Vec<MissingExpressionType> {
        let mut finder = UntypedExpressions {
            context: &self.context,
            missing: Vec::new(),
        };
        let Ok(()) = finder.visit_program(&self.program);
        finder.missing
    }
}

struct UntypedExpressions<'a> {
    context: &'a SemanticContext,
    missing: Vec<MissingExpressionType>,
}

impl Visitor for UntypedExpressions<'_> {
    type Error = std::convert::Infallible;

    fn visit_expression(&mut self, expression: &Expression) -> Result<(), Self::Error> {
        if self.context.node_type(expression.id()).is_none() {
            self.missing.push(MissingExpressionType {
                id: expression.id(),
                kind: expression.describe(),
                location: expression.location().clone(),
            });
        }
        visitor::walk_expression(self, expression)
    }
}
