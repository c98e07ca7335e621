//! Wraps loose top-level statements into a synthesized `main`.
//!
//! A program without a top-level `main` gets a zero-argument `Void` `main` whose
//! body is the top-level statements (possibly none). A program that declares
//! `main` itself may not also have top-level statements.

use kestrel_ast::nodes::{Block, Declaration, FunctionDeclaration, Identifier, Program};
use tracing::debug;

use crate::{
    errors::{SemanticError, SemanticErrorKind},
    passes::SemanticPass,
    scope_policy::{NoScopes, Scoped},
    semantic_context::SemanticContext,
    symbol_table::ScopeKind,
};

pub const ENTRY_POINT: &str = "main";

#[derive(Clone, Copy, Debug, Default)]
pub struct SynthesizeEntryPoint {
    policy: NoScopes,
}

impl Scoped for SynthesizeEntryPoint {
    type Policy = NoScopes;

    fn policy(&self) -> NoScopes {
        self.policy
    }
}

impl SemanticPass for SynthesizeEntryPoint {
    fn name(&self) -> &'static str {
        "synthesize-entry-point"
    }

    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let (id, location) = (program.id, program.location.clone());
        self.scoped(ctx, ScopeKind::Program, id, &location, |_, _| {
            synthesize(program)
        })
    }
}

fn synthesize(program: &mut Program) -> Result<(), SemanticError> {
    if program.function(ENTRY_POINT).is_some() {
        return match program.statements.first() {
            Some(stray) => Err(SemanticError::new(
                SemanticErrorKind::AmbiguousEntryPoint,
                stray.location(),
            )),
            None => Ok(()),
        };
    }

    let statements = std::mem::take(&mut program.statements);
    let location = statements
        .first()
        .map_or_else(|| program.location.clone(), |first| first.location().clone());
    debug!(statements = statements.len(), "synthesizing entry point");

    let body = Block {
        id: program.next_node_id(),
        location: location.clone(),
        statements,
    };
    let name = Identifier::new(program.next_node_id(), location.clone(), ENTRY_POINT);
    let main = FunctionDeclaration {
        id: program.next_node_id(),
        location,
        name,
        parameters: vec![],
        returns: None,
        body,
    };
    program.declarations.push(Declaration::Function(main));
    Ok(())
}
