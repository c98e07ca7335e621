//! Moves variable declarations ahead of every other declaration, in the
//! program and in each class body. Relative order within each group is kept.
//! Statement order inside blocks is never touched.

use kestrel_ast::nodes::{Declaration, Program};

use crate::{errors::SemanticError, passes::SemanticPass, semantic_context::SemanticContext};

#[derive(Clone, Copy, Debug, Default)]
pub struct ReorderDeclarations;

impl SemanticPass for ReorderDeclarations {
    fn name(&self) -> &'static str {
        "reorder-declarations"
    }

    fn run(
        &mut self,
        program: &mut Program,
        _ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        hoist_variables(&mut program.declarations);
        Ok(())
    }
}

fn hoist_variables(declarations: &mut Vec<Declaration>) {
    let (mut variables, others): (Vec<_>, Vec<_>) = std::mem::take(declarations)
        .into_iter()
        .partition(Declaration::is_variable);
    variables.extend(others);
    *declarations = variables;

    for declaration in declarations.iter_mut() {
        if let Declaration::Object(object) = declaration {
            hoist_variables(&mut object.members);
        }
    }
}
