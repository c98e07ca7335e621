use kestrel_ast::nodes::Program;
use kestrel_type_checker::{AnalysisBuilder, analysis::Analysis, errors::SemanticError};

pub(crate) fn analyze(program: Program) -> anyhow::Result<Analysis> {
    Ok(AnalysisBuilder::analyze(program)?.analysis())
}

/// Runs the analysis expecting it to fail and returns the semantic error.
pub(crate) fn semantic_error(program: Program) -> SemanticError {
    let err = analyze(program).expect_err("analysis should fail");
    match err.downcast::<SemanticError>() {
        Ok(err) => err,
        Err(other) => panic!("expected a semantic error, got: {other:?}"),
    }
}
