//! The semantic pass pipeline.
//!
//! Passes run in a fixed order over one [`SemanticContext`]:
//!
//! 1. [`ReorderDeclarations`] hoists variable declarations.
//! 2. [`SynthesizeEntryPoint`] wraps top-level statements into `main`.
//! 3. [`DeclarationCollector`] opens scopes and registers every named symbol.
//! 4. [`TypeResolutionPass`] resolves names, infers and checks types.
//! 5. [`CompletenessCheck`] rejects nodes left with placeholder types.
//! 6. [`NullCheck`] restricts `null` to optional objects.
//! 7. [`ControlFlowPass`] records basic blocks per function.
//!
//! The first error stops the pipeline.

use kestrel_ast::nodes::Program;
use tracing::debug;

use crate::{errors::SemanticError, semantic_context::SemanticContext};

mod collect;
mod completeness;
pub mod control_flow;
mod entry_point;
mod null_check;
mod reorder;
mod resolve;

pub use collect::DeclarationCollector;
pub use completeness::CompletenessCheck;
pub use control_flow::ControlFlowPass;
pub use entry_point::{ENTRY_POINT, SynthesizeEntryPoint};
pub use null_check::NullCheck;
pub use reorder::ReorderDeclarations;
pub use resolve::TypeResolutionPass;

pub trait SemanticPass {
    fn name(&self) -> &'static str;

    /// Runs the pass over `program`.
    ///
    /// # Errors
    ///
    /// Returns the first semantic error the pass finds.
    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError>;
}

#[derive(Default)]
pub struct PassPipeline {
    passes: Vec<Box<dyn SemanticPass>>,
}

impl PassPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn default_passes() -> Self {
        Self::new()
            .with_pass(ReorderDeclarations)
            .with_pass(SynthesizeEntryPoint::default())
            .with_pass(DeclarationCollector::new())
            .with_pass(TypeResolutionPass::new())
            .with_pass(CompletenessCheck::default())
            .with_pass(NullCheck::default())
            .with_pass(ControlFlowPass::default())
    }

    #[must_use]
    pub fn with_pass(mut self, pass: impl SemanticPass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Runs every pass in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any pass.
    #[tracing::instrument(skip_all, fields(passes = self.passes.len()))]
    pub fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        for pass in &mut self.passes {
            debug!(pass = pass.name(), "running pass");
            pass.run(program, ctx)?;
        }
        Ok(())
    }
}

/// Runs the default pipeline over `program`.
///
/// # Errors
///
/// Returns the first semantic error found.
pub fn run_default_passes(
    program: &mut Program,
    ctx: &mut SemanticContext,
) -> Result<(), SemanticError> {
    PassPipeline::default_passes().run(program, ctx)
}
