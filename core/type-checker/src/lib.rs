//! Semantic analysis for the Kestrel language
//!
//! This crate takes a [`Program`] as built by a front end and runs the
//! semantic passes over it: name resolution, type inference and type checking.
//!
//! ## Type System Support
//!
//! - Primitive types: `Void`, `Bool`, `String`, `Int`, `Float` and the sized
//!   number types `Int8`-`Int64`, `UInt8`-`UInt64`, `Float32`, `Float64`
//! - Generic types: `Array<T>` and `Optional<T>`
//! - Classes with single inheritance, enums, inline enums, structural types
//!   and function types
//!
//! Types live in a [`TypeArena`](type_arena::TypeArena) and nodes point at
//! slots in it. A slot is filled in place, so an annotation that refers to a
//! class declared further down sees the class once it has been collected.
//!
//! ## Quick Start
//!
//! ```
//! use kestrel_ast::builder::AstBuilder;
//! use kestrel_type_checker::AnalysisBuilder;
//!
//! let b = AstBuilder::default();
//! let program = b.program(vec![b.var("a", None, Some(b.int("1")))], vec![]);
//!
//! let analysis = AnalysisBuilder::analyze(program)?.analysis();
//! assert_eq!(analysis.declaration_type("a").as_deref(), Some("Int"));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Passes
//!
//! See [`passes`] for the pipeline. The first error stops the analysis and is
//! returned as a [`SemanticError`](errors::SemanticError) inside the
//! [`anyhow::Error`].

use kestrel_ast::nodes::Program;
use tracing::debug;

use crate::{analysis::Analysis, passes::PassPipeline, semantic_context::SemanticContext};

pub mod analysis;
pub mod comparer;
pub mod errors;
pub(crate) mod inference;
pub mod passes;
pub mod scope_policy;
pub mod semantic_context;
pub mod symbol_table;
pub mod type_arena;
pub mod type_info;
pub(crate) mod type_resolver;

pub use passes::run_default_passes;

/// Marker state indicating the builder has not run the passes yet.
pub struct AnalysisInitState;

/// State holding the result once every pass succeeded.
pub struct AnalysisCompleteState(Analysis);

pub type CompletedAnalysisBuilder = AnalysisBuilder<AnalysisCompleteState>;

/// Runs the semantic passes over a program.
///
/// Uses the typestate pattern so the analysis can only be taken out once every
/// pass has succeeded.
pub struct AnalysisBuilder<S> {
    state: S,
}

impl Default for AnalysisBuilder<AnalysisInitState> {
    fn default() -> Self {
        AnalysisBuilder::new()
    }
}

impl AnalysisBuilder<AnalysisInitState> {
    #[must_use]
    pub fn new() -> Self {
        AnalysisBuilder {
            state: AnalysisInitState,
        }
    }

    /// Runs the default pipeline over `program`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SemanticError`](errors::SemanticError) any pass
    /// reports.
    pub fn analyze(program: Program) -> anyhow::Result<CompletedAnalysisBuilder> {
        Self::new().run(program, PassPipeline::default_passes())
    }

    /// Runs a custom pipeline over `program`.
    ///
    /// # Errors
    ///
    /// Returns the first error any pass reports.
    pub fn run(
        self,
        mut program: Program,
        mut pipeline: PassPipeline,
    ) -> anyhow::Result<CompletedAnalysisBuilder> {
        let AnalysisInitState = self.state;
        let mut context = SemanticContext::new();
        pipeline.run(&mut program, &mut context)?;
        let analysis = Analysis::new(program, context);

        debug_assert!(
            {
                let untyped = analysis.find_untyped_expressions();
                for missing in &untyped {
                    debug!(
                        id = missing.id,
                        kind = %missing.kind,
                        location = %missing.location,
                        "expression without a type"
                    );
                }
                untyped.is_empty()
            },
            "All expressions should have a type after analysis"
        );

        Ok(AnalysisBuilder {
            state: AnalysisCompleteState(analysis),
        })
    }
}

impl AnalysisBuilder<AnalysisCompleteState> {
    /// Consume the builder and return the analysis.
    #[must_use = "consumes builder and returns the analysis"]
    pub fn analysis(self) -> Analysis {
        self.state.0
    }
}
