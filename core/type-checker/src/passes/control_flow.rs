//! Basic-block graphs for function bodies.
//!
//! Each function and method gets a [`ControlFlowGraph`] recorded on the
//! context. Blocks hold the ids of the statements they execute in order.
//! `if` and `while` end their block with the statement itself and branch from
//! there; `return` ends its block with no successors. Statements after a
//! `return` land in a fresh block nothing jumps to.
//!
//! The graphs are not yet consulted by any check.

use kestrel_ast::nodes::{Block, Declaration, FunctionDeclaration, NodeId, Program, Statement};
use tracing::debug;

use crate::{
    errors::SemanticError,
    passes::SemanticPass,
    scope_policy::{NoScopes, Scoped},
    semantic_context::SemanticContext,
    symbol_table::ScopeKind,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasicBlock {
    pub statements: Vec<NodeId>,
    pub successors: Vec<usize>,
    /// Ends in a `return`.
    pub returns: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlFlowGraph {
    pub function: NodeId,
    /// Block 0 is the entry.
    pub blocks: Vec<BasicBlock>,
}

impl ControlFlowGraph {
    #[must_use]
    pub fn entry(&self) -> &BasicBlock {
        &self.blocks[0]
    }

    /// Blocks with no path from the entry.
    #[must_use]
    pub fn unreachable_blocks(&self) -> Vec<usize> {
        let mut seen = vec![false; self.blocks.len()];
        let mut pending = vec![0];
        while let Some(block) = pending.pop() {
            if std::mem::replace(&mut seen[block], true) {
                continue;
            }
            pending.extend(self.blocks[block].successors.iter().copied());
        }
        seen.iter()
            .enumerate()
            .filter_map(|(block, reached)| (!reached).then_some(block))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ControlFlowPass {
    policy: NoScopes,
}

impl Scoped for ControlFlowPass {
    type Policy = NoScopes;

    fn policy(&self) -> NoScopes {
        self.policy
    }
}

impl SemanticPass for ControlFlowPass {
    fn name(&self) -> &'static str {
        "control-flow"
    }

    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut SemanticContext,
    ) -> Result<(), SemanticError> {
        let (id, location) = (program.id, program.location.clone());
        self.scoped(ctx, ScopeKind::Program, id, &location, |_, ctx| {
            record_graphs(&program.declarations, ctx);
            Ok(())
        })
    }
}

fn record_graphs(declarations: &[Declaration], ctx: &mut SemanticContext) {
    for declaration in declarations {
        match declaration {
            Declaration::Function(function) => {
                let graph = build_graph(function);
                debug!(
                    function = %function.name.name,
                    blocks = graph.blocks.len(),
                    "built control flow graph"
                );
                ctx.set_control_flow(function.id, graph);
            }
            Declaration::Object(object) => record_graphs(&object.members, ctx),
            Declaration::Variable(_) | Declaration::Enum(_) | Declaration::Extern(_) => {}
        }
    }
}

#[must_use]
pub fn build_graph(function: &FunctionDeclaration) -> ControlFlowGraph {
    let mut builder = GraphBuilder {
        blocks: vec![BasicBlock::default()],
        current: 0,
    };
    builder.lower_block(&function.body);
    ControlFlowGraph {
        function: function.id,
        blocks: builder.blocks,
    }
}

struct GraphBuilder {
    blocks: Vec<BasicBlock>,
    current: usize,
}

impl GraphBuilder {
    fn new_block(&mut self) -> usize {
        self.blocks.push(BasicBlock::default());
        self.blocks.len() - 1
    }

    fn edge(&mut self, from: usize, to: usize) {
        let block = &mut self.blocks[from];
        if !block.returns && !block.successors.contains(&to) {
            block.successors.push(to);
        }
    }

    fn lower_block(&mut self, block: &Block) {
        for statement in &block.statements {
            self.lower_statement(statement);
        }
    }

    fn lower_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::If(if_statement) => {
                self.blocks[self.current].statements.push(if_statement.id);
                let branch = self.current;

                let then_start = self.new_block();
                self.edge(branch, then_start);
                self.current = then_start;
                self.lower_block(&if_statement.then_block);
                let then_end = self.current;

                let else_end = if_statement.else_block.as_ref().map(|else_block| {
                    let else_start = self.new_block();
                    self.edge(branch, else_start);
                    self.current = else_start;
                    self.lower_block(else_block);
                    self.current
                });

                let join = self.new_block();
                self.edge(then_end, join);
                self.edge(else_end.unwrap_or(branch), join);
                self.current = join;
            }
            Statement::While(while_statement) => {
                let header = self.new_block();
                self.edge(self.current, header);
                self.blocks[header].statements.push(while_statement.id);

                let body = self.new_block();
                self.edge(header, body);
                self.current = body;
                self.lower_block(&while_statement.body);
                self.edge(self.current, header);

                let exit = self.new_block();
                self.edge(header, exit);
                self.current = exit;
            }
            Statement::Return(return_statement) => {
                let block = &mut self.blocks[self.current];
                block.statements.push(return_statement.id);
                block.returns = true;
                self.current = self.new_block();
            }
            Statement::Block(block) => self.lower_block(block),
            Statement::Expression(_) | Statement::Variable(_) => {
                self.blocks[self.current].statements.push(statement.id());
            }
        }
    }
}
