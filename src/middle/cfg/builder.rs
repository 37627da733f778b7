//! Splits statement lists into blocks at control-flow boundaries.
//!
//! Each call to [`FrameBuilder::bud`] turns a suite into a chain of sibling
//! blocks hanging off a parent: a new block is started, statements are
//! lowered into it until one of them ends the block (`return`, `if`), and the
//! next block picks up where that one stopped. All of the siblings are linked
//! from the parent with the same condition, so at runtime the parent invokes
//! them one after another.
//!
//! A `while` takes the rest of its suite with it: those statements are budded
//! off the loop's test block and run when the test fails.

use hashbrown::HashSet;
use strum::IntoStaticStr;
use tracing::debug;

use crate::{
    error::Result,
    frontend::{
        SourceFile,
        ast::{self, Statement, StatementKind},
        lexer::Span,
    },
    index::IndexVec,
    middle::{
        cfg::{Block, BlockId, Condition, Frame, FrameId, Link, Module},
        lowering::{lower_expression, lower_statement},
        op::{ConstantPool, Op, OpKind},
        path::Path,
        storage::ConstIndex,
    },
};

/// Frame compiled from the body of every module
pub const MODULE_FRAME: &str = "__module__";

/// Middle component of generated block names
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
enum BranchTag {
    Body,
    True,
    False,
    Test,
    While,
    Cont,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    EndBlock,
    /// The rest of the suite was lowered elsewhere
    EndSuite,
}

/// Builds the control flow graph of one module body.
pub fn build_module(source: &SourceFile, path: Path, module: &ast::Module) -> Result<Module> {
    let mut builder = ModuleBuilder {
        source,
        path,
        frames: IndexVec::new(),
    };

    let root = builder.build_frame(
        MODULE_FRAME.to_owned(),
        MODULE_FRAME.to_owned(),
        Vec::new(),
        &module.statements,
        0,
        Span::new(0, source.contents.len()),
    )?;

    Ok(Module {
        path: builder.path,
        frames: builder.frames,
        root,
    })
}

struct ModuleBuilder<'source> {
    source: &'source SourceFile,
    path: Path,
    frames: IndexVec<FrameId, Frame>,
}

impl ModuleBuilder<'_> {
    fn build_frame(
        &mut self,
        frame_name: String,
        binding: String,
        parameters: Vec<String>,
        body: &[Statement],
        line: usize,
        span: Span,
    ) -> Result<FrameId> {
        let path = self.path.with_frame(&frame_name);

        let mut builder = FrameBuilder {
            source: self.source,
            module: self,
            path,
            blocks: IndexVec::new(),
            constants: ConstantPool::new(),
            names: HashSet::new(),
        };

        let root = builder.create_block(None);
        builder.bud(root, body, line, BranchTag::Body, Condition::Always)?;

        // Every frame returns exactly once, explicitly or through here
        let exit = builder.create_named_block(line, BranchTag::Exit);
        builder.push_ops(
            exit,
            [
                Op::new(OpKind::LoadConst(ConstIndex::NONE), span),
                Op::new(OpKind::Return, span),
            ],
        );
        builder.blocks[root]
            .links
            .push(Link::new(exit, Condition::Always));

        let FrameBuilder {
            path,
            blocks,
            constants,
            ..
        } = builder;

        debug!(frame = %path, blocks = blocks.len(), "built frame");

        Ok(self.frames.push(Frame {
            path,
            name: binding,
            parameters,
            root,
            blocks,
            constants,
            span,
        }))
    }
}

struct FrameBuilder<'m, 'source> {
    source: &'source SourceFile,
    module: &'m mut ModuleBuilder<'source>,
    path: Path,
    blocks: IndexVec<BlockId, Block>,
    constants: ConstantPool,
    /// Block names already handed out in this frame
    names: HashSet<String>,
}

impl FrameBuilder<'_, '_> {
    fn create_block(&mut self, name: Option<String>) -> BlockId {
        let id = self.blocks.next_index();
        let path = self.path.with_block(name.as_deref());

        self.blocks.push(Block {
            id,
            path,
            body: Vec::new(),
            links: Vec::new(),
        })
    }

    /// Creates `<line>.<tag>`, or `<line>.<tag><n>` with the smallest `n`
    /// that keeps the name unique within the frame.
    fn create_named_block(&mut self, line: usize, tag: BranchTag) -> BlockId {
        let tag: &'static str = tag.into();
        let base = format!("{line}.{tag}");

        let name = if self.names.contains(&base) {
            (1..)
                .map(|n| format!("{base}{n}"))
                .find(|candidate| !self.names.contains(candidate))
                .unwrap_or_default()
        } else {
            base
        };

        self.names.insert(name.clone());
        self.create_block(Some(name))
    }

    fn push_ops(&mut self, block: BlockId, ops: impl IntoIterator<Item = Op>) {
        self.blocks[block].body.extend(ops);
    }

    fn line_of(&self, span: Span) -> usize {
        self.source.line_for_position(span.start)
    }

    /// Lowers `statements` into a chain of blocks linked from `parent` under
    /// `condition`, returning the last block of the chain.
    fn bud(
        &mut self,
        parent: BlockId,
        statements: &[Statement],
        line: usize,
        tag: BranchTag,
        condition: Condition,
    ) -> Result<Option<BlockId>> {
        let mut remaining = statements;
        let mut last = None;

        while !remaining.is_empty() {
            let block = self.create_named_block(line, tag);
            self.blocks[parent]
                .links
                .push(Link::new(block, condition));

            let mut consumed = remaining.len();

            for (index, statement) in remaining.iter().enumerate() {
                match self.visit(block, statement, &remaining[index + 1..])? {
                    Flow::Continue => {}
                    Flow::EndBlock => {
                        consumed = index + 1;
                        break;
                    }
                    Flow::EndSuite => break,
                }
            }

            remaining = &remaining[consumed..];
            last = Some(block);
        }

        Ok(last)
    }

    /// Lowers one statement into `block`. `rest` holds the statements that
    /// follow it in the same suite.
    fn visit(&mut self, block: BlockId, statement: &Statement, rest: &[Statement]) -> Result<Flow> {
        let line = self.line_of(statement.span);

        match &statement.kind {
            StatementKind::Return(value) => {
                let ops = match value {
                    Some(value) => lower_expression(self.source, &mut self.constants, value)?,
                    None => vec![Op::new(OpKind::LoadConst(ConstIndex::NONE), statement.span)],
                };

                self.push_ops(block, ops);
                self.push_ops(block, [Op::new(OpKind::Return, statement.span)]);

                Ok(Flow::EndBlock)
            }
            StatementKind::If {
                condition,
                body,
                orelse,
            } => {
                let ops = lower_expression(self.source, &mut self.constants, condition)?;
                self.push_ops(block, ops);

                self.bud(block, body, line, BranchTag::True, Condition::IfTrue)?;
                self.bud(block, orelse, line, BranchTag::False, Condition::IfFalse)?;

                Ok(Flow::EndBlock)
            }
            StatementKind::While { condition, body } => {
                let test = self.create_named_block(line, BranchTag::Test);
                self.blocks[block]
                    .links
                    .push(Link::new(test, Condition::Always));

                let ops = lower_expression(self.source, &mut self.constants, condition)?;
                self.push_ops(test, ops);

                if let Some(last) = self.bud(test, body, line, BranchTag::While, Condition::IfTrue)? {
                    // The loop test is still on the stack when the body runs
                    self.blocks[last].links.push(Link::back_edge(test, 1));
                }

                self.bud(test, rest, line, BranchTag::Cont, Condition::IfFalse)?;

                // Later iterations overwrite the test slot, so the exit is
                // checked before the body runs
                self.blocks[test]
                    .links
                    .sort_by_key(|link| link.condition != Condition::IfFalse);

                Ok(Flow::EndSuite)
            }
            StatementKind::FunctionDefinition(function) => {
                let frame_name = format!(
                    "{}.{}",
                    self.path.frame_name().unwrap_or(MODULE_FRAME),
                    function.name.name
                );

                let parameters = function
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.name.clone())
                    .collect();

                let frame = self.module.build_frame(
                    frame_name,
                    function.name.name.clone(),
                    parameters,
                    &function.body,
                    line,
                    statement.span,
                )?;

                self.push_ops(
                    block,
                    [Op::new(
                        OpKind::DefineFunction {
                            name: function.name.name.clone(),
                            frame,
                        },
                        statement.span,
                    )],
                );

                Ok(Flow::Continue)
            }
            _ => {
                let ops = lower_statement(self.source, &mut self.constants, statement)?;
                self.push_ops(block, ops);

                Ok(Flow::Continue)
            }
        }
    }
}
