//! Control flow graph of a compiled module.
//!
//! Frames and blocks live in arenas and refer to each other by id, so loops
//! (a `while` body linking back to its test) need no shared ownership.

use crate::{
    frontend::lexer::Span,
    index::IndexVec,
    middle::{
        op::{ConstantPool, Op},
        path::Path,
    },
    simple_index,
};

pub mod builder;
mod pretty_print;

pub use builder::build_module;

simple_index! {
    /// Identifies a frame within its module
    pub struct FrameId = "f";
}

simple_index! {
    /// Identifies a block within its frame
    pub struct BlockId = "b";
}

#[derive(Debug)]
pub struct Module {
    /// Namespace + module path every frame path derives from
    pub path: Path,
    /// Frames in completion order: nested functions first, the module body last
    pub frames: IndexVec<FrameId, Frame>,
    /// The frame compiled from the module body
    pub root: FrameId,
}

/// One callable scope: the module body or a function body
#[derive(Debug)]
pub struct Frame {
    pub path: Path,
    /// Name the frame is bound to in its enclosing scope
    pub name: String,
    pub parameters: Vec<String>,
    pub root: BlockId,
    pub blocks: IndexVec<BlockId, Block>,
    pub constants: ConstantPool,
    /// The `def` statement, or the whole file for the module frame
    pub span: Span,
}

impl Frame {
    pub fn root_block(&self) -> &Block {
        &self.blocks[self.root]
    }
}

/// Single-entry straight-line code with explicit outgoing links
#[derive(Debug)]
pub struct Block {
    pub id: BlockId,
    pub path: Path,
    pub body: Vec<Op>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub target: BlockId,
    pub condition: Condition,
    /// Values popped right before the link fires
    pub discard: usize,
}

impl Link {
    pub fn new(target: BlockId, condition: Condition) -> Self {
        Self {
            target,
            condition,
            discard: 0,
        }
    }

    /// Unconditional link that first drops `discard` values
    pub fn back_edge(target: BlockId, discard: usize) -> Self {
        Self {
            target,
            condition: Condition::Always,
            discard,
        }
    }
}

/// When a link fires, judged on the value on top of the operand stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    IfTrue,
    IfFalse,
}
