//! Canonical stack-machine operations.
//!
//! Expression and statement lowering produces these independently of the
//! target instruction set; the assembler turns them into target instructions.

use crate::{
    frontend::{
        ast::{BinaryOperator, CompareOperator},
        lexer::Span,
    },
    middle::{cfg::FrameId, storage::ConstIndex},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub kind: OpKind,
    /// Source the operation was lowered from
    pub span: Span,
}

impl Op {
    pub fn new(kind: OpKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpKind {
    LoadConst(ConstIndex),
    LoadName(String),
    /// Names the callee of the next `Call`. Pushes nothing.
    LoadCallee(String),
    StoreName(String),
    Binary(BinaryOperator),
    Compare(CompareOperator),
    Call { argc: usize },
    Return,
    Pop,
    Shuffle(ShuffleKind),
    /// Raw target command, copied verbatim
    Direct(String),
    /// Binds `name` to the function compiled into `frame`
    DefineFunction { name: String, frame: FrameId },
    Nop,
}

impl OpKind {
    /// Net operand stack effect
    pub fn stack_effect(&self) -> isize {
        match self {
            OpKind::LoadConst(_) | OpKind::LoadName(_) => 1,
            OpKind::StoreName(_) | OpKind::Binary(_) | OpKind::Compare(_) => -1,
            OpKind::Return | OpKind::Pop => -1,
            OpKind::Call { argc } => 1 - *argc as isize,
            OpKind::Shuffle(kind) => kind.stack_effect(),
            OpKind::LoadCallee(_)
            | OpKind::Direct(_)
            | OpKind::DefineFunction { .. }
            | OpKind::Nop => 0,
        }
    }
}

/// In-place rearrangements of the top of the operand stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleKind {
    /// `a` -> `a a`
    DupTop,
    /// `a b` -> `b a`
    RotTwo,
    /// `a b c` -> `c a b`
    RotThree,
}

impl ShuffleKind {
    pub fn stack_effect(self) -> isize {
        match self {
            ShuffleKind::DupTop => 1,
            ShuffleKind::RotTwo | ShuffleKind::RotThree => 0,
        }
    }

    /// Slot copies relative to the top of stack, performed in order, followed
    /// by the cursor adjustment. Offset 1 is the scratch slot above the top.
    pub fn moves(self) -> (&'static [(isize, isize)], isize) {
        match self {
            ShuffleKind::DupTop => (&[(1, 0)], 1),
            ShuffleKind::RotTwo => (&[(1, 0), (0, -1), (-1, 1)], 0),
            ShuffleKind::RotThree => (&[(1, 0), (0, -1), (-1, -2), (-2, 1)], 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    None,
    Integer(i32),
    Boolean(bool),
    String(String),
}

/// Per-frame constant pool. Slot 0 is always `None` and equal constants
/// share a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    constants: Vec<Constant>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self {
            constants: vec![Constant::None],
        }
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, constant: Constant) -> ConstIndex {
        if let Some(position) = self.constants.iter().position(|c| *c == constant) {
            return ConstIndex(position);
        }

        self.constants.push(constant);
        ConstIndex(self.constants.len() - 1)
    }

    pub fn get(&self, index: ConstIndex) -> Option<&Constant> {
        self.constants.get(index.0)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constant> {
        self.constants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_starts_with_none_and_dedups() {
        let mut pool = ConstantPool::new();

        assert_eq!(pool.get(ConstIndex::NONE), Some(&Constant::None));
        assert_eq!(pool.intern(Constant::None), ConstIndex::NONE);

        let one = pool.intern(Constant::Integer(1));
        let text = pool.intern(Constant::String("1".to_owned()));

        assert_eq!(one, ConstIndex(1));
        assert_eq!(text, ConstIndex(2));
        assert_eq!(pool.intern(Constant::Integer(1)), one);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn call_consumes_arguments_and_produces_one_result() {
        assert_eq!(OpKind::Call { argc: 2 }.stack_effect(), -1);
        assert_eq!(OpKind::Call { argc: 0 }.stack_effect(), 1);
        assert_eq!(OpKind::LoadCallee("f".to_owned()).stack_effect(), 0);
    }
}
