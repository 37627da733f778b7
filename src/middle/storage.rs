//! Compile-time handles into the three storage regions every frame entity
//! carries: the operand stack, named variables and the constant pool.

/// NBT path under the acting entity at which frame storage lives
pub const STORAGE_ROOT: &str = "ArmorItems[0].tag";

/// Operand stack cursor.
///
/// Slot 0 holds the frame's result and is the baseline on frame entry, so the
/// cursor doubles as the current stack depth. Its value is baked into every
/// emitted storage path; nothing is resolved at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StackIndex(pub isize);

impl StackIndex {
    pub const BASELINE: StackIndex = StackIndex(0);

    /// Moves onto a fresh slot and returns it
    pub fn push(&mut self) -> StackIndex {
        self.0 += 1;
        *self
    }

    /// Returns the top slot and moves below it
    pub fn pop(&mut self) -> StackIndex {
        let top = *self;
        self.0 -= 1;
        top
    }

    pub fn seek(&mut self, delta: isize) {
        self.0 += delta;
    }

    /// Slot `delta` positions away from the cursor, without moving it
    pub fn offset(self, delta: isize) -> StackIndex {
        StackIndex(self.0 + delta)
    }

    pub fn depth(self) -> isize {
        self.0
    }
}

impl core::fmt::Display for StackIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{STORAGE_ROOT}.Stack[{}]", self.0)
    }
}

/// A named variable slot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameIndex(pub String);

impl core::fmt::Display for NameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{STORAGE_ROOT}.Names.{}", self.0)
    }
}

/// A constant pool slot. Slot 0 of every pool is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstIndex(pub usize);

impl ConstIndex {
    pub const NONE: ConstIndex = ConstIndex(0);
}

impl core::fmt::Display for ConstIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{STORAGE_ROOT}.Consts[{}]", self.0)
    }
}

/// An argument staging slot on a freshly summoned callee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingIndex(pub usize);

impl core::fmt::Display for StagingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{STORAGE_ROOT}.Pre[{}]", self.0)
    }
}
