//! Static operand stack check.
//!
//! Every stack slot is addressed by an index fixed at compile time, so a block
//! only works if it is entered at one single depth. The verifier walks each
//! frame from its root block at depth zero, following bridges and branches,
//! and rejects the program when a block can be reached at two different
//! depths or when an instruction would pop below the frame's result slot.

use std::fmt::Write;

use hashbrown::HashMap;
use itertools::Itertools;
use tracing::debug;

use crate::{
    error::{CompileError, Result},
    index::IndexVec,
    middle::{
        cfg::{BlockId, FrameId},
        path::Path,
        storage::StackIndex,
    },
};

use super::assembler::{AssembledFrame, AssembledModule};

/// Stack shape of a verified frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    /// Deepest cursor position reached by any instruction
    pub max_depth: isize,
    /// Cursor position every block starts at
    pub entry_depths: IndexVec<BlockId, StackIndex>,
}

impl FrameLayout {
    /// Slots a frame entity is summoned with: the result slot, every depth
    /// up to the maximum and one scratch slot used by shuffles.
    pub fn stack_slots(&self) -> usize {
        self.max_depth as usize + 2
    }
}

/// One executed instruction on the way to a block
#[derive(Debug, Clone)]
struct Step {
    block: Path,
    mnemonic: String,
    depth: isize,
}

#[derive(Debug, Clone)]
struct Entry {
    depth: isize,
    history: Vec<Step>,
}

pub fn verify(module: &AssembledModule) -> Result<IndexVec<FrameId, FrameLayout>> {
    module.frames.iter().map(verify_frame).collect()
}

fn verify_frame(frame: &AssembledFrame) -> Result<FrameLayout> {
    let mut entries: HashMap<BlockId, Entry> = HashMap::new();
    let mut worklist = vec![(frame.root, Entry {
        depth: 0,
        history: Vec::new(),
    })];
    let mut max_depth = 0;

    while let Some((id, entry)) = worklist.pop() {
        let block = &frame.blocks[id];

        if let Some(existing) = entries.get(&id) {
            if existing.depth != entry.depth {
                return Err(CompileError::malformed(format!(
                    "block `{}` is reached with stack depths {} and {}",
                    block.path, existing.depth, entry.depth
                ))
                .with_detail(format!(
                    "first path:\n{}\nsecond path:\n{}",
                    render_history(&existing.history),
                    render_history(&entry.history)
                )));
            }

            continue;
        }

        let mut depth = entry.depth;
        let mut history = entry.history.clone();
        entries.insert(id, entry);

        for instruction in &block.instructions {
            let (pops, pushes) = instruction.stack_effect();

            if depth < pops as isize {
                return Err(CompileError::malformed(format!(
                    "`{}` in block `{}` pops below the bottom of the stack",
                    instruction.debug_string(),
                    block.path
                ))
                .with_detail(render_history(&history)));
            }

            if let Some(target) = instruction.link_target() {
                worklist.push((target.block, Entry {
                    depth,
                    history: history.clone(),
                }));
            }

            depth += pushes as isize - pops as isize;
            max_depth = max_depth.max(depth);

            history.push(Step {
                block: block.path.clone(),
                mnemonic: instruction.debug_string(),
                depth,
            });
        }
    }

    let mut entry_depths = IndexVec::new();

    for (id, block) in frame.blocks.enumerate() {
        let Some(entry) = entries.get(&id) else {
            return Err(CompileError::malformed(format!(
                "block `{}` is never reached",
                block.path
            )));
        };

        entry_depths.push(StackIndex(entry.depth));
    }

    debug!(frame = %frame.path, max_depth, "verified frame");

    Ok(FrameLayout {
        max_depth,
        entry_depths,
    })
}

fn render_history(history: &[Step]) -> String {
    let mut out = String::new();

    for (block, steps) in &history.iter().chunk_by(|step| &step.block) {
        let _ = writeln!(out, "  {block}");

        for step in steps {
            let _ = writeln!(out, "    {:<40} depth {}", step.mnemonic, step.depth);
        }
    }

    out
}
