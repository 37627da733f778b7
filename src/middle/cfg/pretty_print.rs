use colored::Colorize;
use itertools::Itertools;

use crate::middle::{
    cfg::{Condition, Frame, Module},
    op::{Constant, OpKind, ShuffleKind},
};

impl core::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.frames.iter().join("\n"))
    }
}

impl core::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} {}{}{}{}",
            "frame".magenta(),
            self.path.to_string().blue(),
            "(".white(),
            self.parameters.iter().join(", ").white(),
            ") {".white()
        )?;

        writeln!(
            f,
            "    {} {}",
            "consts".cyan(),
            self.constants.iter().join(", ")
        )?;

        for (id, block) in self.blocks.enumerate() {
            let name = block.path.block_name().unwrap_or("<root>");
            writeln!(f, "{}", format!("{id} {name}:").bright_red())?;

            for op in &block.body {
                writeln!(f, "    {}", op.kind)?;
            }

            for link in &block.links {
                let condition = match link.condition {
                    Condition::Always => "always",
                    Condition::IfTrue => "if true",
                    Condition::IfFalse => "if false",
                };

                writeln!(
                    f,
                    "    {} {} {}{}",
                    "->".white(),
                    link.target,
                    condition.yellow(),
                    if link.discard > 0 {
                        format!(" (discard {})", link.discard)
                    } else {
                        String::new()
                    }
                )?;
            }
        }

        writeln!(f, "{}", "}".white())
    }
}

impl core::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::None => f.write_str("None"),
            Constant::Integer(value) => write!(f, "{value}"),
            Constant::Boolean(true) => f.write_str("True"),
            Constant::Boolean(false) => f.write_str("False"),
            Constant::String(value) => write!(f, "{value:?}"),
        }
    }
}

impl core::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::LoadConst(index) => write!(f, "{} {}", "load_const".cyan(), index.0),
            OpKind::LoadName(name) => write!(f, "{} {name}", "load_name".cyan()),
            OpKind::LoadCallee(name) => write!(f, "{} {name}", "load_callee".cyan()),
            OpKind::StoreName(name) => write!(f, "{} {name}", "store_name".cyan()),
            OpKind::Binary(operator) => write!(f, "{} {operator}", "binary".cyan()),
            OpKind::Compare(operator) => write!(f, "{} {operator}", "compare".cyan()),
            OpKind::Call { argc } => write!(f, "{} {}", "call".cyan(), argc.to_string().purple()),
            OpKind::Return => write!(f, "{}", "return".cyan()),
            OpKind::Pop => write!(f, "{}", "pop".cyan()),
            OpKind::Shuffle(kind) => {
                let name = match kind {
                    ShuffleKind::DupTop => "dup_top",
                    ShuffleKind::RotTwo => "rot_two",
                    ShuffleKind::RotThree => "rot_three",
                };
                write!(f, "{}", name.cyan())
            }
            OpKind::Direct(command) => write!(f, "{} /{command}", "direct".cyan()),
            OpKind::DefineFunction { name, frame } => {
                write!(f, "{} {name} = {frame}", "define".cyan())
            }
            OpKind::Nop => write!(f, "{}", "nop".cyan()),
        }
    }
}
