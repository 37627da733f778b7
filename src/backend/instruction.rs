//! The target instruction set.
//!
//! Every instruction knows its operand stack effect and how to render itself
//! to commands given the compile-time stack cursor. Commands always act on
//! `@s`, the entity executing the current procedure, which owns the frame's
//! storage (see [`crate::middle::storage`]).

use colored::Colorize;
use itertools::Itertools;

use crate::{
    error::{CompileError, Result},
    frontend::ast::{BinaryOperator, CompareOperator},
    index::IndexVec,
    middle::{
        cfg::{BlockId, FrameId},
        op::{Constant, ShuffleKind},
        path::Path,
        storage::{ConstIndex, NameIndex, StackIndex, StagingIndex},
    },
};

/// Scoreboard objective holding the scratch registers
pub const OBJECTIVE: &str = "__asm__";
/// Objective gating trace output to players that opted in
pub const DEBUG_OBJECTIVE: &str = "__DEBUG__";

/// Marks a freshly summoned callee until its frame starts running
const DEST_TAG: &str = "__dest__";
/// Marks a callee that has returned
const RET_TAG: &str = "__ret__";
/// Marks entities the compiler may kill
const VOLATILE_TAG: &str = "__volatile__";

static EXTERNAL_CONSTANTS: [Constant; 1] = [Constant::None];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Creates the scoreboard objectives and clears the return flag
    Setup,
    /// First instruction of every frame: the callee stops being `__dest__`
    EnterFrame,
    LoadConst(ConstIndex),
    LoadName(NameIndex),
    StoreName(NameIndex),
    /// Stores a function value under `name`
    BindFunction { name: NameIndex, pointer: u32 },
    BinaryOp(BinaryOperator),
    CompareOp(CompareOperator),
    Shuffle(ShuffleKind),
    Pop,
    /// Summons the callee context and moves `argc` arguments into its staging
    /// slots
    InitContext { argc: usize, callee: Callee },
    /// Copies staged arguments into the callee's parameter names, in order
    BindParameters(Vec<NameIndex>),
    Invoke { target: Path, external: bool },
    /// Collects the callee's result (when kept) and disposes of the callee
    EndCall { keep_result: bool },
    Return,
    /// Runs the target block unless a return has been signaled
    Bridge(BlockTarget),
    /// Runs the target block if the top of stack is truthy (`when`) or falsy
    /// (`!when`) and no return has been signaled. Does not pop.
    BranchIf { target: BlockTarget, when: bool },
    Direct(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTarget {
    pub block: BlockId,
    pub path: Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    Frame(FrameId),
    External,
}

/// Storage a frame entity must be summoned with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSeed {
    pub stack_slots: usize,
    pub constants: Vec<Constant>,
}

/// Seeds of every frame in a module, needed to render `InitContext`
#[derive(Debug, Default)]
pub struct SeedTable {
    pub frames: IndexVec<FrameId, FrameSeed>,
}

impl SeedTable {
    fn seed_for(&self, callee: Callee) -> Result<(usize, &[Constant])> {
        match callee {
            Callee::Frame(frame) => self
                .frames
                .get(frame)
                .map(|seed| (seed.stack_slots, seed.constants.as_slice()))
                .ok_or_else(|| CompileError::malformed(format!("no storage layout for frame {frame}"))),
            Callee::External => Ok((1, &EXTERNAL_CONSTANTS)),
        }
    }
}

/// Where trace output for an instruction goes relative to its commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracePosition {
    Before,
    After,
}

impl Instruction {
    /// Values popped and pushed
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Instruction::Setup
            | Instruction::EnterFrame
            | Instruction::BindFunction { .. }
            | Instruction::BindParameters(_)
            | Instruction::Invoke { .. }
            | Instruction::Bridge(_)
            | Instruction::BranchIf { .. }
            | Instruction::Direct(_)
            | Instruction::Comment(_) => (0, 0),
            Instruction::LoadConst(_) | Instruction::LoadName(_) => (0, 1),
            Instruction::StoreName(_) | Instruction::Pop | Instruction::Return => (1, 0),
            Instruction::BinaryOp(_) | Instruction::CompareOp(_) => (2, 1),
            Instruction::Shuffle(ShuffleKind::DupTop) => (1, 2),
            Instruction::Shuffle(ShuffleKind::RotTwo) => (2, 2),
            Instruction::Shuffle(ShuffleKind::RotThree) => (3, 3),
            Instruction::InitContext { argc, .. } => (*argc, 0),
            Instruction::EndCall { keep_result } => (0, usize::from(*keep_result)),
        }
    }

    /// Block this instruction may transfer control to
    pub fn link_target(&self) -> Option<&BlockTarget> {
        match self {
            Instruction::Bridge(target) | Instruction::BranchIf { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn trace_position(&self) -> Option<TracePosition> {
        match self {
            Instruction::Comment(_) | Instruction::Pop | Instruction::Setup => None,
            Instruction::Bridge(_)
            | Instruction::BranchIf { .. }
            | Instruction::Invoke { .. }
            | Instruction::Direct(_) => Some(TracePosition::Before),
            _ => Some(TracePosition::After),
        }
    }

    /// Whether trace instrumentation is emitted for this instruction
    pub fn is_printable(&self) -> bool {
        self.trace_position().is_some()
    }

    /// Whether every command of this instruction is expected to succeed, so a
    /// failure is worth reporting
    pub fn checks_failure(&self) -> bool {
        matches!(
            self,
            Instruction::EnterFrame
                | Instruction::LoadConst(_)
                | Instruction::LoadName(_)
                | Instruction::StoreName(_)
                | Instruction::BindFunction { .. }
                | Instruction::Shuffle(_)
                | Instruction::InitContext { .. }
                | Instruction::BindParameters(_)
                | Instruction::Return
        )
    }

    /// Short uncolored description used in comments, traces and diagnostics
    pub fn debug_string(&self) -> String {
        strip_ansi_escapes::strip_str(self.to_string())
    }

    /// Renders the instruction, moving `cursor` by its stack effect.
    pub fn commands(&self, cursor: &mut StackIndex, seeds: &SeedTable) -> Result<Vec<String>> {
        let commands = match self {
            Instruction::Setup => vec![
                format!("scoreboard objectives add {OBJECTIVE} dummy"),
                format!("scoreboard objectives add {DEBUG_OBJECTIVE} dummy"),
                format!("scoreboard players set ret {OBJECTIVE} 0"),
            ],
            Instruction::EnterFrame => vec![format!("tag @s remove {DEST_TAG}")],
            Instruction::LoadConst(constant) => {
                let slot = cursor.push();
                vec![format!(
                    "data modify entity @s {slot} set from entity @s {constant}"
                )]
            }
            Instruction::LoadName(name) => {
                let slot = cursor.push();
                vec![format!("data modify entity @s {slot} set from entity @s {name}")]
            }
            Instruction::StoreName(name) => {
                let slot = cursor.pop();
                vec![format!("data modify entity @s {name} set from entity @s {slot}")]
            }
            Instruction::BindFunction { name, pointer } => vec![format!(
                "data modify entity @s {name} set value {{v:{pointer},t:\"fptr\"}}"
            )],
            Instruction::BinaryOp(operator) => {
                let (lhs, mut commands) = load_operands(cursor);

                match operator {
                    BinaryOperator::And | BinaryOperator::Or => {
                        for register in ["t0", "t1"] {
                            commands.push(format!(
                                "execute store success score {register} {OBJECTIVE} unless score {register} {OBJECTIVE} matches 0"
                            ));
                        }
                    }
                    _ => {}
                }

                let operation = match operator {
                    BinaryOperator::Add => "+=",
                    BinaryOperator::Subtract => "-=",
                    BinaryOperator::Multiply => "*=",
                    BinaryOperator::Divide | BinaryOperator::FloorDivide => "/=",
                    BinaryOperator::Modulus => "%=",
                    // min and max of the normalized operands
                    BinaryOperator::And => "<",
                    BinaryOperator::Or => ">",
                };

                commands.push(format!(
                    "scoreboard players operation t0 {OBJECTIVE} {operation} t1 {OBJECTIVE}"
                ));
                commands.extend(store_register(lhs, "t0", "int"));
                commands
            }
            Instruction::CompareOp(operator) => {
                let (lhs, mut commands) = load_operands(cursor);

                let (comparison, matched, otherwise) = match operator {
                    CompareOperator::LessThan => ("<", 1, 0),
                    CompareOperator::LessThanOrEqualTo => ("<=", 1, 0),
                    CompareOperator::Equals => ("=", 1, 0),
                    CompareOperator::NotEquals => ("=", 0, 1),
                    CompareOperator::GreaterThan => (">", 1, 0),
                    CompareOperator::GreaterThanOrEqualTo => (">=", 1, 0),
                };

                commands.push(format!("scoreboard players set t2 {OBJECTIVE} {otherwise}"));
                commands.push(format!(
                    "execute if score t0 {OBJECTIVE} {comparison} t1 {OBJECTIVE} run scoreboard players set t2 {OBJECTIVE} {matched}"
                ));
                commands.extend(store_register(lhs, "t2", "bool"));
                commands
            }
            Instruction::Shuffle(kind) => {
                let (moves, seek) = kind.moves();

                let commands = moves
                    .iter()
                    .map(|(destination, source)| {
                        format!(
                            "data modify entity @s {} set from entity @s {}",
                            cursor.offset(*destination),
                            cursor.offset(*source)
                        )
                    })
                    .collect();

                cursor.seek(seek);
                commands
            }
            Instruction::Pop => {
                cursor.pop();
                Vec::new()
            }
            Instruction::InitContext { argc, callee } => {
                let (stack_slots, constants) = seeds.seed_for(*callee)?;
                let mut commands = vec![summon_context(stack_slots, constants, *argc)];

                for index in (0..*argc).rev() {
                    let slot = cursor.pop();
                    commands.push(format!(
                        "data modify entity @e[tag={DEST_TAG},limit=1] {} set from entity @s {slot}",
                        StagingIndex(index)
                    ));
                }

                commands
            }
            Instruction::BindParameters(parameters) => parameters
                .iter()
                .enumerate()
                .map(|(index, parameter)| {
                    format!(
                        "data modify entity @e[tag={DEST_TAG},limit=1] {parameter} set from entity @e[tag={DEST_TAG},limit=1] {}",
                        StagingIndex(index)
                    )
                })
                .collect(),
            Instruction::Invoke { target, external } => {
                let mut commands = vec![format!(
                    "execute as @e[tag={DEST_TAG},limit=1] run function {}",
                    target.procedure_id()
                )];

                if *external {
                    commands.push(format!("tag @e[tag={DEST_TAG},limit=1] add {RET_TAG}"));
                    commands.push(format!("tag @e[tag={DEST_TAG}] remove {DEST_TAG}"));
                }

                commands
            }
            Instruction::EndCall { keep_result } => {
                let mut commands = Vec::new();

                if *keep_result {
                    let slot = cursor.push();
                    commands.push(format!(
                        "data modify entity @s {slot} set from entity @e[tag={RET_TAG},limit=1] {}",
                        StackIndex::BASELINE
                    ));
                }

                commands.push(format!(
                    "kill @e[tag={RET_TAG},tag={VOLATILE_TAG},limit=1]"
                ));
                commands.push(format!("scoreboard players set ret {OBJECTIVE} 0"));
                commands
            }
            Instruction::Return => {
                let slot = cursor.pop();

                vec![
                    format!(
                        "data modify entity @s {} set from entity @s {slot}",
                        StackIndex::BASELINE
                    ),
                    format!("scoreboard players set ret {OBJECTIVE} 1"),
                    format!("tag @s add {RET_TAG}"),
                ]
            }
            Instruction::Bridge(target) => vec![format!(
                "execute if score ret {OBJECTIVE} matches 0 run function {}",
                target.path.procedure_id()
            )],
            Instruction::BranchIf { target, when } => {
                let test = if *when { "unless" } else { "if" };

                vec![
                    format!(
                        "execute store result score test {OBJECTIVE} run data get entity @s {cursor}.v"
                    ),
                    format!(
                        "execute if score ret {OBJECTIVE} matches 0 {test} score test {OBJECTIVE} matches 0 run function {}",
                        target.path.procedure_id()
                    ),
                ]
            }
            Instruction::Direct(command) => vec![command.clone()],
            Instruction::Comment(text) => vec![format!("# {text}")],
        };

        Ok(commands)
    }
}

/// Pops the right operand into `t1` and reads the left one into `t0`,
/// returning the left operand's slot, which receives the result.
fn load_operands(cursor: &mut StackIndex) -> (StackIndex, Vec<String>) {
    let rhs = cursor.pop();
    let lhs = *cursor;

    let commands = vec![
        format!("execute store result score t1 {OBJECTIVE} run data get entity @s {rhs}.v"),
        format!("execute store result score t0 {OBJECTIVE} run data get entity @s {lhs}.v"),
    ];

    (lhs, commands)
}

fn store_register(slot: StackIndex, register: &str, ty: &str) -> [String; 2] {
    [
        format!(
            "execute store result entity @s {slot}.v int 1 run scoreboard players get {register} {OBJECTIVE}"
        ),
        format!("data modify entity @s {slot}.t set value \"{ty}\""),
    ]
}

/// Value compound stored in every storage slot
pub fn constant_nbt(constant: &Constant) -> String {
    match constant {
        Constant::None => "{v:0b,t:\"none\"}".to_owned(),
        Constant::Integer(value) => format!("{{v:{value},t:\"int\"}}"),
        Constant::Boolean(value) => format!("{{v:{}b,t:\"bool\"}}", u8::from(*value)),
        Constant::String(value) => format!("{{v:{},t:\"str\"}}", quote_nbt(value)),
    }
}

/// Double-quoted NBT / JSON string with `\` and `"` escaped
pub fn quote_nbt(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn summon_context(stack_slots: usize, constants: &[Constant], argc: usize) -> String {
    let stack = std::iter::repeat_n("{}", stack_slots).join(",");
    let constants = constants.iter().map(constant_nbt).join(",");
    let staging = std::iter::repeat_n("{}", argc).join(",");

    format!(
        "summon minecraft:armor_stand ~ ~ ~ {{Tags:[\"{DEST_TAG}\",\"{VOLATILE_TAG}\"],Marker:1b,Invisible:1b,NoGravity:1b,ArmorItems:[{{id:\"minecraft:paper\",Count:1b,tag:{{Stack:[{stack}],Consts:[{constants}],Names:{{}},Pre:[{staging}]}}}},{{}},{{}},{{}}]}}"
    )
}

impl core::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Setup => write!(f, "{}", "setup".cyan()),
            Instruction::EnterFrame => write!(f, "{}", "enter_frame".cyan()),
            Instruction::LoadConst(index) => {
                write!(f, "{} {}", "load_const".cyan(), index.0.to_string().purple())
            }
            Instruction::LoadName(name) => write!(f, "{} {}", "load_name".cyan(), name.0),
            Instruction::StoreName(name) => write!(f, "{} {}", "store_name".cyan(), name.0),
            Instruction::BindFunction { name, pointer } => write!(
                f,
                "{} {} {} {}",
                "bind_function".cyan(),
                name.0,
                "=".white(),
                pointer.to_string().purple()
            ),
            Instruction::BinaryOp(operator) => write!(f, "{} {operator}", "binary_op".cyan()),
            Instruction::CompareOp(operator) => write!(f, "{} {operator}", "compare_op".cyan()),
            Instruction::Shuffle(kind) => {
                let name = match kind {
                    ShuffleKind::DupTop => "dup_top",
                    ShuffleKind::RotTwo => "rot_two",
                    ShuffleKind::RotThree => "rot_three",
                };
                write!(f, "{}", name.cyan())
            }
            Instruction::Pop => write!(f, "{}", "pop".cyan()),
            Instruction::InitContext { argc, callee } => write!(
                f,
                "{} {} {}",
                "init_context".cyan(),
                argc.to_string().purple(),
                match callee {
                    Callee::Frame(frame) => frame.to_string(),
                    Callee::External => "external".to_owned(),
                }
            ),
            Instruction::BindParameters(parameters) => write!(
                f,
                "{} {}",
                "bind_parameters".cyan(),
                parameters.iter().map(|p| p.0.as_str()).join(", ")
            ),
            Instruction::Invoke { target, external } => write!(
                f,
                "{} {}{}",
                "invoke".cyan(),
                target.to_string().blue(),
                if *external { " (external)" } else { "" }
            ),
            Instruction::EndCall { keep_result } => write!(
                f,
                "{}{}",
                "end_call".cyan(),
                if *keep_result { "" } else { " (discard)" }
            ),
            Instruction::Return => write!(f, "{}", "return".cyan()),
            Instruction::Bridge(target) => {
                write!(f, "{} {}", "bridge".cyan(), target.path.to_string().blue())
            }
            Instruction::BranchIf { target, when } => write!(
                f,
                "{} {}",
                (if *when { "branch_if_true" } else { "branch_if_false" }).cyan(),
                target.path.to_string().blue()
            ),
            Instruction::Direct(command) => write!(f, "{} /{command}", "direct".cyan()),
            Instruction::Comment(text) => write!(f, "{} {text}", "#".dimmed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use pretty_assertions::assert_eq;

    fn render(instruction: &Instruction, depth: isize) -> (Vec<String>, isize) {
        let mut cursor = StackIndex(depth);
        let commands = instruction
            .commands(&mut cursor, &SeedTable::default())
            .expect("renders");
        (commands, cursor.depth())
    }

    fn net(instruction: &Instruction) -> isize {
        let (pops, pushes) = instruction.stack_effect();
        pushes as isize - pops as isize
    }

    #[test]
    fn subtraction_reads_left_operand_below_right() {
        let instruction = Instruction::BinaryOp(BinaryOperator::Subtract);
        let (commands, depth) = render(&instruction, 2);

        assert_eq!(
            commands,
            vec![
                "execute store result score t1 __asm__ run data get entity @s ArmorItems[0].tag.Stack[2].v",
                "execute store result score t0 __asm__ run data get entity @s ArmorItems[0].tag.Stack[1].v",
                "scoreboard players operation t0 __asm__ -= t1 __asm__",
                "execute store result entity @s ArmorItems[0].tag.Stack[1].v int 1 run scoreboard players get t0 __asm__",
                "data modify entity @s ArmorItems[0].tag.Stack[1].t set value \"int\"",
            ]
        );
        assert_eq!(depth, 1);
        assert_eq!(net(&instruction), -1);
    }

    #[test]
    fn division_and_modulus_use_scoreboard_operations() {
        let (divide, _) = render(&Instruction::BinaryOp(BinaryOperator::FloorDivide), 2);
        let (modulus, _) = render(&Instruction::BinaryOp(BinaryOperator::Modulus), 2);

        assert_eq!(divide[2], "scoreboard players operation t0 __asm__ /= t1 __asm__");
        assert_eq!(modulus[2], "scoreboard players operation t0 __asm__ %= t1 __asm__");
    }

    #[test]
    fn not_equals_is_negated_equality() {
        let (commands, depth) = render(&Instruction::CompareOp(CompareOperator::NotEquals), 3);

        assert_eq!(commands[2], "scoreboard players set t2 __asm__ 1");
        assert_eq!(
            commands[3],
            "execute if score t0 __asm__ = t1 __asm__ run scoreboard players set t2 __asm__ 0"
        );
        assert_eq!(depth, 2);
    }

    #[test]
    fn rot_two_swaps_through_scratch_slot() {
        let (commands, depth) = render(&Instruction::Shuffle(ShuffleKind::RotTwo), 2);

        assert_eq!(
            commands,
            vec![
                "data modify entity @s ArmorItems[0].tag.Stack[3] set from entity @s ArmorItems[0].tag.Stack[2]",
                "data modify entity @s ArmorItems[0].tag.Stack[2] set from entity @s ArmorItems[0].tag.Stack[1]",
                "data modify entity @s ArmorItems[0].tag.Stack[1] set from entity @s ArmorItems[0].tag.Stack[3]",
            ]
        );
        assert_eq!(depth, 2);
    }

    #[test]
    fn init_context_stages_last_argument_first() {
        let mut seeds = SeedTable::default();
        let frame = seeds.frames.push(FrameSeed {
            stack_slots: 3,
            constants: vec![Constant::None, Constant::String("hi \"you\"".to_owned())],
        });

        let instruction = Instruction::InitContext {
            argc: 2,
            callee: Callee::Frame(frame),
        };

        let mut cursor = StackIndex(4);
        let commands = instruction.commands(&mut cursor, &seeds).expect("renders");

        assert_eq!(
            commands[0],
            "summon minecraft:armor_stand ~ ~ ~ {Tags:[\"__dest__\",\"__volatile__\"],Marker:1b,Invisible:1b,NoGravity:1b,ArmorItems:[{id:\"minecraft:paper\",Count:1b,tag:{Stack:[{},{},{}],Consts:[{v:0b,t:\"none\"},{v:\"hi \\\"you\\\"\",t:\"str\"}],Names:{},Pre:[{},{}]}},{},{},{}]}"
        );
        assert_eq!(
            &commands[1..],
            &[
                "data modify entity @e[tag=__dest__,limit=1] ArmorItems[0].tag.Pre[1] set from entity @s ArmorItems[0].tag.Stack[4]",
                "data modify entity @e[tag=__dest__,limit=1] ArmorItems[0].tag.Pre[0] set from entity @s ArmorItems[0].tag.Stack[3]",
            ]
        );
        assert_eq!(cursor.depth(), 2);
        assert_eq!(frame.index(), 0);
    }

    #[test]
    fn calling_a_frame_without_storage_layout_fails() {
        let instruction = Instruction::InitContext {
            argc: 0,
            callee: Callee::Frame(FrameId::new(3)),
        };

        let error = instruction
            .commands(&mut StackIndex(0), &SeedTable::default())
            .expect_err("no seed for f3");

        assert!(matches!(error, CompileError::MalformedProgram { .. }));
        assert!(error.to_string().contains("f3"));
    }

    #[test]
    fn call_sequence_consumes_arguments_and_leaves_result() {
        let sequence = [
            Instruction::InitContext {
                argc: 2,
                callee: Callee::External,
            },
            Instruction::BindParameters(vec![
                NameIndex("a".to_owned()),
                NameIndex("b".to_owned()),
            ]),
            Instruction::Invoke {
                target: "lib:f".parse().expect("path"),
                external: true,
            },
            Instruction::EndCall { keep_result: true },
        ];

        assert_eq!(sequence.iter().map(net).sum::<isize>(), -1);
    }

    #[test]
    fn return_moves_top_into_result_slot() {
        let (commands, depth) = render(&Instruction::Return, 1);

        assert_eq!(
            commands,
            vec![
                "data modify entity @s ArmorItems[0].tag.Stack[0] set from entity @s ArmorItems[0].tag.Stack[1]",
                "scoreboard players set ret __asm__ 1",
                "tag @s add __ret__",
            ]
        );
        assert_eq!(depth, 0);
    }

    #[test]
    fn branches_check_the_return_flag() {
        let target = BlockTarget {
            block: BlockId::new(3),
            path: "ns:main/__module__/2.true".parse().expect("path"),
        };

        let (bridge, _) = render(&Instruction::Bridge(target.clone()), 0);
        let (branch, depth) = render(
            &Instruction::BranchIf {
                target,
                when: false,
            },
            1,
        );

        assert_eq!(
            bridge,
            vec!["execute if score ret __asm__ matches 0 run function ns:main/__module__/2.true"]
        );
        assert_eq!(
            branch[1],
            "execute if score ret __asm__ matches 0 if score test __asm__ matches 0 run function ns:main/__module__/2.true"
        );
        assert_eq!(depth, 1, "branching never pops the test value");
    }

    #[test]
    fn direct_is_verbatim_with_no_stack_effect() {
        let instruction = Instruction::Direct("say hello".to_owned());
        let (commands, depth) = render(&instruction, 2);

        assert_eq!(commands, vec!["say hello"]);
        assert_eq!(depth, 2);
        assert_eq!(net(&instruction), 0);
    }

    #[test]
    fn debug_string_has_no_color_codes() {
        let instruction = Instruction::StoreName(NameIndex("x".to_owned()));

        assert_eq!(instruction.debug_string(), "store_name x");
        assert!(instruction.is_printable());
        assert!(!Instruction::Comment("x".to_owned()).is_printable());
    }

    #[test]
    fn constants_render_typed_compounds() {
        assert_eq!(constant_nbt(&Constant::Integer(-4)), "{v:-4,t:\"int\"}");
        assert_eq!(constant_nbt(&Constant::Boolean(true)), "{v:1b,t:\"bool\"}");
        assert_eq!(
            constant_nbt(&Constant::String("a\\b".to_owned())),
            "{v:\"a\\\\b\",t:\"str\"}"
        );
    }
}
