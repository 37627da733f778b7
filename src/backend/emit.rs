//! Rendering of verified modules into procedure text, and writing the
//! procedures out as a datapack.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path as FsPath, PathBuf},
};

use hashbrown::HashSet;
use tracing::{debug, info};

use crate::{
    error::{CompileError, Result},
    index::IndexVec,
    middle::{
        cfg::FrameId,
        path::Path,
        storage::StackIndex,
    },
};

use super::{
    assembler::AssembledModule,
    instruction::{
        Callee, DEBUG_OBJECTIVE, FrameSeed, Instruction, OBJECTIVE, SeedTable, TracePosition,
        quote_nbt,
    },
    verify::FrameLayout,
};

/// Pack format written to `pack.mcmeta` unless configured otherwise
pub const DEFAULT_PACK_FORMAT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Print a trace line around instructions for players with a positive
    /// `__DEBUG__` score
    pub debug: bool,
    /// Report data commands that unexpectedly fail
    pub fail_check: bool,
    /// Annotate procedures with source lines and instruction mnemonics
    pub comments: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            debug: false,
            fail_check: false,
            comments: true,
        }
    }
}

/// A rendered procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub path: Path,
    pub text: String,
}

/// Every procedure of one successfully compiled module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledModule {
    pub path: Path,
    pub procedures: Vec<Procedure>,
}

impl CompiledModule {
    pub fn procedure(&self, id: &str) -> Option<&Procedure> {
        self.procedures
            .iter()
            .find(|procedure| procedure.path.procedure_id() == id)
    }
}

/// Renders a verified module: a launcher procedure at the module path, then
/// one procedure per block.
pub fn render_module(
    module: &AssembledModule,
    layouts: &IndexVec<FrameId, FrameLayout>,
    options: CodegenOptions,
) -> Result<CompiledModule> {
    let seeds = SeedTable {
        frames: module
            .frames
            .iter()
            .zip(layouts.iter())
            .map(|(frame, layout)| FrameSeed {
                stack_slots: layout.stack_slots(),
                constants: frame.constants.clone(),
            })
            .collect(),
    };

    let mut procedures = Vec::new();

    let launcher = [
        Instruction::Setup,
        Instruction::InitContext {
            argc: 0,
            callee: Callee::Frame(module.root),
        },
        Instruction::BindParameters(Vec::new()),
        Instruction::Invoke {
            target: module.frames[module.root].path.clone(),
            external: false,
        },
        Instruction::EndCall { keep_result: false },
    ];

    procedures.push(Procedure {
        path: module.path.clone(),
        text: render_block(&module.path, &launcher, StackIndex::BASELINE, &seeds, options)?,
    });

    for (frame, layout) in module.frames.iter().zip(layouts.iter()) {
        for block in frame.blocks.iter() {
            procedures.push(Procedure {
                path: block.path.clone(),
                text: render_block(
                    &block.path,
                    &block.instructions,
                    layout.entry_depths[block.id],
                    &seeds,
                    options,
                )?,
            });
        }
    }

    check_unique(&procedures)?;

    debug!(module = %module.path, procedures = procedures.len(), "rendered module");

    Ok(CompiledModule {
        path: module.path.clone(),
        procedures,
    })
}

fn check_unique<'a>(procedures: impl IntoIterator<Item = &'a Procedure>) -> Result<()> {
    let mut seen = HashSet::new();

    for procedure in procedures {
        if !seen.insert(procedure.path.procedure_id()) {
            return Err(CompileError::malformed(format!(
                "procedure `{}` is generated more than once",
                procedure.path.procedure_id()
            )));
        }
    }

    Ok(())
}

fn render_block(
    path: &Path,
    instructions: &[Instruction],
    entry: StackIndex,
    seeds: &SeedTable,
    options: CodegenOptions,
) -> Result<String> {
    let mut lines = Vec::new();
    let mut cursor = entry;

    for instruction in instructions {
        if let Instruction::Comment(_) = instruction {
            if options.comments {
                lines.extend(instruction.commands(&mut cursor, seeds)?);
            }

            continue;
        }

        if options.comments {
            lines.push(format!("# {}", instruction.debug_string()));
        }

        let trace = if options.debug {
            instruction.trace_position()
        } else {
            None
        };

        if trace == Some(TracePosition::Before) {
            lines.push(trace_command(path, instruction, cursor));
        }

        for command in instruction.commands(&mut cursor, seeds)? {
            if options.fail_check && instruction.checks_failure() {
                lines.push(format!(
                    "execute store success score pass {OBJECTIVE} run {command}"
                ));
                lines.push(format!(
                    "execute if score pass {OBJECTIVE} matches 0 run tellraw @a [{{\"text\":\"FAIL \",\"color\":\"red\"}},{{\"text\":{}}}]",
                    quote_nbt(&format!("{path}: {command}"))
                ));
            } else {
                lines.push(command);
            }
        }

        if trace == Some(TracePosition::After) {
            lines.push(trace_command(path, instruction, cursor));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

/// Shows the executing block, the instruction and the current top of stack
fn trace_command(path: &Path, instruction: &Instruction, cursor: StackIndex) -> String {
    format!(
        "execute if entity @a[scores={{{DEBUG_OBJECTIVE}=1..}}] run tellraw @a [{{\"text\":{}}},{{\"nbt\":\"{cursor}\",\"entity\":\"@s\"}}]",
        quote_nbt(&format!("{path} {} @{} ", instruction.debug_string(), cursor.depth()))
    )
}

/// Destination for rendered procedures
pub trait Emitter {
    fn write_procedure(&mut self, path: &Path, text: &str) -> Result<()>;

    /// Called once after every procedure has been written
    fn finish(&mut self) -> Result<()>;
}

/// Writes a datapack directory: procedure files under `data/` plus
/// `pack.mcmeta`.
#[derive(Debug, Clone)]
pub struct DirectoryEmitter {
    root: PathBuf,
    pack_format: u32,
    description: String,
}

impl DirectoryEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pack_format: DEFAULT_PACK_FORMAT,
            description: String::new(),
        }
    }

    pub fn with_pack_format(mut self, pack_format: u32) -> Self {
        self.pack_format = pack_format;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn root(&self) -> &FsPath {
        &self.root
    }

    fn write(&self, relative: &FsPath, contents: &str) -> Result<()> {
        let file = self.root.join(relative);
        let io_error = |source| CompileError::Io {
            path: file.clone(),
            source,
        };

        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        fs::write(&file, contents).map_err(io_error)
    }
}

impl Emitter for DirectoryEmitter {
    fn write_procedure(&mut self, path: &Path, text: &str) -> Result<()> {
        self.write(&path.file(), text)
    }

    fn finish(&mut self) -> Result<()> {
        let metadata = format!(
            "{{\"pack\":{{\"pack_format\":{},\"description\":{}}}}}\n",
            self.pack_format,
            quote_nbt(&self.description)
        );

        self.write(FsPath::new("pack.mcmeta"), &metadata)
    }
}

/// Keeps procedures in memory, keyed by procedure identifier
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    pub procedures: BTreeMap<String, String>,
    pub finished: bool,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for MemoryEmitter {
    fn write_procedure(&mut self, path: &Path, text: &str) -> Result<()> {
        self.procedures.insert(path.procedure_id(), text.to_owned());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes compiled modules through `emitter`. Procedure identifiers must be
/// unique across all of the modules.
pub fn write_datapack(modules: &[CompiledModule], emitter: &mut impl Emitter) -> Result<()> {
    check_unique(modules.iter().flat_map(|module| &module.procedures))?;

    for procedure in modules.iter().flat_map(|module| &module.procedures) {
        emitter.write_procedure(&procedure.path, &procedure.text)?;
    }

    emitter.finish()?;

    info!(
        modules = modules.len(),
        procedures = modules.iter().map(|m| m.procedures.len()).sum::<usize>(),
        "wrote datapack"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{assembler::assemble, verify::verify},
        frontend::{SourceFile, parser::Parser},
        middle::{cfg::build_module, storage::STORAGE_ROOT},
    };
    use pretty_assertions::assert_eq;

    fn compile(source: &str, options: CodegenOptions) -> CompiledModule {
        let source = SourceFile::from_memory(source);
        let ast = Parser::parse_module(&source).expect("parses");
        let module = build_module(&source, Path::namespace("demo").with_module("main"), &ast)
            .expect("builds");
        let assembled = assemble(&source, &module, &[]).expect("assembles");
        let layouts = verify(&assembled).expect("verifies");

        render_module(&assembled, &layouts, options).expect("renders")
    }

    fn bare() -> CodegenOptions {
        CodegenOptions {
            debug: false,
            fail_check: false,
            comments: false,
        }
    }

    #[test]
    fn launcher_summons_the_module_frame() {
        let module = compile("x = 1\n", bare());
        let launcher = module.procedure("demo:main").expect("launcher");
        let lines = launcher.text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "scoreboard objectives add __asm__ dummy");
        assert!(lines[3].starts_with("summon minecraft:armor_stand"));
        assert!(lines[3].contains("Stack:[{},{},{}]"));
        assert!(lines[3].contains("Consts:[{v:0b,t:\"none\"},{v:1,t:\"int\"}]"));
        assert_eq!(
            lines[4],
            "execute as @e[tag=__dest__,limit=1] run function demo:main/__module__"
        );
        assert_eq!(lines.last(), Some(&"scoreboard players set ret __asm__ 0"));
    }

    #[test]
    fn procedures_cover_every_block() {
        let module = compile("x = 1\nreturn x\n", bare());
        let ids = module
            .procedures
            .iter()
            .map(|procedure| procedure.path.procedure_id())
            .collect::<Vec<_>>();

        assert_eq!(
            ids,
            vec![
                "demo:main",
                "demo:main/__module__",
                "demo:main/__module__/0.body",
                "demo:main/__module__/0.exit",
            ]
        );

        let body = module
            .procedure("demo:main/__module__/0.body")
            .expect("body");

        assert_eq!(
            body.text,
            "data modify entity @s ArmorItems[0].tag.Stack[1] set from entity @s ArmorItems[0].tag.Consts[1]\n\
             data modify entity @s ArmorItems[0].tag.Names.x set from entity @s ArmorItems[0].tag.Stack[1]\n\
             data modify entity @s ArmorItems[0].tag.Stack[1] set from entity @s ArmorItems[0].tag.Names.x\n\
             data modify entity @s ArmorItems[0].tag.Stack[0] set from entity @s ArmorItems[0].tag.Stack[1]\n\
             scoreboard players set ret __asm__ 1\n\
             tag @s add __ret__\n"
        );
    }

    #[test]
    fn comments_show_source_and_mnemonics() {
        let module = compile("x = 1\n", CodegenOptions::default());
        let body = module
            .procedure("demo:main/__module__/0.body")
            .expect("body");

        assert!(body.text.starts_with("# 1: x = 1\n# load_const 1\n"));
        assert!(body.text.contains("# store_name x\n"));
    }

    #[test]
    fn fail_check_wraps_data_commands_only() {
        let options = CodegenOptions {
            fail_check: true,
            ..bare()
        };
        let module = compile("x = 1\n", options);
        let root = module.procedure("demo:main/__module__").expect("root");

        assert!(
            root.text
                .starts_with("execute store success score pass __asm__ run tag @s remove __dest__\n")
        );
        assert!(
            root.text
                .contains("\nexecute if score ret __asm__ matches 0 run function demo:main/__module__/0.body\n"),
            "bridges are never wrapped"
        );
    }

    #[test]
    fn debug_traces_gate_on_the_debug_score() {
        let options = CodegenOptions {
            debug: true,
            ..bare()
        };
        let module = compile("x = 1\n", options);
        let body = module
            .procedure("demo:main/__module__/0.body")
            .expect("body");

        assert!(body.text.lines().nth(1).is_some_and(|line| {
            line.starts_with("execute if entity @a[scores={__DEBUG__=1..}] run tellraw @a ")
                && line.contains("load_const 1 @1")
                && line.contains(&format!("\"nbt\":\"{STORAGE_ROOT}.Stack[1]\""))
        }));
    }

    #[test]
    fn duplicate_procedures_across_modules_are_rejected() {
        let module = compile("x = 1\n", bare());
        let mut emitter = MemoryEmitter::new();

        let error = write_datapack(&[module.clone(), module], &mut emitter)
            .expect_err("same module twice");

        assert!(matches!(error, CompileError::MalformedProgram { .. }));
        assert!(emitter.procedures.is_empty());
        assert!(!emitter.finished);
    }

    #[test]
    fn directory_emitter_writes_pack_metadata() {
        let temp = mktemp::Temp::new_dir().expect("temp dir");
        let root = temp.to_path_buf();

        let module = compile("x = 1\n", bare());
        let mut emitter = DirectoryEmitter::new(&root).with_description("demo \"pack\"");

        write_datapack(&[module], &mut emitter).expect("writes");

        let metadata = fs::read_to_string(root.join("pack.mcmeta")).expect("pack.mcmeta");
        assert_eq!(
            metadata,
            "{\"pack\":{\"pack_format\":3,\"description\":\"demo \\\"pack\\\"\"}}\n"
        );
        assert!(root.join("data/demo/functions/main.mcfunction").is_file());
        assert!(
            root.join("data/demo/functions/main/__module__/0.body.mcfunction")
                .is_file()
        );
    }
}
