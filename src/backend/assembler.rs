//! Turns canonical ops into target instructions.
//!
//! The assembler walks the module frame block by block, resolving every name
//! against the symbol table. A `def` registers its function symbol in the
//! enclosing layer and then assembles the function's own frame in a fresh
//! layer, so recursion and calls to earlier functions resolve statically.

use tracing::{debug, trace};

use crate::{
    error::{CompileError, Location, Result},
    frontend::SourceFile,
    index::IndexVec,
    middle::{
        cfg::{self, BlockId, Condition, FrameId},
        op::{Constant, Op, OpKind},
        path::Path,
        storage::NameIndex,
        symbol_table::{FunctionOrigin, FunctionSymbol, Symbol, SymbolError, SymbolTable},
    },
};

use super::instruction::{BlockTarget, Callee, Instruction};

/// Name of the outermost symbol layer
const BUILTINS_LAYER: &str = "__builtins__";

/// A pre-written procedure callable from compiled code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCallable {
    pub name: String,
    /// Procedure invoked for the call
    pub path: Path,
    /// Names the arguments are bound to on the callee entity
    pub parameters: Vec<String>,
}

#[derive(Debug)]
pub struct AssembledModule {
    pub path: Path,
    pub frames: IndexVec<FrameId, AssembledFrame>,
    pub root: FrameId,
}

#[derive(Debug)]
pub struct AssembledFrame {
    pub path: Path,
    pub root: BlockId,
    pub blocks: IndexVec<BlockId, AssembledBlock>,
    pub constants: Vec<Constant>,
}

#[derive(Debug)]
pub struct AssembledBlock {
    pub id: BlockId,
    pub path: Path,
    pub instructions: Vec<Instruction>,
}

pub fn assemble(
    source: &SourceFile,
    module: &cfg::Module,
    externals: &[ExternalCallable],
) -> Result<AssembledModule> {
    let mut symbols = SymbolTable::new();
    symbols.push_layer(BUILTINS_LAYER);

    for external in externals {
        if symbols.has_symbol(&external.name) {
            return Err(CompileError::malformed(format!(
                "external callable `{}` is declared more than once",
                external.name
            )));
        }

        let symbol = Symbol::Function(FunctionSymbol {
            path: external.path.clone(),
            parameters: external.parameters.clone(),
            origin: FunctionOrigin::External,
        });

        symbols
            .add_symbol(external.name.clone(), symbol)
            .map_err(|error| CompileError::malformed(error.to_string()))?;
    }

    let mut assembler = Assembler {
        source,
        module,
        symbols,
        frames: module.frames.iter().map(|_| None).collect(),
        next_pointer: 0,
    };

    assembler.assemble_frame(module.root)?;

    let mut frames = IndexVec::new();

    for (id, frame) in assembler.frames.into_iter_enumerated() {
        let Some(frame) = frame else {
            return Err(CompileError::malformed(format!(
                "frame `{}` is never defined",
                module.frames[id].path
            )));
        };

        frames.push(frame);
    }

    Ok(AssembledModule {
        path: module.path.clone(),
        frames,
        root: module.root,
    })
}

struct Assembler<'a> {
    source: &'a SourceFile,
    module: &'a cfg::Module,
    symbols: SymbolTable,
    frames: IndexVec<FrameId, Option<AssembledFrame>>,
    /// Identifier handed to the next function value
    next_pointer: u32,
}

impl Assembler<'_> {
    fn location(&self, op: &Op) -> Location {
        Location::of_span(self.source, op.span)
    }

    fn assemble_frame(&mut self, id: FrameId) -> Result<()> {
        let module = self.module;
        let frame = &module.frames[id];

        self.symbols
            .push_layer(frame.path.frame_name().unwrap_or_default());

        for parameter in &frame.parameters {
            self.symbols
                .add_symbol(
                    parameter.clone(),
                    Symbol::Variable(NameIndex(parameter.clone())),
                )
                .map_err(|error| self.symbol_error(error, Location::of_span(self.source, frame.span)))?;
        }

        let mut blocks = IndexVec::new();

        for block in frame.blocks.iter() {
            let instructions = self.assemble_block(frame, block)?;
            trace!(block = %block.path, instructions = instructions.len(), "assembled block");

            blocks.push(AssembledBlock {
                id: block.id,
                path: block.path.clone(),
                instructions,
            });
        }

        self.symbols.pop_layer();

        debug!(frame = %frame.path, blocks = blocks.len(), "assembled frame");

        self.frames[id] = Some(AssembledFrame {
            path: frame.path.clone(),
            root: frame.root,
            blocks,
            constants: frame.constants.iter().cloned().collect(),
        });

        Ok(())
    }

    fn assemble_block(&mut self, frame: &cfg::Frame, block: &cfg::Block) -> Result<Vec<Instruction>> {
        let mut instructions = Vec::new();
        let mut pending_callees = Vec::new();
        let mut line = None;

        if block.id == frame.root {
            instructions.push(Instruction::EnterFrame);
        }

        for op in &block.body {
            let op_line = self.source.line_for_position(op.span.start);

            if line != Some(op_line) {
                line = Some(op_line);
                instructions.push(Instruction::Comment(format!(
                    "{op_line}: {}",
                    self.source.line_text(op_line).trim()
                )));
            }

            self.assemble_op(op, &mut instructions, &mut pending_callees)?;
        }

        if !pending_callees.is_empty() {
            return Err(CompileError::malformed(format!(
                "callee left without a call in `{}`",
                block.path
            )));
        }

        let target = |link: &cfg::Link| BlockTarget {
            block: link.target,
            path: frame.blocks[link.target].path.clone(),
        };

        let mut conditional = false;

        for link in &block.links {
            let when = match link.condition {
                Condition::Always => continue,
                Condition::IfTrue => true,
                Condition::IfFalse => false,
            };

            conditional = true;
            instructions.push(Instruction::BranchIf {
                target: target(link),
                when,
            });
        }

        // Branches share the tested value; it goes once they have all run
        if conditional {
            instructions.push(Instruction::Pop);
        }

        for link in block
            .links
            .iter()
            .filter(|link| link.condition == Condition::Always)
        {
            instructions.extend(std::iter::repeat_n(Instruction::Pop, link.discard));
            instructions.push(Instruction::Bridge(target(link)));
        }

        Ok(instructions)
    }

    fn assemble_op(
        &mut self,
        op: &Op,
        instructions: &mut Vec<Instruction>,
        pending_callees: &mut Vec<FunctionSymbol>,
    ) -> Result<()> {
        match &op.kind {
            OpKind::LoadConst(index) => instructions.push(Instruction::LoadConst(*index)),
            OpKind::LoadName(name) => {
                let Some(resolved) = self.symbols.resolve(name) else {
                    return Err(CompileError::UnresolvedSymbol {
                        name: name.clone(),
                        location: self.location(op),
                    });
                };

                match resolved.symbol {
                    Symbol::Variable(index) if resolved.distance == 0 => {
                        instructions.push(Instruction::LoadName(index.clone()));
                    }
                    Symbol::Variable(_) => {
                        return Err(CompileError::Unsupported {
                            construct: format!("reference to `{name}` from an enclosing function"),
                            location: self.location(op),
                        });
                    }
                    Symbol::Function(_) => {
                        return Err(CompileError::MalformedProgram {
                            message: format!("malformed function reference `{name}`"),
                            location: Some(self.location(op)),
                            detail: String::new(),
                        });
                    }
                }
            }
            OpKind::LoadCallee(name) => {
                let symbol = self
                    .symbols
                    .get_symbol(name)
                    .map_err(|error| self.symbol_error(error, self.location(op)))?;

                let Symbol::Function(function) = symbol else {
                    return Err(CompileError::UnresolvedSymbol {
                        name: name.clone(),
                        location: self.location(op),
                    });
                };

                pending_callees.push(function.clone());
            }
            OpKind::StoreName(name) => {
                match self.symbols.get_local(name) {
                    Some(Symbol::Variable(_)) => {}
                    Some(Symbol::Function(_)) => {
                        return Err(CompileError::DuplicateSymbol {
                            name: name.clone(),
                            layer: self.symbols.current_layer_name().unwrap_or_default().to_owned(),
                            location: self.location(op),
                        });
                    }
                    None => {
                        self.symbols
                            .add_symbol(name.clone(), Symbol::Variable(NameIndex(name.clone())))
                            .map_err(|error| self.symbol_error(error, self.location(op)))?;
                    }
                }

                instructions.push(Instruction::StoreName(NameIndex(name.clone())));
            }
            OpKind::Call { argc } => {
                let Some(function) = pending_callees.pop() else {
                    return Err(CompileError::MalformedProgram {
                        message: "call without a callee".to_owned(),
                        location: Some(self.location(op)),
                        detail: String::new(),
                    });
                };

                if function.arity() != *argc {
                    return Err(CompileError::MalformedProgram {
                        message: format!(
                            "`{}` takes {} argument(s) but {argc} were given",
                            function.path,
                            function.arity()
                        ),
                        location: Some(self.location(op)),
                        detail: String::new(),
                    });
                }

                let (callee, external) = match function.origin {
                    FunctionOrigin::Frame(frame) => (Callee::Frame(frame), false),
                    FunctionOrigin::External => (Callee::External, true),
                };

                instructions.extend([
                    Instruction::InitContext {
                        argc: *argc,
                        callee,
                    },
                    Instruction::BindParameters(
                        function
                            .parameters
                            .iter()
                            .map(|parameter| NameIndex(parameter.clone()))
                            .collect(),
                    ),
                    Instruction::Invoke {
                        target: function.path,
                        external,
                    },
                    Instruction::EndCall { keep_result: true },
                ]);
            }
            OpKind::Nop => {}
            OpKind::Binary(operator) => instructions.push(Instruction::BinaryOp(*operator)),
            OpKind::Compare(operator) => instructions.push(Instruction::CompareOp(*operator)),
            OpKind::Return => instructions.push(Instruction::Return),
            OpKind::Pop => instructions.push(Instruction::Pop),
            OpKind::Shuffle(kind) => instructions.push(Instruction::Shuffle(*kind)),
            OpKind::Direct(command) => instructions.push(Instruction::Direct(command.clone())),
            OpKind::DefineFunction { name, frame } => {
                let module = self.module;
                let definition = &module.frames[*frame];

                let symbol = Symbol::Function(FunctionSymbol {
                    path: definition.path.clone(),
                    parameters: definition.parameters.clone(),
                    origin: FunctionOrigin::Frame(*frame),
                });

                self.symbols
                    .add_symbol(name.clone(), symbol)
                    .map_err(|error| self.symbol_error(error, self.location(op)))?;

                let pointer = self.next_pointer;
                self.next_pointer += 1;

                instructions.push(Instruction::BindFunction {
                    name: NameIndex(name.clone()),
                    pointer,
                });

                self.assemble_frame(*frame)?;
            }
        }

        Ok(())
    }

    fn symbol_error(&self, error: SymbolError, location: Location) -> CompileError {
        match error {
            SymbolError::AlreadyDeclared { name, layer } => CompileError::DuplicateSymbol {
                name,
                layer,
                location,
            },
            SymbolError::NotFound(name) => CompileError::UnresolvedSymbol { name, location },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frontend::parser::Parser, middle::cfg::build_module};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn assemble_source(source: &str, externals: &[ExternalCallable]) -> Result<AssembledModule> {
        let source = SourceFile::from_memory(source);
        let ast = Parser::parse_module(&source)?;
        let module = build_module(&source, Path::namespace("test").with_module("main"), &ast)?;

        assemble(&source, &module, externals)
    }

    fn block<'a>(module: &'a AssembledModule, frame: &str, block: Option<&str>) -> &'a AssembledBlock {
        module
            .frames
            .iter()
            .filter(|f| f.path.frame_name() == Some(frame))
            .flat_map(|f| f.blocks.iter())
            .find(|b| b.path.block_name() == block)
            .unwrap_or_else(|| panic!("no block {block:?} in {frame}"))
    }

    fn without_comments(block: &AssembledBlock) -> Vec<Instruction> {
        block
            .instructions
            .iter()
            .filter(|instruction| !matches!(instruction, Instruction::Comment(_)))
            .cloned()
            .collect()
    }

    fn print_external() -> ExternalCallable {
        ExternalCallable {
            name: "print".to_owned(),
            path: "lib:print".parse().expect("path"),
            parameters: vec!["value".to_owned()],
        }
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let error = assemble_source("x = y\n", &[]).expect_err("y is undefined");

        assert!(matches!(
            error,
            CompileError::UnresolvedSymbol { ref name, ref location } if name == "y" && location.line == 1
        ));
    }

    #[test]
    fn enclosing_variables_are_not_captured() {
        let error = assemble_source(
            indoc! {"
                x = 1
                def f():
                    return x
            "},
            &[],
        )
        .expect_err("closures are unsupported");

        assert!(matches!(error, CompileError::Unsupported { .. }));
    }

    #[test]
    fn assigning_over_a_function_is_a_duplicate() {
        let error = assemble_source(
            indoc! {"
                def f():
                    pass
                f = 3
            "},
            &[],
        )
        .expect_err("f is a function");

        assert!(matches!(
            error,
            CompileError::DuplicateSymbol { ref name, ref layer, .. } if name == "f" && layer == "__module__"
        ));
    }

    #[test]
    fn calls_need_a_declared_function() {
        for source in ["g(1)\n", "g = 1\ng(1)\n"] {
            let error = assemble_source(source, &[]).expect_err("g is not a function");

            assert!(matches!(
                error,
                CompileError::UnresolvedSymbol { ref name, .. } if name == "g"
            ));
        }
    }

    #[test]
    fn externals_are_declared_once() {
        let error = assemble_source("pass\n", &[print_external(), print_external()])
            .expect_err("print twice");

        assert!(error.to_string().contains("`print` is declared more than once"));
    }

    #[test]
    fn wrong_argument_count_is_rejected() {
        let error = assemble_source("print(1, 2)\n", &[print_external()]).expect_err("arity");

        assert!(matches!(error, CompileError::MalformedProgram { location: Some(_), .. }));
    }

    #[test]
    fn function_values_are_rejected() {
        let error = assemble_source("def f():\n    pass\nx = f\n", &[]).expect_err("no function values");

        assert!(matches!(error, CompileError::MalformedProgram { .. }));
    }

    #[test]
    fn external_call_sequence() {
        let module = assemble_source("print(7)\n", &[print_external()]).expect("assembles");
        let body = without_comments(block(&module, "__module__", Some("0.body")));

        assert_eq!(
            body[1..],
            [
                Instruction::InitContext {
                    argc: 1,
                    callee: Callee::External
                },
                Instruction::BindParameters(vec![NameIndex("value".to_owned())]),
                Instruction::Invoke {
                    target: "lib:print".parse().expect("path"),
                    external: true
                },
                Instruction::EndCall { keep_result: true },
                Instruction::Pop,
            ]
        );
    }

    #[test]
    fn recursive_calls_resolve_to_their_own_frame() {
        let module = assemble_source(
            indoc! {"
                def fact(n):
                    if n <= 1:
                        return 1
                    return n * fact(n - 1)
            "},
            &[],
        )
        .expect("assembles");

        let fact = module
            .frames
            .iter()
            .position(|frame| frame.path.frame_name() == Some("__module__.fact"))
            .expect("fact frame");

        let tail = block(&module, "__module__.fact", Some("1.body1"));

        assert!(tail.instructions.iter().any(|instruction| matches!(
            instruction,
            Instruction::InitContext { argc: 1, callee: Callee::Frame(frame) } if frame.to_string() == format!("f{fact}")
        )));
    }

    #[test]
    fn conditional_links_precede_the_shared_pop() {
        let module = assemble_source(
            indoc! {"
                a = 1
                if a:
                    a = 2
                else:
                    a = 3
            "},
            &[],
        )
        .expect("assembles");

        let head = without_comments(block(&module, "__module__", Some("0.body")));
        let tail = &head[head.len() - 3..];

        assert!(matches!(tail[0], Instruction::BranchIf { when: true, .. }));
        assert!(matches!(tail[1], Instruction::BranchIf { when: false, .. }));
        assert_eq!(tail[2], Instruction::Pop);

        let root = without_comments(block(&module, "__module__", None));
        assert_eq!(root[0], Instruction::EnterFrame);
        assert!(root[1..].iter().all(|i| matches!(i, Instruction::Bridge(_))));
    }

    #[test]
    fn loop_test_checks_its_exit_before_the_body() {
        let module = assemble_source(
            indoc! {"
                x = 3
                while x:
                    x = x - 1
                y = x
            "},
            &[],
        )
        .expect("assembles");

        let test = without_comments(block(&module, "__module__", Some("2.test")));
        let targets = test
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::BranchIf { target, when } => {
                    Some((target.path.block_name().unwrap_or_default(), *when))
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(targets, vec![("2.cont", false), ("2.while", true)]);
        assert_eq!(test.last(), Some(&Instruction::Pop));
        assert_eq!(
            test.iter().filter(|instruction| **instruction == Instruction::Pop).count(),
            1
        );
    }

    #[test]
    fn source_lines_become_comments() {
        let module = assemble_source("x = 1\ny = 2\n", &[]).expect("assembles");
        let body = block(&module, "__module__", Some("0.body"));

        let comments = body
            .instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Comment(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(comments, vec!["1: x = 1", "2: y = 2"]);
    }
}
