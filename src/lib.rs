//! Compiler from Alloy, a small Python-flavored language, to Minecraft
//! datapack procedures.
//!
//! A module goes through the following steps:
//! 1. Lexing and parsing into an AST ([`frontend`]).
//! 2. Splitting into frames and blocks, with expressions and statements
//!    lowered to stack operations ([`middle`]).
//! 3. Assembly, stack verification and rendering ([`backend`]).

use tracing::info;

use crate::{
    error::{CompileError, Result},
    frontend::{SourceFile, parser::Parser},
    middle::{
        cfg::{self, build_module},
        path::Path,
    },
};

pub mod backend;
pub mod error;
pub mod frontend;
pub mod index;
pub mod middle;

pub use backend::{
    assembler::ExternalCallable,
    emit::{
        CodegenOptions, CompiledModule, DirectoryEmitter, Emitter, MemoryEmitter, Procedure,
        write_datapack,
    },
};

/// Compiles modules into one namespace
#[derive(Debug, Clone)]
pub struct Compiler {
    namespace: String,
    options: CodegenOptions,
    externals: Vec<ExternalCallable>,
}

impl Compiler {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            options: CodegenOptions::default(),
            externals: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: CodegenOptions) -> Self {
        self.options = options;
        self
    }

    /// Makes a pre-written procedure callable by name from every module
    pub fn with_external(mut self, external: ExternalCallable) -> Self {
        self.externals.push(external);
        self
    }

    fn module_path(&self, module_name: &str) -> Result<Path> {
        Path::new(Some(self.namespace.as_str()), Some(module_name), None, None)
            .map_err(|error| CompileError::malformed(format!("invalid module path: {error}")))
    }

    /// Parses a module and builds its control flow graph without assembling
    /// it.
    pub fn build_cfg(&self, module_name: &str, source: &SourceFile) -> Result<cfg::Module> {
        let path = self.module_path(module_name)?;
        let ast = Parser::parse_module(source)?;

        build_module(source, path, &ast)
    }

    pub fn compile_module(&self, module_name: &str, source: &SourceFile) -> Result<CompiledModule> {
        let module = self.build_cfg(module_name, source)?;
        let assembled = backend::assembler::assemble(source, &module, &self.externals)?;
        let layouts = backend::verify::verify(&assembled)?;
        let compiled = backend::emit::render_module(&assembled, &layouts, self.options)?;

        info!(
            module = %compiled.path,
            procedures = compiled.procedures.len(),
            "compiled module"
        );

        Ok(compiled)
    }
}
