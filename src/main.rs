use std::{path::PathBuf, process::ExitCode};

use alloyc::{
    CodegenOptions, Compiler, DirectoryEmitter, ExternalCallable,
    backend::emit::DEFAULT_PACK_FORMAT,
    frontend::{SourceFile, SourceFileOrigin},
    middle::path::Path,
    write_datapack,
};
use clap::{CommandFactory, Parser as ClapParser, error::ErrorKind};
use colored::Colorize;
use indoc::indoc;
use tracing::debug;

#[derive(Debug, ClapParser)]
#[command(
    version,
    about,
    long_about = None,
    after_help = indoc! {"
        Each source file becomes a module named after its file stem. Run the
        module with `/function <namespace>:<module>`.

        Set ALLOYC_LOG (e.g. `ALLOYC_LOG=debug`) to see compiler logs.
    "}
)]
pub struct Args {
    source_files: Vec<PathBuf>,

    /// Datapack directory to write
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Namespace the procedures are generated in
    #[arg(short, long, default_value = "alloy")]
    namespace: String,

    /// Description written to pack.mcmeta
    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value_t = DEFAULT_PACK_FORMAT)]
    pack_format: u32,

    /// Print a trace line per instruction to players with a positive
    /// __DEBUG__ score
    #[arg(long)]
    debug: bool,

    /// Omit source line and instruction comments
    #[arg(long)]
    no_comments: bool,

    /// Report data commands that fail at runtime
    #[arg(long)]
    fail_check: bool,

    /// Declare a pre-written procedure, e.g. `print=lib:print(value)`
    #[arg(long = "extern", value_name = "NAME=NS:PATH(PARAMS)", value_parser = parse_external)]
    externals: Vec<ExternalCallable>,

    /// Print each module's control flow graph before compiling it
    #[arg(long)]
    print_cfg: bool,
}

fn parse_external(s: &str) -> Result<ExternalCallable, String> {
    let (name, rest) = s
        .split_once('=')
        .ok_or("expected NAME=namespace:path(params)")?;

    let (path, parameters) = match rest.split_once('(') {
        Some((path, parameters)) => (
            path,
            parameters
                .strip_suffix(')')
                .ok_or("missing `)` after the parameter list")?,
        ),
        None => (rest, ""),
    };

    if name.is_empty() {
        return Err("missing callable name".to_owned());
    }

    Ok(ExternalCallable {
        name: name.to_owned(),
        path: path.parse::<Path>().map_err(|error| error.to_string())?,
        parameters: parameters
            .split(',')
            .map(str::trim)
            .filter(|parameter| !parameter.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_env("ALLOYC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing();

    if args.source_files.is_empty() {
        Args::command()
            .error(ErrorKind::MissingRequiredArgument, "Missing source files!")
            .exit();
    }

    for source_file in &args.source_files {
        if !source_file.exists() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Source file '{}' does not exist!", source_file.display()),
                )
                .exit()
        }

        if !source_file.is_file() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Input path '{}' is not a file!", source_file.display()),
                )
                .exit()
        }
    }

    let mut compiler = Compiler::new(args.namespace.as_str()).with_options(CodegenOptions {
        debug: args.debug,
        fail_check: args.fail_check,
        comments: !args.no_comments,
    });

    for external in args.externals {
        compiler = compiler.with_external(external);
    }

    /* Read in and compile source files */

    let mut modules = Vec::new();
    let mut failed = false;

    for path in args.source_files {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) => Args::command()
                .error(
                    ErrorKind::Io,
                    format!("Failed to read '{}': {error}", path.display()),
                )
                .exit(),
        };

        let module_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let source = SourceFile::new(contents, SourceFileOrigin::File(path));

        if args.print_cfg {
            match compiler.build_cfg(&module_name, &source) {
                Ok(module) => println!("{module}"),
                Err(error) => {
                    eprint!("{}", error.render(&source));
                    failed = true;
                    continue;
                }
            }
        }

        match compiler.compile_module(&module_name, &source) {
            Ok(module) => modules.push(module),
            Err(error) => {
                eprint!("{}", error.render(&source));
                failed = true;
            }
        }
    }

    // Nothing is written unless every module compiled
    if failed {
        return ExitCode::FAILURE;
    }

    let mut emitter = DirectoryEmitter::new(&args.out)
        .with_pack_format(args.pack_format)
        .with_description(args.description);

    if let Err(error) = write_datapack(&modules, &mut emitter) {
        eprintln!("{} {error}", "error:".red().bold());
        return ExitCode::FAILURE;
    }

    debug!(out = %emitter.root().display(), "done");

    ExitCode::SUCCESS
}
