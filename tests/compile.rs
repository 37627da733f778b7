use alloyc::{
    CodegenOptions, CompiledModule, Compiler, DirectoryEmitter, ExternalCallable, MemoryEmitter,
    error::CompileError, frontend::SourceFile, write_datapack,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn compiler() -> Compiler {
    Compiler::new("alloy").with_options(CodegenOptions {
        comments: false,
        ..CodegenOptions::default()
    })
}

fn compile(source: &str) -> Result<CompiledModule, CompileError> {
    compiler().compile_module("main", &SourceFile::from_memory(source))
}

fn text<'a>(module: &'a CompiledModule, id: &str) -> &'a str {
    &module
        .procedure(id)
        .unwrap_or_else(|| panic!("no procedure {id}"))
        .text
}

#[test]
fn arithmetic_and_return() {
    let module = compile("x = 1 + 2; return x\n").expect("compiles");
    let body = text(&module, "alloy:main/__module__/0.body");

    assert!(body.contains("scoreboard players operation t0 __asm__ += t1 __asm__\n"));
    assert!(body.ends_with(
        "data modify entity @s ArmorItems[0].tag.Stack[0] set from entity @s ArmorItems[0].tag.Stack[1]\n\
         scoreboard players set ret __asm__ 1\n\
         tag @s add __ret__\n"
    ));
}

#[test]
fn while_loop_runs_through_its_test_block() {
    let module = compile(indoc! {"
        x = 3
        while x > 0:
            x = x - 1
        y = x
    "})
    .expect("compiles");

    let test = text(&module, "alloy:main/__module__/2.test");
    let body = text(&module, "alloy:main/__module__/2.while");

    let exit = test
        .find("execute if score ret __asm__ matches 0 if score test __asm__ matches 0 run function alloy:main/__module__/2.cont\n")
        .expect("exit branch");
    let repeat = test
        .find("execute if score ret __asm__ matches 0 unless score test __asm__ matches 0 run function alloy:main/__module__/2.while\n")
        .expect("body branch");
    assert!(exit < repeat);

    let head = text(&module, "alloy:main/__module__/0.body");
    assert!(!head.contains("2.cont"));
    assert!(body.ends_with(
        "execute if score ret __asm__ matches 0 run function alloy:main/__module__/2.test\n"
    ));
}

#[test]
fn recursive_function() {
    let module = compile(indoc! {"
        def fact(n):
            if n <= 1:
                return 1
            return n * fact(n - 1)

        result = fact(5)
    "})
    .expect("compiles");

    let tail = text(&module, "alloy:main/__module__.fact/1.body1");

    assert!(tail.contains("run function alloy:main/__module__.fact\n"));
    assert!(tail.contains("kill @e[tag=__ret__,tag=__volatile__,limit=1]\n"));
    assert!(module.procedure("alloy:main/__module__.fact/2.true").is_some());
}

#[test]
fn external_callables() {
    let compiler = compiler().with_external(ExternalCallable {
        name: "print".to_owned(),
        path: "lib:print".parse().expect("path"),
        parameters: vec!["value".to_owned()],
    });

    let module = compiler
        .compile_module("main", &SourceFile::from_memory("print(\"hello\")\n"))
        .expect("compiles");
    let body = text(&module, "alloy:main/__module__/0.body");

    assert!(body.contains(
        "data modify entity @e[tag=__dest__,limit=1] ArmorItems[0].tag.Names.value set from entity @e[tag=__dest__,limit=1] ArmorItems[0].tag.Pre[0]\n\
         execute as @e[tag=__dest__,limit=1] run function lib:print\n\
         tag @e[tag=__dest__,limit=1] add __ret__\n\
         tag @e[tag=__dest__] remove __dest__\n"
    ));
}

#[test]
fn escaped_commands_pass_through() {
    let module = compile("'/say hi'\n").expect("compiles");

    assert_eq!(text(&module, "alloy:main/__module__/0.body"), "say hi\n");
}

#[test]
fn smallest_integer_literal_compiles() {
    let module = compile("x = -2147483648\n").expect("compiles");
    let launcher = text(&module, "alloy:main");

    assert!(launcher.contains("{v:-2147483648,t:\"int\"}"));
}

#[test]
fn unsupported_constructs_report_their_line() {
    let error = compile(indoc! {"
        xs = 1
        for x in xs:
            pass
    "})
    .expect_err("for loops are unsupported");

    let CompileError::Unsupported { location, .. } = &error else {
        panic!("expected an unsupported construct error, got {error:?}");
    };

    assert_eq!(location.line, 2);
    assert_eq!(location.text, "for x in xs:");
}

#[test]
fn undefined_names_fail() {
    assert!(matches!(
        compile("return y\n"),
        Err(CompileError::UnresolvedSymbol { name, .. }) if name == "y"
    ));
}

#[test]
fn output_is_deterministic() {
    let source = indoc! {"
        def f(a, b):
            return a % b == 0 and a > b
        if f(9, 3):
            x = 1 < 2 < 3
        else:
            x = not True
    "};

    let first = compile(source).expect("compiles");
    let second = compile(source).expect("compiles");

    assert_eq!(first, second);
}

#[test]
fn datapack_contains_every_module() {
    let temp = mktemp::Temp::new_dir().expect("temp dir");
    let root = temp.to_path_buf();

    let compiler = compiler();
    let modules = ["main", "other"]
        .into_iter()
        .map(|name| {
            compiler
                .compile_module(name, &SourceFile::from_memory("x = 1\n"))
                .expect("compiles")
        })
        .collect::<Vec<_>>();

    let mut memory = MemoryEmitter::new();
    write_datapack(&modules, &mut memory).expect("writes to memory");
    assert!(memory.finished);
    assert!(memory.procedures.contains_key("alloy:other/__module__/0.body"));

    let mut directory = DirectoryEmitter::new(&root).with_pack_format(7);
    write_datapack(&modules, &mut directory).expect("writes to disk");

    for id in memory.procedures.keys() {
        let (namespace, rest) = id.split_once(':').expect("namespaced id");
        let file = root
            .join("data")
            .join(namespace)
            .join("functions")
            .join(format!("{rest}.mcfunction"));

        assert_eq!(
            std::fs::read_to_string(&file).expect("procedure file"),
            memory.procedures[id]
        );
    }

    let metadata = std::fs::read_to_string(root.join("pack.mcmeta")).expect("pack.mcmeta");
    assert!(metadata.contains("\"pack_format\":7"));
}
