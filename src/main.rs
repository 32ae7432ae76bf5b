use clap::Parser;
use minic::{
    ast::{print_ast, Node},
    backend::target_os_from_name,
    demos::{self, Demo},
    driver,
    utils::config::assembly::FILE_EXTENSION,
    CompileError, CompileResult,
};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Backend that lowers typed syntax trees to NASM x86-64 assembly",
    long_about = "Backend that lowers typed syntax trees to NASM x86-64 assembly.\n\
                 Programs are built in memory from the bundled demo set, lowered with a\n\
                 single-accumulator stack discipline, and optionally assembled and linked\n\
                 into a freestanding executable that exits with main's return value.\n\
                 \n\
                 Example usage:\n\
                 minic answer                     # Compile to answer.asm and link ./answer\n\
                 minic arith -o out.asm           # Specify output file\n\
                 minic calls --print-asm          # Print generated assembly\n\
                 minic loop --show-ast --no-link  # Dump the tree, only write the .asm\n\
                 minic --list                     # List the available programs"
)]
struct Cli {
    // Name of the demo program to compile
    #[arg(required_unless_present = "list")]
    program: Option<String>,

    // Output file path (defaults to <program>.asm)
    #[arg(short, long)]
    output: Option<PathBuf>,

    // Operating system the entry routine exits through
    #[arg(long, default_value = "linux", value_parser = validate_target_os)]
    os: String,

    // List the available demo programs
    #[arg(short, long)]
    list: bool,

    // Print generated assembly
    #[arg(short = 'a', long)]
    print_asm: bool,

    // Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    // Show compilation timing
    #[arg(short, long)]
    timing: bool,

    // Show the syntax tree before code generation
    #[arg(long)]
    show_ast: bool,

    // Skip assembly and linking (only generate the .asm file)
    #[arg(long)]
    no_link: bool,
}

// Compilation statistics for performance analysis
#[derive(Debug, Default)]
struct CompilationStats {
    build_time: f64,
    codegen_time: f64,
    linking_time: f64,
    total_time: f64,
    ast_size: usize,
    functions: usize,
    assembly_lines: usize,
}

fn validate_target_os(s: &str) -> Result<String, String> {
    match target_os_from_name(s) {
        Some(_) => Ok(s.to_string()),
        None => Err(format!("Unsupported operating system: {}. Supported: linux, freebsd", s)),
    }
}

// Print error message and exit with error code
fn fatal(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn determine_output_path(program: &str, output: &Option<PathBuf>) -> PathBuf {
    match output {
        Some(path) => path.clone(),
        None => {
            let mut path = PathBuf::from(program);
            path.set_extension(FILE_EXTENSION);
            path
        }
    }
}

fn list_programs() {
    println!("Available programs:");
    for demo in demos::all() {
        println!("  {:<8} exit {:>3}  {}", demo.name, demo.expected_exit_status, demo.description);
    }
}

fn find_program(name: &str) -> CompileResult<&'static Demo> {
    demos::by_name(name).ok_or_else(|| {
        CompileError::compilation_error(
            "program lookup",
            format!("Unknown program '{}'. Available: {}", name, demos::names().join(", ")),
        )
    })
}

fn build_phase(demo: &Demo, stats: &mut CompilationStats, verbose: bool) -> Node {
    let start = Instant::now();
    let ast = (demo.build)();
    stats.build_time = start.elapsed().as_secs_f64();
    stats.ast_size = ast.node_count();
    stats.functions = ast.children().len();

    if verbose {
        println!(" Built '{}' in {:.3}s", demo.name, stats.build_time);
        println!("  {} nodes, {} top-level declarations", stats.ast_size, stats.functions);
    }
    ast
}

fn code_generation_phase(
    ast: &Node,
    output_path: &Path,
    args: &Cli,
    stats: &mut CompilationStats,
) -> CompileResult<String> {
    let start = Instant::now();
    let target_os = target_os_from_name(&args.os).ok_or_else(|| {
        CompileError::compilation_error("target detection", format!("Unsupported operating system: {}", args.os))
    })?;
    let output = driver::compile_to_file(ast, output_path, target_os)?;
    stats.codegen_time = start.elapsed().as_secs_f64();
    stats.assembly_lines = output.lines().filter(|line| !line.trim().is_empty()).count();

    if args.verbose {
        println!(" Code generation completed in {:.3}s", stats.codegen_time);
        println!("  Generated {} assembly lines", stats.assembly_lines);
        println!(" Assembly written to: {}", output_path.display());
    }
    Ok(output)
}

fn compile(program: &str, args: &Cli) -> CompileResult<CompilationStats> {
    let start_time = Instant::now();
    let mut stats = CompilationStats::default();
    let demo = find_program(program)?;

    if args.verbose {
        println!(" Starting compilation of: {} ({})", demo.name, demo.description);
    }

    let ast = build_phase(demo, &mut stats, args.verbose);

    if args.show_ast {
        println!("\n Abstract Syntax Tree:");
        print!("{}", print_ast(&ast));
    }

    let output_path = determine_output_path(program, &args.output);
    let assembly = code_generation_phase(&ast, &output_path, args, &mut stats)?;

    if args.print_asm {
        println!("\n Generated Assembly:");
        print!("{}", assembly);
    }

    if !args.no_link {
        let exe_file = output_path.with_extension("");
        stats.linking_time = driver::assemble_and_link(&output_path, &exe_file, args.verbose)?;
        if args.verbose {
            println!(" Executable created: {}", exe_file.display());
        }
    }

    stats.total_time = start_time.elapsed().as_secs_f64();
    Ok(stats)
}

fn print_stats(stats: &CompilationStats) {
    println!("\n Compilation Statistics:");
    println!("+---------------------+-----------+");
    println!("| Phase               | Time (s)  |");
    println!("+---------------------+-----------+");
    println!("| Tree Construction   | {:>9.3} |", stats.build_time);
    println!("| Code Generation     | {:>9.3} |", stats.codegen_time);
    println!("| Assembly + Linking  | {:>9.3} |", stats.linking_time);
    println!("+---------------------+-----------+");
    println!("| Total Time          | {:>9.3} |", stats.total_time);
    println!("+---------------------+-----------+");

    println!("\n Code Metrics:");
    println!("  - AST Nodes:          {}", stats.ast_size);
    println!("  - Functions:          {}", stats.functions);
    println!("  - Assembly Lines:     {}", stats.assembly_lines);
}

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    if args.list {
        list_programs();
        return;
    }

    let program = match &args.program {
        Some(program) => program.clone(),
        None => fatal("No program given"),
    };

    match compile(&program, &args) {
        Ok(stats) => {
            if args.timing {
                print_stats(&stats);
            }
            if args.verbose {
                println!("Compilation successful!");
            }
        }
        Err(e) => fatal(&format!("Compilation failed: {}", e)),
    }
}
