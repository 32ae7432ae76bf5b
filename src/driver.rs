use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
    time::Instant,
};

use log::{debug, info};

use crate::{
    ast::Node,
    backend::TargetOS,
    codegen::generate_for_target,
    utils::errors::{CompileError, CompileResult},
};

/// Generate assembly for a whole program in memory.
pub fn compile(ast: &Node, target_os: Box<dyn TargetOS>) -> CompileResult<String> {
    info!("Compiling {} nodes for {}", ast.node_count(), target_os.name());
    generate_for_target(ast, target_os)
}

/// Generate assembly and persist it to `path`.
///
/// The file is only touched once generation has fully succeeded, so a failed
/// run never leaves a truncated artifact behind.
pub fn compile_to_file(ast: &Node, path: &Path, target_os: Box<dyn TargetOS>) -> CompileResult<String> {
    let output = compile(ast, target_os)?;
    fs::write(path, &output)
        .map_err(|e| CompileError::FileWriteError(format!("{}: {}", path.display(), e)))?;
    info!("Assembly written to {}", path.display());
    Ok(output)
}

/// Whether both `nasm` and `ld` can be launched.
pub fn tools_available() -> bool {
    ["nasm", "ld"].iter().all(|tool| {
        Command::new(tool)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    })
}

/// Assemble `asm_file` with NASM and link it into a freestanding executable.
/// Returns the elapsed time in seconds.
pub fn assemble_and_link(asm_file: &Path, exe_file: &Path, verbose: bool) -> CompileResult<f64> {
    let start_time = Instant::now();
    let obj_file = exe_file.with_extension("o");

    if verbose {
        println!(" Assembling {} and linking {}", asm_file.display(), exe_file.display());
    }

    debug!("nasm -f elf64 {} -o {}", asm_file.display(), obj_file.display());
    let as_result = Command::new("nasm")
        .arg("-f")
        .arg("elf64")
        .arg(asm_file)
        .arg("-o")
        .arg(&obj_file)
        .output()
        .map_err(|e| CompileError::compilation_error("assembly", format!("Failed to invoke nasm: {}", e)))?;
    if !as_result.status.success() {
        return Err(CompileError::compilation_error(
            "assembly",
            format!("Assembler failed: {}", String::from_utf8_lossy(&as_result.stderr)),
        ));
    }

    debug!("ld {} -o {}", obj_file.display(), exe_file.display());
    let link_result = Command::new("ld")
        .arg(&obj_file)
        .arg("-o")
        .arg(exe_file)
        .output()
        .map_err(|e| CompileError::compilation_error("linking", format!("Failed to invoke linker: {}", e)))?;
    if !link_result.status.success() {
        return Err(CompileError::compilation_error(
            "linking",
            format!("Linker failed: {}", String::from_utf8_lossy(&link_result.stderr)),
        ));
    }

    // Clean up object file
    let _ = fs::remove_file(&obj_file);

    let linking_time = start_time.elapsed().as_secs_f64();
    if verbose {
        println!(" Assembly and linking completed in {:.3}s", linking_time);
    }
    Ok(linking_time)
}
