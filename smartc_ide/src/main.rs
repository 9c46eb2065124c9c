//! # SmartC IDE Host
//!
//! Main entry point for the SmartC IDE host runtime.

use smartc_ide::{CompilerCommand, HostMode, HostRuntime, HostRuntimeConfig};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("smartc-ide");

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    let mut runtime = HostRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to create runtime: {}", e);
        process::exit(1);
    });

    if let Err(e) = runtime.run() {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<HostRuntimeConfig, String> {
    let mut config = HostRuntimeConfig {
        mode: HostMode::Interactive,
        ..HostRuntimeConfig::default()
    };
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--script" | "-s" => {
                let script_path = value(args, &mut i, "--script")?;
                let script_text = fs::read_to_string(script_path)
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                config.script = Some(script_text);
                config.mode = HostMode::Script;
            }
            "--interactive" | "-i" => {
                config.mode = HostMode::Interactive;
            }
            "--compiler" | "-c" => {
                let line = value(args, &mut i, "--compiler")?;
                config.compiler = Some(
                    CompilerCommand::parse(line)
                        .ok_or_else(|| "Empty compiler command".to_string())?,
                );
            }
            "--store" => {
                config.store_path = Some(PathBuf::from(value(args, &mut i, "--store")?));
            }
            "--help-url" => {
                config.help_url = Some(value(args, &mut i, "--help-url")?.to_string());
            }
            "--max-steps" => {
                let steps = value(args, &mut i, "--max-steps")?;
                config.max_steps = steps
                    .parse()
                    .map_err(|_| format!("Invalid max-steps value: {}", steps))?;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                print_usage(args.first().map(String::as_str).unwrap_or("smartc-ide"));
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    if config.compiler.is_none() {
        return Err("Missing --compiler".to_string());
    }

    Ok(config)
}

/// Takes the value following option `name`
fn value<'a>(args: &'a [String], i: &mut usize, name: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", name))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} --compiler <COMMAND> [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --compiler <COMMAND>  Compiler command line (JSON on stdin/stdout)");
    eprintln!("  -s, --script <FILE>       Run an input script instead of reading stdin");
    eprintln!("  -i, --interactive         Read commands from stdin (default)");
    eprintln!("  --store <FILE>            Keep program and options in FILE");
    eprintln!("  --help-url <URL>          Page opened by the help action");
    eprintln!("  --max-steps <N>           Maximum steps to run (0 = unlimited)");
    eprintln!("  -v, --verbose             Print the session log to stderr");
    eprintln!("  -h, --help                Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!(
        "  {} --compiler \"node smartc-cli.js\" --store ide.json",
        program
    );
    eprintln!(
        "  {} -c \"node smartc-cli.js\" --script demos/broken_line.sckeys",
        program
    );
}
