// hackvm - VM to Hack assembly translator
// Translates a .vm file, or a directory of them, into one .asm file

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use hackvm::{TranslatorConfig, VmTranslator};
use log::debug;

fn main() {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut bootstrap: Option<bool> = None;
    let mut annotate = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a filename", args[i]);
                    process::exit(1);
                }
                output = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires a filename");
                    process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--bootstrap" => {
                bootstrap = Some(true);
                i += 1;
            }
            "--no-bootstrap" => {
                bootstrap = Some(false);
                i += 1;
            }
            "--annotate" => {
                annotate = true;
                i += 1;
            }
            "-v" | "--verbose" => {
                verbose = true;
                i += 1;
            }
            "-h" | "--help" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option '{}'", arg);
                print_usage(&args[0]);
                process::exit(1);
            }
            _ => {
                if input.is_some() {
                    eprintln!("Error: Multiple inputs specified");
                    process::exit(1);
                }
                input = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    let Some(input) = input else {
        eprintln!("Error: No input file or directory specified");
        print_usage(&args[0]);
        process::exit(1);
    };

    let mut config = match config_file {
        Some(path) => match TranslatorConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {}", err);
                process::exit(1);
            }
        },
        None => TranslatorConfig::default(),
    };

    // Command line flags win over the config file
    if bootstrap.is_some() {
        config.bootstrap = bootstrap;
    }
    if annotate {
        config.annotate = true;
    }
    debug!("Effective configuration: {:?}", config);

    if verbose {
        let target = output
            .clone()
            .unwrap_or_else(|| VmTranslator::default_output_path(&input));
        println!("Translating {} -> {}", input.display(), target.display());
    }

    let translator = VmTranslator::new(config);
    match translator.translate_path(&input, output.as_deref()) {
        Ok((written, summary)) => {
            if verbose {
                println!(
                    "Translated {} commands from {} unit(s) into {} lines{} at {}",
                    summary.commands,
                    summary.units,
                    summary.lines,
                    if summary.bootstrapped {
                        " (with bootstrap)"
                    } else {
                        ""
                    },
                    written.display()
                );
            }
        }
        Err(err) => {
            eprintln!("Translation error: {}", err);
            process::exit(1);
        }
    }
}

fn print_usage(program_name: &str) {
    let program_name = Path::new(program_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hackvm".to_string());
    println!("Usage: {} [options] <input.vm | directory>", program_name);
    println!();
    println!("Options:");
    println!("  -o, --output <file>    Output filename (default: input.asm, or dir/dir.asm)");
    println!("  --config <file>        TOML configuration file");
    println!("  --bootstrap            Always emit the Sys.init bootstrap");
    println!("  --no-bootstrap         Never emit the bootstrap");
    println!("  --annotate             Precede each command's code with a comment");
    println!("  -v, --verbose          Verbose output");
    println!("  -h, --help             Show this help message");
    println!();
    println!("Without --bootstrap/--no-bootstrap the bootstrap is emitted when");
    println!("some input defines Sys.init.");
    println!();
    println!("Examples:");
    println!("  {} SimpleAdd.vm               # Writes SimpleAdd.asm", program_name);
    println!("  {} FibonacciElement/          # Writes FibonacciElement/FibonacciElement.asm", program_name);
    println!("  {} -o out.asm --annotate Main.vm", program_name);
}
