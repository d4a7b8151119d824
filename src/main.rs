use std::{env, fs, io, path::Path};

use num_bigint::BigUint;
use tracing_subscriber::EnvFilter;

use urm::godel::{code_machine, decode_machine};
use urm::machine::listing::print_listing;
use urm::{Program, Vm, VmConfig};

const FLAGS: &[&str] = &["--encode", "--decode", "--listing", "--trace", "--help", "-h"];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() == 1 || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let encode = args.contains(&"--encode".to_string());
    let listing = args.contains(&"--listing".to_string());
    let trace = args.contains(&"--trace".to_string());
    let decode = args.contains(&"--decode".to_string());

    // positional arguments: the file (unless decoding), then numbers
    let positional = positional_args(&args);

    if decode {
        decode_numbers(&positional);
        return;
    }

    let Some((filename, inputs)) = positional.split_first() else {
        print_usage();
        std::process::exit(1);
    };

    ensure_extension(filename);
    let source = match fs::read_to_string(filename.as_str()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", filename, e);
            std::process::exit(1);
        }
    };

    let mut program = match Program::parse(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Parse error: {}:{}", filename, e);
            std::process::exit(1);
        }
    };

    if listing || encode {
        if let Err(e) = program.validate() {
            eprintln!("Validation error: {}", e);
            std::process::exit(1);
        }
    }

    if listing {
        print_listing(&program);
    }

    if encode {
        encode_program(&mut program);
        return;
    }

    let inputs = parse_inputs(inputs);
    run_program(&mut program, &inputs, trace);
}

/// Everything after the program name that is not a known flag, so a typo
/// like `-3` still reaches `parse_inputs`.
fn positional_args(args: &[String]) -> Vec<&String> {
    args.iter()
        .skip(1)
        .filter(|a| !FLAGS.contains(&a.as_str()))
        .collect()
}

fn print_usage() {
    println!("URM - Unbounded Register Machine");
    println!();
    println!("Usage:");
    println!("  urm <file.urm> [inputs...]      Run a program, x2.. = inputs, prints x1");
    println!("  urm --listing <file.urm>        Show the validated program");
    println!("  urm --encode <file.urm>         Print the program's Gödel numbers");
    println!("  urm --decode <n1> [n2...]       Rebuild a program from Gödel numbers");
    println!("  urm --trace <file.urm> [...]    Log every step (RUST_LOG=trace)");
    println!("  urm --help, -h                  Show this help");
}

fn ensure_extension(filename: &str) {
    let path = Path::new(filename);
    if path.extension().and_then(|e| e.to_str()) != Some("urm") {
        eprintln!("Error: expected a .urm file, got {}", filename);
        std::process::exit(1);
    }
}

fn parse_inputs(args: &[&String]) -> Vec<u64> {
    args.iter()
        .map(|a| match a.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: input '{}' is not a natural number", a);
                std::process::exit(1);
            }
        })
        .collect()
}

fn run_program(program: &mut Program, inputs: &[u64], trace: bool) {
    let mut vm = Vm::with_config(VmConfig { trace_steps: trace });
    let mut stdout = io::stdout();

    if let Err(e) = vm.run_and_emit(program, inputs, &mut stdout) {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

fn encode_program(program: &mut Program) {
    match code_machine(program) {
        Ok(codes) => {
            for (instruction, code) in program.instructions().zip(codes.iter()) {
                println!("{:<40} {}", instruction.to_string(), code);
            }
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            std::process::exit(1);
        }
    }
}

fn decode_numbers(args: &[&String]) {
    let mut numbers = Vec::with_capacity(args.len());
    for a in args {
        match a.parse::<BigUint>() {
            Ok(n) => numbers.push(n),
            Err(_) => {
                eprintln!("Error: '{}' is not a natural number", a);
                std::process::exit(1);
            }
        }
    }

    match decode_machine(&numbers) {
        Ok(program) => println!("{}", program),
        Err(e) => {
            eprintln!("Decode error: {}", e);
            std::process::exit(1);
        }
    }
}
