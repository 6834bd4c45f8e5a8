//! CLI for inspecting operation descriptors.
//!
//! Usage:
//!   just-link describe <encoding> [flags] [signature]   # Parse a descriptor
//!   just-link tokens <encoding>                         # Show the parse tree
//!   just-link encode <name>                             # Escape a member name
//!   just-link decode <name>                             # Unescape a member name

use just_linker::parser::{name_codec, parse_signature, parse_to_token_tree};
use just_linker::runner::linker::{MethodSignature, OperationDescriptor, OperationKind};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("-h") | Some("--help") => {
            print_usage();
            process::exit(0);
        }
        Some("describe") if args.len() >= 3 && args.len() <= 5 => {
            describe(&args[2], args.get(3), args.get(4));
        }
        Some("tokens") if args.len() == 3 => match parse_to_token_tree(&args[2]) {
            Ok(tree) => println!("{}", tree),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        Some("encode") if args.len() == 3 => println!("{}", name_codec::encode(&args[2])),
        Some("decode") if args.len() == 3 => println!("{}", name_codec::decode(&args[2])),
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("just-link - operation descriptor tool");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  just-link describe <encoding> [flags] [signature]");
    eprintln!("                              Parse a descriptor, e.g.");
    eprintln!("                              describe GET:PROPERTY:x 1 \"(Object)int\"");
    eprintln!("  just-link tokens <encoding> Show the parse tree of an encoding");
    eprintln!("  just-link encode <name>     Escape a member name");
    eprintln!("  just-link decode <name>     Unescape a member name");
}

fn describe(encoding: &str, flags: Option<&String>, signature: Option<&String>) {
    let flags = match flags.map(|f| f.parse::<u32>()) {
        None => 0,
        Some(Ok(f)) => f,
        Some(Err(e)) => {
            eprintln!("Invalid flags: {}", e);
            process::exit(1);
        }
    };
    let signature = match signature {
        Some(s) => match parse_signature(s) {
            Ok(sig) => sig,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => default_signature(encoding),
    };
    match OperationDescriptor::parse(encoding, signature, flags) {
        Ok(d) => {
            println!("{}", d);
            println!("  operation: {}", d.operation());
            println!("  name:      {}", d.name().unwrap_or("<from arguments>"));
            println!("  signature: {}", d.signature());
            println!("  flags:     {}", d.flags());
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Generic signature matching the calling convention of the encoding.
fn default_signature(encoding: &str) -> MethodSignature {
    let (operation, named) = match just_linker::parser::parse_operation(encoding) {
        Ok((op, name)) => (op, name.is_some()),
        Err(_) => return MethodSignature::generic(1),
    };
    let arity = match operation {
        OperationKind::Call => 2,
        OperationKind::New => 1,
        op if op.is_set() => {
            if named {
                2
            } else {
                3
            }
        }
        _ => {
            if named {
                1
            } else {
                2
            }
        }
    };
    MethodSignature::generic(arity)
}
