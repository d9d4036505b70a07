// ==============================================================================
// CLI for the Avro Schema to IDL Converter
// ==============================================================================
//
//   avsc2avdl [--redeclare] INPUT OUTPUT
//
// `-` reads the schema from stdin or writes the IDL to stdout. Every failure
// class exits with its own status (see `ConvertError::exit_code`).

use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use avsc2avdl::{ConvertError, Converter, DeclarationPolicy, USAGE};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`).
const LOG_ENV: &str = "AVSC2AVDL_LOG";

// ==============================================================================
// CLI Argument Definitions
// ==============================================================================

#[derive(Debug)]
struct Args {
    input: String,
    output: String,
    policy: DeclarationPolicy,
}

enum Parsed {
    Run(Args),
    Help,
    Version,
}

fn parse_args(args: impl IntoIterator<Item = std::ffi::OsString>) -> Result<Parsed, ConvertError> {
    use lexopt::prelude::*;

    let usage = |message: String| ConvertError::Usage { message };

    let mut parser = lexopt::Parser::from_args(args);
    let mut positional = Vec::new();
    let mut policy = DeclarationPolicy::Deduplicate;

    while let Some(arg) = parser.next().map_err(|e| usage(e.to_string()))? {
        match arg {
            Short('h') | Long("help") => return Ok(Parsed::Help),
            Short('V') | Long("version") => return Ok(Parsed::Version),
            Long("redeclare") => policy = DeclarationPolicy::Redeclare,
            Value(value) => positional.push(
                value
                    .into_string()
                    .map_err(|v| usage(format!("argument is not valid UTF-8: {v:?}")))?,
            ),
            _ => return Err(usage(arg.unexpected().to_string())),
        }
    }

    let [input, output]: [String; 2] = positional.try_into().map_err(|given: Vec<String>| {
        usage(format!(
            "expected 2 arguments (input and output), got {}",
            given.len()
        ))
    })?;
    Ok(Parsed::Run(Args {
        input,
        output,
        policy,
    }))
}

// ==============================================================================
// Entry Point
// ==============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .without_time()
        .init();

    let result = parse_args(std::env::args_os().skip(1)).and_then(|parsed| match parsed {
        Parsed::Help => {
            println!("{USAGE}");
            println!();
            println!("Converts an Avro JSON schema (.avsc) into Avro IDL (.avdl).");
            println!("Use `-` as INPUT to read stdin, or as OUTPUT to write stdout.");
            println!();
            println!("Options:");
            println!(
                "  --redeclare    declare a repeated inline record or enum every time it appears"
            );
            println!("  -h, --help     print this help");
            println!("  -V, --version  print the version");
            Ok(())
        }
        Parsed::Version => {
            println!("avsc2avdl {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Parsed::Run(args) => run(&args),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}

fn run(args: &Args) -> Result<(), ConvertError> {
    tracing::debug!(?args, "starting conversion");

    let mut converter = Converter::new();
    converter.policy(args.policy);

    let avdl = if args.input == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| ConvertError::Read {
                path: PathBuf::from("<stdin>"),
                source: e,
            })?;
        converter.convert_str(&source, "<stdin>")?
    } else {
        converter.convert(&args.input)?
    };

    if args.output == "-" {
        write_stdout(&avdl)
    } else {
        let path = Path::new(&args.output);
        fs::write(path, &avdl).map_err(|e| ConvertError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        println!("Conversion successful. AVDL written to: {}", shown.display());
        Ok(())
    }
}

/// Write to stdout, treating a closed pipe (`avsc2avdl in.avsc - | head`) as
/// success.
fn write_stdout(content: &str) -> Result<(), ConvertError> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(content.as_bytes()).and_then(|()| stdout.flush()) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(ConvertError::Write {
            path: PathBuf::from("<stdout>"),
            source: e,
        }),
        _ => Ok(()),
    }
}
