mod cli;

use clap::Parser;
use cli::{Cli, Commands, Format};
use icss_core::{check_with, compile_with, CompileError, Options, Prelude};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn run(command: Commands) -> Result<(), ExitCode> {
    match command {
        Commands::Build {
            input,
            output,
            prelude,
            format,
        } => {
            let (source, options) = prepare(&input, prelude.as_deref())?;
            let css = compile_with(&source, &options).map_err(|err| report(&input, err, format))?;
            match output {
                Some(path) => fs::write(&path, css).map_err(|err| {
                    eprintln!("Failed to write {}: {}", path.display(), err);
                    ExitCode::FAILURE
                })?,
                None => print!("{}", css),
            }
            Ok(())
        }
        Commands::Check {
            input,
            prelude,
            format,
        } => {
            let (source, options) = prepare(&input, prelude.as_deref())?;
            check_with(&source, &options).map_err(|err| report(&input, err, format))?;
            tracing::info!(file = %input.display(), "no problems found");
            Ok(())
        }
    }
}

fn prepare(input: &Path, prelude: Option<&Path>) -> Result<(String, Options), ExitCode> {
    let source = fs::read_to_string(input).map_err(|err| {
        eprintln!("Failed to read {}: {}", input.display(), err);
        ExitCode::FAILURE
    })?;

    let prelude = match prelude {
        Some(path) => Prelude::load(path).map_err(|err| {
            eprintln!("{}", err);
            ExitCode::FAILURE
        })?,
        None => Prelude::new(),
    };

    Ok((source, Options { prelude }))
}

fn report(input: &Path, err: CompileError, format: Format) -> ExitCode {
    match (err, format) {
        (CompileError::Check(diagnostics), Format::Json) => {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{}", json),
                Err(err) => eprintln!("Failed to serialize diagnostics: {}", err),
            }
        }
        (CompileError::Check(diagnostics), Format::Text) => {
            for diagnostic in &diagnostics {
                eprintln!("{}:{}", input.display(), diagnostic);
            }
            eprintln!("{} error(s) found", diagnostics.len());
        }
        (CompileError::Parse(err), _) => eprintln!("{}:{}", input.display(), err),
        (other, _) => eprintln!("{}", other),
    }
    ExitCode::FAILURE
}
