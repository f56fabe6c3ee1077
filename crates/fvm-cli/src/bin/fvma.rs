use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use fvm::rom;

#[derive(Parser)]
#[command(name = "fvma")]
#[command(about = "Fox Virtual Machine assembler", version)]
struct Cli {
    /// Assembly source file
    input: PathBuf,

    /// ROM image to write; must end in `.fb`
    #[arg(default_value = "a.fb")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version land here too; only real usage errors
            // take the failure code.
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("fvma: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("could not open {}", cli.input.display()))?;

    let assembly = fvm::assemble(&source);
    for diagnostic in &assembly.diagnostics {
        eprintln!("fvma: {diagnostic}");
    }

    let mut clean = assembly.is_clean();
    if !cli.output.extension().is_some_and(|ext| ext == "fb") {
        eprintln!("fvma: output filename does not end with '.fb'");
        clean = false;
    }

    // Diagnostics suppress the artifact but the run itself succeeded.
    if !clean {
        eprintln!("fvma: problems were reported, so no ROM image was written");
        return Ok(ExitCode::SUCCESS);
    }

    fs::write(&cli.output, rom::encode(&assembly.rom))
        .with_context(|| format!("could not write {}", cli.output.display()))?;
    Ok(ExitCode::SUCCESS)
}
