use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use fvm::{rom, RunError, StdHost, Vm};

#[derive(Parser)]
#[command(name = "fvmr")]
#[command(about = "Fox Virtual Machine runtime", version)]
struct Cli {
    /// ROM image to boot
    #[arg(long, default_value = "hardware/rom")]
    rom: PathBuf,

    /// Disk image, opened for read and write
    #[arg(long, default_value = "hardware/disk")]
    disk: PathBuf,
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
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let rom_bytes = match fs::read(&cli.rom) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("fvmr: could not access ROM {}: {err}", cli.rom.display());
            return ExitCode::from(2);
        }
    };

    let disk = match OpenOptions::new().read(true).write(true).open(&cli.disk) {
        Ok(disk) => disk,
        Err(err) => {
            eprintln!("fvmr: could not access disk {}: {err}", cli.disk.display());
            return ExitCode::from(2);
        }
    };

    let mut vm = Vm::new(rom::decode(&rom_bytes), StdHost::new(disk));
    match vm.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fvmr: {err}");
            eprint!("{}", fvm::traceback(&vm));
            match err {
                RunError::Allocation => ExitCode::from(3),
                _ => ExitCode::from(4),
            }
        }
    }
}
