use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use multiclient_patcher::client::TIBIA_770_MULTICLIENT;
use multiclient_patcher::patcher::byte::ByteError;
use multiclient_patcher::patcher::file::{BackupStatus, FileError, FilePatcher};
use multiclient_patcher::patcher::Patched;

/// Tibia 7.70 Multiclient Patcher
#[derive(Debug, Parser)]
#[command(about, disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Path to the Tibia 7.70 client executable
    #[arg(value_name = "TIBIA.EXE", allow_hyphen_values = true)]
    path: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // any single argument is a path, even one that looks like a flag
    let Ok(cli) = Cli::try_parse() else {
        print_usage();
        return ExitCode::FAILURE;
    };

    match run(&cli.path) {
        Ok(()) => {
            println!("\nPatch completed successfully!");
            ExitCode::SUCCESS
        }
        Err(FileError::NotFound(path)) => {
            println!("ERROR: Tibia client not found at: {}", path.display());
            ExitCode::FAILURE
        }
        Err(FileError::Patch(err)) => {
            println!("ERROR: {err}");
            match err {
                ByteError::Mismatch { .. } => println!(
                    "This might not be a Tibia 7.70 client or it's already modified."
                ),
                ByteError::OutOfBounds { .. } => {
                    println!("This file is too small to be a Tibia 7.70 client.")
                }
            }
            println!("\nPatch failed!");
            ExitCode::FAILURE
        }
        Err(FileError::Io(err)) => {
            eprintln!("ERROR: {}: {err}", cli.path.display());
            println!("\nPatch failed!");
            ExitCode::FAILURE
        }
    }
}

/// Backs up and patches the client at `path`, printing progress as each step completes
fn run(path: &Path) -> Result<(), FileError<ByteError>> {
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    let backup = patcher.backup(path)?;
    println!("Patching Tibia client: {}", path.display());
    match backup.status {
        BackupStatus::Created => println!("Created backup: {}", backup.path.display()),
        BackupStatus::Existing => println!("Backup already exists: {}", backup.path.display()),
    }

    match patcher.apply(path)? {
        Patched::Applied => {
            let byte = patcher.inner();
            println!(
                "Patched byte at offset 0x{:X}: 0x{:02X} -> 0x{:02X}",
                byte.offset(),
                byte.original(),
                byte.replacement()
            );
            println!("Multiclient patch applied successfully!");
            println!("You can now run multiple Tibia clients simultaneously.");
        }
        Patched::AlreadyApplied => println!("Client is already patched for multiclient!"),
    }
    Ok(())
}

/// Prints usage in the same shape regardless of what was wrong with the arguments
fn print_usage() {
    let program = env::args()
        .next()
        .unwrap_or_else(|| env!("CARGO_BIN_NAME").to_owned());

    println!("Tibia 7.70 Multiclient Patcher");
    println!("Usage:");
    println!("  {program} /path/to/Tibia.exe");
    println!();
    println!("Example:");
    println!("  {program} \"/home/user/.wine/drive_c/Program Files (x86)/Tibia/Tibia.exe\"");
}
