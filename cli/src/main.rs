use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cto_generator::convert_dir;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Convert Google protobuf files to Composer CTO files
#[derive(Parser)]
#[command(name = "proto2cto", version)]
#[command(about = "Convert Google protobuf files to Composer CTO files", long_about = None)]
struct Cli {
    /// Directory searched recursively for `.proto` files
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Directory the generated `.cto` files are written to
    #[arg(short, long)]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match convert_dir(&cli.input_dir, &cli.output_dir) {
        Ok(generated) => {
            println!(
                "Converted {} proto file(s) into {}",
                generated.len(),
                cli.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
