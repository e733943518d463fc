//! MetaScan CLI: analyze or clean local images without running the server.
//!
//! Reads the same environment configuration as the API (`MAX_FILE_SIZE_MB`,
//! `ALLOWED_EXTENSIONS`, `GEOCODING_ENABLED`, ...).

use clap::{Parser, Subcommand};
use metascan_cli::{analyze_file, clean_file, init_tracing, render_json};
use metascan_core::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metascan", about = "Image privacy analyzer", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the privacy report for an image as JSON
    Analyze {
        /// Path to the image
        file: PathBuf,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Write a copy of an image with its metadata removed
    Clean {
        /// Path to the image
        file: PathBuf,
        /// Output path (default: `<stem>_clean.<ext>` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;

    match cli.command {
        Commands::Analyze { file, pretty } => {
            let report = analyze_file(&config, &file).await?;
            println!("{}", render_json(&report, pretty)?);
        }
        Commands::Clean {
            file,
            output,
            pretty,
        } => {
            let summary = clean_file(&config, &file, output.as_deref())?;
            println!("{}", render_json(&summary, pretty)?);
        }
    }

    Ok(())
}
