mod cli; // Declare the cli module

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand}; // Use clap for argument parsing

/// Keel: application bootstrap and configuration tooling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Project directory holding `.env`, `config/` and `bootstrap/cache/`
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot the application and print what it resolved
    About,
    /// Inspect and cache configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the value at a dot-separated key as JSON
    Get {
        /// The key to look up, e.g. `database.connections.main.host`
        key: String,
    },
    /// Snapshot the configuration directory into the cache file
    Cache,
    /// Remove the configuration cache file
    Clear,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command-line arguments
    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let result = match args.command {
        Some(Commands::About) => cli::about(&args.base_path).await,
        Some(Commands::Config { command }) => match command {
            ConfigCommand::Get { key } => cli::config_get(&args.base_path, &key),
            ConfigCommand::Cache => cli::config_cache(&args.base_path),
            ConfigCommand::Clear => cli::config_clear(&args.base_path),
        },
        None => cli::serve(&args.base_path).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
