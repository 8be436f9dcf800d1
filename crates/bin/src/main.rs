use clap::Parser;

mod cli;
mod commands;
mod session;
mod templates;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        // Serve with defaults (and environment overrides) when no subcommand is given
        None => {
            let cli = Cli::parse_from(["meref-portal", "serve"]);
            match cli.command {
                Some(Commands::Serve(args)) => commands::serve::run(&args).await,
                _ => Err("failed to build default serve arguments".into()),
            }
        }
    }
}

