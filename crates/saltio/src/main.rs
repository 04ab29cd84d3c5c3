// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saltio - facility time-rental service.
//!
//! This is the binary entry point for the Saltio service.

use clap::{Parser, Subcommand};

mod doctor;
mod notifier;
mod serve;
mod shutdown;

/// Saltio - facility time-rental service.
#[derive(Parser, Debug)]
#[command(name = "saltio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Saltio service.
    Serve,
    /// Run diagnostic checks against the Saltio environment.
    Doctor {
        /// Run additional intensive checks.
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match saltio_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            saltio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Doctor { deep, plain }) => doctor::run_doctor(&config, deep, plain).await,
        None => {
            println!("saltio: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Config loads with defaults, no config file needed.
        let config =
            saltio_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.service.name, "saltio");
    }
}
