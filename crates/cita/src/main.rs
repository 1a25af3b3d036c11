// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cita - appointment scheduling and availability service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cita_config::CitaConfig;

/// Cita - appointment scheduling and availability service.
#[derive(Parser, Debug)]
#[command(name = "cita", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Run diagnostic checks against the environment.
    Doctor {
        /// Also run slower checks (database integrity, memory).
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> CitaConfig {
    let loaded = match path {
        Some(path) => cita_config::load_and_validate_path(path),
        None => cita_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            cita_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Doctor { deep, plain } => {
            doctor::run_doctor(&config, cli.config.as_deref(), deep, plain).await
        }
        Commands::Config => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(cita_core::CitaError::Config(e.to_string())),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn doctor_flags_parse() {
        let cli = Cli::parse_from(["cita", "doctor", "--deep", "--plain"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Doctor {
                deep: true,
                plain: true
            })
        ));
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["cita"]);
        assert!(cli.command.is_none());
        let cli = Cli::parse_from(["cita", "--config", "/tmp/cita.toml", "serve"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/cita.toml")));
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&CitaConfig::default()).unwrap();
        assert!(rendered.contains("[server]"));
        assert!(rendered.contains("port = 8080"));
        assert!(rendered.contains("[scheduling]"));
    }
}
