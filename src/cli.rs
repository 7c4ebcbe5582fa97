//! Command-line interface module for the paid-user admin tool.
//!
//! This module contains all CLI argument parsing, command definitions,
//! and command execution logic.

use anyhow::Result;
use clap::{ArgGroup, Args, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::client_ops;
use crate::config::UserConfig;
use crate::server;
use crate::types::UserSelector;

/// Command-line interface for the paid-user admin tool
#[derive(Parser)]
#[command(name = "paid-admin")]
#[command(about = "Admin dashboard and CLI for managing paid users")]
#[command(version)]
#[command(
    after_help = "Server:\n  serve     Start the web dashboard\n\nUsers:\n  users     List all users with paid status\n  show      Show one user in detail\n  add       Mark a user as paid\n  remove    Remove the paid flag\n\nConfig:\n  config    Show or edit configuration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Selects the target user by uid or email (exactly one required)
#[derive(Args)]
#[command(group(ArgGroup::new("selector").required(true).multiple(false).args(["uid", "email"])))]
pub struct SelectorArgs {
    /// User UID (as shown in the identity console)
    #[arg(long)]
    pub uid: Option<String>,

    /// User email identifier
    #[arg(long)]
    pub email: Option<String>,
}

impl SelectorArgs {
    pub fn to_selector(&self) -> UserSelector {
        match (&self.uid, &self.email) {
            (Some(uid), _) => UserSelector::Uid(uid.clone()),
            (None, Some(email)) => UserSelector::Email(email.clone()),
            (None, None) => unreachable!("clap group guarantees one selector"),
        }
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the web dashboard
    Serve {
        /// Host to bind the server to (defaults to configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to run the server on (defaults to configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List all users with their paid status
    Users,

    /// Show one user in detail, including paid timestamps
    Show {
        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Mark a registered user as paid
    Add {
        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Remove the paid flag from a user
    Remove {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show all configuration values
    Show,
    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g. port, database_url)
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Show configuration file path
    Path,
}

/// Execute the CLI command
pub async fn run() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paid_admin=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    handle_command(cli.command).await
}

/// Handle individual commands
async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Serve { host, port } => handle_serve(host, port).await,

        Commands::Users => {
            let config = UserConfig::load()?;
            client_ops::list_users(&config).await
        }

        Commands::Show { selector } => {
            let config = UserConfig::load()?;
            client_ops::show_user(&config, &selector.to_selector()).await
        }

        Commands::Add { selector } => {
            let config = UserConfig::load()?;
            client_ops::add_user(&config, &selector.to_selector()).await
        }

        Commands::Remove { selector, force } => {
            let config = UserConfig::load()?;
            client_ops::remove_user(&config, &selector.to_selector(), force).await
        }

        Commands::Config { action } => handle_config(action).await,
    }
}

/// Handle the serve command
async fn handle_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = UserConfig::load()?;

    let actual_host = host.unwrap_or_else(|| config.server.host.clone());
    let actual_port = port.unwrap_or(config.server.port);

    server::run_server(actual_host, actual_port, config).await
}

/// Handle configuration management
async fn handle_config(action: Option<ConfigAction>) -> Result<()> {
    let action = action.unwrap_or(ConfigAction::Show);

    match action {
        ConfigAction::Show => {
            let config = UserConfig::load()?;
            println!("{}", config.display());
        }
        ConfigAction::Get { key } => {
            let config = UserConfig::load()?;
            match config.get(&key) {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!(
                        "\nAvailable keys: {}",
                        UserConfig::available_keys().join(", ")
                    );
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            // Operate on the stored file so env overrides never leak to disk
            let mut config = UserConfig::load_file()?;
            match config.set(&key, &value) {
                Ok(()) => {
                    config.save()?;
                    println!("✅ Set {} = {}", key, value);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!(
                        "\nAvailable keys: {}",
                        UserConfig::available_keys().join(", ")
                    );
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Reset { force } => {
            if !force {
                let confirm = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("This will reset all configuration to defaults. Continue?")
                    .default(false)
                    .interact()?;

                if !confirm {
                    println!("Reset cancelled");
                    return Ok(());
                }
            }

            let config = UserConfig::default();
            config.save()?;
            println!("✅ Configuration reset to defaults");
        }
        ConfigAction::Path => match UserConfig::config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn selector_prefers_uid_when_both_fields_exist() {
        let args = SelectorArgs {
            uid: Some("u1".into()),
            email: Some("a@example.com".into()),
        };
        assert!(matches!(args.to_selector(), UserSelector::Uid(uid) if uid == "u1"));
    }

    #[test]
    fn add_requires_a_selector() {
        let result = Cli::try_parse_from(["paid-admin", "add"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["paid-admin", "add", "--email", "a@example.com"]);
        assert!(result.is_ok());

        let result = Cli::try_parse_from([
            "paid-admin",
            "add",
            "--uid",
            "u1",
            "--email",
            "a@example.com",
        ]);
        assert!(result.is_err(), "uid and email are mutually exclusive");
    }
}
