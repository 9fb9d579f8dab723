//! Narrator Command-Line Interface
//!
//! Companion tool for the Narrator annotation GUI: enumerate and verify
//! audio input devices and manage the persisted configuration.

mod colors;
mod commands;
mod exit_codes;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Narrator - Video annotation CLI
#[derive(Parser, Debug)]
#[command(name = "narrator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available audio input devices
    Devices,
    /// Open an input device and verify it delivers audio
    Check {
        /// Device id (defaults to the configured device)
        #[arg(short, long)]
        device: Option<usize>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set the annotation output directory
    SetOutput {
        /// Directory annotations are saved under
        directory: String,
    },
    /// Set the recording input device
    SetDevice {
        /// Device id (use 'narrator devices' to find)
        device_id: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Devices => commands::devices(cli.json),
        Commands::Check { device } => commands::check(device, cli.json),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(cli.json),
            ConfigAction::SetOutput { directory } => commands::config_set_output(&directory),
            ConfigAction::SetDevice { device_id } => commands::config_set_device(device_id),
        },
    };

    std::process::exit(exit_code.as_i32());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Verify the CLI definition is valid
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    /// Test parsing 'devices' command
    #[test]
    fn parse_devices() {
        let cli = Cli::try_parse_from(["narrator", "devices"]).unwrap();
        assert!(!cli.json);
        assert!(matches!(cli.command, Commands::Devices));
    }

    /// Test parsing 'devices' with --json flag
    #[test]
    fn parse_devices_with_json() {
        let cli = Cli::try_parse_from(["narrator", "--json", "devices"]).unwrap();
        assert!(cli.json);
    }

    /// Test parsing 'check' command without a device
    #[test]
    fn parse_check_default_device() {
        let cli = Cli::try_parse_from(["narrator", "check"]).unwrap();
        match cli.command {
            Commands::Check { device } => assert!(device.is_none()),
            _ => panic!("Expected Check command"),
        }
    }

    /// Test parsing 'check' command with a device id
    #[test]
    fn parse_check_with_device() {
        let cli = Cli::try_parse_from(["narrator", "check", "--device", "2"]).unwrap();
        match cli.command {
            Commands::Check { device } => assert_eq!(device, Some(2)),
            _ => panic!("Expected Check command"),
        }
    }

    /// Test parsing 'config show' command
    #[test]
    fn parse_config_show() {
        let cli = Cli::try_parse_from(["narrator", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));
    }

    /// Test parsing 'config set-output' command
    #[test]
    fn parse_config_set_output() {
        let cli = Cli::try_parse_from(["narrator", "config", "set-output", "/data/out"]).unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigAction::SetOutput { directory },
            } => assert_eq!(directory, "/data/out"),
            _ => panic!("Expected Config SetOutput command"),
        }
    }

    /// Test parsing 'config set-device' command
    #[test]
    fn parse_config_set_device() {
        let cli = Cli::try_parse_from(["narrator", "config", "set-device", "3"]).unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigAction::SetDevice { device_id },
            } => assert_eq!(device_id, 3),
            _ => panic!("Expected Config SetDevice command"),
        }
    }

    /// Test that global flags work after subcommand
    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["narrator", "devices", "--json"]).unwrap();
        assert!(cli.json);
    }

    /// Test invalid command returns error
    #[test]
    fn parse_invalid_command() {
        let result = Cli::try_parse_from(["narrator", "invalid"]);
        assert!(result.is_err());
    }

    /// Test missing required argument returns error
    #[test]
    fn parse_missing_set_output_directory() {
        let result = Cli::try_parse_from(["narrator", "config", "set-output"]);
        assert!(result.is_err());
    }
}
