//! CLI argument parsing and command definitions.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version,
    about = "Access-control gate for small CRUD backends",
    long_about = None
)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API.
    Serve {
        /// Host to bind (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides `server.port`).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Evaluate one access decision and print `allow` or `deny`.
    Check(CheckArgs),

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Arguments for `warden check`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Action, e.g. `list`, `retrieve`, `update`, `delete`, `register`.
    #[arg(short, long)]
    pub action: String,

    /// Resource kind, singular or plural (`post`, `tags`, ...).
    #[arg(short, long)]
    pub kind: String,

    /// Id of the acting principal; omit for an anonymous caller.
    #[arg(long)]
    pub principal: Option<String>,

    /// Role of the acting principal.
    #[arg(long, default_value = "user")]
    pub role: String,

    /// Owner id of the target resource.
    #[arg(long, conflicts_with = "unowned")]
    pub owner: Option<String>,

    /// The target resource exists but has no owner.
    #[arg(long)]
    pub unowned: bool,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "server.port").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "server.port").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as `WARDEN_*` environment variables.
    Export,
}
