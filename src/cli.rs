use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ovm")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Manage community plugins across multiple Obsidian vaults", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Prefix log lines with a timestamp
    #[arg(short, long, global = true)]
    pub timestamp: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Config file (default: $OVM_CONFIG or ~/ovm.json)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage the ovm config file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Install, uninstall and prune plugins across vaults
    #[command(subcommand)]
    Plugins(PluginsCommand),

    /// Report on installed plugins
    #[command(subcommand)]
    Reports(ReportsCommand),

    /// Run commands against vaults
    #[command(subcommand)]
    Vaults(VaultsCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared arguments
// ============================================================================

/// Vault selection and output shared by every batch command
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Path or glob pattern of vaults (default: vaults known to Obsidian)
    #[arg(short, long, default_value = "")]
    pub path: String,

    /// Use every matching vault without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Create an empty config file
    Init,

    /// Open the config file in an editor
    Edit,
}

// ============================================================================
// Plugins Commands
// ============================================================================

#[derive(Subcommand)]
pub enum PluginsCommand {
    /// Install configured plugins, or a single plugin, in selected vaults
    Install(InstallArgs),

    /// Remove plugins from selected vaults
    Uninstall(UninstallArgs),

    /// Remove installed plugins that are not in the config
    Prune(TargetArgs),
}

#[derive(Args)]
pub struct InstallArgs {
    /// Plugin to install, as `id` or `id@version` (default: every configured plugin)
    pub id: Option<String>,

    /// Add installed plugins to the vault's enabled list
    #[arg(
        short,
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub enable: bool,

    #[command(flatten)]
    pub targets: TargetArgs,
}

#[derive(Args)]
pub struct UninstallArgs {
    /// Plugin id to remove (default: pick from the config)
    pub id: Option<String>,

    #[command(flatten)]
    pub targets: TargetArgs,
}

// ============================================================================
// Reports Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ReportsCommand {
    /// Count installed plugins and the vaults using them
    Stats(TargetArgs),
}

// ============================================================================
// Vaults Commands
// ============================================================================

#[derive(Subcommand)]
pub enum VaultsCommand {
    /// Run a shell command in every selected vault
    ///
    /// `{0}` is replaced with the vault path and `{1}` with the vault name.
    Run(RunArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Command to run
    pub command: String,

    /// Run vaults one at a time
    #[arg(long)]
    pub serial: bool,

    /// Number of vaults to run in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Do not print command output
    #[arg(long)]
    pub silent: bool,

    /// Run from the current directory instead of the vault directory
    #[arg(long)]
    pub no_vault_cwd: bool,

    #[command(flatten)]
    pub targets: TargetArgs,
}
