//! Clap derive structures for the `e2ebridge` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

use e2ebridge_api::{ResourceType, ServiceKind};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// e2ebridge -- administer E2E Bridge servers from the command line
#[derive(Debug, Parser)]
#[command(
    name = "e2ebridge",
    version,
    about = "Administer E2E Bridge servers from the command line",
    long_about = "Deploy, start, stop and configure services on an E2E Bridge.\n\n\
        Uses the REST API for most operations, and the legacy admin console\n\
        for the operations only it offers (the `console` subcommands).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Bridge profile to use
    #[arg(long, short = 'p', env = "E2EBRIDGE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Bridge host (overrides profile)
    #[arg(long, short = 'H', env = "E2EBRIDGE_HOST", global = true)]
    pub host: Option<String>,

    /// Bridge administration port (overrides profile)
    #[arg(long, env = "E2EBRIDGE_PORT", global = true)]
    pub port: Option<u16>,

    /// Bridge user (overrides profile)
    #[arg(long, short = 'u', env = "E2EBRIDGE_USER", global = true)]
    pub user: Option<String>,

    /// Bridge password (prefer the keyring or E2EBRIDGE_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "E2EBRIDGE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "E2EBRIDGE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "E2EBRIDGE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy, inspect and control services
    #[command(alias = "svc", alias = "s")]
    Services(ServicesArgs),

    /// Read and change service preferences
    #[command(alias = "prefs")]
    Preferences(PreferencesArgs),

    /// Read and change service settings
    Settings(SettingsArgs),

    /// Manage resource, Java and XSLT files
    #[command(alias = "res")]
    Resources(ResourcesArgs),

    /// Read model and custom notes of xUML services
    Notes(NotesArgs),

    /// List and cancel xUML service sessions
    Sessions(SessionsArgs),

    /// Operations on the legacy admin console
    Console(ConsoleArgs),

    /// Pack a project directory into a deployable repository
    Pack(PackArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// A service addressed by kind and name.
#[derive(Debug, Args)]
pub struct ServiceRef {
    /// Service kind: xuml, node or java
    #[arg(value_name = "KIND")]
    pub kind: ServiceKind,

    /// Service name
    pub name: String,
}

/// Options shared by the REST and console deploy commands.
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Repository archive, or a project directory to pack first
    pub path: PathBuf,

    /// Start the service after deployment
    #[arg(long)]
    pub startup: bool,

    /// Replace an already deployed service of the same name
    #[arg(long)]
    pub overwrite: bool,

    /// Replace the service preferences as well
    #[arg(long)]
    pub overwrite_prefs: bool,

    /// Run `npm install` on the Bridge (Node.js services)
    #[arg(long)]
    pub npm_install: bool,

    /// Run the package scripts on the Bridge (Node.js services)
    #[arg(long)]
    pub run_scripts: bool,

    /// Deploy under this instance name
    #[arg(long, value_name = "NAME")]
    pub instance_name: Option<String>,
}

/// Parse `KEY=VALUE`, reading the value as JSON when it parses and as a
/// string otherwise.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List deployed services
    #[command(alias = "ls")]
    List {
        /// Only list services of this kind
        #[arg(long, value_name = "KIND")]
        kind: Option<ServiceKind>,
    },

    /// Show the status of a service
    Status(ServiceRef),

    /// Show runtime information of an xUML service
    Info {
        /// xUML service name
        name: String,
    },

    /// Start a service
    Start(ServiceRef),

    /// Stop a service
    Stop(ServiceRef),

    /// Kill an xUML service
    Kill(ServiceRef),

    /// Remove a service
    #[command(alias = "rm")]
    Remove(ServiceRef),

    /// Deploy a repository archive or project directory
    Deploy(DeployArgs),

    /// Download the deployed repository of a service
    Repository {
        #[command(flatten)]
        service: ServiceRef,

        /// File to write the repository to
        #[arg(long, short = 'O', value_name = "FILE")]
        out: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PREFERENCES & SETTINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PreferencesArgs {
    #[command(subcommand)]
    pub command: PreferencesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PreferencesCommand {
    /// Show the preferences of a service
    Get(ServiceRef),

    /// Change preferences; keys must exist and keep their type
    Set {
        #[command(flatten)]
        service: ServiceRef,

        /// Changes as KEY=VALUE (VALUE is JSON, or a plain string)
        #[arg(value_name = "KEY=VALUE", required = true, value_parser = parse_assignment)]
        changes: Vec<(String, Value)>,
    },
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the settings of a service
    Get(ServiceRef),

    /// Change settings by id
    Set {
        #[command(flatten)]
        service: ServiceRef,

        /// Changes as ID=VALUE (VALUE is JSON, or a plain string)
        #[arg(value_name = "ID=VALUE", required = true, value_parser = parse_assignment)]
        changes: Vec<(String, Value)>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    #[command(subcommand)]
    pub command: ResourcesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourcesCommand {
    /// List uploaded files of one type
    #[command(alias = "ls")]
    List {
        /// Resource type: resource, java or xslt
        #[arg(value_name = "TYPE")]
        kind: ResourceType,
    },

    /// Upload a file
    Upload {
        /// Resource type: resource, java or xslt
        #[arg(value_name = "TYPE")]
        kind: ResourceType,

        /// File to upload
        file: PathBuf,
    },

    /// Download a file
    Download {
        /// Resource type: resource, java or xslt
        #[arg(value_name = "TYPE")]
        kind: ResourceType,

        /// Name of the file on the Bridge
        name: String,

        /// Local file to write
        #[arg(long, short = 'O', value_name = "FILE")]
        out: PathBuf,
    },

    /// Delete a file
    #[command(alias = "rm")]
    Delete {
        /// Resource type: resource, java or xslt
        #[arg(value_name = "TYPE")]
        kind: ResourceType,

        /// Name of the file on the Bridge
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NOTES & SESSIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NotesArgs {
    #[command(subcommand)]
    pub command: NotesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotesCommand {
    /// List model notes, or print one when FILE is given
    Model {
        /// xUML service name
        name: String,

        /// Note file name
        file: Option<String>,
    },

    /// Print the custom notes
    Custom {
        /// xUML service name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List open sessions
    #[command(alias = "ls")]
    List {
        /// xUML service name
        name: String,
    },

    /// Cancel a session
    Cancel {
        /// xUML service name
        name: String,

        /// Session ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONSOLE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConsoleArgs {
    #[command(subcommand)]
    pub command: ConsoleCommand,
}

/// A service on one node, as the console addresses it.
#[derive(Debug, Args)]
pub struct NodeServiceRef {
    #[command(flatten)]
    pub service: ServiceRef,

    /// Node hosting the service (defaults to the profile's node)
    #[arg(long, short = 'n')]
    pub node: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConsoleCommand {
    /// Log in to verify the credentials
    Login,

    /// Start a service
    Start(NodeServiceRef),

    /// Stop a service
    Stop(NodeServiceRef),

    /// Kill a service
    Kill(NodeServiceRef),

    /// Remove a service
    #[command(alias = "rm")]
    Remove(NodeServiceRef),

    /// Deploy a repository archive or project directory
    Deploy(DeployArgs),

    /// Manage domain groups
    Group(GroupArgs),

    /// Manage domain users
    User(UserArgs),
}

#[derive(Debug, Args)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Create a group
    Create {
        /// Group ID
        id: String,
        /// Display name
        name: String,
    },

    /// Delete a group
    Delete {
        /// Group ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user (the password is prompted)
    Create {
        /// User ID
        id: String,
        /// Display name
        name: String,
        /// Group the user belongs to
        #[arg(long, short = 'g')]
        group: String,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PACK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Project directory containing package.json
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Archive to write [default: NAME-VERSION.zip in the current directory]
    #[arg(long, short = 'O', value_name = "FILE")]
    pub out: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: host, port, user, password_env, node, ca_cert, insecure, timeout
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
