//! Clap derive structures for the `nestly` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nestly -- control Nest thermostats, sensors, and cameras
#[derive(Debug, Parser)]
#[command(
    name = "nestly",
    version,
    about = "Control Nest thermostats, sensors, and cameras from the command line",
    long_about = "A CLI for the Nest cloud service.\n\n\
        Logs in with a Nest account (email + password) or a Google account\n\
        (issue_token URL + cookie + API key) and talks to the same endpoints\n\
        as the Nest web app.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "NEST_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "NEST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Nest account email (selects password login; overrides profile)
    #[arg(long, env = "NEST_EMAIL", global = true, hide_env = true)]
    pub email: Option<String>,

    /// Base URL for every Nest service (proxies, testing)
    #[arg(long, env = "NEST_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NEST_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NEST_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Attempts per request for transient failures (overrides profile)
    #[arg(long, env = "NEST_RETRIES", global = true)]
    pub retries: Option<u32>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
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
    /// List thermostats, temperature sensors, and cameras
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// Read or control a thermostat
    #[command(alias = "t")]
    Thermostat(ThermostatArgs),

    /// Read a remote temperature sensor
    #[command(alias = "s")]
    Sensor(SensorArgs),

    /// Read or control a camera
    #[command(alias = "cam")]
    Camera(CameraArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Thermostat ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ThermostatArgs {
    /// Thermostat device id (see `nestly devices`)
    pub id: String,

    #[command(subcommand)]
    pub command: ThermostatCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThermostatCommand {
    /// Show current state
    Show,

    /// Set the target temperature, or the low/high range with --high
    SetTemp {
        /// Target temperature (low setpoint when --high is given)
        temperature: f64,

        /// High setpoint for range mode
        #[arg(long)]
        high: Option<f64>,
    },

    /// Set the operating mode
    SetMode {
        /// One of: off, heat, cool, range
        mode: ModeArg,
    },

    /// Control the fan timer
    Fan {
        #[command(subcommand)]
        command: FanCommand,
    },

    /// Turn manual eco on or off
    Eco {
        state: Toggle,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Off,
    Heat,
    Cool,
    Range,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
pub enum FanCommand {
    /// Run the fan for a number of minutes
    On {
        #[arg(long, short = 'm', default_value = "15")]
        minutes: u32,
    },
    /// Stop the fan timer
    Off,
}

// ── Sensor ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorArgs {
    /// Sensor device id (see `nestly devices`)
    pub id: String,

    #[command(subcommand)]
    pub command: SensorCommand,
}

#[derive(Debug, Subcommand)]
pub enum SensorCommand {
    /// Show current reading
    Show,
}

// ── Camera ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CameraArgs {
    /// Camera uuid (see `nestly devices`)
    pub id: String,

    #[command(subcommand)]
    pub command: CameraCommand,
}

#[derive(Debug, Subcommand)]
pub enum CameraCommand {
    /// Show camera properties
    Show,
    /// Enable streaming
    On,
    /// Disable streaming
    Off,
    /// Save a still image
    Snapshot {
        /// Output file (JPEG)
        #[arg(long, short = 'O')]
        out: PathBuf,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display current configuration (secrets masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
