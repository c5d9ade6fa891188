//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate), and their associated argument structs.
//! Every `run` flag has an environment variable equivalent for container
//! deployments; flags and variables both override the properties file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "callback-relay",
    version,
    about = "Signed payment-callback relay with rule-based forwarding",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        callback-relay run                              Start with ./conf.properties\n  \
        callback-relay run -r router.json -p 8080 -k K  Start with flags only\n  \
        callback-relay validate router.json             Check a routing file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Run(Box<RunArgs>),

    /// Validate a routing file without starting
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        callback-relay run                                   Use ./conf.properties\n  \
        callback-relay run -c /etc/relay/conf.properties     Specific properties file\n  \
        callback-relay run -r router.json -p 8080 -k secret  Flags only\n  \
        callback-relay run --timeout 3000 --pretty           Bounded forwards, local dev")]
pub struct RunArgs {
    /// Properties file (default: ./conf.properties, skipped if absent)
    #[arg(short, long, env = "RELAY_CONF")]
    pub conf: Option<PathBuf>,

    /// Routing file (JSON array of {url, expression})
    #[arg(short, long, env = "RELAY_ROUTER_FILE")]
    pub router: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "RELAY_PORT")]
    pub port: Option<u16>,

    /// Callback signing key
    #[arg(short, long, env = "RELAY_CALLBACK_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Target used when no rule matches
    #[arg(long, env = "RELAY_DEFAULT_FORWARD_URL")]
    pub default_url: Option<String>,

    /// Listen address
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Forward timeout in milliseconds (unbounded when unset)
    #[arg(long, env = "FORWARD_TIMEOUT_MS", help_heading = "Tuning")]
    pub timeout: Option<u64>,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Routing file to validate
    #[arg(default_value = "router.json")]
    pub router: PathBuf,

    /// Default target to check alongside the rules
    #[arg(long)]
    pub default_url: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_parse() {
        let cli = Cli::parse_from(["callback-relay", "run", "-r", "r.json", "-p", "81", "-k", "s"]);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.router, Some(PathBuf::from("r.json")));
        assert_eq!(args.port, Some(81));
        assert_eq!(args.key.as_deref(), Some("s"));
    }

    #[test]
    fn validate_defaults() {
        let cli = Cli::parse_from(["callback-relay", "validate"]);
        let Some(Commands::Validate(args)) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.router, PathBuf::from("router.json"));
        assert!(matches!(args.format, ValidateFormat::Text));
    }
}
