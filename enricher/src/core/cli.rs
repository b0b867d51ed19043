use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_BASE_URL, ENV_CACHE_MAX_ENTRIES, ENV_CACHE_TTL_SECS, ENV_CONFIG, ENV_FIELDS,
    ENV_INPUT_KEY, ENV_LOG_JSON, ENV_OUTPUT_KEY, ENV_TIMEOUT_SECS, ENV_TOKEN,
};

#[derive(Parser)]
#[command(name = "geoenrich")]
#[command(
    version,
    about = "Enrich newline-delimited JSON events with IP geolocation",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// ipinfo.io access token (anonymous lookups when unset)
    #[arg(long, global = true, env = ENV_TOKEN, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Event field holding the IP address
    #[arg(long, short = 'i', global = true, env = ENV_INPUT_KEY)]
    pub input_key: Option<String>,

    /// Event field receiving the geolocation attributes
    #[arg(long, short = 'o', global = true, env = ENV_OUTPUT_KEY)]
    pub output_key: Option<String>,

    /// Attributes to keep, comma-separated (e.g. country_name,city)
    #[arg(long, short = 'f', global = true, env = ENV_FIELDS, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Lookup service base URL
    #[arg(long, global = true, env = ENV_BASE_URL)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = ENV_TIMEOUT_SECS)]
    pub timeout_secs: Option<u64>,

    /// Maximum number of cached lookups
    #[arg(long, global = true, env = ENV_CACHE_MAX_ENTRIES)]
    pub cache_max_entries: Option<usize>,

    /// Seconds a cached lookup stays valid
    #[arg(long, global = true, env = ENV_CACHE_TTL_SECS)]
    pub cache_ttl_secs: Option<u64>,

    /// Write logs as JSON lines
    #[arg(long, global = true, env = ENV_LOG_JSON)]
    pub log_json: bool,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Enrich events from a file or stdin and write them to stdout (default command)
    Run {
        /// Input file; stdin when omitted or "-"
        input: Option<PathBuf>,
    },
    /// Resolve a single address and print its full attribute set
    Lookup {
        /// IPv4 or IPv6 address
        ip: String,
    },
}

/// Configuration derived from CLI arguments
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub access_token: Option<String>,
    pub input_key: Option<String>,
    pub output_key: Option<String>,
    pub fields: Option<Vec<String>>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub cache_max_entries: Option<usize>,
    pub cache_ttl_secs: Option<u64>,
    pub log_json: bool,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("config", &self.config)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("input_key", &self.input_key)
            .field("output_key", &self.output_key)
            .field("fields", &self.fields)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            access_token: cli.access_token,
            input_key: cli.input_key,
            output_key: cli.output_key,
            fields: cli.fields,
            base_url: cli.base_url,
            timeout_secs: cli.timeout_secs,
            cache_max_entries: cli.cache_max_entries,
            cache_ttl_secs: cli.cache_ttl_secs,
            log_json: cli.log_json,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    split(Cli::parse())
}

fn split(mut cli: Cli) -> (CliConfig, Option<Commands>) {
    let command = cli.command.take();
    (CliConfig::from(cli), command)
}
