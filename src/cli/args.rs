//! Command-line arguments.
//!
//! Argument groups are flattened into the binary's top-level parser.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::config::{AgentConfig, DEFAULT_BIRD_SOCKET, DEFAULT_MASTER_SOCKET, DEFAULT_PRIORITY};

/// Output format for `--once`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `name = TYPE: value` lines.
    #[default]
    Human,
    /// Pretty-printed JSON document.
    Json,
    /// Tab-separated OID and value.
    Raw,
}

/// Parse `3s`, `500ms`, `1m`, or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| format!("invalid duration '{}': {}", s, e))
}

/// Routing daemon arguments.
#[derive(Debug, Args)]
pub struct DaemonArgs {
    /// BIRD control socket.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_BIRD_SOCKET)]
    pub bird_socket: PathBuf,

    /// Time between polls of the daemon.
    #[arg(long, value_name = "DURATION", default_value = "3s", value_parser = parse_duration)]
    pub refresh_interval: Duration,

    /// Bound on a single daemon request.
    #[arg(long, value_name = "DURATION", default_value = "10s", value_parser = parse_duration)]
    pub daemon_timeout: Duration,
}

/// AgentX master arguments.
#[derive(Debug, Args)]
pub struct AgentxArgs {
    /// AgentX master socket.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MASTER_SOCKET)]
    pub master_socket: PathBuf,

    /// Registration priority (lower wins).
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PRIORITY)]
    pub priority: u8,

    /// Session timeout announced to the master.
    #[arg(long, value_name = "DURATION", default_value = "60s", value_parser = parse_duration)]
    pub agentx_timeout: Duration,

    /// Delay before reconnecting to a lost master.
    #[arg(long, value_name = "DURATION", default_value = "1s", value_parser = parse_duration)]
    pub reconnect_interval: Duration,
}

/// Logging and dump output arguments.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format for --once.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Omit BGP4-MIB object names from --once output.
    #[arg(long)]
    pub no_hints: bool,
}

impl OutputArgs {
    /// Default filter directive for the verbosity level.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "bird_bgp_agentx=info",
            1 => "bird_bgp_agentx=debug",
            _ => "bird_bgp_agentx=trace",
        }
    }

    /// Install the global tracing subscriber, logging to stderr.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_directive()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Assemble the runtime configuration from parsed arguments.
pub fn agent_config(daemon: &DaemonArgs, agentx: &AgentxArgs) -> AgentConfig {
    AgentConfig::default()
        .bird_socket(daemon.bird_socket.clone())
        .refresh_interval(daemon.refresh_interval)
        .daemon_timeout(daemon.daemon_timeout)
        .master_socket(agentx.master_socket.clone())
        .priority(agentx.priority)
        .agentx_timeout(agentx.agentx_timeout)
        .reconnect_interval(agentx.reconnect_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        daemon: DaemonArgs,
        #[command(flatten)]
        agentx: AgentxArgs,
        #[command(flatten)]
        output: OutputArgs,
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_defaults_match_config() {
        let cli = Cli::parse_from(["bird-bgp-agentx"]);
        let config = agent_config(&cli.daemon, &cli.agentx);
        assert_eq!(config, AgentConfig::default());
        assert_eq!(cli.output.format, OutputFormat::Human);
        assert_eq!(cli.output.log_directive(), "bird_bgp_agentx=info");
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "bird-bgp-agentx",
            "--bird-socket",
            "/tmp/bird.ctl",
            "--refresh-interval",
            "10s",
            "--priority",
            "50",
            "--format",
            "json",
            "-vv",
        ]);
        let config = agent_config(&cli.daemon, &cli.agentx);
        assert_eq!(config.bird_socket, PathBuf::from("/tmp/bird.ctl"));
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.priority, 50);
        assert_eq!(cli.output.format, OutputFormat::Json);
        assert_eq!(cli.output.log_directive(), "bird_bgp_agentx=trace");
    }
}
