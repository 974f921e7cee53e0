use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use rentroll_mcp::server::SessionMode;

const DEFAULT_DB_PATH: &str = "rent_roll.db";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_MCP_SESSIONS: &str = "stateful";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "rentroll-mcpd", version, about = "Rent roll MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "RENTROLL_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db_path: PathBuf,

    #[arg(
        long,
        env = "RENTROLL_DB_IN_MEMORY",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    db_in_memory: bool,

    #[arg(long, env = "RENTROLL_LOAD_JSONL")]
    load_jsonl: Option<PathBuf>,

    #[arg(
        long = "stdio",
        env = "RENTROLL_ENABLE_STDIO",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "RENTROLL_MCP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "RENTROLL_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long, env = "RENTROLL_MCP_SESSIONS", default_value = DEFAULT_MCP_SESSIONS)]
    mcp_sessions: String,

    #[arg(long, env = "RENTROLL_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
}

/// Where the rent roll table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    InMemory,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct RentRollConfig {
    pub db: DbLocation,
    pub load_jsonl: Option<PathBuf>,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub mcp_sessions: SessionMode,
    pub log_filter: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl RentRollConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// True when at least one MCP transport should run.
    #[must_use]
    pub const fn serves_mcp(&self) -> bool {
        self.enable_stdio || self.mcp_serve
    }
}

impl TryFrom<CliArgs> for RentRollConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let db = if args.db_in_memory {
            DbLocation::InMemory
        } else if args.db_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "RENTROLL_DB_PATH",
                value: String::new(),
            });
        } else {
            DbLocation::File(args.db_path)
        };

        let load_jsonl = args
            .load_jsonl
            .filter(|path| !path.as_os_str().is_empty());

        if !args.enable_stdio && !args.mcp_serve && load_jsonl.is_none() {
            return Err(ConfigError::MissingSetting(
                "RENTROLL_ENABLE_STDIO, RENTROLL_MCP_SERVE, or RENTROLL_LOAD_JSONL",
            ));
        }

        let mcp_sessions = match args.mcp_sessions.trim().to_ascii_lowercase().as_str() {
            "stateful" => SessionMode::Stateful,
            "stateless" => SessionMode::Stateless,
            _ => {
                return Err(ConfigError::InvalidSetting {
                    name: "RENTROLL_MCP_SESSIONS",
                    value: args.mcp_sessions,
                });
            }
        };

        let log_filter = if args.log_filter.trim().is_empty() {
            DEFAULT_LOG_FILTER.to_string()
        } else {
            args.log_filter
        };

        Ok(Self {
            db,
            load_jsonl,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            mcp_sessions,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            db_in_memory: false,
            load_jsonl: None,
            enable_stdio: true,
            mcp_serve: false,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            mcp_sessions: DEFAULT_MCP_SESSIONS.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    #[test]
    fn defaults_to_file_store_over_stdio() {
        let config = RentRollConfig::try_from(base_args()).expect("config should parse");
        assert_eq!(config.db, DbLocation::File(PathBuf::from("rent_roll.db")));
        assert!(config.serves_mcp());
        assert!(config.load_jsonl.is_none());
        assert_eq!(config.mcp_sessions, SessionMode::Stateful);
    }

    #[test]
    fn session_mode_is_parsed() {
        let mut args = base_args();
        args.mcp_serve = true;
        args.mcp_sessions = "Stateless".to_string();
        let config = RentRollConfig::try_from(args).expect("config should parse");
        assert_eq!(config.mcp_sessions, SessionMode::Stateless);

        let mut args = base_args();
        args.mcp_sessions = "sticky".to_string();
        let err = RentRollConfig::try_from(args).expect_err("unknown mode");
        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                name: "RENTROLL_MCP_SESSIONS",
                ..
            }
        ));
    }

    #[test]
    fn in_memory_ignores_db_path() {
        let mut args = base_args();
        args.db_in_memory = true;
        args.db_path = PathBuf::new();
        let config = RentRollConfig::try_from(args).expect("config should parse");
        assert_eq!(config.db, DbLocation::InMemory);
    }

    #[test]
    fn empty_db_path_is_rejected() {
        let mut args = base_args();
        args.db_path = PathBuf::new();
        let err = RentRollConfig::try_from(args).expect_err("empty path");
        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                name: "RENTROLL_DB_PATH",
                ..
            }
        ));
    }

    #[test]
    fn requires_a_transport_or_a_load() {
        let mut args = base_args();
        args.enable_stdio = false;
        let err = RentRollConfig::try_from(args).expect_err("nothing to do");
        assert!(matches!(err, ConfigError::MissingSetting(_)));

        let mut args = base_args();
        args.enable_stdio = false;
        args.load_jsonl = Some(PathBuf::from("rent_roll.jsonl"));
        let config = RentRollConfig::try_from(args).expect("load-only run");
        assert!(!config.serves_mcp());
    }

    #[test]
    fn blank_log_filter_falls_back() {
        let mut args = base_args();
        args.log_filter = "  ".to_string();
        let config = RentRollConfig::try_from(args).expect("config should parse");
        assert_eq!(config.log_filter, "info");
    }
}
