use core::fmt;
use std::fmt::Display;

use shared::client::ClientOptions;
use shared::log_config::LogConfig;
use tendermint_rpc::client::CompatMode;

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CometVersion {
    #[value(name = "v0.34")]
    V0_34,
    #[value(name = "v0.37")]
    V0_37,
}

impl Display for CometVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::V0_34 => write!(f, "v0.34"),
            Self::V0_37 => write!(f, "v0.37"),
        }
    }
}

impl From<CometVersion> for CompatMode {
    fn from(version: CometVersion) -> Self {
        match version {
            CometVersion::V0_34 => CompatMode::V0_34,
            CometVersion::V0_37 => CompatMode::V0_37,
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(name = "inspector", about = "Query a CometBFT node over RPC")]
pub struct AppConfig {
    #[clap(long, env, default_value = "http://127.0.0.1:26657")]
    pub tendermint_url: String,

    /// RPC dialect; CometBFT 0.38 nodes use v0.37.
    #[clap(long, env, value_enum, default_value_t = CometVersion::V0_37)]
    pub compat_mode: CometVersion,

    #[clap(long, env)]
    pub http2_prior_knowledge: bool,

    #[clap(flatten)]
    pub log: LogConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl AppConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            compat_mode: self.compat_mode.into(),
            http2_prior_knowledge: self.http2_prior_knowledge,
            ..ClientOptions::default()
        }
    }
}

/// Heights default to 0, which the node reads as "latest".
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the results of a block
    BlockResults {
        #[clap(long, default_value_t = 0)]
        height: u64,
    },
    /// Run an ABCI query
    AbciQuery {
        #[clap(long)]
        path: String,
        /// Hex encoded query payload
        #[clap(long, default_value = "")]
        data: String,
        #[clap(long)]
        prove: bool,
        #[clap(long, default_value_t = 0)]
        height: u64,
    },
    /// Print a single page of the validator set
    Validators {
        #[clap(long)]
        height: Option<u64>,
        #[clap(long)]
        page: Option<usize>,
        #[clap(long)]
        per_page: Option<u8>,
    },
    /// Print the full validator set, walking every page at one height
    ValidatorsAll {
        #[clap(long, default_value_t = 0)]
        height: u64,
    },
    /// Print the commit of a block
    Commit {
        #[clap(long, default_value_t = 0)]
        height: u64,
    },
    /// Follow the chain and log validator participation for every block
    Watch {
        /// First height to process; the latest height when omitted
        #[clap(long)]
        from_height: Option<u64>,
        #[clap(long, default_value_t = 5000)]
        interval_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_target_a_local_node() {
        let config =
            AppConfig::parse_from(["inspector", "commit", "--height", "12"]);

        assert_eq!(config.tendermint_url, "http://127.0.0.1:26657");
        assert_eq!(config.compat_mode, CometVersion::V0_37);
        assert_eq!(config.command, Command::Commit { height: 12 });
        assert_eq!(
            config.client_options().compat_mode,
            CompatMode::V0_37
        );
    }

    #[test]
    fn parses_abci_query() {
        let config = AppConfig::parse_from([
            "inspector",
            "--compat-mode",
            "v0.34",
            "abci-query",
            "--path",
            "/shell/epoch",
            "--data",
            "0aff",
            "--prove",
        ]);

        assert_eq!(config.client_options().compat_mode, CompatMode::V0_34);
        assert_eq!(
            config.command,
            Command::AbciQuery {
                path: "/shell/epoch".to_string(),
                data: "0aff".to_string(),
                prove: true,
                height: 0,
            }
        );
    }

    #[test]
    fn validators_paging_is_optional() {
        let config = AppConfig::parse_from([
            "inspector",
            "validators",
            "--page",
            "2",
        ]);

        assert_eq!(
            config.command,
            Command::Validators {
                height: None,
                page: Some(2),
                per_page: None,
            }
        );
    }
}
