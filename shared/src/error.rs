use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MainError {
    #[error("No action error")]
    NoAction,
    #[error("RPC error")]
    RpcError,
    #[error("Invalid configuration")]
    Config,
}

/// Failures surfaced by [`crate::rpc::RpcClient`]. Every operation either
/// returns a fully decoded result or one of these.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(#[from] tendermint_rpc::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0} without a JSON-RPC body")]
    HttpStatus(StatusCode),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid JSON-RPC envelope: {0}")]
    Envelope(String),
    #[error("Invalid RPC url {0}")]
    InvalidUrl(String),
    #[error("Invalid block height {0}")]
    InvalidHeight(u64),
    #[error(
        "Validator set incomplete: page {page} was empty after {collected} of \
         {total} validators"
    )]
    IncompleteValidatorSet {
        page: usize,
        collected: usize,
        total: usize,
    },
}

impl RpcError {
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

pub trait AsRpcError<T> {
    fn into_rpc_error(self) -> Result<T, MainError>;
}

impl<T, E> AsRpcError<T> for Result<T, E>
where
    E: std::fmt::Debug,
{
    #[inline]
    fn into_rpc_error(self) -> Result<T, MainError> {
        self.map_err(|reason| {
            tracing::error!(?reason, "RPC error");
            MainError::RpcError
        })
    }
}

pub trait AsConfigError<T> {
    fn into_config_error(self) -> Result<T, MainError>;
}

impl<T, E> AsConfigError<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    #[inline]
    fn into_config_error(self) -> Result<T, MainError> {
        self.map_err(|reason| {
            tracing::error!(%reason, "{}", MainError::Config);
            MainError::Config
        })
    }
}
