use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, Url};
use tendermint_rpc::client::CompatMode;
use tendermint_rpc::HttpClient;

use crate::error::RpcError;
use crate::rpc::RpcClient;

/// Connection settings for the keep-alive pool shared by every call of an
/// [`RpcClient`]. No request timeout is set; callers bound individual calls
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub compat_mode: CompatMode,
    pub http2_prior_knowledge: bool,
    pub tcp_keepalive: Option<Duration>,
    /// `None` keeps idle connections open for the life of the client.
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            compat_mode: CompatMode::V0_37,
            http2_prior_knowledge: false,
            tcp_keepalive: Some(Duration::from_secs(60)),
            pool_idle_timeout: None,
            pool_max_idle_per_host: usize::MAX,
        }
    }
}

pub fn build_http_client(options: &ClientOptions) -> Result<Client, RpcError> {
    let mut builder = Client::builder()
        .tcp_keepalive(options.tcp_keepalive)
        .pool_idle_timeout(options.pool_idle_timeout)
        .pool_max_idle_per_host(options.pool_max_idle_per_host);
    if options.http2_prior_knowledge {
        builder = builder.http2_prior_knowledge();
    }

    Ok(builder.build()?)
}

/// Builds the adapter without touching the network: an unreachable node only
/// shows up as an error on the first call.
pub fn build_client(
    url: &str,
    options: &ClientOptions,
) -> Result<RpcClient, RpcError> {
    let url = Url::from_str(url)
        .map_err(|reason| RpcError::InvalidUrl(format!("{url}: {reason}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RpcError::InvalidUrl(format!(
            "{url}: unsupported scheme {}",
            url.scheme()
        )));
    }
    let inner_client = build_http_client(options)?;

    let driver = HttpClient::new_from_parts(
        inner_client.clone(),
        url.clone(),
        options.compat_mode,
    );

    Ok(RpcClient::from_parts(inner_client, url, driver))
}
