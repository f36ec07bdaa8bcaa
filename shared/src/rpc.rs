use reqwest::{Client, Url};
use tendermint::block::Height;
use tendermint::validator::Info as ValidatorInfo;
use tendermint_rpc::endpoint::abci_query::{
    AbciQuery, Request as AbciQueryRequest, Response as AbciQueryResponse,
};
use tendermint_rpc::endpoint::block_results::Response as TendermintBlockResultResponse;
use tendermint_rpc::endpoint::commit::Response as TendermintCommitResponse;
use tendermint_rpc::endpoint::validators::Request as ValidatorsRequest;
use tendermint_rpc::{Client as _, HttpClient, PageNumber, PerPage};

use crate::error::RpcError;
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::validator::{
    collect_validator_pages, ValidatorSet, ValidatorsPage, ValidatorsQuery,
};

const ABCI_QUERY_METHOD: &str = "abci_query";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AbciQueryParams {
    pub path: String,
    pub data: Vec<u8>,
    pub prove: bool,
    pub height: u64,
}

/// CometBFT RPC adapter over a single keep-alive connection pool.
///
/// Heights of 0 mean "latest". Decoding is left to `tendermint-rpc`; nothing
/// returned here is verified beyond what its decoders check.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    url: Url,
    driver: HttpClient,
}

impl RpcClient {
    /// `http` must be the client `driver` was built on so that raw calls
    /// share its connection pool.
    pub fn from_parts(http: Client, url: Url, driver: HttpClient) -> Self {
        Self { http, url, driver }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn block_results(
        &self,
        height: u64,
    ) -> Result<TendermintBlockResultResponse, RpcError> {
        tracing::debug!(height, "Query block results");

        let response = match to_height(height)? {
            Some(height) => self.driver.block_results(height).await?,
            None => self.driver.latest_block_results().await?,
        };

        Ok(response)
    }

    /// Sent as a raw JSON-RPC envelope so that an error object coming back
    /// from the node is reported as [`RpcError::Protocol`] with its payload.
    pub async fn abci_query(
        &self,
        params: AbciQueryParams,
    ) -> Result<AbciQuery, RpcError> {
        let AbciQueryParams {
            path,
            data,
            prove,
            height,
        } = params;
        tracing::debug!(path = %path, height, prove, "Query ABCI");

        let request = AbciQueryRequest::new(
            Some(path),
            data,
            to_height(height)?,
            prove,
        );
        let envelope = JsonRpcRequest::new(ABCI_QUERY_METHOD, request);

        let response = self
            .http
            .post(self.url.clone())
            .json(&envelope)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        let envelope = match JsonRpcResponse::parse(&body) {
            Ok(envelope) => envelope,
            Err(RpcError::Decode(_)) if !status.is_success() => {
                return Err(RpcError::HttpStatus(status));
            }
            Err(e) => return Err(e),
        };

        envelope
            .into_result::<AbciQueryResponse>()
            .map(|result| result.response)
    }

    pub async fn validators(
        &self,
        query: ValidatorsQuery,
    ) -> Result<ValidatorsPage<ValidatorInfo>, RpcError> {
        tracing::debug!(?query, "Query validators");

        let height = match query.height {
            Some(height) => to_height(height)?,
            None => None,
        };
        let request = ValidatorsRequest::new(
            height,
            query.page.map(PageNumber::from),
            query.per_page.map(PerPage::from),
        );

        Ok(self.driver.perform(request).await?.into())
    }

    /// Full validator set at `height`, or at whatever height the node
    /// answers the first page with when `height` is 0.
    pub async fn validators_all(
        &self,
        height: u64,
    ) -> Result<ValidatorSet<ValidatorInfo>, RpcError> {
        let set =
            collect_validator_pages(height, |query| self.validators(query))
                .await?;

        tracing::debug!(
            height = set.block_height,
            count = set.count,
            "Collected validator set"
        );

        Ok(set)
    }

    pub async fn commit(
        &self,
        height: u64,
    ) -> Result<TendermintCommitResponse, RpcError> {
        tracing::debug!(height, "Query commit");

        let response = match to_height(height)? {
            Some(height) => self.driver.commit(height).await?,
            None => self.driver.latest_commit().await?,
        };

        Ok(response)
    }

    pub async fn latest_height(&self) -> Result<u64, RpcError> {
        let commit = self.driver.latest_commit().await?;

        Ok(commit.signed_header.header.height.value())
    }
}

fn to_height(height: u64) -> Result<Option<Height>, RpcError> {
    if height == 0 {
        return Ok(None);
    }
    Height::try_from(height)
        .map(Some)
        .map_err(|_| RpcError::InvalidHeight(height))
}
