use std::sync::Arc;

use shared::commit::Participation;
use shared::error::{AsRpcError, MainError};
use shared::rpc::RpcClient;
use tokio::time::Instant;

pub async fn can_process(
    height: u64,
    client: &RpcClient,
) -> Result<bool, MainError> {
    let latest_height = client.latest_height().await.map_err(|e| {
        tracing::error!("Failed to query the latest committed height: {}", e);
        MainError::RpcError
    })?;

    Ok(latest_height >= height)
}

/// Checks the commit of `height` against the validator set of that same
/// height.
pub async fn crawling_fn(
    height: u64,
    client: Arc<RpcClient>,
) -> Result<Participation, MainError> {
    if !can_process(height, &client).await? {
        tracing::trace!(block = height, "Block does not exist yet, waiting...");
        return Err(MainError::NoAction);
    }

    let start = Instant::now();

    let commit = client.commit(height).await.into_rpc_error()?;
    let validator_set = client.validators_all(height).await.into_rpc_error()?;

    let participation = Participation::from_commit(
        &commit.signed_header.commit,
        &validator_set.validators,
    );

    tracing::info!(
        block = height,
        validators = validator_set.count,
        signed = participation.signed,
        nil = participation.nil,
        absent = participation.absent,
        signed_ratio = participation.signed_ratio(),
        time_taken = start.elapsed().as_secs_f64(),
        "Processed block"
    );
    if !participation.has_quorum() {
        tracing::warn!(
            block = height,
            signed_power = participation.signed_power,
            total_power = participation.total_power,
            "Commit signatures hold less than two thirds of the voting power"
        );
    }

    Ok(participation)
}
