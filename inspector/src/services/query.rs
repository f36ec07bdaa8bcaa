use serde::Serialize;
use shared::error::{AsConfigError, AsRpcError, MainError};
use shared::rpc::{AbciQueryParams, RpcClient};
use shared::validator::ValidatorsQuery;
use subtle_encoding::hex;

use crate::config::Command;

/// Runs a one-shot command and prints its result as JSON on stdout.
pub async fn run(client: &RpcClient, command: Command) -> Result<(), MainError> {
    let output = match command {
        Command::BlockResults { height } => {
            to_json(&client.block_results(height).await.into_rpc_error()?)?
        }
        Command::AbciQuery {
            path,
            data,
            prove,
            height,
        } => {
            let params = AbciQueryParams {
                path,
                data: decode_hex(&data)?,
                prove,
                height,
            };
            to_json(&client.abci_query(params).await.into_rpc_error()?)?
        }
        Command::Validators {
            height,
            page,
            per_page,
        } => {
            let query = ValidatorsQuery {
                height,
                page,
                per_page,
            };
            to_json(&client.validators(query).await.into_rpc_error()?)?
        }
        Command::ValidatorsAll { height } => {
            to_json(&client.validators_all(height).await.into_rpc_error()?)?
        }
        Command::Commit { height } => {
            to_json(&client.commit(height).await.into_rpc_error()?)?
        }
        Command::Watch { .. } => {
            tracing::error!("watch is not a one-shot command");
            return Err(MainError::NoAction);
        }
    };

    println!("{output}");

    Ok(())
}

pub fn decode_hex(data: &str) -> Result<Vec<u8>, MainError> {
    let data = data.trim_start_matches("0x").to_ascii_lowercase();

    hex::decode(data.as_bytes()).into_config_error()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, MainError> {
    serde_json::to_string_pretty(value).into_config_error()
}
