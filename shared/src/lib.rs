pub mod client;
pub mod commit;
pub mod crawler;
pub mod error;
pub mod jsonrpc;
pub mod log_config;
pub mod rpc;
pub mod validator;
