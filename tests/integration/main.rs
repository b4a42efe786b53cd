#[path = "../common/mod.rs"]
mod common;

mod config_file;
mod eth_client;
mod session;
