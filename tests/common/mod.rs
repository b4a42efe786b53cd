use alloy::{
    primitives::{Address, B256, U256, U64},
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::mock::Asserter,
};
use claimer_ethereum::EthClient;
use claimer_types::SEPOLIA_CHAIN_ID;
use serde_json::{json, Value};
use tracing::Level;
use url::Url;

/// Well known development key (anvil account 0)
pub const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: Address =
    alloy::primitives::address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
/// Default faucet contract
pub const FAUCET: Address = alloy::primitives::address!("3edf60dd017ace33a0220f78741b5581c385a1ba");
/// Gas used by a mined claim in [`mined_receipt`]
pub const CLAIM_GAS_USED: u64 = 36_621;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Endpoint reported by mocked connections
pub fn mock_endpoint() -> Url {
    "http://localhost:8545/".parse().unwrap()
}

/// Provider that answers from the asserter's queue, in order
pub fn mocked_provider(asserter: &Asserter) -> DynProvider {
    ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_mocked_client(asserter.clone())
        .erased()
}

/// Queue the responses of a successful connection handshake
pub fn push_handshake(asserter: &Asserter, chain_id: u64) {
    asserter.push_success(&true);
    asserter.push_success(&U64::from(chain_id));
}

/// Client connected through a mocked Sepolia handshake
pub async fn connected_client(asserter: &Asserter) -> EthClient {
    push_handshake(asserter, SEPOLIA_CHAIN_ID);
    EthClient::connect_with(mocked_provider(asserter), mock_endpoint())
        .await
        .expect("mocked handshake should succeed")
}

/// One ether in wei
pub fn one_ether() -> U256 {
    U256::from(1_000_000_000_000_000_000u128)
}

/// Receipt of a mined legacy claim transaction, as a node returns it
pub fn mined_receipt(tx_hash: B256, success: bool) -> Value {
    json!({
        "type": "0x0",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": format!("{CLAIM_GAS_USED:#x}"),
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x11),
        "blockNumber": "0x10",
        "gasUsed": format!("{CLAIM_GAS_USED:#x}"),
        "effectiveGasPrice": "0x4a817c800",
        "from": TEST_ADDRESS,
        "to": FAUCET,
        "contractAddress": null,
    })
}
