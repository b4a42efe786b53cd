use alloy::{
    primitives::{U256, U64},
    transports::mock::Asserter,
};
use claimer_ethereum::{ClientError, EthClient};
use claimer_types::SEPOLIA_CHAIN_ID;
use eyre::Result;

use crate::common::{
    connected_client, init_test_logging, mock_endpoint, mocked_provider, one_ether,
    push_handshake, TEST_ADDRESS,
};

#[tokio::test]
async fn test_connect_to_sepolia() -> Result<()> {
    init_test_logging();
    let asserter = Asserter::new();

    let client = connected_client(&asserter).await;
    assert_eq!(client.chain_id(), SEPOLIA_CHAIN_ID);

    let info = client.connection();
    assert_eq!(info.endpoint, mock_endpoint());
    assert_eq!(info.chain_id, SEPOLIA_CHAIN_ID);
    assert!(info.connected);
    Ok(())
}

#[tokio::test]
async fn test_connect_rejects_wrong_network() {
    init_test_logging();
    let asserter = Asserter::new();
    push_handshake(&asserter, 1);

    let err = EthClient::connect_with(mocked_provider(&asserter), mock_endpoint())
        .await
        .err()
        .expect("mainnet must be rejected");
    match err {
        ClientError::WrongNetwork { expected, actual } => {
            assert_eq!(expected, SEPOLIA_CHAIN_ID);
            assert_eq!(actual, 1);
        }
        e => panic!("unexpected error: {e}"),
    }
}

#[tokio::test]
async fn test_connect_node_not_listening() {
    init_test_logging();
    let asserter = Asserter::new();
    asserter.push_success(&false);

    let err = EthClient::connect_with(mocked_provider(&asserter), mock_endpoint())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::NetworkUnreachable(_)));
}

#[tokio::test]
async fn test_connect_rpc_failure() {
    init_test_logging();
    let asserter = Asserter::new();
    asserter.push_failure_msg("connection refused");

    let err = EthClient::connect_with(mocked_provider(&asserter), mock_endpoint())
        .await
        .err()
        .unwrap();
    let ClientError::NetworkUnreachable(reason) = err else {
        panic!("expected an unreachable network");
    };
    assert!(reason.contains("connection refused"));
}

#[tokio::test]
async fn test_chain_id_failure_is_unreachable() {
    init_test_logging();
    let asserter = Asserter::new();
    asserter.push_success(&true);
    asserter.push_failure_msg("timed out");

    let err = EthClient::connect_with(mocked_provider(&asserter), mock_endpoint())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::NetworkUnreachable(_)));
}

#[tokio::test]
async fn test_balance_in_ether() -> Result<()> {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;

    asserter.push_success(&(one_ether() * U256::from(3) / U256::from(2)));
    let balance = client.get_balance(TEST_ADDRESS).await?;
    assert!(balance.starts_with("1.5"), "got {balance}");
    Ok(())
}

#[tokio::test]
async fn test_nonce() -> Result<()> {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;

    asserter.push_success(&U64::from(7));
    assert_eq!(client.get_nonce(TEST_ADDRESS).await?, 7);
    Ok(())
}

#[tokio::test]
async fn test_query_failure() {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;

    asserter.push_failure_msg("header not found");
    let err = client.get_balance(TEST_ADDRESS).await.unwrap_err();
    assert!(matches!(err, ClientError::QueryFailed(_)));
}
