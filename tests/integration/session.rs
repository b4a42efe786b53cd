use alloy::transports::mock::Asserter;
use claimer_node::{
    log::SessionLog,
    session::{Session, SessionError},
};
use claimer_types::{LogEntry, Severity};
use eyre::Result;

use crate::common::{connected_client, init_test_logging, one_ether, TEST_ADDRESS, TEST_KEY};

fn has(entries: &[LogEntry], severity: Severity, needle: &str) -> bool {
    entries
        .iter()
        .any(|e| e.severity == severity && e.message.contains(needle))
}

#[tokio::test]
async fn test_unlock_wallet() -> Result<()> {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;
    asserter.push_success(&one_ether());

    let log = SessionLog::new();
    let session = Session::with_client(client, &format!("0x{TEST_KEY}"), log.clone()).await?;
    assert_eq!(session.address(), TEST_ADDRESS);

    let entries = log.entries();
    assert!(has(&entries, Severity::Info, "Validating private key"));
    assert!(has(
        &entries,
        Severity::Wallet,
        &format!("Wallet address: {TEST_ADDRESS}")
    ));
    assert!(has(&entries, Severity::Success, "Private key validated"));
    assert!(has(
        &entries,
        Severity::Wallet,
        "Balance: 1.000000000000000000 ETH"
    ));
    assert_eq!(session.balance().as_deref(), Some("1.000000000000000000"));
    // Key material never reaches the log
    assert!(entries.iter().all(|e| !e.message.contains(TEST_KEY)));
    Ok(())
}

#[tokio::test]
async fn test_invalid_key_is_logged() {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;

    let log = SessionLog::new();
    let err = Session::with_client(client, "0x1234", log.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Key(_)));
    assert!(has(
        &log.entries(),
        Severity::Error,
        "Private key validation failed"
    ));
}

#[tokio::test]
async fn test_empty_key_warns() {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;

    let log = SessionLog::new();
    let err = Session::with_client(client, "   ", log.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::MissingKey));
    assert!(has(&log.entries(), Severity::Warning, "Enter a private key"));
}

#[tokio::test]
async fn test_balance_failure_does_not_fail_session() -> Result<()> {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;
    asserter.push_failure_msg("rate limited");

    let log = SessionLog::new();
    let session = Session::with_client(client, TEST_KEY, log.clone()).await?;
    assert!(has(&log.entries(), Severity::Warning, "Failed to refresh balance"));
    assert_eq!(session.balance(), None);

    let mut balance_rx = session.watch_balance();
    asserter.push_success(&one_ether());
    let balance = session.check_balance().await;
    assert_eq!(balance.as_deref(), Some("1.000000000000000000"));
    assert!(has(
        &log.entries(),
        Severity::Success,
        "Current balance: 1.000000000000000000 ETH"
    ));
    assert!(balance_rx.has_changed()?);
    assert_eq!(
        balance_rx.borrow_and_update().as_deref(),
        Some("1.000000000000000000")
    );
    Ok(())
}

#[tokio::test]
async fn test_calldata_self_test() -> Result<()> {
    init_test_logging();
    let asserter = Asserter::new();
    let client = connected_client(&asserter).await;
    asserter.push_success(&one_ether());

    let log = SessionLog::new();
    let session = Session::with_client(client, TEST_KEY, log.clone()).await?;
    assert!(session.calldata_self_test());

    let entries = log.entries();
    assert!(has(&entries, Severity::Info, "Method id: 0x6a627842"));
    assert!(has(&entries, Severity::Info, "Length: 74 characters"));
    assert!(has(&entries, Severity::Info, "Format matches: yes"));
    Ok(())
}
