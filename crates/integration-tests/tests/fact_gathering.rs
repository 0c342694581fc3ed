//! Fact-gathering tests for the local backend.
//!
//! The populated-document tests only make sense where the gathering
//! protocol is supported, so they are gated to Linux.

use std::sync::Arc;

use capstan_core::port::command_runner::mocks::MockCommandRunner;
use capstan_core::port::GatherFacts;
use capstan_core::{ConnectorError, Context};
use capstan_infra_local::{LocalConnector, ShellCommandRunner};

#[cfg(target_os = "linux")]
#[tokio::test]
async fn info_returns_populated_document() {
    let connector = LocalConnector::new(Arc::new(ShellCommandRunner::new()));
    let ctx = Context::background();

    let facts = connector
        .info(&ctx)
        .await
        .unwrap()
        .expect("facts supported on linux");

    assert!(!facts.os.hostname.is_empty());
    assert!(!facts.os.kernel_version.is_empty());
    assert!(!facts.os.architecture.is_empty());
    assert!(!facts.process.mem_info.is_empty());
    assert!(!facts.process.cpu_info.is_empty());

    // Trimming removed the trailing newline from the query output.
    assert!(!facts.os.hostname.ends_with('\n'));

    // The document keeps its wire shape end to end.
    let value = serde_json::to_value(&facts).unwrap();
    assert!(value["process"]["memInfo"].as_object().unwrap().len() >= 1);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn info_returns_fresh_documents_per_call() {
    let connector = LocalConnector::new(Arc::new(ShellCommandRunner::new()));
    let ctx = Context::background();

    let first = connector.info(&ctx).await.unwrap().unwrap();
    let second = connector.info(&ctx).await.unwrap().unwrap();

    assert_eq!(first.os.hostname, second.os.hostname);
    assert_eq!(first.os.kernel_version, second.os.kernel_version);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn info_never_returns_a_partial_document() {
    let runner = Arc::new(MockCommandRunner::new());
    let connector = LocalConnector::new(runner.clone());
    let ctx = Context::background();

    // Kernel and arch queries would succeed; hostname is broken.
    runner.stub_output("uname -r", &b"6.1.0\n"[..]);
    runner.stub_failure("hostname", "hostname lookup refused");
    runner.stub_output("arch", &b"x86_64\n"[..]);

    let err = connector.info(&ctx).await.unwrap_err();

    match err {
        ConnectorError::FactGather { fact, .. } => assert_eq!(fact, "hostname"),
        other => panic!("expected FactGather, got {other:?}"),
    }
    // The arch query never ran: gathering short-circuited.
    assert_eq!(runner.call_count(), 2);
}

#[cfg(not(target_os = "linux"))]
#[tokio::test]
async fn info_is_absent_not_an_error() {
    let connector = LocalConnector::new(Arc::new(ShellCommandRunner::new()));
    let ctx = Context::background();

    assert!(connector.info(&ctx).await.unwrap().is_none());
}
