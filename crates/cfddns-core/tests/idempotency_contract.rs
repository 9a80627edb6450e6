//! Contract Test: Idempotency
//!
//! Constraints verified:
//! - An unchanged IP never reaches the DnsProvider
//! - A persisted IP from a previous run counts as unchanged
//! - Each distinct IP is sent to the provider exactly once

mod common;

use cfddns_core::{DdnsEngine, EngineEvent, TickOutcome};
use common::*;

#[tokio::test]
async fn unchanged_ip_does_not_call_provider() {
    let ip_source = ScriptedIpSource::fixed("203.0.113.5");
    let provider = ScriptedProvider::new(Vec::new());
    let state_store = MockStateStore::new();

    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(ScriptedIpSource::sharing_counters_with(&ip_source)),
        Box::new(ScriptedProvider::sharing_counters_with(&provider)),
        Box::new(MockStateStore::sharing_counters_with(&state_store)),
        &test_engine_config(),
    )
    .expect("engine construction succeeds");

    assert!(matches!(engine.tick().await.unwrap(), TickOutcome::Updated(_)));
    assert_eq!(engine.tick().await.unwrap(), TickOutcome::Unchanged);
    assert_eq!(engine.tick().await.unwrap(), TickOutcome::Unchanged);

    assert_eq!(ip_source.resolve_call_count(), 3);
    assert_eq!(
        provider.update_call_count(),
        1,
        "Only the first tick should reach the provider"
    );
    assert_eq!(state_store.store_call_count(), 1);
}

#[tokio::test]
async fn persisted_ip_from_previous_run_is_unchanged() {
    let provider = ScriptedProvider::new(Vec::new());
    let state_store = MockStateStore::with_ip("203.0.113.5");

    let (engine, mut event_rx) = DdnsEngine::new(
        Box::new(ScriptedIpSource::fixed("203.0.113.5")),
        Box::new(ScriptedProvider::sharing_counters_with(&provider)),
        Box::new(MockStateStore::sharing_counters_with(&state_store)),
        &test_engine_config(),
    )
    .expect("engine construction succeeds");

    assert_eq!(engine.tick().await.unwrap(), TickOutcome::Unchanged);
    assert_eq!(provider.update_call_count(), 0);
    assert_eq!(state_store.store_call_count(), 0);

    assert_eq!(
        drain(&mut event_rx),
        vec![EngineEvent::IpUnchanged {
            ip: "203.0.113.5".to_string()
        }]
    );
}

#[tokio::test]
async fn each_distinct_ip_is_sent_once() {
    let provider = ScriptedProvider::new(Vec::new());
    let state_store = MockStateStore::new();

    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(ScriptedIpSource::new(vec![
            Ok("1.2.3.4"),
            Ok("1.2.3.4"),
            Ok("1.2.3.5"),
            Ok("1.2.3.5"),
            Ok("1.2.3.4"),
        ])),
        Box::new(ScriptedProvider::sharing_counters_with(&provider)),
        Box::new(MockStateStore::sharing_counters_with(&state_store)),
        &test_engine_config(),
    )
    .expect("engine construction succeeds");

    for _ in 0..5 {
        engine.tick().await.unwrap();
    }

    assert_eq!(provider.updated_ips(), vec!["1.2.3.4", "1.2.3.5", "1.2.3.4"]);
    assert_eq!(state_store.current().as_deref(), Some("1.2.3.4"));
}
