//! Test doubles and common utilities for engine contract tests
//!
//! The doubles count their calls through shared `Arc` counters so a test can
//! keep a handle after boxing the double into the engine.

#![allow(dead_code)]

use cfddns_core::error::Result;
use cfddns_core::traits::{DnsProvider, IpSource, StateStore, UpdateResult};
use cfddns_core::{EngineConfig, EngineEvent, Error};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// An IpSource that plays back a script of answers
///
/// `Ok` entries are returned as the resolved IP, `Err` entries become an
/// `Error::IpSource`. The last entry repeats once the script is exhausted.
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    last: Arc<Mutex<Option<std::result::Result<String, String>>>>,
    resolve_call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(script: Vec<std::result::Result<&str, &str>>) -> Self {
        let script = script
            .into_iter()
            .map(|step| step.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            last: Arc::new(Mutex::new(None)),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always resolve to `ip`
    pub fn fixed(ip: &str) -> Self {
        Self::new(vec![Ok(ip)])
    }

    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            resolve_call_count: Arc::clone(&other.resolve_call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn resolve(&self) -> Result<String> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);

        let mut last = self.last.lock().unwrap();
        if let Some(step) = self.script.lock().unwrap().pop_front() {
            *last = Some(step);
        }

        match last.clone() {
            Some(Ok(ip)) => Ok(ip),
            Some(Err(msg)) => Err(Error::ip_source(msg)),
            None => Err(Error::ip_source("empty script")),
        }
    }

    fn source_name(&self) -> &str {
        "scripted"
    }
}

/// Outcome a ScriptedProvider hands back for one call
#[derive(Clone)]
pub enum ProviderStep {
    Answer(UpdateResult),
    Fail(&'static str),
}

/// A DnsProvider that plays back a script of outcomes and records its calls
pub struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<ProviderStep>>>,
    fallback: ProviderStep,
    update_call_count: Arc<AtomicUsize>,
    updated_ips: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<ProviderStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback: ProviderStep::Answer(UpdateResult::Success),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updated_ips: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Answer every call with `result`
    pub fn always(result: UpdateResult) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.fallback = ProviderStep::Answer(result);
        provider
    }

    /// Sleep for `delay` inside every update
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn updated_ips(&self) -> Vec<String> {
        self.updated_ips.lock().unwrap().clone()
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            fallback: other.fallback.clone(),
            update_call_count: Arc::clone(&other.update_call_count),
            updated_ips: Arc::clone(&other.updated_ips),
            delay: other.delay,
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for ScriptedProvider {
    async fn update_record(&self, ip: &str) -> Result<UpdateResult> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updated_ips.lock().unwrap().push(ip.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match step {
            ProviderStep::Answer(result) => Ok(result),
            ProviderStep::Fail(msg) => Err(Error::http(msg)),
        }
    }

    fn record_name(&self) -> &str {
        "www.example.com"
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A StateStore that tracks calls
pub struct MockStateStore {
    load_call_count: Arc<AtomicUsize>,
    store_call_count: Arc<AtomicUsize>,
    flush_call_count: Arc<AtomicUsize>,
    state: Arc<Mutex<Option<String>>>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self {
            load_call_count: Arc::new(AtomicUsize::new(0)),
            store_call_count: Arc::new(AtomicUsize::new(0)),
            flush_call_count: Arc::new(AtomicUsize::new(0)),
            state: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_ip(ip: &str) -> Self {
        let store = Self::new();
        *store.state.lock().unwrap() = Some(ip.to_string());
        store
    }

    pub fn load_call_count(&self) -> usize {
        self.load_call_count.load(Ordering::SeqCst)
    }

    pub fn store_call_count(&self) -> usize {
        self.store_call_count.load(Ordering::SeqCst)
    }

    pub fn flush_call_count(&self) -> usize {
        self.flush_call_count.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Option<String> {
        self.state.lock().unwrap().clone()
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            load_call_count: Arc::clone(&other.load_call_count),
            store_call_count: Arc::clone(&other.store_call_count),
            flush_call_count: Arc::clone(&other.flush_call_count),
            state: Arc::clone(&other.state),
        }
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn load(&self) -> Result<Option<String>> {
        self.load_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().clone())
    }

    async fn store(&self, ip: &str) -> Result<()> {
        self.store_call_count.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = Some(ip.to_string());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.flush_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scheduler config with the production default interval
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        interval_mins: 5,
        event_channel_capacity: 100,
    }
}

/// Receive events until one matches `pred`, returning it
pub async fn wait_for<F>(rx: &mut mpsc::Receiver<EngineEvent>, mut pred: F) -> EngineEvent
where
    F: FnMut(&EngineEvent) -> bool,
{
    loop {
        let event = rx.recv().await.expect("event channel closed");
        if pred(&event) {
            return event;
        }
    }
}

/// Drain everything left in the channel
pub fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
