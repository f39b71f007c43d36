//! Concurrent fan-out of one lookup to every applicable source.
//!
//! Each selected source runs as its own tokio task. Results are collected in
//! completion order; a task that panics or is cancelled is reported as an
//! [`ErrorRecord`] for that source, so one misbehaving source never hides the
//! others.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::normalize::{normalize, FilterPolicy, SearchSummary};
use crate::record::{ErrorRecord, LookupKey, LookupResult};
use crate::source::{Source, SourceId, SourceRegistry};

/// Error reported for a source listed for the query kind but never built.
const NOT_REGISTERED: &str = "source not registered";

/// Runs lookups against a fixed set of sources.
pub struct QueryDispatcher<S> {
    sources: BTreeMap<SourceId, Arc<S>>,
    policy: FilterPolicy,
}

impl<S: Source + 'static> QueryDispatcher<S> {
    /// Creates a dispatcher owning every source in `registry`.
    pub fn new(registry: SourceRegistry<S>) -> Self {
        let sources = registry
            .into_sources()
            .into_iter()
            .map(|(id, source)| (id, Arc::new(source)))
            .collect();
        Self {
            sources,
            policy: FilterPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FilterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Queries every source applicable to the key's kind concurrently.
    ///
    /// Returns once all sources have reported. Every selected source is
    /// represented by at least one entry; ordering follows completion.
    pub async fn search(&self, key: &LookupKey) -> Vec<LookupResult> {
        let selected = SourceId::for_kind(key.kind());
        info!(key = %key, sources = selected.len(), "Dispatching lookup");

        let mut results = Vec::new();
        let mut pending = FuturesUnordered::new();

        for &id in selected {
            let Some(source) = self.sources.get(&id) else {
                warn!(source = %id, "Source selected but not registered");
                results.push(ErrorRecord::new(id.module(), NOT_REGISTERED).into());
                continue;
            };

            let source = Arc::clone(source);
            let task_key = key.clone();
            let handle = tokio::spawn(async move { source.lookup(&task_key).await });
            pending.push(async move { (id, handle.await) });
        }

        while let Some((id, joined)) = pending.next().await {
            match joined {
                Ok(outcome) => {
                    let entries = normalize(key, id.module(), outcome, self.policy);
                    debug!(source = %id, entries = entries.len(), "Source completed");
                    results.extend(entries);
                }
                Err(e) => {
                    warn!(source = %id, error = %e, "Source task failed");
                    results.push(ErrorRecord::new(id.module(), describe_join_error(e)).into());
                }
            }
        }

        let summary = SearchSummary::from_results(&results);
        info!(
            key = %key,
            records = summary.records,
            located = summary.located_modules,
            failed = summary.failed_modules,
            "Lookup finished"
        );

        results
    }
}

fn describe_join_error(error: JoinError) -> String {
    if error.is_cancelled() {
        return "Lookup task was cancelled".to_string();
    }
    match error.try_into_panic() {
        Ok(payload) => format!("Unexpected failure: {}", panic_message(payload.as_ref())),
        Err(error) => format!("Unexpected failure: {}", error),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message;
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.as_str();
    }
    "source panicked"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NetworkRecord;
    use crate::source::{SourceOutcome, SourceRecord};
    use std::time::Duration;

    enum Behaviour {
        Respond(SourceOutcome),
        Delayed(Duration, SourceOutcome),
        Panic,
    }

    struct FakeSource {
        id: SourceId,
        behaviour: Behaviour,
    }

    impl FakeSource {
        fn new(id: SourceId, behaviour: Behaviour) -> Self {
            Self { id, behaviour }
        }

        fn not_found(id: SourceId) -> Self {
            Self::new(
                id,
                Behaviour::Respond(SourceOutcome::failed(id.module(), "not found")),
            )
        }
    }

    impl Source for FakeSource {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn lookup(&self, _key: &LookupKey) -> SourceOutcome {
            match &self.behaviour {
                Behaviour::Respond(outcome) => outcome.clone(),
                Behaviour::Delayed(delay, outcome) => {
                    tokio::time::sleep(*delay).await;
                    outcome.clone()
                }
                Behaviour::Panic => panic!("decoder exploded"),
            }
        }
    }

    fn dispatcher(sources: Vec<FakeSource>) -> QueryDispatcher<FakeSource> {
        let mut registry = SourceRegistry::new();
        for source in sources {
            registry.register(source);
        }
        QueryDispatcher::new(registry)
    }

    fn bssid_key() -> LookupKey {
        LookupKey::bssid("AA:BB:CC:DD:EE:FF").unwrap()
    }

    #[tokio::test]
    async fn test_only_applicable_sources_run() {
        let sources = SourceId::ALL.into_iter().map(FakeSource::not_found).collect();
        let results = dispatcher(sources).search(&LookupKey::ssid("home")).await;

        let mut modules: Vec<_> = results.iter().map(|r| r.module().to_string()).collect();
        modules.sort();
        assert_eq!(
            modules,
            vec!["freifunk-karte", "openwifimap", "wifidb", "wigle"]
        );
    }

    #[tokio::test]
    async fn test_unregistered_source_reported() {
        let results = dispatcher(vec![FakeSource::not_found(SourceId::Wigle)])
            .search(&bssid_key())
            .await;

        assert_eq!(results.len(), SourceId::for_kind(bssid_key().kind()).len());
        assert!(results.contains(&LookupResult::Error(ErrorRecord::new(
            "apple",
            "source not registered"
        ))));
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let mut sources: Vec<_> = SourceId::for_kind(bssid_key().kind())
            .iter()
            .copied()
            .filter(|id| *id != SourceId::Apple)
            .map(FakeSource::not_found)
            .collect();
        sources.push(FakeSource::new(SourceId::Apple, Behaviour::Panic));

        let results = dispatcher(sources).search(&bssid_key()).await;

        assert_eq!(results.len(), 7);
        let apple: Vec<_> = results.iter().filter(|r| r.module() == "apple").collect();
        assert_eq!(apple.len(), 1);
        match apple[0] {
            LookupResult::Error(record) => assert!(record.error.contains("decoder exploded")),
            other => panic!("Expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_results_follow_completion_order() {
        let slow = SourceOutcome::Single(
            SourceRecord::new("wigle", 1.0, 1.0).with_ssid("home"),
        );
        let fast = SourceOutcome::failed("wifidb", "SSID not found");
        let sources = vec![
            FakeSource::new(
                SourceId::Wigle,
                Behaviour::Delayed(Duration::from_millis(200), slow),
            ),
            FakeSource::new(SourceId::WifiDb, Behaviour::Respond(fast)),
            FakeSource::not_found(SourceId::OpenWifiMap),
            FakeSource::not_found(SourceId::Freifunk),
        ];

        let results = dispatcher(sources).search(&LookupKey::ssid("home")).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results.last().map(|r| r.module()), Some("wigle"));
    }

    #[tokio::test]
    async fn test_list_results_are_filtered() {
        let listed = SourceOutcome::Many(vec![
            SourceRecord::new("wigle", 48.85, 2.35).with_bssid("aa:bb:cc:dd:ee:ff"),
            SourceRecord::new("wigle", 10.0, 10.0).with_bssid("AA:BB:CC:DD:EE:00"),
        ]);
        let results = dispatcher(vec![FakeSource::new(
            SourceId::Wigle,
            Behaviour::Respond(listed),
        )])
        .search(&bssid_key())
        .await;

        let networks: Vec<&NetworkRecord> =
            results.iter().filter_map(LookupResult::as_network).collect();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].latitude, 48.85);
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(42u8);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "source panicked");
    }
}
