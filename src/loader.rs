//! Offline-aware content loader with stale-cache fallback
//!
//! Loads a subcategory and its dua items by id, preferring a cached copy
//! when one exists while opportunistically refreshing the cache from the
//! network. A cached result is always surfaced over a same-cycle network
//! result, so the screen never flickers to different content mid-read; the
//! fresh data waits in the store for the next load.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::net::ApiRoutes;
use crate::store::{StoreError, StoreManager};

/// Errors that can occur during a network fetch attempt
///
/// All of these are absorbed by the loader when a cached fallback exists;
/// they only shape the `Unavailable` message when nothing else is left.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the connection dropped
    #[error("network request failed: {0}")]
    RequestFailed(String),

    /// Server answered with a non-success status
    #[error("request returned status {0}")]
    BadStatus(u16),

    /// Body was not parseable as the expected JSON shape
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// Fetches a URL and parses the body as JSON
pub trait NetworkClient {
    fn fetch_json(&self, url: &str) -> impl Future<Output = Result<Value, FetchError>>;
}

/// Durable string-valued key-value store
///
/// A failed read is equivalent to an absent key; a failed write is skipped
/// by callers, never fatal.
pub trait DurableStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl DurableStore for StoreManager {
    fn get(&self, key: &str) -> Option<String> {
        StoreManager::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        StoreManager::set(self, key, value)
    }
}

/// Point-in-time network reachability snapshot
pub trait ConnectivityProbe {
    fn is_reachable(&self) -> bool;
}

impl ConnectivityProbe for Box<dyn ConnectivityProbe> {
    fn is_reachable(&self) -> bool {
        self.as_ref().is_reachable()
    }
}

/// The value associated with a content key: a metadata record plus the
/// ordered item records. Both are opaque to the loader; only the
/// presentation layer interprets their fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBundle {
    /// Subcategory metadata record
    pub metadata: Value,
    /// Ordered dua item records
    pub items: Vec<Value>,
}

/// Persisted envelope for a cached bundle
///
/// No expiry field: entries are only ever replaced by a newer successful
/// fetch, never aged out.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    bundle: ContentBundle,
    cached_at: DateTime<Utc>,
}

/// Result of a load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// From the network; no cache entry existed before this load
    Fresh(ContentBundle),
    /// From the local store; any same-cycle network result only updated the
    /// cache for next time
    Cached(ContentBundle),
    /// Neither source produced data
    Unavailable(String),
}

/// No-data message when the network is unreachable
const NO_DATA_OFFLINE: &str = "no internet connection and no cached data available";

/// No-data message on the manual retry path
const NO_DATA_OFFLINE_RETRY: &str = "still no internet connection and no cached data available";

/// No-data message when the network was reachable but the fetch failed
const NO_DATA_FETCH_FAILED: &str = "could not load content and no cached data available";

/// Loads named content bundles, tolerating full network unavailability
///
/// Collaborators are injected so tests can run fully in memory; production
/// wiring uses [`crate::net::HttpClient`], [`StoreManager`] and a
/// [`crate::net::TcpProbe`].
#[derive(Debug)]
pub struct ContentLoader<N, S, P> {
    network: N,
    store: S,
    probe: P,
    routes: ApiRoutes,
}

impl<N, S, P> ContentLoader<N, S, P>
where
    N: NetworkClient,
    S: DurableStore,
    P: ConnectivityProbe,
{
    pub fn new(network: N, store: S, probe: P, routes: ApiRoutes) -> Self {
        Self {
            network,
            store,
            probe,
            routes,
        }
    }

    /// Loads the bundle for a subcategory id
    ///
    /// Single-shot and not cancellable mid-flight; a caller that loses
    /// interest simply discards the outcome, and an in-flight cache write
    /// still takes effect.
    pub async fn load(&self, key: &str) -> LoadOutcome {
        self.run(key, false).await
    }

    /// Manual retry entry point, invoked by explicit user action
    ///
    /// Same algorithm and same cache key namespace as [`load`](Self::load);
    /// only the no-data message differs.
    pub async fn retry(&self, key: &str) -> LoadOutcome {
        self.run(key, true).await
    }

    /// When the bundle for a key was stored, if ever
    pub fn cached_since(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.store.get(&Self::cache_key(key))?;
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;
        Some(entry.cached_at)
    }

    /// Single namespace for both the automatic and the retry path
    fn cache_key(key: &str) -> String {
        format!("subcategory_{}", key)
    }

    async fn run(&self, key: &str, retry: bool) -> LoadOutcome {
        let cache_key = Self::cache_key(key);

        // A cache hit is the tentative outcome before any network work.
        let cached = self.read_cached(&cache_key);
        let reachable = self.probe.is_reachable();

        if reachable {
            match self.fetch_bundle(key).await {
                Ok(bundle) => {
                    // The cache never holds data staler than the last
                    // successful fetch.
                    self.write_cached(&cache_key, &bundle);
                    if cached.is_none() {
                        return LoadOutcome::Fresh(bundle);
                    }
                    // A pre-existing cache hit stays the surfaced result;
                    // the fresh bundle only serves the next load.
                }
                Err(err) => {
                    warn!(key, error = %err, "content refresh failed");
                }
            }
        }

        match cached {
            Some(bundle) => LoadOutcome::Cached(bundle),
            None => {
                let reason = match (reachable, retry) {
                    (false, false) => NO_DATA_OFFLINE,
                    (false, true) => NO_DATA_OFFLINE_RETRY,
                    (true, _) => NO_DATA_FETCH_FAILED,
                };
                LoadOutcome::Unavailable(reason.to_string())
            }
        }
    }

    /// Fetches metadata, then items; both must succeed for the fetch to
    /// count, so a half-failed attempt never reaches the cache.
    async fn fetch_bundle(&self, key: &str) -> Result<ContentBundle, FetchError> {
        let metadata = self
            .network
            .fetch_json(&self.routes.subcategory_url(key))
            .await?;
        let items_body = self.network.fetch_json(&self.routes.items_url(key)).await?;
        let items = extract_items(items_body)?;
        Ok(ContentBundle { metadata, items })
    }

    fn read_cached(&self, cache_key: &str) -> Option<ContentBundle> {
        let raw = self.store.get(cache_key)?;
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry.bundle),
            Err(err) => {
                warn!(cache_key, error = %err, "discarding malformed cache entry");
                None
            }
        }
    }

    /// Best-effort overwrite; a skipped write never aborts the load
    fn write_cached(&self, cache_key: &str, bundle: &ContentBundle) {
        let entry = CacheEntry {
            bundle: bundle.clone(),
            cached_at: Utc::now(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(err) = self.store.set(cache_key, &json) {
                    warn!(cache_key, error = %err, "cache write skipped");
                }
            }
            Err(err) => {
                warn!(cache_key, error = %err, "cache entry serialization failed");
            }
        }
    }
}

/// Accepts a bare list or an object wrapping the list under `data`
fn extract_items(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(FetchError::MalformedBody(
                "items response is not a list".to_string(),
            )),
        },
        _ => Err(FetchError::MalformedBody(
            "items response is not a list".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted response for a single URL
    #[derive(Debug, Clone)]
    enum Scripted {
        Ok(Value),
        Status(u16),
        ConnectionDropped,
    }

    /// In-memory network returning scripted responses per URL
    struct FakeNetwork {
        responses: HashMap<String, Scripted>,
    }

    impl FakeNetwork {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn respond(mut self, url: &str, scripted: Scripted) -> Self {
            self.responses.insert(url.to_string(), scripted);
            self
        }
    }

    impl NetworkClient for FakeNetwork {
        async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
            match self.responses.get(url) {
                Some(Scripted::Ok(value)) => Ok(value.clone()),
                Some(Scripted::Status(code)) => Err(FetchError::BadStatus(*code)),
                Some(Scripted::ConnectionDropped) | None => Err(FetchError::RequestFailed(
                    format!("connection dropped: {}", url),
                )),
            }
        }
    }

    /// In-memory store with optional write failure injection
    struct FakeStore {
        entries: RefCell<HashMap<String, String>>,
        fail_writes: bool,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                entries: RefCell::new(HashMap::new()),
                fail_writes: false,
            }
        }

        fn failing_writes() -> Self {
            Self {
                entries: RefCell::new(HashMap::new()),
                fail_writes: true,
            }
        }

        fn raw(&self, key: &str) -> Option<String> {
            self.entries.borrow().get(key).cloned()
        }

        fn seed(&self, key: &str, value: &str) {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl DurableStore for FakeStore {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::WriteFailed(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "store is read-only",
                )));
            }
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    impl DurableStore for &FakeStore {
        fn get(&self, key: &str) -> Option<String> {
            (*self).get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            (*self).set(key, value)
        }
    }

    struct FakeProbe(bool);

    impl ConnectivityProbe for FakeProbe {
        fn is_reachable(&self) -> bool {
            self.0
        }
    }

    fn routes() -> ApiRoutes {
        ApiRoutes::new("https://api.test")
    }

    fn metadata_url(key: &str) -> String {
        format!("https://api.test/api/subcategories/{}", key)
    }

    fn items_url(key: &str) -> String {
        format!("https://api.test/api/duas/subcategory/{}", key)
    }

    fn sample_metadata() -> Value {
        json!({ "id": 12, "name": "Morning" })
    }

    fn sample_items() -> Value {
        json!([
            { "id": 1, "title": "Upon waking" },
            { "id": 2, "title": "Leaving the home" }
        ])
    }

    fn sample_bundle() -> ContentBundle {
        ContentBundle {
            metadata: sample_metadata(),
            items: sample_items().as_array().unwrap().clone(),
        }
    }

    fn seed_cache(store: &FakeStore, key: &str, bundle: &ContentBundle) {
        let entry = CacheEntry {
            bundle: bundle.clone(),
            cached_at: Utc::now(),
        };
        store.seed(
            &format!("subcategory_{}", key),
            &serde_json::to_string(&entry).unwrap(),
        );
    }

    #[tokio::test]
    async fn test_cached_entry_offline_returns_cached() {
        let store = FakeStore::new();
        let bundle = ContentBundle {
            metadata: json!({ "name": "Morning" }),
            items: vec![],
        };
        seed_cache(&store, "sub_12", &bundle);
        let loader = ContentLoader::new(FakeNetwork::new(), &store, FakeProbe(false), routes());

        let outcome = loader.load("sub_12").await;

        assert_eq!(outcome, LoadOutcome::Cached(bundle));
    }

    #[tokio::test]
    async fn test_no_cache_offline_returns_unavailable() {
        let store = FakeStore::new();
        let loader = ContentLoader::new(FakeNetwork::new(), &store, FakeProbe(false), routes());

        let outcome = loader.load("sub_99").await;

        assert_eq!(
            outcome,
            LoadOutcome::Unavailable(
                "no internet connection and no cached data available".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_no_cache_online_returns_fresh_and_populates_cache() {
        let store = FakeStore::new();
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Ok(sample_items()));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        assert_eq!(outcome, LoadOutcome::Fresh(sample_bundle()));
        assert!(
            store.raw("subcategory_sub_12").is_some(),
            "Cache should now contain the sub_12 bundle"
        );

        // A subsequent offline load surfaces the same bundle from the cache.
        let offline = ContentLoader::new(FakeNetwork::new(), &store, FakeProbe(false), routes());
        let second = offline.load("sub_12").await;
        assert_eq!(second, LoadOutcome::Cached(sample_bundle()));
    }

    #[tokio::test]
    async fn test_cache_first_when_cache_and_network_disagree() {
        let store = FakeStore::new();
        let old_bundle = ContentBundle {
            metadata: json!({ "name": "Morning (old)" }),
            items: vec![json!({ "id": 1, "title": "Old title" })],
        };
        seed_cache(&store, "sub_12", &old_bundle);

        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Ok(sample_items()));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        // The already-established cached value wins this cycle...
        assert_eq!(outcome, LoadOutcome::Cached(old_bundle));

        // ...while the fresh bundle silently replaced the stored entry.
        let offline = ContentLoader::new(FakeNetwork::new(), &store, FakeProbe(false), routes());
        let next = offline.load("sub_12").await;
        assert_eq!(next, LoadOutcome::Cached(sample_bundle()));
    }

    #[tokio::test]
    async fn test_repeated_loads_produce_identical_bundles() {
        let store = FakeStore::new();
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Ok(sample_items()));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let first = match loader.load("sub_12").await {
            LoadOutcome::Fresh(bundle) => bundle,
            other => panic!("Expected Fresh, got {:?}", other),
        };
        let second = match loader.load("sub_12").await {
            LoadOutcome::Cached(bundle) => bundle,
            other => panic!("Expected Cached, got {:?}", other),
        };

        // Unchanged remote data must serialize byte-identically across loads.
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_partial_fetch_failure_keeps_existing_entry() {
        let store = FakeStore::new();
        let bundle = sample_bundle();
        seed_cache(&store, "sub_12", &bundle);
        let entry_before = store.raw("subcategory_sub_12").unwrap();

        // Metadata succeeds, items fetch fails.
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Status(500));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        assert_eq!(outcome, LoadOutcome::Cached(bundle));
        assert_eq!(
            store.raw("subcategory_sub_12").unwrap(),
            entry_before,
            "Old entry must remain readable and unchanged"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_without_cache_is_unavailable() {
        let store = FakeStore::new();
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::ConnectionDropped);
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        assert_eq!(
            outcome,
            LoadOutcome::Unavailable("could not load content and no cached data available".into())
        );
    }

    #[tokio::test]
    async fn test_malformed_cache_entry_treated_as_miss() {
        let store = FakeStore::new();
        store.seed("subcategory_sub_12", "{ not json");
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Ok(sample_items()));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        // The malformed entry reads as absent, so the network result is Fresh.
        assert_eq!(outcome, LoadOutcome::Fresh(sample_bundle()));
    }

    #[tokio::test]
    async fn test_store_write_failure_does_not_abort_load() {
        let store = FakeStore::failing_writes();
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Ok(sample_items()));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        assert_eq!(outcome, LoadOutcome::Fresh(sample_bundle()));
    }

    #[tokio::test]
    async fn test_retry_uses_same_namespace_with_different_message() {
        let store = FakeStore::new();
        let bundle = sample_bundle();
        seed_cache(&store, "sub_12", &bundle);
        let loader = ContentLoader::new(FakeNetwork::new(), &store, FakeProbe(false), routes());

        // Retry reads the entry the automatic path wrote.
        let outcome = loader.retry("sub_12").await;
        assert_eq!(outcome, LoadOutcome::Cached(bundle));

        // And its no-data message differs from the automatic one.
        let empty = FakeStore::new();
        let loader = ContentLoader::new(FakeNetwork::new(), &empty, FakeProbe(false), routes());
        let outcome = loader.retry("sub_99").await;
        assert_eq!(
            outcome,
            LoadOutcome::Unavailable(
                "still no internet connection and no cached data available".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_items_wrapped_in_data_object_accepted() {
        let store = FakeStore::new();
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(
                &items_url("sub_12"),
                Scripted::Ok(json!({ "data": sample_items() })),
            );
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        assert_eq!(outcome, LoadOutcome::Fresh(sample_bundle()));
    }

    #[tokio::test]
    async fn test_non_list_items_body_is_fetch_failure() {
        let store = FakeStore::new();
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Ok(json!("not a list")));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        let outcome = loader.load("sub_12").await;

        assert!(matches!(outcome, LoadOutcome::Unavailable(_)));
        assert!(store.raw("subcategory_sub_12").is_none());
    }

    #[tokio::test]
    async fn test_cached_since_reports_storage_time() {
        let store = FakeStore::new();
        let network = FakeNetwork::new()
            .respond(&metadata_url("sub_12"), Scripted::Ok(sample_metadata()))
            .respond(&items_url("sub_12"), Scripted::Ok(sample_items()));
        let loader = ContentLoader::new(network, &store, FakeProbe(true), routes());

        assert!(loader.cached_since("sub_12").is_none());

        let before = Utc::now();
        loader.load("sub_12").await;
        let after = Utc::now();

        let since = loader.cached_since("sub_12").expect("entry should exist");
        assert!(since >= before && since <= after);
    }
}
