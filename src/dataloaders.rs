//! Request-scoped batch loading
//!
//! Implements the DataLoader pattern for preventing N+1 query problems.
//! See: https://github.com/graphql/dataloader
//!
//! A loader memoizes fetches for the lifetime of one GraphQL request. Every
//! internal failure is logged here with full detail and replaced by a generic
//! localized message; nothing from the store reaches the client.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::error;

use crate::context::RequestScope;
use crate::executor::{FetchFailure, QueryExecutor};
use crate::i18n::{EntityLabel, MessageKey};
use crate::{ConnectionError, Result};

/// Batch fetcher trait for loading multiple items at once.
///
/// Implementations should fetch all items for the given keys in a single
/// database query to avoid N+1 problems. Keys absent from the store are
/// simply left out of the returned map.
#[async_trait]
pub trait BatchFetcher<K, V>: Send + Sync
where
    K: Send + Sync + Clone + Eq + Hash,
    V: Send + Sync + Clone,
{
    async fn fetch_batch(&self, keys: &[K]) -> std::result::Result<HashMap<K, V>, FetchFailure>;
}

/// Entity that knows its own stable key.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// A [`BatchFetcher`] over an injected [`QueryExecutor`].
///
/// Runs one named operation for the whole key batch and drains the result
/// cursor, so both query rejection and cursor iteration failures surface
/// with their own [`FetchFailure`] kind.
pub struct ExecutorFetcher<T, E> {
    operation: &'static str,
    executor: E,
    _marker: PhantomData<fn() -> T>,
}

impl<T, E> ExecutorFetcher<T, E> {
    pub fn new(operation: &'static str, executor: E) -> Self {
        Self {
            operation,
            executor,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, E> BatchFetcher<String, T> for ExecutorFetcher<T, E>
where
    T: Keyed + Send + Sync + Clone,
    E: QueryExecutor<T>,
{
    async fn fetch_batch(
        &self,
        keys: &[String],
    ) -> std::result::Result<HashMap<String, T>, FetchFailure> {
        let mut cursor = self.executor.run(self.operation, keys).await?;
        let rows = cursor.all().await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.key().to_string(), row))
            .collect())
    }
}

/// DataLoader with per-request caching and batching.
///
/// One instance is constructed per request context and dropped with it. The
/// cache maps `key -> resolved value`, so the same entity is fetched at most
/// once per request. Instances must never be shared or reused across
/// requests or users; a cache that outlives its request would leak one
/// caller's permitted data into another's response.
pub struct DataLoader<K, V, F>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
    F: BatchFetcher<K, V> + 'static,
{
    name: &'static str,
    entity: EntityLabel,
    fetcher: Arc<F>,
    scope: RequestScope,
    cache: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V, F> DataLoader<K, V, F>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
    F: BatchFetcher<K, V> + 'static,
{
    /// Create a loader for one request scope.
    pub fn new(name: &'static str, entity: EntityLabel, fetcher: F, scope: RequestScope) -> Self {
        Self {
            name,
            entity,
            fetcher: Arc::new(fetcher),
            scope,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load a single item by key.
    pub async fn load(&self, key: K) -> Result<V> {
        let mut values = self.load_many(std::slice::from_ref(&key)).await?;
        Ok(values.remove(0))
    }

    /// Load multiple items by keys.
    ///
    /// Returns values in input order; duplicate keys are fetched once but
    /// still occupy their positions in the output.
    pub async fn load_many(&self, keys: &[K]) -> Result<Vec<V>> {
        let mut missing: Vec<K> = Vec::new();
        {
            let cache = self.cache.lock().await;
            let mut seen = HashSet::new();
            for key in keys {
                if !cache.contains_key(key) && seen.insert(key.clone()) {
                    missing.push(key.clone());
                }
            }
        }

        if !missing.is_empty() {
            let fetched = match self.fetcher.fetch_batch(&missing).await {
                Ok(fetched) => fetched,
                Err(failure) => return Err(self.convert(failure)),
            };
            let mut cache = self.cache.lock().await;
            for (key, value) in fetched {
                cache.insert(key, value);
            }
        }

        let cache = self.cache.lock().await;
        let mut values = Vec::with_capacity(keys.len());
        let mut absent = 0usize;
        for key in keys {
            match cache.get(key) {
                Some(value) => values.push(value.clone()),
                None => absent += 1,
            }
        }
        if absent > 0 {
            error!(
                request_id = %self.scope.request_id,
                loader = self.name,
                missing = absent,
                "batch fetch returned no row for requested key(s)"
            );
            return Err(ConnectionError::Database(self.scope.message(
                &MessageKey::UnableToFind {
                    entity: self.entity,
                },
            )));
        }
        Ok(values)
    }

    /// Prime the cache with a value.
    ///
    /// Useful for seeding the cache with data you already have.
    pub async fn prime(&self, key: K, value: V) {
        let mut cache = self.cache.lock().await;
        cache.insert(key, value);
    }

    /// Clear the cache.
    pub async fn clear(&self) {
        let mut cache = self.cache.lock().await;
        cache.clear();
    }

    fn convert(&self, failure: FetchFailure) -> ConnectionError {
        let message = self.scope.message(&MessageKey::UnableToFind {
            entity: self.entity,
        });
        match failure {
            FetchFailure::Query(detail) => {
                error!(
                    request_id = %self.scope.request_id,
                    loader = self.name,
                    error = %detail,
                    "query rejected by store"
                );
                ConnectionError::Database(message)
            }
            FetchFailure::Iteration(detail) => {
                error!(
                    request_id = %self.scope.request_id,
                    loader = self.name,
                    error = %detail,
                    "result cursor failed during iteration"
                );
                ConnectionError::Cursor(message)
            }
        }
    }
}

impl<K, V, F> Clone for DataLoader<K, V, F>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
    F: BatchFetcher<K, V> + 'static,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            entity: self.entity,
            fetcher: self.fetcher.clone(),
            scope: self.scope.clone(),
            cache: self.cache.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ResultCursor, VecCursor};
    use crate::i18n::Locale;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Domain {
        id: String,
    }

    impl Keyed for Domain {
        fn key(&self) -> &str {
            &self.id
        }
    }

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BatchFetcher<String, Domain> for CountingFetcher {
        async fn fetch_batch(
            &self,
            keys: &[String],
        ) -> std::result::Result<HashMap<String, Domain>, FetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(keys
                .iter()
                .map(|k| (k.clone(), Domain { id: k.clone() }))
                .collect())
        }
    }

    struct FailingFetcher {
        failure: FetchFailure,
    }

    #[async_trait]
    impl BatchFetcher<String, Domain> for FailingFetcher {
        async fn fetch_batch(
            &self,
            _keys: &[String],
        ) -> std::result::Result<HashMap<String, Domain>, FetchFailure> {
            Err(self.failure.clone())
        }
    }

    struct EmptyFetcher;

    #[async_trait]
    impl BatchFetcher<String, Domain> for EmptyFetcher {
        async fn fetch_batch(
            &self,
            _keys: &[String],
        ) -> std::result::Result<HashMap<String, Domain>, FetchFailure> {
            Ok(HashMap::new())
        }
    }

    fn loader<F: BatchFetcher<String, Domain>>(fetcher: F) -> DataLoader<String, Domain, F> {
        DataLoader::new(
            "load_domains_by_key",
            EntityLabel::Domains,
            fetcher,
            RequestScope::new(Locale::English),
        )
    }

    #[tokio::test]
    async fn test_load_caches_within_the_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = loader(CountingFetcher {
            calls: calls.clone(),
        });

        let first = loader.load("a.example.com".to_string()).await.unwrap();
        let second = loader.load("a.example.com".to_string()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_many_preserves_order_and_dedups_fetches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = loader(CountingFetcher {
            calls: calls.clone(),
        });

        let keys = vec![
            "b.example.com".to_string(),
            "a.example.com".to_string(),
            "b.example.com".to_string(),
        ];
        let values = loader.load_many(&keys).await.unwrap();
        assert_eq!(
            values.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["b.example.com", "a.example.com", "b.example.com"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_failure_becomes_generic_database_error() {
        let loader = loader(FailingFetcher {
            failure: FetchFailure::Query("syntax error near FOR".to_string()),
        });

        let err = loader.load("a.example.com".to_string()).await.unwrap_err();
        match err {
            ConnectionError::Database(message) => {
                assert_eq!(message, "Unable to find `domain(s)`. Please try again.");
                assert!(!message.contains("syntax error"));
            }
            other => panic!("expected a database error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_iteration_failure_becomes_generic_cursor_error() {
        let loader = loader(FailingFetcher {
            failure: FetchFailure::Iteration("socket closed".to_string()),
        });

        let err = loader.load("a.example.com".to_string()).await.unwrap_err();
        match err {
            ConnectionError::Cursor(message) => {
                assert_eq!(message, "Unable to find `domain(s)`. Please try again.");
            }
            other => panic!("expected a cursor error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_a_generic_error() {
        let loader = loader(EmptyFetcher);
        let err = loader
            .load("ghost.example.com".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Database(_)));
    }

    #[tokio::test]
    async fn test_prime_seeds_the_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = loader(CountingFetcher {
            calls: calls.clone(),
        });

        loader
            .prime(
                "a.example.com".to_string(),
                Domain {
                    id: "primed".to_string(),
                },
            )
            .await;
        let value = loader.load("a.example.com".to_string()).await.unwrap();
        assert_eq!(value.id, "primed");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_drops_cached_values() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = loader(CountingFetcher {
            calls: calls.clone(),
        });

        loader.load("a.example.com".to_string()).await.unwrap();
        loader.clear().await;
        loader.load("a.example.com".to_string()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    struct VecExecutor {
        rows: Vec<Domain>,
        reject: bool,
    }

    #[async_trait]
    impl QueryExecutor<Domain> for VecExecutor {
        async fn run(
            &self,
            _operation: &str,
            keys: &[String],
        ) -> std::result::Result<Box<dyn ResultCursor<Domain>>, FetchFailure> {
            if self.reject {
                return Err(FetchFailure::Query("permission denied".to_string()));
            }
            let rows = self
                .rows
                .iter()
                .filter(|row| keys.contains(&row.id))
                .cloned()
                .collect();
            Ok(Box::new(VecCursor::new(rows)))
        }
    }

    #[tokio::test]
    async fn test_executor_fetcher_maps_rows_by_key() {
        let fetcher = ExecutorFetcher::new(
            "domains_by_key",
            VecExecutor {
                rows: vec![
                    Domain {
                        id: "a.example.com".to_string(),
                    },
                    Domain {
                        id: "b.example.com".to_string(),
                    },
                ],
                reject: false,
            },
        );
        let fetched = fetcher
            .fetch_batch(&["b.example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(fetched.contains_key("b.example.com"));
    }

    #[tokio::test]
    async fn test_executor_fetcher_propagates_query_rejection() {
        let fetcher = ExecutorFetcher::new(
            "domains_by_key",
            VecExecutor {
                rows: Vec::new(),
                reject: true,
            },
        );
        let failure = fetcher
            .fetch_batch(&["a.example.com".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(failure, FetchFailure::Query(_)));
    }
}
