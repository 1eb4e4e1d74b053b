//! Reusable store handle with ping-then-reconnect semantics.

use crate::store::DocumentStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Opens new store handles - implement for each backend.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>>;
    /// Connection description for logging. Must not contain credentials.
    fn describe(&self) -> String;
}

/// Holds the current store handle for the whole process.
///
/// `acquire` hands out the cached handle while it answers `ping`, and
/// reconnects through the connector otherwise.
pub struct StorePool {
    connector: Box<dyn StoreConnector>,
    current: RwLock<Option<Arc<dyn DocumentStore>>>,
}

impl std::fmt::Debug for StorePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePool")
            .field("connector", &self.connector.describe())
            .finish()
    }
}

impl StorePool {
    pub fn new(connector: impl StoreConnector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            current: RwLock::new(None),
        }
    }

    pub async fn acquire(&self) -> Result<Arc<dyn DocumentStore>> {
        let cached = self.current.read().await.clone();
        if let Some(store) = cached {
            match store.ping().await {
                Ok(()) => {
                    tracing::debug!("Reusing existing {} store handle", store.name());
                    return Ok(store);
                }
                Err(e) => tracing::warn!("Store ping failed, reconnecting: {:#}", e),
            }
        }

        let mut current = self.current.write().await;
        // Another request may have reconnected while we waited for the lock.
        if let Some(store) = current.as_ref() {
            if store.ping().await.is_ok() {
                return Ok(store.clone());
            }
        }

        let description = self.connector.describe();
        let store = self
            .connector
            .connect()
            .await
            .with_context(|| format!("Failed to connect to {}", description))?;
        tracing::info!("Connected to document store {}", description);
        *current = Some(store.clone());
        Ok(store)
    }

    /// Drops the cached handle; the next `acquire` reconnects.
    pub async fn disconnect(&self) {
        if self.current.write().await.take().is_some() {
            tracing::info!(
                "Connection to document store {} closed",
                self.connector.describe()
            );
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.current.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FindOptions, MemoryConnector};
    use filter_query::Predicate;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FlakyStore {
        healthy: Arc<AtomicBool>,
        generation: usize,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn ping(&self) -> Result<()> {
            if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                anyhow::bail!("connection reset")
            }
        }

        async fn find(
            &self,
            _collection: &str,
            _filter: &Predicate,
            _options: &FindOptions,
        ) -> Result<Vec<Value>> {
            Ok(vec![json!({ "generation": self.generation })])
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    struct CountingConnector {
        connects: Arc<AtomicUsize>,
        healthy: Arc<AtomicBool>,
        fail: bool,
    }

    #[async_trait]
    impl StoreConnector for CountingConnector {
        async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
            if self.fail {
                anyhow::bail!("unreachable host");
            }
            let generation = self.connects.fetch_add(1, Ordering::SeqCst) + 1;
            self.healthy.store(true, Ordering::SeqCst);
            Ok(Arc::new(FlakyStore {
                healthy: self.healthy.clone(),
                generation,
            }))
        }

        fn describe(&self) -> String {
            "flaky://test".to_string()
        }
    }

    fn counting_pool(fail: bool) -> (StorePool, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let connects = Arc::new(AtomicUsize::new(0));
        let healthy = Arc::new(AtomicBool::new(true));
        let pool = StorePool::new(CountingConnector {
            connects: connects.clone(),
            healthy: healthy.clone(),
            fail,
        });
        (pool, connects, healthy)
    }

    async fn generation(store: &Arc<dyn DocumentStore>) -> Value {
        store
            .find("any", &Predicate::new(), &FindOptions::default())
            .await
            .unwrap()[0]["generation"]
            .clone()
    }

    #[tokio::test]
    async fn test_acquire_reuses_healthy_handle() {
        let (pool, connects, _) = counting_pool(false);
        assert!(!pool.is_connected().await);

        pool.acquire().await.unwrap();
        pool.acquire().await.unwrap();
        let store = pool.acquire().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(generation(&store).await, json!(1));
        assert!(pool.is_connected().await);
    }

    #[tokio::test]
    async fn test_acquire_reconnects_after_failed_ping() {
        let (pool, connects, healthy) = counting_pool(false);
        pool.acquire().await.unwrap();

        healthy.store(false, Ordering::SeqCst);
        let store = pool.acquire().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 2);
        assert_eq!(generation(&store).await, json!(2));
    }

    #[tokio::test]
    async fn test_disconnect_forces_reconnect() {
        let (pool, connects, _) = counting_pool(false);
        pool.acquire().await.unwrap();
        pool.disconnect().await;
        assert!(!pool.is_connected().await);

        pool.acquire().await.unwrap();
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_acquire_propagates_connect_error() {
        let (pool, _, _) = counting_pool(true);
        let err = pool.acquire().await.err().unwrap();
        assert!(format!("{:#}", err).contains("flaky://test"));
        assert!(format!("{:#}", err).contains("unreachable host"));
        assert!(!pool.is_connected().await);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_connects_once() {
        let (pool, connects, _) = counting_pool(false);
        let pool = Arc::new(pool);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_memory_connector_missing_dir() {
        let pool = StorePool::new(MemoryConnector::new("/nonexistent/catalog-api-data"));
        assert!(pool.acquire().await.is_err());
    }
}
