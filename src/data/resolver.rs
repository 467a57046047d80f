use super::normalize_name;
use super::provider::DataProvider;
use crate::errors::MoveResolutionError;
use crate::model::MoveDetails;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Memoizing move lookup shared by every battle in the process.
///
/// Entries are never evicted. Failures are not cached, so a later turn may retry a
/// move that failed earlier.
pub struct MoveResolver {
    provider: Arc<dyn DataProvider>,
    cache: RwLock<HashMap<String, Arc<MoveDetails>>>,
}

impl MoveResolver {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn DataProvider> {
        &self.provider
    }

    pub async fn resolve(&self, name: &str) -> Result<Arc<MoveDetails>, MoveResolutionError> {
        let key = normalize_name(name);
        if let Some(hit) = self.cache.read().await.get(&key) {
            log::debug!("move cache hit: {key}");
            return Ok(hit.clone());
        }

        log::debug!("move cache miss: {key}");
        let details = self
            .provider
            .fetch_move(&key)
            .await
            .map_err(|source| MoveResolutionError {
                name: name.to_string(),
                source,
            })?;
        let details = Arc::new(details);
        // Two concurrent misses may both fetch; the first insert wins.
        let mut cache = self.cache.write().await;
        Ok(cache.entry(key).or_insert(details).clone())
    }

    /// Resolves every name up front, stopping at the first failure.
    pub async fn prefetch<I, S>(&self, names: I) -> Result<(), MoveResolutionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.resolve(name.as_ref()).await?;
        }
        Ok(())
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}
