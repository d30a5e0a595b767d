use dublaunch_errors::AppError;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Read-through cache that refetches once an entry is older than its TTL.
///
/// The lock is held across the fetch, so at most one refresh runs at a time and
/// everyone waiting gets the fresh value. Errors are returned, never cached.
pub struct RevalidatingCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> RevalidatingCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_or_refresh<F, Fut>(&self, key: K, fetch: F) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>>,
    {
        let mut entries = self.entries.lock().await;

        if let Some((fetched_at, value)) = entries.get(&key) {
            if fetched_at.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }

        let value = fetch().await?;
        entries.insert(key, (Instant::now(), value.clone()));
        Ok(value)
    }

    pub async fn invalidate(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    async fn fetch_counting(calls: &AtomicU32) -> Result<u32, AppError> {
        Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_serves_cached_value_within_ttl() {
        let cache = RevalidatingCache::new(Duration::from_secs(3600));
        let calls = AtomicU32::new(0);

        let first = cache.get_or_refresh("top", || fetch_counting(&calls)).await;
        tokio::time::advance(Duration::from_secs(3599)).await;
        let second = cache.get_or_refresh("top", || fetch_counting(&calls)).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_ttl() {
        let cache = RevalidatingCache::new(Duration::from_secs(60));
        let calls = AtomicU32::new(0);

        cache.get_or_refresh("top", || fetch_counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let refreshed = cache.get_or_refresh("top", || fetch_counting(&calls)).await;

        assert_eq!(refreshed, Ok(2));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: RevalidatingCache<&str, u32> = RevalidatingCache::new(Duration::from_secs(60));

        let failed = cache
            .get_or_refresh("top", || async {
                Err(AppError::StorageUnavailable("down".into()))
            })
            .await;
        let recovered = cache.get_or_refresh("top", || async { Ok(7) }).await;

        assert!(failed.is_err());
        assert_eq!(recovered, Ok(7));
    }

    #[tokio::test]
    async fn test_keys_are_independent_and_invalidate_forces_fetch() {
        let cache = RevalidatingCache::new(Duration::from_secs(60));

        cache.get_or_refresh(5u64, || async { Ok("five") }).await.unwrap();
        cache.get_or_refresh(10u64, || async { Ok("ten") }).await.unwrap();
        assert_eq!(cache.get_or_refresh(5u64, || async { Ok("other") }).await, Ok("five"));

        cache.invalidate(&5u64).await;
        assert_eq!(cache.get_or_refresh(5u64, || async { Ok("fresh") }).await, Ok("fresh"));
        assert_eq!(cache.get_or_refresh(10u64, || async { Ok("x") }).await, Ok("ten"));
    }
}
