use chrono::{DateTime, Duration, Utc};

/// Explicit fetch cache with a freshness window. Owned by whichever component
/// derives the cached value; there is no shared singleton.
#[derive(Debug, Clone)]
pub struct FetchCache<T> {
    data: Option<T>,
    last_fetched_at: Option<DateTime<Utc>>,
    ttl: Duration,
}

impl<T> FetchCache<T> {
    pub fn new(ttl: Duration) -> Self {
        FetchCache {
            data: None,
            last_fetched_at: None,
            ttl,
        }
    }

    /// True when a value is present and was stored within the ttl window.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.data, self.last_fetched_at) {
            (Some(_), Some(at)) => now - at < self.ttl,
            _ => false,
        }
    }

    pub fn store(&mut self, value: T, now: DateTime<Utc>) {
        self.data = Some(value);
        self.last_fetched_at = Some(now);
    }

    pub fn get(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.data = None;
        self.last_fetched_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_before_first_store() {
        let cache: FetchCache<u32> = FetchCache::new(Duration::seconds(30));
        assert!(!cache.is_fresh(Utc::now()));
        assert!(cache.get().is_none());
    }

    #[test]
    fn fresh_within_ttl_and_stale_after() {
        let mut cache = FetchCache::new(Duration::seconds(30));
        let t0 = Utc::now();
        cache.store(vec![1, 2, 3], t0);

        assert!(cache.is_fresh(t0 + Duration::seconds(10)));
        assert!(!cache.is_fresh(t0 + Duration::seconds(30)));
        assert_eq!(cache.get(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn invalidate_clears_value_and_timestamp() {
        let mut cache = FetchCache::new(Duration::seconds(30));
        let t0 = Utc::now();
        cache.store(7u32, t0);
        cache.invalidate();

        assert!(!cache.is_fresh(t0));
        assert!(cache.get().is_none());
    }
}
