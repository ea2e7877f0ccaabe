use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CachedEntry<T> {
    value: T,
    expires_at: Instant,
}

/// Per-token cache with a fixed time to live.
pub struct TokenCache<T> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedEntry<T>>>,
}

impl<T: Clone> TokenCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, token: &str) -> Option<T> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(token) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(token) {
            if entry.expires_at <= now {
                entries.remove(token);
            } else {
                return Some(entry.value.clone());
            }
        }

        None
    }

    pub async fn insert(&self, token: String, value: T) {
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;
        entries.insert(token, CachedEntry { value, expires_at });
    }
}
