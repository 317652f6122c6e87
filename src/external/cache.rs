// 搜索结果缓存
//
// 同一个查询（页码、年份、评分、类型）在 TTL 内直接返回缓存的结果页，
// 后台任务定期清理过期条目。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::models::{ResultPage, SearchQuery};

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Slot<T> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// 带过期时间的内存缓存
#[derive(Debug, Clone)]
pub struct MemoryCache<T> {
    slots: Arc<RwLock<HashMap<String, Slot<T>>>>,
    ttl: Duration,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// 过期条目视为不存在，由清理任务统一删除
    pub fn get(&self, key: &str) -> Option<T> {
        let slots = self.slots.read().ok()?;
        slots
            .get(key)
            .filter(|slot| slot.is_live(Instant::now()))
            .map(|slot| slot.value.clone())
    }

    pub fn insert(&self, key: String, value: T) {
        if let Ok(mut slots) = self.slots.write() {
            let expires_at = Instant::now() + self.ttl;
            slots.insert(key, Slot { value, expires_at });
        }
    }

    pub fn clear(&self) {
        if let Ok(mut slots) = self.slots.write() {
            slots.clear();
        }
    }

    /// 删除过期条目，返回删除的数量
    pub fn purge_expired(&self) -> usize {
        let Ok(mut slots) = self.slots.write() else {
            return 0;
        };
        let now = Instant::now();
        let before = slots.len();
        slots.retain(|_, slot| slot.is_live(now));
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.read().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 电影搜索结果缓存，按 `SearchQuery::cache_key` 索引
#[derive(Debug, Clone)]
pub struct SearchCache {
    pages: MemoryCache<ResultPage>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl SearchCache {
    /// 搜索结果默认缓存10分钟
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            pages: MemoryCache::new(ttl),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self, query: &SearchQuery) -> Option<ResultPage> {
        let cached = self.pages.get(&query.cache_key());
        let counter = if cached.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        cached
    }

    pub fn set(&self, query: &SearchQuery, page: ResultPage) {
        self.pages.insert(query.cache_key(), page);
    }

    pub fn cleanup_expired(&self) -> usize {
        self.pages.purge_expired()
    }

    pub fn clear_all(&self) {
        self.pages.clear();
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            search_cache_size: self.pages.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub search_cache_size: usize,
    pub hits: u64,
    pub misses: u64,
}

/// 定期清理过期搜索结果的后台任务
pub struct CacheCleanupTask {
    cache: SearchCache,
    interval: Duration,
}

impl CacheCleanupTask {
    pub fn new(cache: SearchCache, interval: Duration) -> Self {
        Self { cache, interval }
    }

    pub async fn start(self) {
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            ticker.tick().await;
            let removed = self.cache.cleanup_expired();
            if removed > 0 {
                tracing::debug!(
                    "Removed {} expired search results, {} left",
                    removed,
                    self.cache.get_stats().search_cache_size
                );
            }
        }
    }
}
