pub mod cache;
pub mod kinopoisk;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use cache::{CacheCleanupTask, CacheStats, MemoryCache, SearchCache};
pub use kinopoisk::{MovieApiClient, MovieSearchResponse};

use crate::config::BrowseConfig;
use crate::models::{ResultPage, SearchQuery, YearBound};

/// 搜索失败的原因
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("Movie API key not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Movie API error: status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Search request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest 自身的超时没有可报告的时长，按网络错误处理
        if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SearchError::Status(status.as_u16())
        } else {
            SearchError::Network(err.to_string())
        }
    }
}

/// 搜索协作方：`search(query) -> {items, totalPages}`，可能失败
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, SearchError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// 带缓存的电影搜索服务
#[derive(Clone)]
pub struct MovieSearchService {
    api_client: Option<MovieApiClient>,
    pub cache: SearchCache,
}

impl MovieSearchService {
    pub fn new(config: &BrowseConfig) -> Self {
        let unfiltered_years = YearBound::new(config.min_year, config.max_year);
        let api_client = config.api_key.clone().map(|api_key| {
            MovieApiClient::new(api_key, config.api_base_url.clone(), unfiltered_years)
        });

        if api_client.is_none() {
            tracing::warn!("MOVIE_API_KEY not set, movie search is unavailable");
        }

        Self {
            api_client,
            cache: SearchCache::default(),
        }
    }

    /// 获取缓存统计信息
    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    /// 清空所有缓存
    pub fn clear_cache(&self) {
        self.cache.clear_all();
    }
}

#[async_trait]
impl SearchClient for MovieSearchService {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, SearchError> {
        // 检查缓存
        if let Some(cached) = self.cache.get(query) {
            tracing::debug!("Cache hit for movie search: {}", query.cache_key());
            return Ok(cached);
        }

        let client = self.api_client.as_ref().ok_or(SearchError::NotConfigured)?;
        let page = ResultPage::from(client.search_movies(query).await?);

        // 缓存结果
        self.cache.set(query, page.clone());
        tracing::debug!(
            "Cached movie search results: {} ({} items)",
            query.cache_key(),
            page.items.len()
        );

        Ok(page)
    }

    fn is_available(&self) -> bool {
        self.api_client.is_some()
    }
}
