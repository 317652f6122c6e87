// 搜索请求编排
//
// 状态机：Idle -> Loading -> {Success, Error}，依赖（筛选快照、页码）变化时重新进入 Loading。
// 每次请求分配递增的 generation，较早的请求晚于较新的请求返回时直接丢弃，
// 不做真正的取消。单次请求有超时限制，超时按失败处理。

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use crate::config::BrowseConfig;
use crate::external::{SearchClient, SearchError};
use crate::models::{FilterSnapshot, Movie, ResultPage, SearchQuery};
use crate::services::notification::{Notification, Notifier, Severity};

/// 请求状态
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading { generation: u64 },
    Success(ResultPage),
    Error(String),
}

/// 编排器对外暴露的完整状态
#[derive(Debug, Clone, PartialEq)]
pub struct FetchStatus {
    pub state: FetchState,
    pub page_no: u32,
    pub total_pages: u32,
    /// 最近一次发出的查询
    pub query: Option<SearchQuery>,
}

/// 单次请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 结果已生效
    Applied,
    /// 请求失败，已进入 Error 状态并发出通知
    Failed,
    /// 已有更新的请求，结果被丢弃
    Stale,
    /// 依赖没有变化，没有发出请求
    Unchanged,
}

/// 页面渲染状态：加载中、错误、空结果是三种不同的状态
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MoviesView {
    Idle,
    Loading { placeholders: u32, page: u32 },
    Error { message: String },
    Empty { page: u32 },
    Results { items: Vec<Movie>, page: u32, total_pages: u32 },
}

#[derive(Debug, Clone, PartialEq)]
struct FetchKey {
    snapshot: FilterSnapshot,
    page: u32,
}

/// 已进入 Loading、尚未发出的请求
///
/// 由同步的 `begin` 创建，再交给异步的 `complete` 执行搜索。
#[derive(Debug)]
#[must_use]
pub struct FetchTicket {
    generation: u64,
    query: SearchQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

pub struct FetchOrchestrator {
    client: Arc<dyn SearchClient>,
    notifier: Arc<dyn Notifier>,
    limit: u32,
    timeout: Duration,
    generation: AtomicU64,
    last_key: Mutex<Option<FetchKey>>,
    status: watch::Sender<FetchStatus>,
}

impl FetchOrchestrator {
    pub const FAILURE_TITLE: &'static str = "Failed to load the movie list";

    pub fn new(client: Arc<dyn SearchClient>, notifier: Arc<dyn Notifier>, config: &BrowseConfig) -> Self {
        let (status, _rx) = watch::channel(FetchStatus {
            state: FetchState::Idle,
            page_no: 1,
            total_pages: config.default_pages_count,
            query: None,
        });

        Self {
            client,
            notifier,
            limit: config.page_limit,
            timeout: config.search_timeout,
            generation: AtomicU64::new(0),
            last_key: Mutex::new(None),
            status,
        }
    }

    /// 依赖变化时发出请求，依赖未变化时什么都不做
    pub async fn refresh(&self, snapshot: &FilterSnapshot, page: u32) -> FetchOutcome {
        match self.begin_if_changed(snapshot, page) {
            Some(ticket) => self.complete(ticket).await,
            None => FetchOutcome::Unchanged,
        }
    }

    /// 用上一次的依赖重新请求（手动重试）
    pub async fn reload(&self) -> FetchOutcome {
        let last = match self.last_key.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        match last {
            Some(key) => self.fetch(&key.snapshot, key.page).await,
            None => FetchOutcome::Unchanged,
        }
    }

    /// 无条件发出请求
    pub async fn fetch(&self, snapshot: &FilterSnapshot, page: u32) -> FetchOutcome {
        let ticket = self.begin(snapshot, page);
        self.complete(ticket).await
    }

    /// 依赖（快照、页码）与上一次相同时返回 None，否则进入 Loading
    pub fn begin_if_changed(&self, snapshot: &FilterSnapshot, page: u32) -> Option<FetchTicket> {
        let key = FetchKey {
            snapshot: snapshot.clone(),
            page: page.max(1),
        };

        {
            let mut last = match self.last_key.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if last.as_ref() == Some(&key) {
                return None;
            }
            *last = Some(key);
        }

        Some(self.begin(snapshot, page))
    }

    /// 分配新的 generation 并进入 Loading，较早的请求从此变为过期
    pub fn begin(&self, snapshot: &FilterSnapshot, page: u32) -> FetchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = SearchQuery::from_snapshot(snapshot, page, self.limit);

        self.status.send_if_modified(|status| {
            if !self.is_current(generation) {
                return false;
            }
            status.state = FetchState::Loading { generation };
            status.page_no = query.page;
            status.query = Some(query.clone());
            true
        });

        FetchTicket { generation, query }
    }

    /// 执行搜索并写入结果；期间已有更新的请求时丢弃结果
    pub async fn complete(&self, ticket: FetchTicket) -> FetchOutcome {
        let FetchTicket { generation, query } = ticket;

        tracing::debug!(
            "Fetching movies (generation {}): page {}, years {:?}, rating {:?}, genres {:?}",
            generation,
            query.page,
            query.years,
            query.rating,
            query.genres
        );

        let result = match tokio::time::timeout(self.timeout, self.client.search(&query)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(self.timeout)),
        };

        // generation 检查和状态写入在同一个锁内完成
        let mut failure = None;
        let applied = self.status.send_if_modified(|status| {
            if !self.is_current(generation) {
                return false;
            }
            match &result {
                Ok(page) => {
                    status.total_pages = page.total_pages;
                    status.state = FetchState::Success(page.clone());
                }
                Err(e) => {
                    status.state = FetchState::Error(e.to_string());
                    failure = Some(e.clone());
                }
            }
            true
        });

        if !applied {
            tracing::debug!("Ignoring stale search result (generation {})", generation);
            return FetchOutcome::Stale;
        }

        match failure {
            None => {
                tracing::info!(
                    "Loaded movies page {} (generation {})",
                    query.page,
                    generation
                );
                FetchOutcome::Applied
            }
            Some(e) => {
                tracing::error!("Movie search failed: {}", e);
                self.notifier.notify(
                    Notification::new(Self::FAILURE_TITLE, Severity::Danger).with_body(e.to_string()),
                );
                FetchOutcome::Failed
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn status(&self) -> FetchStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchStatus> {
        self.status.subscribe()
    }

    /// 转换为页面渲染状态
    pub fn view(&self) -> MoviesView {
        let status = self.status.borrow();
        match &status.state {
            FetchState::Idle => MoviesView::Idle,
            FetchState::Loading { .. } => MoviesView::Loading {
                placeholders: self.limit,
                page: status.page_no,
            },
            FetchState::Error(message) => MoviesView::Error {
                message: message.clone(),
            },
            FetchState::Success(page) if page.is_empty() => MoviesView::Empty {
                page: status.page_no,
            },
            FetchState::Success(page) => MoviesView::Results {
                items: page.items.clone(),
                page: status.page_no,
                total_pages: page.total_pages,
            },
        }
    }
}
