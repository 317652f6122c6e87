// 浏览流程集成测试
//
// 验证 URL、筛选 store 与请求编排器之间的协调：
// 优先级规则、默认值、过期结果丢弃以及几个完整的用户场景

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use movie_browser_backend::config::BrowseConfig;
use movie_browser_backend::external::{SearchClient, SearchError};
use movie_browser_backend::models::{FilterSnapshot, Movie, ResultPage, SearchQuery};
use movie_browser_backend::services::{
    decode, resolve, BrowseSession, FetchOrchestrator, FetchOutcome, FetchState, FilterStore,
    FilterStores, MoviesView, NotificationCenter, UrlState,
};

fn config() -> BrowseConfig {
    BrowseConfig {
        min_year: 1900,
        max_year: 2024,
        page_limit: 10,
        ..BrowseConfig::default()
    }
}

fn movie(id: u64) -> Movie {
    Movie {
        id,
        name: Some(format!("movie {}", id)),
        alternative_name: None,
        year: Some(2000),
        description: None,
        rating: None,
        poster: None,
        genres: Vec::new(),
    }
}

/// 记录所有查询，可以按查询内容设置延迟和失败
#[derive(Default)]
struct ScriptedClient {
    queries: Mutex<Vec<SearchQuery>>,
    total_pages: u32,
    fail: Mutex<bool>,
    /// 最低评分小于该值的查询会被延迟
    slow_below_rating: Option<f32>,
}

impl ScriptedClient {
    fn with_pages(total_pages: u32) -> Self {
        Self {
            total_pages,
            ..Self::default()
        }
    }

    fn last_query(&self) -> SearchQuery {
        self.queries.lock().unwrap().last().cloned().unwrap()
    }

    fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchClient for ScriptedClient {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, SearchError> {
        self.queries.lock().unwrap().push(query.clone());

        if let Some(threshold) = self.slow_below_rating {
            if query.rating[0] < threshold {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }

        if *self.fail.lock().unwrap() {
            return Err(SearchError::Network("connection refused".to_string()));
        }

        if query.page > self.total_pages {
            return Ok(ResultPage {
                items: Vec::new(),
                total_pages: self.total_pages,
            });
        }

        Ok(ResultPage {
            items: vec![movie(u64::from(query.page)), movie(100 + u64::from(query.page))],
            total_pages: self.total_pages,
        })
    }
}

fn session_with(client: Arc<ScriptedClient>) -> (Arc<NotificationCenter>, BrowseSession) {
    let notifications = Arc::new(NotificationCenter::default());
    let session = BrowseSession::new(config(), client, notifications.clone());
    (notifications, session)
}

#[test]
fn test_default_coverage() {
    let stores = FilterStores::new(1900, 2024);
    let snapshot = resolve(&stores, &decode(&UrlState::new(), &config()));
    assert_eq!(snapshot, FilterSnapshot::unfiltered(1900, 2024));
}

#[test]
fn test_out_of_range_url_years_fall_back() {
    let filters = decode(&UrlState::parse("start_year=1800&end_year=2030"), &config());
    assert_eq!(filters.start_year, 1900);
    assert_eq!(filters.end_year, 2024);
}

#[test]
fn test_store_precedence_regardless_of_url() {
    let stores = FilterStores::new(1900, 2024);
    stores.rating.set_rating_range(6.0, 9.0).unwrap();

    for query in ["", "min_rating=1&max_rating=2", "min_rating=9.5", "min_rating=abc"] {
        let snapshot = resolve(&stores, &decode(&UrlState::parse(query), &config()));
        assert_eq!(snapshot.rating.as_pair(), [6.0, 9.0], "url: {}", query);
    }
}

#[test]
fn test_resolve_twice_writes_nothing() {
    let stores = FilterStores::new(1900, 2024);
    let filters = decode(&UrlState::parse("genre=18&start_year=1950"), &config());
    let rx_years = stores.date_range.subscribe();
    let rx_rating = stores.rating.subscribe();
    let rx_genres = stores.genres.subscribe();

    let first = resolve(&stores, &filters);
    let second = resolve(&stores, &filters);

    assert_eq!(first, second);
    assert!(!rx_years.has_changed().unwrap());
    assert!(!rx_rating.has_changed().unwrap());
    assert!(!rx_genres.has_changed().unwrap());
}

#[tokio::test]
async fn test_genres_and_page_from_url() {
    let client = Arc::new(ScriptedClient::with_pages(5));
    let (_, session) = session_with(client.clone());

    let outcome = session
        .navigate(UrlState::parse("genre=18&genre=35&pageNo=2"))
        .await;
    assert_eq!(outcome, FetchOutcome::Applied);

    let query = client.last_query();
    assert_eq!(query.page, 2);
    assert_eq!(query.genres, vec!["18", "35"]);
    assert_eq!(query.years, [1900, 2024]);
    assert_eq!(query.rating, [0.0, 10.0]);

    match session.view() {
        MoviesView::Results { items, page, total_pages } => {
            assert_eq!(items.len(), 2);
            assert_eq!(page, 2);
            assert_eq!(total_pages, 5);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_rating_slider_overrides_url_default() {
    let client = Arc::new(ScriptedClient::with_pages(3));
    let (_, session) = session_with(client.clone());
    session.navigate(UrlState::new()).await;

    session.set_rating(6.0, 9.0).await.unwrap();

    assert_eq!(client.last_query().rating, [6.0, 9.0]);
    assert_eq!(session.url().get("min_rating"), None);
    assert!(session.filters_state().live_overrides);
}

#[tokio::test]
async fn test_stale_response_is_ignored() {
    let client = Arc::new(ScriptedClient {
        total_pages: 3,
        slow_below_rating: Some(5.0),
        ..ScriptedClient::default()
    });
    let notifications = Arc::new(NotificationCenter::default());
    let orchestrator = FetchOrchestrator::new(client.clone(), notifications, &config());

    let mut slow = FilterSnapshot::unfiltered(1900, 2024);
    slow.rating.min = 1.0;
    let mut fast = FilterSnapshot::unfiltered(1900, 2024);
    fast.rating.min = 6.0;

    // 第一个请求较慢，第二个请求先返回
    let (first, second) = tokio::join!(orchestrator.fetch(&slow, 1), orchestrator.fetch(&fast, 2));

    assert_eq!(first, FetchOutcome::Stale);
    assert_eq!(second, FetchOutcome::Applied);
    assert_eq!(client.call_count(), 2);

    match orchestrator.status().state {
        FetchState::Success(page) => assert_eq!(page.items[0].id, 2),
        other => panic!("unexpected state: {:?}", other),
    }
    assert_eq!(orchestrator.status().query.unwrap().rating[0], 6.0);
}

#[tokio::test]
async fn test_stale_failure_does_not_notify() {
    let client = Arc::new(ScriptedClient {
        total_pages: 3,
        slow_below_rating: Some(5.0),
        ..ScriptedClient::default()
    });
    let (notifications, session) = session_with(client.clone());
    session.navigate(UrlState::new()).await;

    // 慢请求开始后让客户端失败，快请求在失败前已经完成
    let slow_edit = session.set_rating(1.0, 9.0);
    let fast_edit = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let outcome = session.set_rating(6.0, 9.0).await;
        *client.fail.lock().unwrap() = true;
        outcome
    };

    let (slow, fast) = tokio::join!(slow_edit, fast_edit);
    assert_eq!(slow.unwrap(), FetchOutcome::Stale);
    assert_eq!(fast.unwrap(), FetchOutcome::Applied);
    assert!(notifications.is_empty());
    assert!(matches!(session.view(), MoviesView::Results { .. }));
}

#[tokio::test]
async fn test_error_then_recovery() {
    let client = Arc::new(ScriptedClient::with_pages(3));
    *client.fail.lock().unwrap() = true;
    let (notifications, session) = session_with(client.clone());

    assert_eq!(session.navigate(UrlState::new()).await, FetchOutcome::Failed);
    assert!(matches!(session.view(), MoviesView::Error { .. }));
    assert_eq!(notifications.drain().len(), 1);

    // 依赖未变化时不会自动重试
    assert_eq!(session.navigate(UrlState::new()).await, FetchOutcome::Unchanged);
    assert_eq!(client.call_count(), 1);

    *client.fail.lock().unwrap() = false;
    assert_eq!(session.retry().await, FetchOutcome::Applied);
    assert!(matches!(session.view(), MoviesView::Results { .. }));
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_out_of_range_page_renders_empty() {
    let client = Arc::new(ScriptedClient::with_pages(2));
    let (notifications, session) = session_with(client);

    session.navigate(UrlState::parse("pageNo=7&genre=18")).await;
    assert_eq!(session.view(), MoviesView::Empty { page: 7 });
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_date_picker_flow_keeps_store_and_url_consistent() {
    let client = Arc::new(ScriptedClient::with_pages(3));
    let (_, session) = session_with(client.clone());
    session.navigate(UrlState::parse("pageNo=2")).await;

    session.set_years(Some(1960), None).await.unwrap();
    session.set_years(None, Some(1970)).await.unwrap();

    let state = session.filters_state();
    assert_eq!(state.url, "pageNo=2&start_year=1960&end_year=1970");
    assert_eq!(session.stores().date_range.get_all(), vec![1960, 1970]);
    assert_eq!(client.last_query().years, [1960, 1970]);
    assert_eq!(client.last_query().page, 2);
    assert!(!state.live_overrides);
}

#[tokio::test]
async fn test_reload_restores_url_state_only() {
    let client = Arc::new(ScriptedClient::with_pages(3));
    let (_, session) = session_with(client.clone());
    session.navigate(UrlState::parse("start_year=1990")).await;
    session.set_genres(vec!["35".to_string()]).await.unwrap();
    let bookmarked = session.url();

    // 页面刷新：store 重置，只有 URL 保留
    let (_, reloaded) = session_with(client.clone());
    reloaded.navigate(bookmarked).await;

    let query = client.last_query();
    assert_eq!(query.years, [1990, 2024]);
    assert!(query.genres.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_navigations_leave_url_and_query_consistent() {
    let client = Arc::new(ScriptedClient::with_pages(50));
    let (_, session) = session_with(client);
    let session = Arc::new(session);

    let mut handles = Vec::new();
    for i in 0..200u32 {
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            let url = UrlState::parse(&format!("start_year={}&pageNo={}", 1950 + i % 40, 1 + i % 7));
            session.navigate(url).await;
            if i % 3 == 0 {
                session.change_page(1 + i % 5).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let filters = session.url_filters();
    let status = session.orchestrator().status();
    let query = status.query.unwrap();
    assert_eq!(query.years, [filters.start_year, filters.end_year]);
    assert_eq!(query.page, filters.page_no);
    assert_eq!(session.stores().date_range.get_all(), vec![filters.start_year, filters.end_year]);
    assert!(matches!(status.state, FetchState::Success(_)));
}
