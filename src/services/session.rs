// 浏览会话
//
// 页面控制器：持有当前 URL、三个筛选 store 和请求编排器，
// 把每一次用户操作（导航、选择年份、拖动评分滑块、选择类型、翻页、重置）
// 转换为"先提交全部修改，再解析一次，再请求一次"。

use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::config::BrowseConfig;
use crate::external::SearchClient;
use crate::models::{FilterSnapshot, RangeValidator, ValidationError, YearBound};
use crate::services::filter_store::{FilterStores, FilterUpdate};
use crate::services::notification::Notifier;
use crate::services::orchestrator::{FetchOrchestrator, FetchOutcome, FetchTicket, MoviesView};
use crate::services::resolver::{resolve, sync_date_range};
use crate::services::url_codec::{decode, encode, UrlField, UrlFilters, UrlState, UrlUpdate};

/// 当前筛选状态，供页面显示筛选控件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltersState {
    /// 实际用于查询的筛选条件
    pub snapshot: FilterSnapshot,
    /// 当前 URL 查询字符串
    pub url: String,
    /// URL 解码结果
    pub url_filters: UrlFilters,
    /// 实际查询条件是否与 URL 不一致（store 中有未写入 URL 的编辑）
    pub live_overrides: bool,
}

pub struct BrowseSession {
    config: BrowseConfig,
    stores: FilterStores,
    /// 同时也是会话锁：每次操作在写锁内完成修改、解析并进入 Loading
    url: RwLock<UrlState>,
    orchestrator: FetchOrchestrator,
}

impl BrowseSession {
    pub fn new(config: BrowseConfig, client: Arc<dyn SearchClient>, notifier: Arc<dyn Notifier>) -> Self {
        let stores = FilterStores::new(config.min_year, config.max_year);
        let orchestrator = FetchOrchestrator::new(client, notifier, &config);

        Self {
            config,
            stores,
            url: RwLock::new(UrlState::new()),
            orchestrator,
        }
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    pub fn stores(&self) -> &FilterStores {
        &self.stores
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    /// 当前 URL 参数
    pub fn url(&self) -> UrlState {
        match self.url.read() {
            Ok(url) => url.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn url_filters(&self) -> UrlFilters {
        decode(&self.url(), &self.config)
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        resolve(&self.stores, &self.url_filters())
    }

    pub fn filters_state(&self) -> FiltersState {
        let url = self.url();
        let url_filters = decode(&url, &self.config);
        let snapshot = resolve(&self.stores, &url_filters);
        FiltersState {
            live_overrides: snapshot != url_filters.to_snapshot(),
            snapshot,
            url: url.to_query_string(),
            url_filters,
        }
    }

    pub fn view(&self) -> MoviesView {
        self.orchestrator.view()
    }

    /// 导航到新的 URL（页面加载、浏览器前进后退、任何 URL 改写）
    pub async fn navigate(&self, url: UrlState) -> FetchOutcome {
        let ticket = {
            let mut current = self.lock_url();
            *current = url;
            self.begin_locked(&current)
        };
        self.run(ticket).await
    }

    /// 日期选择器：改写 URL 中的年份，未给出的一端保持 URL 中的当前值
    pub async fn set_years(&self, start: Option<i32>, end: Option<i32>) -> Result<FetchOutcome, ValidationError> {
        if start.is_none() && end.is_none() {
            return Ok(FetchOutcome::Unchanged);
        }

        let ticket = self.edit(|url| {
            let current = decode(url, &self.config);
            let years = YearBound::new(
                start.unwrap_or(current.start_year),
                end.unwrap_or(current.end_year),
            );
            self.apply_to(
                url,
                FilterUpdate {
                    years: Some(years),
                    ..FilterUpdate::default()
                },
            )
        })?;
        Ok(self.run(ticket).await)
    }

    /// 评分滑块：只写 store，URL 保持不变
    pub async fn set_rating(&self, min: f32, max: f32) -> Result<FetchOutcome, ValidationError> {
        let ticket = self.edit(|url| {
            if self.stores.rating.set_rating_range(min, max)? {
                self.reset_page(url);
            }
            Ok(())
        })?;
        Ok(self.run(ticket).await)
    }

    /// 类型选择：只写 store
    pub async fn set_genres(&self, genres: Vec<String>) -> Result<FetchOutcome, ValidationError> {
        let ticket = self.edit(|url| {
            if self.stores.genres.set_chosen_genres(genres)? {
                self.reset_page(url);
            }
            Ok(())
        })?;
        Ok(self.run(ticket).await)
    }

    /// 一次用户操作修改多个维度：全部提交后只解析、请求一次
    ///
    /// 年份写入 URL（由导航同步到 store），评分和类型写入 store。
    pub async fn apply(&self, update: FilterUpdate) -> Result<FetchOutcome, ValidationError> {
        let ticket = self.edit(|url| self.apply_to(url, update))?;
        Ok(self.run(ticket).await)
    }

    /// 翻页：只改写 pageNo，不影响筛选状态
    pub async fn change_page(&self, page: u32) -> Result<FetchOutcome, ValidationError> {
        RangeValidator::validate_page(page)?;
        let ticket = self.edit(|url| {
            *url = encode(url, UrlUpdate::PageNo(page));
            Ok(())
        })?;
        Ok(self.run(ticket).await)
    }

    /// 清空所有筛选条件（store 和 URL），保留其他参数
    pub async fn reset_filters(&self) -> FetchOutcome {
        let ticket = {
            let mut url = self.lock_url();
            for field in [
                UrlField::StartYear,
                UrlField::EndYear,
                UrlField::MinRating,
                UrlField::MaxRating,
                UrlField::Genre,
            ] {
                *url = url.without(field);
            }
            if self.config.reset_page_on_filter_change {
                *url = url.without(UrlField::PageNo);
            }
            self.stores.clear_all();
            self.begin_locked(&url)
        };
        self.run(ticket).await
    }

    /// 手动重试上一次请求
    pub async fn retry(&self) -> FetchOutcome {
        self.orchestrator.reload().await
    }

    /// 在 URL 写锁内执行一次修改，然后同步年份 store、解析快照并进入 Loading
    ///
    /// 锁只覆盖同步部分，搜索请求在锁外执行。
    fn edit<F>(&self, change: F) -> Result<Option<FetchTicket>, ValidationError>
    where
        F: FnOnce(&mut UrlState) -> Result<(), ValidationError>,
    {
        let mut url = self.lock_url();
        change(&mut *url)?;
        Ok(self.begin_locked(&url))
    }

    fn lock_url(&self) -> RwLockWriteGuard<'_, UrlState> {
        match self.url.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// 调用方必须持有 URL 写锁
    fn begin_locked(&self, url: &UrlState) -> Option<FetchTicket> {
        let filters = decode(url, &self.config);
        sync_date_range(&self.stores, &filters);
        let snapshot = resolve(&self.stores, &filters);
        self.orchestrator.begin_if_changed(&snapshot, filters.page_no)
    }

    async fn run(&self, ticket: Option<FetchTicket>) -> FetchOutcome {
        match ticket {
            Some(ticket) => self.orchestrator.complete(ticket).await,
            None => FetchOutcome::Unchanged,
        }
    }

    fn apply_to(&self, url: &mut UrlState, update: FilterUpdate) -> Result<(), ValidationError> {
        let years = update.years;
        if let Some(years) = years {
            RangeValidator::validate_year_range(years.start, years.end, self.config.min_year, self.config.max_year)?;
        }

        let mut changed = self.stores.apply(FilterUpdate { years: None, ..update })?;

        if let Some(years) = years {
            let next = encode(&encode(url, UrlUpdate::StartYear(years.start)), UrlUpdate::EndYear(years.end));
            changed |= next != *url;
            *url = next;
        }

        if changed {
            self.reset_page(url);
        }
        Ok(())
    }

    fn reset_page(&self, url: &mut UrlState) {
        if self.config.reset_page_on_filter_change && url.contains(UrlField::PageNo) {
            tracing::debug!("Filter changed, resetting {}", UrlField::PageNo.key());
            *url = url.without(UrlField::PageNo);
        }
    }
}
