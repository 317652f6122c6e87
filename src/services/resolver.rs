// 查询解析
//
// 对每个筛选维度独立应用优先级规则：
// store 非空时以 store 为准，否则使用 URL 解码后的值。
// store 代表本次会话中的实时编辑，URL 代表可收藏、刷新后仍然有效的状态。

use crate::models::FilterSnapshot;
use crate::services::filter_store::FilterStores;
use crate::services::url_codec::UrlFilters;

/// 推导当前生效的筛选快照
///
/// 纯函数，不写入任何 store；相同输入总是得到相同结果。
pub fn resolve(stores: &FilterStores, url: &UrlFilters) -> FilterSnapshot {
    let years = stores.date_range.range().unwrap_or_else(|| url.years());
    let rating = stores.rating.rating().unwrap_or_else(|| url.rating());
    let genres = stores
        .genres
        .chosen_genres()
        .unwrap_or_else(|| url.genres.clone());

    FilterSnapshot { years, rating, genres }
}

/// 把 URL 中的年份区间单向同步到年份 store
///
/// 日期选择器只改写 URL，显示组件从 store 读取，因此在每次导航后调用。
/// 值没有变化时不写入，避免重复触发订阅者。返回是否发生了写入。
pub fn sync_date_range(stores: &FilterStores, url: &UrlFilters) -> bool {
    let years = url.years();
    if stores.date_range.range() == Some(years) {
        return false;
    }

    match stores.date_range.set_date_range(years.start, years.end) {
        Ok(changed) => {
            if changed {
                tracing::debug!("Date range store synced from URL: {}-{}", years.start, years.end);
            }
            changed
        }
        Err(e) => {
            // URL 解码结果已经校验过，只有配置不一致时才会到这里
            tracing::warn!("Failed to sync date range from URL: {}", e);
            false
        }
    }
}
