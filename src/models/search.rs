use serde::{Deserialize, Serialize};

use super::FilterSnapshot;

/// 发送给搜索接口的唯一查询结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub page: u32,
    pub limit: u32,
    pub years: [i32; 2],
    pub rating: [f32; 2],
    pub genres: Vec<String>,
}

impl SearchQuery {
    /// 由筛选快照和页码构建查询
    pub fn from_snapshot(snapshot: &FilterSnapshot, page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            years: snapshot.years.as_pair(),
            rating: snapshot.rating.as_pair(),
            genres: snapshot.genres.to_vec(),
        }
    }

    /// 缓存键，类型顺序不影响查询结果
    pub fn cache_key(&self) -> String {
        let mut genres = self.genres.clone();
        genres.sort();
        format!(
            "movies:{}:{}:{}-{}:{}-{}:{}",
            self.page,
            self.limit,
            self.years[0],
            self.years[1],
            self.rating[0],
            self.rating[1],
            genres.join(",")
        )
    }
}
