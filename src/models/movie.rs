use serde::{Deserialize, Serialize};

/// 电影评分（各平台）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRating {
    #[serde(default)]
    pub kp: Option<f32>,
    #[serde(default)]
    pub imdb: Option<f32>,
}

/// 海报
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePoster {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieGenre {
    pub name: String,
}

/// 搜索接口返回的电影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alternative_name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<MovieRating>,
    #[serde(default)]
    pub poster: Option<MoviePoster>,
    #[serde(default)]
    pub genres: Vec<MovieGenre>,
}

impl Movie {
    /// 卡片上显示的标题：优先本地化名称，其次原名
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.alternative_name.as_deref())
    }

    /// 类型描述，例如 "Драма, комедия"
    ///
    /// 没有类型信息时返回 None，由页面显示占位文案。
    pub fn genre_summary(&self) -> Option<String> {
        if self.genres.is_empty() {
            return None;
        }

        let joined = self
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut chars = joined.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
    }
}

/// 一页搜索结果，每次成功请求后整体替换
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<Movie>,
    pub total_pages: u32,
}

impl ResultPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
