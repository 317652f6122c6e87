use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::SearchError;
use crate::models::{Movie, ResultPage, SearchQuery, YearBound, MAX_RATING, MIN_RATING};

/// 电影搜索 API 客户端（kinopoisk.dev 接口格式）
#[derive(Clone)]
pub struct MovieApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    /// 完整年份范围，等于该范围时不发送年份过滤
    unfiltered_years: YearBound,
}

impl MovieApiClient {
    pub fn new(api_key: String, base_url: String, unfiltered_years: YearBound) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            unfiltered_years,
        }
    }

    /// 按筛选条件搜索电影
    pub async fn search_movies(&self, query: &SearchQuery) -> Result<MovieSearchResponse, SearchError> {
        let url = format!("{}/v1.4/movie", self.base_url);

        let response = self.client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .query(&self.build_params(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let search_result: MovieSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(search_result)
    }

    /// 构建查询参数
    ///
    /// 完整范围的年份和评分不作为过滤条件发送，
    /// 否则缺少年份或评分的电影会被排除。
    pub fn build_params(&self, query: &SearchQuery) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), query.page.to_string()),
            ("limit".to_string(), query.limit.to_string()),
        ];

        if query.years != self.unfiltered_years.as_pair() {
            params.push(("year".to_string(), format_range(query.years[0], query.years[1])));
        }

        if query.rating != [MIN_RATING, MAX_RATING] {
            params.push(("rating.kp".to_string(), format_range(query.rating[0], query.rating[1])));
        }

        for genre in &query.genres {
            params.push(("genres.name".to_string(), genre.clone()));
        }

        params
    }
}

fn format_range<T: PartialEq + std::fmt::Display>(from: T, to: T) -> String {
    if from == to {
        from.to_string()
    } else {
        format!("{}-{}", from, to)
    }
}

/// 搜索响应
#[derive(Debug, Deserialize, Serialize)]
pub struct MovieSearchResponse {
    pub docs: Vec<Movie>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
}

impl From<MovieSearchResponse> for ResultPage {
    fn from(response: MovieSearchResponse) -> Self {
        ResultPage {
            items: response.docs,
            total_pages: response.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterSnapshot;

    fn client() -> MovieApiClient {
        MovieApiClient::new(
            "key".to_string(),
            "https://api.example.dev/".to_string(),
            YearBound::new(1900, 2024),
        )
    }

    #[test]
    fn test_build_params_unfiltered() {
        let query = SearchQuery::from_snapshot(&FilterSnapshot::unfiltered(1900, 2024), 2, 10);
        let params = client().build_params(&query);
        assert_eq!(
            params,
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_params_with_filters() {
        let query = SearchQuery {
            page: 1,
            limit: 10,
            years: [1990, 2000],
            rating: [6.0, 9.5],
            genres: vec!["драма".to_string(), "комедия".to_string()],
        };

        let params = client().build_params(&query);
        assert!(params.contains(&("year".to_string(), "1990-2000".to_string())));
        assert!(params.contains(&("rating.kp".to_string(), "6-9.5".to_string())));
        assert_eq!(
            params.iter().filter(|(k, _)| k == "genres.name").count(),
            2
        );
    }

    #[test]
    fn test_single_year_range() {
        let mut query = SearchQuery::from_snapshot(&FilterSnapshot::unfiltered(1900, 2024), 1, 10);
        query.years = [1999, 1999];
        let params = client().build_params(&query);
        assert!(params.contains(&("year".to_string(), "1999".to_string())));
    }

    #[test]
    fn test_response_into_result_page() {
        let json = r#"{
            "docs": [{ "id": 1, "name": "Брат" }, { "id": 2 }],
            "total": 12,
            "limit": 10,
            "page": 1,
            "pages": 2
        }"#;

        let response: MovieSearchResponse = serde_json::from_str(json).unwrap();
        let page = ResultPage::from(response);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);
    }
}
