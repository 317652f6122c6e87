// 浏览页配置
//
// 进程级常量（年份范围、每页数量等）在启动时从环境变量读取，
// 再注入到各个组件中。

use chrono::Datelike;
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("环境变量 {key} 的值无效: {value}")]
    InvalidValue { key: String, value: String },

    #[error("年份范围无效: MIN_YEAR={min} 大于 MAX_YEAR={max}")]
    InvertedYearRange { min: i32, max: i32 },

    #[error("PAGE_LIMIT 必须大于 0")]
    ZeroPageLimit,
}

/// 浏览页配置
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseConfig {
    /// 允许选择的最早年份
    pub min_year: i32,
    /// 允许选择的最晚年份
    pub max_year: i32,
    /// 每页电影数量
    pub page_limit: u32,
    /// 首次加载成功之前显示的页数
    pub default_pages_count: u32,
    /// 单次搜索请求超时
    pub search_timeout: Duration,
    /// 修改筛选条件时是否把 pageNo 从 URL 中移除（回到第一页）
    pub reset_page_on_filter_change: bool,
    /// 搜索接口地址
    pub api_base_url: String,
    /// 搜索接口密钥
    pub api_key: Option<String>,
}

impl BrowseConfig {
    pub const DEFAULT_MIN_YEAR: i32 = 1874;
    pub const DEFAULT_PAGE_LIMIT: u32 = 10;
    pub const DEFAULT_PAGES_COUNT: u32 = 10;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
    pub const DEFAULT_API_URL: &'static str = "https://api.kinopoisk.dev";

    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置（测试中使用 HashMap）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            min_year: parse_or(&lookup, "MIN_YEAR", defaults.min_year)?,
            max_year: parse_or(&lookup, "MAX_YEAR", defaults.max_year)?,
            page_limit: parse_or(&lookup, "PAGE_LIMIT", defaults.page_limit)?,
            default_pages_count: parse_or(&lookup, "DEFAULT_PAGES_COUNT", defaults.default_pages_count)?,
            search_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SEARCH_TIMEOUT_SECS",
                Self::DEFAULT_TIMEOUT_SECS,
            )?),
            reset_page_on_filter_change: parse_or(&lookup, "RESET_PAGE_ON_FILTER_CHANGE", false)?,
            api_base_url: lookup("MOVIE_API_URL").unwrap_or(defaults.api_base_url),
            api_key: lookup("MOVIE_API_KEY").filter(|k| !k.trim().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_year > self.max_year {
            return Err(ConfigError::InvertedYearRange {
                min: self.min_year,
                max: self.max_year,
            });
        }

        if self.page_limit == 0 {
            return Err(ConfigError::ZeroPageLimit);
        }

        Ok(())
    }
}

impl Default for BrowseConfig {
    /// 默认配置：最晚年份为当前年份（日期选择器不允许选未来）
    fn default() -> Self {
        Self {
            min_year: Self::DEFAULT_MIN_YEAR,
            max_year: chrono::Utc::now().year(),
            page_limit: Self::DEFAULT_PAGE_LIMIT,
            default_pages_count: Self::DEFAULT_PAGES_COUNT,
            search_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            reset_page_on_filter_change: false,
            api_base_url: Self::DEFAULT_API_URL.to_string(),
            api_key: None,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<BrowseConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BrowseConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.min_year, 1874);
        assert_eq!(config.max_year, chrono::Utc::now().year());
        assert_eq!(config.page_limit, 10);
        assert!(!config.reset_page_on_filter_change);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MIN_YEAR", "1900"),
            ("MAX_YEAR", "2024"),
            ("PAGE_LIMIT", "20"),
            ("SEARCH_TIMEOUT_SECS", "3"),
            ("RESET_PAGE_ON_FILTER_CHANGE", "true"),
            ("MOVIE_API_KEY", "secret"),
        ])
        .unwrap();

        assert_eq!(config.min_year, 1900);
        assert_eq!(config.max_year, 2024);
        assert_eq!(config.page_limit, 20);
        assert_eq!(config.search_timeout, Duration::from_secs(3));
        assert!(config.reset_page_on_filter_change);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PAGE_LIMIT", "ten")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(load(&[("PAGE_LIMIT", "0")]), Err(ConfigError::ZeroPageLimit));
        assert_eq!(
            load(&[("MIN_YEAR", "2000"), ("MAX_YEAR", "1990")]),
            Err(ConfigError::InvertedYearRange { min: 2000, max: 1990 })
        );
    }
}
