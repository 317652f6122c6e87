// URL 编解码
//
// 在筛选条件和 URL 查询参数之间双向转换：
// - decode: 读取参数，缺失或非法时替换为默认值
// - encode: 返回只修改了一个字段的新参数集，不修改原参数
//
// URL 是唯一能在页面刷新后保留的筛选状态。

use serde::Serialize;
use url::form_urlencoded;

use crate::config::BrowseConfig;
use crate::models::{is_year, FilterSnapshot, GenreSelection, RatingBound, YearBound, MAX_RATING, MIN_RATING};

pub const START_YEAR_KEY: &str = "start_year";
pub const END_YEAR_KEY: &str = "end_year";
pub const MIN_RATING_KEY: &str = "min_rating";
pub const MAX_RATING_KEY: &str = "max_rating";
pub const GENRE_KEY: &str = "genre";
pub const PAGE_NO_KEY: &str = "pageNo";

/// URL 中的筛选字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlField {
    StartYear,
    EndYear,
    MinRating,
    MaxRating,
    Genre,
    PageNo,
}

impl UrlField {
    pub fn key(&self) -> &'static str {
        match self {
            UrlField::StartYear => START_YEAR_KEY,
            UrlField::EndYear => END_YEAR_KEY,
            UrlField::MinRating => MIN_RATING_KEY,
            UrlField::MaxRating => MAX_RATING_KEY,
            UrlField::Genre => GENRE_KEY,
            UrlField::PageNo => PAGE_NO_KEY,
        }
    }
}

/// 对单个字段的修改
#[derive(Debug, Clone, PartialEq)]
pub enum UrlUpdate {
    StartYear(i32),
    EndYear(i32),
    MinRating(f32),
    MaxRating(f32),
    Genres(Vec<String>),
    PageNo(u32),
}

impl UrlUpdate {
    pub fn field(&self) -> UrlField {
        match self {
            UrlUpdate::StartYear(_) => UrlField::StartYear,
            UrlUpdate::EndYear(_) => UrlField::EndYear,
            UrlUpdate::MinRating(_) => UrlField::MinRating,
            UrlUpdate::MaxRating(_) => UrlField::MaxRating,
            UrlUpdate::Genres(_) => UrlField::Genre,
            UrlUpdate::PageNo(_) => UrlField::PageNo,
        }
    }

    /// 字段值的规范字符串形式
    fn canonical_values(&self) -> Vec<String> {
        match self {
            UrlUpdate::StartYear(year) | UrlUpdate::EndYear(year) => vec![format!("{:04}", year)],
            UrlUpdate::MinRating(rating) | UrlUpdate::MaxRating(rating) => vec![rating.to_string()],
            UrlUpdate::Genres(genres) => GenreSelection::from_iter_dedup(genres.iter().cloned()).to_vec(),
            UrlUpdate::PageNo(page) => vec![page.to_string()],
        }
    }
}

/// 不可变的 URL 查询参数集
///
/// 保留参数顺序，同一个键可以出现多次（genre）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    pairs: Vec<(String, String)>,
}

impl UrlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析查询字符串，允许带前导 '?'
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// 第一个同名参数的值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, field: UrlField) -> bool {
        self.get(field.key()).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 返回去掉某个字段后的新参数集
    pub fn without(&self, field: UrlField) -> Self {
        self.replaced(field.key(), Vec::new())
    }

    /// 用新值替换某个键的全部出现，新值放在第一次出现的位置
    fn replaced(&self, key: &str, values: Vec<String>) -> Self {
        let mut pending = Some(values);
        let mut pairs = Vec::with_capacity(self.pairs.len());

        for (k, v) in &self.pairs {
            if k == key {
                if let Some(values) = pending.take() {
                    pairs.extend(values.into_iter().map(|v| (key.to_string(), v)));
                }
            } else {
                pairs.push((k.clone(), v.clone()));
            }
        }

        if let Some(values) = pending {
            pairs.extend(values.into_iter().map(|v| (key.to_string(), v)));
        }

        Self { pairs }
    }
}

/// 从 URL 解码出的筛选条件，所有字段都已经过校验
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlFilters {
    pub start_year: i32,
    pub end_year: i32,
    pub min_rating: f32,
    pub max_rating: f32,
    pub genres: GenreSelection,
    pub page_no: u32,
}

impl UrlFilters {
    pub fn years(&self) -> YearBound {
        YearBound::new(self.start_year, self.end_year)
    }

    pub fn rating(&self) -> RatingBound {
        RatingBound::new(self.min_rating, self.max_rating)
    }

    pub fn to_snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            years: self.years(),
            rating: self.rating(),
            genres: self.genres.clone(),
        }
    }
}

/// 解码 URL 参数
///
/// 非法值不会向下传播：年份用 `is_year` 重新校验，评分限制在 [0, 10]，
/// 无法解析时一律使用默认值。
pub fn decode(url: &UrlState, config: &BrowseConfig) -> UrlFilters {
    let start_year = decode_year(url, START_YEAR_KEY, config.min_year, config);
    let mut end_year = decode_year(url, END_YEAR_KEY, config.max_year, config);
    if start_year > end_year {
        tracing::debug!(
            "URL year range inverted ({} > {}), resetting {}",
            start_year,
            end_year,
            END_YEAR_KEY
        );
        end_year = config.max_year;
    }

    let min_rating = decode_rating(url, MIN_RATING_KEY, MIN_RATING);
    let mut max_rating = decode_rating(url, MAX_RATING_KEY, MAX_RATING);
    if min_rating > max_rating {
        tracing::debug!(
            "URL rating range inverted ({} > {}), resetting {}",
            min_rating,
            max_rating,
            MAX_RATING_KEY
        );
        max_rating = MAX_RATING;
    }

    let genres = GenreSelection::from_iter_dedup(url.get_all(GENRE_KEY));

    let page_no = match url.get(PAGE_NO_KEY).map(str::trim) {
        None | Some("") => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(page) if page >= 1 => page,
            _ => {
                tracing::debug!("Invalid {} in URL: {:?}, using 1", PAGE_NO_KEY, raw);
                1
            }
        },
    };

    UrlFilters {
        start_year,
        end_year,
        min_rating,
        max_rating,
        genres,
        page_no,
    }
}

/// 返回只修改了一个字段的新参数集
///
/// `decode(encode(s, update))` 能还原写入的值，前提是该值与 `s` 中区间的另一端兼容：
/// `EndYear` 不小于 `s` 解码出的 `start_year`，`MaxRating` 不小于 `min_rating`。
/// 写入更小的值会构成倒置区间，解码时这一端被重置为默认值
/// （`max_year` / `10`）。`StartYear`、`MinRating`、`Genres`、`PageNo` 总能还原。
pub fn encode(current: &UrlState, update: UrlUpdate) -> UrlState {
    current.replaced(update.field().key(), update.canonical_values())
}

fn decode_year(url: &UrlState, key: &str, default: i32, config: &BrowseConfig) -> i32 {
    match url.get(key) {
        None | Some("") => default,
        Some(raw) if is_year(raw, config.min_year, config.max_year) => {
            // is_year 已保证可以解析
            raw.trim().parse().unwrap_or(default)
        }
        Some(raw) => {
            tracing::debug!("Invalid {} in URL: {:?}, using {}", key, raw, default);
            default
        }
    }
}

fn decode_rating(url: &UrlState, key: &str, default: f32) -> f32 {
    match url.get(key).map(str::trim) {
        None | Some("") => default,
        Some(raw) => match raw.parse::<f32>() {
            Ok(rating) if rating.is_finite() => rating.clamp(MIN_RATING, MAX_RATING),
            _ => {
                tracing::debug!("Invalid {} in URL: {:?}, using {}", key, raw, default);
                default
            }
        },
    }
}
