use serde::{Deserialize, Serialize};

use super::validation::{MAX_RATING, MIN_RATING};

/// 年份区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBound {
    pub start: i32,
    pub end: i32,
}

impl YearBound {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn as_pair(&self) -> [i32; 2] {
        [self.start, self.end]
    }
}

/// 评分区间，两端都在 [0, 10] 内
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBound {
    pub min: f32,
    pub max: f32,
}

impl RatingBound {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// 不做任何限制的评分区间
    pub fn full() -> Self {
        Self {
            min: MIN_RATING,
            max: MAX_RATING,
        }
    }

    pub fn as_pair(&self) -> [f32; 2] {
        [self.min, self.max]
    }
}

impl Default for RatingBound {
    fn default() -> Self {
        Self::full()
    }
}

/// 已选类型
///
/// 保留插入顺序（页面上按选择顺序显示标签），查询时顺序无关，不允许重复。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreSelection(Vec<String>);

impl GenreSelection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 去掉空白项和重复项，保留第一次出现的位置
    pub fn from_iter_dedup<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for genre in genres {
            selection.insert(genre.into());
        }
        selection
    }

    pub fn insert(&mut self, genre: String) -> bool {
        let genre = genre.trim().to_string();
        if genre.is_empty() || self.0.contains(&genre) {
            return false;
        }
        self.0.push(genre);
        true
    }

    pub fn contains(&self, genre: &str) -> bool {
        self.0.iter().any(|g| g == genre)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// 当前生效的筛选条件快照
///
/// 由 `resolve` 从各筛选 store 和 URL 推导出来，本身不被存储。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub years: YearBound,
    pub rating: RatingBound,
    pub genres: GenreSelection,
}

impl FilterSnapshot {
    /// 不排除任何结果的快照
    pub fn unfiltered(min_year: i32, max_year: i32) -> Self {
        Self {
            years: YearBound::new(min_year, max_year),
            rating: RatingBound::full(),
            genres: GenreSelection::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_selection_dedup_keeps_order() {
        let selection = GenreSelection::from_iter_dedup(["35", "18", "35", " ", "18", "80"]);
        assert_eq!(selection.as_slice(), &["35", "18", "80"]);
        assert!(selection.contains("18"));
        assert!(!selection.contains("99"));
    }

    #[test]
    fn test_unfiltered_snapshot() {
        let snapshot = FilterSnapshot::unfiltered(1900, 2024);
        assert_eq!(snapshot.years.as_pair(), [1900, 2024]);
        assert_eq!(snapshot.rating.as_pair(), [0.0, 10.0]);
        assert!(snapshot.genres.is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = FilterSnapshot {
            years: YearBound::new(1990, 2000),
            rating: RatingBound::new(6.0, 9.0),
            genres: GenreSelection::from_iter_dedup(["drama"]),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["years"]["start"], 1990);
        assert_eq!(json["genres"][0], "drama");

        let back: FilterSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
