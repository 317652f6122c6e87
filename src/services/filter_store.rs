// 筛选条件 store
//
// 三个相互独立的内存 store（年份区间、评分区间、已选类型），
// 保存用户在当前会话中的筛选选择，与 URL 无关，页面刷新后重置。
// 空序列表示"用户还没有动过这个筛选项"，与"显式选择了完整范围"区分开。

use tokio::sync::watch;

use crate::models::{CollectionValidator, GenreSelection, RangeValidator, RatingBound, ValidationError, YearBound};

/// 所有筛选 store 共享的最小能力集
pub trait FilterStore {
    type Value: Clone + PartialEq;

    /// 当前保存的原始值，空序列表示未设置
    fn get_all(&self) -> Vec<Self::Value>;

    /// 订阅变更，setter 返回时订阅者即可读到新值
    fn subscribe(&self) -> watch::Receiver<Vec<Self::Value>>;

    /// 恢复为未设置状态，返回是否发生了写入
    fn clear(&self) -> bool;

    fn is_untouched(&self) -> bool {
        self.get_all().is_empty()
    }
}

/// 基于 watch 通道的值容器
///
/// 值与当前相同时不写入也不通知订阅者。
#[derive(Debug)]
struct WatchCell<T> {
    tx: watch::Sender<Vec<T>>,
}

impl<T: Clone + PartialEq> WatchCell<T> {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx }
    }

    fn replace(&self, value: Vec<T>) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    fn get(&self) -> Vec<T> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.tx.subscribe()
    }
}

/// 年份区间 store，值为 `[start, end]`
#[derive(Debug)]
pub struct DateRangeStore {
    cell: WatchCell<i32>,
    min_year: i32,
    max_year: i32,
}

impl DateRangeStore {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self {
            cell: WatchCell::new(),
            min_year,
            max_year,
        }
    }

    /// 设置年份区间，返回是否发生了写入
    pub fn set_date_range(&self, start: i32, end: i32) -> Result<bool, ValidationError> {
        RangeValidator::validate_year_range(start, end, self.min_year, self.max_year)?;
        Ok(self.cell.replace(vec![start, end]))
    }

    pub fn range(&self) -> Option<YearBound> {
        match self.cell.get().as_slice() {
            [start, end] => Some(YearBound::new(*start, *end)),
            _ => None,
        }
    }
}

impl FilterStore for DateRangeStore {
    type Value = i32;

    fn get_all(&self) -> Vec<i32> {
        self.cell.get()
    }

    fn subscribe(&self) -> watch::Receiver<Vec<i32>> {
        self.cell.subscribe()
    }

    fn clear(&self) -> bool {
        self.cell.replace(Vec::new())
    }
}

/// 评分区间 store，值为 `[min, max]`
#[derive(Debug)]
pub struct RatingStore {
    cell: WatchCell<f32>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self { cell: WatchCell::new() }
    }

    pub fn set_rating_range(&self, min: f32, max: f32) -> Result<bool, ValidationError> {
        RangeValidator::validate_rating_range(min, max)?;
        Ok(self.cell.replace(vec![min, max]))
    }

    pub fn rating(&self) -> Option<RatingBound> {
        match self.cell.get().as_slice() {
            [min, max] => Some(RatingBound::new(*min, *max)),
            _ => None,
        }
    }
}

impl Default for RatingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore for RatingStore {
    type Value = f32;

    fn get_all(&self) -> Vec<f32> {
        self.cell.get()
    }

    fn subscribe(&self) -> watch::Receiver<Vec<f32>> {
        self.cell.subscribe()
    }

    fn clear(&self) -> bool {
        self.cell.replace(Vec::new())
    }
}

/// 已选类型 store
#[derive(Debug)]
pub struct GenreStore {
    cell: WatchCell<String>,
}

impl GenreStore {
    pub fn new() -> Self {
        Self { cell: WatchCell::new() }
    }

    /// 替换已选类型；传入空列表等同于清空
    pub fn set_chosen_genres(&self, genres: Vec<String>) -> Result<bool, ValidationError> {
        CollectionValidator::validate_genres(&genres)?;
        let selection = GenreSelection::from_iter_dedup(genres);
        Ok(self.cell.replace(selection.to_vec()))
    }

    pub fn chosen_genres(&self) -> Option<GenreSelection> {
        let genres = self.cell.get();
        if genres.is_empty() {
            None
        } else {
            Some(GenreSelection::from_iter_dedup(genres))
        }
    }
}

impl Default for GenreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore for GenreStore {
    type Value = String;

    fn get_all(&self) -> Vec<String> {
        self.cell.get()
    }

    fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.cell.subscribe()
    }

    fn clear(&self) -> bool {
        self.cell.replace(Vec::new())
    }
}

/// 一次用户操作产生的筛选修改，整体提交
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub years: Option<YearBound>,
    pub rating: Option<RatingBound>,
    pub genres: Option<Vec<String>>,
}

impl FilterUpdate {
    pub fn is_empty(&self) -> bool {
        self.years.is_none() && self.rating.is_none() && self.genres.is_none()
    }
}

/// 三个筛选 store 的集合
#[derive(Debug)]
pub struct FilterStores {
    pub date_range: DateRangeStore,
    pub rating: RatingStore,
    pub genres: GenreStore,
}

impl FilterStores {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self {
            date_range: DateRangeStore::new(min_year, max_year),
            rating: RatingStore::new(),
            genres: GenreStore::new(),
        }
    }

    /// 提交一组修改：先全部校验，任何一项不合法都不会写入
    ///
    /// 返回是否有任何 store 发生了变化。
    pub fn apply(&self, update: FilterUpdate) -> Result<bool, ValidationError> {
        if let Some(years) = update.years {
            RangeValidator::validate_year_range(
                years.start,
                years.end,
                self.date_range.min_year,
                self.date_range.max_year,
            )?;
        }
        if let Some(rating) = update.rating {
            RangeValidator::validate_rating_range(rating.min, rating.max)?;
        }
        if let Some(ref genres) = update.genres {
            CollectionValidator::validate_genres(genres)?;
        }

        let mut changed = false;
        if let Some(years) = update.years {
            changed |= self.date_range.set_date_range(years.start, years.end)?;
        }
        if let Some(rating) = update.rating {
            changed |= self.rating.set_rating_range(rating.min, rating.max)?;
        }
        if let Some(genres) = update.genres {
            changed |= self.genres.set_chosen_genres(genres)?;
        }

        Ok(changed)
    }

    /// 清空全部 store
    pub fn clear_all(&self) -> bool {
        let years = self.date_range.clear();
        let rating = self.rating.clear();
        let genres = self.genres.clear();
        years || rating || genres
    }
}
