use thiserror::Error;

/// 评分允许的下限
pub const MIN_RATING: f32 = 0.0;
/// 评分允许的上限
pub const MAX_RATING: f32 = 10.0;

/// 验证错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid year: {year} (must be between {min} and {max})")]
    InvalidYear { year: i32, min: i32, max: i32 },

    #[error("Invalid year range: start {start} is after end {end}")]
    YearRangeInverted { start: i32, end: i32 },

    #[error("Invalid rating: {0} (must be between 0 and 10)")]
    InvalidRating(f32),

    #[error("Invalid rating range: min {min} is greater than max {max}")]
    RatingRangeInverted { min: f32, max: f32 },

    #[error("Genre identifier cannot be empty")]
    EmptyGenre,

    #[error("Genre identifier is too long (max 50 characters)")]
    GenreNameTooLong,

    #[error("Invalid page number: {0} (pages start at 1)")]
    InvalidPage(u32),
}

/// 判断字符串是否为合法年份
///
/// 年份可能来自用户手动修改的 URL，而不仅是日期选择器，
/// 因此必须是整数并且落在 `[min, max]` 范围内。
/// 小数（包括 `"1999.0"`）、非数字字符串都视为非法。
pub fn is_year(candidate: &str, min: i32, max: i32) -> bool {
    match candidate.trim().parse::<i64>() {
        Ok(year) => i64::from(min) <= year && year <= i64::from(max),
        Err(_) => false,
    }
}

/// 数值验证工具
pub struct RangeValidator;

impl RangeValidator {
    /// 验证年份区间：两端都在范围内且 start <= end
    pub fn validate_year_range(start: i32, end: i32, min: i32, max: i32) -> Result<(), ValidationError> {
        for year in [start, end] {
            if year < min || year > max {
                return Err(ValidationError::InvalidYear { year, min, max });
            }
        }

        if start > end {
            return Err(ValidationError::YearRangeInverted { start, end });
        }

        Ok(())
    }

    /// 验证评分区间：两端都在 [0, 10] 且 min <= max
    pub fn validate_rating_range(min: f32, max: f32) -> Result<(), ValidationError> {
        for rating in [min, max] {
            if !rating.is_finite() || rating < MIN_RATING || rating > MAX_RATING {
                return Err(ValidationError::InvalidRating(rating));
            }
        }

        if min > max {
            return Err(ValidationError::RatingRangeInverted { min, max });
        }

        Ok(())
    }

    pub fn validate_page(page: u32) -> Result<(), ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPage(page));
        }
        Ok(())
    }
}

/// 集合验证工具
pub struct CollectionValidator;

impl CollectionValidator {
    pub fn validate_genres(genres: &[String]) -> Result<(), ValidationError> {
        for genre in genres {
            if genre.trim().is_empty() {
                return Err(ValidationError::EmptyGenre);
            }

            if genre.chars().count() > 50 {
                return Err(ValidationError::GenreNameTooLong);
            }
        }

        Ok(())
    }
}
